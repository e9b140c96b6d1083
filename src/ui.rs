use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{prelude::*, widgets::*};

use crate::{
    JOINT_COUNT, JointId,
    surface::{Action, ControlSurface, GaitTrigger, LinkStatus, NoticeLevel, PoseMessage},
};

const FINE_STEP: i64 = 1;
const COARSE_STEP: i64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Editing the pose filename; holds the text typed so far.
    EditingFile(String),
}

/// Front-end state that is not part of the robot's pose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub selected: usize,
    pub mode: InputMode,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            selected: 0,
            mode: InputMode::Normal,
        }
    }
}

impl ViewState {
    pub fn selected_joint(&self) -> JointId {
        JointId::ALL[self.selected]
    }

    pub fn select_next(&mut self) {
        if self.selected < JOINT_COUNT - 1 {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    /// Maps a key press to an operator action. `current_file` seeds the
    /// filename editor.
    pub fn handle_key(&mut self, key: KeyEvent, current_file: &str) -> Option<Action> {
        if let InputMode::EditingFile(text) = &mut self.mode {
            return match key.code {
                KeyCode::Enter => {
                    let path = PathBuf::from(text.trim());
                    self.mode = InputMode::Normal;
                    Some(Action::SetPoseFile(path))
                }
                KeyCode::Esc => {
                    self.mode = InputMode::Normal;
                    None
                }
                KeyCode::Backspace => {
                    text.pop();
                    None
                }
                KeyCode::Char(c) => {
                    text.push(c);
                    None
                }
                _ => None,
            };
        }

        let joint = self.selected_joint();
        let step = if key.modifiers.contains(KeyModifiers::SHIFT) {
            COARSE_STEP
        } else {
            FINE_STEP
        };
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
            KeyCode::Up => {
                self.select_previous();
                None
            }
            KeyCode::Down => {
                self.select_next();
                None
            }
            KeyCode::Left => Some(Action::Pose(PoseMessage::Nudge(joint, -step))),
            KeyCode::Right => Some(Action::Pose(PoseMessage::Nudge(joint, step))),
            KeyCode::Home => Some(Action::Pose(PoseMessage::SetJoint(joint, 0))),
            KeyCode::End => Some(Action::Pose(PoseMessage::SetJoint(joint, 180))),
            KeyCode::Enter | KeyCode::Char('u') => Some(Action::UpdateRobot),
            KeyCode::Char('s') => Some(Action::SaveState),
            KeyCode::Char('l') => Some(Action::LoadState),
            KeyCode::Char('r') => Some(Action::Trigger(GaitTrigger::Reset)),
            KeyCode::Char('a') => Some(Action::Trigger(GaitTrigger::WalkLeft)),
            KeyCode::Char('d') => Some(Action::Trigger(GaitTrigger::WalkRight)),
            KeyCode::Char('c') => Some(Action::Connect),
            KeyCode::Char('f') => {
                self.mode = InputMode::EditingFile(current_file.to_string());
                None
            }
            _ => None,
        }
    }
}

pub fn ui<P>(f: &mut Frame, surface: &ControlSurface<P>, view: &ViewState) {
    let [sliders_area, file_area, status_area, help_area] = Layout::vertical([
        Constraint::Length(JOINT_COUNT as u16 + 2),
        Constraint::Length(3),
        Constraint::Length(4),
        Constraint::Length(1),
    ])
    .areas(f.area());

    render_sliders(f, sliders_area, surface, view);
    render_file(f, file_area, surface, view);
    render_status(f, status_area, surface);

    let help = Paragraph::new(
        "↑↓ joint  ←→ ±1 (Shift ±10)  Enter/u update  s save  l load  r reset  a/d walk  f file  c connect  q quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    f.render_widget(help, help_area);
}

fn render_sliders<P>(f: &mut Frame, area: Rect, surface: &ControlSurface<P>, view: &ViewState) {
    let block = Block::default()
        .title("Quadruped Robot Control")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::vertical([Constraint::Length(1); JOINT_COUNT]).split(inner);
    for (index, control) in surface.pose().joints().iter().enumerate() {
        let style = if index == view.selected {
            Style::default().fg(Color::Yellow).bg(Color::DarkGray)
        } else {
            Style::default().fg(Color::White)
        };
        let gauge = LineGauge::default()
            .filled_style(style)
            .unfilled_style(Style::default().fg(Color::DarkGray))
            .label(format!("{:<18}", control.label()))
            .ratio(control.angle() as f64 / 180.0);
        f.render_widget(gauge, rows[index]);
    }
}

fn render_file<P>(f: &mut Frame, area: Rect, surface: &ControlSurface<P>, view: &ViewState) {
    let (text, style) = match &view.mode {
        InputMode::Normal => (
            surface.pose_file().display().to_string(),
            Style::default().fg(Color::White),
        ),
        InputMode::EditingFile(text) => (format!("{}_", text), Style::default().fg(Color::Yellow)),
    };
    let field = Paragraph::new(text).style(style).block(
        Block::default()
            .title("Pose file (f: edit, Enter: accept, Esc: cancel)")
            .borders(Borders::ALL),
    );
    f.render_widget(field, area);
}

fn render_status<P>(f: &mut Frame, area: Rect, surface: &ControlSurface<P>) {
    let port = &surface.transport().settings().port_name;
    let link = match surface.transport().status() {
        LinkStatus::Connected => {
            Span::styled(format!("Connected ({})", port), Style::default().fg(Color::Green))
        }
        LinkStatus::Disconnected => Span::styled(
            format!("Disconnected ({})", port),
            Style::default().fg(Color::Red),
        ),
    };
    let notice = match surface.notice() {
        Some(notice) => Span::styled(
            notice.text.clone(),
            match notice.level {
                NoticeLevel::Info => Style::default().fg(Color::Green),
                NoticeLevel::Error => Style::default().fg(Color::Red).bold(),
            },
        ),
        None => Span::raw(""),
    };
    let lines = vec![
        Line::from(vec![Span::raw("Link: "), link]),
        Line::from(vec![
            Span::raw("Robot: "),
            Span::raw(surface.last_reply().unwrap_or("-").to_string()),
        ]),
        Line::from(notice),
    ];
    let status = Paragraph::new(lines).block(Block::default().borders(Borders::TOP));
    f.render_widget(status, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{ControlConfig, mock::MockLink};
    use crossterm::event::KeyEvent;
    use ratatui::backend::TestBackend;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn selection_stays_in_range() {
        let mut view = ViewState::default();
        view.select_previous();
        assert_eq!(view.selected, 0);
        for _ in 0..20 {
            view.handle_key(key(KeyCode::Down), "stand.json");
        }
        assert_eq!(view.selected, JOINT_COUNT - 1);
    }

    #[test]
    fn arrows_nudge_selected_joint() {
        let mut view = ViewState::default();
        view.handle_key(key(KeyCode::Down), "stand.json");
        assert_eq!(
            view.handle_key(key(KeyCode::Right), "stand.json"),
            Some(Action::Pose(PoseMessage::Nudge(JointId::ALL[1], 1)))
        );
        assert_eq!(
            view.handle_key(KeyEvent::new(KeyCode::Left, KeyModifiers::SHIFT), "stand.json"),
            Some(Action::Pose(PoseMessage::Nudge(JointId::ALL[1], -10)))
        );
    }

    #[test]
    fn buttons_map_to_actions() {
        let mut view = ViewState::default();
        assert_eq!(view.handle_key(key(KeyCode::Enter), ""), Some(Action::UpdateRobot));
        assert_eq!(view.handle_key(key(KeyCode::Char('s')), ""), Some(Action::SaveState));
        assert_eq!(view.handle_key(key(KeyCode::Char('l')), ""), Some(Action::LoadState));
        assert_eq!(
            view.handle_key(key(KeyCode::Char('r')), ""),
            Some(Action::Trigger(GaitTrigger::Reset))
        );
        assert_eq!(
            view.handle_key(key(KeyCode::Char('a')), ""),
            Some(Action::Trigger(GaitTrigger::WalkLeft))
        );
        assert_eq!(
            view.handle_key(key(KeyCode::Char('d')), ""),
            Some(Action::Trigger(GaitTrigger::WalkRight))
        );
        assert_eq!(view.handle_key(key(KeyCode::Char('q')), ""), Some(Action::Quit));
    }

    #[test]
    fn filename_editing() {
        let mut view = ViewState::default();
        assert_eq!(view.handle_key(key(KeyCode::Char('f')), "stand.json"), None);
        assert_eq!(view.mode, InputMode::EditingFile("stand.json".to_string()));

        for _ in 0.."stand.json".len() {
            view.handle_key(key(KeyCode::Backspace), "");
        }
        for c in "sit.json".chars() {
            // Typing must not trigger the normal mode bindings.
            assert_eq!(view.handle_key(key(KeyCode::Char(c)), ""), None);
        }
        assert_eq!(
            view.handle_key(key(KeyCode::Enter), ""),
            Some(Action::SetPoseFile(PathBuf::from("sit.json")))
        );
        assert_eq!(view.mode, InputMode::Normal);

        view.handle_key(key(KeyCode::Char('f')), "sit.json");
        assert_eq!(view.handle_key(key(KeyCode::Esc), ""), None);
        assert_eq!(view.mode, InputMode::Normal);
    }

    #[test]
    fn renders_sliders_and_status() {
        let surface: ControlSurface<MockLink> = ControlSurface::new(ControlConfig {
            port_name: "mock".to_string(),
            ..ControlConfig::default()
        });
        let view = ViewState::default();
        let mut terminal = Terminal::new(TestBackend::new(120, 20)).unwrap();
        terminal.draw(|f| ui(f, &surface, &view)).unwrap();

        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(screen.contains("Leg 0 Hip: 0"));
        assert!(screen.contains("Leg 3 Ankle: 0"));
        assert!(screen.contains("stand.json"));
        assert!(screen.contains("Disconnected (mock)"));
    }
}
