use std::{
    fs::OpenOptions,
    io::{self, Stdout},
    path::Path,
    time::Duration,
};

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::info;
use quadruped_servo::{
    host::SerialLink,
    surface::{Action, ControlConfig, ControlSurface, config::CONFIG_FILE},
    ui::{ViewState, ui},
};
use ratatui::prelude::*;

const TICK: Duration = Duration::from_millis(100);

pub fn main() -> Result<(), Box<dyn std::error::Error>> {
    // The terminal belongs to the UI, so logs go to a file.
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("quadruped_control.log")?;

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Starting quadruped control surface");

    let config = ControlConfig::load_or_default(Path::new(CONFIG_FILE));
    let mut surface: ControlSurface<SerialLink> = ControlSurface::new(config);
    surface.handle(Action::Connect);

    let mut terminal = enter_terminal()?;
    let result = run_app(&mut terminal, &mut surface);
    // Give the shell its terminal back before reporting anything.
    leave_terminal(&mut terminal)?;

    surface.close();
    info!("Control surface closed");
    result
}

type Screen = Terminal<CrosstermBackend<Stdout>>;

fn enter_terminal() -> io::Result<Screen> {
    enable_raw_mode()?;
    if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(e);
    }
    Terminal::new(CrosstermBackend::new(io::stdout()))
}

fn leave_terminal(terminal: &mut Screen) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    surface: &mut ControlSurface<SerialLink>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut view = ViewState::default();

    loop {
        terminal.draw(|f| {
            ui(f, surface, &view);
        })?;

        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                let current_file = surface.pose_file().display().to_string();
                match view.handle_key(key, &current_file) {
                    Some(Action::Quit) => return Ok(()),
                    Some(action) => surface.handle(action),
                    None => {}
                }
            }
        }
    }
}
