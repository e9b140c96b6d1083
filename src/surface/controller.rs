use std::path::{Path, PathBuf};

use embedded_io::{Read, Write};
use log::{error, info};

use super::{
    config::ControlConfig,
    gait::GaitTrigger,
    pose::{PoseAggregator, PoseMessage},
    store::{load_pose, save_pose},
    transport::{LinkError, OpenLink, Transport},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A message for the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

/// Operator actions, as produced by the front-end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Pose(PoseMessage),
    SetPoseFile(PathBuf),
    UpdateRobot,
    SaveState,
    LoadState,
    Trigger(GaitTrigger),
    Connect,
    Quit,
}

/// Everything behind the operator's window: the pose, the link, and the
/// filename used for save and load.
pub struct ControlSurface<P> {
    config: ControlConfig,
    pose: PoseAggregator,
    transport: Transport<P>,
    pose_file: PathBuf,
    notice: Option<Notice>,
    last_reply: Option<String>,
}

impl<P> ControlSurface<P> {
    pub fn new(config: ControlConfig) -> Self {
        let transport = Transport::new(config.link_settings());
        let pose_file = config.pose_file.clone();
        Self {
            config,
            pose: PoseAggregator::default(),
            transport,
            pose_file,
            notice: None,
            last_reply: None,
        }
    }

    pub fn config(&self) -> &ControlConfig {
        &self.config
    }

    pub fn pose(&self) -> &PoseAggregator {
        &self.pose
    }

    pub fn transport(&self) -> &Transport<P> {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut Transport<P> {
        &mut self.transport
    }

    pub fn pose_file(&self) -> &Path {
        &self.pose_file
    }

    /// Latest message for the operator.
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Last non-empty line the robot sent back.
    pub fn last_reply(&self) -> Option<&str> {
        self.last_reply.as_deref()
    }

    fn notify(&mut self, level: NoticeLevel, text: String) {
        match level {
            NoticeLevel::Info => info!("{}", text),
            NoticeLevel::Error => error!("{}", text),
        }
        self.notice = Some(Notice { level, text });
    }
}

impl<P: Read + Write + OpenLink> ControlSurface<P> {
    pub fn handle(&mut self, action: Action) {
        match action {
            Action::Pose(message) => self.pose.update(message),
            Action::SetPoseFile(path) => self.pose_file = path,
            Action::UpdateRobot => self.update_robot(),
            Action::SaveState => self.save_state(),
            Action::LoadState => self.load_state(),
            Action::Trigger(trigger) => self.trigger(trigger),
            Action::Connect => self.connect(),
            Action::Quit => self.close(),
        }
    }

    /// (Re)opens the configured port.
    pub fn connect(&mut self) {
        match self.transport.connect() {
            Ok(()) => {
                let settings = self.transport.settings();
                let text = format!(
                    "Connected to {} at {} baud.",
                    settings.port_name, settings.baud_rate
                );
                self.notify(NoticeLevel::Info, text);
            }
            Err(e) => self.notify(NoticeLevel::Error, e.to_string()),
        }
    }

    /// Sends the current pose and reads back one reply line.
    pub fn update_robot(&mut self) {
        if !self.transport.is_connected() {
            self.notify(NoticeLevel::Error, LinkError::NotConnected.to_string());
            return;
        }
        let command = self.pose.command_line();
        if let Err(e) = self.transport.send(&command) {
            self.notify(NoticeLevel::Error, e.to_string());
            return;
        }
        let reply = self.transport.receive();
        if reply.is_empty() {
            self.last_reply = None;
        } else {
            info!("Robot replied: {}", reply);
            self.last_reply = Some(reply);
        }
        self.notify(
            NoticeLevel::Info,
            format!("Sent positions: {}", command.trim_end()),
        );
    }

    pub fn save_state(&mut self) {
        let path = self.pose_file.clone();
        match save_pose(&path, &self.pose.pose()) {
            Ok(()) => self.notify(
                NoticeLevel::Info,
                format!("State saved to {}", path.display()),
            ),
            Err(e) => self.notify(
                NoticeLevel::Error,
                format!("Failed to save state to {}: {}", path.display(), e),
            ),
        }
    }

    /// Loads the pose file into the sliders without sending it.
    pub fn load_state(&mut self) {
        let path = self.pose_file.clone();
        match load_pose(&path) {
            Ok(pose) => {
                self.pose.update(PoseMessage::Apply(pose));
                self.notify(NoticeLevel::Info, "State loaded successfully!".to_string());
            }
            Err(e) => self.notify(
                NoticeLevel::Error,
                format!("Failed to load state from {}: {}", path.display(), e),
            ),
        }
    }

    /// Applies a canned pose to every joint, then sends it.
    pub fn trigger(&mut self, trigger: GaitTrigger) {
        match trigger.resolve(&self.config) {
            Ok(pose) => {
                info!("{}", trigger);
                self.pose.update(PoseMessage::Apply(pose));
                self.update_robot();
            }
            Err(e) => {
                let source = trigger
                    .pose_file(&self.config)
                    .map(|path| path.display().to_string())
                    .unwrap_or_default();
                self.notify(
                    NoticeLevel::Error,
                    format!("Failed to load positions from {}: {}", source, e),
                );
            }
        }
    }

    pub fn close(&mut self) {
        self.transport.close();
    }
}
