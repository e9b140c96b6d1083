//! Desktop side: the operator's pose, the serial link to the robot, and pose
//! files on disk.

pub mod config;
pub mod controller;
pub mod gait;
pub mod pose;
pub mod store;
pub mod transport;

#[cfg(test)]
pub(crate) mod mock;

pub use config::ControlConfig;
pub use controller::{Action, ControlSurface, Notice, NoticeLevel};
pub use gait::GaitTrigger;
pub use pose::{Pose, PoseAggregator, PoseMessage};
pub use transport::{LinkError, LinkSettings, LinkStatus, OpenLink, Transport};
