use log::trace;

use crate::{
    JOINT_COUNT, JointId, MAX_ANGLE, MIN_ANGLE,
    command::write_command,
};

/// Angle every joint starts at, the bottom of the slider.
pub const STARTUP_ANGLE: u8 = 0;
/// Angle used by the reset trigger.
pub const NEUTRAL_ANGLE: i64 = 90;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("Invalid pose: expected {expected} positions, found {found}")]
pub struct PoseLengthError {
    pub expected: usize,
    pub found: usize,
}

/// Eight joint angles in wire order.
///
/// Values are not range checked here; they are clamped when applied to the
/// joints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pose([i64; JOINT_COUNT]);

impl Pose {
    pub const NEUTRAL: Pose = Pose([NEUTRAL_ANGLE; JOINT_COUNT]);

    pub fn new(positions: [i64; JOINT_COUNT]) -> Self {
        Self(positions)
    }

    pub fn positions(&self) -> &[i64; JOINT_COUNT] {
        &self.0
    }
}

impl TryFrom<&[i64]> for Pose {
    type Error = PoseLengthError;

    fn try_from(value: &[i64]) -> Result<Self, Self::Error> {
        let positions = <[i64; JOINT_COUNT]>::try_from(value).map_err(|_| PoseLengthError {
            expected: JOINT_COUNT,
            found: value.len(),
        })?;
        Ok(Self(positions))
    }
}

#[derive(Debug, Clone)]
pub struct JointControl {
    joint: JointId,
    angle: u8,
    label: String,
}

impl JointControl {
    fn new(joint: JointId, angle: u8) -> Self {
        let mut control = Self {
            joint,
            angle,
            label: String::new(),
        };
        control.refresh_label();
        control
    }

    fn set(&mut self, position: i64) {
        self.angle = position.clamp(MIN_ANGLE, MAX_ANGLE) as u8;
        self.refresh_label();
    }

    fn refresh_label(&mut self) {
        self.label = format!("{}: {}", self.joint, self.angle);
        trace!("{}", self.label);
    }

    pub fn joint(&self) -> JointId {
        self.joint
    }

    pub fn angle(&self) -> u8 {
        self.angle
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Changes to the operator's pose. Every edit goes through
/// [`PoseAggregator::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoseMessage {
    SetJoint(JointId, i64),
    Nudge(JointId, i64),
    Apply(Pose),
}

#[derive(Debug, Clone)]
pub struct PoseAggregator {
    joints: [JointControl; JOINT_COUNT],
}

impl Default for PoseAggregator {
    fn default() -> Self {
        Self::new(STARTUP_ANGLE)
    }
}

impl PoseAggregator {
    pub fn new(angle: u8) -> Self {
        Self {
            joints: JointId::ALL.map(|joint| JointControl::new(joint, angle)),
        }
    }

    /// Applies one edit; angles are clamped to 0..=180.
    pub fn update(&mut self, message: PoseMessage) {
        match message {
            PoseMessage::SetJoint(joint, position) => self.joints[joint.index()].set(position),
            PoseMessage::Nudge(joint, delta) => {
                let control = &mut self.joints[joint.index()];
                let position = (control.angle as i64).saturating_add(delta);
                control.set(position);
            }
            PoseMessage::Apply(pose) => {
                for (control, &position) in self.joints.iter_mut().zip(pose.positions()) {
                    control.set(position);
                }
            }
        }
    }

    pub fn angle(&self, joint: JointId) -> u8 {
        self.joints[joint.index()].angle
    }

    pub fn label(&self, joint: JointId) -> &str {
        &self.joints[joint.index()].label
    }

    pub fn joints(&self) -> &[JointControl; JOINT_COUNT] {
        &self.joints
    }

    pub fn angles(&self) -> [u8; JOINT_COUNT] {
        self.joints.each_ref().map(|control| control.angle)
    }

    pub fn pose(&self) -> Pose {
        Pose(self.angles().map(i64::from))
    }

    /// The current pose as a newline terminated wire command.
    pub fn command_line(&self) -> String {
        let mut line = String::new();
        // Writing into a String cannot fail.
        let _ = write_command(&mut line, &self.angles());
        line
    }
}
