use core::fmt::Display;

/// Number of servo-driven joints on the robot.
pub const JOINT_COUNT: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leg {
    Leg0 = 0,
    Leg1 = 1,
    Leg2 = 2,
    Leg3 = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JointKind {
    Hip = 0,
    Ankle = 1,
}

impl Display for Leg {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Leg {}", *self as u8)
    }
}

impl Display for JointKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            JointKind::Hip => f.write_str("Hip"),
            JointKind::Ankle => f.write_str("Ankle"),
        }
    }
}

/// A joint in wire order: leg0-hip, leg0-ankle, leg1-hip, ... leg3-ankle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JointId {
    pub leg: Leg,
    pub kind: JointKind,
}

impl JointId {
    pub const ALL: [JointId; JOINT_COUNT] = [
        JointId::new(Leg::Leg0, JointKind::Hip),
        JointId::new(Leg::Leg0, JointKind::Ankle),
        JointId::new(Leg::Leg1, JointKind::Hip),
        JointId::new(Leg::Leg1, JointKind::Ankle),
        JointId::new(Leg::Leg2, JointKind::Hip),
        JointId::new(Leg::Leg2, JointKind::Ankle),
        JointId::new(Leg::Leg3, JointKind::Hip),
        JointId::new(Leg::Leg3, JointKind::Ankle),
    ];

    pub const fn new(leg: Leg, kind: JointKind) -> Self {
        Self { leg, kind }
    }

    /// Position of this joint in a pose or wire command.
    pub const fn index(&self) -> usize {
        self.leg as usize * 2 + self.kind as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl Display for JointId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} {}", self.leg, self.kind)
    }
}
