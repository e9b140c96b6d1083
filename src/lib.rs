#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(all(test, not(feature = "std")))]
extern crate std;

pub mod command;
pub mod joint;
pub mod receiver;
pub mod servo;

#[cfg(feature = "std")]
pub mod host;

#[cfg(feature = "std")]
pub mod surface;

#[cfg(feature = "ui")]
pub mod ui;

pub use joint::{JOINT_COUNT, JointId};

/// Lowest commandable joint angle in degrees.
pub const MIN_ANGLE: i64 = 0;
/// Highest commandable joint angle in degrees.
pub const MAX_ANGLE: i64 = 180;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ServoError {
    #[error("Position {0} out of bounds")]
    OutOfBounds(i64),
    #[error("Invalid position")]
    InvalidPosition,
    #[error("Command line longer than {0} bytes")]
    LineTooLong(usize),
    #[error("PWM channel write error")]
    PwmError,
    #[error("Serial port read error")]
    ReadError,
}
