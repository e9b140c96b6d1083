//! Line oriented position commands.
//!
//! A command line holds one or more groups separated by `;`. Each group is a
//! comma separated list of joint angles in wire order:
//!
//! ```text
//! 90,90,90,90,90,90,90,90;45,45,45,45,45,45,45,45\n
//! ```

use core::num::IntErrorKind;

use heapless::Vec;

use crate::{JOINT_COUNT, ServoError};

pub const SUB_COMMAND_SEPARATOR: char = ';';
pub const POSITION_SEPARATOR: char = ',';
pub const LINE_TERMINATOR: u8 = b'\n';

/// One group of joint positions, in wire order.
///
/// Positions are kept unvalidated; range checks happen per joint when the
/// command is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionCommand {
    positions: Vec<i64, JOINT_COUNT>,
}

impl PositionCommand {
    pub fn positions(&self) -> &[i64] {
        &self.positions
    }
}

impl TryFrom<&str> for PositionCommand {
    type Error = ServoError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let mut positions = Vec::new();
        for token in value.split(POSITION_SEPARATOR) {
            let position = parse_position(token)?;
            // Tokens past the last joint must still parse, but have no joint to drive.
            let _ = positions.push(position);
        }
        Ok(Self { positions })
    }
}

/// Integers too large for `i64` saturate, so they fail the range check for
/// their joint instead of rejecting the whole group.
fn parse_position(token: &str) -> Result<i64, ServoError> {
    match token.trim().parse::<i64>() {
        Ok(position) => Ok(position),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Ok(i64::MAX),
            IntErrorKind::NegOverflow => Ok(i64::MIN),
            _ => Err(ServoError::InvalidPosition),
        },
    }
}

/// Parses the groups of a command line lazily, in order.
pub fn sub_commands(line: &str) -> impl Iterator<Item = Result<PositionCommand, ServoError>> + '_ {
    line.split(SUB_COMMAND_SEPARATOR)
        .map(PositionCommand::try_from)
}

/// Writes `positions` as a single newline terminated command line.
pub fn write_command<W: core::fmt::Write>(out: &mut W, positions: &[u8]) -> core::fmt::Result {
    for (index, position) in positions.iter().enumerate() {
        if index > 0 {
            out.write_char(POSITION_SEPARATOR)?;
        }
        write!(out, "{}", position)?;
    }
    out.write_char(LINE_TERMINATOR as char)
}
