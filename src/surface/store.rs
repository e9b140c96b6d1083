//! Named pose files: `{"positions": [v0, ..., v7]}`.

use std::{fs, io, path::Path};

use log::info;
use serde::{Deserialize, Serialize};

use super::pose::{Pose, PoseLengthError};

#[derive(Debug, thiserror::Error)]
pub enum PoseFileError {
    #[error("{0}")]
    Io(#[from] io::Error),
    #[error("bad pose JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Length(#[from] PoseLengthError),
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PoseFile {
    #[serde(default)]
    positions: Vec<i64>,
}

/// Writes `pose` to `path`, replacing any existing file.
pub fn save_pose(path: &Path, pose: &Pose) -> Result<(), PoseFileError> {
    let file = PoseFile {
        positions: pose.positions().to_vec(),
    };
    fs::write(path, serde_json::to_string(&file)?)?;
    info!("Saved pose to {}", path.display());
    Ok(())
}

/// Reads a pose file that must hold exactly one position per joint.
pub fn load_pose(path: &Path) -> Result<Pose, PoseFileError> {
    let positions = load_positions(path)?;
    Ok(Pose::try_from(positions.as_slice())?)
}

/// Reads the positions of a pose file as stored, without a length check.
///
/// A missing `positions` field reads as an empty list.
pub fn load_positions(path: &Path) -> Result<Vec<i64>, PoseFileError> {
    let contents = fs::read_to_string(path)?;
    let file: PoseFile = serde_json::from_str(&contents)?;
    Ok(file.positions)
}
