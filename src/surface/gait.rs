use std::{fmt::Display, path::Path};

use super::{
    config::ControlConfig,
    pose::Pose,
    store::{PoseFileError, load_positions},
};

/// Canned poses the operator can fire in one go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaitTrigger {
    WalkLeft,
    WalkRight,
    /// 90 degrees on every joint; needs no file.
    Reset,
}

impl Display for GaitTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GaitTrigger::WalkLeft => f.write_str("Walk Left"),
            GaitTrigger::WalkRight => f.write_str("Walk Right"),
            GaitTrigger::Reset => f.write_str("Reset Positions"),
        }
    }
}

impl GaitTrigger {
    pub fn pose_file<'a>(&self, config: &'a ControlConfig) -> Option<&'a Path> {
        match self {
            GaitTrigger::WalkLeft => Some(config.walk_left_file.as_path()),
            GaitTrigger::WalkRight => Some(config.walk_right_file.as_path()),
            GaitTrigger::Reset => None,
        }
    }

    /// The pose this trigger applies. Gait files are checked for a full set
    /// of positions before anything is returned.
    pub fn resolve(&self, config: &ControlConfig) -> Result<Pose, PoseFileError> {
        match self.pose_file(config) {
            None => Ok(Pose::NEUTRAL),
            Some(path) => {
                let positions = load_positions(path)?;
                Ok(Pose::try_from(positions.as_slice())?)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn reset_needs_no_file() {
        let config = ControlConfig {
            walk_left_file: "/nonexistent/left.json".into(),
            ..ControlConfig::default()
        };
        assert_eq!(GaitTrigger::Reset.resolve(&config).unwrap(), Pose::NEUTRAL);
        assert!(GaitTrigger::WalkLeft.resolve(&config).is_err());
    }

    #[test]
    fn walk_files_come_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = ControlConfig {
            walk_left_file: dir.path().join("left.json"),
            walk_right_file: dir.path().join("right.json"),
            ..ControlConfig::default()
        };
        fs::write(&config.walk_left_file, r#"{"positions":[100,80,100,80,80,100,80,100]}"#).unwrap();
        fs::write(&config.walk_right_file, r#"{"positions":[80,100,80,100,100,80,100,80]}"#).unwrap();

        assert_eq!(
            GaitTrigger::WalkLeft.resolve(&config).unwrap().positions(),
            &[100, 80, 100, 80, 80, 100, 80, 100]
        );
        assert_eq!(
            GaitTrigger::WalkRight.resolve(&config).unwrap().positions(),
            &[80, 100, 80, 100, 100, 80, 100, 80]
        );
    }

    #[test]
    fn short_gait_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = ControlConfig {
            walk_right_file: dir.path().join("right.json"),
            ..ControlConfig::default()
        };
        fs::write(&config.walk_right_file, r#"{"positions":[80,100]}"#).unwrap();
        assert!(matches!(
            GaitTrigger::WalkRight.resolve(&config),
            Err(PoseFileError::Length(_))
        ));
    }
}
