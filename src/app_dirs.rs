use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// `$HOME/.local/state/reflex`, or the platform's local data dir
    pub fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(PathBuf::from(home).join(".local").join("state").join("reflex"))
        } else {
            ProjectDirs::from("", "", "reflex").map(|dirs| dirs.data_local_dir().to_path_buf())
        }
    }

    pub fn db_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("scores.db"))
    }

    pub fn score_log_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("scores.csv"))
    }

    pub fn log_file_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("reflex.log"))
    }

    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "reflex").map(|dirs| dirs.config_dir().join("config.json"))
    }
}
