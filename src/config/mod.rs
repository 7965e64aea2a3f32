pub mod settings;

use std::path::PathBuf;

pub use settings::{get_config, GeneratorSettings, QuizSettings, StorageSettings, StudyConfig};

const APP_ID: &str = "com.studyaid";

/// Platform-specific application data directory, or `None` when the
/// relevant home variable is unset.
pub fn app_data_dir() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let mut dir = PathBuf::from(home);
            dir.push("Library/Application Support");
            dir.push(APP_ID);
            return Some(dir);
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            let mut dir = PathBuf::from(appdata);
            dir.push(APP_ID);
            return Some(dir);
        }
    }

    #[cfg(target_os = "linux")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let mut dir = PathBuf::from(home);
            dir.push(".local/share");
            dir.push(APP_ID);
            return Some(dir);
        }
    }

    None
}
