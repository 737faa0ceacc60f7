use std::path::PathBuf;

use crate::env::{parsed_or, string_or};

pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

#[derive(Clone, Debug)]
pub struct LogConfig {
    pub level: String,
    pub dir: PathBuf,
    pub file: String,
    pub stdout: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "debug".into(),
            dir: PathBuf::from("./logs"),
            file: "app.log".into(),
            stdout: true,
        }
    }
}

impl LogConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            level: string_or("LOG_LEVEL", defaults.level).to_ascii_lowercase(),
            dir: PathBuf::from(string_or(
                "LOG_DIR",
                defaults.dir.to_string_lossy().into_owned(),
            )),
            file: string_or("LOG_FILE", defaults.file),
            stdout: parsed_or("LOG_STDOUT", defaults.stdout),
        }
    }

    pub fn is_known_level(&self) -> bool {
        LOG_LEVELS.contains(&self.level.as_str())
    }
}
