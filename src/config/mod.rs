pub mod path;

#[cfg(test)]
pub mod config_test;

use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::console::ConsoleKind;

/// Represents all possible errors loading [Settings]
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Could not read: {0}")]
    IoError(#[from] io::Error),
    #[error("Unable to deserialize: {0}")]
    DeserializeError(#[from] serde_yaml::Error),
}

/// Which virtual controller implementation to drive.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ControllerBackend {
    /// Real uinput virtual gamepads
    #[default]
    Uinput,
    /// In-memory controllers that track state but create no devices
    Memory,
}

/// Limits applied while parsing and validating input sequences.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct InputLimits {
    /// Maximum total running duration of one input sequence, in milliseconds
    pub max_input_duration_ms: u64,
    /// Duration used for inputs that do not specify one, in milliseconds
    pub default_input_duration_ms: u64,
    /// Maximum number of macro substitution rounds during expansion
    pub max_macro_recursion: u32,
    /// Longest a pause input may be held across one sequence, in
    /// milliseconds. Unset disables the check.
    pub max_pause_hold_duration_ms: Option<u64>,
    /// Name of the input treated as the pause button by the hold check
    pub pause_input: Option<String>,
}

impl Default for InputLimits {
    fn default() -> Self {
        Self {
            max_input_duration_ms: 60000,
            default_input_duration_ms: 200,
            max_macro_recursion: 10,
            max_pause_hold_duration_ms: None,
            pause_input: None,
        }
    }
}

/// Daemon settings, loaded from a YAML file.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct Settings {
    /// Console profile active at startup
    pub console: ConsoleKind,
    /// Number of virtual controllers to create
    pub controller_count: usize,
    /// Virtual controller implementation
    pub backend: ControllerBackend,
    /// Prefix character that marks a chat message as a bot command
    pub command_prefix: char,
    /// Seconds between credit awards to users active in chat
    pub credits_interval_secs: u64,
    /// Credits awarded per interval to each active user
    pub credits_amount: i64,
    pub limits: InputLimits,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            console: ConsoleKind::default(),
            controller_count: 1,
            backend: ControllerBackend::default(),
            command_prefix: '!',
            credits_interval_secs: 120,
            credits_amount: 100,
            limits: InputLimits::default(),
        }
    }
}

impl Settings {
    /// Load [Settings] from the given YAML string
    pub fn from_yaml(content: String) -> Result<Settings, LoadError> {
        let settings: Settings = serde_yaml::from_str(content.as_str())?;
        Ok(settings)
    }

    /// Load [Settings] from the given YAML file
    pub fn from_yaml_file(path: String) -> Result<Settings, LoadError> {
        let file = std::fs::File::open(path)?;
        let settings: Settings = serde_yaml::from_reader(file)?;
        Ok(settings)
    }

    /// Load [Settings] from the first settings file found in the search
    /// paths, falling back to defaults if none exists.
    pub fn load() -> Settings {
        let Some(path) = path::find_settings() else {
            log::info!("No settings file found. Using defaults.");
            return Settings::default();
        };
        log::info!("Loading settings from {path:?}");
        match Settings::from_yaml_file(path.display().to_string()) {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("Failed to load settings from {path:?}: {e}");
                Settings::default()
            }
        }
    }
}
