//! Configuration: loads optional ~/.fractaleq/config.yaml.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::equation::Bindings;

/// Compiler configuration loaded from ~/.fractaleq/config.yaml.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Evaluator names for `z`, `c` and `n`.
    #[serde(default)]
    pub bindings: Bindings,
    /// Append `+ c` to equations that do not already end with it.
    #[serde(default = "default_true")]
    pub append_constant: bool,
    /// Emit `^2` and `^3` as chained multiplies instead of `cpow`.
    #[serde(default = "default_true")]
    pub expand_small_powers: bool,
    /// Number of recent compile failures kept for display.
    #[serde(default = "default_diagnostic_capacity")]
    pub diagnostic_capacity: usize,
    /// Log filter used when neither the CLI nor FRACTALEQ_LOG sets one.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_true() -> bool {
    true
}

fn default_diagnostic_capacity() -> usize {
    50
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bindings: Bindings::default(),
            append_constant: true,
            expand_small_powers: true,
            diagnostic_capacity: default_diagnostic_capacity(),
            log_level: default_log_level(),
        }
    }
}

/// Get the config file path.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".fractaleq").join("config.yaml"))
}

impl Config {
    /// Load from ~/.fractaleq/config.yaml, or defaults if it is missing or
    /// unreadable.
    pub fn load() -> Self {
        config_path()
            .and_then(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Load from an explicit path. Returns None if the file is missing or
    /// malformed.
    pub fn load_from(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        match serde_yaml::from_str(&content) {
            Ok(config) => Some(config),
            Err(err) => {
                tracing::warn!(path = %path.display(), "ignoring malformed config: {err}");
                None
            }
        }
    }
}
