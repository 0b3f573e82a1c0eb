//! Configuration loading for Essence
//!
//! TOML configuration with serde defaults for every field, searched in
//! the usual locations when no explicit path is given.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{EssenceError, Result};

/// Main configuration structure for Essence
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Storage configuration
    #[serde(default)]
    pub storage: StorageConfig,
    /// Mood series configuration
    #[serde(default)]
    pub series: SeriesConfig,
    /// Conversation log configuration
    #[serde(default)]
    pub conversation: ConversationConfig,
    /// Scoring pipeline configuration
    #[serde(default)]
    pub scoring: ScoringConfig,
}

/// Storage location configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Base directory for all persisted blocks
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".essence"))
        .unwrap_or_else(|| PathBuf::from(".essence"))
}

/// Mood series configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesConfig {
    /// Maximum points kept per subject; oldest evicted first
    #[serde(default = "default_max_points")]
    pub max_points: usize,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self {
            max_points: default_max_points(),
        }
    }
}

fn default_max_points() -> usize {
    200
}

/// Conversation log configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// Sliding-window size per subject
    #[serde(default = "default_max_messages")]
    pub max_messages: usize,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            max_messages: default_max_messages(),
        }
    }
}

fn default_max_messages() -> usize {
    100
}

/// Scoring pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// How many trailing user messages to score per run
    #[serde(default = "default_recent_messages")]
    pub recent_messages: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            recent_messages: default_recent_messages(),
        }
    }
}

fn default_recent_messages() -> usize {
    12
}

impl Config {
    /// Load configuration from an explicit path, or search the default
    /// locations (`~/.essence/config.toml`, the platform config dir,
    /// then `./config.toml`), falling back to defaults when nothing is
    /// found.
    pub fn load(config_path: Option<PathBuf>) -> Result<Config> {
        match Self::resolve_path(config_path) {
            Some(path) => {
                tracing::info!("Loading config from: {}", path.display());
                Self::read_file(&path)
            }
            None => {
                tracing::info!("No config file found, using defaults");
                Ok(Config::default())
            }
        }
    }

    /// The config file [`Config::load`] would read: the explicit path
    /// when given (even if it does not exist, so a typo surfaces as a
    /// read error instead of silently using defaults), otherwise the
    /// first default location that exists.
    pub fn resolve_path(explicit: Option<PathBuf>) -> Option<PathBuf> {
        if explicit.is_some() {
            return explicit;
        }

        let default_paths = [
            dirs::home_dir().map(|h| h.join(".essence").join("config.toml")),
            dirs::config_dir().map(|c| c.join("essence").join("config.toml")),
            Some(PathBuf::from("config.toml")),
        ];

        default_paths.into_iter().flatten().find(|p| p.exists())
    }

    fn read_file(path: &Path) -> Result<Config> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            EssenceError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        toml::from_str(&content)
            .map_err(|e| EssenceError::Config(format!("Failed to parse config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.series.max_points, 200);
        assert_eq!(config.conversation.max_messages, 100);
        assert_eq!(config.scoring.recent_messages, 12);
        assert!(config.storage.data_dir.ends_with(".essence"));
    }

    #[test]
    fn test_toml_deserialization() {
        let toml_str = r#"
[storage]
data_dir = "/tmp/essence"

[series]
max_points = 50

[conversation]
max_messages = 20

[scoring]
recent_messages = 4
"#;

        let config: Config = toml::from_str(toml_str).expect("Failed to parse TOML");

        assert_eq!(config.storage.data_dir, PathBuf::from("/tmp/essence"));
        assert_eq!(config.series.max_points, 50);
        assert_eq!(config.conversation.max_messages, 20);
        assert_eq!(config.scoring.recent_messages, 4);
    }

    #[test]
    fn test_toml_partial_deserialization() {
        // Only one section given; everything else takes defaults
        let toml_str = r#"
[series]
max_points = 25
"#;

        let config: Config = toml::from_str(toml_str).expect("Failed to parse partial TOML");

        assert_eq!(config.series.max_points, 25);
        assert_eq!(config.conversation.max_messages, 100);
        assert_eq!(config.scoring.recent_messages, 12);
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[series]\nmax_points = 7\n").unwrap();

        let config = Config::load(Some(path)).expect("Failed to load config");
        assert_eq!(config.series.max_points, 7);
    }

    #[test]
    fn test_load_missing_explicit_path_errors() {
        let result = Config::load(Some(PathBuf::from("/nonexistent/essence.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_path_prefers_explicit_path() {
        let explicit = PathBuf::from("/nonexistent/essence.toml");
        assert_eq!(
            Config::resolve_path(Some(explicit.clone())),
            Some(explicit),
            "An explicit path wins even when it does not exist"
        );
    }
}
