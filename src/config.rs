//! Configuration loader and validator for the post generator.
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Root configuration struct mirroring the YAML schema exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub app: App,
    pub gemini: Gemini,
    pub image: Image,
}

/// App-level settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct App {
    /// Directory holding the credential store and downloaded images.
    pub data_dir: String,
}

/// Gemini text-generation endpoint settings. The API key itself lives
/// in the credential store, not here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Gemini {
    pub base_url: String,
    pub model: String,
}

/// Image-generation endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Image {
    pub base_url: String,
}

impl Config {
    /// Ensure required directories exist (creates `app.data_dir` if missing).
    pub fn ensure_dirs(&self) -> Result<(), std::io::Error> {
        if self.app.data_dir.trim().is_empty() {
            return Ok(());
        }
        fs::create_dir_all(&self.app.data_dir)
    }
}

impl Default for Config {
    fn default() -> Self {
        serde_yaml::from_str(example()).expect("example config parses")
    }
}

/// Load configuration from a YAML file and validate it.
/// - If `path` is None, uses `config.yaml` in the current working directory.
/// - If the file does not exist, falls back to the built-in defaults.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or_else(|| Path::new("config.yaml"));
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&content)?;
    validate(&cfg)?;
    Ok(cfg)
}

/// Validate a configuration instance.
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.app.data_dir.trim().is_empty() {
        return Err(ConfigError::Invalid("app.data_dir must be non-empty"));
    }
    if cfg.gemini.base_url.trim().is_empty() {
        return Err(ConfigError::Invalid("gemini.base_url must be non-empty"));
    }
    if cfg.gemini.model.trim().is_empty() {
        return Err(ConfigError::Invalid("gemini.model must be non-empty"));
    }
    if cfg.image.base_url.trim().is_empty() {
        return Err(ConfigError::Invalid("image.base_url must be non-empty"));
    }
    Ok(())
}

/// Canonical example YAML, used both as documentation and as the
/// built-in default configuration.
pub fn example() -> &'static str {
    r#"app:
  data_dir: "./data"

gemini:
  base_url: "https://generativelanguage.googleapis.com/"
  model: "gemini-2.0-flash"

image:
  base_url: "https://image.pollinations.ai/"
"#
}
