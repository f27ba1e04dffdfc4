//! Console configuration loading.
//!
//! The host runs fine with no config file at all; everything here has a
//! default. A file is only needed to change the prompt, silence the
//! banner, or run startup lines before the first prompt.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level console configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Prompt printed before each read. Defaults to `"> "`.
    #[serde(default = "default_prompt")]
    pub prompt: String,

    /// Whether to print the version banner at startup.
    #[serde(default = "default_true")]
    pub banner: bool,

    /// Lines interpreted before the first prompt, in order.
    ///
    /// A failing startup line is reported like an interactive one and
    /// does not stop the ones after it.
    #[serde(default)]
    pub startup: Vec<String>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            prompt: default_prompt(),
            banner: true,
            startup: Vec::new(),
        }
    }
}

fn default_prompt() -> String {
    "> ".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_gets_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.prompt, "> ");
        assert!(config.banner);
        assert!(config.startup.is_empty());
    }

    #[test]
    fn test_full_config_parses() {
        let config: Config = toml::from_str(
            r#"
prompt = "drover: "
banner = false
startup = ["note \"hello\"", "list"]
"#,
        )
        .unwrap();
        assert_eq!(config.prompt, "drover: ");
        assert!(!config.banner);
        assert_eq!(config.startup.len(), 2);
    }

    #[test]
    fn test_load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "prompt = \"$ \"").unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.prompt, "$ ");
        assert!(config.banner, "unset fields keep defaults");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Config::load("/nonexistent/drover.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_bad_toml_is_parse_error() {
        let err = toml::from_str::<Config>("prompt = [1, 2]").unwrap_err();
        let err: ConfigError = err.into();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
