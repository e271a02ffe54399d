mod defaults;
mod env;
pub mod types;
mod validation;

use std::path::{Path, PathBuf};

pub use defaults::{default_probe_args, KNOWN_TOOLS};
pub use types::*;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "SB_CONFIG";

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Missing environment variables: {0:?}")]
    MissingEnvVars(Vec<String>),

    #[error("Unknown tool '{0}'. Known tools: pdftotext, ps2txt, pandoc, ffprobe, ffmpeg")]
    UnknownTool(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ExtractConfig {
    /// Parse a configuration from a YAML string.
    /// Environment variables in the format `${VAR_NAME}` will be interpolated.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let interpolated = env::interpolate_env(yaml)?;

        // An empty document means "all defaults".
        if interpolated.trim().is_empty() {
            return Ok(ExtractConfig::default());
        }

        let config: ExtractConfig = serde_yaml::from_str(&interpolated)?;
        Ok(config)
    }

    /// Load a configuration from a file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Find a config file: `$SB_CONFIG`, then `./second-brain.yaml`,
    /// then `~/.config/second-brain/extract.yaml`.
    pub fn discover() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd_config = PathBuf::from("second-brain.yaml");
        if cwd_config.exists() {
            return Some(cwd_config);
        }

        if let Some(home) = dirs_next::home_dir() {
            let home_config = home.join(".config/second-brain/extract.yaml");
            if home_config.exists() {
                return Some(home_config);
            }
        }

        None
    }

    /// Load the discovered config file, or defaults when there is none.
    /// The result has defaults applied and has been validated.
    pub fn load() -> Result<Self, ConfigError> {
        let config = match Self::discover() {
            Some(path) => Self::from_file(&path)?,
            None => ExtractConfig::default(),
        };
        let config = config.effective();
        config.validate_or_err()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_parse_minimal_config() {
        let yaml = r#"
tools:
  pdftotext:
    command: /usr/local/bin/pdftotext
"#;

        let config = ExtractConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.tools.len(), 1);
        assert_eq!(config.tool("pdftotext").command, "/usr/local/bin/pdftotext");
        assert_eq!(config.timeouts, TimeoutConfig::default());
        assert_eq!(config.summary.max_chars, 4000);
    }

    #[test]
    fn test_parse_empty_document() {
        let config = ExtractConfig::from_yaml("").unwrap();
        assert!(config.tools.is_empty());
        assert_eq!(config.summary.max_chars, 4000);
    }

    #[test]
    fn test_parse_timeouts_and_summary() {
        let yaml = r#"
timeouts:
  document: 30s
  media: 10m
summary:
  max_chars: 1000
  command:
    command: fabric
    args: ["--pattern", "summarize"]
"#;

        let config = ExtractConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.timeouts.document.as_duration(), Duration::from_secs(30));
        assert_eq!(config.timeouts.media.as_duration(), Duration::from_secs(600));
        // Unspecified timeouts keep their defaults
        assert_eq!(config.timeouts.probe.as_duration(), Duration::from_secs(2));
        assert_eq!(config.summary.max_chars, 1000);
        let summarizer = config.summary.command.unwrap();
        assert_eq!(summarizer.command, "fabric");
        assert_eq!(summarizer.args, vec!["--pattern", "summarize"]);
    }

    #[test]
    fn test_parse_with_env_vars() {
        std::env::set_var("SB_TEST_PANDOC", "/tmp/pandoc");

        let yaml = r#"
tools:
  pandoc:
    command: ${SB_TEST_PANDOC}
"#;

        let config = ExtractConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.tool("pandoc").command, "/tmp/pandoc");
    }

    #[test]
    fn test_parse_invalid_duration() {
        let yaml = r#"
timeouts:
  document: soon
"#;
        assert!(matches!(
            ExtractConfig::from_yaml(yaml),
            Err(ConfigError::YamlError(_))
        ));
    }

    #[test]
    fn test_parse_overflowing_duration() {
        let yaml = "timeouts:\n  media: 9999999999999999h\n";
        match ExtractConfig::from_yaml(yaml) {
            Err(ConfigError::YamlError(e)) => assert!(e.to_string().contains("out of range")),
            other => panic!("Expected YamlError, got {:?}", other),
        }
    }

    #[test]
    fn test_from_file() {
        let dir = std::env::temp_dir().join(format!("sb-config-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("extract.yaml");
        std::fs::write(&path, "summary:\n  max_chars: 12\n").unwrap();

        let config = ExtractConfig::from_file(&path).unwrap();
        assert_eq!(config.summary.max_chars, 12);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_from_file_missing() {
        let result = ExtractConfig::from_file(Path::new("/nonexistent/sb/extract.yaml"));
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }
}
