use crate::defaults::KNOWN_TOOLS;
use crate::types::ExtractConfig;
use crate::ConfigError;

impl ExtractConfig {
    /// Validate the configuration and return a list of errors.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        for (id, tool) in &self.tools {
            if !KNOWN_TOOLS.iter().any(|(name, _)| name == id) {
                errors.push(ConfigError::UnknownTool(id.clone()));
            }
            if let Some(ref command) = tool.command {
                if command.trim().is_empty() {
                    errors.push(ConfigError::InvalidConfig(format!(
                        "Tool '{}' has an empty command",
                        id
                    )));
                }
            }
        }

        let timeouts = [
            ("probe", &self.timeouts.probe),
            ("document", &self.timeouts.document),
            ("media_probe", &self.timeouts.media_probe),
            ("media", &self.timeouts.media),
        ];
        for (name, value) in timeouts {
            if value.as_duration().is_zero() {
                errors.push(ConfigError::InvalidConfig(format!(
                    "Timeout '{}' must be greater than zero",
                    name
                )));
            }
        }

        if self.summary.max_chars == 0 {
            errors.push(ConfigError::InvalidConfig(
                "summary.max_chars must be greater than zero".to_string(),
            ));
        }

        if let Some(ref summarizer) = self.summary.command {
            if summarizer.command.trim().is_empty() {
                errors.push(ConfigError::InvalidConfig(
                    "summary.command.command must not be empty".to_string(),
                ));
            }
            if summarizer
                .timeout
                .as_ref()
                .is_some_and(|t| t.as_duration().is_zero())
            {
                errors.push(ConfigError::InvalidConfig(
                    "summary.command.timeout must be greater than zero".to_string(),
                ));
            }
        }

        errors
    }

    /// Validate and return Ok(()) if valid, or Err with the first error.
    pub fn validate_or_err(&self) -> Result<(), ConfigError> {
        match self.validate().into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
