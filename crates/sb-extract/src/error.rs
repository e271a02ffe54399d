use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

/// Why a single tool invocation did not produce usable output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum AttemptFailure {
    /// The capability registry reported the tool as absent; it was not run.
    #[error("not available")]
    Unavailable,

    /// The process could not be started.
    #[error("failed to start: {0}")]
    Spawn(String),

    /// Reading the process output failed.
    #[error("I/O error: {0}")]
    Io(String),

    /// The process exceeded its bound and was killed.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// The process exited unsuccessfully.
    #[error("{}", describe_exit(.code, .stderr))]
    ExitStatus { code: Option<i32>, stderr: String },

    /// The process succeeded but its output could not be interpreted.
    #[error("malformed output: {0}")]
    Malformed(String),
}

fn describe_exit(code: &Option<i32>, stderr: &str) -> String {
    let status = match code {
        Some(code) => format!("exited with status {}", code),
        None => "terminated by signal".to_string(),
    };
    if stderr.is_empty() {
        status
    } else {
        format!("{}: {}", status, stderr)
    }
}

/// Record of one candidate tool during a single extraction call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolAttempt {
    pub tool: String,
    pub invoked: bool,
    pub succeeded: bool,
    pub diagnostic: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<AttemptFailure>,
}

impl ToolAttempt {
    pub fn skipped(tool: impl Into<String>) -> Self {
        ToolAttempt {
            tool: tool.into(),
            invoked: false,
            succeeded: false,
            diagnostic: AttemptFailure::Unavailable.to_string(),
            failure: Some(AttemptFailure::Unavailable),
        }
    }

    pub fn failed(tool: impl Into<String>, failure: AttemptFailure) -> Self {
        ToolAttempt {
            tool: tool.into(),
            invoked: true,
            succeeded: false,
            diagnostic: failure.to_string(),
            failure: Some(failure),
        }
    }

    pub fn succeeded(tool: impl Into<String>) -> Self {
        ToolAttempt {
            tool: tool.into(),
            invoked: true,
            succeeded: true,
            diagnostic: "ok".to_string(),
            failure: None,
        }
    }

    pub fn timed_out(&self) -> bool {
        matches!(self.failure, Some(AttemptFailure::Timeout(_)))
    }
}

/// Errors that can occur during content extraction.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ExtractError {
    /// Input path does not exist.
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Extension is not in any known group.
    #[error(
        "Unsupported file format: .{0}. Supported: {supported}",
        supported = crate::router::supported_extensions().join(", ")
    )]
    UnsupportedFormat(String),

    /// No candidate tool for the strategy is installed.
    #[error("No tool available for {}: install one of {}", .formats.join(", "), .tools.join(", "))]
    ToolUnavailable {
        tools: Vec<String>,
        formats: Vec<String>,
    },

    /// At least one tool ran, and every attempt failed.
    #[error("Extraction failed: {}", describe_attempts(.attempts))]
    ExtractionFailed { attempts: Vec<ToolAttempt> },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),
}

fn describe_attempts(attempts: &[ToolAttempt]) -> String {
    attempts
        .iter()
        .map(|a| format!("{}: {}", a.tool, a.diagnostic))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ExtractError {
    /// True when the failure is "nothing installed" rather than "installed but broken".
    pub fn is_missing_tooling(&self) -> bool {
        matches!(self, ExtractError::ToolUnavailable { .. })
    }

    /// Per-attempt diagnostics, in order, for `ExtractionFailed`.
    pub fn attempts(&self) -> &[ToolAttempt] {
        match self {
            ExtractError::ExtractionFailed { attempts } => attempts,
            _ => &[],
        }
    }

    /// True if any attempt was terminated by its timeout.
    pub fn timed_out(&self) -> bool {
        self.attempts().iter().any(ToolAttempt::timed_out)
    }

    pub(crate) fn single_failure(tool: impl Into<String>, failure: AttemptFailure) -> Self {
        ExtractError::ExtractionFailed {
            attempts: vec![ToolAttempt::failed(tool, failure)],
        }
    }
}

impl From<sb_config::ConfigError> for ExtractError {
    fn from(e: sb_config::ConfigError) -> Self {
        ExtractError::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_status_display() {
        let failure = AttemptFailure::ExitStatus {
            code: Some(2),
            stderr: "Syntax Warning: bad xref".to_string(),
        };
        assert_eq!(
            failure.to_string(),
            "exited with status 2: Syntax Warning: bad xref"
        );

        let killed = AttemptFailure::ExitStatus {
            code: None,
            stderr: String::new(),
        };
        assert_eq!(killed.to_string(), "terminated by signal");
    }

    #[test]
    fn test_extraction_failed_lists_attempts_in_order() {
        let err = ExtractError::ExtractionFailed {
            attempts: vec![
                ToolAttempt::failed(
                    "pdftotext",
                    AttemptFailure::Timeout(Duration::from_secs(60)),
                ),
                ToolAttempt::failed(
                    "pandoc",
                    AttemptFailure::ExitStatus {
                        code: Some(64),
                        stderr: "unknown reader".to_string(),
                    },
                ),
            ],
        };

        let msg = err.to_string();
        let first = msg.find("pdftotext").unwrap();
        let second = msg.find("pandoc").unwrap();
        assert!(first < second);
        assert!(msg.contains("timed out"));
        assert!(err.timed_out());
        assert!(!err.is_missing_tooling());
    }

    #[test]
    fn test_tool_unavailable_display() {
        let err = ExtractError::ToolUnavailable {
            tools: vec!["pdftotext".to_string(), "pandoc".to_string()],
            formats: vec![".pdf".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("pdftotext, pandoc"));
        assert!(msg.contains(".pdf"));
        assert!(err.is_missing_tooling());
        assert!(err.attempts().is_empty());
    }

    #[test]
    fn test_unsupported_format_lists_supported_extensions() {
        let msg = ExtractError::UnsupportedFormat("png".to_string()).to_string();
        assert!(msg.starts_with("Unsupported file format: .png. Supported: "));
        for ext in [".pdf", ".docx", ".csv", ".md", ".mp3", ".mkv"] {
            assert!(msg.contains(ext), "{} missing from {}", ext, msg);
        }
    }

    #[test]
    fn test_skipped_attempt() {
        let attempt = ToolAttempt::skipped("ps2txt");
        assert!(!attempt.invoked);
        assert!(!attempt.succeeded);
        assert_eq!(attempt.diagnostic, "not available");
        assert!(!attempt.timed_out());
    }

    #[test]
    fn test_from_config_error() {
        let err: ExtractError =
            sb_config::ConfigError::InvalidConfig("bad config".to_string()).into();
        assert!(matches!(err, ExtractError::Config(msg) if msg.contains("bad config")));
    }

    #[test]
    fn test_attempt_serializes_for_reports() {
        let attempt = ToolAttempt::failed(
            "pandoc",
            AttemptFailure::ExitStatus {
                code: Some(1),
                stderr: "x".to_string(),
            },
        );
        let json = serde_json::to_value(&attempt).unwrap();
        assert_eq!(json["tool"], "pandoc");
        assert_eq!(json["invoked"], true);
        assert_eq!(json["failure"]["kind"], "exit_status");
        assert_eq!(json["failure"]["detail"]["code"], 1);

        let skipped = serde_json::to_value(ToolAttempt::skipped("ps2txt")).unwrap();
        assert_eq!(skipped["failure"]["kind"], "unavailable");

        let ok = serde_json::to_value(ToolAttempt::succeeded("ps2txt")).unwrap();
        assert!(ok.get("failure").is_none());
    }
}
