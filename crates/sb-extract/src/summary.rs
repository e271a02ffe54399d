//! Preparing extracted text for the external summarizer.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sb_config::ExtractConfig;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::AttemptFailure;
use crate::guard::{Invoker, ProcessGuard};
use crate::tool::ToolCall;

/// Appended to text cut at the character budget.
pub const TRUNCATION_LABEL: &str = "\n\n[... truncated ...]";

/// Summarizer input bounded to a character budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryInput {
    text: String,
    truncated: bool,
}

impl SummaryInput {
    /// Keep at most `max_chars` characters (not bytes). Cut text is labeled.
    pub fn prepare(text: &str, max_chars: usize) -> Self {
        match text.char_indices().nth(max_chars) {
            None => SummaryInput {
                text: text.to_string(),
                truncated: false,
            },
            Some((cut, _)) => SummaryInput {
                text: format!("{}{}", &text[..cut], TRUNCATION_LABEL),
                truncated: true,
            },
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn truncated(&self) -> bool {
        self.truncated
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

/// Text written to a temporary `.txt` file that is removed on drop.
pub struct StagedText {
    file: NamedTempFile,
}

impl StagedText {
    pub fn write(text: &str) -> std::io::Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("sb-stage-")
            .suffix(".txt")
            .tempfile()?;
        file.write_all(text.as_bytes())?;
        file.flush()?;
        Ok(StagedText { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    #[error("Failed to stage summarizer input: {0}")]
    Staging(#[from] std::io::Error),

    #[error("Summarizer failed: {0}")]
    Failed(AttemptFailure),

    #[error("Summarizer returned empty output")]
    Empty,
}

/// Opaque collaborator: text in, summary or failure out.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str) -> Result<String, SummaryError>;
}

/// Runs an external command on a staged copy of the text. The staged path
/// is appended to the configured arguments; trimmed stdout is the summary.
pub struct CommandSummarizer {
    program: String,
    args: Vec<String>,
    timeout: Duration,
    invoker: Arc<dyn Invoker>,
}

impl CommandSummarizer {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        CommandSummarizer {
            program: program.into(),
            args,
            timeout,
            invoker: Arc::new(ProcessGuard::new()),
        }
    }

    /// `None` when no summarizer command is configured.
    pub fn from_config(config: &ExtractConfig) -> Option<Self> {
        let command = config.summary.command.as_ref()?;
        let timeout = command
            .timeout
            .as_ref()
            .unwrap_or(&config.timeouts.media)
            .as_duration();
        Some(Self::new(&command.command, command.args.clone(), timeout))
    }

    pub fn with_invoker(mut self, invoker: Arc<dyn Invoker>) -> Self {
        self.invoker = invoker;
        self
    }
}

#[async_trait]
impl Summarizer for CommandSummarizer {
    async fn summarize(&self, text: &str) -> Result<String, SummaryError> {
        let staged = StagedText::write(text)?;
        let call = ToolCall::new("summarizer", &self.program, self.timeout)
            .args(&self.args)
            .arg(staged.path());

        let output = self
            .invoker
            .invoke(&call)
            .await
            .map_err(SummaryError::Failed)?;

        let summary = output.stdout.trim();
        if summary.is_empty() {
            return Err(SummaryError::Empty);
        }
        debug!("Summarized {} chars into {}", text.len(), summary.len());
        Ok(summary.to_string())
    }
}

/// Where a [`SummaryResult`]'s text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SummarySource {
    Summarizer,
    RawContent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryResult {
    pub text: String,
    pub source: SummarySource,
    /// The summarizer input was cut at the character budget.
    pub truncated: bool,
}

/// Summarize `text` bounded to `max_chars`. On failure or empty output the
/// bounded (and labeled, if cut) raw content is returned instead.
pub async fn summarize_or_fallback(
    summarizer: &dyn Summarizer,
    text: &str,
    max_chars: usize,
) -> SummaryResult {
    let input = SummaryInput::prepare(text, max_chars);
    let truncated = input.truncated();

    match summarizer.summarize(input.text()).await {
        Ok(summary) if !summary.trim().is_empty() => SummaryResult {
            text: summary,
            source: SummarySource::Summarizer,
            truncated,
        },
        Ok(_) => {
            warn!("Summarizer returned empty output, using raw content");
            SummaryResult {
                text: input.into_text(),
                source: SummarySource::RawContent,
                truncated,
            }
        }
        Err(e) => {
            warn!("Summarizer failed, using raw content: {}", e);
            SummaryResult {
                text: input.into_text(),
                source: SummarySource::RawContent,
                truncated,
            }
        }
    }
}
