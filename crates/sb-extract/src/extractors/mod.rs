//! Primitive extractors, one per document strategy.

pub mod converter;
pub mod plaintext;
pub mod tabular;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::capability::Capabilities;
use crate::error::{ExtractError, ToolAttempt};
use crate::fallback::{FallbackChain, Resolved};
use crate::guard::Invoker;
use crate::router::Strategy;
use crate::source::SourceFile;
use crate::tool::{Timeouts, Tool, ToolCall, ToolCommands};

pub use converter::{PdfExtractor, PostScriptExtractor, UniversalExtractor};
pub use plaintext::{decode_text, PlainTextExtractor, TextEncoding};
pub use tabular::CsvExtractor;

/// Successful document extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedText {
    pub content: String,
    /// Tool id for tool-driven strategies, `plain-text`/`tabular` otherwise.
    pub produced_by: String,
    /// Every candidate considered before the winner, winner last.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attempts: Vec<ToolAttempt>,
}

impl ExtractedText {
    pub fn new(content: impl Into<String>, produced_by: impl Into<String>) -> Self {
        ExtractedText {
            content: content.into(),
            produced_by: produced_by.into(),
            attempts: Vec::new(),
        }
    }
}

impl From<Resolved<String>> for ExtractedText {
    fn from(resolved: Resolved<String>) -> Self {
        ExtractedText {
            content: resolved.value,
            produced_by: resolved.produced_by.id().to_string(),
            attempts: resolved.attempts,
        }
    }
}

/// Everything an extractor may use to reach external tools.
#[derive(Clone)]
pub struct Toolbox {
    pub capabilities: Arc<dyn Capabilities>,
    pub invoker: Arc<dyn Invoker>,
    pub commands: ToolCommands,
    pub timeouts: Timeouts,
}

impl Toolbox {
    pub fn new(
        capabilities: Arc<dyn Capabilities>,
        invoker: Arc<dyn Invoker>,
        commands: ToolCommands,
        timeouts: Timeouts,
    ) -> Self {
        Toolbox {
            capabilities,
            invoker,
            commands,
            timeouts,
        }
    }

    pub fn call(&self, tool: Tool, timeout: Duration) -> ToolCall {
        self.commands.call(tool, timeout)
    }

    /// A call to `tool` bounded by the document timeout.
    pub fn document_call(&self, tool: Tool) -> ToolCall {
        self.call(tool, self.timeouts.document)
    }

    pub async fn available(&self, tool: Tool) -> bool {
        self.capabilities.available(tool).await
    }

    pub async fn run<T>(&self, chain: &FallbackChain<T>) -> Result<Resolved<T>, ExtractError> {
        chain
            .run(self.capabilities.as_ref(), self.invoker.as_ref())
            .await
    }
}

/// Trait for document text extractors.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Extract plain text from `source`.
    async fn extract(
        &self,
        source: &SourceFile,
        toolbox: &Toolbox,
    ) -> Result<ExtractedText, ExtractError>;

    /// The strategy this extractor implements.
    fn strategy(&self) -> Strategy;

    /// Name of this extractor.
    fn name(&self) -> &'static str;
}

/// Create one extractor per document strategy.
pub fn create_extractors() -> Vec<Arc<dyn TextExtractor>> {
    vec![
        Arc::new(PlainTextExtractor::new()),
        Arc::new(CsvExtractor::new()),
        Arc::new(PdfExtractor::new()),
        Arc::new(PostScriptExtractor::new()),
        Arc::new(UniversalExtractor::new()),
    ]
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::testing::{FakeCapabilities, ScriptedInvoker};

    pub(crate) fn toolbox_with(caps: FakeCapabilities, invoker: Arc<ScriptedInvoker>) -> Toolbox {
        Toolbox::new(
            Arc::new(caps),
            invoker,
            ToolCommands::default(),
            Timeouts::default(),
        )
    }

    pub(crate) fn toolbox() -> Toolbox {
        toolbox_with(FakeCapabilities::none(), Arc::new(ScriptedInvoker::new()))
    }

    #[test]
    fn test_one_extractor_per_document_strategy() {
        let strategies: Vec<Strategy> = create_extractors().iter().map(|e| e.strategy()).collect();
        assert_eq!(
            strategies,
            vec![
                Strategy::PlainText,
                Strategy::Tabular,
                Strategy::Pdf,
                Strategy::PostScript,
                Strategy::UniversalConvert,
            ]
        );
    }

    #[test]
    fn test_document_call_uses_document_timeout() {
        let call = toolbox().document_call(Tool::Pandoc);
        assert_eq!(call.program, "pandoc");
        assert_eq!(call.timeout, Duration::from_secs(60));
        assert!(call.args.is_empty());
    }
}
