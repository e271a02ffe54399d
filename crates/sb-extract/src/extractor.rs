use std::path::{Path, PathBuf};
use std::sync::Arc;

use sb_config::ExtractConfig;
use serde::Serialize;
use tracing::debug;

use crate::capability::{Capabilities, CapabilityRegistry};
use crate::error::ExtractError;
use crate::extractors::{create_extractors, ExtractedText, TextExtractor, Toolbox};
use crate::guard::{Invoker, ProcessGuard};
use crate::media::{MediaExtractor, MediaProbe};
use crate::router::{route, Strategy};
use crate::source::SourceFile;
use crate::summary::{summarize_or_fallback, Summarizer, SummaryResult};
use crate::tool::{Timeouts, ToolCommands};

/// Outcome of [`ContentExtractor::extract`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Extraction {
    Text(ExtractedText),
    Media(MediaProbe),
}

/// Entry point: path in, text or media timing out.
///
/// Holds one capability registry for its lifetime, so each tool is probed
/// at most once however many files go through it. Safe to share across
/// tasks behind an `Arc`.
pub struct ContentExtractor {
    toolbox: Toolbox,
    extractors: Vec<Arc<dyn TextExtractor>>,
    media: MediaExtractor,
    max_chars: usize,
}

impl ContentExtractor {
    /// Real processes, real probing.
    pub fn new(config: &ExtractConfig) -> Self {
        let invoker: Arc<dyn Invoker> = Arc::new(ProcessGuard::new());
        let registry = Arc::new(CapabilityRegistry::with_invoker(config, invoker.clone()));
        Self::from_parts(config, registry, invoker)
    }

    /// Inject the capability and invocation seams.
    pub fn from_parts(
        config: &ExtractConfig,
        capabilities: Arc<dyn Capabilities>,
        invoker: Arc<dyn Invoker>,
    ) -> Self {
        let toolbox = Toolbox::new(
            capabilities,
            invoker,
            ToolCommands::from_config(config),
            Timeouts::from(&config.timeouts),
        );

        ContentExtractor {
            toolbox,
            extractors: create_extractors(),
            media: MediaExtractor::new(),
            max_chars: config.summary.max_chars,
        }
    }

    pub fn capabilities(&self) -> &Arc<dyn Capabilities> {
        &self.toolbox.capabilities
    }

    /// Documents yield text; media files yield their duration.
    pub async fn extract(&self, path: impl AsRef<Path>) -> Result<Extraction, ExtractError> {
        let source = SourceFile::open(path)?;
        let strategy = route(source.extension())?;

        if strategy.is_media() {
            let probe = self.media.probe_duration(&source, &self.toolbox).await?;
            return Ok(Extraction::Media(probe));
        }
        self.extract_document(&source, strategy)
            .await
            .map(Extraction::Text)
    }

    /// Like [`extract`](Self::extract) but only for documents; media files are
    /// rejected as `UnsupportedFormat`.
    pub async fn extract_text(&self, path: impl AsRef<Path>) -> Result<ExtractedText, ExtractError> {
        let source = SourceFile::open(path)?;
        let strategy = route(source.extension())?;
        self.extract_document(&source, strategy).await
    }

    pub async fn probe_duration(&self, path: impl AsRef<Path>) -> Result<MediaProbe, ExtractError> {
        let source = self.open_media(path)?;
        self.media.probe_duration(&source, &self.toolbox).await
    }

    /// Transcode to mono 16 kHz audio at `output`, overwriting it.
    pub async fn extract_audio(
        &self,
        path: impl AsRef<Path>,
        output: impl AsRef<Path>,
    ) -> Result<(), ExtractError> {
        let source = self.open_media(path)?;
        self.media
            .extract_audio(&source, output.as_ref(), &self.toolbox)
            .await
    }

    /// Extract audio next to the input as `<stem>.wav` and return that path.
    /// A `.wav` input gets `<stem>-16k.wav` so the source is never overwritten.
    pub async fn extract_audio_default(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<PathBuf, ExtractError> {
        let source = self.open_media(path)?;
        let output = default_audio_output(&source);
        self.media
            .extract_audio(&source, &output, &self.toolbox)
            .await?;
        Ok(output)
    }

    /// Summarize extracted text within the configured character budget,
    /// falling back to the labeled raw content.
    pub async fn summarize(&self, summarizer: &dyn Summarizer, text: &str) -> SummaryResult {
        summarize_or_fallback(summarizer, text, self.max_chars).await
    }

    fn open_media(&self, path: impl AsRef<Path>) -> Result<SourceFile, ExtractError> {
        let source = SourceFile::open(path)?;
        if !route(source.extension())?.is_media() {
            return Err(ExtractError::UnsupportedFormat(source.extension().to_string()));
        }
        Ok(source)
    }

    async fn extract_document(
        &self,
        source: &SourceFile,
        strategy: Strategy,
    ) -> Result<ExtractedText, ExtractError> {
        let extractor = self
            .extractors
            .iter()
            .find(|e| e.strategy() == strategy)
            .ok_or_else(|| ExtractError::UnsupportedFormat(source.extension().to_string()))?;

        let text = extractor.extract(source, &self.toolbox).await?;
        debug!(
            "Extracted {} bytes from {} via {}",
            text.content.len(),
            source.path().display(),
            text.produced_by
        );
        Ok(text)
    }
}

fn default_audio_output(source: &SourceFile) -> PathBuf {
    let output = source.path().with_extension("wav");
    if output != source.path() {
        return output;
    }
    let stem = source
        .path()
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    source.path().with_file_name(format!("{}-16k.wav", stem))
}
