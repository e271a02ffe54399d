//! Content extraction for the second-brain ingest pipeline.
//!
//! Turns a document into plain text, or a media file into timing metadata
//! and normalized audio, using optional external tools with ordered
//! fallbacks.

pub mod capability;
pub mod error;
pub mod extractor;
pub mod extractors;
pub mod fallback;
pub mod guard;
pub mod media;
pub mod router;
pub mod source;
pub mod summary;
pub mod tool;

#[cfg(test)]
mod testing;

pub use capability::{Capabilities, CapabilityRegistry, CapabilityStatus};
pub use error::{AttemptFailure, ExtractError, ToolAttempt};
pub use extractor::{ContentExtractor, Extraction};
pub use extractors::{create_extractors, ExtractedText, TextExtractor, Toolbox};
pub use fallback::{FallbackChain, Resolved};
pub use guard::{Invoker, ProcessGuard};
pub use media::{MediaExtractor, MediaProbe};
pub use router::{is_document, is_media, is_supported, route, supported_extensions, Strategy};
pub use source::SourceFile;
pub use summary::{
    summarize_or_fallback, CommandSummarizer, StagedText, Summarizer, SummaryError, SummaryInput,
    SummaryResult, SummarySource, TRUNCATION_LABEL,
};
pub use tool::{Timeouts, Tool, ToolCall, ToolCommands, ToolOutput};

pub use sb_config::ExtractConfig;
