//! Media Prober/Extractor: duration probing and mono 16 kHz audio extraction.

use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::error::{AttemptFailure, ExtractError};
use crate::extractors::Toolbox;
use crate::fallback::FallbackChain;
use crate::router::Strategy;
use crate::source::SourceFile;
use crate::tool::{Tool, ToolOutput};

/// Sample rate of extracted audio, in Hz.
pub const AUDIO_SAMPLE_RATE: u32 = 16_000;

/// Both media operations need the full toolkit.
const MEDIA_TOOLKIT: [Tool; 2] = [Tool::FfProbe, Tool::FfMpeg];

/// Timing metadata for one media file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MediaProbe {
    pub duration_seconds: f64,
}

impl MediaProbe {
    /// The plain-text metadata block written for media notes.
    pub fn describe(&self, source: &SourceFile) -> String {
        format!(
            "Media file: {}\nType: .{}\nDuration: {:.1} seconds",
            source.file_name(),
            source.extension(),
            self.duration_seconds
        )
    }
}

/// Interpret the prober's output as a non-negative number of seconds.
/// Empty, `N/A` and other non-numeric output is rejected, never read as zero.
pub fn parse_duration(output: ToolOutput) -> Result<f64, AttemptFailure> {
    let raw = output.stdout.trim();
    match raw.parse::<f64>() {
        Ok(seconds) if seconds.is_finite() && seconds >= 0.0 => Ok(seconds),
        _ => Err(AttemptFailure::Malformed(format!(
            "expected duration in seconds, got {:?}",
            raw
        ))),
    }
}

fn no_output(_: ToolOutput) -> Result<(), AttemptFailure> {
    Ok(())
}

/// Drives the media prober and transcoder. There is no fallback converter:
/// without both tools every operation fails with `ToolUnavailable`.
pub struct MediaExtractor;

impl MediaExtractor {
    pub fn new() -> Self {
        MediaExtractor
    }

    async fn require_toolkit(&self, toolbox: &Toolbox) -> Result<(), ExtractError> {
        for tool in MEDIA_TOOLKIT {
            if !toolbox.available(tool).await {
                return Err(ExtractError::ToolUnavailable {
                    tools: MEDIA_TOOLKIT.iter().map(|t| t.id().to_string()).collect(),
                    formats: Strategy::MediaDuration.formats(),
                });
            }
        }
        Ok(())
    }

    pub async fn probe_duration(
        &self,
        source: &SourceFile,
        toolbox: &Toolbox,
    ) -> Result<MediaProbe, ExtractError> {
        self.require_toolkit(toolbox).await?;

        let call = toolbox
            .call(Tool::FfProbe, toolbox.timeouts.media_probe)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(source.path());

        let chain = FallbackChain::new(Strategy::MediaDuration.formats()).candidate(
            Tool::FfProbe,
            call,
            parse_duration,
        );
        let resolved = toolbox.run(&chain).await?;

        Ok(MediaProbe {
            duration_seconds: resolved.value,
        })
    }

    /// Transcode to mono audio at [`AUDIO_SAMPLE_RATE`], overwriting `output`.
    pub async fn extract_audio(
        &self,
        source: &SourceFile,
        output: &Path,
        toolbox: &Toolbox,
    ) -> Result<(), ExtractError> {
        self.require_toolkit(toolbox).await?;

        let call = toolbox
            .call(Tool::FfMpeg, toolbox.timeouts.media)
            .arg("-y")
            .arg("-i")
            .arg(source.path())
            .args(["-vn", "-ar"])
            .arg(AUDIO_SAMPLE_RATE.to_string())
            .args(["-ac", "1"])
            .arg(output);

        let chain = FallbackChain::new(Strategy::MediaAudioExtract.formats()).candidate(
            Tool::FfMpeg,
            call,
            no_output,
        );
        toolbox.run(&chain).await?;

        info!(
            "Extracted audio from {} to {}",
            source.path().display(),
            output.display()
        );
        Ok(())
    }
}

impl Default for MediaExtractor {
    fn default() -> Self {
        Self::new()
    }
}
