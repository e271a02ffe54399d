//! Tool-driven extractors: a specialized tool first, the universal
//! converter as the safety net.

use async_trait::async_trait;

use super::{ExtractedText, TextExtractor, Toolbox};
use crate::error::ExtractError;
use crate::fallback::FallbackChain;
use crate::router::Strategy;
use crate::source::SourceFile;
use crate::tool::{Tool, ToolCall};

/// `pandoc <file> -t plain --wrap=none`
fn universal_call(toolbox: &Toolbox, source: &SourceFile) -> ToolCall {
    toolbox
        .document_call(Tool::Pandoc)
        .arg(source.path())
        .args(["-t", "plain", "--wrap=none"])
}

/// PDF: layout-preserving `pdftotext`, then the universal converter.
pub struct PdfExtractor;

impl PdfExtractor {
    pub fn new() -> Self {
        PdfExtractor
    }

    pub fn chain(toolbox: &Toolbox, source: &SourceFile) -> FallbackChain<String> {
        let layout = toolbox
            .document_call(Tool::PdfToText)
            .arg("-layout")
            .arg(source.path())
            .arg("-");

        FallbackChain::new(Strategy::Pdf.formats())
            .then(Tool::PdfToText, layout)
            .then(Tool::Pandoc, universal_call(toolbox, source))
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextExtractor for PdfExtractor {
    async fn extract(
        &self,
        source: &SourceFile,
        toolbox: &Toolbox,
    ) -> Result<ExtractedText, ExtractError> {
        let resolved = toolbox.run(&Self::chain(toolbox, source)).await?;
        Ok(resolved.into())
    }

    fn strategy(&self) -> Strategy {
        Strategy::Pdf
    }

    fn name(&self) -> &'static str {
        "pdf"
    }
}

/// PostScript/EPS: `ps2txt`, then the universal converter.
pub struct PostScriptExtractor;

impl PostScriptExtractor {
    pub fn new() -> Self {
        PostScriptExtractor
    }

    pub fn chain(toolbox: &Toolbox, source: &SourceFile) -> FallbackChain<String> {
        let ps2txt = toolbox.document_call(Tool::Ps2Txt).arg(source.path());

        FallbackChain::new(Strategy::PostScript.formats())
            .then(Tool::Ps2Txt, ps2txt)
            .then(Tool::Pandoc, universal_call(toolbox, source))
    }
}

impl Default for PostScriptExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextExtractor for PostScriptExtractor {
    async fn extract(
        &self,
        source: &SourceFile,
        toolbox: &Toolbox,
    ) -> Result<ExtractedText, ExtractError> {
        let resolved = toolbox.run(&Self::chain(toolbox, source)).await?;
        Ok(resolved.into())
    }

    fn strategy(&self) -> Strategy {
        Strategy::PostScript
    }

    fn name(&self) -> &'static str {
        "postscript"
    }
}

/// Office, OpenOffice, e-book and rich-text formats via the universal
/// converter alone.
pub struct UniversalExtractor;

impl UniversalExtractor {
    pub fn new() -> Self {
        UniversalExtractor
    }

    pub fn chain(toolbox: &Toolbox, source: &SourceFile) -> FallbackChain<String> {
        FallbackChain::new(Strategy::UniversalConvert.formats())
            .then(Tool::Pandoc, universal_call(toolbox, source))
    }
}

impl Default for UniversalExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextExtractor for UniversalExtractor {
    async fn extract(
        &self,
        source: &SourceFile,
        toolbox: &Toolbox,
    ) -> Result<ExtractedText, ExtractError> {
        let resolved = toolbox.run(&Self::chain(toolbox, source)).await?;
        Ok(resolved.into())
    }

    fn strategy(&self) -> Strategy {
        Strategy::UniversalConvert
    }

    fn name(&self) -> &'static str {
        "universal-convert"
    }
}
