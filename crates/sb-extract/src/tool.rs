use std::collections::HashMap;
use std::ffi::OsString;
use std::fmt;
use std::time::Duration;

use sb_config::{ExtractConfig, ResolvedTool, TimeoutConfig};
use serde::Serialize;

/// External tools the extraction subsystem can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Layout-preserving PDF tool (poppler).
    PdfToText,
    /// PostScript-to-text tool.
    Ps2Txt,
    /// Universal converter.
    Pandoc,
    /// Media prober.
    FfProbe,
    /// Media transcoder.
    FfMpeg,
}

impl Tool {
    pub const ALL: [Tool; 5] = [
        Tool::PdfToText,
        Tool::Ps2Txt,
        Tool::Pandoc,
        Tool::FfProbe,
        Tool::FfMpeg,
    ];

    /// Stable id, also the key used in the `tools:` config section.
    pub fn id(&self) -> &'static str {
        match self {
            Tool::PdfToText => "pdftotext",
            Tool::Ps2Txt => "ps2txt",
            Tool::Pandoc => "pandoc",
            Tool::FfProbe => "ffprobe",
            Tool::FfMpeg => "ffmpeg",
        }
    }

    pub fn from_id(id: &str) -> Option<Tool> {
        Tool::ALL.into_iter().find(|t| t.id() == id)
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// One external process invocation, fully described.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCall {
    /// Name reported in diagnostics.
    pub name: String,
    pub program: String,
    pub args: Vec<OsString>,
    pub timeout: Duration,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, program: impl Into<String>, timeout: Duration) -> Self {
        ToolCall {
            name: name.into(),
            program: program.into(),
            args: Vec::new(),
            timeout,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

/// Captured output of a successful invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Resolved command lines for every known tool.
#[derive(Debug, Clone)]
pub struct ToolCommands {
    resolved: HashMap<Tool, ResolvedTool>,
}

impl ToolCommands {
    pub fn from_config(config: &ExtractConfig) -> Self {
        let resolved = Tool::ALL
            .into_iter()
            .map(|tool| (tool, config.tool(tool.id())))
            .collect();
        ToolCommands { resolved }
    }

    pub fn command(&self, tool: Tool) -> &str {
        self.resolved
            .get(&tool)
            .map(|r| r.command.as_str())
            .unwrap_or(tool.id())
    }

    /// Start a call to `tool` with no arguments yet.
    pub fn call(&self, tool: Tool, timeout: Duration) -> ToolCall {
        ToolCall::new(tool.id(), self.command(tool), timeout)
    }

    /// The trivial invocation used to detect `tool`.
    pub fn probe_call(&self, tool: Tool, timeout: Duration) -> ToolCall {
        let args = self
            .resolved
            .get(&tool)
            .map(|r| r.probe_args.clone())
            .unwrap_or_default();
        self.call(tool, timeout).args(args)
    }
}

impl Default for ToolCommands {
    fn default() -> Self {
        Self::from_config(&ExtractConfig::default())
    }
}

/// Per call-class timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub probe: Duration,
    pub document: Duration,
    pub media_probe: Duration,
    pub media: Duration,
}

impl From<&TimeoutConfig> for Timeouts {
    fn from(config: &TimeoutConfig) -> Self {
        Timeouts {
            probe: config.probe.as_duration(),
            document: config.document.as_duration(),
            media_probe: config.media_probe.as_duration(),
            media: config.media.as_duration(),
        }
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Timeouts::from(&TimeoutConfig::default())
    }
}
