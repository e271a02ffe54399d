use crate::types::{ExtractConfig, ResolvedTool, ToolConfig};

/// Every external tool the extraction subsystem knows, with the arguments
/// of its trivial detection invocation.
pub const KNOWN_TOOLS: &[(&str, &[&str])] = &[
    ("pdftotext", &["-v"]),
    ("ps2txt", &["--version"]),
    ("pandoc", &["--version"]),
    ("ffprobe", &["-version"]),
    ("ffmpeg", &["-version"]),
];

/// Default probe arguments for a known tool id.
pub fn default_probe_args(id: &str) -> Option<Vec<String>> {
    KNOWN_TOOLS
        .iter()
        .find(|(name, _)| *name == id)
        .map(|(_, args)| args.iter().map(|a| a.to_string()).collect())
}

impl ExtractConfig {
    /// Apply default inference rules to the configuration.
    /// This mutates the config in place.
    pub fn apply_defaults(&mut self) {
        for (id, _) in KNOWN_TOOLS {
            self.tools.entry(id.to_string()).or_default();
        }

        for (id, tool) in &mut self.tools {
            if tool.command.is_none() {
                tool.command = Some(id.clone());
            }
            if tool.probe_args.is_none() {
                tool.probe_args = Some(default_probe_args(id).unwrap_or_default());
            }
        }
    }

    /// Returns a new config with all defaults applied.
    pub fn effective(&self) -> ExtractConfig {
        let mut config = self.clone();
        config.apply_defaults();
        config
    }

    /// Resolve a tool id to its command line, whether or not defaults were applied.
    pub fn tool(&self, id: &str) -> ResolvedTool {
        let configured = self.tools.get(id).cloned().unwrap_or_else(ToolConfig::default);
        ResolvedTool {
            command: configured.command.unwrap_or_else(|| id.to_string()),
            probe_args: configured
                .probe_args
                .or_else(|| default_probe_args(id))
                .unwrap_or_default(),
        }
    }
}
