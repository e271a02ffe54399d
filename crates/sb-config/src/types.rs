use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Top-level configuration for the extraction subsystem.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// External tools keyed by tool id (`pdftotext`, `pandoc`, ...).
    #[serde(default)]
    pub tools: IndexMap<String, ToolConfig>,

    /// Per call-class timeouts.
    #[serde(default)]
    pub timeouts: TimeoutConfig,

    /// Summarizer input handling.
    #[serde(default)]
    pub summary: SummaryConfig,
}

/// How to invoke one external tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Executable name or absolute path. Defaults to the tool id.
    #[serde(default)]
    pub command: Option<String>,

    /// Arguments for the trivial invocation used to detect the tool.
    #[serde(default)]
    pub probe_args: Option<Vec<String>>,
}

/// A tool with every default filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTool {
    pub command: String,
    pub probe_args: Vec<String>,
}

/// Timeouts, one per call class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Capability probes (`--version` style invocations).
    pub probe: HumanDuration,
    /// Document converters.
    pub document: HumanDuration,
    /// Media duration queries.
    pub media_probe: HumanDuration,
    /// Media transcoding.
    pub media: HumanDuration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        TimeoutConfig {
            probe: HumanDuration(std::time::Duration::from_secs(2)),
            document: HumanDuration(std::time::Duration::from_secs(60)),
            media_probe: HumanDuration(std::time::Duration::from_secs(10)),
            media: HumanDuration(std::time::Duration::from_secs(300)),
        }
    }
}

/// Summarizer input settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Character budget for text handed to the summarizer.
    pub max_chars: usize,
    /// External summarizer command. The staged input path is appended to `args`.
    pub command: Option<SummarizerCommand>,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        SummaryConfig {
            max_chars: 4000,
            command: None,
        }
    }
}

/// External summarizer invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarizerCommand {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// Overrides `timeouts.media` as the bound for a summarization call.
    #[serde(default)]
    pub timeout: Option<HumanDuration>,
}

/// Human-readable duration (e.g., "200ms", "5m", "1h").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HumanDuration(pub std::time::Duration);

impl Default for HumanDuration {
    fn default() -> Self {
        HumanDuration(std::time::Duration::from_secs(0))
    }
}

impl HumanDuration {
    pub fn as_duration(&self) -> std::time::Duration {
        self.0
    }
}

impl From<std::time::Duration> for HumanDuration {
    fn from(d: std::time::Duration) -> Self {
        HumanDuration(d)
    }
}

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();

        let (num_str, unit) = if let Some(n) = s.strip_suffix("ms") {
            (n, "ms")
        } else if let Some(n) = s.strip_suffix('s') {
            (n, "s")
        } else if let Some(n) = s.strip_suffix('m') {
            (n, "m")
        } else if let Some(n) = s.strip_suffix('h') {
            (n, "h")
        } else {
            return Err(format!("Invalid duration format: {}", s));
        };

        let num: u64 = num_str
            .trim()
            .parse()
            .map_err(|_| format!("Invalid number in duration: {}", s))?;

        let duration = match unit {
            "ms" => std::time::Duration::from_millis(num),
            "s" => std::time::Duration::from_secs(num),
            "m" => std::time::Duration::from_secs(scaled(num, 60, &s)?),
            "h" => std::time::Duration::from_secs(scaled(num, 3600, &s)?),
            _ => return Err(format!("Unknown duration unit: {}", unit)),
        };

        Ok(HumanDuration(duration))
    }
}

fn scaled(num: u64, factor: u64, s: &str) -> Result<u64, String> {
    num.checked_mul(factor)
        .ok_or_else(|| format!("Duration out of range: {}", s))
}

impl fmt::Display for HumanDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let millis = self.0.as_millis();
        let secs = self.0.as_secs();

        // Only collapse to a coarser unit when nothing is lost.
        if millis % 1000 != 0 {
            write!(f, "{}ms", millis)
        } else if secs % 3600 == 0 && secs > 0 {
            write!(f, "{}h", secs / 3600)
        } else if secs % 60 == 0 && secs > 0 {
            write!(f, "{}m", secs / 60)
        } else {
            write!(f, "{}s", secs)
        }
    }
}

impl Serialize for HumanDuration {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for HumanDuration {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        HumanDuration::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_human_duration_parsing() {
        assert_eq!(
            HumanDuration::from_str("200ms").unwrap().as_duration(),
            Duration::from_millis(200)
        );
        assert_eq!(
            HumanDuration::from_str("2s").unwrap().as_duration(),
            Duration::from_secs(2)
        );
        assert_eq!(
            HumanDuration::from_str("5m").unwrap().as_duration(),
            Duration::from_secs(300)
        );
        assert_eq!(
            HumanDuration::from_str("1h").unwrap().as_duration(),
            Duration::from_secs(3600)
        );
    }

    #[test]
    fn test_human_duration_rejects_garbage() {
        assert!(HumanDuration::from_str("fast").is_err());
        assert!(HumanDuration::from_str("10").is_err());
        assert!(HumanDuration::from_str("xs").is_err());
    }

    #[test]
    fn test_human_duration_overflow_is_an_error() {
        let err = HumanDuration::from_str("9999999999999999h").unwrap_err();
        assert!(err.contains("out of range"));
        assert!(HumanDuration::from_str("999999999999999999m").is_err());
        assert_eq!(
            HumanDuration::from_str("5124095576030431h").unwrap().as_duration(),
            Duration::from_secs(5124095576030431 * 3600)
        );
    }

    #[test]
    fn test_human_duration_display_is_lossless() {
        assert_eq!(HumanDuration(Duration::from_millis(1500)).to_string(), "1500ms");
        assert_eq!(HumanDuration(Duration::from_secs(90)).to_string(), "90s");
        assert_eq!(HumanDuration(Duration::from_secs(300)).to_string(), "5m");
        assert_eq!(HumanDuration(Duration::from_secs(7200)).to_string(), "2h");
        assert_eq!(HumanDuration(Duration::ZERO).to_string(), "0s");
    }

    #[test]
    fn test_default_timeouts() {
        let t = TimeoutConfig::default();
        assert_eq!(t.probe.as_duration(), Duration::from_secs(2));
        assert_eq!(t.document.as_duration(), Duration::from_secs(60));
        assert_eq!(t.media.as_duration(), Duration::from_secs(300));
    }
}
