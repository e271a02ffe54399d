//! Capability Registry: which optional external tools can be invoked.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use sb_config::ExtractConfig;
use serde::Serialize;
use tracing::debug;

use crate::guard::{Invoker, ProcessGuard};
use crate::tool::{Timeouts, Tool, ToolCommands};

/// Answers "is this tool invocable here?".
#[async_trait]
pub trait Capabilities: Send + Sync {
    async fn available(&self, tool: Tool) -> bool;
}

/// One row of a capability report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilityStatus {
    pub tool: Tool,
    pub command: String,
    pub available: bool,
}

/// Probes each tool at most once per registry and memoizes the answer.
///
/// A probe is the tool's trivial version/help invocation under the probe
/// timeout. Any failure (missing binary, non-zero exit, timeout) means
/// unavailable. Concurrent first probes may both run; the first stored
/// answer wins and is never revised.
pub struct CapabilityRegistry {
    commands: ToolCommands,
    probe_timeout: Duration,
    invoker: Arc<dyn Invoker>,
    cache: RwLock<HashMap<Tool, bool>>,
}

impl CapabilityRegistry {
    pub fn new(config: &ExtractConfig) -> Self {
        Self::with_invoker(config, Arc::new(ProcessGuard::new()))
    }

    pub fn with_invoker(config: &ExtractConfig, invoker: Arc<dyn Invoker>) -> Self {
        CapabilityRegistry {
            commands: ToolCommands::from_config(config),
            probe_timeout: Timeouts::from(&config.timeouts).probe,
            invoker,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Seed the cache, skipping the probe for `tool`.
    pub fn with_known(self, tool: Tool, available: bool) -> Self {
        self.cache.write().insert(tool, available);
        self
    }

    /// The memoized answer, if `tool` has been probed.
    pub fn cached(&self, tool: Tool) -> Option<bool> {
        self.cache.read().get(&tool).copied()
    }

    /// Probe every known tool and list the results.
    pub async fn report(&self) -> Vec<CapabilityStatus> {
        let mut rows = Vec::with_capacity(Tool::ALL.len());
        for tool in Tool::ALL {
            rows.push(CapabilityStatus {
                tool,
                command: self.commands.command(tool).to_string(),
                available: self.available(tool).await,
            });
        }
        rows
    }

    async fn probe(&self, tool: Tool) -> bool {
        let call = self.commands.probe_call(tool, self.probe_timeout);
        match self.invoker.invoke(&call).await {
            Ok(_) => true,
            Err(failure) => {
                debug!("{} unavailable ({}): {}", tool, call.program, failure);
                false
            }
        }
    }
}

#[async_trait]
impl Capabilities for CapabilityRegistry {
    async fn available(&self, tool: Tool) -> bool {
        if let Some(available) = self.cached(tool) {
            return available;
        }

        let probed = self.probe(tool).await;
        let available = *self.cache.write().entry(tool).or_insert(probed);
        debug!("Capability {}: {}", tool, available);
        available
    }
}
