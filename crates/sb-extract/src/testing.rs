//! Test doubles for the capability and invocation seams.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::capability::Capabilities;
use crate::error::AttemptFailure;
use crate::guard::Invoker;
use crate::tool::{Tool, ToolCall, ToolOutput};

/// Capabilities fixed up front.
pub struct FakeCapabilities {
    available: HashSet<Tool>,
}

impl FakeCapabilities {
    pub fn with(tools: &[Tool]) -> Self {
        FakeCapabilities {
            available: tools.iter().copied().collect(),
        }
    }

    pub fn none() -> Self {
        Self::with(&[])
    }
}

#[async_trait]
impl Capabilities for FakeCapabilities {
    async fn available(&self, tool: Tool) -> bool {
        self.available.contains(&tool)
    }
}

/// Invoker answering from a script keyed by call name, recording every call.
/// Unscripted calls fail to spawn.
#[derive(Default)]
pub struct ScriptedInvoker {
    responses: HashMap<String, Result<ToolOutput, AttemptFailure>>,
    calls: Mutex<Vec<ToolCall>>,
}

impl ScriptedInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn succeed(mut self, name: &str, stdout: &str) -> Self {
        self.responses.insert(
            name.to_string(),
            Ok(ToolOutput {
                stdout: stdout.to_string(),
                stderr: String::new(),
            }),
        );
        self
    }

    pub fn fail(mut self, name: &str, failure: AttemptFailure) -> Self {
        self.responses.insert(name.to_string(), Err(failure));
        self
    }

    pub fn calls(&self) -> Vec<ToolCall> {
        self.calls.lock().clone()
    }

    pub fn calls_for(&self, name: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.name == name).count()
    }
}

#[async_trait]
impl Invoker for ScriptedInvoker {
    async fn invoke(&self, call: &ToolCall) -> Result<ToolOutput, AttemptFailure> {
        self.calls.lock().push(call.clone());
        self.responses
            .get(&call.name)
            .cloned()
            .unwrap_or_else(|| Err(AttemptFailure::Spawn(format!("{}: not scripted", call.program))))
    }
}
