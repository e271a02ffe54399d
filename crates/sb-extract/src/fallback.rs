//! Fallback Orchestrator: ordered tool candidates, first success wins.

use tracing::{debug, warn};

use crate::capability::Capabilities;
use crate::error::{AttemptFailure, ExtractError, ToolAttempt};
use crate::guard::Invoker;
use crate::tool::{Tool, ToolCall, ToolOutput};

/// Turns a successful invocation's output into a value, or rejects it.
pub type Interpret<T> = fn(ToolOutput) -> Result<T, AttemptFailure>;

/// One tool and the exact call to make if it is available.
pub struct Candidate<T> {
    pub tool: Tool,
    pub call: ToolCall,
    interpret: Interpret<T>,
}

/// The winning candidate's value plus the full attempt trail.
#[derive(Debug, Clone)]
pub struct Resolved<T> {
    pub value: T,
    pub produced_by: Tool,
    pub attempts: Vec<ToolAttempt>,
}

/// An ordered list of candidates for one input.
///
/// Unavailable tools are skipped. An available tool whose invocation fails
/// (or whose output is rejected) is logged and the next one is tried.
/// Exhaustion yields `ToolUnavailable` when nothing could be run, and
/// `ExtractionFailed` with every attempt in order otherwise.
pub struct FallbackChain<T> {
    candidates: Vec<Candidate<T>>,
    formats: Vec<String>,
}

impl<T> FallbackChain<T> {
    /// `formats` names what this chain would unblock, for `ToolUnavailable`.
    pub fn new<I, S>(formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FallbackChain {
            candidates: Vec::new(),
            formats: formats.into_iter().map(Into::into).collect(),
        }
    }

    pub fn candidate(mut self, tool: Tool, call: ToolCall, interpret: Interpret<T>) -> Self {
        self.candidates.push(Candidate {
            tool,
            call,
            interpret,
        });
        self
    }

    pub fn tools(&self) -> Vec<Tool> {
        self.candidates.iter().map(|c| c.tool).collect()
    }

    pub fn calls(&self) -> impl Iterator<Item = &ToolCall> {
        self.candidates.iter().map(|c| &c.call)
    }

    pub async fn run(
        &self,
        capabilities: &dyn Capabilities,
        invoker: &dyn Invoker,
    ) -> Result<Resolved<T>, ExtractError> {
        let mut attempts = Vec::with_capacity(self.candidates.len());

        for candidate in &self.candidates {
            let tool = candidate.tool;

            if !capabilities.available(tool).await {
                debug!("Skipping {}: not available", tool);
                attempts.push(ToolAttempt::skipped(tool.id()));
                continue;
            }

            match invoker
                .invoke(&candidate.call)
                .await
                .and_then(candidate.interpret)
            {
                Ok(value) => {
                    debug!("{} succeeded", tool);
                    attempts.push(ToolAttempt::succeeded(tool.id()));
                    return Ok(Resolved {
                        value,
                        produced_by: tool,
                        attempts,
                    });
                }
                Err(failure) => {
                    warn!("{} failed, trying next candidate: {}", tool, failure);
                    attempts.push(ToolAttempt::failed(tool.id(), failure));
                }
            }
        }

        if attempts.iter().any(|a| a.invoked) {
            Err(ExtractError::ExtractionFailed { attempts })
        } else {
            Err(ExtractError::ToolUnavailable {
                tools: self.tools().iter().map(|t| t.id().to_string()).collect(),
                formats: self.formats.clone(),
            })
        }
    }
}

impl FallbackChain<String> {
    /// Add a candidate whose stdout is the extracted text.
    pub fn then(self, tool: Tool, call: ToolCall) -> Self {
        self.candidate(tool, call, stdout_text)
    }
}

fn stdout_text(output: ToolOutput) -> Result<String, AttemptFailure> {
    Ok(output.stdout)
}
