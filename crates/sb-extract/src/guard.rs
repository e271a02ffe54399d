//! Bounded, normalized execution of external tools.

use std::io;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tracing::debug;

use crate::error::AttemptFailure;
use crate::extractors::plaintext::decode_text;
use crate::tool::{ToolCall, ToolOutput};

/// Runs a [`ToolCall`]. Implementations never expose raw process semantics:
/// a call either yields captured output or an [`AttemptFailure`].
#[async_trait]
pub trait Invoker: Send + Sync {
    async fn invoke(&self, call: &ToolCall) -> Result<ToolOutput, AttemptFailure>;
}

/// Invoker that spawns real processes with a per-call timeout.
///
/// Both output streams are captured while the child runs. On Unix the child
/// leads its own process group; a call that outlives its timeout has the
/// whole group killed and the child reaped before
/// [`AttemptFailure::Timeout`] is returned.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessGuard;

impl ProcessGuard {
    pub fn new() -> Self {
        ProcessGuard
    }
}

async fn read_stream<R: AsyncRead + Unpin>(stream: Option<R>) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut stream) = stream {
        stream.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

/// Kill the process group led by `group` (wrappers that fork their worker
/// included), then kill and reap the child itself. The group id is taken at
/// spawn: once the child is reaped `Child::id` is gone, but its workers may
/// still hold the pipes open.
async fn terminate(child: &mut Child, group: Option<u32>) {
    #[cfg(unix)]
    {
        if let Some(pgid) = group {
            // SAFETY: plain signal delivery to the group created at spawn.
            unsafe {
                libc::killpg(pgid as libc::pid_t, libc::SIGKILL);
            }
        }
    }
    #[cfg(not(unix))]
    let _ = group;
    if let Err(e) = child.kill().await {
        debug!("Failed to reap timed out child: {}", e);
    }
}

#[async_trait]
impl Invoker for ProcessGuard {
    async fn invoke(&self, call: &ToolCall) -> Result<ToolOutput, AttemptFailure> {
        let mut command = Command::new(&call.program);
        command
            .args(&call.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        {
            command.process_group(0);
        }

        let mut child = command
            .spawn()
            .map_err(|e| AttemptFailure::Spawn(format!("{}: {}", call.program, e)))?;

        let group = child.id();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let finished = {
            let run = async {
                let (status, stdout, stderr) =
                    tokio::join!(child.wait(), read_stream(stdout), read_stream(stderr));
                Ok::<_, io::Error>((status?, stdout?, stderr?))
            };
            tokio::time::timeout(call.timeout, run).await
        };

        let (status, stdout, stderr) = match finished {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                terminate(&mut child, group).await;
                return Err(AttemptFailure::Io(e.to_string()));
            }
            Err(_) => {
                terminate(&mut child, group).await;
                debug!("{} exceeded {:?}, killed", call.name, call.timeout);
                return Err(AttemptFailure::Timeout(call.timeout));
            }
        };

        let stderr = String::from_utf8_lossy(&stderr).trim().to_string();

        if !status.success() {
            return Err(AttemptFailure::ExitStatus {
                code: status.code(),
                stderr,
            });
        }

        let (stdout, _) = decode_text(&stdout);
        Ok(ToolOutput { stdout, stderr })
    }
}
