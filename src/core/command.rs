// src/core/command.rs

use crate::core::error::ProducerFailure;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

/// Captured output of one external tool invocation.
#[derive(Debug)]
pub struct CapturedOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
}

/// Spawns an external tool and captures its output under a hard timeout.
///
/// A missing executable maps to `ToolNotFound` and an elapsed timeout to
/// `Timeout`; in the timeout case the child is killed (`kill_on_drop`), so a
/// hung scanner cannot outlive its slot in the worker pool.
pub async fn run_capture(
    program: &str,
    args: &[String],
    limit: Duration,
) -> Result<CapturedOutput, ProducerFailure> {
    debug!(program, ?args, "Spawning external tool.");
    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn();

    let child = match child {
        Ok(child) => child,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ProducerFailure::ToolNotFound);
        }
        Err(e) => return Err(ProducerFailure::Upstream(e.to_string())),
    };

    let output = match timeout(limit, child.wait_with_output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => return Err(ProducerFailure::Upstream(e.to_string())),
        Err(_) => return Err(ProducerFailure::Timeout),
    };

    Ok(CapturedOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        success: output.status.success(),
    })
}

/// Checks whether an executable with the given name is present on `PATH`.
pub fn binary_on_path(name: &str) -> bool {
    let Some(path) = std::env::var_os("PATH") else {
        return false;
    };
    std::env::split_paths(&path).any(|dir| {
        let candidate = dir.join(name);
        candidate.is_file()
    })
}
