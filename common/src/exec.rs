//! Shared external-command runner for probes and scanners.

use std::time::Duration;

use tokio::process::Command;
use tracing::debug;

/// Captured outcome of one external command. Failure (non-zero exit, spawn
/// error, timeout) is represented here, never raised.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub ok: bool,
    pub output: String,
}

/// Runs a whitespace-split command line, capturing stdout and stderr.
///
/// A timeout elapsing counts as a failed command with a descriptive output,
/// consistent with the failure-is-data policy of probe execution.
pub async fn run_command(command_line: &str, timeout: Option<Duration>) -> CommandOutput {
    let mut parts = command_line.split_whitespace();
    let Some(program) = parts.next() else {
        return CommandOutput {
            ok: false,
            output: "empty command line".into(),
        };
    };

    debug!("executing: {command_line}");
    let mut command = Command::new(program);
    command.args(parts);

    let result = match timeout {
        Some(limit) => match tokio::time::timeout(limit, command.output()).await {
            Ok(result) => result,
            Err(_) => {
                return CommandOutput {
                    ok: false,
                    output: format!("command timed out after {}s", limit.as_secs()),
                };
            }
        },
        None => command.output().await,
    };

    match result {
        Ok(out) => {
            let mut text = String::from_utf8_lossy(&out.stdout).into_owned();
            text.push_str(&String::from_utf8_lossy(&out.stderr));
            CommandOutput {
                ok: out.status.success(),
                output: text,
            }
        }
        Err(e) => CommandOutput {
            ok: false,
            output: format!("failed to spawn '{program}': {e}"),
        },
    }
}
