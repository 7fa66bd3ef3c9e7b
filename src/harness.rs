//! Challenge Test Harness Invoker
//!
//! Runs a challenge's own test command against a staged contract and
//! returns what it printed. Grading is entirely the harness' job: a failing
//! test run is a normal result, only a run that produced nothing on stdout
//! and exited non-zero is treated as a harness failure.
//!
//! Each run gets its own process group. When the run times out, or the
//! caller stops waiting for it, the whole group is killed, so test runners
//! started by the command (`yarn` -> `node` -> `forge`) go down with it.

use crate::config::HarnessConfig;
use crate::error::{Result, SubmissionError};
use crate::workspace::StagedFile;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Environment variable the challenge test suites read the target from
pub const CONTRACT_PATH_ENV: &str = "CONTRACT_PATH";

/// Captured output of one harness run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarnessResult {
    pub stdout: String,
    pub stderr: String,
}

/// Runs challenge test suites
#[derive(Debug, Clone)]
pub struct HarnessInvoker {
    config: HarnessConfig,
}

impl HarnessInvoker {
    pub fn new(config: HarnessConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// `<file>:<symbol>` target passed to the harness
    pub fn contract_target(staged: &StagedFile, contract_file_name: &str) -> String {
        format!("{}:{}", staged.file_name, contract_symbol(contract_file_name))
    }

    /// Run the test command from the challenge directory.
    ///
    /// Every process of the run is killed if it outlives `timeout_secs` or
    /// if the returned future is dropped.
    pub async fn invoke(
        &self,
        staged: &StagedFile,
        contract_file_name: &str,
    ) -> Result<HarnessResult> {
        let target = Self::contract_target(staged, contract_file_name);
        let command_line = self.config.command_line();
        let start = Instant::now();

        info!(
            dir = %staged.challenge_dir.display(),
            target = %target,
            "Testing challenge submission"
        );

        let mut command = Command::new("sh");
        command
            .arg("-c")
            .arg(&command_line)
            .current_dir(&staged.challenge_dir)
            .env(CONTRACT_PATH_ENV, &target)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        command.process_group(0);

        let child = command
            .spawn()
            .map_err(|e| SubmissionError::HarnessExecutionError {
                exit_code: None,
                stderr: format!("failed to spawn `{}`: {}", command_line, e),
            })?;
        let _group = ProcessGroupGuard { pgid: child.id() };

        let timeout = Duration::from_secs(self.config.timeout_secs);
        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(SubmissionError::HarnessExecutionError {
                    exit_code: None,
                    stderr: format!("failed to wait for `{}`: {}", command_line, e),
                })
            }
            Err(_) => {
                warn!(target = %target, "Test harness timed out, killing process group");
                return Err(SubmissionError::Timeout {
                    stage: "Test harness",
                    secs: self.config.timeout_secs,
                });
            }
        };

        let result = HarnessResult {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        let exit_code = output.status.code();

        debug!(
            exit_code = ?exit_code,
            duration_ms = start.elapsed().as_millis() as u64,
            stdout_bytes = result.stdout.len(),
            stderr_bytes = result.stderr.len(),
            "Test harness finished"
        );

        if !output.status.success() && result.stdout.trim().is_empty() {
            return Err(SubmissionError::HarnessExecutionError {
                exit_code,
                stderr: result.stderr,
            });
        }

        Ok(result)
    }
}

/// Kills the process group led by the harness shell on drop.
///
/// Runs on every exit path of `invoke`, also after a normal exit, so
/// background processes the test command left behind are reaped too.
struct ProcessGroupGuard {
    pgid: Option<u32>,
}

impl Drop for ProcessGroupGuard {
    fn drop(&mut self) {
        if let Some(pgid) = self.pgid.take() {
            kill_process_group(pgid);
        }
    }
}

#[cfg(unix)]
fn kill_process_group(pgid: u32) {
    let Ok(pgid) = libc::pid_t::try_from(pgid) else {
        return;
    };
    // SAFETY: killpg takes no pointers; a group that already exited yields ESRCH
    let rc = unsafe { libc::killpg(pgid, libc::SIGKILL) };
    if rc != 0 {
        let err = std::io::Error::last_os_error();
        if err.raw_os_error() != Some(libc::ESRCH) {
            warn!(pgid, error = %err, "Failed to kill test harness process group");
        }
    } else {
        debug!(pgid, "Killed test harness process group");
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pgid: u32) {}

/// Contract symbol for a file name: `YourToken.sol` -> `YourToken`
pub fn contract_symbol(contract_file_name: &str) -> &str {
    Path::new(contract_file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(contract_file_name)
}
