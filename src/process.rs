// ABOUTME: ProcessRunner - the seam between action tools and external processes.
// ABOUTME: SystemRunner spawns via tokio with a hard per-invocation timeout.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::ProcessError;

/// Captured outcome of one external process run.
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    /// Exit code, if the process exited normally.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    /// Whether the process exited with code zero.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs external processes on behalf of the action tools.
///
/// Every invocation carries an explicit ceiling; a hang in an external
/// tool surfaces as `ProcessError::TimedOut` instead of stalling the
/// mention loop forever.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(
        &self,
        program: &str,
        args: &[&str],
        cwd: Option<&Path>,
        timeout: Duration,
    ) -> Result<ProcessOutput, ProcessError>;
}

/// Spawns real processes with piped output.
pub struct SystemRunner;

#[async_trait]
impl ProcessRunner for SystemRunner {
    async fn run(
        &self,
        program: &str,
        args: &[&str],
        cwd: Option<&Path>,
        timeout: Duration,
    ) -> Result<ProcessOutput, ProcessError> {
        let mut cmd = tokio::process::Command::new(program);
        cmd.args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Dropping the output future on timeout must not orphan the child.
            .kill_on_drop(true);

        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }

        match tokio::time::timeout(timeout, cmd.output()).await {
            Ok(Ok(output)) => Ok(ProcessOutput {
                code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            }),
            Ok(Err(source)) => Err(ProcessError::Spawn {
                program: program.to_string(),
                source,
            }),
            Err(_) => Err(ProcessError::TimedOut {
                program: program.to_string(),
                seconds: timeout.as_secs(),
            }),
        }
    }
}

/// A recorded process invocation, for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// A runner that replays scripted outcomes and records every call.
    ///
    /// Panics when invoked with an empty script, so a test that expects
    /// zero spawns fails loudly if one happens.
    #[derive(Default)]
    pub struct ScriptedRunner {
        script: Mutex<VecDeque<Result<ProcessOutput, ProcessError>>>,
        calls: Mutex<Vec<RecordedCall>>,
    }

    impl ScriptedRunner {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push_exit(&self, code: i32, stdout: &str, stderr: &str) {
            self.script.lock().unwrap().push_back(Ok(ProcessOutput {
                code: Some(code),
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
            }));
        }

        pub fn push_timeout(&self, program: &str, seconds: u64) {
            self.script
                .lock()
                .unwrap()
                .push_back(Err(ProcessError::TimedOut {
                    program: program.to_string(),
                    seconds,
                }));
        }

        pub fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ProcessRunner for ScriptedRunner {
        async fn run(
            &self,
            program: &str,
            args: &[&str],
            cwd: Option<&Path>,
            _timeout: Duration,
        ) -> Result<ProcessOutput, ProcessError> {
            self.calls.lock().unwrap().push(RecordedCall {
                program: program.to_string(),
                args: args.iter().map(|a| a.to_string()).collect(),
                cwd: cwd.map(Path::to_path_buf),
            });

            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| panic!("unscripted process invocation: {} {:?}", program, args))
        }
    }
}
