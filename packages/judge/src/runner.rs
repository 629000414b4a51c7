use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::fs;
use tokio::process::Command;
use uuid::Uuid;

use crate::error::SandboxError;
use crate::harness;

/// Resource budget for one guest execution.
#[derive(Clone, Copy, Debug)]
pub struct RunLimits {
    /// Hard wall-clock limit per test case. The guest process is killed
    /// when it expires.
    pub wall_time: Duration,
}

impl Default for RunLimits {
    fn default() -> Self {
        Self {
            wall_time: Duration::from_millis(1000),
        }
    }
}

impl RunLimits {
    pub fn from_millis(ms: u64) -> Self {
        Self {
            wall_time: Duration::from_millis(ms),
        }
    }
}

/// Completed guest execution. A non-zero exit code is a fault of the
/// submitted code, not of the sandbox.
#[derive(Clone, Debug)]
pub struct Execution {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

impl Execution {
    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Executes one piece of submitted code against one test input.
#[async_trait]
pub trait CodeRunner: Send + Sync {
    async fn run(
        &self,
        source: &str,
        input: &str,
        limits: &RunLimits,
    ) -> Result<Execution, SandboxError>;
}

/// Runs JavaScript submissions in a separate `node` process.
///
/// Isolation is the process boundary: the guest gets its own address space,
/// piped stdio and nothing else from the host. `kill_on_drop` guarantees
/// the child dies with the timeout future, so a spinning submission cannot
/// outlive its budget.
#[derive(Debug, Clone)]
pub struct NodeRunner {
    node_bin: String,
}

impl NodeRunner {
    pub fn new(node_bin: impl Into<String>) -> Self {
        Self {
            node_bin: node_bin.into(),
        }
    }
}

impl Default for NodeRunner {
    fn default() -> Self {
        Self::new("node")
    }
}

#[async_trait]
impl CodeRunner for NodeRunner {
    async fn run(
        &self,
        source: &str,
        input: &str,
        limits: &RunLimits,
    ) -> Result<Execution, SandboxError> {
        let script = harness::wrap(source);
        let script_path = std::env::temp_dir().join(format!("sprout-judge-{}.js", Uuid::new_v4()));

        fs::write(&script_path, &script).await.map_err(|err| {
            SandboxError::Initialization(format!("failed to write guest script: {err}"))
        })?;

        let mut command = Command::new(&self.node_bin);
        command
            .arg(&script_path)
            .arg(input)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = command.spawn().map_err(|err| {
            SandboxError::Initialization(format!("failed to spawn {}: {err}", self.node_bin))
        });

        let child = match child {
            Ok(c) => c,
            Err(e) => {
                let _ = fs::remove_file(&script_path).await;
                return Err(e);
            }
        };

        let waited = tokio::time::timeout(limits.wall_time, child.wait_with_output()).await;

        let _ = fs::remove_file(&script_path).await;

        match waited {
            Err(_elapsed) => Err(SandboxError::Timeout(limits.wall_time.as_millis() as u64)),
            Ok(Err(err)) => Err(SandboxError::Execution(format!(
                "failed to collect guest output: {err}"
            ))),
            Ok(Ok(output)) => Ok(Execution {
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                exit_code: output.status.code(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires a node binary on PATH"]
    async fn node_runner_executes_a_trivial_solution() {
        let runner = NodeRunner::default();
        let exec = runner
            .run(
                "function solution(a) { return a[0] + a[1]; }",
                "[5,10]",
                &RunLimits::default(),
            )
            .await
            .unwrap();
        assert!(exec.succeeded(), "stderr: {}", exec.stderr);
        assert_eq!(exec.stdout.trim_end(), "15");
    }

    #[tokio::test]
    #[ignore = "requires a node binary on PATH"]
    async fn node_runner_kills_an_infinite_loop() {
        let runner = NodeRunner::default();
        let result = runner
            .run(
                "function solution() { for (;;) {} }",
                "null",
                &RunLimits::from_millis(200),
            )
            .await;
        assert!(matches!(result, Err(SandboxError::Timeout(200))));
    }
}
