//! Running generator commands off the request path.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::platform::{OutputEncoding, Shell};

/// Executes a command string in a directory and returns everything it printed.
///
/// Implementations block; [`WorkerPool`] moves them off the async runtime.
/// They never fail: problems are reported inside the returned text.
pub trait CommandRunner: Send + Sync {
    fn run(&self, command: &str, working_dir: &Path) -> String;
}

/// Runs commands through the platform shell.
#[derive(Debug, Clone, Copy)]
pub struct ProcessExecutor {
    shell: Shell,
    encoding: OutputEncoding,
}

impl ProcessExecutor {
    pub fn new(shell: Shell) -> Self {
        Self {
            shell,
            encoding: shell.encoding(),
        }
    }

    fn execute(&self, command: &str, working_dir: &Path) -> std::io::Result<String> {
        let output = self
            .shell
            .command(command)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .output()?;

        tracing::debug!(
            "{} exited with {}",
            self.shell.wrap(command).chars().take(80).collect::<String>(),
            output.status
        );

        let mut text = self.encoding.decode(&output.stdout);
        text.push_str(&self.encoding.decode(&output.stderr));
        Ok(text)
    }
}

impl CommandRunner for ProcessExecutor {
    fn run(&self, command: &str, working_dir: &Path) -> String {
        self.execute(command, working_dir).unwrap_or_else(|e| {
            tracing::warn!("Failed to launch command in {}: {}", working_dir.display(), e);
            format!("Error: {}", e)
        })
    }
}

/// Bounded pool that runs a [`CommandRunner`] on tokio's blocking threads.
///
/// At most `max_concurrent` commands run at once; further callers wait for a
/// permit. There is no timeout: a command that hangs holds its permit.
#[derive(Clone)]
pub struct WorkerPool {
    runner: Arc<dyn CommandRunner>,
    permits: Arc<Semaphore>,
}

impl WorkerPool {
    pub fn new(runner: Arc<dyn CommandRunner>, max_concurrent: usize) -> Self {
        Self {
            runner,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    /// Run `command` in `working_dir` and wait for its output.
    pub async fn run(&self, command: String, working_dir: PathBuf) -> String {
        let _permit = match self.permits.acquire().await {
            Ok(permit) => permit,
            Err(e) => return format!("Error: {}", e),
        };

        let runner = Arc::clone(&self.runner);
        tokio::task::spawn_blocking(move || runner.run(&command, &working_dir))
            .await
            .unwrap_or_else(|e| {
                tracing::error!("Generation worker failed: {}", e);
                format!("Error: {}", e)
            })
    }
}
