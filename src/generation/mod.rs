//! Page generation: build the generator command, run it in the active
//! project, and record the prompt when a page comes out.

mod command;
mod executor;

pub use command::CommandBuilder;
pub use executor::{CommandRunner, ProcessExecutor, WorkerPool};

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use crate::error::Result;
use crate::models::{GenerationOutcome, ARTIFACT_FILE};
use crate::platform::PlatformAdapter;
use crate::store::ProjectStore;

/// Runs generation requests against the store's active project.
#[derive(Clone)]
pub struct GenerationOrchestrator {
    store: ProjectStore,
    platform: Arc<PlatformAdapter>,
    workers: WorkerPool,
    tool: String,
}

impl GenerationOrchestrator {
    pub fn new(
        store: ProjectStore,
        platform: Arc<PlatformAdapter>,
        workers: WorkerPool,
        tool: impl Into<String>,
    ) -> Self {
        Self {
            store,
            platform,
            workers,
            tool: tool.into(),
        }
    }

    /// Generate a page for `prompt` in the active project.
    ///
    /// Fails only when no project is active. A run counts as successful when
    /// `index.html` exists after the tool exits; the exit status is ignored.
    /// On success the prompt is appended to the ledger, and a ledger failure
    /// is reported as a warning without touching `success`.
    pub async fn generate(&self, prompt: &str) -> Result<GenerationOutcome> {
        let session = self.store.require_active()?;

        let program = self
            .platform
            .locate_tool(&self.tool)
            .await
            .program_or(&self.tool);
        let program = self.platform.shell().quote_program(&program);
        let command = CommandBuilder::new(program).build(prompt);

        let before = artifact_mtime(&session.path.join(ARTIFACT_FILE));

        tracing::info!("Generating page for project {}", session.name);
        let raw_output = self.workers.run(command, session.path.clone()).await;

        let project_dir = self.project_dir_after_run(&session.path);
        let artifact = project_dir.join(ARTIFACT_FILE);
        if !artifact.is_file() {
            tracing::info!("Generation for {} produced no {}", session.name, ARTIFACT_FILE);
            return Ok(GenerationOutcome::failed(raw_output, Vec::new()));
        }

        let mut warnings = Vec::new();

        if before.is_some() && before == artifact_mtime(&artifact) {
            tracing::warn!(
                "{} in {} was not modified by this run",
                ARTIFACT_FILE,
                session.name
            );
            warnings.push(format!("{} was not modified by this run", ARTIFACT_FILE));
        }

        match self.store.ledger().append(&project_dir, prompt) {
            Ok(record) => {
                tracing::debug!("Recorded prompt #{} for {}", record.sequence, session.name)
            }
            Err(e) => {
                tracing::warn!("Failed to record prompt for {}: {}", session.name, e);
                warnings.push(format!("Prompt history not updated: {}", e));
            }
        }

        tracing::info!("Generated page for project {}", session.name);
        Ok(GenerationOutcome::succeeded(raw_output, warnings))
    }

    /// Where the project lives once the tool has exited. A rename during the
    /// run moves the directory and the session together.
    fn project_dir_after_run(&self, started_in: &Path) -> PathBuf {
        if started_in.is_dir() {
            return started_in.to_path_buf();
        }
        match self.store.active() {
            Some(current) => {
                tracing::info!("Project moved to {} during generation", current.path.display());
                current.path
            }
            None => started_in.to_path_buf(),
        }
    }
}

fn artifact_mtime(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}
