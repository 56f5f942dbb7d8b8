use thiserror::Error;

/// Errors surfaced by workspace operations.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("Projects directory is not configured")]
    Configuration,

    #[error("{0} not found")]
    NotFound(String),

    #[error("Project {0} already exists")]
    Conflict(String),

    #[error("No project selected")]
    SessionRequired,

    #[error("Invalid project name: {0:?}")]
    InvalidName(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = WorkspaceError> = std::result::Result<T, E>;
