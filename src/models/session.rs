use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// The project currently targeted by generation.
///
/// While a session is held by the store, `path` names an existing
/// directory: deleting the project clears the session and renaming it moves
/// the session along in the same locked step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveSession {
    pub name: String,
    pub path: PathBuf,
}

/// Result of selecting a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Selection {
    pub session: ActiveSession,
    /// Whether the project already has a generated page.
    pub has_artifact: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectProjectResponse {
    pub message: String,
    pub current_project: ActiveSession,
    pub has_html: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExitSessionResponse {
    pub message: String,
    pub current_project: Option<ActiveSession>,
}
