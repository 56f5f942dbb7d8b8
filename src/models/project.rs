use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::session::ActiveSession;

/// File name of the generated page inside a project directory.
pub const ARTIFACT_FILE: &str = "index.html";

/// File name of the prompt ledger inside a project directory.
pub const LEDGER_FILE: &str = "prompt.txt";

/// File name of the client-captured preview image inside a project directory.
pub const THUMBNAIL_FILE: &str = ".thumbnail.png";

/// A project directory under the workspace root.
///
/// The name is the directory name and is unique within the root. Projects
/// carry no metadata of their own; everything observable comes from the
/// file system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub path: PathBuf,
    /// Directory modification time.
    pub modified_at: DateTime<Utc>,
    /// Whether `index.html` exists in the directory.
    pub has_artifact: bool,
}

/// Input for creating a new project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProjectInput {
    pub name: String,
}

/// Input for renaming a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameProjectInput {
    pub new_name: String,
}

/// Project list as returned to the UI: names only, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectListResponse {
    pub projects: Vec<String>,
    pub current_project: Option<ActiveSession>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProjectResponse {
    pub message: String,
    pub project: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameProjectResponse {
    pub message: String,
    pub old_name: String,
    pub new_name: String,
}

/// Summary card for a project other than the active one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectCard {
    pub name: String,
    /// Modification date formatted as `YYYY-MM-DD`.
    pub created_time: String,
    pub has_html: bool,
    pub first_prompt: Option<String>,
    pub first_prompt_time: Option<String>,
}

/// One page of [`ProjectCard`]s.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectPage {
    pub projects: Vec<ProjectCard>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub current_project: Option<ActiveSession>,
}

/// Query parameters for the paginated project card listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectPageQuery {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}
