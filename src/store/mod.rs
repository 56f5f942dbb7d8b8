mod ledger;

pub use ledger::PromptLedger;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use chrono::{DateTime, Local};

use crate::error::{Result, WorkspaceError};
use crate::models::*;

/// Projects under a root directory plus the active-session pointer.
///
/// Clones share the same session. Every operation that moves or removes a
/// directory holds the session lock across the file system call, so no caller
/// ever observes a session pointing at a directory that is gone.
#[derive(Debug, Clone)]
pub struct ProjectStore {
    root: Option<PathBuf>,
    session: Arc<Mutex<Option<ActiveSession>>>,
    ledger: PromptLedger,
}

impl ProjectStore {
    pub fn new(root: Option<PathBuf>) -> Self {
        Self {
            root,
            session: Arc::new(Mutex::new(None)),
            ledger: PromptLedger::new(),
        }
    }

    /// The configured root directory.
    pub fn root(&self) -> Result<&Path> {
        self.root.as_deref().ok_or(WorkspaceError::Configuration)
    }

    /// The ledger shared by everything holding this store.
    pub fn ledger(&self) -> &PromptLedger {
        &self.ledger
    }

    // ============================================================
    // Project operations
    // ============================================================

    /// All project directories, most recently modified first.
    ///
    /// An unset or missing root yields an empty list.
    pub fn list(&self) -> Vec<Project> {
        let Some(root) = self.root.as_deref() else {
            return Vec::new();
        };

        let entries = match fs::read_dir(root) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!("Cannot read projects directory {}: {}", root.display(), e);
                return Vec::new();
            }
        };

        let mut projects: Vec<Project> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| {
                let name = entry.file_name().to_str()?.to_string();
                let path = entry.path();
                Some(Project {
                    modified_at: modified_at(&path).into(),
                    has_artifact: path.join(ARTIFACT_FILE).is_file(),
                    name,
                    path,
                })
            })
            .collect();

        projects.sort_by(|a, b| {
            b.modified_at
                .cmp(&a.modified_at)
                .then_with(|| a.name.cmp(&b.name))
        });
        projects
    }

    pub fn create(&self, name: &str) -> Result<Project> {
        let root = self.root()?;
        let name = validate_name(name)?;
        let path = root.join(name);

        fs::create_dir_all(root)?;
        match fs::create_dir(&path) {
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(WorkspaceError::Conflict(name.to_string()));
            }
            result => result?,
        }
        tracing::info!("Created project {}", name);

        Ok(Project {
            name: name.to_string(),
            modified_at: modified_at(&path).into(),
            has_artifact: false,
            path,
        })
    }

    /// Make `name` the active project.
    pub fn select(&self, name: &str) -> Result<Selection> {
        let root = self.root()?;
        let name = validate_name(name)?;
        let path = root.join(name);

        if !path.is_dir() {
            return Err(project_not_found(name));
        }

        let session = ActiveSession {
            name: name.to_string(),
            path,
        };
        *self.session.lock().expect("session lock poisoned") = Some(session.clone());
        tracing::info!("Selected project {}", name);

        Ok(Selection {
            has_artifact: session.path.join(ARTIFACT_FILE).is_file(),
            session,
        })
    }

    /// Rename a project directory. The active session follows the rename.
    pub fn rename(&self, old: &str, new: &str) -> Result<RenameProjectResponse> {
        let root = self.root()?;
        let new = validate_name(new)?;
        let old = validate_name(old)?;
        let old_path = root.join(old);

        if !old_path.exists() {
            return Err(project_not_found(old));
        }

        if old == new {
            return Ok(RenameProjectResponse {
                message: "Name unchanged".to_string(),
                old_name: old.to_string(),
                new_name: new.to_string(),
            });
        }

        let new_path = root.join(new);
        if new_path.exists() {
            return Err(WorkspaceError::Conflict(new.to_string()));
        }

        let mut session = self.session.lock().expect("session lock poisoned");
        fs::rename(&old_path, &new_path)?;
        if let Some(active) = session.as_mut().filter(|s| s.name == old) {
            active.name = new.to_string();
            active.path = new_path;
            tracing::info!("Active project renamed to {}", new);
        }
        drop(session);

        Ok(RenameProjectResponse {
            message: format!("Project {} renamed to {}", old, new),
            old_name: old.to_string(),
            new_name: new.to_string(),
        })
    }

    /// Delete a project directory and everything in it.
    ///
    /// Deleting the active project ends the session first.
    pub fn delete(&self, name: &str) -> Result<()> {
        let root = self.root()?;
        let name = validate_name(name)?;
        let path = root.join(name);

        if !path.exists() {
            return Err(project_not_found(name));
        }

        let mut session = self.session.lock().expect("session lock poisoned");
        if session.as_ref().is_some_and(|s| s.name == name) {
            *session = None;
            tracing::info!("Cleared active session for deleted project {}", name);
        }
        fs::remove_dir_all(&path)?;
        drop(session);

        tracing::info!("Deleted project {}", name);
        Ok(())
    }

    /// End the active session, if any.
    pub fn exit(&self) {
        if let Some(previous) = self.session.lock().expect("session lock poisoned").take() {
            tracing::info!("Exited project {}", previous.name);
        }
    }

    pub fn active(&self) -> Option<ActiveSession> {
        self.session.lock().expect("session lock poisoned").clone()
    }

    pub fn require_active(&self) -> Result<ActiveSession> {
        self.active().ok_or(WorkspaceError::SessionRequired)
    }

    // ============================================================
    // Active project contents
    // ============================================================

    /// The generated page of the active project.
    pub fn artifact(&self) -> Result<Vec<u8>> {
        let session = self.require_active()?;
        let path = session.path.join(ARTIFACT_FILE);
        if !path.is_file() {
            return Err(WorkspaceError::NotFound(ARTIFACT_FILE.to_string()));
        }
        Ok(fs::read(path)?)
    }

    /// Prompt ledger lines of the active project.
    ///
    /// An unreadable ledger is logged and reported as empty.
    pub fn history(&self) -> Result<Vec<String>> {
        let session = self.require_active()?;
        Ok(PromptLedger::read(&session.path).unwrap_or_else(|e| {
            tracing::warn!("Failed to read prompt ledger of {}: {}", session.name, e);
            Vec::new()
        }))
    }

    /// Cards for every project except the active one, paginated.
    ///
    /// `page` is 1-based; values below 1 are clamped, as is `page_size`.
    pub fn list_others(&self, page: usize, page_size: usize) -> Result<ProjectPage> {
        let session = self.require_active()?;
        let root = self.root()?;
        let page = page.max(1);
        let page_size = page_size.max(1);

        let mut cards: Vec<(SystemTime, ProjectCard)> = match fs::read_dir(root) {
            Ok(entries) => entries
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.path().is_dir())
                .filter_map(|entry| {
                    let name = entry.file_name().to_str()?.to_string();
                    (name != session.name).then(|| project_card(name, &entry.path()))
                })
                .collect(),
            Err(e) => {
                tracing::debug!("Cannot read projects directory {}: {}", root.display(), e);
                Vec::new()
            }
        };

        cards.sort_by(|(a_time, a), (b_time, b)| {
            b_time.cmp(a_time).then_with(|| a.name.cmp(&b.name))
        });

        let total = cards.len();
        let projects = cards
            .into_iter()
            .map(|(_, card)| card)
            .skip((page - 1) * page_size)
            .take(page_size)
            .collect();

        Ok(ProjectPage {
            projects,
            total,
            page,
            page_size,
            total_pages: total.div_ceil(page_size),
            current_project: Some(session),
        })
    }

    // ============================================================
    // Thumbnails
    // ============================================================

    pub fn thumbnail(&self, name: &str) -> Result<Vec<u8>> {
        let root = self.root()?;
        let name = validate_name(name)?;
        let path = root.join(name).join(THUMBNAIL_FILE);
        if !path.is_file() {
            return Err(WorkspaceError::NotFound("Thumbnail".to_string()));
        }
        Ok(fs::read(path)?)
    }

    /// Store the preview image of the active project, replacing any previous one.
    pub fn store_thumbnail(&self, bytes: &[u8]) -> Result<PathBuf> {
        let session = self.require_active()?;
        let path = session.path.join(THUMBNAIL_FILE);
        fs::write(&path, bytes)?;
        tracing::info!("Saved thumbnail {}", path.display());
        Ok(path)
    }
}

/// Trim `name` and make sure it names a single directory directly under the root.
fn validate_name(name: &str) -> Result<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty()
        || trimmed == "."
        || trimmed == ".."
        || trimmed.contains(['/', '\\'])
    {
        return Err(WorkspaceError::InvalidName(name.to_string()));
    }
    Ok(trimmed)
}

fn project_not_found(name: &str) -> WorkspaceError {
    WorkspaceError::NotFound(format!("Project {}", name))
}

fn modified_at(path: &Path) -> SystemTime {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .unwrap_or(SystemTime::UNIX_EPOCH)
}

/// Contents of the first `[...]` group in `line`.
fn bracketed(line: &str) -> Option<&str> {
    let open = line.find('[')?;
    let close = open + line[open..].find(']')?;
    Some(line[open + 1..close].trim())
}

fn project_card(name: String, path: &Path) -> (SystemTime, ProjectCard) {
    let modified = fs::metadata(path).and_then(|m| m.modified());
    let created_time = match &modified {
        Ok(time) => DateTime::<Local>::from(*time).format("%Y-%m-%d").to_string(),
        Err(_) => "unknown".to_string(),
    };

    let (first_prompt, first_prompt_time) = match PromptLedger::first_entry(path) {
        Ok(Some(line)) => match PromptRecord::parse(&line) {
            Some(record) if record.text.is_empty() => {
                (Some("No description".to_string()), Some(record.timestamp))
            }
            Some(record) => (Some(record.text), Some(record.timestamp)),
            None => {
                let time = bracketed(&line).map(String::from);
                (Some(line), time)
            }
        },
        Ok(None) => (None, None),
        Err(e) => {
            tracing::warn!("Skipping prompt ledger of {}: {}", name, e);
            (None, None)
        }
    };

    let card = ProjectCard {
        has_html: path.join(ARTIFACT_FILE).is_file(),
        created_time,
        first_prompt,
        first_prompt_time,
        name,
    };
    (modified.unwrap_or(SystemTime::UNIX_EPOCH), card)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_name_trims_whitespace() {
        assert_eq!(validate_name("  demo ").unwrap(), "demo");
    }

    #[test]
    fn validate_name_rejects_path_escapes() {
        for bad in ["", "   ", ".", "..", "a/b", "..\\x", "/abs"] {
            assert!(
                matches!(validate_name(bad), Err(WorkspaceError::InvalidName(_))),
                "{bad:?} should be rejected"
            );
        }
    }
}
