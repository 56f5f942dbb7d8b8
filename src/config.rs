//! Server configuration loaded from `config.json` and environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Default generator executable.
pub const DEFAULT_TOOL: &str = "opencode";

/// Workspace configuration.
///
/// Every field has a default, so an empty JSON object (or no file at all) is
/// a valid configuration. Without `projects_dir` the server runs but every
/// project operation reports a configuration error.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Root directory holding one sub-directory per project.
    pub projects_dir: Option<PathBuf>,
    /// Generator executable name or path.
    pub tool: String,
    /// Upper bound on generator processes running at once.
    pub max_concurrent_generations: usize,
    /// Bound on the one-time `PATH` lookup of the generator.
    pub tool_lookup_timeout_secs: u64,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            projects_dir: None,
            tool: DEFAULT_TOOL.to_string(),
            max_concurrent_generations: 2,
            tool_lookup_timeout_secs: 5,
        }
    }
}

impl WorkspaceConfig {
    /// Read `path` if it exists, otherwise start from defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let mut config: Self = serde_json::from_str(content)?;
        config.projects_dir = config.projects_dir.map(native_path);
        Ok(config)
    }

    /// Apply `PAGECRAFT_PROJECTS_DIR` and `PAGECRAFT_TOOL` on top of the file values.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(dir) = std::env::var_os("PAGECRAFT_PROJECTS_DIR").filter(|v| !v.is_empty()) {
            self.projects_dir = Some(native_path(PathBuf::from(dir)));
        }
        if let Ok(tool) = std::env::var("PAGECRAFT_TOOL") {
            if !tool.trim().is_empty() {
                self.tool = tool.trim().to_string();
            }
        }
        self
    }

    pub fn tool_lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_lookup_timeout_secs)
    }
}

/// Relative paths written with Windows separators are rewritten with `/`.
/// Absolute paths are kept as given.
fn native_path(path: PathBuf) -> PathBuf {
    if path.is_absolute() || cfg!(windows) {
        return path;
    }
    match path.to_str() {
        Some(s) if s.contains('\\') => PathBuf::from(s.replace('\\', "/")),
        _ => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_uses_defaults() {
        let config = WorkspaceConfig::from_json("{}").unwrap();
        assert!(config.projects_dir.is_none());
        assert_eq!(config.tool, "opencode");
        assert_eq!(config.max_concurrent_generations, 2);
        assert_eq!(config.tool_lookup_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn reads_projects_dir() {
        let config = WorkspaceConfig::from_json(r#"{"projects_dir": "/srv/projects"}"#).unwrap();
        assert_eq!(config.projects_dir, Some(PathBuf::from("/srv/projects")));
    }

    #[cfg(unix)]
    #[test]
    fn converts_relative_windows_separators() {
        let config = WorkspaceConfig::from_json(r#"{"projects_dir": "..\\projects"}"#).unwrap();
        assert_eq!(config.projects_dir, Some(PathBuf::from("../projects")));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(WorkspaceConfig::from_json("{ not json").is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = WorkspaceConfig::load(&dir.path().join("config.json")).unwrap();
        assert!(config.projects_dir.is_none());
    }

    #[test]
    fn loads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"projects_dir": "/ws", "tool": "gen"}"#).unwrap();

        let config = WorkspaceConfig::load(&path).unwrap();

        assert_eq!(config.projects_dir, Some(PathBuf::from("/ws")));
        assert_eq!(config.tool, "gen");
    }
}
