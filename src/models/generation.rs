use serde::{Deserialize, Serialize};

/// URL at which the active project's generated page is served.
pub const ARTIFACT_URL: &str = "/api/html";

/// Input for a generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateInput {
    pub prompt: String,
}

/// Result of one generation run.
///
/// `success` is decided solely by the presence of `index.html` once the
/// external tool has exited. `warnings` lists best-effort steps that failed
/// without affecting `success`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOutcome {
    pub success: bool,
    pub message: String,
    /// Combined stdout and stderr of the tool, or `Error: ...` if it never ran.
    #[serde(rename = "output")]
    pub raw_output: String,
    #[serde(rename = "html_url", default, skip_serializing_if = "Option::is_none")]
    pub artifact_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl GenerationOutcome {
    pub fn succeeded(raw_output: String, warnings: Vec<String>) -> Self {
        Self {
            success: true,
            message: "Page generated".to_string(),
            raw_output,
            artifact_url: Some(ARTIFACT_URL.to_string()),
            warnings,
        }
    }

    pub fn failed(raw_output: String, warnings: Vec<String>) -> Self {
        Self {
            success: false,
            message: "Generation failed: index.html was not produced".to_string(),
            raw_output,
            artifact_url: None,
            warnings,
        }
    }
}
