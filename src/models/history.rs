use serde::{Deserialize, Serialize};

use super::session::ActiveSession;

/// Timestamp format used inside ledger records.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One line of a project's prompt ledger.
///
/// Records are written as `"{sequence} [{timestamp}] {text}"` and never
/// rewritten. Sequence numbers start at 1 and are contiguous within a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptRecord {
    pub sequence: usize,
    pub timestamp: String,
    pub text: String,
}

impl PromptRecord {
    /// Render the record as a single ledger line, without the trailing newline.
    pub fn to_line(&self) -> String {
        format!("{} [{}] {}", self.sequence, self.timestamp, self.text)
    }

    /// Parse a ledger line.
    ///
    /// Returns `None` unless the line starts with a sequence number followed
    /// by a bracketed timestamp. The text may be empty.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let digits = line.find(|c: char| !c.is_ascii_digit())?;
        let sequence = line[..digits].parse().ok()?;

        let rest = line[digits..].trim_start().strip_prefix('[')?;
        let close = rest.find(']')?;
        let timestamp = rest[..close].trim().to_string();
        let text = rest[close + 1..].trim().to_string();

        Some(Self {
            sequence,
            timestamp,
            text,
        })
    }
}

/// Prompt history of the active project, as returned to the UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptHistoryResponse {
    pub prompts: Vec<String>,
    pub current_project: Option<ActiveSession>,
}
