use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Local;

use crate::models::{PromptRecord, LEDGER_FILE, TIMESTAMP_FORMAT};

/// Append-only prompt ledger kept as `prompt.txt` in each project directory.
///
/// The next sequence number is the count of non-empty lines already in the
/// file. Appends made through the same ledger (or its clones) are serialised;
/// another process writing the same file can still produce duplicate numbers.
#[derive(Debug, Clone, Default)]
pub struct PromptLedger {
    append_lock: Arc<Mutex<()>>,
}

impl PromptLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(project_dir: &Path) -> PathBuf {
        project_dir.join(LEDGER_FILE)
    }

    /// Append `text` as the next record and return it.
    ///
    /// `text` is written as given, except that line breaks become spaces so
    /// the record stays on one line.
    pub fn append(&self, project_dir: &Path, text: &str) -> io::Result<PromptRecord> {
        let _guard = self.append_lock.lock().expect("ledger lock poisoned");

        let sequence = Self::read(project_dir)?.len() + 1;
        let record = PromptRecord {
            sequence,
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            text: text.replace(['\r', '\n'], " "),
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(Self::path(project_dir))?;
        writeln!(file, "{}", record.to_line())?;

        Ok(record)
    }

    /// All non-empty ledger lines, trimmed, in file order.
    ///
    /// A missing ledger reads as empty.
    pub fn read(project_dir: &Path) -> io::Result<Vec<String>> {
        match fs::read_to_string(Self::path(project_dir)) {
            Ok(content) => Ok(content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from)
                .collect()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    /// The first non-empty ledger line, if any.
    pub fn first_entry(project_dir: &Path) -> io::Result<Option<String>> {
        Ok(Self::read(project_dir)?.into_iter().next())
    }
}
