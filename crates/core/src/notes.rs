use std::path::Path;

use chrono::{Local, NaiveDateTime};
use thiserror::Error;
use tracing::debug;

use crate::filesystem::TextFile;

/// Line that terminates every stored block.
pub const DELIMITER: &str = "# ----------------------------------";

const DATE_LABEL: &str = "# Date:";
const NOTE_LABEL: &str = "# Note:";
const IMPORTANT_LABEL: &str = "# Important:";

/// Timestamp layout used in the `# Date:` line (local time, second precision).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to spawn background task: {0}")]
    ThreadSpawn(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// A note parsed from one stored block.
///
/// `index` is the block's position in the snapshot it was read from. Any add
/// or delete invalidates previously returned indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub index: usize,
    pub timestamp: Option<NaiveDateTime>,
    pub content: String,
    pub important: bool,
}

/// Block-structured note file.
///
/// Performs no locking: callers must serialize mutations.
#[derive(Debug, Clone)]
pub struct NoteStore {
    file: TextFile,
}

impl NoteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            file: TextFile::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Appends a new block stamped with the current local time.
    ///
    /// Fails with `InvalidInput` for empty or whitespace-only content and
    /// leaves the file untouched in that case.
    pub fn append(&self, content: &str, important: bool) -> Result<()> {
        if content.trim().is_empty() {
            return Err(Error::InvalidInput("cannot add empty note".to_string()));
        }

        let timestamp = Local::now().naive_local();
        let block = format_block(timestamp, content, important);
        self.file.append(&block)?;

        debug!(path = %self.path().display(), important, "appended note");
        Ok(())
    }

    /// Returns the raw blocks currently stored, each ending with the
    /// delimiter line. Empty when the file is absent or blank.
    pub fn list_blocks(&self) -> Result<Vec<String>> {
        let content = self.file.read()?.unwrap_or_default();
        Ok(split_blocks(&content))
    }

    pub fn list_structured(&self) -> Result<Vec<Note>> {
        let notes = self
            .list_blocks()?
            .iter()
            .enumerate()
            .map(|(index, block)| parse_block(index, block))
            .collect();
        Ok(notes)
    }

    /// Removes the block at `index` by rewriting the whole file.
    ///
    /// Returns `false` without touching the file when `index` is out of range.
    pub fn delete_at(&self, index: usize) -> Result<bool> {
        let mut blocks = self.list_blocks()?;
        if index >= blocks.len() {
            return Ok(false);
        }

        blocks.remove(index);
        self.file.rewrite(&blocks.concat())?;

        debug!(path = %self.path().display(), index, remaining = blocks.len(), "deleted note");
        Ok(true)
    }

    pub fn count(&self) -> Result<usize> {
        Ok(self.list_blocks()?.len())
    }
}

/// Formats one block. Line breaks inside `content` are flattened to spaces
/// because the note field is a single line.
pub fn format_block(timestamp: NaiveDateTime, content: &str, important: bool) -> String {
    let content: String = content
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    let flag = if important { "True" } else { "False" };

    format!(
        "{DATE_LABEL} {}\n{NOTE_LABEL} {content}\n{IMPORTANT_LABEL} {flag}\n{DELIMITER}\n",
        timestamp.format(TIMESTAMP_FORMAT),
    )
}

/// Splits file content on the delimiter line. Blank fragments are dropped and
/// the delimiter is re-attached to every returned block.
pub fn split_blocks(content: &str) -> Vec<String> {
    let content = content.trim();
    if content.is_empty() {
        return Vec::new();
    }

    content
        .split(DELIMITER)
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(|piece| format!("{piece}\n{DELIMITER}\n"))
        .collect()
}

/// Parses the labeled lines of one block. Missing or malformed fields fall
/// back to `None`, an empty string and `false`.
pub fn parse_block(index: usize, block: &str) -> Note {
    let mut timestamp = None;
    let mut content = String::new();
    let mut important = false;

    for line in block.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(value) = line.strip_prefix(DATE_LABEL) {
            timestamp = NaiveDateTime::parse_from_str(value.trim(), TIMESTAMP_FORMAT).ok();
        } else if let Some(value) = line.strip_prefix(NOTE_LABEL) {
            content = value.trim().to_string();
        } else if let Some(value) = line.strip_prefix(IMPORTANT_LABEL) {
            important = value.trim().eq_ignore_ascii_case("true");
        }
    }

    Note {
        index,
        timestamp,
        content,
        important,
    }
}
