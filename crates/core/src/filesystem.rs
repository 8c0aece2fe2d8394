use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// A single plain-text file addressed by path.
///
/// Used for the note file and the analysis log. All operations open and close
/// the file per call; nothing is held open between calls.
#[derive(Debug, Clone)]
pub struct TextFile {
    path: PathBuf,
}

impl TextFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole file. Returns `None` when the file does not exist.
    pub fn read(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Appends `text` to the end of the file, creating it (and its parent
    /// directory) if absent.
    pub fn append(&self, text: &str) -> io::Result<()> {
        ensure_parent(&self.path)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(text.as_bytes())
    }

    /// Replaces the whole file content.
    pub fn rewrite(&self, text: &str) -> io::Result<()> {
        ensure_parent(&self.path)?;
        fs::write(&self.path, text)
    }
}

/// Copies `source` over `destination` so that readers of `destination` see
/// either the previous content or the complete new content.
///
/// The copy lands in a sibling temp file first and is then renamed into place.
/// Returns the number of bytes copied.
pub fn copy_atomic(source: &Path, destination: &Path) -> io::Result<u64> {
    ensure_parent(destination)?;
    let staging = staging_path(destination);

    let bytes = match fs::copy(source, &staging) {
        Ok(bytes) => bytes,
        Err(e) => {
            let _ = fs::remove_file(&staging);
            return Err(e);
        }
    };

    if let Err(e) = fs::rename(&staging, destination) {
        let _ = fs::remove_file(&staging);
        return Err(e);
    }

    Ok(bytes)
}

fn staging_path(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    destination.with_file_name(name)
}

fn ensure_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = TextFile::new(temp_dir.path().join("missing.txt"));

        assert_eq!(file.read().unwrap(), None);
    }

    #[test]
    fn test_append_creates_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = TextFile::new(temp_dir.path().join("notes.txt"));

        file.append("first\n").unwrap();
        file.append("second\n").unwrap();

        assert_eq!(file.read().unwrap().as_deref(), Some("first\nsecond\n"));
    }

    #[test]
    fn test_append_creates_parent_directory() {
        let temp_dir = TempDir::new().unwrap();
        let file = TextFile::new(temp_dir.path().join("nested/dir/log.txt"));

        file.append("line\n").unwrap();
        assert!(file.path().exists());
    }

    #[test]
    fn test_rewrite_replaces_content() {
        let temp_dir = TempDir::new().unwrap();
        let file = TextFile::new(temp_dir.path().join("notes.txt"));

        file.append("old content").unwrap();
        file.rewrite("new").unwrap();

        assert_eq!(file.read().unwrap().as_deref(), Some("new"));
    }

    #[test]
    fn test_copy_atomic_overwrites_destination() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("notes.txt");
        let destination = temp_dir.path().join("notes.bak");

        fs::write(&source, "fresh").unwrap();
        fs::write(&destination, "stale content").unwrap();

        let bytes = copy_atomic(&source, &destination).unwrap();
        assert_eq!(bytes, 5);
        assert_eq!(fs::read_to_string(&destination).unwrap(), "fresh");
        assert!(!temp_dir.path().join("notes.bak.tmp").exists());
    }

    #[test]
    fn test_copy_atomic_missing_source_keeps_destination() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("gone.txt");
        let destination = temp_dir.path().join("notes.bak");

        fs::write(&destination, "previous").unwrap();

        assert!(copy_atomic(&source, &destination).is_err());
        assert_eq!(fs::read_to_string(&destination).unwrap(), "previous");
        assert!(!temp_dir.path().join("notes.bak.tmp").exists());
    }
}
