use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_NOTES_FILE: &str = "notes.txt";
pub const DEFAULT_BACKUP_FILE: &str = "notes.bak";
pub const DEFAULT_ANALYSIS_LOG: &str = "analysis_log.txt";
pub const DEFAULT_BACKUP_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_ANALYSIS_DELAY: Duration = Duration::from_secs(2);

/// Locations and timings used by [`crate::NotePipeline`].
///
/// The defaults resolve the three files against the working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub notes_path: PathBuf,
    pub backup_path: PathBuf,
    pub analysis_log_path: PathBuf,
    pub backup_interval: Duration,
    /// Simulated processing time spent on each analysis job
    pub analysis_delay: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            notes_path: PathBuf::from(DEFAULT_NOTES_FILE),
            backup_path: PathBuf::from(DEFAULT_BACKUP_FILE),
            analysis_log_path: PathBuf::from(DEFAULT_ANALYSIS_LOG),
            backup_interval: DEFAULT_BACKUP_INTERVAL,
            analysis_delay: DEFAULT_ANALYSIS_DELAY,
        }
    }
}

impl PipelineConfig {
    /// Default file names placed inside `dir`.
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self {
            notes_path: dir.join(DEFAULT_NOTES_FILE),
            backup_path: dir.join(DEFAULT_BACKUP_FILE),
            analysis_log_path: dir.join(DEFAULT_ANALYSIS_LOG),
            ..Self::default()
        }
    }

    /// Default file names in the per-user data directory.
    /// See [`crate::default_paths::default_data_dir`].
    pub fn with_default_dir(debug: bool) -> Option<Self> {
        crate::default_paths::default_data_dir(debug).map(Self::in_dir)
    }

    pub fn notes_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.notes_path = path.into();
        self
    }

    pub fn backup_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.backup_path = path.into();
        self
    }

    pub fn analysis_log_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.analysis_log_path = path.into();
        self
    }

    pub fn backup_interval(mut self, interval: Duration) -> Self {
        self.backup_interval = interval;
        self
    }

    pub fn analysis_delay(mut self, delay: Duration) -> Self {
        self.analysis_delay = delay;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_legacy_layout() {
        let config = PipelineConfig::default();

        assert_eq!(config.notes_path, PathBuf::from("notes.txt"));
        assert_eq!(config.backup_path, PathBuf::from("notes.bak"));
        assert_eq!(config.analysis_log_path, PathBuf::from("analysis_log.txt"));
        assert_eq!(config.backup_interval, Duration::from_secs(10));
        assert_eq!(config.analysis_delay, Duration::from_secs(2));
    }

    #[test]
    fn test_in_dir_keeps_file_names() {
        let config = PipelineConfig::in_dir("/data/notes");

        assert_eq!(config.notes_path, Path::new("/data/notes/notes.txt"));
        assert_eq!(config.backup_path, Path::new("/data/notes/notes.bak"));
        assert_eq!(
            config.analysis_log_path,
            Path::new("/data/notes/analysis_log.txt")
        );
    }

    #[test]
    fn test_overrides() {
        let config = PipelineConfig::default()
            .notes_path("a.txt")
            .backup_path("b.bak")
            .analysis_log_path("c.log")
            .backup_interval(Duration::from_secs(1))
            .analysis_delay(Duration::ZERO);

        assert_eq!(config.notes_path, PathBuf::from("a.txt"));
        assert_eq!(config.backup_path, PathBuf::from("b.bak"));
        assert_eq!(config.analysis_log_path, PathBuf::from("c.log"));
        assert_eq!(config.backup_interval, Duration::from_secs(1));
        assert_eq!(config.analysis_delay, Duration::ZERO);
    }
}
