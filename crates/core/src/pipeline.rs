use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use tracing::debug;

use crate::analyzer::AnalysisWorker;
use crate::backup::BackupScheduler;
use crate::config::PipelineConfig;
use crate::events::EventCallback;
use crate::notes::{Note, NoteStore, Result};

/// Owns the note file and both background tasks.
///
/// This is the surface the menu shell (or any other front end) talks to:
/// adds go to disk first and are then queued for analysis, while the backup
/// scheduler mirrors the note file on its own clock.
///
/// # Example
///
/// ```no_run
/// use notekeeper_core::{NotePipeline, PipelineConfig};
///
/// let pipeline = NotePipeline::new(PipelineConfig::in_dir("/tmp/notes"));
/// pipeline.start()?;
/// pipeline.add_note("Buy milk", false)?;
/// for note in pipeline.list()? {
///     println!("{}: {}", note.index, note.content);
/// }
/// pipeline.stop();
/// # Ok::<(), notekeeper_core::Error>(())
/// ```
pub struct NotePipeline {
    config: PipelineConfig,
    store: NoteStore,
    analyzer: AnalysisWorker,
    backup: BackupScheduler,
}

impl NotePipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self::build(config, None)
    }

    /// Like [`NotePipeline::new`], with a callback receiving background task
    /// events.
    ///
    /// # Arguments
    ///
    /// * `config` - File locations and timings, see [`PipelineConfig`]
    /// * `on_event` - Called with every [`crate::PipelineEvent`] from the analysis
    ///   worker and the backup scheduler, on their own threads. It may query the
    ///   pipeline's running state but must not call `stop`
    ///
    /// # Returns
    ///
    /// A stopped pipeline; call [`NotePipeline::start`] to launch both tasks.
    pub fn with_events<F>(config: PipelineConfig, on_event: F) -> Self
    where
        F: Fn(crate::PipelineEvent) + Send + Sync + 'static,
    {
        Self::build(config, Some(std::sync::Arc::new(on_event)))
    }

    fn build(config: PipelineConfig, events: Option<EventCallback>) -> Self {
        let store = NoteStore::new(&config.notes_path);
        let analyzer = AnalysisWorker::with_events(
            &config.analysis_log_path,
            config.analysis_delay,
            events.clone(),
        );
        let backup = BackupScheduler::with_events(
            &config.notes_path,
            &config.backup_path,
            config.backup_interval,
            events,
        );

        Self {
            config,
            store,
            analyzer,
            backup,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn analyzer(&self) -> &AnalysisWorker {
        &self.analyzer
    }

    pub fn backup(&self) -> &BackupScheduler {
        &self.backup
    }

    /// Starts both background tasks. Calling it again while running is a no-op.
    pub fn start(&self) -> Result<()> {
        self.analyzer.start()?;
        if let Err(e) = self.backup.start() {
            self.analyzer.stop();
            return Err(e);
        }
        debug!("pipeline started");
        Ok(())
    }

    /// Stops both background tasks and waits for them to exit. Pending
    /// analysis jobs are processed before this returns.
    pub fn stop(&self) {
        self.analyzer.stop();
        self.backup.stop();
        debug!("pipeline stopped");
    }

    pub fn is_running(&self) -> bool {
        self.analyzer.is_running() || self.backup.is_running()
    }

    /// Writes the note, then queues it for analysis.
    pub fn add_note(&self, content: &str, important: bool) -> Result<()> {
        self.store.append(content, important)?;
        self.analyzer.submit(content, important);
        Ok(())
    }

    pub fn list(&self) -> Result<Vec<Note>> {
        self.store.list_structured()
    }

    pub fn list_blocks(&self) -> Result<Vec<String>> {
        self.store.list_blocks()
    }

    /// Deletes by position in the most recent listing.
    ///
    /// Positions shift after every add or delete, so an index taken from an
    /// older listing may address a different note.
    pub fn delete_at(&self, index: usize) -> Result<bool> {
        self.store.delete_at(index)
    }

    pub fn count(&self) -> Result<usize> {
        self.store.count()
    }

    /// Mirrors the note file right away, outside the scheduler's interval.
    pub fn backup_now(&self) -> bool {
        self.backup.run_once()
    }

    /// Notes stamped on `date`, in file order. Notes without a parsable
    /// timestamp never match.
    pub fn notes_on(&self, date: NaiveDate) -> Result<Vec<Note>> {
        let notes = self
            .list()?
            .into_iter()
            .filter(|note| note.timestamp.is_some_and(|ts| ts.date() == date))
            .collect();
        Ok(notes)
    }

    /// Days of `month` in `year` that carry at least one note.
    pub fn days_with_notes(&self, year: i32, month: u32) -> Result<BTreeSet<u32>> {
        let days = self
            .list()?
            .into_iter()
            .filter_map(|note| note.timestamp)
            .filter(|ts| ts.year() == year && ts.month() == month)
            .map(|ts| ts.day())
            .collect();
        Ok(days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::Error;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn setup() -> (TempDir, NotePipeline) {
        let temp_dir = TempDir::new().unwrap();
        let config = PipelineConfig::in_dir(temp_dir.path())
            .backup_interval(Duration::from_secs(3600))
            .analysis_delay(Duration::from_millis(5));
        (temp_dir, NotePipeline::new(config))
    }

    fn write_notes(pipeline: &NotePipeline, blocks: &[(&str, &str, bool)]) {
        let content: String = blocks
            .iter()
            .map(|(date, note, important)| {
                let flag = if *important { "True" } else { "False" };
                format!(
                    "# Date: {date}\n# Note: {note}\n# Important: {flag}\n# ----------------------------------\n"
                )
            })
            .collect();
        fs::write(&pipeline.config().notes_path, content).unwrap();
    }

    #[test]
    fn test_add_note_persists_and_analyzes() {
        let (_temp_dir, pipeline) = setup();

        pipeline.start().unwrap();
        pipeline.add_note("Buy milk", false).unwrap();
        pipeline.add_note("Call bank", true).unwrap();
        pipeline.stop();

        let notes = pipeline.list().unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].content, "Buy milk");
        assert!(notes[1].important);

        let log = fs::read_to_string(&pipeline.config().analysis_log_path).unwrap();
        assert_eq!(log.lines().count(), 2);
    }

    #[test]
    fn test_add_empty_note_not_queued() {
        let (_temp_dir, pipeline) = setup();

        pipeline.start().unwrap();
        assert!(matches!(
            pipeline.add_note("  ", false),
            Err(Error::InvalidInput(_))
        ));
        pipeline.stop();

        assert!(!pipeline.config().analysis_log_path.exists());
        assert_eq!(pipeline.count().unwrap(), 0);
    }

    #[test]
    fn test_lifecycle_idempotent() {
        let (_temp_dir, pipeline) = setup();

        pipeline.stop();
        pipeline.start().unwrap();
        pipeline.start().unwrap();
        assert!(pipeline.analyzer().is_running());
        assert!(pipeline.backup().is_running());

        pipeline.stop();
        pipeline.stop();
        assert!(!pipeline.is_running());
    }

    #[test]
    fn test_delete_at() {
        let (_temp_dir, pipeline) = setup();
        pipeline.add_note("first", false).unwrap();
        pipeline.add_note("second", false).unwrap();

        assert!(!pipeline.delete_at(2).unwrap());
        assert!(pipeline.delete_at(0).unwrap());

        let notes = pipeline.list().unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].content, "second");
    }

    #[test]
    fn test_backup_now() {
        let (_temp_dir, pipeline) = setup();

        assert!(!pipeline.backup_now());
        pipeline.add_note("to back up", false).unwrap();
        assert!(pipeline.backup_now());

        assert_eq!(
            fs::read(&pipeline.config().backup_path).unwrap(),
            fs::read(&pipeline.config().notes_path).unwrap()
        );
    }

    #[test]
    fn test_notes_on_date() {
        let (_temp_dir, pipeline) = setup();
        write_notes(
            &pipeline,
            &[
                ("2025-03-01 09:00:00", "morning", false),
                ("2025-03-02 10:00:00", "next day", true),
                ("not a date", "undated", false),
                ("2025-03-01 18:30:00", "evening", true),
            ],
        );

        let day = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let notes = pipeline.notes_on(day).unwrap();

        let contents: Vec<_> = notes.iter().map(|n| n.content.as_str()).collect();
        assert_eq!(contents, vec!["morning", "evening"]);
        // indices refer to positions in the full listing
        assert_eq!(notes[1].index, 3);
    }

    #[test]
    fn test_days_with_notes() {
        let (_temp_dir, pipeline) = setup();
        write_notes(
            &pipeline,
            &[
                ("2025-03-01 09:00:00", "a", false),
                ("2025-03-15 10:00:00", "b", false),
                ("2025-03-15 11:00:00", "c", false),
                ("2025-04-02 10:00:00", "d", false),
                ("2024-03-07 10:00:00", "e", false),
            ],
        );

        let days = pipeline.days_with_notes(2025, 3).unwrap();
        assert_eq!(days.into_iter().collect::<Vec<_>>(), vec![1, 15]);
        assert!(pipeline.days_with_notes(2025, 5).unwrap().is_empty());
    }
}
