use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error, info};

use crate::events::{EventCallback, EventSink, PipelineEvent};
use crate::filesystem::copy_atomic;
use crate::notes::{Error, Result};

/// Interval used when a zero interval is requested.
pub const FALLBACK_INTERVAL: Duration = Duration::from_secs(1);

/// Source and destination of the periodic copy.
#[derive(Debug, Clone)]
struct Mirror {
    source: PathBuf,
    destination: PathBuf,
    events: EventSink,
}

impl Mirror {
    /// Copies source over destination. Returns `false` when the source is
    /// absent (destination untouched) or the copy failed.
    fn copy(&self) -> bool {
        if !self.source.exists() {
            debug!(source = %self.source.display(), "backup skipped, source missing");
            self.events.emit(PipelineEvent::BackupSkipped);
            return false;
        }

        match copy_atomic(&self.source, &self.destination) {
            Ok(bytes) => {
                info!(destination = %self.destination.display(), bytes, "backup written");
                self.events.emit(PipelineEvent::BackupWritten { bytes });
                true
            }
            Err(e) => {
                error!(destination = %self.destination.display(), "backup failed: {e}");
                self.events.emit(PipelineEvent::BackupFailed {
                    message: e.to_string(),
                });
                false
            }
        }
    }

    /// Waits one interval at a time; exits as soon as a stop is signalled.
    fn run(self, interval: Duration, stop: mpsc::Receiver<()>) {
        loop {
            match stop.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => {
                    self.copy();
                }
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    }
}

struct Running {
    stop: Sender<()>,
    handle: JoinHandle<()>,
}

/// Background task that periodically mirrors the note file to a backup path.
pub struct BackupScheduler {
    mirror: Mirror,
    interval: Duration,
    running: Mutex<Option<Running>>,
}

impl BackupScheduler {
    /// A zero `interval` is raised to [`FALLBACK_INTERVAL`].
    pub fn new<S, D>(source: S, destination: D, interval: Duration) -> Self
    where
        S: AsRef<Path>,
        D: AsRef<Path>,
    {
        Self::with_events(source, destination, interval, None)
    }

    /// Creates a stopped scheduler that also reports every tick to `events`.
    ///
    /// # Arguments
    ///
    /// * `source` - Note file to mirror; a tick is skipped while it is absent
    /// * `destination` - Backup path, overwritten in place on every successful tick
    /// * `interval` - Time between ticks; zero is raised to [`FALLBACK_INTERVAL`]
    /// * `events` - Optional callback receiving `BackupWritten`, `BackupSkipped`
    ///   and `BackupFailed`, invoked on the scheduler thread
    pub fn with_events<S, D>(
        source: S,
        destination: D,
        interval: Duration,
        events: Option<EventCallback>,
    ) -> Self
    where
        S: AsRef<Path>,
        D: AsRef<Path>,
    {
        let interval = if interval.is_zero() {
            FALLBACK_INTERVAL
        } else {
            interval
        };

        Self {
            mirror: Mirror {
                source: source.as_ref().to_path_buf(),
                destination: destination.as_ref().to_path_buf(),
                events: EventSink::new(events),
            },
            interval,
            running: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.lock().is_some()
    }

    /// Launches the tick loop. No-op when already running.
    pub fn start(&self) -> Result<()> {
        let mut running = self.lock();
        if running.is_some() {
            return Ok(());
        }

        let (stop, stop_rx) = mpsc::channel();
        let mirror = self.mirror.clone();
        let interval = self.interval;
        let handle = thread::Builder::new()
            .name("backup".to_string())
            .spawn(move || mirror.run(interval, stop_rx))
            .map_err(Error::ThreadSpawn)?;

        *running = Some(Running { stop, handle });
        debug!(interval_ms = interval.as_millis() as u64, "backup scheduler started");
        Ok(())
    }

    /// Signals the loop and blocks until it has exited. A copy already in
    /// progress completes first. No-op when not running.
    pub fn stop(&self) {
        let mut running = self.lock();
        let Some(Running { stop, handle }) = running.take() else {
            return;
        };

        let _ = stop.send(());
        if handle.join().is_err() {
            error!("backup scheduler panicked");
        }
        debug!("backup scheduler stopped");
    }

    /// Performs one copy immediately, independent of the loop.
    ///
    /// Returns `false` when the source is missing or the copy failed; failures
    /// are reported through tracing and the event callback.
    pub fn run_once(&self) -> bool {
        self.mirror.copy()
    }

    fn lock(&self) -> MutexGuard<'_, Option<Running>> {
        self.running.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for BackupScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
