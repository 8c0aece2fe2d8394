use std::fmt;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::events::{EventCallback, EventSink, PipelineEvent};
use crate::filesystem::TextFile;
use crate::notes::{Error, Result};

/// Number of leading characters of a note quoted in the analysis log.
const PREVIEW_CHARS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Urgent,
    Normal,
}

impl Priority {
    pub fn from_important(important: bool) -> Self {
        if important {
            Priority::Urgent
        } else {
            Priority::Normal
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Urgent => f.write_str("URGENT"),
            Priority::Normal => f.write_str("Normal"),
        }
    }
}

/// Summary derived from one note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub preview: String,
    pub words: usize,
    pub priority: Priority,
}

impl Analysis {
    pub fn of(content: &str, important: bool) -> Self {
        Self {
            preview: content.chars().take(PREVIEW_CHARS).collect(),
            words: content.split_whitespace().count(),
            priority: Priority::from_important(important),
        }
    }

    /// The line appended to the analysis log, newline included.
    pub fn log_line(&self) -> String {
        format!(
            "Analyzed: '{}...' | Words: {} | Priority: {}\n",
            self.preview, self.words, self.priority
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Stopped,
    Running,
    /// Close sentinel queued, waiting for the consumer to drain and exit
    Stopping,
}

enum Job {
    Analyze { content: String, important: bool },
    Close,
}

/// Everything the consumer thread needs, moved into it on start.
#[derive(Debug, Clone)]
struct Processor {
    log: TextFile,
    delay: Duration,
    events: EventSink,
}

impl Processor {
    fn process(&self, content: &str, important: bool) {
        thread::sleep(self.delay);

        let analysis = Analysis::of(content, important);
        match self.log.append(&analysis.log_line()) {
            Ok(()) => {
                info!(words = analysis.words, priority = %analysis.priority, "note analyzed");
                self.events.emit(PipelineEvent::NoteAnalyzed {
                    preview: analysis.preview,
                    words: analysis.words,
                    priority: analysis.priority,
                });
            }
            Err(e) => {
                error!(log = %self.log.path().display(), "failed to write analysis: {e}");
                self.events.emit(PipelineEvent::AnalysisFailed {
                    message: e.to_string(),
                });
            }
        }
    }

    /// Consumes jobs until the close sentinel. Holds the queue for its whole
    /// lifetime; a later start picks the same queue up again.
    fn run(self, queue: Arc<Mutex<Receiver<Job>>>) {
        let jobs = queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        while let Ok(job) = jobs.recv() {
            match job {
                Job::Analyze { content, important } => self.process(&content, important),
                Job::Close => break,
            }
        }
    }
}

struct Runtime {
    state: WorkerState,
    handle: Option<JoinHandle<()>>,
}

/// Single background consumer of a FIFO queue of analysis jobs.
///
/// Jobs submitted while the worker is stopped stay queued and are processed
/// after the next `start`.
pub struct AnalysisWorker {
    sender: Sender<Job>,
    queue: Arc<Mutex<Receiver<Job>>>,
    processor: Processor,
    runtime: Mutex<Runtime>,
    /// Signalled when a drain completes
    state_changed: Condvar,
}

impl AnalysisWorker {
    pub fn new<P: AsRef<Path>>(log_path: P, delay: Duration) -> Self {
        Self::with_events(log_path, delay, None)
    }

    /// Creates a stopped worker whose results are also reported to `events`.
    ///
    /// # Arguments
    ///
    /// * `log_path` - File each analysis line is appended to (created on first write)
    /// * `delay` - Simulated processing time spent on every job before it is logged
    /// * `events` - Optional callback receiving `NoteAnalyzed`/`AnalysisFailed`,
    ///   invoked on the worker thread
    pub fn with_events<P: AsRef<Path>>(
        log_path: P,
        delay: Duration,
        events: Option<EventCallback>,
    ) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            queue: Arc::new(Mutex::new(receiver)),
            processor: Processor {
                log: TextFile::new(log_path),
                delay,
                events: EventSink::new(events),
            },
            runtime: Mutex::new(Runtime {
                state: WorkerState::Stopped,
                handle: None,
            }),
            state_changed: Condvar::new(),
        }
    }

    pub fn log_path(&self) -> &Path {
        self.processor.log.path()
    }

    pub fn state(&self) -> WorkerState {
        self.lock().state
    }

    pub fn is_running(&self) -> bool {
        self.state() == WorkerState::Running
    }

    /// Launches the consumer thread. No-op when already running.
    /// Waits for a drain in progress to finish first.
    pub fn start(&self) -> Result<()> {
        let mut runtime = self.wait_while_stopping(self.lock());
        if runtime.handle.is_some() {
            return Ok(());
        }

        let processor = self.processor.clone();
        let queue = Arc::clone(&self.queue);
        let handle = thread::Builder::new()
            .name("analyzer".to_string())
            .spawn(move || processor.run(queue))
            .map_err(Error::ThreadSpawn)?;

        runtime.handle = Some(handle);
        runtime.state = WorkerState::Running;
        debug!("analysis worker started");
        Ok(())
    }

    /// Queues the close sentinel and blocks until every job queued before it
    /// has been processed. No-op when not running.
    ///
    /// The state reads `Stopping` while the queue drains. A concurrent `stop`
    /// waits for the same drain to finish.
    pub fn stop(&self) {
        let mut runtime = self.wait_while_stopping(self.lock());
        let Some(handle) = runtime.handle.take() else {
            return;
        };

        runtime.state = WorkerState::Stopping;
        let _ = self.sender.send(Job::Close);
        drop(runtime);

        if handle.join().is_err() {
            let dropped = self.discard_through_sentinel();
            error!(dropped, "analysis worker panicked; discarded jobs queued before stop");
        }

        self.lock().state = WorkerState::Stopped;
        self.state_changed.notify_all();
        debug!("analysis worker stopped");
    }

    /// Queues a job. Never waits for the analysis itself.
    pub fn submit(&self, content: &str, important: bool) {
        let job = Job::Analyze {
            content: content.to_string(),
            important,
        };
        if self.sender.send(job).is_err() {
            warn!("analysis queue is closed; job dropped");
        }
    }

    /// Empties the queue up to and including the pending close sentinel so a
    /// restarted consumer does not exit on a stale one.
    fn discard_through_sentinel(&self) -> usize {
        let jobs = self
            .queue
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut dropped = 0;
        while let Ok(job) = jobs.try_recv() {
            match job {
                Job::Analyze { .. } => dropped += 1,
                Job::Close => break,
            }
        }
        dropped
    }

    fn lock(&self) -> MutexGuard<'_, Runtime> {
        self.runtime.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn wait_while_stopping<'a>(
        &self,
        runtime: MutexGuard<'a, Runtime>,
    ) -> MutexGuard<'a, Runtime> {
        self.state_changed
            .wait_while(runtime, |r| r.state == WorkerState::Stopping)
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for AnalysisWorker {
    fn drop(&mut self) {
        self.stop();
    }
}
