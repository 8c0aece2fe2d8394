use std::sync::Arc;

use crate::analyzer::Priority;

/// Event emitted by the background tasks.
///
/// Background failures never reach the code that submitted the work; this is
/// the channel through which they become observable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    /// A note was analyzed and its summary line appended to the log
    NoteAnalyzed {
        preview: String,
        words: usize,
        priority: Priority,
    },
    /// Writing the analysis summary failed; the worker moves on to the next job
    AnalysisFailed { message: String },
    /// The note file was mirrored to the backup path
    BackupWritten { bytes: u64 },
    /// The note file did not exist at tick time, so no copy was made
    BackupSkipped,
    /// Copying the note file failed; the scheduler keeps ticking
    BackupFailed { message: String },
}

/// Callback receiving [`PipelineEvent`]s. Invoked on the background thread
/// that produced the event.
pub type EventCallback = Arc<dyn Fn(PipelineEvent) + Send + Sync>;

/// Optional callback shared by the background tasks.
#[derive(Clone, Default)]
pub(crate) struct EventSink {
    callback: Option<EventCallback>,
}

impl EventSink {
    pub(crate) fn new(callback: Option<EventCallback>) -> Self {
        Self { callback }
    }

    pub(crate) fn emit(&self, event: PipelineEvent) {
        if let Some(ref callback) = self.callback {
            callback(event);
        }
    }
}

impl std::fmt::Debug for EventSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSink")
            .field("callback", &self.callback.is_some())
            .finish()
    }
}
