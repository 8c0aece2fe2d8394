pub mod analyzer;
pub mod backup;
pub mod config;
pub mod default_paths;
pub mod events;
pub mod filesystem;
pub mod notes;
pub mod pipeline;

// Re-export main types for convenience
pub use analyzer::{Analysis, AnalysisWorker, Priority, WorkerState};
pub use backup::BackupScheduler;
pub use config::PipelineConfig;
pub use default_paths::default_data_dir;
pub use events::{EventCallback, PipelineEvent};
pub use notes::{DELIMITER, Error, Note, NoteStore, Result, TIMESTAMP_FORMAT};
pub use pipeline::NotePipeline;
