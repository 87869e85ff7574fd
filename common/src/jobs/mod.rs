use serde::Serialize;

/// Status of a background report generation job.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum JobStatus {
    /// Registered, not yet picked up by a worker.
    Pending,
    /// Percentage of the pipeline completed. Report jobs only send `0`, when a
    /// worker starts them.
    InProgress(u32),
    /// Path of the produced artifact.
    Completed(String),
    /// Error message of the failed stage.
    Failed(String),
}
