//! Tracks background report generation jobs.
//!
//! A job is created by `POST /api/reports/generate`, runs the report pipeline
//! on the blocking pool, and is polled through `GET /api/reports/status/{job_id}`.
//!
//! - `JobsState`: clonable, shared map of job id to `JobStatus`, plus the
//!   sender used to report changes. Registered as Actix app data in `main.rs`.
//! - `JobUpdate`: one status change for one job.
//! - `start_job_updater`: the single task that applies updates to the map.
//!
//! Workers never write the map directly; they send `JobUpdate`s and the
//! updater task is the only writer. Registration is the one exception: a new
//! job is inserted as `Pending` before its id is handed out, so a status
//! request can never race ahead of it.

use common::jobs::JobStatus;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{mpsc, RwLock};

/// Shared handle on every background job, cloned into each Actix worker as
/// `web::Data`.
#[derive(Clone)]
pub struct JobsState {
    /// Job id to current status. Read by the status route, written by
    /// `register` and `start_job_updater`.
    pub jobs: JobsMap,

    /// Sender half of the update channel. Generation tasks spawned by
    /// `schedule_report_job` report through it instead of locking `jobs`.
    pub tx: mpsc::Sender<JobUpdate>,
}

/// One status change for one job, consumed by `start_job_updater`.
#[derive(Debug)]
pub struct JobUpdate {
    /// Id handed out by `JobsState::register`.
    pub(crate) job_id: String,
    /// Status replacing whatever the job had before.
    pub(crate) status: JobStatus,
}

impl JobsState {
    /// Creates the shared state and the receiver `start_job_updater` drains.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<JobUpdate>) {
        let (tx, rx) = mpsc::channel(capacity);
        let state = JobsState {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            tx,
        };
        (state, rx)
    }

    /// Registers a new job as `Pending` and returns its id.
    pub async fn register(&self) -> String {
        let job_id = uuid::Uuid::new_v4().to_string();
        self.jobs
            .write()
            .await
            .insert(job_id.clone(), JobStatus::Pending);
        job_id
    }

    /// Current status of a job, `None` for ids never registered.
    pub async fn status(&self, job_id: &str) -> Option<JobStatus> {
        self.jobs.read().await.get(job_id).cloned()
    }

    /// Queues a status change. A closed updater is logged, not fatal.
    pub async fn report(&self, job_id: &str, status: JobStatus) {
        let update = JobUpdate {
            job_id: job_id.to_string(),
            status,
        };
        if let Err(e) = self.tx.send(update).await {
            log::warn!("Job updater is gone, dropping update for {}", e.0.job_id);
        }
    }
}

/// Map shared between the routes and the updater task.
pub type JobsMap = Arc<RwLock<HashMap<String, JobStatus>>>;

/// Applies updates until every sender is dropped.
pub async fn start_job_updater(jobs: JobsMap, mut rx: mpsc::Receiver<JobUpdate>) {
    while let Some(update) = rx.recv().await {
        jobs.write().await.insert(update.job_id, update.status);
    }
}
