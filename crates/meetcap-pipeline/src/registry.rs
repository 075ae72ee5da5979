//! In-memory job registry.
//!
//! Process-wide, lock-guarded map from job id to the latest status
//! snapshot. Written by the orchestrator's progress callback, read by
//! status polls. One orchestrator run owns one job id; readers only ever
//! see complete records because every read-modify-write holds the single
//! lock.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::warn;

use chrono::Utc;
use meetcap_models::{JobId, JobOutput, JobRecord, JobStatus};

/// Shared registry handle; clones refer to the same map.
#[derive(Clone, Default)]
pub struct JobRegistry {
    inner: Arc<Mutex<HashMap<JobId, JobRecord>>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fresh queued record for a newly accepted job.
    pub fn create(&self, id: &JobId) -> JobRecord {
        let record = JobRecord::new(id.clone());
        self.lock().insert(id.clone(), record.clone());
        record
    }

    /// Update (or create) one record atomically.
    ///
    /// Terminal records are frozen: updates against them are logged and
    /// dropped. Progress never decreases.
    pub fn create_or_update(
        &self,
        id: &JobId,
        status: JobStatus,
        progress: u8,
        message: impl Into<String>,
        result: Option<JobOutput>,
    ) {
        let mut jobs = self.lock();
        let record = jobs
            .entry(id.clone())
            .or_insert_with(|| JobRecord::new(id.clone()));

        if record.status.is_terminal() {
            warn!(job_id = %id, "Ignoring update to terminal job record");
            return;
        }

        record.status = status;
        record.progress = record.progress.max(progress.min(100));
        record.message = message.into();
        record.updated_at = Utc::now();
        if let Some(output) = result {
            record.result = Some(output);
        }
    }

    /// Mark a job completed with its artifacts.
    pub fn complete(&self, id: &JobId, output: JobOutput) {
        self.create_or_update(
            id,
            JobStatus::Completed,
            100,
            "Processing complete!",
            Some(output),
        );
    }

    /// Mark a job failed with a short message.
    pub fn fail(&self, id: &JobId, error: impl Into<String>) {
        let error = error.into();
        let mut jobs = self.lock();
        let record = jobs
            .entry(id.clone())
            .or_insert_with(|| JobRecord::new(id.clone()));

        if record.status.is_terminal() {
            warn!(job_id = %id, "Ignoring failure update to terminal job record");
            return;
        }

        record.status = JobStatus::Failed;
        record.message = format!("Processing failed: {}", error);
        record.error = Some(error);
        record.updated_at = Utc::now();
    }

    /// Request cancellation. Returns false when the job is unknown or
    /// already terminal. Advisory: running stages observe the flag only at
    /// stage boundaries.
    pub fn cancel(&self, id: &JobId) -> bool {
        let mut jobs = self.lock();
        match jobs.get_mut(id) {
            Some(record) if !record.status.is_terminal() => {
                record.status = JobStatus::Cancelled;
                record.message = "Processing cancelled by user".to_string();
                record.updated_at = Utc::now();
                true
            }
            _ => false,
        }
    }

    /// Latest snapshot for one job.
    pub fn get(&self, id: &JobId) -> Option<JobRecord> {
        self.lock().get(id).cloned()
    }

    /// Whether cancellation was requested for this job.
    pub fn is_cancelled(&self, id: &JobId) -> bool {
        self.lock()
            .get(id)
            .map(|r| r.status == JobStatus::Cancelled)
            .unwrap_or(false)
    }

    /// Snapshots of every known job.
    pub fn list(&self) -> Vec<JobRecord> {
        self.lock().values().cloned().collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<JobId, JobRecord>> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
