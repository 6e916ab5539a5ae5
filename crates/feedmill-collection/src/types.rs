//! Collection job types shared by the client, normalizer, and tracker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stage label used when the backend reports none.
pub(crate) const FALLBACK_STAGE: &str = "Collecting feeds";

/// UI-facing status of a collection job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CollectionStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}

impl CollectionStatus {
    /// True once no further transitions can occur for the job.
    pub fn is_terminal(self) -> bool {
        matches!(self, CollectionStatus::Completed | CollectionStatus::Failed)
    }
}

/// Outcome counts reported once a job reaches a terminal status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionResult {
    /// Documents the backend saw for the first time.
    pub total_new: i64,
    /// Processed minus new; negative when the backend's counts disagree.
    pub total_existing: i64,
    /// Structured errors; the backend does not currently supply any.
    pub errors: Vec<String>,
}

/// Normalized progress of a collection job as shown to the UI.
///
/// `result` is populated only for terminal statuses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobProgress {
    pub job_id: String,
    pub status: CollectionStatus,
    pub stage: String,
    pub message: String,
    pub progress: u8,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub result: Option<CollectionResult>,
}

impl JobProgress {
    /// Placeholder shown between a start request and the trigger response.
    pub(crate) fn pending_placeholder() -> Self {
        Self {
            job_id: String::new(),
            status: CollectionStatus::Pending,
            stage: "Starting collection".to_string(),
            message: String::new(),
            progress: 0,
            started_at: Some(Utc::now()),
            completed_at: None,
            result: None,
        }
    }

    /// Placeholder shown until the first status poll lands.
    pub(crate) fn processing_placeholder(job_id: &str) -> Self {
        Self {
            job_id: job_id.to_string(),
            status: CollectionStatus::Processing,
            stage: FALLBACK_STAGE.to_string(),
            message: String::new(),
            progress: 0,
            started_at: Some(Utc::now()),
            completed_at: None,
            result: None,
        }
    }
}

/// Raw job payload from the backend status endpoint.
///
/// A superset of what the UI needs, in the backend's own status vocabulary;
/// see [`crate::normalize::normalize`] for the mapping. Every field is
/// tolerated missing so a sparse payload still parses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendJobData {
    pub job_id: String,
    pub status: String,
    pub stage: Option<String>,
    pub message: Option<String>,
    pub progress: Option<u8>,
    pub new_documents_count: Option<i64>,
    pub processed_documents_count: Option<i64>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Response from the collection trigger endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerResponse {
    pub job_id: String,
}

/// Snapshot of collection state published to subscribers.
///
/// `last_result` holds the frozen progress of the most recently finished job
/// and survives until the next cancel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionState {
    pub is_collecting: bool,
    pub job_progress: Option<JobProgress>,
    pub last_result: Option<JobProgress>,
}
