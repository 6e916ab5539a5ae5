//! Normalization of raw backend job payloads into UI-facing progress.

use crate::types::{BackendJobData, CollectionResult, CollectionStatus, JobProgress, FALLBACK_STAGE};

/// Map the backend's status vocabulary onto the UI status enum.
///
/// The backend grew several spellings of "done"; anything unrecognized is
/// treated as still processing rather than an error, so a new backend status
/// never breaks the client.
fn map_status(raw: &str) -> CollectionStatus {
    match raw {
        "success" | "success_collect" | "no_change" => CollectionStatus::Completed,
        "error" | "failed" => CollectionStatus::Failed,
        "running" => CollectionStatus::Processing,
        other => {
            tracing::debug!(status = other, "unrecognized backend status, treating as processing");
            CollectionStatus::Processing
        }
    }
}

/// Convert a raw backend job payload into a fully populated [`JobProgress`].
///
/// Total over any well-formed payload: missing fields default, counts are
/// signed so inconsistent backend numbers surface as a negative
/// `total_existing` instead of being clamped.
pub fn normalize(raw: &BackendJobData) -> JobProgress {
    let status = map_status(&raw.status);

    let result = if status.is_terminal() {
        let total_new = raw.new_documents_count.unwrap_or(0);
        let processed = raw.processed_documents_count.unwrap_or(0);
        Some(CollectionResult {
            total_new,
            total_existing: processed - total_new,
            errors: Vec::new(),
        })
    } else {
        None
    };

    JobProgress {
        job_id: raw.job_id.clone(),
        status,
        stage: raw.stage.clone().unwrap_or_else(|| FALLBACK_STAGE.to_string()),
        message: raw.message.clone().unwrap_or_default(),
        progress: raw.progress.unwrap_or(0),
        started_at: raw.started_at,
        completed_at: raw.completed_at,
        result,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    fn raw(status: &str) -> BackendJobData {
        BackendJobData { status: status.to_string(), ..BackendJobData::default() }
    }

    #[test]
    fn completed_statuses() {
        for status in ["success", "success_collect", "no_change"] {
            assert_eq!(normalize(&raw(status)).status, CollectionStatus::Completed);
        }
    }

    #[test]
    fn failed_statuses() {
        for status in ["error", "failed"] {
            assert_eq!(normalize(&raw(status)).status, CollectionStatus::Failed);
        }
    }

    #[test]
    fn running_and_unknown_map_to_processing() {
        assert_eq!(normalize(&raw("running")).status, CollectionStatus::Processing);
        assert_eq!(normalize(&raw("queued")).status, CollectionStatus::Processing);
        assert_eq!(normalize(&raw("")).status, CollectionStatus::Processing);
    }

    #[test]
    fn defaults_for_missing_fields() {
        let progress = normalize(&raw("running"));
        assert_eq!(progress.stage, FALLBACK_STAGE);
        assert_eq!(progress.message, "");
        assert_eq!(progress.progress, 0);
        assert!(progress.result.is_none());
    }

    #[test]
    fn result_only_on_terminal_status() {
        assert!(normalize(&raw("running")).result.is_none());
        assert!(normalize(&raw("success")).result.is_some());
        assert!(normalize(&raw("failed")).result.is_some());
    }

    #[test]
    fn result_counts_derived_from_backend_counts() {
        let mut data = raw("success");
        data.new_documents_count = Some(5);
        data.processed_documents_count = Some(12);

        let result = normalize(&data).result.unwrap();
        assert_eq!(result.total_new, 5);
        assert_eq!(result.total_existing, 7);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn missing_counts_treated_as_zero() {
        let mut data = raw("success");
        data.new_documents_count = Some(3);

        let result = normalize(&data).result.unwrap();
        assert_eq!(result.total_new, 3);
        assert_eq!(result.total_existing, -3);
    }

    #[test]
    fn inconsistent_counts_go_negative() {
        // Backend reports more new documents than processed; preserved as-is.
        let mut data = raw("no_change");
        data.new_documents_count = Some(10);
        data.processed_documents_count = Some(4);

        let result = normalize(&data).result.unwrap();
        assert_eq!(result.total_existing, -6);
    }

    #[test]
    fn carries_backend_fields_through() {
        let mut data = raw("running");
        data.job_id = "abc".to_string();
        data.stage = Some("Parsing feeds".to_string());
        data.message = Some("12 of 40".to_string());
        data.progress = Some(40);

        let progress = normalize(&data);
        assert_eq!(progress.job_id, "abc");
        assert_eq!(progress.stage, "Parsing feeds");
        assert_eq!(progress.message, "12 of 40");
        assert_eq!(progress.progress, 40);
    }
}
