//! HTTP client for the backend collection job API.

use std::time::Duration;

use tracing::instrument;
use url::Url;

use crate::error::CollectionError;
use crate::types::{BackendJobData, TriggerResponse};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct CollectionClient {
    client: reqwest::Client,
    base_url: Url,
}

impl CollectionClient {
    /// Create a client for the collection API at `base_url`.
    pub fn new(base_url: &str) -> Result<Self, CollectionError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client with an explicit per-request timeout.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, CollectionError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        // Trailing slash so join() appends instead of replacing the last segment.
        let mut base = base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Ok(Self { client, base_url: Url::parse(&base)? })
    }

    /// Ask the backend to start a collection run.
    #[instrument(skip(self), level = "info")]
    pub async fn trigger(&self) -> Result<TriggerResponse, CollectionError> {
        let url = self.base_url.join("collection/trigger")?;
        let response = self.client.post(url).send().await?;
        self.handle_response(response).await
    }

    /// Fetch the current status of a collection job.
    #[instrument(skip(self), level = "debug")]
    pub async fn job_status(&self, job_id: &str) -> Result<BackendJobData, CollectionError> {
        let url = self.base_url.join(&format!("collection/jobs/{}", job_id))?;
        let response = self.client.get(url).send().await?;
        self.handle_response(response).await
    }

    /// Helper to handle API responses and errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, CollectionError> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| CollectionError::InvalidResponse(format!("JSON parse error: {}", e)))
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(CollectionError::Api { status: status.as_u16(), body })
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_trigger() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/collection/trigger"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"job_id": "job-42"})),
            )
            .mount(&mock_server)
            .await;

        let client = CollectionClient::new(&mock_server.uri()).unwrap();
        let resp = client.trigger().await.unwrap();

        assert_eq!(resp.job_id, "job-42");
    }

    #[tokio::test]
    async fn test_trigger_server_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/collection/trigger"))
            .respond_with(ResponseTemplate::new(500).set_body_string("collector offline"))
            .mount(&mock_server)
            .await;

        let client = CollectionClient::new(&mock_server.uri()).unwrap();
        let err = client.trigger().await.unwrap_err();

        match err {
            CollectionError::Api { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "collector offline");
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_job_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/collection/jobs/job-42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "job_id": "job-42",
                "status": "running",
                "stage": "Fetching feeds",
                "progress": 40
            })))
            .mount(&mock_server)
            .await;

        let client = CollectionClient::new(&mock_server.uri()).unwrap();
        let data = client.job_status("job-42").await.unwrap();

        assert_eq!(data.status, "running");
        assert_eq!(data.stage.as_deref(), Some("Fetching feeds"));
        assert_eq!(data.progress, Some(40));
    }

    #[tokio::test]
    async fn test_job_status_not_found() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/collection/jobs/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let client = CollectionClient::new(&mock_server.uri()).unwrap();
        let err = client.job_status("missing").await.unwrap_err();

        assert!(matches!(err, CollectionError::Api { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_invalid_json_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/collection/trigger"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let client = CollectionClient::new(&mock_server.uri()).unwrap();
        let err = client.trigger().await.unwrap_err();

        assert!(matches!(err, CollectionError::InvalidResponse(_)));
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            CollectionClient::new("not a url"),
            Err(CollectionError::Url(_))
        ));
    }
}
