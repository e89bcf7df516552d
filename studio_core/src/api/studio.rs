//! Studio job endpoints.
//!
//! Every method returns the raw [`ApiResponse`] envelope; decode with
//! [`ApiResponse::json`] when a typed value is wanted. Mutating calls carry
//! a fresh idempotency key unless one is supplied.

use serde_json::{json, Value};
use studio_core_types::StudioJobRequest;

use crate::errors::{CoreError, CoreResult};
use crate::http::{ApiClient, ApiRequest, ApiResponse};
use crate::urls::{job_path, job_resource_path, join_url};

const HEALTH_ENDPOINT: &str = "/v1/health";
const JOBS_ENDPOINT: &str = "/v1/studio/jobs";

/// Studio API client.
pub struct StudioApi<'a> {
    client: &'a ApiClient,
}

impl<'a> StudioApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn health(&self) -> ApiResponse {
        self.client.get(HEALTH_ENDPOINT).await
    }

    /// Submit a generation job.
    pub async fn create_job(&self, request: &StudioJobRequest) -> CoreResult<ApiResponse> {
        let body = job_body(request)?;
        Ok(self.client.send(ApiRequest::post(JOBS_ENDPOINT, body)).await)
    }

    /// Submit with a caller-chosen idempotency key, so a retried submission
    /// is recognised by the server as the same request.
    pub async fn create_job_with_key(
        &self,
        request: &StudioJobRequest,
        idempotency_key: &str,
    ) -> CoreResult<ApiResponse> {
        if idempotency_key.trim().is_empty() {
            return Err(CoreError::InvalidInput(
                "idempotency key must not be empty".to_string(),
            ));
        }
        let body = job_body(request)?;
        let request = ApiRequest::post(JOBS_ENDPOINT, body).with_idempotency_key(idempotency_key);
        Ok(self.client.send(request).await)
    }

    pub async fn get_job(&self, job_id: &str) -> ApiResponse {
        self.client.get(&job_path(job_id)).await
    }

    pub async fn job_artifacts(&self, job_id: &str) -> ApiResponse {
        self.client.get(&job_resource_path(job_id, "artifacts")).await
    }

    pub async fn job_verification(&self, job_id: &str) -> ApiResponse {
        self.client.get(&job_resource_path(job_id, "verification")).await
    }

    /// Jobs-to-be-done coverage report.
    pub async fn job_jtbd(&self, job_id: &str) -> ApiResponse {
        self.client.get(&job_resource_path(job_id, "jtbd")).await
    }

    pub async fn job_console(&self, job_id: &str) -> ApiResponse {
        self.client.get(&job_resource_path(job_id, "console")).await
    }

    /// Run a named target (e.g. `test`) in the generated workspace.
    pub async fn run_target(&self, job_id: &str, target: &str) -> ApiResponse {
        let path = job_resource_path(job_id, "run");
        self.client
            .send(ApiRequest::post(path, json!({ "target": target })))
            .await
    }

    pub async fn send_terminal_command(&self, job_id: &str, command: &str) -> ApiResponse {
        let path = job_resource_path(job_id, "terminal");
        self.client
            .send(ApiRequest::post(path, json!({ "command": command })))
            .await
    }

    /// Preview page URL against the current base. `client` selects the
    /// layout, e.g. `web` or `mobile`.
    pub fn preview_url(&self, job_id: &str, client: Option<&str>) -> String {
        let url = join_url(&self.client.base_url(), &job_resource_path(job_id, "preview"));
        match client.filter(|c| !c.is_empty()) {
            Some(client) => format!("{url}?client={client}"),
            None => url,
        }
    }

    /// Downloadable workspace bundle URL against the current base.
    pub fn bundle_url(&self, job_id: &str) -> String {
        join_url(&self.client.base_url(), &job_resource_path(job_id, "bundle"))
    }
}

fn job_body(request: &StudioJobRequest) -> CoreResult<Value> {
    if request.prompt.trim().is_empty() {
        return Err(CoreError::InvalidInput("prompt must not be empty".to_string()));
    }
    serde_json::to_value(request)
        .map_err(|e| CoreError::InvalidInput(format!("failed to serialize request: {}", e)))
}
