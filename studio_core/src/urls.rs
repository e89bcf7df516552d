use url::Url;

use crate::CoreError;

/// Join a base address and a resource path with exactly one slash at the seam.
pub fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}

/// Resource path of a studio job.
pub fn job_path(job_id: &str) -> String {
    format!("/v1/studio/jobs/{job_id}")
}

/// Path of a job sub-resource, e.g. `artifacts`.
pub fn job_resource_path(job_id: &str, resource: &str) -> String {
    format!("/v1/studio/jobs/{job_id}/{}", resource.trim_start_matches('/'))
}

/// Live event channel URL for a job. The token, when present, is URL-encoded
/// into the `token` query parameter because event sources cannot send headers.
pub fn job_events_url(base: &str, job_id: &str, token: Option<&str>) -> Result<Url, CoreError> {
    if job_id.trim().is_empty() {
        return Err(CoreError::InvalidInput("job id must not be empty".to_string()));
    }
    let mut url = Url::parse(&join_url(base, &job_resource_path(job_id, "events")))?;
    if let Some(token) = token.filter(|t| !t.is_empty()) {
        url.query_pairs_mut().append_pair("token", token);
    }
    Ok(url)
}

/// Validate that a base address is well-formed http(s).
pub fn validate_base_url(url: &str) -> Result<Url, CoreError> {
    let parsed = Url::parse(url)?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(CoreError::InvalidInput(format!(
            "unsupported scheme: {other}"
        ))),
    }
}
