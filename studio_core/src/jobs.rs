//! Job snapshots and status values.
//!
//! A snapshot is an opaque, server-defined JSON object. The client replaces
//! it wholesale and only peeks at a few well-known fields.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{CoreError, CoreResult};
use crate::http::ApiResponse;

/// Job lifecycle status values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Queued,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl JobStatus {
    /// Check if this is a terminal (final) status.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Succeeded | JobStatus::Failed | JobStatus::Cancelled
        )
    }

    pub fn is_success(&self) -> bool {
        *self == JobStatus::Succeeded
    }

    /// Parse a status string (case-insensitive, handles aliases).
    ///
    /// The studio backend reports finished builds as `"generated"`, which
    /// maps to `Succeeded`.
    pub fn from_str(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase().replace(' ', "_").replace('-', "_");
        match normalized.as_str() {
            "pending" => Some(JobStatus::Pending),
            "queued" => Some(JobStatus::Queued),
            "running" | "in_progress" | "generating" => Some(JobStatus::Running),
            "succeeded" | "success" | "completed" | "complete" | "generated" => {
                Some(JobStatus::Succeeded)
            }
            "failed" | "failure" | "error" => Some(JobStatus::Failed),
            "cancelled" | "canceled" | "cancel" => Some(JobStatus::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Succeeded => "succeeded",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Latest known server-side state of one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobSnapshot(Value);

impl JobSnapshot {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Parse a snapshot from a channel frame or response body. Must be a JSON object.
    pub fn from_value(value: Value) -> CoreResult<Self> {
        if value.is_object() {
            Ok(Self(value))
        } else {
            Err(CoreError::protocol(format!(
                "job snapshot must be a JSON object, got {}",
                json_kind(&value)
            )))
        }
    }

    /// Extract a snapshot from a fetch result, failing on error envelopes.
    pub fn from_response(resp: ApiResponse) -> CoreResult<Self> {
        Self::from_value(resp.into_result()?)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Server-assigned id (`job_id`, or `id` as a fallback).
    pub fn job_id(&self) -> Option<&str> {
        self.str_field("job_id").or_else(|| self.str_field("id"))
    }

    /// Raw status string.
    pub fn status_str(&self) -> Option<&str> {
        self.str_field("status")
    }

    pub fn status(&self) -> Option<JobStatus> {
        self.status_str().and_then(JobStatus::from_str)
    }

    pub fn is_terminal(&self) -> bool {
        self.status().is_some_and(|s| s.is_terminal())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
