//! Shared DTOs for the studio core and SDK.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// Job stream payloads
// =============================================================================

/// Incremental progress notice for a studio job.
///
/// Events arrive on the live channel as unnamed messages. Duplicates are
/// possible (e.g. after overlapping reconnects); consumers treat the log as
/// append-only and keyed by arrival order, not by content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobEvent {
    /// Event type string (e.g. `"phase"`, `"log"`).
    #[serde(rename = "type")]
    pub event_type: String,
    /// Optional build phase this event belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    /// Optional human-readable message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Optional event payload (backend-specific).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JobEvent {
    /// Create an event with only a type.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            phase: None,
            message: None,
            data: None,
        }
    }

    /// Set the phase.
    pub fn with_phase(mut self, phase: impl Into<String>) -> Self {
        self.phase = Some(phase.into());
        self
    }

    /// Set the message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

// =============================================================================
// Error payloads
// =============================================================================

/// Machine-readable error kinds produced by the client itself.
///
/// Server-side JSON error bodies carry their own codes (e.g.
/// `"missing_idempotency_key"`); those are passed through untouched and do
/// not map to a variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The server could not be reached at all.
    NetworkError,
    /// The server answered, but the body could not be parsed.
    InvalidResponsePayload,
    /// Non-2xx status with a non-JSON body.
    HttpError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NetworkError => "network_error",
            ErrorKind::InvalidResponsePayload => "invalid_response_payload",
            ErrorKind::HttpError => "http_error",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "network_error" => Some(ErrorKind::NetworkError),
            "invalid_response_payload" => Some(ErrorKind::InvalidResponsePayload),
            "http_error" => Some(ErrorKind::HttpError),
            _ => None,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured error payload placed in a failed result envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Error code: an [`ErrorKind`] string or a server-provided code.
    pub error: String,
    /// Raw response text or server-provided details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// URL that failed (network errors).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Operator guidance, e.g. which setting to check.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Unparseable body, kept for diagnosis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl ErrorPayload {
    /// Create a payload carrying only an error code.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
            url: None,
            message: None,
            hint: None,
            raw: None,
        }
    }

    /// The server was unreachable.
    pub fn network(url: impl Into<String>, message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            url: Some(url.into()),
            message: Some(message.into()),
            hint,
            ..Self::new(ErrorKind::NetworkError.as_str())
        }
    }

    /// The body claimed to be JSON but did not parse.
    pub fn invalid_response_payload(raw: impl Into<String>) -> Self {
        Self {
            raw: Some(raw.into()),
            ..Self::new(ErrorKind::InvalidResponsePayload.as_str())
        }
    }

    /// Non-2xx response with a plain-text body.
    pub fn http_error(details: impl Into<String>) -> Self {
        Self {
            details: Some(details.into()),
            ..Self::new(ErrorKind::HttpError.as_str())
        }
    }

    /// The client-side kind, if this is one of the client's own payloads.
    pub fn kind(&self) -> Option<ErrorKind> {
        ErrorKind::from_str(&self.error)
    }

    /// Extract a payload from an arbitrary JSON value.
    ///
    /// Returns `None` unless the value is an object with a string `error`
    /// field. Non-string `details` (servers sometimes send objects) are
    /// rendered as compact JSON.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let error = obj.get("error")?.as_str()?;
        let text = |key: &str| match obj.get(key) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        };
        Some(Self {
            error: error.to_string(),
            details: text("details"),
            url: text("url"),
            message: text("message"),
            hint: text("hint"),
            raw: text("raw"),
        })
    }

    /// Render as a JSON object, omitting unset fields.
    pub fn into_value(self) -> Value {
        serde_json::to_value(&self).unwrap_or_else(|_| serde_json::json!({ "error": self.error }))
    }
}

impl std::fmt::Display for ErrorPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)?;
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        } else if let Some(ref details) = self.details {
            let truncated: String = details.chars().take(200).collect();
            write!(f, ": {}", truncated)?;
        }
        if let Some(ref url) = self.url {
            write!(f, " ({})", url)?;
        }
        Ok(())
    }
}

// =============================================================================
// Studio API shapes
// =============================================================================

/// How far the generator should take an app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GenerationDepth {
    Prototype,
    Pilot,
    ProductionCandidate,
}

/// Request body for submitting a studio generation job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudioJobRequest {
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_system: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub primary_users: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub core_workflows: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_entities: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_depth: Option<GenerationDepth>,
}

impl StudioJobRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }
}

/// `GET /v1/health` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    #[serde(default)]
    pub policy_version: String,
    #[serde(default)]
    pub data_version: String,
    #[serde(default)]
    pub idempotency_cleanup_deleted_total: u64,
}

/// One pass/fail check in a verification report or run result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyCheck {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub evidence: String,
}

/// File entry in an artifact manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestFile {
    pub path: String,
    pub language: String,
    pub category: String,
    pub size_bytes: u64,
}

/// Named command the generated workspace can run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunTarget {
    pub name: String,
    pub description: String,
    pub command: String,
}

/// `GET /v1/studio/jobs/{id}/artifacts` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub generated_at: String,
    pub workspace_path: String,
    #[serde(default)]
    pub files: Vec<ManifestFile>,
    #[serde(default)]
    pub run_targets: Vec<RunTarget>,
}

/// `GET /v1/studio/jobs/{id}/verification` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub report_id: String,
    pub verdict: String,
    #[serde(default)]
    pub checks: Vec<VerifyCheck>,
    pub depth_label: GenerationDepth,
    pub behavioral_pass_rate: f64,
    pub generated_at: String,
}

/// `POST /v1/studio/jobs/{id}/run` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudioRunResponse {
    pub target: String,
    pub status: String,
    #[serde(default)]
    pub checks: Vec<VerifyCheck>,
    pub generated_at: String,
}

/// `POST /v1/studio/jobs/{id}/terminal` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminalResponse {
    pub command: String,
    #[serde(default)]
    pub output: Vec<String>,
    pub cwd: String,
}

/// `GET /v1/studio/jobs/{id}/console` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsoleResponse {
    #[serde(default)]
    pub logs: Vec<String>,
}
