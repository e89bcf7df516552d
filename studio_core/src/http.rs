//! HTTP transport for studio API calls.
//!
//! [`ApiClient::send`] never fails: every outcome, including unreachable
//! servers and unparseable bodies, is folded into an [`ApiResponse`]
//! envelope. The wire itself sits behind [`HttpTransport`] so tests and
//! embedders can swap it out.

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use studio_core_types::{ErrorKind, ErrorPayload};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::api::StudioApi;
use crate::config::{ClientConfig, CredentialSource};
use crate::errors::{CoreError, CoreResult};
use crate::shared_client::{try_build_client, SHARED_CLIENT};
use crate::urls::join_url;

pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// Generate a fresh idempotency key (UUID v4, no semantic content).
pub fn new_idempotency_key() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Transport primitive
// =============================================================================

/// A fully resolved request handed to the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl RawRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// Status, headers and body text of a received response.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Transport failures.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error(
        "request failed: {err} (is_connect={connect}, is_timeout={timeout})",
        err = .0,
        connect = .0.is_connect(),
        timeout = .0.is_timeout()
    )]
    Request(#[from] reqwest::Error),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("failed to read response body (status {status}): {message}")]
    Body { status: u16, message: String },
}

impl TransportError {
    /// True when no response was obtained, i.e. the server may be unreachable.
    pub fn is_pre_response(&self) -> bool {
        !matches!(self, TransportError::Body { .. })
    }
}

/// Resource fetch primitive.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: RawRequest) -> Result<RawResponse, TransportError>;
}

/// [`HttpTransport`] over a pooled `reqwest::Client`.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Transport over the process-wide [`SHARED_CLIENT`].
    pub fn shared() -> Self {
        Self::new(SHARED_CLIENT.clone())
    }

    pub fn from_config(config: &ClientConfig) -> CoreResult<Self> {
        Ok(Self::new(try_build_client(config)?))
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: RawRequest) -> Result<RawResponse, TransportError> {
        let mut builder = self.client.request(request.method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        let headers = resp
            .headers()
            .iter()
            .filter_map(|(k, v)| {
                v.to_str()
                    .ok()
                    .map(|v| (k.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = resp.text().await.map_err(|e| TransportError::Body {
            status,
            message: e.to_string(),
        })?;
        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

// =============================================================================
// Envelopes
// =============================================================================

/// A request against the studio API, relative to the configured base.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub idempotency_key: Option<String>,
}

impl ApiRequest {
    /// Create a request. Mutating methods get a fresh idempotency key.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        let idempotency_key = is_mutating(&method).then(new_idempotency_key);
        Self {
            method,
            path: path.into(),
            body: None,
            idempotency_key,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, path).with_body(body)
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::PUT, path).with_body(body)
    }

    pub fn patch(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::PATCH, path).with_body(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Use a caller-chosen key, e.g. to replay a submission. Ignored for GETs.
    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        if self.is_mutating() {
            self.idempotency_key = Some(key.into());
        }
        self
    }

    pub fn is_mutating(&self) -> bool {
        is_mutating(&self.method)
    }

    /// GETs never carry a key; mutating calls always do.
    fn normalized(mut self) -> Self {
        if !self.is_mutating() {
            self.idempotency_key = None;
        } else if self.idempotency_key.as_deref().map_or(true, str::is_empty) {
            self.idempotency_key = Some(new_idempotency_key());
        }
        self
    }
}

fn is_mutating(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Uniform result of an API call.
///
/// `ok` reflects the HTTP status only (2xx). A 2xx response whose body could
/// not be parsed is still `ok`, with an `invalid_response_payload` error in
/// `data`; [`ApiResponse::into_result`] treats that case as a failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub ok: bool,
    pub status: u16,
    pub data: Value,
}

impl ApiResponse {
    pub fn from_parts(status: u16, data: Value) -> Self {
        Self {
            ok: (200..300).contains(&status),
            status,
            data,
        }
    }

    /// Envelope for a request that never reached a server.
    pub fn network_error(payload: ErrorPayload) -> Self {
        Self {
            ok: false,
            status: 0,
            data: payload.into_value(),
        }
    }

    /// The structured error carried in `data`, if any.
    pub fn error_payload(&self) -> Option<ErrorPayload> {
        ErrorPayload::from_value(&self.data)
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error_payload().and_then(|p| p.kind())
    }

    /// Convert into a typed result.
    pub fn into_result(self) -> CoreResult<Value> {
        if !self.ok {
            let payload = self
                .error_payload()
                .unwrap_or_else(|| ErrorPayload::http_error(self.data.to_string()));
            return Err(CoreError::api(self.status, payload));
        }
        if self.error_kind() == Some(ErrorKind::InvalidResponsePayload) {
            return Err(CoreError::Protocol(format!(
                "invalid response payload (status {})",
                self.status
            )));
        }
        Ok(self.data)
    }

    /// Decode `data` into `T`, failing on any error envelope.
    pub fn json<T: DeserializeOwned>(self) -> CoreResult<T> {
        let status = self.status;
        let data = self.into_result()?;
        serde_json::from_value(data)
            .map_err(|e| CoreError::Protocol(format!("unexpected response shape (status {status}): {e}")))
    }
}

/// Normalize a response body into the envelope's `data`.
pub fn normalize_body(status: u16, content_type: Option<&str>, text: &str) -> Value {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Value::Object(Map::new());
    }

    let declares_json = content_type
        .map(|ct| ct.to_ascii_lowercase().contains("json"))
        .unwrap_or(false);
    if declares_json || trimmed.starts_with('{') || trimmed.starts_with('[') {
        return serde_json::from_str(trimmed)
            .unwrap_or_else(|_| ErrorPayload::invalid_response_payload(text).into_value());
    }

    if (200..300).contains(&status) {
        json!({ "value": text })
    } else {
        ErrorPayload::http_error(text).into_value()
    }
}

// =============================================================================
// Client
// =============================================================================

enum Attempt {
    Response(ApiResponse),
    Unreachable(TransportError),
}

/// Studio API client.
///
/// Reads credentials and addresses from its [`CredentialSource`] on every
/// call. Cheap to clone.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn HttpTransport>,
    credentials: Arc<dyn CredentialSource>,
}

impl ApiClient {
    /// Client over the shared reqwest transport.
    pub fn new(credentials: Arc<dyn CredentialSource>) -> Self {
        Self::with_transport(credentials, Arc::new(ReqwestTransport::shared()))
    }

    pub fn with_transport(
        credentials: Arc<dyn CredentialSource>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            transport,
            credentials,
        }
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialSource> {
        &self.credentials
    }

    pub fn base_url(&self) -> String {
        self.credentials.base_url()
    }

    pub fn token(&self) -> Option<String> {
        self.credentials.token()
    }

    /// Typed studio endpoints.
    pub fn studio(&self) -> StudioApi<'_> {
        StudioApi::new(self)
    }

    pub async fn get(&self, path: &str) -> ApiResponse {
        self.send(ApiRequest::get(path)).await
    }

    /// Execute a request and normalize the outcome.
    ///
    /// If no response is obtained from the primary base, the configured
    /// fallback base (when different) is tried exactly once. Responses are
    /// never retried, whatever their status.
    pub async fn send(&self, request: ApiRequest) -> ApiResponse {
        let request = request.normalized();
        let primary = self.credentials.base_url();
        let token = self.credentials.token();
        let primary_url = join_url(&primary, &request.path);

        let err = match self.attempt(&request, &primary_url, token.as_deref()).await {
            Attempt::Response(resp) => return resp,
            Attempt::Unreachable(err) => err,
        };

        let fallback = self
            .credentials
            .fallback_base_url()
            .filter(|f| !f.trim().is_empty() && !same_base(f, &primary));
        let mut message = err.to_string();
        if let Some(fallback) = fallback {
            let fallback_url = join_url(&fallback, &request.path);
            warn!(url = %primary_url, fallback = %fallback_url, error = %err, "primary unreachable, trying fallback");
            match self.attempt(&request, &fallback_url, token.as_deref()).await {
                Attempt::Response(resp) => return resp,
                Attempt::Unreachable(err) => {
                    message = format!("{message}; fallback {fallback_url}: {err}");
                }
            }
        }

        warn!(url = %primary_url, error = %message, "studio API unreachable");
        ApiResponse::network_error(ErrorPayload::network(
            primary_url,
            message,
            Some(format!(
                "Check that the studio API is running at {primary} (STUDIO_BASE_URL)."
            )),
        ))
    }

    async fn attempt(&self, request: &ApiRequest, url: &str, token: Option<&str>) -> Attempt {
        let mut headers = Vec::new();
        if request.body.is_some() {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }
        if let Some(ref key) = request.idempotency_key {
            headers.push((IDEMPOTENCY_KEY_HEADER.to_string(), key.clone()));
        }
        let raw = RawRequest {
            method: request.method.clone(),
            url: url.to_string(),
            headers,
            body: request.body.as_ref().map(Value::to_string),
        };

        debug!(method = %request.method, url, "studio API request");
        match self.transport.execute(raw).await {
            Ok(resp) => {
                let data = normalize_body(resp.status, resp.header("content-type"), &resp.body);
                debug!(url, status = resp.status, "studio API response");
                Attempt::Response(ApiResponse::from_parts(resp.status, data))
            }
            Err(TransportError::Body { status, message }) => {
                debug!(url, status, error = %message, "response body unreadable");
                let mut payload = ErrorPayload::invalid_response_payload("");
                payload.message = Some(message);
                Attempt::Response(ApiResponse::from_parts(status, payload.into_value()))
            }
            Err(err) => Attempt::Unreachable(err),
        }
    }
}

fn same_base(a: &str, b: &str) -> bool {
    a.trim().trim_end_matches('/') == b.trim().trim_end_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientSettings;
    use crate::testing::FakeTransport;
    use bytes::Bytes;
    use http_body_util::{BodyExt, Full};
    use hyper::service::service_fn;
    use hyper::{Request, Response, StatusCode};
    use hyper_util::rt::{TokioExecutor, TokioIo};
    use hyper_util::server::conn::auto::Builder;
    use tokio::net::TcpListener;

    fn client(settings: ClientSettings, transport: Arc<FakeTransport>) -> ApiClient {
        ApiClient::with_transport(Arc::new(settings), transport)
    }

    #[test]
    fn test_normalize_empty_body() {
        assert_eq!(normalize_body(200, None, "  \n"), json!({}));
        assert_eq!(normalize_body(204, Some("application/json"), ""), json!({}));
    }

    #[test]
    fn test_normalize_invalid_json() {
        let data = normalize_body(200, None, "{bad");
        assert_eq!(data, json!({"error": "invalid_response_payload", "raw": "{bad"}));
        let resp = ApiResponse::from_parts(200, data);
        assert!(resp.ok);
        assert_eq!(resp.error_kind(), Some(ErrorKind::InvalidResponsePayload));
        assert!(matches!(resp.into_result(), Err(CoreError::Protocol(_))));
    }

    #[test]
    fn test_normalize_text_bodies() {
        assert_eq!(normalize_body(200, Some("text/plain"), "pong"), json!({"value": "pong"}));
        assert_eq!(
            normalize_body(502, Some("text/html"), "bad gateway"),
            json!({"error": "http_error", "details": "bad gateway"})
        );
        assert_eq!(
            normalize_body(404, Some("application/json; charset=utf-8"), r#"{"error":"job_not_found"}"#),
            json!({"error": "job_not_found"})
        );
    }

    #[test]
    fn test_get_requests_never_carry_keys() {
        let request = ApiRequest::get("/v1/health").with_idempotency_key("k");
        assert_eq!(request.idempotency_key, None);
        let mut manual = ApiRequest::get("/v1/health");
        manual.idempotency_key = Some("k".to_string());
        assert_eq!(manual.normalized().idempotency_key, None);
    }

    #[tokio::test]
    async fn test_mutating_calls_get_distinct_keys() {
        let transport = FakeTransport::new(|_| Ok(RawResponse::new(201, r#"{"job_id":"job-1"}"#)));
        let api = client(ClientSettings::default().with_token("tok"), transport.clone());

        let body = json!({"prompt": "crm"});
        api.send(ApiRequest::post("/v1/studio/jobs", body.clone())).await;
        api.send(ApiRequest::post("/v1/studio/jobs", body)).await;
        api.get("/v1/health").await;

        let requests = transport.requests();
        let first = requests[0].header(IDEMPOTENCY_KEY_HEADER).unwrap();
        let second = requests[1].header(IDEMPOTENCY_KEY_HEADER).unwrap();
        assert_ne!(first, second);
        assert!(Uuid::parse_str(first).is_ok());
        assert_eq!(requests[2].header(IDEMPOTENCY_KEY_HEADER), None);
    }

    #[tokio::test]
    async fn test_headers_and_url_join() {
        let transport = FakeTransport::new(|_| Ok(RawResponse::new(200, "")));
        let api = client(
            ClientSettings::default().with_base_url("http://x/"),
            transport.clone(),
        );

        let resp = api.get("v1/health").await;
        assert!(resp.ok);
        assert_eq!(resp.data, json!({}));

        let request = &transport.requests()[0];
        assert_eq!(request.url, "http://x/v1/health");
        assert_eq!(request.header("content-type"), None);
        assert_eq!(request.header("authorization"), None);
        assert_eq!(request.body, None);

        api.send(ApiRequest::delete("/v1/studio/jobs/job-1")).await;
        let request = &transport.requests()[1];
        assert_eq!(request.header("content-type"), None);
        assert!(request.header(IDEMPOTENCY_KEY_HEADER).is_some());
    }

    #[tokio::test]
    async fn test_bearer_and_content_type_with_body() {
        let transport = FakeTransport::new(|_| Ok(RawResponse::new(200, "{}")));
        let api = client(ClientSettings::default().with_token("secret"), transport.clone());

        api.send(ApiRequest::post("/v1/studio/jobs", json!({"prompt": "x"}))).await;
        let request = &transport.requests()[0];
        assert_eq!(request.header("authorization"), Some("Bearer secret"));
        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(request.body.as_deref(), Some(r#"{"prompt":"x"}"#));
    }

    #[tokio::test]
    async fn test_fallback_tried_once_on_network_failure() {
        let transport = FakeTransport::new(|req| {
            if req.url.starts_with("http://primary") {
                Err(TransportError::Connect("connection refused".to_string()))
            } else {
                Ok(RawResponse::new(200, r#"{"status":"ok"}"#))
            }
        });
        let api = client(
            ClientSettings::default()
                .with_base_url("http://primary")
                .with_fallback_base_url("http://secondary/"),
            transport.clone(),
        );

        let body = json!({"prompt": "x"});
        let resp = api.send(ApiRequest::post("/v1/studio/jobs", body)).await;
        assert!(resp.ok);
        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].url, "http://secondary/v1/studio/jobs");
        assert_eq!(
            requests[0].header(IDEMPOTENCY_KEY_HEADER),
            requests[1].header(IDEMPOTENCY_KEY_HEADER)
        );
    }

    #[tokio::test]
    async fn test_no_fallback_for_same_base() {
        let transport =
            FakeTransport::new(|_| Err(TransportError::Connect("connection refused".to_string())));
        let api = client(
            ClientSettings::default()
                .with_base_url("http://primary/")
                .with_fallback_base_url("http://primary"),
            transport.clone(),
        );

        let resp = api.get("/v1/health").await;
        assert!(!resp.ok);
        assert_eq!(resp.status, 0);
        assert_eq!(transport.requests().len(), 1);

        let payload = resp.error_payload().unwrap();
        assert_eq!(payload.kind(), Some(ErrorKind::NetworkError));
        assert_eq!(payload.url.as_deref(), Some("http://primary/v1/health"));
        assert!(payload.message.unwrap().contains("connection refused"));
        assert!(payload.hint.is_some());
    }

    #[tokio::test]
    async fn test_error_status_is_not_retried() {
        let transport = FakeTransport::new(|_| Ok(RawResponse::new(503, "maintenance")));
        let api = client(
            ClientSettings::default()
                .with_base_url("http://primary")
                .with_fallback_base_url("http://secondary"),
            transport.clone(),
        );

        let resp = api.get("/v1/health").await;
        assert!(!resp.ok);
        assert_eq!(resp.status, 503);
        assert_eq!(resp.error_kind(), Some(ErrorKind::HttpError));
        assert_eq!(transport.requests().len(), 1);

        match resp.into_result() {
            Err(CoreError::Api(info)) => {
                assert_eq!(info.status, 503);
                assert_eq!(info.payload.details.as_deref(), Some("maintenance"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreadable_body_is_not_a_network_error() {
        let transport = FakeTransport::new(|_| {
            Err(TransportError::Body {
                status: 200,
                message: "connection reset".to_string(),
            })
        });
        let api = client(
            ClientSettings::default().with_fallback_base_url("http://secondary"),
            transport.clone(),
        );

        let resp = api.get("/v1/health").await;
        assert!(resp.ok);
        assert_eq!(resp.error_kind(), Some(ErrorKind::InvalidResponsePayload));
        assert_eq!(transport.requests().len(), 1);
    }

    async fn spawn_server() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            loop {
                let (stream, _) = match listener.accept().await {
                    Ok(value) => value,
                    Err(_) => break,
                };
                let io = TokioIo::new(stream);

                tokio::spawn(async move {
                    let svc = service_fn(|req: Request<hyper::body::Incoming>| async move {
                        let path = req.uri().path().to_string();
                        let key = req
                            .headers()
                            .get(IDEMPOTENCY_KEY_HEADER)
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string);
                        let auth = req
                            .headers()
                            .get("authorization")
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string);
                        let body = req.into_body().collect().await?.to_bytes();

                        let (status, content_type, payload) = match path.as_str() {
                            "/v1/health" => (
                                StatusCode::OK,
                                "application/json",
                                r#"{"status":"ok","service":"studio"}"#.to_string(),
                            ),
                            "/v1/studio/jobs" => (
                                StatusCode::CREATED,
                                "application/json",
                                json!({
                                    "idempotency_key": key,
                                    "authorization": auth,
                                    "received": String::from_utf8_lossy(&body),
                                })
                                .to_string(),
                            ),
                            "/empty" => (StatusCode::OK, "text/plain", String::new()),
                            "/bad" => (StatusCode::OK, "text/plain", "{bad".to_string()),
                            _ => (StatusCode::NOT_FOUND, "text/plain", "no route".to_string()),
                        };

                        let mut resp = Response::new(Full::new(Bytes::from(payload)));
                        *resp.status_mut() = status;
                        resp.headers_mut()
                            .insert("content-type", content_type.parse().unwrap());
                        Ok::<_, hyper::Error>(resp)
                    });

                    let _ = Builder::new(TokioExecutor::new())
                        .serve_connection(io, svc)
                        .await;
                });
            }
        });

        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_reqwest_transport_end_to_end() {
        let base_url = spawn_server().await;
        let api = ApiClient::new(Arc::new(
            ClientSettings::default()
                .with_base_url("http://127.0.0.1:1")
                .with_fallback_base_url(base_url)
                .with_token("tok"),
        ));

        let health = api.get("/v1/health").await;
        assert!(health.ok);
        assert_eq!(health.data["service"], "studio");

        let created = api
            .send(ApiRequest::post("/v1/studio/jobs", json!({"prompt": "crm"})))
            .await;
        assert_eq!(created.status, 201);
        assert_eq!(created.data["authorization"], "Bearer tok");
        assert_eq!(created.data["received"], r#"{"prompt":"crm"}"#);
        assert!(created.data["idempotency_key"].as_str().is_some());

        let empty = api.get("/empty").await;
        assert!(empty.ok);
        assert_eq!(empty.data, json!({}));

        let bad = api.get("/bad").await;
        assert!(bad.ok);
        assert_eq!(bad.data["error"], "invalid_response_payload");

        let missing = api.get("/nope").await;
        assert!(!missing.ok);
        assert_eq!(missing.status, 404);
        assert_eq!(missing.data["details"], "no route");
    }

    #[tokio::test]
    async fn test_reqwest_transport_connect_failure() {
        let transport = ReqwestTransport::shared();
        let err = transport
            .execute(RawRequest {
                method: Method::GET,
                url: "http://127.0.0.1:1/v1/health".to_string(),
                headers: Vec::new(),
                body: None,
            })
            .await
            .unwrap_err();

        assert!(err.is_pre_response());
        let msg = err.to_string();
        assert!(msg.starts_with("request failed: "), "{msg}");
        assert!(msg.contains("is_connect=true"), "{msg}");
        assert!(msg.contains("is_timeout=false"), "{msg}");
    }
}
