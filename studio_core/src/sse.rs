//! Server-Sent Events (SSE) streaming helpers.
//!
//! A thin wrapper over reqwest + eventsource-stream, plus the SSE-backed
//! [`PushChannelFactory`] used by the job stream coordinator.

use eventsource_stream::Eventsource;
use futures_util::{future, stream, Stream, StreamExt};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use studio_core_types::ErrorPayload;
use tracing::debug;
use url::Url;

use crate::errors::{CoreError, CoreResult};
use crate::http::normalize_body;
use crate::shared_client::SHARED_CLIENT;
use crate::streaming::{ChannelFrame, FrameStream, PushChannelFactory};

/// Parsed SSE event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SseEvent {
    pub event: String,
    pub data: String,
    pub id: String,
    pub retry: Option<std::time::Duration>,
}

impl SseEvent {
    /// Events without a name (or the default `message` name).
    pub fn is_unnamed(&self) -> bool {
        self.event.is_empty() || self.event == "message"
    }
}

impl From<SseEvent> for ChannelFrame {
    fn from(evt: SseEvent) -> Self {
        if evt.is_unnamed() {
            ChannelFrame::Message(evt.data)
        } else {
            ChannelFrame::Named {
                event: evt.event,
                data: evt.data,
            }
        }
    }
}

/// Stream of SSE events.
pub type SseStream = Pin<Box<dyn Stream<Item = Result<SseEvent, CoreError>> + Send>>;

/// Open an SSE stream with a GET request.
///
/// Non-2xx responses fail with [`CoreError::Api`] carrying the normalized body.
pub async fn stream_sse(
    client: &reqwest::Client,
    url: &str,
    mut headers: HeaderMap,
) -> CoreResult<SseStream> {
    headers
        .entry(ACCEPT)
        .or_insert(HeaderValue::from_static("text/event-stream"));

    let resp = client.get(url).headers(headers).send().await?;
    let status = resp.status();
    if !status.is_success() {
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp.text().await.unwrap_or_default();
        let data = normalize_body(status.as_u16(), content_type.as_deref(), &body);
        let payload = ErrorPayload::from_value(&data)
            .unwrap_or_else(|| ErrorPayload::http_error(body));
        return Err(CoreError::api(status.as_u16(), payload));
    }

    let stream = resp.bytes_stream().eventsource().map(|item| match item {
        Ok(evt) => Ok(SseEvent {
            event: evt.event,
            data: evt.data,
            id: evt.id,
            retry: evt.retry,
        }),
        Err(err) => Err(CoreError::Protocol(err.to_string())),
    });

    Ok(Box::pin(stream))
}

/// [`PushChannelFactory`] backed by SSE.
///
/// Connecting happens lazily when the returned stream is first polled, so
/// `open` itself never fails; connection errors arrive as the stream's
/// first item.
#[derive(Clone)]
pub struct SsePushChannel {
    client: reqwest::Client,
}

impl SsePushChannel {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn shared() -> Self {
        Self::new(SHARED_CLIENT.clone())
    }
}

impl Default for SsePushChannel {
    fn default() -> Self {
        Self::shared()
    }
}

impl PushChannelFactory for SsePushChannel {
    fn open(&self, url: Url) -> CoreResult<FrameStream> {
        let client = self.client.clone();
        let connect = async move {
            debug!(url = %redact(&url), "opening event stream");
            stream_sse(&client, url.as_str(), HeaderMap::new()).await
        };

        let frames = stream::once(connect).flat_map(|result| match result {
            Ok(events) => {
                let events = events
                    // retry-only and comment-only dispatches carry nothing
                    .filter(|item| future::ready(!matches!(item, Ok(evt) if evt.data.is_empty())))
                    .map(|item| item.map(ChannelFrame::from));
                stream::once(future::ready(Ok(ChannelFrame::Opened)))
                    .chain(events)
                    .boxed()
            }
            Err(err) => stream::once(future::ready(Err(err))).boxed(),
        });
        Ok(frames.boxed())
    }
}

/// The events URL carries the credential; keep it out of logs.
fn redact(url: &Url) -> String {
    let mut shown = url.clone();
    shown.set_query(None);
    shown.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http_body_util::Full;
    use hyper::service::service_fn;
    use hyper::{Request, Response, StatusCode};
    use hyper_util::rt::{TokioExecutor, TokioIo};
    use hyper_util::server::conn::auto::Builder;
    use tokio::net::TcpListener;

    const JOB_STREAM: &str = "retry: 1000\n\n\
        event: job\ndata: {\"job_id\":\"job-1\",\"status\":\"queued\"}\n\n\
        : keepalive\n\n\
        data: {\"type\":\"phase\",\"phase\":\"plan\"}\n\n\
        event: error\ndata: {\"error\":\"job_not_found\"}\n\n";

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
                        let (status, content_type, body) = match req.uri().path() {
                            "/v1/studio/jobs/job-1/events" => {
                                (StatusCode::OK, "text/event-stream", JOB_STREAM)
                            }
                            _ => (
                                StatusCode::NOT_FOUND,
                                "application/json",
                                "{\"error\":\"job_not_found\"}",
                            ),
                        };
                        let mut resp = Response::new(Full::new(Bytes::from_static(body.as_bytes())));
                        *resp.status_mut() = status;
                        resp.headers_mut()
                            .insert("content-type", HeaderValue::from_static(content_type));
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

    #[test]
    fn test_frame_from_event() {
        let unnamed = SseEvent {
            event: "message".to_string(),
            data: "{}".to_string(),
            id: String::new(),
            retry: None,
        };
        assert_eq!(ChannelFrame::from(unnamed), ChannelFrame::Message("{}".to_string()));

        let named = SseEvent {
            event: "job".to_string(),
            data: "{}".to_string(),
            id: String::new(),
            retry: None,
        };
        assert_eq!(ChannelFrame::from(named), ChannelFrame::named("job", "{}"));
    }

    #[test]
    fn test_redact_drops_token() {
        let url = Url::parse("http://x/v1/studio/jobs/j/events?token=secret").unwrap();
        assert_eq!(redact(&url), "http://x/v1/studio/jobs/j/events");
    }

    #[tokio::test]
    async fn test_sse_channel_frames() {
        let base = spawn_server().await;
        let url = Url::parse(&format!("{base}/v1/studio/jobs/job-1/events?token=t")).unwrap();

        let frames: Vec<_> = SsePushChannel::shared().open(url).unwrap().collect().await;
        let frames: Vec<ChannelFrame> = frames.into_iter().map(Result::unwrap).collect();
        assert_eq!(
            frames,
            vec![
                ChannelFrame::Opened,
                ChannelFrame::named("job", "{\"job_id\":\"job-1\",\"status\":\"queued\"}"),
                ChannelFrame::Message("{\"type\":\"phase\",\"phase\":\"plan\"}".to_string()),
                ChannelFrame::named("error", "{\"error\":\"job_not_found\"}"),
            ]
        );
    }

    #[tokio::test]
    async fn test_sse_channel_rejected_connection() {
        let base = spawn_server().await;
        let url = Url::parse(&format!("{base}/v1/studio/jobs/missing/events")).unwrap();

        let frames: Vec<_> = SsePushChannel::shared().open(url).unwrap().collect().await;
        assert_eq!(frames.len(), 1);
        match &frames[0] {
            Err(CoreError::Api(info)) => {
                assert_eq!(info.status, 404);
                assert_eq!(info.payload.error, "job_not_found");
            }
            other => panic!("unexpected frame: {other:?}"),
        }
    }
}
