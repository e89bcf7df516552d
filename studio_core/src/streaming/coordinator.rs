//! Job stream coordinator.
//!
//! One session per coordinator. A session seeds state with a snapshot fetch,
//! listens on a push channel, and when the channel fails falls back to
//! fixed-interval polling while a single reconnection is pending. Polling,
//! once started, runs until the session is stopped.
//!
//! Each session is one tokio task. Every callback goes through the session's
//! [`SessionGate`], so once [`JobStreamCoordinator::stop`] returns nothing
//! reaches the handler, even work that was already in flight.

use futures_util::StreamExt;
use parking_lot::{Mutex, ReentrantMutex};
use serde_json::Value;
use std::cell::Cell;
use std::sync::Arc;
use studio_core_types::JobEvent;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinSet};
use tokio::time::{interval_at, sleep_until, Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::channel::{ChannelFrame, FrameStream, PushChannelFactory};
use super::config::StreamConfig;
use super::handler::JobStreamHandler;
use super::types::LinkState;
use crate::errors::{CoreError, CoreResult};
use crate::http::{ApiClient, ApiResponse};
use crate::jobs::JobSnapshot;
use crate::sse::SsePushChannel;
use crate::urls::{job_events_url, job_path};

/// Keeps a consumer's view of one job in sync with the server.
pub struct JobStreamCoordinator {
    api: ApiClient,
    channels: Arc<dyn PushChannelFactory>,
    config: StreamConfig,
    session: Mutex<Option<SessionHandle>>,
    state: Arc<watch::Sender<LinkState>>,
}

impl JobStreamCoordinator {
    pub fn new(
        api: ApiClient,
        channels: Arc<dyn PushChannelFactory>,
        config: StreamConfig,
    ) -> CoreResult<Self> {
        config.validate()?;
        let (state, _) = watch::channel(LinkState::Stopped);
        Ok(Self {
            api,
            channels,
            config,
            session: Mutex::new(None),
            state: Arc::new(state),
        })
    }

    /// Coordinator using SSE over the shared HTTP client.
    pub fn with_sse(api: ApiClient, config: StreamConfig) -> CoreResult<Self> {
        Self::new(api, Arc::new(SsePushChannel::shared()), config)
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Start tracking `job_id`, replacing any current session.
    ///
    /// Must be called from within a tokio runtime.
    pub fn connect(&self, job_id: &str, handler: Arc<dyn JobStreamHandler>) -> CoreResult<()> {
        let job_id = job_id.trim();
        if job_id.is_empty() {
            return Err(CoreError::InvalidInput("job id must not be empty".to_string()));
        }
        let runtime = Handle::try_current().map_err(|_| {
            CoreError::Unsupported("job streams need a running tokio runtime".to_string())
        })?;

        let previous = self.session.lock().take();
        if let Some(previous) = previous {
            info!(job_id = %previous.job_id, "replacing job stream session");
            previous.shutdown();
        }

        let gate = Arc::new(SessionGate::new());
        let cancel = CancellationToken::new();
        let driver = SessionDriver {
            job_id: job_id.to_string(),
            api: self.api.clone(),
            channels: Arc::clone(&self.channels),
            config: self.config,
            handler,
            gate: Arc::clone(&gate),
            state: Arc::clone(&self.state),
            cancel: cancel.clone(),
            channel: None,
            poll: None,
            reconnect_at: None,
            reconnectable: true,
            poll_in_flight: false,
            fetches: JoinSet::new(),
        };

        self.state.send_replace(LinkState::Connecting);
        info!(job_id, "starting job stream session");
        runtime.spawn(driver.run());

        let stale = self.session.lock().replace(SessionHandle {
            job_id: job_id.to_string(),
            gate,
            cancel,
        });
        if let Some(stale) = stale {
            stale.shutdown();
        }
        Ok(())
    }

    /// Stop the current session. Idempotent.
    ///
    /// After this returns no callback of the stopped session will run.
    pub fn stop(&self) {
        let session = self.session.lock().take();
        if let Some(session) = session {
            info!(job_id = %session.job_id, "stopping job stream session");
            session.shutdown();
            self.state.send_replace(LinkState::Stopped);
        }
    }

    pub fn is_active(&self) -> bool {
        self.session.lock().is_some()
    }

    /// Job tracked by the current session.
    pub fn job_id(&self) -> Option<String> {
        self.session.lock().as_ref().map(|s| s.job_id.clone())
    }

    pub fn state(&self) -> LinkState {
        *self.state.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<LinkState> {
        self.state.subscribe()
    }
}

impl Drop for JobStreamCoordinator {
    fn drop(&mut self) {
        self.stop();
    }
}

struct SessionHandle {
    job_id: String,
    gate: Arc<SessionGate>,
    cancel: CancellationToken,
}

impl SessionHandle {
    fn shutdown(self) {
        self.gate.stop();
        self.cancel.cancel();
    }
}

/// Stopped flag checked around every callback.
///
/// Re-entrant so a callback may stop its own session.
struct SessionGate {
    stopped: ReentrantMutex<Cell<bool>>,
}

impl SessionGate {
    fn new() -> Self {
        Self {
            stopped: ReentrantMutex::new(Cell::new(false)),
        }
    }

    /// Blocks until any callback running on another thread has returned.
    fn stop(&self) {
        self.stopped.lock().set(true);
    }

    fn is_stopped(&self) -> bool {
        self.stopped.lock().get()
    }

    /// Run `f` unless stopped. Returns whether it ran.
    fn dispatch(&self, f: impl FnOnce()) -> bool {
        let guard = self.stopped.lock();
        if guard.get() {
            return false;
        }
        f();
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchKind {
    Initial,
    Poll,
}

struct SessionDriver {
    job_id: String,
    api: ApiClient,
    channels: Arc<dyn PushChannelFactory>,
    config: StreamConfig,
    handler: Arc<dyn JobStreamHandler>,
    gate: Arc<SessionGate>,
    state: Arc<watch::Sender<LinkState>>,
    cancel: CancellationToken,
    channel: Option<FrameStream>,
    poll: Option<Interval>,
    reconnect_at: Option<Instant>,
    reconnectable: bool,
    poll_in_flight: bool,
    fetches: JoinSet<(FetchKind, ApiResponse)>,
}

impl SessionDriver {
    async fn run(mut self) {
        self.spawn_fetch(FetchKind::Initial);
        self.open_channel();

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                frame = next_frame(&mut self.channel), if self.channel.is_some() => {
                    self.on_frame(frame);
                }
                Some(joined) = self.fetches.join_next(), if !self.fetches.is_empty() => {
                    self.on_fetch(joined);
                }
                _ = next_tick(&mut self.poll), if self.poll.is_some() => {
                    self.spawn_fetch(FetchKind::Poll);
                }
                _ = sleep_until_deadline(self.reconnect_at), if self.reconnect_at.is_some() => {
                    self.reconnect_at = None;
                    debug!(job_id = %self.job_id, "reconnecting job stream");
                    self.open_channel();
                }
            }
        }

        self.fetches.shutdown().await;
        debug!(job_id = %self.job_id, "job stream session ended");
    }

    /// At most one poll is outstanding; a tick that lands while the previous
    /// poll is still running is skipped.
    fn spawn_fetch(&mut self, kind: FetchKind) {
        if self.gate.is_stopped() {
            return;
        }
        if kind == FetchKind::Poll {
            if self.poll_in_flight {
                debug!(job_id = %self.job_id, "previous poll still running, skipping tick");
                return;
            }
            self.poll_in_flight = true;
        }
        let api = self.api.clone();
        let path = job_path(&self.job_id);
        self.fetches.spawn(async move { (kind, api.get(&path).await) });
    }

    fn open_channel(&mut self) {
        self.set_state(LinkState::Connecting);
        let token = self.api.token();
        let url = match job_events_url(&self.api.base_url(), &self.job_id, token.as_deref()) {
            Ok(url) => url,
            Err(err) => {
                // Settings may be corrected later; the reconnect rebuilds the URL.
                warn!(job_id = %self.job_id, error = %err, "cannot build event stream url, polling");
                self.dispatch(|h| h.on_error(&err));
                self.degrade();
                return;
            }
        };

        match self.channels.open(url) {
            Ok(stream) => self.channel = Some(stream),
            Err(err) => {
                info!(job_id = %self.job_id, error = %err, "push channel unavailable, polling only");
                self.reconnectable = false;
                self.degrade();
            }
        }
    }

    /// Drop the channel, make sure polling runs, and schedule one reconnect.
    fn degrade(&mut self) {
        self.channel = None;
        if self.poll.is_none() {
            let period = self.config.poll_interval;
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            self.poll = Some(interval);
        }
        if self.reconnectable && self.reconnect_at.is_none() {
            self.reconnect_at = Some(Instant::now() + self.config.reconnect_delay);
        }
        self.set_state(LinkState::Degraded);
    }

    fn on_frame(&mut self, frame: Option<Result<ChannelFrame, CoreError>>) {
        match frame {
            None => {
                warn!(job_id = %self.job_id, "job stream closed");
                self.degrade();
            }
            Some(Err(err)) => {
                warn!(job_id = %self.job_id, error = %err, "job stream failed");
                self.degrade();
            }
            Some(Ok(ChannelFrame::Opened)) => self.set_state(LinkState::Live),
            Some(Ok(ChannelFrame::Message(data))) => match serde_json::from_str::<JobEvent>(&data) {
                Ok(event) => {
                    self.dispatch(|h| h.on_event(&event));
                }
                Err(err) => {
                    debug!(job_id = %self.job_id, error = %err, "dropping malformed event frame");
                }
            },
            Some(Ok(ChannelFrame::Named { event, data })) => self.on_named(&event, &data),
        }
    }

    fn on_named(&mut self, event: &str, data: &str) {
        match event {
            "job" => {
                let parsed = serde_json::from_str::<Value>(data)
                    .map_err(|e| CoreError::protocol(e.to_string()))
                    .and_then(JobSnapshot::from_value);
                match parsed {
                    Ok(snapshot) => {
                        self.dispatch(|h| h.on_snapshot(&snapshot));
                    }
                    Err(err) => {
                        debug!(job_id = %self.job_id, error = %err, "dropping malformed job frame");
                    }
                }
            }
            "error" => {
                let err = server_error(&self.job_id, data);
                warn!(job_id = %self.job_id, error = %err, "server reported stream error");
                self.dispatch(|h| h.on_error(&err));
            }
            other => {
                debug!(job_id = %self.job_id, event = other, "ignoring unknown named frame");
            }
        }
    }

    fn on_fetch(&mut self, joined: Result<(FetchKind, ApiResponse), JoinError>) {
        let (kind, resp) = match joined {
            Ok(done) => done,
            Err(err) => {
                self.poll_in_flight = false;
                if !err.is_cancelled() {
                    warn!(job_id = %self.job_id, error = %err, "snapshot fetch task failed");
                }
                return;
            }
        };
        if kind == FetchKind::Poll {
            self.poll_in_flight = false;
        }

        match JobSnapshot::from_response(resp) {
            Ok(snapshot) => {
                self.dispatch(|h| h.on_snapshot(&snapshot));
            }
            Err(err) if kind == FetchKind::Initial => {
                debug!(job_id = %self.job_id, error = %err, "initial snapshot fetch failed");
            }
            Err(err) => {
                debug!(job_id = %self.job_id, error = %err, "snapshot poll failed");
                self.dispatch(|h| h.on_error(&err));
            }
        }
    }

    fn set_state(&self, next: LinkState) {
        self.dispatch(|h| {
            self.state.send_replace(next);
            h.on_state(next);
        });
    }

    fn dispatch(&self, f: impl FnOnce(&dyn JobStreamHandler)) -> bool {
        let handler = self.handler.as_ref();
        self.gate.dispatch(|| f(handler))
    }
}

fn server_error(job_id: &str, data: &str) -> CoreError {
    let value = serde_json::from_str::<Value>(data).unwrap_or(Value::Null);
    let code = value.get("error").and_then(Value::as_str);
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .or(code)
        .unwrap_or(data);
    CoreError::job(job_id, message, code)
}

async fn next_frame(channel: &mut Option<FrameStream>) -> Option<Result<ChannelFrame, CoreError>> {
    match channel {
        Some(stream) => stream.next().await,
        None => std::future::pending().await,
    }
}

async fn next_tick(poll: &mut Option<Interval>) {
    match poll {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}
