//! Observable job state for presentation layers.
//!
//! [`JobStore`] holds the latest snapshot, the append-only event log and the
//! connection status of one tracked job. Every change bumps a version number
//! published on a watch channel; subscribers re-read the view when it moves.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use studio_core_types::JobEvent;
use tokio::sync::watch;

use crate::errors::{CoreError, CoreResult};
use crate::jobs::JobSnapshot;
use crate::streaming::{JobStreamCoordinator, JobStreamHandler, LinkState};

/// Point-in-time copy of a [`JobStore`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JobView {
    pub job_id: Option<String>,
    pub snapshot: Option<JobSnapshot>,
    pub events: Vec<JobEvent>,
    pub connected: bool,
    pub link: LinkState,
    pub error: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct JobStore {
    view: RwLock<JobView>,
    version: watch::Sender<u64>,
}

impl Default for JobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl JobStore {
    pub fn new() -> Self {
        let (version, _) = watch::channel(0);
        Self {
            view: RwLock::new(JobView::default()),
            version,
        }
    }

    pub fn view(&self) -> JobView {
        self.view.read().clone()
    }

    pub fn snapshot(&self) -> Option<JobSnapshot> {
        self.view.read().snapshot.clone()
    }

    pub fn events(&self) -> Vec<JobEvent> {
        self.view.read().events.clone()
    }

    pub fn is_connected(&self) -> bool {
        self.view.read().connected
    }

    pub fn error(&self) -> Option<String> {
        self.view.read().error.clone()
    }

    pub fn version(&self) -> u64 {
        *self.version.borrow()
    }

    /// Receiver that wakes on every change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }

    pub fn replace_snapshot(&self, snapshot: JobSnapshot) {
        self.update(|v| v.snapshot = Some(snapshot));
    }

    /// Append in arrival order. Duplicates are kept.
    pub fn append_event(&self, event: JobEvent) {
        self.update(|v| v.events.push(event));
    }

    pub fn record_error(&self, message: impl Into<String>) {
        let message = message.into();
        self.update(|v| {
            v.error = Some(message);
            v.connected = false;
        });
    }

    /// Start tracking `job_id`: clear events and error, mark connected.
    /// The snapshot is kept only when re-tracking the same job.
    pub fn begin(&self, job_id: &str) {
        self.update(|v| {
            if v.job_id.as_deref() != Some(job_id) {
                v.snapshot = None;
            }
            v.job_id = Some(job_id.to_string());
            v.events.clear();
            v.error = None;
            v.connected = true;
            v.link = LinkState::Connecting;
        });
    }

    pub fn mark_disconnected(&self) {
        self.update(|v| {
            v.connected = false;
            v.link = LinkState::Stopped;
        });
    }

    /// Drop all state.
    pub fn reset(&self) {
        self.update(|v| *v = JobView::default());
    }

    fn update(&self, f: impl FnOnce(&mut JobView)) {
        {
            let mut view = self.view.write();
            f(&mut view);
            view.updated_at = Some(Utc::now());
        }
        self.version.send_modify(|n| *n += 1);
    }
}

impl JobStreamHandler for JobStore {
    fn on_snapshot(&self, snapshot: &JobSnapshot) {
        self.replace_snapshot(snapshot.clone());
    }

    fn on_event(&self, event: &JobEvent) {
        self.append_event(event.clone());
    }

    fn on_error(&self, error: &CoreError) {
        self.record_error(error.to_string());
    }

    fn on_state(&self, state: LinkState) {
        self.update(|v| {
            v.link = state;
            v.connected = state.is_active();
        });
    }
}

/// One coordinator feeding one store.
pub struct JobTracker {
    coordinator: JobStreamCoordinator,
    store: Arc<JobStore>,
}

impl JobTracker {
    pub fn new(coordinator: JobStreamCoordinator) -> Self {
        Self::with_store(coordinator, Arc::new(JobStore::new()))
    }

    pub fn with_store(coordinator: JobStreamCoordinator, store: Arc<JobStore>) -> Self {
        Self { coordinator, store }
    }

    pub fn store(&self) -> &Arc<JobStore> {
        &self.store
    }

    pub fn coordinator(&self) -> &JobStreamCoordinator {
        &self.coordinator
    }

    pub fn view(&self) -> JobView {
        self.store.view()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.store.subscribe()
    }

    /// Stop any current session and start tracking `job_id`.
    pub fn connect(&self, job_id: &str) -> CoreResult<()> {
        self.disconnect();
        self.store.begin(job_id.trim());
        let handler: Arc<dyn JobStreamHandler> = self.store.clone();
        if let Err(err) = self.coordinator.connect(job_id, handler) {
            self.store.record_error(err.to_string());
            self.store.mark_disconnected();
            return Err(err);
        }
        Ok(())
    }

    pub fn disconnect(&self) {
        self.coordinator.stop();
        self.store.mark_disconnected();
    }

    /// Disconnect and forget everything about the tracked job.
    pub fn clear(&self) {
        self.disconnect();
        self.store.reset();
    }
}
