//! Job stream handler trait and built-in handlers.
//!
//! All callbacks of a session are invoked from the session's task, one at a
//! time, and never after the session is stopped.

use parking_lot::Mutex;
use studio_core_types::JobEvent;

use super::types::LinkState;
use crate::errors::CoreError;
use crate::jobs::JobSnapshot;

/// Consumer callbacks for a job stream session.
pub trait JobStreamHandler: Send + Sync {
    /// A full snapshot replaced the previous one.
    fn on_snapshot(&self, snapshot: &JobSnapshot);

    /// An incremental event arrived.
    fn on_event(&self, event: &JobEvent);

    /// A poll failed or the server reported an error on the channel.
    fn on_error(&self, _error: &CoreError) {}

    /// The session's link state changed. May repeat the current state.
    fn on_state(&self, _state: LinkState) {}
}

type SnapshotFn = Box<dyn Fn(&JobSnapshot) + Send + Sync>;
type EventFn = Box<dyn Fn(&JobEvent) + Send + Sync>;
type ErrorFn = Box<dyn Fn(&CoreError) + Send + Sync>;
type StateFn = Box<dyn Fn(LinkState) + Send + Sync>;

/// A handler built from closures.
pub struct CallbackHandler {
    on_snapshot: SnapshotFn,
    on_event: EventFn,
    on_error: Option<ErrorFn>,
    on_state: Option<StateFn>,
}

impl CallbackHandler {
    pub fn new<S, E>(on_snapshot: S, on_event: E) -> Self
    where
        S: Fn(&JobSnapshot) + Send + Sync + 'static,
        E: Fn(&JobEvent) + Send + Sync + 'static,
    {
        Self {
            on_snapshot: Box::new(on_snapshot),
            on_event: Box::new(on_event),
            on_error: None,
            on_state: None,
        }
    }

    pub fn with_error<F>(mut self, on_error: F) -> Self
    where
        F: Fn(&CoreError) + Send + Sync + 'static,
    {
        self.on_error = Some(Box::new(on_error));
        self
    }

    pub fn with_state<F>(mut self, on_state: F) -> Self
    where
        F: Fn(LinkState) + Send + Sync + 'static,
    {
        self.on_state = Some(Box::new(on_state));
        self
    }
}

impl JobStreamHandler for CallbackHandler {
    fn on_snapshot(&self, snapshot: &JobSnapshot) {
        (self.on_snapshot)(snapshot);
    }

    fn on_event(&self, event: &JobEvent) {
        (self.on_event)(event);
    }

    fn on_error(&self, error: &CoreError) {
        if let Some(ref f) = self.on_error {
            f(error);
        }
    }

    fn on_state(&self, state: LinkState) {
        if let Some(ref f) = self.on_state {
            f(state);
        }
    }
}

/// One callback invocation recorded by [`BufferedHandler`].
#[derive(Debug, Clone, PartialEq)]
pub enum StreamRecord {
    Snapshot(JobSnapshot),
    Event(JobEvent),
    /// Rendered error message.
    Error(String),
    State(LinkState),
}

/// A handler that records every callback in arrival order.
#[derive(Debug, Default)]
pub struct BufferedHandler {
    records: Mutex<Vec<StreamRecord>>,
}

impl BufferedHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records, in arrival order.
    pub fn records(&self) -> Vec<StreamRecord> {
        self.records.lock().clone()
    }

    pub fn snapshots(&self) -> Vec<JobSnapshot> {
        self.collect(|r| match r {
            StreamRecord::Snapshot(s) => Some(s.clone()),
            _ => None,
        })
    }

    pub fn events(&self) -> Vec<JobEvent> {
        self.collect(|r| match r {
            StreamRecord::Event(e) => Some(e.clone()),
            _ => None,
        })
    }

    pub fn errors(&self) -> Vec<String> {
        self.collect(|r| match r {
            StreamRecord::Error(e) => Some(e.clone()),
            _ => None,
        })
    }

    pub fn states(&self) -> Vec<LinkState> {
        self.collect(|r| match r {
            StreamRecord::State(s) => Some(*s),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }

    fn collect<T>(&self, f: impl Fn(&StreamRecord) -> Option<T>) -> Vec<T> {
        self.records.lock().iter().filter_map(f).collect()
    }

    fn push(&self, record: StreamRecord) {
        self.records.lock().push(record);
    }
}

impl JobStreamHandler for BufferedHandler {
    fn on_snapshot(&self, snapshot: &JobSnapshot) {
        self.push(StreamRecord::Snapshot(snapshot.clone()));
    }

    fn on_event(&self, event: &JobEvent) {
        self.push(StreamRecord::Event(event.clone()));
    }

    fn on_error(&self, error: &CoreError) {
        self.push(StreamRecord::Error(error.to_string()));
    }

    fn on_state(&self, state: LinkState) {
        self.push(StreamRecord::State(state));
    }
}
