//! Push channel primitive.
//!
//! A channel is a stream of frames scoped to one job. The stream ending means
//! the channel closed; an `Err` item means it errored. Either way the
//! coordinator drops it and degrades to polling.

use futures_util::stream::BoxStream;
use url::Url;

use crate::errors::{CoreError, CoreResult};

/// One frame received on a push channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelFrame {
    /// The channel is established.
    Opened,
    /// Unnamed message; carries a JSON-encoded job event.
    Message(String),
    /// Named message, e.g. `job` (full snapshot) or `error`.
    Named { event: String, data: String },
}

impl ChannelFrame {
    pub fn named(event: impl Into<String>, data: impl Into<String>) -> Self {
        ChannelFrame::Named {
            event: event.into(),
            data: data.into(),
        }
    }
}

pub type FrameStream = BoxStream<'static, Result<ChannelFrame, CoreError>>;

/// Opens push channels.
///
/// `open` returning `Err` means the environment cannot construct a channel
/// at all; the coordinator then polls for the rest of the session and never
/// tries to reconnect. Connection failures belong in the returned stream.
pub trait PushChannelFactory: Send + Sync {
    fn open(&self, url: Url) -> CoreResult<FrameStream>;
}

/// Factory for environments without push channel support.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPushChannel;

impl PushChannelFactory for NoPushChannel {
    fn open(&self, _url: Url) -> CoreResult<FrameStream> {
        Err(CoreError::Unsupported(
            "push channels are not available".to_string(),
        ))
    }
}
