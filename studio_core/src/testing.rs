//! In-process fakes for the transport and push channel seams.

use futures_util::stream::{self, StreamExt};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::mpsc;
use url::Url;

use crate::errors::{CoreError, CoreResult};
use crate::http::{HttpTransport, RawRequest, RawResponse, TransportError};
use crate::streaming::{ChannelFrame, FrameStream, PushChannelFactory};

type Responder = Box<dyn Fn(&RawRequest) -> Result<RawResponse, TransportError> + Send + Sync>;

/// Transport answering from a closure and recording every request.
pub(crate) struct FakeTransport {
    responder: Responder,
    requests: Mutex<Vec<RawRequest>>,
}

impl FakeTransport {
    pub(crate) fn new<F>(responder: F) -> Arc<Self>
    where
        F: Fn(&RawRequest) -> Result<RawResponse, TransportError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn requests(&self) -> Vec<RawRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait::async_trait]
impl HttpTransport for FakeTransport {
    async fn execute(&self, request: RawRequest) -> Result<RawResponse, TransportError> {
        let result = (self.responder)(&request);
        self.requests.lock().push(request);
        result
    }
}

pub(crate) type FrameSender = mpsc::UnboundedSender<Result<ChannelFrame, CoreError>>;

/// Channel factory handing out scripted channels in order.
///
/// Each [`ScriptedChannels::script`] call queues one channel and returns the
/// sender that feeds it; dropping the sender closes the channel. Once the
/// queue is empty, further opens yield channels that never produce a frame.
#[derive(Default)]
pub(crate) struct ScriptedChannels {
    queue: Mutex<VecDeque<mpsc::UnboundedReceiver<Result<ChannelFrame, CoreError>>>>,
    opened: Mutex<Vec<Url>>,
}

impl ScriptedChannels {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn script(&self) -> FrameSender {
        let (tx, rx) = mpsc::unbounded_channel();
        self.queue.lock().push_back(rx);
        tx
    }

    /// URLs of every channel opened so far.
    pub(crate) fn opened(&self) -> Vec<Url> {
        self.opened.lock().clone()
    }
}

impl PushChannelFactory for ScriptedChannels {
    fn open(&self, url: Url) -> CoreResult<FrameStream> {
        self.opened.lock().push(url);
        match self.queue.lock().pop_front() {
            Some(rx) => Ok(stream::unfold(rx, |mut rx| async move {
                rx.recv().await.map(|item| (item, rx))
            })
            .boxed()),
            None => Ok(stream::pending().boxed()),
        }
    }
}
