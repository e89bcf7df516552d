//! Studio core library.
//!
//! This crate keeps a client's view of long-running studio jobs consistent
//! over an unreliable network:
//! - HTTP transport with idempotent submission and normalized result envelopes
//! - Settings and credential source
//! - SSE push channel
//! - Job stream coordinator with polling fallback and reconnection
//! - Observable job store
//! - Typed studio endpoints

pub mod api;
pub mod config;
pub mod errors;
pub mod http;
pub mod jobs;
pub mod shared_client;
pub mod sse;
pub mod store;
pub mod streaming;
pub mod urls;

#[cfg(test)]
pub(crate) mod testing;

// Re-export core types at crate root for convenience
pub use api::StudioApi;
pub use config::{ClientConfig, ClientSettings, CredentialSource, Settings};
pub use errors::{ApiErrorInfo, CoreError, CoreResult, JobErrorInfo};
pub use http::{
    ApiClient, ApiRequest, ApiResponse, HttpTransport, RawRequest, RawResponse, ReqwestTransport,
    TransportError,
};
pub use jobs::{JobSnapshot, JobStatus};
pub use sse::SsePushChannel;
pub use store::{JobStore, JobTracker, JobView};
pub use streaming::{
    BufferedHandler, CallbackHandler, ChannelFrame, JobStreamCoordinator, JobStreamHandler,
    LinkState, NoPushChannel, PushChannelFactory, StreamConfig,
};
