//! Job stream synchronization.
//!
//! - [`PushChannelFactory`]: the live channel primitive (SSE by default)
//! - [`JobStreamCoordinator`]: one session per tracked job, push with a
//!   polling fallback and background reconnection
//! - [`JobStreamHandler`]: consumer callbacks, plus closure and buffering
//!   implementations

pub mod channel;
pub mod config;
pub mod coordinator;
pub mod handler;
pub mod types;

pub use channel::{ChannelFrame, FrameStream, NoPushChannel, PushChannelFactory};
pub use config::StreamConfig;
pub use coordinator::JobStreamCoordinator;
pub use handler::{BufferedHandler, CallbackHandler, JobStreamHandler, StreamRecord};
pub use types::LinkState;
