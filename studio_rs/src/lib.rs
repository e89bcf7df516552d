//! # Studio SDK
//!
//! Ergonomic Rust SDK for the studio app-generation API.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use studio::{Studio, StudioJobRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), studio::Error> {
//!     // Reads STUDIO_API_TOKEN / STUDIO_BASE_URL / STUDIO_FALLBACK_URL
//!     let studio = Studio::from_env()?;
//!
//!     let job_id = studio
//!         .submit_job(&StudioJobRequest::new("inventory tracker for a bakery"))
//!         .await?;
//!
//!     let tracker = studio.watch_job(&job_id)?;
//!     let mut updates = tracker.subscribe();
//!     while updates.changed().await.is_ok() {
//!         println!("{:?}", tracker.view().snapshot);
//!     }
//!     Ok(())
//! }
//! ```

use std::sync::Arc;
use thiserror::Error;
use tracing::info;

// Re-export core for advanced usage
pub use studio_core as core;
pub use studio_core_types as types;

pub use studio_core::{
    ApiClient, ApiResponse, BufferedHandler, CallbackHandler, ClientSettings, CoreError,
    CredentialSource, HttpTransport, JobSnapshot, JobStatus, JobStore, JobStreamCoordinator,
    JobStreamHandler, JobTracker, JobView, LinkState, Settings, StreamConfig, StudioApi,
};
pub use studio_core_types::{ErrorKind, ErrorPayload, GenerationDepth, JobEvent, StudioJobRequest};

/// SDK version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// SDK error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Core error passthrough.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Job submission failed.
    #[error("job submission failed: {0}")]
    Submission(String),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Main studio client.
///
/// Settings are shared: changing the token or base URL through
/// [`Studio::settings`] applies to the next request of this client and of
/// every tracker it has handed out.
pub struct Studio {
    settings: Arc<Settings>,
    api: ApiClient,
    stream_config: StreamConfig,
}

impl Studio {
    /// Create a client over the shared HTTP transport.
    pub fn new(settings: Arc<Settings>) -> Result<Self> {
        let credentials: Arc<dyn CredentialSource> = settings.clone();
        Self::build(settings, ApiClient::new(credentials))
    }

    /// Create a client with a custom transport.
    pub fn with_transport(settings: Arc<Settings>, transport: Arc<dyn HttpTransport>) -> Result<Self> {
        let credentials: Arc<dyn CredentialSource> = settings.clone();
        Self::build(settings, ApiClient::with_transport(credentials, transport))
    }

    /// Create a client from the `STUDIO_*` environment variables.
    ///
    /// A token is optional; a local studio server accepts anonymous calls.
    pub fn from_env() -> Result<Self> {
        Self::new(Arc::new(Settings::from_env()))
    }

    fn build(settings: Arc<Settings>, api: ApiClient) -> Result<Self> {
        let current = settings.snapshot();
        studio_core::urls::validate_base_url(&current.base_url)
            .map_err(|e| Error::Config(format!("base URL: {e}")))?;
        if let Some(fallback) = current.fallback_base_url.as_deref() {
            studio_core::urls::validate_base_url(fallback)
                .map_err(|e| Error::Config(format!("fallback URL: {e}")))?;
        }
        Ok(Self {
            settings,
            api,
            stream_config: StreamConfig::default(),
        })
    }

    /// Override poll and reconnect timing for trackers created afterwards.
    pub fn with_stream_config(mut self, config: StreamConfig) -> Result<Self> {
        config.validate()?;
        self.stream_config = config;
        Ok(self)
    }

    pub fn settings(&self) -> &Arc<Settings> {
        &self.settings
    }

    /// Access the underlying core client.
    pub fn core(&self) -> &ApiClient {
        &self.api
    }

    /// Typed studio endpoints.
    pub fn api(&self) -> StudioApi<'_> {
        self.api.studio()
    }

    /// Submit a job and return its id.
    pub async fn submit_job(&self, request: &StudioJobRequest) -> Result<String> {
        let data = self.api().create_job(request).await?.into_result()?;
        let snapshot = JobSnapshot::from_value(data)?;
        let job_id = snapshot
            .job_id()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::Submission("response carried no job id".to_string()))?
            .to_string();
        info!(job_id = %job_id, "studio job submitted");
        Ok(job_id)
    }

    /// Start tracking `job_id` over SSE with polling fallback.
    ///
    /// Must be called inside a tokio runtime. Dropping the tracker stops
    /// the session.
    pub fn watch_job(&self, job_id: &str) -> Result<JobTracker> {
        let coordinator = JobStreamCoordinator::with_sse(self.api.clone(), self.stream_config)?;
        let tracker = JobTracker::new(coordinator);
        tracker.connect(job_id)?;
        Ok(tracker)
    }
}
