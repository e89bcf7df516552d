//! Typed studio endpoints.
//!
//! # Example
//!
//! ```ignore
//! use studio_core::{ApiClient, Settings};
//! use studio_core_types::StudioJobRequest;
//!
//! let api = ApiClient::new(Arc::new(Settings::from_env()));
//! let resp = api.studio().create_job(&StudioJobRequest::new("inventory tracker")).await?;
//! let job_id = resp.data["job_id"].as_str();
//! ```

pub mod studio;

pub use studio::StudioApi;
