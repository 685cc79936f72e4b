// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # vladFM Fetch
//!
//! API gateway for the vladFM backend.
//!
//! This crate provides:
//!
//! - [`gateway::ApiGateway`] - Typed façade over the `/api` endpoints
//! - [`http::HttpGateway`] - reqwest-backed implementation with a request deadline
//! - [`memory::MemoryGateway`] - In-memory implementation for tests and offline use
//! - [`client::HttpClient`] - HTTP client with tracing and segment-encoded paths
//! - [`retry::RetryPolicy`] - Caller-side retries for idempotent reads
//!
//! ## Example
//!
//! ```ignore
//! use vladfm_fetch::{ApiGateway, GatewaySettings, HttpGateway};
//! use vladfm_core::FeedSort;
//!
//! let gateway = HttpGateway::new(&GatewaySettings::new("https://vlad.fm/api"))?;
//! let page = gateway.list_posts(FeedSort::Top, None, 1).await?;
//! println!("{} posts, {} pages", page.items.len(), page.total_pages);
//! ```

pub mod client;
pub mod error;
pub mod gateway;
pub mod http;
pub mod memory;
pub mod retry;
pub mod settings;

// Re-export key types at crate root
pub use client::HttpClient;
pub use error::GatewayError;
pub use gateway::ApiGateway;
pub use http::HttpGateway;
pub use memory::MemoryGateway;
pub use retry::{RetryPolicy, Retryable};
pub use settings::{GatewaySettings, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, USER_AGENT};
