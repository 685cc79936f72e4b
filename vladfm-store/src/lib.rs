// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # vladFM Store
//!
//! Client state for vladFM.
//!
//! This crate provides:
//!
//! - **IdentityProvider**: Stable anonymous fingerprint with injectable storage
//! - **FeedController**: Race-safe feed paging, sorting and tag filtering
//! - **VoteCoordinator**: Server-confirmed votes for the post on screen
//! - **PostStore** / **SiteStore**: Open post, comments, tags, stats, regulars
//! - **ClientConfig**: JSON configuration with secure persistence
//!
//! ## Usage
//!
//! ```ignore
//! use vladfm_store::{AppState, ClientConfig, FileIdentityStorage};
//! use vladfm_core::FeedSort;
//!
//! let config = ClientConfig::load().await?;
//! let state = AppState::connect(config, Arc::new(FileIdentityStorage::default_location()))?;
//!
//! // Issue a query and run it
//! state.feed.set_sort(FeedSort::Top).await.into_result()?;
//!
//! // Subscribe to changes
//! let mut rx = state.feed.subscribe();
//! while rx.changed().await.is_ok() {
//!     println!("{} posts", rx.borrow().posts.len());
//! }
//! ```

pub mod config;
pub mod error;
pub mod feed;
pub mod identity;
mod loading;
pub mod persistence;
pub mod post_store;
pub mod site_store;
pub mod state;
pub mod votes;

pub use config::ClientConfig;
pub use error::StoreError;
pub use feed::{FeedController, FeedOutcome, FeedRequest, FeedState, FeedStatus};
pub use identity::{
    EnvironmentSignals, FileIdentityStorage, IDENTITY_KEY, Identity, IdentityProvider,
    IdentityStorage, MemoryIdentityStorage, fingerprint,
};
pub use persistence::{
    default_config_dir, default_config_path, load_json, load_json_or_default, save_json,
};
pub use post_store::{ANONYMOUS, PostState, PostStore, validate_comment};
pub use site_store::{SiteSnapshot, SiteStore};
pub use state::AppState;
pub use votes::{VoteCoordinator, VoteSlot};
#[cfg(test)]
mod persistence_tests;
