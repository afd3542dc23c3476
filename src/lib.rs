//! Bitbucket repository sync service.
//!
//! Lists every repository a Bitbucket user owns and clones each one into a
//! local directory, either as a library call through
//! [`domain::connectors::bitbucket::BitbucketConnector`] or as background jobs
//! behind the HTTP API in [`api`].

pub mod api;
pub mod clients;
pub mod config;
pub mod domain;
pub mod error;
pub mod storage;

use clients::{BitbucketApiClient, GitClient};
use config::Config;
use std::sync::Arc;
use std::time::Instant;
use storage::Storage;

/// Application state shared across handlers.
pub struct AppState {
    pub config: Config,
    pub storage: Arc<dyn Storage>,
    pub bitbucket_client: Arc<BitbucketApiClient>,
    pub git_client: Arc<dyn GitClient>,
    pub started_at: Instant,
}
