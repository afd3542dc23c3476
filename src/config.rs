use std::env;
use std::path::PathBuf;

pub const DEFAULT_BITBUCKET_API_URL: &str = "https://api.bitbucket.org/2.0";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Listen address (default: 127.0.0.1)
    pub host: String,
    /// Server port (default: 3014)
    pub port: u16,
    /// Base URL of the Bitbucket REST API
    pub bitbucket_api_url: String,
    /// Version-control executable used for cloning
    pub git_binary: String,
    /// Directory searched for `icon.svg`
    pub assets_dir: PathBuf,
    /// Optional upper bound on listing pages per sync
    pub max_pages: Option<u32>,
    /// Target directory used when a sync request does not name one
    pub default_target_directory: Option<PathBuf>,
    /// When set, every sync target must resolve inside this directory
    pub sync_root: Option<PathBuf>,
    /// Finished sync jobs kept in memory (default: 500)
    pub job_retention: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3014),
            bitbucket_api_url: env::var("BITBUCKET_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_BITBUCKET_API_URL.to_string()),
            git_binary: env::var("GIT_BINARY").unwrap_or_else(|_| "git".to_string()),
            assets_dir: env::var("CONNECTOR_ASSETS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| executable_dir()),
            max_pages: env::var("BITBUCKET_MAX_PAGES")
                .ok()
                .and_then(|p| p.parse().ok())
                .filter(|p| *p > 0),
            default_target_directory: env::var("DEFAULT_TARGET_DIRECTORY").ok().map(PathBuf::from),
            sync_root: env::var("SYNC_ROOT").ok().map(PathBuf::from),
            job_retention: env::var("SYNC_JOB_RETENTION")
                .ok()
                .and_then(|n| n.parse().ok())
                .unwrap_or(500),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Directory containing the running binary, falling back to the working directory.
fn executable_dir() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}
