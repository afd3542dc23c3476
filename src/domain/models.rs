use crate::error::{SyncError, SyncResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

pub const UNNAMED_REPOSITORY: &str = "Unnamed Repository";

/// Types of connectors supported by the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectorType {
    BitBucket,
}

impl std::fmt::Display for ConnectorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectorType::BitBucket => write!(f, "BitBucket"),
        }
    }
}

/// Credentials and destination for a repository sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncParameters {
    pub username: String,
    #[serde(skip_serializing)]
    pub token: String,
    pub target_directory: PathBuf,
}

impl SyncParameters {
    /// Build parameters from a loosely typed `params` mapping.
    pub fn from_config(config: &serde_json::Value) -> SyncResult<Self> {
        let field = |name: &'static str| {
            config
                .get(name)
                .and_then(|v| v.as_str())
                .filter(|v| !v.trim().is_empty())
                .map(str::to_string)
                .ok_or(SyncError::MissingParameter(name))
        };

        Ok(Self {
            username: field("username")?,
            token: field("token")?,
            target_directory: PathBuf::from(field("target_directory")?),
        })
    }
}

/// Fields a caller must supply to configure a connector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionDescriptor {
    pub connection_type: ConnectorType,
    pub fields: Vec<String>,
}

/// Shared data-source fields every connector is constructed with.
#[derive(Debug, Clone)]
pub struct DataSourceContext {
    pub name: Option<String>,
    pub session: Option<Uuid>,
    pub dependency_data_sources: Vec<String>,
    pub subscribers: Vec<String>,
    pub params: SyncParameters,
}

impl DataSourceContext {
    pub fn new(params: SyncParameters) -> Self {
        Self {
            name: None,
            session: None,
            dependency_data_sources: Vec::new(),
            subscribers: Vec::new(),
            params,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// A repository entry from the Bitbucket listing API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepositoryRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub links: Option<RepositoryLinks>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepositoryLinks {
    #[serde(default)]
    pub clone: Vec<CloneLink>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CloneLink {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub href: Option<String>,
}

impl RepositoryRecord {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNNAMED_REPOSITORY)
    }

    /// The first advertised clone URL, if any.
    pub fn clone_url(&self) -> Option<&str> {
        self.links
            .as_ref()?
            .clone
            .first()?
            .href
            .as_deref()
            .filter(|href| !href.is_empty())
    }
}

/// Outcome of one sync, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub cloned: Vec<String>,
    pub failed: Vec<String>,
    pub skipped: Vec<String>,
}

impl SyncReport {
    pub fn clone_attempts(&self) -> usize {
        self.cloned.len() + self.failed.len()
    }
}

/// Status of a sync job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

/// A sync job for tracking background sync operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncJob {
    pub id: Uuid,
    pub name: Option<String>,
    pub username: String,
    pub target_directory: PathBuf,
    pub status: SyncStatus,
    pub report: Option<SyncReport>,
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl SyncJob {
    pub fn new(context: &DataSourceContext) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: context.name.clone(),
            username: context.params.username.clone(),
            target_directory: context.params.target_directory.clone(),
            status: SyncStatus::Pending,
            report: None,
            error: None,
            started_at: Utc::now(),
            completed_at: None,
        }
    }
}
