use crate::domain::models::RepositoryRecord;
use crate::error::{SyncError, SyncResult};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, error, info, warn};

/// Repositories requested per listing page.
pub const PAGE_LEN: u32 = 100;

/// Client for the Bitbucket Cloud REST API.
pub struct BitbucketApiClient {
    client: Client,
    base_url: String,
    max_pages: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RepositoryPage {
    #[serde(default)]
    values: Vec<RepositoryRecord>,
}

impl BitbucketApiClient {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            max_pages: None,
        }
    }

    /// Stop paginating after `max_pages` pages even if the API keeps returning results.
    pub fn with_max_pages(mut self, max_pages: Option<u32>) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// List every repository owned by `username`, walking pages until one comes back empty.
    /// Calls: GET {base_url}/repositories/{username}?pagelen=100&page={n}
    pub async fn list_repositories(&self, username: &str, token: &str) -> SyncResult<Vec<RepositoryRecord>> {
        let url = self.repositories_url(username)?;
        let mut repos = Vec::new();
        let mut page: u32 = 1;

        loop {
            if let Some(max_pages) = self.max_pages {
                if page > max_pages {
                    warn!(
                        "Stopped listing repositories for '{}' after {} pages; results may be incomplete",
                        username, max_pages
                    );
                    break;
                }
            }

            info!("Fetching page {} of repositories for Bitbucket user '{}'", page, username);

            let response = self.client
                .get(url.clone())
                .query(&[("pagelen", PAGE_LEN), ("page", page)])
                .header("Authorization", format!("Bearer {}", token))
                .header("Accept", "application/json")
                .send()
                .await?;

            match response.status() {
                StatusCode::OK => {
                    let body: RepositoryPage = response.json().await?;
                    if body.values.is_empty() {
                        info!("No more repositories found");
                        break;
                    }
                    debug!("Page {} returned {} repositories", page, body.values.len());
                    repos.extend(body.values);
                    page += 1;
                }
                StatusCode::NOT_FOUND => {
                    error!("User '{}' not found on Bitbucket", username);
                    return Err(SyncError::UserNotFound(username.to_string()));
                }
                StatusCode::FORBIDDEN => {
                    error!("Access forbidden. Check your token or permissions");
                    return Err(SyncError::PermissionDenied);
                }
                status => {
                    error!("Failed to fetch repositories: HTTP {}", status.as_u16());
                    return Err(SyncError::TransportFailure { status: status.as_u16() });
                }
            }
        }

        Ok(repos)
    }

    /// `{base_url}/repositories/{username}` with the username as a single encoded path segment.
    fn repositories_url(&self, username: &str) -> SyncResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| SyncError::InvalidBaseUrl(format!("{}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| SyncError::InvalidBaseUrl(self.base_url.clone()))?
            .pop_if_empty()
            .push("repositories")
            .push(username);
        Ok(url)
    }
}
