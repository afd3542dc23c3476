use crate::clients::{BitbucketApiClient, GitClient};
use crate::domain::models::{
    ConnectionDescriptor, ConnectorType, DataSourceContext, RepositoryRecord, SyncReport,
};
use crate::error::{CloneError, SyncError, SyncResult};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

pub const ICON_FILE_NAME: &str = "icon.svg";

pub const FALLBACK_ICON: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 32 32"><path d="M2.91 3h26.18l-3.81 24.94H7.01z" fill="#2684FF"/></svg>"##;

/// Connection descriptor for Bitbucket: the same value on every call.
pub fn connection_data() -> ConnectionDescriptor {
    ConnectionDescriptor {
        connection_type: ConnectorType::BitBucket,
        fields: vec![
            "username".to_string(),
            "token".to_string(),
            "target_directory".to_string(),
        ],
    }
}

/// Read `icon.svg` from `assets_dir`, or fall back to the built-in icon on any failure.
pub fn load_icon(assets_dir: &Path) -> String {
    fs::read_to_string(assets_dir.join(ICON_FILE_NAME)).unwrap_or_else(|_| FALLBACK_ICON.to_string())
}

/// Create `path` (with parents) if missing; reject it if it exists as anything but a directory.
async fn ensure_target_directory(path: &Path) -> SyncResult<()> {
    if !path.exists() {
        tokio::fs::create_dir_all(path).await.map_err(|source| {
            error!("Failed to create directory '{}': {}", path.display(), source);
            SyncError::DirectoryCreation {
                path: path.to_path_buf(),
                source,
            }
        })?;
        info!("Created directory: {}", path.display());
    } else if !path.is_dir() {
        error!("Path '{}' is not a directory", path.display());
        return Err(SyncError::NotADirectory(path.to_path_buf()));
    }
    Ok(())
}

/// Clones every repository of a Bitbucket user into a local directory.
pub struct BitbucketConnector {
    context: DataSourceContext,
    api: Arc<BitbucketApiClient>,
    git: Arc<dyn GitClient>,
}

impl BitbucketConnector {
    pub fn new(
        context: DataSourceContext,
        api: Arc<BitbucketApiClient>,
        git: Arc<dyn GitClient>,
    ) -> Self {
        Self { context, api, git }
    }

    pub fn context(&self) -> &DataSourceContext {
        &self.context
    }

    pub async fn list_repositories(&self, username: &str, token: &str) -> SyncResult<Vec<RepositoryRecord>> {
        self.api.list_repositories(username, token).await
    }

    /// Clone one repository. Failures are logged here and returned for bookkeeping only.
    pub async fn clone_repository(
        &self,
        clone_url: &str,
        target_directory: &Path,
        repo_name: &str,
    ) -> Result<(), CloneError> {
        info!("Cloning repository '{}' from {}", repo_name, clone_url);

        match self.git.clone_repository(clone_url, target_directory).await {
            Ok(()) => {
                info!("Successfully cloned '{}'", repo_name);
                Ok(())
            }
            Err(CloneError::Exit { code, stderr }) => {
                error!("Error cloning '{}': {}", repo_name, stderr);
                Err(CloneError::Exit { code, stderr })
            }
            Err(e) => {
                error!("Unexpected error cloning '{}': {}", repo_name, e);
                Err(e)
            }
        }
    }

    /// Clone every repository of the configured user into the target directory.
    pub async fn fetch(&self) -> SyncResult<SyncReport> {
        let params = &self.context.params;
        let target = params.target_directory.as_path();

        info!(
            "Starting fetch process for Bitbucket user '{}' into directory '{}'",
            params.username,
            target.display()
        );

        ensure_target_directory(target).await?;

        let repos = self.list_repositories(&params.username, &params.token).await?;
        let mut report = SyncReport::default();

        if repos.is_empty() {
            info!("No repositories found for user '{}'", params.username);
            return Ok(report);
        }

        info!("Found {} repositories. Starting cloning process", repos.len());

        for repo in &repos {
            let name = repo.display_name();
            let Some(clone_url) = repo.clone_url() else {
                warn!("No clone URL found for repository '{}'. Skipping", name);
                report.skipped.push(name.to_string());
                continue;
            };

            match self.clone_repository(clone_url, target, name).await {
                Ok(()) => report.cloned.push(name.to_string()),
                Err(_) => report.failed.push(name.to_string()),
            }
        }

        info!(
            "All repositories have been processed: {} cloned, {} failed, {} skipped",
            report.cloned.len(),
            report.failed.len(),
            report.skipped.len()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::SyncParameters;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::path::PathBuf;
    use std::sync::Mutex;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

    /// Records every clone and fails the ones whose URL is listed.
    #[derive(Default)]
    struct RecordingGit {
        calls: Mutex<Vec<String>>,
        failing: Vec<String>,
    }

    impl RecordingGit {
        fn failing(urls: &[&str]) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                failing: urls.iter().map(|u| u.to_string()).collect(),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GitClient for RecordingGit {
        async fn clone_repository(&self, url: &str, _working_dir: &Path) -> Result<(), CloneError> {
            self.calls.lock().unwrap().push(url.to_string());
            if self.failing.iter().any(|f| f == url) {
                return Err(CloneError::Exit {
                    code: Some(128),
                    stderr: "fatal: could not read from remote repository".to_string(),
                });
            }
            Ok(())
        }
    }

    /// Answers with an empty page only if the target directory already exists.
    struct RequireDirectory(PathBuf);

    impl Respond for RequireDirectory {
        fn respond(&self, _request: &Request) -> ResponseTemplate {
            if self.0.is_dir() {
                ResponseTemplate::new(200).set_body_json(json!({ "values": [] }))
            } else {
                ResponseTemplate::new(500)
            }
        }
    }

    fn repo(name: &str) -> Value {
        json!({
            "name": name,
            "links": { "clone": [{ "name": "https", "href": url_for(name) }] }
        })
    }

    fn url_for(name: &str) -> String {
        format!("https://bitbucket.org/alice/{}.git", name)
    }

    async fn serve_repositories(server: &MockServer, values: Vec<Value>) {
        Mock::given(method("GET"))
            .and(path("/repositories/alice"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "values": values })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repositories/alice"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "values": [] })))
            .mount(server)
            .await;
    }

    fn connector(server: &MockServer, target: &Path, git: Arc<dyn GitClient>) -> BitbucketConnector {
        let params = SyncParameters {
            username: "alice".to_string(),
            token: "secret".to_string(),
            target_directory: target.to_path_buf(),
        };
        BitbucketConnector::new(
            DataSourceContext::new(params).with_name("bitbucket-alice"),
            Arc::new(BitbucketApiClient::with_base_url(server.uri())),
            git,
        )
    }

    #[tokio::test]
    async fn creates_missing_target_before_listing() {
        let server = MockServer::start().await;
        let root = tempfile::tempdir().unwrap();
        let target = root.path().join("nested").join("repos");

        Mock::given(method("GET"))
            .and(path("/repositories/alice"))
            .respond_with(RequireDirectory(target.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let git = Arc::new(RecordingGit::default());
        let report = connector(&server, &target, git.clone()).fetch().await.unwrap();

        assert!(target.is_dir());
        assert_eq!(report, SyncReport::default());
        assert!(git.calls().is_empty());
    }

    #[tokio::test]
    async fn file_target_is_rejected_without_network() {
        let server = MockServer::start().await;
        let root = tempfile::tempdir().unwrap();
        let target = root.path().join("not-a-dir");
        fs::write(&target, "plain file").unwrap();

        let err = connector(&server, &target, Arc::new(RecordingGit::default()))
            .fetch()
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::NotADirectory(ref p) if p == &target));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn uncreatable_target_fails_without_network() {
        let server = MockServer::start().await;
        let root = tempfile::tempdir().unwrap();
        let file = root.path().join("file");
        fs::write(&file, "plain file").unwrap();
        let target = file.join("sub");

        let err = connector(&server, &target, Arc::new(RecordingGit::default()))
            .fetch()
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::DirectoryCreation { ref path, .. } if path == &target));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_user_clones_nothing() {
        let server = MockServer::start().await;
        let root = tempfile::tempdir().unwrap();
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let git = Arc::new(RecordingGit::default());
        let err = connector(&server, root.path(), git.clone()).fetch().await.unwrap_err();

        assert!(matches!(err, SyncError::UserNotFound(_)));
        assert!(git.calls().is_empty());
    }

    #[tokio::test]
    async fn forbidden_clones_nothing() {
        let server = MockServer::start().await;
        let root = tempfile::tempdir().unwrap();
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let git = Arc::new(RecordingGit::default());
        let err = connector(&server, root.path(), git.clone()).fetch().await.unwrap_err();

        assert!(matches!(err, SyncError::PermissionDenied));
        assert!(git.calls().is_empty());
    }

    #[tokio::test]
    async fn repository_without_clone_url_is_skipped() {
        let server = MockServer::start().await;
        let root = tempfile::tempdir().unwrap();
        serve_repositories(
            &server,
            vec![
                repo("alpha"),
                json!({ "name": "beta", "links": { "clone": [] } }),
                repo("gamma"),
                json!({ "name": "delta" }),
            ],
        )
        .await;

        let git = Arc::new(RecordingGit::default());
        let report = connector(&server, root.path(), git.clone()).fetch().await.unwrap();

        assert_eq!(git.calls(), vec![url_for("alpha"), url_for("gamma")]);
        assert_eq!(report.cloned, vec!["alpha", "gamma"]);
        assert_eq!(report.skipped, vec!["beta", "delta"]);
        assert_eq!(report.clone_attempts(), 2);
    }

    #[tokio::test]
    async fn clone_failure_does_not_stop_the_batch() {
        let server = MockServer::start().await;
        let root = tempfile::tempdir().unwrap();
        serve_repositories(&server, vec![repo("one"), repo("two"), repo("three")]).await;

        let failing_url = url_for("two");
        let git = Arc::new(RecordingGit::failing(&[failing_url.as_str()]));
        let report = connector(&server, root.path(), git.clone()).fetch().await.unwrap();

        assert_eq!(git.calls(), vec![url_for("one"), url_for("two"), url_for("three")]);
        assert_eq!(report.cloned, vec!["one", "three"]);
        assert_eq!(report.failed, vec!["two"]);
    }

    #[tokio::test]
    async fn unnamed_repository_uses_placeholder_name() {
        let server = MockServer::start().await;
        let root = tempfile::tempdir().unwrap();
        serve_repositories(
            &server,
            vec![json!({ "links": { "clone": [{ "href": url_for("anon") }] } })],
        )
        .await;

        let git = Arc::new(RecordingGit::default());
        let report = connector(&server, root.path(), git).fetch().await.unwrap();
        assert_eq!(report.cloned, vec!["Unnamed Repository"]);
    }

    #[test]
    fn icon_prefers_colocated_file() {
        let assets = tempfile::tempdir().unwrap();
        fs::write(assets.path().join(ICON_FILE_NAME), "<svg id=\"custom\"/>").unwrap();
        assert_eq!(load_icon(assets.path()), "<svg id=\"custom\"/>");
    }

    #[test]
    fn icon_falls_back_when_missing_or_unreadable() {
        let assets = tempfile::tempdir().unwrap();
        assert_eq!(load_icon(assets.path()), FALLBACK_ICON);

        // A directory named icon.svg exists but cannot be read as a file.
        fs::create_dir(assets.path().join(ICON_FILE_NAME)).unwrap();
        assert_eq!(load_icon(assets.path()), FALLBACK_ICON);
    }

    #[test]
    fn connection_data_is_constant() {
        let expected = json!({
            "connection_type": "BitBucket",
            "fields": ["username", "token", "target_directory"]
        });
        assert_eq!(serde_json::to_value(connection_data()).unwrap(), expected);
        assert_eq!(connection_data(), connection_data());
    }
}
