use crate::error::CloneError;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Runs `clone` for a single repository.
#[async_trait]
pub trait GitClient: Send + Sync {
    /// Clone `url` into a new subdirectory of `working_dir`.
    async fn clone_repository(&self, url: &str, working_dir: &Path) -> Result<(), CloneError>;
}

/// [`GitClient`] backed by the `git` command line.
pub struct GitCli {
    binary: String,
}

impl GitCli {
    pub fn new(binary: impl Into<String>) -> Self {
        Self { binary: binary.into() }
    }
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new("git")
    }
}

#[async_trait]
impl GitClient for GitCli {
    async fn clone_repository(&self, url: &str, working_dir: &Path) -> Result<(), CloneError> {
        debug!("Running {} clone {} in {}", self.binary, url, working_dir.display());

        let output = Command::new(&self.binary)
            .arg("clone")
            .arg(url)
            .current_dir(working_dir)
            // Fail instead of waiting on a credential prompt nobody can answer.
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if output.status.success() {
            Ok(())
        } else {
            Err(CloneError::Exit {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_binary_is_a_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let git = GitCli::new("definitely-not-a-real-git-binary");

        let err = git
            .clone_repository("https://bitbucket.org/alice/widgets.git", dir.path())
            .await
            .unwrap_err();

        assert!(matches!(err, CloneError::Spawn(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn nonzero_exit_is_reported_with_code() {
        let dir = tempfile::tempdir().unwrap();
        let git = GitCli::new("false");

        let err = git
            .clone_repository("https://bitbucket.org/alice/widgets.git", dir.path())
            .await
            .unwrap_err();

        assert!(matches!(err, CloneError::Exit { code: Some(1), .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn terminal_prompts_are_disabled() {
        let dir = tempfile::tempdir().unwrap();
        // `sh clone <url>` runs the script named `clone` from the working directory.
        std::fs::write(
            dir.path().join("clone"),
            "[ \"$GIT_TERMINAL_PROMPT\" = 0 ] || { echo prompt enabled >&2; exit 3; }\n",
        )
        .unwrap();

        GitCli::new("sh")
            .clone_repository("https://bitbucket.org/alice/private.git", dir.path())
            .await
            .unwrap();
    }
}
