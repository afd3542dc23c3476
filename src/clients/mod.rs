pub mod bitbucket_api;
pub mod git;

pub use bitbucket_api::BitbucketApiClient;
pub use git::{GitCli, GitClient};
