use std::path::Path;

use git2::{build::RepoBuilder, Config, Repository};
use log::{debug, trace};
use thiserror::Error;

mod remote;
mod repository;

/// Operations the vendoring pipeline needs from version control.
///
/// Every operation names the directory it acts on; nothing relies on the process working
/// directory.
pub trait VersionControl {
    /// Clones `url` into `into`, which must not exist yet or be empty.
    fn clone_repository(
        &self,
        url: &str,
        into: &Path,
        proxy: Option<&str>,
    ) -> Result<(), GitError>;

    /// Fetches `origin` and fast-forwards the checked out branch.
    fn pull(&self, working_copy: &Path, proxy: Option<&str>) -> Result<(), GitError>;

    /// Checks out a branch, tag or (possibly abbreviated) commit.
    fn checkout(&self, working_copy: &Path, reference: &str) -> Result<(), GitError>;
}

#[derive(Error, Debug)]
pub enum GitError {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),
    #[error("You are not currently on a branch in {0}")]
    DetachedHead(String),
    #[error("Branch {branch} in {path} has no upstream origin/{branch}")]
    NoUpstream { branch: String, path: String },
    #[error("Branch {branch} in {path} cannot be fast-forwarded to origin/{branch}")]
    NotFastForward { branch: String, path: String },
}

/// [`VersionControl`] backed by libgit2.
pub struct GitVersionControl {
    git_config: Config,
}

impl GitVersionControl {
    pub fn new(git_config: Config) -> Self {
        GitVersionControl { git_config }
    }

    /// Uses the global, xdg and system git configuration for credentials and proxies.
    pub fn from_default_config() -> Result<Self, GitError> {
        Ok(Self::new(Config::open_default()?))
    }
}

impl VersionControl for GitVersionControl {
    fn clone_repository(
        &self,
        url: &str,
        into: &Path,
        proxy: Option<&str>,
    ) -> Result<(), GitError> {
        debug!("Cloning {} into {}", url, into.display());
        RepoBuilder::new()
            .fetch_options(remote::fetch_options(&self.git_config, proxy))
            .clone(url, into)?;
        Ok(())
    }

    fn pull(&self, working_copy: &Path, proxy: Option<&str>) -> Result<(), GitError> {
        debug!("Pulling {}", working_copy.display());
        let repo = Repository::open(working_copy)?;
        {
            let mut remote = repo.find_remote("origin")?;
            let configured_refspecs: &[&str] = &[];
            remote.fetch(
                configured_refspecs,
                Some(&mut remote::fetch_options(&self.git_config, proxy)),
                None,
            )?;
        }
        repository::fast_forward(&repo, working_copy)
    }

    fn checkout(&self, working_copy: &Path, reference: &str) -> Result<(), GitError> {
        trace!("Checking out {} in {}", reference, working_copy.display());
        let repo = Repository::open(working_copy)?;
        repository::checkout_reference(&repo, reference)
    }
}
