use std::path::Path;

use git2::{build::CheckoutBuilder, BranchType, Commit, ErrorCode, Repository};
use log::{debug, trace};

use super::GitError;

/// Moves the checked out branch to `origin/<branch>` if that is a fast-forward.
pub(super) fn fast_forward(repo: &Repository, path: &Path) -> Result<(), GitError> {
    let head = repo.head()?;
    if !head.is_branch() {
        return Err(GitError::DetachedHead(path.display().to_string()));
    }
    let branch = head.shorthand().unwrap_or_default().to_string();
    let head_name = head.name().unwrap_or_default().to_string();

    let upstream = repo
        .find_reference(&format!("refs/remotes/origin/{branch}"))
        .map_err(|_| GitError::NoUpstream {
            branch: branch.clone(),
            path: path.display().to_string(),
        })?;
    let fetched = repo.reference_to_annotated_commit(&upstream)?;
    let (analysis, _) = repo.merge_analysis(&[&fetched])?;

    if analysis.is_up_to_date() {
        debug!("{} in {} is up to date", branch, path.display());
        return Ok(());
    }
    if !analysis.is_fast_forward() {
        return Err(GitError::NotFastForward {
            branch,
            path: path.display().to_string(),
        });
    }

    trace!("Fast-forwarding {} to {}", branch, fetched.id());
    let mut reference = repo.find_reference(&head_name)?;
    reference.set_target(fetched.id(), "pull: fast-forward")?;
    repo.set_head(&head_name)?;
    repo.checkout_head(Some(CheckoutBuilder::new().force()))?;
    Ok(())
}

/// Checks out `reference` the way `git checkout <reference>` would.
///
/// Local branches are checked out as branches, anything else detaches HEAD. A name that only
/// exists as `origin/<name>` gets a local tracking branch.
pub(super) fn checkout_reference(repo: &Repository, reference: &str) -> Result<(), GitError> {
    let (object, found) = match repo.revparse_ext(reference) {
        Ok(parsed) => parsed,
        Err(error) if error.code() == ErrorCode::NotFound => {
            return checkout_remote_branch(repo, reference, error);
        }
        Err(error) => return Err(error.into()),
    };
    let commit = object.peel_to_commit()?;
    checkout_commit(repo, &commit)?;

    let branch = found
        .as_ref()
        .filter(|found| found.is_branch())
        .and_then(|found| found.name());
    match branch {
        Some(branch) => repo.set_head(branch)?,
        None => repo.set_head_detached(commit.id())?,
    }
    Ok(())
}

fn checkout_remote_branch(
    repo: &Repository,
    name: &str,
    not_found: git2::Error,
) -> Result<(), GitError> {
    let remote_branch = match repo.find_branch(&format!("origin/{name}"), BranchType::Remote) {
        Ok(remote_branch) => remote_branch,
        Err(_) => return Err(not_found.into()),
    };
    let commit = remote_branch.get().peel_to_commit()?;
    debug!("Creating local branch {} tracking origin/{}", name, name);
    let mut local = repo.branch(name, &commit, false)?;
    let upstream = format!("origin/{name}");
    local.set_upstream(Some(upstream.as_str()))?;

    checkout_commit(repo, &commit)?;
    repo.set_head(&format!("refs/heads/{name}"))?;
    Ok(())
}

fn checkout_commit(repo: &Repository, commit: &Commit<'_>) -> Result<(), GitError> {
    repo.checkout_tree(commit.as_object(), Some(CheckoutBuilder::new().safe()))?;
    Ok(())
}
