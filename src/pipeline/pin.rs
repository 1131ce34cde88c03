use log::info;

use crate::{
    git::VersionControl,
    model::manifest::DependencySpec,
    pipeline::{restore::PinnedWorkspace, Layout, StageError},
    resolver,
};

const FULL_HASH_LEN: usize = 40;
const SHORT_HASH_LEN: usize = 10;

/// Reference handed to the checkout: full 40 character hashes are shortened to 10 characters.
///
/// This relies on the abbreviation being unambiguous in the repository.
pub fn pin_reference(version: &str) -> &str {
    if version.len() == FULL_HASH_LEN {
        version.get(..SHORT_HASH_LEN).unwrap_or(version)
    } else {
        version
    }
}

/// Checks out the declared version of every dependency that has one.
///
/// The returned guard owns the pinned state of the workspace; dropping it without calling
/// [`PinnedWorkspace::restore`] puts the working copies back on `default_branch`.
pub fn pin_all<'a, V: VersionControl>(
    vcs: &'a V,
    layout: &Layout,
    dependencies: &[DependencySpec],
    default_branch: &'a str,
) -> Result<PinnedWorkspace<'a, V>, StageError> {
    let mut pinned = PinnedWorkspace::new(vcs, default_branch);
    for dependency in dependencies {
        let Some(version) = dependency.version.as_deref() else {
            continue;
        };
        info!("Checking out {} at {}", dependency.import_path, version);
        let location = resolver::resolve(
            &layout.workspace_root,
            &dependency.import_path,
            dependency.repository_url.as_deref(),
        );
        if !location.already_checked_out {
            return Err(StageError::MissingWorkingCopy {
                import_path: dependency.import_path.clone(),
                path: location.working_copy().display().to_string(),
            });
        }
        vcs.checkout(&location.fetch_dir, pin_reference(version))
            .map_err(StageError::git(&dependency.import_path))?;
        pinned.push(&dependency.import_path, location.fetch_dir);
    }
    Ok(pinned)
}
