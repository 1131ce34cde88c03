use log::{debug, info};

use crate::{
    git::VersionControl,
    model::manifest::DependencySpec,
    pipeline::{Layout, StageError},
    resolver,
};

/// Clones every dependency that has no working copy yet and pulls the others.
pub fn fetch_all<V: VersionControl>(
    vcs: &V,
    layout: &Layout,
    dependencies: &[DependencySpec],
) -> Result<(), StageError> {
    for dependency in dependencies {
        fetch(vcs, layout, dependency)?;
    }
    Ok(())
}

fn fetch<V: VersionControl>(
    vcs: &V,
    layout: &Layout,
    dependency: &DependencySpec,
) -> Result<(), StageError> {
    info!("Fetching {}", dependency.import_path);
    let location = resolver::resolve(
        &layout.workspace_root,
        &dependency.import_path,
        dependency.repository_url.as_deref(),
    );
    let proxy = dependency.proxy.as_deref();

    if location.already_checked_out {
        return vcs
            .pull(&location.fetch_dir, proxy)
            .map_err(StageError::git(&dependency.import_path));
    }

    std::fs::create_dir_all(&location.fetch_dir).map_err(StageError::io(&location.fetch_dir))?;
    let clone_dir = location.clone_dir();
    vcs.clone_repository(&location.url, &clone_dir, proxy)
        .map_err(StageError::git(&dependency.import_path))?;

    if let Some(rename) = &location.rename {
        let target = location.fetch_dir.join(&rename.to);
        debug!(
            "Renaming {} to {} for {}",
            rename.from, rename.to, dependency.import_path
        );
        std::fs::rename(&clone_dir, &target).map_err(StageError::io(&target))?;
    }
    Ok(())
}
