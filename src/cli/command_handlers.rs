use std::path::Path;

use anyhow::anyhow;
use log::{debug, info};

use crate::{
    flock::FileLock,
    git::VersionControl,
    model::manifest::Manifest,
    pipeline::{Layout, Pipeline},
    resolver::{self, ResolvedLocation},
};

const WORKSPACE_LOCK_FILE_NAME: &str = ".pinvendor.lock";

/// Handler to vendor command
/// 1 - Reads the manifest
/// 2 - Locks the shared workspace
/// 3 - Runs fetch, pin, copy, restore and clean over all dependencies
pub fn do_vendor<V: VersionControl>(
    vcs: &V,
    root: &Path,
    manifest_file_name: &Path,
    layout: &Layout,
    default_branch: &str,
) -> anyhow::Result<()> {
    let manifest = load_manifest(root, manifest_file_name)?;

    std::fs::create_dir_all(&layout.workspace_root).map_err(|err| {
        anyhow!(
            "Could not create workspace {}: {}",
            layout.workspace_root.display(),
            err
        )
    })?;
    let _lock = acquire_lock(&layout.workspace_root)?;

    Pipeline::new(vcs, layout, default_branch).run(&manifest.dependencies)?;

    info!("success");
    Ok(())
}

/// Handler to resolve command
pub fn do_resolve(
    root: &Path,
    manifest_file_name: &Path,
    layout: &Layout,
) -> anyhow::Result<Vec<(String, ResolvedLocation)>> {
    let manifest = load_manifest(root, manifest_file_name)?;
    Ok(manifest
        .dependencies
        .into_iter()
        .map(|dependency| {
            let location = resolver::resolve(
                &layout.workspace_root,
                &dependency.import_path,
                dependency.repository_url.as_deref(),
            );
            (dependency.import_path, location)
        })
        .collect())
}

/// Handler to clean command
pub fn do_clean(layout: &Layout) -> anyhow::Result<()> {
    info!(
        "Cleaning vendor directory {}.",
        layout.vendor_root.display()
    );
    match std::fs::remove_dir_all(&layout.vendor_root) {
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            info!(
                "{} is already removed, nothing to do",
                layout.vendor_root.display()
            );
            Ok(())
        }
        otherwise => Ok(otherwise?),
    }
}

fn load_manifest(root: &Path, manifest_file_name: &Path) -> anyhow::Result<Manifest> {
    let manifest_path = root.join(manifest_file_name);
    info!("reading {}", manifest_path.display());
    let manifest = Manifest::from_file(&manifest_path)
        .map_err(|err| anyhow!("parse {} failed\n{}", manifest_path.display(), err))?;
    debug!("Loaded manifest: {:?}", manifest);
    Ok(manifest)
}

fn acquire_lock(workspace_root: &Path) -> anyhow::Result<FileLock> {
    let location = workspace_root.join(WORKSPACE_LOCK_FILE_NAME);
    debug!(
        "Acquiring a lock on the workspace location: {}",
        location.display()
    );
    let lock = FileLock::new(&location)?;
    debug!("Acquired a lock on the workspace location");
    Ok(lock)
}
