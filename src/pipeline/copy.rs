use std::{
    fs::{self, Permissions},
    path::{Path, PathBuf},
};

use log::{debug, info, trace};
use walkdir::WalkDir;

use crate::pipeline::{Layout, StageError};

/// Copies the workspace tree of every import path into the vendor tree.
///
/// Import paths without a directory in the workspace are skipped. Existing vendor files are
/// overwritten, other files already present in the vendor tree are kept.
pub fn copy_all(layout: &Layout, import_paths: &[&str]) -> Result<(), StageError> {
    for import_path in import_paths {
        let source = layout.workspace_path(import_path);
        if !source.is_dir() {
            debug!(
                "Skipping {}, nothing fetched at {}",
                import_path,
                source.display()
            );
            continue;
        }
        info!("Copying {}", import_path);
        copy_tree(&source, &layout.vendor_path(import_path))?;
    }
    Ok(())
}

/// Recursive copy keeping file modes and, on unix, symbolic links.
fn copy_tree(source: &Path, destination: &Path) -> Result<(), StageError> {
    // Directory modes are applied once their content is written, deepest first.
    let mut directories: Vec<(PathBuf, Permissions)> = Vec::new();

    for entry in WalkDir::new(source) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|_| StageError::BadPath(entry.path().display().to_string()))?;
        let target = destination.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target).map_err(StageError::io(&target))?;
            let metadata = entry.metadata()?;
            directories.push((target, metadata.permissions()));
        } else {
            trace!("{} -> {}", entry.path().display(), target.display());
            remove_existing(&target)?;
            if file_type.is_symlink() {
                copy_symlink(entry.path(), &target)?;
            } else {
                fs::copy(entry.path(), &target).map_err(StageError::io(&target))?;
            }
        }
    }

    for (directory, permissions) in directories.into_iter().rev() {
        fs::set_permissions(&directory, permissions).map_err(StageError::io(&directory))?;
    }
    Ok(())
}

// Read-only files (git packs are) cannot be overwritten in place.
fn remove_existing(target: &Path) -> Result<(), StageError> {
    match fs::symlink_metadata(target) {
        Ok(metadata) if metadata.is_dir() => {
            fs::remove_dir_all(target).map_err(StageError::io(target))
        }
        Ok(_) => fs::remove_file(target).map_err(StageError::io(target)),
        Err(_) => Ok(()),
    }
}

#[cfg(unix)]
fn copy_symlink(source: &Path, target: &Path) -> Result<(), StageError> {
    let link = fs::read_link(source).map_err(StageError::io(source))?;
    std::os::unix::fs::symlink(link, target).map_err(StageError::io(target))
}

#[cfg(not(unix))]
fn copy_symlink(source: &Path, target: &Path) -> Result<(), StageError> {
    fs::copy(source, target).map_err(StageError::io(target))?;
    Ok(())
}
