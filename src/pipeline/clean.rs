use std::{fs, io::ErrorKind, path::Path};

use log::{debug, info};

use crate::pipeline::{Layout, StageError};

const GIT_DIR: &str = ".git";

/// Removes the `.git` metadata from every vendored snapshot. Already absent is fine.
pub fn clean_all(layout: &Layout, import_paths: &[&str]) -> Result<(), StageError> {
    for import_path in import_paths {
        let git_dir = layout.vendor_path(import_path).join(GIT_DIR);
        info!("Removing {}", git_dir.display());
        remove_git_dir(&git_dir)?;
    }
    Ok(())
}

fn remove_git_dir(path: &Path) -> Result<(), StageError> {
    let result = match fs::symlink_metadata(path) {
        // Submodules and worktrees carry a `.git` file instead.
        Ok(metadata) if !metadata.is_dir() => fs::remove_file(path),
        _ => fs::remove_dir_all(path),
    };
    match result {
        Err(error) if error.kind() == ErrorKind::NotFound => {
            debug!("{} is already removed, nothing to do", path.display());
            Ok(())
        }
        otherwise => otherwise.map_err(StageError::io(path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::pipeline::tests::layout;

    #[test]
    fn removes_metadata_only() {
        let dir = tempfile::tempdir().unwrap();
        let layout = layout(dir.path());
        let vendored = layout.vendor_path("example.org/lib");
        fs::create_dir_all(vendored.join(".git/objects")).unwrap();
        fs::write(vendored.join(".git/HEAD"), "ref: refs/heads/master").unwrap();
        fs::write(vendored.join("lib.go"), "package lib").unwrap();

        clean_all(&layout, &["example.org/lib"]).unwrap();

        assert!(!vendored.join(".git").exists());
        assert!(vendored.join("lib.go").is_file());
    }

    #[test]
    fn removes_git_file() {
        let dir = tempfile::tempdir().unwrap();
        let layout = layout(dir.path());
        let vendored = layout.vendor_path("example.org/lib");
        fs::create_dir_all(&vendored).unwrap();
        fs::write(vendored.join(".git"), "gitdir: ../.git/modules/lib").unwrap();

        clean_all(&layout, &["example.org/lib"]).unwrap();

        assert!(!vendored.join(".git").exists());
    }

    #[test]
    fn absent_metadata_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let layout = layout(dir.path());

        clean_all(&layout, &["example.org/lib", "github.com/x/none"]).unwrap();
        clean_all(&layout, &["example.org/lib"]).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn removal_failure_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let layout = layout(dir.path());
        let vendored = layout.vendor_path("example.org/lib");
        fs::create_dir_all(vendored.parent().unwrap()).unwrap();
        // The snapshot is a file, so its `.git` can be neither read nor removed.
        fs::write(&vendored, "not a directory").unwrap();

        let error = clean_all(&layout, &["example.org/lib"]).unwrap_err();

        assert!(matches!(error, StageError::IO { .. }));
        assert!(error.to_string().contains(".git"));
        assert!(vendored.is_file());
    }
}
