use std::path::PathBuf;

use log::{info, warn};

use crate::{git::VersionControl, pipeline::StageError};

struct PinnedEntry {
    import_path: String,
    working_copy: PathBuf,
}

/// Working copies currently checked out at a pinned version.
///
/// [`restore`](PinnedWorkspace::restore) returns them to the default branch and reports the first
/// failure. If the guard is dropped instead, because a stage in between failed, the restore is
/// attempted for every entry and failures are only logged.
pub struct PinnedWorkspace<'a, V: VersionControl> {
    vcs: &'a V,
    default_branch: &'a str,
    entries: Vec<PinnedEntry>,
}

impl<'a, V: VersionControl> PinnedWorkspace<'a, V> {
    pub fn new(vcs: &'a V, default_branch: &'a str) -> Self {
        PinnedWorkspace {
            vcs,
            default_branch,
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, import_path: &str, working_copy: PathBuf) {
        self.entries.push(PinnedEntry {
            import_path: import_path.to_string(),
            working_copy,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn restore(mut self) -> Result<(), StageError> {
        let entries = std::mem::take(&mut self.entries);
        for entry in &entries {
            info!("Reverting checkout of {}", entry.import_path);
            self.vcs
                .checkout(&entry.working_copy, self.default_branch)
                .map_err(StageError::git(&entry.import_path))?;
        }
        Ok(())
    }
}

impl<V: VersionControl> Drop for PinnedWorkspace<'_, V> {
    fn drop(&mut self) {
        for entry in self.entries.drain(..).rev() {
            warn!(
                "Reverting checkout of {} after a failed run",
                entry.import_path
            );
            if let Err(error) = self.vcs.checkout(&entry.working_copy, self.default_branch) {
                warn!(
                    "Could not put {} back on {}: {}",
                    entry.working_copy.display(),
                    self.default_branch,
                    error
                );
            }
        }
    }
}
