use std::path::{Path, PathBuf};

use log::trace;

const GIT_DIR: &str = ".git";

/// Where a dependency has to be fetched in the workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLocation {
    /// Repository url, derived from the import path unless overridden.
    pub url: String,
    pub bare_name: String,
    /// Directory the pull runs in when `already_checked_out`, the clone parent otherwise.
    pub fetch_dir: PathBuf,
    pub already_checked_out: bool,
    /// Set when the cloned directory has to be renamed to the final import path segment.
    pub rename: Option<Rename>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
    pub from: String,
    pub to: String,
}

impl ResolvedLocation {
    /// Directory a fresh clone lands in, before any rename.
    pub fn clone_dir(&self) -> PathBuf {
        self.fetch_dir.join(&self.bare_name)
    }

    /// Root of the working copy once the fetch has completed.
    pub fn working_copy(&self) -> PathBuf {
        if self.already_checked_out {
            self.fetch_dir.clone()
        } else if let Some(rename) = &self.rename {
            self.fetch_dir.join(&rename.to)
        } else {
            self.clone_dir()
        }
    }
}

/// `https://<import_path>.git`
pub fn default_repository_url(import_path: &str) -> String {
    format!("https://{import_path}.git")
}

/// Name of the repository implied by its url: the last path segment, cut at the first `.`.
///
/// `https://github.com/andlabs/ui-wrong.git` gives `ui-wrong`, `git@host:org/foo.bar.git` gives
/// `foo`.
pub fn bare_name(url: &str) -> &str {
    let last_segment = url
        .trim_end_matches('/')
        .rsplit(|c| c == '/' || c == ':')
        .next()
        .unwrap_or_default();
    last_segment.split('.').next().unwrap_or_default()
}

/// Reconciles an import path with the repository it is fetched from.
///
/// An existing checkout always wins. Otherwise the clone parent is chosen so that the clone
/// lands on the import path segment named like the repository, or, when no segment matches,
/// a rename to the final import path segment is requested.
pub fn resolve(
    workspace_root: &Path,
    import_path: &str,
    repository_url: Option<&str>,
) -> ResolvedLocation {
    let url = match repository_url {
        Some(url) if !url.is_empty() => url.to_string(),
        _ => default_repository_url(import_path),
    };
    let bare_name = bare_name(&url).to_string();

    let segments: Vec<&str> = import_path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect();
    let mut accumulated = PathBuf::new();
    let mut matched = false;
    for segment in &segments {
        accumulated.push(segment);
        if *segment == bare_name {
            matched = true;
            break;
        }
    }

    let candidate = workspace_root.join(&accumulated);
    trace!(
        "Resolving {} from {} (bare name {}, candidate {})",
        import_path,
        url,
        bare_name,
        candidate.display()
    );

    if candidate.join(GIT_DIR).is_dir() {
        return ResolvedLocation {
            url,
            bare_name,
            fetch_dir: candidate,
            already_checked_out: true,
            rename: None,
        };
    }

    let fetch_dir = match accumulated.parent() {
        Some(parent) => workspace_root.join(parent),
        None => workspace_root.to_path_buf(),
    };

    let rename = if matched {
        None
    } else {
        segments.last().map(|last| Rename {
            from: bare_name.clone(),
            to: last.to_string(),
        })
    };

    ResolvedLocation {
        url,
        bare_name,
        fetch_dir,
        already_checked_out: false,
        rename,
    }
}
