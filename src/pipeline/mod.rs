//! The five vendoring stages and the orchestration running them.
//!
//! Each stage walks the whole dependency list before the next one starts:
//! fetch, pin, copy, restore, clean. The first failing stage ends the run.

use std::{
    fmt::Display,
    path::{Path, PathBuf},
};

use log::info;
use thiserror::Error;

use crate::{git::GitError, git::VersionControl, model::manifest::DependencySpec};

pub mod clean;
pub mod copy;
pub mod fetch;
pub mod pin;
pub mod restore;

pub const DEFAULT_BRANCH: &str = "master";

/// Absolute locations every stage works against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Shared tree holding one working copy per repository, reused across runs.
    pub workspace_root: PathBuf,
    /// Project-local output tree.
    pub vendor_root: PathBuf,
}

impl Layout {
    pub fn new(workspace_root: impl Into<PathBuf>, vendor_root: impl Into<PathBuf>) -> Self {
        Layout {
            workspace_root: workspace_root.into(),
            vendor_root: vendor_root.into(),
        }
    }

    pub fn workspace_path(&self, import_path: &str) -> PathBuf {
        join_import_path(&self.workspace_root, import_path)
    }

    pub fn vendor_path(&self, import_path: &str) -> PathBuf {
        join_import_path(&self.vendor_root, import_path)
    }
}

fn join_import_path(root: &Path, import_path: &str) -> PathBuf {
    import_path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .fold(root.to_path_buf(), |path, segment| path.join(segment))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Pin,
    Copy,
    Restore,
    Clean,
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Stage::Fetch => "git clone/pull",
            Stage::Pin => "git checkout",
            Stage::Copy => "copy to vendor directory",
            Stage::Restore => "revert checkout",
            Stage::Clean => "remove .git directory",
        })
    }
}

#[derive(Error, Debug)]
pub enum StageError {
    #[error("{import_path}: {source}")]
    Git {
        import_path: String,
        #[source]
        source: GitError,
    },
    #[error("{import_path}: no working copy found at {path}")]
    MissingWorkingCopy { import_path: String, path: String },
    #[error("{path}: {source}")]
    IO {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Error while walking {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Bad path {0}")]
    BadPath(String),
}

impl StageError {
    pub(crate) fn git(import_path: &str) -> impl FnOnce(GitError) -> StageError + '_ {
        move |source| StageError::Git {
            import_path: import_path.to_string(),
            source,
        }
    }

    pub(crate) fn io(path: &Path) -> impl FnOnce(std::io::Error) -> StageError + '_ {
        move |source| StageError::IO {
            path: path.display().to_string(),
            source,
        }
    }
}

#[derive(Error, Debug)]
#[error("{stage} failed\n{source}")]
pub struct RunError {
    pub stage: Stage,
    #[source]
    pub source: StageError,
}

impl RunError {
    fn at(stage: Stage) -> impl FnOnce(StageError) -> RunError {
        move |source| RunError { stage, source }
    }
}

/// Runs the stages over a flat list of dependencies.
pub struct Pipeline<'a, V> {
    vcs: &'a V,
    layout: &'a Layout,
    default_branch: &'a str,
}

impl<'a, V: VersionControl> Pipeline<'a, V> {
    pub fn new(vcs: &'a V, layout: &'a Layout, default_branch: &'a str) -> Self {
        Pipeline {
            vcs,
            layout,
            default_branch,
        }
    }

    /// Fetch, pin, copy, restore and clean, in that order, each over all dependencies.
    ///
    /// When pinning or copying fails, the working copies pinned so far are put back on the
    /// default branch before the error is returned.
    pub fn run(&self, dependencies: &[DependencySpec]) -> Result<(), RunError> {
        let import_paths: Vec<&str> = dependencies
            .iter()
            .map(|dependency| dependency.import_path.as_str())
            .collect();

        fetch::fetch_all(self.vcs, self.layout, dependencies).map_err(RunError::at(Stage::Fetch))?;

        let pinned = pin::pin_all(self.vcs, self.layout, dependencies, self.default_branch)
            .map_err(RunError::at(Stage::Pin))?;

        copy::copy_all(self.layout, &import_paths).map_err(RunError::at(Stage::Copy))?;

        pinned.restore().map_err(RunError::at(Stage::Restore))?;

        clean::clean_all(self.layout, &import_paths).map_err(RunError::at(Stage::Clean))?;

        info!("Vendored {} dependencies", dependencies.len());
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{cell::RefCell, collections::HashSet};

    use super::*;

    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) enum Call {
        Clone {
            url: String,
            into: PathBuf,
            proxy: Option<String>,
        },
        Pull {
            working_copy: PathBuf,
            proxy: Option<String>,
        },
        Checkout {
            working_copy: PathBuf,
            reference: String,
        },
    }

    /// Records calls and materializes clones as directories with an empty `.git`.
    #[derive(Default)]
    pub(crate) struct FakeVersionControl {
        pub calls: RefCell<Vec<Call>>,
        pub failing_references: HashSet<String>,
    }

    impl FakeVersionControl {
        pub fn failing_on(reference: &str) -> Self {
            FakeVersionControl {
                failing_references: HashSet::from([reference.to_string()]),
                ..Default::default()
            }
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.borrow().clone()
        }
    }

    impl VersionControl for FakeVersionControl {
        fn clone_repository(
            &self,
            url: &str,
            into: &Path,
            proxy: Option<&str>,
        ) -> Result<(), GitError> {
            std::fs::create_dir_all(into.join(".git")).unwrap();
            std::fs::write(into.join("README"), url).unwrap();
            self.calls.borrow_mut().push(Call::Clone {
                url: url.to_string(),
                into: into.to_path_buf(),
                proxy: proxy.map(str::to_string),
            });
            Ok(())
        }

        fn pull(&self, working_copy: &Path, proxy: Option<&str>) -> Result<(), GitError> {
            self.calls.borrow_mut().push(Call::Pull {
                working_copy: working_copy.to_path_buf(),
                proxy: proxy.map(str::to_string),
            });
            Ok(())
        }

        fn checkout(&self, working_copy: &Path, reference: &str) -> Result<(), GitError> {
            self.calls.borrow_mut().push(Call::Checkout {
                working_copy: working_copy.to_path_buf(),
                reference: reference.to_string(),
            });
            if self.failing_references.contains(reference) {
                return Err(GitError::Git(git2::Error::from_str(&format!(
                    "pathspec '{reference}' did not match any file(s) known to git"
                ))));
            }
            Ok(())
        }
    }

    pub(crate) fn layout(dir: &Path) -> Layout {
        Layout::new(dir.join("workspace"), dir.join("project/vendor"))
    }

    #[test]
    fn layout_mirrors_import_path() {
        let layout = Layout::new("/ws", "/project/vendor");
        assert_eq!(
            layout.vendor_path("example.org/lib/sub"),
            PathBuf::from("/project/vendor/example.org/lib/sub")
        );
        assert_eq!(
            layout.workspace_path("/example.org//lib/"),
            PathBuf::from("/ws/example.org/lib")
        );
    }

    #[test]
    fn stages_run_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let layout = layout(dir.path());
        let vcs = FakeVersionControl::default();
        let dependencies = vec![
            DependencySpec::new("example.org/a").with_version("v1.0.0"),
            DependencySpec::new("example.org/b"),
        ];

        Pipeline::new(&vcs, &layout, DEFAULT_BRANCH)
            .run(&dependencies)
            .unwrap();

        let a = layout.workspace_path("example.org/a");
        assert_eq!(
            vcs.calls(),
            vec![
                Call::Clone {
                    url: "https://example.org/a.git".to_string(),
                    into: a.clone(),
                    proxy: None,
                },
                Call::Clone {
                    url: "https://example.org/b.git".to_string(),
                    into: layout.workspace_path("example.org/b"),
                    proxy: None,
                },
                Call::Checkout {
                    working_copy: a.clone(),
                    reference: "v1.0.0".to_string(),
                },
                Call::Checkout {
                    working_copy: a,
                    reference: DEFAULT_BRANCH.to_string(),
                },
            ]
        );
        for import_path in ["example.org/a", "example.org/b"] {
            let vendored = layout.vendor_path(import_path);
            assert!(vendored.join("README").is_file());
            assert!(!vendored.join(".git").exists());
        }
    }

    #[test]
    fn failing_pin_stops_the_run_and_restores_earlier_pins() {
        let dir = tempfile::tempdir().unwrap();
        let layout = layout(dir.path());
        let vcs = FakeVersionControl::failing_on("v9.9.9");
        let dependencies = vec![
            DependencySpec::new("example.org/a").with_version("v1.0.0"),
            DependencySpec::new("example.org/b").with_version("v9.9.9"),
            DependencySpec::new("example.org/c").with_version("v2.0.0"),
        ];

        let error = Pipeline::new(&vcs, &layout, DEFAULT_BRANCH)
            .run(&dependencies)
            .unwrap_err();
        assert_eq!(error.stage, Stage::Pin);
        assert!(error.to_string().starts_with("git checkout failed\n"));
        assert!(error.to_string().contains("example.org/b"));

        let checkouts: Vec<(PathBuf, String)> = vcs
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Checkout {
                    working_copy,
                    reference,
                } => Some((working_copy, reference)),
                _ => None,
            })
            .collect();
        assert_eq!(
            checkouts,
            vec![
                (layout.workspace_path("example.org/a"), "v1.0.0".to_string()),
                (layout.workspace_path("example.org/b"), "v9.9.9".to_string()),
                (
                    layout.workspace_path("example.org/a"),
                    DEFAULT_BRANCH.to_string()
                ),
            ]
        );
        assert!(!layout.vendor_root.exists());
    }

    #[test]
    fn failing_fetch_skips_later_stages() {
        struct Offline;
        impl VersionControl for Offline {
            fn clone_repository(&self, _: &str, _: &Path, _: Option<&str>) -> Result<(), GitError> {
                let error = git2::Error::from_str("could not resolve host");
                Err(GitError::Git(error))
            }
            fn pull(&self, _: &Path, _: Option<&str>) -> Result<(), GitError> {
                unreachable!()
            }
            fn checkout(&self, _: &Path, _: &str) -> Result<(), GitError> {
                panic!("checkout must not run after a failed fetch")
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let layout = layout(dir.path());
        let dependencies = vec![
            DependencySpec::new("example.org/a").with_version("v1.0.0"),
        ];
        let error = Pipeline::new(&Offline, &layout, DEFAULT_BRANCH)
            .run(&dependencies)
            .unwrap_err();
        assert_eq!(error.stage, Stage::Fetch);
        assert!(error.to_string().contains("could not resolve host"));
        assert!(!layout.vendor_root.exists());
    }
}
