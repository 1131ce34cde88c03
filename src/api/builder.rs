use std::{env, path::PathBuf};

use anyhow::Context;
use home::home_dir;
use log::debug;

use crate::{config::PinvendorConfig, git::GitVersionControl, pipeline, Pinvendor};

#[derive(Default)]
pub struct PinvendorBuilder {
    // Manifest and vendor paths are relative to `root`
    root: Option<PathBuf>,
    manifest_file_name: Option<PathBuf>,
    vendor_directory_name: Option<PathBuf>,
    workspace_directory: Option<PathBuf>,
    default_branch: Option<String>,
}

impl PinvendorBuilder {
    /// Project root directory.
    ///
    /// Defaults to the current directory.
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Name of the manifest file.
    ///
    /// Defaults to `vendor.json`.
    pub fn manifest_file_name(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest_file_name = Some(path.into());
        self
    }

    /// Name of the vendor directory.
    ///
    /// Defaults to `vendor`.
    pub fn vendor_directory_name(mut self, path: impl Into<PathBuf>) -> Self {
        self.vendor_directory_name = Some(path.into());
        self
    }

    /// Location of the shared workspace dependencies are fetched into.
    ///
    /// Defaults to `$PINVENDOR_WORKSPACE_DIR`, then `$GOPATH/src`, then `$HOME/go/src`.
    pub fn workspace_directory(mut self, path: impl Into<PathBuf>) -> Self {
        self.workspace_directory = Some(path.into());
        self
    }

    /// Branch working copies are returned to after vendoring.
    ///
    /// Defaults to `$PINVENDOR_GIT_BRANCH`, then `master`.
    pub fn default_branch(mut self, branch: impl Into<String>) -> Self {
        self.default_branch = Some(branch.into());
        self
    }

    pub fn try_build(self) -> anyhow::Result<Pinvendor> {
        let Self {
            root,
            manifest_file_name,
            vendor_directory_name,
            workspace_directory,
            default_branch,
        } = self;
        let config = PinvendorConfig::load()?;

        let root = match root {
            Some(root) => root,
            None => env::current_dir()?,
        };

        let manifest_file_name = manifest_file_name.unwrap_or_else(|| PathBuf::from("vendor.json"));

        let vendor_directory_name =
            vendor_directory_name.unwrap_or_else(|| PathBuf::from("vendor"));
        let vendor_root = root.join(vendor_directory_name);

        let workspace_root = match workspace_directory.or(config.workspace_dir) {
            Some(workspace) => root.join(workspace),
            None => default_workspace_directory()?,
        };
        debug!("Using workspace {}", workspace_root.display());

        let default_branch = default_branch
            .or(config.default_branch)
            .unwrap_or_else(|| pipeline::DEFAULT_BRANCH.to_string());

        let vcs = GitVersionControl::from_default_config()?;

        Ok(Pinvendor {
            vcs,
            root,
            manifest_file_name,
            layout: pipeline::Layout::new(workspace_root, vendor_root),
            default_branch,
        })
    }
}

fn default_workspace_directory() -> anyhow::Result<PathBuf> {
    let gopath = env::var_os("GOPATH").unwrap_or_default();
    let gopath = env::split_paths(&gopath).find(|path| !path.as_os_str().is_empty());
    let base = match gopath {
        Some(gopath) => gopath,
        None => home_dir()
            .context("Could not find home dir. Please define $HOME env variable.")?
            .join("go"),
    };
    Ok(base.join("src"))
}
