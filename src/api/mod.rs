use std::path::PathBuf;

use crate::{
    cli::command_handlers::{do_clean, do_resolve, do_vendor},
    git::GitVersionControl,
    pipeline::Layout,
    resolver::ResolvedLocation,
};

mod builder;

pub use builder::PinvendorBuilder;

pub struct Pinvendor {
    vcs: GitVersionControl,
    root: PathBuf,
    manifest_file_name: PathBuf,
    layout: Layout,
    default_branch: String,
}

impl Pinvendor {
    pub fn builder() -> PinvendorBuilder {
        PinvendorBuilder::default()
    }

    /// Fetches, pins and copies every dependency of the manifest into the vendor directory
    pub fn vendor(&self) -> anyhow::Result<()> {
        do_vendor(
            &self.vcs,
            &self.root,
            &self.manifest_file_name,
            &self.layout,
            &self.default_branch,
        )
    }

    /// Where each dependency of the manifest would be fetched, without touching the network
    pub fn resolve(&self) -> anyhow::Result<Vec<(String, ResolvedLocation)>> {
        do_resolve(&self.root, &self.manifest_file_name, &self.layout)
    }

    /// Deletes the vendor directory
    pub fn clean(&self) -> anyhow::Result<()> {
        do_clean(&self.layout)
    }
}
