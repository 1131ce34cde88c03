use clap::{Parser, Subcommand};

/// Vendors pinned git dependencies into the project.
#[derive(Debug, Parser)]
#[clap(version)]
pub struct CliArgs {
    #[clap(subcommand)]
    pub cmd: Option<Command>,
    /// Project root; manifest and vendor directory are relative to it
    #[clap(short, long, default_value = ".")]
    pub root: String,
    #[clap(short, long, default_value = "vendor.json")]
    pub manifest_location: String,
    #[clap(short = 'o', long, default_value = "vendor")]
    pub vendor_directory: String,
    /// Shared workspace to fetch into [default: $PINVENDOR_WORKSPACE_DIR, $GOPATH/src]
    #[clap(short, long)]
    pub workspace_directory: Option<String>,
    /// Branch to restore after vendoring [default: $PINVENDOR_GIT_BRANCH, master]
    #[clap(short, long)]
    pub branch: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetches, pins and copies the manifest dependencies into the vendor directory (default)
    Vendor,
    /// Prints where each dependency is fetched in the workspace
    Resolve,
    /// Deletes the vendor directory
    Clean,
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn vendor_is_the_default_command() {
        let args = CliArgs::try_parse_from(["pinvendor"]).unwrap();
        assert!(args.cmd.is_none());
        assert_eq!(args.manifest_location, "vendor.json");
        assert_eq!(args.vendor_directory, "vendor");
    }

    #[test]
    fn parse_resolve_with_options() {
        let args = CliArgs::try_parse_from([
            "pinvendor",
            "--manifest-location",
            "deps.toml",
            "-w",
            "/tmp/workspace",
            "resolve",
        ])
        .unwrap();
        assert!(matches!(args.cmd, Some(Command::Resolve)));
        assert_eq!(args.manifest_location, "deps.toml");
        assert_eq!(args.workspace_directory.as_deref(), Some("/tmp/workspace"));
    }
}
