use std::process::ExitCode;

use clap::Parser;
use log::error;

use pinvendor::{
    cli::args::{CliArgs, Command},
    Pinvendor,
};

fn run() -> anyhow::Result<()> {
    let cli_args = CliArgs::parse();

    let mut builder = Pinvendor::builder()
        .root(&cli_args.root)
        .manifest_file_name(&cli_args.manifest_location)
        .vendor_directory_name(&cli_args.vendor_directory);
    if let Some(workspace) = &cli_args.workspace_directory {
        builder = builder.workspace_directory(workspace);
    }
    if let Some(branch) = &cli_args.branch {
        builder = builder.default_branch(branch);
    }
    let pinvendor = builder.try_build()?;

    match cli_args.cmd.unwrap_or(Command::Vendor) {
        Command::Vendor => pinvendor.vendor(),
        Command::Resolve => {
            for (import_path, location) in pinvendor.resolve()? {
                let state = if location.already_checked_out {
                    "checked out".to_string()
                } else if let Some(rename) = &location.rename {
                    format!("clone, rename {} to {}", rename.from, rename.to)
                } else {
                    "clone".to_string()
                };
                println!(
                    "{import_path}\t{}\t{}\t{state}",
                    location.url,
                    location.working_copy().display()
                );
            }
            Ok(())
        }
        Command::Clean => pinvendor.clean(),
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
