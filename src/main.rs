//! # versioneye-update
//!
//! Uploads the dependency file of a project to VersionEye and turns the answer into an
//! exit code, so that builds can fail on license violations, known security
//! vulnerabilities or outdated components.
//!
//! ## Quick Start
//!
//! ```bash
//! # Create a project from ./package.json and save the options for later runs
//! versioneye-update -a <API_KEY> --createproject private
//!
//! # Update it and fail on license or security problems
//! versioneye-update -l -s
//! ```
//!
//! ## Configuration
//!
//! Options can be stored in `.versioneye-update.json` in the home directory (typically
//! the API key), next to the manifest, in the working directory, or in the file given by
//! `--configfile`. Set `VERSIONEYE_LOG=debug` for diagnostic logging on stderr.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use versioneye_update::{commands, Cli, ExitCode};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("VERSIONEYE_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            std::process::exit(ExitCode::InvalidCommandLineOption.code());
        }
    };

    let code = commands::run(cli).await?;
    std::process::exit(code);
}
