use anyhow::Result;
use clap::CommandFactory;
use std::io::Write;
use std::path::Path;

use crate::api::{ProjectApi, VersionEyeClient};
use crate::config::{self, ConfigLocations, EffectiveOptions};
use crate::exit_code::ExitCode;
use crate::report::Reporter;
use crate::Cli;

pub mod upload;

/// Resolve options for the parsed command line and run the tool
///
/// Returns the process exit status, with `--ignorechecks` already applied.
pub async fn run(cli: Cli) -> Result<i32> {
    let mut out = Reporter::stdout();
    let locations = ConfigLocations::from_env()?;

    let options = match config::resolve(&cli, &locations, &mut out) {
        Ok(options) => options,
        Err(err) => {
            out.failure(&err);
            return Ok(ExitCode::InvalidCommandLineOption.finish(cli.ignorechecks));
        }
    };
    tracing::debug!(base_url = %options.base_url, "options resolved");

    let api_key = options.apikey.clone().unwrap_or_default();
    let client = VersionEyeClient::new(&api_key, &options.base_url)?;
    let code = execute(&options, &client, &locations.cwd, &mut out).await;
    tracing::debug!(?code, "finished");
    Ok(code.finish(options.ignorechecks))
}

/// Help, version, option checks and finally the upload
pub async fn execute<W: Write>(
    options: &EffectiveOptions,
    api: &dyn ProjectApi,
    cwd: &Path,
    out: &mut Reporter<W>,
) -> ExitCode {
    if options.help {
        out.plain(Cli::command().render_help());
        return ExitCode::Ok;
    }

    if options.version {
        out.plain(env!("CARGO_PKG_VERSION"));
        return ExitCode::Ok;
    }

    if let Err(conflict) = options.check() {
        out.failure(&conflict.message);
        return conflict.code;
    }

    upload::run(options, api, cwd, out).await
}
