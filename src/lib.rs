//! # VersionEye Update Library
//!
//! Core library functionality for the `versioneye-update` CLI tool: layered option
//! loading, manifest selection, the VersionEye API client and response checks.

use clap::Parser;
use serde::Serialize;

pub mod api;
pub mod commands;
pub mod config;
pub mod constants;
pub mod error;
pub mod exit_code;
pub mod global;
pub mod interpret;
pub mod manifest;
pub mod messages;
pub mod report;

pub use exit_code::ExitCode;

/// Upload the dependency file of your project to versioneye.com
///
/// Every option may also be given in a `.versioneye-update.json` file in the home
/// directory, the project directory, the working directory or the file named by
/// `--configfile`. Command-line values always win.
// Unset options are skipped on serialization so they never mask config file values.
#[derive(Parser, Serialize, Debug, Default, Clone)]
#[command(
    name = "versioneye-update",
    about = messages::USAGE,
    long_about = None,
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct Cli {
    /// versioneye.com API Key for user authentification
    #[arg(short = 'a', long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apikey: Option<String>,

    /// project id of the current project in versioneye.com
    #[arg(short = 'p', long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projectid: Option<String>,

    /// project file to upload to versioneye.com (if not specified: package.json)
    #[arg(short = 'f', long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// set the base URL for the VersionEye API. Only needed for VersionEye Enterprise!
    #[arg(short = 'b', long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseurl: Option<String>,

    /// prints usage information
    #[arg(short = 'h', long)]
    #[serde(skip_serializing_if = "is_false")]
    pub help: bool,

    /// prints the version number
    #[arg(short = 'v', long)]
    #[serde(skip_serializing_if = "is_false")]
    pub version: bool,

    /// dumps VersionEye output
    #[arg(short = 'd', long)]
    #[serde(skip_serializing_if = "is_false")]
    pub dump: bool,

    /// fails if any license is violated
    #[arg(short = 'l', long)]
    #[serde(skip_serializing_if = "is_false")]
    pub licensecheck: bool,

    /// fails if any of the used components is known to have security vulnerabilities
    #[arg(short = 's', long)]
    #[serde(skip_serializing_if = "is_false")]
    pub securitycheck: bool,

    /// lists used components that are noted as outdated
    #[arg(short = 'o', long)]
    #[serde(skip_serializing_if = "is_false")]
    pub listoutdated: bool,

    /// fails if any of the used components is noted as outdated
    #[arg(long)]
    #[serde(skip_serializing_if = "is_false")]
    pub failonoutdated: bool,

    /// does not use special exit codes to signal failed license, security or up-to-date checks
    #[arg(short = 'i', long)]
    #[serde(skip_serializing_if = "is_false")]
    pub ignorechecks: bool,

    /// creates a pseudo package.json file from the globally installed npm packages and
    /// uploads this file. Cannot be used together with --file
    #[arg(short = 'g', long)]
    #[serde(skip_serializing_if = "is_false")]
    pub globalinstalls: bool,

    /// defines the name of the package.json file that gets created with --globalinstalls
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub globalpackagename: Option<String>,

    /// Specifies the config file to use
    #[arg(short = 'c', long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configfile: Option<String>,

    /// Creates a new project on VersionEye, optionally `public` or `private`.
    /// Cannot be used with --projectid
    #[arg(long, num_args = 0..=1, default_missing_value = "")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub createproject: Option<String>,
}

fn is_false(value: &bool) -> bool {
    !*value
}
