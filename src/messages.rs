//! User-facing message templates.

use std::fmt::Display;
use std::path::Path;

pub const USAGE: &str = "Upload the dependency file of your project to versioneye.com";

pub fn relative_file_path_not_found(path: &Path, cwd: &Path) -> String {
    format!(
        "\"{}\" not found, trying as relative file specification to cwd \"{}\"",
        path.display(),
        cwd.display()
    )
}

pub fn file_not_found(path: &Path) -> String {
    format!("Cannot find file \"{}\"", path.display())
}

pub const INVALID_FILE_TYPE: &str =
    "Unknown file type, please upload one of the following files to versioneye.com: ";

pub const MISSING_API_KEY: &str =
    "Sorry, please provide your api key like \"-a <API_KEY>\" from versioneye.com";

pub const MISSING_PROJECT_ID: &str =
    "Sorry, please provide your project id like \"-p <PROJECT_ID>\" from versioneye.com";

pub const LICENSE_RED: &str = "At least one license violation occurred";
pub const LICENSE_CHECK_PASS: &str = "License check passed";
pub const OUTDATED: &str = "The following components are outdated:";
pub const ALL_COMPONENTS_UP_TO_DATE: &str = "All components are up to date.";
pub const SECURITY_CHECK_PASS: &str = "Security vulnerability check passed";

pub fn security_vulnerability_known(count: u64) -> String {
    format!("{count} known security vulnerability")
}

pub fn outdated_component(name: &str, requested: &str, current: &str) -> String {
    format!("{name} ({requested}/{current})")
}

pub const SUCCESS: &str = "Successfully updated your VersionEye project";

pub fn success_creation(name: impl Display, id: impl Display) -> String {
    format!("Successfully created your VersionEye project \"{name}\", new project ID is: \"{id}\"")
}

pub fn cannot_use_cli_together(first: &str, second: &str) -> String {
    format!("Cannot use command line argument \"{first}\" with command line argument \"{second}\"")
}

pub const FAILED_TO_CALL_NPM: &str = "Failed to get a list of globally installed packages from npm";

pub fn uploading_file(path: &Path) -> String {
    format!("Uploading file {}", path.display())
}

pub const CREATING_GLOBAL_PACKAGE_FILE: &str =
    "Creating package file from globally installed packages";

pub const UPLOADING_GENERATED_FILE: &str = "Uploading generated package.json file:";

pub fn skipping_creation_option_file_exists(path: &Path) -> String {
    format!(
        "Skipping creation of option file because file already exists, please update it manually: {}",
        path.display()
    )
}

pub fn saved_option_file(path: &Path) -> String {
    format!("Saved options to config file: {}", path.display())
}

pub const ADD_THIS_FILE_TO_REPOSITORY: &str = "You may add this file to your repository.";
pub const STORE_THIS_FILE_LOCALLY: &str =
    "You can use this file for automated uploads to VersionEye, i.e. via cron.";

pub fn using_config_file(path: &Path, tag: &str) -> String {
    format!("Using config file {} {}", path.display(), tag)
}

pub const API_SAYS: &str = "VersionEye API says:";
