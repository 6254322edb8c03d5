//! Fixed names, hosts and endpoint templates shared across the crate.

/// Name of the option file looked up in the home, project and working directories
pub const CONFIG_FILE_NAME: &str = ".versioneye-update.json";

/// Manifest uploaded when no `--file` is given or `--file` names a directory
pub const DEFAULT_PROJECT_FILE: &str = "package.json";

/// Host used when `--baseurl` is not set
pub const DEFAULT_API_BASE_URL: &str = "www.versioneye.com";

/// Visibility used for `--createproject` without a value
pub const DEFAULT_VISIBILITY: &str = "public";

/// Prefix of the synthesized package name when `--globalpackagename` is unset
pub const GLOBAL_PACKAGE_NAME_PREFIX: &str = "GlobalNpmPackageFile";

/// Scheme of every API endpoint
pub const API_SCHEME: &str = "https";

/// Inventory command used by `--globalinstalls`
#[cfg(not(windows))]
pub const NPM_PROGRAM: &str = "npm";
#[cfg(windows)]
pub const NPM_PROGRAM: &str = "npm.cmd";
pub const NPM_LIST_GLOBAL_ARGS: [&str; 4] = ["list", "-g", "--depth=0", "-json"];

/// Manifest names and patterns accepted for upload, matched against the base name
pub const ALLOWED_PROJECT_FILES: &[&str] = &[
    // npm (Node.js)
    "package.json",
    "npm-shrinkwrap.json",
    "package-lock.json",
    "JSPN.io",
    // Yarn
    "yarn.lock",
    // Bower
    "bower.json",
    // Bundler (Ruby)
    "Gemfile",
    "Gemfile.lock",
    // CocoaPods
    "Podfile",
    "Podfile.lock",
    // Composer (PHP)
    "composer.json",
    "composer.lock",
    // pip (Python)
    "requirements.txt",
    "setup.py",
    // Biicode (C/C++)
    "biicode.conf",
    // Maven
    "pom.xml",
    // Leiningen
    "project.clj",
    // Gradle
    "*.gradle",
    // SBT
    "*.sbt",
    // NuGet
    "project.json",
    "package.conf",
    "*.nuspec",
    // Berkshelf (Chef)
    "metadata.rb",
    "Berksfile",
    "Berksfile.lock",
];

pub fn update_project_url(scheme: &str, base_url: &str, project_id: &str, api_key: &str) -> String {
    format!("{scheme}://{base_url}/api/v2/projects/{project_id}?api_key={api_key}")
}

pub fn create_project_url(scheme: &str, base_url: &str, api_key: &str) -> String {
    format!("{scheme}://{base_url}/api/v2/projects/?api_key={api_key}")
}

pub fn list_projects_url(scheme: &str, base_url: &str, api_key: &str) -> String {
    format!("{scheme}://{base_url}/api/v2/projects?api_key={api_key}")
}
