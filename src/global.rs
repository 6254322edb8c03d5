//! Pseudo manifest for globally installed npm packages (`--globalinstalls`)
//!
//! The output of `npm list -g --depth=0 -json` is turned into a `package.json` that lists
//! every global package at its installed version. The file lives in a fresh temporary
//! directory for the duration of one upload.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::{env, fs};
use tempfile::TempDir;

use crate::config::EffectiveOptions;
use crate::constants::{
    DEFAULT_PROJECT_FILE, GLOBAL_PACKAGE_NAME_PREFIX, NPM_LIST_GLOBAL_ARGS, NPM_PROGRAM,
};
use crate::exit_code::ExitCode;
use crate::messages;
use crate::report::Reporter;

/// Installed version per global package name
pub type Inventory = BTreeMap<String, String>;

/// Synthesized `package.json` document
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct GlobalPackageFile {
    pub name: String,
    pub description: String,
    pub author: String,
    pub version: String,
    pub dependencies: Inventory,
}

impl GlobalPackageFile {
    pub fn new(name: Option<&str>, host: &str, dependencies: Inventory) -> Self {
        let name = name
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("{GLOBAL_PACKAGE_NAME_PREFIX}{host}"));
        GlobalPackageFile {
            name,
            description: format!(
                "Package file for VersionEye, created for globally installed packages on {host}"
            ),
            author: format!(
                "Automatically created by versioneye-update {}",
                env!("CARGO_PKG_VERSION")
            ),
            version: chrono::Local::now().format("%Y%m%d%H%M%S").to_string(),
            dependencies,
        }
    }
}

/// Map of package name to installed version, `None` when npm reported no dependencies
pub fn parse_inventory(stdout: &str) -> Result<Option<Inventory>, serde_json::Error> {
    let value: Value = serde_json::from_str(stdout)?;
    let Some(deps) = value.get("dependencies").and_then(Value::as_object) else {
        return Ok(None);
    };
    let versions = deps
        .iter()
        .map(|(name, info)| {
            let version = info
                .get("version")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            (name.clone(), version)
        })
        .collect();
    Ok(Some(versions))
}

/// Run the npm inventory command and return its stdout
///
/// npm exits non-zero for problems like extraneous packages while still printing a
/// usable listing, so only a failure to launch is an error here.
pub async fn list_global_packages() -> io::Result<String> {
    let output = tokio::process::Command::new(NPM_PROGRAM)
        .args(NPM_LIST_GLOBAL_ARGS)
        .output()
        .await?;
    if !output.status.success() {
        tracing::warn!(status = %output.status, "npm list exited unsuccessfully");
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

pub fn hostname() -> String {
    ["HOSTNAME", "COMPUTERNAME"]
        .iter()
        .find_map(|var| env::var(var).ok().filter(|h| !h.is_empty()))
        .or_else(|| {
            fs::read_to_string("/etc/hostname")
                .ok()
                .map(|h| h.trim().to_string())
                .filter(|h| !h.is_empty())
        })
        .unwrap_or_else(|| "localhost".to_string())
}

/// A generated manifest inside its own temporary directory
pub struct TempManifest {
    dir: TempDir,
    path: PathBuf,
}

impl TempManifest {
    pub fn write(content: &str) -> io::Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("versioneye-update-")
            .tempdir()?;
        let path = dir.path().join(DEFAULT_PROJECT_FILE);
        fs::write(&path, content)?;
        tracing::debug!(path = %path.display(), "wrote generated manifest");
        Ok(TempManifest { dir, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Delete the file, then the directory
    pub fn remove(self) -> io::Result<()> {
        fs::remove_file(&self.path)?;
        self.dir.close()
    }
}

/// Build the pseudo manifest from npm's listing and write it to a temporary file
pub fn synthesize<W: Write>(
    options: &EffectiveOptions,
    npm_stdout: &str,
    host: &str,
    out: &mut Reporter<W>,
) -> Result<TempManifest, ExitCode> {
    let dependencies = match parse_inventory(npm_stdout) {
        Ok(Some(deps)) => deps,
        Ok(None) => {
            out.failure(messages::FAILED_TO_CALL_NPM);
            out.plain(npm_stdout);
            Inventory::new()
        }
        Err(err) => {
            tracing::debug!("npm output is not JSON: {err}");
            out.failure(messages::FAILED_TO_CALL_NPM);
            out.plain(npm_stdout);
            return Err(ExitCode::FileNotFound);
        }
    };

    let package = GlobalPackageFile::new(options.globalpackagename.as_deref(), host, dependencies);
    let content = serde_json::to_string_pretty(&package).map_err(|err| {
        out.failure(err);
        ExitCode::FileNotFound
    })?;

    if options.dump {
        out.plain(messages::UPLOADING_GENERATED_FILE);
        out.plain(&content);
    }

    TempManifest::write(&content).map_err(|err| {
        out.failure(format!("cannot write generated manifest: {err}"));
        ExitCode::FileNotFound
    })
}
