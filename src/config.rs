//! Option loading for versioneye-update
//!
//! Options come from several layers which are merged in the following order (later wins):
//! 1. `~/.versioneye-update.json`
//! 2. The file given by `--configfile`, or else `.versioneye-update.json` next to the
//!    manifest named by `--file`, or else the one in the working directory
//! 3. The command line
//!
//! Each layer is a flat JSON object of option name to value. The merged object is then
//! read into [`EffectiveOptions`], which is built once and handed to every component.
//!
//! ## Example
//!
//! ```json
//! {
//!     "apikey": "0123456789abcdef",
//!     "projectid": "5a1b2c3d4e5f",
//!     "licensecheck": true
//! }
//! ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::{env, fmt};

use crate::constants::{CONFIG_FILE_NAME, DEFAULT_API_BASE_URL, DEFAULT_VISIBILITY};
use crate::error::ConfigError;
use crate::exit_code::ExitCode;
use crate::manifest::{absolutize, directory_from_file_argument, is_directory, project_file_path};
use crate::report::Reporter;
use crate::{messages, Cli};

/// One source of option values
pub type OptionLayer = Map<String, Value>;

/// Options after all layers have been merged
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct EffectiveOptions {
    /// API key sent with every request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apikey: Option<String>,
    /// Project updated by the upload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projectid: Option<String>,
    /// Manifest to upload, or a directory holding `package.json`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// API host as configured, may be empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseurl: Option<String>,
    /// Print usage and stop
    #[serde(default, skip_serializing_if = "is_false")]
    pub help: bool,
    /// Print the version and stop
    #[serde(default, skip_serializing_if = "is_false")]
    pub version: bool,
    /// Trace config loading and print the raw API response
    #[serde(default, skip_serializing_if = "is_false")]
    pub dump: bool,
    /// Fail when the project has license violations
    #[serde(default, skip_serializing_if = "is_false")]
    pub licensecheck: bool,
    /// Fail when components have known vulnerabilities
    #[serde(default, skip_serializing_if = "is_false")]
    pub securitycheck: bool,
    /// List outdated components
    #[serde(default, skip_serializing_if = "is_false")]
    pub listoutdated: bool,
    /// Fail when any component is outdated
    #[serde(default, skip_serializing_if = "is_false")]
    pub failonoutdated: bool,
    /// Exit 0 whatever the checks say
    #[serde(default, skip_serializing_if = "is_false")]
    pub ignorechecks: bool,
    /// Upload a manifest built from globally installed npm packages
    #[serde(default, skip_serializing_if = "is_false")]
    pub globalinstalls: bool,
    /// Package name for the generated manifest
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub globalpackagename: Option<String>,
    /// Explicit option file or directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configfile: Option<String>,
    /// Create a project instead of updating one, with this visibility
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub createproject: Option<String>,

    /// API host, derived from `baseurl` after the merge
    #[serde(skip)]
    pub base_url: String,
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn is_set(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

/// Directories the option layers are looked up in
#[derive(Debug, Clone)]
pub struct ConfigLocations {
    pub home: Option<PathBuf>,
    pub cwd: PathBuf,
}

impl ConfigLocations {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(ConfigLocations {
            home: dirs::home_dir(),
            cwd: env::current_dir().context("reading current directory")?,
        })
    }
}

/// Which layer a loaded config file belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerTag {
    Home,
    ConfigFile,
    ProjectFile,
    Cwd,
}

impl fmt::Display for LayerTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            LayerTag::Home => "(~)",
            LayerTag::ConfigFile => "(--configfile)",
            LayerTag::ProjectFile => "(projectfile)",
            LayerTag::Cwd => "(cwd)",
        };
        f.write_str(tag)
    }
}

/// A config file that may or may not exist
#[derive(Debug, Clone)]
struct Candidate {
    path: PathBuf,
    tag: LayerTag,
}

/// Ordered alternatives for one layer; the first existing file is loaded
type LayerSource = Vec<Candidate>;

/// Overwrite keys of `base` with those of `over`
pub fn merge(mut base: OptionLayer, over: OptionLayer) -> OptionLayer {
    base.extend(over);
    base
}

/// The command-line layer: only options that were actually given
pub fn command_line_layer(cli: &Cli) -> OptionLayer {
    match serde_json::to_value(cli) {
        Ok(Value::Object(map)) => map,
        _ => OptionLayer::new(),
    }
}

/// Config file a path refers to; directories are searched for the default file name
fn locate_config_file(path: &Path) -> Option<PathBuf> {
    let path = if path.is_dir() {
        path.join(CONFIG_FILE_NAME)
    } else {
        path.to_path_buf()
    };
    path.is_file().then_some(path)
}

/// Read a single config layer
pub fn load_layer(path: &Path) -> Result<OptionLayer, ConfigError> {
    let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ConfigError::NotAnObject {
            path: path.to_path_buf(),
        }),
    }
}

fn layer_sources(cli: &Cli, locations: &ConfigLocations) -> Vec<LayerSource> {
    let mut sources = Vec::new();

    if let Some(home) = &locations.home {
        sources.push(vec![Candidate {
            path: home.join(CONFIG_FILE_NAME),
            tag: LayerTag::Home,
        }]);
    }

    if let Some(configfile) = &cli.configfile {
        sources.push(vec![Candidate {
            path: absolutize(Path::new(configfile), &locations.cwd),
            tag: LayerTag::ConfigFile,
        }]);
    } else {
        let mut local = Vec::new();
        if let Some(dir) = cli
            .file
            .as_deref()
            .and_then(|f| directory_from_file_argument(f, &locations.cwd))
        {
            local.push(Candidate {
                path: dir.join(CONFIG_FILE_NAME),
                tag: LayerTag::ProjectFile,
            });
        }
        local.push(Candidate {
            path: locations.cwd.join(CONFIG_FILE_NAME),
            tag: LayerTag::Cwd,
        });
        sources.push(local);
    }

    sources
}

/// Build the effective options for this invocation
///
/// A config file that cannot be read or parsed aborts the whole resolution.
pub fn resolve<W: Write>(
    cli: &Cli,
    locations: &ConfigLocations,
    out: &mut Reporter<W>,
) -> Result<EffectiveOptions, ConfigError> {
    let mut bag = OptionLayer::new();

    for source in layer_sources(cli, locations) {
        let Some((candidate, file)) = source
            .iter()
            .find_map(|c| locate_config_file(&c.path).map(|file| (c, file)))
        else {
            continue;
        };

        let dump = cli.dump || bag.get("dump") == Some(&Value::Bool(true));
        if dump {
            out.plain(messages::using_config_file(&file, &candidate.tag.to_string()));
        }
        tracing::debug!(path = %file.display(), layer = %candidate.tag, "loading config file");

        bag = merge(bag, load_layer(&file)?);
    }

    bag = merge(bag, command_line_layer(cli));

    let mut options: EffectiveOptions =
        serde_json::from_value(Value::Object(bag)).map_err(ConfigError::InvalidOption)?;
    options.base_url = options
        .baseurl
        .clone()
        .filter(|b| !b.is_empty())
        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
    Ok(options)
}

/// Options that cannot be used as given
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionConflict {
    pub code: ExitCode,
    pub message: String,
}

impl EffectiveOptions {
    /// Reject missing credentials and exclusive option pairs before any work is done
    pub fn check(&self) -> Result<(), OptionConflict> {
        if !is_set(&self.apikey) {
            return Err(OptionConflict {
                code: ExitCode::MissingApiKey,
                message: messages::MISSING_API_KEY.to_string(),
            });
        }

        if self.createproject.is_some() {
            if is_set(&self.projectid) {
                return Err(OptionConflict {
                    code: ExitCode::InvalidCommandLineOption,
                    message: messages::cannot_use_cli_together("createproject", "projectid"),
                });
            }
        } else if !is_set(&self.projectid) {
            return Err(OptionConflict {
                code: ExitCode::MissingProjectId,
                message: messages::MISSING_PROJECT_ID.to_string(),
            });
        }

        if self.globalinstalls && is_set(&self.file) {
            return Err(OptionConflict {
                code: ExitCode::InvalidCommandLineOption,
                message: messages::cannot_use_cli_together("globalinstalls", "file"),
            });
        }

        Ok(())
    }

    /// Visibility of a project to create, `None` for an update
    pub fn visibility(&self) -> Option<&str> {
        self.createproject.as_deref().map(|v| {
            if v.is_empty() {
                DEFAULT_VISIBILITY
            } else {
                v
            }
        })
    }

    /// Where a new option file is written after a project has been created
    pub fn option_file_path(&self, cwd: &Path) -> PathBuf {
        if let Some(configfile) = self.configfile.as_deref().filter(|c| !c.is_empty()) {
            let path = absolutize(Path::new(configfile), cwd);
            return if is_directory(&path) {
                path.join(CONFIG_FILE_NAME)
            } else {
                path
            };
        }
        let dir = self
            .file
            .as_deref()
            .and_then(|f| directory_from_file_argument(f, cwd))
            .unwrap_or_else(|| cwd.to_path_buf());
        dir.join(CONFIG_FILE_NAME)
    }

    /// The subset of options persisted for later runs against a newly created project
    pub fn saved_record(&self, project_id: &str, cwd: &Path) -> EffectiveOptions {
        let mut record = self.clone();
        record.apikey = None;
        record.configfile = None;
        record.createproject = None;
        record.projectid = Some(project_id.to_string());
        record.file = if self.globalinstalls {
            None
        } else {
            project_file_path(self.file.as_deref(), cwd)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
        };
        record
    }
}

/// Result of trying to persist an option file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(PathBuf),
    Skipped(PathBuf),
}

/// Persist the options of a freshly created project; an existing file is never touched
pub fn save_option_file(
    options: &EffectiveOptions,
    project_id: &str,
    cwd: &Path,
) -> anyhow::Result<SaveOutcome> {
    let path = options.option_file_path(cwd);
    if path.exists() {
        return Ok(SaveOutcome::Skipped(path));
    }

    let record = options.saved_record(project_id, cwd);
    let data = serde_json::to_string_pretty(&record)?;

    let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::AlreadyExists => {
            return Ok(SaveOutcome::Skipped(path));
        }
        Err(err) => {
            return Err(err).with_context(|| format!("creating option file {}", path.display()));
        }
    };
    file.write_all(data.as_bytes())
        .with_context(|| format!("writing option file {}", path.display()))?;
    tracing::debug!(path = %path.display(), "saved option file");
    Ok(SaveOutcome::Saved(path))
}
