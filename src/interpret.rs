//! Turns an API result into console output and an exit code
//!
//! The checks run in a fixed order (outdated components, licenses, security) and the
//! first failing check decides the exit code. Each check is only run when its option
//! is set.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::io::Write;
use std::path::Path;

use crate::api::ServiceResult;
use crate::config::{save_option_file, EffectiveOptions, SaveOutcome};
use crate::exit_code::ExitCode;
use crate::messages;
use crate::report::Reporter;

/// Fields of a project response the checks look at
#[derive(Deserialize, Debug, Default)]
struct ProjectResponse {
    #[serde(default, deserialize_with = "scalar_text")]
    id: String,
    #[serde(default, deserialize_with = "scalar_text")]
    name: String,
    #[serde(default, deserialize_with = "dependency_list")]
    dependencies: Option<Vec<Dependency>>,
    #[serde(default, deserialize_with = "lenient_count")]
    licenses_red: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    sv_count: u64,
}

#[derive(Deserialize, Debug)]
struct Dependency {
    #[serde(default, deserialize_with = "scalar_text")]
    name: String,
    #[serde(default, deserialize_with = "lenient_flag")]
    outdated: bool,
    #[serde(default, deserialize_with = "scalar_text")]
    version_requested: String,
    #[serde(default, deserialize_with = "scalar_text")]
    version_current: String,
}

impl ProjectResponse {
    fn from_body(body: &Value) -> Self {
        if !body.is_object() {
            return ProjectResponse::default();
        }
        ProjectResponse::deserialize(body).unwrap_or_else(|err| {
            tracing::warn!(%err, "unexpected response shape, checks see an empty project");
            ProjectResponse::default()
        })
    }
}

/// Render a JSON scalar the way it should appear in a message
fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Integers and floats count, anything else is zero
fn count(value: &Value) -> u64 {
    value
        .as_u64()
        .or_else(|| value.as_f64().map(|f| f.max(0.0) as u64))
        .unwrap_or(0)
}

fn scalar_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Value::deserialize(deserializer).map(|v| text(&v))
}

fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    Value::deserialize(deserializer).map(|v| count(&v))
}

fn lenient_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Value::deserialize(deserializer).map(|v| v.as_bool().unwrap_or(false))
}

// Entries that are not objects are never outdated.
fn dependency_list<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<Dependency>>, D::Error> {
    let Value::Array(entries) = Value::deserialize(deserializer)? else {
        return Ok(None);
    };
    Ok(Some(
        entries
            .iter()
            .filter(|entry| entry.is_object())
            .filter_map(|entry| Dependency::deserialize(entry).ok())
            .collect(),
    ))
}

/// Evaluate the result of a create or update call
pub fn interpret<W: Write>(
    options: &EffectiveOptions,
    result: &ServiceResult,
    cwd: &Path,
    out: &mut Reporter<W>,
) -> ExitCode {
    if options.dump {
        out.plain(messages::API_SAYS);
        let dumped = serde_json::to_string_pretty(&result.body)
            .unwrap_or_else(|_| result.body.to_string());
        out.plain(dumped);
    }

    if let Some(err) = &result.error {
        out.failure(err);
        return ExitCode::ApiCallFailed;
    }

    let project = ProjectResponse::from_body(&result.body);
    if options.createproject.is_some() {
        out.success(messages::success_creation(&project.name, &project.id));
        persist_options(options, &project, cwd, out);
    } else {
        out.success(messages::SUCCESS);
    }

    let code = outdated_check(options, &project, out)
        .and_then(|()| license_check(options, &project, out))
        .and_then(|()| security_check(options, &project, out));
    match code {
        Ok(()) => ExitCode::Ok,
        Err(code) => {
            tracing::debug!(?code, "check failed");
            code
        }
    }
}

fn persist_options<W: Write>(
    options: &EffectiveOptions,
    project: &ProjectResponse,
    cwd: &Path,
    out: &mut Reporter<W>,
) {
    if project.id.is_empty() {
        tracing::warn!("create response carries no project id, not saving option file");
        return;
    }

    match save_option_file(options, &project.id, cwd) {
        Ok(SaveOutcome::Saved(path)) => {
            out.success(messages::saved_option_file(&path));
            if options.globalinstalls {
                out.success(messages::STORE_THIS_FILE_LOCALLY);
            } else {
                out.success(messages::ADD_THIS_FILE_TO_REPOSITORY);
            }
        }
        Ok(SaveOutcome::Skipped(path)) => {
            out.failure(messages::skipping_creation_option_file_exists(&path));
        }
        Err(err) => out.failure(format!("{err:#}")),
    }
}

fn outdated_check<W: Write>(
    options: &EffectiveOptions,
    project: &ProjectResponse,
    out: &mut Reporter<W>,
) -> Result<(), ExitCode> {
    if !(options.failonoutdated || options.listoutdated) {
        return Ok(());
    }
    let Some(dependencies) = &project.dependencies else {
        return Ok(());
    };

    let outdated: Vec<&Dependency> = dependencies.iter().filter(|dep| dep.outdated).collect();

    if outdated.is_empty() {
        out.success(messages::ALL_COMPONENTS_UP_TO_DATE);
        return Ok(());
    }

    out.failure(messages::OUTDATED);
    for dep in &outdated {
        out.failure(messages::outdated_component(
            &dep.name,
            &dep.version_requested,
            &dep.version_current,
        ));
    }

    if options.failonoutdated {
        return Err(ExitCode::OutdatedComponentsFailed);
    }
    Ok(())
}

fn license_check<W: Write>(
    options: &EffectiveOptions,
    project: &ProjectResponse,
    out: &mut Reporter<W>,
) -> Result<(), ExitCode> {
    if !options.licensecheck {
        return Ok(());
    }
    if project.licenses_red > 0 {
        out.failure(messages::LICENSE_RED);
        return Err(ExitCode::LicenseCheckFailed);
    }
    out.success(messages::LICENSE_CHECK_PASS);
    Ok(())
}

fn security_check<W: Write>(
    options: &EffectiveOptions,
    project: &ProjectResponse,
    out: &mut Reporter<W>,
) -> Result<(), ExitCode> {
    if !options.securitycheck {
        return Ok(());
    }
    if project.sv_count > 0 {
        out.failure(messages::security_vulnerability_known(project.sv_count));
        return Err(ExitCode::SecurityViolationCheckFailed);
    }
    out.success(messages::SECURITY_CHECK_PASS);
    Ok(())
}
