use std::io::Write;
use std::path::Path;

use crate::api::{ManifestUpload, ProjectApi, ServiceResult};
use crate::config::EffectiveOptions;
use crate::exit_code::ExitCode;
use crate::global::{self, TempManifest};
use crate::interpret::interpret;
use crate::manifest::select_manifest;
use crate::messages;
use crate::report::Reporter;

/// Upload the selected manifest, or the generated one for `--globalinstalls`
pub async fn run<W: Write>(
    options: &EffectiveOptions,
    api: &dyn ProjectApi,
    cwd: &Path,
    out: &mut Reporter<W>,
) -> ExitCode {
    if options.globalinstalls {
        out.success(messages::CREATING_GLOBAL_PACKAGE_FILE);
        let stdout = match global::list_global_packages().await {
            Ok(stdout) => stdout,
            Err(err) => {
                tracing::debug!("cannot run npm: {err}");
                out.failure(messages::FAILED_TO_CALL_NPM);
                return ExitCode::FileNotFound;
            }
        };
        let manifest = match global::synthesize(options, &stdout, &global::hostname(), out) {
            Ok(manifest) => manifest,
            Err(code) => return code,
        };
        return upload_generated(options, api, manifest, cwd, out).await;
    }

    let path = match select_manifest(options.file.as_deref(), cwd, out) {
        Ok(path) => path,
        Err(code) => return code,
    };
    upload_file(options, api, &path, cwd, out).await
}

/// Upload a manifest that exists on disk
pub async fn upload_file<W: Write>(
    options: &EffectiveOptions,
    api: &dyn ProjectApi,
    path: &Path,
    cwd: &Path,
    out: &mut Reporter<W>,
) -> ExitCode {
    let upload = match ManifestUpload::from_path(path) {
        Ok(upload) => upload,
        Err(err) => {
            tracing::debug!("cannot read {}: {err}", path.display());
            out.failure(messages::file_not_found(path));
            return ExitCode::FileNotFound;
        }
    };

    out.success(messages::uploading_file(path));
    let result = send(options, api, upload).await;
    interpret(options, &result, cwd, out)
}

/// Upload a generated manifest and remove it again, whatever the outcome
pub async fn upload_generated<W: Write>(
    options: &EffectiveOptions,
    api: &dyn ProjectApi,
    manifest: TempManifest,
    cwd: &Path,
    out: &mut Reporter<W>,
) -> ExitCode {
    let code = match ManifestUpload::from_path(manifest.path()) {
        Ok(upload) => {
            let result = send(options, api, upload).await;
            interpret(options, &result, cwd, out)
        }
        Err(err) => {
            tracing::debug!("cannot read generated manifest: {err}");
            out.failure(messages::file_not_found(manifest.path()));
            ExitCode::FileNotFound
        }
    };

    let dir = manifest.dir().to_path_buf();
    if let Err(err) = manifest.remove() {
        tracing::warn!("cannot remove temporary manifest in {}: {err}", dir.display());
    }
    code
}

/// Create or update, depending on `--createproject`
async fn send(
    options: &EffectiveOptions,
    api: &dyn ProjectApi,
    upload: ManifestUpload,
) -> ServiceResult {
    match options.visibility() {
        Some(visibility) => api.create_project(upload, visibility).await,
        None => {
            let project_id = options.projectid.as_deref().unwrap_or_default();
            api.update_project(project_id, upload).await
        }
    }
}
