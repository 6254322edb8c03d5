use async_trait::async_trait;
use serde_json::{json, Value};
use std::fs;
use std::sync::Mutex;
use tempfile::TempDir;
use versioneye_update::api::{ManifestUpload, ProjectApi, ServiceResult};
use versioneye_update::commands::{self, upload};
use versioneye_update::config::EffectiveOptions;
use versioneye_update::error::ServiceError;
use versioneye_update::global;
use versioneye_update::report::Reporter;
use versioneye_update::ExitCode;

/// Scripted stand-in for the VersionEye API that records every call
struct FakeApi {
    status: u16,
    body: Value,
    fail_transport: bool,
    calls: Mutex<Vec<String>>,
}

impl FakeApi {
    fn responding(status: u16, body: Value) -> Self {
        FakeApi {
            status,
            body,
            fail_transport: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn unreachable() -> Self {
        FakeApi {
            fail_transport: true,
            ..FakeApi::responding(0, Value::Null)
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn answer(&self, call: String) -> ServiceResult {
        self.calls.lock().unwrap().push(call);
        if self.fail_transport {
            return ServiceResult::transport(ServiceError::Transport("connection refused".into()));
        }
        ServiceResult::from_response(self.status, &self.body.to_string())
    }
}

#[async_trait]
impl ProjectApi for FakeApi {
    async fn create_project(&self, upload: ManifestUpload, visibility: &str) -> ServiceResult {
        self.answer(format!("create {} {}", upload.file_name, visibility))
    }

    async fn update_project(&self, project_id: &str, upload: ManifestUpload) -> ServiceResult {
        self.answer(format!("update {} {}", project_id, upload.file_name))
    }

    async fn list_projects(&self) -> ServiceResult {
        self.answer("list".to_string())
    }
}

fn update_options() -> EffectiveOptions {
    EffectiveOptions {
        apikey: Some("key".into()),
        projectid: Some("p-1".into()),
        base_url: "www.versioneye.com".into(),
        ..Default::default()
    }
}

fn project_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("package.json"), r#"{"name":"demo"}"#).unwrap();
    dir
}

fn plain(out: &Reporter<Vec<u8>>) -> String {
    console::strip_ansi_codes(&out.captured()).into_owned()
}

#[tokio::test]
async fn test_update_uploads_default_manifest() {
    let dir = project_dir();
    let api = FakeApi::responding(200, json!({"id": "p-1", "name": "demo"}));
    let mut out = Reporter::new(Vec::new());

    let code = commands::execute(&update_options(), &api, dir.path(), &mut out).await;

    assert_eq!(code, ExitCode::Ok);
    assert_eq!(api.calls(), vec!["update p-1 package.json"]);
    assert!(plain(&out).contains("Successfully updated your VersionEye project"));
}

#[tokio::test]
async fn test_license_violation_fails_check() {
    let dir = project_dir();
    let api = FakeApi::responding(200, json!({"licenses_red": 2, "sv_count": 0}));
    let options = EffectiveOptions {
        licensecheck: true,
        ..update_options()
    };
    let mut out = Reporter::new(Vec::new());

    let code = commands::execute(&options, &api, dir.path(), &mut out).await;

    assert_eq!(code, ExitCode::LicenseCheckFailed);
    assert!(plain(&out).contains("At least one license violation occurred"));
}

#[tokio::test]
async fn test_license_check_passes_without_violations() {
    let dir = project_dir();
    let api = FakeApi::responding(200, json!({"licenses_red": 0}));
    let options = EffectiveOptions {
        licensecheck: true,
        ..update_options()
    };
    let mut out = Reporter::new(Vec::new());

    let code = commands::execute(&options, &api, dir.path(), &mut out).await;

    assert_eq!(code, ExitCode::Ok);
    assert!(plain(&out).contains("License check passed"));
}

#[tokio::test]
async fn test_security_vulnerabilities_fail_check() {
    let dir = project_dir();
    let api = FakeApi::responding(201, json!({"sv_count": 3}));
    let options = EffectiveOptions {
        securitycheck: true,
        ..update_options()
    };
    let mut out = Reporter::new(Vec::new());

    let code = commands::execute(&options, &api, dir.path(), &mut out).await;

    assert_eq!(code, ExitCode::SecurityViolationCheckFailed);
    assert!(plain(&out).contains("3 known security vulnerability"));
}

fn three_dependencies() -> Value {
    json!({
        "dependencies": [
            {"name": "lodash", "outdated": false, "version_requested": "4.17.21", "version_current": "4.17.21"},
            {"name": "express", "outdated": true, "version_requested": "3.0.0", "version_current": "4.18.2"},
            {"name": "chalk", "outdated": false, "version_requested": "5.3.0", "version_current": "5.3.0"}
        ]
    })
}

#[tokio::test]
async fn test_list_outdated_prints_one_line_and_passes() {
    let dir = project_dir();
    let api = FakeApi::responding(200, three_dependencies());
    let options = EffectiveOptions {
        listoutdated: true,
        ..update_options()
    };
    let mut out = Reporter::new(Vec::new());

    let code = commands::execute(&options, &api, dir.path(), &mut out).await;

    assert_eq!(code, ExitCode::Ok);
    let text = plain(&out);
    assert!(text.contains("The following components are outdated:"));
    let outdated_lines: Vec<&str> = text.lines().filter(|l| l.ends_with(')')).collect();
    assert_eq!(outdated_lines, vec!["express (3.0.0/4.18.2)"]);
}

#[tokio::test]
async fn test_fail_on_outdated_short_circuits_later_checks() {
    let dir = project_dir();
    let mut body = three_dependencies();
    body["licenses_red"] = json!(1);
    let api = FakeApi::responding(200, body);
    let options = EffectiveOptions {
        failonoutdated: true,
        licensecheck: true,
        ..update_options()
    };
    let mut out = Reporter::new(Vec::new());

    let code = commands::execute(&options, &api, dir.path(), &mut out).await;

    assert_eq!(code, ExitCode::OutdatedComponentsFailed);
    assert!(!plain(&out).to_lowercase().contains("license"));
}

#[tokio::test]
async fn test_all_up_to_date() {
    let dir = project_dir();
    let api = FakeApi::responding(200, json!({"dependencies": []}));
    let options = EffectiveOptions {
        failonoutdated: true,
        ..update_options()
    };
    let mut out = Reporter::new(Vec::new());

    let code = commands::execute(&options, &api, dir.path(), &mut out).await;

    assert_eq!(code, ExitCode::Ok);
    assert!(plain(&out).contains("All components are up to date."));
}

#[tokio::test]
async fn test_ignore_checks_still_prints_failure() {
    let dir = project_dir();
    let api = FakeApi::responding(200, json!({"licenses_red": 5}));
    let options = EffectiveOptions {
        licensecheck: true,
        ignorechecks: true,
        ..update_options()
    };
    let mut out = Reporter::new(Vec::new());

    let code = commands::execute(&options, &api, dir.path(), &mut out).await;

    assert_eq!(code, ExitCode::LicenseCheckFailed);
    assert_eq!(code.finish(options.ignorechecks), 0);
    assert!(plain(&out).contains("At least one license violation occurred"));
}

#[tokio::test]
async fn test_api_error_is_reported_verbatim() {
    let dir = project_dir();
    let api = FakeApi::responding(404, json!({"error": "Project not found"}));
    let options = EffectiveOptions {
        dump: true,
        ..update_options()
    };
    let mut out = Reporter::new(Vec::new());

    let code = commands::execute(&options, &api, dir.path(), &mut out).await;

    assert_eq!(code, ExitCode::ApiCallFailed);
    let text = plain(&out);
    assert!(text.contains("VersionEye API says:"));
    assert!(text.contains("VersionEye API says \"Project not found\""));
}

#[tokio::test]
async fn test_transport_error_fails_call() {
    let dir = project_dir();
    let api = FakeApi::unreachable();
    let mut out = Reporter::new(Vec::new());

    let code = commands::execute(&update_options(), &api, dir.path(), &mut out).await;

    assert_eq!(code, ExitCode::ApiCallFailed);
    assert!(plain(&out).contains("connection refused"));
}

#[tokio::test]
async fn test_disallowed_manifest_never_reaches_network() {
    let dir = project_dir();
    fs::write(dir.path().join("Cargo.toml"), "[package]").unwrap();
    let api = FakeApi::responding(200, json!({}));
    let options = EffectiveOptions {
        file: Some("Cargo.toml".into()),
        ..update_options()
    };
    let mut out = Reporter::new(Vec::new());

    let code = commands::execute(&options, &api, dir.path(), &mut out).await;

    assert_eq!(code, ExitCode::InvalidFileType);
    assert!(api.calls().is_empty());
    assert!(plain(&out).contains("Unknown file type"));
}

#[tokio::test]
async fn test_missing_manifest_tries_cwd_then_fails() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("web")).unwrap();
    let api = FakeApi::responding(200, json!({}));
    let options = EffectiveOptions {
        file: Some("web".into()),
        ..update_options()
    };
    let mut out = Reporter::new(Vec::new());

    let code = commands::execute(&options, &api, dir.path(), &mut out).await;

    assert_eq!(code, ExitCode::FileNotFound);
    assert!(api.calls().is_empty());
    let text = plain(&out);
    assert!(text.contains("trying as relative file specification to cwd"));
    assert!(text.contains("Cannot find file"));
}

#[tokio::test]
async fn test_manifest_found_in_cwd_fallback() {
    let dir = project_dir();
    fs::create_dir(dir.path().join("web")).unwrap();
    let api = FakeApi::responding(200, json!({}));
    let options = EffectiveOptions {
        file: Some("web".into()),
        ..update_options()
    };
    let mut out = Reporter::new(Vec::new());

    let code = commands::execute(&options, &api, dir.path(), &mut out).await;

    assert_eq!(code, ExitCode::Ok);
    assert_eq!(api.calls(), vec!["update p-1 package.json"]);
}

#[tokio::test]
async fn test_conflicting_options_rejected_before_upload() {
    let dir = project_dir();
    let api = FakeApi::responding(200, json!({}));
    let mut out = Reporter::new(Vec::new());

    let options = EffectiveOptions {
        globalinstalls: true,
        file: Some("package.json".into()),
        ..update_options()
    };
    let code = commands::execute(&options, &api, dir.path(), &mut out).await;
    assert_eq!(code, ExitCode::InvalidCommandLineOption);

    let options = EffectiveOptions {
        createproject: Some("private".into()),
        ..update_options()
    };
    let code = commands::execute(&options, &api, dir.path(), &mut out).await;
    assert_eq!(code, ExitCode::InvalidCommandLineOption);

    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_create_project_saves_option_file_once() {
    let dir = project_dir();
    let api = FakeApi::responding(201, json!({"id": "new-42", "name": "demo"}));
    let options = EffectiveOptions {
        apikey: Some("secret".into()),
        createproject: Some(String::new()),
        licensecheck: true,
        base_url: "www.versioneye.com".into(),
        ..Default::default()
    };

    let mut out = Reporter::new(Vec::new());
    let code = commands::execute(&options, &api, dir.path(), &mut out).await;
    assert_eq!(code, ExitCode::Ok);
    assert_eq!(api.calls(), vec!["create package.json public"]);

    let saved_path = dir.path().join(".versioneye-update.json");
    let saved: Value = serde_json::from_str(&fs::read_to_string(&saved_path).unwrap()).unwrap();
    assert_eq!(saved["projectid"], json!("new-42"));
    assert_eq!(saved["file"], json!("package.json"));
    assert_eq!(saved["licensecheck"], json!(true));
    assert!(saved.get("apikey").is_none());
    assert!(saved.get("createproject").is_none());
    let text = plain(&out);
    assert!(text.contains("new project ID is: \"new-42\""));
    assert!(text.contains("Saved options to config file"));

    // second run: existing file is left alone
    fs::write(&saved_path, r#"{"projectid": "keep-me"}"#).unwrap();
    let mut out = Reporter::new(Vec::new());
    let code = commands::execute(&options, &api, dir.path(), &mut out).await;
    assert_eq!(code, ExitCode::Ok);
    assert_eq!(
        fs::read_to_string(&saved_path).unwrap(),
        r#"{"projectid": "keep-me"}"#
    );
    assert!(plain(&out).contains("Skipping creation of option file"));
}

#[tokio::test]
async fn test_generated_manifest_removed_after_failed_upload() {
    let dir = TempDir::new().unwrap();
    let options = EffectiveOptions {
        globalinstalls: true,
        ..update_options()
    };
    let mut out = Reporter::new(Vec::new());
    let npm = r#"{"dependencies": {"typescript": {"version": "5.3.3"}}}"#;

    let manifest = global::synthesize(&options, npm, "buildbox", &mut out).unwrap();
    let temp_dir = manifest.dir().to_path_buf();
    let temp_file = manifest.path().to_path_buf();
    assert!(temp_file.is_file());

    let api = FakeApi::unreachable();
    let code = upload::upload_generated(&options, &api, manifest, dir.path(), &mut out).await;

    assert_eq!(code, ExitCode::ApiCallFailed);
    assert_eq!(api.calls(), vec!["update p-1 package.json"]);
    assert!(!temp_file.exists());
    assert!(!temp_dir.exists());
}

#[tokio::test]
async fn test_generated_manifest_removed_after_success() {
    let dir = TempDir::new().unwrap();
    let options = EffectiveOptions {
        globalinstalls: true,
        dump: true,
        ..update_options()
    };
    let mut out = Reporter::new(Vec::new());
    let npm = r#"{"dependencies": {"npm": {"version": "10.2.4"}}}"#;

    let manifest = global::synthesize(&options, npm, "buildbox", &mut out).unwrap();
    let temp_dir = manifest.dir().to_path_buf();

    let api = FakeApi::responding(200, json!({"id": "p-1"}));
    let code = upload::upload_generated(&options, &api, manifest, dir.path(), &mut out).await;

    assert_eq!(code, ExitCode::Ok);
    assert!(!temp_dir.exists());
    let text = plain(&out);
    assert!(text.contains("Uploading generated package.json file:"));
    assert!(text.contains("\"npm\": \"10.2.4\""));
}
