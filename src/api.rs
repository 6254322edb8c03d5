use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, ClientBuilder, RequestBuilder,
};
use serde_json::Value;
use std::path::Path;

use crate::constants::{
    create_project_url, list_projects_url, update_project_url, API_SCHEME, DEFAULT_VISIBILITY,
};
use crate::error::ServiceError;

/// A manifest ready to be sent as a multipart file field
#[derive(Debug, Clone)]
pub struct ManifestUpload {
    pub file_name: String,
    pub content: Vec<u8>,
}

impl ManifestUpload {
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let content = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(ManifestUpload { file_name, content })
    }

    fn into_part(self) -> Part {
        Part::bytes(self.content).file_name(self.file_name)
    }
}

/// Outcome of one API call
///
/// `body` is `Null` for transport errors and an empty object when the response could
/// not be parsed.
#[derive(Debug)]
pub struct ServiceResult {
    pub status: Option<u16>,
    pub body: Value,
    pub error: Option<ServiceError>,
}

impl ServiceResult {
    pub fn transport(err: ServiceError) -> Self {
        ServiceResult {
            status: None,
            body: Value::Null,
            error: Some(err),
        }
    }

    /// Classify a response that made it back from the server
    pub fn from_response(status: u16, text: &str) -> Self {
        let body: Value = match serde_json::from_str(text) {
            Ok(body) => body,
            Err(err) => {
                return ServiceResult {
                    status: Some(status),
                    body: Value::Object(Default::default()),
                    error: Some(ServiceError::Parse(err)),
                }
            }
        };

        if status == 200 || status == 201 {
            return ServiceResult {
                status: Some(status),
                body,
                error: None,
            };
        }

        let message = body
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| body.to_string());
        ServiceResult {
            status: Some(status),
            body,
            error: Some(ServiceError::Api(message)),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Remote operations against the VersionEye projects API
///
/// One logical upload awaits exactly one of these calls.
#[async_trait]
pub trait ProjectApi: Send + Sync {
    async fn create_project(&self, upload: ManifestUpload, visibility: &str) -> ServiceResult;

    async fn update_project(&self, project_id: &str, upload: ManifestUpload) -> ServiceResult;

    async fn list_projects(&self) -> ServiceResult;
}

pub struct VersionEyeClient {
    api_key: String,
    base_url: String,
    scheme: &'static str,
    client: Client,
}

impl VersionEyeClient {
    pub fn new(api_key: &str, base_url: &str) -> anyhow::Result<Self> {
        let client = Self::builder().build()?;
        Ok(Self::with_client(api_key, base_url, API_SCHEME, client))
    }

    fn builder() -> ClientBuilder {
        Client::builder().user_agent(concat!("versioneye-update/", env!("CARGO_PKG_VERSION")))
    }

    fn with_client(api_key: &str, base_url: &str, scheme: &'static str, client: Client) -> Self {
        VersionEyeClient {
            api_key: api_key.to_string(),
            base_url: base_url.to_string(),
            scheme,
            client,
        }
    }

    fn redacted(&self, url: &str) -> String {
        if self.api_key.is_empty() {
            return url.to_string();
        }
        url.replace(&self.api_key, "***")
    }

    async fn send(&self, req: RequestBuilder) -> ServiceResult {
        let resp = match req.send().await {
            Ok(resp) => resp,
            Err(err) => return ServiceResult::transport(err.into()),
        };
        let status = resp.status().as_u16();
        match resp.text().await {
            Ok(text) => {
                tracing::debug!(status, "VersionEye API responded");
                ServiceResult::from_response(status, &text)
            }
            Err(err) => ServiceResult::transport(err.into()),
        }
    }
}

#[async_trait]
impl ProjectApi for VersionEyeClient {
    async fn create_project(&self, upload: ManifestUpload, visibility: &str) -> ServiceResult {
        let visibility = if visibility.is_empty() {
            DEFAULT_VISIBILITY
        } else {
            visibility
        };
        let url = create_project_url(self.scheme, &self.base_url, &self.api_key);
        tracing::debug!(url = %self.redacted(&url), visibility, "creating project");
        let form = Form::new()
            .part("upload", upload.into_part())
            .text("visibility", visibility.to_string());
        self.send(self.client.post(&url).multipart(form)).await
    }

    async fn update_project(&self, project_id: &str, upload: ManifestUpload) -> ServiceResult {
        let url = update_project_url(self.scheme, &self.base_url, project_id, &self.api_key);
        tracing::debug!(url = %self.redacted(&url), "updating project");
        let form = Form::new().part("project_file", upload.into_part());
        self.send(self.client.post(&url).multipart(form)).await
    }

    async fn list_projects(&self) -> ServiceResult {
        let url = list_projects_url(self.scheme, &self.base_url, &self.api_key);
        tracing::debug!(url = %self.redacted(&url), "listing projects");
        self.send(self.client.get(&url)).await
    }
}
