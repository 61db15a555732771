//! HTTP backend for the campusync REST API.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;

use campusync_core::query::{ListParams, QueryError, Result};
use campusync_core::resources::{
    into_page, into_record, ApiResponse, ListData, Page, Record, ResourceDescriptor, Transition,
};

use super::{Backend, FileUpload};
use crate::config::Config;
use crate::error::ClientError;

/// Multipart field the upload endpoint reads files from.
const FILES_FIELD: &str = "files";

/// HTTP client for the campusync API.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpBackend {
    /// Create a new client with the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            token: None,
        }
    }

    /// Send `token` as a bearer token with every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn from_config(config: &Config) -> Self {
        let backend = Self::new(config.base_url.clone());
        match &config.token {
            Some(token) => backend.with_token(token.clone()),
            None => backend,
        }
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a URL for an endpoint.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and parse the envelope of a successful response.
    async fn send<D: DeserializeOwned>(&self, request: RequestBuilder) -> crate::error::Result<(u16, ApiResponse<D>)> {
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = read_success(response).await?;
        let envelope =
            serde_json::from_slice(&body).map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        Ok((status, envelope))
    }

    async fn send_record<T: Record>(&self, request: RequestBuilder) -> Result<T> {
        let (status, envelope) = self.send::<T>(request).await?;
        into_record(envelope, status)
    }
}

/// Returns the body of a 2xx response, or the error it describes.
async fn read_success(response: Response) -> crate::error::Result<Vec<u8>> {
    let status = response.status();
    let body = response.bytes().await?;
    if status.is_success() {
        Ok(body.to_vec())
    } else {
        Err(ClientError::ServerError {
            status: status.as_u16(),
            message: error_message(&body),
        })
    }
}

/// The envelope's `message`, else the raw body text.
fn error_message(body: &[u8]) -> String {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|value| value.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| String::from_utf8_lossy(body).trim().to_string())
}

#[async_trait]
impl Backend for HttpBackend {
    async fn list<T: Record>(&self, resource: &ResourceDescriptor, params: &ListParams) -> Result<Page<T>> {
        let request = self
            .request(Method::GET, &resource.path())
            .query(&params.to_pairs());
        let (status, envelope) = self.send::<ListData<T>>(request).await?;
        into_page(envelope, status, params)
    }

    async fn get<T: Record>(&self, resource: &ResourceDescriptor, id: &str) -> Result<T> {
        self.send_record(self.request(Method::GET, &resource.record_path(id)))
            .await
    }

    async fn create<T: Record>(&self, resource: &ResourceDescriptor, body: &Value) -> Result<T> {
        self.send_record(self.request(Method::POST, &resource.path()).json(body))
            .await
    }

    async fn update<T: Record>(&self, resource: &ResourceDescriptor, id: &str, body: &Value) -> Result<T> {
        self.send_record(self.request(Method::PUT, &resource.record_path(id)).json(body))
            .await
    }

    async fn transition<T: Record>(
        &self,
        resource: &ResourceDescriptor,
        id: &str,
        transition: Transition,
    ) -> Result<T> {
        let path = format!("{}/{}", resource.record_path(id), transition.action());
        self.send_record(self.request(Method::PATCH, &path)).await
    }

    async fn delete(&self, resource: &ResourceDescriptor, id: &str) -> Result<()> {
        let response = self
            .request(Method::DELETE, &resource.record_path(id))
            .send()
            .await
            .map_err(ClientError::from)?;
        let status = response.status().as_u16();
        let body = read_success(response).await?;
        // Some deployments answer 204 with no body.
        if body.is_empty() {
            return Ok(());
        }
        let envelope: ApiResponse<Value> =
            serde_json::from_slice(&body).map_err(|e| QueryError::Decode(e.to_string()))?;
        if envelope.success {
            Ok(())
        } else {
            Err(QueryError::from_status(status, envelope.message))
        }
    }

    async fn attach_file<T: Record>(
        &self,
        resource: &ResourceDescriptor,
        id: &str,
        upload: &FileUpload,
    ) -> Result<T> {
        let part = reqwest::multipart::Part::bytes(upload.bytes.clone())
            .file_name(upload.file_name.clone())
            .mime_str(&upload.mime_type)
            .map_err(ClientError::from)?;
        let form = reqwest::multipart::Form::new().part(FILES_FIELD, part);
        let path = format!("{}/files", resource.record_path(id));
        self.send_record(self.request(Method::POST, &path).multipart(form))
            .await
    }

    async fn detach_file<T: Record>(&self, resource: &ResourceDescriptor, id: &str, file_id: &str) -> Result<T> {
        let path = resource.file_path(id, file_id);
        self.send_record(self.request(Method::DELETE, &path)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        let backend = HttpBackend::new("http://localhost:5000/api/");
        assert_eq!(backend.url("/courses"), "http://localhost:5000/api/courses");
    }

    #[test]
    fn test_error_message_from_envelope() {
        let body = br#"{"success": false, "message": "Course not found"}"#;
        assert_eq!(error_message(body), "Course not found");
    }

    #[test]
    fn test_error_message_from_plain_text() {
        assert_eq!(error_message(b"  Bad Gateway\n"), "Bad Gateway");
        assert_eq!(error_message(b""), "");
    }

    #[test]
    fn test_from_config_keeps_token() {
        let config = Config {
            base_url: "http://api.test".to_string(),
            token: Some("secret".to_string()),
            mode: crate::config::Mode::Production,
            list_stale_seconds: 300,
            list_gc_seconds: 600,
            detail_stale_seconds: 600,
            detail_gc_seconds: 1_800,
            cache_max_entries: 100,
            gc_interval_seconds: 60,
        };
        let backend = HttpBackend::from_config(&config);
        assert_eq!(backend.base_url(), "http://api.test");
        assert_eq!(backend.token.as_deref(), Some("secret"));
    }
}
