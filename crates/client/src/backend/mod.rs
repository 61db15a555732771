//! Backends the resource façade reads from and writes to.

mod http;
mod mock;

pub use http::HttpBackend;
pub use mock::MockBackend;

use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;

use campusync_core::query::{ListParams, Result};
use campusync_core::resources::{Page, Record, ResourceDescriptor, Transition};

use crate::config::Config;
use crate::error::ClientError;

/// A file to attach to a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Reads a file from disk, guessing its MIME type from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> crate::error::Result<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| ClientError::InvalidInput(format!("not a file: {}", path.display())))?
            .to_string();
        let bytes = tokio::fs::read(path).await?;
        let mime_type = mime_type_for(&file_name);
        Ok(Self::new(file_name, mime_type, bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

fn mime_type_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "pdf" => "application/pdf",
        "txt" | "md" => "text/plain",
        "csv" => "text/csv",
        "json" => "application/json",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "zip" => "application/zip",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

/// The REST operations every resource supports.
///
/// Request bodies are passed as JSON values so that retries can resend
/// them without re-serializing.
#[async_trait]
pub trait Backend: Send + Sync + 'static {
    async fn list<T: Record>(&self, resource: &ResourceDescriptor, params: &ListParams) -> Result<Page<T>>;

    async fn get<T: Record>(&self, resource: &ResourceDescriptor, id: &str) -> Result<T>;

    async fn create<T: Record>(&self, resource: &ResourceDescriptor, body: &Value) -> Result<T>;

    async fn update<T: Record>(&self, resource: &ResourceDescriptor, id: &str, body: &Value) -> Result<T>;

    async fn transition<T: Record>(
        &self,
        resource: &ResourceDescriptor,
        id: &str,
        transition: Transition,
    ) -> Result<T>;

    async fn delete(&self, resource: &ResourceDescriptor, id: &str) -> Result<()>;

    async fn attach_file<T: Record>(
        &self,
        resource: &ResourceDescriptor,
        id: &str,
        upload: &FileUpload,
    ) -> Result<T>;

    async fn detach_file<T: Record>(&self, resource: &ResourceDescriptor, id: &str, file_id: &str) -> Result<T>;
}

/// The backend chosen at startup.
#[derive(Debug, Clone)]
pub enum AnyBackend {
    Http(HttpBackend),
    Mock(MockBackend),
}

impl AnyBackend {
    /// Fixtures in development mode or without a token, HTTP otherwise.
    pub fn from_config(config: &Config) -> Self {
        if config.use_mock_backend() {
            tracing::info!(mode = %config.mode, authenticated = config.token.is_some(), "Using mock backend");
            AnyBackend::Mock(MockBackend::new())
        } else {
            tracing::info!(base_url = %config.base_url, "Using HTTP backend");
            AnyBackend::Http(HttpBackend::from_config(config))
        }
    }

    pub fn is_mock(&self) -> bool {
        matches!(self, AnyBackend::Mock(_))
    }
}

#[async_trait]
impl Backend for AnyBackend {
    async fn list<T: Record>(&self, resource: &ResourceDescriptor, params: &ListParams) -> Result<Page<T>> {
        match self {
            AnyBackend::Http(backend) => backend.list(resource, params).await,
            AnyBackend::Mock(backend) => backend.list(resource, params).await,
        }
    }

    async fn get<T: Record>(&self, resource: &ResourceDescriptor, id: &str) -> Result<T> {
        match self {
            AnyBackend::Http(backend) => backend.get(resource, id).await,
            AnyBackend::Mock(backend) => backend.get(resource, id).await,
        }
    }

    async fn create<T: Record>(&self, resource: &ResourceDescriptor, body: &Value) -> Result<T> {
        match self {
            AnyBackend::Http(backend) => backend.create(resource, body).await,
            AnyBackend::Mock(backend) => backend.create(resource, body).await,
        }
    }

    async fn update<T: Record>(&self, resource: &ResourceDescriptor, id: &str, body: &Value) -> Result<T> {
        match self {
            AnyBackend::Http(backend) => backend.update(resource, id, body).await,
            AnyBackend::Mock(backend) => backend.update(resource, id, body).await,
        }
    }

    async fn transition<T: Record>(
        &self,
        resource: &ResourceDescriptor,
        id: &str,
        transition: Transition,
    ) -> Result<T> {
        match self {
            AnyBackend::Http(backend) => backend.transition(resource, id, transition).await,
            AnyBackend::Mock(backend) => backend.transition(resource, id, transition).await,
        }
    }

    async fn delete(&self, resource: &ResourceDescriptor, id: &str) -> Result<()> {
        match self {
            AnyBackend::Http(backend) => backend.delete(resource, id).await,
            AnyBackend::Mock(backend) => backend.delete(resource, id).await,
        }
    }

    async fn attach_file<T: Record>(
        &self,
        resource: &ResourceDescriptor,
        id: &str,
        upload: &FileUpload,
    ) -> Result<T> {
        match self {
            AnyBackend::Http(backend) => backend.attach_file(resource, id, upload).await,
            AnyBackend::Mock(backend) => backend.attach_file(resource, id, upload).await,
        }
    }

    async fn detach_file<T: Record>(&self, resource: &ResourceDescriptor, id: &str, file_id: &str) -> Result<T> {
        match self {
            AnyBackend::Http(backend) => backend.detach_file(resource, id, file_id).await,
            AnyBackend::Mock(backend) => backend.detach_file(resource, id, file_id).await,
        }
    }
}
