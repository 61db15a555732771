//! Fixture backend used in development mode.
//!
//! Reads are answered from deterministic fixtures with the same search,
//! filter and pagination semantics as the real API. Writes return the record
//! the API would return, but nothing is persisted.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use campusync_core::query::{ListParams, QueryError, Result};
use campusync_core::resources::{
    apply_transition, filter_records, generate_seed_records, merge_fields, synthesize_record,
    Page, Record, ResourceDescriptor, Transition, ASSIGNMENTS, COURSES, ENROLLMENTS, EVENTS, USERS,
};

use super::{Backend, FileUpload};

#[derive(Debug, Clone)]
pub struct MockBackend {
    fixtures: Arc<HashMap<&'static str, Vec<Value>>>,
    latency: Duration,
}

impl MockBackend {
    /// Creates a backend seeded with the standard fixtures.
    pub fn new() -> Self {
        let fixtures = [USERS, COURSES, ASSIGNMENTS, EVENTS, ENROLLMENTS]
            .iter()
            .map(|resource| (resource.name, generate_seed_records(resource.name)))
            .collect();
        Self {
            fixtures: Arc::new(fixtures),
            latency: Duration::ZERO,
        }
    }

    /// Replaces the fixtures of one resource.
    pub fn with_records(mut self, resource: &ResourceDescriptor, records: Vec<Value>) -> Self {
        Arc::make_mut(&mut self.fixtures).insert(resource.name, records);
        self
    }

    /// Delays every call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn records(&self, resource: &ResourceDescriptor) -> &[Value] {
        self.fixtures
            .get(resource.name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn find(&self, resource: &ResourceDescriptor, id: &str) -> Result<&Value> {
        self.records(resource)
            .iter()
            .find(|record| record.get("id").and_then(Value::as_str) == Some(id))
            .ok_or_else(|| QueryError::NotFound {
                message: format!("{} not found", resource.label),
            })
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_record<T: Record>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| QueryError::Decode(e.to_string()))
}

fn touch(record: &Value) -> Value {
    merge_fields(record, &json!({ "updatedAt": Utc::now().to_rfc3339() }))
}

#[async_trait]
impl Backend for MockBackend {
    async fn list<T: Record>(&self, resource: &ResourceDescriptor, params: &ListParams) -> Result<Page<T>> {
        self.simulate_latency().await;
        let page = filter_records(self.records(resource), params, resource.search_fields);
        let items = page
            .items
            .into_iter()
            .map(decode_record)
            .collect::<Result<Vec<T>>>()?;
        tracing::debug!(resource = resource.name, count = items.len(), "Served mock list");
        Ok(Page {
            items,
            pagination: page.pagination,
        })
    }

    async fn get<T: Record>(&self, resource: &ResourceDescriptor, id: &str) -> Result<T> {
        self.simulate_latency().await;
        decode_record(self.find(resource, id)?.clone())
    }

    async fn create<T: Record>(&self, resource: &ResourceDescriptor, body: &Value) -> Result<T> {
        self.simulate_latency().await;
        let id = Uuid::new_v4().to_string();
        tracing::debug!(resource = resource.name, id = %id, "Synthesized mock record");
        decode_record(synthesize_record(body, &id, Utc::now()))
    }

    async fn update<T: Record>(&self, resource: &ResourceDescriptor, id: &str, body: &Value) -> Result<T> {
        self.simulate_latency().await;
        let record = self.find(resource, id)?;
        decode_record(touch(&merge_fields(record, body)))
    }

    async fn transition<T: Record>(
        &self,
        resource: &ResourceDescriptor,
        id: &str,
        transition: Transition,
    ) -> Result<T> {
        self.simulate_latency().await;
        if !resource.supports(transition) {
            return Err(QueryError::Rejected {
                status: 400,
                message: format!("{} cannot be {}", resource.label, transition.past_tense()),
            });
        }
        let record = self.find(resource, id)?;
        decode_record(apply_transition(record, transition, Utc::now()))
    }

    async fn delete(&self, resource: &ResourceDescriptor, id: &str) -> Result<()> {
        self.simulate_latency().await;
        self.find(resource, id).map(|_| ())
    }

    async fn attach_file<T: Record>(
        &self,
        resource: &ResourceDescriptor,
        id: &str,
        upload: &FileUpload,
    ) -> Result<T> {
        self.simulate_latency().await;
        let record = self.find(resource, id)?;
        let mut attachments = record
            .get("attachments")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let file_id = Uuid::new_v4().to_string();
        attachments.push(json!({
            "id": file_id,
            "fileName": upload.file_name,
            "mimeType": upload.mime_type,
            "size": upload.size(),
            "url": format!("/uploads/{}/{}", file_id, upload.file_name),
        }));
        decode_record(touch(&merge_fields(record, &json!({ "attachments": attachments }))))
    }

    async fn detach_file<T: Record>(&self, resource: &ResourceDescriptor, id: &str, file_id: &str) -> Result<T> {
        self.simulate_latency().await;
        let record = self.find(resource, id)?;
        let attachments = record
            .get("attachments")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let remaining: Vec<Value> = attachments
            .iter()
            .filter(|file| file.get("id").and_then(Value::as_str) != Some(file_id))
            .cloned()
            .collect();
        if remaining.len() == attachments.len() {
            return Err(QueryError::NotFound {
                message: "File not found".to_string(),
            });
        }
        decode_record(touch(&merge_fields(record, &json!({ "attachments": remaining }))))
    }
}
