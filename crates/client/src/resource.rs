//! The per-resource query/mutation façade.
//!
//! One generic [`Resource`] replaces a hand-written set of list/detail reads
//! and create/update/delete writes per resource: the [`ResourceDescriptor`]
//! supplies the endpoint, the key namespace and the related resources whose
//! lists a write makes stale.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;

use campusync_core::query::{
    decode, detail_key, list_key, KeyFilter, ListParams, QueryError, QueryKey, Result,
};
use campusync_core::resources::{
    Assignment, Course, Enrollment, Event, Page, Record, ResourceDescriptor, Transition, User,
    ASSIGNMENTS, COURSES, ENROLLMENTS, EVENTS, USERS,
};

use crate::backend::{AnyBackend, Backend, FileUpload};
use crate::config::Config;
use crate::mutation::{InvalidationPlan, MutationSpec};
use crate::query::{QueryClient, QueryOptions, QueryState};

/// Cached reads and invalidating writes for one REST resource.
pub struct Resource<T, B> {
    descriptor: ResourceDescriptor,
    backend: Arc<B>,
    client: QueryClient,
    _record: PhantomData<fn() -> T>,
}

impl<T, B> Clone for Resource<T, B> {
    fn clone(&self) -> Self {
        Self {
            descriptor: self.descriptor,
            backend: Arc::clone(&self.backend),
            client: self.client.clone(),
            _record: PhantomData,
        }
    }
}

impl<T: Record, B: Backend> Resource<T, B> {
    pub fn new(descriptor: ResourceDescriptor, backend: Arc<B>, client: QueryClient) -> Self {
        Self {
            descriptor,
            backend,
            client,
            _record: PhantomData,
        }
    }

    pub fn descriptor(&self) -> &ResourceDescriptor {
        &self.descriptor
    }

    pub fn client(&self) -> &QueryClient {
        &self.client
    }

    pub fn list_key(&self, params: &ListParams) -> QueryKey {
        list_key(self.descriptor.name, params)
    }

    pub fn detail_key(&self, id: &str) -> QueryKey {
        detail_key(self.descriptor.name, id)
    }

    /// Reads one page with the client's list timing.
    pub async fn list(&self, params: &ListParams) -> Result<QueryState<Page<T>>> {
        let options = QueryOptions::new(self.client.list_timing());
        self.list_with(params, options).await
    }

    pub async fn list_with(&self, params: &ListParams, options: QueryOptions) -> Result<QueryState<Page<T>>> {
        let backend = Arc::clone(&self.backend);
        let descriptor = self.descriptor;
        let request = params.clone();
        self.client
            .fetch_query(self.list_key(params), options, move || {
                let backend = Arc::clone(&backend);
                let params = request.clone();
                async move { backend.list::<T>(&descriptor, &params).await }
            })
            .await
    }

    /// Reads one record with the client's detail timing. An empty id
    /// disables the read.
    pub async fn get(&self, id: &str) -> Result<QueryState<T>> {
        let options = QueryOptions::new(self.client.detail_timing()).enabled(!id.trim().is_empty());
        self.get_with(id, options).await
    }

    pub async fn get_with(&self, id: &str, options: QueryOptions) -> Result<QueryState<T>> {
        let backend = Arc::clone(&self.backend);
        let descriptor = self.descriptor;
        let record_id = id.to_string();
        self.client
            .fetch_query(self.detail_key(id), options, move || {
                let backend = Arc::clone(&backend);
                let id = record_id.clone();
                async move { backend.get::<T>(&descriptor, &id).await }
            })
            .await
    }

    pub async fn create<R: Serialize + ?Sized>(&self, request: &R) -> Result<T> {
        let body = to_body(request)?;
        let spec = self.record_spec("create", "created", self.write_plan(None));
        self.client
            .mutate(spec, || self.backend.create::<T>(&self.descriptor, &body))
            .await
    }

    pub async fn update<R: Serialize + ?Sized>(&self, id: &str, request: &R) -> Result<T> {
        let body = to_body(request)?;
        let spec = self.record_spec("update", "updated", self.write_plan(Some(id)));
        self.client
            .mutate(spec, || self.backend.update::<T>(&self.descriptor, id, &body))
            .await
    }

    /// Deletes a record and drops its detail slot.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let mut plan = self
            .write_plan(None)
            .remove(KeyFilter::detail(self.descriptor.name, id));
        for filter in self.referenced_details(id).await {
            plan = plan.invalidate(filter);
        }
        let spec = MutationSpec::new(
            format!("{}.delete", self.descriptor.name),
            format!("{} deleted", self.descriptor.label),
        )
        .with_plan(plan);
        self.client
            .mutate(spec, || self.backend.delete(&self.descriptor, id))
            .await
    }

    /// Marks every cached read of this resource stale.
    pub async fn invalidate(&self) -> usize {
        self.client
            .invalidate(&KeyFilter::resource(self.descriptor.name))
            .await
    }

    /// Lists of this resource and of its related resources, plus the
    /// record's detail slot when there is one.
    fn write_plan(&self, id: Option<&str>) -> InvalidationPlan {
        let mut plan = InvalidationPlan::new().invalidate(KeyFilter::lists(self.descriptor.name));
        if let Some(id) = id {
            plan = plan.invalidate(KeyFilter::detail(self.descriptor.name, id));
        }
        for related in self.descriptor.related {
            plan = plan.invalidate(KeyFilter::lists(related));
        }
        plan
    }

    /// Detail slots the record `id` references, read from its cached copy.
    /// Without one, every detail slot of the related resources.
    async fn referenced_details(&self, id: &str) -> Vec<KeyFilter> {
        let cached = self
            .client
            .store()
            .get(&self.detail_key(id))
            .await
            .and_then(|entry| decode::<T>(entry.data.as_slice()).ok());
        match cached {
            Some(record) => references_of(&record),
            None => self
                .descriptor
                .related
                .iter()
                .map(|related| KeyFilter::details(related))
                .collect(),
        }
    }

    /// A spec that seeds the returned record's detail slot and invalidates
    /// the records it references.
    fn record_spec(&self, action: &str, past_tense: &str, plan: InvalidationPlan) -> MutationSpec<T> {
        let name = self.descriptor.name;
        MutationSpec::new(
            format!("{}.{}", name, action),
            format!("{} {}", self.descriptor.label, past_tense),
        )
        .with_plan(plan)
        .seed_with(self.client.detail_timing(), move |record: &T| {
            detail_key(name, record.id())
        })
        .invalidate_with(references_of::<T>)
    }
}

/// Workflow transitions and file attachments exist on assignments only.
impl<B: Backend> Resource<Assignment, B> {
    pub async fn transition(&self, id: &str, transition: Transition) -> Result<Assignment> {
        let spec = self.record_spec(
            transition.action(),
            transition.past_tense(),
            self.write_plan(Some(id)),
        );
        self.client
            .mutate(spec, || {
                self.backend
                    .transition::<Assignment>(&self.descriptor, id, transition)
            })
            .await
    }

    pub async fn attach_file(&self, id: &str, upload: FileUpload) -> Result<Assignment> {
        let spec = self.record_spec("attach-file", "file uploaded", self.write_plan(Some(id)));
        self.client
            .mutate(spec, || {
                self.backend
                    .attach_file::<Assignment>(&self.descriptor, id, &upload)
            })
            .await
    }

    pub async fn detach_file(&self, id: &str, file_id: &str) -> Result<Assignment> {
        let spec = self.record_spec("detach-file", "file removed", self.write_plan(Some(id)));
        self.client
            .mutate(spec, || {
                self.backend
                    .detach_file::<Assignment>(&self.descriptor, id, file_id)
            })
            .await
    }
}

/// Detail slots of the records `record` references.
fn references_of<T: Record>(record: &T) -> Vec<KeyFilter> {
    record
        .references()
        .into_iter()
        .map(|(resource, id)| KeyFilter::detail(resource, id))
        .collect()
}

fn to_body<R: Serialize + ?Sized>(request: &R) -> Result<serde_json::Value> {
    serde_json::to_value(request).map_err(|e| QueryError::Decode(e.to_string()))
}

/// The five campus resources over one client and one backend.
pub struct Campus<B> {
    client: QueryClient,
    backend: Arc<B>,
}

impl<B: Backend> Campus<B> {
    pub fn new(client: QueryClient, backend: B) -> Self {
        Self {
            client,
            backend: Arc::new(backend),
        }
    }

    pub fn client(&self) -> &QueryClient {
        &self.client
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn resource<T: Record>(&self, descriptor: ResourceDescriptor) -> Resource<T, B> {
        Resource::new(descriptor, Arc::clone(&self.backend), self.client.clone())
    }

    pub fn users(&self) -> Resource<User, B> {
        self.resource(USERS)
    }

    pub fn courses(&self) -> Resource<Course, B> {
        self.resource(COURSES)
    }

    pub fn assignments(&self) -> Resource<Assignment, B> {
        self.resource(ASSIGNMENTS)
    }

    pub fn events(&self) -> Resource<Event, B> {
        self.resource(EVENTS)
    }

    pub fn enrollments(&self) -> Resource<Enrollment, B> {
        self.resource(ENROLLMENTS)
    }
}

impl Campus<AnyBackend> {
    /// Builds the client and backend `config` describes and starts the
    /// periodic garbage collector. Must be called inside a tokio runtime.
    pub fn from_config(config: &Config) -> Self {
        let campus = Self::new(QueryClient::from_config(config), AnyBackend::from_config(config));
        campus.client.spawn_garbage_collector(config.gc_interval());
        campus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use campusync_core::resources::{
        AssignmentFilters, AssignmentStatus, CreateAssignmentRequest, CreateEnrollmentRequest,
        UpdateCourseRequest,
    };

    use crate::backend::MockBackend;
    use crate::config::Mode;
    use crate::notify::{MemorySink, Notification};
    use crate::store::{Lookup, QueryStore};

    fn campus() -> (Campus<MockBackend>, MemorySink) {
        let sink = MemorySink::new();
        let client = QueryClient::new(QueryStore::new(100)).with_sink(Arc::new(sink.clone()));
        (Campus::new(client, MockBackend::new()), sink)
    }

    #[tokio::test(start_paused = true)]
    async fn test_list_is_cached_within_freshness_window() {
        let (campus, _) = campus();
        let params = ListParams::new(1, 5).with_filters(&AssignmentFilters {
            status: Some("published".to_string()),
            ..Default::default()
        });

        let first = campus.assignments().list(&params).await.unwrap();
        tokio::time::advance(Duration::from_secs(60)).await;
        let second = campus.assignments().list(&params).await.unwrap();

        assert!(matches!(first, QueryState::Fetched(_)));
        assert!(second.is_cached());
        assert_eq!(first.into_data(), second.into_data());
    }

    #[tokio::test(start_paused = true)]
    async fn test_distinct_params_are_distinct_entries() {
        let (campus, _) = campus();
        let courses = campus.courses();

        courses.list(&ListParams::new(1, 5)).await.unwrap();
        let second_page = courses.list(&ListParams::new(2, 5)).await.unwrap();

        assert!(matches!(second_page, QueryState::Fetched(_)));
        assert_eq!(campus.client().store().len().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_with_empty_id_is_idle() {
        let (campus, _) = campus();
        assert_eq!(campus.courses().get("").await.unwrap(), QueryState::Idle);
        assert!(campus.client().store().is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_unknown_record_is_not_found() {
        let (campus, _) = campus();
        let result = campus.users().get("user-999").await;
        assert!(matches!(result, Err(QueryError::NotFound { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_invalidates_lists_and_seeds_detail() {
        let (campus, sink) = campus();
        let assignments = campus.assignments();
        let params = ListParams::default();
        assignments.list(&params).await.unwrap();

        let created = assignments
            .create(&CreateAssignmentRequest {
                course_id: "course-001".to_string(),
                title: "Problem Set 9".to_string(),
                description: None,
                due_date: None,
                total_points: 40,
                difficulty: None,
                tags: vec!["week-9".to_string()],
            })
            .await
            .unwrap();

        assert!(matches!(
            campus.client().store().lookup(&assignments.list_key(&params)).await,
            Lookup::Stale(_)
        ));
        let detail = assignments.get(&created.id).await.unwrap();
        assert_eq!(detail, QueryState::Cached(created));
        assert_eq!(sink.snapshot(), vec![Notification::success("Assignment created")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_invalidates_related_lists() {
        let (campus, _) = campus();
        let params = ListParams::default();
        campus.courses().list(&params).await.unwrap();
        campus.users().list(&params).await.unwrap();

        campus
            .enrollments()
            .create(&CreateEnrollmentRequest {
                course_id: "course-001".to_string(),
                student_id: "user-010".to_string(),
                status: None,
            })
            .await
            .unwrap();

        let store = campus.client().store();
        assert!(matches!(
            store.lookup(&campus.courses().list_key(&params)).await,
            Lookup::Stale(_)
        ));
        assert!(matches!(
            store.lookup(&campus.users().list_key(&params)).await,
            Lookup::Fresh(_)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_enrollment_write_invalidates_its_course_detail() {
        let (campus, _) = campus();
        let courses = campus.courses();
        courses.get("course-001").await.unwrap();
        courses.get("course-002").await.unwrap();

        campus
            .enrollments()
            .create(&CreateEnrollmentRequest {
                course_id: "course-001".to_string(),
                student_id: "user-010".to_string(),
                status: None,
            })
            .await
            .unwrap();

        let store = campus.client().store();
        assert!(matches!(
            store.lookup(&courses.detail_key("course-001")).await,
            Lookup::Stale(_)
        ));
        assert!(matches!(
            store.lookup(&courses.detail_key("course-002")).await,
            Lookup::Fresh(_)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_enrollment_delete_invalidates_referenced_course() {
        let (campus, _) = campus();
        let courses = campus.courses();
        let enrollments = campus.enrollments();
        enrollments.get("enrollment-002").await.unwrap();
        courses.get("course-001").await.unwrap();
        courses.get("course-002").await.unwrap();

        enrollments.delete("enrollment-002").await.unwrap();

        let store = campus.client().store();
        assert!(matches!(
            store.lookup(&courses.detail_key("course-002")).await,
            Lookup::Stale(_)
        ));
        assert!(matches!(
            store.lookup(&courses.detail_key("course-001")).await,
            Lookup::Fresh(_)
        ));

        // Uncached record: every course detail may be affected.
        enrollments.delete("enrollment-003").await.unwrap();
        assert!(matches!(
            store.lookup(&courses.detail_key("course-001")).await,
            Lookup::Stale(_)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_campus_from_config_collects_garbage() {
        let config = Config {
            base_url: "http://localhost:5000/api".to_string(),
            token: None,
            mode: Mode::Development,
            list_stale_seconds: 1,
            list_gc_seconds: 2,
            detail_stale_seconds: 1,
            detail_gc_seconds: 2,
            cache_max_entries: 100,
            gc_interval_seconds: 5,
        };
        let campus = Campus::from_config(&config);
        assert!(campus.backend().is_mock());

        campus.users().list(&ListParams::default()).await.unwrap();
        assert_eq!(campus.client().store().len().await, 1);

        tokio::time::sleep(Duration::from_secs(11)).await;
        assert!(campus.client().store().is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_refreshes_detail_slot() {
        let (campus, _) = campus();
        let courses = campus.courses();
        courses.get("course-001").await.unwrap();

        let updated = courses
            .update(
                "course-001",
                &UpdateCourseRequest {
                    title: Some("Renamed".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "Renamed");
        let cached = courses.get("course-001").await.unwrap();
        assert!(cached.is_cached());
        assert_eq!(cached.into_data().map(|c| c.title), Some("Renamed".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transition_publishes() {
        let (campus, sink) = campus();
        let published = campus
            .assignments()
            .transition("assignment-002", Transition::Publish)
            .await
            .unwrap();

        assert_eq!(published.status, AssignmentStatus::Published);
        assert_eq!(sink.snapshot(), vec![Notification::success("Assignment published")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_removes_detail_slot() {
        let (campus, sink) = campus();
        let events = campus.events();
        events.get("event-001").await.unwrap();

        events.delete("event-001").await.unwrap();

        assert!(campus
            .client()
            .store()
            .get(&events.detail_key("event-001"))
            .await
            .is_none());
        assert_eq!(sink.snapshot(), vec![Notification::success("Event deleted")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_delete_keeps_cache_and_notifies() {
        let (campus, sink) = campus();
        let events = campus.events();
        let params = ListParams::default();
        events.list(&params).await.unwrap();

        let result = events.delete("event-999").await;

        assert!(result.is_err());
        assert!(matches!(
            campus.client().store().lookup(&events.list_key(&params)).await,
            Lookup::Fresh(_)
        ));
        assert_eq!(sink.snapshot(), vec![Notification::error("Event not found")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_attach_file_seeds_detail() {
        let (campus, _) = campus();
        let assignments = campus.assignments();
        let upload = FileUpload::new("brief.pdf", "application/pdf", vec![0; 16]);

        let updated = assignments
            .attach_file("assignment-001", upload)
            .await
            .unwrap();

        let cached = assignments.get("assignment-001").await.unwrap();
        assert_eq!(cached, QueryState::Cached(updated));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_marks_every_key_of_resource() {
        let (campus, _) = campus();
        let users = campus.users();
        users.list(&ListParams::default()).await.unwrap();
        users.get("user-001").await.unwrap();
        campus.courses().get("course-001").await.unwrap();

        assert_eq!(users.invalidate().await, 2);
    }
}
