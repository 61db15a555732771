mod descriptor;
mod envelope;
mod filters;
mod mock_data;
mod operations;
mod requests;
mod types;

pub use descriptor::{
    path_segment, ResourceDescriptor, Transition, ASSIGNMENTS, COURSES, ENROLLMENTS, EVENTS, USERS,
};
pub use envelope::{into_page, into_record, ApiResponse, ListData, Page, Pagination};
pub use filters::{AssignmentFilters, CourseFilters, EnrollmentFilters, EventFilters, UserFilters};
pub use mock_data::{generate_seed_records, seed_assignments, seed_courses, seed_events, seed_enrollments, seed_users};
pub use operations::{apply_transition, filter_records, merge_fields, paginate, synthesize_record};
pub use requests::{
    CreateAssignmentRequest, CreateCourseRequest, CreateEnrollmentRequest, CreateEventRequest,
    CreateUserRequest, UpdateAssignmentRequest, UpdateCourseRequest, UpdateEventRequest,
    UpdateUserRequest,
};
pub use types::{
    Assignment, AssignmentStatus, Attachment, Course, CourseStatus, Difficulty, Enrollment,
    EnrollmentStatus, Event, EventType, Record, Role, User, UserStatus,
};
