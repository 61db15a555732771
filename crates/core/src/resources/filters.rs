//! Typed filter sets, one per resource.
//!
//! Field names on the wire are camelCase. Absent fields are omitted.

use crate::query::{FilterSet, Filters};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentFilters {
    pub status: Option<String>,
    pub difficulty: Option<String>,
    pub course_id: Option<String>,
    /// Lower bound for the due date (ISO-8601).
    pub due_date_from: Option<String>,
    /// Upper bound for the due date (ISO-8601).
    pub due_date_to: Option<String>,
    /// Any of these tags.
    pub tags: Vec<String>,
}

impl FilterSet for AssignmentFilters {
    fn to_filters(&self) -> Filters {
        let tags = (!self.tags.is_empty()).then(|| self.tags.join(","));
        Filters::new()
            .with_opt("status", self.status.as_deref())
            .with_opt("difficulty", self.difficulty.as_deref())
            .with_opt("courseId", self.course_id.as_deref())
            .with_opt("dueDateFrom", self.due_date_from.as_deref())
            .with_opt("dueDateTo", self.due_date_to.as_deref())
            .with_opt("tags", tags.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseFilters {
    pub status: Option<String>,
    pub department: Option<String>,
    pub semester: Option<String>,
    pub instructor_id: Option<String>,
}

impl FilterSet for CourseFilters {
    fn to_filters(&self) -> Filters {
        Filters::new()
            .with_opt("status", self.status.as_deref())
            .with_opt("department", self.department.as_deref())
            .with_opt("semester", self.semester.as_deref())
            .with_opt("instructorId", self.instructor_id.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilters {
    pub role: Option<String>,
    pub status: Option<String>,
    pub department: Option<String>,
}

impl FilterSet for UserFilters {
    fn to_filters(&self) -> Filters {
        Filters::new()
            .with_opt("role", self.role.as_deref())
            .with_opt("status", self.status.as_deref())
            .with_opt("department", self.department.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilters {
    pub event_type: Option<String>,
    pub course_id: Option<String>,
    pub start_date_from: Option<String>,
    pub start_date_to: Option<String>,
}

impl FilterSet for EventFilters {
    fn to_filters(&self) -> Filters {
        Filters::new()
            .with_opt("eventType", self.event_type.as_deref())
            .with_opt("courseId", self.course_id.as_deref())
            .with_opt("startDateFrom", self.start_date_from.as_deref())
            .with_opt("startDateTo", self.start_date_to.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrollmentFilters {
    pub course_id: Option<String>,
    pub student_id: Option<String>,
    pub status: Option<String>,
}

impl FilterSet for EnrollmentFilters {
    fn to_filters(&self) -> Filters {
        Filters::new()
            .with_opt("courseId", self.course_id.as_deref())
            .with_opt("studentId", self.student_id.as_deref())
            .with_opt("status", self.status.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{list_key, ListParams};

    #[test]
    fn test_assignment_filters_omit_absent_fields() {
        let filters = AssignmentFilters {
            status: Some("published".to_string()),
            ..Default::default()
        }
        .to_filters();

        assert_eq!(filters.len(), 1);
        assert_eq!(filters.get("status"), Some("published"));
    }

    #[test]
    fn test_assignment_tags_joined() {
        let filters = AssignmentFilters {
            tags: vec!["exam".to_string(), "week-3".to_string()],
            ..Default::default()
        }
        .to_filters();
        assert_eq!(filters.get("tags"), Some("exam,week-3"));
    }

    #[test]
    fn test_empty_filter_set_matches_no_filters() {
        let typed = ListParams::default().with_filters(&CourseFilters::default());
        assert_eq!(
            list_key("courses", &typed),
            list_key("courses", &ListParams::default())
        );
    }

    #[test]
    fn test_camel_case_names() {
        let filters = EventFilters {
            event_type: Some("exam".to_string()),
            start_date_from: Some("2024-09-01".to_string()),
            ..Default::default()
        }
        .to_filters();
        let names: Vec<&str> = filters.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["eventType", "startDateFrom"]);
    }

    #[test]
    fn test_user_and_enrollment_filters() {
        let users = UserFilters {
            role: Some("student".to_string()),
            ..Default::default()
        }
        .to_filters();
        assert_eq!(users.get("role"), Some("student"));

        let enrollments = EnrollmentFilters {
            course_id: Some("c1".to_string()),
            student_id: Some("u1".to_string()),
            status: None,
        }
        .to_filters();
        assert_eq!(enrollments.len(), 2);
    }
}
