//! Fixture data for the development fallback.
//!
//! Pure, deterministic generators: the same call always yields the same
//! records, so tests and the mock backend can rely on ids and counts.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::Value;

use super::descriptor::{ASSIGNMENTS, COURSES, ENROLLMENTS, EVENTS, USERS};
use super::types::{
    Assignment, AssignmentStatus, Course, CourseStatus, Difficulty, Enrollment, EnrollmentStatus,
    Event, EventType, Role, User, UserStatus,
};

/// 2024-09-02T00:00:00Z, the first day of the fixture semester.
const SEMESTER_START: i64 = 1_725_235_200;

fn at(days: i64, hours: i64) -> DateTime<Utc> {
    let start = DateTime::from_timestamp(SEMESTER_START, 0).unwrap_or_default();
    start + Duration::days(days) + Duration::hours(hours)
}

const FIRST_NAMES: [&str; 8] = [
    "Ada", "Alan", "Grace", "Edsger", "Barbara", "Donald", "Frances", "Ken",
];

const LAST_NAMES: [&str; 8] = [
    "Lovelace", "Turing", "Hopper", "Dijkstra", "Liskov", "Knuth", "Allen", "Thompson",
];

const DEPARTMENTS: [&str; 3] = ["Computer Science", "Mathematics", "Physics"];

/// Generates 24 users: 2 admins, 6 faculty and 16 students.
pub fn seed_users() -> Vec<User> {
    (0..24)
        .map(|i| {
            let role = match i {
                0..=1 => Role::Admin,
                2..=7 => Role::Faculty,
                _ => Role::Student,
            };
            let first_name = FIRST_NAMES[i % FIRST_NAMES.len()];
            let last_name = LAST_NAMES[(i / 3) % LAST_NAMES.len()];
            User {
                id: format!("user-{:03}", i + 1),
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                email: format!(
                    "{}.{}{}@campus.edu",
                    first_name.to_lowercase(),
                    last_name.to_lowercase(),
                    i + 1
                ),
                role,
                status: if i % 11 == 10 {
                    UserStatus::Inactive
                } else {
                    UserStatus::Active
                },
                department: Some(DEPARTMENTS[i % DEPARTMENTS.len()].to_string()),
                student_id: (role == Role::Student).then(|| format!("S{:05}", 24_000 + i)),
                created_at: Some(at(-30 + i as i64, 9)),
                updated_at: Some(at(-30 + i as i64, 9)),
            }
        })
        .collect()
}

const COURSE_CATALOG: [(&str, &str, usize); 8] = [
    ("CS101", "Introduction to Programming", 0),
    ("CS201", "Data Structures", 0),
    ("CS310", "Operating Systems", 0),
    ("CS350", "Compilers", 0),
    ("MATH110", "Calculus I", 1),
    ("MATH220", "Linear Algebra", 1),
    ("PHYS101", "Mechanics", 2),
    ("PHYS210", "Electromagnetism", 2),
];

/// Generates the 8-course fixture catalog, taught by the faculty users.
pub fn seed_courses() -> Vec<Course> {
    COURSE_CATALOG
        .iter()
        .enumerate()
        .map(|(i, (code, title, department))| Course {
            id: format!("course-{:03}", i + 1),
            code: code.to_string(),
            title: title.to_string(),
            description: Some(format!("{} ({})", title, DEPARTMENTS[*department])),
            department: Some(DEPARTMENTS[*department].to_string()),
            credits: 3 + (i as u32 % 2),
            instructor_id: Some(format!("user-{:03}", 3 + i % 6)),
            semester: Some("Fall 2024".to_string()),
            status: match i {
                7 => CourseStatus::Draft,
                6 => CourseStatus::Archived,
                _ => CourseStatus::Published,
            },
            capacity: Some(30),
            enrolled_count: 10 + i as u32,
            created_at: Some(at(-60, 8)),
            updated_at: Some(at(-10 + i as i64, 8)),
        })
        .collect()
}

const ASSIGNMENT_TITLES: [&str; 6] = [
    "Problem Set",
    "Lab Report",
    "Reading Response",
    "Project Milestone",
    "Quiz",
    "Midterm Review",
];

/// Generates 30 assignments spread over the fixture courses.
pub fn seed_assignments() -> Vec<Assignment> {
    (0..30)
        .map(|i| {
            let course = i % COURSE_CATALOG.len();
            let difficulty = match i % 3 {
                0 => Difficulty::Easy,
                1 => Difficulty::Medium,
                _ => Difficulty::Hard,
            };
            let status = match i % 5 {
                0 => AssignmentStatus::Draft,
                4 => AssignmentStatus::Closed,
                _ => AssignmentStatus::Published,
            };
            let mut tags = vec![format!("week-{}", i / 2 + 1)];
            if i % 6 == 5 {
                tags.push("exam".to_string());
            }
            Assignment {
                id: format!("assignment-{:03}", i + 1),
                course_id: format!("course-{:03}", course + 1),
                title: format!(
                    "{} {} {}",
                    COURSE_CATALOG[course].0,
                    ASSIGNMENT_TITLES[i % ASSIGNMENT_TITLES.len()],
                    i / COURSE_CATALOG.len() + 1
                ),
                description: Some(format!(
                    "{} for {}",
                    ASSIGNMENT_TITLES[i % ASSIGNMENT_TITLES.len()],
                    COURSE_CATALOG[course].1
                )),
                due_date: Some(at(7 + 3 * i as i64, 23)),
                total_points: 10 * (1 + i as u32 % 10),
                difficulty: Some(difficulty),
                status,
                allow_submissions: status == AssignmentStatus::Published,
                tags,
                attachments: Vec::new(),
                created_at: Some(at(i as i64, 10)),
                updated_at: Some(at(i as i64, 10)),
            }
        })
        .collect()
}

const EVENT_CALENDAR: [(&str, EventType, i64); 12] = [
    ("Orientation Day", EventType::Other, 0),
    ("Labor Day", EventType::Holiday, 0),
    ("CS101 Lecture", EventType::Lecture, 1),
    ("Faculty Meeting", EventType::Meeting, 3),
    ("Add/Drop Deadline", EventType::Deadline, 14),
    ("MATH110 Quiz", EventType::Exam, 17),
    ("Career Fair", EventType::Other, 24),
    ("Department Meeting", EventType::Meeting, 31),
    ("Midterm Exams", EventType::Exam, 49),
    ("Fall Break", EventType::Holiday, 56),
    ("Withdrawal Deadline", EventType::Deadline, 70),
    ("Final Exams", EventType::Exam, 98),
];

/// Generates the 12-event fixture academic calendar.
pub fn seed_events() -> Vec<Event> {
    EVENT_CALENDAR
        .iter()
        .enumerate()
        .map(|(i, (title, event_type, day))| {
            let all_day = matches!(event_type, EventType::Holiday | EventType::Deadline);
            Event {
                id: format!("event-{:03}", i + 1),
                title: title.to_string(),
                description: None,
                event_type: *event_type,
                start_date: at(*day, if all_day { 0 } else { 10 }),
                end_date: (!all_day).then(|| at(*day, 12)),
                all_day,
                location: (!all_day).then(|| format!("Hall {}", (i % 4) + 1)),
                course_id: title
                    .starts_with("CS101")
                    .then(|| "course-001".to_string()),
            }
        })
        .collect()
}

/// Generates 20 enrollments of fixture students into published courses.
pub fn seed_enrollments() -> Vec<Enrollment> {
    (0..20)
        .map(|i| Enrollment {
            id: format!("enrollment-{:03}", i + 1),
            course_id: format!("course-{:03}", i % 6 + 1),
            student_id: format!("user-{:03}", 9 + i % 16),
            status: match i % 7 {
                5 => EnrollmentStatus::Dropped,
                6 => EnrollmentStatus::Pending,
                _ => EnrollmentStatus::Active,
            },
            grade: None,
            enrolled_at: Some(at(-7 + (i as i64 % 7), 12)),
        })
        .collect()
}

fn to_values<T: Serialize>(records: Vec<T>) -> Vec<Value> {
    records
        .iter()
        .filter_map(|record| serde_json::to_value(record).ok())
        .collect()
}

/// Returns the fixture records of a resource as JSON, or an empty list for
/// an unknown resource name.
pub fn generate_seed_records(resource: &str) -> Vec<Value> {
    match resource {
        name if name == USERS.name => to_values(seed_users()),
        name if name == COURSES.name => to_values(seed_courses()),
        name if name == ASSIGNMENTS.name => to_values(seed_assignments()),
        name if name == EVENTS.name => to_values(seed_events()),
        name if name == ENROLLMENTS.name => to_values(seed_enrollments()),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_semester_start() {
        assert_eq!(at(0, 0).to_rfc3339(), "2024-09-02T00:00:00+00:00");
    }

    #[test]
    fn test_counts() {
        assert_eq!(seed_users().len(), 24);
        assert_eq!(seed_courses().len(), 8);
        assert_eq!(seed_assignments().len(), 30);
        assert_eq!(seed_events().len(), 12);
        assert_eq!(seed_enrollments().len(), 20);
    }

    #[test]
    fn test_role_distribution() {
        let users = seed_users();
        let count = |role| users.iter().filter(|u| u.role == role).count();
        assert_eq!(count(Role::Admin), 2);
        assert_eq!(count(Role::Faculty), 6);
        assert_eq!(count(Role::Student), 16);
        assert!(users
            .iter()
            .all(|u| u.student_id.is_some() == (u.role == Role::Student)));
    }

    #[test]
    fn test_ids_unique_and_deterministic() {
        let ids: HashSet<String> = seed_assignments().into_iter().map(|a| a.id).collect();
        assert_eq!(ids.len(), 30);
        assert_eq!(seed_assignments(), seed_assignments());
    }

    #[test]
    fn test_references_point_at_fixtures() {
        let course_ids: HashSet<String> = seed_courses().into_iter().map(|c| c.id).collect();
        let user_ids: HashSet<String> = seed_users().into_iter().map(|u| u.id).collect();

        assert!(seed_assignments()
            .iter()
            .all(|a| course_ids.contains(&a.course_id)));
        assert!(seed_enrollments()
            .iter()
            .all(|e| course_ids.contains(&e.course_id) && user_ids.contains(&e.student_id)));
        assert!(seed_courses()
            .iter()
            .all(|c| user_ids.contains(c.instructor_id.as_deref().unwrap())));
    }

    #[test]
    fn test_generate_seed_records_by_name() {
        assert_eq!(generate_seed_records("assignments").len(), 30);
        assert_eq!(generate_seed_records("users")[0]["id"], "user-001");
        assert!(generate_seed_records("grades").is_empty());
    }
}
