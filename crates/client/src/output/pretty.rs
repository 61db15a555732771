//! Pretty output formatting.

use campusync_core::resources::{Assignment, Course, Enrollment, Event, Page, User};

/// Human-readable rendering of a record.
pub trait Pretty {
    fn pretty(&self) -> String;
}

impl Pretty for User {
    fn pretty(&self) -> String {
        let mut output = format!(
            "{} [{}]\n  ID: {}\n  Email: {}",
            self.full_name(),
            self.role.as_str(),
            self.id,
            self.email
        );
        if let Some(department) = &self.department {
            output.push_str(&format!("\n  Department: {}", department));
        }
        output
    }
}

impl Pretty for Course {
    fn pretty(&self) -> String {
        let mut output = format!(
            "{} {}\n  ID: {}\n  Credits: {}",
            self.code, self.title, self.id, self.credits
        );
        if let Some(semester) = &self.semester {
            output.push_str(&format!("\n  Semester: {}", semester));
        }
        if let (Some(capacity), Some(left)) = (self.capacity, self.seats_left()) {
            output.push_str(&format!("\n  Seats: {} of {} left", left, capacity));
        }
        output
    }
}

impl Pretty for Assignment {
    fn pretty(&self) -> String {
        let mut output = format!(
            "{} [{:?}]\n  ID: {}\n  Course: {}\n  Points: {}",
            self.title, self.status, self.id, self.course_id, self.total_points
        );
        if let Some(due) = &self.due_date {
            output.push_str(&format!("\n  Due: {}", due.format("%Y-%m-%d %H:%M")));
        }
        if !self.tags.is_empty() {
            output.push_str(&format!("\n  Tags: {}", self.tags.join(", ")));
        }
        for attachment in &self.attachments {
            output.push_str(&format!(
                "\n  File: {} ({}, {} bytes)",
                attachment.file_name, attachment.id, attachment.size
            ));
        }
        output
    }
}

impl Pretty for Event {
    fn pretty(&self) -> String {
        let mut output = format!(
            "{} [{:?}]\n  ID: {}\n  Starts: {}",
            self.title,
            self.event_type,
            self.id,
            self.start_date.format("%Y-%m-%d %H:%M")
        );
        if let Some(location) = &self.location {
            output.push_str(&format!("\n  Location: {}", location));
        }
        output
    }
}

impl Pretty for Enrollment {
    fn pretty(&self) -> String {
        let mut output = format!(
            "{} in {} [{:?}]\n  ID: {}",
            self.student_id, self.course_id, self.status, self.id
        );
        if let Some(grade) = &self.grade {
            output.push_str(&format!("\n  Grade: {}", grade));
        }
        output
    }
}

/// Format one page of records for display.
pub fn format_page<T: Pretty>(heading: &str, page: &Page<T>) -> String {
    if page.items.is_empty() {
        return format!("No {} found.", heading.to_lowercase());
    }
    let pagination = &page.pagination;
    let mut output = format!(
        "{} (page {}/{}, {} total)\n",
        heading.to_uppercase(),
        pagination.page,
        pagination.pages,
        pagination.total
    );
    output.push_str(&"-".repeat(40));
    for item in &page.items {
        output.push_str(&format!("\n{}", item.pretty()));
        output.push('\n');
    }
    output
}
