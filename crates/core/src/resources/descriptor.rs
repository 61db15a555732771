use std::fmt;
use std::str::FromStr;

use url::form_urlencoded;

/// Static description of a REST resource.
///
/// One descriptor drives everything resource-specific: the endpoint path,
/// the cache-key namespace, which fields the development fallback searches,
/// and which other resources' lists go stale when this one is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceDescriptor {
    /// Path segment and cache-key namespace, e.g. `assignments`.
    pub name: &'static str,
    /// Singular display label, e.g. `Assignment`.
    pub label: &'static str,
    /// JSON fields matched by a free-text search in the mock backend.
    pub search_fields: &'static [&'static str],
    /// Resources whose lists embed data from this one.
    pub related: &'static [&'static str],
    /// State transitions the API accepts for this resource.
    pub transitions: &'static [Transition],
}

impl ResourceDescriptor {
    pub fn supports(&self, transition: Transition) -> bool {
        self.transitions.contains(&transition)
    }

    /// Returns the collection path, e.g. `/assignments`.
    pub fn path(&self) -> String {
        format!("/{}", self.name)
    }

    /// Returns the record path, e.g. `/assignments/42`. The id is
    /// percent-encoded as a single segment.
    pub fn record_path(&self, id: &str) -> String {
        format!("/{}/{}", self.name, path_segment(id))
    }

    /// Returns the path of one file attached to a record.
    pub fn file_path(&self, id: &str, file_id: &str) -> String {
        format!("{}/files/{}", self.record_path(id), path_segment(file_id))
    }
}

/// Percent-encodes `value` so it stays one path segment.
pub fn path_segment(value: &str) -> String {
    // form encoding writes spaces as '+', which is literal inside a path.
    form_urlencoded::byte_serialize(value.as_bytes())
        .map(|chunk| if chunk == "+" { "%20" } else { chunk })
        .collect()
}

pub const USERS: ResourceDescriptor = ResourceDescriptor {
    name: "users",
    label: "User",
    search_fields: &["firstName", "lastName", "email"],
    related: &["enrollments"],
    transitions: &[],
};

pub const COURSES: ResourceDescriptor = ResourceDescriptor {
    name: "courses",
    label: "Course",
    search_fields: &["code", "title", "description"],
    related: &["enrollments", "assignments"],
    transitions: &[],
};

pub const ASSIGNMENTS: ResourceDescriptor = ResourceDescriptor {
    name: "assignments",
    label: "Assignment",
    search_fields: &["title", "description"],
    related: &[],
    transitions: &[
        Transition::Publish,
        Transition::Unpublish,
        Transition::CloseSubmissions,
    ],
};

pub const EVENTS: ResourceDescriptor = ResourceDescriptor {
    name: "events",
    label: "Event",
    search_fields: &["title", "description", "location"],
    related: &[],
    transitions: &[],
};

pub const ENROLLMENTS: ResourceDescriptor = ResourceDescriptor {
    name: "enrollments",
    label: "Enrollment",
    search_fields: &["courseId", "studentId"],
    related: &["courses"],
    transitions: &[],
};

/// A state transition issued as `PATCH <resource>/:id/<action>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    Publish,
    Unpublish,
    CloseSubmissions,
}

impl Transition {
    /// The action path segment.
    pub fn action(&self) -> &'static str {
        match self {
            Transition::Publish => "publish",
            Transition::Unpublish => "unpublish",
            Transition::CloseSubmissions => "close-submissions",
        }
    }

    /// Past-tense verb used in notifications.
    pub fn past_tense(&self) -> &'static str {
        match self {
            Transition::Publish => "published",
            Transition::Unpublish => "unpublished",
            Transition::CloseSubmissions => "closed for submissions",
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.action())
    }
}

impl FromStr for Transition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "publish" => Ok(Transition::Publish),
            "unpublish" => Ok(Transition::Unpublish),
            "close-submissions" => Ok(Transition::CloseSubmissions),
            other => Err(format!("unknown transition: {}", other)),
        }
    }
}
