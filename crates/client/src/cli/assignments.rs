//! Assignment CLI commands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use campusync_core::resources::Transition;

use super::resources::ResourceAction;

/// Assignment management commands.
#[derive(Debug, Parser)]
pub struct AssignmentsCommand {
    #[command(subcommand)]
    pub action: AssignmentsAction,
}

/// Available assignment actions.
#[derive(Debug, Subcommand)]
pub enum AssignmentsAction {
    #[command(flatten)]
    Common(ResourceAction),
    /// Publish an assignment.
    Publish {
        /// Assignment ID.
        id: String,
    },
    /// Move an assignment back to draft.
    Unpublish {
        /// Assignment ID.
        id: String,
    },
    /// Stop accepting submissions.
    CloseSubmissions {
        /// Assignment ID.
        id: String,
    },
    /// Attach a file.
    Attach {
        /// Assignment ID.
        id: String,
        /// File to upload.
        path: PathBuf,
    },
    /// Remove an attached file.
    Detach {
        /// Assignment ID.
        id: String,
        /// Attachment ID.
        file_id: String,
    },
}

impl AssignmentsAction {
    /// The state transition this action requests, if any.
    pub fn transition(&self) -> Option<(&str, Transition)> {
        match self {
            AssignmentsAction::Publish { id } => Some((id.as_str(), Transition::Publish)),
            AssignmentsAction::Unpublish { id } => Some((id.as_str(), Transition::Unpublish)),
            AssignmentsAction::CloseSubmissions { id } => Some((id.as_str(), Transition::CloseSubmissions)),
            _ => None,
        }
    }
}
