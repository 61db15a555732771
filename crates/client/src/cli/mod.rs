//! CLI command definitions.

pub mod assignments;
pub mod resources;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::{Config, Mode};

/// CLI client for the campusync API.
#[derive(Debug, Parser)]
#[command(name = "campusync-client")]
#[command(about = "CLI client for the campusync API", long_about = None)]
pub struct Cli {
    /// Backend base URL.
    #[arg(long, env = "CAMPUSYNC_URL", default_value = "http://localhost:5000/api")]
    pub base_url: String,

    /// Bearer token. Without one the mock backend is used.
    #[arg(long, env = "CAMPUSYNC_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// `development` serves fixtures instead of calling the backend.
    #[arg(long, env = "CAMPUSYNC_MODE", default_value = "production")]
    pub mode: Mode,

    /// Output format.
    #[arg(long, default_value = "pretty")]
    pub format: OutputFormat,

    /// Suppress non-essential output.
    #[arg(long)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Environment configuration with the command-line overrides applied.
    pub fn config(&self) -> Config {
        Config {
            base_url: self.base_url.clone(),
            token: self.token.clone().filter(|t| !t.trim().is_empty()),
            mode: self.mode,
            ..Config::from_env()
        }
    }
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Raw JSON output.
    Json,
    /// Human-readable output.
    #[default]
    Pretty,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// User management.
    Users(resources::ResourceCommand),
    /// Course management.
    Courses(resources::ResourceCommand),
    /// Assignment management.
    Assignments(assignments::AssignmentsCommand),
    /// Calendar event management.
    Events(resources::ResourceCommand),
    /// Enrollment management.
    Enrollments(resources::ResourceCommand),
}

#[cfg(test)]
mod tests {
    use super::*;
    use resources::ResourceAction;

    #[test]
    fn test_parse_list_with_filters() {
        let cli = Cli::try_parse_from([
            "campusync-client",
            "--token",
            "secret",
            "courses",
            "list",
            "--page",
            "2",
            "--filter",
            "status=active",
            "--filter",
            "department=Physics",
        ])
        .unwrap();

        let Commands::Courses(command) = cli.command else {
            panic!("expected courses command");
        };
        let ResourceAction::List(args) = command.action else {
            panic!("expected list action");
        };
        let params = args.to_params();
        assert_eq!(params.page, 2);
        assert_eq!(params.filters.get("status"), Some("active"));
        assert_eq!(params.filters.get("department"), Some("Physics"));
    }

    #[test]
    fn test_mode_flag() {
        let cli = Cli::try_parse_from(["campusync-client", "--mode", "dev", "users", "get", "user-001"])
            .unwrap();
        assert_eq!(cli.mode, Mode::Development);
        assert!(cli.config().use_mock_backend());
    }

    #[test]
    fn test_assignment_transition_commands() {
        let cli = Cli::try_parse_from(["campusync-client", "assignments", "close-submissions", "a1"])
            .unwrap();
        let Commands::Assignments(command) = cli.command else {
            panic!("expected assignments command");
        };
        assert!(matches!(
            command.action,
            assignments::AssignmentsAction::CloseSubmissions { ref id } if id == "a1"
        ));
    }

    #[test]
    fn test_assignments_accept_common_actions() {
        let cli = Cli::try_parse_from(["campusync-client", "assignments", "delete", "a1"]).unwrap();
        let Commands::Assignments(command) = cli.command else {
            panic!("expected assignments command");
        };
        assert!(matches!(
            command.action,
            assignments::AssignmentsAction::Common(ResourceAction::Delete { .. })
        ));
    }
}
