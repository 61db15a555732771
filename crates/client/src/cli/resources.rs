//! Commands shared by every resource.

use clap::{Args, Parser, Subcommand};
use serde_json::Value;

use campusync_core::query::{ListParams, DEFAULT_LIMIT, DEFAULT_PAGE, RESERVED_PARAMS};

use crate::error::{ClientError, Result};

/// Resource management commands.
#[derive(Debug, Parser)]
pub struct ResourceCommand {
    #[command(subcommand)]
    pub action: ResourceAction,
}

/// Available resource actions.
#[derive(Debug, Subcommand)]
pub enum ResourceAction {
    /// List records.
    List(ListArgs),
    /// Get a record by ID.
    Get {
        /// Record ID.
        id: String,
    },
    /// Create a record from a JSON object.
    Create {
        /// Request body, e.g. '{"title": "Lab 1"}'.
        #[arg(long)]
        data: String,
    },
    /// Update a record with the fields of a JSON object.
    Update {
        /// Record ID.
        id: String,
        /// Fields to change.
        #[arg(long)]
        data: String,
    },
    /// Delete a record by ID.
    Delete {
        /// Record ID.
        id: String,
    },
}

#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    /// Page number, starting at 1.
    #[arg(long, default_value_t = DEFAULT_PAGE)]
    pub page: u32,
    /// Page size.
    #[arg(long, default_value_t = DEFAULT_LIMIT)]
    pub limit: u32,
    /// Free-text search.
    #[arg(long)]
    pub search: Option<String>,
    /// Filter as NAME=VALUE (repeatable).
    #[arg(long = "filter", value_name = "NAME=VALUE", value_parser = parse_filter)]
    pub filters: Vec<(String, String)>,
}

impl ListArgs {
    pub fn to_params(&self) -> ListParams {
        let mut params = ListParams::new(self.page, self.limit);
        if let Some(search) = &self.search {
            params = params.with_search(search.clone());
        }
        for (name, value) in &self.filters {
            params = params.with_filter(name.clone(), value.clone());
        }
        params
    }
}

/// Parse a `NAME=VALUE` filter argument.
pub fn parse_filter(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, _)) if RESERVED_PARAMS.contains(&name.trim()) => Err(format!(
            "'{}' is not a filter, use --{} instead",
            name.trim(),
            name.trim()
        )),
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got '{}'", s)),
    }
}

/// Parse a `--data` argument into a JSON object.
pub fn parse_data(s: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(s)?;
    if value.is_object() {
        Ok(value)
    } else {
        Err(ClientError::InvalidInput(
            "--data must be a JSON object".to_string(),
        ))
    }
}
