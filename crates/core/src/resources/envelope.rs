//! The backend response envelope and its normalization.
//!
//! Every response is `{success, message, timestamp, data, pagination?}`.
//! List endpoints put either a bare array or `{items, pagination}` in
//! `data`; [`into_page`] folds both shapes into a [`Page`].

use serde::{Deserialize, Serialize};

use crate::query::{ListParams, QueryError, Result};

/// Pagination metadata for a list response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u32,
}

impl Pagination {
    /// Computes pagination for `total` records split into pages of `limit`.
    pub fn compute(page: u32, limit: u32, total: u64) -> Self {
        let pages = if limit == 0 {
            0
        } else {
            u32::try_from(total.div_ceil(u64::from(limit))).unwrap_or(u32::MAX)
        };
        Self {
            page,
            limit,
            total,
            pages,
        }
    }
}

/// One page of records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

/// The shared response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<D> {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<D>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

fn default_success() -> bool {
    true
}

impl<D> ApiResponse<D> {
    /// Builds a successful envelope, as the backend (or the mock) would.
    pub fn ok(message: impl Into<String>, data: D) -> Self {
        Self {
            success: true,
            message: message.into(),
            timestamp: Some(chrono::Utc::now().to_rfc3339()),
            data: Some(data),
            pagination: None,
        }
    }

    fn check(&self, status: u16) -> Result<()> {
        if self.success {
            Ok(())
        } else {
            Err(QueryError::from_status(status, self.message.clone()))
        }
    }
}

/// The two shapes a list `data` field comes in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListData<T> {
    Items(Vec<T>),
    Paged {
        items: Vec<T>,
        #[serde(default)]
        pagination: Option<Pagination>,
    },
}

/// Extracts the record from a single-record envelope received with `status`.
pub fn into_record<T>(response: ApiResponse<T>, status: u16) -> Result<T> {
    response.check(status)?;
    response
        .data
        .ok_or_else(|| QueryError::Decode("response envelope has no data".to_string()))
}

/// Normalizes a list envelope into a [`Page`].
///
/// Pagination is taken from `data.pagination`, then the top-level
/// `pagination`, and is otherwise computed from the returned items and the
/// request parameters.
pub fn into_page<T>(
    response: ApiResponse<ListData<T>>,
    status: u16,
    params: &ListParams,
) -> Result<Page<T>> {
    response.check(status)?;
    let top_level = response.pagination;
    let (items, nested) = match response.data {
        Some(ListData::Items(items)) => (items, None),
        Some(ListData::Paged { items, pagination }) => (items, pagination),
        None => (Vec::new(), None),
    };
    let pagination = nested.or(top_level).unwrap_or_else(|| {
        Pagination::compute(params.page, params.limit, items.len() as u64)
    });
    Ok(Page { items, pagination })
}
