//! Pagination value objects and the offset/cursor codec.

use serde::{Deserialize, Serialize};

/// Limit used when the caller asks for none (or for a non-positive one).
pub const DEFAULT_LIMIT: i64 = 20;
/// Largest page a caller can receive; bigger limits are clamped.
pub const MAX_LIMIT: i64 = 100;
/// Limits above this are rejected on endpoints that enforce a ceiling.
pub const HARD_LIMIT_CEILING: i64 = 1000;

const CURSOR_PREFIX: &str = "offset:";

/// How the caller identifies the requested window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaginationMethod {
    Offset { page: i64 },
    Cursor { token: String },
}

impl Default for PaginationMethod {
    fn default() -> Self {
        Self::Offset { page: 1 }
    }
}

/// Raw pagination input, before defaults and clamps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationRequest {
    pub limit: i64,
    pub method: Option<PaginationMethod>,
}

impl PaginationRequest {
    pub fn offset(limit: i64, page: i64) -> Self {
        Self {
            limit,
            method: Some(PaginationMethod::Offset { page }),
        }
    }

    pub fn cursor(limit: i64, token: impl Into<String>) -> Self {
        Self {
            limit,
            method: Some(PaginationMethod::Cursor {
                token: token.into(),
            }),
        }
    }
}

/// Pagination after normalization: `limit` is in `[1, MAX_LIMIT]` and an
/// offset page is always `>= 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPagination {
    limit: u64,
    method: PaginationMethod,
}

impl NormalizedPagination {
    /// Only `shared::validations::normalize_pagination` constructs this.
    pub(crate) fn new_unchecked(limit: u64, method: PaginationMethod) -> Self {
        Self { limit, method }
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn method(&self) -> &PaginationMethod {
        &self.method
    }

    /// Current page for offset pagination, `None` in cursor mode.
    pub fn page(&self) -> Option<u64> {
        match self.method {
            PaginationMethod::Offset { page } => Some(page.max(1) as u64),
            PaginationMethod::Cursor { .. } => None,
        }
    }

    /// Zero-based row offset of the first item in the window.
    pub fn offset(&self) -> u64 {
        to_offset(&self.method, self.limit)
    }

    /// Token for the window that follows this one.
    pub fn next_cursor(&self) -> String {
        next_cursor(&self.method, self.limit)
    }
}

pub fn encode_cursor(offset: u64) -> String {
    format!("{}{}", CURSOR_PREFIX, offset)
}

/// Decodes a cursor token back into its offset. Anything unparseable
/// resumes from the start.
pub fn decode_cursor(token: &str) -> u64 {
    token
        .trim()
        .strip_prefix(CURSOR_PREFIX)
        .and_then(|n| n.parse::<u64>().ok())
        .unwrap_or(0)
}

/// Offsets are capped at `i64::MAX` so they always fit a SQL bind.
pub fn to_offset(method: &PaginationMethod, limit: u64) -> u64 {
    let offset = match method {
        PaginationMethod::Offset { page } => ((*page).max(1) as u64 - 1).saturating_mul(limit),
        PaginationMethod::Cursor { token } => decode_cursor(token),
    };
    offset.min(i64::MAX as u64)
}

pub fn next_cursor(method: &PaginationMethod, limit: u64) -> String {
    let next = match method {
        PaginationMethod::Offset { page } => ((*page).max(1) as u64).saturating_mul(limit),
        PaginationMethod::Cursor { token } => decode_cursor(token).saturating_add(limit),
    };
    encode_cursor(next.min(i64::MAX as u64))
}

/// `max(1, ceil(total_items / limit))`
pub fn total_pages(total_items: u64, limit: u64) -> u64 {
    total_items.div_ceil(limit.max(1)).max(1)
}

/// Pagination metadata returned with every page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationResponse {
    pub total_items: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_page: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u64>,
    pub has_next: bool,
    pub has_prev: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

impl PaginationResponse {
    pub fn new(pagination: &NormalizedPagination, total_items: u64) -> Self {
        let limit = pagination.limit();

        let (current_page, total_pages, has_next, has_prev) = match pagination.page() {
            Some(page) => {
                let pages = total_pages(total_items, limit);
                (Some(page), Some(pages), page < pages, page > 1)
            }
            // Backward traversal is not tracked for cursors.
            None => {
                let end = pagination.offset().saturating_add(limit);
                (None, None, end < total_items, false)
            }
        };

        Self {
            total_items,
            current_page,
            total_pages,
            has_next,
            has_prev,
            next_cursor: has_next.then(|| pagination.next_cursor()),
        }
    }
}
