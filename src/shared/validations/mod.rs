use crate::shared::{
    ListResult, NormalizedPagination, PaginationMethod, PaginationRequest, QueryError,
    DEFAULT_LIMIT, HARD_LIMIT_CEILING, MAX_LIMIT,
};

/// Applies defaults and clamps to a raw pagination request.
///
/// Never fails: a non-positive limit becomes `DEFAULT_LIMIT`, an oversized
/// one becomes `MAX_LIMIT`, a missing method or non-positive page becomes
/// page 1.
pub fn normalize_pagination(request: Option<&PaginationRequest>) -> NormalizedPagination {
    let Some(request) = request else {
        return NormalizedPagination::new_unchecked(DEFAULT_LIMIT as u64, PaginationMethod::default());
    };

    let limit = normalize_limit(request.limit);

    let method = match &request.method {
        None => PaginationMethod::default(),
        Some(PaginationMethod::Offset { page }) => PaginationMethod::Offset {
            page: (*page).max(1),
        },
        Some(PaginationMethod::Cursor { token }) => PaginationMethod::Cursor {
            token: token.clone(),
        },
    };

    NormalizedPagination::new_unchecked(limit, method)
}

pub fn normalize_limit(limit: i64) -> u64 {
    if limit <= 0 {
        DEFAULT_LIMIT as u64
    } else {
        limit.min(MAX_LIMIT) as u64
    }
}

/// Rejects limits above the hard ceiling. Only applied on endpoints that
/// opt in; everywhere else oversized limits are clamped.
pub fn check_limit_ceiling(request: Option<&PaginationRequest>) -> ListResult<()> {
    match request {
        Some(req) if req.limit > HARD_LIMIT_CEILING => Err(QueryError::validation(format!(
            "limit: must not exceed {} (got {})",
            HARD_LIMIT_CEILING, req.limit
        ))),
        _ => Ok(()),
    }
}
