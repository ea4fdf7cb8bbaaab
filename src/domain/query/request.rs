//! Wire shape of a list request.
//!
//! `{ search?: {query}, filters?: [...], sort?: {fields: [...]},
//!    pagination?: {limit, offset?: {page} | cursor?: {token}} }`

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::filter::FilterOperator;
use super::sort::SortDirection;
use crate::shared::{PaginationMethod, PaginationRequest};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<SearchSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<FilterClause>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationParams>,
}

impl ListRequest {
    pub fn with_search(mut self, query: impl Into<String>) -> Self {
        self.search = Some(SearchSpec {
            query: query.into(),
        });
        self
    }

    pub fn with_filter(
        mut self,
        field: impl Into<String>,
        op: FilterOperator,
        value: serde_json::Value,
    ) -> Self {
        self.filters.push(FilterClause {
            field: field.into(),
            op,
            value,
        });
        self
    }

    pub fn with_sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort.get_or_insert_with(SortSpec::default).fields.push(SortField {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn with_page(mut self, limit: i64, page: i64) -> Self {
        self.pagination = Some(PaginationParams {
            limit: Some(limit),
            offset: Some(OffsetParams { page }),
            cursor: None,
        });
        self
    }

    pub fn with_cursor(mut self, limit: i64, token: impl Into<String>) -> Self {
        self.pagination = Some(PaginationParams {
            limit: Some(limit),
            offset: None,
            cursor: Some(CursorParams {
                token: token.into(),
            }),
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SearchSpec {
    #[validate(length(min = 2, message = "search query must be at least 2 characters"))]
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterClause {
    pub field: String,
    pub op: FilterOperator,
    #[serde(default)]
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    #[serde(default)]
    pub fields: Vec<SortField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortField {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationParams {
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<OffsetParams>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<CursorParams>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetParams {
    pub page: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorParams {
    pub token: String,
}

impl PaginationParams {
    /// A cursor takes precedence when both methods are supplied.
    pub fn to_request(&self) -> PaginationRequest {
        let method = match (&self.cursor, &self.offset) {
            (Some(c), _) => Some(PaginationMethod::Cursor {
                token: c.token.clone(),
            }),
            (None, Some(o)) => Some(PaginationMethod::Offset { page: o.page }),
            (None, None) => None,
        };
        PaginationRequest {
            limit: self.limit.unwrap_or(0),
            method,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_request() {
        let req: ListRequest = serde_json::from_value(serde_json::json!({
            "search": {"query": "lamp"},
            "filters": [{"field": "stock", "op": "gte", "value": 3}],
            "sort": {"fields": [{"field": "price", "direction": "DESC"}, {"field": "name"}]},
            "pagination": {"limit": 10, "offset": {"page": 2}}
        }))
        .unwrap();

        assert_eq!(req.search.as_ref().unwrap().query, "lamp");
        assert_eq!(req.filters[0].op, FilterOperator::Gte);
        let sort = req.sort.unwrap();
        assert_eq!(sort.fields[0].direction, SortDirection::Desc);
        assert_eq!(sort.fields[1].direction, SortDirection::Asc);
        assert_eq!(
            req.pagination.unwrap().to_request(),
            PaginationRequest::offset(10, 2)
        );
    }

    #[test]
    fn empty_object_is_a_valid_request() {
        let req: ListRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req, ListRequest::default());
    }

    #[test]
    fn cursor_wins_over_offset() {
        let params: PaginationParams = serde_json::from_value(serde_json::json!({
            "limit": 5, "offset": {"page": 3}, "cursor": {"token": "offset:15"}
        }))
        .unwrap();
        assert_eq!(params.to_request(), PaginationRequest::cursor(5, "offset:15"));
    }

    #[test]
    fn missing_limit_maps_to_zero() {
        let params = PaginationParams::default();
        assert_eq!(params.to_request().limit, 0);
        assert_eq!(params.to_request().method, None);
    }
}
