use super::field::{EntitySchema, ListEntity};
use super::filter::FilterSet;
use super::request::ListRequest;
use super::search::SearchQuery;
use super::sort::SortOrder;
use crate::shared::{check_limit_ceiling, normalize_pagination, ListResult, NormalizedPagination};

/// Per-endpoint switches applied while preparing a query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Reject `limit > 1000` instead of clamping it.
    pub enforce_limit_ceiling: bool,
}

/// A list request after validation and normalization. Both backends execute
/// the same `ListQuery`, so they never disagree on defaults.
#[derive(Debug, Clone)]
pub struct ListQuery {
    pub schema: &'static EntitySchema,
    pub filters: FilterSet,
    pub search: Option<SearchQuery>,
    pub sort: SortOrder,
    pub pagination: NormalizedPagination,
}

impl ListQuery {
    pub fn prepare<T: ListEntity>(request: &ListRequest, options: &ListOptions) -> ListResult<Self> {
        let schema = T::schema();
        let raw_pagination = request.pagination.as_ref().map(|p| p.to_request());

        if options.enforce_limit_ceiling {
            check_limit_ceiling(raw_pagination.as_ref())?;
        }

        let search = request.search.as_ref().map(SearchQuery::parse).transpose()?;
        let filters = FilterSet::resolve(schema, &request.filters)?;
        let sort = SortOrder::resolve(schema, request.sort.as_ref(), search.is_some());
        let pagination = normalize_pagination(raw_pagination.as_ref());

        Ok(Self {
            schema,
            filters,
            search,
            sort,
            pagination,
        })
    }

    pub fn entity(&self) -> &'static str {
        self.schema.entity
    }
}
