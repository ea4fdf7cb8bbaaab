use serde::Serialize;

use super::search::SearchResult;
use crate::shared::{NormalizedPagination, PaginationResponse};

/// One page of a list response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPage<T> {
    pub data: Vec<T>,
    pub pagination: PaginationResponse,
    /// Aligned index-for-index with `data`; present only for search requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_results: Option<Vec<SearchResult>>,
    /// Rows dropped because they could not be converted.
    #[serde(skip_serializing_if = "is_zero")]
    pub skipped_items: u64,
}

fn is_zero(n: &u64) -> bool {
    *n == 0
}

impl<T> ListPage<T> {
    /// `total_items` is the count after filtering and search, before the
    /// window was taken.
    pub fn assemble(
        data: Vec<T>,
        search_results: Option<Vec<SearchResult>>,
        pagination: &NormalizedPagination,
        total_items: u64,
    ) -> Self {
        Self {
            data,
            pagination: PaginationResponse::new(pagination, total_items),
            search_results,
            skipped_items: 0,
        }
    }

    pub fn with_skipped(mut self, skipped: u64) -> Self {
        self.skipped_items = skipped;
        self
    }

    pub fn ids(&self) -> Vec<String>
    where
        T: super::field::ListEntity,
    {
        self.data.iter().map(|item| item.id().to_string()).collect()
    }
}
