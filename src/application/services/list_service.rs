//! Entry point for every "get list page data" operation.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::application::ports::{AccessGate, AllowAll, ListSource};
use crate::domain::query::{ListEntity, ListOptions, ListPage, ListQuery, ListRequest};
use crate::shared::{ListResult, QueryError};

/// Record list query metrics.
fn record_list_metrics(entity: &'static str, backend: &'static str, start: Instant) {
    let duration = start.elapsed().as_secs_f64();
    metrics::histogram!("list_query_duration_seconds", "entity" => entity, "backend" => backend)
        .record(duration);
    metrics::counter!("list_query_requests_total", "entity" => entity, "backend" => backend)
        .increment(1);
}

/// Runs list requests against any [`ListSource`]: authorizes, validates and
/// normalizes once, then hands the prepared query to the source.
pub struct ListService {
    gate: Arc<dyn AccessGate>,
    options: ListOptions,
}

impl ListService {
    pub fn new(gate: Arc<dyn AccessGate>, options: ListOptions) -> Self {
        Self { gate, options }
    }

    pub async fn get_list_page_data<T: ListEntity>(
        &self,
        source: &dyn ListSource<T>,
        request: &ListRequest,
    ) -> ListResult<ListPage<T>> {
        let entity = T::schema().entity;

        if !self.gate.authorize_list(entity).await {
            return Err(QueryError::Forbidden(format!("listing {} is not allowed", entity)));
        }

        let query = ListQuery::prepare::<T>(request, &self.options)?;
        debug!(
            entity,
            backend = source.backend(),
            limit = query.pagination.limit(),
            offset = query.pagination.offset(),
            search = query.search.is_some(),
            filters = query.filters.predicates().len(),
            "Prepared list query"
        );

        let start = Instant::now();
        let page = source.fetch_page(&query).await;
        record_list_metrics(entity, source.backend(), start);
        let page = page?;

        info!(
            entity,
            backend = source.backend(),
            total = page.pagination.total_items,
            returned = page.data.len(),
            skipped = page.skipped_items,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "List page served"
        );

        Ok(page)
    }
}

impl Default for ListService {
    fn default() -> Self {
        Self::new(Arc::new(AllowAll), ListOptions::default())
    }
}
