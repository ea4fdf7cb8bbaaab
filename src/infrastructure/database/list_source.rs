//! SQL-backed list source.

use std::marker::PhantomData;

use async_trait::async_trait;
use sea_orm::{ConnectionTrait, DatabaseConnection, QueryResult};
use tracing::{debug, warn};

use super::pipeline::{SqlPipeline, ROW_NUM_COLUMN, SCORE_COLUMN, TOTAL_COUNT_COLUMN};
use crate::application::ports::ListSource;
use crate::domain::query::{search, ListEntity, ListPage, ListQuery, SearchResult};
use crate::shared::{ConversionError, ListResult, QueryError};

/// An entity that can be rebuilt from a row of its table.
pub trait SqlListEntity: ListEntity {
    fn from_row(row: &QueryResult) -> Result<Self, ConversionError>;
}

/// Runs list queries as a single SQL statement.
pub struct SqlListSource<T> {
    db: DatabaseConnection,
    _entity: PhantomData<fn() -> T>,
}

impl<T: SqlListEntity> SqlListSource<T> {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }
}

#[async_trait]
impl<T: SqlListEntity> ListSource<T> for SqlListSource<T> {
    fn backend(&self) -> &'static str {
        "sql"
    }

    async fn fetch_page(&self, query: &ListQuery) -> ListResult<ListPage<T>> {
        fetch_page_with(&self.db, query).await
    }
}

/// Executes `query` on any connection, including an open transaction.
///
/// Rows that fail conversion are skipped and counted; `totalItems` still
/// reflects every stored row that matched.
pub async fn fetch_page_with<T, C>(conn: &C, query: &ListQuery) -> ListResult<ListPage<T>>
where
    T: SqlListEntity,
    C: ConnectionTrait,
{
    let entity = query.entity();
    let pipeline = SqlPipeline::build(query, conn.get_database_backend())
        .map_err(|e| QueryError::store(entity, e))?;

    debug!(entity, sql = pipeline.sql(), binds = pipeline.values().len(), "Executing list pipeline");

    let rows = conn
        .query_all(pipeline.statement())
        .await
        .map_err(|e| QueryError::store(entity, e))?;

    let mut total_items = 0u64;
    let mut data = Vec::with_capacity(rows.len());
    let mut results: Vec<SearchResult> = Vec::new();
    let mut skipped = 0u64;

    for row in &rows {
        let total: i64 = row
            .try_get("", TOTAL_COUNT_COLUMN)
            .map_err(|e| QueryError::store(entity, e))?;
        total_items = total.max(0) as u64;

        let row_num: Option<i64> = row
            .try_get("", ROW_NUM_COLUMN)
            .map_err(|e| QueryError::store(entity, e))?;
        if row_num.is_none() {
            // count-only row of an empty window
            continue;
        }

        let item = match T::from_row(row) {
            Ok(item) => item,
            Err(err) => {
                warn!(
                    entity,
                    row_num = row_num.unwrap_or_default(),
                    error = %err,
                    "Skipping row that cannot be converted"
                );
                metrics::counter!("list_query_skipped_items_total", "entity" => entity).increment(1);
                skipped += 1;
                continue;
            }
        };

        if let Some(q) = &query.search {
            let score: f64 = row
                .try_get("", SCORE_COLUMN)
                .map_err(|e| QueryError::store(entity, e))?;
            results.push(SearchResult {
                score,
                highlights: search::highlights(q, &item),
            });
        }
        data.push(item);
    }

    let search_results = query.search.as_ref().map(|_| results);
    Ok(ListPage::assemble(data, search_results, &query.pagination, total_items).with_skipped(skipped))
}
