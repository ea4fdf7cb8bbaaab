//! Outbound ports: where list pages come from, and who may ask for them.
//!
//! [`ListSource`] has two implementations,
//! [`InMemoryStore`](crate::infrastructure::storage::InMemoryStore) and
//! [`SqlListSource`](crate::infrastructure::database::SqlListSource). Both
//! receive an already validated [`ListQuery`] and must produce identical
//! pages for identical data.

use async_trait::async_trait;

use crate::domain::query::{ListEntity, ListPage, ListQuery};
use crate::shared::ListResult;

/// A store that can execute a prepared list query for one entity type.
#[async_trait]
pub trait ListSource<T: ListEntity>: Send + Sync {
    /// Short backend label used in logs and metrics.
    fn backend(&self) -> &'static str;

    async fn fetch_page(&self, query: &ListQuery) -> ListResult<ListPage<T>>;
}

/// Authorization check performed before any list query runs.
#[async_trait]
pub trait AccessGate: Send + Sync {
    async fn authorize_list(&self, entity: &str) -> bool;
}

/// Gate that lets every request through.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

#[async_trait]
impl AccessGate for AllowAll {
    async fn authorize_list(&self, _entity: &str) -> bool {
        true
    }
}
