//! In-memory list source
//!
//! Items are kept in a `BTreeMap` keyed by id, so every scan yields them in
//! primary-key order. List queries hold the read lock for the whole
//! filter/sort/window pass; writers take the write lock.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::ports::ListSource;
use crate::domain::query::{process, ListEntity, ListPage, ListQuery};
use crate::shared::{ListResult, QueryError, StoreError};

/// In-memory store for development and testing
pub struct InMemoryStore<T: ListEntity> {
    items: RwLock<BTreeMap<String, T>>,
}

impl<T: ListEntity> InMemoryStore<T> {
    pub fn new() -> Self {
        Self {
            items: RwLock::new(BTreeMap::new()),
        }
    }

    /// Builds a store from `items`; later duplicates replace earlier ones.
    pub fn with_items(items: impl IntoIterator<Item = T>) -> Self {
        let map = items
            .into_iter()
            .map(|item| (item.id().to_string(), item))
            .collect();
        Self {
            items: RwLock::new(map),
        }
    }

    /// Adds a new item; an existing id is a conflict.
    pub async fn insert(&self, item: T) -> ListResult<()> {
        let mut items = self.items.write().await;
        if items.contains_key(item.id()) {
            return Err(QueryError::store(
                T::schema().entity,
                StoreError::Conflict {
                    entity: T::schema().entity,
                    id: item.id().to_string(),
                },
            ));
        }
        items.insert(item.id().to_string(), item);
        Ok(())
    }

    /// Inserts or replaces, returning the previous value.
    pub async fn upsert(&self, item: T) -> Option<T> {
        self.items.write().await.insert(item.id().to_string(), item)
    }

    pub async fn remove(&self, id: &str) -> Option<T> {
        self.items.write().await.remove(id)
    }

    pub async fn get(&self, id: &str) -> Option<T> {
        self.items.read().await.get(id).cloned()
    }

    /// Number of stored items, hidden ones included.
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

impl<T: ListEntity> Default for InMemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: ListEntity> ListSource<T> for InMemoryStore<T> {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn fetch_page(&self, query: &ListQuery) -> ListResult<ListPage<T>> {
        let items = self.items.read().await;
        Ok(process(query, items.values()))
    }
}
