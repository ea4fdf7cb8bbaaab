//! The list query engine: request model, normalization and the in-process
//! pipeline that the SQL pipeline mirrors.

pub mod field;
pub mod filter;
pub mod page;
pub mod plan;
pub mod processor;
pub mod request;
pub mod search;
pub mod sort;

pub use field::{EntitySchema, FieldDef, FieldKind, FieldValue, ListEntity, SoftDelete};
pub use filter::{FilterOperator, FilterPredicate, FilterSet, Operand};
pub use page::ListPage;
pub use plan::{ListOptions, ListQuery};
pub use processor::process;
pub use request::{
    CursorParams, FilterClause, ListRequest, OffsetParams, PaginationParams, SearchSpec, SortField,
    SortSpec,
};
pub use search::{SearchQuery, SearchResult};
pub use sort::{SortDirection, SortOrder, SortTarget, SortTerm};
