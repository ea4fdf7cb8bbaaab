pub mod product;
pub mod query;
pub mod user;

// Re-export commonly used types
pub use product::Product;
pub use query::{ListEntity, ListOptions, ListPage, ListQuery, ListRequest};
pub use user::{User, UserRole};
