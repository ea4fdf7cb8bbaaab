//! Database repository implementations
//!
//! Per-aggregate SeaORM repositories. Each also maps its rows for the list
//! pipeline.

pub mod product_repository;
pub mod user_repository;

pub use product_repository::{save_product, ProductRepository};
pub use user_repository::{save_user, UserRepository};
