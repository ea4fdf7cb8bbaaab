//! # List Engine
//!
//! Search, filter, sort and pagination for entity list endpoints, with one
//! contract and two realizations:
//!
//! - **domain**: request model, normalization and the in-memory pipeline
//! - **application**: the `ListSource` port and the `ListService` entry point
//! - **infrastructure**: the in-memory store and the SeaORM-backed SQL pipeline
//! - **shared**: pagination types, limits and errors

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod shared;

pub use config::{default_config_path, AppConfig};

pub use application::{AccessGate, AllowAll, ListService, ListSource};
pub use domain::{ListOptions, ListPage, ListRequest};
pub use infrastructure::{init_database, DatabaseConfig, InMemoryStore, SqlListSource};
pub use shared::{ListResult, QueryError};
