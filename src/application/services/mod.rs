//! Application services

mod list_service;

pub use list_service::ListService;
