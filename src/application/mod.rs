pub mod ports;
pub mod services;

// Re-export key types for convenience
pub use ports::{AccessGate, AllowAll, ListSource};
pub use services::ListService;
