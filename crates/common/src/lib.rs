//! Foncier Common Library
//!
//! Shared code for the Foncier services including:
//! - Database entities and repository pattern
//! - Terrain listing query/filter layer
//! - Payload validation gate
//! - Portfolio analytics aggregation
//! - Error types and handling
//! - Configuration management
//! - Session authentication utilities
//! - Metrics and observability

pub mod analytics;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod metrics;
pub mod validate;

// Re-export commonly used types
pub use config::AppConfig;
pub use db::{DbPool, Repository};
pub use errors::{AppError, Result};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
