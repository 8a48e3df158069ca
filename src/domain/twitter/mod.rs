//! Twitter domain - models and queries for imported feeds

pub mod error;
pub mod models;
pub mod queries;

// Re-export models for convenience
pub use error::QueryError;
pub use models::*;

// Re-export query modules
pub use queries::{feed_queries, tweets};
