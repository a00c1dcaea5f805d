//! Core types and shared functionality for precache.
//!
//! This crate provides:
//! - Versioned cache buckets with a SQLite backend
//! - Request and response values shared by the worker and the store
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod http;

pub use cache::{BucketSummary, CacheDb};
pub use config::AppConfig;
pub use error::Error;
pub use http::{Request, Response, ResponseType};
