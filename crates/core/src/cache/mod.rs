//! SQLite-backed store of versioned cache buckets.
//!
//! Each bucket is identified by a version string and maps a request identity
//! (method + canonical URL, hashed with SHA-256) to the last stored response.
//! It supports:
//!
//! - Creating, listing, and deleting buckets (entries cascade)
//! - Upserting single responses and all-or-nothing batches
//! - Matching a request in one bucket or across all of them
//! - Automatic schema migrations and WAL mode

pub mod buckets;
pub mod connection;
pub mod entries;
pub mod hash;
pub mod migrations;

pub use crate::Error;

pub use buckets::BucketSummary;
pub use connection::CacheDb;
