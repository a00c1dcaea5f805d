//! Bucket lifecycle operations.
//!
//! A bucket is created on first install (or version bump), filled as
//! requests succeed, and deleted once a newer version activates.

use super::connection::CacheDb;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::{self, OptionalExtension};

/// Name, size, and age of a bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct BucketSummary {
    pub name: String,
    pub entries: u64,
    pub created_at: String,
}

/// Look up a bucket id, creating the bucket if it doesn't exist.
pub(crate) fn ensure_bucket(conn: &rusqlite::Connection, name: &str) -> Result<i64, rusqlite::Error> {
    conn.execute(
        "INSERT INTO buckets (name, created_at) VALUES (?1, ?2) ON CONFLICT(name) DO NOTHING",
        params![name, chrono::Utc::now().to_rfc3339()],
    )?;
    conn.query_row("SELECT id FROM buckets WHERE name = ?1", params![name], |row| row.get(0))
}

fn find_bucket(conn: &rusqlite::Connection, name: &str) -> Result<Option<i64>, rusqlite::Error> {
    conn.query_row("SELECT id FROM buckets WHERE name = ?1", params![name], |row| row.get(0))
        .optional()
}

impl CacheDb {
    /// Open a bucket by name, creating it if needed.
    ///
    /// Opening an existing bucket leaves its entries untouched.
    pub async fn open_bucket(&self, name: &str) -> Result<(), Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                ensure_bucket(conn, &name)?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Check whether a bucket exists.
    pub async fn has_bucket(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> { Ok(find_bucket(conn, &name)?.is_some()) })
            .await
            .map_err(Error::from)
    }

    /// List bucket names in creation order.
    pub async fn bucket_names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM buckets ORDER BY id ASC")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a bucket and all its entries.
    ///
    /// Returns false if no bucket had that name.
    pub async fn delete_bucket(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute("DELETE FROM buckets WHERE name = ?1", params![name])?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Summaries of every bucket in creation order.
    pub async fn bucket_summaries(&self) -> Result<Vec<BucketSummary>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<BucketSummary>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT b.name, COUNT(e.request_key), b.created_at
                     FROM buckets b LEFT JOIN entries e ON e.bucket_id = b.id
                     GROUP BY b.id ORDER BY b.id ASC",
                )?;
                let summaries = stmt
                    .query_map([], |row| {
                        Ok(BucketSummary {
                            name: row.get(0)?,
                            entries: row.get::<_, i64>(1)? as u64,
                            created_at: row.get(2)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(summaries)
            })
            .await
            .map_err(Error::from)
    }
}
