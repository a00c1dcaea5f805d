//! Stored request/response pairs.
//!
//! Provides functions for storing, matching, and deleting responses within
//! a bucket. Storing into a bucket that doesn't exist yet creates it.

use super::buckets::ensure_bucket;
use super::connection::CacheDb;
use super::hash::compute_request_key;
use crate::{Error, Request, Response};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::{self, OptionalExtension};

/// Columns needed to rebuild a `Response`, in `decode_row` order.
const RESPONSE_COLUMNS: &str = "response_url, status, status_text, headers_json, body, response_type";

struct RawRow {
    url: String,
    status: i64,
    status_text: String,
    headers_json: String,
    body: Vec<u8>,
    response_type: String,
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
    Ok(RawRow {
        url: row.get(0)?,
        status: row.get(1)?,
        status_text: row.get(2)?,
        headers_json: row.get(3)?,
        body: row.get(4)?,
        response_type: row.get(5)?,
    })
}

fn decode_row(raw: RawRow) -> Result<Response, Error> {
    let headers: Vec<(String, String)> =
        serde_json::from_str(&raw.headers_json).map_err(|e| Error::CorruptEntry(format!("headers: {e}")))?;
    let status = u16::try_from(raw.status).map_err(|_| Error::CorruptEntry(format!("status {}", raw.status)))?;

    Ok(Response {
        url: raw.url,
        status,
        status_text: raw.status_text,
        headers,
        body: raw.body,
        response_type: raw.response_type.parse()?,
    })
}

fn insert_entry(
    conn: &rusqlite::Connection, bucket_id: i64, request: &Request, response: &Response,
) -> Result<(), Error> {
    let url = request.url.to_string();
    let key = compute_request_key(&request.method, &url);
    let headers_json =
        serde_json::to_string(&response.headers).map_err(|e| Error::InvalidInput(format!("headers: {e}")))?;

    conn.execute(
        "INSERT INTO entries (
            bucket_id, request_key, method, url, response_url, status, status_text,
            headers_json, body, response_type, stored_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        ON CONFLICT(bucket_id, request_key) DO UPDATE SET
            response_url = excluded.response_url,
            status = excluded.status,
            status_text = excluded.status_text,
            headers_json = excluded.headers_json,
            body = excluded.body,
            response_type = excluded.response_type,
            stored_at = excluded.stored_at",
        params![
            bucket_id,
            key,
            &request.method,
            url,
            &response.url,
            response.status as i64,
            &response.status_text,
            headers_json,
            &response.body,
            response.response_type.as_str(),
            chrono::Utc::now().to_rfc3339(),
        ],
    )?;
    Ok(())
}

impl CacheDb {
    /// Store a response for a request, replacing any earlier one.
    pub async fn put_entry(&self, bucket: &str, request: &Request, response: &Response) -> Result<(), Error> {
        let bucket = bucket.to_string();
        let request = request.clone();
        let response = response.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let bucket_id = ensure_bucket(conn, &bucket)?;
                insert_entry(conn, bucket_id, &request, &response)
            })
            .await
            .map_err(Error::from)
    }

    /// Store a batch of responses in one transaction.
    ///
    /// Either every pair is stored or none is.
    pub async fn put_entries(&self, bucket: &str, pairs: Vec<(Request, Response)>) -> Result<(), Error> {
        let bucket = bucket.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                let bucket_id = ensure_bucket(&tx, &bucket)?;
                for (request, response) in &pairs {
                    insert_entry(&tx, bucket_id, request, response)?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Find the stored response for a request in one bucket.
    ///
    /// Returns None if the bucket or the entry doesn't exist.
    pub async fn match_entry(&self, bucket: &str, request: &Request) -> Result<Option<Response>, Error> {
        let bucket = bucket.to_string();
        let key = compute_request_key(&request.method, request.url.as_str());
        self.conn
            .call(move |conn| -> Result<Option<Response>, Error> {
                let raw = conn
                    .query_row(
                        &format!(
                            "SELECT {RESPONSE_COLUMNS} FROM entries e JOIN buckets b ON b.id = e.bucket_id
                             WHERE b.name = ?1 AND e.request_key = ?2"
                        ),
                        params![bucket, key],
                        read_row,
                    )
                    .optional()?;
                raw.map(decode_row).transpose()
            })
            .await
            .map_err(Error::from)
    }

    /// Request URLs stored in a bucket, sorted.
    pub async fn entry_urls(&self, bucket: &str) -> Result<Vec<String>, Error> {
        let bucket = bucket.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT e.url FROM entries e JOIN buckets b ON b.id = e.bucket_id
                     WHERE b.name = ?1 ORDER BY e.url ASC",
                )?;
                let urls = stmt
                    .query_map(params![bucket], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(urls)
            })
            .await
            .map_err(Error::from)
    }
}
