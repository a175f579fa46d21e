//! Object store port
//!
//! The facade services depend on this trait only. `MinIOClient` is the
//! production implementation; tests use an in-memory store.

use std::path::Path;

use async_trait::async_trait;
use axum::body::Bytes;
use chrono::{DateTime, NaiveDateTime, Utc};
use futures::stream::BoxStream;
use s3::error::S3Error;
use thiserror::Error;

/// Errors raised by an object store implementation
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("S3 client error: {0}")]
    Client(#[from] S3Error),

    #[error("Unexpected status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl StorageError {
    /// Non-2xx status reported by the store
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        StorageError::Status {
            status,
            message: message.into(),
        }
    }
}

/// A bucket as reported by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketEntry {
    pub name: String,
    pub creation_date: Option<DateTime<Utc>>,
}

/// One entry of a (non-recursive) object listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEntry {
    pub key: String,
    pub size: u64,
    pub last_modified: Option<DateTime<Utc>>,
    pub owner: Option<String>,
    /// Common prefix ("directory") rather than a stored object
    pub is_prefix: bool,
}

/// Object metadata from a HEAD request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectStat {
    pub size: u64,
    pub content_type: Option<String>,
    pub last_modified: Option<DateTime<Utc>>,
}

/// HTTP verb a presigned URL is valid for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresignMethod {
    Get,
    Put,
}

/// Object body as a stream of chunks
pub type ObjectStream = BoxStream<'static, std::io::Result<Bytes>>;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool, StorageError>;

    async fn make_bucket(&self, bucket: &str) -> Result<(), StorageError>;

    async fn remove_bucket(&self, bucket: &str) -> Result<(), StorageError>;

    async fn list_buckets(&self) -> Result<Vec<BucketEntry>, StorageError>;

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError>;

    /// `Ok(None)` when the object (or its bucket) does not exist
    async fn stat_object(&self, bucket: &str, key: &str)
        -> Result<Option<ObjectStat>, StorageError>;

    async fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectStream, StorageError>;

    /// Write the object to a local file, returning the number of bytes written
    async fn download_object(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
    ) -> Result<u64, StorageError>;

    async fn remove_object(&self, bucket: &str, key: &str) -> Result<(), StorageError>;

    async fn list_objects(
        &self,
        bucket: &str,
        prefix: Option<&str>,
    ) -> Result<Vec<ObjectEntry>, StorageError>;

    async fn get_bucket_policy(&self, bucket: &str) -> Result<String, StorageError>;

    async fn set_bucket_policy(&self, bucket: &str, policy: &str) -> Result<(), StorageError>;

    async fn presigned_url(
        &self,
        method: PresignMethod,
        bucket: &str,
        key: &str,
        expiry_secs: u32,
    ) -> Result<String, StorageError>;
}

/// Parse the timestamp formats S3-compatible servers emit
///
/// Listings use RFC 3339, HEAD responses use RFC 2822 (`Last-Modified`),
/// and some client types render as `2024-01-02 03:04:05 UTC`.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = DateTime::parse_from_rfc2822(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f UTC")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();

        assert_eq!(parse_timestamp("2024-01-02T03:04:05.000Z"), Some(expected));
        assert_eq!(
            parse_timestamp("Tue, 02 Jan 2024 03:04:05 GMT"),
            Some(expected)
        );
        assert_eq!(parse_timestamp("2024-01-02 03:04:05 UTC"), Some(expected));
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("yesterday"), None);
    }
}
