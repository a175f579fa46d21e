//! Storage module for bucket and object management
//!
//! Exposes the `ObjectStore` port and its MinIO/S3-compatible implementation.

mod minio_client;
mod sigv4;
mod store;

pub use minio_client::MinIOClient;
pub use store::{
    BucketEntry, ObjectEntry, ObjectStat, ObjectStore, ObjectStream, PresignMethod, StorageError,
};
