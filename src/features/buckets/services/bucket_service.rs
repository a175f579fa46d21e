use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};

use crate::core::error::{AppError, Result};
use crate::features::buckets::dtos::BucketInfoDto;
use crate::modules::storage::{ObjectStore, StorageError};
use crate::shared::validation::require_non_empty;

/// Service for bucket lifecycle operations
pub struct BucketService {
    store: Arc<dyn ObjectStore>,
    public_read_on_create: bool,
}

impl BucketService {
    pub fn new(store: Arc<dyn ObjectStore>, public_read_on_create: bool) -> Self {
        Self {
            store,
            public_read_on_create,
        }
    }

    pub async fn bucket_exists(&self, bucket_name: &str) -> Result<bool> {
        require_non_empty("bucketName", bucket_name)?;

        self.store.bucket_exists(bucket_name).await.map_err(|e| {
            AppError::storage_failure(
                format!("Failed to check if bucket exists: {}", bucket_name),
                e,
            )
        })
    }

    /// Create a bucket; an existing bucket is a conflict
    pub async fn make_bucket(&self, bucket_name: &str) -> Result<()> {
        if self.bucket_exists(bucket_name).await? {
            return Err(AppError::Conflict(format!(
                "Bucket already exists: {}",
                bucket_name
            )));
        }

        self.store
            .make_bucket(bucket_name)
            .await
            .map_err(|e| match e {
                // e.g. InvalidBucketName for names the local pattern lets through
                StorageError::Status { status: 400, message } => {
                    warn!("Store rejected bucket name '{}': {}", bucket_name, message);
                    AppError::Validation(format!(
                        "Bucket name rejected by storage (S3 names need 3-63 characters): {}",
                        bucket_name
                    ))
                }
                e => AppError::storage_failure(
                    format!("Failed to create bucket: {}", bucket_name),
                    e,
                ),
            })?;
        info!("Bucket created successfully: {}", bucket_name);

        if self.public_read_on_create {
            let policy = public_read_policy(bucket_name);
            // Creation already happened; a policy failure only degrades access
            if let Err(e) = self.store.set_bucket_policy(bucket_name, &policy).await {
                warn!(
                    "Bucket '{}' created but public-read policy was not applied: {}",
                    bucket_name, e
                );
            }
        }

        Ok(())
    }

    /// Remove an empty bucket. Returns false when there was nothing to remove.
    pub async fn remove_bucket(&self, bucket_name: &str) -> Result<bool> {
        if !self.bucket_exists(bucket_name).await? {
            warn!("Attempted to remove a non-existing bucket: {}", bucket_name);
            return Ok(false);
        }

        self.store
            .remove_bucket(bucket_name)
            .await
            .map_err(|e| {
                AppError::storage_failure(format!("Failed to remove bucket: {}", bucket_name), e)
            })?;
        info!("Bucket removed successfully: {}", bucket_name);

        Ok(true)
    }

    /// List all buckets, degrading to an empty list when the store is unreachable
    pub async fn list_buckets(&self) -> Vec<BucketInfoDto> {
        match self.store.list_buckets().await {
            Ok(buckets) => buckets.into_iter().map(Into::into).collect(),
            Err(e) => {
                tracing::error!("Failed to list buckets: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn get_bucket_policy(&self, bucket_name: &str) -> Result<String> {
        require_non_empty("bucketName", bucket_name)?;

        self.store
            .get_bucket_policy(bucket_name)
            .await
            .map_err(|e| {
                AppError::storage_failure(
                    format!("Failed to get bucket policy: {}", bucket_name),
                    e,
                )
            })
    }
}

/// Anonymous `s3:GetObject` on every object of the bucket
fn public_read_policy(bucket_name: &str) -> String {
    json!({
        "Version": "2012-10-17",
        "Statement": [
            {
                "Sid": "PublicRead",
                "Effect": "Allow",
                "Principal": "*",
                "Action": ["s3:GetObject"],
                "Resource": [format!("arn:aws:s3:::{}/*", bucket_name)]
            }
        ]
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::InMemoryStore;
    use axum::http::StatusCode;

    fn service(store: Arc<InMemoryStore>, public_read: bool) -> BucketService {
        BucketService::new(store, public_read)
    }

    #[tokio::test]
    async fn test_make_then_exists() {
        let store = Arc::new(InMemoryStore::new());
        let service = service(store, false);

        assert!(!service.bucket_exists("t1").await.unwrap());
        service.make_bucket("t1").await.unwrap();
        assert!(service.bucket_exists("t1").await.unwrap());
    }

    #[tokio::test]
    async fn test_make_existing_bucket_conflicts() {
        let store = Arc::new(InMemoryStore::new());
        let service = service(store, false);

        service.make_bucket("t1").await.unwrap();
        let err = service.make_bucket("t1").await.unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_store_rejected_bucket_name_is_validation_error() {
        let store = Arc::new(InMemoryStore::new());
        store.strict_bucket_names();
        let service = service(store.clone(), false);

        let err = service.make_bucket("t1").await.unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(!service.bucket_exists("t1").await.unwrap());
        service.make_bucket("t10").await.unwrap();
    }

    #[tokio::test]
    async fn test_make_bucket_attaches_public_read_policy() {
        let store = Arc::new(InMemoryStore::new());
        let service = service(store.clone(), true);

        service.make_bucket("pics").await.unwrap();

        let policy: serde_json::Value =
            serde_json::from_str(&service.get_bucket_policy("pics").await.unwrap()).unwrap();
        assert_eq!(policy["Statement"][0]["Action"][0], "s3:GetObject");
        assert_eq!(policy["Statement"][0]["Resource"][0], "arn:aws:s3:::pics/*");
        assert!(store.policy("pics").is_some());
    }

    #[tokio::test]
    async fn test_policy_failure_does_not_fail_creation() {
        let store = Arc::new(InMemoryStore::new());
        store.fail_policy_writes();
        let service = service(store.clone(), true);

        service.make_bucket("pics").await.unwrap();

        assert!(service.bucket_exists("pics").await.unwrap());
        assert!(store.policy("pics").is_none());
    }

    #[tokio::test]
    async fn test_remove_empty_bucket() {
        let store = Arc::new(InMemoryStore::new());
        let service = service(store, false);

        service.make_bucket("t1").await.unwrap();
        assert!(service.remove_bucket("t1").await.unwrap());
        assert!(!service.bucket_exists("t1").await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_missing_bucket_is_noop() {
        let store = Arc::new(InMemoryStore::new());
        let service = service(store, false);

        assert!(!service.remove_bucket("ghost").await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_non_empty_bucket_fails() {
        let store = Arc::new(InMemoryStore::new());
        store.insert("t1", "a.txt", b"hello", "text/plain");
        let service = service(store, false);

        let err = service.remove_bucket("t1").await.unwrap_err();
        assert!(matches!(err, AppError::StorageOperationFailed { .. }));
    }

    #[tokio::test]
    async fn test_list_buckets_degrades_to_empty() {
        let store = Arc::new(InMemoryStore::new());
        store.insert("t1", "a.txt", b"hello", "text/plain");
        let service = service(store.clone(), false);

        assert_eq!(service.list_buckets().await.len(), 1);

        store.fail_list_buckets();
        assert!(service.list_buckets().await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_policy_is_storage_failure() {
        let store = Arc::new(InMemoryStore::new());
        let service = service(store, false);
        service.make_bucket("t1").await.unwrap();

        let err = service.get_bucket_policy("t1").await.unwrap_err();
        assert!(matches!(err, AppError::StorageOperationFailed { .. }));
    }

    #[tokio::test]
    async fn test_empty_bucket_name_rejected() {
        let store = Arc::new(InMemoryStore::new());
        let service = service(store, false);

        assert!(matches!(
            service.bucket_exists("").await,
            Err(AppError::Validation(_))
        ));
    }
}
