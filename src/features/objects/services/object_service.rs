use std::path::Path;
use std::sync::Arc;

use axum::body::Bytes;
use tracing::{debug, info, warn};

use crate::core::error::{AppError, Result};
use crate::features::objects::dtos::{DeleteErrorDto, ObjectInfoDto};
use crate::modules::storage::{ObjectStat, ObjectStore, PresignMethod};
use crate::shared::constants::{
    DEFAULT_CONTENT_TYPE, DEFAULT_EXPIRY_MINUTES, MAX_PRESIGNED_EXPIRY_SECS,
};
use crate::shared::download::{fixed_chunks, Attachment};
use crate::shared::validation::require_non_empty;

/// One file part of an upload request
#[derive(Debug, Clone)]
pub struct UploadFile {
    /// Original file name; entries without one are skipped
    pub name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Service for object operations within a bucket
pub struct ObjectService {
    store: Arc<dyn ObjectStore>,
    max_expiry_secs: u32,
}

impl ObjectService {
    pub fn new(store: Arc<dyn ObjectStore>, max_expiry_secs: u32) -> Self {
        Self {
            store,
            max_expiry_secs: max_expiry_secs.min(MAX_PRESIGNED_EXPIRY_SECS),
        }
    }

    /// Presigned URL lifetime for a request given in minutes
    pub fn expiry_seconds(&self, minutes: u32) -> u32 {
        minutes.saturating_mul(60).min(self.max_expiry_secs)
    }

    /// Upload files under their original names
    ///
    /// # Returns
    /// The stored object names, in request order
    pub async fn upload(&self, bucket_name: &str, files: Vec<UploadFile>) -> Result<Vec<String>> {
        require_non_empty("bucketName", bucket_name)?;
        if files.is_empty() {
            return Err(AppError::Validation(
                "At least one file is required".to_string(),
            ));
        }
        self.ensure_bucket(bucket_name).await?;

        let mut uploaded = Vec::with_capacity(files.len());
        for file in files {
            let Some(name) = file.name.filter(|n| !n.trim().is_empty()) else {
                warn!("Skipping upload entry without a file name");
                continue;
            };
            let content_type = file
                .content_type
                .filter(|ct| !ct.is_empty())
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
            let size = file.data.len();

            self.store
                .put_object(bucket_name, &name, file.data, &content_type)
                .await
                .map_err(|e| {
                    AppError::storage_failure(format!("Failed to upload file: {}", name), e)
                })?;

            debug!(
                "Uploaded '{}' ({} bytes, {}) to bucket '{}'",
                name, size, content_type, bucket_name
            );
            uploaded.push(name);
        }

        info!(
            "Uploaded {} file(s) to bucket '{}'",
            uploaded.len(),
            bucket_name
        );
        Ok(uploaded)
    }

    /// Delete one object. Returns false when there was nothing to delete.
    pub async fn remove_object(&self, bucket_name: &str, object_name: &str) -> Result<bool> {
        if self.stat(bucket_name, object_name).await?.is_none() {
            warn!(
                "Attempted to remove a non-existing object: {}/{}",
                bucket_name, object_name
            );
            return Ok(false);
        }

        self.store
            .remove_object(bucket_name, object_name)
            .await
            .map_err(|e| {
                AppError::storage_failure(
                    format!("Failed to remove object: {}/{}", bucket_name, object_name),
                    e,
                )
            })?;
        info!("Object removed: {}/{}", bucket_name, object_name);

        Ok(true)
    }

    /// Best-effort batch delete
    ///
    /// Every name is attempted; failures are collected instead of aborting.
    pub async fn remove_objects(
        &self,
        bucket_name: &str,
        object_names: &[String],
    ) -> Result<Vec<DeleteErrorDto>> {
        self.ensure_bucket(bucket_name).await?;

        let mut failures = Vec::new();
        for object_name in object_names {
            if object_name.trim().is_empty() {
                failures.push(DeleteErrorDto {
                    object_name: object_name.clone(),
                    message: "objectName must not be empty".to_string(),
                });
                continue;
            }

            if let Err(e) = self.store.remove_object(bucket_name, object_name).await {
                tracing::error!(
                    "Failed to remove object {}/{}: {}",
                    bucket_name,
                    object_name,
                    e
                );
                failures.push(DeleteErrorDto {
                    object_name: object_name.clone(),
                    message: e.to_string(),
                });
            }
        }

        info!(
            "Batch delete in '{}': {} requested, {} failed",
            bucket_name,
            object_names.len(),
            failures.len()
        );
        Ok(failures)
    }

    /// Open an object for streaming in fixed-size chunks
    pub async fn download(&self, bucket_name: &str, object_name: &str) -> Result<Attachment> {
        let stat = self.require_object(bucket_name, object_name).await?;

        let stream = self
            .store
            .get_object(bucket_name, object_name)
            .await
            .map_err(|e| {
                AppError::storage_failure(
                    format!("Failed to download file: {}/{}", bucket_name, object_name),
                    e,
                )
            })?;

        let file_name = object_name
            .rsplit('/')
            .find(|segment| !segment.is_empty())
            .unwrap_or(object_name)
            .to_string();

        Ok(Attachment {
            file_name,
            content_type: stat
                .content_type
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
            content_length: Some(stat.size),
            last_modified: stat.last_modified,
            body: fixed_chunks(stream),
        })
    }

    /// Write an object to a file on the gateway host
    ///
    /// # Returns
    /// The number of bytes written
    pub async fn download_to_local(
        &self,
        bucket_name: &str,
        object_name: &str,
        local_file: &str,
    ) -> Result<u64> {
        require_non_empty("localFile", local_file)?;
        self.require_object(bucket_name, object_name).await?;

        let written = self
            .store
            .download_object(bucket_name, object_name, Path::new(local_file))
            .await
            .map_err(|e| {
                AppError::storage_failure(
                    format!(
                        "Failed to download {}/{} to {}",
                        bucket_name, object_name, local_file
                    ),
                    e,
                )
            })?;
        info!(
            "Downloaded {}/{} to {} ({} bytes)",
            bucket_name, object_name, local_file, written
        );

        Ok(written)
    }

    /// Non-recursive listing; prefixes come back as directories
    pub async fn list_objects(
        &self,
        bucket_name: &str,
        prefix: Option<&str>,
    ) -> Result<Vec<ObjectInfoDto>> {
        self.ensure_bucket(bucket_name).await?;

        let prefix = prefix.filter(|p| !p.is_empty());
        let entries = self
            .store
            .list_objects(bucket_name, prefix)
            .await
            .map_err(|e| {
                AppError::storage_failure(
                    format!("Failed to list objects in bucket: {}", bucket_name),
                    e,
                )
            })?;

        Ok(entries.into_iter().map(Into::into).collect())
    }

    /// Presigned GET URL for an existing object
    pub async fn get_object_url(
        &self,
        bucket_name: &str,
        object_name: &str,
        expires_minutes: Option<u32>,
    ) -> Result<String> {
        let expiry = self.resolve_expiry(expires_minutes)?;
        self.require_object(bucket_name, object_name).await?;

        self.presign(PresignMethod::Get, bucket_name, object_name, expiry)
            .await
    }

    /// Presigned PUT URL for uploading into an existing bucket
    pub async fn create_upload_url(
        &self,
        bucket_name: &str,
        object_name: &str,
        expires_minutes: Option<u32>,
    ) -> Result<String> {
        let expiry = self.resolve_expiry(expires_minutes)?;
        require_non_empty("objectName", object_name)?;
        self.ensure_bucket(bucket_name).await?;

        self.presign(PresignMethod::Put, bucket_name, object_name, expiry)
            .await
    }

    fn resolve_expiry(&self, expires_minutes: Option<u32>) -> Result<u32> {
        let minutes = expires_minutes.unwrap_or(DEFAULT_EXPIRY_MINUTES);
        if minutes == 0 {
            return Err(AppError::Validation(
                "expires must be at least 1 minute".to_string(),
            ));
        }
        Ok(self.expiry_seconds(minutes))
    }

    async fn presign(
        &self,
        method: PresignMethod,
        bucket_name: &str,
        object_name: &str,
        expiry_secs: u32,
    ) -> Result<String> {
        self.store
            .presigned_url(method, bucket_name, object_name, expiry_secs)
            .await
            .map_err(|e| {
                AppError::storage_failure(
                    format!(
                        "Failed to generate presigned URL: {}/{}",
                        bucket_name, object_name
                    ),
                    e,
                )
            })
    }

    /// Fail with a 404 storage error unless the bucket exists
    async fn ensure_bucket(&self, bucket_name: &str) -> Result<()> {
        require_non_empty("bucketName", bucket_name)?;

        let exists = self.store.bucket_exists(bucket_name).await.map_err(|e| {
            AppError::storage_failure(
                format!("Failed to check if bucket exists: {}", bucket_name),
                e,
            )
        })?;

        if exists {
            Ok(())
        } else {
            Err(AppError::not_found(format!(
                "Bucket does not exist: {}",
                bucket_name
            )))
        }
    }

    async fn stat(&self, bucket_name: &str, object_name: &str) -> Result<Option<ObjectStat>> {
        require_non_empty("bucketName", bucket_name)?;
        require_non_empty("objectName", object_name)?;

        self.store
            .stat_object(bucket_name, object_name)
            .await
            .map_err(|e| {
                AppError::storage_failure(
                    format!("Failed to stat object: {}/{}", bucket_name, object_name),
                    e,
                )
            })
    }

    async fn require_object(&self, bucket_name: &str, object_name: &str) -> Result<ObjectStat> {
        self.stat(bucket_name, object_name).await?.ok_or_else(|| {
            AppError::not_found(format!(
                "Object does not exist: {}/{}",
                bucket_name, object_name
            ))
        })
    }
}
