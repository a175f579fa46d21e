//! MinIO/S3-compatible storage client
//!
//! Bucket and object operations go through the rust-s3 crate. Bucket policy
//! requests, which rust-s3 does not cover, are signed by hand with AWS
//! Signature v4.

use std::path::Path;

use async_trait::async_trait;
use axum::body::Bytes;
use futures::TryStreamExt;
use reqwest::{Method, Url};
use s3::creds::Credentials;
use s3::{Bucket, BucketConfiguration, Region};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use super::sigv4::SigV4Signer;
use super::store::{
    parse_timestamp, BucketEntry, ObjectEntry, ObjectStat, ObjectStore, ObjectStream,
    PresignMethod, StorageError,
};
use crate::core::config::MinIOConfig;

/// [`ObjectStore`] backed by a MinIO (or other S3-compatible) server
pub struct MinIOClient {
    endpoint: String,
    region: Region,
    credentials: Credentials,
    signer: SigV4Signer,
    /// `host[:port]` as sent in the signed Host header
    host: String,
    http: reqwest::Client,
}

impl MinIOClient {
    /// No request is made here; the first storage call opens the connection.
    pub fn new(config: MinIOConfig) -> Result<Self, StorageError> {
        let url = Url::parse(&config.endpoint)
            .map_err(|e| StorageError::Other(format!("invalid MinIO endpoint: {}", e)))?;
        let host = match (url.host_str(), url.port()) {
            (Some(h), Some(port)) => format!("{h}:{port}"),
            (Some(h), None) => h.to_string(),
            (None, _) => {
                return Err(StorageError::Other(format!(
                    "MinIO endpoint has no host: {}",
                    config.endpoint
                )))
            }
        };

        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| StorageError::Other(format!("invalid MinIO credentials: {}", e)))?;

        info!(
            "MinIO endpoint {} (region {})",
            config.endpoint, config.region
        );

        Ok(Self {
            signer: SigV4Signer::s3(&config.access_key, &config.secret_key, &config.region),
            region: Region::Custom {
                region: config.region,
                endpoint: config.endpoint.clone(),
            },
            endpoint: config.endpoint,
            credentials,
            host,
            http: reqwest::Client::builder().build()?,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Path-style bucket handle (`http://endpoint/bucket`)
    fn bucket(&self, name: &str) -> Result<Box<Bucket>, StorageError> {
        let mut bucket = Bucket::new(name, self.region.clone(), self.credentials.clone())?;
        bucket.set_path_style();
        Ok(bucket)
    }

    /// GET or PUT `/{bucket}?policy`, returning the response body on success
    async fn policy_call(
        &self,
        method: Method,
        bucket: &str,
        document: Option<&str>,
    ) -> Result<String, StorageError> {
        let payload = document.unwrap_or_default();
        let signed = self.signer.sign(
            method.as_str(),
            &self.host,
            &format!("/{bucket}"),
            "policy=",
            payload.as_bytes(),
            chrono::Utc::now(),
        )?;

        let mut request = self
            .http
            .request(method, format!("{}/{}?policy", self.endpoint, bucket))
            .header("x-amz-date", signed.amz_date)
            .header("x-amz-content-sha256", signed.content_sha256)
            .header(reqwest::header::AUTHORIZATION, signed.authorization);
        if let Some(document) = document {
            request = request
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(document.to_string());
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        check_status(status, body.as_bytes())?;
        Ok(body)
    }
}

/// Map a non-2xx status to an error carrying the response body
fn check_status(status: u16, body: &[u8]) -> Result<(), StorageError> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(StorageError::status(
            status,
            String::from_utf8_lossy(body).into_owned(),
        ))
    }
}

#[async_trait]
impl ObjectStore for MinIOClient {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool, StorageError> {
        Ok(self.bucket(bucket)?.exists().await?)
    }

    async fn make_bucket(&self, bucket: &str) -> Result<(), StorageError> {
        let response = Bucket::create_with_path_style(
            bucket,
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await?;

        if !response.success() {
            return Err(StorageError::status(
                response.response_code,
                response.response_text,
            ));
        }

        debug!("Bucket '{}' created", bucket);
        Ok(())
    }

    async fn remove_bucket(&self, bucket: &str) -> Result<(), StorageError> {
        let status = self.bucket(bucket)?.delete().await?;
        check_status(status, b"")?;

        debug!("Bucket '{}' removed", bucket);
        Ok(())
    }

    async fn list_buckets(&self) -> Result<Vec<BucketEntry>, StorageError> {
        let response = Bucket::list_buckets(self.region.clone(), self.credentials.clone()).await?;

        Ok(response
            .buckets
            .bucket
            .into_iter()
            .map(|b| BucketEntry {
                creation_date: parse_timestamp(&b.creation_date.to_string()),
                name: b.name,
            })
            .collect())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let response = self
            .bucket(bucket)?
            .put_object_with_content_type(key, &data, content_type)
            .await?;
        check_status(response.status_code(), response.bytes())?;

        debug!("Uploaded object '{}' to bucket '{}'", key, bucket);
        Ok(())
    }

    async fn stat_object(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<Option<ObjectStat>, StorageError> {
        match self.bucket(bucket)?.head_object(key).await {
            Ok((head, status)) if (200..300).contains(&status) => Ok(Some(ObjectStat {
                size: head.content_length.unwrap_or(0).max(0) as u64,
                content_type: head.content_type,
                last_modified: head.last_modified.as_deref().and_then(parse_timestamp),
            })),
            Ok((_, 404)) => Ok(None),
            Ok((_, status)) => Err(StorageError::status(
                status,
                format!("HEAD {}/{} failed", bucket, key),
            )),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectStream, StorageError> {
        let response = self.bucket(bucket)?.get_object_stream(key).await?;
        check_status(response.status_code, b"")?;

        let stream = response
            .bytes
            .map_err(|e| std::io::Error::other(e.to_string()));
        Ok(Box::pin(stream))
    }

    async fn download_object(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
    ) -> Result<u64, StorageError> {
        let mut file = tokio::fs::File::create(path).await?;
        let written = async {
            let status = self
                .bucket(bucket)?
                .get_object_to_writer(key, &mut file)
                .await?;
            check_status(status, b"")?;
            file.flush().await?;
            Ok::<u64, StorageError>(file.metadata().await?.len())
        }
        .await;

        // Partial files never outlive a failed download
        if written.is_err() {
            drop(file);
            if let Err(e) = tokio::fs::remove_file(path).await {
                warn!("Failed to remove partial download {}: {}", path.display(), e);
            }
        }
        written
    }

    async fn remove_object(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        let response = self.bucket(bucket)?.delete_object(key).await?;
        check_status(response.status_code(), response.bytes())?;

        debug!("Deleted object '{}' from bucket '{}'", key, bucket);
        Ok(())
    }

    async fn list_objects(
        &self,
        bucket: &str,
        prefix: Option<&str>,
    ) -> Result<Vec<ObjectEntry>, StorageError> {
        let results = self
            .bucket(bucket)?
            .list(
                prefix.unwrap_or_default().to_string(),
                Some("/".to_string()),
            )
            .await?;

        let mut entries = Vec::new();
        for page in results {
            for common in page.common_prefixes.into_iter().flatten() {
                entries.push(ObjectEntry {
                    key: common.prefix,
                    size: 0,
                    last_modified: None,
                    owner: None,
                    is_prefix: true,
                });
            }
            for object in page.contents {
                entries.push(ObjectEntry {
                    last_modified: parse_timestamp(&object.last_modified),
                    owner: object.owner.and_then(|o| o.display_name),
                    size: object.size as u64,
                    key: object.key,
                    is_prefix: false,
                });
            }
        }

        Ok(entries)
    }

    async fn get_bucket_policy(&self, bucket: &str) -> Result<String, StorageError> {
        self.policy_call(Method::GET, bucket, None).await
    }

    async fn set_bucket_policy(&self, bucket: &str, policy: &str) -> Result<(), StorageError> {
        self.policy_call(Method::PUT, bucket, Some(policy)).await?;
        info!("Policy applied to bucket '{}'", bucket);
        Ok(())
    }

    async fn presigned_url(
        &self,
        method: PresignMethod,
        bucket: &str,
        key: &str,
        expiry_secs: u32,
    ) -> Result<String, StorageError> {
        let bucket = self.bucket(bucket)?;
        let url = match method {
            PresignMethod::Get => bucket.presign_get(key, expiry_secs, None).await?,
            PresignMethod::Put => bucket.presign_put(key, expiry_secs, None, None).await?,
        };
        Ok(url)
    }
}
