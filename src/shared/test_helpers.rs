#[cfg(test)]
use std::{
    collections::BTreeMap,
    path::Path,
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex,
    },
};

#[cfg(test)]
use async_trait::async_trait;
#[cfg(test)]
use axum::body::Bytes;
#[cfg(test)]
use chrono::{DateTime, Utc};

#[cfg(test)]
use crate::modules::storage::{
    BucketEntry, ObjectEntry, ObjectStat, ObjectStore, ObjectStream, PresignMethod, StorageError,
};

#[cfg(test)]
#[derive(Clone)]
struct StoredObject {
    data: Bytes,
    content_type: String,
    last_modified: DateTime<Utc>,
}

#[cfg(test)]
struct StoredBucket {
    created_at: DateTime<Utc>,
    policy: Option<String>,
    objects: BTreeMap<String, StoredObject>,
}

/// `ObjectStore` kept in process memory, with S3-like listing semantics
#[cfg(test)]
#[derive(Default)]
pub struct InMemoryStore {
    buckets: Mutex<BTreeMap<String, StoredBucket>>,
    fail_list_buckets: AtomicBool,
    fail_policy_writes: AtomicBool,
    strict_bucket_names: AtomicBool,
}

#[cfg(test)]
#[allow(dead_code)]
impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `list_buckets` return an error from now on
    pub fn fail_list_buckets(&self) {
        self.fail_list_buckets.store(true, Ordering::SeqCst);
    }

    /// Make `set_bucket_policy` return an error from now on
    pub fn fail_policy_writes(&self) {
        self.fail_policy_writes.store(true, Ordering::SeqCst);
    }

    /// Reject bucket names shorter than 3 characters, as MinIO does
    pub fn strict_bucket_names(&self) {
        self.strict_bucket_names.store(true, Ordering::SeqCst);
    }

    pub fn policy(&self, bucket: &str) -> Option<String> {
        self.buckets
            .lock()
            .unwrap()
            .get(bucket)
            .and_then(|b| b.policy.clone())
    }

    pub fn object_keys(&self, bucket: &str) -> Vec<String> {
        self.buckets
            .lock()
            .unwrap()
            .get(bucket)
            .map(|b| b.objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Seed a bucket and object without going through the service layer
    pub fn insert(&self, bucket: &str, key: &str, data: &[u8], content_type: &str) {
        let mut buckets = self.buckets.lock().unwrap();
        let entry = buckets
            .entry(bucket.to_string())
            .or_insert_with(|| StoredBucket {
                created_at: Utc::now(),
                policy: None,
                objects: BTreeMap::new(),
            });
        entry.objects.insert(
            key.to_string(),
            StoredObject {
                data: Bytes::copy_from_slice(data),
                content_type: content_type.to_string(),
                last_modified: Utc::now(),
            },
        );
    }

    fn object(&self, bucket: &str, key: &str) -> Result<StoredObject, StorageError> {
        let buckets = self.buckets.lock().unwrap();
        let bucket = buckets
            .get(bucket)
            .ok_or_else(|| StorageError::status(404, "NoSuchBucket"))?;
        bucket
            .objects
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::status(404, "NoSuchKey"))
    }
}

#[cfg(test)]
#[async_trait]
impl ObjectStore for InMemoryStore {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool, StorageError> {
        Ok(self.buckets.lock().unwrap().contains_key(bucket))
    }

    async fn make_bucket(&self, bucket: &str) -> Result<(), StorageError> {
        if self.strict_bucket_names.load(Ordering::SeqCst) && bucket.len() < 3 {
            return Err(StorageError::status(400, "InvalidBucketName"));
        }
        let mut buckets = self.buckets.lock().unwrap();
        if buckets.contains_key(bucket) {
            return Err(StorageError::status(409, "BucketAlreadyOwnedByYou"));
        }
        buckets.insert(
            bucket.to_string(),
            StoredBucket {
                created_at: Utc::now(),
                policy: None,
                objects: BTreeMap::new(),
            },
        );
        Ok(())
    }

    async fn remove_bucket(&self, bucket: &str) -> Result<(), StorageError> {
        let mut buckets = self.buckets.lock().unwrap();
        match buckets.get(bucket) {
            None => Err(StorageError::status(404, "NoSuchBucket")),
            Some(b) if !b.objects.is_empty() => Err(StorageError::status(409, "BucketNotEmpty")),
            Some(_) => {
                buckets.remove(bucket);
                Ok(())
            }
        }
    }

    async fn list_buckets(&self) -> Result<Vec<BucketEntry>, StorageError> {
        if self.fail_list_buckets.load(Ordering::SeqCst) {
            return Err(StorageError::Other("connection refused".to_string()));
        }
        Ok(self
            .buckets
            .lock()
            .unwrap()
            .iter()
            .map(|(name, b)| BucketEntry {
                name: name.clone(),
                creation_date: Some(b.created_at),
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
        let mut buckets = self.buckets.lock().unwrap();
        let bucket = buckets
            .get_mut(bucket)
            .ok_or_else(|| StorageError::status(404, "NoSuchBucket"))?;
        bucket.objects.insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
                last_modified: Utc::now(),
            },
        );
        Ok(())
    }

    async fn stat_object(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<Option<ObjectStat>, StorageError> {
        Ok(self.object(bucket, key).ok().map(|o| ObjectStat {
            size: o.data.len() as u64,
            content_type: Some(o.content_type),
            last_modified: Some(o.last_modified),
        }))
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectStream, StorageError> {
        let object = self.object(bucket, key)?;

        // Odd chunk size so re-chunking is observable
        let chunks: Vec<std::io::Result<Bytes>> = object
            .data
            .chunks(3000)
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();
        Ok(Box::pin(futures::stream::iter(chunks)))
    }

    async fn download_object(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
    ) -> Result<u64, StorageError> {
        let object = self.object(bucket, key)?;
        tokio::fs::write(path, &object.data).await?;
        Ok(object.data.len() as u64)
    }

    async fn remove_object(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        let mut buckets = self.buckets.lock().unwrap();
        let bucket = buckets
            .get_mut(bucket)
            .ok_or_else(|| StorageError::status(404, "NoSuchBucket"))?;
        // S3 deletes are idempotent
        bucket.objects.remove(key);
        Ok(())
    }

    async fn list_objects(
        &self,
        bucket: &str,
        prefix: Option<&str>,
    ) -> Result<Vec<ObjectEntry>, StorageError> {
        let buckets = self.buckets.lock().unwrap();
        let bucket = buckets
            .get(bucket)
            .ok_or_else(|| StorageError::status(404, "NoSuchBucket"))?;
        let prefix = prefix.unwrap_or_default();

        let mut prefixes: Vec<String> = Vec::new();
        let mut entries = Vec::new();
        for (key, object) in bucket.objects.range(prefix.to_string()..) {
            let Some(rest) = key.strip_prefix(prefix) else {
                break;
            };
            match rest.find('/') {
                Some(idx) => {
                    let common = format!("{}{}", prefix, &rest[..=idx]);
                    if !prefixes.contains(&common) {
                        prefixes.push(common);
                    }
                }
                None => entries.push(ObjectEntry {
                    key: key.clone(),
                    size: object.data.len() as u64,
                    last_modified: Some(object.last_modified),
                    owner: Some("minio".to_string()),
                    is_prefix: false,
                }),
            }
        }

        let mut listing: Vec<ObjectEntry> = prefixes
            .into_iter()
            .map(|key| ObjectEntry {
                key,
                size: 0,
                last_modified: None,
                owner: None,
                is_prefix: true,
            })
            .collect();
        listing.extend(entries);
        Ok(listing)
    }

    async fn get_bucket_policy(&self, bucket: &str) -> Result<String, StorageError> {
        let buckets = self.buckets.lock().unwrap();
        let bucket = buckets
            .get(bucket)
            .ok_or_else(|| StorageError::status(404, "NoSuchBucket"))?;
        bucket
            .policy
            .clone()
            .ok_or_else(|| StorageError::status(404, "NoSuchBucketPolicy"))
    }

    async fn set_bucket_policy(&self, bucket: &str, policy: &str) -> Result<(), StorageError> {
        if self.fail_policy_writes.load(Ordering::SeqCst) {
            return Err(StorageError::status(403, "AccessDenied"));
        }
        let mut buckets = self.buckets.lock().unwrap();
        let bucket = buckets
            .get_mut(bucket)
            .ok_or_else(|| StorageError::status(404, "NoSuchBucket"))?;
        bucket.policy = Some(policy.to_string());
        Ok(())
    }

    async fn presigned_url(
        &self,
        method: PresignMethod,
        bucket: &str,
        key: &str,
        expiry_secs: u32,
    ) -> Result<String, StorageError> {
        let verb = match method {
            PresignMethod::Get => "GET",
            PresignMethod::Put => "PUT",
        };
        Ok(format!(
            "http://localhost:9000/{}/{}?X-Amz-Expires={}&X-Test-Method={}",
            bucket, key, expiry_secs, verb
        ))
    }
}
