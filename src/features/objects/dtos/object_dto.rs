use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::modules::storage::ObjectEntry;
use crate::shared::validation::validate_bucket_name;

/// Upload form for OpenAPI documentation
/// Note: the handler reads the multipart body directly.
#[derive(Debug, ToSchema)]
#[schema(rename_all = "camelCase")]
#[allow(dead_code)]
pub struct UploadFilesDto {
    /// One or more files; each part must carry a file name
    pub files: Vec<String>,
    /// Target bucket (may also be given as a query parameter)
    #[schema(example = "t1")]
    pub bucket_name: String,
}

/// Query parameters accepted alongside a multipart upload
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct UploadParams {
    /// Target bucket, when not sent as a form field
    pub bucket_name: Option<String>,
}

/// Parameters naming a single object
#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ObjectParams {
    #[param(example = "t1")]
    #[validate(custom(function = "validate_bucket_name"))]
    pub bucket_name: String,
    #[param(example = "a.txt")]
    #[validate(length(min = 1, message = "objectName must not be empty"))]
    pub object_name: String,
}

/// Parameters for streaming an object to the caller
#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct DownloadFileParams {
    #[param(example = "t1")]
    #[validate(custom(function = "validate_bucket_name"))]
    pub bucket_name: String,
    /// Object name to download
    #[param(example = "a.txt")]
    #[validate(length(min = 1, message = "fileName must not be empty"))]
    pub file_name: String,
}

/// Parameters for writing an object to a path on the gateway host
#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct DownloadToLocalParams {
    #[param(example = "t1")]
    #[validate(custom(function = "validate_bucket_name"))]
    pub bucket_name: String,
    #[param(example = "a.txt")]
    #[validate(length(min = 1, message = "objectName must not be empty"))]
    pub object_name: String,
    /// Destination path, overwritten if present
    #[param(example = "/tmp/a.txt")]
    #[validate(length(min = 1, message = "localFile must not be empty"))]
    pub local_file: String,
}

/// Parameters for a non-recursive object listing
#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListObjectsParams {
    #[param(example = "t1")]
    #[validate(custom(function = "validate_bucket_name"))]
    pub bucket_name: String,
    /// Only list keys under this prefix (e.g. "photos/")
    pub prefix: Option<String>,
}

/// Parameters for presigned URL generation
#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct PresignParams {
    #[param(example = "t1")]
    #[validate(custom(function = "validate_bucket_name"))]
    pub bucket_name: String,
    #[param(example = "a.txt")]
    #[validate(length(min = 1, message = "objectName must not be empty"))]
    pub object_name: String,
    /// Lifetime in minutes (default 60, capped at 7 days)
    #[param(example = 60, minimum = 1)]
    #[validate(range(min = 1, message = "expires must be at least 1 minute"))]
    pub expires: Option<u32>,
}

/// Request DTO for batch object deletion
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteObjectsDto {
    #[schema(example = "t1")]
    #[validate(custom(function = "validate_bucket_name"))]
    pub bucket_name: String,
    #[schema(example = json!(["a.txt", "b.txt"]))]
    #[validate(length(min = 1, message = "objectNames must not be empty"))]
    pub object_names: Vec<String>,
}

/// One failed entry of a batch deletion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteErrorDto {
    pub object_name: String,
    pub message: String,
}

/// Response DTO for an object listing entry
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ObjectInfoDto {
    /// Full object key (or common prefix for directories)
    pub name: String,
    /// Size in bytes (0 for directories)
    pub size: u64,
    pub last_modified: Option<DateTime<Utc>>,
    /// Owner display name, empty when the store omits it
    pub owner: String,
    pub is_directory: bool,
    /// Not reported by S3 listings
    pub content_type: Option<String>,
}

impl From<ObjectEntry> for ObjectInfoDto {
    fn from(entry: ObjectEntry) -> Self {
        Self {
            name: entry.key,
            size: if entry.is_prefix { 0 } else { entry.size },
            last_modified: entry.last_modified,
            owner: entry.owner.unwrap_or_default(),
            is_directory: entry.is_prefix,
            content_type: None,
        }
    }
}
