use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::modules::storage::BucketEntry;
use crate::shared::validation::validate_bucket_name;

/// Parameters naming a single bucket
#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct BucketNameParams {
    /// Bucket name (lowercase letters, digits, dots and hyphens)
    #[param(example = "t1")]
    #[validate(custom(function = "validate_bucket_name"))]
    pub bucket_name: String,
}

/// Response DTO for a bucket listing entry
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BucketInfoDto {
    pub name: String,
    /// Creation time reported by the store, if any
    pub creation_time: Option<DateTime<Utc>>,
}

impl From<BucketEntry> for BucketInfoDto {
    fn from(entry: BucketEntry) -> Self {
        Self {
            name: entry.name,
            creation_time: entry.creation_date,
        }
    }
}
