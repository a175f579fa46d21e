use std::borrow::Cow;

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

use crate::core::error::{AppError, Result};

lazy_static! {
    /// Regex for validating bucket names
    /// Lowercase alphanumerics, dots and hyphens; must start and end alphanumeric, max 63 chars
    /// - Valid: "t1", "my-bucket", "logs.2024"
    /// - Invalid: "-bucket", "bucket-", "Bucket", "my_bucket", "a b"
    pub static ref BUCKET_NAME_REGEX: Regex =
        Regex::new(r"^[a-z0-9](?:[a-z0-9.-]{0,61}[a-z0-9])?$").unwrap();
}

pub const BUCKET_NAME_MESSAGE: &str =
    "bucketName must be a valid bucket name (lowercase letters, digits, '.', '-')";

/// `validator` hook shared by every `bucketName` field
pub fn validate_bucket_name(bucket_name: &str) -> std::result::Result<(), ValidationError> {
    if BUCKET_NAME_REGEX.is_match(bucket_name) {
        Ok(())
    } else {
        Err(ValidationError::new("bucket_name").with_message(Cow::Borrowed(BUCKET_NAME_MESSAGE)))
    }
}

/// Reject empty or whitespace-only identifiers
pub fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} must not be empty", field)));
    }
    Ok(())
}
