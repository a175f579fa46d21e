use std::sync::Arc;

use axum::{extract::State, Json};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppParams;
use crate::features::buckets::dtos::{BucketInfoDto, BucketNameParams};
use crate::features::buckets::services::BucketService;
use crate::shared::types::ApiResponse;

/// Create a bucket
///
/// Names of 1-2 characters pass local validation but S3 stores require 3-63;
/// a name the store rejects is reported as 400.
#[utoipa::path(
    post,
    path = "/makeBucket",
    params(BucketNameParams),
    responses(
        (status = 200, description = "Bucket created"),
        (status = 400, description = "Invalid bucket name, or a name the store rejects (S3 requires 3-63 characters)"),
        (status = 409, description = "Bucket already exists"),
        (status = 500, description = "Storage operation failed")
    ),
    tag = "buckets"
)]
pub async fn make_bucket(
    State(service): State<Arc<BucketService>>,
    AppParams(params): AppParams<BucketNameParams>,
) -> Result<Json<ApiResponse<()>>> {
    params
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    service.make_bucket(&params.bucket_name).await?;

    Ok(Json(ApiResponse::success(
        None,
        Some(format!("Bucket created successfully: {}", params.bucket_name)),
    )))
}

/// Remove an empty bucket
///
/// Removing a bucket that does not exist succeeds without effect.
#[utoipa::path(
    delete,
    path = "/deleteBucket",
    params(BucketNameParams),
    responses(
        (status = 200, description = "Bucket removed, or nothing to remove"),
        (status = 400, description = "Invalid bucket name"),
        (status = 500, description = "Storage operation failed (e.g. bucket not empty)")
    ),
    tag = "buckets"
)]
pub async fn delete_bucket(
    State(service): State<Arc<BucketService>>,
    AppParams(params): AppParams<BucketNameParams>,
) -> Result<Json<ApiResponse<()>>> {
    params
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let message = if service.remove_bucket(&params.bucket_name).await? {
        format!("Bucket removed successfully: {}", params.bucket_name)
    } else {
        format!("Bucket does not exist: {}", params.bucket_name)
    };

    Ok(Json(ApiResponse::success(None, Some(message))))
}

/// Check whether a bucket exists
#[utoipa::path(
    get,
    path = "/bucketExists",
    params(BucketNameParams),
    responses(
        (status = 200, description = "Existence flag", body = ApiResponse<bool>),
        (status = 400, description = "Invalid bucket name"),
        (status = 500, description = "Storage operation failed")
    ),
    tag = "buckets"
)]
pub async fn bucket_exists(
    State(service): State<Arc<BucketService>>,
    AppParams(params): AppParams<BucketNameParams>,
) -> Result<Json<ApiResponse<bool>>> {
    params
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let exists = service.bucket_exists(&params.bucket_name).await?;
    Ok(Json(ApiResponse::success(Some(exists), None)))
}

/// List all buckets
#[utoipa::path(
    get,
    path = "/listBuckets",
    responses(
        (status = 200, description = "Buckets (empty when the store is unreachable)", body = ApiResponse<Vec<BucketInfoDto>>)
    ),
    tag = "buckets"
)]
pub async fn list_buckets(
    State(service): State<Arc<BucketService>>,
) -> Json<ApiResponse<Vec<BucketInfoDto>>> {
    let buckets = service.list_buckets().await;
    Json(ApiResponse::success(Some(buckets), None))
}

/// Get the policy document attached to a bucket
#[utoipa::path(
    get,
    path = "/getBucketPolicy",
    params(BucketNameParams),
    responses(
        (status = 200, description = "Bucket policy JSON", body = ApiResponse<String>),
        (status = 400, description = "Invalid bucket name"),
        (status = 500, description = "Storage operation failed (including no policy set)")
    ),
    tag = "buckets"
)]
pub async fn get_bucket_policy(
    State(service): State<Arc<BucketService>>,
    AppParams(params): AppParams<BucketNameParams>,
) -> Result<Json<ApiResponse<String>>> {
    params
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let policy = service.get_bucket_policy(&params.bucket_name).await?;
    Ok(Json(ApiResponse::success(Some(policy), None)))
}
