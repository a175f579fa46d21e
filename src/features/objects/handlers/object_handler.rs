use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Multipart, Query, State},
    Json,
};
use tracing::debug;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppParams};
use crate::features::objects::dtos::{
    DeleteErrorDto, DeleteObjectsDto, DownloadFileParams, DownloadToLocalParams,
    ListObjectsParams, ObjectInfoDto, ObjectParams, PresignParams, UploadFilesDto, UploadParams,
};
use crate::features::objects::services::{ObjectService, UploadFile};
use crate::shared::download::Attachment;
use crate::shared::types::ApiResponse;
use crate::shared::validation::validate_bucket_name;

fn validate<T: Validate>(params: &T) -> Result<()> {
    params
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))
}

/// Upload one or more files
///
/// Accepts multipart/form-data with:
/// - `files`: repeated file parts, stored under their original file names
/// - `bucketName`: target bucket (or the `bucketName` query parameter)
#[utoipa::path(
    post,
    path = "/upload",
    params(UploadParams),
    request_body(
        content = UploadFilesDto,
        content_type = "multipart/form-data",
        description = "Files and target bucket",
    ),
    responses(
        (status = 200, description = "Names of the stored objects", body = ApiResponse<Vec<String>>),
        (status = 400, description = "No files or invalid bucket name"),
        (status = 404, description = "Bucket does not exist"),
        (status = 413, description = "Request body too large"),
        (status = 500, description = "Storage operation failed")
    ),
    tag = "objects"
)]
pub async fn upload(
    State(service): State<Arc<ObjectService>>,
    query: std::result::Result<Query<UploadParams>, QueryRejection>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<Vec<String>>>> {
    let Query(params) = query.map_err(|rejection| AppError::Validation(rejection.body_text()))?;
    let mut bucket_name = params.bucket_name;
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "files" => {
                let name = field.file_name().map(|s| s.to_string());
                let content_type = field.content_type().map(|s| s.to_string());
                let data = field.bytes().await.map_err(|e| {
                    debug!("Failed to read file bytes: {}", e);
                    AppError::BadRequest(format!("Failed to read file data: {}", e))
                })?;

                files.push(UploadFile {
                    name,
                    content_type,
                    data,
                });
            }
            "bucketName" => {
                let text = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read bucketName field: {}", e))
                })?;
                bucket_name = Some(text);
            }
            _ => {
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    let bucket_name = bucket_name
        .filter(|b| !b.is_empty())
        .ok_or_else(|| AppError::Validation("bucketName is required".to_string()))?;
    validate_bucket_name(&bucket_name).map_err(|e| AppError::Validation(e.to_string()))?;

    let uploaded = service.upload(&bucket_name, files).await?;

    Ok(Json(ApiResponse::success(
        Some(uploaded),
        Some("Files uploaded successfully".to_string()),
    )))
}

/// Delete a single object
///
/// Deleting an object that does not exist succeeds without effect.
#[utoipa::path(
    delete,
    path = "/deleteObject",
    params(ObjectParams),
    responses(
        (status = 200, description = "Object removed, or nothing to remove"),
        (status = 400, description = "Invalid parameters"),
        (status = 500, description = "Storage operation failed")
    ),
    tag = "objects"
)]
pub async fn delete_object(
    State(service): State<Arc<ObjectService>>,
    AppParams(params): AppParams<ObjectParams>,
) -> Result<Json<ApiResponse<()>>> {
    validate(&params)?;

    let message = if service
        .remove_object(&params.bucket_name, &params.object_name)
        .await?
    {
        format!("Object removed successfully: {}", params.object_name)
    } else {
        format!("Object does not exist: {}", params.object_name)
    };

    Ok(Json(ApiResponse::success(None, Some(message))))
}

/// Delete several objects from one bucket
///
/// Every name is attempted; the response lists the ones that failed.
#[utoipa::path(
    delete,
    path = "/deleteObjects",
    request_body = DeleteObjectsDto,
    responses(
        (status = 200, description = "Failed deletions (empty when all succeeded)", body = ApiResponse<Vec<DeleteErrorDto>>),
        (status = 400, description = "Invalid request body"),
        (status = 404, description = "Bucket does not exist")
    ),
    tag = "objects"
)]
pub async fn delete_objects(
    State(service): State<Arc<ObjectService>>,
    AppJson(dto): AppJson<DeleteObjectsDto>,
) -> Result<Json<ApiResponse<Vec<DeleteErrorDto>>>> {
    validate(&dto)?;

    let failures = service
        .remove_objects(&dto.bucket_name, &dto.object_names)
        .await?;

    Ok(Json(ApiResponse::success(Some(failures), None)))
}

/// Stream an object to the caller as an attachment
#[utoipa::path(
    post,
    path = "/downloadFile",
    params(DownloadFileParams),
    responses(
        (status = 200, description = "Object content", content_type = "application/octet-stream", body = Vec<u8>),
        (status = 400, description = "Invalid parameters"),
        (status = 404, description = "Object does not exist"),
        (status = 500, description = "Storage operation failed")
    ),
    tag = "objects"
)]
pub async fn download_file(
    State(service): State<Arc<ObjectService>>,
    AppParams(params): AppParams<DownloadFileParams>,
) -> Result<Attachment> {
    validate(&params)?;

    service.download(&params.bucket_name, &params.file_name).await
}

/// Write an object to a file on the gateway host
#[utoipa::path(
    post,
    path = "/downloadToLocal",
    params(DownloadToLocalParams),
    responses(
        (status = 200, description = "Bytes written", body = ApiResponse<u64>),
        (status = 400, description = "Invalid parameters"),
        (status = 404, description = "Object does not exist"),
        (status = 500, description = "Storage operation failed")
    ),
    tag = "objects"
)]
pub async fn download_to_local(
    State(service): State<Arc<ObjectService>>,
    AppParams(params): AppParams<DownloadToLocalParams>,
) -> Result<Json<ApiResponse<u64>>> {
    validate(&params)?;

    let written = service
        .download_to_local(&params.bucket_name, &params.object_name, &params.local_file)
        .await?;

    Ok(Json(ApiResponse::success(
        Some(written),
        Some(format!("Object downloaded to {}", params.local_file)),
    )))
}

/// List objects and directories directly under a prefix
#[utoipa::path(
    get,
    path = "/listObjects",
    params(ListObjectsParams),
    responses(
        (status = 200, description = "Listing entries", body = ApiResponse<Vec<ObjectInfoDto>>),
        (status = 400, description = "Invalid bucket name"),
        (status = 404, description = "Bucket does not exist"),
        (status = 500, description = "Storage operation failed")
    ),
    tag = "objects"
)]
pub async fn list_objects(
    State(service): State<Arc<ObjectService>>,
    AppParams(params): AppParams<ListObjectsParams>,
) -> Result<Json<ApiResponse<Vec<ObjectInfoDto>>>> {
    validate(&params)?;

    let objects = service
        .list_objects(&params.bucket_name, params.prefix.as_deref())
        .await?;

    Ok(Json(ApiResponse::success(Some(objects), None)))
}

/// Presigned GET URL for an existing object
#[utoipa::path(
    post,
    path = "/getObjectUrl",
    params(PresignParams),
    responses(
        (status = 200, description = "Presigned download URL", body = ApiResponse<String>),
        (status = 400, description = "Invalid parameters"),
        (status = 404, description = "Object does not exist"),
        (status = 500, description = "Storage operation failed")
    ),
    tag = "objects"
)]
pub async fn get_object_url(
    State(service): State<Arc<ObjectService>>,
    AppParams(params): AppParams<PresignParams>,
) -> Result<Json<ApiResponse<String>>> {
    validate(&params)?;

    let url = service
        .get_object_url(&params.bucket_name, &params.object_name, params.expires)
        .await?;

    Ok(Json(ApiResponse::success(Some(url), None)))
}

/// Presigned PUT URL for uploading directly to the store
#[utoipa::path(
    post,
    path = "/getUploadUrl",
    params(PresignParams),
    responses(
        (status = 200, description = "Presigned upload URL", body = ApiResponse<String>),
        (status = 400, description = "Invalid parameters"),
        (status = 404, description = "Bucket does not exist"),
        (status = 500, description = "Storage operation failed")
    ),
    tag = "objects"
)]
pub async fn get_upload_url(
    State(service): State<Arc<ObjectService>>,
    AppParams(params): AppParams<PresignParams>,
) -> Result<Json<ApiResponse<String>>> {
    validate(&params)?;

    let url = service
        .create_upload_url(&params.bucket_name, &params.object_name, params.expires)
        .await?;

    Ok(Json(ApiResponse::success(Some(url), None)))
}
