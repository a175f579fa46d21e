use std::sync::Arc;

use axum::extract::State;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppParams;
use crate::features::remote::dtos::RemoteDownloadParams;
use crate::features::remote::services::RemoteFileService;
use crate::shared::download::Attachment;

/// Download a file from a remote URL and relay it to the caller
#[utoipa::path(
    get,
    path = "/fileUrl/download",
    params(RemoteDownloadParams),
    responses(
        (status = 200, description = "Remote file content", content_type = "application/octet-stream", body = Vec<u8>),
        (status = 400, description = "Missing or non-http(s) URL"),
        (status = 502, description = "Remote fetch failed")
    ),
    tag = "remote"
)]
pub async fn download_by_url(
    State(service): State<Arc<RemoteFileService>>,
    AppParams(params): AppParams<RemoteDownloadParams>,
) -> Result<Attachment> {
    params
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    service
        .download(&params.file_url, params.file_name.as_deref())
        .await
}
