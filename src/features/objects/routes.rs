use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use crate::features::objects::handlers::{
    delete_object, delete_objects, download_file, download_to_local, get_object_url,
    get_upload_url, list_objects, upload,
};
use crate::features::objects::services::ObjectService;

/// Create routes for the objects feature
pub fn routes(object_service: Arc<ObjectService>, max_upload_size: usize) -> Router {
    Router::new()
        .route(
            "/upload",
            post(upload).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route("/deleteObject", delete(delete_object))
        .route("/deleteObjects", delete(delete_objects))
        .route("/downloadFile", post(download_file))
        .route("/downloadToLocal", post(download_to_local))
        .route("/listObjects", get(list_objects))
        .route("/getObjectUrl", post(get_object_url))
        .route("/getUploadUrl", post(get_upload_url))
        .with_state(object_service)
}
