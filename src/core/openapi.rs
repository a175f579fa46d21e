use utoipa::{Modify, OpenApi};

use crate::features::buckets::{dtos as buckets_dtos, handlers as buckets_handlers};
use crate::features::objects::{dtos as objects_dtos, handlers as objects_handlers};
use crate::features::remote::handlers as remote_handlers;
use crate::shared::types::ApiResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        // Buckets
        buckets_handlers::make_bucket,
        buckets_handlers::delete_bucket,
        buckets_handlers::bucket_exists,
        buckets_handlers::list_buckets,
        buckets_handlers::get_bucket_policy,
        // Objects
        objects_handlers::upload,
        objects_handlers::delete_object,
        objects_handlers::delete_objects,
        objects_handlers::download_file,
        objects_handlers::download_to_local,
        objects_handlers::list_objects,
        objects_handlers::get_object_url,
        objects_handlers::get_upload_url,
        // Remote
        remote_handlers::download_by_url,
    ),
    components(
        schemas(
            // Buckets
            buckets_dtos::BucketInfoDto,
            ApiResponse<Vec<buckets_dtos::BucketInfoDto>>,
            // Objects
            objects_dtos::UploadFilesDto,
            objects_dtos::ObjectInfoDto,
            objects_dtos::DeleteObjectsDto,
            objects_dtos::DeleteErrorDto,
            ApiResponse<Vec<objects_dtos::ObjectInfoDto>>,
            ApiResponse<Vec<objects_dtos::DeleteErrorDto>>,
        )
    ),
    tags(
        (name = "buckets", description = "Bucket lifecycle and policies"),
        (name = "objects", description = "Object upload, download, listing and presigned URLs"),
        (name = "remote", description = "Relay files from remote URLs"),
    ),
    info(
        title = "Storage Gateway API",
        version = "0.1.0",
        description = "HTTP gateway over MinIO/S3 object storage",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();

        for expected in [
            "/upload",
            "/deleteObject",
            "/deleteObjects",
            "/makeBucket",
            "/deleteBucket",
            "/bucketExists",
            "/downloadToLocal",
            "/downloadFile",
            "/listObjects",
            "/listBuckets",
            "/getBucketPolicy",
            "/getObjectUrl",
            "/getUploadUrl",
            "/fileUrl/download",
        ] {
            assert!(paths.contains(&expected), "missing path {}", expected);
        }
    }

    #[test]
    fn test_swagger_info_modifier() {
        let mut doc = ApiDoc::openapi();
        SwaggerInfoModifier {
            title: "Custom".to_string(),
            version: "9.9.9".to_string(),
            description: "desc".to_string(),
        }
        .modify(&mut doc);

        assert_eq!(doc.info.title, "Custom");
        assert_eq!(doc.info.version, "9.9.9");
    }
}
