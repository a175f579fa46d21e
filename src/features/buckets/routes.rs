use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use crate::features::buckets::handlers::{
    bucket_exists, delete_bucket, get_bucket_policy, list_buckets, make_bucket,
};
use crate::features::buckets::services::BucketService;

/// Create routes for the buckets feature
pub fn routes(bucket_service: Arc<BucketService>) -> Router {
    Router::new()
        .route("/makeBucket", post(make_bucket))
        .route("/deleteBucket", delete(delete_bucket))
        .route("/bucketExists", get(bucket_exists))
        .route("/listBuckets", get(list_buckets))
        .route("/getBucketPolicy", get(get_bucket_policy))
        .with_state(bucket_service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::InMemoryStore;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::Value;

    fn server(store: Arc<InMemoryStore>) -> TestServer {
        let service = Arc::new(BucketService::new(store, false));
        TestServer::new(routes(service)).unwrap()
    }

    #[tokio::test]
    async fn test_make_bucket_accepts_form_and_query() {
        let store = Arc::new(InMemoryStore::new());
        let server = server(store);

        let response = server
            .post("/makeBucket")
            .form(&[("bucketName", "t1")])
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["code"], 200);
        assert!(body["data"].is_null());

        let response = server
            .post("/makeBucket")
            .add_query_param("bucketName", "t2")
            .await;
        response.assert_status_ok();

        let response = server
            .get("/bucketExists")
            .add_query_param("bucketName", "t2")
            .await;
        let body: Value = response.json();
        assert_eq!(body["data"], true);
    }

    #[tokio::test]
    async fn test_short_name_rejected_by_store_is_bad_request() {
        let store = Arc::new(InMemoryStore::new());
        store.strict_bucket_names();
        let server = server(store);

        let response = server
            .post("/makeBucket")
            .add_query_param("bucketName", "t1")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["code"], 400);
        assert!(body["message"].as_str().unwrap().contains("3-63 characters"));
    }

    #[tokio::test]
    async fn test_make_bucket_twice_is_conflict() {
        let store = Arc::new(InMemoryStore::new());
        let server = server(store);

        server
            .post("/makeBucket")
            .add_query_param("bucketName", "t1")
            .await
            .assert_status_ok();

        let response = server
            .post("/makeBucket")
            .add_query_param("bucketName", "t1")
            .await;
        response.assert_status(StatusCode::CONFLICT);
        let body: Value = response.json();
        assert_eq!(body["code"], 409);
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_missing_or_invalid_bucket_name_is_bad_request() {
        let store = Arc::new(InMemoryStore::new());
        let server = server(store);

        server
            .get("/bucketExists")
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        let response = server
            .get("/bucketExists")
            .add_query_param("bucketName", "Not_Valid")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["code"], 400);
        assert!(body["data"].is_null());
    }

    #[tokio::test]
    async fn test_delete_missing_bucket_succeeds() {
        let store = Arc::new(InMemoryStore::new());
        let server = server(store);

        let response = server
            .delete("/deleteBucket")
            .add_query_param("bucketName", "ghost")
            .await;
        response.assert_status_ok();
    }

    #[tokio::test]
    async fn test_list_buckets_envelope() {
        let store = Arc::new(InMemoryStore::new());
        store.insert("t1", "a.txt", b"hello", "text/plain");
        let server = server(store.clone());

        let body: Value = server.get("/listBuckets").await.json();
        assert_eq!(body["data"][0]["name"], "t1");
        assert!(body["data"][0]["creationTime"].is_string());

        store.fail_list_buckets();
        let response = server.get("/listBuckets").await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_get_bucket_policy_without_policy_fails() {
        let store = Arc::new(InMemoryStore::new());
        store.insert("t1", "a.txt", b"hello", "text/plain");
        let server = server(store);

        let response = server
            .get("/getBucketPolicy")
            .add_query_param("bucketName", "t1")
            .await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = response.json();
        assert_eq!(body["message"], "Failed to get bucket policy: t1");
    }
}
