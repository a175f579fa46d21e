use axum::{routing::get, Router};
use std::sync::Arc;

use crate::features::remote::handlers::download_by_url;
use crate::features::remote::services::RemoteFileService;

/// Create routes for relaying remote files
pub fn routes(remote_service: Arc<RemoteFileService>) -> Router {
    Router::new()
        .route("/fileUrl/download", get(download_by_url))
        .with_state(remote_service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::RemoteFetchConfig;
    use axum::http::{header, StatusCode};
    use axum_test::TestServer;
    use std::time::Duration;

    fn server() -> TestServer {
        let service = RemoteFileService::new(&RemoteFetchConfig {
            timeout: Duration::from_secs(5),
        })
        .unwrap();
        TestServer::new(routes(Arc::new(service))).unwrap()
    }

    #[tokio::test]
    async fn test_relay_through_router() {
        let upstream = Router::new().route("/docs/readme.txt", get(|| async { "remote body" }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, upstream).await.unwrap();
        });

        let response = server()
            .get("/fileUrl/download")
            .add_query_param("fileUrl", format!("http://{}/docs/readme.txt", addr))
            .await;

        response.assert_status_ok();
        response.assert_text("remote body");
        assert_eq!(
            response.header(header::CONTENT_DISPOSITION),
            "attachment; filename=\"readme.txt\"; filename*=UTF-8''readme.txt"
        );
        assert_eq!(
            response.header(header::CONTENT_TYPE),
            "application/octet-stream"
        );
    }

    #[tokio::test]
    async fn test_missing_url_is_bad_request() {
        let server = server();

        server
            .get("/fileUrl/download")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
        server
            .get("/fileUrl/download")
            .add_query_param("fileUrl", "")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
