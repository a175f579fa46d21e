use axum::http::StatusCode;
use futures::TryStreamExt;
use reqwest::Url;
use tracing::{debug, info};

use crate::core::config::RemoteFetchConfig;
use crate::core::error::{AppError, Result};
use crate::shared::constants::DEFAULT_CONTENT_TYPE;
use crate::shared::download::{fixed_chunks, Attachment};

/// Name used when neither the caller nor the URL provides one
const FALLBACK_FILE_NAME: &str = "download";

/// Relays files fetched from arbitrary http(s) URLs
pub struct RemoteFileService {
    client: reqwest::Client,
}

impl RemoteFileService {
    pub fn new(config: &RemoteFetchConfig) -> std::result::Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("storage-gateway/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()?;

        Ok(Self { client })
    }

    /// Fetch `file_url` and stream it back as an attachment
    pub async fn download(&self, file_url: &str, file_name: Option<&str>) -> Result<Attachment> {
        let url = Url::parse(file_url.trim())
            .map_err(|e| AppError::Validation(format!("Invalid fileUrl: {}", e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::Validation(
                "fileUrl must use http or https".to_string(),
            ));
        }

        let file_name = file_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| file_name_from_url(&url));

        debug!("Fetching remote file {} as '{}'", url, file_name);

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            tracing::error!("Failed to fetch remote file {}: {}", url, e);
            AppError::storage_with_code(
                StatusCode::BAD_GATEWAY,
                format!("Failed to fetch remote file: {}", url),
            )
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!("Remote server returned {} for {}", status, url);
            return Err(AppError::storage_with_code(
                StatusCode::BAD_GATEWAY,
                format!("Remote server returned {} for {}", status, url),
            ));
        }

        info!("Relaying remote file {} as '{}'", url, file_name);

        let content_length = response.content_length();
        let stream = response.bytes_stream().map_err(std::io::Error::other);

        Ok(Attachment {
            file_name,
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            content_length,
            last_modified: None,
            body: fixed_chunks(Box::pin(stream)),
        })
    }
}

/// Last non-empty path segment, percent-decoded
fn file_name_from_url(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
        .and_then(|segment| urlencoding::decode(segment).ok())
        .map(|name| name.into_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| FALLBACK_FILE_NAME.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Bytes, routing::get, Router};
    use futures::StreamExt;
    use std::net::SocketAddr;
    use std::time::Duration;

    async fn spawn_upstream() -> SocketAddr {
        let app = Router::new()
            .route(
                "/files/{name}",
                get(|| async { vec![7u8; 20_000] }),
            )
            .route(
                "/missing",
                get(|| async { (StatusCode::NOT_FOUND, "not here") }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn service() -> RemoteFileService {
        RemoteFileService::new(&RemoteFetchConfig {
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn test_file_name_from_url() {
        let name = |raw: &str| file_name_from_url(&Url::parse(raw).unwrap());

        assert_eq!(name("https://example.com/files/report.pdf"), "report.pdf");
        assert_eq!(name("https://example.com/files/my%20report.pdf"), "my report.pdf");
        assert_eq!(name("https://example.com/files/a.txt/"), "a.txt");
        assert_eq!(name("https://example.com/"), "download");
        assert_eq!(name("https://example.com"), "download");
    }

    #[tokio::test]
    async fn test_rejects_non_http_urls() {
        let service = service();

        assert!(matches!(
            service.download("ftp://example.com/a.txt", None).await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            service.download("not a url", None).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_relays_remote_body() {
        let addr = spawn_upstream().await;
        let service = service();

        let attachment = service
            .download(&format!("http://{}/files/q1%20report.bin", addr), None)
            .await
            .unwrap();

        assert_eq!(attachment.file_name, "q1 report.bin");
        assert_eq!(attachment.content_type, DEFAULT_CONTENT_TYPE);
        assert_eq!(attachment.content_length, Some(20_000));

        let chunks: Vec<Bytes> = attachment.body.map(|c| c.unwrap()).collect().await;
        assert_eq!(chunks.iter().map(Bytes::len).sum::<usize>(), 20_000);
    }

    #[tokio::test]
    async fn test_explicit_file_name_wins() {
        let addr = spawn_upstream().await;
        let service = service();

        let attachment = service
            .download(&format!("http://{}/files/x", addr), Some("custom.bin"))
            .await
            .unwrap();

        assert_eq!(attachment.file_name, "custom.bin");
    }

    #[tokio::test]
    async fn test_upstream_error_is_bad_gateway() {
        let addr = spawn_upstream().await;
        let service = service();

        let err = service
            .download(&format!("http://{}/missing", addr), None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::StorageOperationFailed { .. }));
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }
}
