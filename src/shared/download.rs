//! Streaming file responses

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use tokio_util::io::{ReaderStream, StreamReader};

use crate::core::error::AppError;
use crate::modules::storage::ObjectStream;
use crate::shared::constants::DOWNLOAD_BUFFER_SIZE;

/// Re-chunk a body stream through a fixed-size read buffer
pub fn fixed_chunks(stream: ObjectStream) -> ObjectStream {
    let reader = StreamReader::new(stream);
    Box::pin(ReaderStream::with_capacity(reader, DOWNLOAD_BUFFER_SIZE))
}

/// `attachment; filename="<pct>"; filename*=UTF-8''<pct>`
pub fn content_disposition(file_name: &str) -> String {
    let encoded = urlencoding::encode(file_name);
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        encoded, encoded
    )
}

/// A file download assembled from a stream
pub struct Attachment {
    pub file_name: String,
    pub content_type: String,
    pub content_length: Option<u64>,
    pub last_modified: Option<DateTime<Utc>>,
    pub body: ObjectStream,
}

impl std::fmt::Debug for Attachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attachment")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length)
            .field("last_modified", &self.last_modified)
            .finish_non_exhaustive()
    }
}

impl IntoResponse for Attachment {
    fn into_response(self) -> Response {
        let content_type = HeaderValue::from_str(&self.content_type)
            .unwrap_or(HeaderValue::from_static("application/octet-stream"));

        let disposition = match HeaderValue::from_str(&content_disposition(&self.file_name)) {
            Ok(value) => value,
            Err(e) => {
                return AppError::Internal(format!("Invalid Content-Disposition: {}", e))
                    .into_response()
            }
        };

        let mut response = Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, content_type)
            .header(header::CONTENT_DISPOSITION, disposition);

        if let Some(length) = self.content_length {
            response = response.header(header::CONTENT_LENGTH, length);
        }
        if let Some(modified) = self.last_modified {
            response = response.header(
                header::LAST_MODIFIED,
                modified.format("%a, %d %b %Y %H:%M:%S GMT").to_string(),
            );
        }

        let body = Body::from_stream(self.body);
        match response.body(body) {
            Ok(response) => response,
            Err(e) => AppError::Internal(format!("Failed to build download response: {}", e))
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_fixed_chunks_respects_buffer_size() {
        let source: Vec<std::io::Result<Bytes>> = vec![
            Ok(Bytes::from(vec![1u8; 5000])),
            Ok(Bytes::from(vec![2u8; 5000])),
            Ok(Bytes::from(vec![3u8; 10000])),
        ];

        let chunks: Vec<Bytes> = fixed_chunks(Box::pin(futures::stream::iter(source)))
            .map(|c| c.unwrap())
            .collect()
            .await;

        assert!(chunks.iter().all(|c| c.len() <= DOWNLOAD_BUFFER_SIZE));
        assert_eq!(chunks.iter().map(Bytes::len).sum::<usize>(), 20000);
    }

    #[test]
    fn test_content_disposition_encodes_name() {
        assert_eq!(
            content_disposition("a.txt"),
            "attachment; filename=\"a.txt\"; filename*=UTF-8''a.txt"
        );
        assert_eq!(
            content_disposition("résumé 1.pdf"),
            "attachment; filename=\"r%C3%A9sum%C3%A9%201.pdf\"; filename*=UTF-8''r%C3%A9sum%C3%A9%201.pdf"
        );
    }
}
