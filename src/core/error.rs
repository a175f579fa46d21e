use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::modules::storage::StorageError;
use crate::shared::types::ApiResponse;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Any failure while talking to the object store (or a missing precondition resource)
    #[error("Storage operation failed: {message}")]
    StorageOperationFailed { code: u16, message: String },

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Storage failure with the default internal-error code
    pub fn storage(message: impl Into<String>) -> Self {
        Self::storage_with_code(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn storage_with_code(code: StatusCode, message: impl Into<String>) -> Self {
        AppError::StorageOperationFailed {
            code: code.as_u16(),
            message: message.into(),
        }
    }

    /// Log a store failure with its cause and expose only the contextual message
    pub fn storage_failure(context: impl Into<String>, cause: StorageError) -> Self {
        let context = context.into();
        tracing::error!("{}: {}", context, cause);
        Self::storage(context)
    }

    /// Missing bucket or object a request depends on
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::storage_with_code(StatusCode::NOT_FOUND, message)
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::StorageOperationFailed { code, .. } => {
                StatusCode::from_u16(*code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match self {
            AppError::Validation(msg) | AppError::BadRequest(msg) | AppError::Conflict(msg) => msg,
            // The cause was logged where the failure was raised
            AppError::StorageOperationFailed { code, message } => {
                tracing::debug!("Storage operation failed ({}): {}", code, message);
                message
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
        };

        let body = Json(ApiResponse::<()>::error(status.as_u16(), message));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tracing_subscriber::layer::SubscriberExt;

    #[test]
    fn test_storage_error_defaults_to_internal_code() {
        let err = AppError::storage("Failed to create bucket: t1");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.to_string(),
            "Storage operation failed: Failed to create bucket: t1"
        );
    }

    #[test]
    fn test_storage_error_keeps_specific_code() {
        let err = AppError::storage_with_code(StatusCode::NOT_FOUND, "Bucket does not exist: t1");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_storage_failure_hides_cause() {
        let err = AppError::storage_failure(
            "Failed to upload file: a.txt",
            StorageError::status(503, "SlowDown"),
        );
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.to_string().contains("SlowDown"));
    }

    /// Counts ERROR-level events seen by a scoped subscriber
    #[derive(Clone, Default)]
    struct ErrorEvents(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for ErrorEvents {
        fn on_event(
            &self,
            event: &tracing::Event<'_>,
            _ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            if *event.metadata().level() == tracing::Level::ERROR {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[test]
    fn test_storage_failure_is_logged_once_as_error() {
        let errors = ErrorEvents::default();
        let subscriber = tracing_subscriber::registry().with(errors.clone());

        tracing::subscriber::with_default(subscriber, || {
            let response = AppError::storage_failure(
                "Failed to upload file: a.txt",
                StorageError::status(503, "SlowDown"),
            )
            .into_response();
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        });

        assert_eq!(errors.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_validation_family_maps_to_client_errors() {
        assert_eq!(
            AppError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Conflict("x".into()).status_code(),
            StatusCode::CONFLICT
        );
    }

    #[tokio::test]
    async fn test_internal_error_hides_details() {
        let response = AppError::Internal("secret detail".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], 500);
        assert_eq!(body["message"], "Internal server error");
        assert!(body["timestamp"].is_string());
    }
}
