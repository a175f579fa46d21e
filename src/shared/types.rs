use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::constants::SUCCESS_MESSAGE;

/// Uniform response envelope returned by every JSON endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Mirrors the HTTP status (200 on success)
    pub code: u16,
    pub message: String,
    pub data: Option<T>,
    /// Set on error responses only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: Option<T>, message: Option<String>) -> Self {
        Self {
            code: 200,
            message: message.unwrap_or_else(|| SUCCESS_MESSAGE.to_string()),
            data,
            timestamp: None,
        }
    }

    pub fn error(code: u16, message: String) -> ApiResponse<()> {
        ApiResponse {
            code,
            message,
            data: None,
            timestamp: Some(Utc::now()),
        }
    }
}
