use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

/// Query parameters for relaying a remote file
#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct RemoteDownloadParams {
    /// Absolute http(s) URL of the file to fetch
    #[param(example = "https://example.com/files/report.pdf")]
    #[validate(url(message = "fileUrl must be an absolute URL"))]
    pub file_url: String,
    /// Name offered to the client; defaults to the last path segment of the URL
    #[serde(rename = "filename")]
    #[param(example = "report.pdf")]
    pub file_name: Option<String>,
}
