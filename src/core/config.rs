//! Environment-driven configuration

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use reqwest::Url;

use crate::shared::constants::MAX_PRESIGNED_EXPIRY_SECS;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub swagger: SwaggerConfig,
    pub minio: MinIOConfig,
    pub remote: RemoteFetchConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_request_body_size: usize,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

/// Connection settings for the MinIO/S3 server
#[derive(Debug, Clone)]
pub struct MinIOConfig {
    /// Base URL without a trailing slash, e.g. `http://localhost:9000`
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
    /// Attach a public-read policy to newly created buckets
    pub public_read_on_create: bool,
    /// Upper bound for presigned URL expiry, in seconds
    pub max_presigned_expiry_secs: u32,
}

/// Settings for relaying files fetched from arbitrary URLs
#[derive(Debug, Clone)]
pub struct RemoteFetchConfig {
    pub timeout: Duration,
}

/// Variable value, or `default` when unset
fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Variable value when set and non-blank
fn var_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn var_required(name: &str) -> Result<String, String> {
    var_opt(name).ok_or_else(|| format!("{} environment variable is required", name))
}

fn var_parsed<T>(name: &str, default: T) -> Result<T, String>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match var_opt(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| format!("{} has an invalid value '{}': {}", name, raw, e)),
        None => Ok(default),
    }
}

impl Config {
    /// Read every section from the process environment
    pub fn from_env() -> Result<Self, String> {
        Ok(Config {
            app: AppConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
            minio: MinIOConfig::from_env()?,
            remote: RemoteFetchConfig::from_env()?,
        })
    }
}

impl AppConfig {
    const DEFAULT_MAX_REQUEST_BODY_SIZE: usize = 100 * 1024 * 1024;

    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            host: var_or("HOST", "127.0.0.1"),
            port: var_parsed("PORT", 3000)?,
            cors_allowed_origins: var_or("CORS_ALLOWED_ORIGINS", "*")
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(String::from)
                .collect(),
            max_request_body_size: var_parsed(
                "MAX_REQUEST_BODY_SIZE",
                Self::DEFAULT_MAX_REQUEST_BODY_SIZE,
            )?,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            username: var_opt("SWAGGER_USERNAME"),
            password: var_opt("SWAGGER_PASSWORD"),
            title: var_or("SWAGGER_TITLE", "Storage Gateway API"),
            version: var_or("SWAGGER_VERSION", env!("CARGO_PKG_VERSION")),
            description: var_or(
                "SWAGGER_DESCRIPTION",
                "HTTP gateway over MinIO/S3 object storage",
            ),
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

impl MinIOConfig {
    pub fn from_env() -> Result<Self, String> {
        let requested_expiry: u32 =
            var_parsed("MINIO_MAX_PRESIGNED_EXPIRY_SECS", MAX_PRESIGNED_EXPIRY_SECS)?;

        let config = Self {
            endpoint: var_required("MINIO_ENDPOINT")?
                .trim()
                .trim_end_matches('/')
                .to_string(),
            access_key: var_required("MINIO_ACCESS_KEY")?,
            secret_key: var_required("MINIO_SECRET_KEY")?,
            region: var_or("MINIO_REGION", "us-east-1"),
            public_read_on_create: var_parsed("MINIO_PUBLIC_READ_ON_CREATE", false)?,
            max_presigned_expiry_secs: requested_expiry.min(MAX_PRESIGNED_EXPIRY_SECS),
        };
        config.validate()?;

        Ok(config)
    }

    /// Check that the endpoint is a usable http(s) URL and credentials are present
    pub fn validate(&self) -> Result<(), String> {
        if self.endpoint.trim().is_empty() {
            return Err("MINIO_ENDPOINT must not be empty".to_string());
        }

        let url = Url::parse(&self.endpoint)
            .map_err(|e| format!("MINIO_ENDPOINT is not a valid URL: {}", e))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(format!(
                "MINIO_ENDPOINT must use http or https, got '{}'",
                url.scheme()
            ));
        }
        if url.host_str().is_none() {
            return Err("MINIO_ENDPOINT has no host".to_string());
        }

        if self.access_key.trim().is_empty() {
            return Err("MINIO_ACCESS_KEY must not be empty".to_string());
        }
        if self.secret_key.trim().is_empty() {
            return Err("MINIO_SECRET_KEY must not be empty".to_string());
        }
        if self.max_presigned_expiry_secs == 0 {
            return Err("MINIO_MAX_PRESIGNED_EXPIRY_SECS must be greater than zero".to_string());
        }

        Ok(())
    }
}

impl RemoteFetchConfig {
    const DEFAULT_TIMEOUT_SECS: u64 = 300;

    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            timeout: Duration::from_secs(var_parsed(
                "REMOTE_FETCH_TIMEOUT_SECS",
                Self::DEFAULT_TIMEOUT_SECS,
            )?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minio_config(endpoint: &str) -> MinIOConfig {
        MinIOConfig {
            endpoint: endpoint.to_string(),
            access_key: "minioadmin".to_string(),
            secret_key: "minioadmin".to_string(),
            region: "us-east-1".to_string(),
            public_read_on_create: false,
            max_presigned_expiry_secs: MAX_PRESIGNED_EXPIRY_SECS,
        }
    }

    #[test]
    fn test_minio_config_accepts_http_endpoint() {
        assert!(minio_config("http://localhost:9000").validate().is_ok());
        assert!(minio_config("https://s3.example.com").validate().is_ok());
    }

    #[test]
    fn test_minio_config_rejects_malformed_endpoint() {
        assert!(minio_config("").validate().is_err());
        assert!(minio_config("localhost:9000").validate().is_err());
        assert!(minio_config("ftp://files.example.com").validate().is_err());
        assert!(minio_config("not a url").validate().is_err());
    }

    #[test]
    fn test_minio_config_requires_credentials() {
        let mut config = minio_config("http://localhost:9000");
        config.access_key = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = minio_config("http://localhost:9000");
        config.secret_key = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_swagger_credentials_require_both_parts() {
        let mut swagger = SwaggerConfig {
            username: Some("admin".to_string()),
            password: None,
            title: String::new(),
            version: String::new(),
            description: String::new(),
        };
        assert_eq!(swagger.credentials(), None);

        swagger.password = Some("secret".to_string());
        assert_eq!(swagger.credentials(), Some("admin:secret".to_string()));
    }

    #[test]
    fn test_var_parsed_reports_variable_name() {
        std::env::set_var("STORAGE_GATEWAY_TEST_PORT", "not-a-port");

        let err = var_parsed::<u16>("STORAGE_GATEWAY_TEST_PORT", 3000).unwrap_err();
        assert!(err.starts_with("STORAGE_GATEWAY_TEST_PORT has an invalid value"));

        std::env::remove_var("STORAGE_GATEWAY_TEST_PORT");
        assert_eq!(var_parsed::<u16>("STORAGE_GATEWAY_TEST_PORT", 3000), Ok(3000));
    }
}
