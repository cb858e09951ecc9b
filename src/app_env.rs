use axum::http::HeaderName;
use axum::http::header::InvalidHeaderName;
use std::env;
use std::net::{AddrParseError, SocketAddr};
use thiserror::Error;

/// URL for accessing the PostgreSQL database (should contain a database name in the path)
pub const DB_URL: &str = "DATABASE_URL";
/// Log level configuration for the application. For formatting info, see [tracing_subscriber's documentation](https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html#directives)
pub const LOG_LEVEL: &str = "LOG_LEVEL";
/// Socket address the HTTP server listens on
pub const SERVER_ADDRESS: &str = "SERVER_ADDRESS";
/// Name of the header the identity layer uses to pass along the authenticated username
pub const AUTH_USER_HEADER: &str = "AUTH_USER_HEADER";

/// OpenTelemetry span export URL. Should be http://localhost:4317 by default, as the service should
/// have an OpenTelemetry collector sidecar which directs metrics to the correct place
pub const OTEL_SPAN_EXPORT_URL: &str = "OTEL_SPAN_EXPORT_URL";
/// OpenTelemetry metrics export URL. Should be http://localhost:4317 by default, as the service should
/// have an OpenTelemetry collector sidecar which directs metrics to the correct place
pub const OTEL_METRIC_EXPORT_URL: &str = "OTEL_METRIC_EXPORT_URL";

const DEFAULT_SERVER_ADDRESS: &str = "0.0.0.0:8080";
const DEFAULT_AUTH_USER_HEADER: &str = "x-authenticated-user";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("the {0} environment variable must be set")]
    Missing(&'static str),
    #[error("SERVER_ADDRESS is not a valid socket address: {0}")]
    BadServerAddress(#[from] AddrParseError),
    #[error("AUTH_USER_HEADER is not a valid header name: {0}")]
    BadAuthHeader(#[from] InvalidHeaderName),
}

/// Endpoints for exporting OpenTelemetry data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtelEndpoints {
    pub spans: String,
    pub metrics: String,
}

/// Application settings read from the environment at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub server_address: SocketAddr,
    pub auth_user_header: HeaderName,
    /// OpenTelemetry export is only switched on when both endpoints are configured
    pub otel: Option<OtelEndpoints>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds configuration from an arbitrary variable source so tests don't need to
    /// modify the process environment
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup(DB_URL).ok_or(ConfigError::Missing(DB_URL))?;
        let server_address = lookup(SERVER_ADDRESS)
            .unwrap_or_else(|| DEFAULT_SERVER_ADDRESS.to_owned())
            .parse::<SocketAddr>()?;
        let auth_user_header = HeaderName::try_from(
            lookup(AUTH_USER_HEADER).unwrap_or_else(|| DEFAULT_AUTH_USER_HEADER.to_owned()),
        )?;
        let otel = match (lookup(OTEL_SPAN_EXPORT_URL), lookup(OTEL_METRIC_EXPORT_URL)) {
            (Some(spans), Some(metrics)) => Some(OtelEndpoints { spans, metrics }),
            _ => None,
        };

        Ok(AppConfig {
            database_url,
            server_address,
            auth_user_header,
            otel,
        })
    }
}
