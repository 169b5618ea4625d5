//! Shared HTTP utilities for service clients.

use crate::error::Error;
use reqwest::Client;
use std::time::Duration;

/// Default HTTP timeout for all requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Creates a configured HTTP client with timeouts.
#[must_use]
pub fn create_http_client() -> Client {
    Client::builder()
        .timeout(DEFAULT_TIMEOUT)
        .connect_timeout(Duration::from_secs(10))
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Validates a service endpoint URL.
pub fn validate_endpoint(url: &str) -> crate::error::Result<()> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(Error::Config(format!(
            "Invalid endpoint scheme in '{}'. Allowed: http, https",
            url
        )));
    }
    if url.len() < 10 || !url.contains("://") {
        return Err(Error::Config(format!("Invalid endpoint format: {}", url)));
    }
    Ok(())
}

/// Maps a non-success HTTP response to the appropriate error.
pub fn handle_http_error(status_code: u16, body: &str) -> Error {
    match status_code {
        429 => Error::RateLimit(60), // Default 60s retry
        401 | 403 => Error::Authentication(format!("HTTP {}: {}", status_code, body)),
        _ => Error::Api {
            status: status_code,
            message: body.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_http_client() {
        let client = create_http_client();
        assert!(client.get("http://example.com").build().is_ok());
    }

    #[test]
    fn test_validate_endpoint_valid() {
        assert!(validate_endpoint("http://localhost:8108").is_ok());
        assert!(validate_endpoint("https://search.example.com").is_ok());
    }

    #[test]
    fn test_validate_endpoint_invalid_scheme() {
        assert!(validate_endpoint("ftp://files.example.com").is_err());
        assert!(validate_endpoint("file:///etc/passwd").is_err());
    }

    #[test]
    fn test_handle_http_error_rate_limit() {
        let err = handle_http_error(429, "too many requests");
        assert!(matches!(err, Error::RateLimit(60)));
    }

    #[test]
    fn test_handle_http_error_auth() {
        let err = handle_http_error(401, "unauthorized");
        assert!(matches!(err, Error::Authentication(_)));
    }

    #[test]
    fn test_handle_http_error_other() {
        let err = handle_http_error(500, "internal error");
        assert!(matches!(err, Error::Api { status: 500, .. }));
    }
}
