//! Error types for pet-image API operations.
//!
//! This module provides the error taxonomy shared by all provider clients,
//! including the mapping from HTTP status codes to distinct error kinds.

use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for pet-image API operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// No API key was supplied and the provider's environment variable is unset
    #[error("No API key specified; pass one explicitly or set the provider's environment variable")]
    MissingApiKey,

    /// Unknown provider name
    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// HTTP verb outside the supported set (GET, POST, DELETE)
    #[error("Unsupported request type: {0}")]
    UnsupportedRequestType(String),

    /// A caller-supplied argument failed validation
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The path given for upload is missing, not a regular file, or a symlink
    #[error("Invalid image file: {0}")]
    InvalidImageFile(PathBuf),

    /// The save target is missing or not a directory
    #[error("Not a valid directory: {0}")]
    NotADirectory(PathBuf),

    /// 400: invalid format or data was specified in the request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// 401: invalid API key was provided
    #[error("Invalid API key: {0}")]
    Unauthorized(String),

    /// 403: connection was refused by the API server
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// 404: resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// 429: too many requests
    #[error("Too many requests: {0}")]
    TooManyRequests(String),

    /// 500: internal error on the API server
    #[error("Internal server error: {0}")]
    InternalServerError(String),

    /// 502: the API server is not working
    #[error("Bad gateway: {0}")]
    BadGateway(String),

    /// Any other non-success status code
    #[error("Unknown error with status code {status}: {body}")]
    UnknownStatus {
        /// Numeric HTTP status code
        status: u16,
        /// Response body text
        body: String,
    },

    /// Transport-level HTTP failure
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Request timed out
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Failed to decode a response payload
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Local I/O failure while reading or writing files
    #[error("I/O error: {0}")]
    Io(String),

    /// Invalid base or resource URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Specialized result type for pet-image API operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingApiKey => "MISSING_API_KEY",
            Self::UnsupportedProvider(_) => "UNSUPPORTED_PROVIDER",
            Self::UnsupportedRequestType(_) => "UNSUPPORTED_REQUEST_TYPE",
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::InvalidImageFile(_) => "INVALID_IMAGE_FILE",
            Self::NotADirectory(_) => "NOT_A_DIRECTORY",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::TooManyRequests(_) => "TOO_MANY_REQUESTS",
            Self::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            Self::BadGateway(_) => "BAD_GATEWAY",
            Self::UnknownStatus { .. } => "UNKNOWN_STATUS",
            Self::Http(_) => "HTTP_ERROR",
            Self::Timeout(_) => "TIMEOUT",
            Self::Parse(_) => "PARSE_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::InvalidUrl(_) => "INVALID_URL",
        }
    }

    /// Classify a non-success HTTP status code into a distinct error kind.
    ///
    /// Statuses 400, 401, 403, 404, 429, 500, and 502 each have their own
    /// variant; anything else becomes [`Error::UnknownStatus`] carrying the
    /// numeric code.
    #[must_use]
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::BAD_REQUEST => Self::BadRequest(body),
            StatusCode::UNAUTHORIZED => Self::Unauthorized(body),
            StatusCode::FORBIDDEN => Self::Forbidden(body),
            StatusCode::NOT_FOUND => Self::NotFound(body),
            StatusCode::TOO_MANY_REQUESTS => Self::TooManyRequests(body),
            StatusCode::INTERNAL_SERVER_ERROR => Self::InternalServerError(body),
            StatusCode::BAD_GATEWAY => Self::BadGateway(body),
            status => Self::UnknownStatus {
                status: status.as_u16(),
                body,
            },
        }
    }
}

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_decode() {
            Self::Parse(err.to_string())
        } else {
            Self::Http(err.to_string())
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::MissingApiKey.error_code(), "MISSING_API_KEY");
        assert_eq!(
            Error::UnsupportedProvider("fox".to_string()).error_code(),
            "UNSUPPORTED_PROVIDER"
        );
        assert_eq!(
            Error::UnsupportedRequestType("PUT".to_string()).error_code(),
            "UNSUPPORTED_REQUEST_TYPE"
        );
        assert_eq!(
            Error::InvalidArgument("test".to_string()).error_code(),
            "INVALID_ARGUMENT"
        );
        assert_eq!(
            Error::InvalidImageFile(PathBuf::from("/tmp/x")).error_code(),
            "INVALID_IMAGE_FILE"
        );
        assert_eq!(
            Error::NotADirectory(PathBuf::from("/tmp/x")).error_code(),
            "NOT_A_DIRECTORY"
        );
        assert_eq!(
            Error::BadRequest("test".to_string()).error_code(),
            "BAD_REQUEST"
        );
        assert_eq!(
            Error::Unauthorized("test".to_string()).error_code(),
            "UNAUTHORIZED"
        );
        assert_eq!(
            Error::UnknownStatus {
                status: 418,
                body: "teapot".to_string()
            }
            .error_code(),
            "UNKNOWN_STATUS"
        );
    }

    #[test]
    fn test_from_status_distinct_variants() {
        let cases = [
            (400, "BAD_REQUEST"),
            (401, "UNAUTHORIZED"),
            (403, "FORBIDDEN"),
            (404, "NOT_FOUND"),
            (429, "TOO_MANY_REQUESTS"),
            (500, "INTERNAL_SERVER_ERROR"),
            (502, "BAD_GATEWAY"),
        ];

        for (code, expected) in cases {
            let status = StatusCode::from_u16(code).unwrap();
            let err = Error::from_status(status, "body".to_string());
            assert_eq!(err.error_code(), expected, "status {code}");
        }
    }

    #[test]
    fn test_from_status_unknown_carries_code() {
        let err = Error::from_status(StatusCode::IM_A_TEAPOT, "teapot".to_string());
        assert_eq!(
            err,
            Error::UnknownStatus {
                status: 418,
                body: "teapot".to_string()
            }
        );

        let err = Error::from_status(StatusCode::from_u16(503).unwrap(), String::new());
        assert!(matches!(err, Error::UnknownStatus { status: 503, .. }));
    }

    #[test]
    fn test_error_display() {
        let err = Error::Unauthorized("invalid key".to_string());
        assert_eq!(err.to_string(), "Invalid API key: invalid key");

        let err = Error::UnknownStatus {
            status: 418,
            body: "teapot".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unknown error with status code 418: teapot"
        );
    }

    #[test]
    fn test_from_serde_json_error() {
        let err = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let err: Error = err.into();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_from_url_parse_error() {
        let err = url::Url::parse("not a url").unwrap_err();
        let err: Error = err.into();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }

    #[test]
    fn test_error_clone_and_eq() {
        let err = Error::NotFound("test".to_string());
        assert_eq!(err, err.clone());
        assert_ne!(err, Error::NotFound("other".to_string()));
    }
}
