//! Error types for the HopTrip API client.
//!
//! # Design
//! Callers see two kinds of failure once a request has been built:
//! [`ApiError`] when the service rejected the call with its structured
//! `{"error", "code"}` body, and [`TransportFailure`] for everything else.
//! `InvalidRequest` is reserved for programming errors caught by the builder
//! before any I/O happens.

use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error returned by every client operation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Structured rejection from the remote service.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Network failure, unexpected status, or an undecodable body.
    #[error(transparent)]
    Transport(#[from] TransportFailure),

    /// The call intent could not be turned into a request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl Error {
    /// HTTP status attached to the failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Transport(failure) => failure.status(),
            _ => None,
        }
    }

    pub fn is_api(&self) -> bool {
        matches!(self, Error::Api(_))
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}

/// Application-level error reported by the service.
///
/// `message` and `code` are passed through verbatim from the response body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (code {code})")]
pub struct ApiError {
    pub message: String,
    pub code: i64,
}

impl ApiError {
    pub fn new(message: impl Into<String>, code: i64) -> Self {
        Self {
            message: message.into(),
            code,
        }
    }
}

/// Any failure that is not a structured [`ApiError`].
///
/// Carries raw context for diagnosis. Not meant for fine-grained branching.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportFailure {
    /// Non-2xx response without the structured error shape.
    #[error("HTTP {status}: {body}")]
    Status {
        status: u16,
        headers: Vec<(String, String)>,
        body: String,
    },

    /// The body could not be decoded as UTF-8 JSON.
    #[error("malformed response body (HTTP {status}): {reason}")]
    MalformedBody {
        status: u16,
        headers: Vec<(String, String)>,
        body: String,
        reason: String,
    },

    /// DNS failure, refused connection, broken socket.
    #[error("connection error: {0}")]
    Connection(String),

    /// The transport gave up waiting for the server.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// A decoded value did not match the shape an endpoint expects.
    #[error("unexpected response shape at '{path}': {message}")]
    UnexpectedShape { path: String, message: String },
}

impl TransportFailure {
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportFailure::Status { status, .. } | TransportFailure::MalformedBody { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    pub fn headers(&self) -> &[(String, String)] {
        match self {
            TransportFailure::Status { headers, .. } | TransportFailure::MalformedBody { headers, .. } => {
                headers
            }
            _ => &[],
        }
    }

    /// Raw response text, lossily decoded.
    pub fn body(&self) -> Option<&str> {
        match self {
            TransportFailure::Status { body, .. } | TransportFailure::MalformedBody { body, .. } => {
                Some(body)
            }
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportFailure::Timeout(_))
    }

    pub fn is_connection(&self) -> bool {
        matches!(self, TransportFailure::Connection(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display() {
        let err = Error::from(ApiError::new("omg", 42));
        assert_eq!(err.to_string(), "omg (code 42)");
        assert!(err.is_api());
        assert_eq!(err.status(), None);
    }

    #[test]
    fn transport_failure_accessors() {
        let failure = TransportFailure::Status {
            status: 500,
            headers: vec![("x-request-id".to_string(), "abc".to_string())],
            body: "boom".to_string(),
        };
        assert_eq!(failure.status(), Some(500));
        assert_eq!(failure.body(), Some("boom"));
        assert_eq!(failure.headers().len(), 1);
        assert_eq!(failure.to_string(), "HTTP 500: boom");

        let err = Error::from(failure);
        assert!(err.is_transport());
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn network_failures_have_no_status() {
        let failure = TransportFailure::Connection("refused".to_string());
        assert!(failure.is_connection());
        assert_eq!(failure.status(), None);
        assert!(failure.headers().is_empty());
        assert!(failure.body().is_none());

        assert!(TransportFailure::Timeout("30s".to_string()).is_timeout());
    }

    #[test]
    fn invalid_request_display() {
        let err = Error::InvalidRequest("template expects 1 argument, got 2".to_string());
        assert_eq!(
            err.to_string(),
            "invalid request: template expects 1 argument, got 2"
        );
    }
}
