//! Error types for the catalog client.
//!
//! # Design
//! Transport failures and non-2xx responses share the `Communication`
//! variant; callers tell them apart through [`SpigetError::code`], which is
//! `None` when no HTTP response was received. Body decoding failures are kept
//! separate because the exchange itself succeeded.

use thiserror::Error;

use crate::endpoint::Endpoint;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by [`SpigetClient`](crate::SpigetClient) calls.
#[derive(Debug, Error)]
pub enum SpigetError {
    /// The exchange did not succeed: the transport failed (`code` is `None`)
    /// or the server answered outside `200..300`.
    #[error("{message}")]
    Communication {
        code: Option<u16>,
        message: String,
        /// The transport failure, when no response was received.
        #[source]
        source: Option<TransportError>,
    },

    /// The response body was not valid JSON, or did not match the requested type.
    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// A generic call supplied the wrong number of path parameters.
    #[error("{endpoint} expects {expected} path parameter(s), got {got}")]
    PathParameters {
        endpoint: Endpoint,
        expected: usize,
        got: usize,
    },
}

impl SpigetError {
    /// HTTP status carried by a `Communication` error.
    pub fn code(&self) -> Option<u16> {
        match self {
            SpigetError::Communication { code, .. } => *code,
            _ => None,
        }
    }

    pub fn is_communication(&self) -> bool {
        matches!(self, SpigetError::Communication { .. })
    }

    pub(crate) fn status(status: u16, body: &str) -> Self {
        SpigetError::Communication {
            code: Some(status),
            message: format!("The request resulted in a non-success HTTP code {status}; {body}"),
            source: None,
        }
    }
}

impl From<TransportError> for SpigetError {
    fn from(err: TransportError) -> Self {
        SpigetError::Communication {
            code: None,
            message: err.to_string(),
            source: Some(err),
        }
    }
}

/// Failure reported by a [`Transport`](crate::Transport) when no HTTP
/// response could be obtained (connection refused, DNS, TLS, timeout, ...).
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_carries_code_and_body() {
        let err = SpigetError::status(404, "{\"error\":\"not found\"}");
        assert_eq!(err.code(), Some(404));
        assert!(err.is_communication());
        assert_eq!(
            err.to_string(),
            "The request resulted in a non-success HTTP code 404; {\"error\":\"not found\"}"
        );
    }

    #[test]
    fn transport_error_has_no_code() {
        let err: SpigetError = TransportError::new("connection refused").into();
        assert_eq!(err.code(), None);
        assert!(err.is_communication());
        assert_eq!(err.to_string(), "connection refused");
    }

    #[test]
    fn transport_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out");
        let err = TransportError::with_source("request failed", io);
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("timed out"));
    }

    #[test]
    fn communication_error_chains_transport_cause() {
        use std::error::Error as _;

        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "socket timed out");
        let err: SpigetError = TransportError::with_source("GET failed", io).into();

        let transport = err.source().expect("transport error is chained");
        assert_eq!(transport.to_string(), "GET failed");
        let cause = transport.source().map(|s| s.to_string());
        assert_eq!(cause.as_deref(), Some("socket timed out"));
    }

    #[test]
    fn status_error_has_no_source() {
        use std::error::Error as _;

        assert!(SpigetError::status(500, "boom").source().is_none());
    }

    #[test]
    fn decode_error_is_not_communication() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = SpigetError::from(json_err);
        assert!(!err.is_communication());
        assert_eq!(err.code(), None);
    }
}
