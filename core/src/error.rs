//! Error types for the ABN Lookup client.
//!
//! # Design
//! Every failure is fatal for the call that produced it: there is no retry
//! and no partial result. Non-2xx responses keep the raw status and body so
//! the caller can see what the service actually said.

use thiserror::Error;

/// Errors returned by `AbnLookupClient` and its transport.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The request never produced a response (DNS, connect, TLS, read).
    #[error("transport failed: {0}")]
    Transport(String),

    /// The response body was not well-formed XML.
    #[error("malformed XML: {0}")]
    Xml(String),

    /// The configured base URL cannot carry endpoint paths.
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
}
