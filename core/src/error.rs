//! Error types for the cat API client.
//!
//! # Design
//! Credential failures are raised before a request is built, so callers can
//! tell "never sent" apart from "the server said no". Every non-success
//! status lands in `Request` with the raw status code and body. Failures to
//! complete the round-trip at all (DNS, refused connection, timeout) stay in
//! their own `Transport` variant and are never folded into `Request`.

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by `CatApiClient` operations.
#[derive(Debug, Error)]
pub enum CatApiError {
    /// The operation needs an API key (or a premium one) and the client has
    /// none configured. No request was sent.
    #[error("{message}")]
    Credential { message: String },

    /// The server answered with a status outside the operation's success set.
    #[error("HTTP {status}: {body}")]
    Request { status: u16, body: String },

    /// The request could not be completed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The base URL is not an absolute `http` or `https` URL.
    #[error("invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The file passed to `upload_image` could not be read.
    #[error("failed to read upload file {}", path.display())]
    UploadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CatApiError {
    /// HTTP status of a `Request` error, `None` for every other variant.
    pub fn status(&self) -> Option<u16> {
        match self {
            CatApiError::Request { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn credential(message: impl Into<String>) -> Self {
        CatApiError::Credential {
            message: message.into(),
        }
    }
}

/// A request that never produced an HTTP response.
#[derive(Debug, Error)]
#[error("transport failure: {message}")]
pub struct TransportError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
