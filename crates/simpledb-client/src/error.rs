//! Error types for the SimpleDB client.

use simpledb_auth::AuthError;
use simpledb_xml::XmlError;

/// Errors that can occur while building, sending or decoding a request.
///
/// Service-side failures (`<ErrorResponse>` documents) are not errors here:
/// they are decoded and returned like any other answer.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request could not be signed.
    #[error("signing error: {0}")]
    Auth(#[from] AuthError),

    /// The response body is not a well-formed document.
    #[error("response decoding error: {0}")]
    Xml(#[from] XmlError),

    /// The HTTP exchange failed (connection, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
