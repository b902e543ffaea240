//! Error types for SigV2 request signing.
//!
//! All signing and verification failures are represented by [`AuthError`].
//! Every variant is raised locally, before any request leaves the process.

/// Errors that can occur while signing or verifying a SigV2 request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The access key ID or the secret access key is empty.
    #[error("Invalid credential: access key and secret key must be non-empty")]
    InvalidCredential,

    /// The requested signature method is not one of `HmacSHA1` / `HmacSHA256`.
    #[error("Unsupported signature method: {0}")]
    UnsupportedSignatureMethod(String),

    /// A parameter required to verify a signed query string is missing.
    #[error("Missing required query parameter: {0}")]
    MissingQueryParam(String),

    /// The recomputed signature does not match the one carried by the request.
    #[error("Signature does not match")]
    SignatureDoesNotMatch,
}
