//! AWS Signature Version 2 signing for query-API requests.
//!
//! SigV2 binds the HTTP verb, host, path and every request parameter into one
//! HMAC. The signed request carries these parameters in addition to the
//! caller's own:
//!
//! ```text
//! Action, Version, AWSAccessKeyId, SignatureVersion=2,
//! SignatureMethod=HmacSHA1|HmacSHA256, Timestamp=YYYY-MM-DDTHH:MM:SSZ,
//! Signature=Base64(HMAC(SecretKey, StringToSign))
//! ```
//!
//! See [`crate::canonical`] for the string-to-sign layout. The main entry
//! points are [`RequestSigner::sign`] and [`verify_signed_query`].

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use hmac::{Hmac, KeyInit, Mac};
use percent_encoding::percent_decode_str;
use sha1::Sha1;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::canonical::{
    build_canonical_query_string, build_string_to_sign, encode_sorted_pairs, strict_encode,
};
use crate::credentials::Credentials;
use crate::error::AuthError;
use crate::params::ParameterMap;

type HmacSha1 = Hmac<Sha1>;
type HmacSha256 = Hmac<Sha256>;

/// Value of the `SignatureVersion` parameter.
pub const SIGNATURE_VERSION: &str = "2";

/// Format of the `Timestamp` parameter (ISO 8601, UTC, second precision).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Name of the parameter carrying the signature.
pub const SIGNATURE_PARAM: &str = "Signature";

/// Keyed-hash algorithm used for the signature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SignatureMethod {
    /// HMAC with SHA-1.
    #[default]
    HmacSha1,
    /// HMAC with SHA-256.
    HmacSha256,
}

impl SignatureMethod {
    /// The wire name sent as `SignatureMethod`.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HmacSha1 => "HmacSHA1",
            Self::HmacSha256 => "HmacSHA256",
        }
    }
}

impl fmt::Display for SignatureMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignatureMethod {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HmacSHA1" => Ok(Self::HmacSha1),
            "HmacSHA256" => Ok(Self::HmacSha256),
            other => Err(AuthError::UnsupportedSignatureMethod(other.to_owned())),
        }
    }
}

/// The fixed request coordinates covered by the signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    /// HTTP verb.
    pub verb: http::Method,
    /// Target host, optionally with a port.
    pub host: String,
    /// Request URI path.
    pub uri_path: String,
}

impl RequestSpec {
    /// A `GET /` request against `host`.
    pub fn get(host: impl Into<String>) -> Self {
        Self {
            verb: http::Method::GET,
            host: host.into(),
            uri_path: "/".to_owned(),
        }
    }
}

/// Signs parameter maps for one credential pair and endpoint.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use simpledb_auth::{Credentials, ParameterMap, RequestSigner, RequestSpec, SignatureMethod};
///
/// let signer = RequestSigner::new(
///     Credentials::new("AK", "SK"),
///     RequestSpec::get("sdb.amazonaws.com"),
///     SignatureMethod::HmacSha1,
/// );
/// let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// let signed = signer.sign("ListDomains", "2009-04-15", &ParameterMap::new(), at).unwrap();
/// assert_eq!(signed.signature(), "0Qz9u+kHsBH7NZW63qxEpbKF4Uk=");
/// ```
#[derive(Debug, Clone)]
pub struct RequestSigner {
    credentials: Credentials,
    spec: RequestSpec,
    method: SignatureMethod,
}

impl RequestSigner {
    /// Create a signer.
    #[must_use]
    pub fn new(credentials: Credentials, spec: RequestSpec, method: SignatureMethod) -> Self {
        Self {
            credentials,
            spec,
            method,
        }
    }

    /// The endpoint this signer binds signatures to.
    #[must_use]
    pub fn spec(&self) -> &RequestSpec {
        &self.spec
    }

    /// The access key ID sent with each request.
    #[must_use]
    pub fn access_key_id(&self) -> &str {
        self.credentials.access_key_id()
    }

    /// Sign `params` for `action`.
    ///
    /// The standard SigV2 parameters are injected and override any
    /// caller-supplied values of the same name; a caller-supplied `Signature`
    /// is discarded. The clock is never read: `timestamp` is the only source
    /// of time, so identical inputs always produce identical output.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredential`] if either key is empty.
    pub fn sign(
        &self,
        action: &str,
        version: &str,
        params: &ParameterMap,
        timestamp: DateTime<Utc>,
    ) -> Result<SignedRequest, AuthError> {
        self.credentials.validate()?;

        let mut all = params.clone();
        all.remove(SIGNATURE_PARAM);
        all.insert("Action", action);
        all.insert("Version", version);
        all.insert("SignatureVersion", SIGNATURE_VERSION);
        all.insert("SignatureMethod", self.method.as_str());
        all.insert("Timestamp", timestamp.format(TIMESTAMP_FORMAT).to_string());
        all.insert("AWSAccessKeyId", self.credentials.access_key_id());

        let mut sorted: Vec<(String, String)> = all
            .iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        sorted.sort_unstable_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

        let canonical_query =
            encode_sorted_pairs(sorted.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        let string_to_sign = build_string_to_sign(
            self.spec.verb.as_str(),
            &self.spec.host,
            &self.spec.uri_path,
            &canonical_query,
        );

        debug!(string_to_sign = ?string_to_sign, "Built SigV2 string to sign");

        let signature = compute_signature(
            self.method,
            self.credentials.secret_access_key(),
            &string_to_sign,
        )?;

        Ok(SignedRequest {
            params: sorted,
            canonical_query,
            signature,
            spec: self.spec.clone(),
        })
    }
}

/// A signed request, ready to be rendered as a query string or URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    params: Vec<(String, String)>,
    canonical_query: String,
    signature: String,
    spec: RequestSpec,
}

impl SignedRequest {
    /// The Base64 signature, unencoded.
    #[must_use]
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Look up a signed parameter (`Signature` included).
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        if key == SIGNATURE_PARAM {
            return Some(&self.signature);
        }
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate over the signed parameters in canonical order, `Signature` excluded.
    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The canonicalized query string that was signed.
    #[must_use]
    pub fn canonical_query(&self) -> &str {
        &self.canonical_query
    }

    /// The full query string: the canonical query followed by `Signature`.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        format!(
            "{}&{SIGNATURE_PARAM}={}",
            self.canonical_query,
            strict_encode(&self.signature)
        )
    }

    /// The request URL for the given scheme (`http` or `https`).
    #[must_use]
    pub fn to_url(&self, scheme: &str) -> String {
        format!(
            "{scheme}://{}{}?{}",
            self.spec.host,
            self.spec.uri_path,
            self.to_query_string()
        )
    }
}

/// Verify a SigV2-signed query string against a secret key.
///
/// Every parameter except `Signature` takes part in the recomputation, so a
/// query whose parameters, host, path or verb differ from what was signed is
/// rejected.
///
/// # Errors
///
/// Returns [`AuthError::MissingQueryParam`] if `Signature`, `SignatureMethod`
/// or `SignatureVersion` is absent, [`AuthError::UnsupportedSignatureMethod`]
/// for an unknown method or version, and [`AuthError::SignatureDoesNotMatch`]
/// when the signature is wrong.
pub fn verify_signed_query(
    query: &str,
    secret_key: &str,
    spec: &RequestSpec,
) -> Result<(), AuthError> {
    let mut provided_signature = None;
    let mut params: Vec<(String, String)> = Vec::new();

    for param in query.split('&').filter(|s| !s.is_empty()) {
        let (key, value) = param.split_once('=').unwrap_or((param, ""));
        let key = url_decode(key);
        let value = url_decode(value);
        if key == SIGNATURE_PARAM {
            provided_signature = Some(value);
        } else {
            params.push((key, value));
        }
    }

    let provided_signature = provided_signature
        .ok_or_else(|| AuthError::MissingQueryParam(SIGNATURE_PARAM.to_owned()))?;
    let method: SignatureMethod = find_param(&params, "SignatureMethod")?.parse()?;
    let version = find_param(&params, "SignatureVersion")?;
    if version != SIGNATURE_VERSION {
        return Err(AuthError::UnsupportedSignatureMethod(format!(
            "SignatureVersion {version}"
        )));
    }

    let canonical_query =
        build_canonical_query_string(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    let string_to_sign = build_string_to_sign(
        spec.verb.as_str(),
        &spec.host,
        &spec.uri_path,
        &canonical_query,
    );
    let expected_signature = compute_signature(method, secret_key, &string_to_sign)?;

    if provided_signature
        .as_bytes()
        .ct_eq(expected_signature.as_bytes())
        .into()
    {
        debug!("SigV2 verification succeeded");
        Ok(())
    } else {
        debug!(
            expected = %expected_signature,
            provided = %provided_signature,
            "SigV2 signature mismatch"
        );
        Err(AuthError::SignatureDoesNotMatch)
    }
}

/// Compute `Base64(HMAC(secret, string_to_sign))` with the given method.
fn compute_signature(
    method: SignatureMethod,
    secret_key: &str,
    string_to_sign: &str,
) -> Result<String, AuthError> {
    let digest = match method {
        SignatureMethod::HmacSha1 => {
            let mut mac = HmacSha1::new_from_slice(secret_key.as_bytes())
                .map_err(|_| AuthError::InvalidCredential)?;
            mac.update(string_to_sign.as_bytes());
            mac.finalize().into_bytes().to_vec()
        }
        SignatureMethod::HmacSha256 => {
            let mut mac = HmacSha256::new_from_slice(secret_key.as_bytes())
                .map_err(|_| AuthError::InvalidCredential)?;
            mac.update(string_to_sign.as_bytes());
            mac.finalize().into_bytes().to_vec()
        }
    };
    Ok(BASE64.encode(digest))
}

fn find_param<'a>(params: &'a [(String, String)], name: &str) -> Result<&'a str, AuthError> {
    params
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
        .ok_or_else(|| AuthError::MissingQueryParam(name.to_owned()))
}

fn url_decode(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}
