//! Client configuration.
//!
//! Provides [`ClientConfig`] for pointing a [`SimpleDbClient`](crate::SimpleDbClient)
//! at an endpoint. Values can be set with the builder or loaded from
//! environment variables.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use simpledb_auth::{Credentials, SignatureMethod};
use typed_builder::TypedBuilder;

use crate::error::{ClientError, ClientResult};

/// Default SimpleDB endpoint.
pub const DEFAULT_HOST: &str = "sdb.amazonaws.com";

/// SimpleDB API version sent with every request.
pub const DEFAULT_API_VERSION: &str = "2009-04-15";

/// How response bodies are handed back to the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultFormat {
    /// The body text, untouched.
    Raw,
    /// The parsed element tree.
    #[default]
    Xml,
    /// The flattened object.
    Json,
}

impl ResultFormat {
    /// Returns the lowercase name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Xml => "xml",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for ResultFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResultFormat {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "raw" => Ok(Self::Raw),
            "xml" => Ok(Self::Xml),
            "json" => Ok(Self::Json),
            other => Err(ClientError::Config(format!(
                "unknown result format {other:?} (expected raw, xml or json)"
            ))),
        }
    }
}

/// SimpleDB client configuration.
///
/// # Examples
///
/// ```
/// use simpledb_client::{ClientConfig, ResultFormat};
///
/// let config = ClientConfig::builder()
///     .access_key("AK".into())
///     .secret_key("SK".into())
///     .result_format(ResultFormat::Json)
///     .build();
/// assert_eq!(config.host, "sdb.amazonaws.com");
/// assert_eq!(config.endpoint(), "https://sdb.amazonaws.com/");
/// ```
#[derive(Clone, TypedBuilder)]
pub struct ClientConfig {
    /// AWS access key ID.
    pub access_key: String,

    /// AWS secret access key.
    pub secret_key: String,

    /// How responses are returned.
    #[builder(default)]
    pub result_format: ResultFormat,

    /// Endpoint host, optionally with a port.
    #[builder(default = String::from(DEFAULT_HOST))]
    pub host: String,

    /// URL scheme (`https` or `http`).
    #[builder(default = String::from("https"))]
    pub scheme: String,

    /// API version.
    #[builder(default = String::from(DEFAULT_API_VERSION))]
    pub version: String,

    /// HMAC algorithm used for signatures.
    #[builder(default)]
    pub signature_method: SignatureMethod,

    /// Per-request timeout in seconds.
    #[builder(default = 30)]
    pub timeout_secs: u64,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("result_format", &self.result_format)
            .field("host", &self.host)
            .field("scheme", &self.scheme)
            .field("version", &self.version)
            .field("signature_method", &self.signature_method)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `AWS_ACCESS_KEY_ID` | required |
    /// | `AWS_SECRET_ACCESS_KEY` | required |
    /// | `SDB_HOST` | `sdb.amazonaws.com` |
    /// | `SDB_SCHEME` | `https` |
    /// | `SDB_RESULT_FORMAT` | `xml` |
    /// | `SDB_SIGNATURE_METHOD` | `HmacSHA1` |
    /// | `SDB_TIMEOUT_SECS` | `30` |
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] when a key is missing or a value does
    /// not parse.
    pub fn from_env() -> ClientResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`ClientConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ClientResult<Self> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ClientError::Config(format!("{key} is not set")))
        };

        let mut config = Self::builder()
            .access_key(required("AWS_ACCESS_KEY_ID")?)
            .secret_key(required("AWS_SECRET_ACCESS_KEY")?)
            .build();

        if let Some(v) = lookup("SDB_HOST") {
            config.host = v;
        }
        if let Some(v) = lookup("SDB_SCHEME") {
            config.scheme = v;
        }
        if let Some(v) = lookup("SDB_RESULT_FORMAT") {
            config.result_format = v.parse()?;
        }
        if let Some(v) = lookup("SDB_SIGNATURE_METHOD") {
            config.signature_method = v.parse()?;
        }
        if let Some(v) = lookup("SDB_TIMEOUT_SECS") {
            config.timeout_secs = v
                .parse()
                .map_err(|_| ClientError::Config(format!("SDB_TIMEOUT_SECS: invalid value {v:?}")))?;
        }

        Ok(config)
    }

    /// The credential pair used for signing.
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.access_key.clone(), self.secret_key.clone())
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{}://{}/", self.scheme, self.host)
    }

    /// Per-request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_should_apply_builder_defaults() {
        let config = ClientConfig::builder()
            .access_key("AK".into())
            .secret_key("SK".into())
            .build();
        assert_eq!(config.result_format, ResultFormat::Xml);
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.scheme, "https");
        assert_eq!(config.version, "2009-04-15");
        assert_eq!(config.signature_method, SignatureMethod::HmacSha1);
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_should_load_from_lookup() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("AWS_ACCESS_KEY_ID", "AK"),
            ("AWS_SECRET_ACCESS_KEY", "SK"),
            ("SDB_HOST", "localhost:8080"),
            ("SDB_SCHEME", "http"),
            ("SDB_RESULT_FORMAT", "JSON"),
            ("SDB_SIGNATURE_METHOD", "HmacSHA256"),
            ("SDB_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();

        assert_eq!(config.endpoint(), "http://localhost:8080/");
        assert_eq!(config.result_format, ResultFormat::Json);
        assert_eq!(config.signature_method, SignatureMethod::HmacSha256);
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn test_should_require_credentials() {
        let result = ClientConfig::from_lookup(lookup(&[("AWS_ACCESS_KEY_ID", "AK")]));
        assert!(matches!(result, Err(ClientError::Config(msg)) if msg.contains("AWS_SECRET_ACCESS_KEY")));
    }

    #[test]
    fn test_should_reject_invalid_values() {
        let base = [("AWS_ACCESS_KEY_ID", "AK"), ("AWS_SECRET_ACCESS_KEY", "SK")];

        let mut vars = base.to_vec();
        vars.push(("SDB_RESULT_FORMAT", "yaml"));
        assert!(ClientConfig::from_lookup(lookup(&vars)).is_err());

        let mut vars = base.to_vec();
        vars.push(("SDB_SIGNATURE_METHOD", "HmacMD5"));
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&vars)),
            Err(ClientError::Auth(_))
        ));

        let mut vars = base.to_vec();
        vars.push(("SDB_TIMEOUT_SECS", "soon"));
        assert!(ClientConfig::from_lookup(lookup(&vars)).is_err());
    }

    #[test]
    fn test_should_redact_secret_in_debug() {
        let config = ClientConfig::builder()
            .access_key("AK".into())
            .secret_key("very-secret".into())
            .build();
        let debug = format!("{config:?}");
        assert!(debug.contains("AK"));
        assert!(!debug.contains("very-secret"));
    }

    #[test]
    fn test_should_parse_result_format_names() {
        assert_eq!("raw".parse::<ResultFormat>().unwrap(), ResultFormat::Raw);
        assert_eq!("Xml".parse::<ResultFormat>().unwrap(), ResultFormat::Xml);
        assert_eq!(ResultFormat::Json.to_string(), "json");
    }
}
