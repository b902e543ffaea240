//! Canonical request construction for AWS Signature Version 2.
//!
//! The string to sign for a query-API request is:
//!
//! ```text
//! HTTPVerb\n
//! ValueOfHostHeaderInLowercase\n
//! HTTPRequestURI\n
//! CanonicalizedQueryString
//! ```
//!
//! where the canonicalized query string is every parameter except `Signature`,
//! sorted by name in byte order, each name and value strictly percent-encoded
//! and joined as `name=value` pairs with `&`.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// The set of characters that must be percent-encoded in keys and values.
///
/// Everything except the RFC 3986 unreserved characters
/// (A-Z, a-z, 0-9, `-`, `_`, `.`, `~`) is encoded, including space, `!`, `*`,
/// `'`, `(` and `)`.
const STRICT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-encode a string using the strict SigV2 rules.
///
/// # Examples
///
/// ```
/// use simpledb_auth::canonical::strict_encode;
///
/// assert_eq!(strict_encode("a b"), "a%20b");
/// assert_eq!(strict_encode("it's (ok)!*"), "it%27s%20%28ok%29%21%2A");
/// assert_eq!(strict_encode("A-z_0.9~"), "A-z_0.9~");
/// ```
#[must_use]
pub fn strict_encode(input: &str) -> String {
    utf8_percent_encode(input, STRICT_ENCODE_SET).to_string()
}

/// Build the canonicalized query string from unencoded `(name, value)` pairs.
///
/// Pairs are sorted by name using byte order, never locale-aware collation,
/// then encoded with [`strict_encode`].
///
/// # Examples
///
/// ```
/// use simpledb_auth::canonical::build_canonical_query_string;
///
/// let query = build_canonical_query_string([("b", "2"), ("a", "x y")]);
/// assert_eq!(query, "a=x%20y&b=2");
/// ```
#[must_use]
pub fn build_canonical_query_string<'a>(
    params: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> String {
    let mut sorted: Vec<(&str, &str)> = params.into_iter().collect();
    sorted.sort_unstable_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
    encode_sorted_pairs(sorted)
}

/// Encode and join pairs that are already in byte order of their names.
pub(crate) fn encode_sorted_pairs<'a>(
    sorted: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> String {
    sorted
        .into_iter()
        .map(|(k, v)| format!("{}={}", strict_encode(k), strict_encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Build the SigV2 string to sign.
///
/// The host is lowercased; the verb and path are used as given.
///
/// # Examples
///
/// ```
/// use simpledb_auth::canonical::build_string_to_sign;
///
/// let sts = build_string_to_sign("GET", "SDB.amazonaws.com", "/", "Action=ListDomains");
/// assert_eq!(sts, "GET\nsdb.amazonaws.com\n/\nAction=ListDomains");
/// ```
#[must_use]
pub fn build_string_to_sign(
    verb: &str,
    host: &str,
    uri_path: &str,
    canonical_query: &str,
) -> String {
    let host = host.to_lowercase();
    format!("{verb}\n{host}\n{uri_path}\n{canonical_query}")
}
