//! End-to-end signing properties.

use chrono::{DateTime, TimeZone, Utc};
use simpledb_auth::{
    AuthError, Credentials, ParameterMap, RequestSigner, RequestSpec, SignatureMethod,
    verify_signed_query,
};

const VERSION: &str = "2009-04-15";

fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

fn signer() -> RequestSigner {
    RequestSigner::new(
        Credentials::new("AK", "SK"),
        RequestSpec::get("sdb.amazonaws.com"),
        SignatureMethod::HmacSha1,
    )
}

#[test]
fn test_should_match_golden_list_domains_signature() {
    let signed = signer()
        .sign("ListDomains", VERSION, &ParameterMap::new(), fixed_time())
        .unwrap();

    assert_eq!(
        signed.canonical_query(),
        "AWSAccessKeyId=AK&Action=ListDomains&SignatureMethod=HmacSHA1&SignatureVersion=2\
         &Timestamp=2024-01-01T00%3A00%3A00Z&Version=2009-04-15"
    );
    assert_eq!(signed.signature(), "0Qz9u+kHsBH7NZW63qxEpbKF4Uk=");
    assert_eq!(
        signed.to_url("https"),
        "https://sdb.amazonaws.com/?AWSAccessKeyId=AK&Action=ListDomains\
         &SignatureMethod=HmacSHA1&SignatureVersion=2&Timestamp=2024-01-01T00%3A00%3A00Z\
         &Version=2009-04-15&Signature=0Qz9u%2BkHsBH7NZW63qxEpbKF4Uk%3D"
    );
}

#[test]
fn test_should_match_golden_when_action_supplied_as_parameter() {
    // Passing Action/Version through the map yields the same request.
    let params: ParameterMap = [("Action", "ListDomains"), ("Version", VERSION)]
        .into_iter()
        .collect();
    let signed = signer()
        .sign("ListDomains", VERSION, &params, fixed_time())
        .unwrap();
    assert_eq!(signed.signature(), "0Qz9u+kHsBH7NZW63qxEpbKF4Uk=");
}

#[test]
fn test_should_produce_identical_output_on_repeated_calls() {
    let params: ParameterMap = [("DomainName", "users"), ("ItemName", "item 1")]
        .into_iter()
        .collect();
    let first = signer()
        .sign("GetAttributes", VERSION, &params, fixed_time())
        .unwrap();
    let second = signer()
        .sign("GetAttributes", VERSION, &params, fixed_time())
        .unwrap();
    assert_eq!(first.to_query_string(), second.to_query_string());
}

#[test]
fn test_should_ignore_parameter_insertion_order() {
    let pairs = [
        ("DomainName", "users"),
        ("ItemName", "item1"),
        ("Attribute.1.Name", "color"),
        ("Attribute.1.Value", "blue"),
        ("Attribute.1.Replace", "true"),
    ];
    let forward: ParameterMap = pairs.iter().copied().collect();
    let backward: ParameterMap = pairs.iter().rev().copied().collect();

    let a = signer()
        .sign("PutAttributes", VERSION, &forward, fixed_time())
        .unwrap();
    let b = signer()
        .sign("PutAttributes", VERSION, &backward, fixed_time())
        .unwrap();
    assert_eq!(a.to_query_string(), b.to_query_string());
}

#[test]
fn test_should_encode_reserved_characters_in_values() {
    let params: ParameterMap = [("SelectExpression", "a +/=&!*'()")].into_iter().collect();
    let signed = signer()
        .sign("Select", VERSION, &params, fixed_time())
        .unwrap();
    let query = signed.to_query_string();

    assert!(
        query.contains("SelectExpression=a%20%2B%2F%3D%26%21%2A%27%28%29"),
        "unexpected query: {query}"
    );
    assert!(!query.contains('+'));
}

#[test]
fn test_should_change_signature_with_timestamp() {
    let params = ParameterMap::new();
    let a = signer()
        .sign("ListDomains", VERSION, &params, fixed_time())
        .unwrap();
    let b = signer()
        .sign(
            "ListDomains",
            VERSION,
            &params,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 1).unwrap(),
        )
        .unwrap();
    assert_ne!(a.signature(), b.signature());
}

#[test]
fn test_should_verify_signed_query_for_both_methods() {
    for method in [SignatureMethod::HmacSha1, SignatureMethod::HmacSha256] {
        let signer = RequestSigner::new(
            Credentials::new("AK", "SK"),
            RequestSpec::get("sdb.amazonaws.com"),
            method,
        );
        let params: ParameterMap = [("DomainName", "déjà vu")].into_iter().collect();
        let signed = signer
            .sign("DomainMetadata", VERSION, &params, fixed_time())
            .unwrap();

        assert!(verify_signed_query(&signed.to_query_string(), "SK", signer.spec()).is_ok());
        assert_eq!(
            verify_signed_query(&signed.to_query_string(), "wrong", signer.spec()),
            Err(AuthError::SignatureDoesNotMatch)
        );
    }
}
