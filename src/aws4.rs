//! Known-answer tests from the AWS SigV4 test suite, run through the generic engine with an AWS-shaped
//! configuration.

use {
    crate::{Authenticator, Config, RequestModel, Signer},
    chrono::{DateTime, TimeZone, Utc},
    log::debug,
    std::collections::HashMap,
};

const ACCESS_KEY_ID: &str = "AKIDEXAMPLE";
const SECRET_KEY: &str = "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY";
const CREDENTIAL: &str = "AKIDEXAMPLE/20150830/us-east-1/service/aws4_request";
const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

fn test_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2015, 8, 30, 12, 36, 0).unwrap()
}

fn aws_config() -> Config {
    Config::builder()
        .access_key_id(ACCESS_KEY_ID)
        .secret(SECRET_KEY)
        .credential_scope(["us-east-1", "service"])
        .scope_terminator("aws4_request")
        .algorithm_prefix("AWS4")
        .vendor_key("Amz")
        .auth_header_name("Authorization")
        .date_header_name("X-Amz-Date")
        .fixed_time(test_time())
        .build()
        .unwrap()
}

fn base_request(method: &str, url: &str) -> RequestModel {
    RequestModel::new(method, url)
        .with_header("Host", "example.amazonaws.com")
        .with_header("X-Amz-Date", "20150830T123600Z")
}

/// Check the canonical request, the authorization header and a verification round trip for one case.
fn run(name: &str, request: RequestModel, headers_to_sign: &[&str], expected_creq: &str, expected_signature: &str) {
    let signer = Signer::new(aws_config());

    let creq = signer.canonicalize_request(&request, headers_to_sign).unwrap();
    assert_eq!(creq.to_string(), expected_creq, "Canonical request does not match on {}", name);
    debug!("Canonical request matches on {}:\n--------\n{}\n--------", name, creq);

    let header = signer.generate_header(&request, headers_to_sign).unwrap();
    let signed_headers = creq.signed_headers().to_string();
    assert_eq!(
        header,
        format!(
            "AWS4-HMAC-SHA256 Credential={}, SignedHeaders={}, Signature={}",
            CREDENTIAL, signed_headers, expected_signature
        ),
        "Authorization header does not match on {}",
        name
    );

    let signed = request.with_header("Authorization", header);
    let mut secrets = HashMap::new();
    secrets.insert(ACCESS_KEY_ID.to_string(), SECRET_KEY.to_string());
    let identity = Authenticator::new(aws_config()).authenticate(&signed, &secrets).unwrap();
    assert_eq!(identity.access_key_id(), ACCESS_KEY_ID);
}

#[test_log::test]
fn get_vanilla() {
    run(
        "get-vanilla",
        base_request("GET", "/"),
        &["host"],
        &format!(
            "GET\n/\n\nhost:example.amazonaws.com\nx-amz-date:20150830T123600Z\n\nhost;x-amz-date\n{}",
            EMPTY_SHA256
        ),
        "5fa00fa31553b73ebf1942676e86291e8372ff2a2260956d9b8aae1d763fbf31",
    );
}

#[test_log::test]
fn get_vanilla_query_order_key_case() {
    run(
        "get-vanilla-query-order-key-case",
        base_request("GET", "/?Param2=value2&Param1=value1"),
        &["host"],
        &format!(
            "GET\n/\nParam1=value1&Param2=value2\nhost:example.amazonaws.com\nx-amz-date:20150830T123600Z\n\n\
             host;x-amz-date\n{}",
            EMPTY_SHA256
        ),
        "b97d918cfa904a5beff61c982a1b6f458b799221646efd99d3219ec94cdf2500",
    );
}

#[test_log::test]
fn post_vanilla() {
    run(
        "post-vanilla",
        base_request("POST", "/"),
        &["host"],
        &format!(
            "POST\n/\n\nhost:example.amazonaws.com\nx-amz-date:20150830T123600Z\n\nhost;x-amz-date\n{}",
            EMPTY_SHA256
        ),
        "5da7c1a2acd57cee7505fc6676e4e544621c30862966e37dddb68e92efbe5d6b",
    );
}

#[test_log::test]
fn get_header_value_trim() {
    let request = RequestModel::new("GET", "/").with_headers([
        ("Host", "example.amazonaws.com"),
        ("My-Header1", " value1"),
        ("My-Header2", " \"a   b   c\""),
        ("X-Amz-Date", "20150830T123600Z"),
    ]);
    run(
        "get-header-value-trim",
        request,
        &["host", "my-header1", "my-header2"],
        &format!(
            "GET\n/\n\nhost:example.amazonaws.com\nmy-header1:value1\nmy-header2:\"a b c\"\n\
             x-amz-date:20150830T123600Z\n\nhost;my-header1;my-header2;x-amz-date\n{}",
            EMPTY_SHA256
        ),
        "acc3ed3afb60bb290fc8d2dd0098b9911fcaa05412b367055dee359757a9c736",
    );
}

#[test_log::test]
fn get_unreserved() {
    run(
        "get-unreserved",
        base_request("GET", "/-._~0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz"),
        &["host"],
        &format!(
            "GET\n/-._~0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz\n\n\
             host:example.amazonaws.com\nx-amz-date:20150830T123600Z\n\nhost;x-amz-date\n{}",
            EMPTY_SHA256
        ),
        "07ef7494c76fa4850883e2b006601f940f8a34d404d0cfa977f52a65bbf5f24f",
    );
}

#[test_log::test]
fn get_relative_relative() {
    run(
        "get-relative-relative",
        base_request("GET", "/example1/example2/../.."),
        &["host"],
        &format!(
            "GET\n/\n\nhost:example.amazonaws.com\nx-amz-date:20150830T123600Z\n\nhost;x-amz-date\n{}",
            EMPTY_SHA256
        ),
        "5fa00fa31553b73ebf1942676e86291e8372ff2a2260956d9b8aae1d763fbf31",
    );
}
