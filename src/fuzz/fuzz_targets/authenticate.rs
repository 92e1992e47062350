#![no_main]
use {
    arbitrary::Arbitrary,
    chrono::{TimeZone, Utc},
    escher_signature::{Authenticator, Config, RequestModel, SignedHeaderRequirements},
    libfuzzer_sys::{fuzz_target, Corpus},
    std::collections::HashMap,
};

#[derive(Arbitrary, Debug)]
enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Options,
    Patch,
}

impl HttpMethod {
    fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Patch => "PATCH",
        }
    }
}

#[derive(Arbitrary, Debug)]
struct VerifyInput {
    method: HttpMethod,
    url: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
    scope: Vec<String>,
    always_present: Vec<String>,
    if_in_request: Vec<String>,
    prefixes: Vec<String>,
}

fuzz_target!(|data: VerifyInput| -> Corpus {
    if run_target(data) {
        Corpus::Keep
    } else {
        Corpus::Reject
    }
});

/// Authenticate an arbitrary request. Rejections are expected; panics are not.
fn run_target(data: VerifyInput) -> bool {
    let Some(now) = Utc.with_ymd_and_hms(2011, 9, 9, 23, 36, 0).single() else {
        return false;
    };

    let Ok(config) = Config::builder()
        .access_key_id("key1")
        .secret("secret")
        .credential_scope(data.scope)
        .fixed_time(now)
        .build()
    else {
        return false;
    };

    let requirements = SignedHeaderRequirements::new(data.always_present, data.if_in_request, data.prefixes);
    let authenticator = Authenticator::new(config).with_signed_header_requirements(requirements);
    let request = RequestModel::new(data.method.as_str(), data.url).with_headers(data.headers).with_body(data.body);

    let mut secrets = HashMap::new();
    secrets.insert("key1".to_string(), "secret".to_string());
    let _ = authenticator.authenticate(&request, &secrets);
    true
}
