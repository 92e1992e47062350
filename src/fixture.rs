//! Conformance fixture format.
//!
//! A fixture pairs a configuration, a request and the header names to sign with the expected output of
//! one or more signing stages. Every expected field is optional, so a fixture can target a single stage.
//!
//! ```json
//! {
//!   "title": "GET with a query string",
//!   "config": {
//!     "accessKeyId": "key1",
//!     "apiSecret": "secret",
//!     "credentialScope": "eu/host/escher_request",
//!     "dateHeaderName": "X-Date",
//!     "date": "2011-09-09T23:36:00.000Z"
//!   },
//!   "request": { "method": "GET", "url": "/?k=p", "headers": [["X-Testing", "OK"]], "body": "" },
//!   "headersToSign": ["x-testing"],
//!   "expected": { "authHeader": "ESR-HMAC-SHA256 Credential=..." }
//! }
//! ```

use {
    crate::{chronoutil::parse_timestamp, Config, HashAlgorithm, RequestModel, SignatureError},
    chrono::{DateTime, Duration, Utc},
    serde::{Deserialize, Serialize},
    std::str::FromStr,
};

/// A single conformance fixture.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestFixture {
    /// A human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// The signer/verifier configuration.
    pub config: FixtureConfig,

    /// The request to sign or verify.
    pub request: FixtureRequest,

    /// The header names to sign, in addition to the date header.
    #[serde(default)]
    pub headers_to_sign: Vec<String>,

    /// The expected results.
    #[serde(default)]
    pub expected: Expected,
}

impl TestFixture {
    /// Parse a fixture from JSON.
    pub fn from_json(json: &str) -> Result<Self, SignatureError> {
        serde_json::from_str(json).map_err(|e| SignatureError::InvalidConfiguration(format!("Invalid fixture: {}", e)))
    }
}

/// The configuration block of a fixture. Unset options take the [`Config`] defaults.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureConfig {
    /// The access key id to sign with.
    pub access_key_id: String,

    /// The shared secret.
    pub api_secret: String,

    /// The credential scope without the date, terminator included: `eu/host/escher_request`.
    pub credential_scope: String,

    /// The algorithm prefix, e.g. `ESR`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algo_prefix: Option<String>,

    /// The vendor key, e.g. `Escher`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_key: Option<String>,

    /// `SHA256` or `SHA512`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash_algo: Option<String>,

    /// The authorization header name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_header_name: Option<String>,

    /// The date header name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_header_name: Option<String>,

    /// The current time, as RFC 3339 or any form the date header accepts.
    pub date: String,

    /// The clock skew tolerance in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clock_skew: Option<i64>,
}

impl FixtureConfig {
    /// The fixture's current time.
    pub fn now(&self) -> Result<DateTime<Utc>, SignatureError> {
        DateTime::parse_from_rfc3339(&self.date)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| parse_timestamp(&self.date))
            .ok_or_else(|| SignatureError::InvalidConfiguration(format!("Invalid fixture date: '{}'", self.date)))
    }

    /// Build a [`Config`] whose clock is fixed at the fixture's date.
    pub fn to_config(&self) -> Result<Config, SignatureError> {
        let mut parts: Vec<&str> = self.credential_scope.split('/').collect();
        let terminator = parts.pop().unwrap_or_default();

        let mut builder = Config::builder();
        builder
            .access_key_id(self.access_key_id.as_str())
            .secret(self.api_secret.as_str())
            .credential_scope(parts)
            .scope_terminator(terminator)
            .fixed_time(self.now()?);

        if let Some(prefix) = &self.algo_prefix {
            builder.algorithm_prefix(prefix.as_str());
        }

        if let Some(vendor_key) = &self.vendor_key {
            builder.vendor_key(vendor_key.as_str());
        }

        if let Some(hash) = &self.hash_algo {
            builder.hash_algorithm(HashAlgorithm::from_str(hash)?);
        }

        if let Some(name) = &self.auth_header_name {
            builder.auth_header_name(name.as_str());
        }

        if let Some(name) = &self.date_header_name {
            builder.date_header_name(name.as_str());
        }

        if let Some(skew) = self.clock_skew {
            let skew = Duration::try_seconds(skew).ok_or_else(|| {
                SignatureError::InvalidConfiguration(format!("Invalid fixture clock skew: {}", skew))
            })?;
            builder.clock_skew_tolerance(skew);
        }

        builder.build()
    }
}

/// A request in a fixture. Headers are `[name, value]` pairs; the body is text.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
pub struct FixtureRequest {
    /// The request method.
    pub method: String,

    /// The request URL.
    pub url: String,

    /// Header `[name, value]` pairs in order.
    #[serde(default)]
    pub headers: Vec<(String, String)>,

    /// The request body.
    #[serde(default)]
    pub body: String,
}

impl From<FixtureRequest> for RequestModel {
    fn from(request: FixtureRequest) -> Self {
        RequestModel::new(request.method, request.url).with_headers(request.headers).with_body(request.body)
    }
}

impl From<&RequestModel> for FixtureRequest {
    fn from(request: &RequestModel) -> Self {
        Self {
            method: request.method().to_string(),
            url: request.url().to_string(),
            headers: request.headers().to_vec(),
            body: String::from_utf8_lossy(request.body()).into_owned(),
        }
    }
}

/// The expected results of a fixture.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Expected {
    /// The canonical request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonicalized_request: Option<String>,

    /// The string to sign.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_to_sign: Option<String>,

    /// The authorization header value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_header: Option<String>,

    /// The fully signed request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<FixtureRequest>,

    /// The access key id a verifier should accept the request as.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key_id: Option<String>,

    /// The error code a verifier should reject the request with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
