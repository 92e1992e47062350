//! The authorization artifact in its two placements.
//!
//! Header form:
//!
//! ```text
//! ESR-HMAC-SHA256 Credential=key1/20110909/eu/escher_request, SignedHeaders=host;x-escher-date, Signature=abcd...
//! ```
//!
//! Query form (presigned URLs): `X-<vendor>-Algorithm`, `X-<vendor>-Credential`, `X-<vendor>-Date`,
//! `X-<vendor>-Expires`, `X-<vendor>-SignedHeaders` and `X-<vendor>-Signature`.

use {
    crate::{
        chronoutil::{format_timestamp, parse_timestamp},
        constants::*,
        AuthenticationError, Config, CredentialScope, RejectionReason, RequestModel, SignedHeaders,
    },
    chrono::{DateTime, Utc},
    log::trace,
    std::collections::HashMap,
};

/// Where the artifact travels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArtifactPlacement {
    /// In the authorization header; the timestamp comes from the date header.
    Header,

    /// In query parameters.
    Query {
        /// The request timestamp (`X-<vendor>-Date`).
        timestamp: DateTime<Utc>,

        /// Seconds after the timestamp that the URL stays valid (`X-<vendor>-Expires`).
        expires: i64,
    },
}

/// A parsed or freshly generated authorization artifact.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthArtifact {
    algorithm: String,
    access_key_id: String,
    scope: CredentialScope,
    signed_headers: SignedHeaders,
    signature: String,
    placement: ArtifactPlacement,
}

impl AuthArtifact {
    /// Create a new artifact.
    pub fn new<A, K, S>(
        algorithm: A,
        access_key_id: K,
        scope: CredentialScope,
        signed_headers: SignedHeaders,
        signature: S,
        placement: ArtifactPlacement,
    ) -> Self
    where
        A: Into<String>,
        K: Into<String>,
        S: Into<String>,
    {
        Self {
            algorithm: algorithm.into(),
            access_key_id: access_key_id.into(),
            scope,
            signed_headers,
            signature: signature.into(),
            placement,
        }
    }

    /// The algorithm tag, e.g. `ESR-HMAC-SHA256`.
    #[inline]
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    /// The access key id from the credential.
    #[inline]
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    /// The credential scope from the credential.
    #[inline]
    pub fn scope(&self) -> &CredentialScope {
        &self.scope
    }

    /// The signed header list.
    #[inline]
    pub fn signed_headers(&self) -> &SignedHeaders {
        &self.signed_headers
    }

    /// The hex signature.
    #[inline]
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Where the artifact travels.
    #[inline]
    pub fn placement(&self) -> &ArtifactPlacement {
        &self.placement
    }

    /// The credential string, `accesskeyid/scope`.
    pub fn credential(&self) -> String {
        format!("{}/{}", self.access_key_id, self.scope)
    }

    /// Render the authorization header value.
    pub fn to_header_value(&self) -> String {
        format!(
            "{} {}={}, {}={}, {}={}",
            self.algorithm,
            CREDENTIAL,
            self.credential(),
            SIGNED_HEADERS,
            self.signed_headers,
            SIGNATURE,
            self.signature
        )
    }

    /// Render the presigned query parameters (unencoded), signature last. Returns an empty list for
    /// header artifacts.
    pub fn to_query_parameters(&self, config: &Config) -> Vec<(String, String)> {
        match &self.placement {
            ArtifactPlacement::Header => Vec::new(),
            ArtifactPlacement::Query {
                timestamp,
                expires,
            } => vec![
                (config.query_param_name(QP_ALGORITHM), self.algorithm.clone()),
                (config.query_param_name(QP_CREDENTIAL), self.credential()),
                (config.query_param_name(QP_DATE), format_timestamp(timestamp)),
                (config.query_param_name(QP_EXPIRES), expires.to_string()),
                (config.query_param_name(QP_SIGNED_HEADERS), self.signed_headers.to_string()),
                (config.query_param_name(QP_SIGNATURE), self.signature.clone()),
            ],
        }
    }

    /// Parse an authorization header value.
    pub fn parse_header_value(value: &str) -> Result<Self, AuthenticationError> {
        let value = value.trim();
        let (algorithm, parameters) = match value.split_once(|c: char| c.is_ascii_whitespace()) {
            Some((algorithm, parameters)) => (algorithm, parameters),
            None => (value, ""),
        };

        if algorithm.is_empty() {
            return Err(malformed(MSG_REQUEST_MISSING_AUTH.to_string()));
        }

        // Split the parameters by commas; trim each one; then split into key=value pairs.
        let mut parameter_map = HashMap::new();
        for parameter in parameters.split(',').map(str::trim) {
            if parameter.is_empty() {
                continue;
            }

            match parameter.split_once('=') {
                // Use the last value for each key.
                Some((key, value)) => {
                    parameter_map.insert(key.trim(), value.trim());
                }
                None => {
                    return Err(malformed(format!(
                        "'{}' not a valid key=value pair (missing equal-sign) in authorization header: '{}'",
                        parameter, value
                    )))
                }
            }
        }

        let mut missing = Vec::new();
        let credential = parameter_map.get(CREDENTIAL);
        let signed_headers = parameter_map.get(SIGNED_HEADERS);
        let signature = parameter_map.get(SIGNATURE);
        for (name, v) in [(CREDENTIAL, credential), (SIGNED_HEADERS, signed_headers), (SIGNATURE, signature)] {
            if v.map(|s| s.is_empty()).unwrap_or(true) {
                missing.push(name);
            }
        }

        match (credential, signed_headers, signature) {
            (Some(credential), Some(signed_headers), Some(signature)) if missing.is_empty() => {
                let (access_key_id, scope) = CredentialScope::parse_credential(credential)?;
                let result = Self {
                    algorithm: algorithm.to_string(),
                    access_key_id,
                    scope,
                    signed_headers: SignedHeaders::new(signed_headers.split(';')),
                    signature: signature.to_string(),
                    placement: ArtifactPlacement::Header,
                };
                trace!("Parsed authorization header: {:?}", result);
                Ok(result)
            }
            _ => Err(malformed(format!("Authorization header requires parameters: {}", missing.join(", ")))),
        }
    }

    /// Parse presigned query parameters from a request. Returns `Ok(None)` if the request carries no
    /// presigned signature.
    pub fn from_query(request: &RequestModel, config: &Config) -> Result<Option<Self>, AuthenticationError> {
        let params = request.query_parameters()?;
        if !has_presign_marker(&params, config) {
            return Ok(None);
        }

        let names: Vec<String> =
            [QP_ALGORITHM, QP_CREDENTIAL, QP_DATE, QP_EXPIRES, QP_SIGNED_HEADERS, QP_SIGNATURE]
                .iter()
                .map(|suffix| config.query_param_name(suffix))
                .collect();
        let values: Vec<Option<&str>> =
            names.iter().map(|name| find_param(&params, name).filter(|v| !v.is_empty())).collect();

        let (algorithm, credential, date, expires, signed_headers, signature) = match values.as_slice() {
            [Some(algorithm), Some(credential), Some(date), Some(expires), Some(signed_headers), Some(signature)] => {
                (*algorithm, *credential, *date, *expires, *signed_headers, *signature)
            }
            _ => {
                let missing: Vec<&str> = names
                    .iter()
                    .zip(values.iter())
                    .filter(|(_, v)| v.is_none())
                    .map(|(name, _)| name.as_str())
                    .collect();
                return Err(malformed(format!("Query string must include: {}", missing.join(", "))));
            }
        };

        let timestamp = parse_timestamp(date).ok_or_else(|| {
            malformed(format!("Unable to parse {} value: '{}'", config.query_param_name(QP_DATE), date))
        })?;
        let expires = match expires.parse::<i64>() {
            Ok(expires) if expires >= 0 => expires,
            _ => {
                return Err(malformed(format!(
                    "{} must be a non-negative number of seconds: '{}'",
                    config.query_param_name(QP_EXPIRES),
                    expires
                )))
            }
        };

        let (access_key_id, scope) = CredentialScope::parse_credential(credential)?;
        let result = Self {
            algorithm: algorithm.to_string(),
            access_key_id,
            scope,
            signed_headers: SignedHeaders::new(signed_headers.split(';')),
            signature: signature.to_string(),
            placement: ArtifactPlacement::Query {
                timestamp,
                expires,
            },
        };
        trace!("Parsed presigned query parameters: {:?}", result);
        Ok(Some(result))
    }

    /// Locate and parse the artifact on a request: the authorization header or the presigned query
    /// parameters, but not both.
    pub fn from_request(request: &RequestModel, config: &Config) -> Result<Self, AuthenticationError> {
        match request.header(config.auth_header_name()) {
            Some(header) => {
                if has_presign_marker(&request.query_parameters()?, config) {
                    return Err(malformed(format!(
                        "Request carries both the {} header and a presigned signature",
                        config.auth_header_name()
                    )));
                }
                Self::parse_header_value(header)
            }
            None => Self::from_query(request, config)?.ok_or_else(|| malformed(MSG_REQUEST_MISSING_AUTH.to_string())),
        }
    }
}

/// Indicates whether the query carries the signature or algorithm parameter of a presigned URL.
fn has_presign_marker(params: &[(String, String)], config: &Config) -> bool {
    [QP_SIGNATURE, QP_ALGORITHM].iter().any(|suffix| find_param(params, &config.query_param_name(suffix)).is_some())
}

/// Return the first value of the query parameter `name`.
fn find_param<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
}

fn malformed(message: String) -> AuthenticationError {
    AuthenticationError::new(RejectionReason::Malformed, message)
}
