//! Client-side signing.
//!
//! Each stage of the signing pipeline is exposed separately so that conformance fixtures can check the
//! canonical request, the string to sign and the authorization header on their own.

use {
    crate::{
        canonical::{percent_decode, percent_encode, UriElement},
        chronoutil::format_date_header,
        ArtifactPlacement, AuthArtifact, CanonicalOptions, CanonicalRequest, Config, CredentialScope,
        HashAlgorithm, RequestModel, SecretKey, SignatureError, SignedHeaders, StringToSign,
    },
    chrono::{DateTime, Utc},
    log::{debug, trace},
};

/// Signs requests with the configured credentials.
///
/// A signer holds only immutable configuration; it can be shared across threads and every call is
/// independent.
#[derive(Clone, Debug)]
pub struct Signer {
    config: Config,
}

impl Signer {
    /// Create a new signer.
    pub fn new(config: Config) -> Self {
        Self {
            config,
        }
    }

    /// Retrieve the configuration.
    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The header names to sign: the caller's names plus the date header.
    fn header_set<S: AsRef<str>>(&self, headers_to_sign: &[S]) -> SignedHeaders {
        SignedHeaders::new(headers_to_sign).with(self.config.date_header_name())
    }

    fn header_options(&self) -> CanonicalOptions {
        CanonicalOptions {
            hash_algorithm: self.config.hash_algorithm(),
            ..Default::default()
        }
    }

    /// Canonicalize `request` as-is. The date header is signed implicitly and must already be present.
    pub fn canonicalize_request<S: AsRef<str>>(
        &self,
        request: &RequestModel,
        headers_to_sign: &[S],
    ) -> Result<CanonicalRequest, SignatureError> {
        CanonicalRequest::canonicalize(request, &self.header_set(headers_to_sign), &self.header_options())
    }

    /// Build the string to sign for `request` as-is, using the clock's current time.
    pub fn string_to_sign<S: AsRef<str>>(
        &self,
        request: &RequestModel,
        headers_to_sign: &[S],
    ) -> Result<StringToSign, SignatureError> {
        let creq = self.canonicalize_request(request, headers_to_sign)?;
        let now = self.config.now();
        Ok(StringToSign::new(
            &creq,
            now,
            self.config.credential_scope_for(now.date_naive()),
            self.config.algorithm_tag(),
        ))
    }

    /// Generate the authorization header value for `request` as-is, using the clock's current time.
    pub fn generate_header<S: AsRef<str>>(
        &self,
        request: &RequestModel,
        headers_to_sign: &[S],
    ) -> Result<String, SignatureError> {
        let creq = self.canonicalize_request(request, headers_to_sign)?;
        let artifact = self.header_artifact(&creq, self.config.now());
        Ok(artifact.to_header_value())
    }

    /// Sign a request.
    ///
    /// Any existing date and authorization headers are replaced: the returned request carries a fresh
    /// date header and the authorization header. `request` itself is left untouched.
    pub fn sign_request<S: AsRef<str>>(
        &self,
        request: &RequestModel,
        headers_to_sign: &[S],
    ) -> Result<RequestModel, SignatureError> {
        let now = self.config.now();
        let date_header = self.config.date_header_name();
        let auth_header = self.config.auth_header_name();

        let dated = request
            .clone()
            .without_header(date_header)
            .without_header(auth_header)
            .with_header(date_header, format_date_header(date_header, &now));

        let creq = self.canonicalize_request(&dated, headers_to_sign)?;
        let artifact = self.header_artifact(&creq, now);
        debug!("Signed {} {} as {}", request.method(), request.url(), artifact.credential());
        Ok(dated.with_header(auth_header, artifact.to_header_value()))
    }

    /// Presign a request's URL, valid for `expires` seconds from now.
    ///
    /// The artifact travels in query parameters; the body is not signed (`UNSIGNED-PAYLOAD`) and no date
    /// header is added. The returned request has the presigned URL.
    pub fn presign_url<S: AsRef<str>>(
        &self,
        request: &RequestModel,
        headers_to_sign: &[S],
        expires: i64,
    ) -> Result<RequestModel, SignatureError> {
        if expires < 0 {
            return Err(SignatureError::InvalidConfiguration(format!(
                "Presigned URL expiry must not be negative: {}",
                expires
            )));
        }

        let now = self.config.now();
        let signed_headers = SignedHeaders::new(headers_to_sign);
        let scope = self.config.credential_scope_for(now.date_naive());
        let unsigned = AuthArtifact::new(
            self.config.algorithm_tag(),
            self.config.access_key_id(),
            scope.clone(),
            signed_headers.clone(),
            String::new(),
            ArtifactPlacement::Query {
                timestamp: now,
                expires,
            },
        );

        let mut params = unsigned.to_query_parameters(&self.config);
        let stale: Vec<String> = params.iter().map(|(name, _)| name.clone()).collect();
        let (signature_name, _) = params.pop().expect("query artifacts always render a signature parameter");
        let url = append_query(&strip_query_params(request.url(), &stale)?, &params);
        let request = request.clone().with_url(url);

        let options = CanonicalOptions {
            hash_algorithm: self.config.hash_algorithm(),
            unsigned_payload: true,
            exclude_query_parameter: Some(signature_name.clone()),
        };
        let creq = CanonicalRequest::canonicalize(&request, &signed_headers, &options)?;
        let (_, signature) = compute_signature(
            self.config.hash_algorithm(),
            self.config.algorithm_prefix(),
            self.config.secret(),
            &creq,
            now,
            scope,
            self.config.algorithm_tag(),
        );

        let url = append_query(request.url(), &[(signature_name, signature)]);
        debug!("Presigned {} for {} seconds", url, expires);
        Ok(request.with_url(url))
    }

    fn header_artifact(&self, creq: &CanonicalRequest, now: DateTime<Utc>) -> AuthArtifact {
        let scope = self.config.credential_scope_for(now.date_naive());
        let (_, signature) = compute_signature(
            self.config.hash_algorithm(),
            self.config.algorithm_prefix(),
            self.config.secret(),
            creq,
            now,
            scope.clone(),
            self.config.algorithm_tag(),
        );

        AuthArtifact::new(
            self.config.algorithm_tag(),
            self.config.access_key_id(),
            scope,
            creq.signed_headers().clone(),
            signature,
            ArtifactPlacement::Header,
        )
    }
}

/// Build the string to sign for a canonical request and sign it with a key derived from `secret`.
pub(crate) fn compute_signature<A: Into<String>>(
    hash: HashAlgorithm,
    prefix: &str,
    secret: &SecretKey,
    creq: &CanonicalRequest,
    timestamp: DateTime<Utc>,
    scope: CredentialScope,
    algorithm_tag: A,
) -> (StringToSign, String) {
    let signing_key = secret.to_signing_key(hash, prefix, &scope);
    let string_to_sign = StringToSign::new(creq, timestamp, scope, algorithm_tag);
    trace!("String to sign:\n{}", string_to_sign);
    let signature = signing_key.sign(string_to_sign.to_string());
    (string_to_sign, signature)
}

/// Remove every query parameter whose decoded name is in `names`, keeping the rest of the URL as-is.
fn strip_query_params(url: &str, names: &[String]) -> Result<String, SignatureError> {
    let (rest, fragment) = match url.split_once('#') {
        Some((rest, fragment)) => (rest, Some(fragment)),
        None => (url, None),
    };
    let Some((base, query)) = rest.split_once('?') else {
        return Ok(url.to_string());
    };

    let mut kept = Vec::new();
    for component in query.split('&').filter(|c| !c.is_empty()) {
        let raw_name = component.split_once('=').map_or(component, |(name, _)| name);
        let name = percent_decode(raw_name, UriElement::Query)?;
        if !names.iter().any(|n| n.as_bytes() == name.as_slice()) {
            kept.push(component);
        }
    }

    let mut result = base.to_string();
    if !kept.is_empty() {
        result.push('?');
        result.push_str(&kept.join("&"));
    }
    if let Some(fragment) = fragment {
        result.push('#');
        result.push_str(fragment);
    }
    Ok(result)
}

/// Append percent-encoded query parameters to a URL, before any fragment.
fn append_query(url: &str, params: &[(String, String)]) -> String {
    let (base, fragment) = match url.split_once('#') {
        Some((base, fragment)) => (base, Some(fragment)),
        None => (url, None),
    };

    let mut result = base.to_string();
    if result.is_empty() {
        result.push('/');
    }

    for (key, value) in params {
        if !result.contains('?') {
            result.push('?');
        } else if !result.ends_with('?') && !result.ends_with('&') {
            result.push('&');
        }
        result.push_str(&percent_encode(key.as_bytes()));
        result.push('=');
        result.push_str(&percent_encode(value.as_bytes()));
    }

    if let Some(fragment) = fragment {
        result.push('#');
        result.push_str(fragment);
    }
    result
}
