//! Server-side verification.
//!
//! A verification attempt runs through a fixed sequence of checks and stops at the first failure:
//! the artifact is parsed, the signed headers are checked, the timestamp is checked, the secret is
//! looked up, the signature is recomputed and compared, and finally the credential scope is checked.

use {
    crate::{
        chronoutil::{format_date, format_timestamp, parse_timestamp},
        constants::*,
        signer::compute_signature,
        ArtifactPlacement, AuthArtifact, AuthenticationError, CanonicalOptions, CanonicalRequest, Config,
        CredentialScope, HashAlgorithm, RejectionReason, RequestModel, SecretKey, SecretLookup, SignedHeaders,
    },
    chrono::{DateTime, Duration, Utc},
    log::{debug, trace},
    subtle::ConstantTimeEq,
};

/// Headers that must be signed in addition to the date header.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SignedHeaderRequirements {
    /// Headers that must always be in the signed header list.
    always_present: Vec<String>,

    /// Headers that must be in the signed header list if they are present in the request.
    if_in_request: Vec<String>,

    /// Prefixes; every request header with one of these prefixes must be in the signed header list.
    prefixes: Vec<String>,
}

impl SignedHeaderRequirements {
    /// Create a new set of requirements. Names and prefixes are compared case-insensitively.
    pub fn new<A, B, C>(always_present: A, if_in_request: B, prefixes: C) -> Self
    where
        A: IntoIterator,
        A::Item: AsRef<str>,
        B: IntoIterator,
        B::Item: AsRef<str>,
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        let mut result = Self::default();
        always_present.into_iter().for_each(|h| result.add_always_present(h.as_ref()));
        if_in_request.into_iter().for_each(|h| result.add_if_in_request(h.as_ref()));
        prefixes.into_iter().for_each(|p| result.add_prefix(p.as_ref()));
        result
    }

    /// Requirements that ask for nothing beyond the date header.
    #[inline]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Headers that must always be signed.
    #[inline]
    pub fn always_present(&self) -> &[String] {
        &self.always_present
    }

    /// Headers that must be signed when present.
    #[inline]
    pub fn if_in_request(&self) -> &[String] {
        &self.if_in_request
    }

    /// Header prefixes that must be signed when present.
    #[inline]
    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    /// Add a header that must always be signed.
    pub fn add_always_present(&mut self, header: &str) {
        add_lowercase(&mut self.always_present, header)
    }

    /// Add a header that must be signed if it is present in the request.
    pub fn add_if_in_request(&mut self, header: &str) {
        add_lowercase(&mut self.if_in_request, header)
    }

    /// Add a prefix; request headers with this prefix must be signed.
    pub fn add_prefix(&mut self, prefix: &str) {
        add_lowercase(&mut self.prefixes, prefix)
    }

    /// Remove a header from the always-signed list.
    pub fn remove_always_present(&mut self, header: &str) {
        let header = header.to_ascii_lowercase();
        self.always_present.retain(|h| h != &header);
    }

    /// Remove a header from the signed-when-present list.
    pub fn remove_if_in_request(&mut self, header: &str) {
        let header = header.to_ascii_lowercase();
        self.if_in_request.retain(|h| h != &header);
    }

    /// Remove a prefix.
    pub fn remove_prefix(&mut self, prefix: &str) {
        let prefix = prefix.to_ascii_lowercase();
        self.prefixes.retain(|p| p != &prefix);
    }

    /// Verify that `signed_headers` satisfies these requirements for `request`.
    pub fn check(&self, request: &RequestModel, signed_headers: &SignedHeaders) -> Result<(), AuthenticationError> {
        for header in &self.always_present {
            if !signed_headers.contains(header) {
                return Err(must_be_signed(header));
            }
        }

        for header in &self.if_in_request {
            if request.has_header(header) && !signed_headers.contains(header) {
                return Err(must_be_signed(header));
            }
        }

        for prefix in &self.prefixes {
            for (name, _) in request.headers() {
                let name = name.to_ascii_lowercase();
                if name.starts_with(prefix.as_str()) && !signed_headers.contains(&name) {
                    return Err(must_be_signed(&name));
                }
            }
        }

        Ok(())
    }
}

fn add_lowercase(list: &mut Vec<String>, name: &str) {
    let name = name.trim().to_ascii_lowercase();
    if !name.is_empty() && !list.contains(&name) {
        list.push(name);
    }
}

fn must_be_signed(header: &str) -> AuthenticationError {
    AuthenticationError::new(RejectionReason::MissingHeader, format!("'{}' must be a signed header", header))
}

/// The identity established by a successful verification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedIdentity {
    access_key_id: String,
    credential_scope: CredentialScope,
    timestamp: DateTime<Utc>,
}

impl AuthenticatedIdentity {
    /// The access key id the request was signed with.
    #[inline]
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    /// The credential scope the request was signed for.
    #[inline]
    pub fn credential_scope(&self) -> &CredentialScope {
        &self.credential_scope
    }

    /// The request timestamp.
    #[inline]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Verifies signed requests.
///
/// Like the [`Signer`][crate::Signer], an authenticator holds only immutable configuration. The
/// access key id and secret in its [`Config`] are not used; secrets come from the [`SecretLookup`]
/// passed to [`authenticate`][Self::authenticate].
#[derive(Clone, Debug)]
pub struct Authenticator {
    config: Config,
    signed_header_requirements: SignedHeaderRequirements,
}

impl Authenticator {
    /// Create a new authenticator with no signed header requirements beyond the date header.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            signed_header_requirements: SignedHeaderRequirements::empty(),
        }
    }

    /// Return a new authenticator with the given signed header requirements.
    pub fn with_signed_header_requirements(self, signed_header_requirements: SignedHeaderRequirements) -> Self {
        Self {
            signed_header_requirements,
            ..self
        }
    }

    /// Retrieve the configuration.
    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Retrieve the signed header requirements.
    #[inline]
    pub fn signed_header_requirements(&self) -> &SignedHeaderRequirements {
        &self.signed_header_requirements
    }

    /// Verify `request`, obtaining the secret for the presented access key id from `lookup`.
    pub fn authenticate<L: SecretLookup + ?Sized>(
        &self,
        request: &RequestModel,
        lookup: &L,
    ) -> Result<AuthenticatedIdentity, AuthenticationError> {
        let result = self.verify(request, lookup);
        match &result {
            Ok(identity) => {
                debug!("Authenticated {} {} as {}", request.method(), request.url(), identity.access_key_id)
            }
            Err(e) => debug!("Rejected {} {}: {}: {}", request.method(), request.url(), e.reason(), e),
        }
        result
    }

    fn verify<L: SecretLookup + ?Sized>(
        &self,
        request: &RequestModel,
        lookup: &L,
    ) -> Result<AuthenticatedIdentity, AuthenticationError> {
        let artifact = AuthArtifact::from_request(request, &self.config)?;
        let hash = self.parse_algorithm(artifact.algorithm())?;

        self.check_headers(request, &artifact)?;
        let timestamp = self.check_time(request, &artifact)?;

        let secret = self.lookup_secret(lookup, artifact.access_key_id())?;
        self.check_signature(request, &artifact, hash, &secret, timestamp)?;
        self.check_scope(artifact.scope(), timestamp)?;

        Ok(AuthenticatedIdentity {
            access_key_id: artifact.access_key_id().to_string(),
            credential_scope: artifact.scope().clone(),
            timestamp,
        })
    }

    /// Map an algorithm tag such as `ESR-HMAC-SHA512` to its hash. Either supported hash is accepted,
    /// regardless of the configured default.
    fn parse_algorithm(&self, algorithm: &str) -> Result<HashAlgorithm, AuthenticationError> {
        let prefix = format!("{}{}", self.config.algorithm_prefix(), ALGORITHM_HMAC_INFIX);
        let hash_name = algorithm.strip_prefix(prefix.as_str());

        [HashAlgorithm::Sha256, HashAlgorithm::Sha512]
            .into_iter()
            .find(|hash| Some(hash.name()) == hash_name)
            .ok_or_else(|| {
                AuthenticationError::new(
                    RejectionReason::Malformed,
                    format!("Unsupported algorithm '{}'; expected {}SHA256 or {}SHA512", algorithm, prefix, prefix),
                )
            })
    }

    fn check_headers(&self, request: &RequestModel, artifact: &AuthArtifact) -> Result<(), AuthenticationError> {
        let signed_headers = artifact.signed_headers();
        for name in signed_headers.iter() {
            if !request.has_header(name) {
                return Err(AuthenticationError::new(
                    RejectionReason::MissingHeader,
                    format!("'{}' is a signed header but is missing from the request", name),
                ));
            }
        }

        if artifact.placement() == &ArtifactPlacement::Header {
            let date_header = self.config.date_header_name();
            if !request.has_header(date_header) {
                return Err(AuthenticationError::new(
                    RejectionReason::MissingHeader,
                    format!("Request is missing the {} header", date_header),
                ));
            }

            if !signed_headers.contains(date_header) {
                return Err(must_be_signed(&date_header.to_ascii_lowercase()));
            }
        }

        self.signed_header_requirements.check(request, signed_headers)
    }

    /// Check the request timestamp against the clock and return it.
    fn check_time(
        &self,
        request: &RequestModel,
        artifact: &AuthArtifact,
    ) -> Result<DateTime<Utc>, AuthenticationError> {
        let now = self.config.now();
        let tolerance = self.config.clock_skew_tolerance();

        match artifact.placement() {
            ArtifactPlacement::Header => {
                let date_header = self.config.date_header_name();
                let value = request.header(date_header).unwrap_or_default();
                let timestamp = parse_timestamp(value).ok_or_else(|| {
                    AuthenticationError::new(
                        RejectionReason::Malformed,
                        format!("Unable to parse {} header value: '{}'", date_header, value),
                    )
                })?;
                check_skew(timestamp, now, tolerance)?;
                Ok(timestamp)
            }

            ArtifactPlacement::Query {
                timestamp,
                expires,
            } => {
                check_presigned_window(*timestamp, *expires, now, tolerance)?;
                Ok(*timestamp)
            }
        }
    }

    fn lookup_secret<L: SecretLookup + ?Sized>(
        &self,
        lookup: &L,
        access_key_id: &str,
    ) -> Result<SecretKey, AuthenticationError> {
        match lookup.lookup_secret(access_key_id) {
            Ok(Some(secret)) => Ok(secret),
            Ok(None) => Err(AuthenticationError::new(
                RejectionReason::UnknownKey,
                format!("The access key id '{}' is not known", access_key_id),
            )),
            Err(e) => Err(AuthenticationError::lookup_failed(e)),
        }
    }

    fn check_signature(
        &self,
        request: &RequestModel,
        artifact: &AuthArtifact,
        hash: HashAlgorithm,
        secret: &SecretKey,
        timestamp: DateTime<Utc>,
    ) -> Result<(), AuthenticationError> {
        let presigned = matches!(artifact.placement(), ArtifactPlacement::Query { .. });
        let options = CanonicalOptions {
            hash_algorithm: hash,
            unsigned_payload: presigned,
            exclude_query_parameter: presigned.then(|| self.config.query_param_name(QP_SIGNATURE)),
        };

        let creq = CanonicalRequest::canonicalize(request, artifact.signed_headers(), &options)?;
        let (_, expected) = compute_signature(
            hash,
            self.config.algorithm_prefix(),
            secret,
            &creq,
            timestamp,
            artifact.scope().clone(),
            artifact.algorithm(),
        );

        let is_equal: bool = expected.as_bytes().ct_eq(artifact.signature().as_bytes()).into();
        if is_equal {
            Ok(())
        } else {
            trace!("check_signature: expected {}, received {}", expected, artifact.signature());
            Err(AuthenticationError::new(RejectionReason::SignatureMismatch, MSG_REQUEST_SIGNATURE_MISMATCH))
        }
    }

    fn check_scope(&self, scope: &CredentialScope, timestamp: DateTime<Utc>) -> Result<(), AuthenticationError> {
        let expected = self.config.credential_scope_for(timestamp.date_naive());
        if scope == &expected {
            return Ok(());
        }

        let mut errors = Vec::new();
        if scope.date() != expected.date() {
            errors.push(format!(
                "Credential date {} does not match the request date {}.",
                format_date(&scope.date()),
                format_date(&expected.date())
            ));
        }

        if scope.segments() != expected.segments() || scope.terminator() != expected.terminator() {
            errors.push(format!("Credential should be scoped to '{}', not '{}'.", expected, scope));
        }

        Err(AuthenticationError::new(RejectionReason::ScopeMismatch, errors.join(" ")))
    }
}

/// Header mode: accept iff `|now - timestamp| <= tolerance`.
fn check_skew(timestamp: DateTime<Utc>, now: DateTime<Utc>, tolerance: Duration) -> Result<(), AuthenticationError> {
    let min_ts = now.checked_sub_signed(tolerance).unwrap_or(DateTime::<Utc>::MIN_UTC);
    let max_ts = now.checked_add_signed(tolerance).unwrap_or(DateTime::<Utc>::MAX_UTC);

    if timestamp < min_ts {
        trace!("check_skew: request timestamp {} is before minimum timestamp {}", timestamp, min_ts);
        return Err(AuthenticationError::new(
            RejectionReason::Expired,
            format!(
                "Signature expired: {} is now earlier than {} ({} - {}.)",
                format_timestamp(&timestamp),
                format_timestamp(&min_ts),
                format_timestamp(&now),
                duration_to_string(tolerance)
            ),
        ));
    }

    if timestamp > max_ts {
        trace!("check_skew: request timestamp {} is after maximum timestamp {}", timestamp, max_ts);
        return Err(AuthenticationError::new(
            RejectionReason::Expired,
            format!(
                "Signature not yet current: {} is still later than {} ({} + {}.)",
                format_timestamp(&timestamp),
                format_timestamp(&max_ts),
                format_timestamp(&now),
                duration_to_string(tolerance)
            ),
        ));
    }

    Ok(())
}

/// Presigned mode: accept iff `timestamp - tolerance <= now <= timestamp + expires`.
///
/// Works in whole seconds so that an arbitrarily large `expires` from the query string cannot overflow.
fn check_presigned_window(
    timestamp: DateTime<Utc>,
    expires: i64,
    now: DateTime<Utc>,
    tolerance: Duration,
) -> Result<(), AuthenticationError> {
    let ts = timestamp.timestamp();
    let now_secs = now.timestamp();

    if now_secs < ts.saturating_sub(tolerance.num_seconds()) {
        return Err(AuthenticationError::new(
            RejectionReason::Expired,
            format!(
                "Signature not yet current: {} is more than {} ahead of {}",
                format_timestamp(&timestamp),
                duration_to_string(tolerance),
                format_timestamp(&now)
            ),
        ));
    }

    if now_secs > ts.saturating_add(expires) {
        return Err(AuthenticationError::new(
            RejectionReason::Expired,
            format!(
                "Signature expired: {} + {} seconds is earlier than {}",
                format_timestamp(&timestamp),
                expires,
                format_timestamp(&now)
            ),
        ));
    }

    Ok(())
}

fn duration_to_string(duration: Duration) -> String {
    let secs = duration.num_seconds();
    if secs != 0 && secs % 60 == 0 {
        format!("{} min", duration.num_minutes())
    } else {
        format!("{} sec", secs)
    }
}
