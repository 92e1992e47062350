use {
    crate::{
        constants::*, string_to_sign::algorithm_tag, CredentialScope, HashAlgorithm, SecretKey, SignatureError,
    },
    chrono::{DateTime, Duration, NaiveDate, Utc},
    derive_builder::Builder,
    http::header::HeaderName,
    std::{fmt::Debug, sync::Arc},
};

/// A source of the current time.
pub trait Clock: Debug + Send + Sync {
    /// Return the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// A [`Clock`] that reads the system clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A [`Clock`] that always returns the same instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Configuration shared by the [`Signer`][crate::Signer] and the
/// [`Authenticator`][crate::Authenticator].
///
/// Config structs are immutable. Use [`ConfigBuilder`] to construct one; every field other than the
/// access key id, the secret and the credential scope has a default.
#[derive(Builder, Clone, Debug)]
#[builder(build_fn(error = "SignatureError", validate = "Self::validate"), derive(Debug))]
pub struct Config {
    /// The access key id to sign with.
    #[builder(setter(into))]
    access_key_id: String,

    /// The shared secret to sign with.
    #[builder(setter(into))]
    secret: SecretKey,

    /// The credential scope segments between the date and the terminator, e.g. `["eu", "host"]`.
    #[builder(setter(custom))]
    credential_scope: Vec<String>,

    /// The last element of the credential scope and the final message of the key chain.
    #[builder(setter(into), default = "DEFAULT_SCOPE_TERMINATOR.to_string()")]
    scope_terminator: String,

    /// The hash algorithm used when signing.
    #[builder(default)]
    hash_algorithm: HashAlgorithm,

    /// The header carrying the authorization artifact.
    #[builder(setter(into), default = "DEFAULT_AUTH_HEADER_NAME.to_string()")]
    auth_header_name: String,

    /// The header carrying the request timestamp.
    #[builder(setter(into), default = "DEFAULT_DATE_HEADER_NAME.to_string()")]
    date_header_name: String,

    /// The algorithm prefix, used in algorithm tags and prepended to the secret in the key chain.
    #[builder(setter(into), default = "DEFAULT_ALGORITHM_PREFIX.to_string()")]
    algorithm_prefix: String,

    /// The vendor key used to name presigned query parameters (`X-<vendor>-Signature`).
    #[builder(setter(into), default = "DEFAULT_VENDOR_KEY.to_string()")]
    vendor_key: String,

    /// How far the request timestamp may drift from the verifier's clock.
    #[builder(default = "Duration::seconds(DEFAULT_CLOCK_SKEW_SECONDS)")]
    clock_skew_tolerance: Duration,

    /// The source of the current time.
    #[builder(setter(custom), default = "Arc::new(SystemClock)")]
    clock: Arc<dyn Clock>,
}

impl Config {
    /// Create a [ConfigBuilder] to construct a [Config].
    #[inline]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Retrieve the access key id.
    #[inline]
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    /// Retrieve the shared secret.
    #[inline]
    pub fn secret(&self) -> &SecretKey {
        &self.secret
    }

    /// Retrieve the credential scope segments.
    #[inline]
    pub fn credential_scope(&self) -> &[String] {
        &self.credential_scope
    }

    /// Retrieve the credential scope terminator.
    #[inline]
    pub fn scope_terminator(&self) -> &str {
        &self.scope_terminator
    }

    /// Retrieve the hash algorithm.
    #[inline]
    pub fn hash_algorithm(&self) -> HashAlgorithm {
        self.hash_algorithm
    }

    /// Retrieve the authorization header name.
    #[inline]
    pub fn auth_header_name(&self) -> &str {
        &self.auth_header_name
    }

    /// Retrieve the date header name.
    #[inline]
    pub fn date_header_name(&self) -> &str {
        &self.date_header_name
    }

    /// Retrieve the algorithm prefix.
    #[inline]
    pub fn algorithm_prefix(&self) -> &str {
        &self.algorithm_prefix
    }

    /// Retrieve the vendor key.
    #[inline]
    pub fn vendor_key(&self) -> &str {
        &self.vendor_key
    }

    /// Retrieve the clock skew tolerance.
    #[inline]
    pub fn clock_skew_tolerance(&self) -> Duration {
        self.clock_skew_tolerance
    }

    /// Read the current time from the configured clock, truncated to whole seconds.
    pub fn now(&self) -> DateTime<Utc> {
        let now = self.clock.now();
        DateTime::from_timestamp(now.timestamp(), 0).unwrap_or(now)
    }

    /// The algorithm tag for the configured hash, e.g. `ESR-HMAC-SHA256`.
    pub fn algorithm_tag(&self) -> String {
        self.algorithm_tag_for(self.hash_algorithm)
    }

    /// The algorithm tag for the given hash.
    pub fn algorithm_tag_for(&self, hash: HashAlgorithm) -> String {
        algorithm_tag(&self.algorithm_prefix, hash.name())
    }

    /// The name of a presigned query parameter, e.g. `X-Escher-Signature` for `Signature`.
    pub fn query_param_name(&self, suffix: &str) -> String {
        format!("X-{}-{}", self.vendor_key, suffix)
    }

    /// The configured credential scope for the given request date.
    pub fn credential_scope_for(&self, date: NaiveDate) -> CredentialScope {
        CredentialScope::new(date, self.credential_scope.iter().cloned(), self.scope_terminator.clone())
    }
}

impl ConfigBuilder {
    /// Set the credential scope segments.
    pub fn credential_scope<I, S>(&mut self, segments: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.credential_scope = Some(segments.into_iter().map(Into::into).collect());
        self
    }

    /// Set the clock used to read the current time.
    pub fn clock<C: Clock + 'static>(&mut self, clock: C) -> &mut Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Use a fixed instant as the current time.
    pub fn fixed_time(&mut self, now: DateTime<Utc>) -> &mut Self {
        self.clock(FixedClock(now))
    }

    fn validate(&self) -> Result<(), SignatureError> {
        if let Some(akid) = &self.access_key_id {
            if akid.is_empty() || akid.contains('/') {
                return Err(SignatureError::InvalidConfiguration(format!(
                    "Access key id must be non-empty and must not contain '/': '{}'",
                    akid
                )));
            }
        }

        if let Some(segments) = &self.credential_scope {
            for segment in segments {
                validate_scope_element("Credential scope segment", segment)?;
            }
        }

        if let Some(terminator) = &self.scope_terminator {
            validate_scope_element("Credential scope terminator", terminator)?;
        }

        if let Some(prefix) = &self.algorithm_prefix {
            if prefix.is_empty() || prefix.contains(char::is_whitespace) {
                return Err(SignatureError::InvalidConfiguration(format!(
                    "Algorithm prefix must be non-empty and must not contain whitespace: '{}'",
                    prefix
                )));
            }
        }

        for name in [&self.auth_header_name, &self.date_header_name].into_iter().flatten() {
            if HeaderName::from_bytes(name.as_bytes()).is_err() {
                return Err(SignatureError::InvalidConfiguration(format!("Invalid header name: '{}'", name)));
            }
        }

        if let Some(tolerance) = &self.clock_skew_tolerance {
            if *tolerance < Duration::zero() {
                return Err(SignatureError::InvalidConfiguration(
                    "Clock skew tolerance must not be negative".to_string(),
                ));
            }
        }

        Ok(())
    }
}

fn validate_scope_element(what: &str, element: &str) -> Result<(), SignatureError> {
    if element.is_empty() || element.contains('/') {
        Err(SignatureError::InvalidConfiguration(format!(
            "{} must be non-empty and must not contain '/': '{}'",
            what, element
        )))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use {
        crate::{Config, FixedClock, HashAlgorithm, SecretKey, SignatureError},
        chrono::{Duration, NaiveDate, TimeZone, Utc},
    };

    #[test_log::test]
    fn test_defaults() {
        let config =
            Config::builder().access_key_id("key1").secret("secret").credential_scope(["eu", "host"]).build().unwrap();

        assert_eq!(config.access_key_id(), "key1");
        assert_eq!(config.secret(), &SecretKey::from("secret"));
        assert_eq!(config.credential_scope(), &["eu".to_string(), "host".to_string()]);
        assert_eq!(config.scope_terminator(), "escher_request");
        assert_eq!(config.hash_algorithm(), HashAlgorithm::Sha256);
        assert_eq!(config.auth_header_name(), "X-Escher-Auth");
        assert_eq!(config.date_header_name(), "X-Escher-Date");
        assert_eq!(config.algorithm_prefix(), "ESR");
        assert_eq!(config.vendor_key(), "Escher");
        assert_eq!(config.clock_skew_tolerance(), Duration::seconds(300));
        assert_eq!(config.algorithm_tag(), "ESR-HMAC-SHA256");
        assert_eq!(config.algorithm_tag_for(HashAlgorithm::Sha512), "ESR-HMAC-SHA512");
        assert_eq!(config.query_param_name("Signature"), "X-Escher-Signature");

        let date = NaiveDate::from_ymd_opt(2011, 9, 9).unwrap();
        assert_eq!(config.credential_scope_for(date).to_string(), "20110909/eu/host/escher_request");

        // The secret never appears in debug output.
        let debug = format!("{:?}", config);
        assert!(!debug.contains("\"secret\""));
        assert!(debug.contains("SecretKey"));
    }

    #[test_log::test]
    fn test_overrides_and_clock() {
        let now = Utc.with_ymd_and_hms(2015, 8, 30, 12, 36, 0).unwrap();
        let config = Config::builder()
            .access_key_id("AKIDEXAMPLE")
            .secret("wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY")
            .credential_scope(vec!["us-east-1".to_string(), "service".to_string()])
            .scope_terminator("aws4_request")
            .hash_algorithm(HashAlgorithm::Sha512)
            .auth_header_name("Authorization")
            .date_header_name("X-Amz-Date")
            .algorithm_prefix("AWS4")
            .vendor_key("Amz")
            .clock_skew_tolerance(Duration::minutes(15))
            .clock(FixedClock(now))
            .build()
            .unwrap();

        assert_eq!(config.now(), now);
        assert_eq!(config.algorithm_tag(), "AWS4-HMAC-SHA512");
        assert_eq!(config.query_param_name("Date"), "X-Amz-Date");
        assert_eq!(config.clock_skew_tolerance(), Duration::seconds(900));

        let clone = config.clone();
        assert_eq!(clone.now(), now);
    }

    #[test_log::test]
    fn test_now_truncates_subseconds() {
        let now = Utc.with_ymd_and_hms(2015, 8, 30, 12, 36, 0).unwrap() + Duration::milliseconds(750);
        let config = Config::builder()
            .access_key_id("key1")
            .secret("secret")
            .credential_scope(["eu"])
            .fixed_time(now)
            .build()
            .unwrap();
        assert_eq!(config.now(), Utc.with_ymd_and_hms(2015, 8, 30, 12, 36, 0).unwrap());
    }

    #[test_log::test]
    fn test_missing_fields() {
        let e = Config::builder().secret("secret").credential_scope(["eu"]).build().unwrap_err();
        assert_eq!(e.to_string(), "Configuration field 'access_key_id' must be set");

        let e = Config::builder().access_key_id("key1").credential_scope(["eu"]).build().unwrap_err();
        assert_eq!(e.to_string(), "Configuration field 'secret' must be set");

        let e = Config::builder().access_key_id("key1").secret("secret").build().unwrap_err();
        assert_eq!(e.to_string(), "Configuration field 'credential_scope' must be set");
    }

    #[test_log::test]
    fn test_invalid_values() {
        let cases: Vec<Box<dyn Fn() -> Result<Config, SignatureError>>> = vec![
            Box::new(|| Config::builder().access_key_id("a/b").secret("s").credential_scope(["eu"]).build()),
            Box::new(|| Config::builder().access_key_id("").secret("s").credential_scope(["eu"]).build()),
            Box::new(|| Config::builder().access_key_id("k").secret("s").credential_scope(["eu/west"]).build()),
            Box::new(|| Config::builder().access_key_id("k").secret("s").credential_scope([""]).build()),
            Box::new(|| {
                Config::builder().access_key_id("k").secret("s").credential_scope(["eu"]).scope_terminator("").build()
            }),
            Box::new(|| {
                Config::builder().access_key_id("k").secret("s").credential_scope(["eu"]).algorithm_prefix("").build()
            }),
            Box::new(|| {
                Config::builder()
                    .access_key_id("k")
                    .secret("s")
                    .credential_scope(["eu"])
                    .auth_header_name("Bad Header")
                    .build()
            }),
            Box::new(|| {
                Config::builder()
                    .access_key_id("k")
                    .secret("s")
                    .credential_scope(["eu"])
                    .clock_skew_tolerance(Duration::seconds(-1))
                    .build()
            }),
        ];

        for (i, case) in cases.iter().enumerate() {
            match case() {
                Err(SignatureError::InvalidConfiguration(_)) => (),
                other => panic!("case {}: expected InvalidConfiguration, got {:?}", i, other),
            }
        }
    }
}
