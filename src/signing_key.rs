use {
    crate::{chronoutil::format_date, BoxError, CredentialScope, HashAlgorithm},
    chrono::NaiveDate,
    std::{
        collections::HashMap,
        fmt::{Debug, Display, Formatter, Result as FmtResult},
    },
};

/// A shared secret, as configured on the client and returned by a [`SecretLookup`] on the server.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey {
    /// The raw secret bytes, without any algorithm prefix.
    key: Vec<u8>,
}

/// A signing key derived from a [`SecretKey`] for exactly one date and one credential scope.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKey {
    /// The hash algorithm the key was derived with; signatures use the same one.
    algorithm: HashAlgorithm,

    /// The resulting raw signing key.
    key: Vec<u8>,
}

impl SecretKey {
    /// Create a new `SecretKey` from raw bytes.
    pub fn new<K: Into<Vec<u8>>>(key: K) -> Self {
        Self {
            key: key.into(),
        }
    }

    /// Derive the signing key for the given credential scope.
    pub fn to_signing_key(&self, algorithm: HashAlgorithm, prefix: &str, scope: &CredentialScope) -> SigningKey {
        derive_signing_key(algorithm, prefix, self, scope.date(), scope.segments(), scope.terminator())
    }
}

impl AsRef<[u8]> for SecretKey {
    fn as_ref(&self) -> &[u8] {
        &self.key
    }
}

impl From<&str> for SecretKey {
    fn from(s: &str) -> Self {
        Self::new(s.as_bytes())
    }
}

impl From<String> for SecretKey {
    fn from(s: String) -> Self {
        Self::new(s.into_bytes())
    }
}

impl From<Vec<u8>> for SecretKey {
    fn from(v: Vec<u8>) -> Self {
        Self::new(v)
    }
}

impl From<&[u8]> for SecretKey {
    fn from(v: &[u8]) -> Self {
        Self::new(v)
    }
}

impl SigningKey {
    /// The hash algorithm this key was derived with.
    #[inline]
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Sign a string to sign, returning the lowercase hex signature.
    pub fn sign<S: AsRef<[u8]>>(&self, string_to_sign: S) -> String {
        hex::encode(self.algorithm.hmac(&self.key, string_to_sign.as_ref()))
    }
}

impl AsRef<[u8]> for SigningKey {
    fn as_ref(&self) -> &[u8] {
        &self.key
    }
}

impl Debug for SecretKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str("SecretKey")
    }
}

impl Display for SecretKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str("SecretKey")
    }
}

impl Debug for SigningKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str("SigningKey")
    }
}

impl Display for SigningKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str("SigningKey")
    }
}

/// Derive a signing key.
///
/// The chain starts with `HMAC(prefix + secret, YYYYMMDD)`. Each scope segment is then HMACed in turn,
/// using the previous output as the key, and the terminator is the final message.
pub fn derive_signing_key<S: AsRef<str>>(
    algorithm: HashAlgorithm,
    prefix: &str,
    secret: &SecretKey,
    date: NaiveDate,
    segments: &[S],
    terminator: &str,
) -> SigningKey {
    let mut prefixed_key = Vec::with_capacity(prefix.len() + secret.key.len());
    prefixed_key.extend_from_slice(prefix.as_bytes());
    prefixed_key.extend_from_slice(&secret.key);

    let mut key = algorithm.hmac(&prefixed_key, format_date(&date).as_bytes());
    for segment in segments {
        key = algorithm.hmac(&key, segment.as_ref().as_bytes());
    }

    SigningKey {
        algorithm,
        key: algorithm.hmac(&key, terminator.as_bytes()),
    }
}

/// A capability that resolves an access key id to its shared secret.
///
/// Return `Ok(None)` when the access key id is unknown; return `Err` only when the lookup itself failed
/// (e.g. the backing store is unreachable). Implementations may block.
pub trait SecretLookup {
    /// Look up the secret for `access_key_id`.
    fn lookup_secret(&self, access_key_id: &str) -> Result<Option<SecretKey>, BoxError>;
}

impl SecretLookup for HashMap<String, SecretKey> {
    fn lookup_secret(&self, access_key_id: &str) -> Result<Option<SecretKey>, BoxError> {
        Ok(self.get(access_key_id).cloned())
    }
}

impl SecretLookup for HashMap<String, String> {
    fn lookup_secret(&self, access_key_id: &str) -> Result<Option<SecretKey>, BoxError> {
        Ok(self.get(access_key_id).map(|s| SecretKey::from(s.as_str())))
    }
}

impl<T: SecretLookup + ?Sized> SecretLookup for &T {
    fn lookup_secret(&self, access_key_id: &str) -> Result<Option<SecretKey>, BoxError> {
        (**self).lookup_secret(access_key_id)
    }
}

/// A [`SecretLookup`] that wraps a function. Create one with [`secret_lookup_fn`].
#[derive(Clone, Copy)]
pub struct SecretLookupFn<F> {
    f: F,
}

impl<F> Debug for SecretLookupFn<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str("SecretLookupFn")
    }
}

impl<F> SecretLookup for SecretLookupFn<F>
where
    F: Fn(&str) -> Result<Option<SecretKey>, BoxError>,
{
    fn lookup_secret(&self, access_key_id: &str) -> Result<Option<SecretKey>, BoxError> {
        (self.f)(access_key_id)
    }
}

/// Create a [`SecretLookup`] that wraps a function that can produce a secret.
pub fn secret_lookup_fn<F>(f: F) -> SecretLookupFn<F>
where
    F: Fn(&str) -> Result<Option<SecretKey>, BoxError>,
{
    SecretLookupFn {
        f,
    }
}

#[cfg(test)]
mod tests {
    use {
        crate::{derive_signing_key, secret_lookup_fn, HashAlgorithm, SecretKey, SecretLookup},
        chrono::NaiveDate,
        std::collections::HashMap,
    };

    const AWS_SECRET: &str = "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY";

    #[test_log::test]
    fn test_signing_key_derived() {
        let date = NaiveDate::from_ymd_opt(2015, 8, 30).unwrap();
        let secret1a = SecretKey::from(AWS_SECRET);
        let secret1b = SecretKey::from(AWS_SECRET.to_string());
        let secret2 = SecretKey::from("wJalrXUtnFEMI/K7MDENG+bPxRfiCZEXAMPLEKEY");

        assert_eq!(secret1a, secret1b);
        assert_ne!(secret1a, secret2);
        assert_eq!(format!("{:?}", secret1a).as_str(), "SecretKey");
        assert_eq!(format!("{}", secret1a).as_str(), "SecretKey");
        assert_eq!(secret1a.as_ref(), AWS_SECRET.as_bytes());

        // With no scope segments and no terminator step the chain stops at the date key. Here the
        // terminator is the region, so this is HMAC(HMAC("AWS4" + secret, date), "us-east-1").
        let kregion = derive_signing_key::<&str>(HashAlgorithm::Sha256, "AWS4", &secret1a, date, &[], "us-east-1");
        assert_eq!(hex::encode(kregion.as_ref()), "f33d5808504bf34812e5fade63308b424b244c59189be2a591dd2282c7cb563f");

        let ksigning1a = derive_signing_key(
            HashAlgorithm::Sha256,
            "AWS4",
            &secret1a,
            date,
            &["us-east-1", "example"],
            "aws4_request",
        );
        let ksigning1b = derive_signing_key(
            HashAlgorithm::Sha256,
            "AWS4",
            &secret1b,
            date,
            &["us-east-1".to_string(), "example".to_string()],
            "aws4_request",
        );
        let ksigning2 = derive_signing_key(
            HashAlgorithm::Sha256,
            "AWS4",
            &secret2,
            date,
            &["us-east-1", "example"],
            "aws4_request",
        );

        assert_eq!(
            hex::encode(ksigning1a.as_ref()),
            "431cc9ef5876287dbb925d4ba4629f459002ad1d26b7c751601bb204e11718b8"
        );
        assert_eq!(ksigning1a, ksigning1b);
        assert_eq!(ksigning1a, ksigning1a.clone());
        assert_ne!(ksigning1a, ksigning2);
        assert_eq!(ksigning1a.algorithm(), HashAlgorithm::Sha256);
        assert_eq!(format!("{:?}", ksigning1a).as_str(), "SigningKey");
        assert_eq!(format!("{}", ksigning1a).as_str(), "SigningKey");
    }

    #[test_log::test]
    fn test_signing_key_scoped() {
        let date = NaiveDate::from_ymd_opt(2015, 8, 30).unwrap();
        let next_day = NaiveDate::from_ymd_opt(2015, 8, 31).unwrap();
        let secret = SecretKey::from(AWS_SECRET);

        let base =
            derive_signing_key(HashAlgorithm::Sha256, "AWS4", &secret, date, &["us-east-1", "s3"], "aws4_request");
        let other_date =
            derive_signing_key(HashAlgorithm::Sha256, "AWS4", &secret, next_day, &["us-east-1", "s3"], "aws4_request");
        let other_scope =
            derive_signing_key(HashAlgorithm::Sha256, "AWS4", &secret, date, &["us-east-1", "ec2"], "aws4_request");
        let other_prefix =
            derive_signing_key(HashAlgorithm::Sha256, "ESR", &secret, date, &["us-east-1", "s3"], "aws4_request");
        let other_hash =
            derive_signing_key(HashAlgorithm::Sha512, "AWS4", &secret, date, &["us-east-1", "s3"], "aws4_request");

        assert_ne!(base, other_date);
        assert_ne!(base, other_scope);
        assert_ne!(base, other_prefix);
        assert_ne!(base, other_hash);
        assert_eq!(other_hash.as_ref().len(), 64);
    }

    #[test_log::test]
    fn test_sign_zero_hash() {
        let date = NaiveDate::from_ymd_opt(2015, 8, 30).unwrap();
        let key = derive_signing_key(
            HashAlgorithm::Sha256,
            "AWS4",
            &SecretKey::from(AWS_SECRET),
            date,
            &["us-east-1", "example"],
            "aws4_request",
        );
        let sts = format!(
            "AWS4-HMAC-SHA256\n20150830T123600Z\n20150830/us-east-1/example/aws4_request\n{}",
            "0".repeat(64)
        );
        assert_eq!(key.sign(sts), "88bf1ccb1e3e4df7bb2ed6d89bcd8558d6770845007e1a5c392ac9edce0d5deb");
    }

    #[test_log::test]
    fn test_lookups() {
        let mut strings = HashMap::new();
        strings.insert("AKIDEXAMPLE".to_string(), AWS_SECRET.to_string());
        assert_eq!(strings.lookup_secret("AKIDEXAMPLE").unwrap(), Some(SecretKey::from(AWS_SECRET)));
        assert_eq!(strings.lookup_secret("nobody").unwrap(), None);

        let mut keys = HashMap::new();
        keys.insert("AKIDEXAMPLE".to_string(), SecretKey::from(AWS_SECRET));
        assert_eq!((&keys).lookup_secret("AKIDEXAMPLE").unwrap(), Some(SecretKey::from(AWS_SECRET)));

        let f = secret_lookup_fn(|akid: &str| {
            if akid == "broken" {
                Err("database unavailable".into())
            } else {
                Ok(Some(SecretKey::from("secret")))
            }
        });
        assert_eq!(f.lookup_secret("anyone").unwrap(), Some(SecretKey::from("secret")));
        assert_eq!(f.lookup_secret("broken").unwrap_err().to_string(), "database unavailable");
        assert_eq!(format!("{:?}", f), "SecretLookupFn");
    }
}
