use {
    crate::{chronoutil::format_timestamp, constants::ALGORITHM_HMAC_INFIX, CanonicalRequest, CredentialScope},
    chrono::{DateTime, Utc},
    std::fmt::{Display, Formatter, Result as FmtResult},
};

/// The string to sign: algorithm tag, timestamp, credential scope and canonical request digest, one per
/// line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StringToSign {
    algorithm_tag: String,
    timestamp: DateTime<Utc>,
    scope: CredentialScope,
    canonical_request_digest: String,
}

impl StringToSign {
    /// Build the string to sign for a canonical request.
    pub fn new<A: Into<String>>(
        canonical_request: &CanonicalRequest,
        timestamp: DateTime<Utc>,
        scope: CredentialScope,
        algorithm_tag: A,
    ) -> Self {
        Self {
            algorithm_tag: algorithm_tag.into(),
            timestamp,
            scope,
            canonical_request_digest: canonical_request.digest(),
        }
    }

    /// The algorithm tag, e.g. `ESR-HMAC-SHA256`.
    #[inline]
    pub fn algorithm_tag(&self) -> &str {
        &self.algorithm_tag
    }

    /// The request timestamp.
    #[inline]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// The credential scope.
    #[inline]
    pub fn scope(&self) -> &CredentialScope {
        &self.scope
    }

    /// The hex digest of the canonical request.
    #[inline]
    pub fn canonical_request_digest(&self) -> &str {
        &self.canonical_request_digest
    }
}

impl Display for StringToSign {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        writeln!(f, "{}", self.algorithm_tag)?;
        writeln!(f, "{}", format_timestamp(&self.timestamp))?;
        writeln!(f, "{}", self.scope)?;
        f.write_str(&self.canonical_request_digest)
    }
}

/// Build an algorithm tag such as `ESR-HMAC-SHA256` from a prefix and a hash name.
pub(crate) fn algorithm_tag(prefix: &str, hash_name: &str) -> String {
    format!("{}{}{}", prefix, ALGORITHM_HMAC_INFIX, hash_name)
}
