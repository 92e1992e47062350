use {
    crate::constants::*,
    derive_builder::UninitializedFieldError,
    http::status::StatusCode,
    scratchstack_errors::ServiceError,
    std::{
        error::Error,
        fmt::{Display, Formatter, Result as FmtResult},
    },
};

/// A boxed error returned by pluggable capabilities such as [`SecretLookup`][crate::SecretLookup].
pub type BoxError = Box<dyn Error + Send + Sync>;

/// Error returned when a request cannot be canonicalized or signed, or when a configuration is
/// invalid.
#[derive(Debug)]
#[non_exhaustive]
pub enum SignatureError {
    /// The configuration is missing a required field or contains an invalid value.
    InvalidConfiguration(/* message */ String),

    /// The request cannot be represented as an HTTP request, e.g. a header name contains a space.
    InvalidRequest(/* message */ String),

    /// The request URL could not be parsed. This includes non-absolute paths, paths that navigate
    /// above the root (`/x/../../y`), and malformed percent-encodings (`%0J`).
    MalformedUrl(/* message */ String),

    /// A header named in the signed header list is not present on the request.
    MissingHeader(/* message */ String),

    /// The hash algorithm or algorithm tag is not supported.
    UnsupportedAlgorithm(/* message */ String),
}

impl SignatureError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidConfiguration(_) => ERR_CODE_INVALID_CONFIGURATION,
            Self::InvalidRequest(_) => ERR_CODE_INVALID_REQUEST,
            Self::MalformedUrl(_) => ERR_CODE_MALFORMED_URL,
            Self::MissingHeader(_) => ERR_CODE_MISSING_REQUIRED_HEADER,
            Self::UnsupportedAlgorithm(_) => ERR_CODE_UNSUPPORTED_ALGORITHM,
        }
    }

    fn http_status(&self) -> StatusCode {
        match self {
            Self::InvalidConfiguration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl ServiceError for SignatureError {
    fn error_code(&self) -> &'static str {
        SignatureError::error_code(self)
    }

    fn http_status(&self) -> StatusCode {
        SignatureError::http_status(self)
    }
}

impl Display for SignatureError {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::InvalidConfiguration(msg) => f.write_str(msg),
            Self::InvalidRequest(msg) => f.write_str(msg),
            Self::MalformedUrl(msg) => f.write_str(msg),
            Self::MissingHeader(msg) => f.write_str(msg),
            Self::UnsupportedAlgorithm(msg) => f.write_str(msg),
        }
    }
}

impl Error for SignatureError {}

impl From<UninitializedFieldError> for SignatureError {
    fn from(e: UninitializedFieldError) -> SignatureError {
        SignatureError::InvalidConfiguration(format!("Configuration field '{}' must be set", e.field_name()))
    }
}

/// The reason a verification attempt was rejected.
///
/// Each reason is distinct so callers can tell operational problems (clock drift, an unknown key,
/// a failing secret store) apart from tampering.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum RejectionReason {
    /// The authorization artifact is missing or cannot be parsed.
    Malformed,

    /// A signed header, the date header, or a header the service requires to be signed is missing.
    MissingHeader,

    /// The request timestamp is outside the allowed window.
    Expired,

    /// The secret lookup does not know the presented access key id.
    UnknownKey,

    /// The secret lookup itself failed.
    LookupFailed,

    /// The presented signature does not match the recomputed one.
    SignatureMismatch,

    /// The credential scope does not match the configured scope or the request date.
    ScopeMismatch,
}

impl RejectionReason {
    /// Return the machine-readable error code for this reason.
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Malformed => ERR_CODE_MALFORMED_AUTHORIZATION,
            Self::MissingHeader => ERR_CODE_MISSING_REQUIRED_HEADER,
            Self::Expired => ERR_CODE_SIGNATURE_EXPIRED,
            Self::UnknownKey => ERR_CODE_UNKNOWN_ACCESS_KEY,
            Self::LookupFailed => ERR_CODE_INTERNAL_FAILURE,
            Self::SignatureMismatch => ERR_CODE_SIGNATURE_DOES_NOT_MATCH,
            Self::ScopeMismatch => ERR_CODE_CREDENTIAL_SCOPE_MISMATCH,
        }
    }

    /// Return the HTTP status a service should answer with.
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Malformed | Self::MissingHeader => StatusCode::BAD_REQUEST,
            Self::LookupFailed => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::FORBIDDEN,
        }
    }
}

impl Display for RejectionReason {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        f.write_str(self.error_code())
    }
}

/// Error returned when a request fails authentication.
#[derive(Debug)]
pub struct AuthenticationError {
    /// Why the attempt was rejected.
    reason: RejectionReason,

    /// Human-readable detail.
    message: String,

    /// Underlying failure from the secret lookup, if any.
    source: Option<BoxError>,
}

impl AuthenticationError {
    /// Create a new rejection.
    pub fn new<S: Into<String>>(reason: RejectionReason, message: S) -> Self {
        Self {
            reason,
            message: message.into(),
            source: None,
        }
    }

    /// Create a [`RejectionReason::LookupFailed`] rejection wrapping the lookup's error.
    pub fn lookup_failed(source: BoxError) -> Self {
        Self {
            reason: RejectionReason::LookupFailed,
            message: format!("Secret lookup failed: {}", source),
            source: Some(source),
        }
    }

    /// Retrieve the rejection reason.
    #[inline]
    pub fn reason(&self) -> RejectionReason {
        self.reason
    }

    /// Retrieve the human-readable detail.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for AuthenticationError {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        f.write_str(&self.message)
    }
}

impl Error for AuthenticationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.source {
            Some(e) => Some(e.as_ref()),
            None => None,
        }
    }
}

impl ServiceError for AuthenticationError {
    fn error_code(&self) -> &'static str {
        self.reason.error_code()
    }

    fn http_status(&self) -> StatusCode {
        self.reason.http_status()
    }
}

/// Canonicalization failures on the verify path keep their meaning as rejections.
impl From<SignatureError> for AuthenticationError {
    fn from(e: SignatureError) -> AuthenticationError {
        let reason = match e {
            SignatureError::MissingHeader(_) => RejectionReason::MissingHeader,
            _ => RejectionReason::Malformed,
        };
        AuthenticationError::new(reason, e.to_string())
    }
}
