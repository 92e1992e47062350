//! Common constants used throughout the crate.
//!
//! Keeping these in one spot means the signer and the authenticator can never drift apart on a
//! header name, a parameter suffix, or an error code.
//!
//! Tests that are testing the content of an error code or message should not use these constants;
//! they should use hard-coded strings so the tests are also testing for misspellings.
//!
//! Please keep this file organized alphabetically.

/// Separator between the algorithm prefix and the hash name in an algorithm tag.
pub(crate) const ALGORITHM_HMAC_INFIX: &str = "-HMAC-";

/// Authorization header field for the credential.
pub(crate) const CREDENTIAL: &str = "Credential";

/// Default name of the authorization header.
pub(crate) const DEFAULT_AUTH_HEADER_NAME: &str = "X-Escher-Auth";

/// Default algorithm prefix; also prepended to the secret when deriving signing keys.
pub(crate) const DEFAULT_ALGORITHM_PREFIX: &str = "ESR";

/// Default clock skew tolerance, in seconds.
pub(crate) const DEFAULT_CLOCK_SKEW_SECONDS: i64 = 300;

/// Default name of the date header.
pub(crate) const DEFAULT_DATE_HEADER_NAME: &str = "X-Escher-Date";

/// Default terminal element of the credential scope.
pub(crate) const DEFAULT_SCOPE_TERMINATOR: &str = "escher_request";

/// Default vendor key, used to build the presigned query parameter names.
pub(crate) const DEFAULT_VENDOR_KEY: &str = "Escher";

/// Error code: CredentialScopeMismatch
pub(crate) const ERR_CODE_CREDENTIAL_SCOPE_MISMATCH: &str = "CredentialScopeMismatch";

/// Error code: InternalFailure
pub(crate) const ERR_CODE_INTERNAL_FAILURE: &str = "InternalFailure";

/// Error code: InvalidConfiguration
pub(crate) const ERR_CODE_INVALID_CONFIGURATION: &str = "InvalidConfiguration";

/// Error code: InvalidRequest
pub(crate) const ERR_CODE_INVALID_REQUEST: &str = "InvalidRequest";

/// Error code: MalformedAuthorization
pub(crate) const ERR_CODE_MALFORMED_AUTHORIZATION: &str = "MalformedAuthorization";

/// Error code: MalformedURL
pub(crate) const ERR_CODE_MALFORMED_URL: &str = "MalformedURL";

/// Error code: MissingRequiredHeader
pub(crate) const ERR_CODE_MISSING_REQUIRED_HEADER: &str = "MissingRequiredHeader";

/// Error code: SignatureDoesNotMatch
pub(crate) const ERR_CODE_SIGNATURE_DOES_NOT_MATCH: &str = "SignatureDoesNotMatch";

/// Error code: SignatureExpired
pub(crate) const ERR_CODE_SIGNATURE_EXPIRED: &str = "SignatureExpired";

/// Error code: UnknownAccessKey
pub(crate) const ERR_CODE_UNKNOWN_ACCESS_KEY: &str = "UnknownAccessKey";

/// Error code: UnsupportedAlgorithm
pub(crate) const ERR_CODE_UNSUPPORTED_ALGORITHM: &str = "UnsupportedAlgorithm";

/// Header name that switches the date header to RFC 1123 formatting.
pub(crate) const HDR_DATE: &str = "date";

/// Uppercase hex digits.
pub(crate) const HEX_DIGITS_UPPER: [u8; 16] =
    [b'0', b'1', b'2', b'3', b'4', b'5', b'6', b'7', b'8', b'9', b'A', b'B', b'C', b'D', b'E', b'F'];

/// Error message: `"Illegal hex character in escape % pattern: %"`
pub(crate) const MSG_ILLEGAL_HEX_CHAR: &str = "Illegal hex character in escape % pattern: %";

/// Error message: `"Incomplete trailing escape % sequence"`
pub(crate) const MSG_INCOMPLETE_TRAILING_ESCAPE: &str = "Incomplete trailing escape % sequence";

/// Error message: `"The request signature we calculated does not match the signature you provided."`
pub(crate) const MSG_REQUEST_SIGNATURE_MISMATCH: &str =
    "The request signature we calculated does not match the signature you provided.";

/// Error message: `"Request is missing authentication information"`
pub(crate) const MSG_REQUEST_MISSING_AUTH: &str = "Request is missing authentication information";

/// Presigned query parameter suffix: algorithm tag.
pub(crate) const QP_ALGORITHM: &str = "Algorithm";

/// Presigned query parameter suffix: credential.
pub(crate) const QP_CREDENTIAL: &str = "Credential";

/// Presigned query parameter suffix: request timestamp.
pub(crate) const QP_DATE: &str = "Date";

/// Presigned query parameter suffix: expiry offset in seconds.
pub(crate) const QP_EXPIRES: &str = "Expires";

/// Presigned query parameter suffix: signature.
pub(crate) const QP_SIGNATURE: &str = "Signature";

/// Presigned query parameter suffix: signed header list.
pub(crate) const QP_SIGNED_HEADERS: &str = "SignedHeaders";

/// Authorization header field for the signature itself.
pub(crate) const SIGNATURE: &str = "Signature";

/// Authorization header field for the signed header list.
pub(crate) const SIGNED_HEADERS: &str = "SignedHeaders";

/// Body digest placeholder used by presigned URLs.
pub(crate) const UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";
