//! Request canonicalization.
//!
//! Both sides of the protocol reduce a request to the same canonical string:
//!
//! ```text
//! METHOD
//! /canonical/path
//! canonical=query&string=
//! header1:value1
//! header2:value2
//!
//! header1;header2
//! hex(hash(body))
//! ```
//!
//! The header block is terminated by an empty line.
//!
//! **Stability of the helper functions in this module is not guaranteed**. They are exposed when the
//! `unstable` feature is enabled for testing purposes only.

use {
    crate::{
        constants::*,
        crypto::HashAlgorithm,
        request::RequestModel,
        SignatureError,
    },
    encoding::{
        all::ISO_8859_1,
        types::{DecoderTrap, Encoding},
    },
    lazy_static::lazy_static,
    log::trace,
    qualifier_attr::qualifiers,
    regex::Regex,
    std::{
        fmt::{Display, Formatter, Result as FmtResult},
        str::FromStr,
    },
};

lazy_static! {
    /// Multiple slashes in a path.
    static ref MULTISLASH: Regex = Regex::new("//+").expect("invalid multislash regex");

    /// Runs of whitespace in a header value.
    static ref MULTISPACE: Regex = Regex::new(r"\s+").expect("invalid multispace regex");
}

/// The set of header names bound into a signature.
///
/// Names are lower-cased, deduplicated and kept sorted, so the `Display` form is the signed header list
/// of the canonical request (`host;x-escher-date`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct SignedHeaders {
    names: Vec<String>,
}

impl SignedHeaders {
    /// Create a signed header set from a list of header names.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names: Vec<String> =
            names.into_iter().map(|s| s.as_ref().trim().to_ascii_lowercase()).filter(|s| !s.is_empty()).collect();
        names.sort_unstable();
        names.dedup();
        Self {
            names,
        }
    }

    /// Return a new set with `name` added.
    pub fn with<S: AsRef<str>>(&self, name: S) -> Self {
        Self::new(self.names.iter().map(String::as_str).chain(std::iter::once(name.as_ref())))
    }

    /// Indicates whether `name` (case-insensitive) is in the set.
    pub fn contains(&self, name: &str) -> bool {
        let name = name.trim().to_ascii_lowercase();
        self.names.binary_search(&name).is_ok()
    }

    /// Iterate over the lower-cased names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// The number of names in the set.
    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Indicates whether the set is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Display for SignedHeaders {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        f.write_str(&self.names.join(";"))
    }
}

impl FromStr for SignedHeaders {
    type Err = SignatureError;

    /// Parse a `;`-separated signed header list.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s.split(';')))
    }
}

/// Options that vary how a request is canonicalized.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CanonicalOptions {
    /// The hash algorithm for the body digest.
    pub hash_algorithm: HashAlgorithm,

    /// Use `UNSIGNED-PAYLOAD` in place of the body digest (presigned URLs).
    pub unsigned_payload: bool,

    /// A query parameter to leave out of the canonical query (the presigned signature parameter).
    pub exclude_query_parameter: Option<String>,
}

/// The canonical form of a request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CanonicalRequest {
    /// The request method.
    method: String,

    /// The normalized, re-encoded path.
    path: String,

    /// The sorted, re-encoded query string.
    query: String,

    /// One `(name, value)` entry per signed header, sorted by name.
    headers: Vec<(String, String)>,

    /// The signed header list.
    signed_headers: SignedHeaders,

    /// The hex body digest, or `UNSIGNED-PAYLOAD`.
    body_digest: String,

    /// The hash algorithm the body digest was computed with.
    hash_algorithm: HashAlgorithm,
}

impl CanonicalRequest {
    /// Canonicalize `request`, binding the headers in `signed_headers`.
    ///
    /// Every signed header must be present on the request; a missing one is
    /// [`SignatureError::MissingHeader`] rather than being skipped.
    pub fn canonicalize(
        request: &RequestModel,
        signed_headers: &SignedHeaders,
        options: &CanonicalOptions,
    ) -> Result<Self, SignatureError> {
        let (raw_path, raw_query) = request.path_and_query()?;
        let path = canonicalize_uri_path(&raw_path)?;
        let query = canonicalize_query(&raw_query, options.exclude_query_parameter.as_deref())?;

        let mut headers = Vec::with_capacity(signed_headers.len());
        for name in signed_headers.iter() {
            let values: Vec<String> = request.header_values(name).map(normalize_header_value).collect();
            if values.is_empty() {
                trace!("canonicalize: signed header {} missing from request", name);
                return Err(SignatureError::MissingHeader(format!(
                    "Header '{}' is in the signed header list but missing from the request",
                    name
                )));
            }
            headers.push((name.to_string(), values.join(",")));
        }

        let body_digest = if options.unsigned_payload {
            UNSIGNED_PAYLOAD.to_string()
        } else {
            options.hash_algorithm.hex_digest(request.body())
        };

        let result = Self {
            method: request.method().to_string(),
            path,
            query,
            headers,
            signed_headers: signed_headers.clone(),
            body_digest,
            hash_algorithm: options.hash_algorithm,
        };
        trace!("Canonical request:\n{}", result);
        Ok(result)
    }

    /// The request method.
    #[inline]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The canonical path.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The canonical query string.
    #[inline]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// The canonical header entries.
    #[inline]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// The signed header list.
    #[inline]
    pub fn signed_headers(&self) -> &SignedHeaders {
        &self.signed_headers
    }

    /// The body digest.
    #[inline]
    pub fn body_digest(&self) -> &str {
        &self.body_digest
    }

    /// The hex digest of the canonical string under the request's hash algorithm.
    pub fn digest(&self) -> String {
        self.hash_algorithm.hex_digest(self.to_string().as_bytes())
    }
}

impl Display for CanonicalRequest {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        writeln!(f, "{}", self.method)?;
        writeln!(f, "{}", self.path)?;
        writeln!(f, "{}", self.query)?;
        for (name, value) in &self.headers {
            writeln!(f, "{}:{}", name, value)?;
        }
        writeln!(f)?;
        writeln!(f, "{}", self.signed_headers)?;
        f.write_str(&self.body_digest)
    }
}

/// Indicates whether we are decoding a URI path element or a query string element. Only query elements
/// treat `+` as a space.
#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum UriElement {
    /// URI element represents a path
    Path,

    /// URI element represents a query string
    Query,
}

/// Normalize the specified URI path, removing redundant slashes and relative path components, and
/// re-encoding each segment.
#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn canonicalize_uri_path(uri_path: &str) -> Result<String, SignatureError> {
    // Special case: empty path is converted to '/'; also short-circuit the usual '/' path here.
    if uri_path.is_empty() || uri_path == "/" {
        return Ok("/".to_string());
    }

    // All other paths must be absolute.
    if !uri_path.starts_with('/') {
        return Err(SignatureError::MalformedUrl(format!("Path is not absolute: {}", uri_path)));
    }

    let uri_path = MULTISLASH.replace_all(uri_path, "/");

    // Dot segments are resolved after decoding, so %2E%2E is a parent reference too.
    let mut segments: Vec<Vec<u8>> = Vec::new();
    for segment in uri_path.split('/').skip(1) {
        let decoded = percent_decode(segment, UriElement::Path)?;
        match decoded.as_slice() {
            b"." => (),
            b".." => {
                if segments.pop().is_none() {
                    return Err(SignatureError::MalformedUrl(format!(
                        "Relative path entry '..' navigates above root: {}",
                        uri_path
                    )));
                }
            }
            _ => segments.push(decoded),
        }
    }

    let encoded: Vec<String> = segments.iter().map(|s| percent_encode(s)).collect();
    Ok(format!("/{}", encoded.join("/")))
}

/// Build the canonical query string: decode every parameter, drop `exclude` if given, re-encode, and
/// sort by key then value.
#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn canonicalize_query(query: &str, exclude: Option<&str>) -> Result<String, SignatureError> {
    let mut pairs: Vec<(String, String)> = split_query(query)?
        .into_iter()
        .filter(|(key, _)| exclude.map(|ex| key.as_slice() != ex.as_bytes()).unwrap_or(true))
        .map(|(key, value)| (percent_encode(&key), percent_encode(&value)))
        .collect();

    pairs.sort_unstable();
    let pairs: Vec<String> = pairs.into_iter().map(|(key, value)| format!("{}={}", key, value)).collect();
    Ok(pairs.join("&"))
}

/// Indicates whether the specified byte is RFC3986 unreserved -- i.e., can be represented without being
/// percent-encoded, e.g. '?' -> '%3F'.
#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
#[inline(always)]
fn is_rfc3986_unreserved(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'-' || c == b'.' || c == b'_' || c == b'~'
}

/// Convert a Latin-1 slice of bytes to a UTF-8 string.
#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn latin1_to_string(bytes: &[u8]) -> String {
    // Every byte maps to a code point in ISO-8859-1, so Replace never substitutes.
    ISO_8859_1.decode(bytes, DecoderTrap::Replace).unwrap_or_else(|_| String::from_utf8_lossy(bytes).into_owned())
}

/// Normalize a header value by trimming it and collapsing internal runs of whitespace to one space.
#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn normalize_header_value(value: &str) -> String {
    MULTISPACE.replace_all(value.trim(), " ").into_owned()
}

/// Decode a percent-encoded URI element. In query elements, `+` is a space.
///
/// If a percent encoding is incomplete or not hex, an error is returned.
#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn percent_decode(uri_el: &str, uri_el_type: UriElement) -> Result<Vec<u8>, SignatureError> {
    let bytes = uri_el.as_bytes();
    let mut result = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];

        if c == b'%' {
            if i + 2 >= bytes.len() {
                return Err(SignatureError::MalformedUrl(MSG_INCOMPLETE_TRAILING_ESCAPE.to_string()));
            }

            let hex_digits = &bytes[i + 1..i + 3];
            match hex::decode(hex_digits) {
                Ok(value) => result.extend(value),
                Err(_) => {
                    return Err(SignatureError::MalformedUrl(format!(
                        "{}{}{}",
                        MSG_ILLEGAL_HEX_CHAR, hex_digits[0] as char, hex_digits[1] as char
                    )));
                }
            }
            i += 3;
        } else if c == b'+' && uri_el_type == UriElement::Query {
            result.push(b' ');
            i += 1;
        } else {
            result.push(c);
            i += 1;
        }
    }

    Ok(result)
}

/// Percent-encode bytes: unreserved characters stay bare, everything else becomes an uppercase `%XX`.
#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn percent_encode(bytes: &[u8]) -> String {
    let mut result = String::with_capacity(bytes.len());
    for &c in bytes {
        if is_rfc3986_unreserved(c) {
            result.push(c as char);
        } else {
            let hex = u8_to_upper_hex(c);
            result.push('%');
            result.push(hex[0] as char);
            result.push(hex[1] as char);
        }
    }
    result
}

/// Split a raw query string into decoded `(key, value)` pairs, in order. Empty components are skipped and
/// a component without `=` has an empty value.
#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn split_query(query: &str) -> Result<Vec<(Vec<u8>, Vec<u8>)>, SignatureError> {
    let mut result = Vec::new();

    for component in query.split('&') {
        if component.is_empty() {
            continue;
        }

        let (key, value) = component.split_once('=').unwrap_or((component, ""));
        result.push((percent_decode(key, UriElement::Query)?, percent_decode(value, UriElement::Query)?));
    }

    Ok(result)
}

/// Convert a byte to uppercase hex representation.
#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
#[inline(always)]
const fn u8_to_upper_hex(b: u8) -> [u8; 2] {
    [HEX_DIGITS_UPPER[((b >> 4) & 0xf) as usize], HEX_DIGITS_UPPER[(b & 0xf) as usize]]
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{HashAlgorithm, RequestModel, SignatureError},
    };

    macro_rules! expect_err {
        ($test:expr, $expected:ident) => {
            match $test {
                Ok(e) => panic!("Expected Err({}); got Ok({:?})", stringify!($expected), e),
                Err(e) => match e {
                    SignatureError::$expected(msg) => msg,
                    _ => panic!("Expected {}; got {:?}: {}", stringify!($expected), &e, &e),
                },
            }
        };
    }

    #[test_log::test]
    fn canonicalize_uri_path_empty() {
        assert_eq!(canonicalize_uri_path("").unwrap(), "/".to_string());
        assert_eq!(canonicalize_uri_path("/").unwrap(), "/".to_string());
    }

    #[test_log::test]
    fn canonicalize_valid() {
        assert_eq!(canonicalize_uri_path("/hello/world").unwrap(), "/hello/world");
        assert_eq!(canonicalize_uri_path("/hello///world").unwrap(), "/hello/world");
        assert_eq!(canonicalize_uri_path("/hello/./world").unwrap(), "/hello/world");
        assert_eq!(canonicalize_uri_path("/hello/foo/../world").unwrap(), "/hello/world");
        assert_eq!(canonicalize_uri_path("/hello/%2E%2E/world").unwrap(), "/world");
        assert_eq!(canonicalize_uri_path("/hello/world/").unwrap(), "/hello/world/");
        assert_eq!(canonicalize_uri_path("/hello/world/..").unwrap(), "/hello");
        assert_eq!(canonicalize_uri_path("/a/../").unwrap(), "/");
        assert_eq!(canonicalize_uri_path("/foo/../bar/./baz//qux/").unwrap(), "/bar/baz/qux/");
    }

    #[test_log::test]
    fn canonicalize_reencodes() {
        assert_eq!(canonicalize_uri_path("/%7euser/a%2fb").unwrap(), "/~user/a%2Fb");
        assert_eq!(canonicalize_uri_path("/a+b").unwrap(), "/a%2Bb");
        assert_eq!(canonicalize_uri_path("/a b").unwrap(), "/a%20b");
        assert_eq!(canonicalize_uri_path("/caf%c3%a9").unwrap(), "/caf%C3%A9");
        assert_eq!(canonicalize_uri_path("/\u{fc}").unwrap(), "/%C3%BC");
        assert_eq!(canonicalize_uri_path("/-._~").unwrap(), "/-._~");
        assert_eq!(canonicalize_uri_path("/a:b@c").unwrap(), "/a%3Ab%40c");
    }

    #[test_log::test]
    fn canonicalize_invalid() {
        let e = expect_err!(canonicalize_uri_path("hello/world"), MalformedUrl);
        assert_eq!(e, "Path is not absolute: hello/world");

        let e = expect_err!(canonicalize_uri_path("/hello/../../world"), MalformedUrl);
        assert_eq!(e, "Relative path entry '..' navigates above root: /hello/../../world");

        let e = expect_err!(canonicalize_uri_path("/.."), MalformedUrl);
        assert!(e.starts_with("Relative path entry '..' navigates above root"));

        let e = expect_err!(canonicalize_uri_path("/x%0J"), MalformedUrl);
        assert_eq!(e, "Illegal hex character in escape % pattern: %0J");

        let e = expect_err!(canonicalize_uri_path("/x%A"), MalformedUrl);
        assert_eq!(e, "Incomplete trailing escape % sequence");
    }

    #[test_log::test]
    fn canonicalize_query_sorting() {
        assert_eq!(canonicalize_query("", None).unwrap(), "");
        assert_eq!(canonicalize_query("k=p", None).unwrap(), "k=p");
        assert_eq!(canonicalize_query("b=2&a=2&a=1&c", None).unwrap(), "a=1&a=2&b=2&c=");
        assert_eq!(canonicalize_query("&&z=1&&", None).unwrap(), "z=1");
        assert_eq!(canonicalize_query("B=1&a=1&_=1", None).unwrap(), "B=1&_=1&a=1");
        assert_eq!(canonicalize_query("a=1=2", None).unwrap(), "a=1%3D2");
    }

    #[test_log::test]
    fn canonicalize_query_encoding() {
        assert_eq!(canonicalize_query("q=hello+world&x=%7e", None).unwrap(), "q=hello%20world&x=~");
        assert_eq!(canonicalize_query("q=a%2bb", None).unwrap(), "q=a%2Bb");
        assert_eq!(canonicalize_query("path=%2Fa%2Fb&e=%e2%82%ac", None).unwrap(), "e=%E2%82%AC&path=%2Fa%2Fb");

        let e = expect_err!(canonicalize_query("a=%4", None), MalformedUrl);
        assert_eq!(e, "Incomplete trailing escape % sequence");
        let e = expect_err!(canonicalize_query("a=%zz", None), MalformedUrl);
        assert_eq!(e, "Illegal hex character in escape % pattern: %zz");
    }

    #[test_log::test]
    fn canonicalize_query_excludes_signature() {
        let query = "X-Escher-Signature=abcd&X-Escher-Date=20110909T233600Z&a=1";
        assert_eq!(
            canonicalize_query(query, Some("X-Escher-Signature")).unwrap(),
            "X-Escher-Date=20110909T233600Z&a=1"
        );
        assert_eq!(
            canonicalize_query(query, None).unwrap(),
            "X-Escher-Date=20110909T233600Z&X-Escher-Signature=abcd&a=1"
        );
    }

    #[test_log::test]
    fn normalize_header_values() {
        assert_eq!(normalize_header_value("  a   b  "), "a b");
        assert_eq!(normalize_header_value("a\t\tb"), "a b");
        assert_eq!(normalize_header_value(""), "");
        assert_eq!(normalize_header_value("\"quoted   value\""), "\"quoted value\"");
    }

    #[test_log::test]
    fn test_u8_to_upper_hex() {
        for i in 0..=255 {
            let result = u8_to_upper_hex(i);
            assert_eq!(String::from_utf8_lossy(result.as_slice()), format!("{:02X}", i));
        }
    }

    #[test_log::test]
    fn test_signed_headers() {
        let sh = SignedHeaders::new(["X-Testing", "host", "x-testing", " Date "]);
        assert_eq!(sh.to_string(), "date;host;x-testing");
        assert_eq!(sh.len(), 3);
        assert!(sh.contains("HOST"));
        assert!(!sh.contains("x-other"));

        let sh2 = sh.with("X-Escher-Date");
        assert_eq!(sh2.to_string(), "date;host;x-escher-date;x-testing");
        assert_eq!(sh.len(), 3);

        let parsed: SignedHeaders = "host;x-testing;;date".parse().unwrap();
        assert_eq!(parsed, sh);
        assert!(SignedHeaders::default().is_empty());
        assert_eq!(SignedHeaders::default().to_string(), "");
    }

    #[test_log::test]
    fn test_canonical_request_layout() {
        let req = RequestModel::new("GET", "/?k=p")
            .with_header("X-Testing", "OK")
            .with_header("X-Date", "20110909T233600Z");
        let signed = SignedHeaders::new(["x-testing", "x-date"]);
        let creq = CanonicalRequest::canonicalize(&req, &signed, &CanonicalOptions::default()).unwrap();

        assert_eq!(
            creq.to_string(),
            "GET\n/\nk=p\nx-date:20110909T233600Z\nx-testing:OK\n\nx-date;x-testing\n\
             e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(creq.method(), "GET");
        assert_eq!(creq.path(), "/");
        assert_eq!(creq.query(), "k=p");
        assert_eq!(creq.headers().len(), 2);
        assert_eq!(creq.signed_headers(), &signed);
        assert_eq!(creq.digest(), "99cad30a0149e9bb0d77c820a74a4165369400b96d26593a1a2ae726056296fb");
    }

    #[test_log::test]
    fn test_canonical_request_merges_headers() {
        let req = RequestModel::new("POST", "https://example.com/a/./b")
            .with_header("X-Multi", "  first   value ")
            .with_header("Host", "example.com")
            .with_header("x-multi", "second")
            .with_body("hello");
        let signed = SignedHeaders::new(["host", "X-MULTI"]);
        let options = CanonicalOptions {
            hash_algorithm: HashAlgorithm::Sha256,
            ..Default::default()
        };
        let creq = CanonicalRequest::canonicalize(&req, &signed, &options).unwrap();

        assert_eq!(
            creq.to_string(),
            "POST\n/a/b\n\nhost:example.com\nx-multi:first value,second\n\nhost;x-multi\n\
             2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test_log::test]
    fn test_canonical_request_unsigned_payload() {
        let req = RequestModel::new("GET", "/file?X-Escher-Signature=ff&a=1")
            .with_header("Host", "example.com")
            .with_body("ignored");
        let options = CanonicalOptions {
            hash_algorithm: HashAlgorithm::Sha512,
            unsigned_payload: true,
            exclude_query_parameter: Some("X-Escher-Signature".to_string()),
        };
        let creq = CanonicalRequest::canonicalize(&req, &SignedHeaders::new(["host"]), &options).unwrap();
        assert_eq!(creq.to_string(), "GET\n/file\na=1\nhost:example.com\n\nhost\nUNSIGNED-PAYLOAD");
        assert_eq!(creq.body_digest(), "UNSIGNED-PAYLOAD");
        assert_eq!(creq.digest().len(), 128);
    }

    #[test_log::test]
    fn test_missing_signed_header() {
        let req = RequestModel::new("GET", "/").with_header("Host", "example.com");
        let signed = SignedHeaders::new(["host", "x-testing"]);
        let e = expect_err!(CanonicalRequest::canonicalize(&req, &signed, &CanonicalOptions::default()), MissingHeader);
        assert_eq!(e, "Header 'x-testing' is in the signed header list but missing from the request");
    }

    #[test_log::test]
    fn test_percent_helpers() {
        assert_eq!(percent_decode("a+b%20c", UriElement::Query).unwrap(), b"a b c");
        assert_eq!(percent_decode("a+b%20c", UriElement::Path).unwrap(), b"a+b c");
        assert_eq!(percent_encode(b"a b/c"), "a%20b%2Fc");
        assert_eq!(latin1_to_string(&[0x61, 0xe9]), "a\u{e9}");
        assert!(is_rfc3986_unreserved(b'~'));
        assert!(!is_rfc3986_unreserved(b'+'));
        assert_eq!(
            split_query("a=1&b&=2").unwrap(),
            vec![(b"a".to_vec(), b"1".to_vec()), (b"b".to_vec(), Vec::new()), (Vec::new(), b"2".to_vec())]
        );
    }
}
