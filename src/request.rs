//! The request model shared by the signer and the authenticator.
//!
//! A [`RequestModel`] is an immutable snapshot of a request: method, raw URL, headers in insertion
//! order, and body. The `with_*` constructors consume the model and return a new one, so signing never
//! mutates a caller's request.

use {
    crate::{
        canonical::{latin1_to_string, split_query},
        SignatureError,
    },
    bytes::Bytes,
    http::{
        header::{HeaderName, HeaderValue},
        method::Method,
        request::Request,
        uri::Uri,
    },
};

/// An HTTP request as seen by the signing protocol.
///
/// Header pairs are kept in insertion order and are never merged by the model; names that differ only
/// in case are merged during canonicalization.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestModel {
    /// The request method, e.g. `GET`. Used verbatim.
    method: String,

    /// The request URL; either absolute (`https://host/path?query`) or origin-form (`/path?query`).
    url: String,

    /// Header name/value pairs.
    headers: Vec<(String, String)>,

    /// The request body.
    body: Bytes,
}

impl RequestModel {
    /// Create a new request with no headers and an empty body.
    pub fn new<M: Into<String>, U: Into<String>>(method: M, url: U) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    /// Return a new request with an additional header appended.
    pub fn with_header<N: Into<String>, V: Into<String>>(mut self, name: N, value: V) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Return a new request with the given headers appended.
    pub fn with_headers<I, N, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<String>,
    {
        self.headers.extend(headers.into_iter().map(|(n, v)| (n.into(), v.into())));
        self
    }

    /// Return a new request with every header named `name` (case-insensitive) removed.
    pub fn without_header(mut self, name: &str) -> Self {
        self.headers.retain(|(n, _)| !header_name_eq(n, name));
        self
    }

    /// Return a new request with the body replaced.
    pub fn with_body<B: Into<Bytes>>(mut self, body: B) -> Self {
        self.body = body.into();
        self
    }

    /// Return a new request with the URL replaced.
    pub fn with_url<U: Into<String>>(mut self, url: U) -> Self {
        self.url = url.into();
        self
    }

    /// The request method.
    #[inline]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The raw request URL.
    #[inline]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The header pairs, in insertion order.
    #[inline]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// The request body.
    #[inline]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Iterate over every value of the header named `name` (case-insensitive), in insertion order.
    pub fn header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers.iter().filter(move |(n, _)| header_name_eq(n, name)).map(|(_, v)| v.as_str())
    }

    /// Return the first value of the header named `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter().find(|(n, _)| header_name_eq(n, name)).map(|(_, v)| v.as_str())
    }

    /// Indicates whether the request has at least one header named `name` (case-insensitive).
    pub fn has_header(&self, name: &str) -> bool {
        self.header(name).is_some()
    }

    /// Split the URL into its raw (still percent-encoded) path and query string.
    ///
    /// An empty URL or an absolute URL without a path yields `/`; a URL without a query yields an empty
    /// query.
    pub fn path_and_query(&self) -> Result<(String, String), SignatureError> {
        if self.url.is_empty() {
            return Ok(("/".to_string(), String::new()));
        }

        let uri = self
            .url
            .parse::<Uri>()
            .map_err(|e| SignatureError::MalformedUrl(format!("Unable to parse URL '{}': {}", self.url, e)))?;

        match uri.path_and_query() {
            Some(pq) => {
                let path = if pq.path().is_empty() {
                    "/"
                } else {
                    pq.path()
                };
                Ok((path.to_string(), pq.query().unwrap_or_default().to_string()))
            }
            None => Ok(("/".to_string(), String::new())),
        }
    }

    /// Return the decoded query parameters in the order they appear in the URL. `+` decodes to a space.
    pub fn query_parameters(&self) -> Result<Vec<(String, String)>, SignatureError> {
        let (_, query) = self.path_and_query()?;
        let pairs = split_query(&query)?;
        Ok(pairs.into_iter().map(|(k, v)| (latin1_or_utf8(k), latin1_or_utf8(v))).collect())
    }

    /// Return the first decoded value of the query parameter `name`.
    pub fn query_parameter(&self, name: &str) -> Result<Option<String>, SignatureError> {
        Ok(self.query_parameters()?.into_iter().find(|(k, _)| k == name).map(|(_, v)| v))
    }

    /// Create a model from an [`http::Request`]. Header values that are not valid UTF-8 are read as
    /// Latin-1.
    pub fn from_http_request<B: Into<Bytes>>(request: Request<B>) -> Self {
        let (parts, body) = request.into_parts();
        let headers = parts
            .headers
            .iter()
            .map(|(name, value)| {
                let value = match value.to_str() {
                    Ok(s) => s.to_string(),
                    Err(_) => latin1_to_string(value.as_bytes()),
                };
                (name.as_str().to_string(), value)
            })
            .collect();

        Self {
            method: parts.method.as_str().to_string(),
            url: parts.uri.to_string(),
            headers,
            body: body.into(),
        }
    }

    /// Convert this model into an [`http::Request`].
    pub fn into_http_request(self) -> Result<Request<Bytes>, SignatureError> {
        let method = Method::from_bytes(self.method.as_bytes())
            .map_err(|e| SignatureError::InvalidRequest(format!("Invalid method '{}': {}", self.method, e)))?;
        let uri = if self.url.is_empty() {
            Uri::from_static("/")
        } else {
            self.url
                .parse::<Uri>()
                .map_err(|e| SignatureError::MalformedUrl(format!("Unable to parse URL '{}': {}", self.url, e)))?
        };

        let mut request = Request::new(self.body);
        *request.method_mut() = method;
        *request.uri_mut() = uri;

        let headers = request.headers_mut();
        for (name, value) in self.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| SignatureError::InvalidRequest(format!("Invalid header name '{}': {}", name, e)))?;
            let header_value = HeaderValue::from_str(&value).map_err(|e| {
                SignatureError::InvalidRequest(format!("Invalid value for header '{}': {}", name, e))
            })?;
            headers.append(header_name, header_value);
        }

        Ok(request)
    }
}

impl<B: Into<Bytes>> From<Request<B>> for RequestModel {
    fn from(request: Request<B>) -> Self {
        Self::from_http_request(request)
    }
}

#[inline]
fn header_name_eq(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

fn latin1_or_utf8(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => latin1_to_string(e.as_bytes()),
    }
}
