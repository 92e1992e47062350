//! The `escher_signature` crate signs and verifies HTTP requests with an Escher-style HMAC scheme, a
//! generalization of AWS SigV4.
//!
//! Both sides reduce a request to a canonical string, hash it into a string to sign, and sign that with a
//! key derived from the shared secret through a chain of HMACs over the request date and the credential
//! scope. The signer attaches the result as an authorization header or as presigned query parameters;
//! the verifier recomputes it with a secret obtained through a [`SecretLookup`] and compares the two in
//! constant time.
//!
//! The defaults follow the Escher conventions (`ESR-HMAC-SHA256`, `X-Escher-Auth`, `X-Escher-Date`,
//! `escher_request`). Every name is configurable, so the same code serves AWS SigV4-shaped deployments
//! (`AWS4`, `Authorization`, `X-Amz-Date`, `aws4_request`).
//!
//! # Workflow
//! 1. Build a [`Config`] with [`Config::builder`].
//! 2. Convert your request into a [`RequestModel`] (an `http::Request` converts directly).
//! 3. Sign it with [`Signer::sign_request`] or [`Signer::presign_url`].
//! 4. On the receiving side, verify it with [`Authenticator::authenticate`].
//!
//! ## Example
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use escher_signature::{Authenticator, Config, RequestModel, Signer};
//! use std::collections::HashMap;
//!
//! // Pin the clock so the example is deterministic; leave it out to use the system clock.
//! let now = Utc.with_ymd_and_hms(2011, 9, 9, 23, 36, 0).unwrap();
//! let config = Config::builder()
//!     .access_key_id("key1")
//!     .secret("secret")
//!     .credential_scope(["eu", "host"])
//!     .fixed_time(now)
//!     .build()
//!     .unwrap();
//!
//! let request = RequestModel::new("GET", "/?k=p").with_header("Host", "example.com");
//! let signed = Signer::new(config.clone()).sign_request(&request, &["host"]).unwrap();
//! assert!(signed.header("X-Escher-Auth").unwrap().starts_with("ESR-HMAC-SHA256 Credential=key1/20110909/"));
//!
//! // The verifier looks up secrets by access key id.
//! let mut secrets = HashMap::new();
//! secrets.insert("key1".to_string(), "secret".to_string());
//! let identity = Authenticator::new(config).authenticate(&signed, &secrets).unwrap();
//! assert_eq!(identity.access_key_id(), "key1");
//! ```
#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![warn(rustdoc::missing_crate_level_docs)]

mod artifact;
mod auth;
mod canonical;
mod chronoutil;
mod config;
mod constants;
mod crypto;
mod error;
mod fixture;
mod request;
mod scope;
mod signer;
mod signing_key;
mod string_to_sign;

pub use crate::{
    artifact::{ArtifactPlacement, AuthArtifact},
    auth::{AuthenticatedIdentity, Authenticator, SignedHeaderRequirements},
    canonical::{CanonicalOptions, CanonicalRequest, SignedHeaders},
    chronoutil::{format_date_header, format_timestamp, parse_timestamp},
    config::{Clock, Config, ConfigBuilder, FixedClock, SystemClock},
    crypto::HashAlgorithm,
    error::{AuthenticationError, BoxError, RejectionReason, SignatureError},
    fixture::{Expected, FixtureConfig, FixtureRequest, TestFixture},
    request::RequestModel,
    scope::CredentialScope,
    signer::Signer,
    signing_key::{derive_signing_key, secret_lookup_fn, SecretKey, SecretLookup, SecretLookupFn, SigningKey},
    string_to_sign::StringToSign,
};

#[cfg(any(doc, feature = "unstable"))]
pub use crate::canonical::{
    canonicalize_query, canonicalize_uri_path, is_rfc3986_unreserved, normalize_header_value, percent_decode,
    percent_encode, split_query, UriElement,
};

#[cfg(test)]
mod aws4;
