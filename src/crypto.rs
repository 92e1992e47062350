use {
    crate::SignatureError,
    hmac::{Hmac, Mac},
    sha2::{Digest, Sha256, Sha512},
    std::{
        fmt::{Display, Formatter, Result as FmtResult},
        str::FromStr,
    },
};

/// The hash algorithm used for body digests, the canonical request digest and the HMAC chain.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum HashAlgorithm {
    /// SHA-256 (`SHA256`).
    #[default]
    Sha256,

    /// SHA-512 (`SHA512`).
    Sha512,
}

impl HashAlgorithm {
    /// The name used in algorithm tags, e.g. `ESR-HMAC-SHA256`.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Sha256 => "SHA256",
            Self::Sha512 => "SHA512",
        }
    }

    /// Hash `value`.
    pub fn digest(&self, value: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha256 => Sha256::digest(value).to_vec(),
            Self::Sha512 => Sha512::digest(value).to_vec(),
        }
    }

    /// Hash `value`, returning lowercase hex.
    #[inline]
    pub fn hex_digest(&self, value: &[u8]) -> String {
        hex::encode(self.digest(value))
    }

    /// Compute `HMAC(key, value)`.
    pub fn hmac(&self, key: &[u8], value: &[u8]) -> Vec<u8> {
        // HMAC accepts keys of any length, so new_from_slice cannot fail here.
        match self {
            Self::Sha256 => {
                let mut mac = Hmac::<Sha256>::new_from_slice(key).expect("HMAC accepts any key length");
                mac.update(value);
                mac.finalize().into_bytes().to_vec()
            }
            Self::Sha512 => {
                let mut mac = Hmac::<Sha512>::new_from_slice(key).expect("HMAC accepts any key length");
                mac.update(value);
                mac.finalize().into_bytes().to_vec()
            }
        }
    }
}

impl Display for HashAlgorithm {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SHA256" | "SHA-256" => Ok(Self::Sha256),
            "SHA512" | "SHA-512" => Ok(Self::Sha512),
            _ => Err(SignatureError::UnsupportedAlgorithm(format!("Unsupported hash algorithm: {}", s))),
        }
    }
}
