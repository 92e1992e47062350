use {
    crate::{chronoutil::format_date, AuthenticationError, RejectionReason},
    chrono::NaiveDate,
    std::fmt::{Display, Formatter, Result as FmtResult},
};

/// A credential scope: `YYYYMMDD/segment/.../terminator`.
///
/// The date is the request's date, not the server's; the segments (e.g. region and service) and the
/// terminator come from configuration.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CredentialScope {
    date: NaiveDate,
    segments: Vec<String>,
    terminator: String,
}

impl CredentialScope {
    /// Create a new credential scope.
    pub fn new<I, S, T>(date: NaiveDate, segments: I, terminator: T) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            date,
            segments: segments.into_iter().map(Into::into).collect(),
            terminator: terminator.into(),
        }
    }

    /// The date element.
    #[inline]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// The segments between the date and the terminator.
    #[inline]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The terminal element.
    #[inline]
    pub fn terminator(&self) -> &str {
        &self.terminator
    }

    /// Parse a credential of the form `accesskeyid/YYYYMMDD/segment/.../terminator` into the access key
    /// id and the credential scope.
    pub fn parse_credential(credential: &str) -> Result<(String, Self), AuthenticationError> {
        let parts: Vec<&str> = credential.split('/').collect();
        if parts.len() < 3 {
            return Err(AuthenticationError::new(
                RejectionReason::Malformed,
                format!(
                    "Credential must have at least 3 slash-delimited elements, e.g. keyid/date/term, got '{}'",
                    credential
                ),
            ));
        }

        let access_key_id = parts[0];
        if access_key_id.is_empty() {
            return Err(AuthenticationError::new(
                RejectionReason::Malformed,
                format!("Credential has an empty access key id: '{}'", credential),
            ));
        }

        let date_str = parts[1];
        let date = match NaiveDate::parse_from_str(date_str, "%Y%m%d") {
            Ok(date) if date_str.len() == 8 => date,
            _ => {
                return Err(AuthenticationError::new(
                    RejectionReason::Malformed,
                    format!("Credential date is not in YYYYMMDD format: '{}'", date_str),
                ))
            }
        };

        let last = parts.len() - 1;
        let scope = Self::new(date, parts[2..last].iter().copied(), parts[last]);
        Ok((access_key_id.to_string(), scope))
    }
}

impl Display for CredentialScope {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        f.write_str(&format_date(&self.date))?;
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        write!(f, "/{}", self.terminator)
    }
}
