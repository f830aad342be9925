//! Normalized domain and host names

use std::fmt;
use std::str::FromStr;

use crate::Error;

/// A validated, normalized DNS name
///
/// Parsing trims whitespace, lowercases, and strips one trailing dot, so
/// `"Example.COM.AU."` and `"example.com.au"` compare equal. This is the natural
/// key of the domain cache and of glue records within a domain.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DomainName(String);

impl DomainName {
    /// Parse and validate a name
    ///
    /// Implements basic RFC 1035 validation: at most 253 characters, labels of
    /// 1 to 63 alphanumeric or hyphen characters that neither start nor end
    /// with a hyphen, and at least two labels.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let trimmed = raw.trim();
        let trimmed = trimmed.strip_suffix('.').unwrap_or(trimmed);
        let name = trimmed.to_ascii_lowercase();

        if name.is_empty() {
            return Err(Error::invalid_input("Domain name cannot be empty"));
        }

        if name.len() > 253 {
            return Err(Error::invalid_input(format!(
                "Domain name too long: {} chars (max 253). Got: {}",
                name.len(),
                name
            )));
        }

        let mut labels = 0usize;
        for label in name.split('.') {
            labels += 1;

            if label.is_empty() {
                return Err(Error::invalid_input(format!(
                    "Domain name has empty label: '{}'",
                    name
                )));
            }

            if label.len() > 63 {
                return Err(Error::invalid_input(format!(
                    "Domain label too long: {} chars (max 63). Label: '{}'",
                    label.len(),
                    label
                )));
            }

            if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
                return Err(Error::invalid_input(format!(
                    "Domain label contains invalid characters. Label: '{}'. \
                    Valid: alphanumeric and hyphen only.",
                    label
                )));
            }

            if label.starts_with('-') || label.ends_with('-') {
                return Err(Error::invalid_input(format!(
                    "Domain label cannot start or end with hyphen. Label: '{}'",
                    label
                )));
            }
        }

        if labels < 2 {
            return Err(Error::invalid_input(format!(
                "Domain name needs at least two labels: '{}'",
                name
            )));
        }

        Ok(Self(name))
    }

    /// The normalized name
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this name lies strictly inside `parent`
    ///
    /// `ns1.example.com.au` is within `example.com.au`; the domain itself is not.
    pub fn is_within(&self, parent: &DomainName) -> bool {
        self.0.len() > parent.0.len()
            && self.0.ends_with(parent.as_str())
            && self.0.as_bytes()[self.0.len() - parent.0.len() - 1] == b'.'
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DomainName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DomainName {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DomainName> for String {
    fn from(name: DomainName) -> Self {
        name.0
    }
}

impl AsRef<str> for DomainName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
