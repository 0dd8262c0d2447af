use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const PREFIX: &str = "CERT-";
const MIN_SEQUENCE_DIGITS: usize = 3;

/// Public certificate identifier in the form `CERT-<year>-<sequence>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CertificateId {
    year: i32,
    sequence: u64,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CertificateIdParseError {
    #[error("Empty string provided")]
    EmptyString,

    #[error("Missing CERT- prefix")]
    MissingPrefix,

    #[error("Invalid year: {0}")]
    InvalidYear(String),

    #[error("Invalid sequence: {0}")]
    InvalidSequence(String),
}

pub type Result<T> = std::result::Result<T, CertificateIdParseError>;

impl CertificateId {
    pub fn new(year: i32, sequence: u64) -> Self {
        Self { year, sequence }
    }

    /// Parse identifiers like `CERT-2026-007`
    pub fn parse(identifier: &str) -> Result<Self> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(CertificateIdParseError::EmptyString);
        }

        let rest = identifier
            .strip_prefix(PREFIX)
            .ok_or(CertificateIdParseError::MissingPrefix)?;
        let (year, sequence) = rest
            .split_once('-')
            .ok_or_else(|| CertificateIdParseError::InvalidSequence(rest.to_string()))?;

        if year.len() != 4 || !year.chars().all(|c| c.is_ascii_digit()) {
            return Err(CertificateIdParseError::InvalidYear(year.to_string()));
        }
        if sequence.len() < MIN_SEQUENCE_DIGITS || !sequence.chars().all(|c| c.is_ascii_digit()) {
            return Err(CertificateIdParseError::InvalidSequence(
                sequence.to_string(),
            ));
        }
        // Only the canonical padding is accepted, so every id has one spelling
        if sequence.len() > MIN_SEQUENCE_DIGITS && sequence.starts_with('0') {
            return Err(CertificateIdParseError::InvalidSequence(
                sequence.to_string(),
            ));
        }

        let year = year
            .parse::<i32>()
            .map_err(|_| CertificateIdParseError::InvalidYear(year.to_string()))?;
        let sequence = sequence
            .parse::<u64>()
            .map_err(|_| CertificateIdParseError::InvalidSequence(sequence.to_string()))?;

        Ok(Self { year, sequence })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

impl fmt::Display for CertificateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{PREFIX}{}-{:0width$}",
            self.year,
            self.sequence,
            width = MIN_SEQUENCE_DIGITS
        )
    }
}

impl FromStr for CertificateId {
    type Err = CertificateIdParseError;
    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for CertificateId {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for CertificateId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        CertificateId::parse(&s).map_err(serde::de::Error::custom)
    }
}
