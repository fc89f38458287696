//! Value objects for the registry domain.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Citizen business key: a fixed-length national identity code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NationalId(String);

impl NationalId {
    /// Required length in characters.
    pub const LENGTH: usize = 18;

    /// Parses a national id, enforcing the fixed length.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        if value.chars().count() != Self::LENGTH {
            return Err(ValidationError::new(
                "nationalId",
                format!(
                    "nationalId is invalid, it must be a string of {} characters.",
                    Self::LENGTH
                ),
            ));
        }
        Ok(Self(value.to_string()))
    }

    /// Returns the national id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NationalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NationalId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Why a credential was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CredentialKind {
    New,
    Replacement,
    Modification,
}

impl CredentialKind {
    /// Every accepted kind, in display order.
    pub const ALL: [CredentialKind; 3] = [
        CredentialKind::New,
        CredentialKind::Replacement,
        CredentialKind::Modification,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialKind::New => "NEW",
            CredentialKind::Replacement => "REPLACEMENT",
            CredentialKind::Modification => "MODIFICATION",
        }
    }

    /// Comma-separated list of accepted wire values.
    pub fn allowed_values() -> String {
        Self::ALL
            .iter()
            .map(CredentialKind::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CredentialKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                ValidationError::new(
                    "kind",
                    format!(
                        "kind is required and must be one of: {}.",
                        Self::allowed_values()
                    ),
                )
            })
    }
}

/// Parses a calendar date.
///
/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp, whose date part is kept.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|ts| ts.date_naive())
        })
}
