use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SanitizeError;

/// PII categories recognised by field classification and content scanning.
///
/// Design principles:
/// - Closed set, so every traversal is an exhaustive match
/// - All variants are `Copy` (no heap allocations in the enum)
/// - Field-name redaction never needs the category; it is kept for
///   content tags, masking and detection reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PiiCategory {
    Email,
    Phone,
    Card,
    Name,
    Address,
    AuthSecret,
    Generic,
}

impl PiiCategory {
    pub const ALL: [PiiCategory; 7] = [
        Self::Email,
        Self::Phone,
        Self::Card,
        Self::Name,
        Self::Address,
        Self::AuthSecret,
        Self::Generic,
    ];

    /// Upper-case label used inside redaction tags.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Email => "EMAIL",
            Self::Phone => "PHONE",
            Self::Card => "CARD",
            Self::Name => "NAME",
            Self::Address => "ADDRESS",
            Self::AuthSecret => "AUTH_SECRET",
            Self::Generic => "GENERIC",
        }
    }

    /// Default content-redaction placeholder (overridable via policy)
    pub fn placeholder(&self) -> &'static str {
        match self {
            Self::Email => "[REDACTED_EMAIL]",
            Self::Phone => "[REDACTED_PHONE]",
            Self::Card => "[REDACTED_CARD]",
            Self::Name => "[REDACTED_NAME]",
            Self::Address => "[REDACTED_ADDRESS]",
            Self::AuthSecret => "[REDACTED_AUTH_SECRET]",
            Self::Generic => "[REDACTED_GENERIC]",
        }
    }
}

impl fmt::Display for PiiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PiiCategory {
    type Err = SanitizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "email" => Ok(Self::Email),
            "phone" => Ok(Self::Phone),
            "card" | "credit_card" => Ok(Self::Card),
            "name" => Ok(Self::Name),
            "address" => Ok(Self::Address),
            "auth_secret" | "secret" => Ok(Self::AuthSecret),
            "generic" => Ok(Self::Generic),
            _ => Err(SanitizeError::UnknownCategory(s.to_string())),
        }
    }
}
