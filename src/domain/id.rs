//! Card identifiers
//!
//! Cards coming from the scheduler carry whatever id the backend assigned
//! (`"42"`, `"asg-42"`). Cards created locally without an id get a generated
//! one in the format `c-{7-char-hash}` (e.g., `c-7f2b4c1`).
//!
//! Hash is derived from title + creation timestamp, so the same title at
//! different times produces different IDs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Card ID must not be empty")]
    Empty,

    #[error("Invalid card ID '{0}': whitespace is not allowed")]
    Whitespace(String),
}

/// Generates a 7-character hash from title and timestamp
fn generate_hash(title: &str, timestamp: DateTime<Utc>) -> String {
    let input = format!("{}{}", title, timestamp.timestamp_nanos_opt().unwrap_or(0));
    let hash = blake3::hash(input.as_bytes());
    let hex = hash.to_hex();
    hex[..7].to_string()
}

/// Identifier of a task card, unique within a slot
///
/// Deserializes from either a JSON string or a JSON integer, since the
/// scheduler backend hands out numeric assignment ids. Always serializes
/// as a string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawId", into = "String")]
pub struct CardId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(u64),
}

impl TryFrom<RawId> for CardId {
    type Error = IdError;

    fn try_from(raw: RawId) -> Result<Self, Self::Error> {
        match raw {
            RawId::Text(s) => s.parse(),
            RawId::Number(n) => Ok(Self(n.to_string())),
        }
    }
}

impl CardId {
    /// Generates a new card ID from title and timestamp
    pub fn generate(title: &str, timestamp: DateTime<Utc>) -> Self {
        Self(format!("c-{}", generate_hash(title, timestamp)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CardId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(IdError::Empty);
        }
        if s.chars().any(char::is_whitespace) {
            return Err(IdError::Whitespace(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for CardId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CardId> for String {
    fn from(id: CardId) -> Self {
        id.0
    }
}

impl From<u32> for CardId {
    fn from(value: u32) -> Self {
        Self(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_id_format() {
        let id = CardId::generate("Site survey", Utc::now());
        let s = id.to_string();
        assert!(s.starts_with("c-"));
        assert_eq!(s.len(), 9);
        assert!(s[2..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn different_timestamps_produce_different_ids() {
        let t1 = Utc::now();
        let t2 = t1 + chrono::Duration::nanoseconds(1);
        assert_ne!(CardId::generate("Same", t1), CardId::generate("Same", t2));
    }

    #[test]
    fn parse_backend_ids() {
        let id: CardId = "42".parse().unwrap();
        assert_eq!(id.as_str(), "42");

        let id: CardId = "  asg-42 ".parse().unwrap();
        assert_eq!(id.as_str(), "asg-42");
    }

    #[test]
    fn reject_invalid_ids() {
        assert_eq!("".parse::<CardId>(), Err(IdError::Empty));
        assert_eq!("   ".parse::<CardId>(), Err(IdError::Empty));
        assert!(matches!(
            "two words".parse::<CardId>(),
            Err(IdError::Whitespace(_))
        ));
    }

    #[test]
    fn serde_as_plain_string() {
        let id = CardId::from(7u32);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"7\"");

        let parsed: CardId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);

        assert!(serde_json::from_str::<CardId>("\"\"").is_err());
    }

    #[test]
    fn deserialize_numeric_backend_id() {
        let parsed: CardId = serde_json::from_str("42").unwrap();
        assert_eq!(parsed, CardId::from(42u32));
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "\"42\"");
    }
}
