//! Short base-62 form of 128-bit identifiers.
//!
//! Every externally visible translation URL and payload uses this form.
//! Handlers take a [`CompactId`] straight from the path and work with the
//! wrapped [`Uuid`] from then on.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Digits in value order: `0-9`, then `A-Z`, then `a-z`.
const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Longest possible encoding of a `u128` in base 62.
const MAX_LEN: usize = 22;

/// Error parsing a compact id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompactIdError {
    #[error("compact id is empty")]
    Empty,

    #[error("invalid character '{0}' in compact id")]
    InvalidChar(char),

    #[error("compact id exceeds 128 bits")]
    Overflow,
}

/// A [`Uuid`] displayed and parsed in base 62.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompactId(Uuid);

impl CompactId {
    /// Wrap a UUID.
    pub const fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// The wrapped UUID.
    pub const fn uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for CompactId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl From<CompactId> for Uuid {
    fn from(id: CompactId) -> Self {
        id.0
    }
}

/// Encode a 128-bit value in base 62.
pub fn encode(mut value: u128) -> String {
    if value == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::with_capacity(MAX_LEN);
    while value > 0 {
        digits.push(ALPHABET[(value % 62) as usize]);
        value /= 62;
    }
    digits.reverse();

    // ALPHABET is ASCII.
    digits.into_iter().map(char::from).collect()
}

/// Decode a base-62 string into a 128-bit value.
pub fn decode(s: &str) -> Result<u128, CompactIdError> {
    if s.is_empty() {
        return Err(CompactIdError::Empty);
    }

    s.chars().try_fold(0u128, |acc, c| {
        let digit = digit_value(c).ok_or(CompactIdError::InvalidChar(c))?;
        acc.checked_mul(62)
            .and_then(|v| v.checked_add(u128::from(digit)))
            .ok_or(CompactIdError::Overflow)
    })
}

fn digit_value(c: char) -> Option<u8> {
    match c {
        '0'..='9' => Some(c as u8 - b'0'),
        'A'..='Z' => Some(c as u8 - b'A' + 10),
        'a'..='z' => Some(c as u8 - b'a' + 36),
        _ => None,
    }
}

impl fmt::Display for CompactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode(self.0.as_u128()))
    }
}

impl FromStr for CompactId {
    type Err = CompactIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode(s).map(|v| Self(Uuid::from_u128(v)))
    }
}

impl Serialize for CompactId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CompactId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
