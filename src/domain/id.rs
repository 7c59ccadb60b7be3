//! Identifier newtypes and the venue pair tag.
//!
//! Inner strings are private so construction always goes through the
//! defined constructors.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which half of the configured venue pair an entity belongs to.
///
/// The engine is wired with exactly two venue adapters; `A` and `B` refer
/// to them in configuration order. Market, book, and leg identities are
/// always qualified by this tag because token IDs are only unique within
/// one venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Venue {
    /// The first configured venue.
    A,
    /// The second configured venue.
    B,
}

impl Venue {
    /// The other half of the pair.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => write!(f, "venue-a"),
            Self::B => write!(f, "venue-b"),
        }
    }
}

/// Outcome token identifier as assigned by a venue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenId(String);

impl TokenId {
    /// Create a new `TokenId`.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The token ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TokenId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for TokenId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Venue-native market identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarketId(String);

impl MarketId {
    /// Create a new `MarketId`.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The market ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MarketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for MarketId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for MarketId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Condition identifier grouping the outcome tokens of one market.
///
/// Trade tape entries are bucketed by condition rather than token so both
/// outcomes of a market land in the same ring buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConditionId(String);

impl ConditionId {
    /// Create a new `ConditionId`.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The condition ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConditionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ConditionId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for ConditionId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Venue-assigned order identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(String);

impl OrderId {
    /// Create a new `OrderId`.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The order ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for OrderId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
