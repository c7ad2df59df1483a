// SPDX-License-Identifier: MPL-2.0

//! Option types for cascading selectors.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a node in a hierarchy (category, location, city, ...).
///
/// Always a positive integer. `0` is reserved for the synthetic category
/// root and never names a selectable node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct OptionId(u64);

impl OptionId {
    /// Wraps a raw id, rejecting `0`.
    pub fn new(raw: u64) -> Option<Self> {
        (raw > 0).then_some(Self(raw))
    }

    /// Parses a selector value. The placeholder (`""`), zero, negatives and
    /// anything non-numeric yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        value.trim().parse::<u64>().ok().and_then(Self::new)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OptionId {
    type Err = InvalidOptionId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| InvalidOptionId(s.to_string()))
    }
}

impl TryFrom<u64> for OptionId {
    type Error = InvalidOptionId;

    fn try_from(raw: u64) -> Result<Self, Self::Error> {
        Self::new(raw).ok_or_else(|| InvalidOptionId(raw.to_string()))
    }
}

impl From<OptionId> for u64 {
    fn from(id: OptionId) -> Self {
        id.0
    }
}

/// Error returned when a string is not a positive integer id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a positive integer id: {0:?}")]
pub struct InvalidOptionId(pub String);

/// One selectable child node at a level, as served by the option endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionItem {
    pub id: OptionId,
    pub name: String,
}

impl OptionItem {
    pub fn new(id: u64, name: impl Into<String>) -> Option<Self> {
        OptionId::new(id).map(|id| Self {
            id,
            name: name.into(),
        })
    }

    /// The selector value this option carries.
    pub fn value(&self) -> String {
        self.id.to_string()
    }
}
