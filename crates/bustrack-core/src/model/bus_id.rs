use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifier of a bus record.
///
/// Buses created through the API get a random UUID. The seed fleet keeps
/// its short numeric ids ("1".."6"), which are carried verbatim. On the
/// wire both are plain strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BusId {
    Uuid(Uuid),
    Seed(String),
}

impl BusId {
    pub fn generate() -> Self {
        Self::Uuid(Uuid::new_v4())
    }

    /// True for ids minted by [`BusId::generate`] (or any UUID-shaped id).
    pub fn is_generated(&self) -> bool {
        matches!(self, Self::Uuid(_))
    }
}

impl fmt::Display for BusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uuid(id) => fmt::Display::fmt(id, f),
            Self::Seed(id) => f.write_str(id),
        }
    }
}

impl FromStr for BusId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.into())
    }
}

impl From<String> for BusId {
    fn from(raw: String) -> Self {
        Uuid::parse_str(&raw).map_or(Self::Seed(raw), Self::Uuid)
    }
}

impl From<&str> for BusId {
    fn from(raw: &str) -> Self {
        Uuid::parse_str(raw).map_or_else(|_| Self::Seed(raw.to_owned()), Self::Uuid)
    }
}
