//! Shared primitive aliases and the mapping direction enum.

use serde::{Deserialize, Serialize};

/// Store timestamp in milliseconds since epoch.
pub type Timestamp = u64;

/// Which way a field mapping translates names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Model field name to physical field name.
    #[default]
    Forward,
    /// Physical field name to model field name.
    Reverse,
}

impl Direction {
    /// Qualifier token written for this direction.
    pub fn token(self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Reverse => "reverse",
        }
    }

    /// Parses an exact direction token.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "forward" => Some(Self::Forward),
            "reverse" => Some(Self::Reverse),
            _ => None,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}
