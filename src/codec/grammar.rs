//! Wire constants and the column-qualifier grammar.
//!
//! Field-mapping qualifiers are separator-delimited token sequences:
//!
//! | Tokens                               | Shape                     |
//! |--------------------------------------|---------------------------|
//! | `strict`                             | strict flag               |
//! | `attrs`                              | legacy attribute (value)  |
//! | `name SEP forward`                   | forward mapping           |
//! | `name SEP reverse`                   | reverse mapping           |
//! | `name SEP index_only SEP forward`    | forward, index-only       |
//!
//! Every other sequence is rejected. There is no production for
//! `index_only` followed by `reverse`.

use crate::types::Direction;

/// Separator between key parts.
pub const SEP: char = '\0';
/// Qualifier token marking an index-only forward mapping.
pub const INDEX_ONLY: &str = "index_only";
/// Legacy qualifier whose value holds an attribute.
pub const ATTRIBUTES: &str = "attrs";
/// Model-row qualifier whose value holds the model version.
pub const VERSION: &str = "version";
/// Prefix of the textual version attribute.
pub const VERSION_PREFIX: &str = "version=";
/// Strict sentinel qualifier and attribute text.
pub const STRICT: &str = "strict";
/// Row holding model-level attribute entries.
pub const MODEL_ROW: &str = "MODEL";

/// Recognized qualifier shape on a field-mapping row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Qualifier<'a> {
    /// `strict`
    Strict,
    /// `attrs`, attribute carried in the value.
    LegacyAttributes,
    /// `name SEP [index_only SEP] direction`
    Mapping {
        /// Field name token.
        name: &'a str,
        /// Direction token.
        direction: Direction,
        /// True when `index_only` preceded the direction.
        index_only: bool,
    },
}

/// Why a qualifier was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// A single token that is not a sentinel.
    UnknownSentinel,
    /// Empty name token.
    EmptyName,
    /// Last token is not `forward`/`reverse`.
    UnknownDirection,
    /// Middle token is not `index_only`.
    UnknownModifier,
    /// `index_only` combined with `reverse`.
    IndexOnlyReverse,
    /// Tokens after the direction.
    TooManyParts,
}

impl Rejection {
    /// Short description for diagnostics.
    pub fn reason(self) -> &'static str {
        match self {
            Self::UnknownSentinel => "unrecognized single-part qualifier",
            Self::EmptyName => "empty field name in qualifier",
            Self::UnknownDirection => "unrecognized direction token",
            Self::UnknownModifier => "unrecognized qualifier modifier",
            Self::IndexOnlyReverse => "index_only is only valid on forward mappings",
            Self::TooManyParts => "too many parts in qualifier",
        }
    }
}

enum State<'a> {
    Start,
    Single(&'a str),
    Named(&'a str),
    Modifier,
    Done(Qualifier<'a>),
}

impl<'a> State<'a> {
    fn step(self, token: &'a str) -> Result<Self, Rejection> {
        match self {
            Self::Start => Ok(Self::Single(token)),
            Self::Single(name) => {
                if name.is_empty() {
                    return Err(Rejection::EmptyName);
                }
                if token == INDEX_ONLY {
                    return Ok(Self::Named(name));
                }
                if let Some(direction) = Direction::from_token(token) {
                    return Ok(Self::Done(Qualifier::Mapping {
                        name,
                        direction,
                        index_only: false,
                    }));
                }
                Ok(Self::Modifier)
            }
            Self::Named(name) => match Direction::from_token(token) {
                Some(Direction::Forward) => Ok(Self::Done(Qualifier::Mapping {
                    name,
                    direction: Direction::Forward,
                    index_only: true,
                })),
                Some(Direction::Reverse) => Err(Rejection::IndexOnlyReverse),
                None => Err(Rejection::UnknownDirection),
            },
            Self::Modifier => Err(Rejection::UnknownModifier),
            Self::Done(_) => Err(Rejection::TooManyParts),
        }
    }

    fn finish(self) -> Result<Qualifier<'a>, Rejection> {
        match self {
            Self::Done(q) => Ok(q),
            Self::Single(STRICT) => Ok(Qualifier::Strict),
            Self::Single(ATTRIBUTES) => Ok(Qualifier::LegacyAttributes),
            Self::Start | Self::Single(_) => Err(Rejection::UnknownSentinel),
            Self::Named(_) | Self::Modifier => Err(Rejection::UnknownDirection),
        }
    }
}

/// Runs the qualifier through the grammar.
pub fn parse_qualifier(qualifier: &str) -> Result<Qualifier<'_>, Rejection> {
    qualifier
        .split(SEP)
        .try_fold(State::Start, State::step)?
        .finish()
}

/// Joins `model_name` and an optional datatype into a column family.
pub fn family(model_name: &str, datatype: Option<&str>) -> String {
    match datatype {
        Some(dt) => format!("{model_name}{SEP}{dt}"),
        None => model_name.to_string(),
    }
}

/// Qualifier for a field mapping.
pub fn mapping_qualifier(name: &str, direction: Direction, index_only: bool) -> String {
    if index_only {
        format!("{name}{SEP}{INDEX_ONLY}{SEP}{}", direction.token())
    } else {
        format!("{name}{SEP}{}", direction.token())
    }
}
