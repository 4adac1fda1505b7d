//! Encode, decode and validate field mappings as store keys.
//!
//! The codec is stateless. Encoders take a [`Clock`](crate::clock::Clock)
//! and sample it once per emitted cell; decoders are total functions of the
//! key and optional value.

/// Key to mapping decoding.
pub mod decode;
/// Mapping to key and mutation encoding.
pub mod encode;
/// Wire constants and qualifier grammar.
pub mod grammar;

use thiserror::Error;

use crate::key::StoreKey;

pub use decode::{DecodedEntry, decode_entry, decode_key};
pub use encode::{encode_delete_mutation, encode_key, encode_put_mutation};

/// Codec failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Key does not match any recognized grammar shape.
    #[error("invalid key format ({reason}): {key}")]
    InvalidKeyFormat {
        /// Offending key.
        key: Box<StoreKey>,
        /// What was wrong with it.
        reason: &'static str,
    },
    /// Caller-supplied mapping breaks an encoding invariant.
    #[error("precondition violated: {0}")]
    PreconditionViolation(String),
}

impl CodecError {
    pub(crate) fn invalid(key: &StoreKey, reason: &'static str) -> Self {
        tracing::debug!(key = %key, reason, "rejecting model key");
        Self::InvalidKeyFormat {
            key: Box::new(key.clone()),
            reason,
        }
    }
}

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
