//! JSON model documents for bulk import and export.
//!
//! ```
//! use querymodel::document::ModelDocument;
//!
//! let doc = ModelDocument::from_json(r#"{
//!     "name": "MODEL",
//!     "mappings": [
//!         { "field_name": "field1", "model_field_name": "mappedField1", "direction": "forward" },
//!         { "attributes": ["version=VER"] }
//!     ]
//! }"#).expect("parse");
//! assert_eq!(doc.mappings.len(), 2);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    clock::Clock,
    codec::{CodecError, decode_entry, encode_put_mutation, grammar::SEP},
    key::{Entry, StoreMutation},
    mapping::FieldMapping,
};

/// Model document failure.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Malformed JSON.
    #[error("model document json: {0}")]
    Json(#[from] serde_json::Error),
    /// Missing or unusable model name.
    #[error("invalid model name {0:?}")]
    InvalidName(String),
    /// A mapping could not be encoded or an entry decoded.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Named set of field mappings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDocument {
    /// Model name.
    pub name: String,
    /// Mappings belonging to the model.
    #[serde(default)]
    pub mappings: Vec<FieldMapping>,
}

impl ModelDocument {
    /// Empty document for `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mappings: Vec::new(),
        }
    }

    /// Parses a JSON document.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        let doc: Self = serde_json::from_str(json)?;
        if doc.name.is_empty() || doc.name.contains(SEP) {
            return Err(DocumentError::InvalidName(doc.name));
        }
        Ok(doc)
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Put mutations for every mapping, or the first encode failure.
    pub fn to_mutations<C: Clock + ?Sized>(
        &self,
        clock: &C,
    ) -> Result<Vec<StoreMutation>, DocumentError> {
        let mutations = self
            .mappings
            .iter()
            .map(|m| encode_put_mutation(m, &self.name, clock))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(mutations)
    }

    /// Rebuilds a document from scanned entries, keeping those of `name`.
    pub fn from_entries(name: &str, entries: &[Entry]) -> Result<Self, DocumentError> {
        let mut doc = Self::new(name);
        for entry in entries.iter().filter(|e| e.model_name() == name) {
            doc.mappings.push(decode_entry(&entry.key, Some(&entry.value))?.mapping);
        }
        Ok(doc)
    }
}
