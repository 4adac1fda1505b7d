//! Field mapping record and its attribute annotations.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{
    codec::grammar::{STRICT, VERSION_PREFIX},
    types::Direction,
};

/// Free-form annotation carried by a mapping.
///
/// Text is classified once, by [`Attribute::parse`]: the strict sentinel
/// becomes [`Attribute::Strict`], `version=<v>` becomes
/// [`Attribute::Version`], anything else stays [`Attribute::Raw`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Attribute {
    /// Marks the model field as strict.
    Strict,
    /// Model version string, without the `version=` prefix.
    Version(String),
    /// Any other annotation, verbatim.
    Raw(String),
}

impl Attribute {
    /// Classifies attribute text.
    pub fn parse(text: &str) -> Self {
        if text == STRICT {
            Self::Strict
        } else if let Some(version) = text.strip_prefix(VERSION_PREFIX) {
            Self::Version(version.to_string())
        } else {
            Self::Raw(text.to_string())
        }
    }

    /// Builds a version attribute.
    pub fn version(version: impl Into<String>) -> Self {
        Self::Version(version.into())
    }

    /// Plain text form, e.g. `version=VER`.
    pub fn to_text(&self) -> String {
        match self {
            Self::Strict => STRICT.to_string(),
            Self::Version(v) => format!("{VERSION_PREFIX}{v}"),
            Self::Raw(s) => s.clone(),
        }
    }
}

impl From<String> for Attribute {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<&str> for Attribute {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<Attribute> for String {
    fn from(value: Attribute) -> Self {
        value.to_text()
    }
}

impl std::fmt::Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_text())
    }
}

/// Encoding shape a mapping takes in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingKind {
    /// Strict flag entry on the model field row.
    Strict,
    /// Model field to physical field.
    Forward,
    /// Physical field to model field.
    Reverse,
    /// Model-level metadata on the model sentinel row.
    ModelAttribute,
}

/// Links a logical model field to a physical dataset field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldMapping {
    /// Physical field name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,
    /// Logical model field name.
    #[serde(default)]
    pub model_field_name: String,
    /// Dataset type scope; `None` applies to every datatype.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    /// Mapping direction.
    #[serde(default)]
    pub direction: Direction,
    /// Physical field exists only in an index. Forward only.
    #[serde(default)]
    pub index_only: bool,
    /// Opaque access-control label, empty for none.
    #[serde(default)]
    pub column_visibility: String,
    /// Annotations; each describes its own stored entry.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub attributes: BTreeSet<Attribute>,
}

impl FieldMapping {
    /// Forward mapping `model_field_name -> field_name`.
    pub fn forward(field_name: impl Into<String>, model_field_name: impl Into<String>) -> Self {
        Self {
            field_name: Some(field_name.into()),
            model_field_name: model_field_name.into(),
            direction: Direction::Forward,
            ..Self::default()
        }
    }

    /// Reverse mapping `field_name -> model_field_name`.
    pub fn reverse(field_name: impl Into<String>, model_field_name: impl Into<String>) -> Self {
        Self {
            field_name: Some(field_name.into()),
            model_field_name: model_field_name.into(),
            direction: Direction::Reverse,
            ..Self::default()
        }
    }

    /// Strict flag for `model_field_name`.
    pub fn strict(model_field_name: impl Into<String>) -> Self {
        let mut attributes = BTreeSet::new();
        attributes.insert(Attribute::Strict);
        Self {
            model_field_name: model_field_name.into(),
            attributes,
            ..Self::default()
        }
    }

    /// Model-level attribute entry with no field payload.
    pub fn model_attribute(attribute: Attribute) -> Self {
        let mut attributes = BTreeSet::new();
        attributes.insert(attribute);
        Self {
            attributes,
            ..Self::default()
        }
    }

    /// Sets the datatype scope.
    pub fn with_datatype(mut self, datatype: impl Into<String>) -> Self {
        self.datatype = Some(datatype.into());
        self
    }

    /// Sets the column visibility label.
    pub fn with_visibility(mut self, visibility: impl Into<String>) -> Self {
        self.column_visibility = visibility.into();
        self
    }

    /// Sets the index-only flag.
    pub fn with_index_only(mut self, index_only: bool) -> Self {
        self.index_only = index_only;
        self
    }

    /// Adds an attribute.
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.insert(attribute);
        self
    }

    /// Returns true when the strict sentinel is present.
    pub fn is_strict(&self) -> bool {
        self.attributes.contains(&Attribute::Strict)
    }

    /// Encoding shape, in codec priority order.
    pub fn kind(&self) -> MappingKind {
        if self.is_strict() {
            MappingKind::Strict
        } else if self.field_name.is_none()
            && self.model_field_name.is_empty()
            && !self.attributes.is_empty()
        {
            MappingKind::ModelAttribute
        } else {
            match self.direction {
                Direction::Forward => MappingKind::Forward,
                Direction::Reverse => MappingKind::Reverse,
            }
        }
    }
}
