//! Store key to field mapping decoding.

use std::collections::BTreeSet;

use crate::{
    key::StoreKey,
    mapping::{Attribute, FieldMapping},
    types::Direction,
};

use super::{
    CodecError, CodecResult,
    grammar::{ATTRIBUTES, MODEL_ROW, Qualifier, SEP, VERSION, parse_qualifier},
};

/// Decoded mapping plus the model it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedEntry {
    /// Model name from the column family.
    pub model_name: String,
    /// Reconstructed mapping.
    pub mapping: FieldMapping,
}

/// Reconstructs the mapping stored under `key`.
///
/// `value` is only consulted for `attrs` and `version` cells. A legacy
/// `attrs` cell on a field row must hold the strict flag, and the model row
/// never holds it.
pub fn decode_key(key: &StoreKey, value: Option<&[u8]>) -> CodecResult<FieldMapping> {
    decode_entry(key, value).map(|entry| entry.mapping)
}

/// Like [`decode_key`], also returning the model name.
pub fn decode_entry(key: &StoreKey, value: Option<&[u8]>) -> CodecResult<DecodedEntry> {
    tracing::trace!(key = %key, "decoding model key");
    if key.row.is_empty() {
        return Err(CodecError::invalid(key, "empty row"));
    }

    let (model_name, datatype) = split_family(key)?;
    let mapping = if key.row == MODEL_ROW {
        let attribute = model_attribute(key, value)?;
        FieldMapping::model_attribute(attribute).with_visibility(key.column_visibility.clone())
    } else {
        field_mapping(key, value, datatype)?
    };

    Ok(DecodedEntry {
        model_name: model_name.to_string(),
        mapping,
    })
}

fn field_mapping(
    key: &StoreKey,
    value: Option<&[u8]>,
    datatype: Option<&str>,
) -> CodecResult<FieldMapping> {
    let qualifier =
        parse_qualifier(&key.column_qualifier).map_err(|r| CodecError::invalid(key, r.reason()))?;

    let mut mapping = FieldMapping {
        datatype: datatype.map(str::to_string),
        column_visibility: key.column_visibility.clone(),
        ..FieldMapping::default()
    };

    match qualifier {
        Qualifier::Strict => {
            mapping.model_field_name = key.row.clone();
            mapping.attributes = BTreeSet::from([Attribute::Strict]);
        }
        Qualifier::LegacyAttributes => {
            let text = value_text(key, value)?;
            if text.is_empty() {
                return Err(CodecError::invalid(key, "empty legacy attribute value"));
            }
            if Attribute::parse(text) != Attribute::Strict {
                return Err(CodecError::invalid(key, "legacy field attribute is not strict"));
            }
            mapping.model_field_name = key.row.clone();
            mapping.attributes = BTreeSet::from([Attribute::Strict]);
        }
        Qualifier::Mapping {
            name,
            direction,
            index_only,
        } => {
            mapping.direction = direction;
            mapping.index_only = index_only;
            match direction {
                Direction::Forward => {
                    mapping.model_field_name = key.row.clone();
                    mapping.field_name = Some(name.to_string());
                }
                Direction::Reverse => {
                    mapping.field_name = Some(key.row.clone());
                    mapping.model_field_name = name.to_string();
                }
            }
        }
    }
    Ok(mapping)
}

fn model_attribute(key: &StoreKey, value: Option<&[u8]>) -> CodecResult<Attribute> {
    let attribute = match key.column_qualifier.as_str() {
        "" => return Err(CodecError::invalid(key, "empty model attribute qualifier")),
        ATTRIBUTES => Attribute::parse(value_text(key, value)?),
        VERSION => Attribute::Version(value_text(key, value)?.to_string()),
        other => Attribute::parse(other),
    };
    match attribute {
        Attribute::Strict => Err(CodecError::invalid(key, "strict flag on the model row")),
        Attribute::Raw(ref text) if text.is_empty() || text == ATTRIBUTES || text == VERSION => {
            Err(CodecError::invalid(key, "reserved or empty model attribute"))
        }
        attribute => Ok(attribute),
    }
}

fn value_text<'v>(key: &StoreKey, value: Option<&'v [u8]>) -> CodecResult<&'v str> {
    let Some(value) = value else {
        return Err(CodecError::invalid(key, "attribute cell without a value"));
    };
    std::str::from_utf8(value).map_err(|_| CodecError::invalid(key, "value is not UTF-8"))
}

fn split_family(key: &StoreKey) -> CodecResult<(&str, Option<&str>)> {
    let mut parts = key.column_family.split(SEP);
    let model_name = parts.next().unwrap_or_default();
    let datatype = parts.next();
    if parts.next().is_some() {
        return Err(CodecError::invalid(key, "too many parts in column family"));
    }
    if model_name.is_empty() {
        return Err(CodecError::invalid(key, "empty model name"));
    }
    if datatype.is_some_and(str::is_empty) {
        return Err(CodecError::invalid(key, "empty datatype"));
    }
    Ok((model_name, datatype))
}
