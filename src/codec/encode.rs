//! Field mapping to store key and mutation encoding.

use crate::{
    clock::Clock,
    key::{EMPTY_VALUE, StoreKey, StoreMutation},
    mapping::{Attribute, FieldMapping, MappingKind},
    types::Direction,
};

use super::{
    CodecError, CodecResult,
    grammar::{ATTRIBUTES, MODEL_ROW, SEP, STRICT, VERSION, family, mapping_qualifier},
};

struct Cell {
    qualifier: String,
    value: Vec<u8>,
}

struct Layout {
    kind: MappingKind,
    row: String,
    family: String,
}

/// Encodes the current store key for `mapping`.
///
/// Samples `clock` once. Model-attribute mappings must carry exactly one
/// attribute here; use [`encode_put_mutation`] for several.
pub fn encode_key<C: Clock + ?Sized>(
    mapping: &FieldMapping,
    model_name: &str,
    clock: &C,
) -> CodecResult<StoreKey> {
    let layout = validate(mapping, model_name)?;
    let mut cells = put_cells(mapping, &layout);
    if cells.len() != 1 {
        return Err(CodecError::PreconditionViolation(format!(
            "a single key needs exactly one attribute, mapping has {}",
            cells.len()
        )));
    }
    let cell = cells.remove(0);
    Ok(StoreKey {
        row: layout.row,
        column_family: layout.family,
        column_qualifier: cell.qualifier,
        column_visibility: mapping.column_visibility.clone(),
        timestamp: clock.now_ms(),
    })
}

/// Encodes the put mutation that stores `mapping`.
///
/// Field mappings produce one put with an empty value. Model-attribute
/// mappings produce one put per attribute. `clock` is sampled once and the
/// timestamp is shared by every put.
pub fn encode_put_mutation<C: Clock + ?Sized>(
    mapping: &FieldMapping,
    model_name: &str,
    clock: &C,
) -> CodecResult<StoreMutation> {
    let layout = validate(mapping, model_name)?;
    let mut mutation = StoreMutation::new(layout.row.clone());
    let timestamp = clock.now_ms();
    for cell in put_cells(mapping, &layout) {
        mutation.put(
            layout.family.clone(),
            cell.qualifier,
            mapping.column_visibility.clone(),
            timestamp,
            cell.value,
        );
    }
    Ok(mutation)
}

/// Encodes deletes for every encoding `mapping` may have been stored under.
///
/// Strict mappings clear the legacy `attrs` cell and the strict cell.
/// Forward mappings clear both the plain and the index-only qualifier,
/// whatever `index_only` says. Each delete samples `clock` once.
pub fn encode_delete_mutation<C: Clock + ?Sized>(
    mapping: &FieldMapping,
    model_name: &str,
    clock: &C,
) -> CodecResult<StoreMutation> {
    let layout = validate(mapping, model_name)?;
    let mut mutation = StoreMutation::new(layout.row.clone());
    for qualifier in delete_qualifiers(mapping, &layout) {
        mutation.put_delete(
            layout.family.clone(),
            qualifier,
            mapping.column_visibility.clone(),
            clock.now_ms(),
        );
    }
    Ok(mutation)
}

fn put_cells(mapping: &FieldMapping, layout: &Layout) -> Vec<Cell> {
    match layout.kind {
        MappingKind::Strict => vec![Cell {
            qualifier: STRICT.to_string(),
            value: EMPTY_VALUE.to_vec(),
        }],
        MappingKind::Forward => vec![Cell {
            qualifier: mapping_qualifier(
                field_name(mapping),
                Direction::Forward,
                mapping.index_only,
            ),
            value: EMPTY_VALUE.to_vec(),
        }],
        MappingKind::Reverse => vec![Cell {
            qualifier: mapping_qualifier(&mapping.model_field_name, Direction::Reverse, false),
            value: EMPTY_VALUE.to_vec(),
        }],
        MappingKind::ModelAttribute => mapping
            .attributes
            .iter()
            .map(|attr| match attr {
                Attribute::Version(v) => Cell {
                    qualifier: VERSION.to_string(),
                    value: v.as_bytes().to_vec(),
                },
                other => Cell {
                    qualifier: other.to_text(),
                    value: EMPTY_VALUE.to_vec(),
                },
            })
            .collect(),
    }
}

fn delete_qualifiers(mapping: &FieldMapping, layout: &Layout) -> Vec<String> {
    match layout.kind {
        MappingKind::Strict => vec![ATTRIBUTES.to_string(), STRICT.to_string()],
        MappingKind::Forward => {
            let name = field_name(mapping);
            vec![
                mapping_qualifier(name, Direction::Forward, false),
                mapping_qualifier(name, Direction::Forward, true),
            ]
        }
        MappingKind::Reverse => vec![mapping_qualifier(
            &mapping.model_field_name,
            Direction::Reverse,
            false,
        )],
        MappingKind::ModelAttribute => mapping
            .attributes
            .iter()
            .flat_map(|attr| match attr {
                Attribute::Version(_) => vec![VERSION.to_string(), attr.to_text()],
                other => vec![other.to_text()],
            })
            .collect(),
    }
}

fn field_name(mapping: &FieldMapping) -> &str {
    mapping.field_name.as_deref().unwrap_or_default()
}

fn validate(mapping: &FieldMapping, model_name: &str) -> CodecResult<Layout> {
    check_name("model name", model_name)?;
    if let Some(dt) = &mapping.datatype {
        check_name("datatype", dt)?;
    }

    let kind = mapping.kind();
    let row = match kind {
        MappingKind::Strict => {
            if mapping.attributes.len() > 1 {
                return Err(CodecError::PreconditionViolation(
                    "strict mapping cannot carry other attributes".to_string(),
                ));
            }
            check_row("model field name", &mapping.model_field_name)?;
            mapping.model_field_name.clone()
        }
        MappingKind::Forward | MappingKind::Reverse => {
            if mapping.direction == Direction::Reverse && mapping.index_only {
                return Err(CodecError::PreconditionViolation(
                    "index_only is not allowed on a reverse mapping".to_string(),
                ));
            }
            if !mapping.attributes.is_empty() {
                return Err(CodecError::PreconditionViolation(
                    "field mapping cannot carry attributes".to_string(),
                ));
            }
            let Some(field) = mapping.field_name.as_deref() else {
                return Err(CodecError::PreconditionViolation(
                    "field mapping has no field name".to_string(),
                ));
            };
            check_name("field name", field)?;
            check_name("model field name", &mapping.model_field_name)?;
            let row = if kind == MappingKind::Forward {
                &mapping.model_field_name
            } else {
                field
            };
            check_row("row", row)?;
            row.to_string()
        }
        MappingKind::ModelAttribute => {
            if mapping.datatype.is_some() {
                return Err(CodecError::PreconditionViolation(
                    "model attributes cannot be scoped to a datatype".to_string(),
                ));
            }
            for attr in &mapping.attributes {
                if let Attribute::Raw(text) = attr {
                    let reserved = text == ATTRIBUTES || text == VERSION;
                    if text.is_empty() || reserved || Attribute::parse(text) != *attr {
                        return Err(CodecError::PreconditionViolation(format!(
                            "attribute {text:?} collides with a reserved qualifier"
                        )));
                    }
                }
            }
            MODEL_ROW.to_string()
        }
    };

    Ok(Layout {
        kind,
        row,
        family: family(model_name, mapping.datatype.as_deref()),
    })
}

fn check_name(what: &str, name: &str) -> CodecResult<()> {
    if name.is_empty() {
        return Err(CodecError::PreconditionViolation(format!("{what} is empty")));
    }
    if name.contains(SEP) {
        return Err(CodecError::PreconditionViolation(format!(
            "{what} {:?} contains the separator",
            name
        )));
    }
    Ok(())
}

fn check_row(what: &str, row: &str) -> CodecResult<()> {
    check_name(what, row)?;
    if row == MODEL_ROW {
        return Err(CodecError::PreconditionViolation(format!(
            "{what} {row:?} is the reserved model row"
        )));
    }
    Ok(())
}
