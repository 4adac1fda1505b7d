//! Store-key codec for query model field mappings.
//!
//! A [`mapping::FieldMapping`] ties a logical model field to a physical
//! dataset field. The [`codec`] module packs it into one cell of a sorted,
//! versioned key-value table and parses such cells back.
//!
//! # Examples
//!
//! Encoding and decoding with [`codec`]:
//! ```
//! use querymodel::{
//!     clock::FixedClock,
//!     codec::{decode_key, encode_key},
//!     mapping::FieldMapping,
//! };
//!
//! let clock = FixedClock::new(1_000);
//! let mapping = FieldMapping::forward("field1", "mappedField1")
//!     .with_datatype("test")
//!     .with_visibility("PRIVATE");
//! let key = encode_key(&mapping, "MODEL", &clock).expect("encode");
//! assert_eq!(key.row, "mappedField1");
//! assert_eq!(key.column_family, "MODEL\0test");
//! assert_eq!(key.column_qualifier, "field1\0forward");
//! assert_eq!(decode_key(&key, None).expect("decode"), mapping);
//! ```
//!
//! Persisting through a [`core::store::ModelStore`]:
//! ```no_run
//! use querymodel::{
//!     core::store::ModelStore,
//!     mapping::FieldMapping,
//!     persist::sqlite::SqliteModelTable,
//! };
//!
//! let table = SqliteModelTable::open("model.db").expect("open sqlite");
//! let mut store = ModelStore::new(table);
//! store
//!     .put_mapping("MODEL", &FieldMapping::reverse("field1", "mappedField1"))
//!     .expect("put");
//! let mappings = store.load_model("MODEL").expect("load");
//! assert_eq!(mappings.len(), 1);
//! ```
#![deny(missing_docs)]

/// Injectable timestamp sources.
pub mod clock;
/// Field mapping key codec.
pub mod codec;
/// Model store over a model table.
pub mod core;
/// JSON model documents.
pub mod document;
/// Store key, update and mutation types.
pub mod key;
/// Field mapping records and attributes.
pub mod mapping;
/// Model table abstraction with memory and SQLite implementations.
pub mod persist;
/// Shared primitive types and enums.
pub mod types;
