use std::collections::BTreeSet;

use thiserror::Error;

use crate::{
    clock::{Clock, SystemClock},
    codec::{CodecError, decode_entry, encode_delete_mutation, encode_put_mutation},
    document::{DocumentError, ModelDocument},
    key::StoreMutation,
    mapping::FieldMapping,
    persist::{ModelTable, PersistError},
};

use super::indices::ModelIndex;

/// Model store failure.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Encoding or decoding failed.
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// The table rejected a read or write.
    #[error(transparent)]
    Persist(#[from] PersistError),
    /// A model document could not be converted.
    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Result alias for model store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Field mappings of every model, persisted in one table.
#[derive(Debug)]
pub struct ModelStore<T, C = SystemClock> {
    table: T,
    clock: C,
}

impl<T: ModelTable> ModelStore<T> {
    /// Store stamping writes with the wall clock.
    pub fn new(table: T) -> Self {
        Self::with_clock(table, SystemClock::new())
    }
}

impl<T: ModelTable, C: Clock> ModelStore<T, C> {
    /// Store stamping writes with `clock`.
    pub fn with_clock(table: T, clock: C) -> Self {
        Self { table, clock }
    }

    /// Underlying table.
    pub fn table(&self) -> &T {
        &self.table
    }

    /// Underlying table, mutably.
    pub fn table_mut(&mut self) -> &mut T {
        &mut self.table
    }

    /// Timestamp source.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Consumes the store, returning the table.
    pub fn into_table(self) -> T {
        self.table
    }

    /// Stores `mapping` under `model_name`.
    pub fn put_mapping(&mut self, model_name: &str, mapping: &FieldMapping) -> StoreResult<StoreMutation> {
        let mutation = encode_put_mutation(mapping, model_name, &self.clock)?;
        self.table.apply(&mutation)?;
        tracing::debug!(
            model = model_name,
            model_field = %mapping.model_field_name,
            kind = ?mapping.kind(),
            "stored field mapping"
        );
        Ok(mutation)
    }

    /// Removes every encoding of `mapping` from `model_name`.
    pub fn delete_mapping(&mut self, model_name: &str, mapping: &FieldMapping) -> StoreResult<StoreMutation> {
        let mutation = encode_delete_mutation(mapping, model_name, &self.clock)?;
        self.table.apply(&mutation)?;
        tracing::debug!(
            model = model_name,
            model_field = %mapping.model_field_name,
            deletes = mutation.updates.len(),
            "deleted field mapping"
        );
        Ok(mutation)
    }

    /// Stores several mappings. Nothing is written unless all of them encode.
    pub fn put_mappings(&mut self, model_name: &str, mappings: &[FieldMapping]) -> StoreResult<usize> {
        let mutations = mappings
            .iter()
            .map(|m| encode_put_mutation(m, model_name, &self.clock))
            .collect::<Result<Vec<_>, _>>()?;
        self.table.apply_all(&mutations)?;
        Ok(mutations.len())
    }

    /// Decodes every live entry of `model_name`, in key order.
    ///
    /// Fails on the first entry that does not decode.
    pub fn load_model(&self, model_name: &str) -> StoreResult<Vec<FieldMapping>> {
        let entries = self.table.scan()?;
        let mappings = entries
            .iter()
            .filter(|entry| entry.model_name() == model_name)
            .map(|entry| decode_entry(&entry.key, Some(&entry.value)).map(|d| d.mapping))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(model = model_name, mappings = mappings.len(), "loaded model");
        Ok(mappings)
    }

    /// Decodes the whole table, grouped by model.
    pub fn mappings_by_model(&self) -> StoreResult<ModelIndex> {
        let mut index = ModelIndex::new();
        for entry in self.table.scan()? {
            let decoded = decode_entry(&entry.key, Some(&entry.value))?;
            index.entry(decoded.model_name).or_default().push(decoded.mapping);
        }
        Ok(index)
    }

    /// Sorted names of the models present in the table.
    pub fn model_names(&self) -> StoreResult<Vec<String>> {
        let names: BTreeSet<String> = self
            .table
            .scan()?
            .iter()
            .map(|entry| entry.model_name().to_string())
            .collect();
        Ok(names.into_iter().collect())
    }

    /// Stores every mapping of `document`.
    pub fn import_document(&mut self, document: &ModelDocument) -> StoreResult<usize> {
        let mutations = document.to_mutations(&self.clock)?;
        self.table.apply_all(&mutations)?;
        tracing::debug!(model = %document.name, mappings = mutations.len(), "imported model document");
        Ok(mutations.len())
    }

    /// Builds a document from the stored entries of `model_name`.
    pub fn export_document(&self, model_name: &str) -> StoreResult<ModelDocument> {
        Ok(ModelDocument {
            name: model_name.to_string(),
            mappings: self.load_model(model_name)?,
        })
    }
}
