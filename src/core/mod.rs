//! Model store built on the codec and a model table.

/// Grouping aliases for decoded mappings.
pub mod indices;
/// Writes, deletes and loads field mappings through a [`crate::persist::ModelTable`].
pub mod store;
