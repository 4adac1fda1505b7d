use hashbrown::HashMap;

use crate::mapping::FieldMapping;

/// Decoded mappings grouped by model name.
pub type ModelIndex = HashMap<String, Vec<FieldMapping>>;
