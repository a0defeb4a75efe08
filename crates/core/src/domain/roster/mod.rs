pub mod field_mapping;
pub mod form_record;
pub mod management_table;
pub mod merge_policy;
pub mod normalized_record;
pub mod unit_key;

pub use field_mapping::FieldMapping;
pub use form_record::FormRecord;
pub use management_table::{CellChange, ManagementLayout, ManagementTable, UpsertOutcome};
pub use merge_policy::MergePolicy;
pub use normalized_record::{MappedField, NormalizedRecord};
pub use unit_key::{UnitKey, UnitKeyError};
