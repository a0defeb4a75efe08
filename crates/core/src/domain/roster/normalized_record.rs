use super::{merge_policy::MergePolicy, unit_key::UnitKey};
use crate::domain::sheets::row::Row;

/// A management column value extracted from a form row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedField {
    pub target: String,
    pub value: String,
    pub policy: MergePolicy,
}

/// A form row after key derivation and column mapping, ready to be upserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    pub key: UnitKey,
    pub source_row: Row,
    pub submitted_at: Option<String>,
    pub fields: Vec<MappedField>,
}
