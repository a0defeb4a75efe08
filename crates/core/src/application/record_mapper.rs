use thiserror::Error;

use crate::adapters::config::sheets_config::FormSheetConfig;
use crate::domain::roster::{
    FieldMapping, FormRecord, MappedField, NormalizedRecord, UnitKey, UnitKeyError,
};
use crate::domain::sheets::row::Row;

/// A form row that cannot be keyed. Recoverable: the row is skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("form row {row}: {reason}")]
pub struct ValidationError {
    pub row: Row,
    pub reason: UnitKeyError,
}

/// Turns raw form rows into keyed records holding management column values.
#[derive(Debug, Clone)]
pub struct RecordMapper {
    building_column: String,
    unit_column: String,
    mappings: Vec<FieldMapping>,
}

impl RecordMapper {
    pub fn new(
        building_column: impl Into<String>,
        unit_column: impl Into<String>,
        mappings: Vec<FieldMapping>,
    ) -> Self {
        Self {
            building_column: building_column.into(),
            unit_column: unit_column.into(),
            mappings,
        }
    }

    pub fn from_config(form: &FormSheetConfig, mappings: &[FieldMapping]) -> Self {
        Self::new(
            form.building_column.clone(),
            form.unit_column.clone(),
            mappings.to_vec(),
        )
    }

    pub fn mappings(&self) -> &[FieldMapping] {
        &self.mappings
    }

    /// Columns the form sheet must have for every row to be mappable.
    pub fn required_columns(&self) -> Vec<&str> {
        let mut columns = vec![self.building_column.as_str(), self.unit_column.as_str()];
        columns.extend(
            self.mappings
                .iter()
                .filter(|mapping| !mapping.optional)
                .map(|mapping| mapping.source.as_str()),
        );
        columns
    }

    pub fn map(&self, record: &FormRecord) -> Result<NormalizedRecord, ValidationError> {
        let key = UnitKey::parse(
            record.get(&self.building_column).unwrap_or(""),
            record.get(&self.unit_column).unwrap_or(""),
        )
        .map_err(|reason| ValidationError {
            row: record.row,
            reason,
        })?;

        let fields = self
            .mappings
            .iter()
            .map(|mapping| MappedField {
                target: mapping.target.clone(),
                value: record.get(&mapping.source).unwrap_or("").to_owned(),
                policy: mapping.policy,
            })
            .collect();

        Ok(NormalizedRecord {
            key,
            source_row: record.row,
            submitted_at: record.submitted_at.clone(),
            fields,
        })
    }
}
