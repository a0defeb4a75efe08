use std::{collections::BTreeMap, sync::Arc};

use error_stack::{report, ResultExt};
use tracing::instrument;

use crate::adapters::config::sheets_config::ManagementSheetConfig;
use crate::domain::roster::{CellChange, FieldMapping, ManagementLayout, ManagementTable};
use crate::domain::sheets::{cell_position::CellPosition, column::Column, row::Row};
use crate::ports::sheet_gateway::{RangeWrite, SheetGateway, SheetRef};

use super::sync_error::{GatewayResultExt, SyncError};

/// Loads the management sheet into a [`ManagementTable`] and writes the cells
/// it changed back.
pub struct ManagementSheet {
    gateway: Arc<dyn SheetGateway>,
    sheet: SheetRef,
    config: ManagementSheetConfig,
    targets: Vec<String>,
}

impl ManagementSheet {
    pub fn new(
        gateway: Arc<dyn SheetGateway>,
        config: &ManagementSheetConfig,
        mappings: &[FieldMapping],
    ) -> Self {
        Self {
            gateway,
            sheet: config.sheet_ref(),
            config: config.clone(),
            targets: mappings.iter().map(|mapping| mapping.target.clone()).collect(),
        }
    }

    pub fn sheet(&self) -> &SheetRef {
        &self.sheet
    }

    #[instrument(skip(self), fields(sheet = %self.sheet))]
    pub async fn load(&self) -> error_stack::Result<ManagementTable, SyncError> {
        let header_row = Row::from_number(self.config.header_row);
        let mut rows = self
            .gateway
            .read_rows(&self.sheet, header_row)
            .await
            .into_sync_error(|| SyncError::Read {
                sheet: self.sheet.to_string(),
            })?;

        if rows.is_empty() {
            return Err(report!(SyncError::Schema {
                sheet: self.sheet.to_string(),
            }))
            .attach_printable_lazy(|| format!("header row {} is empty", header_row));
        }

        let data = rows.split_off(1);
        let header = rows
            .remove(0)
            .into_iter()
            .map(|name| name.trim().to_owned())
            .collect::<Vec<_>>();

        let layout = resolve_layout(&header, &self.config, &self.targets).map_err(|missing| {
            report!(SyncError::Schema {
                sheet: self.sheet.to_string(),
            })
            .attach_printable(format!("missing columns: {}", missing.join(", ")))
        })?;

        let table = ManagementTable::new(header.len(), header_row.offset(1), layout, data);
        for (key, row) in table.duplicates() {
            tracing::warn!(
                "⚠️ Unit {} appears again on row {} of {}; only the first row is updated",
                key,
                row,
                self.sheet
            );
        }

        tracing::info!(
            "📋 Loaded {} units ({} rows) from {}",
            table.unit_count(),
            table.row_count(),
            self.sheet
        );
        Ok(table)
    }

    /// Writes the changed cells of `table` in one request. Returns whether
    /// anything was written; an unchanged table is not written at all.
    #[instrument(skip(self, table), fields(sheet = %self.sheet))]
    pub async fn save(&self, table: &ManagementTable) -> error_stack::Result<bool, SyncError> {
        if !table.has_changes() {
            tracing::info!("🟰 {} is already up to date", self.sheet);
            return Ok(false);
        }

        let writes = cell_writes(table.changes());
        tracing::trace!("📝 Writing {} ranges to {}", writes.len(), self.sheet);

        self.gateway
            .write_ranges(&self.sheet, &writes)
            .await
            .into_sync_error(|| SyncError::Write {
                sheet: self.sheet.to_string(),
            })?;

        Ok(true)
    }
}

/// Finds the owned columns in `header`. Returns the names of the missing ones.
pub fn resolve_layout(
    header: &[String],
    config: &ManagementSheetConfig,
    targets: &[String],
) -> Result<ManagementLayout, Vec<String>> {
    let mut missing = Vec::new();
    let mut position_of = |name: &str| {
        let position = header.iter().position(|column| column == name);
        if position.is_none() && !missing.iter().any(|m: &String| m == name) {
            missing.push(name.to_owned());
        }
        position
    };

    let building = position_of(&config.building_column);
    let unit = position_of(&config.unit_column);
    let updated_at = config
        .updated_at_column
        .as_deref()
        .map(|name| position_of(name));
    let targets = targets
        .iter()
        .map(|name| (name.clone(), position_of(name)))
        .collect::<Vec<_>>();

    if !missing.is_empty() {
        return Err(missing);
    }

    Ok(ManagementLayout {
        building: building.unwrap_or_default(),
        unit: unit.unwrap_or_default(),
        updated_at: updated_at.flatten(),
        targets: targets
            .into_iter()
            .filter_map(|(name, position)| position.map(|position| (name, position)))
            .collect::<BTreeMap<_, _>>(),
    })
}

/// One write per run of adjacent changed cells on the same row.
fn cell_writes(changes: Vec<CellChange>) -> Vec<RangeWrite> {
    let mut writes: Vec<RangeWrite> = Vec::new();
    for change in changes {
        if let Some(last) = writes.last_mut() {
            if let Some(cells) = last.rows.first_mut() {
                let next = last.start.col.position() + cells.len();
                if last.start.row == change.row && next == change.column {
                    cells.push(change.value);
                    continue;
                }
            }
        }
        writes.push(RangeWrite {
            start: CellPosition::new(Column::from_position(change.column), change.row),
            rows: vec![vec![change.value]],
        });
    }
    writes
}
