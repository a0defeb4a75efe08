use std::sync::Arc;

use error_stack::{report, ResultExt};
use tracing::instrument;

use crate::adapters::config::sheets_config::FormSheetConfig;
use crate::domain::roster::FormRecord;
use crate::domain::sheets::row::Row;
use crate::ports::sheet_gateway::{SheetGateway, SheetRef};

use super::{
    record_mapper::RecordMapper,
    sync_error::{GatewayResultExt, SyncError},
};

/// Reads the form response sheet into [`FormRecord`]s.
pub struct FormSheetReader {
    gateway: Arc<dyn SheetGateway>,
    sheet: SheetRef,
    header_row: Row,
    timestamp_column: Option<String>,
    required_columns: Vec<String>,
    optional_columns: Vec<String>,
}

impl FormSheetReader {
    pub fn new(gateway: Arc<dyn SheetGateway>, config: &FormSheetConfig, mapper: &RecordMapper) -> Self {
        let mut required_columns = mapper
            .required_columns()
            .into_iter()
            .map(str::to_owned)
            .collect::<Vec<_>>();
        required_columns.extend(config.timestamp_column.clone());

        let optional_columns = mapper
            .mappings()
            .iter()
            .filter(|mapping| mapping.optional)
            .map(|mapping| mapping.source.clone())
            .collect();

        Self {
            gateway,
            sheet: config.sheet_ref(),
            header_row: Row::from_number(config.header_row),
            timestamp_column: config.timestamp_column.clone(),
            required_columns,
            optional_columns,
        }
    }

    pub fn sheet(&self) -> &SheetRef {
        &self.sheet
    }

    /// Every populated response row, in sheet order.
    #[instrument(skip(self), fields(sheet = %self.sheet))]
    pub async fn read(&self) -> error_stack::Result<Vec<FormRecord>, SyncError> {
        let rows = self.fetch_rows().await?;
        let (header, data) = self.split_header(rows)?;

        let records = data
            .iter()
            .enumerate()
            .map(|(position, cells)| {
                FormRecord::from_cells(
                    self.header_row.offset(position + 1),
                    &header,
                    cells,
                    self.timestamp_column.as_deref(),
                )
            })
            .filter(|record| !record.is_blank())
            .collect::<Vec<_>>();

        tracing::info!("📋 Read {} responses from {}", records.len(), self.sheet);
        Ok(records)
    }

    /// Reads only enough to validate the header.
    #[instrument(skip(self), fields(sheet = %self.sheet))]
    pub async fn check(&self) -> error_stack::Result<(), SyncError> {
        let rows = self.fetch_rows().await?;
        self.split_header(rows).map(|_| ())
    }

    async fn fetch_rows(&self) -> error_stack::Result<Vec<Vec<String>>, SyncError> {
        self.gateway
            .read_rows(&self.sheet, self.header_row)
            .await
            .into_sync_error(|| SyncError::Read {
                sheet: self.sheet.to_string(),
            })
    }

    fn split_header(
        &self,
        mut rows: Vec<Vec<String>>,
    ) -> error_stack::Result<(Vec<String>, Vec<Vec<String>>), SyncError> {
        if rows.is_empty() {
            return Err(report!(SyncError::Schema {
                sheet: self.sheet.to_string(),
            }))
            .attach_printable_lazy(|| format!("header row {} is empty", self.header_row));
        }

        let data = rows.split_off(1);
        let header = rows
            .remove(0)
            .into_iter()
            .map(|name| name.trim().to_owned())
            .collect::<Vec<_>>();

        let missing = self
            .required_columns
            .iter()
            .filter(|column| !header.contains(column))
            .cloned()
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            return Err(report!(SyncError::Schema {
                sheet: self.sheet.to_string(),
            }))
            .attach_printable(format!("missing columns: {}", missing.join(", ")));
        }

        for column in self.optional_columns.iter().filter(|column| !header.contains(column)) {
            tracing::warn!("⚠️ Optional column '{}' is absent from {}", column, self.sheet);
        }

        Ok((header, data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::roster::FieldMapping;
    use crate::testing::{cells, FakeSheetGateway};

    fn config() -> FormSheetConfig {
        FormSheetConfig {
            spreadsheet_id: "form".to_string(),
            sheet_name: "Responses".to_string(),
            header_row: 1,
            building_column: "동".to_string(),
            unit_column: "호수".to_string(),
            timestamp_column: Some("타임스탬프".to_string()),
        }
    }

    fn reader(gateway: Arc<FakeSheetGateway>) -> FormSheetReader {
        let mapper = RecordMapper::new(
            "동",
            "호수",
            vec![
                FieldMapping::new("이름", "이름"),
                FieldMapping::new("카페", "카페 닉네임").optional(),
            ],
        );
        FormSheetReader::new(gateway, &config(), &mapper)
    }

    #[tokio::test]
    async fn test_reads_populated_rows_in_order() {
        let gateway = Arc::new(FakeSheetGateway::new());
        gateway.put_sheet(
            &config().sheet_ref(),
            vec![
                cells(&["타임스탬프", "동", "호수", "이름"]),
                cells(&["t1", "101", "203", "Kim"]),
                cells(&[]),
                cells(&["t3", "102", "1", "Lee"]),
            ],
        );

        let records = reader(gateway).read().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].row, Row::from_number(2));
        assert_eq!(records[0].get("이름"), Some("Kim"));
        assert_eq!(records[0].submitted_at.as_deref(), Some("t1"));
        assert_eq!(records[1].row, Row::from_number(4));
    }

    #[tokio::test]
    async fn test_missing_required_column_is_schema_error() {
        let gateway = Arc::new(FakeSheetGateway::new());
        gateway.put_sheet(
            &config().sheet_ref(),
            vec![cells(&["타임스탬프", "동", "이름"]), cells(&["t1", "101", "Kim"])],
        );

        let report = reader(gateway).read().await.unwrap_err();
        assert!(matches!(report.current_context(), SyncError::Schema { .. }));
    }

    #[tokio::test]
    async fn test_empty_sheet_is_schema_error() {
        let gateway = Arc::new(FakeSheetGateway::new());
        gateway.put_sheet(&config().sheet_ref(), vec![]);

        let report = reader(gateway).check().await.unwrap_err();
        assert!(matches!(report.current_context(), SyncError::Schema { .. }));
    }

    #[tokio::test]
    async fn test_authentication_failure_keeps_its_category() {
        let gateway = Arc::new(FakeSheetGateway::new());
        gateway.fail_reads_with(crate::ports::sheet_gateway::SheetGatewayError::Authentication);

        let report = reader(gateway).read().await.unwrap_err();
        assert_eq!(report.current_context(), &SyncError::Authentication);
    }
}
