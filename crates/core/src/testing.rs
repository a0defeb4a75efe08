//! In-memory stand-ins for the spreadsheet API.

use std::sync::Mutex;

use error_stack::report;

use crate::adapters::config::{
    app_config::AppConfig,
    retry_config::RetryPolicy,
    sheets_config::{BackupConfig, CredentialsConfig, FormSheetConfig, ManagementSheetConfig},
};
use crate::domain::roster::{FieldMapping, MergePolicy};
use crate::domain::sheets::row::Row;
use crate::ports::sheet_gateway::{RangeWrite, SheetGateway, SheetGatewayError, SheetRef};

pub fn cells(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

/// Form sheet `form-id/'Responses'` with columns
/// `타임스탬프, building, unit, name, phone, cafe` merged into
/// `admin-id/'Admin'` whose header sits on row 3.
pub fn test_config() -> AppConfig {
    AppConfig {
        credentials: CredentialsConfig::default(),
        form: FormSheetConfig {
            spreadsheet_id: "form-id".to_string(),
            sheet_name: "Responses".to_string(),
            header_row: 1,
            building_column: "building".to_string(),
            unit_column: "unit".to_string(),
            timestamp_column: Some("타임스탬프".to_string()),
        },
        management: ManagementSheetConfig {
            spreadsheet_id: "admin-id".to_string(),
            sheet_name: "Admin".to_string(),
            header_row: 3,
            building_column: "동".to_string(),
            unit_column: "호수".to_string(),
            updated_at_column: Some("갱신".to_string()),
        },
        mappings: vec![
            FieldMapping::new("name", "이름"),
            FieldMapping::new("phone", "비상연락망"),
            FieldMapping::new("cafe", "카페 닉네임")
                .with_policy(MergePolicy::Union)
                .optional(),
        ],
        backup: BackupConfig::default(),
        retry: RetryPolicy::immediate(1),
    }
}

#[derive(Debug, Clone)]
struct FakeSheet {
    spreadsheet_id: String,
    sheet_id: i32,
    title: String,
    rows: Vec<Vec<String>>,
}

#[derive(Debug, Default)]
struct State {
    sheets: Vec<FakeSheet>,
    next_sheet_id: i32,
    read_error: Option<SheetGatewayError>,
    write_error: Option<SheetGatewayError>,
    copy_error: Option<SheetGatewayError>,
    hidden_polls: u32,
    writes: usize,
    last_writes: Vec<RangeWrite>,
}

impl State {
    fn find(&self, spreadsheet_id: &str, title: &str) -> Option<&FakeSheet> {
        self.sheets
            .iter()
            .find(|sheet| sheet.spreadsheet_id == spreadsheet_id && sheet.title == title)
    }

    fn find_mut(&mut self, spreadsheet_id: &str, title: &str) -> Option<&mut FakeSheet> {
        self.sheets
            .iter_mut()
            .find(|sheet| sheet.spreadsheet_id == spreadsheet_id && sheet.title == title)
    }

    fn allocate_id(&mut self) -> i32 {
        self.next_sheet_id += 1;
        self.next_sheet_id
    }
}

/// Worksheets kept in memory. Writes are applied cell by cell, growing the
/// grid as needed, the way the real API does.
#[derive(Debug, Default)]
pub struct FakeSheetGateway {
    state: Mutex<State>,
}

impl FakeSheetGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates or replaces a worksheet and returns its sheet id.
    pub fn put_sheet(&self, sheet: &SheetRef, rows: Vec<Vec<String>>) -> i32 {
        let mut state = self.state.lock().unwrap();
        if let Some(existing) = state.find_mut(&sheet.spreadsheet_id, &sheet.title) {
            existing.rows = rows;
            return existing.sheet_id;
        }

        let sheet_id = state.allocate_id();
        state.sheets.push(FakeSheet {
            spreadsheet_id: sheet.spreadsheet_id.clone(),
            sheet_id,
            title: sheet.title.clone(),
            rows,
        });
        sheet_id
    }

    pub fn sheet(&self, sheet: &SheetRef) -> Vec<Vec<String>> {
        let state = self.state.lock().unwrap();
        state
            .find(&sheet.spreadsheet_id, &sheet.title)
            .map(|found| found.rows.clone())
            .unwrap_or_else(|| panic!("no sheet {}", sheet))
    }

    pub fn titles(&self, spreadsheet_id: &str) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state
            .sheets
            .iter()
            .filter(|sheet| sheet.spreadsheet_id == spreadsheet_id)
            .map(|sheet| sheet.title.clone())
            .collect()
    }

    pub fn write_count(&self) -> usize {
        self.state.lock().unwrap().writes
    }

    /// Ranges passed to the most recent successful `write_ranges` call.
    pub fn last_writes(&self) -> Vec<RangeWrite> {
        self.state.lock().unwrap().last_writes.clone()
    }

    pub fn fail_reads_with(&self, error: SheetGatewayError) {
        self.state.lock().unwrap().read_error = Some(error);
    }

    pub fn fail_writes_with(&self, error: SheetGatewayError) {
        self.state.lock().unwrap().write_error = Some(error);
    }

    pub fn fail_copies_with(&self, error: SheetGatewayError) {
        self.state.lock().unwrap().copy_error = Some(error);
    }

    /// Copied sheets stay invisible to `sheet_exists` for this many calls.
    pub fn hide_copies_for(&self, polls: u32) {
        self.state.lock().unwrap().hidden_polls = polls;
    }
}

#[async_trait::async_trait]
impl SheetGateway for FakeSheetGateway {
    async fn read_rows(
        &self,
        sheet: &SheetRef,
        first_row: Row,
    ) -> error_stack::Result<Vec<Vec<String>>, SheetGatewayError> {
        let state = self.state.lock().unwrap();
        if let Some(error) = state.read_error.clone() {
            return Err(report!(error));
        }

        let found = state
            .find(&sheet.spreadsheet_id, &sheet.title)
            .ok_or_else(|| report!(SheetGatewayError::NotFound))?;
        Ok(found
            .rows
            .iter()
            .skip(first_row.index() as usize)
            .cloned()
            .collect())
    }

    async fn write_ranges(
        &self,
        sheet: &SheetRef,
        writes: &[RangeWrite],
    ) -> error_stack::Result<(), SheetGatewayError> {
        let mut state = self.state.lock().unwrap();
        if let Some(error) = state.write_error.clone() {
            return Err(report!(error));
        }

        let found = state
            .find_mut(&sheet.spreadsheet_id, &sheet.title)
            .ok_or_else(|| report!(SheetGatewayError::NotFound))?;
        for write in writes {
            for (row_offset, values) in write.rows.iter().enumerate() {
                let row = write.start.row.index() as usize + row_offset;
                if found.rows.len() <= row {
                    found.rows.resize(row + 1, Vec::new());
                }
                for (col_offset, value) in values.iter().enumerate() {
                    let col = write.start.col.position() + col_offset;
                    let cells = &mut found.rows[row];
                    if cells.len() <= col {
                        cells.resize(col + 1, String::new());
                    }
                    cells[col] = value.clone();
                }
            }
        }

        state.writes += 1;
        state.last_writes = writes.to_vec();
        Ok(())
    }

    async fn find_sheet_id(
        &self,
        spreadsheet_id: &str,
        title: &str,
    ) -> error_stack::Result<Option<i32>, SheetGatewayError> {
        let state = self.state.lock().unwrap();
        Ok(state.find(spreadsheet_id, title).map(|sheet| sheet.sheet_id))
    }

    async fn copy_sheet(
        &self,
        source: &SheetRef,
        destination_spreadsheet_id: &str,
    ) -> error_stack::Result<i32, SheetGatewayError> {
        let mut state = self.state.lock().unwrap();
        if let Some(error) = state.copy_error.clone() {
            return Err(report!(error));
        }

        let rows = state
            .find(&source.spreadsheet_id, &source.title)
            .map(|sheet| sheet.rows.clone())
            .ok_or_else(|| report!(SheetGatewayError::NotFound))?;
        let sheet_id = state.allocate_id();
        state.sheets.push(FakeSheet {
            spreadsheet_id: destination_spreadsheet_id.to_string(),
            sheet_id,
            title: format!("Copy of {}", source.title),
            rows,
        });
        Ok(sheet_id)
    }

    async fn sheet_exists(
        &self,
        spreadsheet_id: &str,
        sheet_id: i32,
    ) -> error_stack::Result<bool, SheetGatewayError> {
        let mut state = self.state.lock().unwrap();
        if state.hidden_polls > 0 {
            state.hidden_polls -= 1;
            return Ok(false);
        }
        Ok(state
            .sheets
            .iter()
            .any(|sheet| sheet.spreadsheet_id == spreadsheet_id && sheet.sheet_id == sheet_id))
    }

    async fn delete_sheet(
        &self,
        spreadsheet_id: &str,
        sheet_id: i32,
    ) -> error_stack::Result<(), SheetGatewayError> {
        let mut state = self.state.lock().unwrap();
        let before = state.sheets.len();
        state
            .sheets
            .retain(|sheet| !(sheet.spreadsheet_id == spreadsheet_id && sheet.sheet_id == sheet_id));
        if state.sheets.len() == before {
            return Err(report!(SheetGatewayError::NotFound));
        }
        Ok(())
    }

    async fn rename_sheet(
        &self,
        spreadsheet_id: &str,
        sheet_id: i32,
        title: &str,
    ) -> error_stack::Result<(), SheetGatewayError> {
        let mut state = self.state.lock().unwrap();
        let sheet = state
            .sheets
            .iter_mut()
            .find(|sheet| sheet.spreadsheet_id == spreadsheet_id && sheet.sheet_id == sheet_id)
            .ok_or_else(|| report!(SheetGatewayError::NotFound))?;
        sheet.title = title.to_string();
        Ok(())
    }
}
