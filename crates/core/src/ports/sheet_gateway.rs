use thiserror::Error;

use crate::domain::sheets::{cell_position::CellPosition, row::Row};

/// Failure categories of a spreadsheet call. Only [`is_transient`] ones are retried.
///
/// [`is_transient`]: SheetGatewayError::is_transient
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SheetGatewayError {
    #[error("Authentication with the spreadsheet API failed")]
    Authentication,
    #[error("Permission denied by the spreadsheet API")]
    PermissionDenied,
    #[error("Spreadsheet or worksheet not found")]
    NotFound,
    #[error("Rate limited by the spreadsheet API")]
    RateLimited,
    #[error("Transient failure talking to the spreadsheet API")]
    Transient,
    #[error("Request rejected by the spreadsheet API")]
    Rejected,
    #[error("Unexpected response from the spreadsheet API: {0}")]
    MalformedResponse(&'static str),
    #[error("Gave up after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },
}

impl SheetGatewayError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RateLimited | Self::Transient)
    }
}

/// A worksheet inside a spreadsheet, addressed by title.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SheetRef {
    pub spreadsheet_id: String,
    pub title: String,
}

impl SheetRef {
    pub fn new(spreadsheet_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            title: title.into(),
        }
    }
}

impl std::fmt::Display for SheetRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/'{}'", self.spreadsheet_id, self.title)
    }
}

/// Cell values to place at `start`, row by row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeWrite {
    pub start: CellPosition,
    pub rows: Vec<Vec<String>>,
}

#[async_trait::async_trait]
pub trait SheetGateway: Send + Sync {
    /// Formatted cell values from `first_row` downwards. Trailing empty cells and
    /// trailing empty rows may be omitted, as the Sheets API does.
    async fn read_rows(
        &self,
        sheet: &SheetRef,
        first_row: Row,
    ) -> error_stack::Result<Vec<Vec<String>>, SheetGatewayError>;

    /// Applies every write in a single request: either all land or none do.
    async fn write_ranges(
        &self,
        sheet: &SheetRef,
        writes: &[RangeWrite],
    ) -> error_stack::Result<(), SheetGatewayError>;

    /// Numeric id of the worksheet titled `title`, if present.
    async fn find_sheet_id(
        &self,
        spreadsheet_id: &str,
        title: &str,
    ) -> error_stack::Result<Option<i32>, SheetGatewayError>;

    /// Copies a worksheet into another spreadsheet and returns the new sheet id.
    async fn copy_sheet(
        &self,
        source: &SheetRef,
        destination_spreadsheet_id: &str,
    ) -> error_stack::Result<i32, SheetGatewayError>;

    async fn sheet_exists(
        &self,
        spreadsheet_id: &str,
        sheet_id: i32,
    ) -> error_stack::Result<bool, SheetGatewayError>;

    async fn delete_sheet(
        &self,
        spreadsheet_id: &str,
        sheet_id: i32,
    ) -> error_stack::Result<(), SheetGatewayError>;

    async fn rename_sheet(
        &self,
        spreadsheet_id: &str,
        sheet_id: i32,
        title: &str,
    ) -> error_stack::Result<(), SheetGatewayError>;
}
