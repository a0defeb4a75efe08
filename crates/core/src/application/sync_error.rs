use thiserror::Error;

use crate::ports::sheet_gateway::SheetGatewayError;

/// Fatal pipeline failures. Any of these aborts the run before the management
/// sheet is written.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("Authentication with the spreadsheet API failed")]
    Authentication,
    #[error("Sheet {sheet} does not have the expected columns")]
    Schema { sheet: String },
    #[error("Failed to read sheet {sheet}")]
    Read { sheet: String },
    #[error("Failed to write sheet {sheet}")]
    Write { sheet: String },
    #[error("Failed to back up sheet {sheet}")]
    Backup { sheet: String },
}

pub(crate) trait GatewayResultExt<T> {
    /// Lifts a gateway failure into a [`SyncError`]. Authentication failures keep
    /// their own category; everything else becomes `fallback()`.
    fn into_sync_error(
        self,
        fallback: impl FnOnce() -> SyncError,
    ) -> error_stack::Result<T, SyncError>;
}

impl<T> GatewayResultExt<T> for error_stack::Result<T, SheetGatewayError> {
    fn into_sync_error(
        self,
        fallback: impl FnOnce() -> SyncError,
    ) -> error_stack::Result<T, SyncError> {
        self.map_err(|report| {
            let context = match report.current_context() {
                SheetGatewayError::Authentication => SyncError::Authentication,
                _ => fallback(),
            };
            report.change_context(context)
        })
    }
}
