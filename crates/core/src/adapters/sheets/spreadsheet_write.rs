use error_stack::ResultExt;
use google_sheets4::api::{
    BatchUpdateSpreadsheetRequest, BatchUpdateValuesRequest, CopySheetToAnotherSpreadsheetRequest,
    Request, ValueRange,
};
use tracing::instrument;

use crate::adapters::config::retry_config::RetryPolicy;
use crate::ports::sheet_gateway::SheetGatewayError;

use super::{
    retry::with_backoff,
    spreadsheet_manager::{gateway_report, SpreadsheetManager},
};

pub trait SpreadsheetWrite {
    /// Writes every value range in one `values:batchUpdate` call.
    fn write_value_ranges(
        &self,
        spreadsheet_id: &str,
        data: Vec<ValueRange>,
    ) -> impl std::future::Future<Output = error_stack::Result<(), SheetGatewayError>> + Send;

    /// Applies structural requests (delete, rename, ...) in one `batchUpdate` call.
    fn update_sheets(
        &self,
        spreadsheet_id: &str,
        requests: Vec<Request>,
    ) -> impl std::future::Future<Output = error_stack::Result<(), SheetGatewayError>> + Send;

    fn copy_sheet_to(
        &self,
        spreadsheet_id: &str,
        sheet_id: i32,
        destination_spreadsheet_id: &str,
    ) -> impl std::future::Future<Output = error_stack::Result<i32, SheetGatewayError>> + Send;
}

/// Values are stored as typed, so text such as `010...` or `=...` is never
/// reinterpreted as a number, date or formula.
fn values_update_request(data: Vec<ValueRange>) -> BatchUpdateValuesRequest {
    BatchUpdateValuesRequest {
        data: Some(data),
        value_input_option: Some("RAW".to_string()),
        ..Default::default()
    }
}

impl SpreadsheetWrite for SpreadsheetManager {
    #[instrument(skip(self, data))]
    async fn write_value_ranges(
        &self,
        spreadsheet_id: &str,
        data: Vec<ValueRange>,
    ) -> error_stack::Result<(), SheetGatewayError> {
        let range_count = data.len();
        let request = values_update_request(data);
        let hub = &self.hub;

        with_backoff(&self.retry, "values_batch_update", move || {
            let request = request.clone();
            async move {
                hub.spreadsheets()
                    .values_batch_update(request, spreadsheet_id)
                    .doit()
                    .await
                    .map(|_| ())
                    .map_err(gateway_report)
            }
        })
        .await
        .attach_printable_lazy(|| {
            format!(
                "Failed to write {} ranges to spreadsheet {}",
                range_count, spreadsheet_id
            )
        })
    }

    #[instrument(skip(self, requests))]
    async fn update_sheets(
        &self,
        spreadsheet_id: &str,
        requests: Vec<Request>,
    ) -> error_stack::Result<(), SheetGatewayError> {
        let request = BatchUpdateSpreadsheetRequest {
            requests: Some(requests),
            ..Default::default()
        };
        let hub = &self.hub;

        with_backoff(&self.retry, "batch_update", move || {
            let request = request.clone();
            async move {
                hub.spreadsheets()
                    .batch_update(request, spreadsheet_id)
                    .doit()
                    .await
                    .map(|_| ())
                    .map_err(gateway_report)
            }
        })
        .await
        .attach_printable_lazy(|| format!("Failed to update sheets of {}", spreadsheet_id))
    }

    #[instrument(skip(self))]
    async fn copy_sheet_to(
        &self,
        spreadsheet_id: &str,
        sheet_id: i32,
        destination_spreadsheet_id: &str,
    ) -> error_stack::Result<i32, SheetGatewayError> {
        let request = CopySheetToAnotherSpreadsheetRequest {
            destination_spreadsheet_id: Some(destination_spreadsheet_id.to_string()),
        };
        let hub = &self.hub;

        // A copy is not idempotent: a retried request that had already landed
        // would leave a second copy behind.
        let (_, properties) = with_backoff(&RetryPolicy::immediate(1), "sheets_copy_to", move || {
            let request = request.clone();
            async move {
                hub.spreadsheets()
                    .sheets_copy_to(request, spreadsheet_id, sheet_id)
                    .doit()
                    .await
                    .map_err(gateway_report)
            }
        })
        .await
        .attach_printable_lazy(|| {
            format!(
                "Failed to copy sheet {} of {} into {}",
                sheet_id, spreadsheet_id, destination_spreadsheet_id
            )
        })?;

        properties
            .sheet_id
            .ok_or(error_stack::report!(SheetGatewayError::MalformedResponse(
                "copied sheet has no id"
            )))
    }
}
