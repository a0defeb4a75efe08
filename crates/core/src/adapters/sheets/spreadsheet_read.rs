use error_stack::ResultExt;
use tracing::instrument;

use crate::domain::sheets::a1_notation::A1Notation;

use super::{
    retry::with_backoff,
    spreadsheet_manager::{gateway_report, SpreadsheetManager},
    value_range_factory::IntoCells,
};
use crate::ports::sheet_gateway::SheetGatewayError;

pub trait SpreadsheetRead {
    fn read_range(
        &self,
        spreadsheet_id: &str,
        range: &A1Notation,
    ) -> impl std::future::Future<
        Output = error_stack::Result<Vec<Vec<String>>, SheetGatewayError>,
    > + Send;

    /// `(sheet id, title)` of every worksheet in the spreadsheet.
    fn fetch_sheet_properties(
        &self,
        spreadsheet_id: &str,
    ) -> impl std::future::Future<Output = error_stack::Result<Vec<(i32, String)>, SheetGatewayError>>
           + Send;
}

impl SpreadsheetRead for SpreadsheetManager {
    #[instrument(skip(self))]
    async fn read_range(
        &self,
        spreadsheet_id: &str,
        range: &A1Notation,
    ) -> error_stack::Result<Vec<Vec<String>>, SheetGatewayError> {
        let hub = &self.hub;
        let range_str = range.as_ref();

        let (_, value_range) = with_backoff(&self.retry, "values_get", move || async move {
            hub.spreadsheets()
                .values_get(spreadsheet_id, range_str)
                .value_render_option("FORMATTED_VALUE")
                .doit()
                .await
                .map_err(gateway_report)
        })
        .await
        .attach_printable_lazy(|| format!("Failed to read range {}", range))?;

        // The API omits `values` entirely for an empty range.
        Ok(value_range.values.unwrap_or_default().into_cells())
    }

    #[instrument(skip(self))]
    async fn fetch_sheet_properties(
        &self,
        spreadsheet_id: &str,
    ) -> error_stack::Result<Vec<(i32, String)>, SheetGatewayError> {
        let hub = &self.hub;

        let (_, spreadsheet) = with_backoff(&self.retry, "spreadsheets_get", move || async move {
            hub.spreadsheets()
                .get(spreadsheet_id)
                .param("fields", "sheets.properties(sheetId,title)")
                .doit()
                .await
                .map_err(gateway_report)
        })
        .await
        .attach_printable_lazy(|| format!("Failed to fetch spreadsheet {}", spreadsheet_id))?;

        let properties = spreadsheet
            .sheets
            .unwrap_or_default()
            .into_iter()
            .filter_map(|sheet| {
                let properties = sheet.properties?;
                Some((properties.sheet_id?, properties.title?))
            })
            .collect();

        Ok(properties)
    }
}
