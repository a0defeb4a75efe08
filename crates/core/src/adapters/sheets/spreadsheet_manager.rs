use std::{collections::HashMap, fmt::Debug};

use error_stack::{report, Report, ResultExt};
use google_sheets4::{
    api::{DeleteSheetRequest, Request, SheetProperties, UpdateSheetPropertiesRequest, ValueRange},
    FieldMask, Sheets,
};
use tokio::sync::RwLock;
use tracing::instrument;

use crate::adapters::config::{retry_config::RetryPolicy, sheets_config::CredentialsConfig};
use crate::domain::sheets::{
    a1_notation::{CellBlock, RowsFrom, ToA1Notation},
    row::Row,
};
use crate::ports::sheet_gateway::{RangeWrite, SheetGateway, SheetGatewayError, SheetRef};

use super::{
    auth,
    http_client::{self, HttpsConnector},
    spreadsheet_read::SpreadsheetRead,
    spreadsheet_write::SpreadsheetWrite,
    value_range_factory::ValueRangeFactory,
};

/// [`SheetGateway`] backed by the Google Sheets v4 API.
pub struct SpreadsheetManager {
    pub(super) hub: Sheets<HttpsConnector>,
    pub(super) retry: RetryPolicy,
    /// spreadsheet id → `(sheet id, title)` of its worksheets.
    sheet_cache: RwLock<HashMap<String, Vec<(i32, String)>>>,
}

impl Debug for SpreadsheetManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SpreadsheetManager {{ retry: {:?} }}", self.retry)
    }
}

/// Maps an API error onto the gateway's failure categories, keeping the original
/// error at the bottom of the report.
pub(super) fn gateway_report(error: google_sheets4::Error) -> Report<SheetGatewayError> {
    let context = classify(&error);
    Report::new(error).change_context(context)
}

fn classify(error: &google_sheets4::Error) -> SheetGatewayError {
    use google_sheets4::Error;

    match error {
        Error::MissingToken(_) | Error::MissingAPIKey => SheetGatewayError::Authentication,
        Error::HttpError(_) | Error::Io(_) => SheetGatewayError::Transient,
        Error::BadRequest(body) => body
            .pointer("/error/code")
            .and_then(serde_json::Value::as_u64)
            .and_then(|code| u16::try_from(code).ok())
            .map(classify_status)
            .unwrap_or(SheetGatewayError::Rejected),
        Error::Failure(response) => classify_status(response.status().as_u16()),
        _ => SheetGatewayError::Rejected,
    }
}

fn classify_status(status: u16) -> SheetGatewayError {
    match status {
        401 => SheetGatewayError::Authentication,
        403 => SheetGatewayError::PermissionDenied,
        404 => SheetGatewayError::NotFound,
        408 | 429 => SheetGatewayError::RateLimited,
        500..=599 => SheetGatewayError::Transient,
        _ => SheetGatewayError::Rejected,
    }
}

impl SpreadsheetManager {
    #[instrument(name = "SpreadsheetManager::new", skip(credentials))]
    pub async fn new(
        credentials: &CredentialsConfig,
        retry: RetryPolicy,
    ) -> error_stack::Result<Self, SheetGatewayError> {
        let client = http_client::http_client()?;
        let auth = auth::auth(credentials, client.clone()).await?;
        let hub = Sheets::new(client, auth);

        Ok(SpreadsheetManager {
            hub,
            retry,
            sheet_cache: RwLock::new(HashMap::new()),
        })
    }

    async fn sheet_properties(
        &self,
        spreadsheet_id: &str,
        refresh: bool,
    ) -> error_stack::Result<Vec<(i32, String)>, SheetGatewayError> {
        if !refresh {
            // -- LOCK READ --
            if let Some(properties) = self.sheet_cache.read().await.get(spreadsheet_id) {
                return Ok(properties.clone());
            }
        }

        let properties = self.fetch_sheet_properties(spreadsheet_id).await?;

        // -- LOCK WRITE --
        self.sheet_cache
            .write()
            .await
            .insert(spreadsheet_id.to_string(), properties.clone());

        Ok(properties)
    }

    async fn invalidate(&self, spreadsheet_id: &str) {
        self.sheet_cache.write().await.remove(spreadsheet_id);
    }
}

#[async_trait::async_trait]
impl SheetGateway for SpreadsheetManager {
    #[instrument(skip(self))]
    async fn read_rows(
        &self,
        sheet: &SheetRef,
        first_row: Row,
    ) -> error_stack::Result<Vec<Vec<String>>, SheetGatewayError> {
        let range = RowsFrom(first_row).to_a1_notation(Some(&sheet.title));
        self.read_range(&sheet.spreadsheet_id, &range).await
    }

    #[instrument(skip(self, writes), fields(ranges = writes.len()))]
    async fn write_ranges(
        &self,
        sheet: &SheetRef,
        writes: &[RangeWrite],
    ) -> error_stack::Result<(), SheetGatewayError> {
        if writes.is_empty() {
            return Ok(());
        }

        let data = writes
            .iter()
            .map(|write| {
                let block = CellBlock {
                    start: write.start,
                    width: write.rows.iter().map(Vec::len).max().unwrap_or(1),
                    height: write.rows.len(),
                };
                ValueRange::from_rows(&block.to_a1_notation(Some(&sheet.title)), &write.rows)
            })
            .collect::<Vec<_>>();

        self.write_value_ranges(&sheet.spreadsheet_id, data).await
    }

    #[instrument(skip(self))]
    async fn find_sheet_id(
        &self,
        spreadsheet_id: &str,
        title: &str,
    ) -> error_stack::Result<Option<i32>, SheetGatewayError> {
        let properties = self.sheet_properties(spreadsheet_id, false).await?;
        Ok(properties
            .into_iter()
            .find(|(_, sheet_title)| sheet_title == title)
            .map(|(sheet_id, _)| sheet_id))
    }

    #[instrument(skip(self))]
    async fn copy_sheet(
        &self,
        source: &SheetRef,
        destination_spreadsheet_id: &str,
    ) -> error_stack::Result<i32, SheetGatewayError> {
        let source_id = self
            .find_sheet_id(&source.spreadsheet_id, &source.title)
            .await?
            .ok_or(report!(SheetGatewayError::NotFound))
            .attach_printable_lazy(|| format!("Worksheet {} not found", source))?;

        let copied = self
            .copy_sheet_to(&source.spreadsheet_id, source_id, destination_spreadsheet_id)
            .await?;
        self.invalidate(destination_spreadsheet_id).await;
        Ok(copied)
    }

    #[instrument(skip(self))]
    async fn sheet_exists(
        &self,
        spreadsheet_id: &str,
        sheet_id: i32,
    ) -> error_stack::Result<bool, SheetGatewayError> {
        let properties = self.sheet_properties(spreadsheet_id, true).await?;
        Ok(properties.iter().any(|(id, _)| *id == sheet_id))
    }

    #[instrument(skip(self))]
    async fn delete_sheet(
        &self,
        spreadsheet_id: &str,
        sheet_id: i32,
    ) -> error_stack::Result<(), SheetGatewayError> {
        let request = Request {
            delete_sheet: Some(DeleteSheetRequest {
                sheet_id: Some(sheet_id),
            }),
            ..Default::default()
        };

        let result = self.update_sheets(spreadsheet_id, vec![request]).await;
        self.invalidate(spreadsheet_id).await;
        result
    }

    #[instrument(skip(self))]
    async fn rename_sheet(
        &self,
        spreadsheet_id: &str,
        sheet_id: i32,
        title: &str,
    ) -> error_stack::Result<(), SheetGatewayError> {
        let request = Request {
            update_sheet_properties: Some(UpdateSheetPropertiesRequest {
                properties: Some(SheetProperties {
                    sheet_id: Some(sheet_id),
                    title: Some(title.to_string()),
                    ..Default::default()
                }),
                fields: Some(FieldMask::new(&["title"])),
            }),
            ..Default::default()
        };

        let result = self.update_sheets(spreadsheet_id, vec![request]).await;
        self.invalidate(spreadsheet_id).await;
        result
    }
}
