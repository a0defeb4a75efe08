use serde::Deserialize;

use crate::ports::sheet_gateway::SheetRef;

/// Service account key, given either as a file path or inline as base64.
/// The inline blob wins when both are set.
#[derive(Deserialize, Clone, Default)]
pub struct CredentialsConfig {
    pub service_account_key_path: Option<String>,
    pub service_account_key_base64: Option<String>,
}

impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("service_account_key_path", &self.service_account_key_path)
            .field(
                "service_account_key_base64",
                &self.service_account_key_base64.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct FormSheetConfig {
    pub spreadsheet_id: String,
    pub sheet_name: String,
    #[serde(default = "default_form_header_row")]
    pub header_row: u32,
    #[serde(default = "default_building_column")]
    pub building_column: String,
    #[serde(default = "default_unit_column")]
    pub unit_column: String,
    pub timestamp_column: Option<String>,
}

impl FormSheetConfig {
    pub fn sheet_ref(&self) -> SheetRef {
        SheetRef::new(self.spreadsheet_id.clone(), self.sheet_name.clone())
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct ManagementSheetConfig {
    pub spreadsheet_id: String,
    pub sheet_name: String,
    /// Row holding the column titles; data starts right below it.
    #[serde(default = "default_management_header_row")]
    pub header_row: u32,
    #[serde(default = "default_building_column")]
    pub building_column: String,
    #[serde(default = "default_unit_column")]
    pub unit_column: String,
    pub updated_at_column: Option<String>,
}

impl ManagementSheetConfig {
    pub fn sheet_ref(&self) -> SheetRef {
        SheetRef::new(self.spreadsheet_id.clone(), self.sheet_name.clone())
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct BackupConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_backup_sheet_name")]
    pub sheet_name: String,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            sheet_name: default_backup_sheet_name(),
        }
    }
}

fn default_form_header_row() -> u32 {
    1
}

fn default_management_header_row() -> u32 {
    3
}

fn default_building_column() -> String {
    "동".to_string()
}

fn default_unit_column() -> String {
    "호수".to_string()
}

fn default_backup_sheet_name() -> String {
    "Form_Responses(백업)".to_string()
}
