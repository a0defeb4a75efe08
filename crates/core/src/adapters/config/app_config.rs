use config::{Config, Environment};
use error_stack::{report, ResultExt};
use serde::Deserialize;
use serde_path_to_error::{Deserializer as PathDeserializer, Segment, Track};
use thiserror::Error;

use crate::domain::roster::FieldMapping;

use super::{
    retry_config::RetryPolicy,
    sheets_config::{BackupConfig, CredentialsConfig, FormSheetConfig, ManagementSheetConfig},
};

pub const CONFIG_PATH_VAR: &str = "CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "Config";
pub const ENV_PREFIX: &str = "ROSTER_SYNC";

#[derive(Deserialize, Debug, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub credentials: CredentialsConfig,
    pub form: FormSheetConfig,
    pub management: ManagementSheetConfig,
    pub mappings: Vec<FieldMapping>,
    #[serde(default)]
    pub backup: BackupConfig,
    #[serde(default)]
    pub retry: RetryPolicy,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("[CONFIG ERROR] Error reading config file '{0}'")]
    Read(String),
    #[error("[CONFIG ERROR] Failed to deserialize config at field '{0}'")]
    Deserialize(String),
    #[error("[CONFIG ERROR] Invalid configuration: {0}")]
    Invalid(String),
}

impl AppConfig {
    /// Loads the file named by `CONFIG_PATH` (default `Config`, any extension the
    /// `config` crate understands) and overlays `ROSTER_SYNC__SECTION__KEY`
    /// environment variables.
    pub fn load() -> error_stack::Result<Self, ConfigError> {
        let config_path =
            std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let config = Config::builder()
            .add_source(config::File::with_name(&config_path))
            .add_source(environment())
            .build()
            .change_context_lazy(|| ConfigError::Read(config_path.clone()))?;

        Self::from_config(config)
            .attach_printable_lazy(|| format!("Config file: {}", config_path))
    }

    pub fn from_config(config: Config) -> error_stack::Result<Self, ConfigError> {
        let value = config
            .try_deserialize::<serde_json::Value>()
            .change_context(ConfigError::Deserialize(String::from("<root>")))?;

        use serde::de::IntoDeserializer;
        let mut track = Track::new();
        let path_de = PathDeserializer::new(value.into_deserializer(), &mut track);
        let app_config = match AppConfig::deserialize(path_de) {
            Ok(app_config) => app_config,
            Err(e) => {
                let path_str = track
                    .path()
                    .iter()
                    .map(|seg| match seg {
                        Segment::Seq { index } => format!("[{}]", index),
                        Segment::Map { key } => format!(".{}", key),
                        Segment::Enum { variant } => format!("::{}", variant),
                        Segment::Unknown => String::from("<?>"),
                    })
                    .collect::<String>();
                return Err(report!(ConfigError::Deserialize(
                    path_str.trim_start_matches('.').to_string()
                )))
                .attach_printable(e.to_string())
                .attach_printable(
                    "Make sure all required fields are present in the configuration file.",
                );
            }
        };

        app_config.validate()?;
        Ok(app_config)
    }

    fn validate(&self) -> error_stack::Result<(), ConfigError> {
        if self.mappings.is_empty() {
            return Err(report!(ConfigError::Invalid(
                "at least one [[mappings]] entry is required".to_string()
            )));
        }
        if self.form.header_row == 0 || self.management.header_row == 0 {
            return Err(report!(ConfigError::Invalid(
                "header_row is one-based and must be at least 1".to_string()
            )));
        }
        if self.retry.max_attempts == 0 {
            return Err(report!(ConfigError::Invalid(
                "retry.max_attempts must be at least 1".to_string()
            )));
        }
        if self.credentials.service_account_key_path.is_none()
            && self.credentials.service_account_key_base64.is_none()
        {
            return Err(report!(ConfigError::Invalid(
                "set credentials.service_account_key_path or credentials.service_account_key_base64"
                    .to_string()
            )));
        }
        Ok(())
    }
}

/// `ROSTER_SYNC__FORM__SPREADSHEET_ID` overrides `form.spreadsheet_id`.
fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::roster::MergePolicy;
    use config::{File, FileFormat};

    const FULL: &str = r#"
        [credentials]
        service_account_key_path = "credentials.json"

        [form]
        spreadsheet_id = "form-id"
        sheet_name = "설문지 응답 시트1"
        timestamp_column = "타임스탬프"

        [management]
        spreadsheet_id = "admin-id"
        sheet_name = "관리시트"
        updated_at_column = "최종 갱신"

        [[mappings]]
        source = "이름"
        target = "이름"

        [[mappings]]
        source = "네이버카페 닉네임"
        target = "카페 닉네임"
        policy = "union"
        optional = true

        [backup]
        enabled = true
    "#;

    fn parse(toml: &str) -> error_stack::Result<AppConfig, ConfigError> {
        let config = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap();
        AppConfig::from_config(config)
    }

    #[test]
    fn test_full_config_with_defaults() {
        let config = parse(FULL).unwrap();
        assert_eq!(config.form.header_row, 1);
        assert_eq!(config.form.building_column, "동");
        assert_eq!(config.management.header_row, 3);
        assert_eq!(config.management.unit_column, "호수");
        assert_eq!(config.mappings.len(), 2);
        assert_eq!(config.mappings[0].policy, MergePolicy::LastWriteWins);
        assert_eq!(config.mappings[1].policy, MergePolicy::Union);
        assert!(config.mappings[1].optional);
        assert!(config.backup.enabled);
        assert_eq!(config.backup.sheet_name, "Form_Responses(백업)");
        assert_eq!(config.retry, RetryPolicy::default());
    }

    #[test]
    fn test_environment_overrides_file() {
        let variables = config::Map::from([
            (
                "ROSTER_SYNC__CREDENTIALS__SERVICE_ACCOUNT_KEY_BASE64".to_string(),
                "c2VjcmV0".to_string(),
            ),
            (
                "ROSTER_SYNC__MANAGEMENT__SPREADSHEET_ID".to_string(),
                "admin-from-env".to_string(),
            ),
        ]);
        let config = Config::builder()
            .add_source(File::from_str(FULL, FileFormat::Toml))
            .add_source(environment().source(Some(variables)))
            .build()
            .unwrap();

        let config = AppConfig::from_config(config).unwrap();
        assert_eq!(
            config.credentials.service_account_key_base64.as_deref(),
            Some("c2VjcmV0")
        );
        assert_eq!(config.management.spreadsheet_id, "admin-from-env");
        assert_eq!(config.form.spreadsheet_id, "form-id");
    }

    #[test]
    fn test_missing_field_reports_path() {
        let broken = FULL.replace("spreadsheet_id = \"admin-id\"", "");
        let report = parse(&broken).unwrap_err();
        match report.current_context() {
            ConfigError::Deserialize(path) => assert_eq!(path, "management"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_credentials_is_invalid() {
        let broken = FULL.replace("service_account_key_path = \"credentials.json\"", "");
        let report = parse(&broken).unwrap_err();
        assert!(matches!(report.current_context(), ConfigError::Invalid(_)));
    }

    #[test]
    fn test_debug_redacts_inline_key() {
        let credentials = CredentialsConfig {
            service_account_key_path: None,
            service_account_key_base64: Some("c2VjcmV0".to_string()),
        };
        let debug = format!("{credentials:?}");
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("c2VjcmV0"));
    }
}
