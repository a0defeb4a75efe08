pub mod app_config;
pub mod retry_config;
pub mod sheets_config;
