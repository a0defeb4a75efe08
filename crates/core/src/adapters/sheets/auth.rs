use base64::{engine::general_purpose::STANDARD, Engine};
use error_stack::{report, ResultExt};
use google_sheets4::hyper;
use google_sheets4::oauth2::{self, authenticator::Authenticator};
use tracing::instrument;

use crate::adapters::config::sheets_config::CredentialsConfig;
use crate::ports::sheet_gateway::SheetGatewayError;

use super::http_client::HttpsConnector;

#[instrument(skip(client))]
pub async fn auth(
    config: &CredentialsConfig,
    client: hyper::Client<HttpsConnector>,
) -> error_stack::Result<Authenticator<HttpsConnector>, SheetGatewayError> {
    let secret = load_service_account_key(config).await?;

    oauth2::ServiceAccountAuthenticator::with_client(secret, client)
        .build()
        .await
        .change_context(SheetGatewayError::Authentication)
        .attach_printable("could not create a service account authenticator")
}

async fn load_service_account_key(
    config: &CredentialsConfig,
) -> error_stack::Result<oauth2::ServiceAccountKey, SheetGatewayError> {
    match (
        &config.service_account_key_base64,
        &config.service_account_key_path,
    ) {
        (Some(encoded), _) => {
            tracing::debug!("🔑 Using inline base64 service account key");
            decode_service_account_key(encoded)
        }
        (None, Some(path)) => oauth2::read_service_account_key(path)
            .await
            .change_context(SheetGatewayError::Authentication)
            .attach_printable_lazy(|| {
                format!("could not read service account private key at '{}'", path)
            }),
        (None, None) => Err(report!(SheetGatewayError::Authentication))
            .attach_printable("no service account key configured"),
    }
}

/// Decodes the base64 key blob. Line breaks from wrapped encoders are ignored.
pub fn decode_service_account_key(
    encoded: &str,
) -> error_stack::Result<oauth2::ServiceAccountKey, SheetGatewayError> {
    let compact = encoded.split_whitespace().collect::<String>();
    let decoded = STANDARD
        .decode(compact.as_bytes())
        .change_context(SheetGatewayError::Authentication)
        .attach_printable("service account key is not valid base64")?;

    oauth2::parse_service_account_key(decoded)
        .change_context(SheetGatewayError::Authentication)
        .attach_printable("decoded service account key is not a valid key file")
}
