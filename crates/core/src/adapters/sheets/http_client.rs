use error_stack::ResultExt;
use google_sheets4::{hyper, hyper_rustls};
use hyper_rustls::{builderstates::WantsSchemes, HttpsConnectorBuilder};

use crate::ports::sheet_gateway::SheetGatewayError;

pub type HttpsConnector = hyper_rustls::HttpsConnector<hyper::client::HttpConnector>;

/// HTTPS client trusting the platform's root certificates.
pub fn http_client() -> error_stack::Result<hyper::Client<HttpsConnector>, SheetGatewayError> {
    client_with_roots(HttpsConnectorBuilder::new().with_native_roots())
}

fn client_with_roots(
    roots: std::io::Result<HttpsConnectorBuilder<WantsSchemes>>,
) -> error_stack::Result<hyper::Client<HttpsConnector>, SheetGatewayError> {
    let connector = roots
        .change_context(SheetGatewayError::Transient)
        .attach_printable("could not load native root certificates")?
        .https_or_http()
        .enable_http1()
        .build();

    Ok(hyper::Client::builder().build(connector))
}
