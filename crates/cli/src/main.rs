use roster_sync_core::adapters::config::app_config::AppConfig;
use roster_sync_core::prettyprint::PrettyFormatter;
use std::env;
use std::sync::Arc;
use tracing::{error, info, instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Registry};

mod application_service_factory;
mod cli_adapter;

use application_service_factory::ApplicationServiceFactory;
use cli_adapter::{CliAdapter, CliArgs};

const LOG_FILE: &str = "roster_sync.log";

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_tracing()?;
    setup_panic_hook();

    let args = CliArgs::parse(env::args().collect())?;

    info!("Starting roster-sync CLI");

    let config = AppConfig::load().map_err(|report| format!("{:?}", report))?;
    let app_service = ApplicationServiceFactory::create(&config, args.dry_run).await?;
    let cli_adapter = Arc::new(CliAdapter::new(app_service));

    match cli_adapter.run(args.command).await {
        Ok(_) => {
            info!("CLI execution completed successfully");
            Ok(())
        }
        Err(e) => {
            error!("CLI execution failed: {:?}", e);
            Err(e)
        }
    }
}

fn setup_tracing() -> Result<(), Box<dyn std::error::Error>> {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .event_format(PrettyFormatter::new(true))
        .with_writer(std::io::stderr);

    let log_file_layer = tracing_subscriber::fmt::layer()
        .event_format(PrettyFormatter::new(false))
        .with_writer(std::fs::File::create(LOG_FILE)?)
        .with_ansi(false);

    let targets = match env::var("RUST_LOG") {
        Ok(directives) => directives.parse::<tracing_subscriber::filter::Targets>()?,
        Err(_) => tracing_subscriber::filter::Targets::new()
            .with_target("roster_sync_cli", tracing::Level::DEBUG)
            .with_target("roster_sync_core", tracing::Level::DEBUG),
    };

    Registry::default()
        .with(targets)
        .with(log_file_layer)
        .with(stderr_layer)
        .init();

    Ok(())
}

fn setup_panic_hook() {
    tracing::trace!("Setting panic hook");
    std::panic::set_hook(Box::new(|info| {
        tracing::error!("panic: {info}");
    }));
}
