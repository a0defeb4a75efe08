use roster_sync_core::{
    adapters::{config::app_config::AppConfig, sheets::spreadsheet_manager::SpreadsheetManager},
    application::{
        roster_sync::RosterSync,
        routines::{backup_routine::BackupRoutine, merge_routine::MergeRoutine},
        service::RosterSyncApplicationService,
    },
    ports::{application_service::ApplicationService, routine::Routine, sheet_gateway::SheetGateway},
};

use std::sync::Arc;

pub struct ApplicationServiceFactory;

impl ApplicationServiceFactory {
    pub async fn create(
        config: &AppConfig,
        dry_run: bool,
    ) -> Result<Arc<dyn ApplicationService>, Box<dyn std::error::Error>> {
        let routines = Self::create_routines(config, dry_run).await?;
        let app_service = RosterSyncApplicationService::new(routines);
        Ok(Arc::new(app_service))
    }

    async fn create_routines(
        config: &AppConfig,
        dry_run: bool,
    ) -> Result<Vec<Box<dyn Routine>>, Box<dyn std::error::Error>> {
        let spreadsheet_manager: Arc<dyn SheetGateway> = Arc::new(
            SpreadsheetManager::new(&config.credentials, config.retry.clone())
                .await
                .map_err(|report| format!("{:?}", report))?,
        );

        let mut routines: Vec<Box<dyn Routine>> = Vec::new();
        if config.backup.enabled && !dry_run {
            routines.push(Box::new(BackupRoutine::new(
                Arc::clone(&spreadsheet_manager),
                config,
            )));
        }
        routines.push(Box::new(MergeRoutine::new(
            RosterSync::new(Arc::clone(&spreadsheet_manager), config),
            dry_run,
        )));

        Ok(routines)
    }
}
