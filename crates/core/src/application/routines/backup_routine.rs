use std::sync::Arc;

use error_stack::{report, ResultExt};
use tracing::instrument;

use crate::adapters::config::{app_config::AppConfig, retry_config::RetryPolicy};
use crate::application::sync_error::{GatewayResultExt, SyncError};
use crate::ports::routine::{Routine, RoutineError};
use crate::ports::sheet_gateway::{SheetGateway, SheetRef};

use super::RoutineKind;

/// Copies the form response sheet into the management spreadsheet under a
/// fixed title, replacing the previous copy.
pub struct BackupRoutine {
    gateway: Arc<dyn SheetGateway>,
    source: SheetRef,
    destination_spreadsheet_id: String,
    title: String,
    poll: RetryPolicy,
}

impl BackupRoutine {
    pub fn new(gateway: Arc<dyn SheetGateway>, config: &AppConfig) -> Self {
        Self {
            gateway,
            source: config.form.sheet_ref(),
            destination_spreadsheet_id: config.management.spreadsheet_id.clone(),
            title: config.backup.sheet_name.clone(),
            poll: RetryPolicy {
                max_attempts: 5,
                initial_delay_ms: 1_000,
                max_delay_ms: 1_000,
            },
        }
    }

    /// How long to wait for a fresh copy to become visible.
    pub fn with_poll_policy(mut self, poll: RetryPolicy) -> Self {
        self.poll = poll;
        self
    }

    fn backup_error(&self) -> SyncError {
        SyncError::Backup {
            sheet: self.source.to_string(),
        }
    }

    #[instrument(skip(self), fields(source = %self.source, title = %self.title))]
    async fn backup(&self) -> error_stack::Result<i32, SyncError> {
        let destination = self.destination_spreadsheet_id.as_str();

        let copy_id = self
            .gateway
            .copy_sheet(&self.source, destination)
            .await
            .into_sync_error(|| self.backup_error())?;
        tracing::trace!("📄 Copied {} as sheet {}", self.source, copy_id);

        let previous = self
            .gateway
            .find_sheet_id(destination, &self.title)
            .await
            .into_sync_error(|| self.backup_error())?;
        if let Some(previous) = previous.filter(|&id| id != copy_id) {
            tracing::info!("🗑️ Removing previous backup '{}' (sheet {})", self.title, previous);
            self.gateway
                .delete_sheet(destination, previous)
                .await
                .into_sync_error(|| self.backup_error())?;
        }

        self.wait_until_visible(copy_id).await?;

        self.gateway
            .rename_sheet(destination, copy_id, &self.title)
            .await
            .into_sync_error(|| self.backup_error())?;

        Ok(copy_id)
    }

    async fn wait_until_visible(&self, sheet_id: i32) -> error_stack::Result<(), SyncError> {
        let max_attempts = self.poll.max_attempts.max(1);
        for attempt in 1..=max_attempts {
            let visible = self
                .gateway
                .sheet_exists(&self.destination_spreadsheet_id, sheet_id)
                .await
                .into_sync_error(|| self.backup_error())?;
            if visible {
                return Ok(());
            }
            if attempt < max_attempts {
                let delay = self.poll.delay_for(attempt);
                tracing::debug!("⏳ Copied sheet {} not visible yet, waiting {:?}", sheet_id, delay);
                tokio::time::sleep(delay).await;
            }
        }

        Err(report!(self.backup_error())).attach_printable_lazy(|| {
            format!(
                "copied sheet {} did not appear after {} checks",
                sheet_id, max_attempts
            )
        })
    }
}

#[async_trait::async_trait]
impl Routine for BackupRoutine {
    fn name(&self) -> &str {
        let name: &'static str = RoutineKind::Backup.into();
        name
    }

    async fn run(&self) -> error_stack::Result<(), RoutineError> {
        let sheet_id = self
            .backup()
            .await
            .change_context_lazy(|| RoutineError::routine_failure("backing up form responses failed"))?;

        tracing::info!("💾 Backed up {} as '{}' (sheet {})", self.source, self.title, sheet_id);
        Ok(())
    }

    async fn check(&self) -> error_stack::Result<(), RoutineError> {
        let found = self
            .gateway
            .find_sheet_id(&self.source.spreadsheet_id, &self.source.title)
            .await
            .into_sync_error(|| self.backup_error())
            .change_context_lazy(|| RoutineError::routine_failure("backup source is unreachable"))?;

        match found {
            Some(_) => Ok(()),
            None => Err(report!(RoutineError::routine_failure(format!(
                "backup source {} does not exist",
                self.source
            )))),
        }
    }
}
