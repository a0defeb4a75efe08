use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::instrument;

use crate::adapters::config::app_config::AppConfig;
use crate::domain::roster::{FormRecord, ManagementTable, UpsertOutcome};
use crate::ports::sheet_gateway::SheetGateway;

use super::{
    form_reader::FormSheetReader, management_sheet::ManagementSheet,
    record_mapper::RecordMapper, sync_error::SyncError,
};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MergeSummary {
    pub responses: usize,
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub written: bool,
}

impl std::fmt::Display for MergeSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} responses: {} inserted, {} updated, {} unchanged, {} skipped",
            self.responses, self.inserted, self.updated, self.unchanged, self.skipped
        )
    }
}

/// Read → map → merge → write, once.
pub struct RosterSync {
    form: FormSheetReader,
    mapper: RecordMapper,
    management: ManagementSheet,
}

impl RosterSync {
    pub fn new(gateway: Arc<dyn SheetGateway>, config: &AppConfig) -> Self {
        let mapper = RecordMapper::from_config(&config.form, &config.mappings);
        Self {
            form: FormSheetReader::new(Arc::clone(&gateway), &config.form, &mapper),
            management: ManagementSheet::new(gateway, &config.management, &config.mappings),
            mapper,
        }
    }

    /// Runs the whole pipeline. Both sheets are read in full before anything is
    /// written, and a dry run stops after the in-memory merge.
    #[instrument(skip(self))]
    pub async fn run(
        &self,
        now: DateTime<Utc>,
        dry_run: bool,
    ) -> error_stack::Result<MergeSummary, SyncError> {
        let records = self.form.read().await?;
        let mut table = self.management.load().await?;

        if records.is_empty() {
            tracing::warn!("⚠️ No responses in {}, skipping merge", self.form.sheet());
            return Ok(MergeSummary::default());
        }

        let mut summary = merge_records(&self.mapper, &mut table, &records, now);
        tracing::info!("📊 {}", summary);

        if dry_run {
            tracing::info!(
                "🧪 Dry run: {} left untouched (would write: {})",
                self.management.sheet(),
                table.has_changes()
            );
            return Ok(summary);
        }

        summary.written = self.management.save(&table).await?;
        Ok(summary)
    }

    /// Validates both sheets' headers without writing.
    pub async fn check(&self) -> error_stack::Result<(), SyncError> {
        self.form.check().await?;
        self.management.load().await.map(|_| ())
    }
}

/// Upserts every mappable record into `table` in source order. Rows whose unit
/// key is invalid are logged and counted as skipped.
pub fn merge_records(
    mapper: &RecordMapper,
    table: &mut ManagementTable,
    records: &[FormRecord],
    now: DateTime<Utc>,
) -> MergeSummary {
    let mut summary = MergeSummary {
        responses: records.len(),
        ..Default::default()
    };

    for record in records {
        let normalized = match mapper.map(record) {
            Ok(normalized) => normalized,
            Err(error) => {
                tracing::warn!("⏭️ Skipping {}", error);
                summary.skipped += 1;
                continue;
            }
        };

        let submitted_at = normalized.submitted_at.as_deref().unwrap_or("-");
        match table.upsert(&normalized, now) {
            UpsertOutcome::Inserted => {
                tracing::debug!(
                    "➕ {} (form row {}, submitted {})",
                    normalized.key,
                    normalized.source_row,
                    submitted_at
                );
                summary.inserted += 1;
            }
            UpsertOutcome::Updated => {
                tracing::debug!(
                    "✏️ {} (form row {}, submitted {})",
                    normalized.key,
                    normalized.source_row,
                    submitted_at
                );
                summary.updated += 1;
            }
            UpsertOutcome::Unchanged => summary.unchanged += 1,
        }
    }

    summary
}
