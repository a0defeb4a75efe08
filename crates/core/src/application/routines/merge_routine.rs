use chrono::Utc;
use error_stack::ResultExt;
use tracing::instrument;

use crate::application::roster_sync::RosterSync;
use crate::ports::routine::{Routine, RoutineError};

use super::RoutineKind;

/// Merges the form responses into the management sheet.
pub struct MergeRoutine {
    sync: RosterSync,
    dry_run: bool,
}

impl MergeRoutine {
    pub fn new(sync: RosterSync, dry_run: bool) -> Self {
        Self { sync, dry_run }
    }
}

#[async_trait::async_trait]
impl Routine for MergeRoutine {
    fn name(&self) -> &str {
        let name: &'static str = RoutineKind::Merge.into();
        name
    }

    #[instrument(skip(self), fields(dry_run = self.dry_run))]
    async fn run(&self) -> error_stack::Result<(), RoutineError> {
        let summary = self
            .sync
            .run(Utc::now(), self.dry_run)
            .await
            .change_context_lazy(|| RoutineError::routine_failure("merging form responses failed"))?;

        tracing::info!("✅ Merge finished: {}", summary);
        Ok(())
    }

    async fn check(&self) -> error_stack::Result<(), RoutineError> {
        self.sync
            .check()
            .await
            .change_context_lazy(|| RoutineError::routine_failure("sheets are not ready for a merge"))
    }
}
