use crate::ports::application_service::{
    ApplicationService, ApplicationServiceError, RoutineReport,
};
use crate::ports::routine::Routine;
use error_stack::report;
use tracing::{error, info, instrument, Instrument};

pub struct RosterSyncApplicationService {
    routines: Vec<Box<dyn Routine>>,
}

impl RosterSyncApplicationService {
    pub fn new(routines: Vec<Box<dyn Routine>>) -> Self {
        Self { routines }
    }
}

#[async_trait::async_trait]
impl ApplicationService for RosterSyncApplicationService {
    #[instrument(skip(self))]
    async fn run_all_routines(
        &self,
    ) -> error_stack::Result<Vec<RoutineReport>, ApplicationServiceError> {
        info!("Running {} routines sequentially", self.routines.len());

        let mut reports = Vec::with_capacity(self.routines.len());
        for (index, routine) in self.routines.iter().enumerate() {
            let result = routine
                .run()
                .instrument(tracing::span!(
                    tracing::Level::INFO,
                    "routine",
                    routine = routine.name(),
                    index = index,
                    len = self.routines.len()
                ))
                .await;

            let failed = result.is_err();
            match &result {
                Err(report) => error!("❌ {}: {:?}", routine.name(), report),
                Ok(()) => info!("✅ {}: OK", routine.name()),
            }

            reports.push(RoutineReport {
                name: routine.name().to_string(),
                result,
            });

            if failed {
                let skipped = self.routines.len() - index - 1;
                if skipped > 0 {
                    error!("⏹️ Skipping {} remaining routines", skipped);
                }
                break;
            }
        }

        Ok(reports)
    }

    #[instrument(skip(self))]
    async fn run_routine_by_name(
        &self,
        name: &str,
    ) -> error_stack::Result<(), ApplicationServiceError> {
        let routine = self
            .routines
            .iter()
            .find(|r| r.name() == name)
            .ok_or_else(|| {
                report!(ApplicationServiceError::RoutineNotFound {
                    name: name.to_string(),
                })
            })?;

        routine
            .run()
            .await
            .map_err(|e| ApplicationServiceError::RoutineExecutionFailed {
                details: format!("Routine '{}' failed: {:?}", name, e),
            })?;

        Ok(())
    }

    async fn list_available_routines(&self) -> Vec<String> {
        self.routines.iter().map(|r| r.name().to_string()).collect()
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> error_stack::Result<String, ApplicationServiceError> {
        let mut failures = Vec::new();
        for routine in &self.routines {
            if let Err(report) = routine.check().await {
                error!("❌ {} is not ready: {:?}", routine.name(), report);
                failures.push(format!("{}: {}", routine.name(), report.current_context()));
            }
        }

        if !failures.is_empty() {
            return Err(report!(ApplicationServiceError::Unhealthy {
                details: failures.join("; "),
            }));
        }

        let routine_names: Vec<String> = self.list_available_routines().await;
        Ok(format!(
            "🟢 Roster Sync Service - Healthy\n\
             Routines available: {}\n\
             Routine names: {}",
            routine_names.len(),
            routine_names.join(", ")
        ))
    }
}
