use crate::ports::routine::RoutineError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApplicationServiceError {
    #[error("Routine '{name}' not found")]
    RoutineNotFound { name: String },
    #[error("Routine execution failed: {details}")]
    RoutineExecutionFailed { details: String },
    #[error("Health check failed: {details}")]
    Unhealthy { details: String },
}

/// Outcome of one routine inside a full run.
#[derive(Debug)]
pub struct RoutineReport {
    pub name: String,
    pub result: error_stack::Result<(), RoutineError>,
}

#[async_trait::async_trait]
pub trait ApplicationService: Send + Sync {
    /// Runs every routine in order, stopping at the first failure. Routines after
    /// a failure are not started.
    async fn run_all_routines(
        &self,
    ) -> error_stack::Result<Vec<RoutineReport>, ApplicationServiceError>;

    async fn run_routine_by_name(
        &self,
        name: &str,
    ) -> error_stack::Result<(), ApplicationServiceError>;

    async fn list_available_routines(&self) -> Vec<String>;

    async fn health_check(&self) -> error_stack::Result<String, ApplicationServiceError>;
}
