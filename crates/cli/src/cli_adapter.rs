use roster_sync_core::ports::application_service::ApplicationService;
use roster_sync_core::ports::command_handler::{Command, CommandError, CommandHandler};
use std::sync::Arc;
use tracing::{error, info, instrument};

const DRY_RUN_FLAG: &str = "--dry-run";

/// Parsed command line: `[run|run-routine <name>|list|health] [--dry-run]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub command: Command,
    pub dry_run: bool,
}

impl CliArgs {
    pub fn parse(args: Vec<String>) -> Result<Self, CommandError> {
        let dry_run = args.iter().any(|arg| arg == DRY_RUN_FLAG);
        let positional = args
            .iter()
            .skip(1)
            .filter(|arg| arg.as_str() != DRY_RUN_FLAG)
            .map(String::as_str)
            .collect::<Vec<_>>();

        if let Some(unknown) = positional.iter().find(|arg| arg.starts_with("--")) {
            return Err(CommandError::InvalidCommand {
                details: format!("Unknown flag '{}'", unknown),
            });
        }

        let command = match positional.first().copied() {
            None | Some("run") => Command::RunRoutines,
            Some("run-routine") => {
                let name = positional
                    .get(1)
                    .ok_or_else(|| CommandError::InvalidCommand {
                        details: "Routine name required".to_string(),
                    })?
                    .to_string();
                Command::RunSpecificRoutine { name }
            }
            Some("list") => Command::ListRoutines,
            Some("health") => Command::HealthCheck,
            Some(other) => {
                return Err(CommandError::InvalidCommand {
                    details: format!("Unknown command '{}'", other),
                })
            }
        };

        Ok(Self { command, dry_run })
    }
}

pub struct CliAdapter {
    application_service: Arc<dyn ApplicationService>,
}

impl std::fmt::Debug for CliAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CliAdapter")
            .field("application_service", &"<ApplicationService>")
            .finish()
    }
}

impl CliAdapter {
    pub fn new(application_service: Arc<dyn ApplicationService>) -> Self {
        Self {
            application_service,
        }
    }

    #[instrument]
    pub async fn run(&self, command: Command) -> Result<(), Box<dyn std::error::Error>> {
        match self.handle(command).await {
            Ok(result) => {
                info!("{}", result);
                Ok(())
            }
            Err(report) => {
                error!("Command failed: {:?}", report);
                Err(format!("Command failed: {}", report.current_context()).into())
            }
        }
    }
}

#[async_trait::async_trait]
impl CommandHandler for CliAdapter {
    #[instrument]
    async fn handle(&self, command: Command) -> error_stack::Result<String, CommandError> {
        match command {
            Command::RunRoutines => {
                let reports = self
                    .application_service
                    .run_all_routines()
                    .await
                    .map_err(|e| CommandError::ExecutionFailed {
                        details: format!("Failed to run routines: {:?}", e),
                    })?;

                let mut output = "\nRoutine Results:\n".to_string();
                let mut failed = Vec::new();
                for report in &reports {
                    match &report.result {
                        Ok(()) => output.push_str(&format!("✅ {}: OK\n", report.name)),
                        Err(error) => {
                            output.push_str(&format!("❌ {}: {:?}\n", report.name, error));
                            failed.push(report.name.clone());
                        }
                    }
                }

                if !failed.is_empty() {
                    error!("{}", output);
                    return Err(CommandError::ExecutionFailed {
                        details: format!("Routines failed: {}", failed.join(", ")),
                    }
                    .into());
                }

                output.push_str(&format!("\nSummary: {} routines completed", reports.len()));
                Ok(output)
            }
            Command::RunSpecificRoutine { name } => {
                self.application_service
                    .run_routine_by_name(&name)
                    .await
                    .map_err(|e| CommandError::ExecutionFailed {
                        details: format!("Failed to run routine {}: {:?}", name, e),
                    })?;

                Ok(format!("✅ Routine '{}' completed successfully", name))
            }
            Command::ListRoutines => {
                let routines = self.application_service.list_available_routines().await;
                Ok(format!("Available routines:\n{}", routines.join("\n")))
            }
            Command::HealthCheck => {
                let health = self.application_service.health_check().await.map_err(|e| {
                    CommandError::ExecutionFailed {
                        details: format!("Health check failed: {:?}", e),
                    }
                })?;

                Ok(health)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        std::iter::once("roster-sync-cli")
            .chain(values.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_defaults_to_run() {
        let parsed = CliArgs::parse(args(&[])).unwrap();
        assert_eq!(parsed.command, Command::RunRoutines);
        assert!(!parsed.dry_run);
    }

    #[test]
    fn test_dry_run_flag_anywhere() {
        let parsed = CliArgs::parse(args(&["--dry-run", "run-routine", "merge"])).unwrap();
        assert_eq!(
            parsed.command,
            Command::RunSpecificRoutine {
                name: "merge".to_string()
            }
        );
        assert!(parsed.dry_run);
    }

    #[test]
    fn test_rejects_unknown_input() {
        assert!(CliArgs::parse(args(&["run-routine"])).is_err());
        assert!(CliArgs::parse(args(&["prices"])).is_err());
        assert!(CliArgs::parse(args(&["run", "--sequential"])).is_err());
    }

    #[test]
    fn test_list_and_health() {
        assert_eq!(CliArgs::parse(args(&["list"])).unwrap().command, Command::ListRoutines);
        assert_eq!(CliArgs::parse(args(&["health"])).unwrap().command, Command::HealthCheck);
    }
}
