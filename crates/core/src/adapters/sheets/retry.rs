use std::future::Future;

use crate::adapters::config::retry_config::RetryPolicy;
use crate::ports::sheet_gateway::SheetGatewayError;

/// Runs `attempt` until it succeeds, fails with a non-transient error, or the
/// policy's attempt budget is spent. Exhaustion is reported as
/// [`SheetGatewayError::RetriesExhausted`] on top of the last failure.
pub async fn with_backoff<T, F, Fut>(
    policy: &RetryPolicy,
    operation: &str,
    mut attempt: F,
) -> error_stack::Result<T, SheetGatewayError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = error_stack::Result<T, SheetGatewayError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempts = 0;

    loop {
        attempts += 1;
        let report = match attempt().await {
            Ok(value) => return Ok(value),
            Err(report) => report,
        };

        if !report.current_context().is_transient() {
            return Err(report);
        }

        if attempts >= max_attempts {
            tracing::error!(
                "❌ {}: giving up after {} attempts ({})",
                operation,
                attempts,
                report.current_context()
            );
            return Err(report.change_context(SheetGatewayError::RetriesExhausted { attempts }));
        }

        let delay = policy.delay_for(attempts);
        tracing::warn!(
            "🔁 {}: {} (attempt {}/{}), retrying in {:?}",
            operation,
            report.current_context(),
            attempts,
            max_attempts,
            delay
        );
        tokio::time::sleep(delay).await;
    }
}
