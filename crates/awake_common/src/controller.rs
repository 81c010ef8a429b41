//! Duration controller: one interruptible wait per invocation.

use crate::policy::RunPolicy;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    DeadlineReached,
    Cancelled,
}

/// Block until the policy's window ends or `cancel` fires, whichever comes first.
pub async fn wait(policy: RunPolicy, cancel: &CancellationToken) -> WaitOutcome {
    match policy.seconds() {
        None => {
            debug!("Waiting until cancelled");
            cancel.cancelled().await;
            WaitOutcome::Cancelled
        }
        Some(secs) => {
            // a deadline past the clock's range is never reached
            let Some(deadline) = Instant::now().checked_add(Duration::from_secs(secs)) else {
                debug!("{}s is beyond the clock range, waiting until cancelled", secs);
                cancel.cancelled().await;
                return WaitOutcome::Cancelled;
            };
            debug!("Waiting {}s or until cancelled", secs);
            tokio::select! {
                // a token cancelled before the wait starts wins over a zero deadline
                biased;
                _ = cancel.cancelled() => WaitOutcome::Cancelled,
                _ = tokio::time::sleep_until(deadline) => WaitOutcome::DeadlineReached,
            }
        }
    }
}
