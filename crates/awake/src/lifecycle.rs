//! Lifecycle coordinator: start the assertion, wait, always stop.

use awake_common::{
    controller, AssertionManager, AwakeError, PowerInterface, RunPolicy, WaitOutcome,
    EXIT_FAILURE, EXIT_SUCCESS, EXIT_USAGE,
};
use chrono::Local;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// How one invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Deadline reached, or nothing to do
    Success,
    /// Stopped by a signal after releasing
    InterruptedCleanly,
    AcquisitionFailed,
    UsageError,
    Failed,
}

impl ExitStatus {
    pub fn code(&self) -> i32 {
        match self {
            ExitStatus::Success | ExitStatus::InterruptedCleanly => EXIT_SUCCESS,
            ExitStatus::UsageError => EXIT_USAGE,
            ExitStatus::AcquisitionFailed | ExitStatus::Failed => EXIT_FAILURE,
        }
    }

    pub fn for_error(err: &AwakeError) -> Self {
        match err {
            AwakeError::Usage(_) => ExitStatus::UsageError,
            AwakeError::Acquisition(_) => ExitStatus::AcquisitionFailed,
            AwakeError::Config(_) | AwakeError::Runtime(_) => ExitStatus::Failed,
        }
    }
}

/// Owns the assertion manager for the whole run.
///
/// The manager is released by `run` on the normal paths and by its `Drop` on
/// every other one (panic, future dropped mid-wait).
pub struct Coordinator {
    manager: AssertionManager,
    reason: String,
    quiet: bool,
}

impl Coordinator {
    pub fn new(power: Box<dyn PowerInterface>, reason: impl Into<String>) -> Self {
        Self {
            manager: AssertionManager::new(power),
            reason: reason.into(),
            quiet: false,
        }
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn manager(&self) -> &AssertionManager {
        &self.manager
    }

    pub async fn run(
        &mut self,
        policy: RunPolicy,
        cancel: &CancellationToken,
    ) -> Result<ExitStatus, AwakeError> {
        if policy.is_immediate() {
            info!("Zero-length window, nothing to inhibit");
            return Ok(ExitStatus::Success);
        }

        if let Err(e) = self.manager.start(&self.reason) {
            debug!("{} backend refused the assertion", self.manager.backend_name());
            return Err(AwakeError::Acquisition(e));
        }
        self.report(policy);

        let outcome = controller::wait(policy, cancel).await;
        self.manager.stop();

        match outcome {
            WaitOutcome::DeadlineReached => {
                info!("Deadline reached, assertion released");
                Ok(ExitStatus::Success)
            }
            WaitOutcome::Cancelled => {
                info!("Cancelled, assertion released");
                Ok(ExitStatus::InterruptedCleanly)
            }
        }
    }

    fn report(&self, policy: RunPolicy) {
        if self.quiet {
            return;
        }
        match (policy.seconds(), policy.deadline_from(Local::now().naive_local())) {
            (_, Some(deadline)) => {
                eprintln!("awake until {}", deadline.format("%Y-%m-%d %H:%M:%S"))
            }
            (Some(secs), None) => eprintln!("awake for {}s", secs),
            (None, None) => eprintln!("awake until interrupted"),
        }
    }
}
