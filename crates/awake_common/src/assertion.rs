//! Assertion manager: the single owner of the inhibition state.
//!
//! State machine: `Inactive --start--> Active --stop--> Inactive`.
//! Both transitions are idempotent, and dropping the manager stops it, so
//! every exit path gives the assertion back.

use crate::error::PlatformError;
use crate::platform::{AssertionHandle, PowerInterface};
use tracing::{debug, warn};

#[derive(Debug)]
pub enum AssertionState {
    Inactive,
    Active(AssertionHandle),
}

pub struct AssertionManager {
    power: Box<dyn PowerInterface>,
    state: AssertionState,
}

impl AssertionManager {
    pub fn new(power: Box<dyn PowerInterface>) -> Self {
        Self {
            power,
            state: AssertionState::Inactive,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.power.name()
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, AssertionState::Active(_))
    }

    pub fn state(&self) -> &AssertionState {
        &self.state
    }

    /// Take the inhibition if not already held.
    ///
    /// On failure the manager stays `Inactive`.
    pub fn start(&mut self, reason: &str) -> Result<(), PlatformError> {
        if self.is_active() {
            debug!("Assertion already active, start is a no-op");
            return Ok(());
        }

        let handle = self.power.acquire(reason)?;
        self.state = AssertionState::Active(handle);
        Ok(())
    }

    /// Give the inhibition back if held.
    ///
    /// Release failures are logged; the manager is `Inactive` afterwards either way.
    pub fn stop(&mut self) {
        match std::mem::replace(&mut self.state, AssertionState::Inactive) {
            AssertionState::Inactive => {
                debug!("Assertion inactive, stop is a no-op");
            }
            AssertionState::Active(handle) => {
                let id = handle.id();
                if let Err(e) = self.power.release(handle) {
                    warn!("Failed to release assertion #{}: {}", id, e);
                }
            }
        }
    }
}

impl Drop for AssertionManager {
    fn drop(&mut self) {
        self.stop();
    }
}
