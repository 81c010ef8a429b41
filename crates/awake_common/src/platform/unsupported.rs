use super::{AssertionHandle, PowerInterface};
use crate::error::PlatformError;

/// Backend for hosts without a usable inhibition primitive.
#[derive(Debug, Clone)]
pub struct UnsupportedPower {
    detail: String,
}

impl UnsupportedPower {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

impl PowerInterface for UnsupportedPower {
    fn name(&self) -> &'static str {
        "none"
    }

    fn acquire(&mut self, reason: &str) -> Result<AssertionHandle, PlatformError> {
        if reason.trim().is_empty() {
            return Err(PlatformError::InvalidReason);
        }
        Err(PlatformError::Unsupported(self.detail.clone()))
    }

    fn release(&mut self, _handle: AssertionHandle) -> Result<(), PlatformError> {
        // nothing was ever handed out
        Err(PlatformError::InvalidHandle)
    }
}
