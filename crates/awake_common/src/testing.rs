//! In-memory power backend for tests.
//!
//! [`RecordingPower`] hands out token handles and counts every call. Clone the
//! [`PowerLog`] before moving the backend into an `AssertionManager` to
//! inspect the counts afterwards.

use crate::error::PlatformError;
use crate::platform::{AssertionHandle, PowerInterface};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Shared call counters.
#[derive(Debug, Default, Clone)]
pub struct PowerLog {
    inner: Arc<LogInner>,
}

#[derive(Debug, Default)]
struct LogInner {
    acquires: AtomicUsize,
    releases: AtomicUsize,
    reasons: Mutex<Vec<String>>,
}

impl PowerLog {
    /// Successful acquire calls
    pub fn acquires(&self) -> usize {
        self.inner.acquires.load(Ordering::SeqCst)
    }

    /// Successful release calls
    pub fn releases(&self) -> usize {
        self.inner.releases.load(Ordering::SeqCst)
    }

    /// Assertions acquired and not yet released
    pub fn outstanding(&self) -> usize {
        self.acquires().saturating_sub(self.releases())
    }

    pub fn reasons(&self) -> Vec<String> {
        self.inner
            .reasons
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    None,
    PermissionDenied,
    Unsupported,
}

#[derive(Debug)]
pub struct RecordingPower {
    log: PowerLog,
    deny: Denial,
    fail_release: bool,
    next_id: u64,
    held: HashSet<u64>,
}

impl RecordingPower {
    pub fn new() -> Self {
        Self {
            log: PowerLog::default(),
            deny: Denial::None,
            fail_release: false,
            next_id: 1,
            held: HashSet::new(),
        }
    }

    /// Backend whose acquire always fails.
    pub fn denying(deny: Denial) -> Self {
        Self {
            deny,
            ..Self::new()
        }
    }

    /// Release drops the handle but reports a platform error.
    pub fn failing_release(mut self) -> Self {
        self.fail_release = true;
        self
    }

    pub fn log(&self) -> PowerLog {
        self.log.clone()
    }
}

impl Default for RecordingPower {
    fn default() -> Self {
        Self::new()
    }
}

impl PowerInterface for RecordingPower {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn acquire(&mut self, reason: &str) -> Result<AssertionHandle, PlatformError> {
        if reason.trim().is_empty() {
            return Err(PlatformError::InvalidReason);
        }
        match self.deny {
            Denial::PermissionDenied => {
                return Err(PlatformError::PermissionDenied("denied by test".to_string()))
            }
            Denial::Unsupported => {
                return Err(PlatformError::Unsupported("unsupported in test".to_string()))
            }
            Denial::None => {}
        }

        let id = self.next_id;
        self.next_id += 1;
        self.held.insert(id);
        self.log.inner.acquires.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut reasons) = self.log.inner.reasons.lock() {
            reasons.push(reason.to_string());
        }
        Ok(AssertionHandle::token(id))
    }

    fn release(&mut self, handle: AssertionHandle) -> Result<(), PlatformError> {
        if !self.held.remove(&handle.id()) {
            return Err(PlatformError::InvalidHandle);
        }
        self.log.inner.releases.fetch_add(1, Ordering::SeqCst);
        if self.fail_release {
            return Err(PlatformError::Io(std::io::Error::other("release failed in test")));
        }
        Ok(())
    }
}
