//! Platform power backends.
//!
//! Every backend implements [`PowerInterface`]; callers above this module
//! never branch on the host OS. [`select`] picks the backend at startup.
//!
//! What a held assertion guarantees differs per backend:
//!
//! | backend      | idle sleep | manual sleep / lid close                        |
//! |--------------|------------|-------------------------------------------------|
//! | `systemd`    | blocked    | blocked for logind requests, lid follows logind |
//! | `caffeinate` | blocked    | not blocked                                     |
//! | `none`       | n/a        | n/a                                             |

mod helper;
mod unsupported;

pub use helper::{HelperInhibitor, HelperKind};
pub use unsupported::UnsupportedPower;

use crate::error::{ConfigError, PlatformError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Opaque token for one held inhibition.
///
/// Not `Clone`: release consumes it, so a handle cannot be released twice.
#[derive(Debug)]
pub struct AssertionHandle {
    id: u64,
    kind: HandleKind,
}

#[derive(Debug)]
pub(crate) enum HandleKind {
    /// A helper process whose lifetime is the assertion
    Helper(std::process::Child),
    /// Bookkeeping-only handle for in-memory backends
    Token,
}

impl AssertionHandle {
    /// Handle for backends that track assertions by id alone.
    pub fn token(id: u64) -> Self {
        Self {
            id,
            kind: HandleKind::Token,
        }
    }

    pub(crate) fn helper(id: u64, child: std::process::Child) -> Self {
        Self {
            id,
            kind: HandleKind::Helper(child),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Pid of the helper process holding the assertion, if there is one.
    pub fn helper_pid(&self) -> Option<u32> {
        match &self.kind {
            HandleKind::Helper(child) => Some(child.id()),
            HandleKind::Token => None,
        }
    }

    pub(crate) fn into_kind(self) -> HandleKind {
        self.kind
    }
}

/// Host sleep-inhibition primitive.
pub trait PowerInterface: Send {
    /// Short backend name for logs
    fn name(&self) -> &'static str;

    /// Take an inhibition. `reason` shows up in OS power diagnostics.
    fn acquire(&mut self, reason: &str) -> Result<AssertionHandle, PlatformError>;

    /// Give back an inhibition previously returned by `acquire`.
    fn release(&mut self, handle: AssertionHandle) -> Result<(), PlatformError>;
}

/// Backend choice from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Auto,
    Systemd,
    Caffeinate,
    None,
}

impl FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Backend::Auto),
            "systemd" => Ok(Backend::Systemd),
            "caffeinate" => Ok(Backend::Caffeinate),
            "none" => Ok(Backend::None),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Backend::Auto => "auto",
            Backend::Systemd => "systemd",
            Backend::Caffeinate => "caffeinate",
            Backend::None => "none",
        };
        f.write_str(name)
    }
}

impl Backend {
    /// Resolve `Auto` to the backend native to the build target.
    pub fn resolve(self) -> Backend {
        match self {
            Backend::Auto if cfg!(target_os = "macos") => Backend::Caffeinate,
            Backend::Auto if cfg!(target_os = "linux") => Backend::Systemd,
            Backend::Auto => Backend::None,
            other => other,
        }
    }
}

/// Build the power backend for `backend`.
pub fn select(backend: Backend) -> Box<dyn PowerInterface> {
    let resolved = backend.resolve();
    debug!("Power backend: {} (requested {})", resolved, backend);

    match resolved {
        Backend::Systemd => Box::new(HelperInhibitor::new(HelperKind::Systemd)),
        Backend::Caffeinate => Box::new(HelperInhibitor::new(HelperKind::Caffeinate)),
        Backend::None | Backend::Auto => Box::new(UnsupportedPower::new(format!(
            "no sleep inhibition backend for {}",
            std::env::consts::OS
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_from_str() {
        assert_eq!("auto".parse::<Backend>().unwrap(), Backend::Auto);
        assert_eq!(" Systemd ".parse::<Backend>().unwrap(), Backend::Systemd);
        assert_eq!("none".parse::<Backend>().unwrap(), Backend::None);
        assert!(matches!(
            "iokit".parse::<Backend>(),
            Err(ConfigError::UnknownBackend(name)) if name == "iokit"
        ));
    }

    #[test]
    fn test_auto_resolves_to_concrete_backend() {
        let resolved = Backend::Auto.resolve();
        assert_ne!(resolved, Backend::Auto);
        assert_eq!(Backend::None.resolve(), Backend::None);
    }

    #[test]
    fn test_none_backend_denies() {
        let mut power = select(Backend::None);
        assert_eq!(power.name(), "none");
        assert!(matches!(
            power.acquire("keep system awake"),
            Err(PlatformError::Unsupported(_))
        ));
    }

    #[test]
    fn test_token_handle_id() {
        let handle = AssertionHandle::token(7);
        assert_eq!(handle.id(), 7);
    }
}
