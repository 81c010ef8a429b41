//! Error types for awake.

use thiserror::Error;

/// Exit code for success (deadline reached or clean interrupt)
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code when sleep inhibition could not be acquired, or any other runtime failure
pub const EXIT_FAILURE: i32 = 1;

/// Exit code for malformed invocations (matches clap's own usage errors)
pub const EXIT_USAGE: i32 = 2;

/// Failures reported by a platform power backend.
#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("sleep inhibition denied: {0}")]
    PermissionDenied(String),

    #[error("sleep inhibition unsupported: {0}")]
    Unsupported(String),

    #[error("assertion handle is not held by this backend")]
    InvalidHandle,

    #[error("assertion reason must not be empty")]
    InvalidReason,

    #[error("power backend IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Rejected run policy input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("invalid duration: {0}")]
    InvalidDuration(String),

    #[error("invalid datetime: {0}")]
    InvalidDatetime(String),
}

/// Configuration loading failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("unknown backend: {0}")]
    UnknownBackend(String),
}

/// Top-level error for one awake invocation.
#[derive(Error, Debug)]
pub enum AwakeError {
    #[error("{0}")]
    Usage(#[from] PolicyError),

    #[error("failed to acquire sleep inhibition")]
    Acquisition(#[source] PlatformError),

    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Runtime(String),
}

impl AwakeError {
    pub fn exit_code(&self) -> i32 {
        match self {
            AwakeError::Usage(_) => EXIT_USAGE,
            AwakeError::Acquisition(_) => EXIT_FAILURE,
            AwakeError::Config(_) => EXIT_FAILURE,
            AwakeError::Runtime(_) => EXIT_FAILURE,
        }
    }
}
