//! awake - keep the machine from idle-sleeping.
//!
//! The binary is a thin wrapper over [`app::run`]; the modules are public so
//! integration tests can drive the lifecycle with an in-memory backend.

pub mod app;
pub mod cli;
pub mod instances;
pub mod lifecycle;
pub mod logging;
pub mod signals;

pub use app::run;
pub use cli::Cli;
pub use lifecycle::{Coordinator, ExitStatus};
