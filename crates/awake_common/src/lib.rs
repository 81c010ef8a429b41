//! awake common - sleep inhibition core
//!
//! Platform backends, the assertion state machine, run policies and the
//! duration controller. The `awake` binary wires these together.

pub mod assertion;
pub mod config;
pub mod controller;
pub mod error;
pub mod platform;
pub mod policy;
pub mod testing;

pub use assertion::{AssertionManager, AssertionState};
pub use config::Config;
pub use controller::{wait, WaitOutcome};
pub use error::*;
pub use platform::{select, AssertionHandle, Backend, PowerInterface};
pub use policy::{RunPolicy, Target};
