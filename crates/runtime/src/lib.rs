//! Runtime orchestration for the combo engine.
//!
//! This crate wires a host [`Observer`](combo_core::Observer), a
//! [`ProfileSource`](combo_core::ProfileSource), and a [`Clock`] into an
//! [`Engine`] that a host hook drives once per frame and once per action
//! press.
//!
//! Modules are organized by responsibility:
//! - [`engine`] hosts the engine and its builder
//! - [`gate`] decides which ticks refresh the snapshot
//! - [`clock`] supplies millisecond timestamps
//! - [`config`] loads runtime settings from the environment
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod gate;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::RuntimeConfig;
pub use engine::{Engine, EngineBuilder, EngineDiagnostics, TickOutcome};
pub use error::{Result, RuntimeError};
pub use gate::{UpdateGate, UpdateSkipReason};
