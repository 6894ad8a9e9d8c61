//! Offline scenario replay for the combo engine.
//!
//! Scenarios are RON files describing a fixture world and a list of frames.
//! [`replay`] drives them through a real [`combo_runtime::Engine`] on a manual
//! clock and reports every substitution it made.
pub mod logging;
pub mod replay;
pub mod scenario;

pub use replay::{FrameReport, PressReport, ReplayReport, replay};
pub use scenario::{Edit, Frame, Press, Scenario};
