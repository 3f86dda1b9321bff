//! droid - scripted behavioral tests against Android devices
//!
//! A run launches an app on a device reachable through adb, drives it
//! through scenario test cases (e.g. offline then online), collects
//! analysis results from plugins and writes a report per run.

pub mod analyzer;
pub mod cli;
pub mod commands;
pub mod common;
pub mod device;
pub mod orchestrator;
pub mod result;
pub mod units;

// Re-export commonly used types for tests
pub use analyzer::BehaviorAnalyzer;
pub use common::{Error, Result};
pub use device::Device;
pub use orchestrator::{Orchestrator, Registries, RunReport, RunState};
pub use result::{ResultMap, Value};
