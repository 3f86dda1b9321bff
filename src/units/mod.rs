//! Pluggable test units
//!
//! Plugins contribute one named sub-result to every behavior analysis pass.
//! Test cases drive one end-to-end scenario and produce one report section.
//! Both are resolved from configured names through a [`UnitRegistry`].

pub mod plugins;
pub mod registry;
pub mod test_cases;

pub use registry::UnitRegistry;

use async_trait::async_trait;

use crate::analyzer::BehaviorAnalyzer;
use crate::common::Result;
use crate::device::Device;
use crate::result::ResultMap;

/// A check run against the device during every analysis pass
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Key under which this plugin's results are merged (e.g. `ExamplePlugin`)
    fn name(&self) -> &'static str;

    async fn run(&self, device: &dyn Device) -> Result<ResultMap>;
}

/// One end-to-end scenario
#[async_trait]
pub trait TestCase: Send + Sync {
    /// Report section name (e.g. `NetworkTest`)
    fn name(&self) -> &'static str;

    async fn run(&self, device: &dyn Device, analyzer: &BehaviorAnalyzer) -> Result<ResultMap>;
}
