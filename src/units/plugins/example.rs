//! Placeholder plugin for app-specific checks

use async_trait::async_trait;

use crate::common::Result;
use crate::device::Device;
use crate::result::ResultMap;
use crate::units::Plugin;

/// Always reports `example_check: passed`
pub struct ExamplePlugin;

#[async_trait]
impl Plugin for ExamplePlugin {
    fn name(&self) -> &'static str {
        "ExamplePlugin"
    }

    async fn run(&self, _device: &dyn Device) -> Result<ResultMap> {
        tracing::info!("Example plugin check passed");
        let mut results = ResultMap::new();
        results.insert("example_check", "passed");
        Ok(results)
    }
}
