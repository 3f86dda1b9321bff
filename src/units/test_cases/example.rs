//! Minimal test case used to check a harness setup

use async_trait::async_trait;

use crate::analyzer::BehaviorAnalyzer;
use crate::common::Result;
use crate::device::Device;
use crate::result::ResultMap;
use crate::units::TestCase;

pub struct ExampleTest;

#[async_trait]
impl TestCase for ExampleTest {
    fn name(&self) -> &'static str {
        "ExampleTest"
    }

    async fn run(&self, _device: &dyn Device, _analyzer: &BehaviorAnalyzer) -> Result<ResultMap> {
        tracing::info!("Example test successful");
        let mut results = ResultMap::new();
        results.insert("example_test", "passed");
        Ok(results)
    }
}
