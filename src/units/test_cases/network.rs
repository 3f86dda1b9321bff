//! Offline/online launch behavior
//!
//! Launches the app with networking disabled, analyzes it, stops it, then
//! re-enables networking and analyzes a second launch.

use async_trait::async_trait;
use std::time::Duration;

use crate::analyzer::BehaviorAnalyzer;
use crate::common::config::RunConfiguration;
use crate::common::Result;
use crate::device::Device;
use crate::result::ResultMap;
use crate::units::TestCase;

pub struct NetworkTest {
    app_package: String,
    app_activity: String,
    launch_settle: Duration,
    network_settle: Duration,
    network_restore: Duration,
}

impl NetworkTest {
    pub fn new(config: &RunConfiguration) -> Self {
        Self {
            app_package: config.app_package.clone(),
            app_activity: config.app_activity.clone(),
            launch_settle: config.timing.launch_settle(),
            network_settle: config.timing.network_settle(),
            network_restore: config.timing.network_restore(),
        }
    }

    async fn launch(&self, device: &dyn Device) -> Result<()> {
        device.launch_app(&self.app_package, &self.app_activity).await?;
        settle(self.launch_settle).await;
        Ok(())
    }
}

async fn settle(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

#[async_trait]
impl TestCase for NetworkTest {
    fn name(&self) -> &'static str {
        "NetworkTest"
    }

    async fn run(&self, device: &dyn Device, analyzer: &BehaviorAnalyzer) -> Result<ResultMap> {
        let mut results = ResultMap::new();

        tracing::info!("Testing offline behavior...");
        device.disable_network().await?;
        settle(self.network_settle).await;

        tracing::info!("Launching app in offline mode...");
        self.launch(device).await?;
        results.insert("offline", analyzer.analyze(device).await?);

        tracing::info!("Closing app...");
        device.force_stop(&self.app_package).await?;
        settle(self.network_settle).await;

        tracing::info!("Enabling network...");
        device.enable_network().await?;
        settle(self.network_restore).await;

        tracing::info!("Launching app in online mode...");
        self.launch(device).await?;
        results.insert("online", analyzer.analyze(device).await?);

        Ok(results)
    }
}
