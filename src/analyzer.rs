//! Behavior analysis
//!
//! One analysis pass runs every loaded plugin against the device and merges
//! their results under each plugin's name. A failing or panicking plugin is
//! recorded as `{"error": message}` and never stops the pass.

use futures_util::FutureExt;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use crate::common::config::Timing;
use crate::common::{panic_message, Error, Result};
use crate::device::Device;
use crate::result::ResultMap;
use crate::units::Plugin;

/// Runs the loaded plugins, in load order
pub struct BehaviorAnalyzer {
    plugins: Vec<Box<dyn Plugin>>,
    ready_timeout: Duration,
    /// Stabilization delay before each pass
    settle: Duration,
}

impl BehaviorAnalyzer {
    pub fn new(plugins: Vec<Box<dyn Plugin>>, timing: &Timing) -> Self {
        Self {
            plugins,
            ready_timeout: timing.ready_timeout(),
            settle: timing.analysis_settle(),
        }
    }

    /// Names of the loaded plugins, in execution order
    pub fn plugin_names(&self) -> Vec<&'static str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    /// Run one analysis pass
    ///
    /// Fails only when the device is not ready; plugin failures are folded
    /// into the returned map.
    pub async fn analyze(&self, device: &dyn Device) -> Result<ResultMap> {
        if !self.settle.is_zero() {
            tokio::time::sleep(self.settle).await;
        }

        device
            .wait_ready(self.ready_timeout)
            .await
            .map_err(|e| Error::Analysis(Box::new(e)))?;

        let mut results = ResultMap::new();

        for plugin in &self.plugins {
            let name = plugin.name();
            tracing::debug!(plugin = name, "Running plugin");

            let entry = match AssertUnwindSafe(plugin.run(device)).catch_unwind().await {
                Ok(Ok(plugin_results)) => plugin_results,
                Ok(Err(e)) => {
                    let message = e.full_message();
                    tracing::error!(plugin = name, error = %message, "Plugin failed");
                    ResultMap::error(message)
                }
                Err(payload) => {
                    let message = format!("unexpected error: {}", panic_message(payload.as_ref()));
                    tracing::error!(plugin = name, error = %message, "Plugin panicked");
                    ResultMap::error(message)
                }
            };

            results.insert(name, entry);
        }

        Ok(results)
    }
}
