//! Screen capture plugin

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::common::{Error, Result};
use crate::device::Device;
use crate::result::ResultMap;
use crate::units::Plugin;

/// Captures the screen and reports the local file as `screenshot`
///
/// The file is picked up by artifact extraction and moved into the test
/// case's directory.
pub struct ScreenshotPlugin {
    /// Disambiguates captures taken within the same millisecond
    sequence: AtomicU32,
}

impl ScreenshotPlugin {
    pub fn new() -> Self {
        Self {
            sequence: AtomicU32::new(0),
        }
    }

    fn next_filename(&self) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!(
            "screenshot_{}_{}.png",
            chrono::Local::now().format("%Y%m%d_%H%M%S%3f"),
            seq
        )
    }
}

impl Default for ScreenshotPlugin {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Plugin for ScreenshotPlugin {
    fn name(&self) -> &'static str {
        "ScreenshotPlugin"
    }

    async fn run(&self, device: &dyn Device) -> Result<ResultMap> {
        let filename = self.next_filename();
        let path = device.capture_screenshot(&filename).await.map_err(|e| {
            Error::plugin(self.name(), format!("Failed to capture screenshot: {}", e))
        })?;

        tracing::info!(path = %path.display(), "Screenshot captured");

        let mut results = ResultMap::new();
        results.insert("screenshot", path.to_string_lossy().into_owned());
        Ok(results)
    }
}
