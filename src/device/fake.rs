//! Scripted in-memory device (testing only)
//!
//! Records every operation and fails the ones it has been told to fail.
//! Screenshots are written as small files into a local directory so
//! artifact handling can be exercised without a device.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use super::Device;
use crate::common::{Error, Result};

/// Message carried by scripted failures
pub const SCRIPTED_FAILURE: &str = "scripted failure";

/// Test double implementing [`Device`]
#[derive(Debug)]
pub struct ScriptedDevice {
    id: String,
    capture_dir: PathBuf,
    failing: Mutex<HashSet<String>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedDevice {
    pub fn new(id: &str, capture_dir: &Path) -> Self {
        Self {
            id: id.to_string(),
            capture_dir: capture_dir.to_path_buf(),
            failing: Mutex::new(HashSet::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Make `operation` (e.g. `"disable_network"`) fail from now on
    pub fn fail_on(self, operation: &str) -> Self {
        self.set_failing(operation, true);
        self
    }

    pub fn set_failing(&self, operation: &str, failing: bool) {
        let mut set = self.failing.lock().unwrap();
        if failing {
            set.insert(operation.to_string());
        } else {
            set.remove(operation);
        }
    }

    /// Operations invoked so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, operation: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == operation).count()
    }

    fn record(&self, operation: &str) -> Result<()> {
        self.calls.lock().unwrap().push(operation.to_string());
        if self.failing.lock().unwrap().contains(operation) {
            return Err(Error::device(operation, SCRIPTED_FAILURE));
        }
        Ok(())
    }
}

#[async_trait]
impl Device for ScriptedDevice {
    fn id(&self) -> &str {
        &self.id
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        self.record("wait_ready").map_err(|_| Error::DeviceTimeout {
            device: self.id.clone(),
            secs: timeout.as_secs(),
        })
    }

    async fn launch_app(&self, package: &str, activity: &str) -> Result<String> {
        self.record("launch_app")?;
        Ok(format!("Starting: Intent {{ cmp={}/{} }}", package, activity))
    }

    async fn force_stop(&self, _package: &str) -> Result<()> {
        self.record("force_stop")
    }

    async fn current_activity(&self) -> Result<String> {
        self.record("current_activity")?;
        Ok("mResumedActivity: ActivityRecord{0 u0 com.example/.Main t1}".to_string())
    }

    async fn capture_screenshot(&self, filename: &str) -> Result<PathBuf> {
        self.record("capture_screenshot")?;
        let path = self.capture_dir.join(filename);
        std::fs::write(&path, b"\x89PNG\r\n")
            .map_err(|e| Error::device("capture_screenshot", &e.to_string()))?;
        Ok(path)
    }

    async fn enable_network(&self) -> Result<()> {
        self.record("enable_network")
    }

    async fn disable_network(&self) -> Result<()> {
        self.record("disable_network")
    }

    async fn network_state(&self) -> Result<String> {
        self.record("network_state")?;
        Ok("WiFi: 1, Mobile Data: 1".to_string())
    }

    async fn device_info(&self) -> Result<String> {
        self.record("device_info")?;
        Ok("Scripted Device (Android 14)".to_string())
    }

    async fn install_app(&self, _apk: &Path) -> Result<String> {
        self.record("install_app")?;
        Ok("Success".to_string())
    }

    async fn uninstall_app(&self, _package: &str) -> Result<String> {
        self.record("uninstall_app")?;
        Ok("Success".to_string())
    }

    async fn clear_app_data(&self, _package: &str) -> Result<String> {
        self.record("clear_app_data")?;
        Ok("Success".to_string())
    }

    async fn unlock_screen(&self) -> Result<()> {
        self.record("unlock_screen")
    }

    async fn is_screen_on(&self) -> Result<bool> {
        self.record("is_screen_on")?;
        Ok(true)
    }
}
