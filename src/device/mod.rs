//! Device session contract
//!
//! Every operation is a single remote command (or a short sequence of them)
//! awaited to completion before the next one is issued. Failures surface as
//! [`Error::Device`](crate::Error::Device).

mod adb;
pub mod fake;

pub use adb::AdbDevice;
pub use fake::ScriptedDevice;

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

use crate::common::Result;

/// A live connection to one target device
#[async_trait]
pub trait Device: Send + Sync {
    /// Identifier of the device (adb serial)
    fn id(&self) -> &str;

    /// Poll until a trivial round-trip succeeds, bounded by `timeout`
    async fn wait_ready(&self, timeout: Duration) -> Result<()>;

    /// Start `activity` of `package`
    async fn launch_app(&self, package: &str, activity: &str) -> Result<String>;

    async fn force_stop(&self, package: &str) -> Result<()>;

    /// The currently resumed activity record
    async fn current_activity(&self) -> Result<String>;

    /// Capture the screen into `filename` and return the local path
    async fn capture_screenshot(&self, filename: &str) -> Result<PathBuf>;

    async fn enable_network(&self) -> Result<()>;

    async fn disable_network(&self) -> Result<()>;

    /// Human-readable WiFi and mobile data state
    async fn network_state(&self) -> Result<String>;

    /// Manufacturer, model and Android release
    async fn device_info(&self) -> Result<String>;

    async fn install_app(&self, apk: &std::path::Path) -> Result<String>;

    async fn uninstall_app(&self, package: &str) -> Result<String>;

    async fn clear_app_data(&self, package: &str) -> Result<String>;

    /// Wake the screen if needed and dismiss the keyguard
    async fn unlock_screen(&self) -> Result<()>;

    async fn is_screen_on(&self) -> Result<bool>;
}
