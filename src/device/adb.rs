//! adb-backed device session

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use super::Device;
use crate::common::config::RunConfiguration;
use crate::common::{Error, Result};

/// Interval between readiness probes
const READY_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Remote directory used for screen captures
const REMOTE_CAPTURE_DIR: &str = "/sdcard";

/// Device session that shells out to `adb -s <serial>`
pub struct AdbDevice {
    adb: PathBuf,
    serial: String,
    /// Local directory receiving pulled files
    capture_dir: PathBuf,
}

impl AdbDevice {
    /// Create a session for the configured device
    ///
    /// Uses `adb_path` from the configuration, falling back to PATH.
    /// Screenshots are pulled into the run directory.
    pub fn new(config: &RunConfiguration) -> Result<Self> {
        let adb = match &config.adb_path {
            Some(path) => path.clone(),
            None => which::which("adb").map_err(|_| Error::AdbNotFound)?,
        };
        Ok(Self::with_adb(adb, &config.device_id, &config.run_dir))
    }

    pub fn with_adb(adb: PathBuf, serial: &str, capture_dir: &Path) -> Self {
        Self {
            adb,
            serial: serial.to_string(),
            capture_dir: capture_dir.to_path_buf(),
        }
    }

    /// Run `adb -s <serial> <args...>` and return its stdout
    pub async fn execute(&self, args: &[&str]) -> Result<String> {
        let command = args.join(" ");
        tracing::debug!(device = %self.serial, %command, "adb");

        let output = Command::new(&self.adb)
            .arg("-s")
            .arg(&self.serial)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| Error::device(&command, &format!("failed to spawn adb: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = if stderr.trim().is_empty() {
                format!("exit status {:?}", output.status.code())
            } else {
                stderr.trim().to_string()
            };
            return Err(Error::device(&command, &message));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn shell(&self, args: &[&str]) -> Result<String> {
        let mut full = Vec::with_capacity(args.len() + 1);
        full.push("shell");
        full.extend_from_slice(args);
        self.execute(&full).await
    }

    async fn getprop(&self, name: &str) -> Result<String> {
        Ok(self.shell(&["getprop", name]).await?.trim().to_string())
    }

    async fn keyevent(&self, code: &str) -> Result<()> {
        self.shell(&["input", "keyevent", code]).await.map(|_| ())
    }
}

#[async_trait]
impl Device for AdbDevice {
    fn id(&self) -> &str {
        &self.serial
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let poll = async {
            loop {
                match self.shell(&["echo", "ready"]).await {
                    Ok(_) => return,
                    Err(e) => tracing::debug!(device = %self.serial, error = %e, "device not ready"),
                }
                tokio::time::sleep(READY_POLL_INTERVAL).await;
            }
        };

        // Bounds the in-flight adb command as well as the polling
        tokio::time::timeout(timeout, poll)
            .await
            .map_err(|_| Error::DeviceTimeout {
                device: self.serial.clone(),
                secs: timeout.as_secs(),
            })
    }

    async fn launch_app(&self, package: &str, activity: &str) -> Result<String> {
        let component = format!("{}/{}", package, activity);
        self.shell(&["am", "start", "-n", &component]).await
    }

    async fn force_stop(&self, package: &str) -> Result<()> {
        self.shell(&["am", "force-stop", package]).await.map(|_| ())
    }

    async fn current_activity(&self) -> Result<String> {
        let dump = self.shell(&["dumpsys", "activity", "activities"]).await?;
        Ok(dump
            .lines()
            .find(|line| line.contains("mResumedActivity"))
            .map(|line| line.trim().to_string())
            .unwrap_or_default())
    }

    async fn capture_screenshot(&self, filename: &str) -> Result<PathBuf> {
        let remote = format!("{}/{}", REMOTE_CAPTURE_DIR, filename);
        let local = self.capture_dir.join(filename);
        let local_str = local.to_string_lossy().into_owned();

        self.shell(&["screencap", "-p", &remote]).await?;
        self.execute(&["pull", &remote, &local_str]).await?;
        if let Err(e) = self.shell(&["rm", &remote]).await {
            tracing::warn!(error = %e, "Failed to remove remote screenshot");
        }

        Ok(local)
    }

    async fn enable_network(&self) -> Result<()> {
        self.shell(&["svc", "wifi", "enable"]).await?;
        self.shell(&["svc", "data", "enable"]).await?;
        Ok(())
    }

    async fn disable_network(&self) -> Result<()> {
        self.shell(&["svc", "wifi", "disable"]).await?;
        self.shell(&["svc", "data", "disable"]).await?;
        Ok(())
    }

    async fn network_state(&self) -> Result<String> {
        let wifi = self.shell(&["settings", "get", "global", "wifi_on"]).await?;
        let data = self.shell(&["settings", "get", "global", "mobile_data"]).await?;
        Ok(format!("WiFi: {}, Mobile Data: {}", wifi.trim(), data.trim()))
    }

    async fn device_info(&self) -> Result<String> {
        let manufacturer = self.getprop("ro.product.manufacturer").await?;
        let model = self.getprop("ro.product.model").await?;
        let release = self.getprop("ro.build.version.release").await?;
        Ok(format!("{} {} (Android {})", manufacturer, model, release))
    }

    async fn install_app(&self, apk: &Path) -> Result<String> {
        let apk = apk.to_string_lossy();
        self.execute(&["install", &apk]).await
    }

    async fn uninstall_app(&self, package: &str) -> Result<String> {
        self.execute(&["uninstall", package]).await
    }

    async fn clear_app_data(&self, package: &str) -> Result<String> {
        self.shell(&["pm", "clear", package]).await
    }

    async fn unlock_screen(&self) -> Result<()> {
        if !self.is_screen_on().await? {
            // KEYCODE_POWER
            self.keyevent("26").await?;
        }
        // KEYCODE_MENU
        self.keyevent("82").await
    }

    async fn is_screen_on(&self) -> Result<bool> {
        let dump = self.shell(&["dumpsys", "power"]).await?;
        Ok(dump
            .lines()
            .filter(|line| line.contains("Display Power: state="))
            .any(|line| line.contains("ON")))
    }
}
