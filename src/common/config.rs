//! Configuration file handling
//!
//! A run is configured from a YAML file (TOML when the file ends in `.toml`)
//! merged with command-line overrides into an immutable [`RunConfiguration`].

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::paths;
use super::{Error, Result};

/// Configuration as written in the config file
#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    /// adb serial of the target device
    #[serde(default)]
    pub device_id: String,

    /// Package name of the app under test
    #[serde(default)]
    pub app_package: String,

    /// Launchable activity of the app under test (e.g. `.MainActivity`)
    #[serde(default)]
    pub app_activity: String,

    /// Plugins to run during every analysis pass, in order
    #[serde(default)]
    pub plugins: Vec<String>,

    /// Test cases to run, in order
    #[serde(default)]
    pub test_cases: Vec<String>,

    /// Free-form metadata copied into the report
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,

    /// Root directory for run directories
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,

    /// Explicit adb executable; searched in PATH when absent
    #[serde(default)]
    pub adb_path: Option<PathBuf>,

    /// Delay and timeout settings
    #[serde(default)]
    pub timing: Timing,
}

fn default_results_dir() -> PathBuf {
    PathBuf::from(paths::DEFAULT_RESULTS_DIR)
}

/// Delay and timeout settings in seconds
#[derive(Debug, Clone, Deserialize)]
pub struct Timing {
    /// Upper bound for the device readiness poll
    #[serde(default = "default_ready_timeout")]
    pub ready_timeout_secs: u64,

    /// Stabilization delay after launching the app
    #[serde(default = "default_launch_settle")]
    pub launch_settle_secs: u64,

    /// Delay after disabling the network or stopping the app
    #[serde(default = "default_network_settle")]
    pub network_settle_secs: u64,

    /// Delay after re-enabling the network
    #[serde(default = "default_network_restore")]
    pub network_restore_secs: u64,

    /// Delay before each behavior analysis pass
    #[serde(default = "default_analysis_settle")]
    pub analysis_settle_secs: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            ready_timeout_secs: default_ready_timeout(),
            launch_settle_secs: default_launch_settle(),
            network_settle_secs: default_network_settle(),
            network_restore_secs: default_network_restore(),
            analysis_settle_secs: default_analysis_settle(),
        }
    }
}

fn default_ready_timeout() -> u64 {
    30
}
fn default_launch_settle() -> u64 {
    5
}
fn default_network_settle() -> u64 {
    2
}
fn default_network_restore() -> u64 {
    5
}
fn default_analysis_settle() -> u64 {
    5
}

impl Timing {
    /// All delays zeroed, readiness bounded to one second
    pub fn immediate() -> Self {
        Self {
            ready_timeout_secs: 1,
            launch_settle_secs: 0,
            network_settle_secs: 0,
            network_restore_secs: 0,
            analysis_settle_secs: 0,
        }
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_secs(self.ready_timeout_secs)
    }

    pub fn launch_settle(&self) -> Duration {
        Duration::from_secs(self.launch_settle_secs)
    }

    pub fn network_settle(&self) -> Duration {
        Duration::from_secs(self.network_settle_secs)
    }

    pub fn network_restore(&self) -> Duration {
        Duration::from_secs(self.network_restore_secs)
    }

    pub fn analysis_settle(&self) -> Duration {
        Duration::from_secs(self.analysis_settle_secs)
    }
}

impl FileConfig {
    /// Load the configuration file at `path`
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        if path.extension().map(|e| e == "toml").unwrap_or(false) {
            toml::from_str(&content).map_err(|e| Error::ConfigParse(e.to_string()))
        } else {
            Self::from_yaml(&content)
        }
    }

    /// Parse a YAML configuration document
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigParse(e.to_string()))
    }

    /// Apply command-line overrides
    pub fn merge(mut self, overrides: Overrides) -> Self {
        if let Some(device_id) = overrides.device_id {
            self.device_id = device_id;
        }
        if let Some(results_dir) = overrides.results_dir {
            self.results_dir = results_dir;
        }
        self.plugins.extend(overrides.plugins);
        self.test_cases.extend(overrides.test_cases);
        self
    }
}

/// Values supplied on the command line
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub device_id: Option<String>,
    pub results_dir: Option<PathBuf>,
    /// Appended to the configured plugin list
    pub plugins: Vec<String>,
    /// Appended to the configured test case list
    pub test_cases: Vec<String>,
}

/// Immutable configuration of a single run
#[derive(Debug, Clone)]
pub struct RunConfiguration {
    pub device_id: String,
    pub app_package: String,
    pub app_activity: String,
    pub plugins: Vec<String>,
    pub test_cases: Vec<String>,
    pub metadata: BTreeMap<String, String>,
    pub adb_path: Option<PathBuf>,
    pub timing: Timing,
    /// Timestamp-derived run identifier
    pub run_id: String,
    /// `<results_dir>/<run_id>`, created on construction
    pub run_dir: PathBuf,
    pub start_time: chrono::DateTime<chrono::Local>,
}

impl RunConfiguration {
    /// Validate the merged configuration and create the run directory
    pub fn new(config: FileConfig) -> Result<Self> {
        if config.device_id.trim().is_empty()
            || config.app_package.trim().is_empty()
            || config.app_activity.trim().is_empty()
        {
            return Err(Error::Config(
                "device_id, app_package, and app_activity are required fields".to_string(),
            ));
        }

        let start_time = chrono::Local::now();
        let run_id = paths::run_id_at(&start_time);
        let run_dir = paths::ensure_run_dir(&config.results_dir, &run_id).map_err(|e| {
            Error::Config(format!(
                "Failed to create run directory under '{}': {}",
                config.results_dir.display(),
                e
            ))
        })?;

        Ok(Self {
            device_id: config.device_id,
            app_package: config.app_package,
            app_activity: config.app_activity,
            plugins: config.plugins,
            test_cases: config.test_cases,
            metadata: config.metadata,
            adb_path: config.adb_path,
            timing: config.timing,
            run_id,
            run_dir,
            start_time,
        })
    }
}
