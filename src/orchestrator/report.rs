//! Run report
//!
//! Written once at the end of a run as `test_report.txt` (human-readable)
//! and `test_report.json`.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use crate::common::config::RunConfiguration;
use crate::common::{paths, Result};
use crate::result::{ResultMap, Value};

/// Aggregated results of one run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub started_at: String,
    pub device_info: String,
    pub app_package: String,
    pub app_activity: String,
    pub metadata: BTreeMap<String, String>,
    /// Test case name -> its results or error record
    pub results: ResultMap,
}

impl RunReport {
    pub fn new(config: &RunConfiguration, device_info: String, results: ResultMap) -> Self {
        Self {
            run_id: config.run_id.clone(),
            started_at: config.start_time.to_rfc3339(),
            device_info,
            app_package: config.app_package.clone(),
            app_activity: config.app_activity.clone(),
            metadata: config.metadata.clone(),
            results,
        }
    }

    /// Results of one test case
    pub fn section(&self, test_case: &str) -> Option<&ResultMap> {
        self.results.get_map(test_case)
    }

    /// Test cases whose section is an error record
    pub fn failed_sections(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|(_, v)| v.as_map().map(ResultMap::is_error).unwrap_or(false))
            .map(|(k, _)| k)
            .collect()
    }

    /// Render the text report
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== Test Results ===");
        let _ = writeln!(out, "Run ID: {}", self.run_id);
        let _ = writeln!(out, "Device: {}", self.device_info);
        let _ = writeln!(out, "App: {}/{}", self.app_package, self.app_activity);
        if !self.metadata.is_empty() {
            let _ = writeln!(out, "Metadata:");
            for (key, value) in &self.metadata {
                let _ = writeln!(out, "  {}: {}", key, value);
            }
        }

        for (test_case, section) in self.results.iter() {
            let _ = writeln!(out, "\n{}:", test_case);
            match section {
                Value::Nested(map) => {
                    for (key, value) in map.iter() {
                        let _ = writeln!(out, "  {}: {}", key, value);
                    }
                }
                Value::Str(s) => {
                    let _ = writeln!(out, "  {}", s);
                }
            }
        }

        out
    }

    /// Write the text and JSON reports into `run_dir`
    pub fn write(&self, run_dir: &Path) -> Result<()> {
        let text_path = paths::report_path(run_dir);
        std::fs::write(&text_path, self.render_text())?;

        let json_path = paths::report_json_path(run_dir);
        std::fs::write(&json_path, serde_json::to_string_pretty(self)?)?;

        tracing::info!(path = %text_path.display(), "Test report generated");
        Ok(())
    }
}
