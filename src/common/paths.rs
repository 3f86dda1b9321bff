//! Run directory layout
//!
//! Every run writes under `<results_root>/<run_id>/`:
//! - `test_run.log`: full run log
//! - `test_report.txt` / `test_report.json`: the report
//! - `<TestCaseName>/`: artifacts extracted from that test case's results

use std::io;
use std::path::{Path, PathBuf};

/// Default configuration file, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "configs/default_config.yaml";

/// Default root for all run directories
pub const DEFAULT_RESULTS_DIR: &str = "test_results";

pub const LOG_FILE_NAME: &str = "test_run.log";
pub const REPORT_FILE_NAME: &str = "test_report.txt";
pub const REPORT_JSON_FILE_NAME: &str = "test_report.json";

/// Build a run identifier from a local timestamp (`20240131_154501`)
pub fn run_id_at(time: &chrono::DateTime<chrono::Local>) -> String {
    time.format("%Y%m%d_%H%M%S").to_string()
}

/// Create the run directory, including missing parents
pub fn ensure_run_dir(results_root: &Path, run_id: &str) -> io::Result<PathBuf> {
    let dir = results_root.join(run_id);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Directory holding one test case's extracted artifacts
pub fn artifact_dir(run_dir: &Path, test_case: &str) -> PathBuf {
    run_dir.join(test_case)
}

pub fn log_path(run_dir: &Path) -> PathBuf {
    run_dir.join(LOG_FILE_NAME)
}

pub fn report_path(run_dir: &Path) -> PathBuf {
    run_dir.join(REPORT_FILE_NAME)
}

pub fn report_json_path(run_dir: &Path) -> PathBuf {
    run_dir.join(REPORT_JSON_FILE_NAME)
}
