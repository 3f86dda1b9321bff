//! End-to-end tests for the droid harness
//!
//! Library scenarios drive the orchestrator against a scripted device.
//! Binary scenarios run the `droid` executable against a fake `adb`
//! shell script and inspect the run directory it leaves behind.

use std::path::{Path, PathBuf};

use droid::common::config::{FileConfig, RunConfiguration, Timing};
use droid::common::logging::RunLogger;
use droid::device::ScriptedDevice;
use droid::{Error, Orchestrator, Registries, RunState};
use tempfile::{tempdir, TempDir};

fn scenario_config(root: &Path, yaml: &str) -> RunConfiguration {
    let mut config = FileConfig::from_yaml(yaml).unwrap();
    config.results_dir = root.to_path_buf();
    config.timing = Timing::immediate();
    RunConfiguration::new(config).unwrap()
}

const NETWORK_SCENARIO: &str = "\
device_id: emu-1
app_package: com.example
app_activity: .Main
plugins: [example_plugin]
test_cases: [network_test, example_test]
metadata:
  build: '42'
";

async fn start(
    yaml: &str,
    device: impl FnOnce(&Path) -> ScriptedDevice,
) -> (TempDir, Orchestrator<ScriptedDevice>) {
    let root = tempdir().unwrap();
    let config = scenario_config(root.path(), yaml);
    let device = device(&config.run_dir);
    let orchestrator = Orchestrator::initialize(config, device, &Registries::builtin(), None)
        .await
        .unwrap();
    (root, orchestrator)
}

#[tokio::test]
async fn test_network_scenario_report() {
    let (_root, mut orch) = start(NETWORK_SCENARIO, |dir| ScriptedDevice::new("emu-1", dir)).await;

    let report = orch.run().await.unwrap();

    let network = report.section("NetworkTest").unwrap();
    for phase in ["offline", "online"] {
        assert_eq!(
            network
                .get_map(phase)
                .and_then(|p| p.get_map("ExamplePlugin"))
                .and_then(|p| p.get_str("example_check")),
            Some("passed"),
            "phase {phase}"
        );
    }
    assert_eq!(
        report.section("ExampleTest").and_then(|s| s.get_str("example_test")),
        Some("passed")
    );
    assert!(report.failed_sections().is_empty());

    let text = std::fs::read_to_string(orch.config().run_dir.join("test_report.txt")).unwrap();
    assert!(text.starts_with("=== Test Results ===\n"));
    assert!(text.contains("Device: Scripted Device (Android 14)"));
    assert!(text.contains("App: com.example/.Main"));
    assert!(text.contains("  build: 42"));
    assert!(text.contains("\nNetworkTest:\n  offline: {\"ExamplePlugin\": {\"example_check\": \"passed\"}}"));
    assert!(text.contains("\nExampleTest:\n  example_test: passed"));

    assert_eq!(orch.state(), RunState::Terminated);
}

#[tokio::test]
async fn test_network_failure_is_recorded_and_cleaned_up() {
    let (_root, mut orch) = start(NETWORK_SCENARIO, |dir| {
        ScriptedDevice::new("emu-1", dir).fail_on("disable_network")
    })
    .await;

    let report = orch.run().await.unwrap();

    let network = report.section("NetworkTest").unwrap();
    assert!(network.is_error());
    assert!(network.get_str("error").unwrap().contains("disable_network"));
    assert_eq!(
        report.section("ExampleTest").and_then(|s| s.get_str("example_test")),
        Some("passed")
    );

    // The network test aborted before restoring connectivity, so the only
    // enable_network call is the one made during cleanup
    assert_eq!(orch.device().call_count("enable_network"), 1);
    assert_eq!(orch.device().call_count("launch_app"), 0);
    assert_eq!(orch.device().calls().last().map(String::as_str), Some("force_stop"));
}

#[tokio::test]
async fn test_unknown_units_are_skipped() {
    let yaml = "\
device_id: emu-1
app_package: com.example
app_activity: .Main
plugins: [example_plugin, no_such_plugin]
test_cases: [no_such_test, example_test]
";
    let (_root, mut orch) = start(yaml, |dir| ScriptedDevice::new("emu-1", dir)).await;
    assert_eq!(orch.test_case_names(), vec!["ExampleTest"]);

    let report = orch.run().await.unwrap();
    assert_eq!(report.results.keys().collect::<Vec<_>>(), vec!["ExampleTest"]);
}

#[tokio::test]
async fn test_screenshots_land_in_test_case_dir() {
    let yaml = "\
device_id: emu-1
app_package: com.example
app_activity: .Main
plugins: [screenshot_plugin]
test_cases: [network_test]
";
    let (_root, mut orch) = start(yaml, |dir| ScriptedDevice::new("emu-1", dir)).await;
    let report = orch.run().await.unwrap();

    let artifact_dir = orch.config().run_dir.join("NetworkTest");
    let network = report.section("NetworkTest").unwrap();
    let mut shots = Vec::new();
    for phase in ["offline", "online"] {
        let shot = network
            .get_map(phase)
            .and_then(|p| p.get_map("ScreenshotPlugin"))
            .and_then(|p| p.get_str("screenshot"))
            .unwrap();
        let shot = PathBuf::from(shot);
        assert_eq!(shot.parent(), Some(artifact_dir.as_path()));
        assert!(shot.is_file());
        shots.push(shot);
    }
    assert_ne!(shots[0], shots[1]);

    let json: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(orch.config().run_dir.join("test_report.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(
        json["results"]["NetworkTest"]["offline"]["ScreenshotPlugin"]["screenshot"],
        shots[0].to_string_lossy().as_ref()
    );
}

#[tokio::test]
async fn test_device_not_ready_aborts_before_any_test() {
    let root = tempdir().unwrap();
    let config = scenario_config(root.path(), NETWORK_SCENARIO);
    let device = ScriptedDevice::new("emu-1", &config.run_dir).fail_on("wait_ready");

    let err = Orchestrator::initialize(config, device, &Registries::builtin(), None)
        .await
        .err()
        .unwrap();
    assert!(matches!(err, Error::OrchestratorInit(_)));
    assert!(err.full_message().contains("not ready"));
}

#[tokio::test]
async fn test_run_log_written() {
    let root = tempdir().unwrap();
    let config = scenario_config(root.path(), NETWORK_SCENARIO);
    let run_dir = config.run_dir.clone();
    let logger = RunLogger::init(&run_dir, false).unwrap();
    let device = ScriptedDevice::new("emu-1", &run_dir);

    let mut orch = Orchestrator::initialize(config, device, &Registries::builtin(), Some(logger))
        .await
        .unwrap();
    orch.run().await.unwrap();
    drop(orch);

    let log = std::fs::read_to_string(run_dir.join("test_run.log")).unwrap();
    assert!(log.contains("Starting test run on device: Scripted Device (Android 14)"));
    assert!(log.contains("Test report generated"));
}

#[cfg(unix)]
mod binary {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::process::{Command, Output};

    /// Fake adb: `pull` writes the local file, everything else succeeds
    const HEALTHY_ADB: &str = "\
#!/bin/sh
case \"$3\" in
  pull) printf png > \"$5\" ;;
  *) echo ok ;;
esac
";

    const OFFLINE_ADB: &str = "\
#!/bin/sh
echo 'error: device offline' >&2
exit 1
";

    struct Workspace {
        dir: TempDir,
    }

    impl Workspace {
        fn new(adb_script: &str) -> Self {
            let dir = tempdir().unwrap();
            let adb = dir.path().join("adb");
            std::fs::write(&adb, adb_script).unwrap();
            std::fs::set_permissions(&adb, std::fs::Permissions::from_mode(0o755)).unwrap();
            Self { dir }
        }

        fn results_dir(&self) -> PathBuf {
            self.dir.path().join("results")
        }

        fn write_config(&self, body: &str) -> PathBuf {
            let path = self.dir.path().join("config.yaml");
            let config = format!(
                "{body}adb_path: {}\nresults_dir: {}\ntiming:\n  ready_timeout_secs: 1\n  launch_settle_secs: 0\n  network_settle_secs: 0\n  network_restore_secs: 0\n  analysis_settle_secs: 0\n",
                self.dir.path().join("adb").display(),
                self.results_dir().display(),
            );
            std::fs::write(&path, config).unwrap();
            path
        }

        fn droid(&self, args: &[&str]) -> Output {
            Command::new(env!("CARGO_BIN_EXE_droid"))
                .args(args)
                .current_dir(self.dir.path())
                .env_remove("RUST_LOG")
                .output()
                .unwrap()
        }

        /// The single run directory created under the results root
        fn run_dir(&self) -> PathBuf {
            let mut entries: Vec<_> = std::fs::read_dir(self.results_dir())
                .unwrap()
                .map(|e| e.unwrap().path())
                .collect();
            assert_eq!(entries.len(), 1, "expected exactly one run dir");
            entries.remove(0)
        }
    }

    const APP: &str = "device_id: emu-1\napp_package: com.example\napp_activity: .Main\n";

    #[test]
    fn test_run_writes_report() {
        let ws = Workspace::new(HEALTHY_ADB);
        let config = ws.write_config(&format!(
            "{APP}plugins: [example_plugin, screenshot_plugin]\ntest_cases: [network_test]\n"
        ));

        let out = ws.droid(&["run", "--config", config.to_str().unwrap(), "--test-case", "example_test"]);
        assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

        let stdout = String::from_utf8_lossy(&out.stdout);
        assert!(stdout.contains("NetworkTest"));
        assert!(stdout.contains("ExampleTest"));

        let run_dir = ws.run_dir();
        let report = std::fs::read_to_string(run_dir.join("test_report.txt")).unwrap();
        assert!(report.contains("Device: ok ok (Android ok)"));
        assert!(report.contains("\nNetworkTest:\n"));
        assert!(report.contains("\nExampleTest:\n  example_test: passed"));
        assert!(run_dir.join("test_run.log").is_file());

        let shots: Vec<_> = std::fs::read_dir(run_dir.join("NetworkTest")).unwrap().collect();
        assert_eq!(shots.len(), 2);
    }

    #[test]
    fn test_device_override_wins() {
        let ws = Workspace::new(HEALTHY_ADB);
        let config = ws.write_config(&format!("{APP}test_cases: [example_test]\n"));

        let out = ws.droid(&["run", "-c", config.to_str().unwrap(), "--device", "emu-9", "-v"]);
        assert!(out.status.success());

        let log = std::fs::read_to_string(ws.run_dir().join("test_run.log")).unwrap();
        assert!(log.contains("emu-9"));
    }

    #[test]
    fn test_missing_adb_is_initialization_error() {
        let ws = Workspace::new(HEALTHY_ADB);
        let empty_path = ws.dir.path().join("empty-bin");
        std::fs::create_dir(&empty_path).unwrap();
        let config = ws.dir.path().join("no-adb.yaml");
        std::fs::write(
            &config,
            format!(
                "{APP}test_cases: [example_test]\nresults_dir: {}\n",
                ws.results_dir().display()
            ),
        )
        .unwrap();

        let out = Command::new(env!("CARGO_BIN_EXE_droid"))
            .args(["run", "--config", config.to_str().unwrap()])
            .env("PATH", &empty_path)
            .env_remove("RUST_LOG")
            .output()
            .unwrap();
        assert_eq!(out.status.code(), Some(1));

        let stderr = String::from_utf8_lossy(&out.stderr);
        assert!(stderr.starts_with("Error: Orchestrator initialization failed: adb executable not found"));
    }

    #[test]
    fn test_unreachable_device_exits_nonzero() {
        let ws = Workspace::new(OFFLINE_ADB);
        let config = ws.write_config(&format!("{APP}test_cases: [example_test]\n"));

        let out = ws.droid(&["run", "--config", config.to_str().unwrap()]);
        assert_eq!(out.status.code(), Some(1));

        let stderr = String::from_utf8_lossy(&out.stderr);
        assert!(stderr.starts_with("Error: Orchestrator initialization failed"));
        assert!(!ws.run_dir().join("test_report.txt").exists());
    }

    #[test]
    fn test_missing_required_field_exits_nonzero() {
        let ws = Workspace::new(HEALTHY_ADB);
        let config = ws.write_config("device_id: emu-1\napp_package: com.example\n");

        let out = ws.droid(&["run", "--config", config.to_str().unwrap()]);
        assert_eq!(out.status.code(), Some(1));
        assert!(String::from_utf8_lossy(&out.stderr).contains("Configuration error"));
        assert!(!ws.results_dir().exists());
    }

    #[test]
    fn test_missing_config_file_exits_nonzero() {
        let ws = Workspace::new(HEALTHY_ADB);
        let out = ws.droid(&["run", "--config", "nope.yaml"]);
        assert_eq!(out.status.code(), Some(1));
        assert!(String::from_utf8_lossy(&out.stderr).contains("nope.yaml"));
    }

    #[test]
    fn test_list_shows_builtin_units() {
        let ws = Workspace::new(HEALTHY_ADB);
        let out = ws.droid(&["list"]);
        assert!(out.status.success());

        let stdout = String::from_utf8_lossy(&out.stdout);
        for name in ["example_plugin", "screenshot_plugin", "network_test", "example_test"] {
            assert!(stdout.contains(name), "missing {name}");
        }
    }
}
