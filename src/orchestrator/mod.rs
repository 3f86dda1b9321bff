//! Test run orchestration
//!
//! The orchestrator owns the device session, the loaded units and the run
//! configuration for one run, and moves through
//! `Initializing -> Ready -> Running -> ReportGenerating -> CleaningUp -> Terminated`
//! (or `Failed`).
//!
//! Failures are contained per test case: an error or panic inside one test
//! case becomes `{"error": message}` in its report section and the run
//! continues. Cleanup (re-enable networking, stop the app) runs exactly once
//! at the end of [`Orchestrator::run`], whatever happened before it.

pub mod artifacts;
pub mod report;

pub use artifacts::extract_artifacts;
pub use report::RunReport;

use futures_util::FutureExt;
use std::fmt;
use std::panic::AssertUnwindSafe;

use crate::analyzer::BehaviorAnalyzer;
use crate::common::config::RunConfiguration;
use crate::common::logging::RunLogger;
use crate::common::{panic_message, paths, Error, Result};
use crate::device::Device;
use crate::result::{ResultMap, Value};
use crate::units::registry::{builtin_plugins, builtin_test_cases};
use crate::units::{Plugin, TestCase, UnitRegistry};

/// Lifecycle state of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Initializing,
    Ready,
    Running,
    ReportGenerating,
    CleaningUp,
    Terminated,
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initializing => write!(f, "initializing"),
            Self::Ready => write!(f, "ready"),
            Self::Running => write!(f, "running"),
            Self::ReportGenerating => write!(f, "report generating"),
            Self::CleaningUp => write!(f, "cleaning up"),
            Self::Terminated => write!(f, "terminated"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Unit registries consulted during initialization
pub struct Registries {
    pub plugins: UnitRegistry<dyn Plugin>,
    pub test_cases: UnitRegistry<dyn TestCase>,
}

impl Registries {
    /// Registries holding the built-in units
    pub fn builtin() -> Self {
        Self {
            plugins: builtin_plugins(),
            test_cases: builtin_test_cases(),
        }
    }
}

/// Drives one run against one device
pub struct Orchestrator<D: Device> {
    config: RunConfiguration,
    device: D,
    analyzer: BehaviorAnalyzer,
    test_cases: Vec<Box<dyn TestCase>>,
    state: RunState,
    /// Keeps the run's log sinks installed for the orchestrator's lifetime
    _logger: Option<RunLogger>,
}

impl<D: Device> Orchestrator<D> {
    /// Wait for the device and load the configured units
    ///
    /// Nothing on the device has been changed yet when this fails, so no
    /// cleanup is attempted.
    pub async fn initialize(
        config: RunConfiguration,
        device: D,
        registries: &Registries,
        logger: Option<RunLogger>,
    ) -> Result<Self> {
        tracing::info!(
            run_id = %config.run_id,
            device = device.id(),
            state = %RunState::Initializing,
            "Initializing test run"
        );

        if let Err(e) = device.wait_ready(config.timing.ready_timeout()).await {
            tracing::error!(error = %e.full_message(), "Device not ready, aborting run");
            return Err(Error::OrchestratorInit(Box::new(e)));
        }

        let plugins = registries.plugins.load(&config.plugins, &config);
        let analyzer = BehaviorAnalyzer::new(plugins, &config.timing);
        let test_cases = registries.test_cases.load(&config.test_cases, &config);

        tracing::info!(
            plugins = ?analyzer.plugin_names(),
            test_cases = ?test_cases.iter().map(|t| t.name()).collect::<Vec<_>>(),
            "Units loaded"
        );

        let mut orchestrator = Self {
            config,
            device,
            analyzer,
            test_cases,
            state: RunState::Initializing,
            _logger: logger,
        };
        orchestrator.transition(RunState::Ready);
        Ok(orchestrator)
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn config(&self) -> &RunConfiguration {
        &self.config
    }

    /// Names of the loaded test cases, in execution order
    pub fn test_case_names(&self) -> Vec<&'static str> {
        self.test_cases.iter().map(|t| t.name()).collect()
    }

    fn transition(&mut self, next: RunState) {
        tracing::debug!(from = %self.state, to = %next, "Run state");
        self.state = next;
    }

    /// Run every test case, write the report, then clean up
    ///
    /// Returns [`Error::Run`] when a failure escapes per-test-case
    /// isolation; cleanup has already run by then. A run happens at most
    /// once: calling this again returns [`Error::InvalidState`] and touches
    /// nothing on the device.
    pub async fn run(&mut self) -> Result<RunReport> {
        if self.state != RunState::Ready {
            return Err(Error::InvalidState(self.state.to_string()));
        }

        let outcome = AssertUnwindSafe(self.execute()).catch_unwind().await;

        self.cleanup().await;

        let error = match outcome {
            Ok(Ok(report)) => {
                self.transition(RunState::Terminated);
                return Ok(report);
            }
            Ok(Err(e)) => e,
            Err(payload) => Error::Panic(panic_message(payload.as_ref())),
        };

        tracing::error!(error = %error.full_message(), "Test run failed");
        self.transition(RunState::Failed);
        Err(Error::Run(Box::new(error)))
    }

    async fn execute(&mut self) -> Result<RunReport> {
        self.transition(RunState::Running);

        let device_info = match self.device.device_info().await {
            Ok(info) => info,
            Err(e) => {
                tracing::warn!(error = %e, "Could not query device info");
                "unknown".to_string()
            }
        };
        tracing::info!("Starting test run on device: {}", device_info);

        let mut results = ResultMap::new();
        for test_case in &self.test_cases {
            let name = test_case.name();
            tracing::info!(test_case = name, "Running test case");
            let section = self.run_test_case(test_case.as_ref()).await;
            results.insert(name, section);
        }

        self.transition(RunState::ReportGenerating);
        self.extract_all(&mut results);

        let report = RunReport::new(&self.config, device_info, results);
        report.write(&self.config.run_dir)?;
        Ok(report)
    }

    /// Run one test case, converting any failure into an error record
    async fn run_test_case(&self, test_case: &dyn TestCase) -> ResultMap {
        let name = test_case.name();
        let attempt = async {
            self.device.wait_ready(self.config.timing.ready_timeout()).await?;
            test_case.run(&self.device, &self.analyzer).await
        };

        match AssertUnwindSafe(attempt).catch_unwind().await {
            Ok(Ok(results)) => {
                tracing::info!(test_case = name, "Test case completed");
                results
            }
            Ok(Err(e)) => {
                let message = e.full_message();
                tracing::error!(test_case = name, error = %message, "Test case failed");
                ResultMap::error(message)
            }
            Err(payload) => {
                let message = format!("unexpected error: {}", panic_message(payload.as_ref()));
                tracing::error!(test_case = name, error = %message, "Test case panicked");
                ResultMap::error(message)
            }
        }
    }

    fn extract_all(&self, results: &mut ResultMap) {
        for (test_case, section) in results.iter_mut() {
            if let Value::Nested(map) = section {
                let dir = paths::artifact_dir(&self.config.run_dir, test_case);
                let moved = extract_artifacts(map, &dir);
                if moved > 0 {
                    tracing::info!(test_case, moved, "Artifacts saved to {}", dir.display());
                }
            }
        }
    }

    /// Restore networking and stop the app; failures are only logged
    async fn cleanup(&mut self) {
        self.transition(RunState::CleaningUp);

        if let Err(e) = self.device.enable_network().await {
            tracing::warn!(error = %e, "Cleanup: failed to re-enable network");
        }
        if let Err(e) = self.device.force_stop(&self.config.app_package).await {
            tracing::warn!(error = %e, "Cleanup: failed to stop {}", self.config.app_package);
        }
    }
}
