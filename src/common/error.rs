//! Error types for the test harness
//!
//! Unit-level failures (one plugin, one test case) are converted into
//! `{"error": message}` records by the analyzer and the orchestrator.
//! Session and initialization failures are fatal to the run.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the harness
#[derive(Error, Debug)]
pub enum Error {
    // === Device Errors ===
    #[error("Device command '{command}' failed: {message}")]
    Device { command: String, message: String },

    #[error("Device '{device}' not ready after {secs} seconds")]
    DeviceTimeout { device: String, secs: u64 },

    #[error("adb executable not found. Install platform-tools or set 'adb_path' in the config")]
    AdbNotFound,

    // === Unit Errors ===
    #[error("Behavior analysis failed")]
    Analysis(#[source] Box<Error>),

    #[error("Plugin '{plugin}' failed: {message}")]
    Plugin { plugin: String, message: String },

    #[error("Test case '{test_case}' failed: {message}")]
    TestCase { test_case: String, message: String },

    // === Run Errors ===
    #[error("Orchestrator initialization failed")]
    OrchestratorInit(#[source] Box<Error>),

    #[error("Test run failed")]
    Run(#[source] Box<Error>),

    #[error("Unexpected error: {0}")]
    Panic(String),

    #[error("Run cannot start from state '{0}'")]
    InvalidState(String),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === IO Errors ===
    #[error("IO error")]
    Io(#[from] io::Error),

    // === Serialization Errors ===
    #[error("JSON error")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a device error for a failed command
    pub fn device(command: &str, message: &str) -> Self {
        Self::Device {
            command: command.to_string(),
            message: message.to_string(),
        }
    }

    /// Create a plugin error
    pub fn plugin(plugin: &str, message: impl Into<String>) -> Self {
        Self::Plugin {
            plugin: plugin.to_string(),
            message: message.into(),
        }
    }

    /// Create a test case error
    pub fn test_case(test_case: &str, message: impl Into<String>) -> Self {
        Self::TestCase {
            test_case: test_case.to_string(),
            message: message.into(),
        }
    }

    /// Whether this error came from the device bridge
    pub fn is_device(&self) -> bool {
        match self {
            Error::Device { .. } | Error::DeviceTimeout { .. } | Error::AdbNotFound => true,
            Error::Analysis(inner) => inner.is_device(),
            _ => false,
        }
    }

    /// This error and its causes on one line, separated by `: `
    pub fn full_message(&self) -> String {
        let mut out = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            out.push_str(": ");
            out.push_str(&cause.to_string());
            source = cause.source();
        }
        out
    }
}

/// Render an error with its full source chain, one cause per line
pub fn chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str("\n  caused by: ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_error_message() {
        let err = Error::device("shell svc wifi disable", "no devices/emulators found");
        assert_eq!(
            err.to_string(),
            "Device command 'shell svc wifi disable' failed: no devices/emulators found"
        );
        assert!(err.is_device());
    }

    #[test]
    fn test_analysis_wraps_device_error() {
        let err = Error::Analysis(Box::new(Error::DeviceTimeout {
            device: "emu-1".to_string(),
            secs: 3,
        }));
        assert!(err.is_device());
        assert_eq!(
            err.full_message(),
            "Behavior analysis failed: Device 'emu-1' not ready after 3 seconds"
        );
    }

    #[test]
    fn test_chain_lists_sources() {
        let err = Error::Run(Box::new(Error::Io(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "denied",
        ))));
        assert_eq!(
            chain(&err),
            "Test run failed\n  caused by: IO error\n  caused by: denied"
        );
        assert_eq!(err.full_message(), "Test run failed: IO error: denied");
    }

    #[test]
    fn test_chain_names_each_cause_once() {
        let err = Error::OrchestratorInit(Box::new(Error::DeviceTimeout {
            device: "emu-1".to_string(),
            secs: 30,
        }));
        let rendered = chain(&err);
        assert_eq!(rendered.matches("not ready after 30 seconds").count(), 1);
        assert_eq!(rendered.lines().count(), 2);
    }
}
