//! Unit registry
//!
//! Maps the names used in configuration files (`network_test`,
//! `example_plugin`, ...) to factories producing live units.

use crate::common::config::RunConfiguration;
use crate::common::Result;

use super::{plugins, test_cases, Plugin, TestCase};

/// Builds one unit from the run configuration
pub type Factory<U> = Box<dyn Fn(&RunConfiguration) -> Result<Box<U>> + Send + Sync>;

struct Entry<U: ?Sized> {
    name: String,
    factory: Factory<U>,
}

/// Ordered name -> factory table
///
/// Registering a name twice is allowed; the last registration wins.
pub struct UnitRegistry<U: ?Sized> {
    /// Singular unit kind used in log messages ("plugin", "test case")
    kind: &'static str,
    entries: Vec<Entry<U>>,
}

impl<U: ?Sized> UnitRegistry<U> {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            entries: Vec::new(),
        }
    }

    /// Register a factory under `name`
    pub fn register<F>(&mut self, name: &str, factory: F) -> &mut Self
    where
        F: Fn(&RunConfiguration) -> Result<Box<U>> + Send + Sync + 'static,
    {
        self.entries.push(Entry {
            name: name.to_string(),
            factory: Box::new(factory),
        });
        self
    }

    /// Distinct registered names, in first-registration order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if !names.contains(&entry.name.as_str()) {
                names.push(&entry.name);
            }
        }
        names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    fn resolve(&self, name: &str) -> Option<&Entry<U>> {
        self.entries.iter().rev().find(|e| e.name == name)
    }

    /// Instantiate the units named in `names`, in order
    ///
    /// Unknown names and failing factories are logged and skipped, so the
    /// result may be shorter than `names`.
    pub fn load(&self, names: &[String], config: &RunConfiguration) -> Vec<Box<U>> {
        let mut units = Vec::with_capacity(names.len());

        for name in names {
            let Some(entry) = self.resolve(name) else {
                tracing::warn!(kind = self.kind, %name, "No {} registered under '{}'", self.kind, name);
                continue;
            };

            match (entry.factory)(config) {
                Ok(unit) => {
                    tracing::info!(kind = self.kind, %name, "Loaded {}: {}", self.kind, name);
                    units.push(unit);
                }
                Err(e) => {
                    tracing::error!(kind = self.kind, %name, error = %e, "Failed to load {} {}", self.kind, name);
                }
            }
        }

        if units.len() < names.len() {
            tracing::warn!(
                kind = self.kind,
                loaded = units.len(),
                declared = names.len(),
                "Some declared units could not be loaded"
            );
        }

        units
    }
}

/// Registry of the plugins shipped with the harness
pub fn builtin_plugins() -> UnitRegistry<dyn Plugin> {
    let mut registry = UnitRegistry::new("plugin");
    registry
        .register("example_plugin", |_| Ok(Box::new(plugins::ExamplePlugin) as Box<dyn Plugin>))
        .register("screenshot_plugin", |_| {
            Ok(Box::new(plugins::ScreenshotPlugin::new()) as Box<dyn Plugin>)
        })
        .register("activity_plugin", |_| Ok(Box::new(plugins::ActivityPlugin) as Box<dyn Plugin>))
        .register("network_state_plugin", |_| {
            Ok(Box::new(plugins::NetworkStatePlugin) as Box<dyn Plugin>)
        });
    registry
}

/// Registry of the test cases shipped with the harness
pub fn builtin_test_cases() -> UnitRegistry<dyn TestCase> {
    let mut registry = UnitRegistry::new("test case");
    registry
        .register("network_test", |config| {
            Ok(Box::new(test_cases::NetworkTest::new(config)) as Box<dyn TestCase>)
        })
        .register("example_test", |_| {
            Ok(Box::new(test_cases::ExampleTest) as Box<dyn TestCase>)
        });
    registry
}
