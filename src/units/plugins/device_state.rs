//! Plugins recording device state during an analysis pass

use async_trait::async_trait;

use crate::common::Result;
use crate::device::Device;
use crate::result::ResultMap;
use crate::units::Plugin;

/// Records the currently resumed activity
pub struct ActivityPlugin;

#[async_trait]
impl Plugin for ActivityPlugin {
    fn name(&self) -> &'static str {
        "ActivityPlugin"
    }

    async fn run(&self, device: &dyn Device) -> Result<ResultMap> {
        let activity = device.current_activity().await?;
        let mut results = ResultMap::new();
        results.insert("current_activity", activity.trim());
        Ok(results)
    }
}

/// Records WiFi and mobile data state
pub struct NetworkStatePlugin;

#[async_trait]
impl Plugin for NetworkStatePlugin {
    fn name(&self) -> &'static str {
        "NetworkStatePlugin"
    }

    async fn run(&self, device: &dyn Device) -> Result<ResultMap> {
        let state = device.network_state().await?;
        let mut results = ResultMap::new();
        results.insert("network_state", state);
        Ok(results)
    }
}
