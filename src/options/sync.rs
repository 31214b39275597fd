use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Camera Sync", inline)]
#[serde(default)]
/// Multi-viewport camera synchronization.
pub struct SyncOptions {
    /// Link camera movement across viewports.
    #[schemars(title = "Sync Camera Movement")]
    pub enabled: bool,
    /// Minimum time between two broadcasts, in milliseconds.
    #[schemars(skip)]
    pub throttle_ms: u64,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            throttle_ms: 30,
        }
    }
}
