use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Source Markers", inline)]
#[serde(default)]
/// Source-direction marker placement and pulse animation.
pub struct MarkerOptions {
    /// Radius of the shell the markers sit on.
    #[schemars(skip)]
    pub radius: f32,
    /// Relative scale amplitude of the pulse.
    #[schemars(title = "Pulse Amount", range(min = 0.0, max = 0.5), extend("step" = 0.01))]
    pub pulse_amount: f32,
    /// Angular rate of the pulse, radians per millisecond.
    #[schemars(skip)]
    pub pulse_rate: f32,
    /// Per-marker phase shift in random-incidence mode.
    #[schemars(skip)]
    pub phase_step: f32,
}

impl Default for MarkerOptions {
    fn default() -> Self {
        Self {
            radius: 5.0,
            pulse_amount: 0.1,
            pulse_rate: 0.005,
            phase_step: 0.2,
        }
    }
}
