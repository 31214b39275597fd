use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::geometry::polar_mesh::DEFAULT_PRESSURE_LIM;
use crate::geometry::pressure::DEFAULT_SCALE;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Mesh", inline)]
#[serde(default)]
/// Polar response mesh parameters.
pub struct MeshOptions {
    /// Radius of a peak-pressure vertex.
    #[schemars(title = "Radius Scale", range(min = 0.5, max = 20.0), extend("step" = 0.5))]
    pub radius_scale: f32,
    /// dB window below the peak mapped into the visible range.
    #[schemars(title = "Pressure Limit (dB)", range(min = 1.0, max = 120.0), extend("step" = 1.0))]
    pub pressure_lim: f32,
    /// Smallest pressure window the UI accepts.
    #[schemars(skip)]
    pub min_pressure_lim: f32,
}

impl Default for MeshOptions {
    fn default() -> Self {
        Self {
            radius_scale: DEFAULT_SCALE,
            pressure_lim: DEFAULT_PRESSURE_LIM,
            min_pressure_lim: 1.0,
        }
    }
}
