use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Camera", inline)]
#[serde(default)]
/// Camera projection and orbit control parameters.
pub struct CameraOptions {
    /// Vertical field of view in degrees (landscape viewports).
    #[schemars(title = "Field of View", range(min = 20.0, max = 90.0), extend("step" = 1.0))]
    pub fovy: f32,
    /// Vertical field of view for portrait viewports.
    #[schemars(skip)]
    pub portrait_fovy: f32,
    /// Near clipping plane distance.
    #[schemars(skip)]
    pub znear: f32,
    /// Far clipping plane distance.
    #[schemars(skip)]
    pub zfar: f32,
    /// Closest orbit distance.
    #[schemars(skip)]
    pub min_distance: f32,
    /// Farthest orbit distance.
    #[schemars(skip)]
    pub max_distance: f32,
    /// Fraction of pending motion applied per frame; 0 disables damping.
    #[schemars(title = "Damping", range(min = 0.0, max = 1.0), extend("step" = 0.05))]
    pub damping_factor: f32,
    /// Orbit angle per pixel of drag, in radians.
    #[schemars(title = "Rotate Speed", range(min = 0.001, max = 0.05), extend("step" = 0.001))]
    pub rotate_speed: f32,
    /// Pan distance per pixel of drag, as a fraction of orbit distance.
    #[schemars(title = "Pan Speed", range(min = 0.0005, max = 0.01), extend("step" = 0.0005))]
    pub pan_speed: f32,
    /// Fractional distance change per scroll unit.
    #[schemars(title = "Zoom Speed", range(min = 0.01, max = 0.5), extend("step" = 0.01))]
    pub zoom_speed: f32,
    /// Initial eye position of every viewport.
    #[schemars(skip)]
    pub initial_position: [f32; 3],
    /// Initial orbit target of every viewport.
    #[schemars(skip)]
    pub initial_target: [f32; 3],
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            fovy: 45.0,
            portrait_fovy: 60.0,
            znear: 0.1,
            zfar: 1000.0,
            min_distance: 3.0,
            max_distance: 30.0,
            damping_factor: 0.1,
            rotate_speed: 0.01,
            pan_speed: 0.002,
            zoom_speed: 0.1,
            initial_position: [10.0, 10.0, 10.0],
            initial_target: [0.0, 0.0, 0.0],
        }
    }
}
