use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::options::CameraOptions;

/// Camera position plus orbit target: the minimal state that reproduces a
/// view, and the unit exchanged between synchronized viewports.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    /// Eye position in world space.
    pub position: Vec3,
    /// Orbit target in world space.
    pub target: Vec3,
}

impl CameraPose {
    /// Pose looking from `position` at `target`.
    #[must_use]
    pub fn new(position: Vec3, target: Vec3) -> Self {
        Self { position, target }
    }

    /// Initial pose configured in `options`.
    #[must_use]
    pub fn from_options(options: &CameraOptions) -> Self {
        Self::new(
            Vec3::from_array(options.initial_position),
            Vec3::from_array(options.initial_target),
        )
    }

    /// Distance from eye to target.
    #[must_use]
    pub fn distance(&self) -> f32 {
        self.position.distance(self.target)
    }

    /// Vector from target to eye.
    #[must_use]
    pub fn offset(&self) -> Vec3 {
        self.position - self.target
    }

    /// Same pose moved by `delta`.
    #[must_use]
    pub fn translated(&self, delta: Vec3) -> Self {
        Self::new(self.position + delta, self.target + delta)
    }
}

impl Default for CameraPose {
    fn default() -> Self {
        Self::from_options(&CameraOptions::default())
    }
}
