//! Camera system for the comparison viewports.
//!
//! Provides the pose type, an orbit camera with damping, and the
//! controller that keeps several viewports' cameras in lockstep.

/// Orbit camera with rotate, pan, zoom and damping.
pub mod orbit;
/// Camera position plus orbit target.
pub mod pose;
/// Cross-viewport pose broadcast and the shared sync group.
pub mod sync;
/// Fixed-interval rate limiter.
pub mod throttle;

pub use orbit::OrbitCamera;
pub use pose::CameraPose;
pub use sync::{
    CameraSyncController, ListenerId, SyncGroup, SyncState, ViewportId,
};
pub use throttle::Throttle;
