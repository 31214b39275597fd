//! Orbit camera for a single viewport.
//!
//! The pose is stored exactly as set, so a pose received from another
//! viewport reproduces that view bit for bit. Rotation, pan and zoom are
//! expressed relative to the current pose with `+Z` as world up. With
//! damping enabled, gestures accumulate and [`OrbitCamera::update`] eases
//! the pose toward them one frame at a time.

use glam::{Mat4, Quat, Vec2, Vec3};

use super::pose::CameraPose;
use crate::options::CameraOptions;

/// Smallest polar angle (from world up) the camera may orbit to.
const POLE_MARGIN: f32 = 0.01;
/// Pending motion below this magnitude is considered settled.
const SETTLE_EPSILON: f32 = 1e-4;

/// Gesture motion not yet applied to the pose.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Motion {
    /// Orbit angles in radians (x: around world up, y: around camera right).
    rotate: Vec2,
    /// Pan in pixels.
    pan: Vec2,
    /// Scroll units.
    zoom: f32,
}

impl Motion {
    fn is_settled(&self) -> bool {
        self.rotate.length() < SETTLE_EPSILON
            && self.pan.length() < SETTLE_EPSILON
            && self.zoom.abs() < SETTLE_EPSILON
    }

    fn scaled(&self, factor: f32) -> Self {
        Self {
            rotate: self.rotate * factor,
            pan: self.pan * factor,
            zoom: self.zoom * factor,
        }
    }
}

/// Interactive orbit camera.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pose: CameraPose,
    up: Vec3,
    aspect: f32,
    options: CameraOptions,
    pending: Motion,
}

impl OrbitCamera {
    /// Camera at the initial pose configured in `options`.
    #[must_use]
    pub fn new(options: &CameraOptions) -> Self {
        Self {
            pose: CameraPose::from_options(options),
            up: Vec3::Z,
            aspect: 1.0,
            options: options.clone(),
            pending: Motion::default(),
        }
    }

    /// Current pose.
    #[must_use]
    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    /// Replace the pose exactly and drop any motion still being eased in.
    pub fn set_pose(&mut self, pose: CameraPose) {
        self.pose = pose;
        self.pending = Motion::default();
    }

    /// Options this camera was built with.
    #[must_use]
    pub fn options(&self) -> &CameraOptions {
        &self.options
    }

    /// Distance from eye to target.
    #[must_use]
    pub fn distance(&self) -> f32 {
        self.pose.distance()
    }

    /// Viewport aspect ratio (width / height).
    #[must_use]
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Update the aspect ratio after a viewport resize.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Vertical field of view in degrees: wider for portrait viewports.
    #[must_use]
    pub fn fovy(&self) -> f32 {
        if self.aspect < 1.0 {
            self.options.portrait_fovy
        } else {
            self.options.fovy
        }
    }

    /// Camera orientation: `-Z` looks at the target, `+Y` is screen up.
    #[must_use]
    pub fn orientation(&self) -> Quat {
        let view = Mat4::look_at_rh(self.pose.position, self.pose.target, self.safe_up());
        Quat::from_mat4(&view.inverse())
    }

    /// Whether gestures are eased in over several frames.
    #[must_use]
    pub fn is_damped(&self) -> bool {
        self.options.damping_factor > 0.0 && self.options.damping_factor < 1.0
    }

    /// Whether damped motion remains to be applied.
    #[must_use]
    pub fn is_settling(&self) -> bool {
        !self.pending.is_settled()
    }

    /// Orbit by a pixel drag delta.
    pub fn rotate(&mut self, delta: Vec2) {
        let motion = Motion {
            rotate: delta * self.options.rotate_speed,
            ..Motion::default()
        };
        self.push(motion);
    }

    /// Translate eye and target by a pixel drag delta.
    pub fn pan(&mut self, delta: Vec2) {
        self.push(Motion {
            pan: delta,
            ..Motion::default()
        });
    }

    /// Dolly toward (positive) or away from the target.
    pub fn zoom(&mut self, delta: f32) {
        self.push(Motion {
            zoom: delta,
            ..Motion::default()
        });
    }

    /// Advance damping by one frame. Returns whether the pose moved.
    pub fn update(&mut self) -> bool {
        if !self.is_damped() || self.pending.is_settled() {
            self.pending = Motion::default();
            return false;
        }
        let step = self.pending.scaled(self.options.damping_factor);
        self.pending = self.pending.scaled(1.0 - self.options.damping_factor);
        let before = self.pose;
        self.apply(step);
        self.pose != before
    }

    /// Frame a bounding sphere, keeping the current viewing direction.
    pub fn fit_to_radius(&mut self, center: Vec3, radius: f32) {
        let half_fov = (self.fovy().to_radians() * 0.5).tan();
        let fit = if half_fov > 0.0 {
            radius.max(0.0) / half_fov * 1.5
        } else {
            self.options.max_distance
        };
        let distance = fit.clamp(self.options.min_distance, self.options.max_distance);
        let dir = self.direction();
        self.set_pose(CameraPose::new(center + dir * distance, center));
    }

    /// View matrix.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.pose.position, self.pose.target, self.safe_up())
    }

    /// Projection matrix (`[0, 1]` depth range).
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fovy().to_radians(),
            self.aspect,
            self.options.znear,
            self.options.zfar,
        )
    }

    /// Combined view-projection matrix.
    #[must_use]
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    fn push(&mut self, motion: Motion) {
        if self.is_damped() {
            self.pending.rotate += motion.rotate;
            self.pending.pan += motion.pan;
            self.pending.zoom += motion.zoom;
        } else {
            self.apply(motion);
        }
    }

    /// Unit vector from target to eye, with a fallback for a collapsed pose.
    fn direction(&self) -> Vec3 {
        self.pose
            .offset()
            .try_normalize()
            .unwrap_or_else(|| Vec3::ONE.normalize())
    }

    /// World up, or `+Y` when looking straight along it.
    fn safe_up(&self) -> Vec3 {
        if self.direction().cross(self.up).length_squared() < 1e-8 {
            Vec3::Y
        } else {
            self.up
        }
    }

    fn apply(&mut self, motion: Motion) {
        if motion.rotate != Vec2::ZERO {
            self.apply_rotation(motion.rotate);
        }
        if motion.pan != Vec2::ZERO {
            self.apply_pan(motion.pan);
        }
        if motion.zoom != 0.0 {
            self.apply_zoom(motion.zoom);
        }
    }

    fn apply_rotation(&mut self, angles: Vec2) {
        let offset = self.pose.offset();
        if offset.length_squared() == 0.0 {
            return;
        }

        // Horizontal: around world up.
        let horizontal = Quat::from_axis_angle(self.up, -angles.x);
        let mut offset = horizontal * offset;

        // Vertical: around camera right, clamped short of the poles.
        if let Some(right) = (-offset).cross(self.up).try_normalize() {
            let polar = offset.angle_between(self.up);
            let wanted = (polar - angles.y)
                .clamp(POLE_MARGIN, std::f32::consts::PI - POLE_MARGIN);
            offset = Quat::from_axis_angle(right, wanted - polar) * offset;
        }

        self.pose.position = self.pose.target + offset;
    }

    fn apply_pan(&mut self, delta: Vec2) {
        let forward = -self.direction();
        let Some(right) = forward.cross(self.safe_up()).try_normalize() else {
            return;
        };
        let screen_up = right.cross(forward);
        let scale = self.options.pan_speed * self.distance().max(self.options.min_distance);
        let translation = (right * -delta.x + screen_up * delta.y) * scale;
        self.pose = self.pose.translated(translation);
    }

    fn apply_zoom(&mut self, delta: f32) {
        let distance = (self.distance() * (1.0 - delta * self.options.zoom_speed))
            .clamp(self.options.min_distance, self.options.max_distance);
        self.pose.position = self.pose.target + self.direction() * distance;
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(&CameraOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn undamped() -> OrbitCamera {
        OrbitCamera::new(&CameraOptions {
            damping_factor: 0.0,
            ..CameraOptions::default()
        })
    }

    #[test]
    fn starts_at_configured_pose() {
        let cam = OrbitCamera::default();
        assert_eq!(cam.pose().position, Vec3::splat(10.0));
        assert_eq!(cam.pose().target, Vec3::ZERO);
    }

    #[test]
    fn rotate_keeps_distance_and_target() {
        let mut cam = undamped();
        let d = cam.distance();
        cam.rotate(Vec2::new(40.0, 15.0));
        assert!((cam.distance() - d).abs() < 1e-3);
        assert_eq!(cam.pose().target, Vec3::ZERO);
        assert_ne!(cam.pose().position, Vec3::splat(10.0));
    }

    #[test]
    fn rotate_stops_at_pole() {
        let mut cam = undamped();
        for _ in 0..100 {
            cam.rotate(Vec2::new(0.0, 50.0));
        }
        let polar = cam.pose().offset().angle_between(Vec3::Z);
        assert!(polar >= POLE_MARGIN * 0.5);
        assert!(polar <= std::f32::consts::PI - POLE_MARGIN * 0.5);
    }

    #[test]
    fn zoom_clamps_distance() {
        let mut cam = undamped();
        cam.zoom(100.0);
        assert!((cam.distance() - 3.0).abs() < 1e-4);
        for _ in 0..50 {
            cam.zoom(-5.0);
        }
        assert!((cam.distance() - 30.0).abs() < 1e-3);
    }

    #[test]
    fn pan_moves_eye_and_target_together() {
        let mut cam = undamped();
        let before = cam.pose();
        cam.pan(Vec2::new(10.0, 0.0));
        let after = cam.pose();
        assert_ne!(after.target, before.target);
        assert!((after.offset() - before.offset()).length() < 1e-4);
    }

    #[test]
    fn damping_eases_in_and_settles() {
        let mut cam = OrbitCamera::default();
        let start = cam.pose();
        cam.rotate(Vec2::new(30.0, 0.0));
        assert_eq!(cam.pose(), start);
        assert!(cam.is_settling());

        assert!(cam.update());
        let first = cam.pose();
        assert_ne!(first, start);

        let mut frames = 0;
        while cam.update() {
            frames += 1;
            assert!(frames < 1000);
        }
        assert!(!cam.is_settling());
        assert!(!cam.update());
    }

    #[test]
    fn set_pose_is_exact_and_cancels_motion() {
        let mut cam = OrbitCamera::default();
        cam.rotate(Vec2::new(30.0, 0.0));
        let pose = CameraPose::new(Vec3::new(1.5, -2.25, 7.0), Vec3::new(0.1, 0.2, 0.3));
        cam.set_pose(pose);
        assert_eq!(cam.pose(), pose);
        assert!(!cam.update());
        assert_eq!(cam.pose(), pose);
    }

    #[test]
    fn portrait_widens_fov() {
        let mut cam = OrbitCamera::default();
        cam.resize(1600, 900);
        assert_eq!(cam.fovy(), 45.0);
        cam.resize(600, 900);
        assert_eq!(cam.fovy(), 60.0);
        cam.resize(0, 900);
        assert_eq!(cam.fovy(), 60.0);
    }

    #[test]
    fn target_projects_to_screen_center() {
        let cam = OrbitCamera::default();
        let clip = cam.view_projection() * cam.pose().target.extend(1.0);
        assert!((clip.x / clip.w).abs() < 1e-5);
        assert!((clip.y / clip.w).abs() < 1e-5);
    }

    #[test]
    fn orientation_looks_at_target() {
        let cam = OrbitCamera::default();
        let forward = cam.orientation() * Vec3::NEG_Z;
        let expected = (cam.pose().target - cam.pose().position).normalize();
        assert!((forward - expected).length() < 1e-4);
    }

    #[test]
    fn fit_to_radius_frames_sphere() {
        let mut cam = OrbitCamera::default();
        cam.fit_to_radius(Vec3::new(0.0, 0.0, 1.0), 5.0);
        assert_eq!(cam.pose().target, Vec3::new(0.0, 0.0, 1.0));
        let expected = (5.0 / (22.5_f32.to_radians()).tan() * 1.5).clamp(3.0, 30.0);
        assert!((cam.distance() - expected).abs() < 1e-3);
    }
}
