//! Spherical ↔ Cartesian conversions.
//!
//! Two conventions meet here:
//!
//! - **Source directions** are given as azimuth/elevation in degrees and
//!   placed in a y-up world ([`to_cartesian`]).
//! - **Polar response surfaces** are measured in a z-up frame: zenith angle
//!   `theta` from +Z, azimuth `phi` in the xy plane
//!   ([`to_upper_hemisphere_spherical`], [`from_zenith`]).

use std::f32::consts::FRAC_PI_2;

use glam::Vec3;

/// Zenith/azimuth angle pair in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphericalAngles {
    /// Angle from the +Z pole, clamped to [0, π/2].
    pub theta: f32,
    /// Azimuth in the xy plane from +X, in (-π, π].
    pub phi: f32,
}

/// Convert an azimuth/elevation direction (degrees) to a y-up position.
///
/// Elevations of exactly ±90° map to `(0, ±radius, 0)` regardless of
/// azimuth.
#[must_use]
pub fn to_cartesian(azimuth_deg: f32, elevation_deg: f32, radius: f32) -> Vec3 {
    if elevation_deg == 90.0 {
        return Vec3::new(0.0, radius, 0.0);
    }
    if elevation_deg == -90.0 {
        return Vec3::new(0.0, -radius, 0.0);
    }

    let theta = (90.0 - elevation_deg).to_radians();
    let phi = azimuth_deg.to_radians();
    Vec3::new(
        radius * theta.sin() * phi.cos(),
        radius * theta.cos(),
        radius * theta.sin() * phi.sin(),
    )
}

/// Angles of a z-up point, folded into the upper hemisphere.
///
/// Points below the xy plane keep their azimuth but get `theta = π/2`, so
/// downward-facing samples land on the equator instead of being discarded.
/// A zero-length point is treated as having length 1.
#[must_use]
pub fn to_upper_hemisphere_spherical(point: Vec3) -> SphericalAngles {
    let r = point.length();
    let r = if r > f32::EPSILON && r.is_finite() { r } else { 1.0 };
    let phi = point.y.atan2(point.x);
    let theta = (point.z / r).clamp(-1.0, 1.0).acos();

    SphericalAngles {
        theta: if theta.is_finite() { theta.min(FRAC_PI_2) } else { FRAC_PI_2 },
        phi: if phi.is_finite() { phi } else { 0.0 },
    }
}

/// Position at `radius` along the z-up direction given by `angles`.
#[must_use]
pub fn from_zenith(angles: SphericalAngles, radius: f32) -> Vec3 {
    let (sin_t, cos_t) = angles.theta.sin_cos();
    let (sin_p, cos_p) = angles.phi.sin_cos();
    Vec3::new(radius * sin_t * cos_p, radius * sin_t * sin_p, radius * cos_t)
}

#[cfg(test)]
mod tests {
    use std::f32::consts::PI;

    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn poles_are_exact_for_any_azimuth() {
        for az in [0.0, 37.5, 90.0, 180.0, -45.0, 359.9] {
            assert_eq!(to_cartesian(az, 90.0, 5.0), Vec3::new(0.0, 5.0, 0.0));
            assert_eq!(
                to_cartesian(az, -90.0, 5.0),
                Vec3::new(0.0, -5.0, 0.0)
            );
        }
    }

    #[test]
    fn horizon_directions() {
        assert!(close(to_cartesian(0.0, 0.0, 2.0), Vec3::new(2.0, 0.0, 0.0)));
        assert!(close(
            to_cartesian(90.0, 0.0, 2.0),
            Vec3::new(0.0, 0.0, 2.0)
        ));
        assert!(close(
            to_cartesian(180.0, 0.0, 1.0),
            Vec3::new(-1.0, 0.0, 0.0)
        ));
    }

    #[test]
    fn elevation_raises_y() {
        let p = to_cartesian(0.0, 30.0, 1.0);
        assert!((p.y - 0.5).abs() < 1e-6);
        assert!((p.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn lower_hemisphere_folds_to_equator() {
        let a = to_upper_hemisphere_spherical(Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(a.theta, FRAC_PI_2);

        let b = to_upper_hemisphere_spherical(Vec3::new(1.0, 1.0, -3.0));
        assert_eq!(b.theta, FRAC_PI_2);
        assert!((b.phi - PI / 4.0).abs() < 1e-6);
    }

    #[test]
    fn zero_vector_is_finite() {
        let a = to_upper_hemisphere_spherical(Vec3::ZERO);
        assert!(a.theta.is_finite() && a.phi.is_finite());
        assert!((a.theta - FRAC_PI_2).abs() < 1e-6);
        assert_eq!(a.phi, 0.0);
    }

    #[test]
    fn upper_points_round_trip() {
        let p = Vec3::new(0.3, -0.4, 0.8);
        let angles = to_upper_hemisphere_spherical(p);
        assert!(close(from_zenith(angles, p.length()), p));
    }

    #[test]
    fn output_stays_upper() {
        for i in 0..64 {
            let t = i as f32 * 0.37;
            let p = Vec3::new(t.cos(), t.sin(), (t * 1.3).sin());
            let q = from_zenith(to_upper_hemisphere_spherical(p), 3.0);
            assert!(q.z >= -1e-6, "{p:?} mapped below equator: {q:?}");
        }
    }
}
