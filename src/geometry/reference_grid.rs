//! Static angular reference overlay drawn around every polar mesh.
//!
//! The grid depends only on `(radius, segments)`, never on sample data, so
//! it is built once per distinct pair and shared through [`GridCache`].

use std::rc::Rc;

use glam::Vec3;
use rustc_hash::FxHashMap;

use crate::error::ScatterError;

/// Tone for major ticks (30° multiples).
pub const MAJOR_COLOR: [f32; 3] = [0x44 as f32 / 255.0; 3];
/// Tone for minor ticks and rings.
pub const MINOR_COLOR: [f32; 3] = [0xCC as f32 / 255.0; 3];
/// Default distance between the outer ring and the label anchors.
pub const DEFAULT_LABEL_OFFSET: f32 = 0.3;

/// Which plane a label or line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridPlane {
    /// The xy plane (azimuth ring).
    Azimuth,
    /// The xz plane (elevation arc).
    Elevation,
}

/// A colored polyline.
#[derive(Debug, Clone, PartialEq)]
pub struct GridLine {
    /// Consecutive points of the polyline.
    pub points: Vec<Vec3>,
    /// Line color.
    pub color: [f32; 3],
    /// Plane the line lies in.
    pub plane: GridPlane,
}

/// Anchor point for an angle label.
#[derive(Debug, Clone, PartialEq)]
pub struct GridLabel {
    /// World-space anchor.
    pub position: Vec3,
    /// Angle in whole degrees.
    pub angle_deg: u32,
    /// Display text, e.g. `"30°"`.
    pub text: String,
    /// Plane the angle is measured in.
    pub plane: GridPlane,
}

/// Reference grid geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct GridGeometry {
    /// Outer radius.
    pub radius: f32,
    /// Segments of a full circle.
    pub segments: u32,
    /// All polylines.
    pub lines: Vec<GridLine>,
    /// Label anchors.
    pub labels: Vec<GridLabel>,
}

impl GridGeometry {
    /// Expand polylines into a line-list (pairs of endpoints) with
    /// per-endpoint colors.
    #[must_use]
    pub fn flatten(&self) -> (Vec<[f32; 3]>, Vec<[f32; 3]>) {
        let mut positions = Vec::new();
        let mut colors = Vec::new();
        for line in &self.lines {
            for pair in line.points.windows(2) {
                positions.push(pair[0].to_array());
                positions.push(pair[1].to_array());
                colors.push(line.color);
                colors.push(line.color);
            }
        }
        (positions, colors)
    }

    /// Lines lying in `plane`.
    pub fn lines_in(&self, plane: GridPlane) -> impl Iterator<Item = &GridLine> {
        self.lines.iter().filter(move |l| l.plane == plane)
    }
}

fn tick_color(angle_deg: u32) -> [f32; 3] {
    if angle_deg % 30 == 0 {
        MAJOR_COLOR
    } else {
        MINOR_COLOR
    }
}

fn ring_radii(radius: f32) -> impl Iterator<Item = f32> {
    (1..=5).map(move |k| radius * 0.2 * k as f32)
}

/// Builds reference grids.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceGridBuilder {
    label_offset: f32,
}

impl Default for ReferenceGridBuilder {
    fn default() -> Self {
        Self {
            label_offset: DEFAULT_LABEL_OFFSET,
        }
    }
}

impl ReferenceGridBuilder {
    /// Builder placing labels `label_offset` beyond the outer ring.
    #[must_use]
    pub fn new(label_offset: f32) -> Self {
        Self { label_offset }
    }

    /// Build the grid for `(radius, segments)`.
    ///
    /// `segments` subdivides a full circle; quarter arcs use `segments / 4`
    /// (at least one).
    pub fn build(
        &self,
        radius: f32,
        segments: u32,
    ) -> Result<GridGeometry, ScatterError> {
        if segments == 0 {
            return Err(ScatterError::InvalidGrid(
                "segments must be at least 1".to_owned(),
            ));
        }
        if !(radius > 0.0 && radius.is_finite()) {
            return Err(ScatterError::InvalidGrid(format!(
                "radius must be positive, got {radius}"
            )));
        }

        let mut lines = Vec::new();

        // Radial lines every 10° in the equatorial plane.
        for angle in (0..=350).step_by(10) {
            let t = (angle as f32).to_radians();
            lines.push(GridLine {
                points: vec![
                    Vec3::ZERO,
                    Vec3::new(radius * t.cos(), radius * t.sin(), 0.0),
                ],
                color: tick_color(angle),
                plane: GridPlane::Azimuth,
            });
        }

        // Concentric circles.
        for r in ring_radii(radius) {
            let points = (0..=segments)
                .map(|i| {
                    let t = (i as f32 * 360.0 / segments as f32).to_radians();
                    Vec3::new(r * t.cos(), r * t.sin(), 0.0)
                })
                .collect();
            lines.push(GridLine {
                points,
                color: MINOR_COLOR,
                plane: GridPlane::Azimuth,
            });
        }

        // Quarter arcs in the elevation plane.
        let quarter = (segments / 4).max(1);
        for r in ring_radii(radius) {
            let points = (0..=quarter)
                .map(|i| {
                    let t = (i as f32 * 90.0 / quarter as f32).to_radians();
                    Vec3::new(r * t.cos(), 0.0, r * t.sin())
                })
                .collect();
            lines.push(GridLine {
                points,
                color: MINOR_COLOR,
                plane: GridPlane::Elevation,
            });
        }

        // Elevation radial lines every 10°.
        for angle in (0..=90).step_by(10) {
            let t = (angle as f32).to_radians();
            lines.push(GridLine {
                points: vec![
                    Vec3::ZERO,
                    Vec3::new(radius * t.cos(), 0.0, radius * t.sin()),
                ],
                color: tick_color(angle),
                plane: GridPlane::Elevation,
            });
        }

        let label_r = radius + self.label_offset;
        let mut labels: Vec<GridLabel> = (0..12)
            .map(|i| {
                let angle = i * 30;
                let t = (angle as f32).to_radians();
                GridLabel {
                    position: Vec3::new(label_r * t.cos(), label_r * t.sin(), 0.0),
                    angle_deg: angle,
                    text: format!("{angle}°"),
                    plane: GridPlane::Azimuth,
                }
            })
            .collect();
        labels.extend([0, 30, 60, 90].into_iter().map(|angle: u32| {
            let t = (angle as f32).to_radians();
            GridLabel {
                position: Vec3::new(label_r * t.cos(), 0.0, label_r * t.sin()),
                angle_deg: angle,
                text: format!("{angle}°"),
                plane: GridPlane::Elevation,
            }
        }));

        Ok(GridGeometry {
            radius,
            segments,
            lines,
            labels,
        })
    }
}

/// Build a grid with the default label offset.
pub fn build_reference_grid(
    radius: f32,
    segments: u32,
) -> Result<GridGeometry, ScatterError> {
    ReferenceGridBuilder::default().build(radius, segments)
}

/// Memoizes grids per `(radius, segments)`.
#[derive(Debug, Default)]
pub struct GridCache {
    builder: ReferenceGridBuilder,
    grids: FxHashMap<(u32, u32), Rc<GridGeometry>>,
}

impl GridCache {
    /// Cache backed by `builder`.
    #[must_use]
    pub fn new(builder: ReferenceGridBuilder) -> Self {
        Self {
            builder,
            grids: FxHashMap::default(),
        }
    }

    /// Shared grid for `(radius, segments)`, building it on first use.
    pub fn get(
        &mut self,
        radius: f32,
        segments: u32,
    ) -> Result<Rc<GridGeometry>, ScatterError> {
        let key = (radius.to_bits(), segments);
        if let Some(grid) = self.grids.get(&key) {
            return Ok(Rc::clone(grid));
        }
        let grid = Rc::new(self.builder.build(radius, segments)?);
        log::debug!(
            "built reference grid r={radius} segments={segments} ({} lines)",
            grid.lines.len()
        );
        let _ = self.grids.insert(key, Rc::clone(&grid));
        Ok(grid)
    }

    /// Number of distinct grids held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.grids.len()
    }

    /// Whether nothing has been built yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }

    /// Drop every cached grid. Viewports still holding an `Rc` keep theirs.
    pub fn clear(&mut self) {
        self.grids.clear();
    }
}
