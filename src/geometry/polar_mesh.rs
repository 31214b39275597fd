//! Polar response mesh construction.
//!
//! A simulated scattering surface arrives as sample points, triangles and
//! one pressure value (dB) per point. The builder keeps each point's
//! direction, folds it into the upper hemisphere, and pushes it out to a
//! radius proportional to its normalized pressure. Colors come from the same
//! normalized value; normals are always recomputed from the deformed
//! positions.

use std::hash::{Hash, Hasher};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::connectivity::{self, CorrectedConnectivity};
use super::normals::smooth_vertex_normals;
use super::pressure::{self, PressureNormalizer, DEFAULT_SCALE};
use super::spherical::{from_zenith, to_upper_hemisphere_spherical};
use crate::error::ScatterError;
use crate::options::MeshOptions;
use crate::util::hash;

/// Default dB window below the peak.
pub const DEFAULT_PRESSURE_LIM: f32 = 30.0;

/// One simulation result: geometry plus pressure for one
/// file/source/frequency combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceSample {
    /// Sample points (length N).
    #[serde(default)]
    pub coordinates: Option<Vec<[f32; 3]>>,
    /// Triangles, uniformly 0- or 1-based (length M).
    #[serde(default)]
    pub connectivity: Option<Vec<[i64; 3]>>,
    /// Pressure per point in dB (length N).
    #[serde(default)]
    pub pressure: Option<Vec<f32>>,
    /// dB window below the peak that is mapped into the visible range.
    #[serde(default = "default_pressure_lim")]
    pub pressure_lim: f32,
}

fn default_pressure_lim() -> f32 {
    DEFAULT_PRESSURE_LIM
}

impl Default for SurfaceSample {
    fn default() -> Self {
        Self {
            coordinates: None,
            connectivity: None,
            pressure: None,
            pressure_lim: DEFAULT_PRESSURE_LIM,
        }
    }
}

impl SurfaceSample {
    /// Sample with all fields present.
    #[must_use]
    pub fn new(
        coordinates: Vec<[f32; 3]>,
        connectivity: Vec<[i64; 3]>,
        pressure: Vec<f32>,
        pressure_lim: f32,
    ) -> Self {
        Self {
            coordinates: Some(coordinates),
            connectivity: Some(connectivity),
            pressure: Some(pressure),
            pressure_lim,
        }
    }

    /// Whether every field needed to build a mesh is present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.coordinates.is_some()
            && self.connectivity.is_some()
            && self.pressure.is_some()
    }

    /// Content digest over every input that affects the built mesh.
    #[must_use]
    pub fn digest(&self) -> u64 {
        let mut h = hash::digest_hasher();
        self.coordinates.is_some().hash(&mut h);
        if let Some(c) = &self.coordinates {
            hash::hash_points(c, &mut h);
        }
        self.connectivity.is_some().hash(&mut h);
        if let Some(c) = &self.connectivity {
            hash::hash_triangles(c, &mut h);
        }
        self.pressure.is_some().hash(&mut h);
        if let Some(p) = &self.pressure {
            hash::hash_scalars(p, &mut h);
        }
        hash::hash_f32(self.pressure_lim, &mut h);
        h.finish()
    }
}

/// Interleaved vertex layout for GPU upload.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    /// Deformed position.
    pub position: [f32; 3],
    /// Smooth vertex normal.
    pub normal: [f32; 3],
    /// Linear RGB color.
    pub color: [f32; 3],
}

/// Renderable polar response surface.
///
/// Owned by exactly one viewport; see
/// [`Viewport`](crate::scene::Viewport) for the release discipline.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderableMesh {
    /// Deformed vertex positions.
    pub positions: Vec<Vec3>,
    /// Per-vertex colors in [0, 1].
    pub colors: Vec<[f32; 3]>,
    /// Flattened valid triangle list.
    pub indices: Vec<u32>,
    /// Smooth per-vertex normals.
    pub normals: Vec<Vec3>,
}

impl RenderableMesh {
    /// Assemble a mesh, computing normals from positions and triangles.
    #[must_use]
    pub fn from_parts(
        positions: Vec<Vec3>,
        colors: Vec<[f32; 3]>,
        triangles: &[[u32; 3]],
    ) -> Self {
        let normals = smooth_vertex_normals(&positions, triangles);
        Self {
            positions,
            colors,
            indices: triangles.iter().flatten().copied().collect(),
            normals,
        }
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Whether the mesh has nothing to draw.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Largest distance of any vertex from the origin.
    #[must_use]
    pub fn bounding_radius(&self) -> f32 {
        self.positions
            .iter()
            .map(|p| p.length())
            .fold(0.0_f32, f32::max)
    }

    /// Interleaved vertices ready for `bytemuck::cast_slice`.
    #[must_use]
    pub fn vertices(&self) -> Vec<MeshVertex> {
        self.positions
            .iter()
            .zip(&self.normals)
            .zip(&self.colors)
            .map(|((p, n), c)| MeshVertex {
                position: p.to_array(),
                normal: n.to_array(),
                color: *c,
            })
            .collect()
    }
}

/// Builds [`RenderableMesh`]es from [`SurfaceSample`]s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolarMeshBuilder {
    scale: f32,
}

impl Default for PolarMeshBuilder {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
        }
    }
}

impl PolarMeshBuilder {
    /// Builder with the radius scale from `options`.
    #[must_use]
    pub fn new(options: &MeshOptions) -> Self {
        Self {
            scale: options.radius_scale,
        }
    }

    /// Radius a peak-pressure vertex is pushed out to.
    #[must_use]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Build the deformed, colored surface for `sample`.
    ///
    /// Returns `Ok(None)` when coordinates, connectivity or pressure are
    /// missing; the caller shows a placeholder. Runs in O(N + M).
    pub fn build(
        &self,
        sample: &SurfaceSample,
    ) -> Result<Option<RenderableMesh>, ScatterError> {
        let (Some(coordinates), Some(triangles), Some(pressure)) = (
            sample.coordinates.as_deref(),
            sample.connectivity.as_deref(),
            sample.pressure.as_deref(),
        ) else {
            log::debug!("sample incomplete, no mesh built");
            return Ok(None);
        };

        let normalizer = PressureNormalizer::new(pressure, sample.pressure_lim)?;
        if pressure.len() != coordinates.len() {
            return Err(ScatterError::LengthMismatch {
                field: "pressure",
                expected: coordinates.len(),
                actual: pressure.len(),
            });
        }

        let mut positions = Vec::with_capacity(coordinates.len());
        let mut colors = Vec::with_capacity(coordinates.len());
        for (coord, &p) in coordinates.iter().zip(pressure) {
            let angles = to_upper_hemisphere_spherical(Vec3::from_array(*coord));
            let normalized = normalizer.normalize_one(p);
            positions.push(from_zenith(
                angles,
                pressure::radius(normalized, self.scale),
            ));
            colors.push(pressure::color_of(normalized));
        }

        let CorrectedConnectivity {
            triangles, dropped, ..
        } = connectivity::correct_with_report(triangles, coordinates.len());
        log::debug!(
            "built polar mesh: {} vertices, {} triangles ({dropped} dropped), \
             peak {:.1} dB",
            positions.len(),
            triangles.len(),
            normalizer.max_pressure()
        );

        Ok(Some(RenderableMesh::from_parts(positions, colors, &triangles)))
    }
}

/// Build a mesh with the default radius scale.
pub fn build_mesh(
    sample: &SurfaceSample,
) -> Result<Option<RenderableMesh>, ScatterError> {
    PolarMeshBuilder::default().build(sample)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> SurfaceSample {
        SurfaceSample::new(
            vec![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            vec![[1, 2, 3]],
            vec![-10.0, -5.0, 0.0],
            30.0,
        )
    }

    #[test]
    fn scenario_one_based_triangle() {
        let mesh = build_mesh(&scenario()).unwrap().unwrap();
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.colors[2], [1.0, 0.0, 0.0]);
        // Vertex 2 is the peak: radius == scale along +Z.
        assert!((mesh.positions[2] - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-5);
        // -10 dB of 30 → 2/3 of the scale.
        assert!((mesh.positions[0].length() - 5.0 * 20.0 / 30.0).abs() < 1e-5);
    }

    #[test]
    fn equal_pressure_gives_uniform_sphere() {
        let coords: Vec<[f32; 3]> = (0..16)
            .map(|i| {
                let a = i as f32 * 0.4;
                [a.cos(), a.sin(), 0.5 + (i % 3) as f32 * 0.2]
            })
            .collect();
        let tris: Vec<[i64; 3]> = (0..14).map(|i| [0, i + 1, i + 2]).collect();
        let sample = SurfaceSample::new(coords, tris, vec![-3.0; 16], 30.0);

        let mesh = build_mesh(&sample).unwrap().unwrap();
        for (p, c) in mesh.positions.iter().zip(&mesh.colors) {
            assert!((p.length() - DEFAULT_SCALE).abs() < 1e-4);
            assert_eq!(*c, [1.0, 0.0, 0.0]);
        }
    }

    #[test]
    fn missing_fields_give_no_mesh() {
        let mut sample = scenario();
        sample.pressure = None;
        assert_eq!(build_mesh(&sample).unwrap(), None);
        assert_eq!(build_mesh(&SurfaceSample::default()).unwrap(), None);
    }

    #[test]
    fn non_positive_limit_is_rejected() {
        let mut sample = scenario();
        sample.pressure_lim = 0.0;
        assert!(matches!(
            build_mesh(&sample),
            Err(ScatterError::DegenerateNormalization(_))
        ));
    }

    #[test]
    fn pressure_length_mismatch_is_rejected() {
        let mut sample = scenario();
        sample.pressure = Some(vec![0.0, 1.0]);
        assert!(matches!(
            build_mesh(&sample),
            Err(ScatterError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn geometry_is_folded_into_upper_hemisphere() {
        let sample = SurfaceSample::new(
            vec![[0.0, 0.0, -1.0], [1.0, 0.0, -1.0], [0.0, 1.0, 0.5]],
            vec![[0, 1, 2]],
            vec![0.0, 0.0, 0.0],
            30.0,
        );
        let mesh = build_mesh(&sample).unwrap().unwrap();
        assert!(mesh.positions.iter().all(|p| p.z >= -1e-6));
    }

    #[test]
    fn quiet_vertices_collapse_to_origin() {
        let mut sample = scenario();
        sample.pressure = Some(vec![-100.0, -5.0, 0.0]);
        let mesh = build_mesh(&sample).unwrap().unwrap();
        assert!(mesh.positions[0].length() < 1e-6);
        assert_eq!(mesh.colors[0], [0.0, 0.0, 0.5]);
    }

    #[test]
    fn custom_scale_from_options() {
        let builder = PolarMeshBuilder::new(&MeshOptions {
            radius_scale: 2.0,
            ..MeshOptions::default()
        });
        let mesh = builder.build(&scenario()).unwrap().unwrap();
        assert!((mesh.bounding_radius() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn interleaved_vertices_match_attributes() {
        let mesh = build_mesh(&scenario()).unwrap().unwrap();
        let verts = mesh.vertices();
        assert_eq!(verts.len(), 3);
        assert_eq!(verts[2].color, [1.0, 0.0, 0.0]);
        let bytes: &[u8] = bytemuck::cast_slice(&verts);
        assert_eq!(bytes.len(), 3 * 9 * 4);
    }

    #[test]
    fn digest_tracks_every_input() {
        let a = scenario();
        let mut b = scenario();
        assert_eq!(a.digest(), b.digest());
        b.pressure_lim = 20.0;
        assert_ne!(a.digest(), b.digest());
        let mut c = scenario();
        c.connectivity = Some(vec![[0, 1, 2]]);
        assert_ne!(a.digest(), c.digest());
    }

    #[test]
    fn sample_deserializes_with_default_limit() {
        let json = r#"{
            "coordinates": [[1,0,0],[0,1,0],[0,0,1]],
            "connectivity": [[1,2,3]],
            "pressure": [-10,-5,0]
        }"#;
        let sample: SurfaceSample = serde_json::from_str(json).unwrap();
        assert!(sample.is_complete());
        assert_eq!(sample.pressure_lim, DEFAULT_PRESSURE_LIM);
    }
}
