//! Pre-tessellated product geometry (the physical diffusor/reflector).
//!
//! Unlike polar surfaces these meshes arrive already in world units. They
//! are validated, given normals when none are supplied, and placed so that
//! they rest on the `y = 0` floor centered on the z axis.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::connectivity::{self, IndexBase};
use super::normals::smooth_vertex_normals;
use super::polar_mesh::RenderableMesh;

/// Raw product geometry as delivered by the backend.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductGeometry {
    /// Vertex positions.
    #[serde(default)]
    pub vertices: Option<Vec<[f32; 3]>>,
    /// Zero-based triangles.
    #[serde(default)]
    pub faces: Option<Vec<[i64; 3]>>,
    /// Optional per-vertex normals.
    #[serde(default)]
    pub normals: Option<Vec<[f32; 3]>>,
}

/// Axis-aligned bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Aabb {
    /// Bounds of `points`, or `None` when empty.
    #[must_use]
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let first = *points.first()?;
        Some(points.iter().fold(
            Self {
                min: first,
                max: first,
            },
            |acc, &p| Self {
                min: acc.min.min(p),
                max: acc.max.max(p),
            },
        ))
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

/// A product mesh ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductMesh {
    /// Vertex positions as supplied.
    pub positions: Vec<Vec3>,
    /// Normals, supplied or computed.
    pub normals: Vec<Vec3>,
    /// Flattened valid triangles.
    pub indices: Vec<u32>,
    /// Bounds of `positions`.
    pub bounds: Aabb,
    /// Translation that puts the mesh on the floor, centered in z.
    pub floor_offset: Vec3,
}

impl ProductMesh {
    /// Uniformly tinted mesh placed on the floor, ready for upload.
    #[must_use]
    pub fn to_renderable(&self, tint: [f32; 3]) -> RenderableMesh {
        RenderableMesh {
            positions: self
                .positions
                .iter()
                .map(|&p| p + self.floor_offset)
                .collect(),
            colors: vec![tint; self.positions.len()],
            indices: self.indices.clone(),
            normals: self.normals.clone(),
        }
    }
}

/// Build a displayable product mesh.
///
/// Returns `None` when vertices or faces are missing or there are no
/// vertices at all. Bad faces are dropped, never fatal.
#[must_use]
pub fn build_product_mesh(geometry: &ProductGeometry) -> Option<ProductMesh> {
    let (Some(vertices), Some(faces)) =
        (geometry.vertices.as_deref(), geometry.faces.as_deref())
    else {
        return None;
    };

    let positions: Vec<Vec3> =
        vertices.iter().copied().map(Vec3::from_array).collect();
    let bounds = Aabb::from_points(&positions)?;

    // Product faces are always zero-based.
    let corrected = connectivity::correct_with_base(
        faces,
        positions.len(),
        IndexBase::Zero,
    );

    let normals = match geometry.normals.as_deref() {
        Some(n) if n.len() == positions.len() => {
            n.iter().copied().map(Vec3::from_array).collect()
        }
        Some(n) => {
            log::warn!(
                "ignoring {} supplied normals for {} vertices",
                n.len(),
                positions.len()
            );
            smooth_vertex_normals(&positions, &corrected.triangles)
        }
        None => smooth_vertex_normals(&positions, &corrected.triangles),
    };

    let floor_offset = Vec3::new(0.0, -bounds.min.y, -bounds.center().z);

    Some(ProductMesh {
        indices: corrected.flat_indices(),
        positions,
        normals,
        bounds,
        floor_offset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slab() -> ProductGeometry {
        ProductGeometry {
            vertices: Some(vec![
                [-1.0, -2.0, 1.0],
                [1.0, -2.0, 1.0],
                [1.0, 0.5, 3.0],
                [-1.0, 0.5, 3.0],
            ]),
            faces: Some(vec![[0, 1, 2], [0, 2, 3]]),
            normals: None,
        }
    }

    #[test]
    fn floor_offset_rests_on_ground() {
        let mesh = build_product_mesh(&slab()).unwrap();
        assert_eq!(mesh.floor_offset, Vec3::new(0.0, 2.0, -2.0));
        let lowest = mesh
            .positions
            .iter()
            .map(|p| (*p + mesh.floor_offset).y)
            .fold(f32::INFINITY, f32::min);
        assert_eq!(lowest, 0.0);
    }

    #[test]
    fn computes_normals_when_absent() {
        let mesh = build_product_mesh(&slab()).unwrap();
        assert_eq!(mesh.normals.len(), 4);
        assert!(mesh.normals.iter().all(|n| (n.length() - 1.0).abs() < 1e-5));
    }

    #[test]
    fn keeps_supplied_normals() {
        let mut geometry = slab();
        geometry.normals = Some(vec![[0.0, 1.0, 0.0]; 4]);
        let mesh = build_product_mesh(&geometry).unwrap();
        assert!(mesh.normals.iter().all(|&n| n == Vec3::Y));
    }

    #[test]
    fn mismatched_normals_are_recomputed() {
        let mut geometry = slab();
        geometry.normals = Some(vec![[0.0, 1.0, 0.0]; 2]);
        let mesh = build_product_mesh(&geometry).unwrap();
        assert_eq!(mesh.normals.len(), 4);
    }

    #[test]
    fn renderable_is_placed_and_tinted() {
        let mesh = build_product_mesh(&slab()).unwrap();
        let renderable = mesh.to_renderable([0.5, 0.6, 0.7]);
        assert_eq!(renderable.triangle_count(), 2);
        assert!(renderable.colors.iter().all(|&c| c == [0.5, 0.6, 0.7]));
        assert_eq!(renderable.positions[0], Vec3::new(-1.0, 0.0, -1.0));
    }

    #[test]
    fn faces_skipping_vertex_zero_keep_their_indices() {
        let mut geometry = slab();
        geometry.faces = Some(vec![[1, 2, 3]]);
        let mesh = build_product_mesh(&geometry).unwrap();
        assert_eq!(mesh.indices, vec![1, 2, 3]);
    }

    #[test]
    fn missing_parts_give_none() {
        let mut geometry = slab();
        geometry.faces = None;
        assert!(build_product_mesh(&geometry).is_none());
        let empty = ProductGeometry {
            vertices: Some(Vec::new()),
            faces: Some(Vec::new()),
            normals: None,
        };
        assert!(build_product_mesh(&empty).is_none());
    }
}
