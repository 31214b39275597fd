//! Smooth per-vertex normals for indexed triangle meshes.

use glam::Vec3;

/// Normal given to vertices that no non-degenerate triangle touches.
pub const FALLBACK_NORMAL: Vec3 = Vec3::Z;

/// Shared-vertex normal averaging.
///
/// Each triangle's unnormalized cross product (area-weighted face normal)
/// is accumulated onto its three vertices, then the sums are normalized.
/// Triangles referencing missing vertices are skipped.
#[must_use]
pub fn smooth_vertex_normals(positions: &[Vec3], triangles: &[[u32; 3]]) -> Vec<Vec3> {
    let mut sums = vec![Vec3::ZERO; positions.len()];

    for tri in triangles {
        let [a, b, c] = tri.map(|i| i as usize);
        let (Some(&pa), Some(&pb), Some(&pc)) =
            (positions.get(a), positions.get(b), positions.get(c))
        else {
            continue;
        };
        let face = (pb - pa).cross(pc - pa);
        if !face.is_finite() {
            continue;
        }
        sums[a] += face;
        sums[b] += face;
        sums[c] += face;
    }

    sums.into_iter()
        .map(|n| n.try_normalize().unwrap_or(FALLBACK_NORMAL))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_triangle_faces_up() {
        let positions = [Vec3::ZERO, Vec3::X, Vec3::Y];
        let normals = smooth_vertex_normals(&positions, &[[0, 1, 2]]);
        for n in normals {
            assert!((n - Vec3::Z).length() < 1e-6);
        }
    }

    #[test]
    fn winding_flips_normal() {
        let positions = [Vec3::ZERO, Vec3::X, Vec3::Y];
        let normals = smooth_vertex_normals(&positions, &[[0, 2, 1]]);
        assert!((normals[0] + Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn shared_vertex_averages_faces() {
        // Two faces meeting at a ridge along the x axis.
        let positions = [
            Vec3::ZERO,
            Vec3::X,
            Vec3::new(0.0, 1.0, 1.0),
            Vec3::new(0.0, -1.0, 1.0),
        ];
        let normals =
            smooth_vertex_normals(&positions, &[[0, 1, 2], [0, 3, 1]]);
        // Shared vertices point straight up between the two faces.
        assert!((normals[0] - Vec3::Z).length() < 1e-5);
        assert!((normals[1] - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn degenerate_and_unused_vertices_fall_back() {
        let positions = [Vec3::ZERO, Vec3::ZERO, Vec3::ZERO, Vec3::ONE];
        let normals = smooth_vertex_normals(&positions, &[[0, 1, 2]]);
        assert!(normals.iter().all(|&n| n == FALLBACK_NORMAL));
    }

    #[test]
    fn unit_length_everywhere() {
        let positions = [
            Vec3::new(1.0, 0.0, 0.2),
            Vec3::new(0.0, 1.0, 0.4),
            Vec3::new(-1.0, 0.0, 0.1),
            Vec3::new(0.0, -1.0, 0.3),
            Vec3::new(0.0, 0.0, 1.0),
        ];
        let tris = [[0, 1, 4], [1, 2, 4], [2, 3, 4], [3, 0, 4]];
        for n in smooth_vertex_normals(&positions, &tris) {
            assert!((n.length() - 1.0).abs() < 1e-5);
        }
    }
}
