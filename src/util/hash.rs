use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

/// Hash a single `f32` by its bit pattern.
pub fn hash_f32(v: f32, hasher: &mut impl Hasher) {
    v.to_bits().hash(hasher);
}

/// Hash a slice of points component by component.
///
/// Every element is hashed: a rebuild must trigger on any changed vertex,
/// not only on the first/middle/last sample.
pub fn hash_points(points: &[[f32; 3]], hasher: &mut impl Hasher) {
    points.len().hash(hasher);
    for p in points {
        hash_f32(p[0], hasher);
        hash_f32(p[1], hasher);
        hash_f32(p[2], hasher);
    }
}

/// Hash a slice of scalars.
pub fn hash_scalars(values: &[f32], hasher: &mut impl Hasher) {
    values.len().hash(hasher);
    for &v in values {
        hash_f32(v, hasher);
    }
}

/// Hash a slice of index triples.
pub fn hash_triangles(triangles: &[[i64; 3]], hasher: &mut impl Hasher) {
    triangles.hash(hasher);
}

/// Start a fresh hasher for content digests.
#[must_use]
pub fn digest_hasher() -> FxHasher {
    FxHasher::default()
}
