//! CPU-side geometry: coordinate mapping, pressure normalization,
//! connectivity repair and the meshes built from them.

/// Triangle index base detection and bounds filtering.
pub mod connectivity;
/// Smooth per-vertex normals.
pub mod normals;
/// Polar response mesh builder.
pub mod polar_mesh;
/// Pressure → [0, 1] → radius and color.
pub mod pressure;
/// Product (diffusor/reflector) meshes.
pub mod product_mesh;
/// Angular reference grid overlay.
pub mod reference_grid;
/// Source-direction markers.
pub mod source_markers;
/// Spherical ↔ Cartesian conversions.
pub mod spherical;

pub use polar_mesh::{
    build_mesh, MeshVertex, PolarMeshBuilder, RenderableMesh, SurfaceSample,
};
pub use reference_grid::{
    build_reference_grid, GridCache, GridGeometry, ReferenceGridBuilder,
};
pub use source_markers::{SourceAngle, SourceMarkers};
