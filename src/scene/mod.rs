//! Scene layer: payload model, per-product viewports, layout and the
//! comparison view that ties them together.
//!
//! Geometry reaches the presentation layer only through a
//! [`GeometrySink`]; every upload made here is paired with an explicit
//! release on rebuild or teardown.

/// Side-by-side comparison of several products.
pub mod comparison;
/// Grid/stack arrangement and product colors.
pub mod layout;
/// Serde model of the comparison payload.
pub mod payload;
/// Upload/release seam for GPU-side buffers.
pub mod resources;
/// Single-product viewport.
pub mod viewport;

pub use comparison::{ComparisonView, FrameUpdate, LegendEntry, PolarQuery, Surface};
pub use layout::{grid_settings, mesh_position, GridSettings, LayoutMode, Palette};
pub use payload::{FileResult, PolarResponse};
pub use resources::{BufferHandle, GeometrySink, HeadlessSink};
pub use viewport::{Viewport, ViewportContent};
