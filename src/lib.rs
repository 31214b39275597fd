// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::too_many_lines)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Acoustic scattering visualization core.
//!
//! Scatterview turns simulated polar responses (sample points, triangles
//! and per-point pressure in dB) into colored, radius-deformed 3D surfaces,
//! and keeps the cameras of several side-by-side viewports in lockstep.
//! It produces CPU-side geometry and camera poses only; GPU buffers are
//! owned by the presentation layer behind [`scene::GeometrySink`].
//!
//! # Key entry points
//!
//! - [`geometry::build_mesh`] - polar response surface from a
//!   [`geometry::SurfaceSample`]
//! - [`geometry::build_reference_grid`] - angular reference overlay
//! - [`camera::CameraSyncController`] - per-viewport camera with
//!   cross-viewport broadcast through a [`camera::SyncGroup`]
//! - [`scene::ComparisonView`] - one viewport per product, selection state
//!   and layout
//! - [`options::Options`] - runtime configuration with TOML presets
//!
//! # Architecture
//!
//! Everything runs on one thread. A payload is parsed into
//! [`scene::PolarResponse`], each file result becomes a sample, and each
//! sample is built into a [`geometry::RenderableMesh`] that its viewport
//! uploads through the sink. Rebuilds happen only when a sample's content
//! digest changes, and every replaced buffer is released explicitly.

pub mod camera;
pub mod error;
pub mod geometry;
pub mod input;
pub mod options;
pub mod scene;
pub mod util;
