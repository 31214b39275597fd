//! Shared utilities.
//!
//! Helpers for value-to-color mapping and content hashing used by change
//! detection.

/// Jet ramp and hex color parsing.
pub mod colormap;
/// Stable hashing of float geometry for change detection.
pub mod hash;
