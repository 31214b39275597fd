//! Centralized viewer options with TOML preset support.
//!
//! Every tweakable setting (mesh scaling, reference grid, camera, sync,
//! source markers, product layout) lives here. Options serialize to and
//! from TOML so a viewer configuration can be saved as a named preset.

mod camera;
mod grid;
mod layout;
mod markers;
mod mesh;
mod sync;

use std::path::Path;

pub use camera::CameraOptions;
pub use grid::GridOptions;
pub use layout::LayoutOptions;
pub use markers::MarkerOptions;
pub use mesh::MeshOptions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
pub use sync::SyncOptions;

use crate::error::ScatterError;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[camera]`) work correctly.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Polar mesh scaling and pressure window.
    pub mesh: MeshOptions,
    /// Reference grid overlay.
    pub grid: GridOptions,
    /// Camera projection and orbit control parameters.
    pub camera: CameraOptions,
    /// Cross-viewport camera synchronization.
    pub sync: SyncOptions,
    /// Source-direction markers.
    pub markers: MarkerOptions,
    /// Product arrangement.
    pub layout: LayoutOptions,
}

impl Options {
    /// Generate JSON Schema describing the UI-exposed options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, ScatterError> {
        let content = std::fs::read_to_string(path)?;
        let options: Self = toml::from_str(&content)
            .map_err(|e| ScatterError::OptionsParse(e.to_string()))?;
        log::info!("Loaded options from '{}'", path.display());
        Ok(options)
    }

    /// Save options to a TOML file (pretty-printed).
    pub fn save(&self, path: &Path) -> Result<(), ScatterError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ScatterError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        log::info!("Saved options to '{}'", path.display());
        Ok(())
    }

    /// List available preset names (TOML file stems) in a directory.
    #[must_use]
    pub fn list_presets(dir: &Path) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) =
                        path.file_stem().and_then(|s| s.to_str())
                    {
                        names.push(stem.to_owned());
                    }
                }
            }
        }
        names.sort();
        names
    }
}
