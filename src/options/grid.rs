use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::geometry::reference_grid::DEFAULT_LABEL_OFFSET;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Reference Grid", inline)]
#[serde(default)]
/// Angular reference grid parameters.
pub struct GridOptions {
    /// Show the grid at all.
    #[schemars(title = "Show Grid")]
    pub visible: bool,
    /// Outer radius.
    #[schemars(title = "Radius", range(min = 1.0, max = 20.0), extend("step" = 0.5))]
    pub radius: f32,
    /// Segments per full circle.
    #[schemars(skip)]
    pub segments: u32,
    /// Distance of label anchors beyond the outer ring.
    #[schemars(skip)]
    pub label_offset: f32,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            visible: true,
            radius: 6.0,
            segments: 72,
            label_offset: DEFAULT_LABEL_OFFSET,
        }
    }
}
