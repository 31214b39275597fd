use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Layout", inline)]
#[serde(default)]
/// Arrangement of products in the comparison view.
pub struct LayoutOptions {
    /// Overlay every product at the origin instead of a grid.
    #[schemars(title = "Stack Products")]
    pub stacked: bool,
    /// Distance between neighbouring grid cells.
    #[schemars(title = "Grid Spacing", range(min = 1.0, max = 12.0), extend("step" = 0.5))]
    pub spacing: f32,
    /// Per-product tint colors as `#RRGGBB`, cycled by product index.
    #[schemars(skip)]
    pub product_colors: Vec<String>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            stacked: false,
            spacing: 4.0,
            product_colors: [
                "#8ECAE6", "#FFB4A2", "#A8DADC", "#B8F2E6", "#FAEDCB",
                "#C9E4DE", "#E6CCB2", "#DBE7E4",
            ]
            .into_iter()
            .map(str::to_owned)
            .collect(),
        }
    }
}
