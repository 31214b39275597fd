//! Arrangement of product viewports and their tint colors.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::options::LayoutOptions;
use crate::util::colormap::hex_to_rgb;

/// Neutral tint used when no palette entry parses.
const FALLBACK_COLOR: [f32; 3] = [0.8, 0.8, 0.8];

/// How products share the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    /// One cell per product.
    #[default]
    Grid,
    /// Every product at the origin; one is shown at a time.
    Stack,
}

/// Rows and columns of the grid layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSettings {
    /// Number of rows.
    pub rows: usize,
    /// Number of columns.
    pub cols: usize,
}

/// Grid shape for `count` products: 1×n up to two, then 2×2, 2×3, 3×3 and
/// 3×4 for anything larger.
#[must_use]
pub fn grid_settings(count: usize) -> GridSettings {
    let (rows, cols) = match count {
        0 => (1, 1),
        1..=2 => (1, count),
        3..=4 => (2, 2),
        5..=6 => (2, 3),
        7..=9 => (3, 3),
        _ => (3, 4),
    };
    GridSettings { rows, cols }
}

/// Scene position of product `index` out of `count`.
#[must_use]
pub fn mesh_position(
    index: usize,
    count: usize,
    mode: LayoutMode,
    spacing: f32,
) -> Vec3 {
    if mode == LayoutMode::Stack {
        return Vec3::ZERO;
    }
    let GridSettings { rows, cols } = grid_settings(count);
    let row = (index / cols) as f32;
    let col = (index % cols) as f32;
    let x = (col - (cols as f32 - 1.0) / 2.0) * spacing;
    let z = (row - (rows as f32 - 1.0) / 2.0) * spacing;
    Vec3::new(x, 0.0, z)
}

/// Product tint colors, cycled by index.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<[f32; 3]>,
}

impl Palette {
    /// Parse the `#RRGGBB` entries of `options`. Bad entries are skipped.
    #[must_use]
    pub fn from_options(options: &LayoutOptions) -> Self {
        let colors: Vec<_> = options
            .product_colors
            .iter()
            .filter_map(|hex| {
                let rgb = hex_to_rgb(hex);
                if rgb.is_none() {
                    log::warn!("ignoring product color '{hex}'");
                }
                rgb
            })
            .collect();
        Self { colors }
    }

    /// Color for product `index`.
    #[must_use]
    pub fn color(&self, index: usize) -> [f32; 3] {
        if self.colors.is_empty() {
            return FALLBACK_COLOR;
        }
        self.colors[index % self.colors.len()]
    }

    /// Number of distinct colors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Whether no color parsed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::from_options(&LayoutOptions::default())
    }
}
