//! Source-direction markers and their pulse animation.
//!
//! Each simulated source direction is drawn as a small sphere on a shell
//! around the product. The selected source (or every source, in random
//! incidence mode) pulses; the rest sit at unit scale.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::spherical::to_cartesian;
use crate::options::MarkerOptions;

/// A physical source direction in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 2]", into = "[f32; 2]")]
pub struct SourceAngle {
    /// Azimuth in degrees.
    pub azimuth_deg: f32,
    /// Elevation in degrees.
    pub elevation_deg: f32,
}

impl SourceAngle {
    /// New source direction.
    #[must_use]
    pub fn new(azimuth_deg: f32, elevation_deg: f32) -> Self {
        Self {
            azimuth_deg,
            elevation_deg,
        }
    }

    /// Human-readable form, e.g. `"45.0° (az), 30.0° (el)"`.
    #[must_use]
    pub fn describe(&self) -> String {
        format!(
            "{:.1}° (az), {:.1}° (el)",
            self.azimuth_deg, self.elevation_deg
        )
    }
}

impl From<[f32; 2]> for SourceAngle {
    fn from([azimuth_deg, elevation_deg]: [f32; 2]) -> Self {
        Self::new(azimuth_deg, elevation_deg)
    }
}

impl From<SourceAngle> for [f32; 2] {
    fn from(a: SourceAngle) -> Self {
        [a.azimuth_deg, a.elevation_deg]
    }
}

/// Visual state of one marker, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerState {
    /// Random-incidence mode: every marker pulses, purple.
    Random,
    /// The selected source.
    Selected,
    /// Under the pointer.
    Hovered,
    /// Everything else.
    Idle,
}

impl MarkerState {
    /// Base color for this state.
    #[must_use]
    pub fn color(self) -> [f32; 3] {
        match self {
            Self::Random => [0.608, 0.349, 0.714],
            Self::Selected => [1.0, 0.584, 0.0],
            Self::Hovered => [1.0, 0.8, 0.0],
            Self::Idle => [0.204, 0.596, 0.859],
        }
    }

    /// Whether markers in this state pulse.
    #[must_use]
    pub fn pulses(self) -> bool {
        matches!(self, Self::Random | Self::Selected)
    }
}

/// One marker ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceMarker {
    /// Index into the source list.
    pub index: usize,
    /// World-space center (y-up).
    pub position: Vec3,
    /// Current uniform scale.
    pub scale: f32,
    /// Current state.
    pub state: MarkerState,
    /// Short label (1-based number).
    pub label: String,
}

/// Marker set for a list of source directions.
#[derive(Debug, Clone)]
pub struct SourceMarkers {
    angles: Vec<SourceAngle>,
    selected: usize,
    hovered: Option<usize>,
    random_mode: bool,
    options: MarkerOptions,
}

impl SourceMarkers {
    /// Markers for `angles`, first source selected.
    #[must_use]
    pub fn new(angles: Vec<SourceAngle>, options: MarkerOptions) -> Self {
        Self {
            angles,
            selected: 0,
            hovered: None,
            random_mode: false,
            options,
        }
    }

    /// Source directions.
    #[must_use]
    pub fn angles(&self) -> &[SourceAngle] {
        &self.angles
    }

    /// Currently selected source index.
    #[must_use]
    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Select a source. Out-of-range indices are ignored.
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.angles.len() {
            self.selected = index;
            true
        } else {
            false
        }
    }

    /// Set or clear the hovered marker.
    pub fn set_hovered(&mut self, index: Option<usize>) {
        self.hovered = index.filter(|&i| i < self.angles.len());
    }

    /// Toggle random-incidence mode.
    pub fn set_random_mode(&mut self, random: bool) {
        self.random_mode = random;
    }

    /// Selector label for source `index`: `"Source 2: 45.0° (az), …"`.
    #[must_use]
    pub fn option_label(&self, index: usize) -> Option<String> {
        self.angles
            .get(index)
            .map(|a| format!("Source {}: {}", index + 1, a.describe()))
    }

    fn state_of(&self, index: usize) -> MarkerState {
        if self.random_mode {
            MarkerState::Random
        } else if index == self.selected {
            MarkerState::Selected
        } else if self.hovered == Some(index) {
            MarkerState::Hovered
        } else {
            MarkerState::Idle
        }
    }

    /// Pulse scale of marker `index` at `elapsed_ms`.
    #[must_use]
    pub fn scale_at(&self, index: usize, elapsed_ms: f64) -> f32 {
        if !self.state_of(index).pulses() {
            return 1.0;
        }
        let phase = if self.random_mode {
            index as f64 * f64::from(self.options.phase_step)
        } else {
            0.0
        };
        let wave = (elapsed_ms * f64::from(self.options.pulse_rate) + phase).sin();
        1.0 + wave as f32 * self.options.pulse_amount
    }

    /// Every marker's position, scale and state at `elapsed_ms`.
    #[must_use]
    pub fn frame(&self, elapsed_ms: f64) -> Vec<SourceMarker> {
        self.angles
            .iter()
            .enumerate()
            .map(|(index, a)| SourceMarker {
                index,
                position: to_cartesian(
                    a.azimuth_deg,
                    a.elevation_deg,
                    self.options.radius,
                ),
                scale: self.scale_at(index, elapsed_ms),
                state: self.state_of(index),
                label: (index + 1).to_string(),
            })
            .collect()
    }
}
