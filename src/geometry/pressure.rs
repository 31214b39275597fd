//! Pressure normalization: dB samples → [0, 1] → radius and color.
//!
//! Each sample is measured relative to the loudest one. Anything within
//! `pressure_lim` dB of the peak maps linearly into (0, 1]; anything quieter
//! collapses to exactly 0.

use crate::error::ScatterError;
use crate::util::colormap;

/// Default radius of a fully normalized (peak) sample.
pub const DEFAULT_SCALE: f32 = 5.0;

/// Maps raw pressure samples into the visual range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressureNormalizer {
    max_pressure: f32,
    pressure_lim: f32,
}

impl PressureNormalizer {
    /// Prepare a normalizer for `pressure` with a window of `pressure_lim`
    /// dB below the peak.
    ///
    /// Non-finite samples are ignored when searching for the peak. An empty
    /// (or all non-finite) slice yields a peak of 0.
    pub fn new(pressure: &[f32], pressure_lim: f32) -> Result<Self, ScatterError> {
        validate_limit(pressure_lim)?;
        let max_pressure = pressure
            .iter()
            .copied()
            .filter(|p| p.is_finite())
            .reduce(f32::max)
            .unwrap_or(0.0);
        Ok(Self {
            max_pressure,
            pressure_lim,
        })
    }

    /// Peak pressure the samples are measured against.
    #[must_use]
    pub fn max_pressure(&self) -> f32 {
        self.max_pressure
    }

    /// The dB window.
    #[must_use]
    pub fn pressure_lim(&self) -> f32 {
        self.pressure_lim
    }

    /// Normalize one sample into [0, 1].
    #[must_use]
    pub fn normalize_one(&self, pressure: f32) -> f32 {
        let rel = pressure - self.max_pressure;
        let v = (rel + self.pressure_lim).max(0.0) / self.pressure_lim;
        if v.is_finite() {
            v.min(1.0)
        } else {
            0.0
        }
    }
}

/// Reject a pressure window that cannot normalize anything.
pub fn validate_limit(pressure_lim: f32) -> Result<(), ScatterError> {
    if pressure_lim > 0.0 && pressure_lim.is_finite() {
        Ok(())
    } else {
        Err(ScatterError::DegenerateNormalization(pressure_lim))
    }
}

/// Normalize every sample of `pressure` against its own peak.
///
/// The peak sample always normalizes to exactly 1.
pub fn normalize(
    pressure: &[f32],
    pressure_lim: f32,
) -> Result<Vec<f32>, ScatterError> {
    let normalizer = PressureNormalizer::new(pressure, pressure_lim)?;
    Ok(pressure
        .iter()
        .map(|&p| normalizer.normalize_one(p))
        .collect())
}

/// Deformation radius for a normalized sample.
#[must_use]
pub fn radius(normalized: f32, scale: f32) -> f32 {
    normalized * scale
}

/// Jet color for a normalized sample.
#[must_use]
pub fn color_of(normalized: f32) -> [f32; 3] {
    colormap::color_of(normalized)
}
