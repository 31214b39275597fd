//! Normalized value → RGB color mapping.
//!
//! Pressure surfaces are colored with a hand-specified "jet" ramp:
//! dark blue → blue → cyan → yellow → red, with breakpoints at
//! 0.125, 0.375, 0.625 and 0.875. Each segment is linear and meets its
//! neighbours exactly at the breakpoints.

/// Breakpoints of the jet ramp, in order.
pub const JET_THRESHOLDS: [f32; 4] = [0.125, 0.375, 0.625, 0.875];

/// Jet color for a normalized pressure value in [0, 1].
#[must_use]
pub fn color_of(normalized: f32) -> [f32; 3] {
    let v = if normalized.is_nan() {
        0.0
    } else {
        normalized.clamp(0.0, 1.0)
    };
    if v <= JET_THRESHOLDS[0] {
        [0.0, 0.0, 0.5 + 4.0 * v]
    } else if v <= JET_THRESHOLDS[1] {
        [0.0, 4.0 * (v - JET_THRESHOLDS[0]), 1.0]
    } else if v <= JET_THRESHOLDS[2] {
        let d = 4.0 * (v - JET_THRESHOLDS[1]);
        [d, 1.0, 1.0 - d]
    } else if v <= JET_THRESHOLDS[3] {
        [1.0, 1.0 - 4.0 * (v - JET_THRESHOLDS[2]), 0.0]
    } else {
        [1.0, 0.0, 0.0]
    }
}

/// Parse a `#RRGGBB` hex string into linear [0, 1] components.
///
/// Returns `None` for anything that is not exactly six hex digits after `#`.
#[must_use]
pub fn hex_to_rgb(hex: &str) -> Option<[f32; 3]> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16)
            .ok()
            .map(|c| f32::from(c) / 255.0)
    };
    Some([channel(0..2)?, channel(2..4)?, channel(4..6)?])
}
