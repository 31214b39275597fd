//! Crate-level error types.

use std::fmt;

/// Errors produced by the scatterview crate.
///
/// Nothing in the crate lets these escape past a [`Viewport`]: the view
/// layer turns every failure into "no renderable output" plus a log line.
///
/// [`Viewport`]: crate::scene::Viewport
#[derive(Debug)]
pub enum ScatterError {
    /// A required payload field was absent.
    MissingData(&'static str),
    /// A triangle referenced a vertex outside the vertex range.
    MalformedIndex {
        /// Offending index after base correction.
        index: i64,
        /// Number of vertices in the sample.
        vertex_count: usize,
    },
    /// The pressure window was zero, negative or not finite.
    DegenerateNormalization(f32),
    /// Per-vertex arrays disagree in length.
    LengthMismatch {
        /// Name of the array that disagrees with the coordinates.
        field: &'static str,
        /// Number of coordinates.
        expected: usize,
        /// Number of entries actually present.
        actual: usize,
    },
    /// A reference grid was requested with zero segments or a bad radius.
    InvalidGrid(String),
    /// Releasing a GPU-side buffer or a camera control failed.
    ResourceDisposal(String),
    /// Failed to parse a simulation payload.
    Payload(String),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// Generic I/O failure.
    Io(std::io::Error),
}

impl fmt::Display for ScatterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingData(field) => {
                write!(f, "missing required field '{field}'")
            }
            Self::MalformedIndex {
                index,
                vertex_count,
            } => write!(
                f,
                "triangle index {index} outside vertex range 0..{vertex_count}"
            ),
            Self::DegenerateNormalization(lim) => {
                write!(f, "pressure limit must be positive, got {lim}")
            }
            Self::LengthMismatch {
                field,
                expected,
                actual,
            } => write!(
                f,
                "'{field}' has {actual} entries, expected {expected}"
            ),
            Self::InvalidGrid(msg) => write!(f, "invalid reference grid: {msg}"),
            Self::ResourceDisposal(msg) => {
                write!(f, "resource disposal failed: {msg}")
            }
            Self::Payload(msg) => write!(f, "payload parse error: {msg}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for ScatterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ScatterError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for ScatterError {
    fn from(e: serde_json::Error) -> Self {
        Self::Payload(e.to_string())
    }
}
