//! Serde model of the polar comparison payload.
//!
//! The payload is produced by the (external) fetch layer. `results` is a
//! JSON object keyed by file id whose entry order is the display order, so
//! it is read into a `Vec` rather than a hash map.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ScatterError;
use crate::geometry::{SourceAngle, SurfaceSample};

/// One file's entry in the payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileResult {
    /// Display name of the source file.
    #[serde(default)]
    pub filename: String,
    /// Set when the backend could not produce data for this file.
    #[serde(default)]
    pub error: bool,
    /// Human-readable reason accompanying `error`.
    #[serde(default)]
    pub message: Option<String>,
    /// Sample points.
    #[serde(default)]
    pub coordinates: Option<Vec<[f32; 3]>>,
    /// Triangles, 0- or 1-based.
    #[serde(default)]
    pub connectivity: Option<Vec<[i64; 3]>>,
    /// Pressure per point in dB.
    #[serde(default)]
    pub pressure: Option<Vec<f32>>,
}

impl FileResult {
    /// Surface sample for this file with the given pressure window, or
    /// `None` when the backend flagged an error.
    #[must_use]
    pub fn to_sample(&self, pressure_lim: f32) -> Option<SurfaceSample> {
        (!self.error).then(|| SurfaceSample {
            coordinates: self.coordinates.clone(),
            connectivity: self.connectivity.clone(),
            pressure: self.pressure.clone(),
            pressure_lim,
        })
    }

    /// Text shown in place of the mesh when `error` is set.
    #[must_use]
    pub fn error_message(&self) -> &str {
        self.message.as_deref().unwrap_or("No polar data available")
    }
}

/// The full comparison payload for one source/frequency selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolarResponse {
    /// Per-file results in display order.
    #[serde(default, with = "ordered_results")]
    pub results: Vec<(String, FileResult)>,
    /// Source directions shared by every file.
    #[serde(default)]
    pub source_angles: Vec<SourceAngle>,
    /// Frequencies (Hz) available in every file.
    #[serde(default)]
    pub common_frequencies: Vec<f32>,
    /// Optional dB window suggested by the backend.
    #[serde(default, rename = "pressureLim", skip_serializing_if = "Option::is_none")]
    pub pressure_lim: Option<f32>,
}

impl PolarResponse {
    /// Parse a payload from JSON text.
    pub fn from_json(text: &str) -> Result<Self, ScatterError> {
        let response: Self = serde_json::from_str(text)?;
        log::debug!(
            "parsed payload: {} files, {} sources, {} frequencies",
            response.results.len(),
            response.source_angles.len(),
            response.common_frequencies.len()
        );
        Ok(response)
    }

    /// Fail with [`ScatterError::MissingData`] when the payload carries no
    /// file results at all.
    pub fn require_results(&self) -> Result<(), ScatterError> {
        if self.results.is_empty() {
            Err(ScatterError::MissingData("results"))
        } else {
            Ok(())
        }
    }

    /// File ids in display order.
    pub fn file_ids(&self) -> impl Iterator<Item = &str> {
        self.results.iter().map(|(id, _)| id.as_str())
    }

    /// Result for `file_id`.
    #[must_use]
    pub fn result(&self, file_id: &str) -> Option<&FileResult> {
        self.results
            .iter()
            .find(|(id, _)| id == file_id)
            .map(|(_, r)| r)
    }
}

mod ordered_results {
    use super::{
        fmt, Deserializer, FileResult, MapAccess, SerializeMap, Serializer,
        Visitor,
    };

    pub(super) fn serialize<S: Serializer>(
        results: &[(String, FileResult)],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(results.len()))?;
        for (id, result) in results {
            map.serialize_entry(id, result)?;
        }
        map.end()
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<(String, FileResult)>, D::Error> {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = Vec<(String, FileResult)>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of file id to result")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> Result<Self::Value, A::Error> {
                let mut out =
                    Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(entry) = access.next_entry()? {
                    out.push(entry);
                }
                Ok(out)
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}
