//! Triangle index repair.
//!
//! Simulation exports are inconsistent about index bases and occasionally
//! reference vertices that do not exist. Indices are rebased when the source
//! is one-based and triangles that still fall outside the vertex range are
//! dropped. Winding order is preserved: with double-sided rendering it still
//! decides which face counts as the front.

use crate::error::ScatterError;

/// Indexing convention detected in a connectivity list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexBase {
    /// Indices start at 0.
    #[default]
    Zero,
    /// Indices start at 1 (MATLAB/Fortran-style exports).
    One,
}

impl IndexBase {
    /// Offset subtracted from every raw index.
    #[must_use]
    pub fn offset(self) -> i64 {
        match self {
            Self::Zero => 0,
            Self::One => 1,
        }
    }
}

/// Result of correcting a connectivity list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CorrectedConnectivity {
    /// Valid triangles, zero-based, in input order.
    pub triangles: Vec<[u32; 3]>,
    /// Base detected in the input.
    pub base: IndexBase,
    /// Number of triangles dropped for out-of-range indices.
    pub dropped: usize,
}

impl CorrectedConnectivity {
    /// Flattened index list for an indexed draw.
    #[must_use]
    pub fn flat_indices(&self) -> Vec<u32> {
        self.triangles.iter().flatten().copied().collect()
    }
}

/// Detect the base: one-based iff the smallest index is exactly 1.
#[must_use]
pub fn detect_base(connectivity: &[[i64; 3]]) -> IndexBase {
    let min = connectivity.iter().flatten().copied().min();
    if min == Some(1) {
        IndexBase::One
    } else {
        IndexBase::Zero
    }
}

/// Rebase and filter `connectivity` against `vertex_count` vertices.
///
/// Never fails: invalid triangles are counted in
/// [`CorrectedConnectivity::dropped`] and otherwise ignored.
#[must_use]
pub fn correct_with_report(
    connectivity: &[[i64; 3]],
    vertex_count: usize,
) -> CorrectedConnectivity {
    correct_with_base(connectivity, vertex_count, detect_base(connectivity))
}

/// Like [`correct_with_report`], but with a known `base` instead of one
/// detected from the data.
#[must_use]
pub fn correct_with_base(
    connectivity: &[[i64; 3]],
    vertex_count: usize,
    base: IndexBase,
) -> CorrectedConnectivity {
    let offset = base.offset();
    let mut triangles = Vec::with_capacity(connectivity.len());
    let mut first_rejected = None;

    for tri in connectivity {
        let corrected = tri.map(|i| i - offset);
        match check_triangle(corrected, vertex_count) {
            Ok(valid) => triangles.push(valid),
            Err(e) => {
                if first_rejected.is_none() {
                    first_rejected = Some(e);
                }
            }
        }
    }

    let dropped = connectivity.len() - triangles.len();
    if let Some(e) = first_rejected {
        log::debug!(
            "dropped {dropped} of {} triangles (first: {e})",
            connectivity.len()
        );
    }

    CorrectedConnectivity {
        triangles,
        base,
        dropped,
    }
}

/// Rebase and filter `connectivity`, returning only the valid triangles.
#[must_use]
pub fn correct(connectivity: &[[i64; 3]], vertex_count: usize) -> Vec<[u32; 3]> {
    correct_with_report(connectivity, vertex_count).triangles
}

/// Validate one already-rebased triangle.
fn check_triangle(
    tri: [i64; 3],
    vertex_count: usize,
) -> Result<[u32; 3], ScatterError> {
    let mut out = [0_u32; 3];
    for (slot, &index) in out.iter_mut().zip(tri.iter()) {
        let in_range = usize::try_from(index)
            .ok()
            .filter(|&i| i < vertex_count)
            .and_then(|i| u32::try_from(i).ok());
        *slot = in_range.ok_or(ScatterError::MalformedIndex {
            index,
            vertex_count,
        })?;
    }
    Ok(out)
}
