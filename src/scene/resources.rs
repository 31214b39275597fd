//! Upload/release seam between CPU geometry and the presentation layer.
//!
//! Viewports never hold GPU objects. They hand meshes and grid lines to a
//! [`GeometrySink`] and keep the returned [`BufferHandle`], which they must
//! release explicitly on rebuild and teardown.

use rustc_hash::FxHashMap;

use crate::error::ScatterError;
use crate::geometry::{GridGeometry, RenderableMesh};

/// Opaque id of a buffer owned by a [`GeometrySink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferHandle(pub u64);

/// Something that can take ownership of geometry for drawing.
pub trait GeometrySink {
    /// Upload a polar or product surface.
    fn upload_mesh(&mut self, mesh: &RenderableMesh) -> BufferHandle;

    /// Upload a reference grid as a line list.
    fn upload_lines(&mut self, grid: &GridGeometry) -> BufferHandle;

    /// Free a buffer. Releasing an unknown or already released handle is
    /// an error the caller logs and ignores.
    fn release(&mut self, handle: BufferHandle) -> Result<(), ScatterError>;
}

/// Kind of geometry behind a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferKind {
    /// Triangle mesh.
    Mesh,
    /// Line list.
    Lines,
}

/// Bookkeeping for one live buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferInfo {
    /// What the buffer holds.
    pub kind: BufferKind,
    /// Bytes that would be uploaded.
    pub bytes: usize,
}

/// Sink without a GPU: tracks live buffers and their sizes.
///
/// Used by the headless binary and by tests to check that every upload is
/// paired with exactly one release.
#[derive(Debug, Default)]
pub struct HeadlessSink {
    next: u64,
    live: FxHashMap<BufferHandle, BufferInfo>,
    uploads: usize,
    releases: usize,
}

impl HeadlessSink {
    /// Empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of buffers uploaded and not yet released.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Total bytes held by live buffers.
    #[must_use]
    pub fn live_bytes(&self) -> usize {
        self.live.values().map(|b| b.bytes).sum()
    }

    /// Info for a live handle.
    #[must_use]
    pub fn info(&self, handle: BufferHandle) -> Option<BufferInfo> {
        self.live.get(&handle).copied()
    }

    /// Whether `handle` is live.
    #[must_use]
    pub fn is_live(&self, handle: BufferHandle) -> bool {
        self.live.contains_key(&handle)
    }

    /// Uploads performed so far.
    #[must_use]
    pub fn uploads(&self) -> usize {
        self.uploads
    }

    /// Successful releases so far.
    #[must_use]
    pub fn releases(&self) -> usize {
        self.releases
    }

    fn insert(&mut self, kind: BufferKind, bytes: usize) -> BufferHandle {
        let handle = BufferHandle(self.next);
        self.next += 1;
        self.uploads += 1;
        let _ = self.live.insert(handle, BufferInfo { kind, bytes });
        handle
    }
}

impl GeometrySink for HeadlessSink {
    fn upload_mesh(&mut self, mesh: &RenderableMesh) -> BufferHandle {
        let vertices = mesh.vertices();
        let bytes = bytemuck::cast_slice::<_, u8>(&vertices).len()
            + bytemuck::cast_slice::<_, u8>(&mesh.indices).len();
        self.insert(BufferKind::Mesh, bytes)
    }

    fn upload_lines(&mut self, grid: &GridGeometry) -> BufferHandle {
        let (positions, colors) = grid.flatten();
        let bytes = bytemuck::cast_slice::<_, u8>(&positions).len()
            + bytemuck::cast_slice::<_, u8>(&colors).len();
        self.insert(BufferKind::Lines, bytes)
    }

    fn release(&mut self, handle: BufferHandle) -> Result<(), ScatterError> {
        match self.live.remove(&handle) {
            Some(_) => {
                self.releases += 1;
                Ok(())
            }
            None => Err(ScatterError::ResourceDisposal(format!(
                "buffer {} is not live",
                handle.0
            ))),
        }
    }
}

/// Release `handle`, logging instead of failing.
pub(crate) fn release_logged(
    sink: &mut dyn GeometrySink,
    handle: BufferHandle,
) {
    if let Err(e) = sink.release(handle) {
        log::warn!("{e}");
    }
}
