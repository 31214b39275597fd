//! One product's viewport: its polar mesh, the shared reference grid and
//! the camera controller that links it to its siblings.
//!
//! A viewport owns at most one uploaded mesh and one uploaded grid. Every
//! replacement follows the same order: build the new geometry, release the
//! old buffer, upload the new one. Nothing here returns an error; failures
//! become "no mesh" plus a log line.

use std::rc::Rc;

use glam::Vec3;
use web_time::Instant;

use super::resources::{release_logged, BufferHandle, GeometrySink};
use crate::camera::{CameraSyncController, OrbitCamera, SyncGroup, ViewportId};
use crate::geometry::product_mesh::{build_product_mesh, ProductGeometry};
use crate::geometry::{
    GridGeometry, PolarMeshBuilder, RenderableMesh, SurfaceSample,
};
use crate::input::{InputEvent, ViewportCommand, ViewportInput};
use crate::options::Options;

/// What a viewport currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportContent {
    /// A polar mesh is uploaded.
    Mesh,
    /// No usable sample yet, or the last build failed.
    Placeholder,
    /// The backend reported an error for this file.
    Error,
}

/// An uploaded mesh and the buffer holding it.
#[derive(Debug)]
struct MeshSlot {
    mesh: RenderableMesh,
    handle: BufferHandle,
}

/// One product view.
#[derive(Debug)]
pub struct Viewport {
    id: ViewportId,
    label: String,
    color: [f32; 3],
    position: Vec3,
    builder: PolarMeshBuilder,
    sample: Option<SurfaceSample>,
    /// Digest of the sample the current content was built from.
    digest: Option<u64>,
    mesh: Option<MeshSlot>,
    /// Product geometry drawn under the polar surface.
    product: Option<MeshSlot>,
    grid: Option<(Rc<GridGeometry>, BufferHandle)>,
    error: Option<String>,
    controller: CameraSyncController,
    input: ViewportInput,
    /// Bumped whenever the displayed content changes.
    generation: u64,
}

impl Viewport {
    /// Empty viewport with its own camera at the configured initial pose.
    #[must_use]
    pub fn new(id: ViewportId, label: impl Into<String>, options: &Options) -> Self {
        Self {
            id,
            label: label.into(),
            color: [1.0; 3],
            position: Vec3::ZERO,
            builder: PolarMeshBuilder::new(&options.mesh),
            sample: None,
            digest: None,
            mesh: None,
            product: None,
            grid: None,
            error: None,
            controller: CameraSyncController::new(
                id,
                OrbitCamera::new(&options.camera),
            ),
            input: ViewportInput::new(),
            generation: 0,
        }
    }

    /// Viewport id.
    #[must_use]
    pub fn id(&self) -> ViewportId {
        self.id
    }

    /// Display name (the file name).
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Product tint.
    #[must_use]
    pub fn color(&self) -> [f32; 3] {
        self.color
    }

    /// Set the product tint.
    pub fn set_color(&mut self, color: [f32; 3]) {
        self.color = color;
    }

    /// Scene offset of this product.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Move this product within the scene.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Current content.
    #[must_use]
    pub fn content(&self) -> ViewportContent {
        if self.error.is_some() {
            ViewportContent::Error
        } else if self.mesh.is_some() {
            ViewportContent::Mesh
        } else {
            ViewportContent::Placeholder
        }
    }

    /// Current mesh, if any.
    #[must_use]
    pub fn mesh(&self) -> Option<&RenderableMesh> {
        self.mesh.as_ref().map(|slot| &slot.mesh)
    }

    /// Buffer holding the current mesh.
    #[must_use]
    pub fn mesh_handle(&self) -> Option<BufferHandle> {
        self.mesh.as_ref().map(|slot| slot.handle)
    }

    /// Shared reference grid and its buffer.
    #[must_use]
    pub fn grid(&self) -> Option<(&Rc<GridGeometry>, BufferHandle)> {
        self.grid.as_ref().map(|(g, h)| (g, *h))
    }

    /// Current product mesh, floor-placed and tinted.
    #[must_use]
    pub fn product_mesh(&self) -> Option<&RenderableMesh> {
        self.product.as_ref().map(|slot| &slot.mesh)
    }

    /// Backend error text shown instead of a mesh.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Monotonic content generation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Camera controller.
    #[must_use]
    pub fn controller(&self) -> &CameraSyncController {
        &self.controller
    }

    /// Mutable camera controller.
    pub fn controller_mut(&mut self) -> &mut CameraSyncController {
        &mut self.controller
    }

    /// Link this viewport's camera to `group`.
    pub fn attach(&mut self, group: &SyncGroup) {
        self.controller.attach(group);
    }

    /// Show `grid`, replacing any previous one. The same shared grid is not
    /// uploaded twice.
    pub fn set_grid(&mut self, grid: Rc<GridGeometry>, sink: &mut dyn GeometrySink) {
        if let Some((current, _)) = &self.grid {
            if Rc::ptr_eq(current, &grid) {
                return;
            }
        }
        if let Some((_, old)) = self.grid.take() {
            release_logged(sink, old);
        }
        let handle = sink.upload_lines(&grid);
        self.grid = Some((grid, handle));
    }

    /// Show `sample`. Rebuilds only when its content differs from what is
    /// displayed. Returns whether a rebuild happened.
    pub fn set_sample(&mut self, sample: SurfaceSample, sink: &mut dyn GeometrySink) -> bool {
        let digest = sample.digest();
        if self.error.is_none() && self.digest == Some(digest) {
            log::trace!("{}: sample unchanged, keeping mesh", self.id);
            return false;
        }

        let built = match self.builder.build(&sample) {
            Ok(mesh) => mesh,
            Err(e) => {
                log::warn!("{}: mesh build failed for '{}': {e}", self.id, self.label);
                None
            }
        };

        if let Some(old) = self.mesh.take() {
            release_logged(sink, old.handle);
        }
        self.mesh = built.map(|mesh| {
            let handle = sink.upload_mesh(&mesh);
            MeshSlot { mesh, handle }
        });
        self.error = None;
        self.digest = Some(digest);
        self.sample = Some(sample);
        self.generation += 1;
        true
    }

    /// Rebuild the current sample with a different pressure window.
    pub fn set_pressure_lim(&mut self, pressure_lim: f32, sink: &mut dyn GeometrySink) -> bool {
        match &self.sample {
            Some(sample) if self.error.is_none() => {
                let sample = SurfaceSample {
                    pressure_lim,
                    ..sample.clone()
                };
                self.set_sample(sample, sink)
            }
            _ => false,
        }
    }

    /// Show the product geometry in this viewport's tint. Unusable
    /// geometry clears it. Returns whether a product mesh is shown.
    pub fn set_product(
        &mut self,
        geometry: &ProductGeometry,
        sink: &mut dyn GeometrySink,
    ) -> bool {
        let built = build_product_mesh(geometry).map(|m| m.to_renderable(self.color));
        if built.is_none() {
            log::debug!("{}: no usable product geometry", self.id);
        }
        if let Some(old) = self.product.take() {
            release_logged(sink, old.handle);
        }
        self.product = built.map(|mesh| {
            let handle = sink.upload_mesh(&mesh);
            MeshSlot { mesh, handle }
        });
        self.generation += 1;
        self.product.is_some()
    }

    /// Replace the content with a backend error message.
    pub fn set_error(&mut self, message: impl Into<String>, sink: &mut dyn GeometrySink) {
        if let Some(old) = self.mesh.take() {
            release_logged(sink, old.handle);
        }
        self.error = Some(message.into());
        self.sample = None;
        self.digest = None;
        self.generation += 1;
    }

    /// Feed a pointer event. Camera gestures are applied here; a clicked
    /// source marker is returned to the caller.
    pub fn handle_input(
        &mut self,
        event: InputEvent,
        hovered_marker: Option<usize>,
        now: Instant,
    ) -> Option<usize> {
        match self.input.handle_event(event, hovered_marker)? {
            ViewportCommand::Camera(cmd) => {
                self.controller.apply_command_at(cmd, now);
                None
            }
            ViewportCommand::SelectSource { index } => Some(index),
        }
    }

    /// Advance camera damping. Returns whether the camera moved.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.controller.tick(now)
    }

    /// Release every buffer and detach the camera. Safe to call twice.
    pub fn teardown(&mut self, sink: &mut dyn GeometrySink) {
        if let Some(old) = self.mesh.take() {
            release_logged(sink, old.handle);
        }
        if let Some(old) = self.product.take() {
            release_logged(sink, old.handle);
        }
        if let Some((_, handle)) = self.grid.take() {
            release_logged(sink, handle);
        }
        self.sample = None;
        self.digest = None;
        self.controller.detach();
    }

    fn live_buffers(&self) -> usize {
        usize::from(self.mesh.is_some())
            + usize::from(self.product.is_some())
            + usize::from(self.grid.is_some())
    }
}

impl Drop for Viewport {
    fn drop(&mut self) {
        let live = self.live_buffers();
        if live > 0 {
            log::warn!("{} dropped with {live} unreleased buffers", self.id);
        }
    }
}
