//! Side-by-side comparison of several products' polar responses.
//!
//! A [`ComparisonView`] owns one [`Viewport`] per file in the payload, the
//! [`SyncGroup`] that links their cameras, the shared reference grid and
//! the selection state (source, frequency, pressure window, layout). The
//! fetch layer reads [`ComparisonView::query`] to know what to load next
//! and hands the result back through [`ComparisonView::apply_response`].

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use web_time::Instant;

use super::layout::{mesh_position, LayoutMode, Palette};
use super::payload::{FileResult, PolarResponse};
use super::resources::GeometrySink;
use super::viewport::{Viewport, ViewportContent};
use crate::camera::{SyncGroup, ViewportId};
use crate::geometry::source_markers::SourceMarker;
use crate::geometry::{GridCache, ReferenceGridBuilder, SourceMarkers};
use crate::input::InputEvent;
use crate::options::Options;

/// Which surface of the products is compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    /// Scattering surface.
    #[default]
    Diffusor,
    /// Flat reference surface.
    Reflector,
}

/// What the fetch layer should load for the current selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolarQuery {
    /// Files in display order.
    pub file_ids: Vec<String>,
    /// Selected source direction.
    pub source_index: usize,
    /// Selected frequency.
    pub freq_index: usize,
    /// Selected surface.
    pub surface: Surface,
}

/// One row of the product legend.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    /// File name.
    pub label: String,
    /// Product tint.
    pub color: [f32; 3],
    /// Whether the product has a mesh to show.
    pub has_data: bool,
}

/// Per-frame output of [`ComparisonView::tick`].
#[derive(Debug, Clone, PartialEq)]
pub struct FrameUpdate {
    /// Viewports whose camera moved this frame.
    pub moved: Vec<ViewportId>,
    /// Source markers with their current pulse.
    pub markers: Vec<SourceMarker>,
}

/// Round a frequency for display: `"1000 Hz"`.
#[must_use]
pub fn frequency_label(hz: f32) -> String {
    format!("{} Hz", hz.round())
}

/// Multi-product comparison.
#[derive(Debug)]
pub struct ComparisonView {
    options: Options,
    group: Option<SyncGroup>,
    grids: GridCache,
    palette: Palette,
    file_ids: Vec<String>,
    viewports: Vec<Viewport>,
    markers: SourceMarkers,
    frequencies: Vec<f32>,
    selected_frequency: usize,
    pressure_lim: f32,
    surface: Surface,
    layout: LayoutMode,
    active_index: usize,
    started: Instant,
}

impl ComparisonView {
    /// Open a view over every file in `response`.
    pub fn open(
        response: &PolarResponse,
        options: Options,
        sink: &mut dyn GeometrySink,
    ) -> Self {
        let pressure_lim = clamp_lim(
            response.pressure_lim.unwrap_or(options.mesh.pressure_lim),
            options.mesh.min_pressure_lim,
        )
        .unwrap_or(options.mesh.pressure_lim);
        let mut view = Self {
            grids: GridCache::new(ReferenceGridBuilder::new(
                options.grid.label_offset,
            )),
            palette: Palette::from_options(&options.layout),
            group: None,
            file_ids: Vec::new(),
            viewports: Vec::new(),
            markers: SourceMarkers::new(Vec::new(), options.markers),
            frequencies: Vec::new(),
            selected_frequency: 0,
            pressure_lim,
            surface: Surface::default(),
            layout: if options.layout.stacked {
                LayoutMode::Stack
            } else {
                LayoutMode::Grid
            },
            active_index: 0,
            started: Instant::now(),
            options,
        };
        view.apply_response(response, sink);
        view
    }

    /// Install a freshly fetched payload. Viewports are kept (with their
    /// camera poses) when the file list is unchanged and rebuilt otherwise.
    pub fn apply_response(
        &mut self,
        response: &PolarResponse,
        sink: &mut dyn GeometrySink,
    ) {
        let ids: Vec<String> = response.file_ids().map(str::to_owned).collect();
        if ids != self.file_ids {
            self.rebuild_viewports(&response.results, sink);
            self.file_ids = ids;
        }

        for (viewport, (_, result)) in
            self.viewports.iter_mut().zip(&response.results)
        {
            match result.to_sample(self.pressure_lim) {
                Some(sample) => {
                    let _ = viewport.set_sample(sample, sink);
                }
                None => viewport.set_error(result.error_message(), sink),
            }
        }

        if !response.source_angles.is_empty() {
            let selected = self.markers.selected();
            self.markers = SourceMarkers::new(
                response.source_angles.clone(),
                self.options.markers,
            );
            let _ = self.markers.select(selected);
        }
        if !response.common_frequencies.is_empty() {
            self.frequencies.clone_from(&response.common_frequencies);
            if self.selected_frequency >= self.frequencies.len() {
                self.selected_frequency = 0;
            }
        }
    }

    fn rebuild_viewports(
        &mut self,
        results: &[(String, FileResult)],
        sink: &mut dyn GeometrySink,
    ) {
        for mut viewport in self.viewports.drain(..) {
            viewport.teardown(sink);
        }
        self.group = (!results.is_empty())
            .then(|| SyncGroup::new(&self.options.sync));

        let grid = if self.options.grid.visible {
            self.grids
                .get(self.options.grid.radius, self.options.grid.segments)
                .map_err(|e| log::warn!("reference grid unavailable: {e}"))
                .ok()
        } else {
            None
        };

        for (index, (_, result)) in results.iter().enumerate() {
            let id = ViewportId(u32::try_from(index).unwrap_or(u32::MAX));
            let mut viewport = Viewport::new(id, result.filename.clone(), &self.options);
            viewport.set_color(self.palette.color(index));
            if let Some(group) = &self.group {
                viewport.attach(group);
            }
            if let Some(grid) = &grid {
                viewport.set_grid(Rc::clone(grid), sink);
            }
            self.viewports.push(viewport);
        }
        self.active_index = 0;
        self.reposition();
        log::info!("Opened comparison of {} files", self.viewports.len());
    }

    fn reposition(&mut self) {
        let count = self.viewports.len();
        for (index, viewport) in self.viewports.iter_mut().enumerate() {
            viewport.set_position(mesh_position(
                index,
                count,
                self.layout,
                self.options.layout.spacing,
            ));
        }
    }

    /// Viewports in display order.
    #[must_use]
    pub fn viewports(&self) -> &[Viewport] {
        &self.viewports
    }

    /// Viewport at `index`.
    #[must_use]
    pub fn viewport(&self, index: usize) -> Option<&Viewport> {
        self.viewports.get(index)
    }

    /// Mutable viewport at `index`.
    pub fn viewport_mut(&mut self, index: usize) -> Option<&mut Viewport> {
        self.viewports.get_mut(index)
    }

    /// Viewports currently on screen: all in grid mode, the active one in
    /// stack mode.
    pub fn visible_viewports(&self) -> impl Iterator<Item = &Viewport> {
        let active = self.active_index;
        let stacked = self.layout == LayoutMode::Stack;
        self.viewports
            .iter()
            .enumerate()
            .filter(move |(i, _)| !stacked || *i == active)
            .map(|(_, v)| v)
    }

    /// Camera sync group, present while at least one file is open.
    #[must_use]
    pub fn sync_group(&self) -> Option<&SyncGroup> {
        self.group.as_ref()
    }

    /// Whether camera movement is linked across viewports.
    #[must_use]
    pub fn sync_enabled(&self) -> bool {
        self.group.as_ref().is_some_and(SyncGroup::is_enabled)
    }

    /// Link or unlink camera movement.
    pub fn set_sync_enabled(&mut self, enabled: bool) {
        self.options.sync.enabled = enabled;
        if let Some(group) = &self.group {
            group.set_enabled(enabled);
        }
    }

    /// Current dB window.
    #[must_use]
    pub fn pressure_lim(&self) -> f32 {
        self.pressure_lim
    }

    /// Change the dB window, clamped to the configured minimum. Invalid
    /// input keeps the current value. Returns the value in effect.
    pub fn set_pressure_lim(
        &mut self,
        pressure_lim: f32,
        sink: &mut dyn GeometrySink,
    ) -> f32 {
        let Some(lim) = clamp_lim(pressure_lim, self.options.mesh.min_pressure_lim)
        else {
            log::warn!("ignoring pressure limit {pressure_lim}");
            return self.pressure_lim;
        };
        if lim != self.pressure_lim {
            self.pressure_lim = lim;
            for viewport in &mut self.viewports {
                let _ = viewport.set_pressure_lim(lim, sink);
            }
        }
        self.pressure_lim
    }

    /// Source markers.
    #[must_use]
    pub fn markers(&self) -> &SourceMarkers {
        &self.markers
    }

    /// Selected source index.
    #[must_use]
    pub fn selected_source(&self) -> usize {
        self.markers.selected()
    }

    /// Select a source. The caller refetches with [`query`](Self::query).
    pub fn select_source(&mut self, index: usize) -> bool {
        self.markers.select(index)
    }

    /// Highlight the marker under the pointer.
    pub fn set_hovered_source(&mut self, index: Option<usize>) {
        self.markers.set_hovered(index);
    }

    /// Show every source as a random-incidence set.
    pub fn set_random_incidence(&mut self, random: bool) {
        self.markers.set_random_mode(random);
    }

    /// Selector entries for every source.
    #[must_use]
    pub fn source_labels(&self) -> Vec<String> {
        (0..self.markers.angles().len())
            .filter_map(|i| self.markers.option_label(i))
            .collect()
    }

    /// Available frequencies in Hz.
    #[must_use]
    pub fn frequencies(&self) -> &[f32] {
        &self.frequencies
    }

    /// Selected frequency index.
    #[must_use]
    pub fn selected_frequency(&self) -> usize {
        self.selected_frequency
    }

    /// Select a frequency. Out-of-range indices are ignored.
    pub fn select_frequency(&mut self, index: usize) -> bool {
        if index < self.frequencies.len() {
            self.selected_frequency = index;
            true
        } else {
            false
        }
    }

    /// Label of the selected frequency.
    #[must_use]
    pub fn frequency_label(&self) -> Option<String> {
        self.frequencies
            .get(self.selected_frequency)
            .map(|&hz| frequency_label(hz))
    }

    /// Labels for the lowest and highest frequency.
    #[must_use]
    pub fn frequency_range_labels(&self) -> Option<(String, String)> {
        Some((
            frequency_label(*self.frequencies.first()?),
            frequency_label(*self.frequencies.last()?),
        ))
    }

    /// Compared surface.
    #[must_use]
    pub fn surface(&self) -> Surface {
        self.surface
    }

    /// Switch the compared surface.
    pub fn set_surface(&mut self, surface: Surface) {
        self.surface = surface;
    }

    /// Fetch request for the current selection.
    #[must_use]
    pub fn query(&self) -> PolarQuery {
        PolarQuery {
            file_ids: self.file_ids.clone(),
            source_index: self.markers.selected(),
            freq_index: self.selected_frequency,
            surface: self.surface,
        }
    }

    /// Current layout mode.
    #[must_use]
    pub fn layout(&self) -> LayoutMode {
        self.layout
    }

    /// Switch between grid and stack layout.
    pub fn set_layout(&mut self, layout: LayoutMode) {
        if layout != self.layout {
            self.layout = layout;
            self.reposition();
        }
    }

    /// Product shown in stack mode.
    #[must_use]
    pub fn active_index(&self) -> usize {
        self.active_index
    }

    /// Choose the product shown in stack mode.
    pub fn set_active_index(&mut self, index: usize) -> bool {
        if index < self.viewports.len() {
            self.active_index = index;
            true
        } else {
            false
        }
    }

    /// Legend rows in display order.
    #[must_use]
    pub fn legend(&self) -> Vec<LegendEntry> {
        self.viewports
            .iter()
            .map(|v| LegendEntry {
                label: v.label().to_owned(),
                color: v.color(),
                has_data: v.content() == ViewportContent::Mesh,
            })
            .collect()
    }

    /// Route a pointer event to viewport `index`. A clicked marker selects
    /// its source. Returns whether the selection changed.
    pub fn handle_input(
        &mut self,
        index: usize,
        event: InputEvent,
        hovered_marker: Option<usize>,
        now: Instant,
    ) -> bool {
        let Some(viewport) = self.viewports.get_mut(index) else {
            return false;
        };
        match viewport.handle_input(event, hovered_marker, now) {
            Some(source) if source != self.markers.selected() => {
                self.markers.select(source)
            }
            _ => false,
        }
    }

    /// Advance one frame: camera damping and marker pulses.
    pub fn tick(&mut self, now: Instant) -> FrameUpdate {
        let moved = self
            .viewports
            .iter_mut()
            .filter_map(|v| v.tick(now).then(|| v.id()))
            .collect();
        let elapsed_ms = now
            .checked_duration_since(self.started)
            .map_or(0.0, |d| d.as_secs_f64() * 1000.0);
        FrameUpdate {
            moved,
            markers: self.markers.frame(elapsed_ms),
        }
    }

    /// Release every viewport's buffers and unlink the cameras. Safe to
    /// call twice.
    pub fn teardown(&mut self, sink: &mut dyn GeometrySink) {
        for mut viewport in self.viewports.drain(..) {
            viewport.teardown(sink);
        }
        self.file_ids.clear();
        self.group = None;
        self.grids.clear();
    }
}

/// Apply the UI minimum to a requested window. `None` for NaN/inf.
fn clamp_lim(requested: f32, minimum: f32) -> Option<f32> {
    requested.is_finite().then(|| requested.max(minimum))
}
