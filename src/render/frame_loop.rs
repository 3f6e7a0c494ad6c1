//! Frame scheduling and per-frame compositing.

use std::sync::Arc;

use log::{debug, warn};

use crate::data::catalog::GalaxyCatalog;
use crate::data::sectors::Sector;
use crate::projection::camera::WorldBounds;
use crate::render::{Backdrop, CometView, MarkerView, RenderError, Renderer, RouteExtent, TooltipView};
use crate::{Segment, Viewport, WorldPoint};

pub type FrameHandle = u64;
pub type ListenerId = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputKind {
    PointerDown,
    PointerMove,
    PointerUp,
    PointerCancel,
    Wheel,
    KeyDown,
    Resize,
}

impl InputKind {
    pub const ALL: [InputKind; 7] = [
        InputKind::PointerDown,
        InputKind::PointerMove,
        InputKind::PointerUp,
        InputKind::PointerCancel,
        InputKind::Wheel,
        InputKind::KeyDown,
        InputKind::Resize,
    ];
}

/// Host window or canvas: hands out frame callbacks and input listeners.
pub trait Surface {
    fn request_frame(&mut self) -> Result<FrameHandle, RenderError>;
    fn cancel_frame(&mut self, handle: FrameHandle) -> Result<(), RenderError>;
    fn add_listener(&mut self, kind: InputKind) -> Result<ListenerId, RenderError>;
    fn remove_listener(&mut self, id: ListenerId) -> Result<(), RenderError>;
}

/// Something that draws one frame per callback and can release its
/// resources.
pub trait FrameTarget {
    fn frame(&mut self, now_ms: f64) -> Result<(), RenderError>;
    fn dispose(&mut self) -> Result<(), RenderError>;
}

/// Everything one frame paints, in paint order.
pub struct FrameScene<'a, C> {
    pub camera: &'a C,
    pub viewport: Viewport,
    pub backdrop: Option<&'a Backdrop>,
    pub galaxy: WorldBounds,
    pub catalog: Option<&'a Arc<GalaxyCatalog>>,
    pub starfield_opacity: f64,
    pub grid: &'a [Segment],
    pub sectors: &'a [Sector],
    pub route: &'a [WorldPoint],
    pub extent: RouteExtent,
    pub markers: &'a [MarkerView],
    pub comet: Option<CometView<'a>>,
    pub tooltip: Option<&'a TooltipView>,
}

/// Paints `scene` through `renderer`: background image, stars, grid,
/// sectors, route, markers, comet, tooltip.
pub fn compose<R: Renderer>(renderer: &mut R, scene: &FrameScene<'_, R::Camera>) -> Result<(), RenderError> {
    renderer.begin_frame(scene.camera, scene.viewport)?;
    renderer.draw_background(scene.backdrop, scene.starfield_opacity);
    renderer.draw_stars(scene.catalog, &scene.galaxy, scene.starfield_opacity);
    renderer.draw_grid(scene.grid);
    renderer.draw_sectors(scene.sectors);
    renderer.draw_route(scene.route, scene.extent);
    renderer.draw_markers(scene.markers);
    renderer.draw_comet(scene.comet.as_ref());
    renderer.draw_tooltip(scene.tooltip);
    renderer.end_frame()
}

/// Keeps exactly one frame callback outstanding while running and owns the
/// input listeners registered on the surface.
pub struct RenderLoop<S> {
    surface: S,
    pending: Option<FrameHandle>,
    listeners: Vec<ListenerId>,
    running: bool,
}

impl<S: Surface> RenderLoop<S> {
    pub fn new(surface: S) -> Self {
        RenderLoop {
            surface,
            pending: None,
            listeners: Vec::new(),
            running: false,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending
    }

    /// Registers input listeners and schedules the first frame.
    pub fn start(&mut self) -> Result<(), RenderError> {
        if self.running {
            return Ok(());
        }
        for kind in InputKind::ALL {
            let id = self.surface.add_listener(kind)?;
            self.listeners.push(id);
        }
        self.pending = Some(self.surface.request_frame()?);
        self.running = true;
        debug!("render loop started with {} listeners", self.listeners.len());
        Ok(())
    }

    /// Frame callback. Stale or post-teardown callbacks are ignored. A frame
    /// that fails to draw is logged and the loop keeps going.
    pub fn on_frame<T: FrameTarget>(&mut self, handle: FrameHandle, now_ms: f64, target: &mut T) -> Result<(), RenderError> {
        if !self.running || self.pending != Some(handle) {
            return Ok(());
        }
        self.pending = None;
        if let Err(e) = target.frame(now_ms) {
            warn!("frame at {:.0} ms failed: {}", now_ms, e);
        }
        self.pending = Some(self.surface.request_frame()?);
        Ok(())
    }

    /// Cancels the outstanding frame, removes every listener and disposes the
    /// target. Failures are logged and never stop the rest of the teardown.
    pub fn teardown<T: FrameTarget>(&mut self, target: &mut T) {
        if let Some(handle) = self.pending.take() {
            if let Err(e) = self.surface.cancel_frame(handle) {
                warn!("could not cancel frame {}: {}", handle, e);
            }
        }
        for id in self.listeners.drain(..) {
            if let Err(e) = self.surface.remove_listener(id) {
                warn!("could not remove listener {}: {}", id, e);
            }
        }
        if let Err(e) = target.dispose() {
            warn!("renderer dispose failed: {}", e);
        }
        if self.running {
            debug!("render loop stopped");
        }
        self.running = false;
    }
}
