pub mod canvas;
pub mod frame_loop;
pub mod grid;
pub mod scene;

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::data::catalog::GalaxyCatalog;
use crate::data::sectors::Sector;
use crate::projection::camera::WorldBounds;
use crate::projection::CameraRig;
use crate::{Segment, SystemId, Viewport, WorldPoint};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RenderError {
    #[error("drawing surface error: {0}")]
    Surface(String),
    #[error("renderer used after dispose")]
    Disposed,
    #[error("failed to release {0}")]
    Release(String),
}

/// Galaxy image drawn behind everything else.
#[derive(Debug, Clone)]
pub struct Backdrop {
    pub image_path: PathBuf,
    /// World rectangle the image covers.
    pub bounds: WorldBounds,
    /// Image rows run from `min_z` at the top instead of `max_z`.
    pub flip: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum MarkerRole {
    Start,
    Via,
    End,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MarkerView {
    pub id: SystemId,
    pub label: String,
    pub position: WorldPoint,
    pub role: MarkerRole,
    pub highlighted: bool,
}

/// How much of the route line is drawn: sampled curve up to `progress`, then
/// a final vertex at `head`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RouteExtent {
    pub progress: f64,
    pub head: WorldPoint,
    pub animating: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CometView<'a> {
    pub position: WorldPoint,
    pub opacity: f64,
    /// Head scale, around 1.
    pub pulse: f64,
    /// Glow radius in world units.
    pub glow_radius: f64,
    pub trail: &'a [WorldPoint],
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TooltipView {
    pub anchor: WorldPoint,
    pub lines: Vec<String>,
}

/// Drawing backend the frame loop composites through. Calls arrive in
/// paint order between `begin_frame` and `end_frame`; an empty slice or
/// `None` means the layer has nothing to show this frame.
pub trait Renderer {
    type Camera: CameraRig;

    fn begin_frame(&mut self, camera: &Self::Camera, viewport: Viewport) -> Result<(), RenderError>;
    fn draw_background(&mut self, backdrop: Option<&Backdrop>, starfield_opacity: f64);
    /// Catalog stars and the compass labels around `galaxy`. Independent of
    /// the backdrop image, which may be missing.
    fn draw_stars(&mut self, catalog: Option<&Arc<GalaxyCatalog>>, galaxy: &WorldBounds, opacity: f64);
    fn draw_grid(&mut self, lines: &[Segment]);
    fn draw_sectors(&mut self, sectors: &[Sector]);
    fn draw_route(&mut self, samples: &[WorldPoint], extent: RouteExtent);
    fn draw_markers(&mut self, markers: &[MarkerView]);
    fn draw_comet(&mut self, comet: Option<&CometView<'_>>);
    fn draw_tooltip(&mut self, tooltip: Option<&TooltipView>);
    fn end_frame(&mut self) -> Result<(), RenderError>;
    /// Releases GPU or surface resources. Later frames fail with
    /// [`RenderError::Disposed`].
    fn dispose(&mut self) -> Result<(), RenderError>;
}
