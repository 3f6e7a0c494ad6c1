//! 2D renderer that records a display list per frame.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use log::debug;
use serde::Serialize;

use crate::animation::curve::partial_polyline;
use crate::data::catalog::GalaxyCatalog;
use crate::data::sectors::Sector;
use crate::hover::tooltip::place_tooltip;
use crate::projection::camera::{world_to_screen, PlanarCamera, WorldBounds};
use crate::render::{
    Backdrop, CometView, MarkerRole, MarkerView, RenderError, Renderer, RouteExtent, TooltipView,
};
use crate::{ScreenPoint, Segment, Viewport, WorldPoint};

const MARKER_RADIUS: f64 = 3.2;
const STAR_RADIUS: f64 = 1.0;
const COMET_RADIUS: f64 = 6.0;
const HIGHLIGHT_RADIUS: f64 = 9.0;
const LABEL_OFFSET: f64 = 6.0;
const TOOLTIP_CHAR_WIDTH: f64 = 6.5;
const TOOLTIP_LINE_HEIGHT: f64 = 15.0;
const TOOLTIP_PADDING: f64 = 8.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum Stroke {
    Grid,
    Route,
    /// Route while it is being revealed; drawn with a stronger glow.
    RouteAnimating,
    Sector(u32),
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum Fill {
    Star,
    Waypoint,
    Highlight,
    CometHead,
    CometGlow,
    Trail,
    TooltipPanel,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum TextStyle {
    Endpoint,
    Waypoint,
    Tooltip,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum DrawCommand {
    Clear { width: f64, height: f64 },
    Image { path: PathBuf, origin: ScreenPoint, width: f64, height: f64, alpha: f64 },
    Polyline { points: Vec<ScreenPoint>, stroke: Stroke },
    Circle { center: ScreenPoint, radius: f64, fill: Fill, alpha: f64 },
    Rect { origin: ScreenPoint, width: f64, height: f64, fill: Fill },
    Text { at: ScreenPoint, text: String, style: TextStyle },
}

/// Immediate-mode renderer for a 2D drawing surface. Each frame is recorded
/// into a display list and swapped in on `end_frame`.
#[derive(Debug, Default)]
pub struct CanvasRenderer {
    camera: PlanarCamera,
    viewport: Viewport,
    recording: Vec<DrawCommand>,
    presented: Vec<DrawCommand>,
    /// The galaxy image went into this frame, so catalog stars are skipped.
    image_drawn: bool,
    in_frame: bool,
    disposed: bool,
}

impl CanvasRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands of the last completed frame.
    pub fn display_list(&self) -> &[DrawCommand] {
        &self.presented
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn to_screen(&self, p: WorldPoint) -> ScreenPoint {
        world_to_screen(p, &self.camera, self.viewport)
    }

    fn push(&mut self, cmd: DrawCommand) {
        if self.in_frame {
            self.recording.push(cmd);
        }
    }
}

impl Renderer for CanvasRenderer {
    type Camera = PlanarCamera;

    fn begin_frame(&mut self, camera: &PlanarCamera, viewport: Viewport) -> Result<(), RenderError> {
        if self.disposed {
            return Err(RenderError::Disposed);
        }
        self.camera = *camera;
        self.viewport = viewport;
        self.recording.clear();
        self.image_drawn = false;
        self.in_frame = true;
        self.push(DrawCommand::Clear {
            width: viewport.width,
            height: viewport.height,
        });
        Ok(())
    }

    fn draw_background(&mut self, backdrop: Option<&Backdrop>, starfield_opacity: f64) {
        let Some(backdrop) = backdrop else {
            return;
        };
        let b = backdrop.bounds;
        let (top_z, bottom_z) = if backdrop.flip {
            (b.min_z, b.max_z)
        } else {
            (b.max_z, b.min_z)
        };
        let tl = self.to_screen(WorldPoint::new(b.min_x, 0.0, top_z));
        let br = self.to_screen(WorldPoint::new(b.max_x, 0.0, bottom_z));
        self.push(DrawCommand::Image {
            path: backdrop.image_path.clone(),
            origin: tl,
            width: br.x - tl.x,
            height: br.y - tl.y,
            alpha: starfield_opacity,
        });
        self.image_drawn = true;
    }

    fn draw_stars(&mut self, catalog: Option<&Arc<GalaxyCatalog>>, _galaxy: &WorldBounds, opacity: f64) {
        let Some(catalog) = catalog else {
            return;
        };
        if self.image_drawn {
            return;
        }
        let (w, h) = (self.viewport.width, self.viewport.height);
        for system in catalog.systems() {
            let center = self.to_screen(system.position);
            if (0.0..=w).contains(&center.x) && (0.0..=h).contains(&center.y) {
                self.push(DrawCommand::Circle {
                    center,
                    radius: STAR_RADIUS,
                    fill: Fill::Star,
                    alpha: opacity,
                });
            }
        }
    }

    fn draw_grid(&mut self, lines: &[Segment]) {
        for line in lines {
            let points = vec![self.to_screen(line.from), self.to_screen(line.to)];
            self.push(DrawCommand::Polyline {
                points,
                stroke: Stroke::Grid,
            });
        }
    }

    fn draw_sectors(&mut self, sectors: &[Sector]) {
        for sector in sectors {
            for edge in &sector.boundary {
                let points = vec![self.to_screen(edge.from), self.to_screen(edge.to)];
                self.push(DrawCommand::Polyline {
                    points,
                    stroke: Stroke::Sector(sector.color),
                });
            }
            let at = self.to_screen(sector.centroid);
            self.push(DrawCommand::Text {
                at,
                text: sector.name.clone(),
                style: TextStyle::Waypoint,
            });
        }
    }

    fn draw_route(&mut self, samples: &[WorldPoint], extent: RouteExtent) {
        if samples.len() < 2 {
            return;
        }
        let points: Vec<ScreenPoint> = partial_polyline(samples, extent.progress, extent.head)
            .into_iter()
            .map(|p| self.to_screen(p))
            .collect();
        let stroke = if extent.animating {
            Stroke::RouteAnimating
        } else {
            Stroke::Route
        };
        self.push(DrawCommand::Polyline { points, stroke });
    }

    fn draw_markers(&mut self, markers: &[MarkerView]) {
        let mut labelled = HashSet::new();
        for marker in markers {
            let at = self.to_screen(marker.position);
            self.push(DrawCommand::Circle {
                center: at,
                radius: MARKER_RADIUS,
                fill: Fill::Waypoint,
                alpha: 1.0,
            });
            if marker.highlighted {
                self.push(DrawCommand::Circle {
                    center: at,
                    radius: HIGHLIGHT_RADIUS,
                    fill: Fill::Highlight,
                    alpha: 1.0,
                });
            }
            if labelled.insert(marker.id) {
                let style = match marker.role {
                    MarkerRole::Start | MarkerRole::End => TextStyle::Endpoint,
                    MarkerRole::Via => TextStyle::Waypoint,
                };
                self.push(DrawCommand::Text {
                    at: ScreenPoint::new(at.x + LABEL_OFFSET, at.y - LABEL_OFFSET),
                    text: marker.label.clone(),
                    style,
                });
            }
        }
    }

    fn draw_comet(&mut self, comet: Option<&CometView<'_>>) {
        let Some(comet) = comet else {
            return;
        };
        if comet.opacity <= 0.0 {
            return;
        }
        for p in comet.trail {
            let center = self.to_screen(*p);
            self.push(DrawCommand::Circle {
                center,
                radius: 1.0,
                fill: Fill::Trail,
                alpha: comet.opacity * 0.6,
            });
        }
        let center = self.to_screen(comet.position);
        let glow = (comet.glow_radius * self.camera.zoom).max(COMET_RADIUS * 2.0);
        self.push(DrawCommand::Circle {
            center,
            radius: glow,
            fill: Fill::CometGlow,
            alpha: comet.opacity * 0.3,
        });
        self.push(DrawCommand::Circle {
            center,
            radius: COMET_RADIUS * comet.pulse,
            fill: Fill::CometHead,
            alpha: comet.opacity,
        });
    }

    fn draw_tooltip(&mut self, tooltip: Option<&TooltipView>) {
        let Some(tooltip) = tooltip else {
            return;
        };
        let anchor = self.to_screen(tooltip.anchor);
        let widest = tooltip.lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let width = widest as f64 * TOOLTIP_CHAR_WIDTH + TOOLTIP_PADDING * 2.0;
        let height = tooltip.lines.len() as f64 * TOOLTIP_LINE_HEIGHT + TOOLTIP_PADDING * 2.0;
        let origin = place_tooltip(anchor, width, height, self.viewport);

        self.push(DrawCommand::Circle {
            center: anchor,
            radius: HIGHLIGHT_RADIUS,
            fill: Fill::Highlight,
            alpha: 1.0,
        });
        self.push(DrawCommand::Rect {
            origin,
            width,
            height,
            fill: Fill::TooltipPanel,
        });
        for (i, line) in tooltip.lines.iter().enumerate() {
            self.push(DrawCommand::Text {
                at: ScreenPoint::new(
                    origin.x + TOOLTIP_PADDING,
                    origin.y + TOOLTIP_PADDING + (i as f64 + 1.0) * TOOLTIP_LINE_HEIGHT,
                ),
                text: line.clone(),
                style: TextStyle::Tooltip,
            });
        }
    }

    fn end_frame(&mut self) -> Result<(), RenderError> {
        if !self.in_frame {
            return Err(RenderError::Surface("end_frame without begin_frame".into()));
        }
        self.in_frame = false;
        std::mem::swap(&mut self.recording, &mut self.presented);
        self.recording.clear();
        Ok(())
    }

    fn dispose(&mut self) -> Result<(), RenderError> {
        if self.disposed {
            return Ok(());
        }
        debug!("disposing canvas renderer");
        self.disposed = true;
        self.in_frame = false;
        self.recording = Vec::new();
        self.presented = Vec::new();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::camera::GALAXY_BOUNDS;

    const VIEW: Viewport = Viewport::new(800.0, 500.0);

    fn extent(progress: f64, head: WorldPoint) -> RouteExtent {
        RouteExtent {
            progress,
            head,
            animating: progress < 1.0,
        }
    }

    #[test]
    fn backdrop_is_stretched_over_bounds() {
        let mut canvas = CanvasRenderer::new();
        let cam = crate::projection::camera::fit_bounds(&GALAXY_BOUNDS, VIEW, 40.0);
        let backdrop = Backdrop {
            image_path: "galaxy.png".into(),
            bounds: GALAXY_BOUNDS,
            flip: false,
        };
        canvas.begin_frame(&cam, VIEW).expect("begin");
        canvas.draw_background(Some(&backdrop), 0.85);
        canvas.end_frame().expect("end");
        let DrawCommand::Image { origin, width, height, .. } = &canvas.display_list()[1] else {
            panic!("expected image");
        };
        assert!(*width > 0.0 && *height > 0.0);
        assert!(origin.x >= 40.0 - 1e-6 && origin.y >= 40.0 - 1e-6);
    }

    #[test]
    fn catalog_stars_stand_in_for_a_missing_image() {
        use crate::data::catalog::StarSystem;

        let catalog = Arc::new(GalaxyCatalog::new(vec![
            StarSystem {
                id: 1,
                name: "Inside".into(),
                position: GALAXY_BOUNDS.center(),
            },
            StarSystem {
                id: 2,
                name: "Outside".into(),
                position: WorldPoint::new(GALAXY_BOUNDS.max_x * 10.0, 0.0, 0.0),
            },
        ]));
        let cam = crate::projection::camera::fit_bounds(&GALAXY_BOUNDS, VIEW, 40.0);
        let stars = |canvas: &CanvasRenderer| {
            canvas
                .display_list()
                .iter()
                .filter(|c| matches!(c, DrawCommand::Circle { fill: Fill::Star, .. }))
                .count()
        };

        let mut canvas = CanvasRenderer::new();
        canvas.begin_frame(&cam, VIEW).expect("begin");
        canvas.draw_background(None, 0.85);
        canvas.draw_stars(Some(&catalog), &GALAXY_BOUNDS, 0.85);
        canvas.end_frame().expect("end");
        assert_eq!(stars(&canvas), 1);

        let backdrop = Backdrop {
            image_path: "galaxy.png".into(),
            bounds: GALAXY_BOUNDS,
            flip: false,
        };
        canvas.begin_frame(&cam, VIEW).expect("begin");
        canvas.draw_background(Some(&backdrop), 0.85);
        canvas.draw_stars(Some(&catalog), &GALAXY_BOUNDS, 0.85);
        canvas.end_frame().expect("end");
        assert_eq!(stars(&canvas), 0);
    }

    #[test]
    fn partial_route_ends_at_head() {
        let mut canvas = CanvasRenderer::new();
        let cam = PlanarCamera::default();
        let samples: Vec<WorldPoint> = (0..=10).map(|i| WorldPoint::new(i as f64 * 10.0, 0.0, 0.0)).collect();
        let head = WorldPoint::new(43.0, 0.0, 0.0);
        canvas.begin_frame(&cam, VIEW).expect("begin");
        canvas.draw_route(&samples, extent(0.43, head));
        canvas.end_frame().expect("end");
        let DrawCommand::Polyline { points, stroke } = &canvas.display_list()[1] else {
            panic!("expected polyline");
        };
        assert_eq!(*stroke, Stroke::RouteAnimating);
        assert_eq!(points.len(), 6);
        assert_eq!(points.last(), Some(&world_to_screen(head, &cam, VIEW)));
    }

    #[test]
    fn revisited_system_is_labelled_once() {
        let mut canvas = CanvasRenderer::new();
        let marker = |role| MarkerView {
            id: 5,
            label: "Loop".into(),
            position: WorldPoint::ZERO,
            role,
            highlighted: false,
        };
        canvas.begin_frame(&PlanarCamera::default(), VIEW).expect("begin");
        canvas.draw_markers(&[marker(MarkerRole::Start), marker(MarkerRole::End)]);
        canvas.end_frame().expect("end");
        let texts = canvas
            .display_list()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Text { .. }))
            .count();
        assert_eq!(texts, 1);
    }

    #[test]
    fn frames_after_dispose_fail() {
        let mut canvas = CanvasRenderer::new();
        canvas.dispose().expect("dispose");
        assert_eq!(
            canvas.begin_frame(&PlanarCamera::default(), VIEW),
            Err(RenderError::Disposed)
        );
        assert!(canvas.dispose().is_ok());
    }
}
