//! Retained 3D scene graph. Nodes are built once and updated in place each
//! frame, the way a GPU scene is driven.

use std::path::PathBuf;
use std::sync::Arc;

use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::data::catalog::GalaxyCatalog;
use crate::data::sectors::Sector;
use crate::projection::camera::WorldBounds;
use crate::projection::orbit::OrbitCamera;
use crate::render::grid::cardinal_labels;
use crate::render::{
    Backdrop, CometView, MarkerRole, MarkerView, RenderError, Renderer, RouteExtent, TooltipView,
};
use crate::{Segment, SystemId, Viewport, WorldPoint};

/// Half-range of the random height given to each backdrop star.
pub const STAR_JITTER: f64 = 2_000.0;
const STAR_SEED: u64 = 0x57a2_f1e1d;

/// Galaxy image laid flat on the plane.
#[derive(Debug, Clone, PartialEq)]
pub struct BackdropNode {
    pub image_path: PathBuf,
    pub bounds: WorldBounds,
    pub flip: bool,
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StarField {
    pub positions: Vec<WorldPoint>,
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub position: WorldPoint,
}

/// Line geometry holding the whole sampled route; only the first
/// `draw_count` vertices are drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteLine {
    pub vertices: Vec<WorldPoint>,
    pub draw_count: usize,
    /// Interpolated tip after the last drawn vertex.
    pub head: WorldPoint,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerNode {
    pub id: SystemId,
    pub position: WorldPoint,
    pub role: MarkerRole,
    pub label: Label,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CometNode {
    pub head: WorldPoint,
    pub head_scale: f64,
    pub glow_radius: f64,
    pub opacity: f64,
    pub trail: Vec<WorldPoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectorNode {
    pub name: String,
    pub color: u32,
    pub outline: Vec<Segment>,
    pub label: Label,
}

#[derive(Debug, Default)]
pub struct SceneGraph {
    pub camera: Option<OrbitCamera>,
    pub viewport: Option<Viewport>,
    pub backdrop: Option<BackdropNode>,
    pub starfield: Option<StarField>,
    pub cardinals: Vec<Label>,
    pub grid: Vec<Segment>,
    pub sectors: Vec<SectorNode>,
    pub route: Option<RouteLine>,
    pub markers: Vec<MarkerNode>,
    pub highlight: Option<WorldPoint>,
    pub comet: Option<CometNode>,
    pub tooltip: Option<Label>,
}

/// 3D renderer over a retained [`SceneGraph`].
#[derive(Debug, Default)]
pub struct SceneRenderer {
    scene: SceneGraph,
    /// Catalog the star field was built from, to rebuild only on change.
    starfield_source: Option<Arc<GalaxyCatalog>>,
    frames: u64,
    in_frame: bool,
    disposed: bool,
}

impl SceneRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn build_starfield(catalog: &GalaxyCatalog) -> Vec<WorldPoint> {
        let mut rng = ChaCha8Rng::seed_from_u64(STAR_SEED);
        catalog
            .systems()
            .iter()
            .map(|s| {
                let jitter = rng.random_range(-STAR_JITTER..STAR_JITTER);
                WorldPoint::new(s.position.x, s.position.y + jitter, s.position.z)
            })
            .collect()
    }
}

impl Renderer for SceneRenderer {
    type Camera = OrbitCamera;

    fn begin_frame(&mut self, camera: &OrbitCamera, viewport: Viewport) -> Result<(), RenderError> {
        if self.disposed {
            return Err(RenderError::Disposed);
        }
        self.scene.camera = Some(*camera);
        self.scene.viewport = Some(viewport);
        self.in_frame = true;
        Ok(())
    }

    fn draw_background(&mut self, backdrop: Option<&Backdrop>, starfield_opacity: f64) {
        self.scene.backdrop = backdrop.map(|b| BackdropNode {
            image_path: b.image_path.clone(),
            bounds: b.bounds,
            flip: b.flip,
            opacity: starfield_opacity,
        });
    }

    fn draw_stars(&mut self, catalog: Option<&Arc<GalaxyCatalog>>, galaxy: &WorldBounds, opacity: f64) {
        let Some(catalog) = catalog else {
            self.scene.starfield = None;
            self.scene.cardinals.clear();
            self.starfield_source = None;
            return;
        };
        if self.scene.cardinals.is_empty() {
            self.scene.cardinals = cardinal_labels(galaxy)
                .into_iter()
                .map(|(text, position)| Label {
                    text: text.to_owned(),
                    position,
                })
                .collect();
        }
        let stale = self
            .starfield_source
            .as_ref()
            .map_or(true, |built| !Arc::ptr_eq(built, catalog));
        if stale {
            info!("building star field for {} systems", catalog.len());
            self.scene.starfield = Some(StarField {
                positions: Self::build_starfield(catalog),
                opacity,
            });
            self.starfield_source = Some(Arc::clone(catalog));
        }
        if let Some(field) = &mut self.scene.starfield {
            field.opacity = opacity;
        }
    }

    fn draw_grid(&mut self, lines: &[Segment]) {
        if self.scene.grid.as_slice() != lines {
            self.scene.grid = lines.to_vec();
        }
    }

    fn draw_sectors(&mut self, sectors: &[Sector]) {
        let unchanged = sectors.len() == self.scene.sectors.len()
            && sectors
                .iter()
                .zip(&self.scene.sectors)
                .all(|(s, node)| s.name == node.name && s.boundary == node.outline);
        if unchanged {
            return;
        }
        self.scene.sectors = sectors
            .iter()
            .map(|s| SectorNode {
                name: s.name.clone(),
                color: s.color,
                outline: s.boundary.clone(),
                label: Label {
                    text: s.name.clone(),
                    position: WorldPoint::new(s.centroid.x, 550.0, s.centroid.z),
                },
            })
            .collect();
    }

    fn draw_route(&mut self, samples: &[WorldPoint], extent: RouteExtent) {
        if samples.len() < 2 {
            self.scene.route = None;
            return;
        }
        let last = samples.len() - 1;
        let draw_count = ((last as f64 * extent.progress.clamp(0.0, 1.0)).floor() as usize).min(last) + 1;
        match &mut self.scene.route {
            Some(line) if line.vertices.as_slice() == samples => {
                line.draw_count = draw_count;
                line.head = extent.head;
            }
            _ => {
                self.scene.route = Some(RouteLine {
                    vertices: samples.to_vec(),
                    draw_count,
                    head: extent.head,
                });
            }
        }
    }

    fn draw_markers(&mut self, markers: &[MarkerView]) {
        self.scene.markers = markers
            .iter()
            .map(|m| MarkerNode {
                id: m.id,
                position: m.position,
                role: m.role,
                label: Label {
                    text: m.label.clone(),
                    position: m.position,
                },
            })
            .collect();
        self.scene.highlight = markers.iter().find(|m| m.highlighted).map(|m| m.position);
    }

    fn draw_comet(&mut self, comet: Option<&CometView<'_>>) {
        self.scene.comet = comet.filter(|c| c.opacity > 0.0).map(|c| CometNode {
            head: c.position,
            head_scale: c.pulse,
            glow_radius: c.glow_radius,
            opacity: c.opacity,
            trail: c.trail.to_vec(),
        });
    }

    fn draw_tooltip(&mut self, tooltip: Option<&TooltipView>) {
        self.scene.tooltip = tooltip.map(|t| Label {
            text: t.lines.join("\n"),
            position: t.anchor,
        });
        if let Some(t) = tooltip {
            self.scene.highlight = Some(t.anchor);
        }
    }

    fn end_frame(&mut self) -> Result<(), RenderError> {
        if !self.in_frame {
            return Err(RenderError::Surface("end_frame without begin_frame".into()));
        }
        self.in_frame = false;
        self.frames += 1;
        Ok(())
    }

    fn dispose(&mut self) -> Result<(), RenderError> {
        if self.disposed {
            return Ok(());
        }
        debug!("disposing scene after {} frames", self.frames);
        self.scene = SceneGraph::default();
        self.starfield_source = None;
        self.disposed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::catalog::StarSystem;
    use crate::projection::camera::GALAXY_BOUNDS;
    use crate::projection::CameraRig;

    fn catalog() -> Arc<GalaxyCatalog> {
        let systems = (0..50)
            .map(|i| StarSystem {
                id: i,
                name: format!("S{i}"),
                position: WorldPoint::new(3_000.0 + i as f64 * 100.0, 0.0, 6_000.0),
            })
            .collect();
        Arc::new(GalaxyCatalog::new(systems))
    }

    fn frame(renderer: &mut SceneRenderer, f: impl FnOnce(&mut SceneRenderer)) {
        let cam = OrbitCamera::home(&GALAXY_BOUNDS);
        renderer.begin_frame(&cam, Viewport::default()).expect("begin");
        f(renderer);
        renderer.end_frame().expect("end");
    }

    #[test]
    fn star_field_is_jittered_deterministically_and_built_once() {
        let stars = catalog();
        let mut a = SceneRenderer::new();
        frame(&mut a, |r| r.draw_stars(Some(&stars), &GALAXY_BOUNDS, 0.15));
        let first = a.scene().starfield.clone().expect("stars");
        assert_eq!(first.positions.len(), 50);
        assert!(first
            .positions
            .iter()
            .all(|p| p.y.abs() <= STAR_JITTER));
        assert!(first.positions.iter().any(|p| p.y != 0.0));

        frame(&mut a, |r| r.draw_stars(Some(&stars), &GALAXY_BOUNDS, 0.85));
        let second = a.scene().starfield.clone().expect("stars");
        assert_eq!(second.positions, first.positions);
        assert_eq!(second.opacity, 0.85);

        let mut b = SceneRenderer::new();
        frame(&mut b, |r| r.draw_stars(Some(&stars), &GALAXY_BOUNDS, 0.15));
        assert_eq!(b.scene().starfield.as_ref().map(|s| &s.positions), Some(&first.positions));
        assert_eq!(a.scene().cardinals.len(), 4);
    }

    #[test]
    fn route_draw_range_tracks_progress() {
        let samples: Vec<WorldPoint> = (0..=100).map(|i| WorldPoint::new(i as f64, 0.0, 0.0)).collect();
        let mut r = SceneRenderer::new();
        let ext = |progress| RouteExtent {
            progress,
            head: WorldPoint::new(progress * 100.0, 0.0, 0.0),
            animating: true,
        };
        frame(&mut r, |r| r.draw_route(&samples, ext(0.255)));
        assert_eq!(r.scene().route.as_ref().map(|l| l.draw_count), Some(26));
        frame(&mut r, |r| r.draw_route(&samples, ext(1.0)));
        assert_eq!(r.scene().route.as_ref().map(|l| l.draw_count), Some(101));
        frame(&mut r, |r| r.draw_route(&[], ext(1.0)));
        assert!(r.scene().route.is_none());
    }

    #[test]
    fn faded_comet_is_removed() {
        let mut r = SceneRenderer::new();
        let trail = [WorldPoint::ZERO; 3];
        let comet = CometView {
            position: WorldPoint::ZERO,
            opacity: 0.0,
            pulse: 1.0,
            glow_radius: 600.0,
            trail: &trail,
        };
        frame(&mut r, |r| r.draw_comet(Some(&comet)));
        assert!(r.scene().comet.is_none());
    }

    #[test]
    fn dispose_clears_scene() {
        let stars = catalog();
        let mut r = SceneRenderer::new();
        frame(&mut r, |r| r.draw_stars(Some(&stars), &GALAXY_BOUNDS, 0.85));
        r.dispose().expect("dispose");
        assert!(r.scene().starfield.is_none());
        let cam = OrbitCamera::home(&GALAXY_BOUNDS);
        assert_eq!(r.begin_frame(&cam, Viewport::default()), Err(RenderError::Disposed));
    }
}
