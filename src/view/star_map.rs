use std::path::Path;
use std::sync::Arc;

use log::{debug, info, warn};

use crate::animation::state::{AnimationFrame, AnimationPhase, RouteAnimation};
use crate::animation::trail::CometTrail;
use crate::animation::{comet_glow_radius, comet_pulse};
use crate::config::StarMapConfig;
use crate::data::catalog::GalaxyCatalog;
use crate::data::read_catalog_from_file;
use crate::data::sectors::{build_sectors, Sector};
use crate::gesture::controller::{CameraDelta, GestureController, PointerId};
use crate::gesture::keyboard::{command_for_key, KeyFocus, ViewCommand};
use crate::hover::picker::{HoverService, HoverTarget};
use crate::hover::tooltip::tooltip_lines;
use crate::projection::camera::WorldBounds;
use crate::projection::CameraRig;
use crate::render::frame_loop::{compose, FrameScene, FrameTarget};
use crate::render::grid::grid_lines;
use crate::render::{
    Backdrop, CometView, MarkerRole, MarkerView, RenderError, Renderer, RouteExtent, TooltipView,
};
use crate::route::client::{validate, RequestTracker, RouteError, RouteTicket, ValidationError};
use crate::route::model::{Route, RouteListItem, RouteRequest, Waypoint};
use crate::{ScreenPoint, Segment, SystemId, Viewport, WorldPoint};

/// Milliseconds per frame at the 60 Hz rate the follow smoothing is tuned for.
const REFERENCE_FRAME_MS: f64 = 1000.0 / 60.0;

/// What happened to a finished route request.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    /// New route installed and its animation seeded.
    Applied { hops: usize },
    /// The collaborator answered ok with no hops; nothing is drawn.
    Empty,
    /// Shown as a dismissible error; previous route and camera kept.
    Failed(RouteError),
    /// A newer request was issued meanwhile; the result was dropped.
    Stale,
}

/// The interactive map: owns camera, animation, hover and route state and
/// draws through a [`Renderer`].
pub struct StarMapView<R: Renderer> {
    config: StarMapConfig,
    renderer: R,
    viewport: Viewport,
    camera: R::Camera,
    gestures: GestureController<R::Camera>,

    route: Option<Arc<Route>>,
    waypoints: Vec<Waypoint>,
    requests: RequestTracker,
    last_request: Option<RouteRequest>,
    error: Option<String>,

    animation: RouteAnimation,
    trail: CometTrail,
    last_frame: Option<AnimationFrame>,
    last_frame_ms: Option<f64>,
    /// Camera before the current animation took over.
    pre_animation_camera: Option<R::Camera>,
    /// Camera when the pull-back to the overview began.
    transition_from: Option<R::Camera>,

    hover: HoverService,
    highlight: Option<usize>,

    backdrop: Option<Backdrop>,
    catalog: Option<Arc<GalaxyCatalog>>,
    sectors: Vec<Sector>,
    grid: Vec<Segment>,
    show_grid: bool,
    show_zones: bool,
    galaxy_loading: bool,
}

impl<R: Renderer> StarMapView<R> {
    pub fn new(renderer: R, config: StarMapConfig, viewport: Viewport) -> Self {
        let galaxy = config.galaxy.bounds;
        let duration = R::Camera::animation_duration_ms(&config.animation);
        StarMapView {
            renderer,
            viewport,
            camera: R::Camera::home(&galaxy),
            gestures: GestureController::new(&config.projection),
            route: None,
            waypoints: Vec::new(),
            requests: RequestTracker::default(),
            last_request: None,
            error: None,
            animation: RouteAnimation::new(config.animation.clone(), duration),
            trail: CometTrail::new(&config.animation),
            last_frame: None,
            last_frame_ms: None,
            pre_animation_camera: None,
            transition_from: None,
            hover: HoverService::new(config.hover.threshold_px),
            highlight: None,
            backdrop: None,
            catalog: None,
            sectors: Vec::new(),
            grid: grid_lines(&galaxy, config.galaxy.grid_step),
            show_grid: true,
            show_zones: false,
            galaxy_loading: false,
            config,
        }
    }

    pub fn config(&self) -> &StarMapConfig {
        &self.config
    }

    pub fn camera(&self) -> &R::Camera {
        &self.camera
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn route(&self) -> Option<&Arc<Route>> {
        self.route.as_ref()
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn last_request(&self) -> Option<&RouteRequest> {
        self.last_request.as_ref()
    }

    pub fn animation(&self) -> &RouteAnimation {
        &self.animation
    }

    pub fn last_animation_frame(&self) -> Option<&AnimationFrame> {
        self.last_frame.as_ref()
    }

    pub fn hover_target(&self) -> Option<&HoverTarget> {
        self.hover.current()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn is_loading(&self) -> bool {
        self.requests.is_pending()
    }

    pub fn is_galaxy_loading(&self) -> bool {
        self.galaxy_loading
    }

    pub fn system_count(&self) -> usize {
        self.catalog.as_ref().map_or(0, |c| c.len())
    }

    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    fn galaxy(&self) -> WorldBounds {
        self.config.galaxy.bounds
    }

    /// The only place the camera is written.
    fn apply_camera(&mut self, delta: CameraDelta<R::Camera>) {
        self.camera = match delta {
            CameraDelta::Pan { anchor, dx, dy } => self.camera.panned_from(&anchor, dx, dy, self.viewport),
            CameraDelta::ZoomAt { factor, at } => self.camera.zoomed_at(factor, at, self.viewport),
            CameraDelta::Set(camera) => camera,
        };
    }

    // ---------- input ----------

    pub fn resize(&mut self, viewport: Viewport) {
        debug!("viewport resized to {}x{}", viewport.width, viewport.height);
        self.viewport = viewport;
    }

    pub fn pointer_down(&mut self, id: PointerId, pos: ScreenPoint) {
        self.gestures.pointer_down(id, pos, &self.camera);
    }

    pub fn pointer_move(&mut self, id: PointerId, pos: ScreenPoint) {
        let delta = self.gestures.pointer_move(id, pos);
        if self.animation.is_active() {
            self.hover.clear();
            return;
        }
        if let Some(delta) = delta {
            self.apply_camera(delta);
        }
        if self.gestures.pointer_count() < 2 {
            let camera = &self.camera;
            let viewport = self.viewport;
            self.hover
                .update(&self.waypoints, pos, |p| camera.project(p, viewport));
        } else {
            self.hover.clear();
        }
    }

    pub fn pointer_up(&mut self, id: PointerId) {
        self.gestures.pointer_up(id, &self.camera);
    }

    pub fn pointer_cancel(&mut self, id: PointerId) {
        self.pointer_up(id);
    }

    pub fn wheel(&mut self, delta_y: f64, at: ScreenPoint) {
        if self.animation.is_active() {
            return;
        }
        if let Some(delta) = self.gestures.wheel(delta_y, at) {
            self.apply_camera(delta);
            self.gestures.rebase(&self.camera);
        }
    }

    /// Runs the shortcut bound to `key`, if any.
    pub fn key_down(&mut self, key: &str, focus: KeyFocus, now_ms: f64) -> Option<ViewCommand> {
        let command = command_for_key(key, focus)?;
        self.execute(command, now_ms);
        Some(command)
    }

    /// Camera presets stop a running animation where it is; replay restarts it.
    pub fn execute(&mut self, command: ViewCommand, now_ms: f64) {
        debug!("view command {:?}", command);
        if command == ViewCommand::ReplayAnimation {
            self.replay(now_ms);
            return;
        }
        self.stop_animation(false);
        let galaxy = self.galaxy();
        let padding = self.config.projection.fit_padding_px;
        let next = match command {
            ViewCommand::ResetView => Some(R::Camera::home(&galaxy)),
            ViewCommand::FitRoute => self
                .route_bounds()
                .map(|b| R::Camera::fit(&b, self.viewport, padding)),
            ViewCommand::FitGalaxy => Some(R::Camera::fit_galaxy(&galaxy, self.viewport, padding)),
            ViewCommand::Recenter => {
                let center = self.route_bounds().unwrap_or(galaxy).center();
                Some(self.camera.centered_on(center))
            }
            ViewCommand::ReplayAnimation => None,
        };
        if let Some(camera) = next {
            self.apply_camera(CameraDelta::Set(camera));
            self.gestures.rebase(&self.camera);
        }
    }

    fn route_bounds(&self) -> Option<WorldBounds> {
        self.route.as_ref().and_then(|r| r.bounds())
    }

    // ---------- routing ----------

    /// Validates and registers a request. Any running animation is cancelled
    /// and the camera goes back to where it was before it started.
    pub fn begin_route_request(&mut self, request: RouteRequest) -> Result<RouteTicket, ValidationError> {
        if let Err(e) = validate(&request) {
            self.error = Some(e.to_string());
            return Err(e);
        }
        self.stop_animation(true);
        self.error = None;
        let ticket = self.requests.begin();
        info!(
            "route request {} -> {} issued as #{}",
            request.from,
            request.to,
            ticket.generation()
        );
        self.last_request = Some(request);
        Ok(ticket)
    }

    /// Applies the collaborator's answer for `ticket` unless a newer request
    /// has been issued since.
    pub fn finish_route_request(
        &mut self,
        ticket: RouteTicket,
        result: Result<Route, RouteError>,
        now_ms: f64,
    ) -> RouteOutcome {
        if !self.requests.settle(ticket) {
            debug!("dropping superseded route result #{}", ticket.generation());
            return RouteOutcome::Stale;
        }
        let route = match result {
            Ok(route) => route,
            Err(e) => {
                warn!("route request #{} failed: {}", ticket.generation(), e);
                self.error = Some(e.to_string());
                return RouteOutcome::Failed(e);
            }
        };

        self.hover.clear();
        self.highlight = None;
        self.animation.clear();
        self.last_frame = None;
        self.waypoints = route.waypoints();
        let hops = route.hops.len();
        self.route = Some(Arc::new(route));

        if hops == 0 {
            info!("route #{} has no hops", ticket.generation());
            return RouteOutcome::Empty;
        }
        self.seed_animation(now_ms);
        RouteOutcome::Applied { hops }
    }

    fn seed_animation(&mut self, now_ms: f64) {
        let points: Vec<WorldPoint> = self.waypoints.iter().map(|w| w.position).collect();
        if let Some(frame) = self.animation.seed(&points, now_ms) {
            self.pre_animation_camera = Some(self.camera.clone());
            self.transition_from = None;
            self.trail.reset();
            self.last_frame = Some(frame);
            self.last_frame_ms = Some(now_ms);
        }
    }

    /// Plays the current route's animation again from the start.
    pub fn replay(&mut self, now_ms: f64) {
        let Some(frame) = self.animation.replay(now_ms) else {
            debug!("nothing to replay");
            return;
        };
        if self.pre_animation_camera.is_none() {
            self.pre_animation_camera = Some(self.camera.clone());
        }
        self.transition_from = None;
        self.trail.reset();
        self.hover.clear();
        self.last_frame = Some(frame);
        self.last_frame_ms = Some(now_ms);
    }

    /// Ends a running animation, leaving the route fully revealed.
    fn stop_animation(&mut self, restore_camera: bool) {
        if !self.animation.is_active() {
            return;
        }
        self.animation.cancel();
        self.transition_from = None;
        if let Some(snapshot) = self.pre_animation_camera.take() {
            if restore_camera {
                self.apply_camera(CameraDelta::Set(snapshot));
            }
        }
        self.last_frame = None;
        self.gestures.rebase(&self.camera);
    }

    // ---------- route panel ----------

    pub fn route_list(&self) -> Vec<RouteListItem> {
        self.route.as_ref().map(|r| r.list_items()).unwrap_or_default()
    }

    pub fn highlight_waypoint(&mut self, index: usize) -> bool {
        if index < self.waypoints.len() {
            self.highlight = Some(index);
            true
        } else {
            false
        }
    }

    pub fn clear_highlight(&mut self) {
        self.highlight = None;
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlight
    }

    /// Moves the camera to a close-up of the waypoint at `index`.
    pub fn focus_waypoint(&mut self, index: usize) -> bool {
        let Some(position) = self.waypoints.get(index).map(|w| w.position) else {
            return false;
        };
        self.stop_animation(false);
        let camera = self.camera.focused_on(position);
        self.apply_camera(CameraDelta::Set(camera));
        self.gestures.rebase(&self.camera);
        self.highlight = Some(index);
        true
    }

    // ---------- galaxy ----------

    pub fn toggle_grid(&mut self) -> bool {
        self.show_grid = !self.show_grid;
        self.show_grid
    }

    pub fn toggle_zones(&mut self) -> bool {
        self.show_zones = !self.show_zones;
        self.show_zones
    }

    /// Starts drawing the galaxy image once the host has it loaded.
    pub fn attach_backdrop_image(&mut self, path: impl AsRef<Path>) {
        let galaxy = self.galaxy();
        let flip = self.config.galaxy.flip_image;
        self.backdrop = Some(Backdrop {
            image_path: path.as_ref().to_path_buf(),
            bounds: galaxy,
            flip,
        });
    }

    pub fn set_catalog(&mut self, catalog: Arc<GalaxyCatalog>) {
        self.sectors = build_sectors(catalog.systems().iter().map(|s| s.position), self.galaxy());
        info!(
            "galaxy catalog attached: {} systems, {} sectors",
            catalog.len(),
            self.sectors.len()
        );
        self.catalog = Some(catalog);
    }

    /// Loads the backdrop catalog. A failure is logged and the map carries on
    /// without it.
    pub fn load_catalog(&mut self, path: impl AsRef<Path>) -> Option<usize> {
        let path = path.as_ref();
        self.galaxy_loading = true;
        let loaded = read_catalog_from_file(path);
        self.galaxy_loading = false;
        match loaded {
            Ok(catalog) => {
                let count = catalog.len();
                self.set_catalog(Arc::new(catalog));
                Some(count)
            }
            Err(e) => {
                warn!("could not load galaxy catalog {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Catalog system under a screen position, within the hover threshold.
    pub fn pick_system(&self, at: ScreenPoint) -> Option<SystemId> {
        let catalog = self.catalog.as_ref()?;
        let world = self.camera.unproject(at, self.viewport)?;
        let threshold = self.hover.threshold();
        let edge = ScreenPoint::new(at.x + threshold, at.y);
        let radius = self
            .camera
            .unproject(edge, self.viewport)
            .map_or(threshold, |e| e.distance(world));
        catalog.nearest_on_plane(world, radius).map(|s| s.id)
    }

    // ---------- frame ----------

    /// Advances the animation to `now_ms` and draws one frame.
    pub fn frame(&mut self, now_ms: f64) -> Result<(), RenderError> {
        let dt = self
            .last_frame_ms
            .map_or(0.0, |last| (now_ms - last).max(0.0));
        self.last_frame_ms = Some(now_ms);

        if let Some(frame) = self.animation.tick(now_ms) {
            self.frame_camera(&frame, dt);
            if let Some(curve) = self.animation.curve() {
                self.trail.update(curve, frame.progress);
            }
            self.last_frame = Some(frame);
        }
        self.draw()
    }

    fn frame_camera(&mut self, frame: &AnimationFrame, dt: f64) {
        let padding = self.config.projection.fit_padding_px;
        let overview = self
            .route_bounds()
            .map(|b| R::Camera::overview(&b, self.viewport, padding));
        match frame.phase {
            AnimationPhase::Following | AnimationPhase::Seeding => {
                let goal = self.camera.follow(frame.comet, frame.direction);
                let per_frame = self.config.animation.follow_smoothing;
                let k = 1.0 - (1.0 - per_frame).powf(dt / REFERENCE_FRAME_MS);
                let next = self.camera.lerp(&goal, k);
                self.apply_camera(CameraDelta::Set(next));
            }
            AnimationPhase::Transitioning => {
                let Some(goal) = overview else { return };
                let from = self
                    .transition_from
                    .get_or_insert_with(|| self.camera.clone())
                    .clone();
                self.apply_camera(CameraDelta::Set(from.lerp(&goal, frame.pullback)));
            }
            AnimationPhase::Idle => {
                if let Some(goal) = overview {
                    self.apply_camera(CameraDelta::Set(goal));
                }
                self.transition_from = None;
                self.pre_animation_camera = None;
                self.gestures.rebase(&self.camera);
                info!("route animation settled on overview");
            }
        }
    }

    fn markers(&self) -> Vec<MarkerView> {
        let last = self.waypoints.len().saturating_sub(1);
        self.waypoints
            .iter()
            .filter(|w| self.animation.is_revealed(w.hop_index))
            .map(|w| MarkerView {
                id: w.id,
                label: w.name.clone(),
                position: w.position,
                role: match w.hop_index {
                    0 => MarkerRole::Start,
                    i if i == last => MarkerRole::End,
                    _ => MarkerRole::Via,
                },
                highlighted: self.highlight == Some(w.hop_index),
            })
            .collect()
    }

    /// Waypoints currently drawn as markers.
    pub fn visible_markers(&self) -> Vec<MarkerView> {
        self.markers()
    }

    fn draw(&mut self) -> Result<(), RenderError> {
        let markers = self.markers();
        let tooltip = self.hover.current().map(|t| TooltipView {
            anchor: t.waypoint.position,
            lines: tooltip_lines(t),
        });

        let active = self.animation.is_active();
        let live = self.last_frame.filter(|_| active);
        let samples = self.animation.samples();
        let extent = match live {
            Some(f) => RouteExtent {
                progress: f.progress,
                head: f.comet,
                animating: true,
            },
            None => RouteExtent {
                progress: 1.0,
                head: samples.last().copied().unwrap_or(WorldPoint::ZERO),
                animating: false,
            },
        };
        let comet = live.map(|f| CometView {
            position: f.comet,
            opacity: f.comet_opacity,
            pulse: comet_pulse(f.elapsed_ms),
            glow_radius: comet_glow_radius(f.elapsed_ms),
            trail: self.trail.particles(),
        });
        let starfield_opacity = live.map_or(self.config.animation.full_starfield, |f| f.starfield_opacity);

        let scene = FrameScene {
            camera: &self.camera,
            viewport: self.viewport,
            backdrop: self.backdrop.as_ref(),
            galaxy: self.galaxy(),
            catalog: self.catalog.as_ref(),
            starfield_opacity,
            grid: if self.show_grid { &self.grid[..] } else { &[] },
            sectors: if self.show_zones { &self.sectors[..] } else { &[] },
            route: samples,
            extent,
            markers: &markers,
            comet,
            tooltip: tooltip.as_ref(),
        };
        compose(&mut self.renderer, &scene)
    }

    /// Releases renderer resources. Errors are logged, never returned.
    pub fn dispose(&mut self) {
        if let Err(e) = self.renderer.dispose() {
            warn!("renderer dispose failed: {}", e);
        }
    }
}

impl<R: Renderer> FrameTarget for StarMapView<R> {
    fn frame(&mut self, now_ms: f64) -> Result<(), RenderError> {
        StarMapView::frame(self, now_ms)
    }

    fn dispose(&mut self) -> Result<(), RenderError> {
        self.renderer.dispose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::camera::PlanarCamera;
    use crate::render::canvas::CanvasRenderer;
    use crate::route::model::fixtures::three_hop_route;
    use crate::route::model::{Metric, Optimize};
    use assert_approx_eq::assert_approx_eq;

    fn view() -> StarMapView<CanvasRenderer> {
        StarMapView::new(CanvasRenderer::new(), StarMapConfig::default(), Viewport::new(800.0, 500.0))
    }

    fn request(from: SystemId, to: SystemId) -> RouteRequest {
        RouteRequest {
            from,
            to,
            metric: Metric::Spatial,
            ship_jump_max: Some(80.0),
            optimize: Optimize::Hops,
        }
    }

    fn settled(view: &mut StarMapView<CanvasRenderer>) {
        let ticket = view.begin_route_request(request(2244677, 2526077)).expect("valid");
        let outcome = view.finish_route_request(ticket, Ok(three_hop_route()), 0.0);
        assert_eq!(outcome, RouteOutcome::Applied { hops: 3 });
        view.frame(16.0).expect("frame");
        view.frame(10_000.0).expect("frame");
        assert!(!view.animation().is_active());
    }

    #[test]
    fn fresh_route_starts_at_origin_with_dimmed_stars() {
        let mut v = view();
        let ticket = v.begin_route_request(request(2244677, 2526077)).expect("valid");
        assert!(v.is_loading());
        v.finish_route_request(ticket, Ok(three_hop_route()), 1_000.0);
        assert!(!v.is_loading());

        assert_eq!(v.animation().phase(), AnimationPhase::Seeding);
        let markers = v.visible_markers();
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].role, MarkerRole::Start);
        let frame = v.last_animation_frame().expect("seeded");
        assert_eq!(frame.comet, v.waypoints()[0].position);
        assert_eq!(frame.starfield_opacity, 0.15);
        assert_eq!(v.route_list().len(), 4);
    }

    #[test]
    fn failure_keeps_previous_route_and_camera() {
        let mut v = view();
        settled(&mut v);
        let camera = *v.camera();
        let before = v.route().cloned();

        let ticket = v.begin_route_request(request(1, 2)).expect("valid");
        let outcome = v.finish_route_request(ticket, Err(RouteError::Rejected("No path found".into())), 20_000.0);

        assert!(matches!(outcome, RouteOutcome::Failed(_)));
        assert_eq!(v.error(), Some("No path found"));
        assert_eq!(v.route().cloned(), before);
        assert_eq!(*v.camera(), camera);
        v.dismiss_error();
        assert_eq!(v.error(), None);
    }

    #[test]
    fn superseded_result_is_dropped() {
        let mut v = view();
        let first = v.begin_route_request(request(1, 2)).expect("valid");
        let second = v.begin_route_request(request(2244677, 2526077)).expect("valid");

        assert_eq!(
            v.finish_route_request(second, Ok(three_hop_route()), 0.0),
            RouteOutcome::Applied { hops: 3 }
        );
        let mut other = three_hop_route();
        other.hops.truncate(1);
        assert_eq!(v.finish_route_request(first, Ok(other), 5.0), RouteOutcome::Stale);
        assert_eq!(v.waypoints().len(), 4);
    }

    #[test]
    fn missing_jump_range_never_leaves_the_view() {
        let mut v = view();
        let mut req = request(1, 2);
        req.ship_jump_max = None;
        assert_eq!(v.begin_route_request(req), Err(ValidationError::JumpMaxRequired));
        assert_eq!(v.error(), Some("Ship Jump Max is required."));
        assert!(!v.is_loading());
    }

    #[test]
    fn empty_route_draws_nothing() {
        let mut v = view();
        let ticket = v.begin_route_request(request(1, 2)).expect("valid");
        let empty = Route {
            ok: true,
            hops: Vec::new(),
            error: None,
        };
        assert_eq!(v.finish_route_request(ticket, Ok(empty), 0.0), RouteOutcome::Empty);
        assert!(v.visible_markers().is_empty());
        assert!(!v.animation().is_active());
        v.frame(16.0).expect("frame");
    }

    #[test]
    fn new_request_restores_camera_from_before_the_animation() {
        let mut v = view();
        let home = *v.camera();
        let ticket = v.begin_route_request(request(2244677, 2526077)).expect("valid");
        v.finish_route_request(ticket, Ok(three_hop_route()), 0.0);
        v.frame(16.0).expect("frame");
        v.frame(1_000.0).expect("frame");
        assert_ne!(*v.camera(), home);

        v.begin_route_request(request(1, 2)).expect("valid");
        assert!(!v.animation().is_active());
        assert_eq!(*v.camera(), home);
        assert_eq!(v.visible_markers().len(), 4);
    }

    #[test]
    fn gestures_wait_for_the_animation() {
        let mut v = view();
        let ticket = v.begin_route_request(request(2244677, 2526077)).expect("valid");
        v.finish_route_request(ticket, Ok(three_hop_route()), 0.0);
        let before = *v.camera();
        v.wheel(-100.0, ScreenPoint::new(10.0, 10.0));
        assert_eq!(*v.camera(), before);

        v.frame(10_000.0).expect("frame");
        let settled_camera = *v.camera();
        v.wheel(-100.0, ScreenPoint::new(10.0, 10.0));
        assert_ne!(*v.camera(), settled_camera);
    }

    #[test]
    fn animation_settles_on_route_overview() {
        let mut v = view();
        settled(&mut v);
        let bounds = v.route().and_then(|r| r.bounds()).expect("bounds");
        let expected = PlanarCamera::overview(&bounds, v.viewport(), v.config().projection.fit_padding_px);
        assert_eq!(*v.camera(), expected);
    }

    #[test]
    fn hovering_a_waypoint_after_settling() {
        let mut v = view();
        settled(&mut v);
        let target = v.waypoints()[2].position;
        let s = v.camera().project(target, v.viewport()).expect("visible");
        v.pointer_move(1, ScreenPoint::new(s.x + 3.0, s.y + 4.0));
        assert_eq!(v.hover_target().map(|h| h.waypoint.hop_index), Some(2));

        v.replay(20_000.0);
        v.pointer_move(1, ScreenPoint::new(s.x + 3.0, s.y + 4.0));
        assert!(v.hover_target().is_none());
    }

    #[test]
    fn keyboard_shortcuts_respect_focus() {
        let mut v = view();
        let galaxy = v.config().galaxy.bounds;
        assert_eq!(v.key_down("G", KeyFocus::TextInput, 0.0), None);
        assert_eq!(v.key_down("G", KeyFocus::Map, 0.0), Some(ViewCommand::FitGalaxy));
        let expected = PlanarCamera::fit_galaxy(&galaxy, v.viewport(), v.config().projection.fit_padding_px);
        assert_eq!(*v.camera(), expected);
        assert_eq!(v.key_down("r", KeyFocus::Map, 0.0), Some(ViewCommand::ResetView));
        assert_eq!(*v.camera(), PlanarCamera::home(&galaxy));
    }

    #[test]
    fn focusing_a_waypoint_highlights_it() {
        let mut v = view();
        settled(&mut v);
        assert!(v.focus_waypoint(1));
        assert_eq!(v.highlighted(), Some(1));
        let center = v.camera().project(v.waypoints()[1].position, v.viewport()).expect("visible");
        assert!(center.distance(&v.viewport().center()) < 1e-6);
        assert!(!v.focus_waypoint(99));
    }

    #[test]
    fn missing_catalog_is_not_fatal() {
        let mut v = view();
        assert_eq!(v.load_catalog("/nonexistent/galaxy.bin"), None);
        assert_eq!(v.system_count(), 0);
        assert!(!v.is_galaxy_loading());
        v.frame(0.0).expect("frame");
    }

    #[test]
    fn two_pointers_zoom_about_their_midpoint() {
        let mut v = view();
        let zoom = v.camera().zoom;
        v.pointer_down(1, ScreenPoint::new(300.0, 250.0));
        v.pointer_down(2, ScreenPoint::new(500.0, 250.0));
        let mid = ScreenPoint::new(450.0, 250.0);
        let before = v.camera().unproject(mid, v.viewport()).expect("on plane");

        v.pointer_move(2, ScreenPoint::new(600.0, 250.0));
        assert_approx_eq!(v.camera().zoom, zoom * 1.5, 1e-9);
        let after = v.camera().unproject(mid, v.viewport()).expect("on plane");
        assert_approx_eq!(after.x, before.x, 1e-9);
        assert_approx_eq!(after.z, before.z, 1e-9);
        assert!(v.hover_target().is_none());

        v.pointer_up(2);
        v.pointer_up(1);
    }

    #[test]
    fn one_pointer_drags_the_map() {
        let mut v = view();
        let zoom = v.camera().zoom;
        let grab = ScreenPoint::new(100.0, 100.0);
        let world = v.camera().unproject(grab, v.viewport()).expect("on plane");
        v.pointer_down(1, grab);
        v.pointer_move(1, ScreenPoint::new(130.0, 115.0));
        v.pointer_move(1, ScreenPoint::new(160.0, 130.0));
        v.pointer_up(1);

        assert_eq!(v.camera().zoom, zoom);
        let under = v
            .camera()
            .unproject(ScreenPoint::new(160.0, 130.0), v.viewport())
            .expect("on plane");
        assert_approx_eq!(under.x, world.x, 1e-9);
        assert_approx_eq!(under.z, world.z, 1e-9);
    }

    #[test]
    fn replay_keeps_route_and_panel() {
        let mut v = view();
        settled(&mut v);
        let route = Arc::clone(v.route().expect("route"));
        let items = v.route_list();
        let bounds = route.bounds();

        assert_eq!(v.key_down("a", KeyFocus::Map, 20_000.0), Some(ViewCommand::ReplayAnimation));
        assert!(v.animation().is_active());
        assert!(Arc::ptr_eq(v.route().expect("route"), &route));
        assert_eq!(v.route_list(), items);
        assert_eq!(v.route().and_then(|r| r.bounds()), bounds);
        assert_eq!(v.waypoints().len(), 4);
        assert_eq!(v.error(), None);
    }

    #[test]
    fn catalog_without_image_still_draws_stars() {
        use crate::data::catalog::StarSystem;
        use crate::render::scene::SceneRenderer;

        let systems = (0..10)
            .map(|i| StarSystem {
                id: 30000000 + i,
                name: format!("S{i}"),
                position: WorldPoint::new(10_000.0 + i as f64 * 1_000.0, 0.0, 20_000.0),
            })
            .collect();
        let mut v = StarMapView::new(SceneRenderer::new(), StarMapConfig::default(), Viewport::new(1280.0, 720.0));
        v.set_catalog(Arc::new(GalaxyCatalog::new(systems)));
        v.frame(16.0).expect("frame");

        let scene = v.renderer().scene();
        assert!(scene.backdrop.is_none());
        let stars = scene.starfield.as_ref().expect("star field");
        assert_eq!(stars.positions.len(), 10);
        assert_eq!(stars.opacity, v.config().animation.full_starfield);
        assert_eq!(scene.cardinals.len(), 4);
    }
}
