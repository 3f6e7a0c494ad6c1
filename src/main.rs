use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use chrono::Local;
use clap::{Parser, ValueEnum};
use log::{info, warn};
use starmap_view::config::StarMapConfig;
use starmap_view::render::canvas::CanvasRenderer;
use starmap_view::render::frame_loop::{FrameHandle, InputKind, ListenerId, RenderLoop, Surface};
use starmap_view::render::scene::SceneRenderer;
use starmap_view::render::{RenderError, Renderer};
use starmap_view::route::client::{normalize, RouteError};
use starmap_view::route::model::{Metric, Optimize, Route, RouteRequest};
use starmap_view::view::export::ExportKind;
use starmap_view::view::star_map::{RouteOutcome, StarMapView};
use starmap_view::{SystemId, Viewport};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RendererKind {
    #[value(name = "2d")]
    Canvas,
    #[value(name = "3d")]
    Scene,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum MetricArg {
    #[value(name = "2d")]
    Planar,
    #[value(name = "3d")]
    Spatial,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OptimizeArg {
    Distance,
    Hops,
}

/// Plays a route animation headless and reports what the map would show.
#[derive(Debug, Parser)]
#[command(name = "starmap_replay", version)]
struct Args {
    /// JSON config file; defaults apply to anything it leaves out.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Galaxy catalog (.json or compact bundle) for the backdrop.
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Route response saved as JSON. Without it the routing endpoint is asked.
    #[arg(long)]
    route_file: Option<PathBuf>,
    /// Routing endpoint; overrides the config.
    #[arg(long)]
    endpoint: Option<String>,
    #[arg(long)]
    from: Option<SystemId>,
    #[arg(long)]
    to: Option<SystemId>,
    #[arg(long)]
    jump_max: Option<f64>,
    #[arg(long, value_enum, default_value_t = MetricArg::Spatial)]
    metric: MetricArg,
    #[arg(long, value_enum, default_value_t = OptimizeArg::Hops)]
    optimize: OptimizeArg,
    #[arg(long, value_enum, default_value_t = RendererKind::Canvas)]
    renderer: RendererKind,
    #[arg(long, default_value_t = 60)]
    fps: u32,
    #[arg(long, default_value_t = 1280.0)]
    width: f64,
    #[arg(long, default_value_t = 720.0)]
    height: f64,
    /// Pace frames on the wall clock instead of as fast as possible.
    #[arg(long)]
    realtime: bool,
    /// Directory for the route and payload debug exports.
    #[arg(long)]
    export_dir: Option<PathBuf>,
}

/// Frame source for running without a window.
#[derive(Debug, Default)]
struct HeadlessSurface {
    next: u64,
}

impl Surface for HeadlessSurface {
    fn request_frame(&mut self) -> Result<FrameHandle, RenderError> {
        self.next += 1;
        Ok(self.next)
    }

    fn cancel_frame(&mut self, _handle: FrameHandle) -> Result<(), RenderError> {
        Ok(())
    }

    fn add_listener(&mut self, _kind: InputKind) -> Result<ListenerId, RenderError> {
        self.next += 1;
        Ok(self.next)
    }

    fn remove_listener(&mut self, _id: ListenerId) -> Result<(), RenderError> {
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => StarMapConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => StarMapConfig::default(),
    };
    if args.fps == 0 {
        bail!("--fps must be positive");
    }

    match args.renderer {
        RendererKind::Canvas => replay(CanvasRenderer::new(), &args, config).await,
        RendererKind::Scene => replay(SceneRenderer::new(), &args, config).await,
    }
}

fn read_route_file(path: &Path) -> Result<Route> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("{} is not a route response", path.display()))
}

fn build_request(args: &Args, saved: Option<&Route>) -> Result<RouteRequest> {
    let first = saved.and_then(|r| r.hops.first()).map(|h| h.from.id);
    let last = saved.and_then(|r| r.hops.last()).map(|h| h.to.id);
    Ok(RouteRequest {
        from: args.from.or(first).ok_or_else(|| anyhow!("--from is required"))?,
        to: args.to.or(last).ok_or_else(|| anyhow!("--to is required"))?,
        metric: match args.metric {
            MetricArg::Planar => Metric::Planar,
            MetricArg::Spatial => Metric::Spatial,
        },
        ship_jump_max: args.jump_max,
        optimize: match args.optimize {
            OptimizeArg::Distance => Optimize::Distance,
            OptimizeArg::Hops => Optimize::Hops,
        },
    })
}

#[cfg(feature = "http")]
async fn fetch_route(endpoint: Option<&str>, config: &StarMapConfig, request: &RouteRequest) -> Result<Result<Route, RouteError>> {
    use starmap_view::route::client::RouteClient;
    use starmap_view::route::http::HttpTransport;

    let endpoint = endpoint
        .or(config.route.endpoint.as_deref())
        .ok_or_else(|| anyhow!("no --route-file given and no routing endpoint configured"))?;
    let client = RouteClient::new(HttpTransport::new(endpoint)?, &config.route);
    Ok(client.find_route(request).await)
}

#[cfg(not(feature = "http"))]
async fn fetch_route(_endpoint: Option<&str>, _config: &StarMapConfig, _request: &RouteRequest) -> Result<Result<Route, RouteError>> {
    bail!("built without the `http` feature; pass --route-file")
}

async fn replay<R: Renderer>(renderer: R, args: &Args, config: StarMapConfig) -> Result<()> {
    let frame_ms = 1000.0 / f64::from(args.fps);
    let mut view = StarMapView::new(renderer, config, Viewport::new(args.width, args.height));

    if let Some(path) = &args.catalog {
        if view.load_catalog(path).is_some() {
            let image = PathBuf::from(&view.config().galaxy.image_path);
            if image.exists() {
                view.attach_backdrop_image(image);
            } else {
                warn!("backdrop image {} not found", image.display());
            }
        }
    }

    let saved = args.route_file.as_deref().map(read_route_file).transpose()?;
    let request = build_request(args, saved.as_ref())?;
    let ticket = view
        .begin_route_request(request.clone())
        .map_err(|e| anyhow!("invalid request: {e}"))?;
    let result = match saved {
        Some(route) => normalize(route),
        None => fetch_route(args.endpoint.as_deref(), view.config(), &request).await?,
    };

    match view.finish_route_request(ticket, result, 0.0) {
        RouteOutcome::Applied { hops } => info!("route with {hops} hops applied"),
        RouteOutcome::Empty => info!("route has no hops; nothing to animate"),
        RouteOutcome::Failed(e) => warn!("route failed: {e}"),
        RouteOutcome::Stale => warn!("route result arrived after a newer request"),
    }
    for item in view.route_list() {
        info!(
            "  {:>3} {:<24} {}",
            item.index,
            item.name,
            item.distance.map(|d| format!("{d:.1} ly")).unwrap_or_default()
        );
    }

    let mut frames = RenderLoop::new(HeadlessSurface::default());
    frames.start()?;
    let mut ticker = tokio::time::interval(Duration::from_secs_f64(frame_ms / 1000.0));
    let mut phase = view.animation().phase();
    let mut now = 0.0;
    // one extra frame after the animation settles draws the final state
    let mut settled = !view.animation().is_active();
    while let Some(handle) = frames.pending_frame() {
        if args.realtime {
            ticker.tick().await;
        }
        now += frame_ms;
        frames.on_frame(handle, now, &mut view)?;
        let current = view.animation().phase();
        if current != phase {
            info!(
                "{:>8.0} ms  {:?} -> {:?}  progress {:.3}",
                now,
                phase,
                current,
                view.animation().state().progress
            );
            phase = current;
        }
        if settled {
            break;
        }
        settled = !view.animation().is_active();
    }
    info!("settled after {:.0} ms with camera {:?}", now, view.camera());
    if let Some(message) = view.error() {
        warn!("map shows error: {message}");
    }

    if let Some(dir) = &args.export_dir {
        fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
        let stamp = Local::now();
        for kind in [ExportKind::Route, ExportKind::Payload] {
            match view.debug_export(kind, &stamp) {
                Ok(export) => {
                    export.write_to(dir)?;
                }
                Err(e) => warn!("skipping {kind:?} export: {e}"),
            }
        }
    }

    frames.teardown(&mut view);
    Ok(())
}
