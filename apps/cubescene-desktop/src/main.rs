mod host;

use anyhow::{Context, Result};
use clap::Parser;
use cubescene_app::{Application, Host};
use cubescene_render_wgpu::{RendererOptions, WgpuRenderer};
use cubescene_scene::SceneConfig;
use host::WindowHost;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "cubescene-desktop", about = "Rotating cube in a desktop window")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Initial window width in logical pixels
    #[arg(long, default_value = "1280")]
    width: u32,

    /// Initial window height in logical pixels
    #[arg(long, default_value = "720")]
    height: u32,

    /// Window title
    #[arg(long, default_value = "Cube Scene")]
    title: String,

    /// Scene config file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Disable multisample antialiasing
    #[arg(long)]
    no_antialias: bool,
}

struct DesktopApp {
    title: String,
    initial_size: LogicalSize<u32>,
    config: SceneConfig,
    app: Option<Application<WindowHost, WgpuRenderer>>,
    started: Instant,
    failure: Option<anyhow::Error>,
}

impl DesktopApp {
    fn new(cli: &Cli, config: SceneConfig) -> Self {
        Self {
            title: cli.title.clone(),
            initial_size: LogicalSize::new(cli.width, cli.height),
            config,
            app: None,
            started: Instant::now(),
            failure: None,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(self.initial_size);
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let options = RendererOptions {
            antialias: self.config.renderer.antialias,
        };
        let app = Application::initialize(WindowHost::new(window), &self.config, |host, _| {
            WgpuRenderer::new(host.window().clone(), host.physical_size(), options)
        })
        .context("initialize scene")?;

        self.app = Some(app);
        self.started = Instant::now();
        Ok(())
    }
}

impl ApplicationHandler for DesktopApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.app.is_some() {
            return;
        }
        if let Err(e) = self.start(event_loop) {
            tracing::error!("startup failed: {e:#}");
            self.failure = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(app) = &mut self.app else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(_) => {
                app.resize();
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                app.refresh_pixel_ratio();
            }
            WindowEvent::RedrawRequested => {
                let elapsed_ms = self.started.elapsed().as_secs_f64() * 1000.0;
                // Failures are logged by the application; the loop keeps going.
                let _ = app.render_frame(elapsed_ms);
            }
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("cubescene-desktop starting");

    let mut config = match &cli.config {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => SceneConfig::default(),
    };
    if cli.no_antialias {
        config.renderer.antialias = false;
    }

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = DesktopApp::new(&cli, config);
    event_loop.run_app(&mut app)?;

    match app.failure {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
