use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use cubescene_app::{Application, HeadlessHost};
use cubescene_render::DebugTextRenderer;
use cubescene_scene::SceneConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cubescene-cli", about = "Headless tools for the cube scene")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene config file (YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Run the frame loop headlessly and print each frame
    Simulate {
        /// Number of frames to run
        #[arg(short, long, default_value = "3")]
        frames: u64,
        /// Milliseconds between frames
        #[arg(short, long, default_value = "16")]
        interval_ms: f64,
        /// Viewport width in logical pixels
        #[arg(long, default_value = "800")]
        width: u32,
        /// Viewport height in logical pixels
        #[arg(long, default_value = "600")]
        height: u32,
        /// Device pixel ratio
        #[arg(long, default_value = "1.0")]
        pixel_ratio: f64,
        /// Resize the viewport before a frame, as WIDTHxHEIGHT@FRAME
        #[arg(long, value_parser = parse_resize)]
        resize: Option<ResizeAt>,
    },
    /// Print the effective scene config as YAML
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ResizeAt {
    width: u32,
    height: u32,
    frame: u64,
}

fn parse_resize(s: &str) -> anyhow::Result<ResizeAt> {
    let Some((size, frame)) = s.split_once('@') else {
        bail!("expected WIDTHxHEIGHT@FRAME, got {s:?}");
    };
    let Some((width, height)) = size.split_once('x') else {
        bail!("expected WIDTHxHEIGHT, got {size:?}");
    };
    Ok(ResizeAt {
        width: width.trim().parse().context("width")?,
        height: height.trim().parse().context("height")?,
        frame: frame.trim().parse().context("frame")?,
    })
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<SceneConfig> {
    match path {
        Some(path) => {
            SceneConfig::load(path).with_context(|| format!("load config {}", path.display()))
        }
        None => Ok(SceneConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info => {
            println!("cubescene-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("app: {}", cubescene_app::crate_info());
            println!("render: {}", cubescene_render::crate_info());
            println!("scene: {}", cubescene_scene::crate_info());
        }
        Commands::Simulate {
            frames,
            interval_ms,
            width,
            height,
            pixel_ratio,
            resize,
        } => {
            let config = load_config(cli.config.as_ref())?;
            let host = HeadlessHost::new(width, height).with_pixel_ratio(pixel_ratio);
            let mut app = Application::initialize(host, &config, |_, _| {
                Ok(DebugTextRenderer::new())
            })?;

            let mut frame = 0;
            while frame < frames && app.host().take_frame_request() {
                if let Some(r) = resize.filter(|r| r.frame == frame) {
                    app.host().set_client_size(r.width, r.height);
                    app.resize();
                }
                let elapsed_ms = frame as f64 * interval_ms;
                let report = app.render_frame(elapsed_ms)?;
                println!("t={elapsed_ms:.0}ms");
                print!("{report}");
                frame += 1;
            }
            tracing::info!(frames = frame, "simulation finished");
        }
        Commands::Config => {
            let config = load_config(cli.config.as_ref())?;
            print!("{}", config.to_yaml_string()?);
        }
    }

    Ok(())
}
