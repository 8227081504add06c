use cubescene_render::RenderError;
use cubescene_scene::ConfigError;

/// Errors that abort application setup.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("renderer setup failed: {0}")]
    Renderer(#[from] RenderError),
    #[error("invalid scene config: {0}")]
    Config(#[from] ConfigError),
}
