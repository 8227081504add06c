//! Renderer interface shared by every backend.
//!
//! # Invariants
//! - Renderers never mutate the scene or camera they draw.
//! - `size()` reports the most recent `set_size`, in logical pixels.
//! - The drawing buffer is sized in physical pixels, never smaller than 1x1.

mod renderer;

pub use renderer::{DebugTextRenderer, RenderError, Renderer, SurfaceSize};

pub fn crate_info() -> &'static str {
    concat!("cubescene-render v", env!("CARGO_PKG_VERSION"))
}
