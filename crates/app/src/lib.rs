//! Application wiring: builds the scene once, then animates it frame by frame.
//!
//! # Invariants
//! - After every `resize`, camera aspect equals viewport width / height and
//!   the renderer size equals the viewport size.
//! - Cube rotation is a pure function of elapsed time, never accumulated.
//! - Each frame renders, updates, then requests exactly one further frame.

mod application;
mod error;
mod host;

pub use application::Application;
pub use error::AppError;
pub use host::{HeadlessHost, Host};

pub fn crate_info() -> &'static str {
    concat!("cubescene-app v", env!("CARGO_PKG_VERSION"))
}
