//! wgpu render backend for the cube scene.
//!
//! Draws every mesh as an instance of one unit cube, shaded Blinn-Phong by
//! up to [`MAX_LIGHTS`] directional lights.
//!
//! # Invariants
//! - Renderer never mutates the scene or camera.
//! - Surface, depth and multisample targets always share one physical size.
//! - Physical size is logical size times pixel ratio, at least 1x1.

mod gpu;
mod shaders;

pub use gpu::{MAX_LIGHTS, RendererOptions, WgpuRenderer};
