//! Scene description: what gets drawn and from where.
//!
//! # Invariants
//! - Objects are never removed from a scene; handles stay valid for its lifetime.
//! - Iteration order of lights and meshes is insertion order.
//! - The camera's cached projection only changes through `update_projection_matrix`.

pub mod camera;
pub mod config;
pub mod graph;
pub mod light;
pub mod mesh;

pub use camera::PerspectiveCamera;
pub use config::{CameraConfig, ConfigError, CubeConfig, LightConfig, RendererConfig, SceneConfig};
pub use graph::{LightId, MeshId, Scene};
pub use light::DirectionalLight;
pub use mesh::{BoxGeometry, Mesh, PhongMaterial};

pub fn crate_info() -> &'static str {
    concat!("cubescene-scene v", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("scene"));
    }
}
