//! Scene constants as data.
//!
//! Every field has a default, so an empty YAML document (or no file at all)
//! yields the stock scene: a teal unit cube lit from the upper left, seen
//! from two units back.

use crate::camera::PerspectiveCamera;
use crate::light::DirectionalLight;
use crate::mesh::{BoxGeometry, Mesh, PhongMaterial};
use cubescene_common::Color;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading a scene configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 75.0,
            near: 0.1,
            far: 100.0,
            position: Vec3::new(0.0, 0.0, 2.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LightConfig {
    pub color: Color,
    pub intensity: f32,
    pub position: Vec3,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            intensity: 1.0,
            position: Vec3::new(-1.0, 2.0, 4.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CubeConfig {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub color: Color,
    pub specular: Color,
    pub shininess: f32,
}

impl Default for CubeConfig {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
            depth: 1.0,
            color: Color::from_hex(0x44aa88),
            specular: Color::from_hex(0x111111),
            shininess: 30.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RendererConfig {
    /// Multisample the color target to smooth edges.
    pub antialias: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self { antialias: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SceneConfig {
    pub background: Color,
    pub camera: CameraConfig,
    pub light: LightConfig,
    pub cube: CubeConfig,
    pub renderer: RendererConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            background: Color::BLACK,
            camera: CameraConfig::default(),
            light: LightConfig::default(),
            cube: CubeConfig::default(),
            renderer: RendererConfig::default(),
        }
    }
}

impl SceneConfig {
    /// Read and validate a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&text)?;
        tracing::info!("loaded scene config from {}", path.display());
        Ok(config)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        // serde_yaml rejects an empty document, treat it as all defaults.
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let cam = &self.camera;
        if !(cam.fov > 0.0 && cam.fov < 180.0) {
            return Err(ConfigError::Invalid {
                field: "camera.fov",
                reason: format!("{} is outside (0, 180)", cam.fov),
            });
        }
        if !(cam.near > 0.0 && cam.far > cam.near) {
            return Err(ConfigError::Invalid {
                field: "camera.near/far",
                reason: format!("need 0 < near < far, got {} / {}", cam.near, cam.far),
            });
        }
        let cube = &self.cube;
        if cube.width <= 0.0 || cube.height <= 0.0 || cube.depth <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "cube",
                reason: "box dimensions must be positive".into(),
            });
        }
        Ok(())
    }

    /// Camera with the configured projection and the given aspect ratio.
    pub fn build_camera(&self, aspect: f32) -> PerspectiveCamera {
        let cam = &self.camera;
        let mut camera = PerspectiveCamera::new(cam.fov, aspect, cam.near, cam.far);
        camera.position = cam.position;
        camera
    }

    pub fn build_light(&self) -> DirectionalLight {
        let mut light = DirectionalLight::new(self.light.color, self.light.intensity);
        light.position = self.light.position;
        light
    }

    pub fn build_cube(&self) -> Mesh {
        let cube = &self.cube;
        Mesh::new(
            BoxGeometry::new(cube.width, cube.height, cube.depth),
            PhongMaterial {
                color: cube.color,
                specular: cube.specular,
                shininess: cube.shininess,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_stock_scene() {
        let config = SceneConfig::default();
        assert_eq!(config.camera.fov, 75.0);
        assert_eq!(config.camera.near, 0.1);
        assert_eq!(config.camera.far, 100.0);
        assert_eq!(config.camera.position.z, 2.0);
        assert_eq!(config.light.color, Color::WHITE);
        assert_eq!(config.light.intensity, 1.0);
        assert_eq!(config.light.position, Vec3::new(-1.0, 2.0, 4.0));
        assert_eq!(config.cube.color.to_hex(), 0x44aa88);
        assert_eq!(config.background, Color::BLACK);
        assert!(config.renderer.antialias);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_document_is_default() {
        assert_eq!(SceneConfig::from_yaml_str("").unwrap(), SceneConfig::default());
        assert_eq!(SceneConfig::from_yaml_str("  \n").unwrap(), SceneConfig::default());
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let yaml = "cube:\n  color: \"#ff0000\"\ncamera:\n  fov: 60\n";
        let config = SceneConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.cube.color.to_hex(), 0xff0000);
        assert_eq!(config.cube.width, 1.0);
        assert_eq!(config.camera.fov, 60.0);
        assert_eq!(config.camera.far, 100.0);
    }

    #[test]
    fn omitted_background_stays_black() {
        let config = SceneConfig::from_yaml_str("cube: {}\n").unwrap();
        assert_eq!(config.background, Color::BLACK);

        let config = SceneConfig::from_yaml_str("background: \"#202020\"\n").unwrap();
        assert_eq!(config.background.to_hex(), 0x202020);
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = SceneConfig::from_yaml_str("cube:\n  colour: \"#ff0000\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = SceneConfig::from_yaml_str("camera:\n  near: 5\n  far: 1\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "camera.near/far", .. }));

        let err = SceneConfig::from_yaml_str("cube:\n  width: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "cube", .. }));
    }

    #[test]
    fn yaml_round_trip() {
        let config = SceneConfig::default();
        let text = config.to_yaml_string().unwrap();
        assert_eq!(SceneConfig::from_yaml_str(&text).unwrap(), config);
    }

    #[test]
    fn load_from_file() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "light:\n  intensity: 2.5\n").unwrap();
        let config = SceneConfig::load(tmp.path()).unwrap();
        assert_eq!(config.light.intensity, 2.5);
    }

    #[test]
    fn load_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let err = SceneConfig::load(tmp.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn builders_apply_config() {
        let config = SceneConfig::default();
        let camera = config.build_camera(2.0);
        assert_eq!(camera.aspect, 2.0);
        assert_eq!(camera.position, Vec3::new(0.0, 0.0, 2.0));

        let light = config.build_light();
        assert_eq!(light.position, Vec3::new(-1.0, 2.0, 4.0));

        let cube = config.build_cube();
        assert_eq!(cube.geometry, BoxGeometry::default());
        assert_eq!(cube.material.color.to_hex(), 0x44aa88);
    }
}
