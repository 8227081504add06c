use cubescene_common::Color;
use glam::Vec3;

/// Light with parallel rays shining from `position` toward `target`.
///
/// Only the direction matters; there is no falloff with distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub color: Color,
    pub intensity: f32,
    pub position: Vec3,
    pub target: Vec3,
}

impl DirectionalLight {
    pub fn new(color: Color, intensity: f32) -> Self {
        Self {
            color,
            intensity,
            position: Vec3::Y,
            target: Vec3::ZERO,
        }
    }

    /// Unit vector pointing from the lit surface toward the light.
    ///
    /// Falls back to +Y when position and target coincide.
    pub fn direction(&self) -> Vec3 {
        (self.position - self.target).try_normalize().unwrap_or(Vec3::Y)
    }
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self::new(Color::WHITE, 1.0)
    }
}
