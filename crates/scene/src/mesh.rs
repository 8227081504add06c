use cubescene_common::{Color, Transform};
use glam::{Mat4, Vec3};

/// Axis-aligned box centred on the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxGeometry {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

impl BoxGeometry {
    pub fn new(width: f32, height: f32, depth: f32) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    /// Box extents as a scale applied to a unit cube.
    pub fn extents(&self) -> Vec3 {
        Vec3::new(self.width, self.height, self.depth)
    }
}

impl Default for BoxGeometry {
    fn default() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }
}

/// Phong-shaded surface: diffuse color plus a specular highlight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhongMaterial {
    pub color: Color,
    pub specular: Color,
    pub shininess: f32,
}

impl PhongMaterial {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }
}

impl Default for PhongMaterial {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            specular: Color::from_hex(0x111111),
            shininess: 30.0,
        }
    }
}

/// Geometry + material + transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mesh {
    pub geometry: BoxGeometry,
    pub material: PhongMaterial,
    pub transform: Transform,
}

impl Mesh {
    pub fn new(geometry: BoxGeometry, material: PhongMaterial) -> Self {
        Self {
            geometry,
            material,
            transform: Transform::default(),
        }
    }

    /// World matrix of the unit cube scaled to this mesh's box extents.
    pub fn model_matrix(&self) -> Mat4 {
        self.transform.matrix() * Mat4::from_scale(self.geometry.extents())
    }
}
