use cubescene_scene::{PerspectiveCamera, Scene};
use std::fmt::Write as _;

/// Surface size in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height. Zero height yields a non-finite ratio.
    pub fn aspect(self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Physical size for a pixel ratio, clamped to at least 1x1.
    pub fn scaled(self, pixel_ratio: f64) -> SurfaceSize {
        let scale = |v: u32| ((v as f64 * pixel_ratio).round() as u32).max(1);
        SurfaceSize::new(scale(self.width), scale(self.height))
    }
}

/// Errors a renderer backend can report.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("no compatible graphics adapter found")]
    NoAdapter,
    #[error("failed to create render surface: {0}")]
    Surface(String),
    #[error("failed to acquire graphics device: {0}")]
    Device(String),
    #[error("failed to acquire frame: {0}")]
    Frame(String),
}

/// Renderer-agnostic interface. All backends implement this trait.
///
/// A renderer owns a drawable surface. Its logical size is set by the
/// application to match the viewport; the backing buffer is sized
/// separately, in physical pixels, straight from the host.
pub trait Renderer {
    /// The output type produced by one render.
    type Output;

    fn set_pixel_ratio(&mut self, ratio: f64);

    fn pixel_ratio(&self) -> f64;

    /// Resize the drawable surface, in logical pixels.
    fn set_size(&mut self, width: u32, height: u32);

    fn size(&self) -> SurfaceSize;

    /// Resize the backing buffer, in physical pixels. Clamped to at least 1x1.
    fn set_drawing_buffer_size(&mut self, size: SurfaceSize);

    fn drawing_buffer_size(&self) -> SurfaceSize;

    /// Draw the scene from the camera's viewpoint.
    fn render(
        &mut self,
        scene: &Scene,
        camera: &PerspectiveCamera,
    ) -> Result<Self::Output, RenderError>;
}

/// Headless renderer that describes each frame as text.
///
/// Useful for CLI output, logging, and testing the render interface.
#[derive(Debug)]
pub struct DebugTextRenderer {
    size: SurfaceSize,
    buffer: SurfaceSize,
    pixel_ratio: f64,
    frames: u64,
}

impl Default for DebugTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self {
            size: SurfaceSize::default(),
            buffer: SurfaceSize::new(1, 1),
            pixel_ratio: 1.0,
            frames: 0,
        }
    }

    /// Number of frames rendered so far.
    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn set_pixel_ratio(&mut self, ratio: f64) {
        self.pixel_ratio = ratio;
    }

    fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    /// Also derives the buffer size from the pixel ratio; an explicit
    /// `set_drawing_buffer_size` afterwards overrides it.
    fn set_size(&mut self, width: u32, height: u32) {
        self.size = SurfaceSize::new(width, height);
        self.buffer = self.size.scaled(self.pixel_ratio);
    }

    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn set_drawing_buffer_size(&mut self, size: SurfaceSize) {
        self.buffer = SurfaceSize::new(size.width.max(1), size.height.max(1));
    }

    fn drawing_buffer_size(&self) -> SurfaceSize {
        self.buffer
    }

    fn render(
        &mut self,
        scene: &Scene,
        camera: &PerspectiveCamera,
    ) -> Result<String, RenderError> {
        let buffer = self.buffer;
        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = writeln!(
            out,
            "=== Frame {} (surface={}x{} buffer={}x{} ratio={:.2}) ===",
            self.frames,
            self.size.width,
            self.size.height,
            buffer.width,
            buffer.height,
            self.pixel_ratio
        );
        let _ = writeln!(
            out,
            "Camera: pos=({:.2}, {:.2}, {:.2}) fov={:.0} aspect={:.3} near={} far={}",
            camera.position.x,
            camera.position.y,
            camera.position.z,
            camera.fov,
            camera.aspect,
            camera.near,
            camera.far
        );
        let _ = writeln!(out, "Background: {}", scene.background);
        let _ = writeln!(out, "Lights: {}", scene.light_count());
        for (i, light) in scene.lights().iter().enumerate() {
            let p = light.position;
            let _ = writeln!(
                out,
                "  [{i}] directional color={} intensity={:.2} pos=({:.2}, {:.2}, {:.2})",
                light.color, light.intensity, p.x, p.y, p.z
            );
        }
        let _ = writeln!(out, "Meshes: {}", scene.mesh_count());
        for (i, mesh) in scene.meshes().iter().enumerate() {
            let g = mesh.geometry;
            let r = mesh.transform.rotation;
            let _ = writeln!(
                out,
                "  [{i}] box {}x{}x{} color={} rot=({:.3}, {:.3}, {:.3})",
                g.width, g.height, g.depth, mesh.material.color, r.x, r.y, r.z
            );
        }

        self.frames += 1;
        tracing::trace!(frame = self.frames, "debug frame rendered");
        Ok(out)
    }
}
