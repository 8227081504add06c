use cubescene_app::Host;
use cubescene_render::SurfaceSize;
use std::sync::Arc;
use winit::dpi::PhysicalSize;
use winit::window::Window;

/// A winit window acting as the viewport container.
///
/// `client_size` is logical pixels for the camera aspect; `physical_size`
/// is the window's exact backing size for the GPU surface.
pub struct WindowHost {
    window: Arc<Window>,
}

impl WindowHost {
    pub fn new(window: Arc<Window>) -> Self {
        Self { window }
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }
}

impl Host for WindowHost {
    fn client_size(&self) -> SurfaceSize {
        logical_size(self.window.inner_size(), self.window.scale_factor())
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.window.scale_factor()
    }

    fn physical_size(&self) -> SurfaceSize {
        let inner = self.window.inner_size();
        SurfaceSize::new(inner.width, inner.height)
    }

    fn request_animation_frame(&self) {
        self.window.request_redraw();
    }
}

fn logical_size(inner: PhysicalSize<u32>, scale_factor: f64) -> SurfaceSize {
    let logical = inner.to_logical::<u32>(scale_factor);
    SurfaceSize::new(logical.width, logical.height)
}
