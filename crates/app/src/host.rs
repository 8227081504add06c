use cubescene_render::SurfaceSize;
use std::cell::Cell;

/// The environment an application runs in.
///
/// Supplies the viewport container's size and pixel density, and schedules
/// the next display-frame callback. Event delivery (resize, redraw) stays
/// with the host's event loop, which calls back into the application.
pub trait Host {
    /// Current viewport size in logical pixels.
    fn client_size(&self) -> SurfaceSize;

    /// Physical pixels per logical pixel.
    fn device_pixel_ratio(&self) -> f64;

    /// Current viewport size in physical pixels.
    ///
    /// Hosts that know their exact backing size should override this;
    /// scaling a rounded logical size can be off by one pixel at
    /// fractional ratios.
    fn physical_size(&self) -> SurfaceSize {
        self.client_size().scaled(self.device_pixel_ratio())
    }

    /// Ask for one more frame callback.
    fn request_animation_frame(&self);
}

/// In-memory host with a fixed, settable viewport.
///
/// Frame requests are counted instead of delivered; the driver polls
/// `take_frame_request` to decide whether to run another frame.
#[derive(Debug)]
pub struct HeadlessHost {
    size: Cell<SurfaceSize>,
    physical: Cell<Option<SurfaceSize>>,
    pixel_ratio: Cell<f64>,
    requested: Cell<u64>,
    pending: Cell<bool>,
}

impl HeadlessHost {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: Cell::new(SurfaceSize::new(width, height)),
            physical: Cell::new(None),
            pixel_ratio: Cell::new(1.0),
            requested: Cell::new(0),
            pending: Cell::new(false),
        }
    }

    pub fn with_pixel_ratio(self, ratio: f64) -> Self {
        self.pixel_ratio.set(ratio);
        self
    }

    /// Change the viewport size. The application sees it on its next `resize`.
    pub fn set_client_size(&self, width: u32, height: u32) {
        self.size.set(SurfaceSize::new(width, height));
    }

    /// Pin the physical size instead of deriving it from the pixel ratio.
    pub fn set_physical_size(&self, width: u32, height: u32) {
        self.physical.set(Some(SurfaceSize::new(width, height)));
    }

    pub fn set_device_pixel_ratio(&self, ratio: f64) {
        self.pixel_ratio.set(ratio);
    }

    /// Total frame requests received.
    pub fn frames_requested(&self) -> u64 {
        self.requested.get()
    }

    /// Consume the outstanding frame request, if any.
    pub fn take_frame_request(&self) -> bool {
        self.pending.replace(false)
    }
}

impl Host for HeadlessHost {
    fn client_size(&self) -> SurfaceSize {
        self.size.get()
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.pixel_ratio.get()
    }

    fn physical_size(&self) -> SurfaceSize {
        self.physical
            .get()
            .unwrap_or_else(|| self.client_size().scaled(self.device_pixel_ratio()))
    }

    fn request_animation_frame(&self) {
        self.requested.set(self.requested.get() + 1);
        self.pending.set(true);
    }
}
