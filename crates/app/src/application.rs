use crate::error::AppError;
use crate::host::Host;
use cubescene_render::{RenderError, Renderer, SurfaceSize};
use cubescene_scene::{LightId, MeshId, PerspectiveCamera, Scene, SceneConfig};

/// A running scene: renderer, camera, one light and one spinning cube.
///
/// Constructed once by [`Application::initialize`] and then driven by the
/// host's event loop, which forwards resize and frame callbacks to
/// [`resize`](Self::resize) and [`render_frame`](Self::render_frame).
pub struct Application<H: Host, R: Renderer> {
    host: H,
    renderer: R,
    scene: Scene,
    camera: PerspectiveCamera,
    light: LightId,
    cube: MeshId,
}

impl<H: Host, R: Renderer> Application<H, R> {
    /// Build the scene, size everything to the viewport and request the
    /// first frame.
    ///
    /// `make_renderer` receives the host and its current logical size and
    /// returns a renderer bound to the host's drawable surface.
    pub fn initialize<F>(host: H, config: &SceneConfig, make_renderer: F) -> Result<Self, AppError>
    where
        F: FnOnce(&H, SurfaceSize) -> Result<R, RenderError>,
    {
        config.validate()?;

        let size = host.client_size();
        let mut renderer = make_renderer(&host, size)?;
        renderer.set_pixel_ratio(host.device_pixel_ratio());

        let mut scene = Scene::new();
        scene.background = config.background;

        let camera = setup_camera(config, size);
        let light = setup_light(&mut scene, config);
        let cube = setup_model(&mut scene, config);

        let mut app = Self {
            host,
            renderer,
            scene,
            camera,
            light,
            cube,
        };
        app.resize();
        app.host.request_animation_frame();

        tracing::info!(
            width = size.width,
            height = size.height,
            pixel_ratio = app.renderer.pixel_ratio(),
            "scene initialized"
        );
        Ok(app)
    }

    /// Match camera aspect and renderer size to the current viewport.
    ///
    /// The backing buffer takes the host's physical size as reported, not
    /// the logical size scaled back up.
    ///
    /// A zero-height viewport gives a non-finite aspect; the frame looks
    /// wrong but nothing panics.
    pub fn resize(&mut self) {
        let size = self.host.client_size();
        self.camera.aspect = size.aspect();
        self.camera.update_projection_matrix();
        self.renderer.set_size(size.width, size.height);
        let physical = self.host.physical_size();
        self.renderer.set_drawing_buffer_size(physical);
        tracing::debug!(
            width = size.width,
            height = size.height,
            physical_width = physical.width,
            physical_height = physical.height,
            aspect = self.camera.aspect,
            "viewport resized"
        );
    }

    /// Re-read the host's pixel ratio, then resize.
    pub fn refresh_pixel_ratio(&mut self) {
        let ratio = self.host.device_pixel_ratio();
        self.renderer.set_pixel_ratio(ratio);
        tracing::debug!(pixel_ratio = ratio, "pixel ratio changed");
        self.resize();
    }

    /// One display frame: render, advance the animation, schedule the next
    /// frame.
    ///
    /// A failed render is logged and returned; the animation still advances
    /// and the next frame is still requested.
    pub fn render_frame(&mut self, elapsed_ms: f64) -> Result<R::Output, RenderError> {
        let output = self.renderer.render(&self.scene, &self.camera);
        if let Err(e) = &output {
            tracing::error!("render failed: {e}");
        }
        self.update(elapsed_ms);
        self.host.request_animation_frame();
        tracing::trace!(elapsed_ms, "frame done");
        output
    }

    /// Set the cube's X and Y rotation to the elapsed time in seconds.
    pub fn update(&mut self, elapsed_ms: f64) {
        let seconds = (elapsed_ms * 0.001) as f32;
        if let Some(cube) = self.scene.mesh_mut(self.cube) {
            cube.transform.rotation.x = seconds;
            cube.transform.rotation.y = seconds;
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn light(&self) -> LightId {
        self.light
    }

    pub fn cube(&self) -> MeshId {
        self.cube
    }
}

fn setup_camera(config: &SceneConfig, size: SurfaceSize) -> PerspectiveCamera {
    config.build_camera(size.aspect())
}

fn setup_light(scene: &mut Scene, config: &SceneConfig) -> LightId {
    scene.add_light(config.build_light())
}

fn setup_model(scene: &mut Scene, config: &SceneConfig) -> MeshId {
    scene.add_mesh(config.build_cube())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HeadlessHost;
    use cubescene_render::DebugTextRenderer;
    use glam::Vec3;

    type TestApp = Application<HeadlessHost, DebugTextRenderer>;

    fn app(width: u32, height: u32) -> TestApp {
        Application::initialize(
            HeadlessHost::new(width, height),
            &SceneConfig::default(),
            |_, _| Ok(DebugTextRenderer::new()),
        )
        .unwrap()
    }

    fn rotation(app: &TestApp) -> Vec3 {
        app.scene().mesh(app.cube()).unwrap().transform.rotation
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    /// Renderer whose every frame fails.
    #[derive(Default)]
    struct BrokenRenderer {
        size: SurfaceSize,
        buffer: SurfaceSize,
    }

    impl Renderer for BrokenRenderer {
        type Output = ();

        fn set_pixel_ratio(&mut self, _ratio: f64) {}

        fn pixel_ratio(&self) -> f64 {
            1.0
        }

        fn set_size(&mut self, width: u32, height: u32) {
            self.size = SurfaceSize::new(width, height);
        }

        fn size(&self) -> SurfaceSize {
            self.size
        }

        fn set_drawing_buffer_size(&mut self, size: SurfaceSize) {
            self.buffer = size;
        }

        fn drawing_buffer_size(&self) -> SurfaceSize {
            self.buffer
        }

        fn render(&mut self, _: &Scene, _: &PerspectiveCamera) -> Result<(), RenderError> {
            Err(RenderError::Frame("surface lost".into()))
        }
    }

    #[test]
    fn initialize_builds_one_light_and_one_mesh() {
        let app = app(800, 600);
        assert_eq!(app.scene().light_count(), 1);
        assert_eq!(app.scene().mesh_count(), 1);
        assert!(app.scene().light(app.light()).is_some());
        assert_eq!(
            app.scene().mesh(app.cube()).unwrap().material.color.to_hex(),
            0x44aa88
        );
    }

    #[test]
    fn initialize_sizes_and_schedules_first_frame() {
        let app = app(800, 600);
        assert_eq!(app.renderer().size(), SurfaceSize::new(800, 600));
        assert!(approx(app.camera().aspect, 800.0 / 600.0));
        assert_eq!(app.host().frames_requested(), 1);
    }

    #[test]
    fn initialize_applies_pixel_ratio() {
        let app = Application::initialize(
            HeadlessHost::new(400, 300).with_pixel_ratio(2.0),
            &SceneConfig::default(),
            |_, _| Ok(DebugTextRenderer::new()),
        )
        .unwrap();
        assert_eq!(app.renderer().pixel_ratio(), 2.0);
        assert_eq!(app.renderer().drawing_buffer_size(), SurfaceSize::new(800, 600));
    }

    #[test]
    fn initialize_passes_viewport_to_renderer_factory() {
        let mut seen = None;
        let _app = Application::initialize(
            HeadlessHost::new(320, 240),
            &SceneConfig::default(),
            |_, size| {
                seen = Some(size);
                Ok(DebugTextRenderer::new())
            },
        )
        .unwrap();
        assert_eq!(seen, Some(SurfaceSize::new(320, 240)));
    }

    #[test]
    fn initialize_propagates_renderer_failure() {
        let result: Result<TestApp, _> = Application::initialize(
            HeadlessHost::new(800, 600),
            &SceneConfig::default(),
            |_, _| Err(RenderError::NoAdapter),
        );
        assert!(matches!(result, Err(AppError::Renderer(RenderError::NoAdapter))));
    }

    #[test]
    fn initialize_rejects_invalid_config() {
        let mut config = SceneConfig::default();
        config.camera.near = 0.0;
        let result: Result<TestApp, _> = Application::initialize(
            HeadlessHost::new(800, 600),
            &config,
            |_, _| Ok(DebugTextRenderer::new()),
        );
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn resize_sets_aspect_from_viewport() {
        let mut app = app(100, 100);
        app.host().set_client_size(800, 600);
        app.resize();
        assert!(approx(app.camera().aspect, 4.0 / 3.0));
    }

    #[test]
    fn resize_recomputes_projection() {
        let mut app = app(800, 600);
        let before = app.camera().projection_matrix();
        app.host().set_client_size(1000, 500);
        app.resize();
        assert_ne!(app.camera().projection_matrix(), before);
        let expected = PerspectiveCamera::new(75.0, 2.0, 0.1, 100.0).projection_matrix();
        assert!(app.camera().projection_matrix().abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn second_resize_wins() {
        let mut app = app(800, 600);
        app.host().set_client_size(1024, 768);
        app.resize();
        app.host().set_client_size(640, 360);
        app.resize();
        assert_eq!(app.renderer().size(), SurfaceSize::new(640, 360));
    }

    #[test]
    fn zero_height_resize_does_not_panic() {
        let mut app = app(800, 600);
        app.host().set_client_size(800, 0);
        app.resize();
        assert!(!app.camera().aspect.is_finite());
        assert_eq!(app.renderer().size(), SurfaceSize::new(800, 0));
        assert!(app.render_frame(0.0).is_ok());
    }

    #[test]
    fn update_sets_rotation_from_elapsed_time() {
        let mut app = app(800, 600);
        app.update(2000.0);
        let r = rotation(&app);
        assert!(approx(r.x, 2.0) && approx(r.y, 2.0));
        assert_eq!(r.z, 0.0);
    }

    #[test]
    fn update_is_absolute_not_cumulative() {
        let mut app = app(800, 600);
        app.update(5000.0);
        app.update(500.0);
        let r = rotation(&app);
        assert!(approx(r.x, 0.5) && approx(r.y, 0.5));
    }

    #[test]
    fn frame_loop_rotation_sequence() {
        let mut app = app(800, 600);
        for (elapsed, expected) in [(0.0, 0.0), (16.0, 0.016), (1000.0, 1.0)] {
            app.render_frame(elapsed).unwrap();
            let r = rotation(&app);
            assert!(approx(r.x, expected), "x at {elapsed}ms was {}", r.x);
            assert!(approx(r.y, expected), "y at {elapsed}ms was {}", r.y);
        }
    }

    #[test]
    fn render_happens_before_update() {
        let mut app = app(800, 600);
        let first = app.render_frame(1000.0).unwrap();
        assert!(first.contains("rot=(0.000, 0.000, 0.000)"));
        let second = app.render_frame(2000.0).unwrap();
        assert!(second.contains("rot=(1.000, 1.000, 0.000)"));
    }

    #[test]
    fn each_frame_requests_the_next() {
        let mut app = app(800, 600);
        assert!(app.host().take_frame_request());
        for i in 0..5 {
            app.render_frame(i as f64 * 16.0).unwrap();
            assert!(app.host().take_frame_request());
        }
        assert_eq!(app.host().frames_requested(), 6);
        assert_eq!(app.renderer().frames_rendered(), 5);
    }

    #[test]
    fn resize_mid_run_is_used_by_next_frame() {
        let mut app = app(800, 600);
        app.render_frame(0.0).unwrap();

        app.host().set_client_size(400, 300);
        app.resize();
        let frame = app.render_frame(16.0).unwrap();

        assert!(approx(app.camera().aspect, 4.0 / 3.0));
        assert_eq!(app.renderer().size(), SurfaceSize::new(400, 300));
        assert!(frame.contains("surface=400x300"));
        assert!(frame.contains("aspect=1.333"));
    }

    #[test]
    fn refresh_pixel_ratio_updates_renderer() {
        let mut app = app(800, 600);
        app.host().set_device_pixel_ratio(1.25);
        app.refresh_pixel_ratio();
        assert_eq!(app.renderer().pixel_ratio(), 1.25);
        assert_eq!(app.renderer().drawing_buffer_size(), SurfaceSize::new(1000, 750));
    }

    #[test]
    fn drawing_buffer_uses_host_physical_size() {
        let host = HeadlessHost::new(1094, 800).with_pixel_ratio(1.25);
        host.set_physical_size(1367, 1000);
        let mut app = Application::initialize(host, &SceneConfig::default(), |_, _| {
            Ok(DebugTextRenderer::new())
        })
        .unwrap();
        assert_eq!(app.renderer().size(), SurfaceSize::new(1094, 800));
        assert_eq!(app.renderer().drawing_buffer_size(), SurfaceSize::new(1367, 1000));

        app.host().set_client_size(1093, 800);
        app.host().set_physical_size(1366, 1000);
        app.resize();
        let frame = app.render_frame(0.0).unwrap();
        assert!(frame.contains("buffer=1366x1000"));
    }

    #[test]
    fn failed_render_still_updates_and_reschedules() {
        let mut app = Application::initialize(
            HeadlessHost::new(800, 600),
            &SceneConfig::default(),
            |_, _| Ok(BrokenRenderer::default()),
        )
        .unwrap();
        assert!(app.render_frame(3000.0).is_err());
        let r = app.scene().mesh(app.cube()).unwrap().transform.rotation;
        assert!(approx(r.x, 3.0));
        assert_eq!(app.host().frames_requested(), 2);
    }
}
