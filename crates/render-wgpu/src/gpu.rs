use crate::shaders;
use bytemuck::{Pod, Zeroable};
use cubescene_render::{RenderError, Renderer, SurfaceSize};
use cubescene_scene::{DirectionalLight, Mesh, PerspectiveCamera, Scene};
use wgpu::util::DeviceExt;

/// Directional lights beyond this count are ignored.
pub const MAX_LIGHTS: usize = 4;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct GpuLight {
    /// Unit vector toward the light; `w` unused.
    direction: [f32; 4],
    /// Linear color premultiplied by intensity; `w` unused.
    color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    camera_position: [f32; 4],
    light_count: [u32; 4],
    lights: [GpuLight; MAX_LIGHTS],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct InstanceData {
    model_0: [f32; 4],
    model_1: [f32; 4],
    model_2: [f32; 4],
    model_3: [f32; 4],
    color: [f32; 4],
    /// Linear specular color; `w` is shininess.
    specular: [f32; 4],
}

/// Construction options for [`WgpuRenderer`].
#[derive(Debug, Clone, Copy)]
pub struct RendererOptions {
    /// Render with 4x MSAA.
    pub antialias: bool,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self { antialias: true }
    }
}

impl RendererOptions {
    fn sample_count(self) -> u32 {
        if self.antialias { 4 } else { 1 }
    }
}

/// Generate unit cube vertices and indices.
fn cube_mesh() -> (Vec<Vertex>, Vec<u16>) {
    let p = 0.5_f32;
    #[rustfmt::skip]
    let vertices = vec![
        // +Z face
        Vertex { position: [-p, -p,  p], normal: [0.0, 0.0, 1.0] },
        Vertex { position: [ p, -p,  p], normal: [0.0, 0.0, 1.0] },
        Vertex { position: [ p,  p,  p], normal: [0.0, 0.0, 1.0] },
        Vertex { position: [-p,  p,  p], normal: [0.0, 0.0, 1.0] },
        // -Z face
        Vertex { position: [ p, -p, -p], normal: [0.0, 0.0, -1.0] },
        Vertex { position: [-p, -p, -p], normal: [0.0, 0.0, -1.0] },
        Vertex { position: [-p,  p, -p], normal: [0.0, 0.0, -1.0] },
        Vertex { position: [ p,  p, -p], normal: [0.0, 0.0, -1.0] },
        // +X face
        Vertex { position: [ p, -p,  p], normal: [1.0, 0.0, 0.0] },
        Vertex { position: [ p, -p, -p], normal: [1.0, 0.0, 0.0] },
        Vertex { position: [ p,  p, -p], normal: [1.0, 0.0, 0.0] },
        Vertex { position: [ p,  p,  p], normal: [1.0, 0.0, 0.0] },
        // -X face
        Vertex { position: [-p, -p, -p], normal: [-1.0, 0.0, 0.0] },
        Vertex { position: [-p, -p,  p], normal: [-1.0, 0.0, 0.0] },
        Vertex { position: [-p,  p,  p], normal: [-1.0, 0.0, 0.0] },
        Vertex { position: [-p,  p, -p], normal: [-1.0, 0.0, 0.0] },
        // +Y face
        Vertex { position: [-p,  p,  p], normal: [0.0, 1.0, 0.0] },
        Vertex { position: [ p,  p,  p], normal: [0.0, 1.0, 0.0] },
        Vertex { position: [ p,  p, -p], normal: [0.0, 1.0, 0.0] },
        Vertex { position: [-p,  p, -p], normal: [0.0, 1.0, 0.0] },
        // -Y face
        Vertex { position: [-p, -p, -p], normal: [0.0, -1.0, 0.0] },
        Vertex { position: [ p, -p, -p], normal: [0.0, -1.0, 0.0] },
        Vertex { position: [ p, -p,  p], normal: [0.0, -1.0, 0.0] },
        Vertex { position: [-p, -p,  p], normal: [0.0, -1.0, 0.0] },
    ];
    #[rustfmt::skip]
    let indices: Vec<u16> = vec![
        0,1,2, 2,3,0,       // +Z
        4,5,6, 6,7,4,       // -Z
        8,9,10, 10,11,8,    // +X
        12,13,14, 14,15,12, // -X
        16,17,18, 18,19,16, // +Y
        20,21,22, 22,23,20, // -Y
    ];
    (vertices, indices)
}

fn uniforms_for(scene: &Scene, camera: &PerspectiveCamera) -> Uniforms {
    let mut lights = [GpuLight::zeroed(); MAX_LIGHTS];
    let count = scene.light_count().min(MAX_LIGHTS);
    for (slot, light) in lights.iter_mut().zip(scene.lights()) {
        *slot = gpu_light(light);
    }
    let eye = camera.position;
    Uniforms {
        view_proj: camera.view_projection().to_cols_array_2d(),
        camera_position: [eye.x, eye.y, eye.z, 1.0],
        light_count: [count as u32, 0, 0, 0],
        lights,
    }
}

fn gpu_light(light: &DirectionalLight) -> GpuLight {
    let dir = light.direction();
    let [r, g, b, _] = light.color.to_linear_rgba();
    let i = light.intensity;
    GpuLight {
        direction: [dir.x, dir.y, dir.z, 0.0],
        color: [r * i, g * i, b * i, 1.0],
    }
}

fn instance_for(mesh: &Mesh) -> InstanceData {
    let cols = mesh.model_matrix().to_cols_array_2d();
    let [sr, sg, sb, _] = mesh.material.specular.to_linear_rgba();
    InstanceData {
        model_0: cols[0],
        model_1: cols[1],
        model_2: cols[2],
        model_3: cols[3],
        color: mesh.material.color.to_linear_rgba(),
        specular: [sr, sg, sb, mesh.material.shininess],
    }
}

/// wgpu renderer that owns its window surface.
pub struct WgpuRenderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: SurfaceSize,
    pixel_ratio: f64,
    sample_count: u32,
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    cube_vertex_buffer: wgpu::Buffer,
    cube_index_buffer: wgpu::Buffer,
    cube_index_count: u32,
    instance_buffer: wgpu::Buffer,
    max_instances: u32,
    depth_texture: wgpu::TextureView,
    msaa_texture: Option<wgpu::TextureView>,
}

impl WgpuRenderer {
    /// Create a renderer drawing into `target` (typically a window) whose
    /// backing size is `physical` pixels.
    ///
    /// Blocks until the adapter and device are ready.
    pub fn new(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        physical: SurfaceSize,
        options: RendererOptions,
    ) -> Result<Self, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(target)
            .map_err(|e| RenderError::Surface(e.to_string()))?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or(RenderError::NoAdapter)?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("cubescene_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .map_err(|e| RenderError::Device(e.to_string()))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| RenderError::Surface("surface reports no formats".into()))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let physical = buffer_extent(physical);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: physical.width,
            height: physical.height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let sample_count = options.sample_count();

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniform_buffer"),
            contents: bytemuck::bytes_of(&Uniforms::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("phong_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::PHONG_SHADER.into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("phong_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<Vertex>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![
                            0 => Float32x3,
                            1 => Float32x3,
                        ],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<InstanceData>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![
                            2 => Float32x4,
                            3 => Float32x4,
                            4 => Float32x4,
                            5 => Float32x4,
                            6 => Float32x4,
                            7 => Float32x4,
                        ],
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: sample_count,
                ..Default::default()
            },
            multiview: None,
            cache: None,
        });

        let (cube_verts, cube_indices) = cube_mesh();
        let cube_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube_vertex_buffer"),
            contents: bytemuck::cast_slice(&cube_verts),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let cube_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube_index_buffer"),
            contents: bytemuck::cast_slice(&cube_indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let cube_index_count = cube_indices.len() as u32;

        // Instance buffer (pre-allocated)
        let max_instances = 256u32;
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size: (max_instances as u64) * std::mem::size_of::<InstanceData>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let depth_texture = create_depth_texture(&device, &config, sample_count);
        let msaa_texture = create_msaa_texture(&device, &config, sample_count);

        tracing::info!(
            backend = adapter.get_info().backend.to_str(),
            format = ?surface_format,
            samples = sample_count,
            "wgpu renderer ready"
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size: physical,
            pixel_ratio: 1.0,
            sample_count,
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            cube_vertex_buffer,
            cube_index_buffer,
            cube_index_count,
            instance_buffer,
            max_instances,
            depth_texture,
            msaa_texture,
        })
    }

    /// Resize every render target to `physical` pixels.
    fn reconfigure(&mut self, physical: SurfaceSize) {
        if physical.width == self.config.width && physical.height == self.config.height {
            return;
        }
        self.config.width = physical.width;
        self.config.height = physical.height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture = create_depth_texture(&self.device, &self.config, self.sample_count);
        self.msaa_texture = create_msaa_texture(&self.device, &self.config, self.sample_count);
        tracing::debug!(
            width = physical.width,
            height = physical.height,
            "surface reconfigured"
        );
    }
}

impl Renderer for WgpuRenderer {
    type Output = ();

    fn set_pixel_ratio(&mut self, ratio: f64) {
        self.pixel_ratio = ratio;
    }

    fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.size = SurfaceSize::new(width, height);
    }

    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn set_drawing_buffer_size(&mut self, size: SurfaceSize) {
        self.reconfigure(buffer_extent(size));
    }

    fn drawing_buffer_size(&self) -> SurfaceSize {
        SurfaceSize::new(self.config.width, self.config.height)
    }

    /// Render one frame and present it.
    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<(), RenderError> {
        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(e @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                self.surface.configure(&self.device, &self.config);
                return Err(RenderError::Frame(e.to_string()));
            }
            Err(e) => return Err(RenderError::Frame(e.to_string())),
        };

        self.queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&uniforms_for(scene, camera)),
        );

        let instances: Vec<InstanceData> = scene
            .meshes()
            .iter()
            .take(self.max_instances as usize)
            .map(instance_for)
            .collect();
        if !instances.is_empty() {
            self.queue
                .write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }

        let frame_view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let (view, resolve_target) = match &self.msaa_texture {
            Some(msaa) => (msaa, Some(&frame_view)),
            None => (&frame_view, None),
        };

        let [r, g, b, _] = scene.background.to_linear_rgba();
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render_encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            if !instances.is_empty() {
                pass.set_pipeline(&self.pipeline);
                pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                pass.set_vertex_buffer(0, self.cube_vertex_buffer.slice(..));
                pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
                pass.set_index_buffer(self.cube_index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                pass.draw_indexed(0..self.cube_index_count, 0, 0..instances.len() as u32);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

/// Surface extent for a requested buffer size. wgpu rejects zero-sized surfaces.
fn buffer_extent(size: SurfaceSize) -> SurfaceSize {
    SurfaceSize::new(size.width.max(1), size.height.max(1))
}

fn create_depth_texture(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    sample_count: u32,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&Default::default())
}

fn create_msaa_texture(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    sample_count: u32,
) -> Option<wgpu::TextureView> {
    if sample_count <= 1 {
        return None;
    }
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("msaa_color_texture"),
        size: wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count,
        dimension: wgpu::TextureDimension::D2,
        format: config.format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    Some(texture.create_view(&Default::default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubescene_common::Color;
    use cubescene_scene::{BoxGeometry, PhongMaterial};
    use glam::Vec3;

    #[test]
    fn cube_mesh_shape() {
        let (vertices, indices) = cube_mesh();
        assert_eq!(vertices.len(), 24);
        assert_eq!(indices.len(), 36);
        assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
    }

    #[test]
    fn cube_normals_point_outward() {
        let (vertices, _) = cube_mesh();
        for v in &vertices {
            let n = Vec3::from(v.normal);
            assert!((n.length() - 1.0).abs() < 1e-6);
            assert!(Vec3::from(v.position).dot(n) > 0.0);
        }
    }

    #[test]
    fn cube_triangles_wind_counter_clockwise() {
        let (vertices, indices) = cube_mesh();
        for tri in indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from(vertices[i as usize].position));
            let face_normal = (b - a).cross(c - a);
            assert!(face_normal.dot(Vec3::from(vertices[tri[0] as usize].normal)) > 0.0);
        }
    }

    #[test]
    fn uniform_layout_is_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<GpuLight>(), 32);
        assert_eq!(std::mem::size_of::<Uniforms>(), 64 + 16 + 16 + 32 * MAX_LIGHTS);
        assert_eq!(std::mem::size_of::<Uniforms>() % 16, 0);
    }

    #[test]
    fn uniforms_pack_lights_up_to_limit() {
        let mut scene = Scene::new();
        for _ in 0..MAX_LIGHTS + 2 {
            scene.add_light(DirectionalLight::new(Color::WHITE, 0.5));
        }
        let uniforms = uniforms_for(&scene, &PerspectiveCamera::default());
        assert_eq!(uniforms.light_count[0] as usize, MAX_LIGHTS);
        assert!((uniforms.lights[0].color[0] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn uniforms_carry_light_direction_and_camera() {
        let mut scene = Scene::new();
        let mut light = DirectionalLight::default();
        light.position = Vec3::new(-1.0, 2.0, 4.0);
        scene.add_light(light);
        let mut camera = PerspectiveCamera::default();
        camera.position = Vec3::new(0.0, 0.0, 2.0);

        let uniforms = uniforms_for(&scene, &camera);
        let dir = Vec3::new(-1.0, 2.0, 4.0).normalize();
        assert!((uniforms.lights[0].direction[0] - dir.x).abs() < 1e-6);
        assert_eq!(uniforms.camera_position, [0.0, 0.0, 2.0, 1.0]);
        assert_eq!(uniforms.light_count[0], 1);
    }

    #[test]
    fn instance_encodes_material() {
        let mut mesh = Mesh::new(
            BoxGeometry::new(2.0, 1.0, 1.0),
            PhongMaterial::new(Color::WHITE),
        );
        mesh.transform.position = Vec3::new(1.0, 2.0, 3.0);
        let instance = instance_for(&mesh);
        assert_eq!(instance.model_0[0], 2.0);
        assert_eq!(instance.model_3, [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(instance.specular[3], 30.0);
        assert!((instance.color[0] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn buffer_extent_keeps_physical_pixels() {
        assert_eq!(
            buffer_extent(SurfaceSize::new(1367, 1000)),
            SurfaceSize::new(1367, 1000)
        );
        assert_eq!(buffer_extent(SurfaceSize::new(800, 0)), SurfaceSize::new(800, 1));
    }

    #[test]
    fn antialias_selects_sample_count() {
        assert_eq!(RendererOptions { antialias: true }.sample_count(), 4);
        assert_eq!(RendererOptions { antialias: false }.sample_count(), 1);
    }
}
