use std::sync::Arc;

use anyhow::{ensure, Context, Result};
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::{Window, WindowId};

use crate::camera::CameraSnapshot;
use crate::lighting::MAX_POINT_LIGHTS;
use crate::mesh::{MeshBuffers, MeshData};
use crate::program::{ShaderProgram, UniformLayout, UniformSink};
use crate::render::passes::{
    depth_stencil_for, PassSequence, PassStage, DEPTH_STENCIL_FORMAT, STENCIL_REFERENCE,
};
use crate::render::shaders::{MARKER_SHADER, OUTLINE_SHADER, SCENE_SHADER};
use crate::scene::Scene;

/// The projection is fixed: field of view comes from the camera, everything
/// else is a constant of the viewer.
const ASPECT_RATIO: f32 = 1920.0 / 1080.0;
const NEAR_PLANE: f32 = 0.1;
const FAR_PLANE: f32 = 100.0;

/// GPU renderer backed by wgpu that draws the scene with a stencil-outlined
/// primary object and a marker at each point light.
pub struct Renderer {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_stencil: DepthStencilBuffer,
    scene_program: ShaderProgram,
    outline_program: ShaderProgram,
    marker_program: ShaderProgram,
    marker_layout: wgpu::BindGroupLayout,
    object_mesh: MeshBuffers,
    marker_mesh: MeshBuffers,
}

impl Renderer {
    /// Initializes the GPU renderer for the provided window and scene.
    pub async fn new(window: Arc<Window>, scene: &Scene) -> Result<Self> {
        ensure!(
            scene.lights.points.len() == MAX_POINT_LIGHTS,
            "the shading program is compiled for exactly {MAX_POINT_LIGHTS} point lights"
        );

        let size = window.inner_size();
        ensure!(size.width > 0 && size.height > 0, "window has zero area");

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            flags: wgpu::InstanceFlags::default(),
            memory_budget_thresholds: Default::default(),
            backend_options: Default::default(),
        });
        let surface = instance.create_surface(Arc::clone(&window))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to acquire GPU adapter")?;

        let device_descriptor = wgpu::DeviceDescriptor {
            label: Some("viewer-device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            experimental_features: Default::default(),
            memory_hints: Default::default(),
            trace: Default::default(),
        };
        let (device, queue) = adapter
            .request_device(&device_descriptor)
            .await
            .context("failed to create GPU device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|format| format.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: surface_caps
                .present_modes
                .iter()
                .copied()
                .find(|mode| {
                    matches!(
                        mode,
                        wgpu::PresentMode::Mailbox | wgpu::PresentMode::Immediate
                    )
                })
                .unwrap_or(wgpu::PresentMode::Fifo),
            desired_maximum_frame_latency: 2,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let depth_stencil = DepthStencilBuffer::create(&device, config.width, config.height);

        let mut scene_layout = UniformLayout::builder();
        scene_layout
            .mat4("view")
            .mat4("projection")
            .mat4("model")
            .vec3("objectColor")
            .vec3("viewPos")
            .float("material.shininess");
        scene.lights.register(&mut scene_layout);
        let scene_program = ShaderProgram::new(
            &device,
            "scene",
            SCENE_SHADER,
            scene_layout.build(),
            surface_format,
            depth_stencil_for(PassStage::PrimaryDraw).expect("primary stage draws"),
            &[],
        );

        let mut outline_layout = UniformLayout::builder();
        outline_layout
            .mat4("view")
            .mat4("projection")
            .mat4("model")
            .vec3("outlineColor");
        let outline_program = ShaderProgram::new(
            &device,
            "outline",
            OUTLINE_SHADER,
            outline_layout.build(),
            surface_format,
            depth_stencil_for(PassStage::OutlineDraw).expect("outline stage draws"),
            &[],
        );

        // Per-marker model matrices live in their own bind group so each
        // light marker can be drawn with a distinct transform in one pass.
        let marker_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("marker-bind-layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: Some(
                        std::num::NonZeroU64::new(std::mem::size_of::<MarkerConstants>() as u64)
                            .unwrap(),
                    ),
                },
                count: None,
            }],
        });

        let mut marker_globals = UniformLayout::builder();
        marker_globals.mat4("view").mat4("projection").vec3("lightColor");
        let marker_program = ShaderProgram::new(
            &device,
            "marker",
            MARKER_SHADER,
            marker_globals.build(),
            surface_format,
            depth_stencil_for(PassStage::LightMarkers).expect("marker stage draws"),
            &[&marker_layout],
        );

        let object_mesh = MeshBuffers::from_data(&device, &MeshData::unit_cube(), "object");
        let marker_mesh = MeshBuffers::from_data(&device, &MeshData::light_marker(), "marker");

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            depth_stencil,
            scene_program,
            outline_program,
            marker_program,
            marker_layout,
            object_mesh,
            marker_mesh,
        })
    }

    /// Returns the identifier of the window owned by the renderer.
    pub fn window_id(&self) -> WindowId {
        self.window.id()
    }

    /// Exposes the inner window for event handling.
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Resizes the swap chain and depth/stencil buffer. The projection's
    /// aspect ratio is deliberately left untouched.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        self.depth_stencil =
            DepthStencilBuffer::create(&self.device, new_size.width, new_size.height);
    }

    /// Draws one frame: primary object, stencil-masked outline, then the
    /// light markers, in the fixed stage order.
    pub fn render(
        &mut self,
        scene: &Scene,
        camera: &CameraSnapshot,
    ) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("viewer-encoder"),
            });

        let view_matrix = camera.view();
        let projection =
            Mat4::perspective_rh(camera.fov_deg.to_radians(), ASPECT_RATIO, NEAR_PLANE, FAR_PLANE);

        self.scene_program.set_mat4("view", view_matrix);
        self.scene_program.set_mat4("projection", projection);
        self.scene_program.set_mat4("model", scene.object.placement);
        self.scene_program.set_vec3("objectColor", scene.object.color);
        self.scene_program.set_vec3("viewPos", camera.position);
        self.scene_program
            .set_float("material.shininess", scene.object.shininess);
        scene.lights.upload(&mut self.scene_program, camera);
        self.scene_program.flush(&self.queue);

        let enlarged = scene.object.placement
            * Mat4::from_scale(Vec3::splat(1.0 + scene.outline.thickness));
        self.outline_program.set_mat4("view", view_matrix);
        self.outline_program.set_mat4("projection", projection);
        self.outline_program.set_mat4("model", enlarged);
        self.outline_program.set_vec3("outlineColor", scene.outline.color);
        self.outline_program.flush(&self.queue);

        self.marker_program.set_mat4("view", view_matrix);
        self.marker_program.set_mat4("projection", projection);
        self.marker_program.set_vec3("lightColor", Vec3::ONE);
        self.marker_program.flush(&self.queue);

        let marker_binds: Vec<wgpu::BindGroup> = scene
            .lights
            .points
            .iter()
            .map(|light| self.marker_bind_group(light.position))
            .collect();

        let mut sequence = PassSequence::new();

        sequence.enter(PassStage::Clear).expect("pass order");
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("frame-pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: f64::from(scene.clear_color.x),
                        g: f64::from(scene.clear_color.y),
                        b: f64::from(scene.clear_color.z),
                        a: 1.0,
                    }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_stencil.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(0),
                    store: wgpu::StoreOp::Store,
                }),
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_stencil_reference(STENCIL_REFERENCE);

        sequence.enter(PassStage::PrimaryDraw).expect("pass order");
        self.scene_program.bind(&mut pass);
        self.object_mesh.draw(&mut pass);

        sequence.enter(PassStage::OutlineMask).expect("pass order");
        sequence.enter(PassStage::OutlineDraw).expect("pass order");
        self.outline_program.bind(&mut pass);
        self.object_mesh.draw(&mut pass);

        sequence.enter(PassStage::Restore).expect("pass order");

        sequence.enter(PassStage::LightMarkers).expect("pass order");
        self.marker_program.bind(&mut pass);
        for bind_group in &marker_binds {
            pass.set_bind_group(1, bind_group, &[]);
            self.marker_mesh.draw(&mut pass);
        }

        drop(pass); // explicit to satisfy lifetimes on some backends
        self.queue.submit(std::iter::once(encoder.finish()));

        sequence.enter(PassStage::Present).expect("pass order");
        output.present();
        debug_assert!(sequence.is_complete());
        Ok(())
    }

    fn marker_bind_group(&self, position: Vec3) -> wgpu::BindGroup {
        let constants = MarkerConstants {
            model: Mat4::from_translation(position).to_cols_array_2d(),
        };
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("marker-constants"),
                contents: bytemuck::bytes_of(&constants),
                usage: wgpu::BufferUsages::UNIFORM,
            });
        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("marker-bind-group"),
            layout: &self.marker_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        })
    }
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct MarkerConstants {
    model: [[f32; 4]; 4],
}

struct DepthStencilBuffer {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl DepthStencilBuffer {
    fn create(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth-stencil-texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_STENCIL_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}
