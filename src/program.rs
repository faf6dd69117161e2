use std::collections::HashMap;

use glam::{Mat4, Vec3};
use log::debug;
use wgpu::util::DeviceExt;

use crate::mesh;

/// Value shapes a program accepts for a named uniform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformKind {
    Float,
    Vec3,
    Mat4,
}

impl UniformKind {
    /// Bytes the slot occupies in the uniform block. Scalars and three
    /// component vectors each take a full 16-byte slot so every offset is
    /// aligned the way WGSL uniform address space expects; the shader-side
    /// struct mirrors this with `vec4` fields.
    fn slot_size(self) -> usize {
        match self {
            UniformKind::Float | UniformKind::Vec3 => 16,
            UniformKind::Mat4 => 64,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    offset: usize,
    kind: UniformKind,
}

/// Maps dot/bracket uniform paths (`pointLights[1].diffuse`) to byte slots
/// in a single uniform block. Slot order follows registration order and
/// must match the field order of the program's WGSL globals struct.
#[derive(Debug, Clone)]
pub struct UniformLayout {
    slots: HashMap<String, Slot>,
    size: usize,
}

impl UniformLayout {
    pub fn builder() -> UniformLayoutBuilder {
        UniformLayoutBuilder::default()
    }

    /// Total block size in bytes (always a multiple of 16).
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }
}

#[derive(Debug, Default)]
pub struct UniformLayoutBuilder {
    slots: HashMap<String, Slot>,
    cursor: usize,
}

impl UniformLayoutBuilder {
    pub fn float(&mut self, name: impl Into<String>) -> &mut Self {
        self.register(name.into(), UniformKind::Float)
    }

    pub fn vec3(&mut self, name: impl Into<String>) -> &mut Self {
        self.register(name.into(), UniformKind::Vec3)
    }

    pub fn mat4(&mut self, name: impl Into<String>) -> &mut Self {
        self.register(name.into(), UniformKind::Mat4)
    }

    fn register(&mut self, name: String, kind: UniformKind) -> &mut Self {
        let slot = Slot {
            offset: self.cursor,
            kind,
        };
        self.cursor += kind.slot_size();
        let previous = self.slots.insert(name, slot);
        debug_assert!(previous.is_none(), "uniform name registered twice");
        self
    }

    pub fn build(self) -> UniformLayout {
        UniformLayout {
            slots: self.slots,
            size: self.cursor,
        }
    }
}

/// Anything that accepts named uniform uploads. Implemented by the CPU-side
/// [`UniformStore`] and by [`ShaderProgram`], so code that fills uniforms
/// (the lighting rig in particular) can be exercised without a GPU.
pub trait UniformSink {
    fn set_float(&mut self, name: &str, value: f32);
    fn set_vec3(&mut self, name: &str, value: Vec3);
    fn set_mat4(&mut self, name: &str, value: Mat4);
}

/// CPU staging block for one program's uniforms.
///
/// Unknown names and kind mismatches are ignored, matching the loose
/// contract of GL-style named uniforms, but each miss is logged at debug
/// level so typos are discoverable.
#[derive(Debug)]
pub struct UniformStore {
    layout: UniformLayout,
    data: Vec<u8>,
}

impl UniformStore {
    pub fn new(layout: UniformLayout) -> Self {
        let data = vec![0u8; layout.size()];
        Self { layout, data }
    }

    pub fn layout(&self) -> &UniformLayout {
        &self.layout
    }

    /// Raw block contents, ready for `queue.write_buffer`.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Reads back a scalar slot; `None` if the name is absent or not a
    /// float. Used by tests and diagnostics.
    pub fn float(&self, name: &str) -> Option<f32> {
        let slot = self.slot(name, UniformKind::Float)?;
        Some(self.read_f32(slot.offset))
    }

    /// Reads back a vector slot; `None` if the name is absent or not a vec3.
    pub fn vec3(&self, name: &str) -> Option<Vec3> {
        let slot = self.slot(name, UniformKind::Vec3)?;
        Some(Vec3::new(
            self.read_f32(slot.offset),
            self.read_f32(slot.offset + 4),
            self.read_f32(slot.offset + 8),
        ))
    }

    fn read_f32(&self, offset: usize) -> f32 {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&self.data[offset..offset + 4]);
        f32::from_le_bytes(raw)
    }

    fn slot(&self, name: &str, kind: UniformKind) -> Option<Slot> {
        match self.layout.slots.get(name) {
            Some(slot) if slot.kind == kind => Some(*slot),
            _ => None,
        }
    }

    fn write(&mut self, name: &str, kind: UniformKind, bytes: &[u8]) {
        match self.layout.slots.get(name) {
            Some(slot) if slot.kind == kind => {
                let offset = slot.offset;
                self.data[offset..offset + bytes.len()].copy_from_slice(bytes);
            }
            Some(slot) => {
                debug!(
                    "uniform {name} holds {:?}, ignoring {kind:?} upload",
                    slot.kind
                );
            }
            None => debug!("uniform {name} is not part of this program, ignoring"),
        }
    }
}

impl UniformSink for UniformStore {
    fn set_float(&mut self, name: &str, value: f32) {
        self.write(name, UniformKind::Float, &value.to_le_bytes());
    }

    fn set_vec3(&mut self, name: &str, value: Vec3) {
        let raw = value.to_array();
        self.write(name, UniformKind::Vec3, bytemuck::cast_slice(&raw));
    }

    fn set_mat4(&mut self, name: &str, value: Mat4) {
        let raw = value.to_cols_array();
        self.write(name, UniformKind::Mat4, bytemuck::cast_slice(&raw));
    }
}

/// A compiled pipeline plus its named-uniform block.
///
/// `set_*` calls stage values CPU-side; `flush` uploads the block once per
/// frame; `bind` activates the pipeline and globals for subsequent draws.
pub struct ShaderProgram {
    store: UniformStore,
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    pipeline: wgpu::RenderPipeline,
}

impl ShaderProgram {
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        source: &str,
        layout: UniformLayout,
        surface_format: wgpu::TextureFormat,
        depth_stencil: wgpu::DepthStencilState,
        extra_layouts: &[&wgpu::BindGroupLayout],
    ) -> Self {
        let store = UniformStore::new(layout);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&format!("{label}-globals-layout")),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: Some(
                        std::num::NonZeroU64::new(store.layout().size() as u64).unwrap(),
                    ),
                },
                count: None,
            }],
        });

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-globals")),
            contents: store.bytes(),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label}-globals-bind")),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });

        let mut bind_layouts = vec![&globals_layout];
        bind_layouts.extend_from_slice(extra_layouts);
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{label}-pipeline-layout")),
            bind_group_layouts: &bind_layouts,
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("{label}-pipeline")),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[mesh::vertex_layout()],
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                ..Default::default()
            },
            depth_stencil: Some(depth_stencil),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            multiview: None,
            cache: None,
        });

        Self {
            store,
            buffer,
            bind_group,
            pipeline,
        }
    }

    /// Uploads the staged uniform block to the GPU.
    pub fn flush(&self, queue: &wgpu::Queue) {
        queue.write_buffer(&self.buffer, 0, self.store.bytes());
    }

    /// Activates this program for subsequent draw calls on the pass.
    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
    }
}

impl UniformSink for ShaderProgram {
    fn set_float(&mut self, name: &str, value: f32) {
        self.store.set_float(name, value);
    }

    fn set_vec3(&mut self, name: &str, value: Vec3) {
        self.store.set_vec3(name, value);
    }

    fn set_mat4(&mut self, name: &str, value: Mat4) {
        self.store.set_mat4(name, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_layout() -> UniformLayout {
        let mut builder = UniformLayout::builder();
        builder
            .mat4("view")
            .mat4("projection")
            .vec3("objectColor")
            .float("material.shininess");
        builder.build()
    }

    #[test]
    fn slots_are_assigned_in_registration_order() {
        let layout = sample_layout();
        assert_eq!(layout.size(), 64 + 64 + 16 + 16);
        assert!(layout.contains("view"));
        assert!(layout.contains("material.shininess"));
        assert!(!layout.contains("model"));
    }

    #[test]
    fn values_round_trip_through_the_store() {
        let mut store = UniformStore::new(sample_layout());
        store.set_vec3("objectColor", Vec3::new(1.0, 0.5, 0.31));
        store.set_float("material.shininess", 32.0);
        assert_eq!(store.vec3("objectColor"), Some(Vec3::new(1.0, 0.5, 0.31)));
        assert_eq!(store.float("material.shininess"), Some(32.0));
    }

    #[test]
    fn mat4_lands_at_its_slot_offset() {
        let mut store = UniformStore::new(sample_layout());
        store.set_mat4("projection", Mat4::from_scale(Vec3::splat(2.0)));
        let mut first = [0u8; 4];
        first.copy_from_slice(&store.bytes()[64..68]);
        assert_eq!(f32::from_le_bytes(first), 2.0);
        // The neighboring view slot is untouched.
        assert!(store.bytes()[0..64].iter().all(|byte| *byte == 0));
    }

    #[test]
    fn unknown_names_are_ignored_without_error() {
        let mut store = UniformStore::new(sample_layout());
        store.set_vec3("pointLights[7].position", Vec3::ONE);
        assert!(store.bytes().iter().all(|byte| *byte == 0));
        assert_eq!(store.vec3("pointLights[7].position"), None);
    }

    #[test]
    fn kind_mismatch_is_ignored() {
        let mut store = UniformStore::new(sample_layout());
        store.set_float("objectColor", 3.0);
        assert_eq!(store.vec3("objectColor"), Some(Vec3::ZERO));
        assert_eq!(store.float("objectColor"), None);
    }
}
