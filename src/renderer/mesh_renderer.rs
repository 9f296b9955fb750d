//! Draws the meshes of a scene with a metal/rough standard material.

use crate::camera::Camera3d;
use crate::context::Context;
use crate::light::{LightCollection, MAX_LIGHTS};
use crate::renderer::uniform_buffer::DynamicUniformBuffer;
use crate::scene::{Geometry, GeometryId, Object, Scene, StandardMaterial};
use bytemuck::{Pod, Zeroable};
use glamx::{Mat3, Mat4};
use std::collections::HashMap;
use std::num::NonZeroU64;
use std::rc::Rc;

/// GPU representation of a single point light.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Pod, Zeroable)]
struct GpuLight {
    position: [f32; 3],
    distance: f32,
    radiance: [f32; 3],
    decay: f32,
}

/// Frame-level uniforms (camera and lights).
/// Layout must match standard.wgsl Frame struct.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub(crate) struct FrameUniforms {
    view: [[f32; 4]; 4],
    proj: [[f32; 4]; 4],
    eye: [f32; 3],
    num_lights: u32,
    ambient: [f32; 3],
    _pad: f32,
    lights: [GpuLight; MAX_LIGHTS],
}

impl FrameUniforms {
    pub(crate) fn new(camera: &dyn Camera3d, lights: &LightCollection) -> Self {
        let mut gpu_lights = [GpuLight::default(); MAX_LIGHTS];
        for (gpu, light) in gpu_lights.iter_mut().zip(&lights.lights) {
            *gpu = GpuLight {
                position: light.world_position.into(),
                distance: light.distance,
                radiance: light.radiance.into(),
                decay: light.decay,
            };
        }

        Self {
            view: camera.view_matrix().to_cols_array_2d(),
            proj: camera.projection_matrix().to_cols_array_2d(),
            eye: camera.eye().into(),
            num_lights: lights.len().min(MAX_LIGHTS) as u32,
            ambient: lights.ambient.into(),
            _pad: 0.0,
            lights: gpu_lights,
        }
    }
}

/// Object-level uniforms (transform and material).
/// Layout must match standard.wgsl Object struct.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub(crate) struct ObjectUniforms {
    transform: [[f32; 4]; 4],
    ntransform: [[f32; 4]; 3], // mat3x3 padded to mat3x4
    color: [f32; 4],
    emissive: [f32; 4], // rgb + intensity
    metalness: f32,
    roughness: f32,
    _pad: [f32; 2],
}

impl ObjectUniforms {
    pub(crate) fn new(world: Mat4, material: &StandardMaterial) -> Self {
        let n = Mat3::from_mat4(world).inverse().transpose();
        let (c, e) = (material.color, material.emissive);

        Self {
            transform: world.to_cols_array_2d(),
            ntransform: [
                n.x_axis.extend(0.0).into(),
                n.y_axis.extend(0.0).into(),
                n.z_axis.extend(0.0).into(),
            ],
            color: [c.r, c.g, c.b, c.a],
            emissive: [e.r, e.g, e.b, material.emissive_intensity],
            metalness: material.metalness.clamp(0.0, 1.0),
            roughness: material.roughness.clamp(0.04, 1.0),
            _pad: [0.0; 2],
        }
    }
}

/// Vertex and index buffers of one uploaded geometry.
struct GpuMesh {
    coords: wgpu::Buffer,
    normals: wgpu::Buffer,
    indices: wgpu::Buffer,
    num_indices: u32,
    used: bool,
}

struct DrawCall {
    geometry: GeometryId,
    offset: u32,
}

/// Renderer of every `Object::Mesh` of a scene.
///
/// Geometry buffers are uploaded the first time a geometry is seen and dropped the first
/// frame it is no longer drawn.
pub struct MeshRenderer {
    pipeline: wgpu::RenderPipeline,
    object_bind_group_layout: wgpu::BindGroupLayout,
    frame_uniform_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    object_uniforms: DynamicUniformBuffer<ObjectUniforms>,
    object_bind_group: wgpu::BindGroup,
    meshes: HashMap<GeometryId, GpuMesh>,
    draws: Vec<DrawCall>,
}

impl MeshRenderer {
    /// Creates the pipeline, drawing into targets with `sample_count` samples.
    pub fn new(ctxt: &Context, sample_count: u32) -> MeshRenderer {
        let frame_bind_group_layout =
            ctxt.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("mesh_renderer_frame_bind_group_layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let object_bind_group_layout =
            ctxt.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("mesh_renderer_object_bind_group_layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: NonZeroU64::new(std::mem::size_of::<ObjectUniforms>() as u64),
                    },
                    count: None,
                }],
            });

        let pipeline_layout = ctxt.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("mesh_renderer_pipeline_layout"),
            bind_group_layouts: &[&frame_bind_group_layout, &object_bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = ctxt.create_shader_module(
            Some("standard_shader"),
            include_str!("../builtin/standard.wgsl"),
        );

        let vertex_buffer_layouts = [
            // Buffer 0: Vertex positions
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                }],
            },
            // Buffer 1: Normals
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                }],
            },
        ];

        let pipeline = ctxt.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("mesh_renderer_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &vertex_buffer_layouts,
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctxt.surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: Context::depth_format(),
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: sample_count.max(1),
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        let frame_uniform_buffer = ctxt.create_buffer_simple(
            Some("mesh_renderer_frame_uniform_buffer"),
            std::mem::size_of::<FrameUniforms>() as u64,
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        );

        let frame_bind_group = ctxt.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("mesh_renderer_frame_bind_group"),
            layout: &frame_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_uniform_buffer.as_entire_binding(),
            }],
        });

        let object_uniforms =
            DynamicUniformBuffer::with_capacity(ctxt, "mesh_renderer_object_uniforms", 16);
        let object_bind_group =
            Self::create_object_bind_group(ctxt, &object_bind_group_layout, &object_uniforms);

        MeshRenderer {
            pipeline,
            object_bind_group_layout,
            frame_uniform_buffer,
            frame_bind_group,
            object_uniforms,
            object_bind_group,
            meshes: HashMap::new(),
            draws: Vec::new(),
        }
    }

    fn create_object_bind_group(
        ctxt: &Context,
        layout: &wgpu::BindGroupLayout,
        uniforms: &DynamicUniformBuffer<ObjectUniforms>,
    ) -> wgpu::BindGroup {
        ctxt.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("mesh_renderer_object_bind_group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: uniforms.buffer(),
                    offset: 0,
                    size: NonZeroU64::new(std::mem::size_of::<ObjectUniforms>() as u64),
                }),
            }],
        })
    }

    fn upload(ctxt: &Context, geometry: &Geometry) -> GpuMesh {
        let mesh = geometry.mesh();
        let normals = mesh.normals.as_deref().unwrap_or(&[]);
        let indices = mesh.flat_indices();

        GpuMesh {
            coords: ctxt.create_buffer_init(
                Some("mesh_coords"),
                bytemuck::cast_slice(&mesh.coords),
                wgpu::BufferUsages::VERTEX,
            ),
            normals: ctxt.create_buffer_init(
                Some("mesh_normals"),
                bytemuck::cast_slice(normals),
                wgpu::BufferUsages::VERTEX,
            ),
            indices: ctxt.create_buffer_init(
                Some("mesh_indices"),
                bytemuck::cast_slice(&indices),
                wgpu::BufferUsages::INDEX,
            ),
            num_indices: indices.len() as u32,
            used: true,
        }
    }

    /// Collects the meshes of `scene`, uploads new geometries and writes this frame's
    /// uniforms. Must be called before [`MeshRenderer::draw`].
    pub fn prepare(
        &mut self,
        ctxt: &Context,
        scene: &Scene,
        camera: &dyn Camera3d,
        lights: &LightCollection,
    ) {
        let frame = FrameUniforms::new(camera, lights);
        ctxt.write_buffer(&self.frame_uniform_buffer, 0, bytemuck::bytes_of(&frame));

        self.object_uniforms.clear();
        self.draws.clear();
        for mesh in self.meshes.values_mut() {
            mesh.used = false;
        }

        let mut meshes = Vec::<(Rc<Geometry>, StandardMaterial, Mat4)>::new();
        scene.root().traverse(&mut |data, world| {
            if let Some(Object::Mesh { geometry, material }) = data.object() {
                meshes.push((geometry.clone(), *material, world));
            }
        });

        for (geometry, material, world) in meshes {
            let gpu = self
                .meshes
                .entry(geometry.id())
                .or_insert_with(|| Self::upload(ctxt, &geometry));
            gpu.used = true;

            if gpu.num_indices == 0 {
                continue;
            }

            let offset = self.object_uniforms.push(&ObjectUniforms::new(world, &material));
            self.draws.push(DrawCall {
                geometry: geometry.id(),
                offset,
            });
        }

        self.meshes.retain(|_, mesh| mesh.used);

        if self.object_uniforms.flush(ctxt) {
            self.object_bind_group = Self::create_object_bind_group(
                ctxt,
                &self.object_bind_group_layout,
                &self.object_uniforms,
            );
        }
    }

    /// Indicates whether some meshes have to be drawn.
    pub fn needs_rendering(&self) -> bool {
        !self.draws.is_empty()
    }

    /// Records the draw calls prepared by the last [`MeshRenderer::prepare`].
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        if !self.needs_rendering() {
            return;
        }

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.frame_bind_group, &[]);

        for draw in &self.draws {
            let Some(mesh) = self.meshes.get(&draw.geometry) else {
                continue;
            };

            pass.set_bind_group(1, &self.object_bind_group, &[draw.offset]);
            pass.set_vertex_buffer(0, mesh.coords.slice(..));
            pass.set_vertex_buffer(1, mesh.normals.slice(..));
            pass.set_index_buffer(mesh.indices.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..mesh.num_indices, 0, 0..1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::PerspectiveCamera3d;
    use crate::color;
    use crate::light::Light;
    use glamx::Vec3;

    #[test]
    fn uniform_layouts_match_the_shader() {
        assert_eq!(std::mem::size_of::<GpuLight>(), 32);
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 160 + 32 * MAX_LIGHTS);
        assert_eq!(std::mem::size_of::<ObjectUniforms>(), 160);
    }

    #[test]
    fn frame_uniforms_carry_camera_and_lights() {
        let mut camera = PerspectiveCamera3d::new(35.0, 1.5, 0.1, 200.0);
        camera.set_position(Vec3::new(0.0, 0.0, 15.0));

        let mut lights = LightCollection::new();
        lights.add(&Light::ambient().with_intensity(0.5), Vec3::ZERO);
        lights.add(&Light::point().with_intensity(2.0), Vec3::new(5.0, 10.0, 5.0));

        let frame = FrameUniforms::new(&camera, &lights);
        assert_eq!(frame.eye, [0.0, 0.0, 15.0]);
        assert_eq!(frame.num_lights, 1);
        assert_eq!(frame.ambient, [0.5; 3]);
        assert_eq!(frame.lights[0].position, [5.0, 10.0, 5.0]);
        assert_eq!(frame.lights[0].radiance, [2.0; 3]);
        assert_eq!(frame.lights[1].radiance, [0.0; 3]);
    }

    #[test]
    fn normal_matrix_undoes_nonuniform_scale() {
        let world = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        let material = StandardMaterial::new(color::CYAN).with_emissive(color::YELLOW, 0.5);
        let object = ObjectUniforms::new(world, &material);

        assert_eq!(object.ntransform[0], [0.5, 0.0, 0.0, 0.0]);
        assert_eq!(object.ntransform[1], [0.0, 1.0, 0.0, 0.0]);
        assert_eq!(object.emissive, [1.0, 1.0, 0.0, 0.5]);
        assert_eq!(object.color, [0.0, 1.0, 1.0, 1.0]);
    }
}
