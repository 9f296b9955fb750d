//! Draws the point clouds of a scene.

use crate::camera::Camera3d;
use crate::context::Context;
use crate::renderer::uniform_buffer::DynamicUniformBuffer;
use crate::scene::{GeometryId, Object, PointGeometry, PointsMaterial, Scene};
use bytemuck::{Pod, Zeroable};
use glamx::Mat4;
use std::collections::HashMap;
use std::num::NonZeroU64;
use std::rc::Rc;

/// Frame uniforms for point rendering.
/// Layout must match points.wgsl Frame struct.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct FrameUniforms {
    view: [[f32; 4]; 4],
    proj: [[f32; 4]; 4],
    viewport: [f32; 2],
    pixel_ratio: f32,
    _pad: f32,
}

/// Per-cloud uniforms.
/// Layout must match points.wgsl Object struct.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub(crate) struct ObjectUniforms {
    transform: [[f32; 4]; 4],
    color: [f32; 4],
    size: f32,
    size_attenuation: u32,
    _pad: [f32; 2],
}

impl ObjectUniforms {
    pub(crate) fn new(world: Mat4, material: &PointsMaterial) -> Self {
        let c = material.color;
        Self {
            transform: world.to_cols_array_2d(),
            color: [c.r, c.g, c.b, material.effective_opacity().clamp(0.0, 1.0)],
            size: material.size.max(0.0),
            size_attenuation: material.size_attenuation as u32,
            _pad: [0.0; 2],
        }
    }
}

/// Positions of one uploaded cloud, bound as a storage buffer.
struct GpuPoints {
    bind_group: wgpu::BindGroup,
    num_vertices: u32,
    used: bool,
}

/// Vertices drawn for `num_points` points, 6 per point (2 triangles forming a quad).
///
/// Clouds too large for a single draw are truncated to whole points.
fn vertex_count(num_points: usize) -> u32 {
    u32::try_from(num_points)
        .ok()
        .and_then(|n| n.checked_mul(6))
        .unwrap_or(u32::MAX / 6 * 6)
}

struct DrawCall {
    geometry: GeometryId,
    offset: u32,
}

/// Renderer of every `Object::Points` of a scene.
///
/// Points are blended over what is already drawn, so this renderer must run after the
/// opaque meshes.
pub struct PointRenderer {
    pipeline: wgpu::RenderPipeline,
    points_bind_group_layout: wgpu::BindGroupLayout,
    object_bind_group_layout: wgpu::BindGroupLayout,
    frame_uniform_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    object_uniforms: DynamicUniformBuffer<ObjectUniforms>,
    object_bind_group: wgpu::BindGroup,
    clouds: HashMap<GeometryId, GpuPoints>,
    draws: Vec<DrawCall>,
}

impl PointRenderer {
    /// Creates a new points renderer drawing into targets with `sample_count` samples.
    pub fn new(ctxt: &Context, sample_count: u32) -> PointRenderer {
        let uniform_entry = |has_dynamic_offset: bool| wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset,
                min_binding_size: None,
            },
            count: None,
        };

        let frame_bind_group_layout =
            ctxt.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("point_renderer_frame_bind_group_layout"),
                entries: &[uniform_entry(false)],
            });
        let object_bind_group_layout =
            ctxt.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("point_renderer_object_bind_group_layout"),
                entries: &[uniform_entry(true)],
            });
        let points_bind_group_layout =
            ctxt.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("point_renderer_points_bind_group_layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let pipeline_layout = ctxt.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("point_renderer_pipeline_layout"),
            bind_group_layouts: &[
                &frame_bind_group_layout,
                &object_bind_group_layout,
                &points_bind_group_layout,
            ],
            push_constant_ranges: &[],
        });

        let shader = ctxt.create_shader_module(
            Some("point_renderer_shader"),
            include_str!("../builtin/points.wgsl"),
        );

        let pipeline = ctxt.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("point_renderer_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctxt.surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
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
            Some("point_renderer_frame_uniform_buffer"),
            std::mem::size_of::<FrameUniforms>() as u64,
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        );
        let frame_bind_group = ctxt.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("point_renderer_frame_bind_group"),
            layout: &frame_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_uniform_buffer.as_entire_binding(),
            }],
        });

        let object_uniforms =
            DynamicUniformBuffer::with_capacity(ctxt, "point_renderer_object_uniforms", 4);
        let object_bind_group =
            Self::create_object_bind_group(ctxt, &object_bind_group_layout, &object_uniforms);

        PointRenderer {
            pipeline,
            points_bind_group_layout,
            object_bind_group_layout,
            frame_uniform_buffer,
            frame_bind_group,
            object_uniforms,
            object_bind_group,
            clouds: HashMap::new(),
            draws: Vec::new(),
        }
    }

    fn create_object_bind_group(
        ctxt: &Context,
        layout: &wgpu::BindGroupLayout,
        uniforms: &DynamicUniformBuffer<ObjectUniforms>,
    ) -> wgpu::BindGroup {
        ctxt.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("point_renderer_object_bind_group"),
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

    fn upload(&self, ctxt: &Context, geometry: &PointGeometry) -> GpuPoints {
        // vec3 arrays have a 16 bytes stride in storage buffers.
        let positions: Vec<[f32; 4]> = geometry
            .cloud()
            .positions
            .iter()
            .map(|p| p.extend(1.0).into())
            .collect();

        let buffer = ctxt.create_buffer_init(
            Some("point_renderer_positions"),
            bytemuck::cast_slice(&positions),
            wgpu::BufferUsages::STORAGE,
        );
        let bind_group = ctxt.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("point_renderer_points_bind_group"),
            layout: &self.points_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });

        GpuPoints {
            bind_group,
            num_vertices: vertex_count(positions.len()),
            used: true,
        }
    }

    /// Collects the point clouds of `scene` and writes this frame's uniforms.
    ///
    /// `viewport` is the size of the render target in physical pixels.
    pub fn prepare(
        &mut self,
        ctxt: &Context,
        scene: &Scene,
        camera: &dyn Camera3d,
        viewport: (u32, u32),
        pixel_ratio: f64,
    ) {
        let frame = FrameUniforms {
            view: camera.view_matrix().to_cols_array_2d(),
            proj: camera.projection_matrix().to_cols_array_2d(),
            viewport: [viewport.0.max(1) as f32, viewport.1.max(1) as f32],
            pixel_ratio: pixel_ratio as f32,
            _pad: 0.0,
        };
        ctxt.write_buffer(&self.frame_uniform_buffer, 0, bytemuck::bytes_of(&frame));

        self.object_uniforms.clear();
        self.draws.clear();
        for cloud in self.clouds.values_mut() {
            cloud.used = false;
        }

        let mut clouds = Vec::<(Rc<PointGeometry>, PointsMaterial, Mat4)>::new();
        scene.root().traverse(&mut |data, world| {
            if let Some(Object::Points { geometry, material }) = data.object() {
                clouds.push((geometry.clone(), *material, world));
            }
        });

        for (geometry, material, world) in clouds {
            if geometry.cloud().is_empty() {
                continue;
            }

            if !self.clouds.contains_key(&geometry.id()) {
                let gpu = self.upload(ctxt, &geometry);
                let _ = self.clouds.insert(geometry.id(), gpu);
            }
            if let Some(gpu) = self.clouds.get_mut(&geometry.id()) {
                gpu.used = true;
            }

            let offset = self.object_uniforms.push(&ObjectUniforms::new(world, &material));
            self.draws.push(DrawCall {
                geometry: geometry.id(),
                offset,
            });
        }

        self.clouds.retain(|_, cloud| cloud.used);

        if self.object_uniforms.flush(ctxt) {
            self.object_bind_group = Self::create_object_bind_group(
                ctxt,
                &self.object_bind_group_layout,
                &self.object_uniforms,
            );
        }
    }

    /// Indicates whether some points have to be drawn.
    pub fn needs_rendering(&self) -> bool {
        !self.draws.is_empty()
    }

    /// Records the draw calls prepared by the last [`PointRenderer::prepare`].
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        if !self.needs_rendering() {
            return;
        }

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.frame_bind_group, &[]);

        for draw in &self.draws {
            let Some(cloud) = self.clouds.get(&draw.geometry) else {
                continue;
            };

            pass.set_bind_group(1, &self.object_bind_group, &[draw.offset]);
            pass.set_bind_group(2, &cloud.bind_group, &[]);
            pass.draw(0..cloud.num_vertices, 0..1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color;

    #[test]
    fn uniform_layouts_match_the_shader() {
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 144);
        assert_eq!(std::mem::size_of::<ObjectUniforms>(), 96);
    }

    #[test]
    fn vertex_count_never_overflows() {
        assert_eq!(vertex_count(0), 0);
        assert_eq!(vertex_count(1000), 6000);
        assert_eq!(vertex_count(800_000_000), u32::MAX / 6 * 6);
        assert_eq!(vertex_count(usize::MAX), u32::MAX / 6 * 6);
    }

    #[test]
    fn opacity_only_applies_to_transparent_materials() {
        let mut material = PointsMaterial {
            color: color::WHITE,
            size: 0.1,
            size_attenuation: true,
            transparent: true,
            opacity: 0.8,
        };
        let object = ObjectUniforms::new(Mat4::IDENTITY, &material);
        assert_eq!(object.color, [1.0, 1.0, 1.0, 0.8]);
        assert_eq!(object.size_attenuation, 1);

        material.transparent = false;
        material.size_attenuation = false;
        let object = ObjectUniforms::new(Mat4::IDENTITY, &material);
        assert_eq!(object.color[3], 1.0);
        assert_eq!(object.size_attenuation, 0);
    }
}
