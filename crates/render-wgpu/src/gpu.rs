use crate::shaders;
use bytemuck::{Pod, Zeroable};
use karting_kernel::{Light, LightRole};
use karting_render::{ChaseCamera, LightSlot, SceneFrame, Shape};
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct LightUniform {
    position: [f32; 4],
    color: [f32; 4],
    params: [f32; 4],
}

impl From<&Light> for LightUniform {
    fn from(light: &Light) -> Self {
        let position = match light.role {
            LightRole::Point => light.position,
            LightRole::Directional { direction } => direction,
        };
        let color = light.color();
        Self {
            position: position.extend(1.0).to_array(),
            color: color.extend(light.intensity()).to_array(),
            params: [
                light.ambient_strength,
                light.specular_strength,
                light.specular_phong,
                0.0,
            ],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    eye: [f32; 4],
    track: LightUniform,
    landmark: LightUniform,
    sun: LightUniform,
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
    slot: f32,
}

fn slot_code(slot: LightSlot) -> f32 {
    match slot {
        LightSlot::Track => 0.0,
        LightSlot::Landmark => 1.0,
        LightSlot::Emissive => 2.0,
    }
}

/// Unit cube, ±0.5 on each axis.
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

/// Quad in the XY plane, ±1, facing +Z.
fn quad_mesh() -> (Vec<Vertex>, Vec<u16>) {
    let n = [0.0, 0.0, 1.0];
    let vertices = vec![
        Vertex { position: [-1.0, -1.0, 0.0], normal: n },
        Vertex { position: [1.0, -1.0, 0.0], normal: n },
        Vertex { position: [1.0, 1.0, 0.0], normal: n },
        Vertex { position: [-1.0, 1.0, 0.0], normal: n },
    ];
    (vertices, vec![0, 1, 2, 2, 3, 0])
}

/// Unit-radius UV sphere.
fn sphere_mesh(stacks: u16, slices: u16) -> (Vec<Vertex>, Vec<u16>) {
    let mut vertices = Vec::with_capacity(usize::from(stacks + 1) * usize::from(slices + 1));
    for stack in 0..=stacks {
        let phi = std::f32::consts::PI * f32::from(stack) / f32::from(stacks);
        for slice in 0..=slices {
            let theta = std::f32::consts::TAU * f32::from(slice) / f32::from(slices);
            let p = [phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin()];
            vertices.push(Vertex { position: p, normal: p });
        }
    }

    let ring = slices + 1;
    let mut indices = Vec::with_capacity(usize::from(stacks) * usize::from(slices) * 6);
    for stack in 0..stacks {
        for slice in 0..slices {
            let a = stack * ring + slice;
            let b = a + ring;
            indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }
    (vertices, indices)
}

struct Mesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl Mesh {
    fn upload(
        device: &wgpu::Device,
        label: &str,
        (vertices, indices): (Vec<Vertex>, Vec<u16>),
    ) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}_vertex_buffer")),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}_index_buffer")),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        }
    }
}

/// A contiguous instance range drawn with one mesh and one pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Batch {
    shape: Shape,
    translucent: bool,
    start: u32,
    end: u32,
}

/// Split the drawable order into runs of the same shape and blend mode.
fn batches(scene: &SceneFrame, limit: usize) -> Vec<Batch> {
    let mut out: Vec<Batch> = Vec::new();
    for (i, d) in scene.drawables.iter().take(limit).enumerate() {
        let i = i as u32;
        let translucent = d.is_translucent();
        match out.last_mut() {
            Some(b) if b.shape == d.shape && b.translucent == translucent => b.end = i + 1,
            _ => out.push(Batch {
                shape: d.shape,
                translucent,
                start: i,
                end: i + 1,
            }),
        }
    }
    out
}

/// wgpu renderer for a captured race scene.
pub struct WgpuRenderer {
    opaque_pipeline: wgpu::RenderPipeline,
    translucent_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    cube: Mesh,
    quad: Mesh,
    sphere: Mesh,
    instance_buffer: wgpu::Buffer,
    max_instances: u32,
    depth_texture: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("uniform_buffer"),
            size: std::mem::size_of::<Uniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
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
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SCENE_SHADER.into()),
        });

        let opaque_pipeline = Self::create_pipeline(
            device,
            &pipeline_layout,
            &shader,
            surface_format,
            "opaque_pipeline",
            wgpu::BlendState::REPLACE,
            true,
        );
        // Translucent karts test against depth but do not occlude each other.
        let translucent_pipeline = Self::create_pipeline(
            device,
            &pipeline_layout,
            &shader,
            surface_format,
            "translucent_pipeline",
            wgpu::BlendState::ALPHA_BLENDING,
            false,
        );

        let cube = Mesh::upload(device, "cube", cube_mesh());
        let quad = Mesh::upload(device, "quad", quad_mesh());
        let sphere = Mesh::upload(device, "sphere", sphere_mesh(16, 24));

        let max_instances = 1_024u32;
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size: (max_instances as u64) * std::mem::size_of::<InstanceData>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let depth_texture = Self::create_depth_texture(device, width, height);

        Self {
            opaque_pipeline,
            translucent_pipeline,
            uniform_buffer,
            uniform_bind_group,
            cube,
            quad,
            sphere,
            instance_buffer,
            max_instances,
            depth_texture,
            surface_format,
        }
    }

    fn create_pipeline(
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        surface_format: wgpu::TextureFormat,
        label: &str,
        blend: wgpu::BlendState,
        depth_write_enabled: bool,
    ) -> wgpu::RenderPipeline {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
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
                            7 => Float32,
                        ],
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(blend),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                // Quads are double sided and the kart boxes are seen from inside in cockpit view.
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        })
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    fn mesh(&self, shape: Shape) -> &Mesh {
        match shape {
            Shape::Cube => &self.cube,
            Shape::Quad => &self.quad,
            Shape::Sphere => &self.sphere,
        }
    }

    /// Render one frame of `scene` seen through `camera`.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        camera: &ChaseCamera,
        scene: &SceneFrame,
    ) {
        let uniforms = Uniforms {
            view_proj: camera.view_projection().to_cols_array_2d(),
            eye: camera.position().extend(1.0).to_array(),
            track: LightUniform::from(&scene.track_light),
            landmark: LightUniform::from(&scene.landmark_light),
            sun: LightUniform::from(&scene.sun),
        };
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let limit = self.max_instances as usize;
        if scene.drawables.len() > limit {
            tracing::warn!(
                drawables = scene.drawables.len(),
                limit,
                "scene exceeds instance buffer; extra drawables skipped"
            );
        }
        let instances: Vec<InstanceData> = scene
            .drawables
            .iter()
            .take(limit)
            .map(|d| {
                let cols = d.model_matrix().to_cols_array_2d();
                InstanceData {
                    model_0: cols[0],
                    model_1: cols[1],
                    model_2: cols[2],
                    model_3: cols[3],
                    color: d.color,
                    slot: slot_code(d.light),
                }
            })
            .collect();
        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }

        let [r, g, b] = scene.sky.clear_color();
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a: 1.0 }),
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

            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
            for batch in batches(scene, limit) {
                let pipeline = if batch.translucent {
                    &self.translucent_pipeline
                } else {
                    &self.opaque_pipeline
                };
                let mesh = self.mesh(batch.shape);
                pass.set_pipeline(pipeline);
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                pass.draw_indexed(0..mesh.index_count, 0, batch.start..batch.end);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use karting_kernel::{RaceConfig, RaceSim};

    #[test]
    fn uniform_layout_matches_shader() {
        // mat4 + eye + three lights of three vec4s each.
        assert_eq!(std::mem::size_of::<Uniforms>(), 64 + 16 + 3 * 48);
        assert_eq!(std::mem::size_of::<InstanceData>(), 4 * 16 + 16 + 4);
    }

    #[test]
    fn sphere_indices_stay_in_range() {
        let (vertices, indices) = sphere_mesh(16, 24);
        assert_eq!(vertices.len(), 17 * 25);
        assert_eq!(indices.len(), 16 * 24 * 6);
        assert!(indices.iter().all(|&i| usize::from(i) < vertices.len()));
    }

    #[test]
    fn batches_cover_scene_in_order() {
        let scene = SceneFrame::capture(&RaceSim::new(RaceConfig::default()));
        let runs = batches(&scene, 1_024);
        assert_eq!(runs.first().map(|b| b.start), Some(0));
        assert_eq!(runs.last().map(|b| b.end), Some(scene.drawables.len() as u32));
        for pair in runs.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        // Translucent batches only at the tail.
        let first_translucent = runs.iter().position(|b| b.translucent).unwrap();
        assert!(runs[first_translucent..].iter().all(|b| b.translucent));
    }

    #[test]
    fn directional_light_uploads_direction() {
        let sun = Light::directional(glam::Vec3::new(4.0, 5.0, 3.0));
        let uniform = LightUniform::from(&sun);
        assert_eq!(&uniform.position[..3], &[4.0, 5.0, 3.0]);
        assert_eq!(uniform.color[3], sun.intensity());
        assert_eq!(uniform.params[2], 15.0);
    }
}
