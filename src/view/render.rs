use glam::Mat4;
use tracing::{debug, info};
use wgpu::util::DeviceExt;

use crate::config::{AppConfig, LightingConfig};
use crate::controller::FrameOutput;
use crate::error::AssetError;
use crate::model::{CelestialBody, Shading};
use crate::utils::{MeshBuffer, Vertex};
use crate::view::model_loader::{self, MaterialData, ModelData};

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub view_position: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    pub position: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
    pub shininess: f32,
}

impl LightUniform {
    pub fn new(lighting: &LightingConfig, position: glam::Vec3) -> Self {
        Self {
            position: position.extend(1.0).to_array(),
            ambient: lighting.ambient.extend(1.0).to_array(),
            diffuse: lighting.diffuse.extend(1.0).to_array(),
            specular: lighting.specular.extend(1.0).to_array(),
            constant: lighting.constant,
            linear: lighting.linear,
            quadratic: lighting.quadratic,
            shininess: lighting.shininess,
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TransformUniform {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
}

impl TransformUniform {
    pub fn new(model: Mat4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            normal: model.inverse().transpose().to_cols_array_2d(),
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
}

pub fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> (wgpu::Texture, wgpu::TextureView) {
    let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d { width: width.max(1), height: height.max(1), depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let depth_view = depth_texture.create_view(&wgpu::TextureViewDescriptor::default());
    (depth_texture, depth_view)
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

/// Camera and light uniforms, shared by every draw (group 0)
pub struct FrameResources {
    pub camera_buffer: wgpu::Buffer,
    pub light_buffer: wgpu::Buffer,
    pub bind_group_layout: wgpu::BindGroupLayout,
    pub bind_group: wgpu::BindGroup,
}

pub fn create_frame_resources(device: &wgpu::Device, light: &LightUniform) -> FrameResources {
    let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("camera_buffer"),
        size: std::mem::size_of::<CameraUniform>() as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let light_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("light_buffer"),
        contents: bytemuck::bytes_of(light),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });

    let stages = wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT;
    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("frame_bind_group_layout"),
        entries: &[uniform_entry(0, stages), uniform_entry(1, wgpu::ShaderStages::FRAGMENT)],
    });

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("frame_bind_group"),
        layout: &bind_group_layout,
        entries: &[
            wgpu::BindGroupEntry { binding: 0, resource: camera_buffer.as_entire_binding() },
            wgpu::BindGroupEntry { binding: 1, resource: light_buffer.as_entire_binding() },
        ],
    });

    FrameResources { camera_buffer, light_buffer, bind_group_layout, bind_group }
}

pub fn create_transform_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("transform_bind_group_layout"),
        entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX)],
    })
}

pub fn create_material_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("material_bind_group_layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
            uniform_entry(2, wgpu::ShaderStages::FRAGMENT),
        ],
    })
}

/// Build one body pipeline. The lit and lamp programs share vertex layout
/// and bind groups and differ only in their WGSL.
pub fn create_body_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    layouts: &[&wgpu::BindGroupLayout],
    label: &str,
    shader_src: &str,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(shader_src.into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: layouts,
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex::desc()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState { format, blend: Some(wgpu::BlendState::REPLACE), write_mask: wgpu::ColorWrites::ALL })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState { count: 1, mask: !0, alpha_to_coverage_enabled: false },
        multiview: None,
        cache: None,
    })
}

///////////////////////////////////////////////////////////////////////////////

struct GpuMaterial {
    bind_group: wgpu::BindGroup,
}

struct GpuPart {
    mesh: MeshBuffer,
    material: usize,
}

/// A body's uploaded geometry plus its per-frame transform uniform
struct BodyResources {
    shading: Shading,
    parts: Vec<GpuPart>,
    materials: Vec<GpuMaterial>,
    transform_buffer: wgpu::Buffer,
    transform_bind_group: wgpu::BindGroup,
}

/// Draws the bodies: the lamp program for the sun, the lit program for the rest
pub struct RenderState {
    pub width: u32,
    pub height: u32,
    clear_color: wgpu::Color,
    lit_pipeline: wgpu::RenderPipeline,
    lamp_pipeline: wgpu::RenderPipeline,
    frame: FrameResources,
    light: LightUniform,
    depth_view: wgpu::TextureView,
    bodies: Vec<BodyResources>,
}

impl RenderState {
    /// Load every body's mesh and build the pipelines. Missing or broken
    /// assets fail here, before the first frame.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        bodies: &[CelestialBody],
        config: &AppConfig,
    ) -> Result<Self, AssetError> {
        let light = LightUniform::new(&config.lighting, config.orbit.light_position);
        let frame = create_frame_resources(device, &light);
        let transform_layout = create_transform_layout(device);
        let material_layout = create_material_layout(device);
        let layouts = [&frame.bind_group_layout, &transform_layout, &material_layout];

        let lit_pipeline = create_body_pipeline(device, format, &layouts, "lit_pipeline", include_str!("shaders/lit.wgsl"));
        let lamp_pipeline = create_body_pipeline(device, format, &layouts, "lamp_pipeline", include_str!("shaders/lamp.wgsl"));
        debug!("body pipelines created");

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("diffuse_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let mut resources = Vec::with_capacity(bodies.len());
        for body in bodies {
            let path = body.mesh_path(&config.resource_root);
            let model = model_loader::load_obj(&path)?;
            info!(body = body.name, path = %path.display(), parts = model.parts.len(), "mesh loaded");
            resources.push(upload_body(device, queue, body, &model, &transform_layout, &material_layout, &sampler)?);
        }

        let (_, depth_view) = create_depth_texture(device, width, height);
        let [r, g, b, a] = config.lighting.clear_color;

        Ok(Self {
            width,
            height,
            clear_color: wgpu::Color { r, g, b, a },
            lit_pipeline,
            lamp_pipeline,
            frame,
            light,
            depth_view,
            bodies: resources,
        })
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.width = width;
            self.height = height;
            let (_, depth_view) = create_depth_texture(device, width, height);
            self.depth_view = depth_view;
        }
    }

    /// Push this frame's camera, light and model matrices to the GPU
    pub fn write_uniforms(&mut self, queue: &wgpu::Queue, frame: &FrameOutput) {
        let camera = CameraUniform {
            view: frame.view.to_cols_array_2d(),
            projection: frame.projection.to_cols_array_2d(),
            view_position: frame.view_position.extend(1.0).to_array(),
        };
        queue.write_buffer(&self.frame.camera_buffer, 0, bytemuck::bytes_of(&camera));

        let light_position = frame.light_position.extend(1.0).to_array();
        if light_position != self.light.position {
            self.light.position = light_position;
            queue.write_buffer(&self.frame.light_buffer, 0, bytemuck::bytes_of(&self.light));
        }

        for (body, model) in self.bodies.iter().zip(&frame.model_matrices) {
            let transform = TransformUniform::new(*model);
            queue.write_buffer(&body.transform_buffer, 0, bytemuck::bytes_of(&transform));
        }
    }

    /// Record the body pass into `encoder`, clearing `view` first
    pub fn draw_frame(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("body_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_bind_group(0, &self.frame.bind_group, &[]);

        for body in &self.bodies {
            let pipeline = match body.shading {
                Shading::Emissive => &self.lamp_pipeline,
                Shading::Lit => &self.lit_pipeline,
            };
            render_pass.set_pipeline(pipeline);
            render_pass.set_bind_group(1, &body.transform_bind_group, &[]);

            for part in &body.parts {
                if part.mesh.index_count == 0 {
                    continue;
                }
                render_pass.set_bind_group(2, &body.materials[part.material].bind_group, &[]);
                render_pass.set_vertex_buffer(0, part.mesh.vertex_buffer.slice(..));
                render_pass.set_index_buffer(part.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..part.mesh.index_count, 0, 0..1);
            }
        }
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }
}

fn upload_body(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    body: &CelestialBody,
    model: &ModelData,
    transform_layout: &wgpu::BindGroupLayout,
    material_layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
) -> Result<BodyResources, AssetError> {
    let transform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(body.name),
        contents: bytemuck::bytes_of(&TransformUniform::new(Mat4::IDENTITY)),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });
    let transform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(body.name),
        layout: transform_layout,
        entries: &[wgpu::BindGroupEntry { binding: 0, resource: transform_buffer.as_entire_binding() }],
    });

    let materials = model
        .materials
        .iter()
        .map(|m| upload_material(device, queue, m, material_layout, sampler))
        .collect::<Result<Vec<_>, _>>()?;

    let parts = model
        .parts
        .iter()
        .map(|p| GpuPart { mesh: p.mesh.upload(device), material: p.material })
        .collect();

    Ok(BodyResources {
        shading: body.shading,
        parts,
        materials,
        transform_buffer,
        transform_bind_group,
    })
}

fn upload_material(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    material: &MaterialData,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
) -> Result<GpuMaterial, AssetError> {
    // Untextured materials sample a white texel tinted by Kd
    let (rgba, width, height, tint) = match &material.diffuse_texture {
        Some(path) => {
            let image = model_loader::load_texture(path)?;
            let (w, h) = image.dimensions();
            debug!(path = %path.display(), width = w, height = h, "texture loaded");
            (image.into_raw(), w, h, [1.0, 1.0, 1.0])
        }
        None => (vec![255u8; 4], 1, 1, material.diffuse),
    };

    let texture = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some(material.name.as_str()),
            size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        &rgba,
    );
    let texture_view = texture.create_view(&wgpu::TextureViewDescriptor::default());

    let uniform = MaterialUniform {
        diffuse: [tint[0], tint[1], tint[2], 1.0],
        specular: [material.specular[0], material.specular[1], material.specular[2], 1.0],
    };
    let material_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(material.name.as_str()),
        contents: bytemuck::bytes_of(&uniform),
        usage: wgpu::BufferUsages::UNIFORM,
    });

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(material.name.as_str()),
        layout,
        entries: &[
            wgpu::BindGroupEntry { binding: 0, resource: wgpu::BindingResource::TextureView(&texture_view) },
            wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::Sampler(sampler) },
            wgpu::BindGroupEntry { binding: 2, resource: material_buffer.as_entire_binding() },
        ],
    });

    Ok(GpuMaterial { bind_group })
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_uniform_sizes_match_wgsl() {
        assert_eq!(std::mem::size_of::<CameraUniform>(), 144);
        assert_eq!(std::mem::size_of::<LightUniform>(), 80);
        assert_eq!(std::mem::size_of::<TransformUniform>(), 128);
        assert_eq!(std::mem::size_of::<MaterialUniform>(), 32);
    }

    #[test]
    fn test_light_uniform_from_config() {
        let light = LightUniform::new(&LightingConfig::default(), Vec3::new(1.2, 1.0, 2.0));
        assert_eq!(light.position, [1.2, 1.0, 2.0, 1.0]);
        assert_eq!(light.ambient, [0.2, 0.2, 0.2, 1.0]);
        assert_eq!(light.diffuse, [0.5, 0.5, 0.5, 1.0]);
        assert_eq!(light.specular, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(light.constant, 1.0);
        assert_eq!(light.linear, 0.05);
        assert_eq!(light.quadratic, 0.012);
        assert_eq!(light.shininess, 1.0);
    }

    #[test]
    fn test_normal_matrix_undoes_uniform_scale() {
        let model = Mat4::from_translation(Vec3::new(3.0, 0.0, 0.0)) * Mat4::from_scale(Vec3::splat(0.5));
        let t = TransformUniform::new(model);
        let normal = Mat4::from_cols_array_2d(&t.normal);
        let n = normal.transform_vector3(Vec3::Z);
        assert!((n - Vec3::new(0.0, 0.0, 2.0)).length() < 1e-5);
    }
}
