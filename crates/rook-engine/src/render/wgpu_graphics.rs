//! wgpu implementation of [`Graphics`].
//!
//! [`GpuResources`] owns every GPU object created through the trait and lives
//! as long as the app. [`WgpuGraphics`] is a short-lived view that pairs those
//! resources with the window's [`Gpu`] for the duration of one callback.

use std::num::NonZeroU64;

use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::device::{Gpu, SurfaceErrorAction};
use crate::paint::Color;
use crate::scene::DrawList;

use super::ctx::RenderTarget;
use super::graphics::{
    FrameOutcome, FrameSubmission, Graphics, GraphicsError, MeshId, ProgramId, TextureId,
};
use super::mesh::{MeshData, Vertex};
use super::shader::ShaderProgram;
use super::texture::{ImageData, Sampling};

const MAT4_SIZE: u64 = std::mem::size_of::<[f32; 16]>() as u64;

// ── slot storage ──────────────────────────────────────────────────────────

/// Append-only slot map. Indices are never reused, so a stale handle can not
/// alias a newer resource.
struct Slots<T> {
    items: Vec<Option<T>>,
}

impl<T> Default for Slots<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> Slots<T> {
    fn insert(&mut self, value: T) -> u32 {
        self.items.push(Some(value));
        (self.items.len() - 1) as u32
    }

    fn get(&self, id: u32) -> Option<&T> {
        self.items.get(id as usize).and_then(Option::as_ref)
    }

    fn get_mut(&mut self, id: u32) -> Option<&mut T> {
        self.items.get_mut(id as usize).and_then(Option::as_mut)
    }

    fn take(&mut self, id: u32) -> Option<T> {
        self.items.get_mut(id as usize).and_then(Option::take)
    }

    fn live(&self) -> usize {
        self.items.iter().filter(|s| s.is_some()).count()
    }
}

struct TextureSlot {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

struct MeshSlot {
    vbo: wgpu::Buffer,
    ibo: wgpu::Buffer,
    index_count: u32,
}

struct ProgramSlot {
    pipeline: wgpu::RenderPipeline,
    uniform_layout: wgpu::BindGroupLayout,
    view_projection_ubo: wgpu::Buffer,

    // Per-draw `model` matrices, one per `model_stride` bytes.
    model_ubo: Option<wgpu::Buffer>,
    model_capacity: usize,
    model_stride: u64,
    uniform_bind_group: Option<wgpu::BindGroup>,
}

impl ProgramSlot {
    fn ensure_model_capacity(&mut self, device: &wgpu::Device, required: usize) {
        if required <= self.model_capacity && self.uniform_bind_group.is_some() {
            return;
        }

        let new_cap = required.next_power_of_two().max(64);
        let model_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("rook model ubo"),
            size: new_cap as u64 * self.model_stride,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("rook uniform bind group"),
            layout: &self.uniform_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.view_projection_ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: &model_ubo,
                        offset: 0,
                        size: NonZeroU64::new(MAT4_SIZE),
                    }),
                },
            ],
        });

        if let Some(old) = self.model_ubo.replace(model_ubo) {
            old.destroy();
        }
        self.uniform_bind_group = Some(bind_group);
        self.model_capacity = new_cap;
    }

    fn release(self) {
        self.view_projection_ubo.destroy();
        if let Some(ubo) = self.model_ubo {
            ubo.destroy();
        }
    }
}

// ── resources ─────────────────────────────────────────────────────────────

/// GPU objects created through [`WgpuGraphics`].
#[derive(Default)]
pub struct GpuResources {
    texture_layout: Option<wgpu::BindGroupLayout>,
    textures: Slots<TextureSlot>,
    programs: Slots<ProgramSlot>,
    meshes: Slots<MeshSlot>,
    warned_unknown_texture: bool,
}

impl GpuResources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pairs the resources with `gpu` for one callback.
    pub fn bind<'a, 'w>(&'a mut self, gpu: &'a mut Gpu<'w>) -> WgpuGraphics<'a, 'w> {
        WgpuGraphics { gpu, resources: self, window: None }
    }

    /// Number of handles that have been created and not yet released.
    pub fn live_handles(&self) -> usize {
        self.textures.live() + self.programs.live() + self.meshes.live()
    }

    /// Reports draws dropped for an unknown texture, once per resource set.
    /// Returns whether a report was logged.
    fn note_skipped_draws(&mut self, skipped: usize) -> bool {
        if skipped == 0 || self.warned_unknown_texture {
            return false;
        }
        log::error!("{skipped} draw(s) referenced unknown textures and were skipped");
        self.warned_unknown_texture = true;
        true
    }

    fn texture_layout(&mut self, device: &wgpu::Device) -> &wgpu::BindGroupLayout {
        self.texture_layout.get_or_insert_with(|| {
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("rook texture bgl"),
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
                ],
            })
        })
    }
}

impl Drop for GpuResources {
    fn drop(&mut self) {
        let live = self.live_handles();
        if live > 0 {
            log::warn!("{live} GPU handle(s) dropped without being released");
        }
    }
}

// ── graphics view ─────────────────────────────────────────────────────────

/// [`Graphics`] backed by wgpu.
pub struct WgpuGraphics<'a, 'w> {
    gpu: &'a mut Gpu<'w>,
    resources: &'a mut GpuResources,
    window: Option<&'a Window>,
}

impl<'a, 'w> WgpuGraphics<'a, 'w> {
    /// Lets the frame notify the window right before presenting.
    pub fn with_window(mut self, window: &'a Window) -> Self {
        self.window = Some(window);
        self
    }
}

impl Graphics for WgpuGraphics<'_, '_> {
    fn create_mesh(&mut self, mesh: &MeshData) -> Result<MeshId, GraphicsError> {
        if mesh.vertices.is_empty() {
            return Err(GraphicsError::EmptyMesh("vertices"));
        }
        if mesh.indices.is_empty() {
            return Err(GraphicsError::EmptyMesh("indices"));
        }

        let device = self.gpu.device();
        let vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("rook quad vbo"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let ibo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("rook quad ibo"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let id = self.resources.meshes.insert(MeshSlot {
            vbo,
            ibo,
            index_count: mesh.index_count(),
        });
        Ok(MeshId::from_raw(id))
    }

    fn create_program(&mut self, program: &ShaderProgram) -> Result<ProgramId, GraphicsError> {
        let device = self.gpu.device();
        let surface_format = self.gpu.surface_format();

        let vs = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("rook quad vertex shader"),
            source: wgpu::ShaderSource::Wgsl(program.vertex_source().into()),
        });
        let fs = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("rook quad fragment shader"),
            source: wgpu::ShaderSource::Wgsl(program.fragment_source().into()),
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("rook uniform bgl"),
            entries: &[
                // view_projection
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: NonZeroU64::new(MAT4_SIZE),
                    },
                    count: None,
                },
                // model
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: NonZeroU64::new(MAT4_SIZE),
                    },
                    count: None,
                },
            ],
        });

        let texture_layout = self.resources.texture_layout(device);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("rook quad pipeline layout"),
            bind_group_layouts: &[&uniform_layout, texture_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("rook quad pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vs,
                entry_point: Some(super::ShaderStage::Vertex.entry_point()),
                compilation_options: Default::default(),
                buffers: &[Vertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &fs,
                entry_point: Some(super::ShaderStage::Fragment.entry_point()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    // Piece art has straight alpha over the board squares.
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
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
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let view_projection_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("rook view_projection ubo"),
            size: MAT4_SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let model_stride = wgpu::util::align_to(MAT4_SIZE, alignment);

        let id = self.resources.programs.insert(ProgramSlot {
            pipeline,
            uniform_layout,
            view_projection_ubo,
            model_ubo: None,
            model_capacity: 0,
            model_stride,
            uniform_bind_group: None,
        });
        log::debug!("created shader program {id} for {surface_format:?}");
        Ok(ProgramId::from_raw(id))
    }

    fn create_texture(
        &mut self,
        label: &str,
        image: &ImageData,
        sampling: Sampling,
    ) -> Result<TextureId, GraphicsError> {
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return Err(GraphicsError::EmptyTexture { label: label.to_string() });
        }

        let device = self.gpu.device();
        let limit = device.limits().max_texture_dimension_2d;
        if width > limit || height > limit {
            return Err(GraphicsError::TextureTooLarge {
                label: label.to_string(),
                width,
                height,
                limit,
            });
        }

        let levels = image.mip_chain();
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
            mip_level_count: levels.len() as u32,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let queue = self.gpu.queue();
        for (mip_level, level) in levels.iter().enumerate() {
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: mip_level as u32,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                &level.rgba,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * level.width),
                    rows_per_image: Some(level.height),
                },
                wgpu::Extent3d {
                    width: level.width,
                    height: level.height,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let filter = sampling.filter.to_wgpu();
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: sampling.address_mode(),
            address_mode_v: sampling.address_mode(),
            address_mode_w: sampling.address_mode(),
            mag_filter: filter,
            min_filter: filter,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let layout = self.resources.texture_layout(device);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let id = self.resources.textures.insert(TextureSlot { texture, bind_group });
        log::debug!("uploaded texture {label} ({width}x{height}, {} mips)", levels.len());
        Ok(TextureId::from_raw(id))
    }

    fn destroy_texture(&mut self, id: TextureId) {
        match self.resources.textures.take(id.raw()) {
            Some(slot) => slot.texture.destroy(),
            None => log::warn!("release of unknown or already released {id:?}"),
        }
    }

    fn destroy_program(&mut self, id: ProgramId) {
        match self.resources.programs.take(id.raw()) {
            Some(slot) => slot.release(),
            None => log::warn!("release of unknown or already released {id:?}"),
        }
    }

    fn destroy_mesh(&mut self, id: MeshId) {
        match self.resources.meshes.take(id.raw()) {
            Some(slot) => {
                slot.vbo.destroy();
                slot.ibo.destroy();
            }
            None => log::warn!("release of unknown or already released {id:?}"),
        }
    }

    fn draw_frame(&mut self, frame: &FrameSubmission<'_>) -> FrameOutcome {
        let (width, height) = frame.viewport;
        if width == 0 || height == 0 {
            return FrameOutcome::Skipped;
        }

        // Mutating steps first; the pass below only borrows immutably.
        let Some(program) = self.resources.programs.get_mut(frame.program.raw()) else {
            log::error!("draw with unknown {:?}", frame.program);
            return FrameOutcome::Skipped;
        };
        program.ensure_model_capacity(self.gpu.device(), frame.draws.len());

        let queue = self.gpu.queue();
        queue.write_buffer(
            &program.view_projection_ubo,
            0,
            bytemuck::cast_slice(&frame.view_projection.to_cols_array()),
        );
        if let Some(model_ubo) = program.model_ubo.as_ref() {
            if !frame.draws.is_empty() {
                let bytes = pack_models(frame.draws, program.model_stride);
                queue.write_buffer(model_ubo, 0, &bytes);
            }
        }

        let mut gpu_frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                log::debug!("surface error: {err}");
                return match self.gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Fatal => FrameOutcome::Fatal,
                    SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => {
                        FrameOutcome::Skipped
                    }
                };
            }
        };

        let resources = &*self.resources;
        let (Some(program), Some(mesh)) = (
            resources.programs.get(frame.program.raw()),
            resources.meshes.get(frame.mesh.raw()),
        ) else {
            log::error!("draw with unknown {:?}", frame.mesh);
            return FrameOutcome::Skipped;
        };

        let skipped = {
            let mut target =
                RenderTarget::new(&mut gpu_frame.encoder, &gpu_frame.view, frame.viewport);
            encode_pass(&mut target, frame.clear, program, mesh, &resources.textures, frame.draws)
        };
        self.resources.note_skipped_draws(skipped);

        if let Some(window) = self.window {
            window.pre_present_notify();
        }
        self.gpu.submit(gpu_frame);

        FrameOutcome::Presented
    }
}

/// Lays out one column-major `model` matrix every `stride` bytes.
fn pack_models(draws: &DrawList, stride: u64) -> Vec<u8> {
    let stride = stride as usize;
    let mut bytes = vec![0u8; draws.len() * stride];
    for (i, draw) in draws.iter().enumerate() {
        let cols: [f32; 16] = draw.model.to_cols_array();
        let dst = &mut bytes[i * stride..i * stride + MAT4_SIZE as usize];
        dst.copy_from_slice(bytemuck::cast_slice(&cols));
    }
    bytes
}

/// Records the clear and every quad. Returns how many draws were skipped
/// because their texture is unknown.
fn encode_pass(
    target: &mut RenderTarget<'_>,
    clear: Color,
    program: &ProgramSlot,
    mesh: &MeshSlot,
    textures: &Slots<TextureSlot>,
    draws: &DrawList,
) -> usize {
    let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("rook board pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target.color_view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(clear.to_wgpu()),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    });

    let (w, h) = target.size;
    rpass.set_viewport(0.0, 0.0, w as f32, h as f32, 0.0, 1.0);

    let Some(uniforms) = program.uniform_bind_group.as_ref() else {
        return 0;
    };

    rpass.set_pipeline(&program.pipeline);
    rpass.set_vertex_buffer(0, mesh.vbo.slice(..));
    rpass.set_index_buffer(mesh.ibo.slice(..), wgpu::IndexFormat::Uint16);

    let (resolved, skipped) = resolve_draws(draws, textures, program.model_stride);
    for (offset, texture) in resolved {
        rpass.set_bind_group(0, uniforms, &[offset]);
        rpass.set_bind_group(1, &texture.bind_group, &[]);
        rpass.draw_indexed(0..mesh.index_count, 0, 0..1);
    }
    skipped
}

/// Pairs each draw with its `model` offset and texture slot, in draw order.
/// Draws whose texture is unknown are dropped and counted.
fn resolve_draws<'t, T>(
    draws: &DrawList,
    textures: &'t Slots<T>,
    stride: u64,
) -> (Vec<(wgpu::DynamicOffset, &'t T)>, usize) {
    let mut resolved = Vec::with_capacity(draws.len());
    let mut skipped = 0;
    for (i, draw) in draws.iter().enumerate() {
        match textures.get(draw.texture.raw()) {
            Some(texture) => resolved.push(((i as u64 * stride) as wgpu::DynamicOffset, texture)),
            None => skipped += 1,
        }
    }
    (resolved, skipped)
}
