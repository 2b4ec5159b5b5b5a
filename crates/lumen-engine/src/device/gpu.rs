use wgpu::util::DeviceExt;

use super::{DeviceInit, DrawPass, RenderDevice};
use crate::error::{FilterError, Result, ShaderStage};
use crate::image::Image;
use crate::render::uniforms::min_binding_size;
use crate::render::{
    ensure_fits, ColorTransformUniform, FilterUniforms, ResolutionUniform, FRAGMENT_ENTRY,
    VERTEX_ENTRY,
};

/// Format of both the uploaded texture and the output surface.
///
/// Plain unorm on both ends: bytes go in and come out without any sRGB
/// conversion, so an identity matrix reproduces the input exactly.
const PIXEL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Headless wgpu rendering context.
///
/// Owns the logical device and queue. There is no surface; draws go to
/// offscreen targets that are read back into [`Image`]s.
pub struct Gpu {
    /// Logical device.
    device: wgpu::Device,

    /// Command queue.
    queue: wgpu::Queue,

    /// Cached `max_texture_dimension_2d` of the device.
    max_texture_dim: u32,
}

impl Gpu {
    /// Creates a GPU context.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu. Every failure
    /// is reported as [`FilterError::ContextUnavailable`].
    pub async fn new(init: &DeviceInit) -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: init.backends,
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: init.power_preference,
                compatible_surface: None,
                force_fallback_adapter: init.force_fallback_adapter,
            })
            .await
            .map_err(|e| FilterError::context_unavailable(format!("no suitable GPU adapter: {e}")))?;

        let required_limits = init.limits_for(&adapter.limits());
        let max_texture_dim = required_limits.max_texture_dimension_2d;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("lumen device"),
                required_features: wgpu::Features::empty(),
                required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::MemoryUsage,
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| {
                FilterError::context_unavailable(format!("failed to create wgpu device/queue: {e}"))
            })?;

        let info = adapter.get_info();
        log::info!(
            "using GPU adapter {:?} ({:?}, max texture {max_texture_dim})",
            info.name,
            info.backend
        );

        Ok(Self {
            device,
            queue,
            max_texture_dim,
        })
    }

    /// Blocking wrapper around [`Gpu::new`].
    pub fn acquire(init: &DeviceInit) -> Result<Self> {
        pollster::block_on(Self::new(init))
    }

    /// Runs `f` inside a validation error scope and returns its value with
    /// the first error raised, if any.
    fn scoped<T>(&self, f: impl FnOnce(&wgpu::Device) -> T) -> (T, Option<wgpu::Error>) {
        let scope = self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let value = f(&self.device);
        let error = pollster::block_on(scope.pop());
        (value, error)
    }

    fn read_back(&self, target: &GpuTarget) -> Result<Image> {
        let row_bytes = target.width * 4;
        let padded_row_bytes = align_to(row_bytes, wgpu::COPY_BYTES_PER_ROW_ALIGNMENT);

        let readback = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("lumen readback"),
            size: padded_row_bytes as u64 * target.height as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("lumen readback encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &target.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row_bytes),
                    rows_per_image: Some(target.height),
                },
            },
            target.extent(),
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = readback.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |res| {
            let _ = tx.send(res);
        });
        self.device
            .poll(wgpu::PollType::wait_indefinitely())
            .map_err(|e| FilterError::context_unavailable(format!("wgpu poll failed: {e:?}")))?;
        rx.recv()
            .map_err(|_| FilterError::context_unavailable("readback channel closed"))?
            .map_err(|e| FilterError::context_unavailable(format!("readback map failed: {e:?}")))?;

        let mapped = slice.get_mapped_range();
        let mut pixels = Vec::with_capacity(row_bytes as usize * target.height as usize);
        for row in mapped.chunks_exact(padded_row_bytes as usize) {
            pixels.extend_from_slice(&row[..row_bytes as usize]);
        }
        drop(mapped);
        readback.unmap();

        Ok(Image::from_rgba8(target.width, target.height, pixels))
    }
}

/// Compiled stage.
pub struct GpuShader {
    stage: ShaderStage,
    module: wgpu::ShaderModule,
}

/// Linked pipeline plus the layout its bind groups must follow.
pub struct GpuProgram {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
}

pub struct GpuTexture {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
}

pub struct GpuBindings {
    bind_group: wgpu::BindGroup,
    _resolution_ubo: wgpu::Buffer,
    _transform_ubo: wgpu::Buffer,
}

pub struct GpuTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl GpuTarget {
    fn extent(&self) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: self.width,
            height: self.height,
            depth_or_array_layers: 1,
        }
    }
}

impl RenderDevice for Gpu {
    type Shader = GpuShader;
    type Program = GpuProgram;
    type Buffer = wgpu::Buffer;
    type Texture = GpuTexture;
    type Bindings = GpuBindings;
    type Target = GpuTarget;

    fn max_texture_dimension(&self) -> u32 {
        self.max_texture_dim
    }

    fn create_target(&mut self, width: u32, height: u32) -> Result<GpuTarget> {
        ensure_fits(&*self, width, height)?;

        let (texture, error) = self.scoped(|device| {
            device.create_texture(&wgpu::TextureDescriptor {
                label: Some("lumen output"),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: PIXEL_FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
                view_formats: &[],
            })
        });
        if let Some(e) = error {
            return Err(FilterError::context_unavailable(format!(
                "output surface allocation failed: {e}"
            )));
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Ok(GpuTarget {
            texture,
            view,
            width,
            height,
        })
    }

    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<GpuShader> {
        let label = shader_label(stage);
        let (module, error) = self.scoped(|device| {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            })
        });
        if let Some(e) = error {
            return Err(FilterError::shader(stage, e.to_string()));
        }
        Ok(GpuShader { stage, module })
    }

    fn link_program(&mut self, vertex: GpuShader, fragment: GpuShader) -> Result<GpuProgram> {
        debug_assert_eq!(vertex.stage, ShaderStage::Vertex);
        debug_assert_eq!(fragment.stage, ShaderStage::Fragment);

        let ((pipeline, bind_group_layout), error) = self.scoped(|device| {
            let bind_group_layout =
                device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("lumen color matrix bgl"),
                    entries: &[
                        wgpu::BindGroupLayoutEntry {
                            binding: 0,
                            visibility: wgpu::ShaderStages::VERTEX,
                            ty: wgpu::BindingType::Buffer {
                                ty: wgpu::BufferBindingType::Uniform,
                                has_dynamic_offset: false,
                                min_binding_size: min_binding_size::<ResolutionUniform>(),
                            },
                            count: None,
                        },
                        wgpu::BindGroupLayoutEntry {
                            binding: 1,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Buffer {
                                ty: wgpu::BufferBindingType::Uniform,
                                has_dynamic_offset: false,
                                min_binding_size: min_binding_size::<ColorTransformUniform>(),
                            },
                            count: None,
                        },
                        wgpu::BindGroupLayoutEntry {
                            binding: 2,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Texture {
                                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                                view_dimension: wgpu::TextureViewDimension::D2,
                                multisampled: false,
                            },
                            count: None,
                        },
                        wgpu::BindGroupLayoutEntry {
                            binding: 3,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                            count: None,
                        },
                    ],
                });

            let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("lumen color matrix pipeline layout"),
                bind_group_layouts: &[&bind_group_layout],
                immediate_size: 0,
            });

            let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("lumen color matrix pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &vertex.module,
                    entry_point: Some(VERTEX_ENTRY),
                    compilation_options: Default::default(),
                    buffers: &[vec2_layout(0), vec2_layout(1)],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &fragment.module,
                    entry_point: Some(FRAGMENT_ENTRY),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: PIXEL_FORMAT,
                        // Output replaces the target; no blending.
                        blend: None,
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

            (pipeline, bind_group_layout)
        });

        if let Some(e) = error {
            return Err(FilterError::shader(ShaderStage::Link, e.to_string()));
        }
        Ok(GpuProgram {
            pipeline,
            bind_group_layout,
        })
    }

    fn create_vertex_buffer(&mut self, label: &str, data: &[f32]) -> Result<wgpu::Buffer> {
        Ok(self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(data),
                usage: wgpu::BufferUsages::VERTEX,
            }))
    }

    fn create_texture(&mut self, image: &Image) -> Result<GpuTexture> {
        let size = wgpu::Extent3d {
            width: image.width,
            height: image.height,
            depth_or_array_layers: 1,
        };

        let (texture, error) = self.scoped(|device| {
            device.create_texture(&wgpu::TextureDescriptor {
                label: Some("lumen source"),
                size,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: PIXEL_FORMAT,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            })
        });
        if let Some(e) = error {
            return Err(FilterError::texture_upload(e.to_string()));
        }

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &image.pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * image.width),
                rows_per_image: Some(image.height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = self.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("lumen source sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Ok(GpuTexture {
            _texture: texture,
            view,
            sampler,
        })
    }

    fn bind_uniforms(
        &mut self,
        program: &GpuProgram,
        texture: &GpuTexture,
        uniforms: &FilterUniforms,
    ) -> Result<GpuBindings> {
        let resolution_ubo = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("lumen resolution ubo"),
                contents: bytemuck::bytes_of(&uniforms.resolution_block()),
                usage: wgpu::BufferUsages::UNIFORM,
            });
        let transform_ubo = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("lumen color transform ubo"),
                contents: bytemuck::bytes_of(&uniforms.transform_block()),
                usage: wgpu::BufferUsages::UNIFORM,
            });

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("lumen color matrix bind group"),
            layout: &program.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: resolution_ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: transform_ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
        });

        Ok(GpuBindings {
            bind_group,
            _resolution_ubo: resolution_ubo,
            _transform_ubo: transform_ubo,
        })
    }

    fn draw(&mut self, target: GpuTarget, pass: DrawPass<'_, Self>) -> Result<Image> {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("lumen draw encoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("lumen color matrix pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            rpass.set_pipeline(&pass.program.pipeline);
            rpass.set_bind_group(0, &pass.bindings.bind_group, &[]);
            rpass.set_vertex_buffer(0, pass.positions.slice(..));
            rpass.set_vertex_buffer(1, pass.tex_coords.slice(..));
            rpass.draw(0..pass.vertex_count, 0..1);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        self.read_back(&target)
    }
}

/// One `vec2<f32>` attribute per buffer, at `location`.
fn vec2_layout(location: u32) -> wgpu::VertexBufferLayout<'static> {
    const POSITION: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];
    const TEX_COORD: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x2];

    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<[f32; 2]>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: if location == 0 { &POSITION } else { &TEX_COORD },
    }
}

fn shader_label(stage: ShaderStage) -> &'static str {
    match stage {
        ShaderStage::Vertex => "lumen color matrix vs",
        ShaderStage::Fragment => "lumen color matrix fs",
        ShaderStage::Link => "lumen color matrix program",
    }
}

fn align_to(value: u32, alignment: u32) -> u32 {
    let mask = alignment - 1;
    (value + mask) & !mask
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readback_rows_are_aligned() {
        assert_eq!(align_to(4, 256), 256);
        assert_eq!(align_to(256, 256), 256);
        assert_eq!(align_to(257 * 4, 256), 1280);
    }

    #[test]
    fn shader_labels_name_their_stage() {
        assert_eq!(shader_label(ShaderStage::Vertex), "lumen color matrix vs");
        assert_eq!(shader_label(ShaderStage::Fragment), "lumen color matrix fs");
        assert_eq!(shader_label(ShaderStage::Link), "lumen color matrix program");
    }

    #[test]
    fn vertex_layouts_use_separate_locations() {
        assert_eq!(vec2_layout(0).attributes[0].shader_location, 0);
        assert_eq!(vec2_layout(1).attributes[0].shader_location, 1);
        assert_eq!(vec2_layout(1).array_stride, 8);
    }
}
