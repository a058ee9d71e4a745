use gpu::RenderFrame;
use layers::TextureLayer;
use scene::globe::GlobeLayer;

/// Which compositor canvas feeds a globe layer. Night lights come from a
/// separate image instead.
pub fn texture_source(layer: GlobeLayer) -> Option<TextureLayer> {
    match layer {
        GlobeLayer::Base => Some(TextureLayer::Map),
        GlobeLayer::NightLights => None,
        GlobeLayer::Stroke => Some(TextureLayer::Strokes),
        GlobeLayer::Hover => Some(TextureLayer::Highlight),
        GlobeLayer::Click => Some(TextureLayer::Click),
    }
}

pub fn globe_layer_for(texture: TextureLayer) -> GlobeLayer {
    match texture {
        TextureLayer::Map => GlobeLayer::Base,
        TextureLayer::Strokes => GlobeLayer::Stroke,
        TextureLayer::Highlight => GlobeLayer::Hover,
        TextureLayer::Click => GlobeLayer::Click,
    }
}

#[cfg(target_arch = "wasm32")]
mod imp {
    use super::RenderFrame;
    use ::wgpu::util::DeviceExt;
    use scene::globe::{GlobeLayer, SphereMesh};
    use std::borrow::Cow;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;

    const GLOBE_SHADER: &str = r#"
struct Layer {
    view_proj: mat4x4<f32>,
    model: mat4x4<f32>,
    sun_dir: vec3<f32>,
    radius: f32,
};

@group(0) @binding(0)
var<uniform> layer: Layer;

@group(1) @binding(0)
var layer_tex: texture_2d<f32>;
@group(1) @binding(1)
var layer_sampler: sampler;

struct VsOut {
    @builtin(position) pos: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) normal: vec3<f32>,
};

@vertex
fn vs_main(@location(0) position: vec3<f32>, @location(1) uv: vec2<f32>) -> VsOut {
    let world = layer.model * vec4<f32>(position * layer.radius, 1.0);
    // Map textures are stored north-up.
    return VsOut(
        layer.view_proj * world,
        vec2<f32>(uv.x, 1.0 - uv.y),
        (layer.model * vec4<f32>(position, 0.0)).xyz,
    );
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    return textureSample(layer_tex, layer_sampler, in.uv);
}

@fragment
fn fs_lights(in: VsOut) -> @location(0) vec4<f32> {
    let sun = dot(normalize(in.normal), normalize(layer.sun_dir));
    let night = smoothstep(0.1, -0.15, sun);
    let lights = textureSample(layer_tex, layer_sampler, in.uv).rgb;
    return vec4<f32>(lights * night, 1.0);
}
"#;

    const STARS_SHADER: &str = r#"
fn hash_u32(x_in: u32) -> u32 {
    var x = x_in;
    x ^= x >> 16u;
    x *= 0x7feb352du;
    x ^= x >> 15u;
    x *= 0x846ca68bu;
    x ^= x >> 16u;
    return x;
}

fn hash01(x: u32) -> f32 {
    return f32(hash_u32(x)) / 4294967295.0;
}

struct VsOut {
    @builtin(position) pos: vec4<f32>,
    @location(0) a: f32,
};

@vertex
fn vs_main(@builtin(vertex_index) vid: u32) -> VsOut {
    let x = hash01(vid ^ 0x68bc21ebu) * 2.0 - 1.0;
    let y = hash01(vid ^ 0x02e5be93u) * 2.0 - 1.0;
    let b = hash01(vid ^ 0x9e3779b9u);
    return VsOut(vec4<f32>(x, y, 0.9999, 1.0), 0.03 + 0.22 * b * b);
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    return vec4<f32>(1.0, 1.0, 1.0, in.a);
}
"#;

    #[repr(C)]
    #[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
    struct Vertex {
        position: [f32; 3],
        uv: [f32; 2],
    }

    #[repr(C)]
    #[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
    struct LayerUniforms {
        view_proj: [[f32; 4]; 4],
        model: [[f32; 4]; 4],
        sun_dir: [f32; 3],
        radius: f32,
    }

    struct LayerTexture {
        texture: ::wgpu::Texture,
        bind_group: ::wgpu::BindGroup,
        width: u32,
        height: u32,
    }

    struct LayerSlot {
        uniform_buffer: ::wgpu::Buffer,
        uniform_bind_group: ::wgpu::BindGroup,
        texture: Option<LayerTexture>,
    }

    pub struct GpuContext {
        _instance: &'static ::wgpu::Instance,
        surface: ::wgpu::Surface<'static>,
        device: ::wgpu::Device,
        queue: ::wgpu::Queue,
        config: ::wgpu::SurfaceConfiguration,
        depth_view: ::wgpu::TextureView,
        stars_pipeline: ::wgpu::RenderPipeline,
        stars_count: u32,
        base_pipeline: ::wgpu::RenderPipeline,
        overlay_pipeline: ::wgpu::RenderPipeline,
        lights_pipeline: ::wgpu::RenderPipeline,
        texture_layout: ::wgpu::BindGroupLayout,
        sampler: ::wgpu::Sampler,
        vertex_buffer: ::wgpu::Buffer,
        index_buffer: ::wgpu::Buffer,
        index_count: u32,
        slots: Vec<LayerSlot>,
    }

    fn slot(layer: GlobeLayer) -> usize {
        layer.render_order() as usize
    }

    fn create_depth_view(
        device: &::wgpu::Device,
        config: &::wgpu::SurfaceConfiguration,
    ) -> ::wgpu::TextureView {
        let tex = device.create_texture(&::wgpu::TextureDescriptor {
            label: Some("globe-depth"),
            size: ::wgpu::Extent3d {
                width: config.width.max(1),
                height: config.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: ::wgpu::TextureDimension::D2,
            format: ::wgpu::TextureFormat::Depth24Plus,
            usage: ::wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        tex.create_view(&::wgpu::TextureViewDescriptor::default())
    }

    #[allow(clippy::too_many_arguments)]
    fn globe_pipeline(
        device: &::wgpu::Device,
        layout: &::wgpu::PipelineLayout,
        shader: &::wgpu::ShaderModule,
        format: ::wgpu::TextureFormat,
        label: &str,
        fragment_entry: &str,
        blend: ::wgpu::BlendState,
        depth_write: bool,
    ) -> ::wgpu::RenderPipeline {
        device.create_render_pipeline(&::wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(layout),
            vertex: ::wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[::wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as ::wgpu::BufferAddress,
                    step_mode: ::wgpu::VertexStepMode::Vertex,
                    attributes: &[
                        ::wgpu::VertexAttribute {
                            format: ::wgpu::VertexFormat::Float32x3,
                            offset: 0,
                            shader_location: 0,
                        },
                        ::wgpu::VertexAttribute {
                            format: ::wgpu::VertexFormat::Float32x2,
                            offset: 12,
                            shader_location: 1,
                        },
                    ],
                }],
            },
            fragment: Some(::wgpu::FragmentState {
                module: shader,
                entry_point: Some(fragment_entry),
                compilation_options: Default::default(),
                targets: &[Some(::wgpu::ColorTargetState {
                    format,
                    blend: Some(blend),
                    write_mask: ::wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: ::wgpu::PrimitiveState {
                topology: ::wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: ::wgpu::FrontFace::Ccw,
                cull_mode: Some(::wgpu::Face::Back),
                polygon_mode: ::wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(::wgpu::DepthStencilState {
                format: ::wgpu::TextureFormat::Depth24Plus,
                depth_write_enabled: depth_write,
                depth_compare: ::wgpu::CompareFunction::LessEqual,
                stencil: ::wgpu::StencilState::default(),
                bias: ::wgpu::DepthBiasState::default(),
            }),
            multisample: ::wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        })
    }

    pub async fn init_gpu_from_canvas(
        canvas: &web_sys::HtmlCanvasElement,
        mesh: &SphereMesh,
    ) -> Result<GpuContext, JsValue> {
        let width = canvas.width().max(1);
        let height = canvas.height().max(1);

        // A `Surface` must not outlive its `Instance`; the instance is leaked
        // for the lifetime of the page.
        let instance: &'static ::wgpu::Instance = Box::leak(Box::new(::wgpu::Instance::new(
            &::wgpu::InstanceDescriptor {
                backends: ::wgpu::Backends::BROWSER_WEBGPU | ::wgpu::Backends::GL,
                ..Default::default()
            },
        )));

        let surface = instance
            .create_surface(::wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| JsValue::from_str(&format!("surface error: {e}")))?;

        let adapter = instance
            .request_adapter(&::wgpu::RequestAdapterOptions {
                power_preference: ::wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| JsValue::from_str(&format!("adapter error: {e}")))?;

        let (device, queue) = adapter
            .request_device(&::wgpu::DeviceDescriptor {
                label: Some("globe-device"),
                required_features: ::wgpu::Features::empty(),
                required_limits: ::wgpu::Limits::downlevel_webgl2_defaults(),
                ..Default::default()
            })
            .await
            .map_err(|e| JsValue::from_str(&format!("device error: {e}")))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| JsValue::from_str("surface has no formats"))?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(::wgpu::CompositeAlphaMode::Auto);

        let config = ::wgpu::SurfaceConfiguration {
            usage: ::wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            desired_maximum_frame_latency: 2,
            present_mode: ::wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
        };
        surface.configure(&device, &config);
        let depth_view = create_depth_view(&device, &config);

        let shader = device.create_shader_module(::wgpu::ShaderModuleDescriptor {
            label: Some("globe-shader"),
            source: ::wgpu::ShaderSource::Wgsl(Cow::Borrowed(GLOBE_SHADER)),
        });
        let stars_shader = device.create_shader_module(::wgpu::ShaderModuleDescriptor {
            label: Some("stars-shader"),
            source: ::wgpu::ShaderSource::Wgsl(Cow::Borrowed(STARS_SHADER)),
        });

        let uniform_layout = device.create_bind_group_layout(&::wgpu::BindGroupLayoutDescriptor {
            label: Some("globe-layer-uniforms"),
            entries: &[::wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: ::wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: ::wgpu::BindingType::Buffer {
                    ty: ::wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let texture_layout = device.create_bind_group_layout(&::wgpu::BindGroupLayoutDescriptor {
            label: Some("globe-layer-texture"),
            entries: &[
                ::wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ::wgpu::ShaderStages::FRAGMENT,
                    ty: ::wgpu::BindingType::Texture {
                        sample_type: ::wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: ::wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                ::wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: ::wgpu::ShaderStages::FRAGMENT,
                    ty: ::wgpu::BindingType::Sampler(::wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&::wgpu::PipelineLayoutDescriptor {
            label: Some("globe-pipeline-layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            immediate_size: 0,
        });
        let stars_layout = device.create_pipeline_layout(&::wgpu::PipelineLayoutDescriptor {
            label: Some("stars-pipeline-layout"),
            bind_group_layouts: &[],
            immediate_size: 0,
        });

        let stars_pipeline = device.create_render_pipeline(&::wgpu::RenderPipelineDescriptor {
            label: Some("stars-pipeline"),
            layout: Some(&stars_layout),
            vertex: ::wgpu::VertexState {
                module: &stars_shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[],
            },
            fragment: Some(::wgpu::FragmentState {
                module: &stars_shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(::wgpu::ColorTargetState {
                    format,
                    blend: Some(::wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: ::wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: ::wgpu::PrimitiveState {
                topology: ::wgpu::PrimitiveTopology::PointList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: ::wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let additive = ::wgpu::BlendState {
            color: ::wgpu::BlendComponent {
                src_factor: ::wgpu::BlendFactor::One,
                dst_factor: ::wgpu::BlendFactor::One,
                operation: ::wgpu::BlendOperation::Add,
            },
            alpha: ::wgpu::BlendComponent::OVER,
        };
        let base_pipeline = globe_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            format,
            "globe-base-pipeline",
            "fs_main",
            ::wgpu::BlendState::REPLACE,
            true,
        );
        let overlay_pipeline = globe_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            format,
            "globe-overlay-pipeline",
            "fs_main",
            ::wgpu::BlendState::ALPHA_BLENDING,
            false,
        );
        let lights_pipeline = globe_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            format,
            "globe-lights-pipeline",
            "fs_lights",
            additive,
            false,
        );

        let vertices: Vec<Vertex> = mesh
            .vertices
            .iter()
            .map(|v| Vertex {
                position: v.position.to_f32(),
                uv: [v.uv[0] as f32, v.uv[1] as f32],
            })
            .collect();
        let vertex_buffer = device.create_buffer_init(&::wgpu::util::BufferInitDescriptor {
            label: Some("globe-vertices"),
            contents: bytemuck::cast_slice(&vertices),
            usage: ::wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&::wgpu::util::BufferInitDescriptor {
            label: Some("globe-indices"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: ::wgpu::BufferUsages::INDEX,
        });

        let sampler = device.create_sampler(&::wgpu::SamplerDescriptor {
            label: Some("globe-sampler"),
            address_mode_u: ::wgpu::AddressMode::Repeat,
            address_mode_v: ::wgpu::AddressMode::ClampToEdge,
            mag_filter: ::wgpu::FilterMode::Linear,
            min_filter: ::wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let slots = GlobeLayer::ALL
            .iter()
            .map(|layer| {
                let uniform_buffer = device.create_buffer(&::wgpu::BufferDescriptor {
                    label: Some(layer.name()),
                    size: std::mem::size_of::<LayerUniforms>() as u64,
                    usage: ::wgpu::BufferUsages::UNIFORM | ::wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });
                let uniform_bind_group = device.create_bind_group(&::wgpu::BindGroupDescriptor {
                    label: Some(layer.name()),
                    layout: &uniform_layout,
                    entries: &[::wgpu::BindGroupEntry {
                        binding: 0,
                        resource: uniform_buffer.as_entire_binding(),
                    }],
                });
                LayerSlot {
                    uniform_buffer,
                    uniform_bind_group,
                    texture: None,
                }
            })
            .collect();

        Ok(GpuContext {
            _instance: instance,
            surface,
            device,
            queue,
            config,
            depth_view,
            stars_pipeline,
            stars_count: 1200,
            base_pipeline,
            overlay_pipeline,
            lights_pipeline,
            texture_layout,
            sampler,
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
            slots,
        })
    }

    pub fn resize_gpu(ctx: &mut GpuContext, width: u32, height: u32) {
        ctx.config.width = width.max(1);
        ctx.config.height = height.max(1);
        ctx.surface.configure(&ctx.device, &ctx.config);
        ctx.depth_view = create_depth_view(&ctx.device, &ctx.config);
    }

    /// Uploads RGBA8 pixels for `layer`, recreating the texture when the size
    /// changed (tier upgrade).
    pub fn upload_layer_texture(
        ctx: &mut GpuContext,
        layer: GlobeLayer,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || rgba.len() != expected {
            tracing::warn!(
                layer = layer.name(),
                width,
                height,
                len = rgba.len(),
                "bad texture upload"
            );
            return;
        }
        let slot = &mut ctx.slots[slot(layer)];
        let reuse = slot
            .texture
            .as_ref()
            .is_some_and(|t| t.width == width && t.height == height);
        if !reuse {
            let texture = ctx.device.create_texture(&::wgpu::TextureDescriptor {
                label: Some(layer.name()),
                size: ::wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: ::wgpu::TextureDimension::D2,
                format: ::wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: ::wgpu::TextureUsages::TEXTURE_BINDING | ::wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            });
            let view = texture.create_view(&::wgpu::TextureViewDescriptor::default());
            let bind_group = ctx.device.create_bind_group(&::wgpu::BindGroupDescriptor {
                label: Some(layer.name()),
                layout: &ctx.texture_layout,
                entries: &[
                    ::wgpu::BindGroupEntry {
                        binding: 0,
                        resource: ::wgpu::BindingResource::TextureView(&view),
                    },
                    ::wgpu::BindGroupEntry {
                        binding: 1,
                        resource: ::wgpu::BindingResource::Sampler(&ctx.sampler),
                    },
                ],
            });
            slot.texture = Some(LayerTexture {
                texture,
                bind_group,
                width,
                height,
            });
        }
        if let Some(t) = &slot.texture {
            ctx.queue.write_texture(
                ::wgpu::TexelCopyTextureInfo {
                    texture: &t.texture,
                    mip_level: 0,
                    origin: ::wgpu::Origin3d::ZERO,
                    aspect: ::wgpu::TextureAspect::All,
                },
                rgba,
                ::wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * width),
                    rows_per_image: Some(height),
                },
                ::wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
            );
        }
    }

    /// Stars, then one draw per command in render order. Layers whose
    /// texture has not been uploaded yet are skipped.
    pub fn render_frame(ctx: &GpuContext, frame: &RenderFrame) -> Result<(), JsValue> {
        let surface_texture = ctx
            .surface
            .get_current_texture()
            .map_err(|e| JsValue::from_str(&format!("surface acquire failed: {e}")))?;
        let view = surface_texture
            .texture
            .create_view(&::wgpu::TextureViewDescriptor::default());

        for cmd in &frame.commands {
            let uniforms = LayerUniforms {
                view_proj: frame.view_proj,
                model: frame.model,
                sun_dir: frame.sun_dir,
                radius: cmd.radius,
            };
            ctx.queue.write_buffer(
                &ctx.slots[slot(cmd.layer)].uniform_buffer,
                0,
                bytemuck::bytes_of(&uniforms),
            );
        }

        let mut encoder = ctx
            .device
            .create_command_encoder(&::wgpu::CommandEncoderDescriptor {
                label: Some("globe-encoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&::wgpu::RenderPassDescriptor {
                label: Some("stars-pass"),
                color_attachments: &[Some(::wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: ::wgpu::Operations {
                        load: ::wgpu::LoadOp::Clear(::wgpu::Color {
                            r: 0.004,
                            g: 0.008,
                            b: 0.016,
                            a: 1.0,
                        }),
                        store: ::wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
                multiview_mask: None,
            });
            rpass.set_pipeline(&ctx.stars_pipeline);
            rpass.draw(0..ctx.stars_count, 0..1);
        }

        {
            let mut rpass = encoder.begin_render_pass(&::wgpu::RenderPassDescriptor {
                label: Some("globe-pass"),
                color_attachments: &[Some(::wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: ::wgpu::Operations {
                        load: ::wgpu::LoadOp::Load,
                        store: ::wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(::wgpu::RenderPassDepthStencilAttachment {
                    view: &ctx.depth_view,
                    depth_ops: Some(::wgpu::Operations {
                        load: ::wgpu::LoadOp::Clear(1.0),
                        store: ::wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
                multiview_mask: None,
            });
            rpass.set_vertex_buffer(0, ctx.vertex_buffer.slice(..));
            rpass.set_index_buffer(ctx.index_buffer.slice(..), ::wgpu::IndexFormat::Uint32);

            for cmd in &frame.commands {
                let layer_slot = &ctx.slots[slot(cmd.layer)];
                let Some(texture) = &layer_slot.texture else {
                    continue;
                };
                let pipeline = match cmd.layer {
                    GlobeLayer::Base => &ctx.base_pipeline,
                    GlobeLayer::NightLights => &ctx.lights_pipeline,
                    _ => &ctx.overlay_pipeline,
                };
                rpass.set_pipeline(pipeline);
                rpass.set_bind_group(0, &layer_slot.uniform_bind_group, &[]);
                rpass.set_bind_group(1, &texture.bind_group, &[]);
                rpass.draw_indexed(0..ctx.index_count, 0, 0..1);
            }
        }

        ctx.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    pub fn canvas_by_id(id: &str) -> Result<web_sys::HtmlCanvasElement, JsValue> {
        web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id))
            .ok_or_else(|| JsValue::from_str(&format!("canvas #{id} missing")))?
            .dyn_into::<web_sys::HtmlCanvasElement>()
            .map_err(|_| JsValue::from_str(&format!("#{id} is not a canvas")))
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod imp {
    use super::RenderFrame;
    use scene::globe::{GlobeLayer, SphereMesh};
    use wasm_bindgen::prelude::JsValue;

    #[derive(Debug, Default)]
    pub struct GpuContext;

    pub async fn init_gpu_from_canvas(
        _canvas: &web_sys::HtmlCanvasElement,
        _mesh: &SphereMesh,
    ) -> Result<GpuContext, JsValue> {
        Err(JsValue::from_str(
            "wgpu initialization is only available on wasm32 targets",
        ))
    }

    pub fn resize_gpu(_ctx: &mut GpuContext, _width: u32, _height: u32) {}

    pub fn upload_layer_texture(
        _ctx: &mut GpuContext,
        _layer: GlobeLayer,
        _width: u32,
        _height: u32,
        _rgba: &[u8],
    ) {
    }

    pub fn render_frame(_ctx: &GpuContext, _frame: &RenderFrame) -> Result<(), JsValue> {
        Err(JsValue::from_str(
            "wgpu rendering is only available on wasm32 targets",
        ))
    }

    pub fn canvas_by_id(_id: &str) -> Result<web_sys::HtmlCanvasElement, JsValue> {
        Err(JsValue::from_str("no DOM outside wasm32 targets"))
    }
}

pub use imp::{
    GpuContext, canvas_by_id, init_gpu_from_canvas, render_frame, resize_gpu,
    upload_layer_texture,
};
