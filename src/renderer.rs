use std::collections::HashMap;
use std::num::NonZeroU64;
use std::sync::Arc;

use anyhow::{Context, Result};
use glam::Vec3;
use log::{debug, info};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::camera::Camera;
use crate::error::SceneError;
use crate::geometry::{Geometry, GeometryId, Vertex};
use crate::scene::{Lighting, NodeKind, SceneGraph, Shading};
use crate::traits::RenderSurface;

pub const MAX_DIRECTIONAL_LIGHTS: usize = 4;
pub const MAX_POINT_LIGHTS: usize = 16;
const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const INITIAL_OBJECT_CAPACITY: usize = 64;
// #222222 in linear space
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.016,
    g: 0.016,
    b: 0.016,
    a: 1.0,
};

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    /// xyz: direction or position, w: intensity
    pub vector: [f32; 4],
    pub color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalsUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 4],
    pub ambient: [f32; 4],
    /// x: directional lights, y: point lights
    pub counts: [u32; 4],
    pub directional: [LightUniform; MAX_DIRECTIONAL_LIGHTS],
    pub points: [LightUniform; MAX_POINT_LIGHTS],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    /// rgb: base colour, w: shading mode
    pub color: [f32; 4],
}

/// One mesh draw of a frame
#[derive(Debug, Clone, Copy)]
pub struct DrawItem {
    pub geometry: GeometryId,
    pub object: ObjectUniform,
}

/// Everything a frame uploads, gathered from the scene graph in draw order
#[derive(Debug, Clone)]
pub struct FrameData {
    pub globals: GlobalsUniform,
    pub draws: Vec<DrawItem>,
    /// Point lights beyond [`MAX_POINT_LIGHTS`], not lit
    pub dropped_lights: usize,
}

fn shading_mode(shading: Shading) -> f32 {
    match shading {
        Shading::Flat => 0.0,
        Shading::Smooth => 1.0,
        Shading::Unlit => 2.0,
    }
}

impl FrameData {
    pub fn collect(scene: &SceneGraph, camera: &Camera) -> Self {
        let mut globals = GlobalsUniform {
            view_proj: camera.view_projection().to_cols_array_2d(),
            camera_pos: camera.position().extend(1.0).to_array(),
            ambient: [0.0; 4],
            counts: [0; 4],
            directional: [LightUniform::default(); MAX_DIRECTIONAL_LIGHTS],
            points: [LightUniform::default(); MAX_POINT_LIGHTS],
        };
        Self::write_lighting(&mut globals, &scene.lighting);

        let mut draws = Vec::new();
        let mut points = 0;
        let mut dropped_lights = 0;
        scene.visit_world(|_, node, world| match node.kind() {
            NodeKind::Mesh(mesh) => {
                let [r, g, b] = mesh.material.color.to_array();
                draws.push(DrawItem {
                    geometry: mesh.geometry().id(),
                    object: ObjectUniform {
                        model: world.to_cols_array_2d(),
                        color: [r, g, b, shading_mode(mesh.material.shading)],
                    },
                });
            }
            NodeKind::PointLight(light) if points < MAX_POINT_LIGHTS => {
                let position = world.transform_point3(Vec3::ZERO);
                let [r, g, b] = light.color.to_array();
                globals.points[points] = LightUniform {
                    vector: position.extend(light.intensity).to_array(),
                    color: [r, g, b, 1.0],
                };
                points += 1;
            }
            NodeKind::PointLight(_) => dropped_lights += 1,
            NodeKind::Group => {}
        });
        globals.counts[1] = points as u32;

        Self {
            globals,
            draws,
            dropped_lights,
        }
    }

    fn write_lighting(globals: &mut GlobalsUniform, lighting: &Lighting) {
        if let Some(ambient) = lighting.ambient {
            let [r, g, b] = ambient.to_array();
            globals.ambient = [r, g, b, 1.0];
        }
        let lights = lighting.directional.iter().take(MAX_DIRECTIONAL_LIGHTS);
        for (slot, light) in globals.directional.iter_mut().zip(lights) {
            let [r, g, b] = light.color.to_array();
            *slot = LightUniform {
                vector: light.direction.extend(light.intensity).to_array(),
                color: [r, g, b, 1.0],
            };
        }
        globals.counts[0] = lighting.directional.len().min(MAX_DIRECTIONAL_LIGHTS) as u32;
    }
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    fn upload(device: &wgpu::Device, geometry: &Geometry) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertices"),
            contents: bytemuck::cast_slice(geometry.vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Indices"),
            contents: bytemuck::cast_slice(geometry.indices()),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: geometry.indices().len() as u32,
        }
    }
}

struct PreparedUi {
    primitives: Vec<egui::ClippedPrimitive>,
    textures: egui::TexturesDelta,
    screen: egui_wgpu::ScreenDescriptor,
}

struct UiLayer {
    ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
    pending: Option<PreparedUi>,
}

/// wgpu forward renderer for scene graphs, with an optional egui overlay.
///
/// GPU buffers are cached per geometry id and dropped as soon as the scene
/// reports the geometry released.
pub struct MeshRenderer {
    window: Arc<Window>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    pipeline: wgpu::RenderPipeline,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    object_layout: wgpu::BindGroupLayout,
    object_buffer: wgpu::Buffer,
    object_bind_group: wgpu::BindGroup,
    object_stride: u64,
    object_capacity: usize,
    meshes: HashMap<GeometryId, GpuMesh>,
    ui: Option<UiLayer>,
}

impl MeshRenderer {
    pub async fn new(window: Arc<Window>, with_ui: bool) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let surface = instance
            .create_surface(window.clone())
            .context("failed to create window surface")?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a compatible GPU adapter")?;
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                experimental_features: Default::default(),
                trace: Default::default(),
            })
            .await
            .context("failed to open GPU device")?;

        let config = Self::create_surface_config(&surface, &adapter, size.width, size.height)?;
        surface.configure(&device, &config);
        let depth_view = Self::create_depth_view(&device, config.width, config.height);

        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("globals_bind_group_layout"),
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
        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("object_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(std::mem::size_of::<ObjectUniform>() as u64),
                },
                count: None,
            }],
        });

        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Globals Buffer"),
            size: std::mem::size_of::<GlobalsUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals_bind_group"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let object_stride = (std::mem::size_of::<ObjectUniform>() as u64).div_ceil(alignment) * alignment;
        let (object_buffer, object_bind_group) = Self::create_object_buffer(
            &device,
            &object_layout,
            object_stride,
            INITIAL_OBJECT_CAPACITY,
        );

        let pipeline = Self::create_pipeline(&device, &globals_layout, &object_layout, config.format);

        let ui = with_ui.then(|| {
            let ctx = egui::Context::default();
            let state = egui_winit::State::new(
                ctx.clone(),
                egui::ViewportId::ROOT,
                &window,
                Some(window.scale_factor() as f32),
                None,
                None,
            );
            let renderer = egui_wgpu::Renderer::new(
                &device,
                config.format,
                egui_wgpu::RendererOptions::default(),
            );
            UiLayer {
                ctx,
                state,
                renderer,
                pending: None,
            }
        });

        info!(
            "renderer ready: {}x{} {:?}, ui {}",
            config.width,
            config.height,
            config.format,
            if with_ui { "on" } else { "off" }
        );

        Ok(Self {
            window,
            device,
            queue,
            surface,
            config,
            depth_view,
            pipeline,
            globals_buffer,
            globals_bind_group,
            object_layout,
            object_buffer,
            object_bind_group,
            object_stride,
            object_capacity: INITIAL_OBJECT_CAPACITY,
            meshes: HashMap::new(),
            ui,
        })
    }

    fn create_surface_config(
        surface: &wgpu::Surface,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
    ) -> Result<wgpu::SurfaceConfiguration> {
        let caps = surface.get_capabilities(adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .context("surface reports no supported formats")?;

        Ok(wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: caps.present_modes.first().copied().unwrap_or_default(),
            alpha_mode: caps.alpha_modes.first().copied().unwrap_or_default(),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        })
    }

    fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    fn create_object_buffer(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        stride: u64,
        capacity: usize,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Object Buffer"),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("object_bind_group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<ObjectUniform>() as u64),
                }),
            }],
        });
        (buffer, bind_group)
    }

    fn create_pipeline(
        device: &wgpu::Device,
        globals_layout: &wgpu::BindGroupLayout,
        object_layout: &wgpu::BindGroupLayout,
        surface_format: wgpu::TextureFormat,
    ) -> wgpu::RenderPipeline {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("mesh.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[globals_layout, object_layout],
            push_constant_ranges: &[],
        });

        let vertex_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3],
        };

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Mesh Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[vertex_layout],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // leaves and petals are seen from both sides
                cull_mode: None,
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
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        })
    }

    /// Let the overlay see a window event first; true when it consumed it
    pub fn handle_event(&mut self, event: &winit::event::WindowEvent) -> bool {
        match self.ui.as_mut() {
            Some(ui) => ui.state.on_window_event(&self.window, event).consumed,
            None => false,
        }
    }

    /// Run the overlay UI for the next frame. The result is painted by the
    /// next [`render`](RenderSurface::render).
    pub fn run_ui(&mut self, run: impl FnMut(&egui::Context)) {
        let Some(ui) = self.ui.as_mut() else {
            return;
        };
        let raw_input = ui.state.take_egui_input(&self.window);
        let output = ui.ctx.run(raw_input, run);
        ui.state
            .handle_platform_output(&self.window, output.platform_output);

        // texture uploads of an unpainted frame must not be lost
        let mut textures = ui.pending.take().map(|p| p.textures).unwrap_or_default();
        textures.append(output.textures_delta);

        let primitives = ui.ctx.tessellate(output.shapes, output.pixels_per_point);
        ui.pending = Some(PreparedUi {
            primitives,
            textures,
            screen: egui_wgpu::ScreenDescriptor {
                size_in_pixels: [self.config.width, self.config.height],
                pixels_per_point: output.pixels_per_point,
            },
        });
    }

    /// Upload geometry that appeared since the last frame and free the
    /// buffers of geometry the scene has released
    fn sync_meshes(&mut self, scene: &SceneGraph) {
        let before = self.meshes.len();
        self.meshes.retain(|id, _| scene.is_geometry_live(*id));
        let freed = before - self.meshes.len();

        let device = &self.device;
        let meshes = &mut self.meshes;
        let mut uploaded = 0;
        scene.visit_world(|_, node, _| {
            if let Some(mesh) = node.as_mesh() {
                let geometry = mesh.geometry();
                meshes.entry(geometry.id()).or_insert_with(|| {
                    uploaded += 1;
                    GpuMesh::upload(device, geometry)
                });
            }
        });

        if freed > 0 || uploaded > 0 {
            debug!("gpu meshes: {uploaded} uploaded, {freed} freed, {} cached", self.meshes.len());
        }
    }

    fn write_objects(&mut self, draws: &[DrawItem]) {
        if draws.len() > self.object_capacity {
            self.object_capacity = draws.len().next_power_of_two();
            let (buffer, bind_group) = Self::create_object_buffer(
                &self.device,
                &self.object_layout,
                self.object_stride,
                self.object_capacity,
            );
            self.object_buffer = buffer;
            self.object_bind_group = bind_group;
        }

        let stride = self.object_stride as usize;
        let mut bytes = vec![0u8; stride * draws.len()];
        for (chunk, draw) in bytes.chunks_exact_mut(stride).zip(draws) {
            let object = bytemuck::bytes_of(&draw.object);
            chunk[..object.len()].copy_from_slice(object);
        }
        if !bytes.is_empty() {
            self.queue.write_buffer(&self.object_buffer, 0, &bytes);
        }
    }
}

impl RenderSurface for MeshRenderer {
    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = Self::create_depth_view(&self.device, width, height);
    }

    fn render(&mut self, scene: &SceneGraph, camera: &Camera) -> crate::error::Result<()> {
        self.sync_meshes(scene);
        let frame = FrameData::collect(scene, camera);
        if frame.dropped_lights > 0 {
            debug!("{} point lights over the shader limit were skipped", frame.dropped_lights);
        }
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&frame.globals));
        self.write_objects(&frame.draws);

        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return Err(SceneError::Surface("surface lost, reconfigured".to_string()));
            }
            Err(err) => return Err(SceneError::Surface(err.to_string())),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.globals_bind_group, &[]);
            for (index, draw) in frame.draws.iter().enumerate() {
                let Some(mesh) = self.meshes.get(&draw.geometry) else {
                    continue;
                };
                let offset = (index as u64 * self.object_stride) as u32;
                pass.set_bind_group(1, &self.object_bind_group, &[offset]);
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }

        let mut ui_commands = Vec::new();
        if let Some(ui) = self.ui.as_mut() {
            if let Some(prepared) = ui.pending.take() {
                for (id, delta) in &prepared.textures.set {
                    ui.renderer
                        .update_texture(&self.device, &self.queue, *id, delta);
                }
                ui_commands = ui.renderer.update_buffers(
                    &self.device,
                    &self.queue,
                    &mut encoder,
                    &prepared.primitives,
                    &prepared.screen,
                );
                {
                    let mut pass = encoder
                        .begin_render_pass(&wgpu::RenderPassDescriptor {
                            label: Some("egui Pass"),
                            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                                view: &view,
                                resolve_target: None,
                                ops: wgpu::Operations {
                                    load: wgpu::LoadOp::Load,
                                    store: wgpu::StoreOp::Store,
                                },
                                depth_slice: None,
                            })],
                            depth_stencil_attachment: None,
                            occlusion_query_set: None,
                            timestamp_writes: None,
                        })
                        .forget_lifetime();
                    ui.renderer
                        .render(&mut pass, &prepared.primitives, &prepared.screen);
                }
                for id in &prepared.textures.free {
                    ui.renderer.free_texture(id);
                }
            }
        }

        self.queue
            .submit(ui_commands.into_iter().chain(std::iter::once(encoder.finish())));
        output.present();
        Ok(())
    }
}
