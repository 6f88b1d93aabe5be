//! wgpu implementation of [`Renderer`].
//!
//! Each particle is drawn as an instanced, camera-facing square. A field's
//! GPU resources are its position buffer (geometry) and its material uniform
//! buffer; both are destroyed explicitly when the field is released.

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use log::{debug, info, warn};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::backdrop::SceneBackdrop;
use crate::camera::Viewport;
use crate::error::{GpuError, RenderError};
use crate::field::ParticleField;
use crate::renderer::{Frame, Renderer};
use crate::visuals::{BlendMode, Material};

/// Particle vertex and fragment shader.
pub(crate) const PARTICLE_SHADER: &str = include_str!("particles.wgsl");

/// Vertices per particle quad.
const QUAD_VERTICES: u32 = 6;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct FrameUniforms {
    view: [[f32; 4]; 4],
    proj: [[f32; 4]; 4],
    fog_color: [f32; 4],
    fog_near: f32,
    fog_far: f32,
    _padding: [f32; 2],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct FieldUniforms {
    model: [[f32; 4]; 4],
    color: [f32; 4],
    size: f32,
    _padding: [f32; 3],
}

/// GPU resources for one particle field.
pub struct GpuField {
    position_buffer: wgpu::Buffer,
    material_buffer: wgpu::Buffer,
    material_bind_group: wgpu::BindGroup,
    /// Index into `GpuState::pipelines`.
    pipeline: usize,
    num_particles: u32,
}

/// Blend behaviour a pipeline was built for; `None` is opaque.
type PipelineKey = Option<BlendMode>;

/// Renders weather backgrounds into a window surface.
pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    shader: wgpu::ShaderModule,
    pipeline_layout: wgpu::PipelineLayout,
    pipelines: Vec<(PipelineKey, wgpu::RenderPipeline)>,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    field_bind_group_layout: wgpu::BindGroupLayout,
    clear_color: wgpu::Color,
    fog: [f32; 4],
    fog_range: (f32, f32),
    disposed: bool,
}

impl GpuState {
    /// Create a renderer bound to `window`. Blocks on adapter and device requests.
    pub fn new(window: Arc<Window>, vsync: bool) -> Result<Self, GpuError> {
        pollster::block_on(Self::new_async(window, vsync))
    }

    async fn new_async(window: Arc<Window>, vsync: bool) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Weather Backdrop Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(GpuError::UnsupportedSurface)?;

        // Let the page behind show through where the compositor allows it.
        let alpha_mode = [
            wgpu::CompositeAlphaMode::PreMultiplied,
            wgpu::CompositeAlphaMode::PostMultiplied,
        ]
        .into_iter()
        .find(|mode| surface_caps.alpha_modes.contains(mode))
        .or_else(|| surface_caps.alpha_modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: if vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let frame_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Frame Uniform Buffer"),
            contents: bytemuck::bytes_of(&FrameUniforms::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let frame_bind_group_layout = uniform_layout(&device, "Frame Bind Group Layout");
        let field_bind_group_layout = uniform_layout(&device, "Field Bind Group Layout");

        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &frame_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Particle Shader"),
            source: wgpu::ShaderSource::Wgsl(PARTICLE_SHADER.into()),
        });

        let pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Particle Pipeline Layout"),
                bind_group_layouts: &[&frame_bind_group_layout, &field_bind_group_layout],
                push_constant_ranges: &[],
            });

        info!(
            "GPU renderer ready: {} ({:?}), format {:?}, alpha {:?}",
            adapter.get_info().name,
            adapter.get_info().backend,
            config.format,
            config.alpha_mode
        );

        let backdrop = SceneBackdrop::default();
        Ok(Self {
            surface,
            device,
            queue,
            config,
            shader,
            pipeline_layout,
            pipelines: Vec::new(),
            frame_buffer,
            frame_bind_group,
            field_bind_group_layout,
            clear_color: clear_color(&backdrop),
            fog: fog_color(&backdrop),
            fog_range: (backdrop.fog.near, backdrop.fog.far),
            disposed: false,
        })
    }

    fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Index of the pipeline that draws `material`, building it on first use.
    fn pipeline_for(&mut self, material: &Material) -> usize {
        let key = pipeline_key(material);
        if let Some(index) = self.pipelines.iter().position(|(k, _)| *k == key) {
            return index;
        }

        let pipeline = self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Particle Pipeline"),
            layout: Some(&self.pipeline_layout),
            vertex: wgpu::VertexState {
                module: &self.shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &[wgpu::VertexAttribute {
                        offset: 0,
                        shader_location: 0,
                        format: wgpu::VertexFormat::Float32x3, // position
                    }],
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &self.shader,
                entry_point: Some("fs_main"),
                targets: &[Some(color_target(self.config.format, material))],
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
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        debug!("Built particle pipeline for {:?}", key);
        self.pipelines.push((key, pipeline));
        self.pipelines.len() - 1
    }
}

impl Renderer for GpuState {
    type Field = GpuField;

    fn create_field(&mut self, field: &ParticleField) -> GpuField {
        // An empty vertex buffer is not allowed; pad to one particle.
        let mut contents = field.position_bytes().to_vec();
        if contents.is_empty() {
            contents.resize(std::mem::size_of::<[f32; 3]>(), 0);
        }
        let position_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particle Position Buffer"),
            contents: &contents,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        let pipeline = self.pipeline_for(field.material());

        let material = field_uniforms(field, field.model_matrix());
        let material_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particle Material Buffer"),
            contents: bytemuck::bytes_of(&material),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let material_bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Particle Material Bind Group"),
            layout: &self.field_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: material_buffer.as_entire_binding(),
            }],
        });

        debug!("Allocated GPU field: {} particles", field.len());
        GpuField {
            position_buffer,
            material_buffer,
            material_bind_group,
            pipeline,
            num_particles: field.len() as u32,
        }
    }

    fn upload_positions(&mut self, resources: &mut GpuField, field: &ParticleField) {
        if field.is_empty() {
            return;
        }
        self.queue
            .write_buffer(&resources.position_buffer, 0, field.position_bytes());
    }

    fn release_field(&mut self, resources: GpuField) {
        resources.position_buffer.destroy();
        resources.material_buffer.destroy();
    }

    fn set_backdrop(&mut self, backdrop: &SceneBackdrop) {
        self.clear_color = clear_color(backdrop);
        self.fog = fog_color(backdrop);
        self.fog_range = (backdrop.fog.near, backdrop.fog.far);
    }

    fn resize(&mut self, viewport: Viewport) {
        let (width, height) = viewport.physical_size();
        if self.disposed || (width == self.config.width && height == self.config.height) {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.reconfigure();
    }

    fn render(&mut self, frame: &Frame<'_, GpuField>) -> Result<(), RenderError> {
        if self.disposed {
            return Err(RenderError::Disposed);
        }

        let uniforms = FrameUniforms {
            view: frame.view.to_cols_array_2d(),
            proj: frame.projection.to_cols_array_2d(),
            fog_color: self.fog,
            fog_near: self.fog_range.0,
            fog_far: self.fog_range.1,
            _padding: [0.0; 2],
        };
        self.queue
            .write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&uniforms));

        if let Some(field) = &frame.field {
            let material = field_uniforms(field.particles, field.model);
            self.queue.write_buffer(
                &field.resources.material_buffer,
                0,
                bytemuck::bytes_of(&material),
            );
        }

        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(e @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                self.reconfigure();
                return Err(e.into());
            }
            Err(e) => return Err(e.into()),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Background Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Background Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let drawable = frame.field.as_ref().and_then(|field| {
                let (_, pipeline) = self.pipelines.get(field.resources.pipeline)?;
                Some((field, pipeline))
            });
            if let Some((field, pipeline)) = drawable {
                if field.resources.num_particles > 0 {
                    render_pass.set_pipeline(pipeline);
                    render_pass.set_bind_group(0, &self.frame_bind_group, &[]);
                    render_pass.set_bind_group(1, &field.resources.material_bind_group, &[]);
                    render_pass.set_vertex_buffer(0, field.resources.position_buffer.slice(..));
                    render_pass.draw(0..QUAD_VERTICES, 0..field.resources.num_particles);
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    fn dispose(&mut self) {
        if self.disposed {
            warn!("GPU renderer disposed twice");
            return;
        }
        self.disposed = true;
        self.frame_buffer.destroy();
        info!("GPU renderer disposed");
    }
}

fn uniform_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
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
    })
}

fn pipeline_key(material: &Material) -> PipelineKey {
    material.transparent.then_some(material.blend_mode)
}

/// Colour target for `material`; opaque materials are written without blending.
fn color_target(format: wgpu::TextureFormat, material: &Material) -> wgpu::ColorTargetState {
    wgpu::ColorTargetState {
        format,
        blend: pipeline_key(material).map(|mode| mode.to_blend_state()),
        write_mask: wgpu::ColorWrites::ALL,
    }
}

fn field_uniforms(field: &ParticleField, model: Mat4) -> FieldUniforms {
    let material = field.material();
    let rgb = material.color.to_linear();
    FieldUniforms {
        model: model.to_cols_array_2d(),
        color: [rgb.x, rgb.y, rgb.z, material.opacity],
        size: material.size,
        _padding: [0.0; 3],
    }
}

fn clear_color(backdrop: &SceneBackdrop) -> wgpu::Color {
    let c = backdrop.background.to_linear();
    wgpu::Color {
        r: c.x as f64,
        g: c.y as f64,
        b: c.z as f64,
        a: 1.0,
    }
}

fn fog_color(backdrop: &SceneBackdrop) -> [f32; 4] {
    let c = backdrop.fog.color.to_linear();
    [c.x, c.y, c.z, 1.0]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::WeatherCondition;

    /// Validates WGSL code using naga.
    fn validate_wgsl(code: &str) -> Result<(), String> {
        let module = naga::front::wgsl::parse_str(code)
            .map_err(|e| format!("WGSL parse error: {:?}", e))?;

        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        validator
            .validate(&module)
            .map_err(|e| format!("WGSL validation error: {:?}", e))?;

        Ok(())
    }

    #[test]
    fn test_particle_shader_validates() {
        validate_wgsl(PARTICLE_SHADER).expect("Particle shader should be valid");
    }

    #[test]
    fn test_uniform_sizes_match_wgsl() {
        // Must agree with the struct layouts in particles.wgsl.
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 160);
        assert_eq!(std::mem::size_of::<FieldUniforms>(), 96);
    }

    #[test]
    fn test_color_target_follows_material() {
        let format = wgpu::TextureFormat::Bgra8UnormSrgb;
        let field = ParticleField::build(WeatherCondition::Rain);
        let target = color_target(format, field.material());
        assert_eq!(target.format, format);
        assert_eq!(target.blend, Some(BlendMode::Additive.to_blend_state()));

        let opaque = Material {
            transparent: false,
            ..*field.material()
        };
        assert_eq!(color_target(format, &opaque).blend, None);
        assert_ne!(pipeline_key(&opaque), pipeline_key(field.material()));
    }

    #[test]
    fn test_field_uniforms_use_given_model() {
        let field = ParticleField::build(WeatherCondition::Snow);
        let model = Mat4::from_rotation_y(0.5);
        let uniforms = field_uniforms(&field, model);
        assert_eq!(uniforms.model, model.to_cols_array_2d());
        assert_eq!(uniforms.size, 0.25);
        assert_eq!(uniforms.color[3], Material::DEFAULT_OPACITY);
    }

    #[test]
    fn test_shader_fade_matches_fog_curve() {
        // The shader inlines the same smoothstep and minimum range as `Fog::factor`.
        assert!(PARTICLE_SHADER.contains("t * t * (3.0 - 2.0 * t)"));
        assert!(PARTICLE_SHADER.contains("max(frame.fog_far - frame.fog_near, 0.0001)"));
        assert_eq!(crate::backdrop::Fog::MIN_RANGE, 0.0001);
    }

    #[test]
    fn test_clear_color_is_opaque_backdrop() {
        let backdrop = SceneBackdrop::default();
        let c = clear_color(&backdrop);
        assert_eq!(c.a, 1.0);
        assert!(c.b > c.g);
    }
}
