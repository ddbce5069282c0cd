//! GPU state store: double-buffered state textures and the compute
//! pipelines that advance them.
//!
//! The device and queue are borrowed from the hosting renderer through
//! [`GpuContext`]; the simulation never assumes exclusive ownership of the
//! device. All per-particle state lives in square `rgba32float` textures,
//! two per state variable, with read/write roles swapped after every step
//! so a kernel pass only ever reads the previous frame's snapshot.

use std::sync::mpsc;

use crate::config::SimulationConfig;
use crate::error::GpuError;
use crate::groups::GroupAssignment;
use crate::kernel::{self, WORKGROUP_SIZE};
use crate::spawn;
use crate::uniforms::SimParams;

/// Handles to the compute device, owned by the host and shared with the
/// simulation. wgpu handles are internally ref-counted, so cloning the
/// context does not duplicate the device.
#[derive(Clone)]
pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl GpuContext {
    /// Acquire a compute-capable device with no surface attached. For
    /// hosts that already own a device (the usual case), build the
    /// context from their handles instead.
    pub fn headless() -> Result<Self, GpuError> {
        pollster::block_on(Self::request())
    }

    async fn request() -> Result<Self, GpuError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        if !adapter
            .get_downlevel_capabilities()
            .flags
            .contains(wgpu::DownlevelFlags::COMPUTE_SHADERS)
        {
            return Err(GpuError::ComputeUnsupported);
        }

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("shoal device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        Ok(Self { device, queue })
    }
}

/// One double-buffered state variable.
struct PingPong {
    textures: [wgpu::Texture; 2],
    views: [wgpu::TextureView; 2],
}

impl PingPong {
    fn new(device: &wgpu::Device, label: &str, size: u32) -> Self {
        let descriptor = wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba32Float,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::STORAGE_BINDING
                | wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        };

        let textures = [
            device.create_texture(&descriptor),
            device.create_texture(&descriptor),
        ];
        let views = [
            textures[0].create_view(&wgpu::TextureViewDescriptor::default()),
            textures[1].create_view(&wgpu::TextureViewDescriptor::default()),
        ];

        Self { textures, views }
    }

    fn upload(&self, queue: &wgpu::Queue, side: u32, texels: &[[f32; 4]]) {
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.textures[0],
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(texels),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(side * 16),
                rows_per_image: Some(side),
            },
            wgpu::Extent3d {
                width: side,
                height: side,
                depth_or_array_layers: 1,
            },
        );
    }
}

/// The GPU-resident flock state and its compute passes.
///
/// `cursor` selects the read side of every ping-pong pair; the opposite
/// side is written, then the roles flip. Bind groups for both cursor
/// values are prebuilt so stepping allocates nothing.
pub(crate) struct GpuFlock {
    context: GpuContext,
    texture_size: u32,
    particle_count: u32,
    position: PingPong,
    velocity: PingPong,
    extra: Option<PingPong>,
    params_buffer: wgpu::Buffer,
    velocity_pipeline: wgpu::ComputePipeline,
    position_pipeline: wgpu::ComputePipeline,
    extra_pipeline: Option<wgpu::ComputePipeline>,
    velocity_bind_groups: [wgpu::BindGroup; 2],
    position_bind_groups: [wgpu::BindGroup; 2],
    extra_bind_groups: Option<[wgpu::BindGroup; 2]>,
    cursor: usize,
}

impl GpuFlock {
    pub fn new(
        context: &GpuContext,
        config: &SimulationConfig,
        groups: &GroupAssignment,
        params: &SimParams,
    ) -> Result<Self, GpuError> {
        let device = &context.device;
        let side = config.texture_size();

        let position = PingPong::new(device, "shoal position state", side);
        let velocity = PingPong::new(device, "shoal velocity state", side);
        let extra = config
            .extra_state
            .then(|| PingPong::new(device, "shoal extra state", side));

        position.upload(&context.queue, side, &spawn::seed_positions(config));
        velocity.upload(&context.queue, side, &spawn::seed_velocities(config, groups));
        if let Some(extra) = &extra {
            extra.upload(&context.queue, side, &spawn::seed_extra(config, groups));
        }

        let params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("shoal params"),
            size: std::mem::size_of::<SimParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        context
            .queue
            .write_buffer(&params_buffer, 0, bytemuck::bytes_of(params));

        let state_layout = state_bind_group_layout(device);
        let velocity_pipeline = compute_pipeline(
            device,
            "shoal velocity pass",
            &state_layout,
            &kernel::velocity_shader(&config.boundary),
        );
        let position_pipeline = compute_pipeline(
            device,
            "shoal position pass",
            &state_layout,
            &kernel::position_shader(),
        );

        // Velocity pass: read both state textures at `cursor`, write the
        // opposite velocity texture.
        let velocity_bind_groups = [0usize, 1].map(|read| {
            state_bind_group(
                device,
                &state_layout,
                &position.views[read],
                &velocity.views[read],
                &velocity.views[1 - read],
                &params_buffer,
            )
        });

        // Position pass: read the old position and the velocity the
        // velocity pass just wrote, write the opposite position texture.
        let position_bind_groups = [0usize, 1].map(|read| {
            state_bind_group(
                device,
                &state_layout,
                &position.views[read],
                &velocity.views[1 - read],
                &position.views[1 - read],
                &params_buffer,
            )
        });

        let (extra_pipeline, extra_bind_groups) = match &extra {
            Some(pair) => {
                let layout = extra_bind_group_layout(device);
                let pipeline =
                    compute_pipeline(device, "shoal extra pass", &layout, &kernel::extra_shader());
                let bind_groups = [0usize, 1].map(|read| {
                    device.create_bind_group(&wgpu::BindGroupDescriptor {
                        label: Some("shoal extra bind group"),
                        layout: &layout,
                        entries: &[
                            wgpu::BindGroupEntry {
                                binding: 0,
                                resource: wgpu::BindingResource::TextureView(&pair.views[read]),
                            },
                            wgpu::BindGroupEntry {
                                binding: 1,
                                resource: wgpu::BindingResource::TextureView(&pair.views[1 - read]),
                            },
                            wgpu::BindGroupEntry {
                                binding: 2,
                                resource: params_buffer.as_entire_binding(),
                            },
                        ],
                    })
                });
                (Some(pipeline), Some(bind_groups))
            }
            None => (None, None),
        };

        Ok(Self {
            context: context.clone(),
            texture_size: side,
            particle_count: config.particle_count,
            position,
            velocity,
            extra,
            params_buffer,
            velocity_pipeline,
            position_pipeline,
            extra_pipeline,
            velocity_bind_groups,
            position_bind_groups,
            extra_bind_groups,
            cursor: 0,
        })
    }

    /// Advance one frame: upload the parameter block, run the velocity
    /// pass then the position pass (and the extra pass if present) in one
    /// submission, and flip the ping-pong roles.
    pub fn step(&mut self, params: &SimParams) {
        self.context
            .queue
            .write_buffer(&self.params_buffer, 0, bytemuck::bytes_of(params));

        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("shoal step"),
                });

        let groups = self.texture_size.div_ceil(WORKGROUP_SIZE);

        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("shoal velocity pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.velocity_pipeline);
            pass.set_bind_group(0, &self.velocity_bind_groups[self.cursor], &[]);
            pass.dispatch_workgroups(groups, groups, 1);
        }

        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("shoal position pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.position_pipeline);
            pass.set_bind_group(0, &self.position_bind_groups[self.cursor], &[]);
            pass.dispatch_workgroups(groups, groups, 1);
        }

        if let (Some(pipeline), Some(bind_groups)) = (&self.extra_pipeline, &self.extra_bind_groups)
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("shoal extra pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, &bind_groups[self.cursor], &[]);
            pass.dispatch_workgroups(groups, groups, 1);
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));

        self.cursor = 1 - self.cursor;
    }

    /// Read-only view of the current position texture.
    pub fn position_view(&self) -> &wgpu::TextureView {
        &self.position.views[self.cursor]
    }

    /// Read-only view of the current velocity texture.
    pub fn velocity_view(&self) -> &wgpu::TextureView {
        &self.velocity.views[self.cursor]
    }

    /// Read-only view of the current extra-state texture, if allocated.
    pub fn extra_view(&self) -> Option<&wgpu::TextureView> {
        self.extra.as_ref().map(|pair| &pair.views[self.cursor])
    }

    /// Copy the current position texture back to the CPU. One texel per
    /// live particle, `(x, y, z, phase)`.
    pub fn read_positions(&self) -> Result<Vec<[f32; 4]>, GpuError> {
        self.read_texture(&self.position.textures[self.cursor])
    }

    /// Copy the current velocity texture back to the CPU. One texel per
    /// live particle, `(vx, vy, vz, group)`.
    pub fn read_velocities(&self) -> Result<Vec<[f32; 4]>, GpuError> {
        self.read_texture(&self.velocity.textures[self.cursor])
    }

    fn read_texture(&self, texture: &wgpu::Texture) -> Result<Vec<[f32; 4]>, GpuError> {
        let device = &self.context.device;
        let side = self.texture_size;
        let unpadded_bytes_per_row = side as usize * 16;
        // Buffer copies require 256-byte row alignment
        let padded_bytes_per_row = (unpadded_bytes_per_row + 255) & !255;

        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("shoal readback"),
            size: (padded_bytes_per_row * side as usize) as u64,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("shoal readback"),
        });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row as u32),
                    rows_per_image: Some(side),
                },
            },
            wgpu::Extent3d {
                width: side,
                height: side,
                depth_or_array_layers: 1,
            },
        );
        self.context.queue.submit(std::iter::once(encoder.finish()));

        let slice = staging.slice(..);
        let (sender, receiver) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        let _ = device.poll(wgpu::Maintain::Wait);

        match receiver.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(GpuError::BufferMapping(e.to_string())),
            Err(_) => return Err(GpuError::BufferMapping("map callback dropped".into())),
        }

        let data = slice.get_mapped_range();
        let mut texels = Vec::with_capacity(self.particle_count as usize);
        'rows: for row in 0..side as usize {
            let start = row * padded_bytes_per_row;
            let row_texels: &[[f32; 4]] =
                bytemuck::cast_slice(&data[start..start + unpadded_bytes_per_row]);
            for texel in row_texels {
                if texels.len() == self.particle_count as usize {
                    break 'rows;
                }
                texels.push(*texel);
            }
        }
        drop(data);
        staging.unmap();

        Ok(texels)
    }
}

fn state_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("shoal state layout"),
        entries: &[
            texture_entry(0),
            texture_entry(1),
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::StorageTexture {
                    access: wgpu::StorageTextureAccess::WriteOnly,
                    format: wgpu::TextureFormat::Rgba32Float,
                    view_dimension: wgpu::TextureViewDimension::D2,
                },
                count: None,
            },
            uniform_entry(3),
        ],
    })
}

fn extra_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("shoal extra layout"),
        entries: &[
            texture_entry(0),
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::StorageTexture {
                    access: wgpu::StorageTextureAccess::WriteOnly,
                    format: wgpu::TextureFormat::Rgba32Float,
                    view_dimension: wgpu::TextureViewDimension::D2,
                },
                count: None,
            },
            uniform_entry(2),
        ],
    })
}

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: false },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn state_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    read_a: &wgpu::TextureView,
    read_b: &wgpu::TextureView,
    write: &wgpu::TextureView,
    params: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("shoal state bind group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(read_a),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(read_b),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::TextureView(write),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: params.as_entire_binding(),
            },
        ],
    })
}

fn compute_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    shader_src: &str,
) -> wgpu::ComputePipeline {
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(shader_src.into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &[layout],
        push_constant_ranges: &[],
    });

    device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
        label: Some(label),
        layout: Some(&pipeline_layout),
        module: &module,
        entry_point: Some("main"),
        compilation_options: Default::default(),
        cache: None,
    })
}
