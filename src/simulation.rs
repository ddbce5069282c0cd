//! The simulation facade.
//!
//! Construction is two-phase: [`Simulation::new`] is cheap and only
//! validates the configuration; [`Simulation::initialize`] allocates GPU
//! state against a borrowed device and may fail. After a failure nothing
//! is retained — the caller decides whether to skip the effect entirely.
//!
//! The host drives one [`Simulation::step`] per frame and samples the
//! output textures from its own render pass. Live parameters take effect
//! on the next step. [`Simulation::dispose`] is the only terminal
//! transition; every state-touching call afterwards fails cleanly.

use glam::Vec3;

use crate::binding::ConsumerBinding;
use crate::boundary::Boundary;
use crate::config::SimulationConfig;
use crate::error::{ConfigError, SimulationError};
use crate::gpu::{GpuContext, GpuFlock};
use crate::groups::GroupAssignment;
use crate::interaction::Interaction;
use crate::ramp::SpeedRamp;
use crate::uniforms::SimParams;

/// Upper bound on the per-frame delta. A tab resume can hand the host a
/// multi-second delta; integrating that in one step would fling the swarm
/// far past the soft boundary.
pub(crate) const MAX_DELTA: f32 = 0.1;

/// A GPU flocking simulation.
///
/// ```ignore
/// use shoal::prelude::*;
///
/// let context = GpuContext::headless()?;
/// let mut sim = Simulation::new(SimulationConfig::aquarium())?;
/// sim.initialize(&context)?;
/// sim.start_ramp(SpeedRamp::launch(20.0, 5.0));
///
/// // per frame:
/// sim.step(dt, elapsed)?;
/// let positions = sim.position_texture()?; // sample from the renderer
/// ```
pub struct Simulation {
    config: SimulationConfig,
    groups: GroupAssignment,
    binding: ConsumerBinding,
    params: SimParams,
    interaction: Interaction,
    ramp: Option<SpeedRamp>,
    gpu: Option<GpuFlock>,
    visible: bool,
    disposed: bool,
}

impl Simulation {
    /// Validate the configuration and build all host-side state. Does not
    /// touch the GPU.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let groups =
            GroupAssignment::generate(config.particle_count, config.group_count, config.seed);
        let binding = ConsumerBinding::new(&config, &groups);
        let params = SimParams::from_config(&config);

        Ok(Self {
            config,
            groups,
            binding,
            params,
            interaction: Interaction::off(),
            ramp: None,
            gpu: None,
            visible: true,
            disposed: false,
        })
    }

    /// Allocate the state textures and compile the kernel against the
    /// host's device. Fails if the device cannot run the kernel; calling
    /// it again after success is a no-op.
    pub fn initialize(&mut self, context: &GpuContext) -> Result<(), SimulationError> {
        if self.disposed {
            return Err(SimulationError::Disposed);
        }
        if self.gpu.is_some() {
            return Ok(());
        }

        let gpu = GpuFlock::new(context, &self.config, &self.groups, &self.params)?;
        self.gpu = Some(gpu);

        let side = self.config.texture_size();
        log::info!(
            "shoal initialized: {} boids on a {}x{} grid",
            self.config.particle_count,
            side,
            side
        );
        Ok(())
    }

    /// Advance one frame. `dt` is capped at 0.1 s; `elapsed` must be
    /// monotonic. While hidden, the dispatch is skipped and state is left
    /// untouched.
    pub fn step(&mut self, dt: f32, elapsed: f32) -> Result<(), SimulationError> {
        let gpu = match &mut self.gpu {
            Some(gpu) => gpu,
            None => return Err(self.lifecycle_error()),
        };

        if !self.visible {
            return Ok(());
        }

        if let Some(ramp) = &mut self.ramp {
            let (max, min) = ramp.sample(elapsed);
            self.params.max_speed = max;
            self.params.min_speed = min;
            if ramp.finished(elapsed) {
                self.ramp = None;
            }
        }

        self.params.delta = dt.clamp(0.0, MAX_DELTA);
        self.params.time = elapsed;

        gpu.step(&self.params);
        Ok(())
    }

    // ========== Output contract ==========

    /// Read-only view of the current position texture, `(x, y, z, phase)`
    /// per texel.
    pub fn position_texture(&self) -> Result<&wgpu::TextureView, SimulationError> {
        self.gpu
            .as_ref()
            .map(GpuFlock::position_view)
            .ok_or_else(|| self.lifecycle_error())
    }

    /// Read-only view of the current velocity texture,
    /// `(vx, vy, vz, group)` per texel.
    pub fn velocity_texture(&self) -> Result<&wgpu::TextureView, SimulationError> {
        self.gpu
            .as_ref()
            .map(GpuFlock::velocity_view)
            .ok_or_else(|| self.lifecycle_error())
    }

    /// Read-only view of the extra-state texture, if the configuration
    /// enabled it.
    pub fn extra_texture(&self) -> Result<Option<&wgpu::TextureView>, SimulationError> {
        self.gpu
            .as_ref()
            .map(GpuFlock::extra_view)
            .ok_or_else(|| self.lifecycle_error())
    }

    /// Copy the current positions back to the CPU. Debug/inspection path,
    /// not for the per-frame render loop.
    pub fn read_positions(&self) -> Result<Vec<[f32; 4]>, SimulationError> {
        match &self.gpu {
            Some(gpu) => Ok(gpu.read_positions()?),
            None => Err(self.lifecycle_error()),
        }
    }

    /// Copy the current velocities back to the CPU.
    pub fn read_velocities(&self) -> Result<Vec<[f32; 4]>, SimulationError> {
        match &self.gpu {
            Some(gpu) => Ok(gpu.read_velocities()?),
            None => Err(self.lifecycle_error()),
        }
    }

    /// The per-instance attribute contract for the rendering consumer.
    pub fn binding(&self) -> &ConsumerBinding {
        &self.binding
    }

    /// The stable per-particle group ids.
    pub fn groups(&self) -> &GroupAssignment {
        &self.groups
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    // ========== Live parameters ==========

    /// Replace the speed clamp. Ignored with a warning if the bounds are
    /// not `0 <= min < max`.
    pub fn set_speed_limits(&mut self, min: f32, max: f32) {
        if !(min >= 0.0 && min < max && max.is_finite()) {
            log::warn!("ignoring invalid speed limits min={}, max={}", min, max);
            return;
        }
        self.params.min_speed = min;
        self.params.max_speed = max;
    }

    /// Replace the separation term.
    pub fn set_separation(&mut self, distance: f32, weight: f32) {
        if !(distance > 0.0 && weight >= 0.0) {
            log::warn!("ignoring invalid separation ({}, {})", distance, weight);
            return;
        }
        self.params.separation = [distance, weight];
    }

    /// Replace the alignment term.
    pub fn set_alignment(&mut self, distance: f32, weight: f32) {
        if !(distance > 0.0 && weight >= 0.0) {
            log::warn!("ignoring invalid alignment ({}, {})", distance, weight);
            return;
        }
        self.params.alignment = [distance, weight];
    }

    /// Replace the cohesion term.
    pub fn set_cohesion(&mut self, distance: f32, weight: f32) {
        if !(distance > 0.0 && weight >= 0.0) {
            log::warn!("ignoring invalid cohesion ({}, {})", distance, weight);
            return;
        }
        self.params.cohesion = [distance, weight];
    }

    /// Replace the boundary restoring strength.
    pub fn set_wall_weight(&mut self, weight: f32) {
        if !(weight >= 0.0 && weight.is_finite()) {
            log::warn!("ignoring invalid wall weight {}", weight);
            return;
        }
        self.params.wall_weight = weight;
    }

    /// Push the latest pointer interaction. Call at input-event
    /// granularity; the kernel reads the most recent value once per step.
    /// A non-finite update is dropped for this frame and the previous
    /// interaction state kept.
    pub fn set_interaction(&mut self, interaction: Interaction) {
        if !interaction.is_finite() {
            log::warn!("ignoring non-finite interaction update");
            return;
        }
        self.interaction = interaction;
        self.params.set_interaction(&interaction);
    }

    /// The interaction state the kernel will read next step.
    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    /// Retune the shell radii. Only valid for a shell boundary; the
    /// boundary *type* cannot change after construction.
    pub fn set_shell_radii(&mut self, inner: f32, outer: f32) {
        match self.config.boundary {
            Boundary::Shell { .. } => {
                let next = Boundary::Shell { inner, outer };
                if next.validate().is_err() {
                    log::warn!("ignoring invalid shell radii ({}, {})", inner, outer);
                    return;
                }
                self.config.boundary = next;
                self.params.bounds = next.packed();
            }
            Boundary::Box { .. } => {
                log::warn!("set_shell_radii called on a box-bounded simulation");
            }
        }
    }

    /// Retune the box extents. Only valid for a box boundary.
    pub fn set_box_extents(&mut self, extents: Vec3) {
        match self.config.boundary {
            Boundary::Box { .. } => {
                let next = Boundary::Box { extents };
                if next.validate().is_err() {
                    log::warn!("ignoring invalid box extents {:?}", extents);
                    return;
                }
                self.config.boundary = next;
                self.params.bounds = next.packed();
            }
            Boundary::Shell { .. } => {
                log::warn!("set_box_extents called on a shell-bounded simulation");
            }
        }
    }

    /// Show or hide the simulation. While hidden, `step` skips the
    /// dispatch without corrupting state.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Start (or restart) a speed ramp. The ramp's clock begins at the
    /// next step; replacing an in-flight ramp resets it.
    pub fn start_ramp(&mut self, ramp: SpeedRamp) {
        if self.disposed {
            return;
        }
        self.ramp = Some(ramp);
    }

    // ========== Lifecycle ==========

    pub fn is_initialized(&self) -> bool {
        self.gpu.is_some()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Release both state buffers and all compute resources. Terminal:
    /// after this, `step` and the texture accessors return
    /// [`SimulationError::Disposed`].
    pub fn dispose(&mut self) {
        self.gpu = None;
        self.ramp = None;
        self.disposed = true;
    }

    fn lifecycle_error(&self) -> SimulationError {
        if self.disposed {
            SimulationError::Disposed
        } else {
            SimulationError::Uninitialized
        }
    }
}
