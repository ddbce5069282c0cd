//! # shoal
//!
//! GPU-resident boid flocking with a texture ping-pong state store.
//!
//! shoal keeps all per-particle state in double-buffered `rgba32float`
//! textures and advances it once per frame with a WGSL behavior kernel:
//! separation, alignment, and cohesion steering, soft boundary
//! confinement, and an optional pointer interaction force. The renderer
//! samples the output textures directly; nothing is read back in the
//! frame loop.
//!
//! ## Quick Start
//!
//! ```ignore
//! use shoal::prelude::*;
//!
//! let context = GpuContext::headless()?;
//!
//! let mut sim = Simulation::new(SimulationConfig::aquarium())?;
//! sim.initialize(&context)?;
//! sim.start_ramp(SpeedRamp::launch(20.0, 5.0));
//!
//! // each frame:
//! sim.step(dt, elapsed)?;
//! let positions = sim.position_texture()?;   // bind in your material
//! let velocities = sim.velocity_texture()?;
//! ```
//!
//! ## Core Concepts
//!
//! ### State textures
//!
//! Particles live as texels in square state textures of side
//! `ceil(sqrt(particle_count))`:
//!
//! - position: `(x, y, z, phase)` — phase drives secondary animation
//! - velocity: `(vx, vy, vz, group)` — the group tag is stable
//! - extra (optional): `(team, health, flags, counter)` consumer scratch
//!
//! Each variable is double-buffered; a kernel pass reads one side and
//! writes the other, so every particle sees the same previous-frame
//! snapshot and no locks are needed.
//!
//! ### Boundaries
//!
//! One [`Boundary`] per simulation, chosen at configuration time:
//! `Box { extents }` for a tank, `Shell { inner, outer }` to keep the
//! swarm in an annulus around a fixed viewpoint (the augmented-reality
//! case). Both are soft — a restoring force, never a position clamp.
//!
//! ### Host loop
//!
//! The host owns the device and the frame loop. Per frame it calls
//! [`Simulation::step`] and binds the output textures; per input event it
//! calls [`Simulation::set_interaction`]. `set_visible(false)` skips
//! dispatches while hidden, and [`Simulation::dispose`] is the terminal
//! transition.
//!
//! ### Consumer binding
//!
//! [`ConsumerBinding`] carries everything an instanced renderer needs:
//! per-particle uv references into the state grid, group-palette colors,
//! sizes, and seeds. Group ids are assigned once and shared between the
//! velocity texture and the color attributes, so visual and simulated
//! grouping agree.
//!
//! ### CPU mirror
//!
//! [`CpuFlock`] runs the identical kernel semantics on the host from the
//! identical seeds. The property tests drive it, and hosts without a
//! usable adapter can fall back to it for small flocks.

mod binding;
mod boundary;
mod config;
pub mod cpu;
mod error;
mod gpu;
mod groups;
mod interaction;
pub mod kernel;
mod ramp;
mod simulation;
mod spawn;
mod uniforms;

pub use binding::ConsumerBinding;
pub use boundary::Boundary;
pub use bytemuck;
pub use config::{BehaviorTerm, SimulationConfig};
pub use cpu::CpuFlock;
pub use error::{ConfigError, GpuError, SimulationError};
pub use glam::{Vec2, Vec3, Vec4};
pub use gpu::GpuContext;
pub use groups::GroupAssignment;
pub use interaction::{Interaction, InteractionKind};
pub use ramp::SpeedRamp;
pub use simulation::Simulation;
pub use spawn::SpawnVolume;
pub use uniforms::SimParams;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use shoal::prelude::*;
/// ```
pub mod prelude {
    pub use crate::binding::ConsumerBinding;
    pub use crate::boundary::Boundary;
    pub use crate::config::{BehaviorTerm, SimulationConfig};
    pub use crate::cpu::CpuFlock;
    pub use crate::error::{ConfigError, GpuError, SimulationError};
    pub use crate::gpu::GpuContext;
    pub use crate::groups::GroupAssignment;
    pub use crate::interaction::{Interaction, InteractionKind};
    pub use crate::ramp::SpeedRamp;
    pub use crate::simulation::Simulation;
    pub use crate::spawn::SpawnVolume;
    pub use crate::{Vec2, Vec3, Vec4};
}
