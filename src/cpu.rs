//! CPU mirror of the behavior kernel.
//!
//! `CpuFlock` runs the exact semantics of the WGSL passes on the host: the
//! same seeding, the same parameter block, the same two-phase update
//! (velocities from the previous frame's snapshot, then positions from the
//! fresh velocities). It exists for three reasons: deterministic property
//! tests without a GPU in the loop, parity checks against the GPU path,
//! and a headless fallback for hosts that only need the numbers.
//!
//! It is intentionally the naive O(n^2) scan the kernel performs per
//! texel; keep the two in lockstep when touching either.

use glam::{Vec3, Vec4};

use crate::boundary::Boundary;
use crate::config::SimulationConfig;
use crate::groups::GroupAssignment;
use crate::interaction::Interaction;
use crate::kernel::PHASE_RATE;
use crate::simulation::MAX_DELTA;
use crate::spawn;
use crate::uniforms::SimParams;

/// Host-side flock state advancing under the kernel's rules.
pub struct CpuFlock {
    params: SimParams,
    boundary: Boundary,
    interaction: Interaction,
    positions: Vec<Vec4>,
    velocities: Vec<Vec4>,
    scratch: Vec<Vec4>,
}

impl CpuFlock {
    /// Seed a flock exactly as the GPU store would for this config.
    pub fn new(config: &SimulationConfig, groups: &GroupAssignment) -> Self {
        let positions = spawn::seed_positions(config)
            .into_iter()
            .map(Vec4::from_array)
            .collect::<Vec<_>>();
        let velocities = spawn::seed_velocities(config, groups)
            .into_iter()
            .map(Vec4::from_array)
            .collect::<Vec<_>>();
        let scratch = vec![Vec4::ZERO; velocities.len()];

        Self {
            params: SimParams::from_config(config),
            boundary: config.boundary,
            interaction: Interaction::off(),
            positions,
            velocities,
            scratch,
        }
    }

    /// Advance one frame. `dt` is capped exactly like the host facade
    /// caps it before a GPU dispatch.
    pub fn step(&mut self, dt: f32, elapsed: f32) {
        let dt = dt.clamp(0.0, MAX_DELTA);
        self.params.delta = dt;
        self.params.time = elapsed;

        let count = self.params.particle_count as usize;
        let p = &self.params;

        // Velocity pass: read the full previous frame, write scratch
        for i in 0..self.velocities.len() {
            if i >= count {
                // Surplus texel: decay to inert, keep the tag channel
                self.scratch[i] = Vec4::new(0.0, 0.0, 0.0, self.velocities[i].w);
                continue;
            }

            let pos = self.positions[i].truncate();
            let self_vel = self.velocities[i];
            let mut force = Vec3::ZERO;

            let mut alignment_sum = Vec3::ZERO;
            let mut alignment_count = 0.0_f32;
            let mut cohesion_sum = Vec3::ZERO;
            let mut cohesion_count = 0.0_f32;

            for j in 0..count {
                if j == i {
                    continue;
                }
                let other_pos = self.positions[j].truncate();
                let other_vel = self.velocities[j];

                let offset = pos - other_pos;
                let dist = offset.length();

                if dist < p.separation[0] && dist > 1e-4 {
                    let falloff = (p.separation[0] - dist) / p.separation[0];
                    force += (offset / dist) * falloff * p.separation[1];
                }

                let same_group = p.group_flocking == 0 || other_vel.w == self_vel.w;
                if same_group {
                    if dist < p.alignment[0] {
                        alignment_sum += other_vel.truncate();
                        alignment_count += 1.0;
                    }
                    if dist < p.cohesion[0] {
                        cohesion_sum += other_pos;
                        cohesion_count += 1.0;
                    }
                }
            }

            if alignment_count > 0.0 {
                force += (alignment_sum / alignment_count - self_vel.truncate()) * p.alignment[1];
            }
            if cohesion_count > 0.0 {
                let to_center = cohesion_sum / cohesion_count - pos;
                let center_dist = to_center.length();
                if center_dist > 1e-4 {
                    force += (to_center / center_dist) * p.cohesion[1];
                }
            }

            force += self.boundary.force(pos, p.wall_weight);
            force += self.interaction.force(pos);

            let mut vel = self_vel.truncate() + force * dt;

            let speed = vel.length();
            if speed > 1e-4 {
                vel *= speed.clamp(p.min_speed, p.max_speed) / speed;
            }

            self.scratch[i] = Vec4::new(vel.x, vel.y, vel.z, self_vel.w);
        }

        std::mem::swap(&mut self.velocities, &mut self.scratch);

        // Position pass: integrate the freshly written velocities
        for i in 0..self.positions.len() {
            if i >= count {
                continue;
            }
            let vel = self.velocities[i].truncate();
            let pos = self.positions[i].truncate() + vel * dt;

            let mut phase = self.positions[i].w + PHASE_RATE * dt;
            phase -= (phase / std::f32::consts::TAU).floor() * std::f32::consts::TAU;

            self.positions[i] = Vec4::new(pos.x, pos.y, pos.z, phase);
        }
    }

    /// All position texels, `(x, y, z, phase)`, live particles first.
    pub fn positions(&self) -> &[Vec4] {
        &self.positions
    }

    /// All velocity texels, `(vx, vy, vz, group)`.
    pub fn velocities(&self) -> &[Vec4] {
        &self.velocities
    }

    /// Number of live particles.
    pub fn particle_count(&self) -> usize {
        self.params.particle_count as usize
    }

    /// Live-tune the kernel parameters, exactly as the facade setters do
    /// for the GPU path.
    pub fn params_mut(&mut self) -> &mut SimParams {
        &mut self.params
    }

    pub fn params(&self) -> &SimParams {
        &self.params
    }

    /// Replace the interaction state (last-value-wins).
    pub fn set_interaction(&mut self, interaction: Interaction) {
        self.interaction = interaction;
        self.params.set_interaction(&interaction);
    }
}
