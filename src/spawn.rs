//! Deterministic texel seeding for the state textures.
//!
//! Every texel of the square state grid is filled, including the inert
//! slots beyond `particle_count`; the kernel parks those on its first
//! step. Positions are drawn from the configured spawn volume, velocities
//! get a small uniform perturbation per axis with the group tag in the 4th
//! channel.

use std::f32::consts::TAU;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::boundary::Boundary;
use crate::config::SimulationConfig;
use crate::groups::GroupAssignment;

/// Where initial positions are drawn from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SpawnVolume {
    /// Fill the boundary volume: uniform within the box extents, or
    /// uniform direction x uniform radius in `[inner, outer]` for the
    /// shell.
    Bounds,
    /// Cluster inside a small sphere at the origin, producing a visible
    /// burst outward on the first frames.
    Burst {
        /// Sphere radius of the launch cluster.
        radius: f32,
    },
}

// Derived streams so position, velocity, and attribute seeding stay
// independent of one another while sharing one config seed.
const POSITION_STREAM: u64 = 0x9e37_79b9;
const VELOCITY_STREAM: u64 = 0x85eb_ca6b;

/// Fill the position texels: `(x, y, z, phase)` per particle.
pub(crate) fn seed_positions(config: &SimulationConfig) -> Vec<[f32; 4]> {
    let mut rng = SmallRng::seed_from_u64(config.seed ^ POSITION_STREAM);
    let texels = config.texel_count();

    (0..texels)
        .map(|_| {
            let pos = match (config.spawn, config.boundary) {
                (SpawnVolume::Burst { radius }, _) => random_in_sphere(&mut rng, radius),
                (SpawnVolume::Bounds, Boundary::Box { extents }) => [
                    rng.gen_range(-extents.x..extents.x),
                    rng.gen_range(-extents.y..extents.y),
                    rng.gen_range(-extents.z..extents.z),
                ],
                (SpawnVolume::Bounds, Boundary::Shell { inner, outer }) => {
                    let r = rng.gen_range(inner..outer);
                    random_on_sphere(&mut rng, r)
                }
            };
            let phase = rng.gen_range(0.0..TAU);
            [pos[0], pos[1], pos[2], phase]
        })
        .collect()
}

/// Fill the velocity texels: `(vx, vy, vz, group)` per particle.
///
/// Live texels carry their assigned group id in the 4th channel; surplus
/// texels beyond `particle_count` get an arbitrary tag and are parked by
/// the kernel.
pub(crate) fn seed_velocities(
    config: &SimulationConfig,
    groups: &GroupAssignment,
) -> Vec<[f32; 4]> {
    let mut rng = SmallRng::seed_from_u64(config.seed ^ VELOCITY_STREAM);
    let jitter = config.spawn_jitter;
    let texels = config.texel_count();

    (0..texels)
        .map(|i| {
            let tag = if i < groups.len() {
                groups.id(i)
            } else {
                rng.gen_range(0..config.group_count)
            };
            [
                rng.gen_range(-jitter..jitter),
                rng.gen_range(-jitter..jitter),
                rng.gen_range(-jitter..jitter),
                tag as f32,
            ]
        })
        .collect()
}

/// Fill the optional extra texels: `(team, health, flags, counter)`.
///
/// The simulation core only advances the counter channel; the other three
/// are opaque consumer scratch, seeded to `(group, 1.0, 0.0, 0.0)`.
pub(crate) fn seed_extra(config: &SimulationConfig, groups: &GroupAssignment) -> Vec<[f32; 4]> {
    let texels = config.texel_count();

    (0..texels)
        .map(|i| {
            let team = if i < groups.len() { groups.id(i) as f32 } else { 0.0 };
            [team, 1.0, 0.0, 0.0]
        })
        .collect()
}

fn random_in_sphere(rng: &mut SmallRng, radius: f32) -> [f32; 3] {
    let r = rng.gen_range(0.0..radius);
    random_on_sphere(rng, r)
}

fn random_on_sphere(rng: &mut SmallRng, radius: f32) -> [f32; 3] {
    let theta = rng.gen_range(0.0..TAU);
    let phi = (rng.gen_range(-1.0_f32..1.0)).acos();

    [
        radius * phi.sin() * theta.cos(),
        radius * phi.sin() * theta.sin(),
        radius * phi.cos(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn groups_for(config: &SimulationConfig) -> GroupAssignment {
        GroupAssignment::generate(config.particle_count, config.group_count, config.seed)
    }

    #[test]
    fn test_burst_positions_cluster_at_origin() {
        let config = SimulationConfig::aquarium();
        let positions = seed_positions(&config);

        assert_eq!(positions.len(), config.texel_count());
        for p in &positions {
            let r = Vec3::new(p[0], p[1], p[2]).length();
            assert!(r <= 8.0 + 1e-4, "burst spawn escaped its radius: {}", r);
            assert!((0.0..TAU + 1e-4).contains(&p[3]));
        }
    }

    #[test]
    fn test_box_positions_fill_extents() {
        let mut config = SimulationConfig::aquarium();
        config.spawn = SpawnVolume::Bounds;
        let positions = seed_positions(&config);

        for p in &positions {
            assert!(p[0].abs() <= 50.0);
            assert!(p[1].abs() <= 30.0);
            assert!(p[2].abs() <= 50.0);
        }
    }

    #[test]
    fn test_shell_positions_stay_in_annulus() {
        let config = SimulationConfig::shell();
        let positions = seed_positions(&config);

        for p in &positions {
            let r = Vec3::new(p[0], p[1], p[2]).length();
            assert!(r >= 0.5 - 1e-4 && r <= 2.0 + 1e-4, "radius {} outside shell", r);
        }
    }

    #[test]
    fn test_velocity_tag_channel_carries_group_id() {
        let config = SimulationConfig::shell();
        let groups = groups_for(&config);
        let velocities = seed_velocities(&config, &groups);

        for (i, v) in velocities.iter().take(config.particle_count as usize).enumerate() {
            assert_eq!(v[3], groups.id(i) as f32);
        }
    }

    #[test]
    fn test_velocity_jitter_is_bounded() {
        let config = SimulationConfig::shell();
        let groups = groups_for(&config);
        let velocities = seed_velocities(&config, &groups);

        for v in &velocities {
            assert!(v[0].abs() <= 0.25);
            assert!(v[1].abs() <= 0.25);
            assert!(v[2].abs() <= 0.25);
        }
    }

    #[test]
    fn test_seeding_is_deterministic() {
        let config = SimulationConfig::aquarium();
        let groups = groups_for(&config);

        assert_eq!(seed_positions(&config), seed_positions(&config));
        assert_eq!(
            seed_velocities(&config, &groups),
            seed_velocities(&config, &groups)
        );

        let mut other = config.clone();
        other.seed = 99;
        assert_ne!(seed_positions(&config), seed_positions(&other));
    }

    #[test]
    fn test_extra_texels_seed_team_and_health() {
        let mut config = SimulationConfig::shell();
        config.extra_state = true;
        let groups = groups_for(&config);
        let extra = seed_extra(&config, &groups);

        for (i, e) in extra.iter().take(config.particle_count as usize).enumerate() {
            assert_eq!(e[0], groups.id(i) as f32);
            assert_eq!(e[1], 1.0);
            assert_eq!(e[2], 0.0);
            assert_eq!(e[3], 0.0);
        }
    }
}
