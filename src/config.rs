//! Simulation configuration.
//!
//! One fully-typed, immutable configuration struct replaces ad hoc
//! parameter bags: every knob the kernel reads is declared here, validated
//! once at construction. Live-tunable values are mirrored into the uniform
//! block through explicit setters on [`crate::Simulation`].

use glam::Vec3;

use crate::boundary::Boundary;
use crate::error::ConfigError;
use crate::spawn::SpawnVolume;

/// One steering term of the flocking rule: an interaction radius and the
/// weight its contribution is scaled by.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BehaviorTerm {
    /// Neighbor distance threshold for this term.
    pub distance: f32,
    /// Scale applied to the resulting steering vector.
    pub weight: f32,
}

impl BehaviorTerm {
    pub fn new(distance: f32, weight: f32) -> Self {
        Self { distance, weight }
    }

    fn validate(&self, term: &'static str) -> Result<(), ConfigError> {
        if !(self.distance > 0.0) || self.weight < 0.0 {
            return Err(ConfigError::Behavior { term });
        }
        Ok(())
    }
}

/// Immutable simulation configuration.
///
/// Build one with [`SimulationConfig::aquarium`] or
/// [`SimulationConfig::shell`] and adjust fields before handing it to
/// [`crate::Simulation::new`], which validates the invariants.
///
/// The two presets carry the two independent tunings the box and shell
/// variants ship with; the parameter scales are intentionally not derived
/// from one another.
#[derive(Clone, Debug)]
pub struct SimulationConfig {
    /// Number of simulated boids. The state textures are square with side
    /// `ceil(sqrt(particle_count))`; surplus texels are computed but inert.
    pub particle_count: u32,
    /// Confinement policy (box or spherical shell).
    pub boundary: Boundary,
    /// Number of flock groups. Each particle is tagged with a stable group
    /// id in `0..group_count`.
    pub group_count: u32,
    /// Lower speed clamp applied after every kernel step.
    pub min_speed: f32,
    /// Upper speed clamp applied after every kernel step.
    pub max_speed: f32,
    /// Push away from neighbors closer than `separation.distance`.
    pub separation: BehaviorTerm,
    /// Steer toward the average heading of neighbors within
    /// `alignment.distance`.
    pub alignment: BehaviorTerm,
    /// Steer toward the centroid of neighbors within `cohesion.distance`.
    pub cohesion: BehaviorTerm,
    /// Strength of the boundary restoring force.
    pub wall_weight: f32,
    /// Where initial positions are drawn from.
    pub spawn: SpawnVolume,
    /// Half-range of the uniform per-axis velocity perturbation applied at
    /// seeding.
    pub spawn_jitter: f32,
    /// Restrict alignment and cohesion to neighbors of the same group.
    /// Separation always applies across groups.
    pub group_flocking: bool,
    /// Allocate the optional third state texture carrying opaque
    /// per-particle scratch (team, health, flags, step counter).
    pub extra_state: bool,
    /// Seed for group assignment, state seeding, and instance attributes.
    /// The same seed reproduces the same initial state exactly.
    pub seed: u64,
}

impl SimulationConfig {
    /// Box-bounds preset: a 50x30x50 tank with the burst launch used by
    /// the fullscreen demo.
    pub fn aquarium() -> Self {
        Self {
            particle_count: 4096,
            boundary: Boundary::Box { extents: Vec3::new(50.0, 30.0, 50.0) },
            group_count: 3,
            min_speed: 5.0,
            max_speed: 20.0,
            separation: BehaviorTerm::new(5.0, 1.5),
            alignment: BehaviorTerm::new(10.0, 1.0),
            cohesion: BehaviorTerm::new(15.0, 1.0),
            wall_weight: 2.0,
            spawn: SpawnVolume::Burst { radius: 8.0 },
            spawn_jitter: 1.0,
            group_flocking: false,
            extra_state: false,
            seed: 0,
        }
    }

    /// Spherical-shell preset: a small swarm confined to a 0.5-2.0 m
    /// annulus around the viewer, tuned for the augmented-reality variant.
    pub fn shell() -> Self {
        Self {
            particle_count: 256,
            boundary: Boundary::Shell { inner: 0.5, outer: 2.0 },
            group_count: 3,
            min_speed: 0.5,
            max_speed: 3.0,
            separation: BehaviorTerm::new(1.0, 1.5),
            alignment: BehaviorTerm::new(2.0, 1.0),
            cohesion: BehaviorTerm::new(3.0, 1.0),
            wall_weight: 3.0,
            spawn: SpawnVolume::Bounds,
            spawn_jitter: 0.25,
            group_flocking: false,
            extra_state: false,
            seed: 0,
        }
    }

    /// Side length of the square state textures.
    pub fn texture_size(&self) -> u32 {
        (self.particle_count as f64).sqrt().ceil() as u32
    }

    /// Total texel count, including inert slots beyond `particle_count`.
    pub fn texel_count(&self) -> usize {
        let side = self.texture_size() as usize;
        side * side
    }

    /// Check every configuration invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.particle_count == 0 {
            return Err(ConfigError::ParticleCount(self.particle_count));
        }
        if self.group_count == 0 {
            return Err(ConfigError::GroupCount(self.group_count));
        }
        self.boundary.validate()?;
        if !(self.min_speed >= 0.0 && self.min_speed < self.max_speed) {
            return Err(ConfigError::SpeedBounds { min: self.min_speed, max: self.max_speed });
        }
        self.separation.validate("Separation")?;
        self.alignment.validate("Alignment")?;
        self.cohesion.validate("Cohesion")?;
        if self.wall_weight < 0.0 {
            return Err(ConfigError::WallWeight(self.wall_weight));
        }
        if let SpawnVolume::Burst { radius } = self.spawn {
            if !(radius > 0.0) {
                return Err(ConfigError::BurstRadius(radius));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        assert!(SimulationConfig::aquarium().validate().is_ok());
        assert!(SimulationConfig::shell().validate().is_ok());
    }

    #[test]
    fn test_texture_size_covers_count() {
        let mut config = SimulationConfig::aquarium();

        config.particle_count = 4096;
        assert_eq!(config.texture_size(), 64);

        config.particle_count = 4097;
        assert_eq!(config.texture_size(), 65);
        assert!(config.texel_count() >= config.particle_count as usize);

        config.particle_count = 1;
        assert_eq!(config.texture_size(), 1);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = SimulationConfig::aquarium();
        config.particle_count = 0;
        assert_eq!(config.validate(), Err(ConfigError::ParticleCount(0)));

        let mut config = SimulationConfig::aquarium();
        config.group_count = 0;
        assert_eq!(config.validate(), Err(ConfigError::GroupCount(0)));

        let mut config = SimulationConfig::aquarium();
        config.min_speed = 20.0;
        config.max_speed = 5.0;
        assert!(matches!(config.validate(), Err(ConfigError::SpeedBounds { .. })));

        let mut config = SimulationConfig::aquarium();
        config.separation = BehaviorTerm::new(0.0, 1.0);
        assert_eq!(config.validate(), Err(ConfigError::Behavior { term: "Separation" }));

        let mut config = SimulationConfig::aquarium();
        config.cohesion = BehaviorTerm::new(15.0, -1.0);
        assert_eq!(config.validate(), Err(ConfigError::Behavior { term: "Cohesion" }));

        let mut config = SimulationConfig::aquarium();
        config.wall_weight = -0.5;
        assert!(matches!(config.validate(), Err(ConfigError::WallWeight(_))));

        let mut config = SimulationConfig::aquarium();
        config.spawn = SpawnVolume::Burst { radius: 0.0 };
        assert!(matches!(config.validate(), Err(ConfigError::BurstRadius(_))));
    }

    #[test]
    fn test_zero_min_speed_is_allowed() {
        let mut config = SimulationConfig::aquarium();
        config.min_speed = 0.0;
        assert!(config.validate().is_ok());
    }
}
