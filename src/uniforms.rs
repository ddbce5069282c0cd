//! The kernel's uniform block.
//!
//! One `#[repr(C)]` struct shared by the host and every compute pass. The
//! Rust layout and the WGSL declaration below are kept field-for-field in
//! sync; a test pins the byte size so a drift fails loudly.

use bytemuck::{Pod, Zeroable};

use crate::config::SimulationConfig;
use crate::interaction::Interaction;

/// Host-side copy of the kernel parameters, uploaded before every step.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct SimParams {
    /// Frame delta time, capped by the host.
    pub delta: f32,
    /// Elapsed simulation time.
    pub time: f32,
    /// Live particle count; texels at or beyond this index are inert.
    pub particle_count: u32,
    /// Side length of the square state textures.
    pub texture_size: u32,

    /// Separation (distance, weight).
    pub separation: [f32; 2],
    /// Alignment (distance, weight).
    pub alignment: [f32; 2],
    /// Cohesion (distance, weight).
    pub cohesion: [f32; 2],

    pub min_speed: f32,
    pub max_speed: f32,
    pub wall_weight: f32,
    /// 1 to restrict alignment/cohesion to same-group neighbors.
    pub group_flocking: u32,
    /// 0 = off, 1 = attract, 2 = repel.
    pub interaction_kind: u32,
    pub interaction_strength: f32,

    /// Box: extents in xyz. Shell: (inner, outer, 0, 0).
    pub bounds: [f32; 4],
    /// Attract target, or repel ray origin, in xyz.
    pub interaction_point: [f32; 4],
    /// Repel sightline direction (normalized) in xyz.
    pub interaction_ray: [f32; 4],
}

/// WGSL declaration matching [`SimParams`], prepended to every kernel.
pub(crate) const SIM_PARAMS_WGSL: &str = r#"struct SimParams {
    delta: f32,
    time: f32,
    particle_count: u32,
    texture_size: u32,

    separation: vec2<f32>,
    alignment: vec2<f32>,
    cohesion: vec2<f32>,

    min_speed: f32,
    max_speed: f32,
    wall_weight: f32,
    group_flocking: u32,
    interaction_kind: u32,
    interaction_strength: f32,

    bounds: vec4<f32>,
    interaction_point: vec4<f32>,
    interaction_ray: vec4<f32>,
};
"#;

impl SimParams {
    /// Build the initial block from a validated configuration, with no
    /// interaction and zero time.
    pub(crate) fn from_config(config: &SimulationConfig) -> Self {
        Self {
            delta: 0.0,
            time: 0.0,
            particle_count: config.particle_count,
            texture_size: config.texture_size(),
            separation: [config.separation.distance, config.separation.weight],
            alignment: [config.alignment.distance, config.alignment.weight],
            cohesion: [config.cohesion.distance, config.cohesion.weight],
            min_speed: config.min_speed,
            max_speed: config.max_speed,
            wall_weight: config.wall_weight,
            group_flocking: config.group_flocking as u32,
            interaction_kind: 0,
            interaction_strength: 0.0,
            bounds: config.boundary.packed(),
            interaction_point: [0.0; 4],
            interaction_ray: [0.0, 0.0, -1.0, 0.0],
        }
    }

    /// Mirror the latest interaction state into the block.
    pub(crate) fn set_interaction(&mut self, interaction: &Interaction) {
        self.interaction_kind = interaction.kind.as_u32();
        self.interaction_strength = interaction.strength;
        self.interaction_point = [interaction.point.x, interaction.point.y, interaction.point.z, 0.0];
        self.interaction_ray = [interaction.ray.x, interaction.ray.y, interaction.ray.z, 0.0];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_layout_matches_wgsl() {
        // 4 scalars + 3 vec2 + 6 scalars + 3 vec4 = 112 bytes, and a
        // multiple of 16 as uniform buffers require.
        assert_eq!(std::mem::size_of::<SimParams>(), 112);
        assert_eq!(std::mem::size_of::<SimParams>() % 16, 0);

        // Every Rust field is declared in the WGSL block.
        for field in [
            "delta", "time", "particle_count", "texture_size", "separation", "alignment",
            "cohesion", "min_speed", "max_speed", "wall_weight", "group_flocking",
            "interaction_kind", "interaction_strength", "bounds", "interaction_point",
            "interaction_ray",
        ] {
            assert!(SIM_PARAMS_WGSL.contains(field), "WGSL block is missing `{}`", field);
        }
    }

    #[test]
    fn test_from_config_packs_behavior_terms() {
        let config = SimulationConfig::aquarium();
        let params = SimParams::from_config(&config);

        assert_eq!(params.separation, [5.0, 1.5]);
        assert_eq!(params.alignment, [10.0, 1.0]);
        assert_eq!(params.cohesion, [15.0, 1.0]);
        assert_eq!(params.min_speed, 5.0);
        assert_eq!(params.max_speed, 20.0);
        assert_eq!(params.bounds, [50.0, 30.0, 50.0, 0.0]);
        assert_eq!(params.texture_size, 64);
        assert_eq!(params.interaction_kind, 0);
    }

    #[test]
    fn test_set_interaction_round_trips() {
        let config = SimulationConfig::shell();
        let mut params = SimParams::from_config(&config);

        let interaction = Interaction::attract(Vec3::new(1.0, 2.0, 3.0), 5.0);
        params.set_interaction(&interaction);

        assert_eq!(params.interaction_kind, 1);
        assert_eq!(params.interaction_strength, 5.0);
        assert_eq!(params.interaction_point, [1.0, 2.0, 3.0, 0.0]);
    }
}
