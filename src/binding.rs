//! The read-only contract exposed to a renderer.
//!
//! A consumer drawing the flock instances one mesh per particle needs,
//! per instance: a uv reference into the state grid, a base color, a size
//! multiplier, and a free random seed for per-instance variation. All of
//! it is generated once from the configuration and the group assignment;
//! the consumer owns no simulation state and must treat the state
//! textures as read-only.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::SimulationConfig;
use crate::groups::GroupAssignment;

const ATTRIBUTE_STREAM: u64 = 0xc2b2_ae35;

/// Base palette, one `(hue, saturation, lightness)` entry per group,
/// cycled when `group_count` exceeds it. Ocean hues matching the fish
/// material.
const GROUP_PALETTE: [(f32, f32, f32); 6] = [
    (0.52, 0.75, 0.50),
    (0.58, 0.70, 0.45),
    (0.47, 0.65, 0.55),
    (0.62, 0.75, 0.50),
    (0.55, 0.60, 0.60),
    (0.50, 0.80, 0.40),
];

/// Hue jitter half-range around the group's base hue. Small enough that
/// every particle stays recognizably in its group's hue family.
const HUE_JITTER: f32 = 0.03;

/// Per-instance attributes plus the grid geometry a renderer needs to
/// sample the state textures.
#[derive(Clone, Debug)]
pub struct ConsumerBinding {
    particle_count: u32,
    texture_size: u32,
    references: Vec<[f32; 2]>,
    colors: Vec<[f32; 3]>,
    sizes: Vec<f32>,
    seeds: Vec<f32>,
}

impl ConsumerBinding {
    pub(crate) fn new(config: &SimulationConfig, groups: &GroupAssignment) -> Self {
        let count = config.particle_count;
        let side = config.texture_size();
        let mut rng = SmallRng::seed_from_u64(config.seed ^ ATTRIBUTE_STREAM);

        let references = (0..count).map(|i| uv_reference(i, side)).collect();

        let colors = (0..count as usize)
            .map(|i| {
                let (hue, saturation, lightness) =
                    GROUP_PALETTE[groups.id(i) as usize % GROUP_PALETTE.len()];
                let hue = hue + rng.gen_range(-HUE_JITTER..HUE_JITTER);
                let saturation = saturation + rng.gen_range(-0.1..0.1);
                let lightness = lightness + rng.gen_range(-0.05..0.05);
                hsl_to_rgb(hue.rem_euclid(1.0), saturation.clamp(0.0, 1.0), lightness.clamp(0.0, 1.0))
            })
            .collect();

        let sizes = (0..count).map(|_| rng.gen_range(0.8..1.2)).collect();
        let seeds = (0..count).map(|_| rng.gen_range(0.0..1.0)).collect();

        Self {
            particle_count: count,
            texture_size: side,
            references,
            colors,
            sizes,
            seeds,
        }
    }

    /// Number of drawn instances.
    pub fn particle_count(&self) -> u32 {
        self.particle_count
    }

    /// Side length of the square state textures.
    pub fn texture_size(&self) -> u32 {
        self.texture_size
    }

    /// Per-instance uv into the state grid, `(i % side)/side,
    /// floor(i/side)/side`. Upload as a two-component instanced attribute.
    pub fn references(&self) -> &[[f32; 2]] {
        &self.references
    }

    /// Per-instance base color, rgb in `[0, 1]`, chosen from the group
    /// palette with group-consistent hue jitter.
    pub fn colors(&self) -> &[[f32; 3]] {
        &self.colors
    }

    /// Per-instance size multiplier.
    pub fn sizes(&self) -> &[f32] {
        &self.sizes
    }

    /// Per-instance free random scalar in `[0, 1)`.
    pub fn seeds(&self) -> &[f32] {
        &self.seeds
    }

    /// The uv reference of one particle.
    pub fn reference(&self, index: u32) -> [f32; 2] {
        uv_reference(index, self.texture_size)
    }
}

fn uv_reference(index: u32, side: u32) -> [f32; 2] {
    [
        (index % side) as f32 / side as f32,
        (index / side) as f32 / side as f32,
    ]
}

fn hsl_to_rgb(h: f32, s: f32, l: f32) -> [f32; 3] {
    if s == 0.0 {
        return [l, l, l];
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    [
        hue_channel(p, q, h + 1.0 / 3.0),
        hue_channel(p, q, h),
        hue_channel(p, q, h - 1.0 / 3.0),
    ]
}

fn hue_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}
