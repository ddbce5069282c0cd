//! Boundary confinement policies.
//!
//! Exactly one policy is active per simulation, chosen at configuration
//! time and compiled into the velocity kernel. Both policies are soft:
//! they apply a restoring force proportional to the penetration depth
//! rather than clamping positions, so particles may transiently cross the
//! boundary before being pushed back.

use glam::Vec3;

use crate::error::ConfigError;

/// Confinement rule applied by the behavior kernel.
///
/// The variant is fixed after initialization; the numeric parameters
/// (extents or radii) stay live-tunable through the uniform block.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Boundary {
    /// Axis-aligned box centered on the origin. A particle beyond an
    /// extent on any axis receives an inward force proportional to the
    /// overshoot on that axis.
    Box {
        /// Half-size of the box on each axis.
        extents: Vec3,
    },

    /// Spherical shell around the origin. Particles inside `inner` are
    /// pushed outward, particles beyond `outer` are pushed inward, both
    /// proportional to the penetration depth. Keeps the swarm visible
    /// around a fixed viewpoint at the origin.
    Shell {
        /// Inner radius of the shell.
        inner: f32,
        /// Outer radius of the shell.
        outer: f32,
    },
}

impl Boundary {
    /// Check the boundary invariants: all box extents positive, or
    /// `0 < inner < outer` for the shell.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            Boundary::Box { extents } => {
                if extents.x <= 0.0 || extents.y <= 0.0 || extents.z <= 0.0 {
                    return Err(ConfigError::BoxExtents {
                        x: extents.x,
                        y: extents.y,
                        z: extents.z,
                    });
                }
                Ok(())
            }
            Boundary::Shell { inner, outer } => {
                if !(inner > 0.0 && outer > inner) {
                    return Err(ConfigError::ShellRadii { inner, outer });
                }
                Ok(())
            }
        }
    }

    /// Pack the boundary parameters into the `bounds` uniform slot.
    ///
    /// Box: `(x, y, z, 0)` extents. Shell: `(inner, outer, 0, 0)`.
    pub(crate) fn packed(&self) -> [f32; 4] {
        match *self {
            Boundary::Box { extents } => [extents.x, extents.y, extents.z, 0.0],
            Boundary::Shell { inner, outer } => [inner, outer, 0.0, 0.0],
        }
    }

    /// The largest distance from the origin still considered "inside".
    ///
    /// Used by spawn seeding and by the CPU mirror's containment checks.
    pub fn outer_reach(&self) -> f32 {
        match *self {
            Boundary::Box { extents } => extents.x.max(extents.y).max(extents.z),
            Boundary::Shell { outer, .. } => outer,
        }
    }

    /// Generate the WGSL snippet that accumulates the containment force.
    ///
    /// Expects `pos: vec3<f32>` and `var force: vec3<f32>` in scope and
    /// the uniform block bound as `params`.
    pub(crate) fn to_wgsl(&self) -> &'static str {
        match self {
            Boundary::Box { .. } => {
                r#"    // Soft box containment
    let extents = params.bounds.xyz;
    let overshoot = abs(pos) - extents;
    if overshoot.x > 0.0 {
        force.x -= sign(pos.x) * overshoot.x * params.wall_weight;
    }
    if overshoot.y > 0.0 {
        force.y -= sign(pos.y) * overshoot.y * params.wall_weight;
    }
    if overshoot.z > 0.0 {
        force.z -= sign(pos.z) * overshoot.z * params.wall_weight;
    }"#
            }
            Boundary::Shell { .. } => {
                r#"    // Soft shell containment
    let inner = params.bounds.x;
    let outer = params.bounds.y;
    let r = length(pos);
    if r > 1e-5 {
        let radial = pos / r;
        if r < inner {
            force += radial * (inner - r) * params.wall_weight;
        } else if r > outer {
            force -= radial * (r - outer) * params.wall_weight;
        }
    } else {
        // Degenerate: particle at the exact origin, push along +x
        force.x += inner * params.wall_weight;
    }"#
            }
        }
    }

    /// CPU mirror of [`Boundary::to_wgsl`]. Returns the containment force
    /// for a particle at `pos` (already scaled by `wall_weight`).
    pub(crate) fn force(&self, pos: Vec3, wall_weight: f32) -> Vec3 {
        match *self {
            Boundary::Box { extents } => {
                let mut force = Vec3::ZERO;
                let overshoot = pos.abs() - extents;
                if overshoot.x > 0.0 {
                    force.x -= pos.x.signum() * overshoot.x * wall_weight;
                }
                if overshoot.y > 0.0 {
                    force.y -= pos.y.signum() * overshoot.y * wall_weight;
                }
                if overshoot.z > 0.0 {
                    force.z -= pos.z.signum() * overshoot.z * wall_weight;
                }
                force
            }
            Boundary::Shell { inner, outer } => {
                let r = pos.length();
                if r > 1e-5 {
                    let radial = pos / r;
                    if r < inner {
                        radial * (inner - r) * wall_weight
                    } else if r > outer {
                        -radial * (r - outer) * wall_weight
                    } else {
                        Vec3::ZERO
                    }
                } else {
                    Vec3::new(inner * wall_weight, 0.0, 0.0)
                }
            }
        }
    }
}
