//! Pointer interaction force.
//!
//! The host converts its input events (mouse, touch, AR controller) into an
//! [`Interaction`] and pushes it with
//! [`crate::Simulation::set_interaction`] at pointer-move granularity.
//! The kernel reads the latest value once per step; updates are
//! last-value-wins, never queued.

use glam::Vec3;

/// What the pointer does to the swarm.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InteractionKind {
    /// No interaction force.
    #[default]
    Off,
    /// Pull every particle toward a target point.
    Attract,
    /// Push particles radially away from a sightline ray, modeling
    /// "get out of the viewer's way" rather than fleeing a point.
    Repel,
}

impl InteractionKind {
    /// Uniform encoding consumed by the kernel.
    pub(crate) fn as_u32(self) -> u32 {
        match self {
            InteractionKind::Off => 0,
            InteractionKind::Attract => 1,
            InteractionKind::Repel => 2,
        }
    }
}

/// Current pointer interaction state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interaction {
    pub kind: InteractionKind,
    /// Attract: the target point. Repel: the ray origin (typically the
    /// camera position).
    pub point: Vec3,
    /// Repel only: the sightline direction. Normalized on construction.
    pub ray: Vec3,
    /// Force magnitude while active.
    pub strength: f32,
}

impl Default for Interaction {
    fn default() -> Self {
        Self::off()
    }
}

impl Interaction {
    /// No interaction.
    pub fn off() -> Self {
        Self {
            kind: InteractionKind::Off,
            point: Vec3::ZERO,
            ray: Vec3::NEG_Z,
            strength: 0.0,
        }
    }

    /// Attract toward `point` with the given strength.
    pub fn attract(point: Vec3, strength: f32) -> Self {
        Self { kind: InteractionKind::Attract, point, ray: Vec3::NEG_Z, strength }
    }

    /// Repel away from the ray `origin + t * direction`.
    pub fn repel(origin: Vec3, direction: Vec3, strength: f32) -> Self {
        let ray = direction.try_normalize().unwrap_or(Vec3::NEG_Z);
        Self { kind: InteractionKind::Repel, point: origin, ray, strength }
    }

    /// A malformed update (non-finite point, ray, or strength) must be
    /// ignored for the frame rather than corrupt the uniform block.
    pub fn is_finite(&self) -> bool {
        self.point.is_finite() && self.ray.is_finite() && self.strength.is_finite()
    }

    /// CPU mirror of the kernel's interaction term: force applied to a
    /// particle at `pos`.
    pub(crate) fn force(&self, pos: Vec3) -> Vec3 {
        match self.kind {
            InteractionKind::Off => Vec3::ZERO,
            InteractionKind::Attract => {
                let to_target = self.point - pos;
                let dist = to_target.length();
                if dist > 1e-3 {
                    (to_target / dist) * self.strength
                } else {
                    Vec3::ZERO
                }
            }
            InteractionKind::Repel => {
                let rel = pos - self.point;
                let radial = rel - rel.dot(self.ray) * self.ray;
                let dist = radial.length();
                if dist > 1e-3 {
                    (radial / dist) * self.strength
                } else {
                    Vec3::ZERO
                }
            }
        }
    }
}
