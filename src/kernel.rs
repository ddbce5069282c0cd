//! WGSL generation for the behavior kernel.
//!
//! The kernel is split into two passes mirroring the classic GPGPU
//! ping-pong scheme: a velocity pass that reads the full previous frame
//! and writes new velocities, and a position pass that integrates the
//! freshly written velocities. An optional third pass carries the opaque
//! extra-state texture through the ping-pong.
//!
//! Neighborhood sampling scans the whole state grid. For the texture
//! sizes this engine targets (64x64 for 4096 boids) that is the canonical
//! approach; correctness only requires that each steering term aggregates
//! neighbors within its configured radius.

use crate::boundary::Boundary;
use crate::uniforms::SIM_PARAMS_WGSL;

/// Compute passes dispatch square workgroups of this side length.
pub(crate) const WORKGROUP_SIZE: u32 = 8;

/// Radians added to the animation phase per second of simulation time.
pub(crate) const PHASE_RATE: f32 = 6.0;

/// Interaction force WGSL, shared by both boundary variants. The branch
/// on `interaction_kind` keeps the pipeline static while the host swaps
/// modes through the uniform block.
const INTERACTION_WGSL: &str = r#"    // Pointer interaction
    if params.interaction_kind == 1u {
        let to_target = params.interaction_point.xyz - pos;
        let target_dist = length(to_target);
        if target_dist > 1e-3 {
            force += (to_target / target_dist) * params.interaction_strength;
        }
    } else if params.interaction_kind == 2u {
        let rel = pos - params.interaction_point.xyz;
        let ray = params.interaction_ray.xyz;
        let radial = rel - dot(rel, ray) * ray;
        let radial_dist = length(radial);
        if radial_dist > 1e-3 {
            force += (radial / radial_dist) * params.interaction_strength;
        }
    }"#;

/// Generate the velocity pass for the given boundary policy.
pub fn velocity_shader(boundary: &Boundary) -> String {
    let boundary_code = boundary.to_wgsl();

    format!(
        r#"{params_struct}
@group(0) @binding(0) var position_in: texture_2d<f32>;
@group(0) @binding(1) var velocity_in: texture_2d<f32>;
@group(0) @binding(2) var velocity_out: texture_storage_2d<rgba32float, write>;
@group(0) @binding(3) var<uniform> params: SimParams;

@compute @workgroup_size({wg}, {wg})
fn main(@builtin(global_invocation_id) gid: vec3<u32>) {{
    let size = params.texture_size;
    if gid.x >= size || gid.y >= size {{
        return;
    }}
    let coord = vec2<i32>(gid.xy);
    let index = gid.y * size + gid.x;

    let self_pos = textureLoad(position_in, coord, 0);
    let self_vel = textureLoad(velocity_in, coord, 0);

    if index >= params.particle_count {{
        // Surplus texel: decay to an inert state, keep the tag channel
        textureStore(velocity_out, coord, vec4<f32>(0.0, 0.0, 0.0, self_vel.w));
        return;
    }}

    let pos = self_pos.xyz;
    var force = vec3<f32>(0.0);

    var alignment_sum = vec3<f32>(0.0);
    var alignment_count = 0.0;
    var cohesion_sum = vec3<f32>(0.0);
    var cohesion_count = 0.0;

    for (var y = 0u; y < size; y = y + 1u) {{
        for (var x = 0u; x < size; x = x + 1u) {{
            let other_index = y * size + x;
            if other_index == index || other_index >= params.particle_count {{
                continue;
            }}
            let other_coord = vec2<i32>(i32(x), i32(y));
            let other_pos = textureLoad(position_in, other_coord, 0).xyz;
            let other_vel = textureLoad(velocity_in, other_coord, 0);

            let offset = pos - other_pos;
            let dist = length(offset);

            // Separation: push away, harder the closer the neighbor
            if dist < params.separation.x && dist > 1e-4 {{
                let falloff = (params.separation.x - dist) / params.separation.x;
                force += (offset / dist) * falloff * params.separation.y;
            }}

            let same_group = params.group_flocking == 0u || other_vel.w == self_vel.w;
            if same_group {{
                if dist < params.alignment.x {{
                    alignment_sum += other_vel.xyz;
                    alignment_count += 1.0;
                }}
                if dist < params.cohesion.x {{
                    cohesion_sum += other_pos;
                    cohesion_count += 1.0;
                }}
            }}
        }}
    }}

    // Alignment: steer toward the neighborhood's average heading
    if alignment_count > 0.0 {{
        force += (alignment_sum / alignment_count - self_vel.xyz) * params.alignment.y;
    }}

    // Cohesion: steer toward the neighborhood centroid
    if cohesion_count > 0.0 {{
        let to_center = cohesion_sum / cohesion_count - pos;
        let center_dist = length(to_center);
        if center_dist > 1e-4 {{
            force += (to_center / center_dist) * params.cohesion.y;
        }}
    }}

{boundary_code}

{interaction_code}

    var vel = self_vel.xyz + force * params.delta;

    // Hard speed clamp, direction preserving; zero velocity stays zero
    let speed = length(vel);
    if speed > 1e-4 {{
        vel *= clamp(speed, params.min_speed, params.max_speed) / speed;
    }}

    textureStore(velocity_out, coord, vec4<f32>(vel, self_vel.w));
}}
"#,
        params_struct = SIM_PARAMS_WGSL,
        wg = WORKGROUP_SIZE,
        boundary_code = boundary_code,
        interaction_code = INTERACTION_WGSL,
    )
}

/// Generate the position pass. Reads the previous position and the
/// velocity written by this frame's velocity pass.
pub fn position_shader() -> String {
    format!(
        r#"{params_struct}
@group(0) @binding(0) var position_in: texture_2d<f32>;
@group(0) @binding(1) var velocity_in: texture_2d<f32>;
@group(0) @binding(2) var position_out: texture_storage_2d<rgba32float, write>;
@group(0) @binding(3) var<uniform> params: SimParams;

const PHASE_RATE: f32 = {phase_rate};
const TAU: f32 = 6.28318530718;

@compute @workgroup_size({wg}, {wg})
fn main(@builtin(global_invocation_id) gid: vec3<u32>) {{
    let size = params.texture_size;
    if gid.x >= size || gid.y >= size {{
        return;
    }}
    let coord = vec2<i32>(gid.xy);
    let index = gid.y * size + gid.x;

    let self_pos = textureLoad(position_in, coord, 0);

    if index >= params.particle_count {{
        // Surplus texel: parked in place
        textureStore(position_out, coord, self_pos);
        return;
    }}

    let vel = textureLoad(velocity_in, coord, 0).xyz;
    let pos = self_pos.xyz + vel * params.delta;

    // Secondary animation phase, wrapped to one turn
    var phase = self_pos.w + PHASE_RATE * params.delta;
    phase = phase - floor(phase / TAU) * TAU;

    textureStore(position_out, coord, vec4<f32>(pos, phase));
}}
"#,
        params_struct = SIM_PARAMS_WGSL,
        wg = WORKGROUP_SIZE,
        phase_rate = format_f32(PHASE_RATE),
    )
}

/// Generate the extra-state pass: carries the opaque scratch channels
/// through the ping-pong, advancing only the step counter.
pub fn extra_shader() -> String {
    format!(
        r#"{params_struct}
@group(0) @binding(0) var extra_in: texture_2d<f32>;
@group(0) @binding(1) var extra_out: texture_storage_2d<rgba32float, write>;
@group(0) @binding(2) var<uniform> params: SimParams;

@compute @workgroup_size({wg}, {wg})
fn main(@builtin(global_invocation_id) gid: vec3<u32>) {{
    let size = params.texture_size;
    if gid.x >= size || gid.y >= size {{
        return;
    }}
    let coord = vec2<i32>(gid.xy);
    let index = gid.y * size + gid.x;

    let extra = textureLoad(extra_in, coord, 0);

    if index >= params.particle_count {{
        textureStore(extra_out, coord, extra);
        return;
    }}

    textureStore(extra_out, coord, vec4<f32>(extra.xyz, extra.w + 1.0));
}}
"#,
        params_struct = SIM_PARAMS_WGSL,
        wg = WORKGROUP_SIZE,
    )
}

/// Format a float so it always carries a decimal point in WGSL source.
fn format_f32(v: f32) -> String {
    if v == v.trunc() {
        format!("{:.1}", v)
    } else {
        format!("{}", v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    /// Validates WGSL code using naga.
    fn validate_wgsl(code: &str) -> Result<(), String> {
        let module = naga::front::wgsl::parse_str(code)
            .map_err(|e| format!("WGSL parse error: {:?}", e))?;

        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        validator
            .validate(&module)
            .map_err(|e| format!("WGSL validation error: {:?}", e))?;

        Ok(())
    }

    #[test]
    fn test_velocity_shader_box_is_valid() {
        let shader = velocity_shader(&Boundary::Box { extents: Vec3::new(50.0, 30.0, 50.0) });

        assert!(shader.contains("Separation"));
        assert!(shader.contains("Alignment"));
        assert!(shader.contains("Cohesion"));
        assert!(shader.contains("Soft box containment"));
        assert!(shader.contains("Pointer interaction"));
        assert!(shader.contains("clamp(speed, params.min_speed, params.max_speed)"));

        validate_wgsl(&shader).expect("box velocity shader should be valid");
    }

    #[test]
    fn test_velocity_shader_shell_is_valid() {
        let shader = velocity_shader(&Boundary::Shell { inner: 0.5, outer: 2.0 });

        assert!(shader.contains("Soft shell containment"));
        assert!(!shader.contains("Soft box containment"));

        validate_wgsl(&shader).expect("shell velocity shader should be valid");
    }

    #[test]
    fn test_position_shader_is_valid() {
        let shader = position_shader();

        assert!(shader.contains("PHASE_RATE"));
        assert!(shader.contains("vel * params.delta"));

        validate_wgsl(&shader).expect("position shader should be valid");
    }

    #[test]
    fn test_extra_shader_is_valid() {
        let shader = extra_shader();

        assert!(shader.contains("extra.w + 1.0"));

        validate_wgsl(&shader).expect("extra shader should be valid");
    }

    #[test]
    fn test_surplus_texels_are_parked() {
        // Both state passes must short-circuit texels beyond the live
        // particle count so they cannot destabilize neighbors.
        let velocity = velocity_shader(&Boundary::Box { extents: Vec3::ONE });
        assert!(velocity.contains("index >= params.particle_count"));
        assert!(velocity.contains("vec4<f32>(0.0, 0.0, 0.0, self_vel.w)"));

        let position = position_shader();
        assert!(position.contains("index >= params.particle_count"));
    }

    #[test]
    fn test_format_f32_keeps_decimal_point() {
        assert_eq!(format_f32(6.0), "6.0");
        assert_eq!(format_f32(0.5), "0.5");
    }
}
