//! Integration tests for the flocking kernel semantics.
//!
//! These drive [`CpuFlock`], the host-side mirror of the WGSL kernel,
//! which shares its seeding and parameter block with the GPU path. A
//! final parity test runs both paths side by side when an adapter is
//! available.

use glam::Vec3;
use shoal::prelude::*;

fn small_box_config(count: u32) -> SimulationConfig {
    let mut config = SimulationConfig::aquarium();
    config.particle_count = count;
    config.spawn = SpawnVolume::Bounds;
    config
}

fn flock(config: &SimulationConfig) -> CpuFlock {
    let groups = GroupAssignment::generate(config.particle_count, config.group_count, config.seed);
    CpuFlock::new(config, &groups)
}

fn mean_radius(flock: &CpuFlock) -> f32 {
    let n = flock.particle_count();
    flock.positions()[..n]
        .iter()
        .map(|p| p.truncate().length())
        .sum::<f32>()
        / n as f32
}

// ============================================================================
// Speed bound
// ============================================================================

#[test]
fn speed_stays_clamped_after_every_step() {
    let config = small_box_config(64);
    let mut flock = flock(&config);

    let mut elapsed = 0.0;
    for _ in 0..200 {
        elapsed += 0.016;
        flock.step(0.016, elapsed);

        for i in 0..flock.particle_count() {
            let speed = flock.velocities()[i].truncate().length();
            assert!(
                speed >= config.min_speed - 1e-3 && speed <= config.max_speed + 1e-3,
                "speed {} outside [{}, {}]",
                speed,
                config.min_speed,
                config.max_speed
            );
        }
    }
}

#[test]
fn live_speed_retune_applies_next_step() {
    let config = small_box_config(64);
    let mut flock = flock(&config);
    flock.step(0.016, 0.016);

    flock.params_mut().min_speed = 1.0;
    flock.params_mut().max_speed = 2.0;
    flock.step(0.016, 0.032);

    for i in 0..flock.particle_count() {
        let speed = flock.velocities()[i].truncate().length();
        assert!(speed >= 1.0 - 1e-3 && speed <= 2.0 + 1e-3);
    }
}

// ============================================================================
// Shell containment
// ============================================================================

#[test]
fn shell_flock_converges_to_the_annulus() {
    let mut config = SimulationConfig::shell();
    config.particle_count = 100;
    // Slow swarm and a firm wall so the soft-boundary tolerance stays tight
    config.min_speed = 0.1;
    config.max_speed = 1.0;
    config.wall_weight = 6.0;
    let mut flock = flock(&config);

    let mut elapsed = 0.0;
    for _ in 0..300 {
        elapsed += 0.016;
        flock.step(0.016, elapsed);
    }

    let epsilon = 0.75;
    for i in 0..flock.particle_count() {
        let r = flock.positions()[i].truncate().length();
        assert!(
            r <= 2.0 + epsilon,
            "particle {} drifted out of the shell: r = {}",
            i,
            r
        );
        assert!(r >= (0.5 - epsilon).max(0.0));
    }
}

// ============================================================================
// Numeric stability
// ============================================================================

#[test]
fn one_thousand_steps_stay_finite() {
    let config = small_box_config(64);
    let mut flock = flock(&config);

    // Deterministic dt sweep over [0, 0.1], including zero
    let mut elapsed = 0.0;
    for step in 0..1000 {
        let dt = (step % 11) as f32 * 0.01;
        elapsed += dt;
        flock.step(dt, elapsed);
    }

    for i in 0..flock.particle_count() {
        assert!(flock.positions()[i].is_finite(), "position {} went non-finite", i);
        assert!(flock.velocities()[i].is_finite(), "velocity {} went non-finite", i);
    }
}

// ============================================================================
// Group stability
// ============================================================================

#[test]
fn group_tags_never_change() {
    let config = small_box_config(64);
    let groups = GroupAssignment::generate(config.particle_count, config.group_count, config.seed);
    let mut flock = CpuFlock::new(&config, &groups);
    flock.set_interaction(Interaction::attract(Vec3::ZERO, 5.0));

    let mut elapsed = 0.0;
    for _ in 0..120 {
        elapsed += 0.016;
        flock.step(0.016, elapsed);
    }

    for i in 0..flock.particle_count() {
        assert_eq!(
            flock.velocities()[i].w,
            groups.id(i) as f32,
            "group tag of particle {} drifted",
            i
        );
    }
}

// ============================================================================
// Neighborhood emptiness
// ============================================================================

#[test]
fn isolated_particle_feels_no_flocking_force() {
    let mut config = small_box_config(1);
    // Disable the clamp floor so the seeded velocity passes through
    config.min_speed = 0.0;
    config.max_speed = 1000.0;
    let mut flock = flock(&config);

    let initial_vel = flock.velocities()[0];
    let initial_pos = flock.positions()[0];

    flock.step(0.016, 0.016);

    // No neighbors, no wall contact, no interaction: velocity unchanged,
    // position advanced by exactly v * dt
    assert_eq!(flock.velocities()[0].truncate(), initial_vel.truncate());
    let expected = initial_pos.truncate() + initial_vel.truncate() * 0.016;
    assert!((flock.positions()[0].truncate() - expected).length() < 1e-6);
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn box_scenario_holds_soft_containment() {
    // 64 particles, box (50, 30, 50), default weights, 60 steps at 60 Hz
    let config = small_box_config(64);
    let mut flock = flock(&config);

    let mut elapsed = 0.0;
    for _ in 0..60 {
        elapsed += 0.016;
        flock.step(0.016, elapsed);
    }

    let n = flock.particle_count();
    let mean_speed = flock.velocities()[..n]
        .iter()
        .map(|v| v.truncate().length())
        .sum::<f32>()
        / n as f32;
    assert!(mean_speed >= config.min_speed && mean_speed <= config.max_speed);

    let mean_magnitude = mean_radius(&flock);
    assert!(
        mean_magnitude < 50.0 * 1.5,
        "soft containment failed: mean position magnitude {}",
        mean_magnitude
    );
}

#[test]
fn sustained_attraction_draws_the_swarm_in() {
    let mut config = small_box_config(64);
    config.min_speed = 0.0;
    config.max_speed = 10.0;
    let mut flock = flock(&config);
    flock.set_interaction(Interaction::attract(Vec3::ZERO, 5.0));

    let before = mean_radius(&flock);

    let mut elapsed = 0.0;
    for _ in 0..100 {
        elapsed += 0.016;
        flock.step(0.016, elapsed);
    }

    let after = mean_radius(&flock);
    assert!(
        after < before,
        "attraction did not dominate: mean distance {} -> {}",
        before,
        after
    );
}

#[test]
fn repel_clears_the_sightline() {
    let mut config = small_box_config(64);
    config.min_speed = 0.0;
    config.max_speed = 10.0;
    let mut flock = flock(&config);

    // Sightline straight down -z from the origin
    let ray = Vec3::NEG_Z;
    flock.set_interaction(Interaction::repel(Vec3::ZERO, ray, 8.0));

    let radial_distance = |flock: &CpuFlock| {
        let n = flock.particle_count();
        flock.positions()[..n]
            .iter()
            .map(|p| {
                let rel = p.truncate();
                (rel - rel.dot(ray) * ray).length()
            })
            .sum::<f32>()
            / n as f32
    };

    let before = radial_distance(&flock);
    let mut elapsed = 0.0;
    for _ in 0..100 {
        elapsed += 0.016;
        flock.step(0.016, elapsed);
    }

    assert!(
        radial_distance(&flock) > before,
        "repel did not push the swarm off the sightline"
    );
}

// ============================================================================
// GPU / CPU parity
// ============================================================================

#[test]
fn gpu_path_matches_the_cpu_mirror() {
    let context = match GpuContext::headless() {
        Ok(context) => context,
        Err(e) => {
            eprintln!("skipping parity test, no usable GPU: {}", e);
            return;
        }
    };

    let mut config = SimulationConfig::shell();
    config.particle_count = 16;

    let mut sim = Simulation::new(config.clone()).unwrap();
    sim.initialize(&context).unwrap();

    let mut mirror = flock(&config);

    let mut elapsed = 0.0;
    for _ in 0..5 {
        elapsed += 0.016;
        sim.step(0.016, elapsed).unwrap();
        mirror.step(0.016, elapsed);
    }

    let gpu_positions = sim.read_positions().unwrap();
    let gpu_velocities = sim.read_velocities().unwrap();

    for i in 0..config.particle_count as usize {
        let cpu_pos = mirror.positions()[i];
        let cpu_vel = mirror.velocities()[i];

        let pos_err = (Vec3::new(gpu_positions[i][0], gpu_positions[i][1], gpu_positions[i][2])
            - cpu_pos.truncate())
        .length();
        let vel_err = (Vec3::new(gpu_velocities[i][0], gpu_velocities[i][1], gpu_velocities[i][2])
            - cpu_vel.truncate())
        .length();

        assert!(pos_err < 1e-2, "position diverged by {} at particle {}", pos_err, i);
        assert!(vel_err < 1e-2, "velocity diverged by {} at particle {}", vel_err, i);
        assert_eq!(gpu_velocities[i][3], cpu_vel.w, "group tag diverged at {}", i);
    }

    sim.dispose();
}
