//! Spherical-shell flock, headless.
//!
//! The augmented-reality tuning: a small swarm confined to a 0.5-2.0 m
//! annulus around the origin (the viewer). Demonstrates hide/show
//! toggling and live shell retuning.
//!
//! Run with: cargo run --example shell

use shoal::prelude::*;

fn main() {
    env_logger::init();

    let context = match GpuContext::headless() {
        Ok(context) => context,
        Err(e) => {
            eprintln!("No usable GPU, skipping: {}", e);
            return;
        }
    };

    let mut sim = Simulation::new(SimulationConfig::shell()).expect("preset config is valid");
    sim.initialize(&context).expect("GPU initialization failed");

    let dt = 1.0 / 60.0;
    let mut elapsed = 0.0;

    // Target found: run for two seconds
    for _ in 0..120 {
        elapsed += dt;
        sim.step(dt, elapsed).expect("step failed");
    }
    print_radii(&sim, "tracking");

    // Target lost: hidden steps are skipped, state is untouched
    sim.set_visible(false);
    let frozen = sim.read_positions().expect("readback failed");
    for _ in 0..60 {
        elapsed += dt;
        sim.step(dt, elapsed).expect("step failed");
    }
    assert_eq!(sim.read_positions().expect("readback failed"), frozen);
    println!("hidden: state unchanged across 60 skipped frames");

    // Target found again, with a wider shell
    sim.set_visible(true);
    sim.set_shell_radii(0.5, 3.0);
    for _ in 0..120 {
        elapsed += dt;
        sim.step(dt, elapsed).expect("step failed");
    }
    print_radii(&sim, "widened");

    sim.dispose();
}

fn print_radii(sim: &Simulation, label: &str) {
    let positions = sim.read_positions().expect("readback failed");
    let radii: Vec<f32> = positions
        .iter()
        .map(|p| Vec3::new(p[0], p[1], p[2]).length())
        .collect();

    let min = radii.iter().copied().fold(f32::INFINITY, f32::min);
    let max = radii.iter().copied().fold(0.0_f32, f32::max);
    let mean = radii.iter().sum::<f32>() / radii.len() as f32;

    println!("{}: radius min {:.2}  mean {:.2}  max {:.2}", label, min, mean, max);
}
