//! Box-bounds flock, headless.
//!
//! Seeds 4096 boids in a burst cluster at the origin, launches the speed
//! ramp, and steps the GPU kernel at 60 Hz for a few simulated seconds,
//! printing swarm statistics as the burst spreads and settles.
//!
//! Run with: cargo run --example aquarium

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

    let mut sim = Simulation::new(SimulationConfig::aquarium()).expect("preset config is valid");
    sim.initialize(&context).expect("GPU initialization failed");
    sim.start_ramp(SpeedRamp::launch(20.0, 5.0));

    // Pull gently toward the origin, like a pointer resting mid-screen
    sim.set_interaction(Interaction::attract(Vec3::ZERO, 4.5));

    let dt = 1.0 / 60.0;
    let mut elapsed = 0.0;

    for frame in 0..360 {
        elapsed += dt;
        sim.step(dt, elapsed).expect("step failed");

        if frame % 60 == 59 {
            print_stats(&sim, elapsed);
        }
    }

    sim.dispose();
    println!("disposed: {}", sim.is_disposed());
}

fn print_stats(sim: &Simulation, elapsed: f32) {
    let positions = sim.read_positions().expect("readback failed");
    let velocities = sim.read_velocities().expect("readback failed");
    let n = positions.len() as f32;

    let mean_radius = positions
        .iter()
        .map(|p| Vec3::new(p[0], p[1], p[2]).length())
        .sum::<f32>()
        / n;
    let mean_speed = velocities
        .iter()
        .map(|v| Vec3::new(v[0], v[1], v[2]).length())
        .sum::<f32>()
        / n;

    println!(
        "t={:5.2}s  mean radius {:6.2}  mean speed {:6.2}",
        elapsed, mean_radius, mean_speed
    );
}
