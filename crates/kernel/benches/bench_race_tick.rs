use std::hint::black_box;
use std::time::Instant;

use karting_input::{Action, InputFrame};
use karting_kernel::{KartConfig, RaceConfig, RaceSim};

const DT: f64 = 1.0 / 60.0;

fn grid(ghost_count: usize) -> RaceConfig {
    let mut config = RaceConfig::default();
    config.ghosts = (0..ghost_count)
        .map(|i| KartConfig {
            name: format!("Ghost{i}"),
            max_speed: 0.03 + (i % 7) as f32 * 0.002,
            acceleration: 0.00004 + (i % 5) as f32 * 0.00001,
            position: glam::Vec3::new((i % 16) as f32 * 1.5 - 12.0, 2.0, -((i / 16) as f32) * 2.0),
            scale: 0.25,
            transparency: 0.1,
        })
        .collect();
    config
}

fn bench_tick(ghost_count: usize, iterations: usize) {
    let mut sim = RaceSim::new(grid(ghost_count));
    let mut input = InputFrame::new();
    input.press(Action::Throttle);
    input.consume_edges();

    let mut now = 0.0;
    let start = Instant::now();
    for _ in 0..iterations {
        now += DT;
        let _ = black_box(sim.tick(black_box(now), black_box(&input)));
        sim.drain_events();
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  tick ({ghost_count} ghosts, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn bench_full_race(iterations: usize) {
    let mut config = RaceConfig::default();
    config.finish_line.z = 20.0;

    let mut throttle = InputFrame::new();
    throttle.press(Action::Throttle);
    throttle.consume_edges();

    let start = Instant::now();
    let mut ticks = 0u64;
    for _ in 0..iterations {
        let mut sim = RaceSim::new(config.clone());
        let mut now = 0.0;
        while !sim.exit_requested() && sim.tick_count() < 20_000 {
            now += DT;
            let _ = sim.tick(now, &throttle);
        }
        ticks += sim.tick_count();
        black_box(sim.results());
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  full race ({iterations} races, {ticks} ticks): {per_iter:?}/race, total {elapsed:?}"
    );
}

fn main() {
    println!("=== Race Tick Benchmarks ===\n");

    println!("Single tick:");
    bench_tick(2, 10000);
    bench_tick(100, 1000);
    bench_tick(1000, 100);

    println!("\nHeadless race to countdown:");
    bench_full_race(10);

    println!("\n=== Done ===");
}
