//! # Waypoint Control Benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use nalgebra::Vector2;
use nav_lib::{
    loc::Pose,
    waypoint_ctrl::{InputData, Params, WaypointCtrl, WaypointPlan},
};
use util::module::State;

fn waypoint_ctrl_benchmark(c: &mut Criterion) {
    // ---- Build a mission that never completes during the benchmark ----

    let plan = WaypointPlan::from_pairs(&[[100.0, 100.0], [0.0, 0.0]]).unwrap();
    let start_pose = Pose::default();

    // Turning, facing away from the target so the heading never converges
    let mut turning = WaypointCtrl::new(Params::default(), plan.clone(), &start_pose);
    let turning_input = InputData {
        pose: Pose::new(Vector2::zeros(), -2.0),
    };

    c.bench_function("WaypointCtrl::proc::turning", |b| {
        b.iter(|| turning.proc(black_box(&turning_input)).unwrap())
    });

    // Driving, far from the target
    let mut driving = WaypointCtrl::new(Params::default(), plan, &start_pose);
    let target_heading = driving.target().heading_rad;
    let driving_input = InputData {
        pose: Pose::new(Vector2::new(1.0, 1.0), target_heading),
    };
    driving.proc(&driving_input).unwrap();

    c.bench_function("WaypointCtrl::proc::driving", |b| {
        b.iter(|| driving.proc(black_box(&driving_input)).unwrap())
    });
}

criterion_group!(benches, waypoint_ctrl_benchmark);
criterion_main!(benches);
