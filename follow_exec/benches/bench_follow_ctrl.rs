//! # Follow Control Benchmark

use std::sync::Arc;

use chrono::{Duration, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use comms_if::eqpt::pose::VehiclePose;
use follow_lib::{
    follow_ctrl::{FollowCtrl, InputData, Params},
    kin,
};
use util::module::State;

fn follow_ctrl_benchmark(c: &mut Criterion) {
    // ---- Build a cycle with a moving follower and a delayed observation ----

    let now = Utc::now();

    let mut ctrl = FollowCtrl::default();

    // Start the follower moving so the latency compensation takes the arc branch
    let warmup = InputData {
        pose: VehiclePose {
            timestamp: now,
            detection: true,
            theta_rad: 0.5,
            x_m: 0.6,
            y_m: 0.3,
            psi_rad: 0.0,
        },
        now,
        params: Arc::new(Params::default()),
    };
    ctrl.proc(&warmup).unwrap();

    let input = InputData {
        pose: VehiclePose {
            timestamp: now - Duration::milliseconds(150),
            ..warmup.pose
        },
        now,
        params: warmup.params.clone(),
    };

    // ---- Benchmarks ----

    c.bench_function("kin::integrate_propagate", |b| {
        let start = kin::Pose2::new(0.3, 1.0, -1.0);
        b.iter(|| kin::integrate_propagate(
            black_box(&start), black_box(0.2), black_box(0.4), black_box(0.15)
        ))
    });

    c.bench_function("FollowCtrl::proc", |b| {
        b.iter(|| ctrl.proc(black_box(&input)).unwrap())
    });
}

criterion_group!(benches, follow_ctrl_benchmark);
criterion_main!(benches);
