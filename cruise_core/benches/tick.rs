use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use cruise_core::curve::YAW_HORIZON_LEN;
use cruise_core::lateral::{CONTROL_N, LagCompensatedCurvatureFilter, LateralPlan, t_idxs};
use cruise_core::mocks::cruising;
use cruise_core::{
    CruiseMode, CruiseSpeedArbiter, ParamTable, RoadLimitMessage, TickInput, Tunables,
};

// Synthetic drive: a slow S-curve with a camera every few hundred metres
fn synth_drive(n: usize) -> Vec<TickInput> {
    (0..n)
        .map(|i| {
            let t = i as f32 / 100.0;
            let mut input = cruising(20.0 + 2.0 * (t / 7.0).sin());
            let yaw = 0.15 * (t / 5.0).sin();
            input.yaw_rates = (0..YAW_HORIZON_LEN)
                .map(|k| yaw * (1.0 + k as f32 / 64.0))
                .collect();
            let cam_left = 400.0 - (i % 2000) as f32 * 0.2;
            input.road = RoadLimitMessage {
                road_limit_speed: 80.0,
                cam_limit_speed: 60.0,
                cam_limit_speed_left_dist: cam_left,
                ..RoadLimitMessage::default()
            };
            input
        })
        .collect()
}

pub fn bench_arbiter(c: &mut Criterion) {
    let mut g = c.benchmark_group("arbiter");
    // BENCH_SAMPLE_SIZE=10 BENCH_MEAS_MS=50 cargo bench -p cruise_core --bench tick
    if let Ok(ss) = std::env::var("BENCH_SAMPLE_SIZE") {
        if let Ok(n) = ss.parse::<usize>() {
            g.sample_size(n.max(1));
        }
    } else {
        g.sample_size(50);
    }
    if let Ok(ms) = std::env::var("BENCH_MEAS_MS")
        && let Ok(ms_u64) = ms.parse::<u64>()
    {
        g.measurement_time(std::time::Duration::from_millis(ms_u64));
    }

    let store = ParamTable::with_defaults();
    let drive = synth_drive(10_000);

    for mode in [CruiseMode::Managed, CruiseMode::Pcm] {
        g.bench_function(format!("update_{mode:?}"), |b| {
            b.iter_batched(
                || CruiseSpeedArbiter::new(mode, &store),
                |mut arbiter| {
                    for input in &drive {
                        black_box(arbiter.update(black_box(input), &store));
                    }
                },
                BatchSize::SmallInput,
            )
        });
    }
    g.finish();
}

pub fn bench_lateral(c: &mut Criterion) {
    let t = t_idxs();
    let plan = LateralPlan {
        psis: t.iter().map(|&ti| 0.02 * ti).collect(),
        curvatures: vec![0.001; CONTROL_N],
        curvature_rates: vec![0.0; CONTROL_N],
        distances: t.iter().map(|&ti| 20.0 * ti).collect(),
    };
    let tunables = Tunables::default();
    c.bench_function("lateral_compensate", |b| {
        b.iter(|| {
            LagCompensatedCurvatureFilter::compensate_with(
                black_box(&plan),
                black_box(&tunables),
                black_box(20.0),
                true,
            )
        })
    });
}

criterion_group!(tick, bench_arbiter, bench_lateral);
criterion_main!(tick);
