use cruise_core::lateral::{
    CONTROL_N, LagCompensatedCurvatureFilter, LateralPlan, MAX_LATERAL_JERK, friction,
    speed_error, t_idxs,
};
use cruise_core::{ParamTable, Tunables};
use rstest::rstest;

const DT_MDL: f32 = 0.05;

/// Plan for driving a constant curvature `k` at speed `v`.
fn steady_curve(k: f32, v: f32) -> LateralPlan {
    let t = t_idxs();
    LateralPlan {
        psis: t.iter().map(|&ti| k * v * ti).collect(),
        curvatures: vec![k; CONTROL_N],
        curvature_rates: vec![0.0; CONTROL_N],
        distances: t.iter().map(|&ti| v * ti).collect(),
    }
}

#[rstest]
#[case(true)]
#[case(false)]
fn steady_curve_is_held(#[case] averaging: bool) {
    let k = 0.001;
    let (curv, rate) =
        LagCompensatedCurvatureFilter::compensate(&steady_curve(k, 20.0), 0.3, 20.0, averaging);
    assert!((curv - k).abs() < 1e-6, "{curv}");
    assert_eq!(rate, 0.0);
}

#[test]
fn desired_curvature_step_is_jerk_limited() {
    let v = 20.0;
    let plan = LateralPlan {
        psis: vec![1.0; CONTROL_N],
        curvatures: vec![0.0; CONTROL_N],
        curvature_rates: vec![1.0; CONTROL_N],
        distances: t_idxs().iter().map(|&ti| v * ti).collect(),
    };
    let max_rate = MAX_LATERAL_JERK / (v * v);
    let (curv, rate) = LagCompensatedCurvatureFilter::compensate(&plan, 0.3, v, true);
    assert!((curv - max_rate * DT_MDL).abs() < 1e-7);
    assert!((rate - max_rate).abs() < 1e-7);

    let mut left = plan.clone();
    left.psis = vec![-1.0; CONTROL_N];
    left.curvature_rates = vec![-1.0; CONTROL_N];
    let (curv, rate) = LagCompensatedCurvatureFilter::compensate(&left, 0.3, v, true);
    assert!((curv + max_rate * DT_MDL).abs() < 1e-7);
    assert!((rate + max_rate).abs() < 1e-7);
}

#[test]
fn standstill_uses_minimum_speed() {
    let plan = steady_curve(0.01, 1.0);
    let (curv, _) = LagCompensatedCurvatureFilter::compensate(&plan, 0.2, 0.0, false);
    assert!(curv.is_finite());
    assert!((curv - 0.01).abs() < 1e-5);
}

#[test]
fn zero_delay_is_bounded_below() {
    let plan = steady_curve(0.002, 15.0);
    let (curv, _) = LagCompensatedCurvatureFilter::compensate(&plan, 0.0, 15.0, true);
    assert!(curv.is_finite());
}

#[rstest]
#[case(0.25, false, 0.0)]
#[case(0.05, true, 0.0)]
#[case(0.25, true, 0.1)]
#[case(-0.25, true, -0.1)]
#[case(2.0, true, 0.2)]
fn friction_feed_forward(#[case] err: f32, #[case] enabled: bool, #[case] want: f32) {
    let got = friction(err, 0.1, 0.5, 0.2, enabled);
    assert!((got - want).abs() < 1e-6, "{got}");
}

#[test]
fn speed_error_is_clipped_and_defaults_to_zero() {
    assert_eq!(speed_error(None, 20.0), 0.0);
    assert_eq!(speed_error(Some(&[] as &[f32]), 20.0), 0.0);
    assert_eq!(speed_error(Some([30.0, 0.0].as_slice()), 20.0), 5.0);
    assert_eq!(speed_error(Some([18.0].as_slice()), 20.0), -2.0);
}

#[test]
fn stored_actuator_delay_drives_compensation() {
    let v = 20.0;
    let plan = LateralPlan {
        psis: t_idxs().iter().map(|&ti| 0.05 * ti).collect(),
        curvatures: vec![0.0; CONTROL_N],
        curvature_rates: vec![0.0; CONTROL_N],
        distances: t_idxs().iter().map(|&ti| v * ti).collect(),
    };
    let mut store = ParamTable::with_defaults();
    store.set("SteerActuatorDelay", 50);
    let tunables = Tunables::load(&store);
    assert_eq!(
        LagCompensatedCurvatureFilter::compensate_with(&plan, &tunables, v, false),
        LagCompensatedCurvatureFilter::compensate(&plan, 0.5, v, false)
    );

    // a zero store value is floored at 10 ms
    store.set("SteerActuatorDelay", 0);
    let tunables = Tunables::load(&store);
    assert_eq!(
        LagCompensatedCurvatureFilter::compensate_with(&plan, &tunables, v, false),
        LagCompensatedCurvatureFilter::compensate(&plan, 0.01, v, false)
    );
}
