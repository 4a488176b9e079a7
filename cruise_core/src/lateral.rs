//! Delay-compensated curvature for the lateral controller, plus the small
//! helper functions the controller shares with it.

use crate::params::Tunables;
use crate::util::{DT_MDL, clip, interp};

/// Lateral plan horizon length.
pub const CONTROL_N: usize = 17;
pub const MIN_SPEED: f32 = 1.0;
pub const MIN_DIST: f32 = 0.001;
/// m/s^3
pub const MAX_LATERAL_JERK: f32 = 5.0;
/// m/s
pub const MAX_VEL_ERR: f32 = 5.0;
/// Number of model output timestamps.
const MODEL_IDX_N: usize = 33;

/// Model timestamps `10 * (i / 32)^2` for the first `CONTROL_N` horizon points.
pub fn t_idxs() -> [f32; CONTROL_N] {
    let mut t = [0.0; CONTROL_N];
    let last = (MODEL_IDX_N - 1) as f32;
    for (i, v) in t.iter_mut().enumerate() {
        let r = i as f32 / last;
        *v = 10.0 * r * r;
    }
    t
}

/// Planned heading, curvature, curvature rate and travelled distance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LateralPlan {
    pub psis: Vec<f32>,
    pub curvatures: Vec<f32>,
    pub curvature_rates: Vec<f32>,
    pub distances: Vec<f32>,
}

impl LateralPlan {
    fn is_complete(&self) -> bool {
        [
            &self.psis,
            &self.curvatures,
            &self.curvature_rates,
            &self.distances,
        ]
        .iter()
        .all(|h| h.len() == CONTROL_N)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LagCompensatedCurvatureFilter;

impl LagCompensatedCurvatureFilter {
    /// Returns `(curvature, curvature_rate)` to command now so that the
    /// vehicle reaches the planned heading after `delay` seconds.
    ///
    /// A plan with any horizon of the wrong length is treated as all zeros.
    pub fn compensate(
        plan: &LateralPlan,
        delay: f32,
        v_ego: f32,
        use_distance_averaging: bool,
    ) -> (f32, f32) {
        let zeros = [0.0; CONTROL_N];
        let (psis, curvatures, rates, distances): (&[f32], &[f32], &[f32], &[f32]) =
            if plan.is_complete() {
                (
                    &plan.psis,
                    &plan.curvatures,
                    &plan.curvature_rates,
                    &plan.distances,
                )
            } else {
                (&zeros, &zeros, &zeros, &zeros)
            };
        let v_ego = v_ego.max(MIN_SPEED);
        let delay = delay.max(0.01);
        let t = t_idxs();

        let current = curvatures[0];
        let psi = interp(delay, &t, psis);
        let distance = interp(delay, &t, distances).max(MIN_DIST);
        let average = if use_distance_averaging {
            psi / distance
        } else {
            psi / (v_ego * delay)
        };
        let desired = 2.0 * average - current;

        let max_rate = MAX_LATERAL_JERK / (v_ego * v_ego);
        let safe_rate = clip(rates[0], -max_rate, max_rate);
        let safe_desired = clip(
            desired,
            current - max_rate * DT_MDL,
            current + max_rate * DT_MDL,
        );
        (safe_desired, safe_rate)
    }

    /// [`compensate`](Self::compensate) with the delay taken from the
    /// `SteerActuatorDelay` tunable.
    pub fn compensate_with(
        plan: &LateralPlan,
        tunables: &Tunables,
        v_ego: f32,
        use_distance_averaging: bool,
    ) -> (f32, f32) {
        Self::compensate(
            plan,
            tunables.actuator_delay_s(),
            v_ego,
            use_distance_averaging,
        )
    }
}

/// Shrink `error` toward zero by `deadzone`; zero inside it.
pub fn apply_deadzone(error: f32, deadzone: f32) -> f32 {
    if error > deadzone {
        error - deadzone
    } else if error < -deadzone {
        error + deadzone
    } else {
        0.0
    }
}

/// Zero inside the deadzone, unchanged outside.
pub fn apply_center_deadzone(error: f32, deadzone: f32) -> f32 {
    if error > -deadzone && error < deadzone {
        0.0
    } else {
        error
    }
}

pub fn rate_limit(new_value: f32, last_value: f32, dw_step: f32, up_step: f32) -> f32 {
    clip(new_value, last_value + dw_step, last_value + up_step)
}

/// Friction feed-forward: deadzoned error mapped linearly from
/// `±threshold` to `±friction`, 0 when compensation is disabled.
pub fn friction(
    lateral_accel_error: f32,
    deadzone: f32,
    threshold: f32,
    friction: f32,
    enabled: bool,
) -> f32 {
    if !enabled {
        return 0.0;
    }
    interp(
        apply_center_deadzone(lateral_accel_error, deadzone),
        &[-threshold, threshold],
        &[-friction, friction],
    )
}

/// Predicted minus actual longitudinal speed, clipped to `±MAX_VEL_ERR`.
pub fn speed_error(predicted_trans: Option<&[f32]>, v_ego: f32) -> f32 {
    match predicted_trans.and_then(|t| t.first()) {
        Some(&v) => clip(v - v_ego, -MAX_VEL_ERR, MAX_VEL_ERR),
        None => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_are_quadratic() {
        let t = t_idxs();
        assert_eq!(t[0], 0.0);
        assert!((t[16] - 2.5).abs() < 1e-6);
        assert!(t.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn incomplete_plan_yields_zero() {
        let plan = LateralPlan {
            psis: vec![0.1; 5],
            ..LateralPlan::default()
        };
        assert_eq!(
            LagCompensatedCurvatureFilter::compensate(&plan, 0.3, 20.0, true),
            (0.0, 0.0)
        );
    }

    #[test]
    fn deadzones() {
        assert_eq!(apply_deadzone(0.5, 1.0), 0.0);
        assert_eq!(apply_deadzone(3.0, 1.0), 2.0);
        assert_eq!(apply_deadzone(-3.0, 1.0), -2.0);
        assert_eq!(apply_center_deadzone(0.5, 1.0), 0.0);
        assert_eq!(apply_center_deadzone(-3.0, 1.0), -3.0);
    }

    #[test]
    fn rate_limit_bounds_step() {
        assert_eq!(rate_limit(10.0, 0.0, -1.0, 2.0), 2.0);
        assert_eq!(rate_limit(-10.0, 0.0, -1.0, 2.0), -1.0);
        assert_eq!(rate_limit(0.5, 0.0, -1.0, 2.0), 0.5);
    }
}
