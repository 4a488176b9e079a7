//! Curve slowdown from the predicted yaw-rate horizon.

use crate::filter::StreamingMovingAverage;
use crate::params::Tunables;
use crate::util::{KPH_TO_MS, MS_TO_KPH, clip, interp};

/// Expected yaw-rate horizon length.
pub const YAW_HORIZON_LEN: usize = 33;
/// Returned when there is no curve constraint.
pub const NO_CURVE_LIMIT: f32 = 300.0;
/// Curvature (1/m) below which the road counts as straight.
pub const STRAIGHT_CURVATURE: f32 = 0.0001;
pub const MIN_CURVE_SPEED: f32 = 20.0 * KPH_TO_MS;
const FILTER_WINDOW: usize = 20;
/// Horizon slice looked at, roughly 1.4 s to 3.5 s ahead.
const LOOKAHEAD: std::ops::Range<usize> = 12..20;

/// Inverse-radius breakpoints (1/m) of the road design table.
pub const CURVE_BP: [f32; 13] = [
    0.0,
    1.0 / 800.0,
    1.0 / 670.0,
    1.0 / 560.0,
    1.0 / 440.0,
    1.0 / 360.0,
    1.0 / 265.0,
    1.0 / 190.0,
    1.0 / 135.0,
    1.0 / 85.0,
    1.0 / 55.0,
    1.0 / 30.0,
    1.0 / 15.0,
];
/// Design speed (km/h) per breakpoint.
pub const CURVE_SPEED_KPH: [f32; 13] = [
    300.0, 150.0, 120.0, 110.0, 100.0, 90.0, 80.0, 70.0, 60.0, 50.0, 45.0, 35.0, 30.0,
];

/// Table speed for a curvature, before any lead-in penalty.
pub fn curve_speed_for(curvature: f32) -> f32 {
    if curvature.abs() > STRAIGHT_CURVATURE {
        clip(interp(curvature, &CURVE_BP, &CURVE_SPEED_KPH), MIN_CURVE_SPEED, 255.0)
    } else {
        NO_CURVE_LIMIT
    }
}

#[derive(Debug, Clone)]
pub struct CurveSpeedLimiter {
    prev_turn_speed: f32,
    filter: StreamingMovingAverage,
}

impl Default for CurveSpeedLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl CurveSpeedLimiter {
    pub fn new() -> Self {
        Self {
            prev_turn_speed: NO_CURVE_LIMIT,
            filter: StreamingMovingAverage::new(FILTER_WINDOW),
        }
    }

    /// Table speed found on the previous call (before the lead-in penalty).
    pub fn last_turn_speed(&self) -> f32 {
        self.prev_turn_speed
    }

    /// Curve speed cap in km/h, never negative. A horizon of the wrong length is "no constraint"
    /// and leaves the filter untouched.
    pub fn limit(&mut self, yaw_rates: &[f32], v_ego: f32, t: &Tunables) -> f32 {
        if yaw_rates.len() != YAW_HORIZON_LEN {
            return NO_CURVE_LIMIT;
        }
        // inside a curve the previous curve speed bounds the divisor
        let speed = (self.prev_turn_speed / MS_TO_KPH).min(clip(v_ego, 0.5, 100.0));
        let peak = yaw_rates[LOOKAHEAD]
            .iter()
            .fold(0.0f32, |m, y| m.max(y.abs()));
        let curvature = self.filter.process(peak / speed) * t.curve_factor;

        let turn_speed = curve_speed_for(curvature);
        self.prev_turn_speed = turn_speed;

        let over = (v_ego * MS_TO_KPH - turn_speed).max(0.0);
        let limited = (turn_speed - over * t.curve_factor_in).max(0.0);
        tracing::trace!(curvature, turn_speed, limited, "curve");
        limited
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_value_at_breakpoint() {
        assert!((curve_speed_for(1.0 / 30.0) - 35.0).abs() < 1e-4);
        assert_eq!(curve_speed_for(0.0), NO_CURVE_LIMIT);
        assert_eq!(curve_speed_for(1.0), 30.0);
    }

    #[test]
    fn wrong_horizon_is_unconstrained_and_stateless() {
        let mut c = CurveSpeedLimiter::new();
        let t = Tunables::default();
        assert_eq!(c.limit(&[0.5; 10], 20.0, &t), NO_CURVE_LIMIT);
        assert_eq!(c.last_turn_speed(), NO_CURVE_LIMIT);
    }

    fn horizon(peak: f32) -> [f32; YAW_HORIZON_LEN] {
        let mut h = [0.0; YAW_HORIZON_LEN];
        h[LOOKAHEAD.start + 2] = peak;
        h
    }

    #[test]
    fn lead_in_penalty_slows_an_approach_above_curve_speed() {
        let mut c = CurveSpeedLimiter::new();
        let t = Tunables::default();
        // 20 m/s into a 30 m radius: table says 35 km/h, ego is 72 km/h
        let v = c.limit(&horizon(20.0 / 30.0), 20.0, &t);
        assert!((c.last_turn_speed() - 35.0).abs() < 1e-2);
        assert!((v - (35.0 - 37.0 * t.curve_factor_in)).abs() < 1e-2, "got {v}");
    }

    #[test]
    fn heavy_penalty_never_goes_negative() {
        let mut c = CurveSpeedLimiter::new();
        let t = Tunables {
            curve_factor_in: 3.0,
            ..Tunables::default()
        };
        let v = c.limit(&horizon(20.0 / 30.0), 20.0, &t);
        assert_eq!(v, 0.0);
        assert!((c.last_turn_speed() - 35.0).abs() < 1e-2);
    }

    #[test]
    fn filter_window_carries_over_between_ticks() {
        let mut c = CurveSpeedLimiter::new();
        let t = Tunables::default();
        // 5 m/s keeps ego below the table speed, so no penalty
        let first = c.limit(&horizon(5.0 / 30.0), 5.0, &t);
        assert!((first - 35.0).abs() < 1e-2);
        // a straight horizon now averages with the earlier curve sample
        let second = c.limit(&[0.0; YAW_HORIZON_LEN], 5.0, &t);
        assert!(second > 45.0 && second < 50.0, "got {second}");
        assert_eq!(c.last_turn_speed(), second);
        let fresh = CurveSpeedLimiter::new().limit(&[0.0; YAW_HORIZON_LEN], 5.0, &t);
        assert_eq!(fresh, NO_CURVE_LIMIT);
    }

    #[test]
    fn straight_road_is_unconstrained() {
        let mut c = CurveSpeedLimiter::new();
        let t = Tunables::default();
        let v = c.limit(&[0.0; YAW_HORIZON_LEN], 20.0, &t);
        assert_eq!(v, NO_CURVE_LIMIT);
    }
}
