//! Speed cap from bumps, cameras, signs and navigation turns.
//!
//! Exactly one source is selected per tick. The cap approaches the source's
//! safe speed along a constant-deceleration profile that ends `safe_dist`
//! metres before the source, with a floor on how fast the commanded speed may
//! drop between ticks.

use std::fmt::Write as _;

use crate::params::Tunables;
use crate::turn_assist::TurnAssist;
use crate::types::{LimitKind, RoadLimitMessage, SpeedLimitSource, VehicleState};
use crate::util::{DT_CTRL, MS_TO_KPH, clip};

/// Cap reported when no source applies.
pub const NO_NAV_LIMIT: f32 = 255.0;
/// Upper bound of the deceleration profile, m/s.
const PROFILE_MAX: f32 = 250.0;
/// Camera or sign type code of a speed bump.
const BUMP_CODE: i32 = 22;
/// Sign type code of a section (average speed) enforcement.
const SECTION_SIGN_CODE: i32 = 165;
/// Camera type code of a section enforcement.
const SECTION_CAM_CODE: i32 = 4;
const SECTION_MIN_DIST_M: f32 = 3000.0;
const POINT_MAX_DIST_M: f32 = 50.0;

/// Constant-deceleration approach to `safe_speed` (all speeds m/s).
///
/// Inside the enforcement zone (`left_dist <= safe_dist`) the result is
/// exactly `safe_speed`. Outside it the result never drops more than
/// `2.4 * decel_rate * DT_CTRL` below `prev_apply_speed`.
pub fn decelerate_for_speed_camera(
    safe_speed: f32,
    safe_dist: f32,
    prev_apply_speed: f32,
    decel_rate: f32,
    left_dist: f32,
) -> f32 {
    if left_dist <= safe_dist {
        return safe_speed;
    }
    let under = safe_speed * safe_speed + 2.0 * decel_rate * (left_dist - safe_dist);
    let dv = (-safe_speed + under.max(0.0).sqrt()) * decel_rate;
    let apply = PROFILE_MAX.min(safe_speed + dv);
    let floor = prev_apply_speed - 2.4 * decel_rate * DT_CTRL;
    apply.max(floor)
}

/// Result of one navigation-limit evaluation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NavLimit {
    /// km/h, `NO_NAV_LIMIT` when unconstrained
    pub speed_kph: f32,
    /// Selected constraint after the safety factor
    pub source: SpeedLimitSource,
    /// Enforcement-zone length, metres
    pub safe_dist: f32,
    /// Road speed limit clipped to [30, 150] km/h
    pub road_speed_kph: f32,
    /// Cap is below the current cluster speed
    pub speed_down: bool,
    pub debug: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NavigationSpeedLimiter;

impl NavigationSpeedLimiter {
    pub fn new() -> Self {
        Self
    }

    /// Select the active source and run the deceleration profile.
    /// `prev_applied_kph` is the cruise speed applied on the previous tick.
    pub fn limit(
        &self,
        vehicle: &VehicleState,
        road: &RoadLimitMessage,
        turn: &TurnAssist,
        prev_applied_kph: f32,
        t: &Tunables,
    ) -> NavLimit {
        let v_cluster = vehicle.v_ego_cluster;
        let road_speed_kph = clip(road.road_limit_speed, 30.0, 150.0);

        let is_bump = road.cam_type == BUMP_CODE || road.x_sign_type == BUMP_CODE;
        let mut safe_speed = if is_bump { t.bump_speed_kph } else { 0.0 };
        let mut left_dist = 0.0;
        let mut is_section = false;
        let mut kind = LimitKind::None;

        if road.x_spd_limit > 0.0 && road.x_spd_dist > 0.0 {
            if safe_speed <= 0.0 {
                safe_speed = road.x_spd_limit;
            }
            left_dist = road.x_spd_dist;
            is_section = (road.x_sign_type == SECTION_SIGN_CODE
                || left_dist > SECTION_MIN_DIST_M
                || road.cam_type == SECTION_CAM_CODE)
                && left_dist >= POINT_MAX_DIST_M;
            kind = camera_kind(is_section);
        } else if road.cam_limit_speed > 0.0 && road.cam_limit_speed_left_dist > 0.0 {
            safe_speed = road.cam_limit_speed;
            left_dist = road.cam_limit_speed_left_dist;
            is_section = (left_dist > SECTION_MIN_DIST_M || road.cam_type == SECTION_CAM_CODE)
                && left_dist >= POINT_MAX_DIST_M;
            kind = camera_kind(is_section);
        } else if vehicle.speed_limit > 0.0
            && vehicle.speed_limit_distance > 0.0
            && t.navi_ctrl >= 2
        {
            safe_speed = vehicle.speed_limit;
            left_dist = vehicle.speed_limit_distance;
            kind = LimitKind::Sign;
        }

        let mut safe_dist = 0.0;
        if is_bump {
            kind = LimitKind::Bump;
            safe_dist = t.bump_time_s * v_cluster;
        } else if safe_speed > 0.0 && left_dist > 0.0 {
            safe_dist = t.ctrl_end_s * v_cluster;
        }
        safe_speed *= t.safety_factor;

        let mut speed_kph = NO_NAV_LIMIT;
        let mut speed_down = false;
        if left_dist > 0.0 && safe_speed > 0.0 && safe_dist > 0.0 {
            speed_kph = decelerate_for_speed_camera(
                safe_speed / MS_TO_KPH,
                safe_dist,
                prev_applied_kph / MS_TO_KPH,
                t.decel_rate,
                left_dist,
            ) * MS_TO_KPH;
            if is_section && speed_kph > safe_speed {
                speed_kph = safe_speed;
            }
            speed_down = speed_kph < v_cluster * MS_TO_KPH;
        }

        if turn.navi_speed > 0.0 && turn.navi_distance > 0.0 {
            let turn_safe_dist = t.turn_end_s * v_cluster;
            let turn_kph = decelerate_for_speed_camera(
                turn.navi_speed / MS_TO_KPH,
                turn_safe_dist,
                prev_applied_kph / MS_TO_KPH,
                t.decel_rate,
                turn.navi_distance,
            ) * MS_TO_KPH;
            if turn_kph < speed_kph {
                speed_kph = turn_kph;
                safe_speed = turn.navi_speed;
                left_dist = turn.navi_distance;
                safe_dist = turn_safe_dist;
                kind = LimitKind::NavTurn;
            }
        }

        if speed_kph >= NO_NAV_LIMIT {
            kind = LimitKind::None;
        }

        let mut debug = String::with_capacity(96);
        let _ = write!(
            debug,
            "{} {:.1}<{:.1}/{:.1},{:.1} cat{} spd{:.0}/{:.0} cam{:.0}/{:.0} sign{:.0}/{:.0} turn{:.0}/{:.0}",
            kind.as_str(),
            speed_kph,
            safe_speed,
            left_dist,
            safe_dist,
            road.road_category,
            road.x_spd_limit,
            road.x_spd_dist,
            road.cam_limit_speed,
            road.cam_limit_speed_left_dist,
            vehicle.speed_limit,
            vehicle.speed_limit_distance,
            turn.navi_speed,
            turn.navi_distance,
        );
        tracing::trace!(speed_kph, kind = kind.as_str(), left_dist, safe_dist, "nav limit");

        NavLimit {
            speed_kph,
            source: SpeedLimitSource {
                value: safe_speed,
                distance: left_dist,
                kind,
            },
            safe_dist,
            road_speed_kph,
            speed_down,
            debug,
        }
    }
}

#[inline]
const fn camera_kind(is_section: bool) -> LimitKind {
    if is_section {
        LimitKind::SectionCamera
    } else {
        LimitKind::PointCamera
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicle(v_cluster: f32) -> VehicleState {
        VehicleState {
            v_ego: v_cluster,
            v_ego_cluster: v_cluster,
            ..VehicleState::default()
        }
    }

    #[test]
    fn inside_zone_returns_safe_speed_exactly() {
        assert_eq!(decelerate_for_speed_camera(10.0, 50.0, 30.0, 0.8, 50.0), 10.0);
        assert_eq!(decelerate_for_speed_camera(10.0, 50.0, 30.0, 0.8, 12.0), 10.0);
    }

    #[test]
    fn profile_is_floored_by_previous_speed() {
        let prev = 30.0;
        let v = decelerate_for_speed_camera(10.0, 10.0, prev, 0.8, 11.0);
        assert!((v - (prev - 2.4 * 0.8 * DT_CTRL)).abs() < 1e-4);
    }

    #[test]
    fn far_away_profile_is_capped() {
        let v = decelerate_for_speed_camera(10.0, 10.0, 0.0, 2.0, 1.0e9);
        assert_eq!(v, PROFILE_MAX);
    }

    #[test]
    fn no_source_is_unlimited() {
        let out = NavigationSpeedLimiter.limit(
            &vehicle(20.0),
            &RoadLimitMessage::default(),
            &TurnAssist::default(),
            80.0,
            &Tunables::default(),
        );
        assert_eq!(out.speed_kph, NO_NAV_LIMIT);
        assert_eq!(out.source.kind, LimitKind::None);
        assert!(!out.speed_down);
        assert_eq!(out.road_speed_kph, 30.0);
    }

    #[test]
    fn bump_inside_zone_caps_at_bump_speed() {
        // bump time 1 s at 50 m/s gives a 50 m zone; 40 m left is inside it
        let t = Tunables::default();
        let road = RoadLimitMessage {
            cam_type: 22,
            x_spd_limit: 30.0,
            x_spd_dist: 40.0,
            ..RoadLimitMessage::default()
        };
        let out = NavigationSpeedLimiter.limit(
            &vehicle(50.0),
            &road,
            &TurnAssist::default(),
            100.0,
            &t,
        );
        let safe = t.bump_speed_kph * t.safety_factor;
        assert_eq!(out.source.kind, LimitKind::Bump);
        assert_eq!(out.safe_dist, 50.0);
        assert!((out.speed_kph - safe).abs() < 1e-3);
        assert!(out.speed_down);
    }

    #[test]
    fn long_distance_limit_is_a_section_and_never_above_safe() {
        let t = Tunables::default();
        let road = RoadLimitMessage {
            cam_limit_speed: 80.0,
            cam_limit_speed_left_dist: 4000.0,
            ..RoadLimitMessage::default()
        };
        let out =
            NavigationSpeedLimiter.limit(&vehicle(20.0), &road, &TurnAssist::default(), 90.0, &t);
        assert_eq!(out.source.kind, LimitKind::SectionCamera);
        assert!((out.speed_kph - 80.0 * t.safety_factor).abs() < 1e-3);
    }

    #[test]
    fn section_code_is_overridden_to_point_when_close() {
        let road = RoadLimitMessage {
            cam_type: 4,
            cam_limit_speed: 60.0,
            cam_limit_speed_left_dist: 30.0,
            ..RoadLimitMessage::default()
        };
        let out = NavigationSpeedLimiter.limit(
            &vehicle(10.0),
            &road,
            &TurnAssist::default(),
            60.0,
            &Tunables::default(),
        );
        assert_eq!(out.source.kind, LimitKind::PointCamera);
    }

    #[test]
    fn onboard_sign_only_when_allowed() {
        let mut v = vehicle(20.0);
        v.speed_limit = 50.0;
        v.speed_limit_distance = 500.0;
        let mut t = Tunables::default();
        let out = NavigationSpeedLimiter.limit(
            &v,
            &RoadLimitMessage::default(),
            &TurnAssist::default(),
            80.0,
            &t,
        );
        assert_eq!(out.source.kind, LimitKind::Sign);
        t.navi_ctrl = 1;
        let out = NavigationSpeedLimiter.limit(
            &v,
            &RoadLimitMessage::default(),
            &TurnAssist::default(),
            80.0,
            &t,
        );
        assert_eq!(out.speed_kph, NO_NAV_LIMIT);
    }

    #[test]
    fn lower_turn_constraint_overrides() {
        let turn = TurnAssist {
            navi_speed: 20.0,
            navi_distance: 30.0,
            ..TurnAssist::default()
        };
        let out = NavigationSpeedLimiter.limit(
            &vehicle(10.0),
            &RoadLimitMessage::default(),
            &turn,
            60.0,
            &Tunables::default(),
        );
        assert_eq!(out.source.kind, LimitKind::NavTurn);
        assert!((out.speed_kph - 20.0).abs() < 1e-3);
        assert_eq!(out.source.distance, 30.0);
    }
}
