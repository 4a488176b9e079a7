//! `From` implementations bridging `cruise_config` types to `cruise_core` types.

use crate::arbiter::CruiseMode;
use crate::command::{CommandMessage, NavCommand};
use crate::curve::YAW_HORIZON_LEN;
use crate::error::CruiseError;
use crate::params::{self, ParamTable};
use crate::types::{
    ButtonEvent, ButtonKind, ControlsState, LeadVehicle, LongitudinalState, NavigationMessage,
    RoadLimitMessage, TickInput, TrafficLight, TrafficState, VehicleState,
};

// ── ParamTable ───────────────────────────────────────────────────────────────

impl From<&cruise_config::Config> for ParamTable {
    fn from(c: &cruise_config::Config) -> Self {
        let mut t = Self::new();
        t.set(params::NAVI_BUMP_SPEED.key, c.navi.bump_speed)
            .set(params::NAVI_BUMP_TIME.key, c.navi.bump_time)
            .set(params::NAVI_CTRL_END.key, c.navi.ctrl_end)
            .set(params::NAVI_SAFETY_FACTOR.key, c.navi.safety_factor)
            .set(params::NAVI_DECEL_RATE.key, c.navi.decel_rate)
            .set(params::NAVI_CTRL.key, c.navi.ctrl);
        t.set(
            params::RESUME_FROM_GAS_SPEED.key,
            c.cruise.auto_resume_from_gas_speed,
        )
        .set(
            params::CANCEL_FROM_GAS_MODE.key,
            c.cruise.auto_cancel_from_gas_mode,
        )
        .set(
            params::RESUME_FROM_BRAKE_RELEASE.key,
            c.cruise.auto_resume_from_brake_release_traffic_sign,
        )
        .set(params::AUTO_CRUISE_CONTROL.key, c.cruise.auto_cruise_control)
        .set(params::CRUISE_BUTTON_MODE.key, c.cruise.button_mode)
        .set(params::CRUISE_ON_DIST.key, c.cruise.on_dist_cm)
        .set(params::SOFT_HOLD_MODE.key, c.cruise.soft_hold_mode)
        .set(params::CRUISE_SPEED_MIN.key, c.cruise.speed_min)
        .set(params::CRUISE_SPEED_UNIT.key, c.cruise.speed_unit)
        .set(params::CRUISE_ECO_CONTROL.key, c.cruise.eco_control);
        t.set(
            params::SPEED_UPTO_ROAD_LIMIT.key,
            c.lateral.speed_upto_road_limit,
        )
        .set(
            params::STEER_ACTUATOR_DELAY.key,
            c.lateral.steer_actuator_delay,
        );
        t.set(params::TURN_CONTROL.key, c.turn.auto_turn_control)
            .set(params::TURN_END.key, c.turn.turn_end)
            .set(params::TURN_SPEED_LANE_CHANGE.key, c.turn.speed_lane_change)
            .set(params::TURN_SPEED_TURN.key, c.turn.speed_turn);
        t.set(params::CURVE_CTRL_USE.key, c.curve.ctrl_use)
            .set(params::CURVE_FACTOR.key, c.curve.factor)
            .set(params::CURVE_FACTOR_IN.key, c.curve.factor_in);
        t
    }
}

// ── CruiseMode ───────────────────────────────────────────────────────────────

impl From<&cruise_config::VehicleCfg> for CruiseMode {
    fn from(c: &cruise_config::VehicleCfg) -> Self {
        if c.pcm_cruise {
            Self::Pcm
        } else {
            Self::Managed
        }
    }
}

// ── TickInput ────────────────────────────────────────────────────────────────

/// Build one tick's input from a recorded trace row.
///
/// The single recorded yaw rate is held constant over the whole horizon. A
/// non-finite numeric field rejects the row.
pub fn tick_input_from_trace(
    row: &cruise_config::TraceRow,
    is_metric: bool,
) -> Result<TickInput, CruiseError> {
    let floats = [
        ("v_ego", row.v_ego),
        ("v_ego_cluster", row.v_ego_cluster),
        ("lead_d_rel", row.lead_d_rel),
        ("lead_v_rel", row.lead_v_rel),
        ("road_limit_speed", row.road_limit_speed),
        ("x_spd_limit", row.x_spd_limit),
        ("x_spd_dist", row.x_spd_dist),
        ("cam_limit_speed", row.cam_limit_speed),
        ("cam_limit_dist", row.cam_limit_dist),
        ("sign_limit", row.sign_limit),
        ("sign_dist", row.sign_dist),
        ("x_dist_to_turn", row.x_dist_to_turn),
        ("yaw_rate", row.yaw_rate),
    ];
    if let Some((name, _)) = floats.iter().find(|(_, v)| !v.is_finite()) {
        return Err(CruiseError::Trace {
            tick: row.tick,
            reason: format!("{name} is not finite"),
        });
    }

    let button_events = if row.button.trim().is_empty() {
        Vec::new()
    } else {
        vec![ButtonEvent {
            kind: ButtonKind::from_name(&row.button),
            pressed: row.button_pressed,
        }]
    };
    let command = (!row.cmd.trim().is_empty() && row.cmd_index > 0).then(|| CommandMessage {
        index: row.cmd_index,
        command: NavCommand::parse_lossy(&row.cmd, &row.cmd_arg),
    });

    Ok(TickInput {
        vehicle: VehicleState {
            v_ego: row.v_ego,
            v_ego_cluster: row.v_ego_cluster,
            brake_pressed: row.brake,
            gas_pressed: row.gas,
            cruise_available: row.cruise_available,
            button_events,
            speed_limit: row.sign_limit,
            speed_limit_distance: row.sign_dist,
            pcm_cruise_speed: 0.0,
            pcm_cruise_speed_cluster: 0.0,
        },
        yaw_rates: vec![row.yaw_rate; YAW_HORIZON_LEN],
        nav: NavigationMessage::default(),
        road: RoadLimitMessage {
            road_limit_speed: row.road_limit_speed,
            road_category: row.roadcate,
            cam_type: row.cam_type,
            x_sign_type: row.x_sign_type,
            x_spd_limit: row.x_spd_limit,
            x_spd_dist: row.x_spd_dist,
            cam_limit_speed: row.cam_limit_speed,
            cam_limit_speed_left_dist: row.cam_limit_dist,
            x_dist_to_turn: row.x_dist_to_turn,
            x_turn_info: row.x_turn_info,
            active: 0,
            command,
        },
        lead: (row.lead_d_rel > 0.0).then_some(LeadVehicle {
            d_rel: row.lead_d_rel,
            v_rel: row.lead_v_rel,
        }),
        traffic: TrafficState {
            long_state: LongitudinalState::from_code(row.long_state),
            light: TrafficLight::from_code(row.traffic_light),
        },
        controls: ControlsState {
            enabled: row.enabled,
            can_enable: row.can_enable,
            is_metric,
        },
    })
}
