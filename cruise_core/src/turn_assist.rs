//! Blinker extension and turn slowdown from navigation maneuvers.

use crate::command::LaneSide;
use crate::events::{AlertKind, EventEmitter};
use crate::params::Tunables;
use crate::types::{
    BlinkerExtension, LaneEdges, ManeuverKind, ManeuverModifier, NavManeuver, RoadLimitMessage,
};
use crate::util::interp;

/// Countdown armed each tick while a maneuver is active.
pub const NAV_BLINKER_TICKS: u32 = 10;
const ROAD_CATEGORY_BP: [f32; 4] = [0.0, 1.0, 2.0, 7.0];
const TURN_DIST_M: [f32; 4] = [100.0, 100.0, 80.0, 50.0];
const LANE_CHANGE_DIST_M: [f32; 4] = [300.0, 280.0, 200.0, 160.0];
/// Maneuvers are acted on only inside this distance window.
const ACTIVE_WINDOW_M: (f32, f32) = (5.0, 300.0);

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TurnAssist {
    pub blinker: BlinkerExtension,
    /// Rising-edge alert requested this tick (may still be throttled)
    pub alert: Option<AlertKind>,
    /// Distance to the maneuver used as a speed constraint, 0 when none
    pub navi_distance: f32,
    /// Speed (km/h) to meet at the maneuver, 0 when none
    pub navi_speed: f32,
    pub is_turn: bool,
    pub direction: Option<LaneSide>,
}

/// Stateless: all persistent countdowns live in the caller's `BlinkerExtension`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TurnAssistSignaler;

impl TurnAssistSignaler {
    pub fn new() -> Self {
        Self
    }

    /// Arms the countdown on the maneuver's side. Lane changes arm their own
    /// side too, left lane changes included, not only turns.
    pub fn signal(
        &self,
        maneuver: Option<&NavManeuver>,
        road: &RoadLimitMessage,
        lane_edges: LaneEdges,
        blinker: BlinkerExtension,
        t: &Tunables,
        events: &mut EventEmitter,
    ) -> TurnAssist {
        let mut out = TurnAssist {
            blinker,
            ..TurnAssist::default()
        };
        if t.turn_control <= 0 {
            return out;
        }

        let nav_instruction = maneuver.filter(|m| {
            matches!(
                m.kind,
                ManeuverKind::Turn | ManeuverKind::Fork | ManeuverKind::OffRamp
            ) && road.x_dist_to_turn <= 0.0
                && road.x_turn_info < 0
        });
        let (distance, mut is_turn, speed_down, direction) = match nav_instruction {
            Some(m) => (
                m.distance,
                m.kind == ManeuverKind::Turn
                    && matches!(m.modifier, ManeuverModifier::Left | ManeuverModifier::Right),
                false,
                m.modifier.side(),
            ),
            None => {
                let info = road.x_turn_info;
                let turn = matches!(info, 1 | 2);
                let side = match info {
                    1 | 3 => Some(LaneSide::Left),
                    2 | 4 | 43 => Some(LaneSide::Right),
                    _ => None,
                };
                (road.x_dist_to_turn, turn, turn || info == 5, side)
            }
        };

        let mut category = road.road_category;
        if category > 7 && lane_edges.left + lane_edges.right > 5.5 {
            category = 5;
        }
        let cat = category as f32;
        let turn_dist = interp(cat, &ROAD_CATEGORY_BP, &TURN_DIST_M);
        let lane_change_dist = interp(cat, &ROAD_CATEGORY_BP, &LANE_CHANGE_DIST_M);
        let st = t.turn_speed_kph;
        let turn_speed = interp(cat, &ROAD_CATEGORY_BP, &[st * 2.0, st * 2.0, st * 1.5, st]);
        let lc = t.turn_speed_lane_change_kph;
        let lane_change_speed = interp(cat, &ROAD_CATEGORY_BP, &[120.0, 100.0, lc * 1.5, lc]);

        if t.turn_control >= 2 && (is_turn || speed_down || direction.is_some()) {
            out.navi_distance = distance;
            out.navi_speed = if is_turn || speed_down {
                turn_speed
            } else {
                lane_change_speed
            };
        }

        let in_window = distance > ACTIVE_WINDOW_M.0 && distance < ACTIVE_WINDOW_M.1;
        let active = match direction {
            Some(side) if in_window => {
                if is_turn && distance < turn_dist {
                    Some(side)
                } else if distance < lane_change_dist {
                    // a turn still outside the turn zone starts as a lane change
                    is_turn = false;
                    Some(side)
                } else {
                    is_turn = false;
                    None
                }
            }
            _ => {
                is_turn = false;
                None
            }
        };

        let was_armed = out.blinker.is_armed();
        if let Some(side) = active {
            out.blinker.arm(side, NAV_BLINKER_TICKS);
        }
        if !was_armed && out.blinker.is_armed() {
            let kind = if is_turn {
                AlertKind::AudioTurn
            } else {
                AlertKind::AudioLaneChange
            };
            events.emit(kind);
            out.alert = Some(kind);
        }
        out.is_turn = is_turn;
        out.direction = active;
        tracing::trace!(
            distance,
            is_turn,
            navi_speed = out.navi_speed,
            left = out.blinker.left,
            right = out.blinker.right,
            "turn assist"
        );
        out
    }
}
