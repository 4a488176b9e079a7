//! Per-tick input snapshot and output types.
//!
//! Speeds inside `VehicleState` and `LeadVehicle` are m/s; every cruise,
//! road-limit and camera speed is km/h; distances are metres.

use crate::command::{CommandMessage, LaneSide};
use crate::events::AlertKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonKind {
    Accel,
    Decel,
    GapAdjust,
    Cancel,
    Resume,
    #[default]
    Unknown,
}

impl ButtonKind {
    /// Map a trace/bus name to a button; unrecognized names are `Unknown`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "accel" | "accelcruise" => Self::Accel,
            "decel" | "decelcruise" => Self::Decel,
            "gap" | "gapadjust" | "gapadjustcruise" => Self::GapAdjust,
            "cancel" => Self::Cancel,
            "resume" | "resumecruise" => Self::Resume,
            _ => Self::Unknown,
        }
    }

    /// Buttons that take part in press/release debounce.
    #[inline]
    pub const fn is_debounced(self) -> bool {
        matches!(
            self,
            Self::Accel | Self::Decel | Self::GapAdjust | Self::Cancel
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonEvent {
    pub kind: ButtonKind,
    pub pressed: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VehicleState {
    pub v_ego: f32,
    /// Speed shown on the instrument cluster
    pub v_ego_cluster: f32,
    pub brake_pressed: bool,
    pub gas_pressed: bool,
    pub cruise_available: bool,
    /// In arrival order; the first matching event wins for debounce.
    pub button_events: Vec<ButtonEvent>,
    /// On-board sign recognition, km/h (0 when none)
    pub speed_limit: f32,
    pub speed_limit_distance: f32,
    /// Car cruise module speed, only read when the car owns the set-speed
    pub pcm_cruise_speed: f32,
    pub pcm_cruise_speed_cluster: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeadVehicle {
    pub d_rel: f32,
    pub v_rel: f32,
}

/// Planner longitudinal source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LongitudinalState {
    #[default]
    Lead,
    Cruise,
    E2eCruise,
    /// Stopping for a light or sign
    E2eStop,
    E2ePrepare,
}

impl LongitudinalState {
    pub const fn from_code(code: u8) -> Self {
        match code {
            1 => Self::Cruise,
            2 => Self::E2eCruise,
            3 => Self::E2eStop,
            4 => Self::E2ePrepare,
            _ => Self::Lead,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrafficLight {
    #[default]
    Off,
    Red,
    Green,
}

impl TrafficLight {
    pub const fn from_code(code: u8) -> Self {
        match code {
            1 => Self::Red,
            2 => Self::Green,
            _ => Self::Off,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrafficState {
    pub long_state: LongitudinalState,
    pub light: TrafficLight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlsState {
    pub enabled: bool,
    pub can_enable: bool,
    pub is_metric: bool,
}

impl Default for ControlsState {
    fn default() -> Self {
        Self {
            enabled: false,
            can_enable: true,
            is_metric: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManeuverKind {
    Turn,
    Fork,
    OffRamp,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ManeuverModifier {
    #[default]
    None,
    Left,
    SlightLeft,
    Right,
    SlightRight,
}

impl ManeuverModifier {
    pub const fn side(self) -> Option<LaneSide> {
        match self {
            Self::Left | Self::SlightLeft => Some(LaneSide::Left),
            Self::Right | Self::SlightRight => Some(LaneSide::Right),
            Self::None => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavManeuver {
    pub kind: ManeuverKind,
    pub modifier: ManeuverModifier,
    pub distance: f32,
}

/// Distance from the ego lane to each road edge.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LaneEdges {
    pub left: f32,
    pub right: f32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NavigationMessage {
    pub maneuver: Option<NavManeuver>,
    pub lane_edges: LaneEdges,
}

/// Road / camera limit feed.
#[derive(Debug, Clone, PartialEq)]
pub struct RoadLimitMessage {
    pub road_limit_speed: f32,
    pub road_category: i32,
    pub cam_type: i32,
    pub x_sign_type: i32,
    pub x_spd_limit: f32,
    pub x_spd_dist: f32,
    pub cam_limit_speed: f32,
    pub cam_limit_speed_left_dist: f32,
    /// Distance to the next turn instruction, <= 0 when none
    pub x_dist_to_turn: f32,
    /// Turn code: 1 left, 2 right, 3 left lane, 4/43 right lane, 5 slow down; < 0 none
    pub x_turn_info: i32,
    pub active: i32,
    pub command: Option<CommandMessage>,
}

impl Default for RoadLimitMessage {
    fn default() -> Self {
        Self {
            road_limit_speed: 0.0,
            road_category: 0,
            cam_type: 0,
            x_sign_type: 0,
            x_spd_limit: 0.0,
            x_spd_dist: 0.0,
            cam_limit_speed: 0.0,
            cam_limit_speed_left_dist: 0.0,
            x_dist_to_turn: 0.0,
            x_turn_info: -1,
            active: 0,
            command: None,
        }
    }
}

/// Everything the arbiter reads in one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    pub vehicle: VehicleState,
    /// Predicted yaw rate (rad/s) over the model horizon
    pub yaw_rates: Vec<f32>,
    pub nav: NavigationMessage,
    pub road: RoadLimitMessage,
    pub lead: Option<LeadVehicle>,
    pub traffic: TrafficState,
    pub controls: ControlsState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivationRequest {
    #[default]
    None,
    Activate,
    Deactivate,
}

impl ActivationRequest {
    pub const fn as_i8(self) -> i8 {
        match self {
            Self::None => 0,
            Self::Activate => 1,
            Self::Deactivate => -1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, PartialOrd, Ord)]
pub enum SoftHoldLevel {
    #[default]
    Inactive,
    Counting,
    Confirmed,
}

impl SoftHoldLevel {
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Inactive => 0,
            Self::Counting => 1,
            Self::Confirmed => 2,
        }
    }
}

/// Blinker-extension countdowns in ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlinkerExtension {
    pub left: u32,
    pub right: u32,
    /// Armed by a voice/remote command rather than navigation
    pub voice: bool,
}

impl BlinkerExtension {
    #[inline]
    pub const fn is_armed(&self) -> bool {
        self.left + self.right > 0
    }

    /// Count both sides down by one tick; voice mode ends with the countdown.
    pub fn decay(&mut self) {
        self.left = self.left.saturating_sub(1);
        self.right = self.right.saturating_sub(1);
        if !self.is_armed() {
            self.voice = false;
        }
    }

    pub fn arm(&mut self, side: LaneSide, ticks: u32) {
        match side {
            LaneSide::Left => self.left = ticks,
            LaneSide::Right => self.right = ticks,
        }
    }
}

/// Which source produced the navigation speed cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LimitKind {
    #[default]
    None,
    Bump,
    PointCamera,
    SectionCamera,
    Sign,
    NavTurn,
}

impl LimitKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Bump => "bump",
            Self::PointCamera => "point",
            Self::SectionCamera => "section",
            Self::Sign => "sign",
            Self::NavTurn => "navTurn",
        }
    }
}

/// Selected constraint: safe speed (km/h) and remaining distance (m).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpeedLimitSource {
    pub value: f32,
    pub distance: f32,
    pub kind: LimitKind,
}

/// Result of one tick.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CruiseOutput {
    /// Applied cruise speed after every cap
    pub v_cruise_kph: f32,
    pub v_cruise_cluster_kph: f32,
    /// Driver set-speed before caps
    pub v_cruise_set_kph: f32,
    pub request: ActivationRequest,
    pub alerts: Vec<AlertKind>,
    pub blinker: BlinkerExtension,
    pub soft_hold: SoftHoldLevel,
    pub curve_speed_kph: f32,
    pub nav_limit_kph: f32,
    pub limit_source: SpeedLimitSource,
    pub debug_text: String,
    pub nav_debug: String,
}
