//! Persistent tunables: key table, staggered refresh schedule, and the scaled
//! snapshot the limiters read every tick.
//!
//! Reads go through `cruise_traits::ParamSource`. A missing key falls back to
//! its default and an out-of-range value is clamped into the documented range,
//! so the control loop never stops on a bad tunable.

use std::collections::HashMap;

use cruise_traits::ParamSource;

/// Named group of tunables refreshed together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefreshGroup {
    Navi,
    Cruise,
    Lateral,
    Turn,
    Curve,
}

impl RefreshGroup {
    pub const ALL: [Self; 5] = [
        Self::Navi,
        Self::Cruise,
        Self::Lateral,
        Self::Turn,
        Self::Curve,
    ];

    /// Tick offset inside the refresh cycle at which this group is re-read.
    /// The largest offset is also the cycle length.
    #[inline]
    pub const fn offset(self) -> u32 {
        match self {
            Self::Navi => 10,
            Self::Cruise => 20,
            Self::Lateral => 30,
            Self::Turn => 40,
            Self::Curve => 100,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Navi => "navi",
            Self::Cruise => "cruise",
            Self::Lateral => "lateral",
            Self::Turn => "turn",
            Self::Curve => "curve",
        }
    }
}

/// Round-robin refresh schedule: at most one group per tick.
#[derive(Debug, Clone, Default)]
pub struct RefreshScheduler {
    count: u32,
}

impl RefreshScheduler {
    pub const CYCLE: u32 = RefreshGroup::Curve.offset();

    pub fn new() -> Self {
        Self::default()
    }

    /// Advance one tick and return the group due on it.
    pub fn tick(&mut self) -> Option<RefreshGroup> {
        self.count += 1;
        if self.count >= Self::CYCLE {
            self.count = 0;
            return Some(RefreshGroup::Curve);
        }
        RefreshGroup::ALL
            .into_iter()
            .find(|g| g.offset() == self.count)
    }
}

/// Store key with its group, default and accepted range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub key: &'static str,
    pub group: RefreshGroup,
    pub default: i64,
    pub min: i64,
    pub max: i64,
}

const fn param(key: &'static str, group: RefreshGroup, default: i64, min: i64, max: i64) -> ParamSpec {
    ParamSpec {
        key,
        group,
        default,
        min,
        max,
    }
}

use self::RefreshGroup::{Cruise, Curve, Lateral, Navi, Turn};

pub const NAVI_BUMP_SPEED: ParamSpec = param("AutoNaviSpeedBumpSpeed", Navi, 35, 10, 100);
pub const NAVI_BUMP_TIME: ParamSpec = param("AutoNaviSpeedBumpTime", Navi, 1, 1, 50);
pub const NAVI_CTRL_END: ParamSpec = param("AutoNaviSpeedCtrlEnd", Navi, 6, 3, 20);
pub const NAVI_SAFETY_FACTOR: ParamSpec = param("AutoNaviSpeedSafetyFactor", Navi, 105, 80, 120);
pub const NAVI_DECEL_RATE: ParamSpec = param("AutoNaviSpeedDecelRate", Navi, 80, 10, 200);
pub const NAVI_CTRL: ParamSpec = param("AutoNaviSpeedCtrl", Navi, 2, 0, 3);

pub const RESUME_FROM_GAS_SPEED: ParamSpec = param("AutoResumeFromGasSpeed", Cruise, 30, 0, 140);
pub const CANCEL_FROM_GAS_MODE: ParamSpec = param("AutoCancelFromGasMode", Cruise, 0, 0, 2);
pub const RESUME_FROM_BRAKE_RELEASE: ParamSpec =
    param("AutoResumeFromBrakeReleaseTrafficSign", Cruise, 0, 0, 1);
pub const AUTO_CRUISE_CONTROL: ParamSpec = param("AutoCruiseControl", Cruise, 1, 0, 3);
pub const CRUISE_BUTTON_MODE: ParamSpec = param("CruiseButtonMode", Cruise, 0, 0, 4);
pub const CRUISE_ON_DIST: ParamSpec = param("CruiseOnDist", Cruise, 0, -500, 500);
pub const SOFT_HOLD_MODE: ParamSpec = param("SoftHoldMode", Cruise, 1, 0, 2);
pub const CRUISE_SPEED_MIN: ParamSpec = param("CruiseSpeedMin", Cruise, 10, 5, 50);
pub const CRUISE_SPEED_UNIT: ParamSpec = param("CruiseSpeedUnit", Cruise, 10, 1, 20);
pub const CRUISE_ECO_CONTROL: ParamSpec = param("CruiseEcoControl", Cruise, 4, 0, 10);

pub const SPEED_UPTO_ROAD_LIMIT: ParamSpec = param("AutoSpeedUptoRoadSpeedLimit", Lateral, 0, 0, 200);
pub const STEER_ACTUATOR_DELAY: ParamSpec = param("SteerActuatorDelay", Lateral, 30, 0, 100);

pub const TURN_CONTROL: ParamSpec = param("AutoTurnControl", Turn, 0, 0, 3);
pub const TURN_END: ParamSpec = param("AutoTurnControlTurnEnd", Turn, 6, 0, 30);
pub const TURN_SPEED_LANE_CHANGE: ParamSpec =
    param("AutoTurnControlSpeedLaneChange", Turn, 60, 0, 100);
pub const TURN_SPEED_TURN: ParamSpec = param("AutoTurnControlSpeedTurn", Turn, 20, 0, 100);

pub const CURVE_CTRL_USE: ParamSpec = param("AutoCurveSpeedCtrlUse", Curve, 1, 0, 3);
pub const CURVE_FACTOR: ParamSpec = param("AutoCurveSpeedFactor", Curve, 100, 50, 300);
pub const CURVE_FACTOR_IN: ParamSpec = param("AutoCurveSpeedFactorIn", Curve, 10, 0, 300);

/// Every tunable, in refresh-group order.
pub const PARAM_SPECS: [ParamSpec; 25] = [
    NAVI_BUMP_SPEED,
    NAVI_BUMP_TIME,
    NAVI_CTRL_END,
    NAVI_SAFETY_FACTOR,
    NAVI_DECEL_RATE,
    NAVI_CTRL,
    RESUME_FROM_GAS_SPEED,
    CANCEL_FROM_GAS_MODE,
    RESUME_FROM_BRAKE_RELEASE,
    AUTO_CRUISE_CONTROL,
    CRUISE_BUTTON_MODE,
    CRUISE_ON_DIST,
    SOFT_HOLD_MODE,
    CRUISE_SPEED_MIN,
    CRUISE_SPEED_UNIT,
    CRUISE_ECO_CONTROL,
    SPEED_UPTO_ROAD_LIMIT,
    STEER_ACTUATOR_DELAY,
    TURN_CONTROL,
    TURN_END,
    TURN_SPEED_LANE_CHANGE,
    TURN_SPEED_TURN,
    CURVE_CTRL_USE,
    CURVE_FACTOR,
    CURVE_FACTOR_IN,
];

/// Read one tunable, falling back to the default and clamping into range.
pub fn resolve<P: ParamSource + ?Sized>(store: &P, spec: &ParamSpec) -> i64 {
    let Some(raw) = store.get_int(spec.key) else {
        return spec.default;
    };
    if raw < spec.min || raw > spec.max {
        let clamped = raw.clamp(spec.min, spec.max);
        tracing::warn!(
            key = spec.key,
            value = raw,
            min = spec.min,
            max = spec.max,
            clamped,
            "tunable out of range"
        );
        return clamped;
    }
    raw
}

#[inline]
fn scaled<P: ParamSource + ?Sized>(store: &P, spec: &ParamSpec, scale: f32) -> f32 {
    resolve(store, spec) as f32 * scale
}

/// Scaled snapshot of every tunable. Units are noted per field.
#[derive(Debug, Clone, PartialEq)]
pub struct Tunables {
    // navi
    /// km/h
    pub bump_speed_kph: f32,
    /// s
    pub bump_time_s: f32,
    /// s
    pub ctrl_end_s: f32,
    /// ratio
    pub safety_factor: f32,
    /// ratio
    pub decel_rate: f32,
    pub navi_ctrl: i64,
    // cruise
    /// km/h
    pub resume_from_gas_speed_kph: f32,
    pub cancel_from_gas_mode: i64,
    pub resume_from_brake_release: bool,
    pub auto_cruise_control: i64,
    pub button_mode: i64,
    /// m, sign preserved
    pub cruise_on_dist_m: f32,
    pub soft_hold_mode: i64,
    /// km/h
    pub speed_min_kph: f32,
    /// km/h
    pub speed_unit_kph: i64,
    /// km/h
    pub eco_boost_kph: f32,
    // lateral
    /// ratio
    pub speed_upto_road_limit: f32,
    /// s
    pub steer_actuator_delay_s: f32,
    // turn
    pub turn_control: i64,
    /// s
    pub turn_end_s: f32,
    /// km/h
    pub turn_speed_lane_change_kph: f32,
    /// km/h
    pub turn_speed_kph: f32,
    // curve
    pub curve_ctrl_use: i64,
    /// ratio
    pub curve_factor: f32,
    /// ratio
    pub curve_factor_in: f32,
}

impl Default for Tunables {
    fn default() -> Self {
        Self::load(&cruise_traits::StaticParams)
    }
}

impl Tunables {
    /// Read every group.
    pub fn load<P: ParamSource + ?Sized>(store: &P) -> Self {
        let mut t = Self {
            bump_speed_kph: 0.0,
            bump_time_s: 0.0,
            ctrl_end_s: 0.0,
            safety_factor: 0.0,
            decel_rate: 0.0,
            navi_ctrl: 0,
            resume_from_gas_speed_kph: 0.0,
            cancel_from_gas_mode: 0,
            resume_from_brake_release: false,
            auto_cruise_control: 0,
            button_mode: 0,
            cruise_on_dist_m: 0.0,
            soft_hold_mode: 0,
            speed_min_kph: 0.0,
            speed_unit_kph: 0,
            eco_boost_kph: 0.0,
            speed_upto_road_limit: 0.0,
            steer_actuator_delay_s: 0.0,
            turn_control: 0,
            turn_end_s: 0.0,
            turn_speed_lane_change_kph: 0.0,
            turn_speed_kph: 0.0,
            curve_ctrl_use: 0,
            curve_factor: 0.0,
            curve_factor_in: 0.0,
        };
        for g in RefreshGroup::ALL {
            t.refresh(g, store);
        }
        t
    }

    /// Re-read one group in place.
    pub fn refresh<P: ParamSource + ?Sized>(&mut self, group: RefreshGroup, store: &P) {
        tracing::trace!(group = group.name(), "refresh tunables");
        match group {
            RefreshGroup::Navi => {
                self.bump_speed_kph = scaled(store, &NAVI_BUMP_SPEED, 1.0);
                self.bump_time_s = scaled(store, &NAVI_BUMP_TIME, 1.0);
                self.ctrl_end_s = scaled(store, &NAVI_CTRL_END, 1.0);
                self.safety_factor = scaled(store, &NAVI_SAFETY_FACTOR, 0.01);
                self.decel_rate = scaled(store, &NAVI_DECEL_RATE, 0.01);
                self.navi_ctrl = resolve(store, &NAVI_CTRL);
            }
            RefreshGroup::Cruise => {
                self.resume_from_gas_speed_kph = scaled(store, &RESUME_FROM_GAS_SPEED, 1.0);
                self.cancel_from_gas_mode = resolve(store, &CANCEL_FROM_GAS_MODE);
                self.resume_from_brake_release = resolve(store, &RESUME_FROM_BRAKE_RELEASE) > 0;
                self.auto_cruise_control = resolve(store, &AUTO_CRUISE_CONTROL);
                self.button_mode = resolve(store, &CRUISE_BUTTON_MODE);
                self.cruise_on_dist_m = scaled(store, &CRUISE_ON_DIST, 0.01);
                self.soft_hold_mode = resolve(store, &SOFT_HOLD_MODE);
                self.speed_min_kph = scaled(store, &CRUISE_SPEED_MIN, 1.0);
                self.speed_unit_kph = resolve(store, &CRUISE_SPEED_UNIT);
                self.eco_boost_kph = scaled(store, &CRUISE_ECO_CONTROL, 1.0);
            }
            RefreshGroup::Lateral => {
                self.speed_upto_road_limit = scaled(store, &SPEED_UPTO_ROAD_LIMIT, 0.01);
                self.steer_actuator_delay_s = scaled(store, &STEER_ACTUATOR_DELAY, 0.01);
            }
            RefreshGroup::Turn => {
                self.turn_control = resolve(store, &TURN_CONTROL);
                self.turn_end_s = scaled(store, &TURN_END, 1.0);
                self.turn_speed_lane_change_kph = scaled(store, &TURN_SPEED_LANE_CHANGE, 1.0);
                self.turn_speed_kph = scaled(store, &TURN_SPEED_TURN, 1.0);
            }
            RefreshGroup::Curve => {
                self.curve_ctrl_use = resolve(store, &CURVE_CTRL_USE);
                self.curve_factor = scaled(store, &CURVE_FACTOR, 0.01);
                self.curve_factor_in = scaled(store, &CURVE_FACTOR_IN, 0.01);
            }
        }
    }

    /// Actuator delay used by the lateral filter, never below 10 ms.
    #[inline]
    pub fn actuator_delay_s(&self) -> f32 {
        self.steer_actuator_delay_s.max(0.01)
    }
}

/// In-memory parameter store keyed by store names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamTable {
    values: HashMap<String, i64>,
}

impl ParamTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table holding every known key at its default.
    pub fn with_defaults() -> Self {
        let mut t = Self::new();
        for s in PARAM_SPECS {
            t.set(s.key, s.default);
        }
        t
    }

    pub fn set(&mut self, key: &str, value: i64) -> &mut Self {
        self.values.insert(key.to_string(), value);
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<i64> {
        self.values.remove(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ParamSource for ParamTable {
    #[inline]
    fn get_int(&self, key: &str) -> Option<i64> {
        self.values.get(key).copied()
    }
}
