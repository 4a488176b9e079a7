#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas and drive-trace parsing for the cruise decision engine.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated. Values
//!   are kept in the integer units of the persistent parameter store
//!   (percentages, centimetres, seconds) so a config file and a live store
//!   are interchangeable.
//! - The trace CSV loader enforces an exact header row and yields one
//!   `TraceRow` per control tick.
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct VehicleCfg {
    /// Car's own cruise module owns the set-speed; the engine only mirrors it.
    pub pcm_cruise: bool,
    /// Button steps in km/h when true, mph otherwise.
    pub is_metric: bool,
}

impl Default for VehicleCfg {
    fn default() -> Self {
        Self {
            pcm_cruise: false,
            is_metric: true,
        }
    }
}

/// Navigation / camera speed-limit tuning.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct NaviCfg {
    /// Target speed over a speed bump (km/h)
    pub bump_speed: i64,
    /// Lookahead before a bump, seconds of travel at cluster speed
    pub bump_time: i64,
    /// Lookahead before a camera/sign, seconds of travel at cluster speed
    pub ctrl_end: i64,
    /// Multiplier on the posted limit, percent
    pub safety_factor: i64,
    /// Deceleration profile rate, hundredths
    pub decel_rate: i64,
    /// On-board sign recognition is used as a source when >= 2
    pub ctrl: i64,
}

impl Default for NaviCfg {
    fn default() -> Self {
        Self {
            bump_speed: 35,
            bump_time: 1,
            ctrl_end: 6,
            safety_factor: 105,
            decel_rate: 80,
            ctrl: 2,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CruiseCfg {
    /// Minimum ego speed (km/h) for gas-release resume; 0 disables gas-tap resume
    pub auto_resume_from_gas_speed: i64,
    /// 0 off, 1 cancel on gas release below resume speed, 2 also while stopping for a light
    pub auto_cancel_from_gas_mode: i64,
    /// Resume on brake release (0/1)
    pub auto_resume_from_brake_release_traffic_sign: i64,
    /// 0 disables automatic engagement, 2+ also engages on a closing lead
    pub auto_cruise_control: i64,
    /// Button behaviour table selector (0..=4)
    pub button_mode: i64,
    /// Lead distance that engages cruise while coasting, centimetres (sign ignored)
    pub on_dist_cm: i64,
    /// Soft-hold at standstill (0 off)
    pub soft_hold_mode: i64,
    /// Lowest set-speed (km/h)
    pub speed_min: i64,
    /// Speed-up step grid (km/h)
    pub speed_unit: i64,
    /// Eco boost over the set-speed (km/h), 0 off
    pub eco_control: i64,
}

impl Default for CruiseCfg {
    fn default() -> Self {
        Self {
            auto_resume_from_gas_speed: 30,
            auto_cancel_from_gas_mode: 0,
            auto_resume_from_brake_release_traffic_sign: 0,
            auto_cruise_control: 1,
            button_mode: 0,
            on_dist_cm: 0,
            soft_hold_mode: 1,
            speed_min: 10,
            speed_unit: 10,
            eco_control: 4,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LateralCfg {
    /// Follow a faster lead up to this share of the road limit, percent (0 off)
    pub speed_upto_road_limit: i64,
    /// Steering actuator delay, hundredths of a second
    pub steer_actuator_delay: i64,
}

impl Default for LateralCfg {
    fn default() -> Self {
        Self {
            speed_upto_road_limit: 0,
            steer_actuator_delay: 30,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TurnCfg {
    /// 0 off, 1 blinker assist, 2+ also slow down for turns
    pub auto_turn_control: i64,
    /// Seconds of travel before the turn by which the turn speed must be met
    pub turn_end: i64,
    /// Lane-change speed on slow roads (km/h)
    pub speed_lane_change: i64,
    /// Turn speed on slow roads (km/h)
    pub speed_turn: i64,
}

impl Default for TurnCfg {
    fn default() -> Self {
        Self {
            auto_turn_control: 0,
            turn_end: 6,
            speed_lane_change: 60,
            speed_turn: 20,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CurveCfg {
    /// Curve slowdown (0 off)
    pub ctrl_use: i64,
    /// Curvature gain, percent
    pub factor: i64,
    /// Lead-in penalty gain, percent
    pub factor_in: i64,
}

impl Default for CurveCfg {
    fn default() -> Self {
        Self {
            ctrl_use: 1,
            factor: 100,
            factor_in: 10,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub vehicle: VehicleCfg,
    pub navi: NaviCfg,
    pub cruise: CruiseCfg,
    pub lateral: LateralCfg,
    pub turn: TurnCfg,
    pub curve: CurveCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

fn ensure_range(name: &str, v: i64, lo: i64, hi: i64) -> eyre::Result<()> {
    if !(lo..=hi).contains(&v) {
        eyre::bail!("{name} must be in [{lo}, {hi}], got {v}");
    }
    Ok(())
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Navi
        ensure_range("navi.bump_speed", self.navi.bump_speed, 10, 100)?;
        ensure_range("navi.bump_time", self.navi.bump_time, 1, 50)?;
        ensure_range("navi.ctrl_end", self.navi.ctrl_end, 3, 20)?;
        ensure_range("navi.safety_factor", self.navi.safety_factor, 80, 120)?;
        ensure_range("navi.decel_rate", self.navi.decel_rate, 10, 200)?;
        ensure_range("navi.ctrl", self.navi.ctrl, 0, 3)?;

        // Cruise
        ensure_range(
            "cruise.auto_resume_from_gas_speed",
            self.cruise.auto_resume_from_gas_speed,
            0,
            140,
        )?;
        ensure_range(
            "cruise.auto_cancel_from_gas_mode",
            self.cruise.auto_cancel_from_gas_mode,
            0,
            2,
        )?;
        ensure_range(
            "cruise.auto_resume_from_brake_release_traffic_sign",
            self.cruise.auto_resume_from_brake_release_traffic_sign,
            0,
            1,
        )?;
        ensure_range(
            "cruise.auto_cruise_control",
            self.cruise.auto_cruise_control,
            0,
            3,
        )?;
        ensure_range("cruise.button_mode", self.cruise.button_mode, 0, 4)?;
        ensure_range("cruise.on_dist_cm", self.cruise.on_dist_cm, -500, 500)?;
        ensure_range("cruise.soft_hold_mode", self.cruise.soft_hold_mode, 0, 2)?;
        ensure_range("cruise.speed_min", self.cruise.speed_min, 5, 50)?;
        ensure_range("cruise.speed_unit", self.cruise.speed_unit, 1, 20)?;
        ensure_range("cruise.eco_control", self.cruise.eco_control, 0, 10)?;

        // Lateral
        ensure_range(
            "lateral.speed_upto_road_limit",
            self.lateral.speed_upto_road_limit,
            0,
            200,
        )?;
        ensure_range(
            "lateral.steer_actuator_delay",
            self.lateral.steer_actuator_delay,
            0,
            100,
        )?;

        // Turn
        ensure_range("turn.auto_turn_control", self.turn.auto_turn_control, 0, 3)?;
        ensure_range("turn.turn_end", self.turn.turn_end, 0, 30)?;
        ensure_range("turn.speed_lane_change", self.turn.speed_lane_change, 0, 100)?;
        ensure_range("turn.speed_turn", self.turn.speed_turn, 0, 100)?;

        // Curve
        ensure_range("curve.ctrl_use", self.curve.ctrl_use, 0, 3)?;
        ensure_range("curve.factor", self.curve.factor, 50, 300)?;
        ensure_range("curve.factor_in", self.curve.factor_in, 0, 300)?;

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got {rot}");
        }

        Ok(())
    }
}

/// Exact header row of a drive-trace CSV, in column order.
pub const TRACE_HEADERS: [&str; 30] = [
    "tick",
    "v_ego",
    "v_ego_cluster",
    "brake",
    "gas",
    "cruise_available",
    "enabled",
    "can_enable",
    "button",
    "button_pressed",
    "lead_d_rel",
    "lead_v_rel",
    "long_state",
    "traffic_light",
    "road_limit_speed",
    "roadcate",
    "cam_type",
    "x_sign_type",
    "x_spd_limit",
    "x_spd_dist",
    "cam_limit_speed",
    "cam_limit_dist",
    "sign_limit",
    "sign_dist",
    "x_dist_to_turn",
    "x_turn_info",
    "cmd_index",
    "cmd",
    "cmd_arg",
    "yaw_rate",
];

/// One control tick of a recorded drive.
///
/// Speeds are m/s except the road/camera/sign limits (km/h). `button` is one of
/// `accel`, `decel`, `gap`, `cancel`, `resume` or empty; `cmd`/`cmd_arg` carry
/// the external command pair (empty when absent). `lead_d_rel <= 0` means no lead.
/// `yaw_rate` (rad/s) fills the whole predicted horizon.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TraceRow {
    pub tick: u64,
    pub v_ego: f32,
    pub v_ego_cluster: f32,
    pub brake: bool,
    pub gas: bool,
    pub cruise_available: bool,
    pub enabled: bool,
    pub can_enable: bool,
    pub button: String,
    pub button_pressed: bool,
    pub lead_d_rel: f32,
    pub lead_v_rel: f32,
    pub long_state: u8,
    pub traffic_light: u8,
    pub road_limit_speed: f32,
    pub roadcate: i32,
    pub cam_type: i32,
    pub x_sign_type: i32,
    pub x_spd_limit: f32,
    pub x_spd_dist: f32,
    pub cam_limit_speed: f32,
    pub cam_limit_dist: f32,
    pub sign_limit: f32,
    pub sign_dist: f32,
    pub x_dist_to_turn: f32,
    pub x_turn_info: i32,
    pub cmd_index: i64,
    pub cmd: String,
    pub cmd_arg: String,
    pub yaw_rate: f32,
}

pub fn load_trace_csv(path: &std::path::Path) -> eyre::Result<Vec<TraceRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open trace CSV {:?}: {}", path, e))?;

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != TRACE_HEADERS {
        eyre::bail!(
            "trace CSV must have headers '{}', got: {}",
            TRACE_HEADERS.join(","),
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<TraceRow>().enumerate() {
        match rec {
            Ok(row) => rows.push(row),
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }

    if rows.is_empty() {
        eyre::bail!("trace CSV {:?} has no rows", path);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_valid_defaults() {
        let cfg = load_toml("").unwrap();
        cfg.validate().unwrap();
        assert_eq!(cfg.cruise.speed_min, 10);
        assert_eq!(cfg.navi.safety_factor, 105);
        assert!(cfg.vehicle.is_metric);
    }

    #[test]
    fn rotation_must_be_known() {
        let cfg = load_toml("[logging]\nrotation = \"weekly\"\n").unwrap();
        let err = cfg.validate().unwrap_err().to_string();
        assert!(err.contains("logging.rotation"), "{err}");
    }
}
