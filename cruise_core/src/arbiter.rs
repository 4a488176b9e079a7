//! Top-level cruise-speed state machine.
//!
//! One [`CruiseSpeedArbiter`] owns every counter that persists between ticks
//! (pedal dwell, button debounce, soft-hold, blinker countdowns, the curve
//! filter) and folds driver input, the lead vehicle and the three limiters into
//! one applied cruise speed and an activation request per tick.
//!
//! Pedal dwell counters are signed: while pressed they count up from 1, on the
//! release tick they flip to -1 and keep counting down. A gas "tap" is a
//! release after fewer than 60 pressed ticks.

use cruise_traits::ParamSource;

use crate::command::{CruiseArg, NavCommand, SpeedArg};
use crate::curve::{CurveSpeedLimiter, NO_CURVE_LIMIT};
use crate::events::{AlertKind, EventEmitter};
use crate::nav_limit::{NO_NAV_LIMIT, NavLimit, NavigationSpeedLimiter};
use crate::params::{RefreshScheduler, Tunables};
use crate::turn_assist::TurnAssistSignaler;
use crate::types::{
    ActivationRequest, BlinkerExtension, ButtonKind, CruiseOutput, LongitudinalState,
    SoftHoldLevel, TickInput, TrafficLight, VehicleState,
};
use crate::util::{MPH_TO_KPH, MS_TO_KPH, clip};

/// Cruise speed while cruise is unavailable or not yet initialized, km/h.
pub const V_CRUISE_INITIAL: f32 = 30.0;
/// Initial speed when engaging in experimental mode, km/h.
pub const V_CRUISE_INITIAL_EXPERIMENTAL: f32 = 105.0;
pub const V_CRUISE_MAX: f32 = 145.0;
/// A remembered speed at or above this was never a real set-speed.
const V_CRUISE_UNSET: f32 = 250.0;
/// Set-speeds above this are treated as uninitialized.
const V_CRUISE_SANE_MAX: f32 = 200.0;

const LONG_PRESS_TICKS: u32 = 40;
const LONG_PRESS_STEP_KPH: f32 = 10.0;
const GAS_TAP_TICKS: i32 = 60;
const SOFT_HOLD_TICKS: u32 = 60;
const COMMAND_BLINKER_TICKS: u32 = 50;
const SPEED_DOWN_INTERVAL: u32 = 60;
const DEBUG_HOLD_TICKS: u32 = 300;
/// First speed of the speed-up ladder, km/h.
const SPEED_UP_BASE_KPH: i64 = 40;
const STOP_SPEED_KPH: f32 = 20.0;

/// Who owns the set-speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CruiseMode {
    /// Set-speed is computed here from buttons, pedals and limiters.
    #[default]
    Managed,
    /// The car's cruise module owns the set-speed; values are passed through.
    Pcm,
}

/// Everything that persists between ticks.
#[derive(Debug, Clone, PartialEq)]
pub struct CruiseState {
    /// Applied speed after every cap, km/h
    pub v_cruise_kph: f32,
    pub v_cruise_cluster_kph: f32,
    /// Driver set-speed before caps, km/h
    pub v_cruise_set_kph: f32,
    /// Applied speed at the start of the current tick
    pub v_cruise_kph_last: f32,
    /// Cluster speed rounded to whole km/h
    pub v_ego_kph_set: f32,
    pub gas_dwell: i32,
    pub brake_dwell: i32,
    pub button_count: u32,
    pub long_pressed: bool,
    pub button_prev: ButtonKind,
    pub soft_hold: SoftHoldLevel,
    pub soft_hold_count: u32,
    pub cancel_toggled: bool,
    /// Driver asked to disengage but re-engage is allowed once a lead or stop appears
    pub active_ready: bool,
    pub blinker: BlinkerExtension,
    /// Road speed limit from the last navigation-limit evaluation, km/h
    pub road_speed_kph: f32,
    /// Eco cruise target, 0 when inactive
    pub eco_target_kph: f32,
    pub last_command_index: i64,
    pub long_state: LongitudinalState,
    pub traffic_light: TrafficLight,
    /// `initialize` has not run yet
    pub first: bool,
}

impl Default for CruiseState {
    fn default() -> Self {
        Self {
            v_cruise_kph: V_CRUISE_INITIAL,
            v_cruise_cluster_kph: V_CRUISE_INITIAL,
            v_cruise_set_kph: V_CRUISE_INITIAL,
            v_cruise_kph_last: 0.0,
            v_ego_kph_set: 0.0,
            // both pedals start released so the first tick is not a release edge
            gas_dwell: -1,
            brake_dwell: -1,
            button_count: 0,
            long_pressed: false,
            button_prev: ButtonKind::Unknown,
            soft_hold: SoftHoldLevel::Inactive,
            soft_hold_count: 0,
            cancel_toggled: false,
            active_ready: false,
            blinker: BlinkerExtension::default(),
            road_speed_kph: V_CRUISE_INITIAL,
            eco_target_kph: 0.0,
            last_command_index: 0,
            long_state: LongitudinalState::Lead,
            traffic_light: TrafficLight::Off,
            first: true,
        }
    }
}

/// Status line that stays visible for a while after the last message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebugLog {
    text: String,
    timer: u32,
}

impl DebugLog {
    pub fn note(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        tracing::debug!(msg = %msg, "cruise");
        self.text = msg;
        self.timer = DEBUG_HOLD_TICKS;
    }

    /// Age the current line by one tick, clearing it once expired.
    pub fn tick(&mut self) {
        self.timer = self.timer.saturating_sub(1);
        if self.timer == 0 {
            self.text.clear();
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Lead distance and relative speed, zeros when there is no lead.
#[derive(Debug, Clone, Copy, Default)]
struct Lead {
    d_rel: f32,
    v_rel: f32,
}

#[derive(Debug, Clone)]
pub struct CruiseSpeedArbiter {
    mode: CruiseMode,
    tunables: Tunables,
    scheduler: RefreshScheduler,
    state: CruiseState,
    curve: CurveSpeedLimiter,
    nav: NavigationSpeedLimiter,
    turn: TurnAssistSignaler,
    events: EventEmitter,
    debug: DebugLog,
}

impl CruiseSpeedArbiter {
    /// Build an arbiter with every tunable group loaded from `store`.
    pub fn new<P: ParamSource + ?Sized>(mode: CruiseMode, store: &P) -> Self {
        Self {
            mode,
            tunables: Tunables::load(store),
            scheduler: RefreshScheduler::new(),
            state: CruiseState::default(),
            curve: CurveSpeedLimiter::new(),
            nav: NavigationSpeedLimiter::new(),
            turn: TurnAssistSignaler::new(),
            events: EventEmitter::new(),
            debug: DebugLog::default(),
        }
    }

    pub fn mode(&self) -> CruiseMode {
        self.mode
    }

    pub fn state(&self) -> &CruiseState {
        &self.state
    }

    pub fn tunables(&self) -> &Tunables {
        &self.tunables
    }

    /// Seed the set-speed on first engagement. Restores the previous speed
    /// when the driver engaged with accel/resume, else starts from ego speed.
    /// No-op when the car owns the set-speed or after the first call.
    pub fn initialize(&mut self, vehicle: &VehicleState, experimental: bool) {
        if self.mode == CruiseMode::Pcm || !self.state.first {
            return;
        }
        self.state.first = false;
        let initial = if experimental {
            V_CRUISE_INITIAL_EXPERIMENTAL
        } else {
            V_CRUISE_INITIAL
        };
        let resumed = vehicle
            .button_events
            .iter()
            .any(|b| matches!(b.kind, ButtonKind::Accel | ButtonKind::Resume));
        let v = if resumed && self.state.v_cruise_kph_last < V_CRUISE_UNSET {
            self.state.v_cruise_kph_last
        } else {
            clip(vehicle.v_ego * MS_TO_KPH, initial, V_CRUISE_MAX).round()
        };
        self.state.v_cruise_kph = v;
        self.state.v_cruise_set_kph = v;
        self.state.v_cruise_cluster_kph = v;
        tracing::info!(v_cruise_kph = v, resumed, "cruise initialized");
    }

    /// Run one control tick.
    pub fn update<P: ParamSource + ?Sized>(&mut self, input: &TickInput, store: &P) -> CruiseOutput {
        self.events.advance();
        self.state.v_cruise_kph_last = self.state.v_cruise_kph;
        if let Some(group) = self.scheduler.tick() {
            self.tunables.refresh(group, store);
        }

        let mut request = ActivationRequest::None;
        let mut curve_speed_kph = NO_CURVE_LIMIT;
        let mut nav = NavLimit {
            speed_kph: NO_NAV_LIMIT,
            ..NavLimit::default()
        };
        let vehicle = &input.vehicle;

        if vehicle.cruise_available {
            match self.mode {
                CruiseMode::Managed => {
                    (request, curve_speed_kph, nav) = self.update_managed(input);
                    self.update_events(input);
                }
                CruiseMode::Pcm => {
                    self.state.v_cruise_kph = vehicle.pcm_cruise_speed * MS_TO_KPH;
                    let cluster = vehicle.pcm_cruise_speed_cluster * MS_TO_KPH;
                    self.state.v_cruise_cluster_kph = cluster;
                    self.state.v_cruise_set_kph = cluster;
                }
            }
        } else {
            self.state.v_cruise_kph = V_CRUISE_INITIAL;
            self.state.v_cruise_set_kph = V_CRUISE_INITIAL;
            self.state.soft_hold = SoftHoldLevel::Inactive;
            self.state.soft_hold_count = 0;
        }
        // holds only apply at standstill, whatever the mode
        if vehicle.v_ego > 1.0 {
            self.state.soft_hold = SoftHoldLevel::Inactive;
        }

        let min = self.tunables.speed_min_kph;
        self.state.v_cruise_kph = clip(self.state.v_cruise_kph, min, V_CRUISE_MAX);
        // the car reports its own cluster speed in PCM mode
        if !vehicle.cruise_available || self.mode != CruiseMode::Pcm {
            self.state.v_cruise_cluster_kph = self.state.v_cruise_kph;
        }

        if request != ActivationRequest::None {
            tracing::info!(
                request = request.as_i8(),
                v_cruise_kph = self.state.v_cruise_kph,
                "activation request"
            );
        }

        CruiseOutput {
            v_cruise_kph: self.state.v_cruise_kph,
            v_cruise_cluster_kph: self.state.v_cruise_cluster_kph,
            v_cruise_set_kph: self.state.v_cruise_set_kph,
            request,
            alerts: self.events.drain(),
            blinker: self.state.blinker,
            soft_hold: self.state.soft_hold,
            curve_speed_kph,
            nav_limit_kph: nav.speed_kph,
            limit_source: nav.source,
            debug_text: self.debug.text().to_string(),
            nav_debug: nav.debug,
        }
    }

    fn update_managed(&mut self, input: &TickInput) -> (ActivationRequest, f32, NavLimit) {
        let vehicle = &input.vehicle;
        self.state.blinker.decay();

        let lead = input.lead.map_or(Lead::default(), |l| Lead {
            d_rel: l.d_rel,
            v_rel: l.v_rel,
        });
        self.state.v_ego_kph_set = (vehicle.v_ego_cluster * MS_TO_KPH + 0.5).floor();
        if self.state.v_cruise_set_kph > V_CRUISE_SANE_MAX {
            self.state.v_cruise_set_kph = self.tunables.speed_min_kph;
        }

        let (v_set, request) = self.update_buttons(input, self.state.v_cruise_set_kph, lead);
        let mut applied = self.eco_speed(v_set);

        let turn = self.turn.signal(
            input.nav.maneuver.as_ref(),
            &input.road,
            input.nav.lane_edges,
            self.state.blinker,
            &self.tunables,
            &mut self.events,
        );
        self.state.blinker = turn.blinker;

        let nav = self.nav.limit(
            vehicle,
            &input.road,
            &turn,
            self.state.v_cruise_kph,
            &self.tunables,
        );
        self.state.road_speed_kph = nav.road_speed_kph;
        if nav.speed_down {
            self.events.emit_with(AlertKind::SpeedDown, SPEED_DOWN_INTERVAL);
        }
        applied = applied.min(nav.speed_kph);

        let curve = self.curve.limit(&input.yaw_rates, vehicle.v_ego, &self.tunables);
        if self.tunables.curve_ctrl_use > 0 {
            applied = applied.min(curve);
        }

        self.state.v_cruise_set_kph = v_set;
        self.state.v_cruise_kph = applied;
        (request, curve, nav)
    }

    /// Buttons, pedals, lead vehicle and the command channel. Returns the new
    /// set-speed and this tick's activation request.
    fn update_buttons(
        &mut self,
        input: &TickInput,
        mut v: f32,
        lead: Lead,
    ) -> (f32, ActivationRequest) {
        let Self {
            tunables: t,
            state: st,
            events,
            debug,
            ..
        } = self;
        let vehicle = &input.vehicle;
        let enabled = input.controls.enabled;
        let long_state = input.traffic.long_state;
        let min = t.speed_min_kph;
        let mut request = ActivationRequest::None;

        if v > V_CRUISE_SANE_MAX {
            debug.note("VCruise: speed initialize");
            v = min;
        }

        if vehicle.brake_pressed {
            st.brake_dwell = press(st.brake_dwell);
            st.soft_hold_count = if t.soft_hold_mode > 0 && vehicle.v_ego < 0.1 {
                st.soft_hold_count.saturating_add(1)
            } else {
                0
            };
            st.soft_hold = if st.soft_hold_count > SOFT_HOLD_TICKS {
                SoftHoldLevel::Counting
            } else {
                SoftHoldLevel::Inactive
            };
        } else {
            st.soft_hold_count = 0;
            st.brake_dwell = release(st.brake_dwell);
        }

        let gas_tap = if vehicle.gas_pressed {
            st.gas_dwell = press(st.gas_dwell);
            st.soft_hold = SoftHoldLevel::Inactive;
            false
        } else {
            let tap = st.gas_dwell > 0 && st.gas_dwell < GAS_TAP_TICKS;
            st.gas_dwell = release(st.gas_dwell);
            tap
        };

        if enabled || vehicle.brake_pressed || vehicle.gas_pressed {
            st.active_ready = false;
        }

        // buttons
        let unit = if input.controls.is_metric {
            1.0
        } else {
            MPH_TO_KPH
        };
        let down_step = if matches!(t.button_mode, 3 | 4) {
            10.0
        } else {
            1.0
        };
        let mut button_kph = v;
        let mut fired: Option<ButtonKind> = None;
        if st.button_count > 0 {
            st.button_count += 1;
        }
        for b in &vehicle.button_events {
            if b.pressed && st.button_count == 0 && b.kind.is_debounced() {
                st.button_count = 1;
                st.button_prev = b.kind;
            } else if !b.pressed && st.button_count > 0 {
                match b.kind {
                    ButtonKind::Cancel => fired = Some(ButtonKind::Cancel),
                    ButtonKind::Accel if !st.long_pressed => {
                        button_kph += unit;
                        fired = Some(ButtonKind::Accel);
                    }
                    ButtonKind::Decel if !st.long_pressed => {
                        button_kph -= down_step * unit;
                        fired = Some(ButtonKind::Decel);
                    }
                    ButtonKind::GapAdjust if !st.long_pressed => {
                        fired = Some(ButtonKind::GapAdjust);
                    }
                    _ => {}
                }
                st.long_pressed = false;
                st.button_count = 0;
            }
        }
        if st.button_count > LONG_PRESS_TICKS {
            st.long_pressed = true;
            match st.button_prev {
                ButtonKind::Accel => {
                    button_kph += LONG_PRESS_STEP_KPH - button_kph.rem_euclid(LONG_PRESS_STEP_KPH);
                    fired = Some(ButtonKind::Accel);
                    st.button_count %= LONG_PRESS_TICKS;
                }
                ButtonKind::Decel => {
                    button_kph -=
                        LONG_PRESS_STEP_KPH - (-button_kph).rem_euclid(LONG_PRESS_STEP_KPH);
                    fired = Some(ButtonKind::Decel);
                    st.button_count %= LONG_PRESS_TICKS;
                }
                kind @ (ButtonKind::Cancel | ButtonKind::GapAdjust) => {
                    fired = Some(kind);
                    st.button_count = 0;
                    st.long_pressed = false;
                }
                ButtonKind::Resume | ButtonKind::Unknown => {}
            }
        }
        let button_kph = clip(button_kph, min, V_CRUISE_MAX);

        if let Some(kind) = fired {
            if !enabled {
                request = ActivationRequest::None;
            } else if st.long_pressed {
                if matches!(kind, ButtonKind::Accel | ButtonKind::Decel) {
                    v = button_kph;
                }
            } else {
                match kind {
                    ButtonKind::Accel => {
                        if st.soft_hold != SoftHoldLevel::Inactive {
                            st.soft_hold = SoftHoldLevel::Inactive;
                        } else if t.button_mode == 0 {
                            v = button_kph;
                        } else if matches!(t.button_mode, 1 | 2) {
                            v = speed_up(v, st.road_speed_kph, t);
                        }
                    }
                    ButtonKind::Decel => {
                        if t.auto_cruise_control == 0 || matches!(t.button_mode, 0 | 1) {
                            v = button_kph;
                        } else if v > st.v_ego_kph_set + 2.0 {
                            v = st.v_ego_kph_set;
                        } else {
                            st.active_ready = true;
                            request = ActivationRequest::Deactivate;
                            events.fire(AlertKind::AudioPrompt);
                            debug.note("Cruise ready: decel at ego speed");
                        }
                    }
                    _ => {}
                }
            }
        }

        if vehicle.v_ego > 1.0 {
            st.soft_hold = SoftHoldLevel::Inactive;
        }
        if st.brake_dwell > 0
            || st.gas_dwell > 0
            || matches!(
                fired,
                Some(ButtonKind::Cancel | ButtonKind::Accel | ButtonKind::Decel)
            )
        {
            if fired == Some(ButtonKind::Cancel) {
                st.cancel_toggled = !st.cancel_toggled;
                events.fire(AlertKind::AudioPrompt);
                tracing::info!(cancel_toggled = st.cancel_toggled, "auto cruise cancel toggled");
            } else if fired.is_some() {
                st.cancel_toggled = false;
            }
            if request == ActivationRequest::Activate {
                request = ActivationRequest::None;
            }
        }

        // pedals
        let ego = st.v_ego_kph_set;
        let resume = t.resume_from_gas_speed_kph;
        let cancel_mode = t.cancel_from_gas_mode;
        if gas_tap {
            if enabled {
                v = speed_up(v, st.road_speed_kph, t);
            } else if resume > 0.0 {
                debug.note("Cruise activate from gas tap");
                v = ego;
                request = ActivationRequest::Activate;
            }
        } else if st.gas_dwell == -1 {
            if lead.d_rel > 0.0 && lead.d_rel < vehicle.v_ego * 0.8 && cancel_mode > 0 {
                debug.note("Cruise deactivate from gas: lead too close");
                request = ActivationRequest::Deactivate;
            } else if cancel_mode > 0 && ego < resume {
                debug.note("Cruise deactivate from gas");
                request = ActivationRequest::Deactivate;
            } else if long_state == LongitudinalState::E2eStop && cancel_mode == 2 {
                debug.note("Cruise deactivate from gas: traffic stopping");
                request = ActivationRequest::Deactivate;
            } else if ego > resume && resume > 0.0 {
                if request.as_i8() <= 0 {
                    v = ego;
                    debug.note("Cruise activate from speed");
                }
                request = ActivationRequest::Activate;
            }
        } else if st.brake_dwell == -1
            && st.soft_hold == SoftHoldLevel::Inactive
            && resume < ego
            && t.resume_from_brake_release
        {
            v = ego;
            debug.note("Cruise activate from brake release");
            request = ActivationRequest::Activate;
        }

        if st.gas_dwell > 0 && ego > v {
            v = ego;
        } else if st.brake_dwell == -1
            && st.soft_hold == SoftHoldLevel::Counting
            && t.soft_hold_mode > 0
        {
            debug.note("Cruise activate from soft hold");
            st.soft_hold = SoftHoldLevel::Confirmed;
            request = ActivationRequest::Activate;
        } else if st.brake_dwell == -1
            && long_state == LongitudinalState::E2eStop
            && t.resume_from_brake_release
        {
            debug.note("Cruise activate from traffic sign stop");
            request = ActivationRequest::Activate;
        } else if st.brake_dwell == -1 && lead.d_rel > 0.0 && lead.d_rel < 20.0 {
            debug.note("Cruise activate from lead car");
            request = ActivationRequest::Activate;
        } else if st.active_ready {
            if lead.d_rel > 0.0 || long_state == LongitudinalState::E2eStop {
                debug.note("Cruise activate from lead or traffic sign stop");
                request = ActivationRequest::Activate;
            }
        } else if !enabled && st.brake_dwell < 0 && st.gas_dwell < 0 {
            let on_dist = t.cruise_on_dist_m.abs();
            let v_ego = vehicle.v_ego;
            if t.auto_cruise_control >= 2
                && lead.v_rel < 0.0
                && lead.d_rel > 0.0
                && lead.d_rel < v_ego * v_ego / 5.0
            {
                debug.note("Cruise activated: closing on lead");
                request = ActivationRequest::Activate;
            }
            if on_dist > 0.0 && v_ego > 0.2 && lead.d_rel > 0.0 && lead.d_rel < on_dist {
                events.emit(AlertKind::StopStop);
                debug.note("Cruise activate: cruise-on distance");
                request = ActivationRequest::Activate;
            }
        } else if enabled && t.speed_upto_road_limit > 0.0 && lead.v_rel > 0.5 {
            let lead_kph = (lead.v_rel + vehicle.v_ego_cluster) * MS_TO_KPH;
            v = v.max(lead_kph.min(st.road_speed_kph * t.speed_upto_road_limit));
        }

        // command channel
        if let Some(msg) = input.road.command.as_ref()
            && msg.index > 0
            && msg.index != st.last_command_index
        {
            st.last_command_index = msg.index;
            tracing::debug!(index = msg.index, command = ?msg.command, "command");
            match &msg.command {
                NavCommand::Speed(SpeedArg::Up) => v = speed_up(v, st.road_speed_kph, t),
                NavCommand::Speed(SpeedArg::Down) => {
                    if ego < v {
                        v = ego;
                    } else if v > V_CRUISE_INITIAL {
                        v = (v - 10.0).max(V_CRUISE_INITIAL);
                    }
                }
                NavCommand::Speed(SpeedArg::Set(kph)) => v = clip(*kph as f32, min, V_CRUISE_MAX),
                NavCommand::Cruise(CruiseArg::On) => {
                    if !enabled {
                        request = ActivationRequest::Activate;
                    }
                }
                NavCommand::Cruise(CruiseArg::Off) => {
                    if enabled {
                        st.active_ready = true;
                        request = ActivationRequest::Deactivate;
                        events.fire(AlertKind::AudioPrompt);
                    }
                }
                NavCommand::Cruise(CruiseArg::Go) => {
                    if !enabled {
                        request = ActivationRequest::Activate;
                    } else if st.soft_hold != SoftHoldLevel::Inactive {
                        st.soft_hold = SoftHoldLevel::Inactive;
                    } else {
                        v = speed_up(v, st.road_speed_kph, t);
                    }
                }
                NavCommand::Cruise(CruiseArg::Stop) => v = STOP_SPEED_KPH,
                NavCommand::LaneChange(side) => {
                    let was_armed = st.blinker.is_armed();
                    st.blinker.arm(*side, COMMAND_BLINKER_TICKS);
                    st.blinker.voice = true;
                    if !was_armed {
                        events.emit(AlertKind::AudioLaneChange);
                    }
                }
                NavCommand::Detect(arg) => debug.note(format!("DETECT[{}]={arg}", msg.index)),
                NavCommand::Unknown => {}
            }
        }

        if t.auto_cruise_control < 1 || st.cancel_toggled || !input.controls.can_enable {
            if request != ActivationRequest::None {
                debug.note(format!("Cancel auto cruise = {}", request.as_i8()));
            }
            request = ActivationRequest::None;
            st.soft_hold = SoftHoldLevel::Inactive;
        }
        debug.tick();
        (clip(v, min, V_CRUISE_MAX), request)
    }

    /// Eco cruise: hold a boosted target while ego is below the set-speed.
    fn eco_speed(&mut self, v: f32) -> f32 {
        let st = &mut self.state;
        let boost = self.tunables.eco_boost_kph;
        if boost <= 0.0 {
            st.eco_target_kph = 0.0;
            return v;
        }
        if st.eco_target_kph > 0.0 {
            if st.eco_target_kph < v {
                st.eco_target_kph = v;
            } else if st.eco_target_kph > v {
                st.eco_target_kph = 0.0;
            }
        } else if st.v_ego_kph_set + 3.0 < v && v > 20.0 {
            st.eco_target_kph = v;
        }
        if st.eco_target_kph > 0.0 {
            if st.v_ego_kph_set > st.eco_target_kph {
                st.eco_target_kph = 0.0;
            } else {
                return st.eco_target_kph + boost;
            }
        }
        v
    }

    /// Alerts on planner and traffic-light transitions.
    fn update_events(&mut self, input: &TickInput) {
        let st = &mut self.state;
        let long_state = input.traffic.long_state;
        if long_state != st.long_state
            && input.controls.enabled
            && st.brake_dwell < 0
            && st.gas_dwell < 0
        {
            if long_state == LongitudinalState::E2eStop && input.vehicle.v_ego > 5.0 {
                self.events.emit(AlertKind::TrafficStopping);
            } else if long_state == LongitudinalState::E2ePrepare
                && st.soft_hold == SoftHoldLevel::Inactive
            {
                self.events.emit(AlertKind::TrafficSignGreen);
            }
        }
        st.long_state = long_state;

        let light = input.traffic.light;
        if light != st.traffic_light
            && st.soft_hold == SoftHoldLevel::Confirmed
            && light == TrafficLight::Green
        {
            self.events.emit(AlertKind::TrafficSignChanged);
        }
        st.traffic_light = light;
    }
}

#[inline]
const fn press(dwell: i32) -> i32 {
    if dwell < 0 { 1 } else { dwell.saturating_add(1) }
}

#[inline]
const fn release(dwell: i32) -> i32 {
    if dwell > 0 { -1 } else { dwell.saturating_sub(1) }
}

/// Next step up: the road speed when below it, else the next rung of
/// `40, 40 + unit, ...` below the maximum.
fn speed_up(v: f32, road_speed_kph: f32, t: &Tunables) -> f32 {
    let next = if v < road_speed_kph {
        road_speed_kph
    } else {
        let unit = usize::try_from(t.speed_unit_kph).unwrap_or(1).max(1);
        (SPEED_UP_BASE_KPH..V_CRUISE_MAX as i64)
            .step_by(unit)
            .map(|s| s as f32)
            .find(|&s| v < s)
            .unwrap_or(v)
    };
    clip(next, t.speed_min_kph, V_CRUISE_MAX)
}
