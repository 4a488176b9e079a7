use cruise_config::TraceRow;
use cruise_core::runner::{TickRecord, replay};
use cruise_core::{ActivationRequest, AlertKind, CruiseMode, ParamTable};

fn row(tick: u64, v_ego: f32, enabled: bool) -> TraceRow {
    TraceRow {
        tick,
        v_ego,
        v_ego_cluster: v_ego,
        brake: false,
        gas: false,
        cruise_available: true,
        enabled,
        can_enable: true,
        button: String::new(),
        button_pressed: false,
        lead_d_rel: 0.0,
        lead_v_rel: 0.0,
        long_state: 0,
        traffic_light: 0,
        road_limit_speed: 80.0,
        roadcate: 2,
        cam_type: 0,
        x_sign_type: 0,
        x_spd_limit: 0.0,
        x_spd_dist: 0.0,
        cam_limit_speed: 0.0,
        cam_limit_dist: 0.0,
        sign_limit: 0.0,
        sign_dist: 0.0,
        x_dist_to_turn: 0.0,
        x_turn_info: -1,
        cmd_index: 0,
        cmd: String::new(),
        cmd_arg: String::new(),
        yaw_rate: 0.0,
    }
}

fn drive() -> Vec<TraceRow> {
    let mut rows: Vec<TraceRow> = (0..5).map(|t| row(t, 20.0, false)).collect();
    rows.extend((5..10).map(|t| row(t, 20.0, true)));
    rows[8].cmd_index = 1;
    rows[8].cmd = "SPEED".into();
    rows[8].cmd_arg = "80".into();
    rows[9].cmd_index = 2;
    rows[9].cmd = "CRUISE".into();
    rows[9].cmd_arg = "off".into();
    rows
}

#[test]
fn replay_seeds_on_engage_and_counts_requests() {
    let store = ParamTable::with_defaults();
    let mut records: Vec<TickRecord> = Vec::new();
    let stats = replay(&drive(), CruiseMode::Managed, true, &store, |r| {
        records.push(r.clone());
    })
    .unwrap();

    assert_eq!(stats.ticks, 10);
    assert_eq!(records.len(), 10);
    assert!(!records[4].enabled && records[5].enabled);
    // seeded after the engage tick was evaluated
    assert_eq!(records[5].output.v_cruise_set_kph, 30.0);
    assert_eq!(records[6].output.v_cruise_set_kph, 72.0);
    assert_eq!(records[8].output.v_cruise_set_kph, 80.0);

    assert_eq!(records[9].output.request, ActivationRequest::Deactivate);
    assert_eq!(stats.activations, 0);
    assert_eq!(stats.deactivations, 1);
    assert_eq!(stats.alerts.get(&AlertKind::AudioPrompt), Some(&1));
    assert_eq!(stats.final_set_kph, 80.0);
    assert!(stats.min_applied_kph >= 10.0);
    assert!(stats.max_applied_kph <= 145.0);
    assert!(stats.min_applied_kph <= stats.max_applied_kph);
}

#[test]
fn pcm_replay_mirrors_nothing_without_car_speed() {
    let store = ParamTable::with_defaults();
    let stats = replay(&drive(), CruiseMode::Pcm, true, &store, |_| {}).unwrap();
    // trace rows carry no car cruise speed, so every tick clips to the minimum
    assert_eq!(stats.min_applied_kph, 10.0);
    assert_eq!(stats.max_applied_kph, 10.0);
    assert_eq!(stats.activations + stats.deactivations, 0);
}

#[test]
fn bad_row_stops_replay_with_its_tick() {
    let store = ParamTable::with_defaults();
    let mut rows = drive();
    rows[3].yaw_rate = f32::INFINITY;
    let mut seen = 0;
    let err = replay(&rows, CruiseMode::Managed, true, &store, |_| seen += 1).unwrap_err();
    assert_eq!(seen, 3);
    assert_eq!(err.to_string(), "replaying tick 3");
    assert!(
        err.chain().any(|e| e.to_string().contains("yaw_rate is not finite")),
        "{err:?}"
    );
}

#[test]
fn empty_trace_yields_empty_stats() {
    let store = ParamTable::with_defaults();
    let stats = replay(&[], CruiseMode::Managed, true, &store, |_| {}).unwrap();
    assert_eq!(stats.ticks, 0);
    assert!(stats.alerts.is_empty());
}
