use cruise_core::curve::{CURVE_BP, YAW_HORIZON_LEN, curve_speed_for};
use cruise_core::nav_limit::decelerate_for_speed_camera;
use cruise_core::{
    ButtonEvent, ButtonKind, CommandMessage, CruiseArg, CruiseMode, CruiseSpeedArbiter,
    LimitKind, NO_NAV_LIMIT, NavCommand, NavigationSpeedLimiter, ParamTable, RoadLimitMessage,
    SpeedArg, TickInput, TurnAssist, Tunables, V_CRUISE_MAX, VehicleState,
};
use proptest::prelude::*;

fn button() -> impl Strategy<Value = Option<ButtonEvent>> {
    prop_oneof![
        4 => Just(None),
        1 => (
            prop_oneof![
                Just(ButtonKind::Accel),
                Just(ButtonKind::Decel),
                Just(ButtonKind::GapAdjust),
                Just(ButtonKind::Cancel),
                Just(ButtonKind::Resume),
            ],
            any::<bool>()
        )
            .prop_map(|(kind, pressed)| Some(ButtonEvent { kind, pressed })),
    ]
}

fn command() -> impl Strategy<Value = NavCommand> {
    prop_oneof![
        Just(NavCommand::Speed(SpeedArg::Up)),
        Just(NavCommand::Speed(SpeedArg::Down)),
        (-50i32..400).prop_map(|v| NavCommand::Speed(SpeedArg::Set(v))),
        Just(NavCommand::Cruise(CruiseArg::On)),
        Just(NavCommand::Cruise(CruiseArg::Off)),
        Just(NavCommand::Cruise(CruiseArg::Go)),
        Just(NavCommand::Cruise(CruiseArg::Stop)),
        Just(NavCommand::Unknown),
    ]
}

prop_compose! {
    fn tick_input()(
        v_ego in 0.0f32..45.0,
        brake in prop::bool::weighted(0.1),
        gas in prop::bool::weighted(0.1),
        available in prop::bool::weighted(0.95),
        enabled in any::<bool>(),
        button in button(),
        cmd in prop::option::weighted(0.1, (1i64..6, command())),
        lead in prop::option::of((0.0f32..120.0, -10.0f32..10.0)),
        road_limit in 0.0f32..200.0,
        x_spd in prop::option::weighted(0.2, (10.0f32..120.0, 1.0f32..4000.0)),
        cam_type in prop_oneof![Just(0), Just(4), Just(22)],
        yaw in -0.5f32..0.5,
    ) -> TickInput {
        let mut input = TickInput::default();
        input.vehicle = VehicleState {
            v_ego,
            v_ego_cluster: v_ego,
            brake_pressed: brake,
            gas_pressed: gas,
            cruise_available: available,
            button_events: button.into_iter().collect(),
            ..VehicleState::default()
        };
        input.controls.enabled = enabled;
        input.yaw_rates = vec![yaw; YAW_HORIZON_LEN];
        input.lead = lead.map(|(d_rel, v_rel)| cruise_core::LeadVehicle { d_rel, v_rel });
        let (x_spd_limit, x_spd_dist) = x_spd.unwrap_or_default();
        input.road = RoadLimitMessage {
            road_limit_speed: road_limit,
            cam_type,
            x_spd_limit,
            x_spd_dist,
            command: cmd.map(|(index, command)| CommandMessage { index, command }),
            ..RoadLimitMessage::default()
        };
        input
    }
}

proptest! {
    #[test]
    fn cruise_speeds_stay_within_bounds(
        ticks in prop::collection::vec(tick_input(), 1..300),
        speed_min in 5i64..50,
        button_mode in 0i64..5,
        auto_cruise in 0i64..4,
    ) {
        let mut store = ParamTable::with_defaults();
        store
            .set("CruiseSpeedMin", speed_min)
            .set("CruiseButtonMode", button_mode)
            .set("AutoCruiseControl", auto_cruise)
            .set("AutoTurnControl", 2);
        let mut arbiter = CruiseSpeedArbiter::new(CruiseMode::Managed, &store);
        let min = speed_min as f32;
        for input in &ticks {
            let out = arbiter.update(input, &store);
            prop_assert!(out.v_cruise_kph >= min && out.v_cruise_kph <= V_CRUISE_MAX, "applied {}", out.v_cruise_kph);
            prop_assert!(out.v_cruise_set_kph <= V_CRUISE_MAX, "set {}", out.v_cruise_set_kph);
            prop_assert!(out.v_cruise_kph.is_finite());
            prop_assert_eq!(out.v_cruise_cluster_kph, out.v_cruise_kph);
            prop_assert!(out.curve_speed_kph >= 0.0, "curve {}", out.curve_speed_kph);
        }
    }

    #[test]
    fn curve_table_is_non_increasing(a in 0.0f32..0.1, b in 0.0f32..0.1) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(curve_speed_for(lo) >= curve_speed_for(hi));
    }

    #[test]
    fn profile_is_exact_inside_zone_and_bounded_outside(
        safe in 1.0f32..40.0,
        safe_dist in 1.0f32..100.0,
        prev in 0.0f32..50.0,
        decel in 0.1f32..2.0,
        left in 0.0f32..5000.0,
    ) {
        let v = decelerate_for_speed_camera(safe, safe_dist, prev, decel, left);
        if left <= safe_dist {
            prop_assert_eq!(v, safe);
        } else {
            prop_assert!(v >= safe - 1e-4);
            prop_assert!(v <= 250.0);
            prop_assert!(v >= prev - 2.4 * decel * 0.01 - 1e-4);
        }
    }

    #[test]
    fn no_source_never_limits(v in 0.0f32..60.0, road_limit in 0.0f32..300.0, prev in 0.0f32..150.0) {
        let vehicle = VehicleState { v_ego: v, v_ego_cluster: v, ..VehicleState::default() };
        let road = RoadLimitMessage { road_limit_speed: road_limit, ..RoadLimitMessage::default() };
        let out = NavigationSpeedLimiter::new().limit(
            &vehicle,
            &road,
            &TurnAssist::default(),
            prev,
            &Tunables::default(),
        );
        prop_assert_eq!(out.speed_kph, NO_NAV_LIMIT);
        prop_assert_eq!(out.source.kind, LimitKind::None);
        prop_assert!(!out.speed_down);
        prop_assert!((30.0..=150.0).contains(&out.road_speed_kph));
    }
}

#[test]
fn curve_breakpoints_hit_table() {
    assert_eq!(curve_speed_for(CURVE_BP[5]), 90.0);
}
