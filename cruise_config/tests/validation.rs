use cruise_config::load_toml;
use rstest::rstest;

#[test]
fn accepts_full_config() {
    let toml = r#"
[vehicle]
pcm_cruise = false
is_metric = true

[navi]
bump_speed = 30
bump_time = 2
ctrl_end = 6
safety_factor = 100
decel_rate = 80
ctrl = 2

[cruise]
auto_resume_from_gas_speed = 5
auto_cancel_from_gas_mode = 2
auto_cruise_control = 1
button_mode = 3
on_dist_cm = -250
soft_hold_mode = 1
speed_min = 10

[curve]
ctrl_use = 1
factor = 120
factor_in = 10

[logging]
level = "debug"
rotation = "daily"
"#;

    let cfg = load_toml(toml).expect("parse TOML");
    cfg.validate().expect("valid config should pass");
    assert_eq!(cfg.cruise.on_dist_cm, -250);
    assert_eq!(cfg.cruise.speed_unit, 10, "unset keys keep their defaults");
    assert_eq!(cfg.turn.auto_turn_control, 0);
}

#[rstest]
#[case("[navi]\nsafety_factor = 79\n", "navi.safety_factor")]
#[case("[navi]\ndecel_rate = 201\n", "navi.decel_rate")]
#[case("[cruise]\nbutton_mode = 5\n", "cruise.button_mode")]
#[case("[cruise]\nspeed_min = 4\n", "cruise.speed_min")]
#[case("[cruise]\non_dist_cm = 501\n", "cruise.on_dist_cm")]
#[case("[curve]\nfactor = 40\n", "curve.factor")]
#[case("[turn]\nauto_turn_control = 9\n", "turn.auto_turn_control")]
#[case("[lateral]\nsteer_actuator_delay = -1\n", "lateral.steer_actuator_delay")]
fn rejects_out_of_range(#[case] toml: &str, #[case] field: &str) {
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should reject");
    assert!(format!("{err}").contains(field), "got: {err}");
}

#[test]
fn rejects_wrong_types_at_parse_time() {
    assert!(load_toml("[cruise]\nspeed_min = \"fast\"\n").is_err());
}
