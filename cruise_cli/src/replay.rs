//! `replay` and `show-params` command bodies.

use std::path::Path;

use cruise_core::error::Result;
use cruise_core::params::{PARAM_SPECS, resolve};
use cruise_core::runner::{ReplayStats, TickRecord};
use cruise_core::{CruiseMode, ParamTable};
use eyre::WrapErr;
use serde_json::json;

fn tick_json(rec: &TickRecord) -> serde_json::Value {
    let out = &rec.output;
    json!({
        "tick": rec.tick,
        "enabled": rec.enabled,
        "v_cruise_kph": out.v_cruise_kph,
        "v_cruise_set_kph": out.v_cruise_set_kph,
        "request": out.request.as_i8(),
        "soft_hold": out.soft_hold.as_u8(),
        "curve_kph": out.curve_speed_kph,
        "nav_limit_kph": out.nav_limit_kph,
        "limit_kind": out.limit_source.kind.as_str(),
        "blinker": [out.blinker.left, out.blinker.right],
        "alerts": out.alerts.iter().map(|a| a.as_str()).collect::<Vec<_>>(),
        "debug": out.debug_text,
    })
}

fn tick_text(rec: &TickRecord) -> String {
    let out = &rec.output;
    let alerts: Vec<&str> = out.alerts.iter().map(|a| a.as_str()).collect();
    format!(
        "tick={} en={} set={:.1} applied={:.1} req={} hold={} curve={:.1} nav={:.1}({}) alerts=[{}] {}",
        rec.tick,
        u8::from(rec.enabled),
        out.v_cruise_set_kph,
        out.v_cruise_kph,
        out.request.as_i8(),
        out.soft_hold.as_u8(),
        out.curve_speed_kph,
        out.nav_limit_kph,
        out.limit_source.kind.as_str(),
        alerts.join(","),
        out.debug_text,
    )
}

pub fn summary_json(stats: &ReplayStats) -> serde_json::Value {
    let alerts: serde_json::Map<String, serde_json::Value> = stats
        .alerts
        .iter()
        .map(|(k, n)| (k.as_str().to_string(), json!(n)))
        .collect();
    json!({
        "ticks": stats.ticks,
        "activations": stats.activations,
        "deactivations": stats.deactivations,
        "min_applied_kph": stats.min_applied_kph,
        "max_applied_kph": stats.max_applied_kph,
        "final_set_kph": stats.final_set_kph,
        "alerts": alerts,
    })
}

fn print_summary(stats: &ReplayStats, json_mode: bool) {
    if json_mode {
        println!("{}", summary_json(stats));
        return;
    }
    println!("Replayed {} ticks", stats.ticks);
    println!(
        "Applied speed min/max (km/h): {:.1} / {:.1}",
        stats.min_applied_kph, stats.max_applied_kph
    );
    println!("Final set speed (km/h): {:.1}", stats.final_set_kph);
    println!(
        "Requests: {} activate, {} deactivate",
        stats.activations, stats.deactivations
    );
    for (kind, n) in &stats.alerts {
        println!("Alert {kind}: {n}");
    }
}

/// Store built from the config, with `--param` overrides applied on top.
pub fn build_store(cfg: &cruise_config::Config, overrides: &[(String, i64)]) -> ParamTable {
    let mut store = ParamTable::from(cfg);
    for (key, value) in overrides {
        if !PARAM_SPECS.iter().any(|s| s.key == key.as_str()) {
            tracing::warn!(key = %key, "override for unknown store key");
        }
        store.set(key, *value);
    }
    store
}

pub fn run_replay(
    cfg: &cruise_config::Config,
    trace: &Path,
    every: u64,
    overrides: &[(String, i64)],
    json_mode: bool,
) -> Result<ReplayStats> {
    let rows = cruise_config::load_trace_csv(trace)
        .wrap_err_with(|| format!("loading trace {}", trace.display()))?;
    let store = build_store(cfg, overrides);
    let mode = CruiseMode::from(&cfg.vehicle);
    tracing::info!(rows = rows.len(), ?mode, "replay start");

    let stats = cruise_core::runner::replay(&rows, mode, cfg.vehicle.is_metric, &store, |rec| {
        if every > 0 && rec.tick % every == 0 {
            if json_mode {
                println!("{}", tick_json(rec));
            } else {
                println!("{}", tick_text(rec));
            }
        }
    })?;
    print_summary(&stats, json_mode);
    Ok(stats)
}

pub fn show_params(cfg: &cruise_config::Config, json_mode: bool) {
    let store = ParamTable::from(cfg);
    if json_mode {
        let map: serde_json::Map<String, serde_json::Value> = PARAM_SPECS
            .iter()
            .map(|s| (s.key.to_string(), json!(resolve(&store, s))))
            .collect();
        println!("{}", serde_json::Value::Object(map));
        return;
    }
    for s in &PARAM_SPECS {
        println!(
            "{:<40} {:>6}  [{}..={}] {}",
            s.key,
            resolve(&store, s),
            s.min,
            s.max,
            s.group.name()
        );
    }
}
