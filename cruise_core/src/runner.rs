use std::collections::BTreeMap;

use cruise_traits::ParamSource;
use eyre::WrapErr;

use crate::arbiter::{CruiseMode, CruiseSpeedArbiter};
use crate::conversions::tick_input_from_trace;
use crate::error::Result;
use crate::events::AlertKind;
use crate::types::{ActivationRequest, CruiseOutput};

/// Output of one replayed tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickRecord {
    pub tick: u64,
    pub enabled: bool,
    pub output: CruiseOutput,
}

/// Aggregate over a whole replay.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReplayStats {
    pub ticks: u64,
    pub activations: u64,
    pub deactivations: u64,
    pub alerts: BTreeMap<AlertKind, u64>,
    pub min_applied_kph: f32,
    pub max_applied_kph: f32,
    pub final_set_kph: f32,
}

impl ReplayStats {
    fn record(&mut self, out: &CruiseOutput) {
        if self.ticks == 0 {
            self.min_applied_kph = out.v_cruise_kph;
            self.max_applied_kph = out.v_cruise_kph;
        } else {
            self.min_applied_kph = self.min_applied_kph.min(out.v_cruise_kph);
            self.max_applied_kph = self.max_applied_kph.max(out.v_cruise_kph);
        }
        self.ticks += 1;
        match out.request {
            ActivationRequest::Activate => self.activations += 1,
            ActivationRequest::Deactivate => self.deactivations += 1,
            ActivationRequest::None => {}
        }
        for a in &out.alerts {
            *self.alerts.entry(*a).or_insert(0) += 1;
        }
        self.final_set_kph = out.v_cruise_set_kph;
    }
}

/// Drive a fresh arbiter through recorded trace rows, calling `on_tick` with
/// every tick's output.
///
/// The set-speed is seeded on each rising edge of the recorded `enabled`
/// flag, the way the engagement logic would. A row that cannot be converted
/// stops the replay with an error naming its tick.
pub fn replay<P, F>(
    rows: &[cruise_config::TraceRow],
    mode: CruiseMode,
    is_metric: bool,
    store: &P,
    mut on_tick: F,
) -> Result<ReplayStats>
where
    P: ParamSource + ?Sized,
    F: FnMut(&TickRecord),
{
    let mut arbiter = CruiseSpeedArbiter::new(mode, store);
    let mut stats = ReplayStats::default();
    let mut was_enabled = false;

    for row in rows {
        let input = tick_input_from_trace(row, is_metric)
            .wrap_err_with(|| format!("replaying tick {}", row.tick))?;
        let output = arbiter.update(&input, store);
        let enabled = input.controls.enabled;
        if enabled && !was_enabled {
            arbiter.initialize(&input.vehicle, false);
        }
        was_enabled = enabled;

        stats.record(&output);
        on_tick(&TickRecord {
            tick: row.tick,
            enabled,
            output,
        });
    }

    tracing::info!(
        ticks = stats.ticks,
        activations = stats.activations,
        deactivations = stats.deactivations,
        "replay finished"
    );
    Ok(stats)
}
