//! Test and helper mocks for cruise_core

use std::cell::Cell;

use cruise_traits::ParamSource;

use crate::types::{ButtonEvent, ButtonKind, ControlsState, TickInput, VehicleState};

/// Wraps a store and counts lookups; useful to check the refresh schedule.
#[derive(Debug, Default)]
pub struct CountingParams<P> {
    inner: P,
    reads: Cell<usize>,
}

impl<P> CountingParams<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            reads: Cell::new(0),
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.get()
    }

    pub fn reset(&self) {
        self.reads.set(0);
    }
}

impl<P: ParamSource> ParamSource for CountingParams<P> {
    fn get_int(&self, key: &str) -> Option<i64> {
        self.reads.set(self.reads.get() + 1);
        self.inner.get_int(key)
    }
}

/// Cruise available and engaged at `v_ego` (m/s), nothing else going on.
pub fn cruising(v_ego: f32) -> TickInput {
    TickInput {
        vehicle: VehicleState {
            v_ego,
            v_ego_cluster: v_ego,
            cruise_available: true,
            ..VehicleState::default()
        },
        controls: ControlsState {
            enabled: true,
            ..ControlsState::default()
        },
        ..TickInput::default()
    }
}

/// Cruise available but disengaged at `v_ego` (m/s).
pub fn disengaged(v_ego: f32) -> TickInput {
    let mut input = cruising(v_ego);
    input.controls.enabled = false;
    input
}

pub fn press(kind: ButtonKind) -> ButtonEvent {
    ButtonEvent {
        kind,
        pressed: true,
    }
}

pub fn release(kind: ButtonKind) -> ButtonEvent {
    ButtonEvent {
        kind,
        pressed: false,
    }
}
