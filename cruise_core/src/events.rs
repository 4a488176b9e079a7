//! Rate-limited alert emission shared by the arbiter and the turn signaler.

use std::fmt;

/// Alerts the rendering layer knows how to present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AlertKind {
    TrafficStopping,
    TrafficSignGreen,
    TrafficSignChanged,
    SpeedDown,
    AudioPrompt,
    AudioLaneChange,
    AudioTurn,
    StopStop,
}

impl AlertKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TrafficStopping => "trafficStopping",
            Self::TrafficSignGreen => "trafficSignGreen",
            Self::TrafficSignChanged => "trafficSignChanged",
            Self::SpeedDown => "speedDown",
            Self::AudioPrompt => "audioPrompt",
            Self::AudioLaneChange => "audioLaneChange",
            Self::AudioTurn => "audioTurn",
            Self::StopStop => "stopStop",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Re-fire interval used when the caller does not pass one, in ticks.
pub const DEFAULT_ALERT_INTERVAL: u32 = 20;

/// Throttled alert queue.
///
/// A throttled emission is accepted only when more ticks have passed since the
/// previous accepted one than the interval that emission asked for; the
/// throttle is shared by all kinds. `fire` bypasses it for alerts that answer
/// an explicit driver action.
#[derive(Debug, Clone, Default)]
pub struct EventEmitter {
    frame: u64,
    last_frame: u64,
    wait: u32,
    last: Option<AlertKind>,
    pending: Vec<AlertKind>,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the tick counter. Call once at the start of every tick.
    #[inline]
    pub fn advance(&mut self) {
        self.frame += 1;
    }

    /// Emit with the default interval.
    pub fn emit(&mut self, kind: AlertKind) -> bool {
        self.emit_with(kind, DEFAULT_ALERT_INTERVAL)
    }

    /// Emit and, if accepted, hold off further throttled alerts for `interval` ticks.
    pub fn emit_with(&mut self, kind: AlertKind, interval: u32) -> bool {
        let elapsed = self.frame.saturating_sub(self.last_frame);
        if elapsed <= u64::from(self.wait) {
            tracing::trace!(alert = %kind, elapsed, wait = self.wait, "alert throttled");
            return false;
        }
        self.last_frame = self.frame;
        self.wait = interval;
        self.last = Some(kind);
        self.pending.push(kind);
        tracing::debug!(alert = %kind, "alert");
        true
    }

    /// Unthrottled emission; does not reset the throttle window.
    pub fn fire(&mut self, kind: AlertKind) {
        tracing::debug!(alert = %kind, "alert (unthrottled)");
        self.pending.push(kind);
    }

    /// Last accepted throttled alert.
    pub fn last(&self) -> Option<AlertKind> {
        self.last
    }

    /// Take the alerts queued during this tick.
    pub fn drain(&mut self) -> Vec<AlertKind> {
        std::mem::take(&mut self.pending)
    }
}
