#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Cruise-speed decision engine.
//!
//! Once per control tick the [`CruiseSpeedArbiter`] turns driver input
//! (buttons, pedals), perception (yaw-rate horizon, lead vehicle), navigation
//! and road-limit data, and polled integer tunables into one applied cruise
//! speed plus an engage/disengage request.
//!
//! ## Architecture
//!
//! - **Tunables**: named integer parameters refreshed on a staggered schedule (`params`)
//! - **Curve**: yaw-rate horizon to curve speed cap (`curve`)
//! - **Navigation limits**: bump/camera/sign/turn caps with a braking profile (`nav_limit`)
//! - **Turn assist**: blinker extension and turn alerts (`turn_assist`)
//! - **Arbiter**: button/pedal/lead state machine combining the caps (`arbiter`)
//! - **Lateral**: delay-compensated curvature for steering, independent of the rest (`lateral`)
//!
//! Nothing in the tick path fails: bad inputs degrade to sentinels
//! (`NO_CURVE_LIMIT`, `NO_NAV_LIMIT`) and every output is clipped.

pub mod arbiter;
pub mod command;
pub mod conversions;
pub mod curve;
pub mod error;
pub mod events;
pub mod filter;
pub mod lateral;
pub mod mocks;
pub mod nav_limit;
pub mod params;
pub mod runner;
pub mod turn_assist;
pub mod types;
pub mod util;

pub use arbiter::{CruiseMode, CruiseSpeedArbiter, CruiseState, V_CRUISE_MAX};
pub use command::{CommandMessage, CruiseArg, LaneSide, NavCommand, SpeedArg};
pub use curve::{CurveSpeedLimiter, NO_CURVE_LIMIT};
pub use error::CruiseError;
pub use events::{AlertKind, EventEmitter};
pub use lateral::{LagCompensatedCurvatureFilter, LateralPlan};
pub use nav_limit::{NO_NAV_LIMIT, NavLimit, NavigationSpeedLimiter};
pub use params::{ParamTable, RefreshGroup, RefreshScheduler, Tunables};
pub use turn_assist::{TurnAssist, TurnAssistSignaler};
pub use types::*;
