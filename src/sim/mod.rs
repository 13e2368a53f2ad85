//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (obstacles in spawn order)
//! - No rendering or platform dependencies

pub mod arc;
pub mod collision;
pub mod difficulty;
pub mod gap;
pub mod obstacle;
pub mod scheduler;
pub mod state;
pub mod tick;

pub use arc::ArcSpan;
pub use collision::{GrazeTracker, SweepConfig, SweepResult, sweep};
pub use difficulty::{DifficultyCurve, TimingScale};
pub use gap::{orb_target_angle, widest_gap};
pub use obstacle::{Obstacle, Phase, PhaseTimings};
pub use scheduler::ObstacleScheduler;
pub use state::{FlipBuffer, GameEvent, GamePhase, Pickup, Player};
pub use tick::{ObstacleView, Session, SessionSnapshot, TickInput};
