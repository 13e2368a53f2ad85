//! Flip Orbit - A single-track circular dodging game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (obstacles, collisions, session state)
//! - `settings`: Data-driven game balance loaded from JSON
//! - `highscores`: Best score persistence behind a store trait
//! - `error`: Error types for the I/O boundaries

pub mod error;
pub mod highscores;
pub mod settings;
pub mod sim;

pub use error::{ConfigError, StoreError};
pub use highscores::{BestScoreStore, JsonFileStore, MemoryStore};
pub use settings::{Config, HitMode, Stage};

use std::f32::consts::{PI, TAU};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest frame delta the driver will feed into the accumulator
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Points awarded per graze quantum, and the quantum length in seconds
    pub const GRAZE_POINT_SEC: f32 = 0.1;
    /// Angular margin added around arcs when looking for an orb gap (degrees)
    pub const GAP_INFLATE_DEG: f32 = 5.0;
    /// Spawn attempts before the scheduler accepts any angle
    pub const SPAWN_ANGLE_ATTEMPTS: u32 = 16;
    /// Retry delay when the concurrency cap blocks a spawn (seconds)
    pub const CAP_RETRY_DELAY: f32 = 0.05;
    /// Pending flips the input buffer will hold
    pub const MAX_PENDING_FLIPS: u8 = 2;
    /// Storage key for the persisted best score
    pub const BEST_SCORE_KEY: &str = "FO_BEST_SCORE";
}

/// Wrap an angle into [0, 2π)
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Minimal signed difference `to - from`, in (-π, π]
#[inline]
pub fn delta_angle(to: f32, from: f32) -> f32 {
    let mut d = (to - from).rem_euclid(TAU);
    if d > PI {
        d -= TAU;
    }
    d
}

/// Normalize an interval into [0, 2π).
///
/// Returns `(from, to, wrapped)`; `wrapped` is true when the interval crosses 0
/// and must be treated as `[from, 2π) ∪ [0, to]`.
#[inline]
pub fn normalize_interval(from: f32, to: f32) -> (f32, f32, bool) {
    let f = wrap_angle(from);
    let t = wrap_angle(to);
    (f, t, t < f)
}

/// Linear interpolation
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Cubic smoothstep, `3t² - 2t³` on clamped `t`
#[inline]
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}
