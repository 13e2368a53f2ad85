//! Session state and the small entities it owns
//!
//! Player, pickup orb and the flip input buffer are plain data with their own
//! `tick`; the session decides when each one advances.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::MAX_PENDING_FLIPS;
use crate::{polar_to_cartesian, wrap_angle};

/// Top-level session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the first start input
    Title,
    /// 3, 2, 1 before play begins
    Countdown,
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Run ended on a hazard hit
    GameOver,
}

/// The orbiting player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Current angle (radians, [0, 2π))
    pub angle: f32,
    /// Travel direction, +1 or -1
    pub dir: i8,
    /// Angular speed (degrees per second)
    pub angular_speed_deg: f32,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            angle: 0.0,
            dir: 1,
            angular_speed_deg: 90.0,
        }
    }
}

impl Player {
    /// Put the player back at `start_angle`, moving forward
    pub fn reset(&mut self, start_angle: f32) {
        self.angle = wrap_angle(start_angle);
        self.dir = 1;
    }

    pub fn set_angular_speed(&mut self, deg_per_sec: f32) {
        self.angular_speed_deg = if deg_per_sec.is_finite() { deg_per_sec.max(0.0) } else { 0.0 };
    }

    /// Reverse direction
    pub fn flip(&mut self) {
        self.dir = -self.dir;
    }

    /// Advance along the track by `dir * speed * dt`
    pub fn tick(&mut self, dt: f32) {
        let delta_deg = self.dir as f32 * self.angular_speed_deg * dt;
        self.angle = wrap_angle(self.angle + delta_deg.to_radians());
    }

    /// Position on a track of `radius` centered at `origin`
    pub fn world_pos(&self, origin: Vec2, radius: f32) -> Vec2 {
        origin + polar_to_cartesian(radius, self.angle)
    }
}

/// The single pickup orb
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub angle: f32,
    pub alive: bool,
    pub timer: f32,
    pub lifetime: f32,
    /// Expiry edge not yet read by the session
    timed_out_pending: bool,
}

impl Pickup {
    pub fn new(lifetime: f32) -> Self {
        Self {
            angle: 0.0,
            alive: false,
            timer: 0.0,
            lifetime: if lifetime.is_finite() { lifetime.max(0.01) } else { 0.01 },
            timed_out_pending: false,
        }
    }

    pub fn spawn_at(&mut self, angle: f32) {
        self.angle = wrap_angle(angle);
        self.timer = 0.0;
        self.alive = true;
        self.timed_out_pending = false;
    }

    /// Remove after being collected (no expiry edge)
    pub fn kill(&mut self) {
        self.alive = false;
        self.timed_out_pending = false;
    }

    pub fn reset(&mut self) {
        self.alive = false;
        self.timed_out_pending = false;
        self.timer = 0.0;
    }

    pub fn tick(&mut self, dt: f32) {
        if !self.alive {
            return;
        }
        self.timer += dt.max(0.0);
        if self.timer >= self.lifetime {
            self.alive = false;
            self.timed_out_pending = true;
        }
    }

    /// True exactly once after each expiry
    pub fn consume_just_timed_out(&mut self) -> bool {
        std::mem::take(&mut self.timed_out_pending)
    }

    /// Fraction of lifetime remaining, for renderers
    pub fn remaining_fraction(&self) -> f32 {
        if !self.alive {
            return 0.0;
        }
        1.0 - (self.timer / self.lifetime).clamp(0.0, 1.0)
    }
}

/// Short buffer so flips pressed between ticks are not lost
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlipBuffer {
    pub pending: u8,
    pub timer: f32,
}

impl FlipBuffer {
    /// Record a flip request and re-arm the window
    pub fn queue(&mut self, window: f32) {
        self.pending = (self.pending + 1).min(MAX_PENDING_FLIPS);
        self.timer = window;
    }

    /// Run down the window; dropping pending flips once it lapses.
    /// Returns true if one flip should be applied this tick.
    pub fn drain(&mut self, dt: f32) -> bool {
        if self.timer > 0.0 {
            self.timer -= dt;
            if self.timer < 0.0 {
                self.timer = 0.0;
                self.pending = 0;
            }
        }
        if self.pending > 0 {
            self.pending -= 1;
            return true;
        }
        false
    }

    pub fn clear(&mut self) {
        self.pending = 0;
        self.timer = 0.0;
    }
}

/// Events for external collaborators (renderer, audio, leaderboard, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    StateChanged { from: GamePhase, to: GamePhase },
    CountdownTick { display: u32 },
    ScoreChanged { score: u64 },
    HazardHit { score: u64, best: u64, new_best: bool },
    PickupSpawned { angle: f32 },
    PickupCollected { score: u64, multiplier: f32 },
    PickupExpired,
    ArcsFaded { count: usize },
    DifficultyChanged { speed_deg_per_sec: f32 },
    Flipped { dir: i8 },
    RetryStarted { retry_count: u32 },
}
