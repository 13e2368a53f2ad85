//! Score-driven difficulty curve
//!
//! Pure functions of the config and the current score. Nothing here keeps
//! state, so the session can recompute everything every tick.

use crate::lerp;
use crate::settings::Config;

/// Derived difficulty parameters, borrowed from a [`Config`]
#[derive(Debug, Clone, Copy)]
pub struct DifficultyCurve<'a> {
    config: &'a Config,
}

/// Scales applied to a stage's base obstacle timings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingScale {
    pub travel: f32,
    pub telegraph: f32,
}

impl<'a> DifficultyCurve<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Score progress toward `score_for_max_speed`, in [0, 1]
    fn progress(&self, score: u64) -> f32 {
        (score as f32 / self.config.score_for_max_speed.max(1.0)).clamp(0.0, 1.0)
    }

    /// Normalized difficulty `t` in [0, 1]
    pub fn difficulty_t(&self, score: u64) -> f32 {
        self.progress(score).powf(self.config.difficulty_gamma)
    }

    /// Player angular speed in degrees per second
    pub fn player_speed_deg(&self, score: u64) -> f32 {
        let t = self.progress(score).powf(self.config.player_speed_gamma);
        lerp(
            self.config.player_min_speed_deg_per_sec,
            self.config.player_max_speed_deg_per_sec,
            t,
        )
        .max(0.0)
    }

    /// Ceiling on simultaneously live obstacles
    pub fn max_concurrent(&self, difficulty_t: f32) -> usize {
        let base = self.config.base_max_concurrent_arcs as f32;
        let max = self.config.max_max_concurrent_arcs as f32;
        let t = difficulty_t.clamp(0.0, 1.0).powf(self.config.arcs_max_gamma);
        let upper = self
            .config
            .base_max_concurrent_arcs
            .max(self.config.max_max_concurrent_arcs)
            .max(1);
        (lerp(base, max, t).round() as u32).clamp(1, upper) as usize
    }

    /// Multiplier on a stage's random spawn interval
    pub fn interval_scale(&self, difficulty_t: f32) -> f32 {
        lerp(1.0, self.config.spawn_interval_min_scale, difficulty_t.clamp(0.0, 1.0))
    }

    /// Travel and telegraph shrink factors
    pub fn timing_scale(&self, difficulty_t: f32) -> TimingScale {
        let t = difficulty_t
            .clamp(0.0, 1.0)
            .powf(self.config.travel_difficulty_gamma);
        TimingScale {
            travel: lerp(1.0, self.config.travel_time_min_scale.clamp(0.1, 1.0), t),
            telegraph: lerp(1.0, self.config.telegraph_time_min_scale.clamp(0.1, 1.0), t),
        }
    }
}
