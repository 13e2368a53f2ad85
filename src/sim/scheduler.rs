//! Obstacle spawning and lifetime management
//!
//! The scheduler owns every live arc. Each tick it picks the active stage,
//! runs the spawn countdown (gated by the concurrency cap), then advances
//! and reaps arcs.

use std::f32::consts::TAU;

use rand::Rng;

use super::arc::ArcSpan;
use super::difficulty::DifficultyCurve;
use super::obstacle::{Obstacle, PhaseTimings};
use crate::consts::{CAP_RETRY_DELAY, SPAWN_ANGLE_ATTEMPTS};
use crate::delta_angle;
use crate::settings::{Config, Stage};

/// Spawns, advances and removes obstacles
#[derive(Debug, Clone, Default)]
pub struct ObstacleScheduler {
    obstacles: Vec<Obstacle>,
    spawn_timer: f32,
    elapsed: f32,
    stage_index: usize,
    next_id: u32,
    /// Difficulty `t` in [0, 1], set by the session each tick
    pub difficulty_t: f32,
}

impl ObstacleScheduler {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Default::default()
        }
    }

    /// Drop every obstacle and restart the clock
    pub fn reset(&mut self) {
        self.obstacles.clear();
        self.spawn_timer = 0.0;
        self.elapsed = 0.0;
        self.stage_index = 0;
        self.difficulty_t = 0.0;
    }

    /// Read-only view of the live obstacles (Dead ones are already reaped)
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn active_count(&self) -> usize {
        self.obstacles.len()
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn stage_index(&self) -> usize {
        self.stage_index
    }

    pub fn spawn_timer(&self) -> f32 {
        self.spawn_timer
    }

    /// Start a forced fade on every live obstacle. Returns how many faded.
    pub fn force_fade_all(&mut self, duration: f32) -> usize {
        let mut count = 0;
        for obstacle in self.obstacles.iter_mut().filter(|o| o.is_alive()) {
            obstacle.force_fade(duration.max(0.01));
            count += 1;
        }
        count
    }

    /// Index of the last stage whose `start_sec` is at or before `elapsed`.
    ///
    /// Before the first row starts, the first row applies.
    pub fn stage_index_at(stages: &[Stage], elapsed: f32) -> usize {
        stages
            .iter()
            .rposition(|s| elapsed >= s.start_sec)
            .unwrap_or(0)
    }

    /// Advance by `dt` with the player at `player_angle`
    pub fn tick<R: Rng>(&mut self, dt: f32, player_angle: f32, config: &Config, rng: &mut R) {
        if config.stages.is_empty() {
            return;
        }

        self.elapsed += dt;
        let stage_index = Self::stage_index_at(&config.stages, self.elapsed);
        if stage_index != self.stage_index {
            log::info!("Stage {} begins at {:.1}s", stage_index, self.elapsed);
            self.stage_index = stage_index;
        }
        let stage = &config.stages[self.stage_index];
        let curve = DifficultyCurve::new(config);

        self.spawn_timer -= dt;
        if self.spawn_timer <= 0.0 {
            let allowed = curve.max_concurrent(self.difficulty_t);
            if self.obstacles.len() < allowed {
                let interval = random_between(rng, stage.spawn_interval_min, stage.spawn_interval_max)
                    * curve.interval_scale(self.difficulty_t);
                self.spawn_timer = interval.max(CAP_RETRY_DELAY);

                let min_sep = config.min_spawn_sep_from_player_deg.to_radians();
                let center = Self::decide_spawn_angle(player_angle, min_sep, rng);
                self.spawn_one(center, stage, &curve);
            } else {
                self.spawn_timer = CAP_RETRY_DELAY;
            }
        }

        for obstacle in &mut self.obstacles {
            obstacle.tick(dt);
        }
        self.obstacles.retain(Obstacle::is_alive);
    }

    /// Random angle at least `min_sep` from the player, within bounded attempts
    pub fn decide_spawn_angle<R: Rng>(player_angle: f32, min_sep: f32, rng: &mut R) -> f32 {
        for _ in 0..SPAWN_ANGLE_ATTEMPTS {
            let a = rng.random::<f32>() * TAU;
            if delta_angle(a, player_angle).abs() >= min_sep {
                return a;
            }
        }
        rng.random::<f32>() * TAU
    }

    fn spawn_one(&mut self, center: f32, stage: &Stage, curve: &DifficultyCurve) {
        let scale = curve.timing_scale(self.difficulty_t);
        let timings = PhaseTimings {
            telegraph: (stage.telegraph_time_sec * scale.telegraph).max(0.05),
            travel: (stage.travel_time_sec * scale.travel).max(0.03),
            stick: stage.stick_time_sec,
            fade: stage.fade_out_sec,
        };

        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        let obstacle = Obstacle::new(
            id,
            ArcSpan::from_size_deg(center, stage.arc_size_deg),
            timings,
            stage.start_radius_scale,
            stage.telegraph_offset_scale,
        );
        log::debug!(
            "Spawned arc {} at {:.1}° (travel {:.2}s, telegraph {:.2}s, {} live)",
            id,
            center.to_degrees(),
            obstacle.timings.travel,
            obstacle.timings.telegraph,
            self.obstacles.len() + 1
        );
        self.obstacles.push(obstacle);
    }

    /// Insert a prebuilt obstacle (scripted scenarios and tests)
    pub fn push(&mut self, obstacle: Obstacle) {
        self.obstacles.push(obstacle);
    }
}

fn random_between<R: Rng>(rng: &mut R, min: f32, max: f32) -> f32 {
    if max > min {
        rng.random_range(min..max)
    } else {
        min
    }
}
