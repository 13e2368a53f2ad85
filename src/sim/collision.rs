//! Swept hazard test and graze scoring
//!
//! The tricky part of Flip Orbit: at high speed the player can move further
//! in one frame than an arc is wide, so a single end-of-frame point test
//! tunnels straight through thin arcs. Instead the frame's angular path is
//! sampled at several substeps and every sample is tested against every arc.

use super::obstacle::{Obstacle, Phase};
use crate::consts::GRAZE_POINT_SEC;
use crate::settings::{Config, HitMode};
use crate::{delta_angle, wrap_angle};

/// Speed (°/s) above which the high-speed pad starts growing
const PAD_SPEED_FLOOR_DEG: f32 = 180.0;
/// Speed range (°/s) over which the pad reaches its maximum
const PAD_SPEED_RANGE_DEG: f32 = 180.0;

/// Hit-test settings for the sweep
#[derive(Debug, Clone, Copy)]
pub struct SweepConfig {
    pub base_substeps: u32,
    pub max_substeps: u32,
    pub exact: bool,
    pub hit_pad_deg: f32,
    pub high_speed_extra_pad_deg: f32,
    pub hit_mode: HitMode,
}

impl From<&Config> for SweepConfig {
    fn from(config: &Config) -> Self {
        Self {
            base_substeps: config.collision_substeps,
            max_substeps: config.max_substeps,
            exact: config.use_exact_arc_hit,
            hit_pad_deg: config.hit_pad_deg,
            high_speed_extra_pad_deg: config.high_speed_extra_pad_deg,
            hit_mode: config.arc_hit_mode,
        }
    }
}

/// Result of a sweep
#[derive(Debug, Clone, PartialEq)]
pub struct SweepResult {
    /// Whether a hazard was crossed
    pub hit: bool,
    /// Obstacle that registered the hit
    pub obstacle_id: Option<u32>,
    /// Sample angle at which it registered
    pub angle: f32,
    /// Number of samples taken
    pub substeps: u32,
}

impl SweepResult {
    pub fn miss(substeps: u32) -> Self {
        Self {
            hit: false,
            obstacle_id: None,
            angle: 0.0,
            substeps,
        }
    }
}

/// Substep count for a frame that covered `traversed_deg`
pub fn substep_count(traversed_deg: f32, base: u32, max: u32) -> u32 {
    let max = max.max(1);
    let base = base.clamp(1, max);
    let bump = if traversed_deg > 90.0 {
        2
    } else if traversed_deg > 45.0 {
        1
    } else {
        0
    };
    (base + bump).min(max)
}

/// Angular pad (radians) used when exact hit testing is off
pub fn padded_hit_pad(config: &SweepConfig, speed_deg_per_sec: f32) -> f32 {
    let speed01 = ((speed_deg_per_sec - PAD_SPEED_FLOOR_DEG) / PAD_SPEED_RANGE_DEG).clamp(0.0, 1.0);
    (config.hit_pad_deg + config.high_speed_extra_pad_deg * speed01).to_radians()
}

/// Sweep the player's path from `prev` to `curr` over one frame of `dt`
pub fn sweep(prev: f32, curr: f32, dt: f32, obstacles: &[Obstacle], config: &SweepConfig) -> SweepResult {
    let delta = delta_angle(curr, prev);
    let traversed_deg = delta.abs().to_degrees();
    let steps = substep_count(traversed_deg, config.base_substeps, config.max_substeps);

    let pad = if config.exact {
        None
    } else {
        let speed = if dt > 1e-6 { traversed_deg / dt } else { 0.0 };
        Some(padded_hit_pad(config, speed))
    };

    sweep_with_steps(prev, delta, steps, obstacles, config.hit_mode, pad)
}

/// Sample `steps` points at fractions `i/steps` of `delta` from `prev`.
///
/// `pad` of `None` means exact hit testing.
pub fn sweep_with_steps(
    prev: f32,
    delta: f32,
    steps: u32,
    obstacles: &[Obstacle],
    mode: HitMode,
    pad: Option<f32>,
) -> SweepResult {
    let steps = steps.max(1);

    for i in 1..=steps {
        let t = i as f32 / steps as f32;
        let a = wrap_angle(prev + delta * t);

        for obstacle in obstacles {
            let hit = match pad {
                None => obstacle.hits_exact(a, mode),
                Some(pad) => obstacle.hits_padded(a, pad, mode),
            };
            if hit {
                log::trace!(
                    "sweep hit: arc {} at {:.1}° (sample {}/{}, phase {:?})",
                    obstacle.id,
                    a.to_degrees(),
                    i,
                    steps,
                    obstacle.phase
                );
                return SweepResult {
                    hit: true,
                    obstacle_id: Some(obstacle.id),
                    angle: a,
                    substeps: steps,
                };
            }
        }
    }

    SweepResult::miss(steps)
}

/// Smallest edge distance (degrees) from `angle` to any Stick-phase arc
pub fn min_stick_edge_distance_deg(angle: f32, obstacles: &[Obstacle]) -> Option<f32> {
    obstacles
        .iter()
        .filter(|o| o.phase == Phase::Stick)
        .map(|o| o.edge_distance_deg(angle))
        .min_by(|a, b| a.total_cmp(b))
}

/// Accumulates near-miss time and pays out points per quantum
#[derive(Debug, Clone, Default)]
pub struct GrazeTracker {
    pub accum: f32,
}

impl GrazeTracker {
    pub fn reset(&mut self) {
        self.accum = 0.0;
    }

    /// Advance by `dt` and return the points earned this tick
    pub fn update(&mut self, dt: f32, player_angle: f32, obstacles: &[Obstacle], threshold_deg: f32) -> u64 {
        let grazing = min_stick_edge_distance_deg(player_angle, obstacles)
            .is_some_and(|d| d > 0.0 && d < threshold_deg);

        if !grazing {
            self.accum = (self.accum - dt * 0.5).max(0.0);
            return 0;
        }

        self.accum += dt;
        let mut points = 0;
        while self.accum >= GRAZE_POINT_SEC {
            self.accum -= GRAZE_POINT_SEC;
            points += 1;
        }
        points
    }
}
