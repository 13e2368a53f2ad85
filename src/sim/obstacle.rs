//! Danger arc lifecycle
//!
//! Each obstacle walks a fixed phase sequence driven by its own timer:
//!
//! ```text
//! Telegraph -> Travelling -> Stick -> Fading -> Dead
//! ```
//!
//! The only way to skip ahead is [`Obstacle::force_fade`], which jumps any
//! live phase straight to Fading without moving the arc visually.

use serde::{Deserialize, Serialize};

use super::arc::ArcSpan;
use crate::settings::HitMode;
use crate::{lerp, smoothstep};

/// Obstacle lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Warning ring outside the track, not yet physically present
    Telegraph,
    /// Closing in from the spawn radius toward the track
    Travelling,
    /// Sitting on the track
    Stick,
    /// Disappearing
    Fading,
    /// Terminal; eligible for removal
    Dead,
}

impl Phase {
    /// Transition table: the phase entered when this one's timer runs out
    pub const fn next(self) -> Phase {
        match self {
            Phase::Telegraph => Phase::Travelling,
            Phase::Travelling => Phase::Stick,
            Phase::Stick => Phase::Fading,
            Phase::Fading => Phase::Dead,
            Phase::Dead => Phase::Dead,
        }
    }

    /// Whether this phase counts as a hazard under `mode`
    pub const fn is_dangerous(self, mode: HitMode) -> bool {
        match (mode, self) {
            (_, Phase::Dead) => false,
            (HitMode::StickOnly, p) => matches!(p, Phase::Stick),
            (HitMode::TravelAndStick, p) => matches!(p, Phase::Travelling | Phase::Stick),
            (HitMode::TelegraphTravelStick, p) => {
                matches!(p, Phase::Telegraph | Phase::Travelling | Phase::Stick)
            }
            (HitMode::AllPhasesIncludingFade, _) => true,
        }
    }
}

/// Per-phase durations in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseTimings {
    pub telegraph: f32,
    pub travel: f32,
    pub stick: f32,
    pub fade: f32,
}

impl PhaseTimings {
    /// Clamp into durations the state machine can always get through
    pub fn sanitized(self) -> Self {
        fn at_least(v: f32, min: f32) -> f32 {
            if v.is_finite() { v.max(min) } else { min }
        }
        Self {
            telegraph: at_least(self.telegraph, 0.05),
            travel: at_least(self.travel, 0.01),
            stick: at_least(self.stick, 0.0),
            fade: at_least(self.fade, 0.01),
        }
    }
}

/// A single danger arc
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub arc: ArcSpan,
    pub timings: PhaseTimings,
    /// Spawn radius, as a multiple of the track radius
    pub start_radius_scale: f32,
    /// Telegraph ring radius, as a multiple of the track radius
    pub telegraph_offset_scale: f32,
    pub phase: Phase,
    pub timer: f32,
    /// Radius captured by a forced fade (multiple of track radius)
    pub forced_fade_scale: Option<f32>,
}

impl Obstacle {
    pub fn new(
        id: u32,
        arc: ArcSpan,
        timings: PhaseTimings,
        start_radius_scale: f32,
        telegraph_offset_scale: f32,
    ) -> Self {
        Self {
            id,
            arc,
            timings: timings.sanitized(),
            start_radius_scale: if start_radius_scale.is_finite() {
                start_radius_scale.max(1.25)
            } else {
                1.25
            },
            telegraph_offset_scale: if telegraph_offset_scale.is_finite() {
                telegraph_offset_scale.max(1.10)
            } else {
                1.10
            },
            phase: Phase::Telegraph,
            timer: 0.0,
            forced_fade_scale: None,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.phase != Phase::Dead
    }

    #[inline]
    pub fn is_stick(&self) -> bool {
        self.phase == Phase::Stick
    }

    #[inline]
    pub fn is_dangerous(&self, mode: HitMode) -> bool {
        self.phase.is_dangerous(mode)
    }

    /// How long `phase` lasts for this obstacle
    pub fn duration(&self, phase: Phase) -> f32 {
        match phase {
            Phase::Telegraph => self.timings.telegraph,
            Phase::Travelling => self.timings.travel,
            Phase::Stick => self.timings.stick,
            Phase::Fading => self.timings.fade,
            Phase::Dead => f32::INFINITY,
        }
    }

    /// Advance the phase timer; at most one transition per call
    pub fn tick(&mut self, dt: f32) {
        if self.phase == Phase::Dead {
            return;
        }
        self.timer += dt.max(0.0);

        if self.timer >= self.duration(self.phase) {
            let next = self.phase.next();
            // Fading keeps its captured radius until it dies
            if next != Phase::Dead {
                self.forced_fade_scale = None;
            }
            self.phase = next;
            self.timer = 0.0;
        }
    }

    /// Jump straight to Fading over `duration`, keeping the current radius
    pub fn force_fade(&mut self, duration: f32) {
        if self.phase == Phase::Dead {
            return;
        }
        self.forced_fade_scale = Some(self.radius_scale());
        self.phase = Phase::Fading;
        self.timings.fade = if duration.is_finite() { duration.max(0.01) } else { 0.01 };
        self.timer = 0.0;
    }

    /// Current radius as a multiple of the track radius
    pub fn radius_scale(&self) -> f32 {
        match self.phase {
            Phase::Telegraph => self.telegraph_offset_scale,
            Phase::Travelling => {
                let t = (self.timer / self.timings.travel).clamp(0.0, 1.0);
                lerp(self.start_radius_scale, 1.0, smoothstep(t))
            }
            Phase::Fading => self.forced_fade_scale.unwrap_or(1.0),
            Phase::Stick | Phase::Dead => 1.0,
        }
    }

    /// Current radius for a track of radius `track_radius`
    #[inline]
    pub fn radius(&self, track_radius: f32) -> f32 {
        track_radius * self.radius_scale()
    }

    /// Opacity hint for renderers
    pub fn alpha(&self) -> f32 {
        match self.phase {
            Phase::Telegraph => {
                (self.timer * std::f32::consts::PI * 5.0).sin().abs() * 0.55 + 0.25
            }
            Phase::Travelling => 0.85,
            Phase::Stick => 1.0,
            Phase::Fading => 1.0 - (self.timer / self.timings.fade).clamp(0.0, 1.0),
            Phase::Dead => 0.0,
        }
    }

    /// Exact hit test, gated by the hit mode
    pub fn hits_exact(&self, theta: f32, mode: HitMode) -> bool {
        self.is_dangerous(mode) && self.arc.contains_angle(theta)
    }

    /// Padded hit test, gated by the hit mode
    pub fn hits_padded(&self, theta: f32, pad: f32, mode: HitMode) -> bool {
        self.is_dangerous(mode) && self.arc.contains_angle_padded(theta, pad)
    }

    /// Distance from `theta` to the nearest arc edge (degrees, 0 inside)
    #[inline]
    pub fn edge_distance_deg(&self, theta: f32) -> f32 {
        self.arc.edge_distance_deg(theta)
    }
}
