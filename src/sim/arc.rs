//! Angular extent of a danger arc
//!
//! On the track an arc is fully described by:
//! - center: angle of the arc's midpoint (radians, [0, 2π))
//! - half_width: half of its angular extent (radians, ≥ 0)
//!
//! Its radius is not part of the span; the obstacle's phase decides that.

use std::f32::consts::TAU;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{delta_angle, normalize_interval, polar_to_cartesian, wrap_angle};

/// A symmetric angular span on the track
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArcSpan {
    /// Center angle (radians, normalized to [0, 2π))
    pub center: f32,
    /// Half of the angular width (radians)
    pub half_width: f32,
}

impl ArcSpan {
    pub fn new(center: f32, half_width: f32) -> Self {
        let half_width = if half_width.is_finite() { half_width.abs() } else { 0.0 };
        Self {
            center: wrap_angle(center),
            half_width,
        }
    }

    /// Build from a full arc size in degrees
    pub fn from_size_deg(center: f32, arc_size_deg: f32) -> Self {
        Self::new(center, arc_size_deg.abs().to_radians() * 0.5)
    }

    /// Full angular span
    #[inline]
    pub fn angular_span(&self) -> f32 {
        self.half_width * 2.0
    }

    /// Absolute angular distance from the center, in [0, π]
    #[inline]
    pub fn distance_from_center(&self, theta: f32) -> f32 {
        delta_angle(theta, self.center).abs()
    }

    /// Exact hit test: is `theta` within the span?
    #[inline]
    pub fn contains_angle(&self, theta: f32) -> bool {
        self.distance_from_center(theta) <= self.half_width
    }

    /// Padded hit test: the span grows by `pad` on each side
    #[inline]
    pub fn contains_angle_padded(&self, theta: f32, pad: f32) -> bool {
        self.distance_from_center(theta) <= self.half_width + pad
    }

    /// Distance from `theta` to the nearest edge in degrees, 0 when inside
    pub fn edge_distance_deg(&self, theta: f32) -> f32 {
        (self.distance_from_center(theta) - self.half_width).max(0.0).to_degrees()
    }

    /// The span, grown by `inflate` on each side, as one or two intervals in [0, 2π).
    ///
    /// A span that wraps across 0 is split in two; one covering the whole
    /// circle comes back as `[0, 2π]`.
    pub fn blocked_intervals(&self, inflate: f32) -> Vec<(f32, f32)> {
        let half = self.half_width + inflate.max(0.0);
        if half * 2.0 >= TAU {
            return vec![(0.0, TAU)];
        }
        let (from, to, wrapped) = normalize_interval(self.center - half, self.center + half);
        if wrapped {
            vec![(0.0, to), (from, TAU)]
        } else {
            vec![(from, to)]
        }
    }

    /// Sample points along the arc at `radius` around `origin` (for rendering)
    pub fn sample_points(&self, origin: Vec2, radius: f32, num_points: usize) -> Vec<Vec2> {
        let start = self.center - self.half_width;
        let span = self.angular_span();

        (0..num_points)
            .map(|i| {
                let t = i as f32 / (num_points - 1).max(1) as f32;
                origin + polar_to_cartesian(radius, start + t * span)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deg(d: f32) -> f32 {
        d.to_radians()
    }

    #[test]
    fn test_contains_angle_no_wrap() {
        let arc = ArcSpan::new(deg(90.0), deg(10.0));
        assert!(arc.contains_angle(deg(85.0)));
        assert!(arc.contains_angle(deg(99.9)));
        assert!(!arc.contains_angle(deg(101.0)));
        assert!(!arc.contains_angle(deg(270.0)));
    }

    #[test]
    fn test_contains_angle_wraparound() {
        // Arc centered on 0° spanning 350°..10°
        let arc = ArcSpan::new(0.0, deg(10.0));
        assert!(arc.contains_angle(deg(355.0)));
        assert!(arc.contains_angle(deg(5.0)));
        assert!(!arc.contains_angle(deg(180.0)));
    }

    #[test]
    fn test_padded_contains() {
        let arc = ArcSpan::new(deg(90.0), deg(10.0));
        assert!(!arc.contains_angle(deg(102.0)));
        assert!(arc.contains_angle_padded(deg(102.0), deg(3.0)));
    }

    #[test]
    fn test_edge_distance() {
        let arc = ArcSpan::from_size_deg(deg(90.0), 20.0);
        assert!((arc.edge_distance_deg(deg(105.0)) - 5.0).abs() < 1e-3);
        assert_eq!(arc.edge_distance_deg(deg(92.0)), 0.0);
    }

    #[test]
    fn test_blocked_intervals_split_on_wrap() {
        let arc = ArcSpan::new(deg(2.0), deg(10.0));
        let blocks = arc.blocked_intervals(0.0);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].0, 0.0);
        assert!((blocks[0].1 - deg(12.0)).abs() < 1e-4);
        assert!((blocks[1].0 - deg(352.0)).abs() < 1e-4);
        assert_eq!(blocks[1].1, TAU);
    }

    #[test]
    fn test_blocked_intervals_full_circle() {
        let arc = ArcSpan::new(deg(2.0), deg(179.0));
        assert_eq!(arc.blocked_intervals(deg(5.0)), vec![(0.0, TAU)]);
    }

    #[test]
    fn test_sample_points_endpoints() {
        let arc = ArcSpan::new(deg(90.0), deg(45.0));
        let pts = arc.sample_points(Vec2::ZERO, 2.0, 3);
        assert_eq!(pts.len(), 3);
        assert!((pts[1] - Vec2::new(0.0, 2.0)).length() < 1e-4);
        assert!((pts[0].length() - 2.0).abs() < 1e-4);
    }
}
