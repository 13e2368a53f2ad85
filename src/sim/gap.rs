//! Orb placement in the widest free gap
//!
//! Arcs are projected onto the circle as blocked intervals, merged, and the
//! midpoint of the widest remaining gap becomes the orb's target angle.

use std::f32::consts::{PI, TAU};

use rand::Rng;

use super::arc::ArcSpan;
use crate::wrap_angle;

/// Merge blocked intervals into sorted, disjoint blocks
pub fn merge_intervals(mut blocks: Vec<(f32, f32)>) -> Vec<(f32, f32)> {
    blocks.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut merged: Vec<(f32, f32)> = Vec::with_capacity(blocks.len());
    for (from, to) in blocks {
        match merged.last_mut() {
            Some(cur) if from <= cur.1 => cur.1 = cur.1.max(to),
            _ => merged.push((from, to)),
        }
    }
    merged
}

/// Widest gap between arcs inflated by `inflate` radians.
///
/// Returns `(width, midpoint)`, or `None` when there are no arcs.
pub fn widest_gap<'a>(arcs: impl IntoIterator<Item = &'a ArcSpan>, inflate: f32) -> Option<(f32, f32)> {
    let blocks: Vec<(f32, f32)> = arcs
        .into_iter()
        .flat_map(|arc| arc.blocked_intervals(inflate))
        .collect();
    if blocks.is_empty() {
        return None;
    }

    let merged = merge_intervals(blocks);
    let mut best: Option<(f32, f32)> = None;
    let mut consider = |from: f32, to: f32| {
        let width = to - from;
        if best.is_none_or(|(w, _)| width > w) {
            best = Some((width, from + width * 0.5));
        }
    };

    let first = merged[0];
    if first.0 > 0.0 {
        consider(0.0, first.0);
    }
    for pair in merged.windows(2) {
        consider(pair[0].1, pair[1].0);
    }
    let last = merged[merged.len() - 1];
    consider(last.1, TAU);

    best
}

/// Target angle for a new orb, before jitter
pub fn orb_target_angle<'a>(
    arcs: impl IntoIterator<Item = &'a ArcSpan>,
    player_angle: f32,
    inflate: f32,
    min_sep: f32,
) -> f32 {
    let opposite = wrap_angle(player_angle + PI);
    let Some((_, mid)) = widest_gap(arcs, inflate) else {
        return opposite;
    };

    if crate::delta_angle(mid, player_angle).abs() < min_sep {
        return opposite;
    }
    wrap_angle(mid)
}

/// Add uniform jitter in `±jitter` radians
pub fn jitter_angle<R: Rng>(angle: f32, jitter: f32, rng: &mut R) -> f32 {
    if jitter <= 0.0 {
        return wrap_angle(angle);
    }
    wrap_angle(angle + rng.random_range(-jitter..jitter))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn deg(d: f32) -> f32 {
        d.to_radians()
    }

    /// Span covering `[from_deg, to_deg]`
    fn span(from_deg: f32, to_deg: f32) -> ArcSpan {
        ArcSpan::new(deg((from_deg + to_deg) * 0.5), deg((to_deg - from_deg) * 0.5))
    }

    #[test]
    fn test_widest_gap_picks_larger_side() {
        let arcs = [span(0.0, 60.0), span(180.0, 200.0)];
        let (width, mid) = widest_gap(&arcs, 0.0).unwrap();
        assert!((width.to_degrees() - 160.0).abs() < 0.01);
        let mid_deg = mid.to_degrees();
        assert!(mid_deg > 200.0 && mid_deg < 360.0, "mid {}", mid_deg);
        assert!((mid_deg - 280.0).abs() < 0.01);
    }

    #[test]
    fn test_merge_overlapping() {
        let merged = merge_intervals(vec![(1.0, 2.0), (0.5, 1.2), (3.0, 4.0), (2.0, 2.5)]);
        assert_eq!(merged, vec![(0.5, 2.5), (3.0, 4.0)]);
    }

    #[test]
    fn test_gap_before_first_block() {
        let arcs = [span(200.0, 350.0)];
        let (width, mid) = widest_gap(&arcs, 0.0).unwrap();
        assert!((width.to_degrees() - 200.0).abs() < 0.01);
        assert!((mid.to_degrees() - 100.0).abs() < 0.01);
    }

    #[test]
    fn test_wrapping_arc_is_split() {
        // 340°..20° plus 90°..100°: widest gap is 100°..340°
        let arcs = [span(-20.0, 20.0), span(90.0, 100.0)];
        let (width, mid) = widest_gap(&arcs, 0.0).unwrap();
        assert!((width.to_degrees() - 240.0).abs() < 0.01);
        assert!((mid.to_degrees() - 220.0).abs() < 0.01);
    }

    #[test]
    fn test_no_arcs_goes_opposite_player() {
        let empty: [ArcSpan; 0] = [];
        let angle = orb_target_angle(&empty, deg(30.0), deg(5.0), deg(35.0));
        assert!((angle.to_degrees() - 210.0).abs() < 0.01);
    }

    #[test]
    fn test_gap_near_player_is_overridden() {
        let arcs = [span(0.0, 60.0), span(180.0, 200.0)];
        // Best midpoint is 280°; a player at 270° is too close
        let angle = orb_target_angle(&arcs, deg(270.0), 0.0, deg(35.0));
        assert!((angle.to_degrees() - 90.0).abs() < 0.01);

        let angle = orb_target_angle(&arcs, deg(100.0), 0.0, deg(35.0));
        assert!((angle.to_degrees() - 280.0).abs() < 0.01);
    }

    #[test]
    fn test_jitter_stays_in_range() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..100 {
            let a = jitter_angle(0.0, deg(6.0), &mut rng);
            let d = crate::delta_angle(a, 0.0).abs();
            assert!(d <= deg(6.0) + 1e-5);
            assert!((0.0..TAU).contains(&a));
        }
    }
}
