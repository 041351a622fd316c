//! Region building: turning sparse landmark arcs into fillable geometry.
//!
//! Everything here is pure math over pixel-space polylines. No raster state,
//! no allocation reuse tricks; the per-frame point counts are tiny (tens of
//! points), so clarity wins.

use crate::types::{Band, Polyline, Vec2};

/// Centroid of a polyline. Used as the "inside" reference when deciding
/// which way an offset normal should point.
pub fn polyline_center(points: &[Vec2]) -> Vec2 {
    if points.is_empty() {
        return Vec2::default();
    }
    let mut c = Vec2::default();
    for p in points {
        c = c + *p;
    }
    c * (1.0 / points.len() as f32)
}

/// Local tangent at index `i`, estimated from the neighboring points.
fn local_tangent(points: &[Vec2], i: usize) -> Vec2 {
    let prev = points[i.saturating_sub(1)];
    let next = points[(i + 1).min(points.len() - 1)];
    (next - prev).normalized()
}

/// Offset each point along its local outward normal.
///
/// The normal is the perpendicular of the neighbor-estimated tangent,
/// flipped when it points toward `center` so the offset always moves away
/// from the region interior. The offset distance is interpolated from
/// `inner_dist` (t = 0) to `outer_dist` (t = 1) along the polyline.
/// Zero distances return the input unchanged (within float tolerance).
pub fn offset_polyline_normal(
    points: &[Vec2],
    center: Vec2,
    inner_dist: f32,
    outer_dist: f32,
) -> Polyline {
    let n = points.len();
    if n < 2 {
        return points.to_vec();
    }
    let mut out = Vec::with_capacity(n);
    for (i, &p) in points.iter().enumerate() {
        let mut normal = local_tangent(points, i).perp();
        if normal.dot(center - p) > 0.0 {
            // Pointing at the interior; flip outward.
            normal = normal * -1.0;
        }
        let t = i as f32 / (n - 1) as f32;
        let d = inner_dist + (outer_dist - inner_dist) * t;
        out.push(p + normal * d);
    }
    out
}

/// Build a band from a base polyline: offset it outward for the far edge,
/// then grow each far point further along its paired inner→outer vector by
/// an amount interpolated from `grow_inner` to `grow_outer`.
///
/// The returned band always has `inner.len() == outer.len()`.
pub fn compute_band(
    inner: &[Vec2],
    center: Vec2,
    inner_width: f32,
    outer_width: f32,
    grow_inner: f32,
    grow_outer: f32,
) -> Band {
    let mut outer = offset_polyline_normal(inner, center, inner_width, outer_width);
    let n = inner.len();
    if n >= 2 {
        for (i, o) in outer.iter_mut().enumerate() {
            let dir = (*o - inner[i]).normalized();
            let t = i as f32 / (n - 1) as f32;
            let grow = grow_inner + (grow_outer - grow_inner) * t;
            *o = *o + dir * grow;
        }
    }
    Band { inner: inner.to_vec(), outer }
}

/// Reverse the polyline if its first point sits nearer the outer corner
/// than the inner one, so downstream asymmetric parameters ("extend more
/// toward the outer corner") hold regardless of input ordering.
/// Applying this twice is the same as applying it once.
pub fn orient_by_corner(mut points: Polyline, inner_corner: Vec2, outer_corner: Vec2) -> Polyline {
    if let Some(&first) = points.first() {
        if first.distance(inner_corner) > first.distance(outer_corner) {
            points.reverse();
        }
    }
    points
}

/// Closed-eye heuristic: mean vertical separation of paired eyelid points
/// under 1% of the frame height reads as closed.
pub fn check_eye_closed(upper: &[Vec2], lower: &[Vec2], frame_height: f32) -> bool {
    let n = upper.len().min(lower.len());
    if n == 0 || frame_height <= 0.0 {
        return false;
    }
    let mut sum = 0.0;
    for i in 0..n {
        sum += (upper[i].y - lower[i].y).abs();
    }
    sum / (n as f32) < frame_height * 0.01
}

/// Flatten a quadratic Bézier into `segments` line segments (inclusive of
/// both endpoints).
pub fn sample_quadratic(p0: Vec2, ctrl: Vec2, p1: Vec2, segments: usize) -> Polyline {
    let segments = segments.max(1);
    let mut out = Vec::with_capacity(segments + 1);
    for i in 0..=segments {
        let t = i as f32 / segments as f32;
        let u = 1.0 - t;
        let p = p0 * (u * u) + ctrl * (2.0 * u * t) + p1 * (t * t);
        out.push(p);
    }
    out
}

/// Join a band into one closed contour: along the inner edge, then back
/// along the reversed outer edge. The loop winds consistently, so it fills
/// under either winding rule.
pub fn band_loop(band: &Band) -> Polyline {
    let mut contour = band.inner.clone();
    contour.extend(band.outer.iter().rev().copied());
    contour
}

/// Join an upper and lower arc (both running corner-to-corner in the same
/// direction) into one closed loop.
pub fn arc_loop(upper: &[Vec2], lower: &[Vec2]) -> Polyline {
    let mut contour = upper.to_vec();
    contour.extend(lower.iter().rev().copied());
    contour
}

/// Axis-aligned bounds, or `None` for an empty polyline.
pub fn bounding_box(points: &[Vec2]) -> Option<(Vec2, Vec2)> {
    let first = points.first()?;
    let mut min = *first;
    let mut max = *first;
    for p in &points[1..] {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    Some((min, max))
}

/// A bounding box with any non-finite coordinate disqualifies gradient
/// rendering; callers fall back to a flat fill.
pub fn box_is_finite(bbox: Option<(Vec2, Vec2)>) -> bool {
    matches!(bbox, Some((min, max)) if min.is_finite() && max.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(n: usize, radius: f32) -> Polyline {
        (0..n)
            .map(|i| {
                let a = i as f32 / n as f32 * std::f32::consts::TAU;
                Vec2::new(100.0 + radius * a.cos(), 100.0 + radius * a.sin())
            })
            .collect()
    }

    #[test]
    fn zero_offset_returns_input() {
        let pts = ring(12, 40.0);
        let out = offset_polyline_normal(&pts, polyline_center(&pts), 0.0, 0.0);
        for (a, b) in pts.iter().zip(&out) {
            assert!(a.distance(*b) < 1e-4);
        }
    }

    #[test]
    fn uniform_offset_moves_every_point_by_d() {
        let pts = ring(24, 40.0);
        let d = 5.0;
        let out = offset_polyline_normal(&pts, polyline_center(&pts), d, d);
        for (a, b) in pts.iter().zip(&out) {
            assert!((a.distance(*b) - d).abs() < 1e-3);
        }
    }

    #[test]
    fn offset_points_away_from_center() {
        let pts = ring(24, 40.0);
        let center = polyline_center(&pts);
        let out = offset_polyline_normal(&pts, center, 5.0, 5.0);
        for (a, b) in pts.iter().zip(&out) {
            assert!(center.distance(*b) > center.distance(*a));
        }
    }

    #[test]
    fn band_lengths_match_input() {
        let pts = ring(9, 30.0);
        let band = compute_band(&pts, polyline_center(&pts), 2.0, 8.0, 0.0, 6.0);
        assert_eq!(band.inner.len(), pts.len());
        assert_eq!(band.outer.len(), pts.len());
    }

    #[test]
    fn band_growth_extends_outer_edge() {
        let pts = ring(9, 30.0);
        let center = polyline_center(&pts);
        let plain = compute_band(&pts, center, 2.0, 2.0, 0.0, 0.0);
        let grown = compute_band(&pts, center, 2.0, 2.0, 10.0, 10.0);
        for (a, b) in plain.outer.iter().zip(&grown.outer) {
            assert!((a.distance(*b) - 10.0).abs() < 1e-3);
        }
    }

    #[test]
    fn orient_by_corner_is_idempotent() {
        let inner = Vec2::new(0.0, 0.0);
        let outer = Vec2::new(100.0, 0.0);
        let backwards: Polyline =
            vec![Vec2::new(100.0, 0.0), Vec2::new(50.0, -10.0), Vec2::new(0.0, 0.0)];
        let once = orient_by_corner(backwards.clone(), inner, outer);
        let twice = orient_by_corner(once.clone(), inner, outer);
        assert_eq!(once, twice);
        assert!(once[0].distance(inner) < once[0].distance(outer));
    }

    #[test]
    fn eye_closed_when_lids_touch() {
        let upper: Polyline = (0..6).map(|i| Vec2::new(i as f32 * 10.0, 50.0)).collect();
        let lower = upper.clone();
        assert!(check_eye_closed(&upper, &lower, 480.0));
    }

    #[test]
    fn eye_open_past_five_percent_separation() {
        let h = 480.0;
        let upper: Polyline = (0..6).map(|i| Vec2::new(i as f32 * 10.0, 50.0)).collect();
        let lower: Polyline =
            (0..6).map(|i| Vec2::new(i as f32 * 10.0, 50.0 + h * 0.05)).collect();
        assert!(!check_eye_closed(&upper, &lower, h));
    }

    #[test]
    fn quadratic_hits_endpoints() {
        let p0 = Vec2::new(0.0, 0.0);
        let p1 = Vec2::new(10.0, 0.0);
        let ctrl = Vec2::new(5.0, 8.0);
        let pts = sample_quadratic(p0, ctrl, p1, 8);
        assert_eq!(pts.len(), 9);
        assert!(pts[0].distance(p0) < 1e-6);
        assert!(pts[8].distance(p1) < 1e-6);
        // The midpoint bows toward the control point.
        assert!(pts[4].y > 1.0);
    }

    #[test]
    fn band_loop_closes_both_edges() {
        let pts = ring(5, 20.0);
        let band = compute_band(&pts, polyline_center(&pts), 1.0, 3.0, 0.0, 0.0);
        let contour = band_loop(&band);
        assert_eq!(contour.len(), 10);
        assert_eq!(contour[0], band.inner[0]);
        assert_eq!(contour[9], band.outer[0]);
    }
}
