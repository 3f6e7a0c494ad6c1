//! Catmull-Rom spline through the route waypoints.

use crate::WorldPoint;

/// Uniform Catmull-Rom curve. Parameter `t` in `[0, 1]` is spread evenly over
/// the segments, so waypoint `k` of `n + 1` sits exactly at `t = k / n`.
#[derive(Clone, Debug, PartialEq)]
pub struct RouteCurve {
    points: Vec<WorldPoint>,
    tension: f64,
}

impl RouteCurve {
    /// `None` when there are no control points.
    pub fn new(points: Vec<WorldPoint>, tension: f64) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        Some(RouteCurve { points, tension })
    }

    pub fn control_points(&self) -> &[WorldPoint] {
        &self.points
    }

    pub fn segments(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    pub fn point_at(&self, t: f64) -> WorldPoint {
        let pts = &self.points;
        let l = pts.len();
        if l == 1 {
            return pts[0];
        }
        let p = (l - 1) as f64 * t.clamp(0.0, 1.0);
        let mut i = p.floor() as usize;
        let mut w = p - i as f64;
        if i >= l - 1 {
            i = l - 2;
            w = 1.0;
        }

        let p0 = if i > 0 {
            pts[i - 1]
        } else {
            pts[0] * 2.0 - pts[1]
        };
        let p1 = pts[i];
        let p2 = pts[i + 1];
        let p3 = if i + 2 < l {
            pts[i + 2]
        } else {
            pts[l - 1] * 2.0 - pts[l - 2]
        };

        WorldPoint::new(
            self.cubic(p0.x, p1.x, p2.x, p3.x, w),
            self.cubic(p0.y, p1.y, p2.y, p3.y, w),
            self.cubic(p0.z, p1.z, p2.z, p3.z, w),
        )
    }

    fn cubic(&self, x0: f64, x1: f64, x2: f64, x3: f64, w: f64) -> f64 {
        let t0 = self.tension * (x2 - x0);
        let t1 = self.tension * (x3 - x1);
        let c2 = -3.0 * x1 + 3.0 * x2 - 2.0 * t0 - t1;
        let c3 = 2.0 * x1 - 2.0 * x2 + t0 + t1;
        x1 + t0 * w + c2 * w * w + c3 * w * w * w
    }

    /// Unit direction of travel at `t`, looking `look_ahead` further along.
    /// Zero when the curve does not move over that span.
    pub fn direction_at(&self, t: f64, look_ahead: f64) -> WorldPoint {
        let here = self.point_at(t);
        let ahead = self.point_at((t + look_ahead).min(1.0));
        (ahead - here).normalize_or_zero()
    }

    /// `per_segment` evenly spaced samples per segment, endpoints included.
    pub fn sample(&self, per_segment: usize) -> Vec<WorldPoint> {
        let divisions = (self.segments() * per_segment.max(1)).max(1);
        (0..=divisions)
            .map(|i| self.point_at(i as f64 / divisions as f64))
            .collect()
    }
}

/// Leading part of a sampled curve up to `progress`, ending exactly at `head`
/// so the line tip moves smoothly instead of jumping between samples.
pub fn partial_polyline(samples: &[WorldPoint], progress: f64, head: WorldPoint) -> Vec<WorldPoint> {
    if samples.is_empty() {
        return Vec::new();
    }
    let last = samples.len() - 1;
    let whole = ((last as f64 * progress.clamp(0.0, 1.0)).floor() as usize).min(last);
    let mut out = samples[..=whole].to_vec();
    if out.last() != Some(&head) {
        out.push(head);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn bent() -> RouteCurve {
        RouteCurve::new(
            vec![
                WorldPoint::new(0.0, 0.0, 0.0),
                WorldPoint::new(10.0, 0.0, 0.0),
                WorldPoint::new(10.0, 0.0, 10.0),
                WorldPoint::new(20.0, 5.0, 10.0),
            ],
            0.5,
        )
        .expect("curve")
    }

    #[test]
    fn passes_through_every_waypoint() {
        let curve = bent();
        for (k, p) in curve.control_points().iter().enumerate() {
            let at = curve.point_at(k as f64 / 3.0);
            assert_approx_eq!(at.x, p.x, 1e-9);
            assert_approx_eq!(at.y, p.y, 1e-9);
            assert_approx_eq!(at.z, p.z, 1e-9);
        }
        assert_eq!(curve.point_at(0.0), curve.control_points()[0]);
    }

    #[test]
    fn bends_smoothly_between_waypoints() {
        let curve = bent();
        // the upcoming turn pulls the first segment off the straight line
        let mid = curve.point_at(1.0 / 6.0);
        assert!(mid.z.abs() > 1e-3);
    }

    #[test]
    fn single_point_curve_is_constant() {
        let p = WorldPoint::new(3.0, 4.0, 5.0);
        let curve = RouteCurve::new(vec![p], 0.5).expect("curve");
        assert_eq!(curve.point_at(0.7), p);
        assert_eq!(curve.direction_at(0.2, 0.04), WorldPoint::ZERO);
        assert_eq!(curve.sample(50), vec![p, p]);
        assert!(RouteCurve::new(Vec::new(), 0.5).is_none());
    }

    #[test]
    fn sample_count_matches_segments() {
        assert_eq!(bent().sample(50).len(), 151);
    }

    #[test]
    fn partial_polyline_ends_at_head() {
        let curve = bent();
        let samples = curve.sample(10);
        let head = curve.point_at(0.42);
        let line = partial_polyline(&samples, 0.42, head);
        assert_eq!(line.last(), Some(&head));
        assert_eq!(line.first(), samples.first());
        assert_eq!(line.len(), 12 + 2);
    }
}
