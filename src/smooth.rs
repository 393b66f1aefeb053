//! Parametric curve smoothing for jagged feature polylines.

use log::warn;

/// Fit a smooth parametric curve through `points` and resample it to
/// `num_points` evenly spaced output points.
///
/// Fewer than three input points are returned unchanged, in order.
/// Degenerate inputs (all points coincident) fall back to the original
/// points rather than erroring.
pub fn smooth_curve(points: &[(i32, i32)], num_points: usize) -> Vec<(i32, i32)> {
    if points.len() < 3 || num_points < 2 {
        return points.to_vec();
    }

    // Chord-length parameterization over the input polyline.
    let mut cumulative = Vec::with_capacity(points.len());
    cumulative.push(0.0f64);
    for pair in points.windows(2) {
        let dx = f64::from(pair[1].0 - pair[0].0);
        let dy = f64::from(pair[1].1 - pair[0].1);
        let last = *cumulative.last().unwrap_or(&0.0);
        cumulative.push(last + (dx * dx + dy * dy).sqrt());
    }
    let total = *cumulative.last().unwrap_or(&0.0);
    if total <= f64::EPSILON {
        warn!("curve smoothing failed: degenerate point set, returning original points");
        return points.to_vec();
    }

    let mut out = Vec::with_capacity(num_points);
    let mut segment = 0usize;
    for i in 0..num_points {
        let target = total * i as f64 / (num_points - 1) as f64;
        while segment + 2 < cumulative.len() && cumulative[segment + 1] < target {
            segment += 1;
        }
        let seg_len = cumulative[segment + 1] - cumulative[segment];
        let t = if seg_len > f64::EPSILON {
            (target - cumulative[segment]) / seg_len
        } else {
            0.0
        };
        out.push(catmull_rom(points, segment, t));
    }
    out
}

/// Evaluate a Catmull-Rom segment between `points[i]` and `points[i + 1]`
/// at parameter `t`, clamping neighbor lookups at the ends.
fn catmull_rom(points: &[(i32, i32)], i: usize, t: f64) -> (i32, i32) {
    let at = |idx: isize| -> (f64, f64) {
        let clamped = idx.clamp(0, points.len() as isize - 1) as usize;
        (f64::from(points[clamped].0), f64::from(points[clamped].1))
    };
    let p0 = at(i as isize - 1);
    let p1 = at(i as isize);
    let p2 = at(i as isize + 1);
    let p3 = at(i as isize + 2);

    let t2 = t * t;
    let t3 = t2 * t;
    let eval = |a: f64, b: f64, c: f64, d: f64| -> f64 {
        0.5 * (2.0 * b
            + (c - a) * t
            + (2.0 * a - 5.0 * b + 4.0 * c - d) * t2
            + (3.0 * b - a - 3.0 * c + d) * t3)
    };

    (
        eval(p0.0, p1.0, p2.0, p3.0).round() as i32,
        eval(p0.1, p1.1, p2.1, p3.1).round() as i32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fewer_than_three_points_unchanged() {
        let empty: Vec<(i32, i32)> = vec![];
        assert_eq!(smooth_curve(&empty, 100), empty);

        let one = vec![(5, 7)];
        assert_eq!(smooth_curve(&one, 100), one);

        let two = vec![(0, 0), (10, 10)];
        assert_eq!(smooth_curve(&two, 100), two);
    }

    #[test]
    fn order_preserved_for_short_input() {
        let two = vec![(10, 10), (0, 0)];
        assert_eq!(smooth_curve(&two, 50), two);
    }

    #[test]
    fn coincident_points_fall_back() {
        let pts = vec![(3, 3), (3, 3), (3, 3), (3, 3)];
        assert_eq!(smooth_curve(&pts, 10), pts);
    }

    #[test]
    fn resamples_to_requested_count() {
        let pts = vec![(0, 0), (10, 5), (20, 0), (30, 5)];
        let out = smooth_curve(&pts, 25);
        assert_eq!(out.len(), 25);
    }

    #[test]
    fn endpoints_are_interpolated() {
        let pts = vec![(0, 0), (10, 10), (20, 0)];
        let out = smooth_curve(&pts, 11);
        assert_eq!(*out.first().unwrap(), (0, 0));
        assert_eq!(*out.last().unwrap(), (20, 0));
    }

    #[test]
    fn straight_line_stays_straight() {
        let pts = vec![(0, 0), (10, 0), (20, 0), (30, 0)];
        let out = smooth_curve(&pts, 16);
        assert!(out.iter().all(|&(_, y)| y == 0));
        assert!(out.windows(2).all(|w| w[0].0 <= w[1].0));
    }

    #[test]
    fn smoothed_curve_stays_near_control_points() {
        let pts = vec![(0, 0), (10, 20), (20, 0), (30, 20), (40, 0)];
        let out = smooth_curve(&pts, 40);
        // Catmull-Rom interpolates the control points; overshoot is mild.
        assert!(out.iter().all(|&(_, y)| (-10..=30).contains(&y)));
    }
}
