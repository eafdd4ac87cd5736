//! Planar polygon helpers: containment and convex hulls.

use glam::DVec2;

/// Relative tolerance for treating a point as lying on a polygon edge.
const EDGE_TOLERANCE: f64 = 1e-9;

/// z-component of `(b - a) × (c - a)`. Positive when `a, b, c` turn left.
#[inline]
pub fn cross(a: DVec2, b: DVec2, c: DVec2) -> f64 {
    (b - a).perp_dot(c - a)
}

/// Whether `p` lies on segment `a..b`, within [`EDGE_TOLERANCE`].
pub fn on_segment(a: DVec2, b: DVec2, p: DVec2) -> bool {
    let ab = b - a;
    let scale = ab.length_squared().max(1.0);
    if cross(a, b, p).abs() > EDGE_TOLERANCE * scale {
        return false;
    }
    let t = (p - a).dot(ab);
    t >= -EDGE_TOLERANCE * scale && t <= ab.length_squared() + EDGE_TOLERANCE * scale
}

/// Closed point-in-polygon test: boundary points count as inside.
///
/// Works for any simple polygon, vertices in either winding order. The
/// polygon is implicitly closed; fewer than 3 vertices contain nothing.
pub fn polygon_contains(polygon: &[DVec2], p: DVec2) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let a = polygon[j];
        let b = polygon[i];
        if on_segment(a, b, p) {
            return true;
        }
        // Crossing number with half-open rule on y.
        if (b.y > p.y) != (a.y > p.y) {
            let x_cross = b.x + (p.y - b.y) * (a.x - b.x) / (a.y - b.y);
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Signed area; positive for counter-clockwise winding.
pub fn signed_area(polygon: &[DVec2]) -> f64 {
    if polygon.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        sum += polygon[j].perp_dot(polygon[i]);
        j = i;
    }
    sum * 0.5
}

/// Convex hull in counter-clockwise order (Andrew's monotone chain).
///
/// Collinear boundary points are dropped. Inputs of fewer than three
/// distinct points return those points.
pub fn convex_hull(points: &[DVec2]) -> Vec<DVec2> {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    sorted.dedup();
    if sorted.len() < 3 {
        return sorted;
    }

    let mut hull: Vec<DVec2> = Vec::with_capacity(sorted.len() + 1);
    for &p in &sorted {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(p);
    }
    let lower_len = hull.len() + 1;
    for &p in sorted.iter().rev().skip(1) {
        while hull.len() >= lower_len
            && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0
        {
            hull.pop();
        }
        hull.push(p);
    }
    // The upper chain ends where the lower one started.
    hull.pop();
    hull
}

/// Whether all points lie on one line (or there are fewer than 3 distinct).
pub fn all_collinear(points: &[DVec2]) -> bool {
    let Some(&first) = points.first() else {
        return true;
    };
    let Some(&second) = points.iter().find(|p| **p != first) else {
        return true;
    };
    let scale = points
        .iter()
        .map(|p| (*p - first).length_squared())
        .fold(1.0, f64::max);
    points
        .iter()
        .all(|&p| cross(first, second, p).abs() <= EDGE_TOLERANCE * scale)
}
