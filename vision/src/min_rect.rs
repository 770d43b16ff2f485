//! Minimum-area rotated bounding rectangles.
//!
//! Computes the convex hull of a point set (monotone chain) and then checks
//! one candidate rectangle per hull edge (rotating calipers): the minimum-area
//! enclosing rectangle always has a side collinear with a hull edge.

use crate::contours::Point;

/// Angles within this many degrees of an axis are snapped onto it
const ANGLE_SNAP_DEGREES: f64 = 1e-9;

/// A rectangle rotated about its center
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotatedRect {
    /// Center in pixel coordinates
    pub center: Point,
    /// Length of the side at `angle`
    pub width: f64,
    /// Length of the side perpendicular to `angle`
    pub height: f64,
    /// Angle of the `width` side from the +x axis, degrees in `(-90, 0]`.
    ///
    /// Measured in image coordinates (y down), so negative angles lean the
    /// side up and to the right on screen.
    pub angle: f64,
}

impl RotatedRect {
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// `width / height`, or `None` for a degenerate rectangle
    pub fn aspect_ratio(&self) -> Option<f64> {
        (self.height > 0.0).then(|| self.width / self.height)
    }
}

fn cross(o: Point, a: Point, b: Point) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Convex hull of `points` with collinear points removed.
///
/// The hull is returned without repeating the first point.
pub fn convex_hull(points: &[Point]) -> Vec<Point> {
    let mut sorted: Vec<Point> = points.to_vec();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    sorted.dedup();

    if sorted.len() < 3 {
        return sorted;
    }

    let mut hull: Vec<Point> = Vec::with_capacity(sorted.len() * 2);

    // Lower hull
    for &p in &sorted {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(p);
    }

    // Upper hull, never popping back into the lower one
    let floor = hull.len() + 1;
    for &p in sorted.iter().rev().skip(1) {
        while hull.len() >= floor && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(p);
    }

    hull.pop();
    hull
}

/// Normalize an edge direction into `(-90, 0]`, swapping the side lengths
/// when the perpendicular side is the one that lands in range.
fn normalize(mut angle: f64, along: f64, across: f64) -> (f64, f64, f64) {
    while angle > 90.0 {
        angle -= 180.0;
    }
    while angle <= -90.0 {
        angle += 180.0;
    }
    if angle.abs() < ANGLE_SNAP_DEGREES {
        return (0.0, along, across);
    }
    if (angle - 90.0).abs() < ANGLE_SNAP_DEGREES {
        return (0.0, across, along);
    }
    if angle > 0.0 {
        (angle - 90.0, across, along)
    } else {
        (angle, along, across)
    }
}

/// Smallest-area rectangle enclosing `points`.
///
/// Returns `None` for an empty point set. A single point yields a zero-size
/// rectangle; collinear points yield a zero-height rectangle.
pub fn min_area_rect(points: &[Point]) -> Option<RotatedRect> {
    let hull = convex_hull(points);

    match hull.len() {
        0 => return None,
        1 => {
            return Some(RotatedRect {
                center: hull[0],
                width: 0.0,
                height: 0.0,
                angle: 0.0,
            })
        }
        _ => {}
    }

    let mut best: Option<(f64, RotatedRect)> = None;

    for i in 0..hull.len() {
        let a = hull[i];
        let b = hull[(i + 1) % hull.len()];
        let (ex, ey) = (b.x - a.x, b.y - a.y);
        let length = ex.hypot(ey);
        if length == 0.0 {
            continue;
        }
        let (ux, uy) = (ex / length, ey / length);
        let (vx, vy) = (-uy, ux);

        let (mut min_u, mut max_u) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_v, mut max_v) = (f64::INFINITY, f64::NEG_INFINITY);
        for p in &hull {
            let (px, py) = (p.x - a.x, p.y - a.y);
            let u = px * ux + py * uy;
            let v = px * vx + py * vy;
            min_u = min_u.min(u);
            max_u = max_u.max(u);
            min_v = min_v.min(v);
            max_v = max_v.max(v);
        }

        let along = max_u - min_u;
        let across = max_v - min_v;
        let area = along * across;
        if best.as_ref().is_some_and(|(best_area, _)| area >= *best_area) {
            continue;
        }

        let mid_u = (min_u + max_u) / 2.0;
        let mid_v = (min_v + max_v) / 2.0;
        let center = Point::new(
            a.x + ux * mid_u + vx * mid_v,
            a.y + uy * mid_u + vy * mid_v,
        );
        let (angle, width, height) = normalize(uy.atan2(ux).to_degrees(), along, across);

        best = Some((
            area,
            RotatedRect {
                center,
                width,
                height,
                angle,
            },
        ));
    }

    best.map(|(_, rect)| rect)
}
