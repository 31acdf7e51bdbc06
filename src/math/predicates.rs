//! Geometric predicates used by every meshing stage.
//!
//! Tolerance policy: orientation tests compare exact floating-point signs
//! (zero tolerance), because the walking locator and the on-edge insertion
//! test depend on consistent sign decisions. The only tolerated comparison
//! lives in [`coincident`], which guards segment splitting against collapsed
//! segments. Both orientation variants compute the same cross product; they
//! differ in which operand anchors the differences, and that rounding
//! difference matters when one operand is a far-away cover vertex.

use std::f64::consts::PI;

use super::{Point2, Vector2, COINCIDENCE_TOLERANCE};

/// Orientation of `c` relative to the directed line `a -> b`.
///
/// Positive when the triangle `(a, b, c)` winds counter-clockwise.
/// Differences are anchored at `c`, keeping precision when `a` and `b` are
/// far larger in magnitude than `c`.
#[must_use]
pub fn orientation(a: &Point2, b: &Point2, c: &Point2) -> f64 {
    (a.x - c.x) * (b.y - c.y) - (a.y - c.y) * (b.x - c.x)
}

/// Orientation variant anchored at `a`, for queries where `c` is a vertex of
/// the covering triangle (coordinates of order `1e10`).
#[must_use]
pub fn cover_orientation(a: &Point2, b: &Point2, c: &Point2) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Whether `p` lies strictly inside the diametral circle of segment `a`-`b`
/// (the circle with the segment as diameter). The standard encroachment test.
#[must_use]
pub fn in_diametral_circle(a: &Point2, b: &Point2, p: &Point2) -> bool {
    let cx = 0.5 * (a.x + b.x);
    let cy = 0.5 * (a.y + b.y);
    let dx = b.x - cx;
    let dy = b.y - cy;
    let r2 = dx * dx + dy * dy;
    let dx = p.x - cx;
    let dy = p.y - cy;
    dx * dx + dy * dy < r2
}

/// Whether two points coincide within [`COINCIDENCE_TOLERANCE`] per axis.
#[must_use]
pub fn coincident(a: &Point2, b: &Point2) -> bool {
    (a.x - b.x).abs() < COINCIDENCE_TOLERANCE && (a.y - b.y).abs() < COINCIDENCE_TOLERANCE
}

/// Signed area of the triangle `(a, b, c)` (shoelace formula).
///
/// Positive for counter-clockwise winding.
#[must_use]
pub fn signed_area(a: &Point2, b: &Point2, c: &Point2) -> f64 {
    0.5 * ((b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x))
}

/// Squared distance between two points.
#[must_use]
pub fn distance_sq(a: &Point2, b: &Point2) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    dx * dx + dy * dy
}

/// Perimeter of the triangle `(a, b, c)`.
#[must_use]
pub fn perimeter(a: &Point2, b: &Point2, c: &Point2) -> f64 {
    distance_sq(a, b).sqrt() + distance_sq(b, c).sqrt() + distance_sq(c, a).sqrt()
}

/// Interior angles of the triangle `(a, b, c)` in radians, at `a`, `b`, `c`.
///
/// Computed from the edge direction angles so that a clockwise triangle
/// yields negative values, which downstream quality ranking relies on.
#[must_use]
pub fn interior_angles(a: &Point2, b: &Point2, c: &Point2) -> [f64; 3] {
    let t0 = (b.y - a.y).atan2(b.x - a.x);
    let t1 = (c.y - b.y).atan2(c.x - b.x);
    let t2 = (a.y - c.y).atan2(a.x - c.x);
    [
        turn(t2 + PI, t0),
        turn(t0 + PI, t1),
        turn(t1 + PI, t2),
    ]
}

/// Minimum interior angle of the triangle `(a, b, c)` in degrees.
#[must_use]
pub fn min_interior_angle_deg(a: &Point2, b: &Point2, c: &Point2) -> f64 {
    let angles = interior_angles(a, b, c);
    angles[0].min(angles[1]).min(angles[2]).to_degrees()
}

/// Circumcenter of the triangle `(a, b, c)` by the two-edge-vector formula.
///
/// Unreliable for (near-)degenerate triangles, where the denominator
/// vanishes; callers must treat the result as a proposal, not a guarantee.
#[must_use]
pub fn circumcenter(a: &Point2, b: &Point2, c: &Point2) -> Point2 {
    let d = Vector2::new(b.x - a.x, b.y - a.y);
    let e = Vector2::new(c.x - a.x, c.y - a.y);
    let f = 0.5 / (e.x * d.y - e.y * d.x);
    let d2 = d.x * d.x + d.y * d.y;
    let e2 = e.x * e.x + e.y * e.y;
    Point2::new(
        a.x + f * (e2 * d.y - d2 * e.y),
        a.y + f * (d2 * e.x - e2 * d.x),
    )
}

/// Wraps the direction difference `a1 - a0` into `(-PI, PI]`.
fn turn(a1: f64, a0: f64) -> f64 {
    let mut d = a1 - a0;
    while d > PI {
        d -= 2.0 * PI;
    }
    while d <= -PI {
        d += 2.0 * PI;
    }
    d
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn orientation_sign() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 0.0);
        let left = Point2::new(0.5, 1.0);
        let right = Point2::new(0.5, -1.0);
        assert!(orientation(&a, &b, &left) > 0.0);
        assert!(orientation(&a, &b, &right) < 0.0);
        assert!(orientation(&a, &b, &Point2::new(0.25, 0.0)) == 0.0);
    }

    #[test]
    fn orientation_variants_agree_in_sign() {
        let a = Point2::new(1.0e10, 0.0);
        let b = Point2::new(-5.0e9, 8.66e9);
        let c = Point2::new(0.3, -0.7);
        assert_eq!(
            orientation(&a, &b, &c) > 0.0,
            cover_orientation(&a, &b, &c) > 0.0
        );
    }

    #[test]
    fn diametral_circle_membership() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(2.0, 0.0);
        assert!(in_diametral_circle(&a, &b, &Point2::new(1.0, 0.5)));
        assert!(!in_diametral_circle(&a, &b, &Point2::new(1.0, 1.5)));
        // Endpoints lie on the circle, not strictly inside.
        assert!(!in_diametral_circle(&a, &b, &a));
        assert!(!in_diametral_circle(&a, &b, &b));
    }

    #[test]
    fn equilateral_angles() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 0.0);
        let c = Point2::new(0.5, 3.0_f64.sqrt() / 2.0);
        for angle in interior_angles(&a, &b, &c) {
            assert_relative_eq!(angle, PI / 3.0, epsilon = 1e-12);
        }
        assert_relative_eq!(min_interior_angle_deg(&a, &b, &c), 60.0, epsilon = 1e-9);
    }

    #[test]
    fn clockwise_angles_are_negative() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(0.0, 1.0);
        let c = Point2::new(1.0, 0.0);
        let angles = interior_angles(&a, &b, &c);
        assert!(angles.iter().all(|&x| x < 0.0));
    }

    #[test]
    fn circumcenter_right_triangle() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 0.0);
        let c = Point2::new(0.0, 1.0);
        let cc = circumcenter(&a, &b, &c);
        assert_relative_eq!(cc.x, 0.5, epsilon = 1e-12);
        assert_relative_eq!(cc.y, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn signed_area_windings() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 0.0);
        let c = Point2::new(0.0, 1.0);
        assert_relative_eq!(signed_area(&a, &b, &c), 0.5, epsilon = 1e-12);
        assert_relative_eq!(signed_area(&a, &c, &b), -0.5, epsilon = 1e-12);
    }

    #[test]
    fn coincident_tolerance() {
        let a = Point2::new(1.0, 1.0);
        assert!(coincident(&a, &Point2::new(1.0 + 1e-6, 1.0 - 1e-6)));
        assert!(!coincident(&a, &Point2::new(1.0 + 1e-4, 1.0)));
    }
}
