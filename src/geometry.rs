//! Basic 2D geometry: points, affine transforms and bounding boxes
use std::{
    fmt,
    ops::{Add, Mul, Sub},
};

pub type Scalar = f32;
pub const EPSILON: Scalar = f32::EPSILON;
pub const PI: Scalar = std::f32::consts::PI;

/// Value representing a 2D point or vector.
#[derive(Clone, Copy, PartialEq, Default)]
pub struct Point(pub [Scalar; 2]);

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Point([x, y]) = self;
        write!(f, "{},{}", x, y)
    }
}

impl Point {
    #[inline]
    pub fn new(x: Scalar, y: Scalar) -> Self {
        Self([x, y])
    }

    /// Get `x` component of the point
    #[inline]
    pub fn x(&self) -> Scalar {
        self.0[0]
    }

    /// Get `y` component of the point
    #[inline]
    pub fn y(self) -> Scalar {
        self.0[1]
    }

    /// Get length of the vector (distance from the origin)
    pub fn length(self) -> Scalar {
        let Self([x, y]) = self;
        x.hypot(y)
    }

    /// Distance between two points
    pub fn dist(self, other: Self) -> Scalar {
        (self - other).length()
    }

    /// Determine if self is close to the other within the margin of error
    pub fn is_close_to(self, other: Point) -> bool {
        let Self([x0, y0]) = self;
        let Self([x1, y1]) = other;
        (x0 - x1).abs() < EPSILON && (y0 - y1).abs() < EPSILON
    }
}

impl From<(Scalar, Scalar)> for Point {
    #[inline]
    fn from(xy: (Scalar, Scalar)) -> Self {
        Self([xy.0, xy.1])
    }
}

impl Add for Point {
    type Output = Point;

    #[inline]
    fn add(self, other: Point) -> Self::Output {
        let Point([x0, y0]) = self;
        let Point([x1, y1]) = other;
        Point([x0 + x1, y0 + y1])
    }
}

impl Sub for Point {
    type Output = Point;

    #[inline]
    fn sub(self, other: Point) -> Self::Output {
        let Point([x0, y0]) = self;
        let Point([x1, y1]) = other;
        Point([x0 - x1, y0 - y1])
    }
}

impl Mul<Point> for Scalar {
    type Output = Point;

    #[inline]
    fn mul(self, other: Point) -> Self::Output {
        let Point([x, y]) = other;
        Point([self * x, self * y])
    }
}

impl std::ops::Div<Scalar> for Point {
    type Output = Point;

    #[inline]
    fn div(self, rhs: Scalar) -> Self::Output {
        let Point([x, y]) = self;
        Point([x / rhs, y / rhs])
    }
}

/// Alignment options of the `preserveAspectRatio` attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Align {
    /// Align by minimal value
    #[default]
    Min,
    /// Align by center value
    Mid,
    /// Align by maximum value
    Max,
}

/// 2D affine transformation
///
/// Stored as an array [m00, m01, m02, m10, m11, m12] but semantically corresponds to
/// a matrix:
/// ┌             ┐
/// │ m00 m01 m02 │
/// │ m10 m11 m12 │
/// │   0   0   1 │
/// └             ┘
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform([Scalar; 6]);

impl Default for Transform {
    fn default() -> Self {
        Self([1.0, 0.0, 0.0, 0.0, 1.0, 0.0])
    }
}

impl Transform {
    pub fn new(
        m00: Scalar,
        m01: Scalar,
        m02: Scalar,
        m10: Scalar,
        m11: Scalar,
        m12: Scalar,
    ) -> Self {
        Self([m00, m01, m02, m10, m11, m12])
    }

    /// Identity transformation
    pub fn identity() -> Self {
        Self::default()
    }

    /// Apply this transformation to a point
    pub fn apply(&self, point: Point) -> Point {
        let Self([m00, m01, m02, m10, m11, m12]) = self;
        let Point([x, y]) = point;
        Point([x * m00 + y * m01 + m02, x * m10 + y * m11 + m12])
    }

    /// Apply only the linear part of this transformation (direction vectors)
    pub fn apply_vec(&self, vec: Point) -> Point {
        let Self([m00, m01, _, m10, m11, _]) = self;
        let Point([x, y]) = vec;
        Point([x * m00 + y * m01, x * m10 + y * m11])
    }

    /// Find the inverse transformation, identity for singular matrices
    pub fn invert(&self) -> Option<Self> {
        // inv([[M, v], [0, 1]]) = [[inv(M), - inv(M) * v], [0, 1]]
        let Self([m00, m01, m02, m10, m11, m12]) = self;
        let det = (*m00 as f64) * (*m11 as f64) - (*m10 as f64) * (*m01 as f64);
        if det.abs() <= 1e-6 {
            return None;
        }
        let o00 = (*m11 as f64 / det) as Scalar;
        let o01 = (-*m01 as f64 / det) as Scalar;
        let o10 = (-*m10 as f64 / det) as Scalar;
        let o11 = (*m00 as f64 / det) as Scalar;
        let o02 = -o00 * m02 - o01 * m12;
        let o12 = -o10 * m02 - o11 * m12;
        Some(Self([o00, o01, o02, o10, o11, o12]))
    }

    /// Apply translation by `[tx, ty]` before self
    pub fn translate(&self, tx: Scalar, ty: Scalar) -> Self {
        self.matmul(Self([1.0, 0.0, tx, 0.0, 1.0, ty]))
    }

    /// Apply scale transformation by `[sx, sy]` before self
    pub fn scale(&self, sx: Scalar, sy: Scalar) -> Self {
        self.matmul(Self([sx, 0.0, 0.0, 0.0, sy, 0.0]))
    }

    /// Apply rotation by `a` radians around the origin before self
    pub fn rotate(&self, a: Scalar) -> Self {
        let (sin, cos) = a.sin_cos();
        self.matmul(Self([cos, -sin, 0.0, sin, cos, 0.0]))
    }

    /// Apply rotation around point `p` by angle `a` before self
    pub fn rotate_around(&self, a: Scalar, p: impl Into<Point>) -> Self {
        let p = p.into();
        self.translate(p.x(), p.y())
            .rotate(a)
            .translate(-p.x(), -p.y())
    }

    /// Apply skew along the x axis by `a` radians before self
    pub fn skew_x(&self, a: Scalar) -> Self {
        self.matmul(Self([1.0, a.tan(), 0.0, 0.0, 1.0, 0.0]))
    }

    /// Apply skew along the y axis by `a` radians before self
    pub fn skew_y(&self, a: Scalar) -> Self {
        self.matmul(Self([1.0, 0.0, 0.0, a.tan(), 1.0, 0.0]))
    }

    /// Multiply transformations in matrix form
    pub fn matmul(&self, other: Transform) -> Self {
        let Self([s00, s01, s02, s10, s11, s12]) = self;
        let Self([o00, o01, o02, o10, o11, o12]) = other;
        Self([
            s00 * o00 + s01 * o10,
            s00 * o01 + s01 * o11,
            s00 * o02 + s01 * o12 + s02,
            s10 * o00 + s11 * o10,
            s10 * o01 + s11 * o11,
            s10 * o02 + s11 * o12 + s12,
        ])
    }

    /// Average of the scale factors along both axes
    pub fn average_scale(&self) -> Scalar {
        let Self([m00, m01, _, m10, m11, _]) = self;
        (m00.hypot(*m01) + m10.hypot(*m11)) / 2.0
    }
}

impl Mul<Transform> for Transform {
    type Output = Transform;

    fn mul(self, other: Transform) -> Self::Output {
        self.matmul(other)
    }
}

/// Bounding box with sides directed along the axes
#[derive(Clone, Copy, PartialEq)]
pub struct BBox {
    /// Point with minimal x and y values
    min: Point,
    /// Point with maximum x and y values
    max: Point,
}

impl BBox {
    /// Construct bounding box which includes points `p0` and `p1`
    pub fn new(p0: impl Into<Point>, p1: impl Into<Point>) -> Self {
        let Point([x0, y0]) = p0.into();
        let Point([x1, y1]) = p1.into();
        let (x0, x1) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        let (y0, y1) = if y0 <= y1 { (y0, y1) } else { (y1, y0) };
        Self {
            min: Point([x0, y0]),
            max: Point([x1, y1]),
        }
    }

    /// Point with minimum values of x and y coordinates
    #[inline]
    pub fn min(&self) -> Point {
        self.min
    }

    /// Point with maximum values of x and y coordinates
    #[inline]
    pub fn max(&self) -> Point {
        self.max
    }

    /// `x` coordinate of the point with the minimal value
    #[inline]
    pub fn x(&self) -> Scalar {
        self.min.x()
    }

    /// `y` coordinate of the point with the minimal value
    #[inline]
    pub fn y(&self) -> Scalar {
        self.min.y()
    }

    /// Width of the bounding box
    #[inline]
    pub fn width(&self) -> Scalar {
        self.max.x() - self.min.x()
    }

    /// Height of the bounding box
    #[inline]
    pub fn height(&self) -> Scalar {
        self.max.y() - self.min.y()
    }

    /// Determine if the point is inside of the bounding box
    pub fn contains(&self, point: Point) -> bool {
        let Point([x, y]) = point;
        self.min.x() <= x && x <= self.max.x() && self.min.y() <= y && y <= self.max.y()
    }

    /// Extend bounding box so it would contain the provided point
    pub fn extend(&self, point: Point) -> Self {
        let Point([x, y]) = point;
        let Point([x0, y0]) = self.min;
        let Point([x1, y1]) = self.max;
        Self {
            min: Point([x0.min(x), y0.min(y)]),
            max: Point([x1.max(x), y1.max(y)]),
        }
    }

    /// Create bounding box that spans both bbox-es
    pub fn union(&self, other: BBox) -> Self {
        self.extend(other.min).extend(other.max)
    }

    pub fn union_opt(&self, other: Option<BBox>) -> Self {
        match other {
            Some(other) => self.union(other),
            None => *self,
        }
    }
}

impl fmt::Debug for BBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BBox x={} y={} w={} h={}",
            self.x(),
            self.y(),
            self.width(),
            self.height()
        )
    }
}

/// Evaluate a 1D cubic Bézier polynomial at `t`
pub(crate) fn bezier1d(t: f64, p0: f64, p1: f64, p2: f64, p3: f64) -> f64 {
    let it = 1.0 - t;
    it * it * it * p0 + 3.0 * it * it * t * p1 + 3.0 * it * t * t * p2 + t * t * t * p3
}

/// Tight bounding box of a single cubic Bézier segment
///
/// Starts from the end points and only inspects inflection roots when a
/// control point escapes the box, since the curve is bound by its control
/// points.
pub(crate) fn cubic_bounds(curve: &[Point; 4]) -> BBox {
    const EPS: f64 = 1e-12;

    let [v0, v1, v2, v3] = curve;
    let mut bounds = BBox::new(*v0, *v3);
    if bounds.contains(*v1) && bounds.contains(*v2) {
        return bounds;
    }

    // Add bezier curve inflection points in X and Y.
    for i in 0..2 {
        let p0 = v0.0[i] as f64;
        let p1 = v1.0[i] as f64;
        let p2 = v2.0[i] as f64;
        let p3 = v3.0[i] as f64;
        let a = -3.0 * p0 + 9.0 * p1 - 9.0 * p2 + 3.0 * p3;
        let b = 6.0 * p0 - 12.0 * p1 + 6.0 * p2;
        let c = 3.0 * p1 - 3.0 * p0;

        let mut roots = [0.0f64; 2];
        let mut count = 0;
        if a.abs() < EPS {
            if b.abs() > EPS {
                let t = -c / b;
                if t > EPS && t < 1.0 - EPS {
                    roots[count] = t;
                    count += 1;
                }
            }
        } else {
            let b2ac = b * b - 4.0 * c * a;
            if b2ac > EPS {
                for t in [(-b + b2ac.sqrt()) / (2.0 * a), (-b - b2ac.sqrt()) / (2.0 * a)] {
                    if t > EPS && t < 1.0 - EPS {
                        roots[count] = t;
                        count += 1;
                    }
                }
            }
        }
        for root in roots.iter().take(count) {
            let v = bezier1d(*root, p0, p1, p2, p3) as Scalar;
            // extend along the current axis only
            let mut point = bounds.min;
            point.0[i] = v;
            bounds = bounds.extend(point);
        }
    }
    bounds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_approx_eq;

    #[test]
    fn test_transform() {
        let tr = Transform::default()
            .translate(1.0, 2.0)
            .rotate(PI / 3.0)
            .scale(3.0, 2.0);
        let inv = tr.invert().unwrap();
        let p0 = Point::new(1.0, 1.0);

        let p1 = tr.apply(p0);
        let p2 = inv.apply(p1);
        assert_approx_eq!(p2.x(), 1.0, 1e-5);
        assert_approx_eq!(p2.y(), 1.0, 1e-5);
    }

    #[test]
    fn test_transform_order() {
        // transforms compose in document order, applied to points right to left
        let tr = Transform::default().translate(10.0, 0.0).scale(2.0, 2.0);
        let p = tr.apply(Point::new(1.0, 0.0));
        assert_approx_eq!(p.x(), 12.0);
        assert_approx_eq!(p.y(), 0.0);
    }

    #[test]
    fn test_rotate_around() {
        let tr = Transform::default().rotate_around(PI / 2.0, (1.0, 1.0));
        let p = tr.apply(Point::new(2.0, 1.0));
        assert_approx_eq!(p.x(), 1.0, 1e-6);
        assert_approx_eq!(p.y(), 2.0, 1e-6);
    }

    #[test]
    fn test_average_scale() {
        let tr = Transform::default().scale(2.0, 4.0);
        assert_approx_eq!(tr.average_scale(), 3.0);
        let tr = Transform::default().rotate(PI / 7.0).scale(2.0, 2.0);
        assert_approx_eq!(tr.average_scale(), 2.0, 1e-5);
    }

    #[test]
    fn test_cubic_bounds() {
        // control points inside the hull of end points
        let bounds = cubic_bounds(&[
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(2.0, 1.0),
            Point::new(3.0, 0.0),
        ]);
        assert_approx_eq!(bounds.x(), 0.0);
        assert_approx_eq!(bounds.width(), 3.0);
        // y extremum at t=0.5 is 3/4 of the control offset
        assert_approx_eq!(bounds.height(), 0.75, 1e-6);
    }

    #[test]
    fn test_bbox() {
        let bbox = BBox::new((2.0, 3.0), (1.0, 0.0));
        assert_approx_eq!(bbox.x(), 1.0);
        assert_approx_eq!(bbox.y(), 0.0);
        assert_approx_eq!(bbox.width(), 1.0);
        assert_approx_eq!(bbox.height(), 3.0);
        let bbox = bbox.extend(Point::new(5.0, -1.0));
        assert_approx_eq!(bbox.width(), 4.0);
        assert_approx_eq!(bbox.height(), 4.0);
    }
}
