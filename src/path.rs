//! Cubic-Bézier path storage and the SVG path-data interpreter
//!
//! Every path is stored as a flat list of `1 + 3N` control points describing
//! `N` cubic segments. Lines and quadratic curves are lowered to cubics while
//! path data is interpreted, elliptic arcs are approximated by up to one
//! cubic per 90° of sweep.
use crate::{
    cubic_bounds,
    scan::{next_arc_flag, next_item, parse_float},
    utils::clamp,
    BBox, Point, Scalar, SvgParseError, Transform, PI,
};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Length proportional to radius of a cubic bezier handle for 90deg arcs.
pub const KAPPA90: Scalar = 0.5522847493;

/// The algorithm to use to determine the inside part of a shape, when filling it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FillRule {
    /// Fill area with non-zero winding number
    #[default]
    NonZero,
    /// Fill area with odd winding number
    EvenOdd,
}

impl FromStr for FillRule {
    type Err = SvgParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nonzero" => Ok(FillRule::NonZero),
            "evenodd" => Ok(FillRule::EvenOdd),
            _ => Err(SvgParseError::InvalidFillRule),
        }
    }
}

impl fmt::Display for FillRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillRule::NonZero => "nonzero".fmt(f),
            FillRule::EvenOdd => "evenodd".fmt(f),
        }
    }
}

/// `LineCap` specifies the shape to be used at the end of open sub-paths when
/// they are stroked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LineCap {
    /// Cut the stroke at the segment end
    #[default]
    Butt,
    /// Add half-circle to the end of the segments
    Round,
    /// Add half-square to the end of the segments
    Square,
}

impl FromStr for LineCap {
    type Err = SvgParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "butt" => Ok(LineCap::Butt),
            "round" => Ok(LineCap::Round),
            "square" => Ok(LineCap::Square),
            _ => Err(SvgParseError::InvalidLineCap),
        }
    }
}

/// `LineJoin` defines the shape to be used at the corners of paths when they
/// are stroked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LineJoin {
    /// Continue path segments with lines until they intersect
    #[default]
    Miter,
    /// Round corner is to be used to join path segments
    Round,
    /// Connect path segments with straight line
    Bevel,
}

impl FromStr for LineJoin {
    type Err = SvgParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "miter" => Ok(LineJoin::Miter),
            "round" => Ok(LineJoin::Round),
            "bevel" => Ok(LineJoin::Bevel),
            _ => Err(SvgParseError::InvalidLineJoin),
        }
    }
}

/// Single sub-path made of cubic Bézier segments
///
/// Live points are always the parse-time baseline points pushed through the
/// live transform, so animation can rebuild them from a fixed origin every
/// frame.
#[derive(Clone, PartialEq)]
pub struct Path {
    pts: Vec<Point>,
    closed: bool,
    xform: Transform,
    bounds: BBox,
    orig_pts: Vec<Point>,
    orig_xform: Transform,
    scaled: bool,
}

impl Path {
    pub(crate) fn new(pts: Vec<Point>, closed: bool, xform: Transform) -> Self {
        debug_assert!(pts.len() >= 4 && (pts.len() - 1) % 3 == 0);
        let orig_pts = pts.clone();
        let mut path = Self {
            pts,
            closed,
            xform,
            bounds: BBox::new(Point::default(), Point::default()),
            orig_pts,
            orig_xform: xform,
            scaled: false,
        };
        path.retransform();
        path
    }

    /// Control points `x0,y0, [cpx1,cpy1, cpx2,cpy2, x1,y1], ...`
    pub fn points(&self) -> &[Point] {
        &self.pts
    }

    /// Iterator over cubic segments as `[P0, P1, P2, P3]` quadruples
    pub fn cubics(&self) -> impl Iterator<Item = [Point; 4]> + '_ {
        self.pts
            .windows(4)
            .step_by(3)
            .map(|w| [w[0], w[1], w[2], w[3]])
    }

    /// Whether the sub-path should be treated as closed when filling
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Tight bounding box of the live points
    pub fn bounds(&self) -> BBox {
        self.bounds
    }

    /// Live path transform
    pub fn transform(&self) -> Transform {
        self.xform
    }

    pub(crate) fn set_transform(&mut self, xform: Transform) {
        self.xform = xform;
    }

    pub(crate) fn orig_xform(&self) -> Transform {
        self.orig_xform
    }

    /// Rebuild live points from the baseline through the live transform and
    /// recompute bounds.
    pub(crate) fn retransform(&mut self) {
        for (dst, src) in self.pts.iter_mut().zip(self.orig_pts.iter()) {
            *dst = self.xform.apply(*src);
        }
        self.bounds = self
            .cubics()
            .fold(None, |bounds, curve| {
                Some(cubic_bounds(&curve).union_opt(bounds))
            })
            .expect("Path is never empty");
        self.scaled = false;
    }

    /// Scale live points and bounds into viewBox space, `(p + t) * s`
    pub(crate) fn apply_view_scale(&mut self, tx: Scalar, ty: Scalar, sx: Scalar, sy: Scalar) {
        self.bounds = BBox::new(
            Point::new((self.bounds.x() + tx) * sx, (self.bounds.y() + ty) * sy),
            Point::new(
                (self.bounds.max().x() + tx) * sx,
                (self.bounds.max().y() + ty) * sy,
            ),
        );
        if !self.scaled {
            for pt in self.pts.iter_mut() {
                *pt = Point::new((pt.x() + tx) * sx, (pt.y() + ty) * sy);
            }
            self.scaled = true;
        }
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Path[{} pts", self.pts.len())?;
        if self.closed {
            write!(f, ", closed")?;
        }
        write!(f, ", {:?}]", self.bounds)
    }
}

/// Accumulates the flat point representation of one sub-path
#[derive(Debug, Default)]
pub(crate) struct PathSink {
    pts: Vec<Point>,
}

impl PathSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.pts.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.pts.is_empty()
    }

    pub fn first(&self) -> Option<Point> {
        self.pts.first().copied()
    }

    /// Start a sub-path, replacing a previous trailing point
    pub fn move_to(&mut self, p: Point) {
        match self.pts.last_mut() {
            Some(last) => *last = p,
            None => self.pts.push(p),
        }
    }

    /// Straight line lowered to a cubic with control points at 1/3 and 2/3
    pub fn line_to(&mut self, p: Point) {
        let p0 = match self.pts.last() {
            Some(p0) => *p0,
            None => return,
        };
        if p0.is_close_to(p) {
            return;
        }
        let d = p - p0;
        self.pts.push(p0 + d / 3.0);
        self.pts.push(p - d / 3.0);
        self.pts.push(p);
    }

    pub fn cubic_to(&mut self, p1: Point, p2: Point, p3: Point) {
        if self.pts.is_empty() {
            return;
        }
        self.pts.push(p1);
        self.pts.push(p2);
        self.pts.push(p3);
    }

    /// Commit the accumulated points as one Path
    ///
    /// Closed sub-paths get an implicit line back to the starting point.
    /// Degenerate accumulations (fewer than one full segment, or a broken
    /// point count) are dropped.
    pub fn commit(&mut self, closed: bool, xform: Transform) -> Option<Path> {
        if self.pts.len() < 4 {
            return None;
        }
        if closed {
            let first = self.pts[0];
            self.line_to(first);
        }
        let pts = std::mem::take(&mut self.pts);
        if (pts.len() - 1) % 3 != 0 {
            return None;
        }
        Some(Path::new(pts, closed, xform))
    }
}

fn args_per_command(cmd: u8) -> Option<usize> {
    match cmd {
        b'v' | b'V' | b'h' | b'H' => Some(1),
        b'm' | b'M' | b'l' | b'L' | b't' | b'T' => Some(2),
        b'q' | b'Q' | b's' | b'S' => Some(4),
        b'c' | b'C' => Some(6),
        b'a' | b'A' => Some(7),
        b'z' | b'Z' => Some(0),
        _ => None,
    }
}

fn is_coordinate(item: &str) -> bool {
    let bytes = item.as_bytes();
    let first = match bytes.first() {
        Some(first) => *first,
        None => return false,
    };
    let rest = if matches!(first, b'-' | b'+') {
        bytes.get(1)
    } else {
        bytes.first()
    };
    matches!(rest, Some(b'.')) || matches!(rest, Some(b) if b.is_ascii_digit())
}

/// Angle from vector `u` to vector `v`, signed by their cross product
fn vec_angle(ux: Scalar, uy: Scalar, vx: Scalar, vy: Scalar) -> Scalar {
    let r = clamp((ux * vx + uy * vy) / (ux.hypot(uy) * vx.hypot(vy)), -1.0, 1.0);
    if ux * vy < uy * vx { -r.acos() } else { r.acos() }
}

/// Lower an elliptic arc command to cubic segments
///
/// Center parameterization per the SVG implementation notes (F.6), split into
/// at most 90° spans. Degenerate radii or a degenerate chord emit a straight
/// line.
fn arc_to(sink: &mut PathSink, cp: Point, args: &[Scalar], rel: bool) -> Point {
    let mut rx = args[0].abs();
    let mut ry = args[1].abs();
    let rotx = args[2] / 180.0 * PI;
    let large = args[3].abs() > 1e-6;
    let sweep = args[4].abs() > 1e-6;
    let p1 = cp;
    let p2 = if rel {
        cp + Point::new(args[5], args[6])
    } else {
        Point::new(args[5], args[6])
    };

    let d = p1 - p2;
    if d.length() < 1e-6 || rx < 1e-6 || ry < 1e-6 {
        // The arc degenerates to a line
        sink.line_to(p2);
        return p2;
    }

    let (sinrx, cosrx) = rotx.sin_cos();

    // Convert to center point parameterization.
    // 1) Compute x1', y1'
    let x1p = cosrx * d.x() / 2.0 + sinrx * d.y() / 2.0;
    let y1p = -sinrx * d.x() / 2.0 + cosrx * d.y() / 2.0;
    let prime = (x1p / rx).powi(2) + (y1p / ry).powi(2);
    if prime > 1.0 {
        let prime = prime.sqrt();
        rx *= prime;
        ry *= prime;
    }
    // 2) Compute cx', cy'
    let sa = (rx * ry).powi(2) - (rx * y1p).powi(2) - (ry * x1p).powi(2);
    let sb = (rx * y1p).powi(2) + (ry * x1p).powi(2);
    let mut s = if sb > 0.0 { (sa.max(0.0) / sb).sqrt() } else { 0.0 };
    if large == sweep {
        s = -s;
    }
    let cxp = s * rx * y1p / ry;
    let cyp = s * -ry * x1p / rx;
    // 3) Compute cx, cy from cx', cy'
    let cx = (p1.x() + p2.x()) / 2.0 + cosrx * cxp - sinrx * cyp;
    let cy = (p1.y() + p2.y()) / 2.0 + sinrx * cxp + cosrx * cyp;
    // 4) Calculate theta1 and delta theta
    let ux = (x1p - cxp) / rx;
    let uy = (y1p - cyp) / ry;
    let vx = (-x1p - cxp) / rx;
    let vy = (-y1p - cyp) / ry;
    let a1 = vec_angle(1.0, 0.0, ux, uy);
    let mut da = vec_angle(ux, uy, vx, vy);

    if !sweep && da > 0.0 {
        da -= 2.0 * PI;
    } else if sweep && da < 0.0 {
        da += 2.0 * PI;
    }

    // Approximate the arc using cubic spline segments.
    let t = Transform::default().translate(cx, cy).rotate(rotx);

    // Split arc into max 90 degree segments.
    let ndivs = (da.abs() / (PI * 0.5) + 1.0) as i32;
    let mut hda = (da / ndivs as Scalar) / 2.0;
    // avoid cotangent blow up around zero
    if hda.abs() < 1e-3 {
        hda *= 0.5;
    } else {
        hda = (1.0 - hda.cos()) / hda.sin();
    }
    let mut kappa = (4.0 / 3.0 * hda).abs();
    if da < 0.0 {
        kappa = -kappa;
    }

    let mut prev = Point::default();
    let mut prev_tan = Point::default();
    for i in 0..=ndivs {
        let a = a1 + da * (i as Scalar / ndivs as Scalar);
        let (dy, dx) = a.sin_cos();
        let pos = t.apply(Point::new(dx * rx, dy * ry));
        let tan = t.apply_vec(Point::new(-dy * rx * kappa, dx * ry * kappa));
        if i > 0 {
            sink.cubic_to(prev + prev_tan, pos - tan, pos);
        }
        prev = pos;
        prev_tan = tan;
    }

    p2
}

/// Interpret an SVG path-data string into a list of sub-paths
///
/// Malformed tokens are skipped and parsing continues, matching what lenient
/// viewers do. Commands before the initial `M`/`m` are ignored.
pub(crate) fn parse_path_data(d: &str, xform: Transform) -> Vec<Path> {
    let mut paths = Vec::new();
    let mut sink = PathSink::new();

    let mut cmd = 0u8;
    let mut args = [0.0 as Scalar; 10];
    let mut nargs = 0usize;
    let mut rargs = 0usize;
    let mut cp = Point::default();
    // reflected control point of the previous C/S/Q/T command
    let mut cp2 = Point::default();
    let mut init_point = false;
    let mut closed = false;

    let mut rest = d;
    loop {
        // arc flags are bare characters, the generic scanner would misread
        // them as the start of the next number
        let item = if matches!(cmd, b'a' | b'A') && (nargs == 3 || nargs == 4) {
            let (flag, tail) = next_arc_flag(rest);
            rest = tail;
            match flag {
                Some('0') => Some("0"),
                Some('1') => Some("1"),
                _ => None,
            }
        } else {
            None
        };
        let item = match item {
            Some(item) => item,
            None => {
                let (item, tail) = next_item(rest);
                rest = tail;
                match item {
                    Some(item) => item,
                    None => break,
                }
            }
        };

        if cmd != 0 && is_coordinate(item) {
            if nargs < 10 {
                args[nargs] = parse_float(item);
                nargs += 1;
            }
            if nargs >= rargs {
                let rel = cmd.is_ascii_lowercase();
                match cmd {
                    b'm' | b'M' => {
                        cp = if rel {
                            cp + Point::new(args[0], args[1])
                        } else {
                            Point::new(args[0], args[1])
                        };
                        sink.move_to(cp);
                        // moveTo can be followed by multiple coordinate
                        // pairs, which are treated as lineTo
                        cmd = if rel { b'l' } else { b'L' };
                        rargs = 2;
                        cp2 = cp;
                        init_point = true;
                    }
                    b'l' | b'L' => {
                        cp = if rel {
                            cp + Point::new(args[0], args[1])
                        } else {
                            Point::new(args[0], args[1])
                        };
                        sink.line_to(cp);
                        cp2 = cp;
                    }
                    b'h' | b'H' => {
                        cp = Point::new(if rel { cp.x() + args[0] } else { args[0] }, cp.y());
                        sink.line_to(cp);
                        cp2 = cp;
                    }
                    b'v' | b'V' => {
                        cp = Point::new(cp.x(), if rel { cp.y() + args[0] } else { args[0] });
                        sink.line_to(cp);
                        cp2 = cp;
                    }
                    b'c' | b'C' => {
                        let offset = if rel { cp } else { Point::default() };
                        let p1 = offset + Point::new(args[0], args[1]);
                        let p2 = offset + Point::new(args[2], args[3]);
                        let p3 = offset + Point::new(args[4], args[5]);
                        sink.cubic_to(p1, p2, p3);
                        cp2 = p2;
                        cp = p3;
                    }
                    b's' | b'S' => {
                        let offset = if rel { cp } else { Point::default() };
                        let p1 = 2.0 * cp - cp2;
                        let p2 = offset + Point::new(args[0], args[1]);
                        let p3 = offset + Point::new(args[2], args[3]);
                        sink.cubic_to(p1, p2, p3);
                        cp2 = p2;
                        cp = p3;
                    }
                    b'q' | b'Q' => {
                        let offset = if rel { cp } else { Point::default() };
                        let ctrl = offset + Point::new(args[0], args[1]);
                        let p3 = offset + Point::new(args[2], args[3]);
                        let (p1, p2) = quad_to_cubic(cp, ctrl, p3);
                        sink.cubic_to(p1, p2, p3);
                        cp2 = ctrl;
                        cp = p3;
                    }
                    b't' | b'T' => {
                        let offset = if rel { cp } else { Point::default() };
                        let ctrl = 2.0 * cp - cp2;
                        let p3 = offset + Point::new(args[0], args[1]);
                        let (p1, p2) = quad_to_cubic(cp, ctrl, p3);
                        sink.cubic_to(p1, p2, p3);
                        cp2 = ctrl;
                        cp = p3;
                    }
                    b'a' | b'A' => {
                        cp = arc_to(&mut sink, cp, &args, rel);
                        cp2 = cp;
                    }
                    _ => {
                        if nargs >= 2 {
                            cp = Point::new(args[nargs - 2], args[nargs - 1]);
                            cp2 = cp;
                        }
                    }
                }
                nargs = 0;
            }
        } else {
            cmd = item.as_bytes()[0];
            if matches!(cmd, b'M' | b'm') {
                // commit path
                if !sink.is_empty() {
                    paths.extend(sink.commit(closed, xform));
                }
                // start new sub-path
                sink.reset();
                closed = false;
                nargs = 0;
            } else if !init_point {
                // no other commands until the initial point is set
                cmd = 0;
            }
            if matches!(cmd, b'Z' | b'z') {
                closed = true;
                // commit path
                if !sink.is_empty() {
                    // move current point to first point
                    cp = sink.first().expect("checked non-empty");
                    cp2 = cp;
                    paths.extend(sink.commit(closed, xform));
                }
                // start new sub-path
                sink.reset();
                sink.move_to(cp);
                closed = false;
                nargs = 0;
            }
            match args_per_command(cmd) {
                Some(required) => rargs = required,
                None => {
                    // command not recognized
                    cmd = 0;
                    rargs = 0;
                }
            }
        }
    }
    // commit path
    if !sink.is_empty() {
        paths.extend(sink.commit(closed, xform));
    }

    paths
}

/// Raise a quadratic Bézier control point to the two cubic control points
fn quad_to_cubic(p0: Point, ctrl: Point, p3: Point) -> (Point, Point) {
    let p1 = p0 + (2.0 / 3.0) * (ctrl - p0);
    let p2 = p3 + (2.0 / 3.0) * (ctrl - p3);
    (p1, p2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_approx_eq;

    fn parse(d: &str) -> Vec<Path> {
        parse_path_data(d, Transform::identity())
    }

    #[test]
    fn test_point_count_invariant() {
        for d in [
            "M0 0 L10 0 L10 10 Z",
            "M0 0 C1 1 2 2 3 3 S4 4 5 5",
            "M0 0 Q5 10 10 0 T20 0",
            "M0 0 A5 5 0 0 1 10 0",
            "M.5-3-11-.11",
        ] {
            for path in parse(d) {
                assert!(path.points().len() >= 4);
                assert_eq!((path.points().len() - 1) % 3, 0, "in {:?}", d);
            }
        }
    }

    #[test]
    fn test_lines_and_close() {
        let paths = parse("M0 0 L10 0 L10 10 L0 10 Z");
        assert_eq!(paths.len(), 1);
        let path = &paths[0];
        assert!(path.is_closed());
        // 4 explicit points, closing line adds one segment
        assert_eq!(path.points().len(), 13);
        let bounds = path.bounds();
        assert_approx_eq!(bounds.x(), 0.0);
        assert_approx_eq!(bounds.width(), 10.0);
        assert_approx_eq!(bounds.height(), 10.0);
    }

    #[test]
    fn test_implicit_lineto_and_relative() {
        let reference = parse("M0.5 -3 L-11 -0.11");
        // not separated scalars, implicit line segment
        let p1 = parse("M.5-3-11-.11");
        // other spaces, implicit relative line segment
        let p2 = parse(" m.5,-3 -11.5\n2.89 ");
        for p in [&p1, &p2] {
            assert_eq!(p.len(), 1);
            for (a, b) in reference[0].points().iter().zip(p[0].points()) {
                assert!(a.is_close_to(*b), "{:?} != {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_commands_before_moveto_ignored() {
        assert!(parse("L10 10 L20 20").is_empty());
        // junk command letters are skipped
        assert_eq!(parse("M0 0 X L10 0").len(), 1);
    }

    #[test]
    fn test_smooth_reflection() {
        let paths = parse("M0 0 C0 10 10 10 10 0 S20 -10 20 0");
        let pts = paths[0].points();
        assert_eq!(pts.len(), 7);
        // reflected control point of (10, 10) around (10, 0)
        assert!(pts[4].is_close_to(Point::new(10.0, -10.0)));
    }

    #[test]
    fn test_arc_endpoint_exactness() {
        for d in [
            "M0 0 A10 10 0 0 1 20 0",
            "M0 0 A10 5 30 1 0 7 3",
            "M5 5 a4 8 -20 0 1 3 9",
        ] {
            let paths = parse(d);
            assert_eq!(paths.len(), 1);
            let last = *paths[0].points().last().unwrap();
            let first = paths[0].points()[0];
            let (end, start) = match d {
                "M0 0 A10 10 0 0 1 20 0" => (Point::new(20.0, 0.0), Point::new(0.0, 0.0)),
                "M0 0 A10 5 30 1 0 7 3" => (Point::new(7.0, 3.0), Point::new(0.0, 0.0)),
                _ => (Point::new(8.0, 14.0), Point::new(5.0, 5.0)),
            };
            assert!(start.is_close_to(first));
            assert_approx_eq!(last.x(), end.x(), 1e-4);
            assert_approx_eq!(last.y(), end.y(), 1e-4);
        }
    }

    #[test]
    fn test_arc_degenerate() {
        // zero radii degenerate to a single straight segment
        let paths = parse("M0 0 A 0 0 0 0 0 10 10");
        assert_eq!(paths.len(), 1);
        let path = &paths[0];
        assert_eq!(path.points().len(), 4);
        assert!(path.points()[3].is_close_to(Point::new(10.0, 10.0)));
        // control points sit on the line
        assert!(path.points()[1].is_close_to(Point::new(10.0 / 3.0, 10.0 / 3.0)));
    }

    #[test]
    fn test_arc_flags_without_separators() {
        let paths = parse("M0 0 A10 10 0 0110 0");
        assert_eq!(paths.len(), 1);
        let last = *paths[0].points().last().unwrap();
        assert_approx_eq!(last.x(), 10.0, 1e-4);
        assert_approx_eq!(last.y(), 0.0, 1e-4);
    }

    #[test]
    fn test_multiple_subpaths() {
        let paths = parse("M0 0 L1 0 L1 1 Z M5 5 L6 5");
        assert_eq!(paths.len(), 2);
        assert!(paths[0].is_closed());
        assert!(!paths[1].is_closed());
    }

    #[test]
    fn test_retransform_round_trip() {
        let mut paths = parse("M0 0 C1 2 3 4 5 6");
        let path = &mut paths[0];
        let before: Vec<Point> = path.points().to_vec();
        path.set_transform(Transform::default().translate(10.0, 0.0));
        path.retransform();
        assert_approx_eq!(path.points()[0].x(), 10.0);
        path.set_transform(path.orig_xform());
        path.retransform();
        for (a, b) in before.iter().zip(path.points()) {
            assert!(a.is_close_to(*b));
        }
    }
}
