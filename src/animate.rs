//! SMIL animation descriptors and the per-frame animation engine
//!
//! Every `<animate>`/`<animateTransform>` descriptor expands into one or more
//! [`Animate`] segments (one per consecutive pair of `values`). Each frame the
//! engine resets shapes to their parse-time baseline, picks the active
//! segment of every group, interpolates its values and composes them onto the
//! shape.
use crate::{
    bezier1d,
    image::{parse_opacity, Image, Paint, Shape, MAX_DASHES},
    scan::{parse_float, scan_args, scan_number},
    Rgba, Scalar, Transform, PI,
};

/// Maximum interpolated values per segment (dash array plus its count)
pub(crate) const MAX_ARGS: usize = 10;

/// Which attribute a segment animates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AnimateKind {
    TransformTranslate,
    TransformScale,
    TransformRotate,
    TransformSkewX,
    TransformSkewY,
    Opacity,
    Fill,
    FillOpacity,
    Stroke,
    StrokeOpacity,
    StrokeWidth,
    StrokeDashOffset,
    StrokeDashArray,
}

impl AnimateKind {
    pub fn is_transform(self) -> bool {
        matches!(
            self,
            AnimateKind::TransformTranslate
                | AnimateKind::TransformScale
                | AnimateKind::TransformRotate
                | AnimateKind::TransformSkewX
                | AnimateKind::TransformSkewY
        )
    }
}

/// Interpolation mode of a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum CalcMode {
    #[default]
    Linear,
    /// Hold the destination value for the whole window
    Discrete,
    /// Accepted and evaluated as linear
    Paced,
    /// Progress remapped through a cubic Bézier
    Spline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Additive {
    #[default]
    Replace,
    Sum,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum FillMode {
    #[default]
    Remove,
    Freeze,
}

/// One animation segment attached to a shape node
#[derive(Debug, Clone)]
pub(crate) struct Animate {
    pub begin: i64,
    /// Active end in milliseconds, `None` for no bound
    pub end: Option<i64>,
    pub dur: i64,
    /// Duration of the whole descriptor the segment came from
    pub group_dur: i64,
    /// `None` repeats without bound
    pub repeat_count: Option<i64>,
    pub src: [Scalar; MAX_ARGS],
    pub dst: [Scalar; MAX_ARGS],
    pub src_na: usize,
    pub dst_na: usize,
    pub spline: [Scalar; 4],
    pub kind: AnimateKind,
    pub calc_mode: CalcMode,
    pub additive: Additive,
    pub fill: FillMode,
    pub group_first: bool,
    pub group_last: bool,
}

/// Parse a SMIL clock value into milliseconds
///
/// Accepts `h:mm:ss.frac` as well as a number with an optional `h`, `min`,
/// `s` or `ms` suffix; a bare number counts as seconds.
pub(crate) fn parse_clock_value(s: &str) -> i64 {
    let mut millis: i64 = 0;
    let mut value: f64 = 0.0;
    let mut has_hours = false;
    let mut has_minutes = false;

    let mut rest = s;
    while !rest.is_empty() {
        let byte = rest.as_bytes()[0];
        if byte.is_ascii_digit() {
            let (token, tail) = scan_number(rest);
            value = parse_float(token) as f64;
            rest = tail;
        } else {
            if byte == b':' {
                rest = &rest[1..];
                if !has_hours {
                    millis += value as i64 * 60 * 60 * 1000;
                    has_hours = true;
                    continue;
                } else if !has_minutes {
                    millis += value as i64 * 60 * 1000;
                    has_minutes = true;
                    continue;
                }
            } else if rest.starts_with('h') {
                millis = (value * 60.0 * 60.0 * 1000.0) as i64;
            } else if rest.starts_with("min") {
                millis = (value * 60.0 * 1000.0) as i64;
            } else if rest.starts_with('s') {
                millis = (value * 1000.0) as i64;
            } else if rest.starts_with("ms") {
                millis = value as i64;
            } else {
                // break before resetting value
                break;
            }
            value = 0.0;
            break;
        }
    }

    // leftover value counts as seconds
    if value > 0.0 {
        millis += (value * 1000.0) as i64;
    }
    millis
}

/// Number of `;` separated entries in a `values`/`keyTimes`/`keySplines`
/// attribute
pub(crate) fn count_list_values(s: &str) -> usize {
    s.split(';')
        .filter(|entry| !entry.trim().is_empty())
        .count()
}

/// Parse a single `;`-separated animation value according to the animated
/// attribute. Returns interpolation slots and how many are meaningful.
pub(crate) fn parse_animate_value(
    image: &Image,
    kind: AnimateKind,
    s: &str,
) -> ([Scalar; MAX_ARGS], usize) {
    let mut args = [0.0 as Scalar; MAX_ARGS];
    let s = s.trim_start_matches(|c: char| c.is_ascii_whitespace());
    if s.is_empty() {
        return (args, 0);
    }

    let na = match kind {
        AnimateKind::TransformTranslate => {
            let na = scan_args(s, &mut args[..2], false).map_or(0, |(na, _)| na);
            if na == 1 {
                args[1] = 0.0;
            }
            2
        }
        AnimateKind::TransformScale => {
            let na = scan_args(s, &mut args[..2], false).map_or(0, |(na, _)| na);
            if na == 1 {
                args[1] = args[0];
            }
            2
        }
        AnimateKind::TransformRotate => scan_args(s, &mut args[..3], false).map_or(0, |(na, _)| na),
        AnimateKind::TransformSkewX | AnimateKind::TransformSkewY => {
            scan_args(s, &mut args[..1], false).map_or(0, |(na, _)| na)
        }
        AnimateKind::Opacity | AnimateKind::FillOpacity | AnimateKind::StrokeOpacity => {
            args[0] = parse_opacity(s);
            1
        }
        AnimateKind::Fill | AnimateKind::Stroke => {
            let color = Rgba::parse_lossy(s.trim_end());
            args[0] = color.red() as Scalar;
            args[1] = color.green() as Scalar;
            args[2] = color.blue() as Scalar;
            3
        }
        AnimateKind::StrokeWidth | AnimateKind::StrokeDashOffset => {
            args[0] = image.parse_coordinate(s, 0.0, image.actual_length());
            1
        }
        AnimateKind::StrokeDashArray => {
            let (dashes, count) = image.parse_dash_array(s);
            args[..count].copy_from_slice(&dashes[..count]);
            args[count] = count as Scalar;
            count + 1
        }
    };
    (args, na)
}

/// Parse one `keySplines` entry; anything but four control values collapses
/// to zeros.
pub(crate) fn parse_spline_value(s: &str) -> [Scalar; 4] {
    let mut spline = [0.0 as Scalar; 4];
    match scan_args(s, &mut spline, false) {
        Some((4, _)) => spline,
        _ => [0.0; 4],
    }
}

/// Build the 2x3 transform of a transform-animation segment
fn animate_transform(kind: AnimateKind, args: &[Scalar], na: usize) -> Transform {
    let deg = PI / 180.0;
    match kind {
        AnimateKind::TransformTranslate => Transform::default().translate(args[0], args[1]),
        AnimateKind::TransformScale => Transform::default().scale(args[0], args[1]),
        AnimateKind::TransformRotate => {
            if na > 1 {
                Transform::default().rotate_around(args[0] * deg, (args[1], args[2]))
            } else {
                Transform::default().rotate(args[0] * deg)
            }
        }
        AnimateKind::TransformSkewX => Transform::default().skew_x(args[0] * deg),
        AnimateKind::TransformSkewY => Transform::default().skew_y(args[0] * deg),
        _ => Transform::identity(),
    }
}

/// Replace or saturating-add the RGB channels of a color paint
fn apply_paint_color(paint: &mut Paint, args: &[Scalar], additive: Additive) {
    let color = match paint {
        Paint::Color(color) => color,
        _ => return,
    };
    let mut r = args[0] as i32 & 0xff;
    let mut g = args[1] as i32 & 0xff;
    let mut b = args[2] as i32 & 0xff;
    if additive == Additive::Sum {
        r = (r + color.red() as i32).min(0xff);
        g = (g + color.green() as i32).min(0xff);
        b = (b + color.blue() as i32).min(0xff);
    }
    *color = Rgba::new(r as u8, g as u8, b as u8, color.alpha());
}

/// Replace or saturating-add the alpha channel of a color paint
fn apply_paint_opacity(paint: &mut Paint, args: &[Scalar], additive: Additive) {
    let color = match paint {
        Paint::Color(color) => color,
        _ => return,
    };
    let mut a = (args[0] * 255.0) as i32 & 0xff;
    if additive == Additive::Sum {
        a = (a + color.alpha() as i32).min(0xff);
    }
    *color = color.with_alpha(a as u8);
}

fn apply_value(value: &mut Scalar, arg: Scalar, additive: Additive) {
    if additive == Additive::Sum {
        *value += arg;
    } else {
        *value = arg;
    }
}

/// Evaluate one node's animation list against a shape at `time_ms`
///
/// A group is the run of segments between the group-first and group-last
/// flags; at most one segment per group applies per frame. An ended segment
/// only applies when it is the last of its group and frozen.
pub(crate) fn apply_group(shape: &mut Shape, animates: &[Animate], time_ms: i64) -> bool {
    let mut applied = false;
    let mut group_has_animate = false;

    for animate in animates {
        if animate.group_first {
            group_has_animate = false;
        }
        if group_has_animate {
            continue;
        }

        // wrap time into the group window
        let relative_time = (time_ms - animate.begin) % animate.group_dur + animate.begin;
        if relative_time < animate.begin {
            continue;
        }
        let mut ended = relative_time >= animate.begin + animate.dur;
        if let Some(end) = animate.end {
            if time_ms >= end {
                ended = true;
            }
        }
        if let Some(count) = animate.repeat_count {
            if (time_ms - animate.begin) / animate.group_dur + 1 > count {
                ended = true;
            }
        }
        if ended && !(animate.group_last && animate.fill == FillMode::Freeze) {
            continue;
        }
        group_has_animate = true;

        // relative progression, held at the destination once ended
        let mut progression: Scalar = 1.0;
        if !ended {
            if animate.calc_mode != CalcMode::Discrete {
                progression = (relative_time - animate.begin) as Scalar / animate.dur as Scalar;
            }
            if animate.calc_mode == CalcMode::Spline {
                let [s0x, s0y, s1x, s1y] = animate.spline;
                // time curve first, then the value curve
                let time = bezier1d(progression as f64, 0.0, s0x as f64, s1x as f64, 1.0);
                progression = bezier1d(time, 0.0, s0y as f64, s1y as f64, 1.0) as Scalar;
            }
        }

        let mut args = [0.0 as Scalar; MAX_ARGS];
        for (slot, (src, dst)) in args.iter_mut().zip(animate.src.iter().zip(&animate.dst)) {
            *slot = src + (dst - src) * progression;
        }

        let mut scale_stroke = false;
        if animate.kind.is_transform() {
            let na = animate.src_na.max(animate.dst_na);
            let tr = animate_transform(animate.kind, &args, na);
            if animate.additive == Additive::Replace {
                shape.xform = Transform::identity();
            }
            shape.xform = shape.xform * tr;
            scale_stroke = true;

            for path in shape.paths.iter_mut() {
                let mut path_xform = path.transform();
                if animate.additive == Additive::Replace {
                    path_xform = Transform::identity();
                }
                path.set_transform(path_xform * tr);
                path.retransform();
            }
        } else {
            match animate.kind {
                AnimateKind::Fill => apply_paint_color(&mut shape.fill, &args, animate.additive),
                AnimateKind::Stroke => {
                    apply_paint_color(&mut shape.stroke, &args, animate.additive)
                }
                AnimateKind::Opacity => {
                    // additive opacity is always replaced, see DESIGN notes
                    shape.opacity = args[0].min(1.0);
                }
                AnimateKind::FillOpacity => {
                    apply_paint_opacity(&mut shape.fill, &args, animate.additive)
                }
                AnimateKind::StrokeOpacity => {
                    apply_paint_opacity(&mut shape.stroke, &args, animate.additive)
                }
                AnimateKind::StrokeWidth => {
                    apply_value(&mut shape.stroke_width, args[0], animate.additive)
                }
                AnimateKind::StrokeDashOffset => {
                    apply_value(&mut shape.stroke_dash_offset, args[0], animate.additive);
                    scale_stroke = true;
                }
                AnimateKind::StrokeDashArray => {
                    if animate.dst_na > 0 {
                        let count = animate.dst_na - 1;
                        if animate.src_na != animate.dst_na {
                            shape.stroke_dash_array[..count]
                                .copy_from_slice(&animate.dst[..count]);
                        } else {
                            shape.stroke_dash_array[..count].copy_from_slice(&args[..count]);
                        }
                        shape.stroke_dash_count =
                            (args[animate.dst_na - 1] as usize).min(MAX_DASHES);
                    }
                }
                _ => {}
            }
        }

        if scale_stroke {
            let scale = shape.xform.average_scale();
            shape.scale_stroke_by(scale);
        }
        applied = true;
    }
    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_approx_eq;

    #[test]
    fn test_clock_values() {
        assert_eq!(parse_clock_value("2s"), 2000);
        assert_eq!(parse_clock_value("0.5s"), 500);
        assert_eq!(parse_clock_value("250ms"), 250);
        assert_eq!(parse_clock_value("2min"), 120_000);
        assert_eq!(parse_clock_value("1h"), 3_600_000);
        // bare numbers are seconds
        assert_eq!(parse_clock_value("3"), 3000);
        assert_eq!(parse_clock_value("1:30:05.5"), 3600_000 + 30 * 60_000 + 5500);
        assert_eq!(parse_clock_value("0"), 0);
    }

    #[test]
    fn test_count_list_values() {
        assert_eq!(count_list_values("0;5;0"), 3);
        assert_eq!(count_list_values(" 0 ; 5 "), 2);
        assert_eq!(count_list_values(""), 0);
    }

    #[test]
    fn test_spline_value() {
        let spline = parse_spline_value("0.25 0.1 0.25 1");
        assert_approx_eq!(spline[0], 0.25);
        assert_approx_eq!(spline[3], 1.0);
        // wrong arity collapses to zeros
        assert_eq!(parse_spline_value("1 2 3"), [0.0; 4]);
    }

    #[test]
    fn test_animate_transform_rotate() {
        let tr = animate_transform(AnimateKind::TransformRotate, &[90.0, 1.0, 1.0], 3);
        let p = tr.apply(crate::Point::new(2.0, 1.0));
        assert_approx_eq!(p.x(), 1.0, 1e-5);
        assert_approx_eq!(p.y(), 2.0, 1e-5);
    }

    #[test]
    fn test_paint_color_sum_saturates() {
        let mut paint = Paint::Color(Rgba::rgb(200, 10, 0));
        apply_paint_color(&mut paint, &[100.0, 5.0, 7.0], Additive::Sum);
        assert_eq!(paint.color().unwrap(), Rgba::rgb(255, 15, 7));
        // gradients are left alone
        let mut paint = Paint::None;
        apply_paint_color(&mut paint, &[1.0, 2.0, 3.0], Additive::Replace);
        assert_eq!(paint, Paint::None);
    }
}
