//! Gradient stops, resolved gradients and parse-time gradient definitions
use crate::{scan::Coordinate, Rgba, Scalar, SvgParseError, Transform};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How a gradient behaves outside of its `[0, 1]` span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SpreadMethod {
    #[default]
    Pad,
    Reflect,
    Repeat,
}

impl FromStr for SpreadMethod {
    type Err = SvgParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pad" => Ok(SpreadMethod::Pad),
            "reflect" => Ok(SpreadMethod::Reflect),
            "repeat" => Ok(SpreadMethod::Repeat),
            _ => Err(SvgParseError::InvalidSpreadMethod),
        }
    }
}

/// Coordinate system of the gradient geometry attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GradientUnits {
    UserSpaceOnUse,
    /// Geometry is relative to the bounding box of the painted shape
    #[default]
    ObjectBoundingBox,
}

/// A `(offset, color)` sample along a gradient
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub offset: Scalar,
    pub color: Rgba,
}

/// Index of a resolved gradient inside its image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GradientId(pub(crate) usize);

/// A fully resolved gradient as consumed by the rasterizer
///
/// The live transform maps shader space back to object space (it is the
/// inverse of the composed gradient-local, shape and viewBox transforms); the
/// baseline keeps the uninverted pre-viewBox composition so the viewBox pass
/// can be re-run from a fixed origin after every animation frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    spread: SpreadMethod,
    stops: Vec<GradientStop>,
    xform: Transform,
    orig_xform: Transform,
    focal_x: Scalar,
    focal_y: Scalar,
}

impl Gradient {
    pub(crate) fn new(
        spread: SpreadMethod,
        stops: Vec<GradientStop>,
        xform: Transform,
        focal_x: Scalar,
        focal_y: Scalar,
    ) -> Self {
        Self {
            spread,
            stops,
            xform,
            orig_xform: xform,
            focal_x,
            focal_y,
        }
    }

    pub fn spread(&self) -> SpreadMethod {
        self.spread
    }

    /// Stops sorted ascending by offset
    pub fn stops(&self) -> &[GradientStop] {
        &self.stops
    }

    /// Shader-space to object-space transform
    pub fn transform(&self) -> Transform {
        self.xform
    }

    /// Focal point normalized by the radius (radial gradients only)
    pub fn focal(&self) -> (Scalar, Scalar) {
        (self.focal_x, self.focal_y)
    }

    /// Recompose the live transform from the baseline for the given viewBox
    /// translation and scale, storing the inverse for the rasterizer.
    pub(crate) fn rescale(&mut self, tx: Scalar, ty: Scalar, sx: Scalar, sy: Scalar) {
        let composed = Transform::default().scale(sx, sy).translate(tx, ty) * self.orig_xform;
        self.xform = composed.invert().unwrap_or_default();
    }
}

/// Unresolved geometry of a gradient definition
#[derive(Debug, Clone)]
pub(crate) enum GradientGeometry {
    Linear {
        x1: Coordinate,
        y1: Coordinate,
        x2: Coordinate,
        y2: Coordinate,
    },
    Radial {
        cx: Coordinate,
        cy: Coordinate,
        r: Coordinate,
        fx: Coordinate,
        fy: Coordinate,
    },
}

/// Parse-time `<linearGradient>`/`<radialGradient>` definition, resolved into
/// a [`Gradient`] once the whole document is known.
#[derive(Debug, Clone)]
pub(crate) struct GradientData {
    pub id: Option<String>,
    pub href: Option<String>,
    pub geometry: GradientGeometry,
    pub spread: SpreadMethod,
    pub units: GradientUnits,
    pub xform: Transform,
    pub stops: Vec<GradientStop>,
}

impl GradientData {
    pub fn linear() -> Self {
        use crate::scan::Units::Percent;
        Self::new(GradientGeometry::Linear {
            x1: Coordinate::new(0.0, Percent),
            y1: Coordinate::new(0.0, Percent),
            x2: Coordinate::new(100.0, Percent),
            y2: Coordinate::new(0.0, Percent),
        })
    }

    pub fn radial() -> Self {
        use crate::scan::Units::Percent;
        Self::new(GradientGeometry::Radial {
            cx: Coordinate::new(50.0, Percent),
            cy: Coordinate::new(50.0, Percent),
            r: Coordinate::new(50.0, Percent),
            fx: Coordinate::default(),
            fy: Coordinate::default(),
        })
    }

    fn new(geometry: GradientGeometry) -> Self {
        Self {
            id: None,
            href: None,
            geometry,
            spread: SpreadMethod::default(),
            units: GradientUnits::default(),
            xform: Transform::identity(),
            stops: Vec::new(),
        }
    }

    /// Insert a stop keeping the list sorted ascending by offset
    pub fn add_stop(&mut self, stop: GradientStop) {
        let index = self
            .stops
            .iter()
            .position(|other| stop.offset < other.offset)
            .unwrap_or(self.stops.len());
        self.stops.insert(index, stop);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_approx_eq;

    #[test]
    fn test_stop_insertion_keeps_order() {
        let mut data = GradientData::linear();
        for offset in [0.5, 0.0, 1.0, 0.25, 0.5] {
            data.add_stop(GradientStop {
                offset,
                color: Rgba::rgb(0, 0, 0),
            });
        }
        let offsets: Vec<Scalar> = data.stops.iter().map(|s| s.offset).collect();
        for pair in offsets.windows(2) {
            assert!(pair[0] <= pair[1], "stops out of order: {:?}", offsets);
        }
    }

    #[test]
    fn test_rescale_is_idempotent() {
        let axis = Transform::default().translate(3.0, 4.0).scale(2.0, 2.0);
        let mut gradient = Gradient::new(SpreadMethod::Pad, Vec::new(), axis, 0.0, 0.0);
        gradient.rescale(1.0, 2.0, 3.0, 4.0);
        let first = gradient.transform();
        gradient.rescale(1.0, 2.0, 3.0, 4.0);
        assert_eq!(first, gradient.transform());
    }

    #[test]
    fn test_rescale_inverts() {
        let mut gradient =
            Gradient::new(SpreadMethod::Pad, Vec::new(), Transform::identity(), 0.0, 0.0);
        gradient.rescale(10.0, 0.0, 2.0, 2.0);
        // forward map takes (0, 0) to (20, 0), the stored transform undoes it
        let p = gradient.transform().apply(crate::Point::new(20.0, 0.0));
        assert_approx_eq!(p.x(), 0.0, 1e-5);
        assert_approx_eq!(p.y(), 0.0, 1e-5);
    }

    #[test]
    fn test_spread_parse() {
        assert_eq!("reflect".parse::<SpreadMethod>().unwrap(), SpreadMethod::Reflect);
        assert!("mirror".parse::<SpreadMethod>().is_err());
    }
}
