//! SVG parser and SMIL animation engine producing cubic-Bézier scene graphs
//!
//! The parser turns a subset of the SVG textual format into an [`Image`]: a
//! flat arena of shapes whose outlines are lowered to cubic Bézier segments,
//! with solid or gradient paints, stroke properties and animation
//! descriptors. Rasterization is delegated to a [`Rasterizer`] collaborator
//! supplied by the embedder, which makes the crate usable on
//! memory-constrained targets where the pixel pipeline works on a scratch
//! buffer smaller than the output and tiles its work.
//!
//! ```no_run
//! use animsvg::{parse, Units};
//!
//! let text = std::fs::read_to_string("drawing.svg")?;
//! let mut image = parse(&text, Units::Px, 96.0).ok_or("no scene")?;
//! // move the clock and repaint only when something changed
//! if image.animate(16) {
//!     for shape in image.shapes() {
//!         for path in shape.paths() {
//!             for [p0, p1, p2, p3] in path.cubics() {
//!                 // feed the rasterizer
//!                 let _ = (p0, p1, p2, p3);
//!             }
//!         }
//!     }
//! }
//! # Ok::<_, Box<dyn std::error::Error>>(())
//! ```
//!
//! Parsing is best effort: malformed numbers read as zero, unknown elements,
//! attributes and broken path commands are skipped, unresolvable gradient
//! references paint nothing. Whatever could be understood ends up in the
//! image, the way lenient viewers in the wild behave.
use std::fmt;

mod animate;
mod color;
mod geometry;
mod gradient;
mod image;
mod parser;
mod path;
mod scan;
mod utils;
mod xml;

pub use color::{ColorError, Rgba};
pub use geometry::{Align, BBox, Point, Scalar, Transform, EPSILON, PI};
pub(crate) use geometry::{bezier1d, cubic_bounds};
pub use gradient::{Gradient, GradientId, GradientStop, SpreadMethod};
pub use image::{AspectMode, Image, Paint, Shape, ShapeNode, MAX_DASHES};
pub use path::{FillRule, LineCap, LineJoin, Path, KAPPA90};
pub use scan::{Coordinate, Units};
pub use utils::{clamp, timeit};

/// Parse an SVG document
///
/// `units` selects how the root `width`/`height` translate to pixels and
/// `dpi` drives physical units (`pt`, `mm`, ...). Returns `None` when nothing
/// in the document forms a scene; partially recognized documents parse to
/// whatever could be understood.
pub fn parse(text: &str, units: Units, dpi: Scalar) -> Option<Image> {
    timeit("animsvg::parse", || parser::parse_document(text, units, dpi))
}

/// Error parsing an SVG value through one of the typed [`FromStr`]
/// implementations
///
/// The document parser itself never surfaces these: it falls back to defaults
/// and keeps going.
///
/// [`FromStr`]: std::str::FromStr
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SvgParseError {
    InvalidFillRule,
    InvalidLineCap,
    InvalidLineJoin,
    InvalidSpreadMethod,
    InvalidUnits,
}

impl fmt::Display for SvgParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SvgParseError::InvalidFillRule => "invalid fill rule",
            SvgParseError::InvalidLineCap => "invalid line cap",
            SvgParseError::InvalidLineJoin => "invalid line join",
            SvgParseError::InvalidSpreadMethod => "invalid spread method",
            SvgParseError::InvalidUnits => "invalid units",
        };
        name.fmt(f)
    }
}

impl std::error::Error for SvgParseError {}

/// Pixel pipeline collaborator consuming the parsed scene
///
/// The crate never requires process-global state from implementations: an
/// embedder may hold a per-image rasterizer or share one refcounted instance,
/// both work. `buf` is a 32-bit premultiplied RGBA destination with `stride`
/// bytes per row, possibly smaller than the full image so rasterization can
/// be tiled across the destination.
pub trait Rasterizer {
    /// Optional precomputation for a scale factor, used by implementations
    /// that cache flattened geometry between tiles.
    fn prepare(&mut self, image: &Image, scale: Scalar) {
        let _ = (image, scale);
    }

    /// Render the whole scene at a translation and scale.
    fn rasterize(
        &mut self,
        image: &Image,
        tx: Scalar,
        ty: Scalar,
        scale: Scalar,
        buf: &mut [u8],
        width: usize,
        height: usize,
        stride: usize,
    );

    /// Render using state prepared by an earlier [`Rasterizer::prepare`]
    /// call.
    fn rasterize_finish(
        &mut self,
        tx: Scalar,
        ty: Scalar,
        buf: &mut [u8],
        width: usize,
        height: usize,
        stride: usize,
    );
}
