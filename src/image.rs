//! Scene graph: shapes, shape nodes and the parsed image
//!
//! All scene entities live in arenas owned by the [`Image`]. Shape nodes keep
//! their tree structure as indices (document order plus a parent index), so
//! the animation engine can walk ancestors without pointer chasing.
use crate::{
    animate::{apply_group, Animate},
    cubic_bounds,
    gradient::{Gradient, GradientId, GradientStop},
    scan::{next_dash_item, parse_float, Coordinate, Units},
    Align, BBox, FillRule, LineCap, LineJoin, Path, Point, Rgba, Scalar, Transform,
};

/// Upper bound on `stroke-dasharray` entries
pub const MAX_DASHES: usize = 8;

/// How the viewBox is fitted into the output rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AspectMode {
    /// Non-uniform scale filling both axes
    #[default]
    None,
    /// Uniform scale, whole viewBox visible
    Meet,
    /// Uniform scale, whole output covered
    Slice,
}

/// The rule by which an interior or an outline is colored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paint {
    /// Not painted
    None,
    /// Solid color, alpha already merged in
    Color(Rgba),
    LinearGradient(GradientId),
    RadialGradient(GradientId),
    /// A `url(#id)` reference that has not been resolved yet; never present
    /// after parsing completes
    Undefined,
}

impl Paint {
    /// Solid color of the paint, if it has one
    pub fn color(&self) -> Option<Rgba> {
        match self {
            Paint::Color(color) => Some(*color),
            _ => None,
        }
    }

    /// Gradient index of the paint, if it has one
    pub fn gradient(&self) -> Option<GradientId> {
        match self {
            Paint::LinearGradient(id) | Paint::RadialGradient(id) => Some(*id),
            _ => None,
        }
    }
}

/// Animatable subset of a shape captured right after parsing
#[derive(Debug, Clone)]
pub(crate) struct ShapeBaseline {
    pub opacity: Scalar,
    pub xform: Transform,
    pub fill: Paint,
    pub stroke: Paint,
    pub stroke_width: Scalar,
    pub stroke_dash_offset: Scalar,
    pub stroke_dash_array: [Scalar; MAX_DASHES],
    pub stroke_dash_count: usize,
}

impl Default for ShapeBaseline {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            xform: Transform::identity(),
            fill: Paint::None,
            stroke: Paint::None,
            stroke_width: 0.0,
            stroke_dash_offset: 0.0,
            stroke_dash_array: [0.0; MAX_DASHES],
            stroke_dash_count: 0,
        }
    }
}

/// A filled and/or stroked collection of sub-paths
#[derive(Debug, Clone)]
pub struct Shape {
    pub(crate) id: Option<String>,
    pub(crate) fill: Paint,
    pub(crate) stroke: Paint,
    pub(crate) opacity: Scalar,
    pub(crate) stroke_width: Scalar,
    pub(crate) stroke_dash_offset: Scalar,
    pub(crate) stroke_dash_array: [Scalar; MAX_DASHES],
    pub(crate) stroke_dash_count: usize,
    pub(crate) stroke_line_join: LineJoin,
    pub(crate) stroke_line_cap: LineCap,
    pub(crate) miter_limit: Scalar,
    pub(crate) fill_rule: FillRule,
    pub(crate) visible: bool,
    pub(crate) bounds: BBox,
    pub(crate) xform: Transform,
    pub(crate) paths: Vec<Path>,
    pub(crate) fill_gradient: Option<String>,
    pub(crate) stroke_gradient: Option<String>,
    pub(crate) orig: ShapeBaseline,
    pub(crate) stroke_scaled: bool,
}

impl Shape {
    /// Optional `id` attribute of the shape or its group
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn fill(&self) -> &Paint {
        &self.fill
    }

    pub fn stroke(&self) -> &Paint {
        &self.stroke
    }

    pub fn opacity(&self) -> Scalar {
        self.opacity
    }

    /// Stroke width in output pixels
    pub fn stroke_width(&self) -> Scalar {
        self.stroke_width
    }

    pub fn stroke_dash_offset(&self) -> Scalar {
        self.stroke_dash_offset
    }

    /// Dash pattern, empty when the stroke is solid
    pub fn stroke_dash_array(&self) -> &[Scalar] {
        &self.stroke_dash_array[..self.stroke_dash_count]
    }

    pub fn stroke_line_join(&self) -> LineJoin {
        self.stroke_line_join
    }

    pub fn stroke_line_cap(&self) -> LineCap {
        self.stroke_line_cap
    }

    pub fn miter_limit(&self) -> Scalar {
        self.miter_limit
    }

    pub fn fill_rule(&self) -> FillRule {
        self.fill_rule
    }

    /// `false` once any ancestor carried `display:none`
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Tight bounding box in output pixels
    pub fn bounds(&self) -> BBox {
        self.bounds
    }

    /// Root transform (feeds gradient resolution and animation)
    pub fn transform(&self) -> Transform {
        self.xform
    }

    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    /// Union of the live path bounds
    pub(crate) fn update_bounds(&mut self) {
        self.bounds = self
            .paths
            .iter()
            .fold(None, |bounds, path| Some(path.bounds().union_opt(bounds)))
            .expect("Shape is never empty");
    }

    /// Bounding box of the live points pushed through `tr`
    pub(crate) fn transformed_bounds(&self, tr: Transform) -> Option<BBox> {
        let mut bounds: Option<BBox> = None;
        for path in &self.paths {
            for curve in path.cubics() {
                let curve = [
                    tr.apply(curve[0]),
                    tr.apply(curve[1]),
                    tr.apply(curve[2]),
                    tr.apply(curve[3]),
                ];
                bounds = Some(cubic_bounds(&curve).union_opt(bounds));
            }
        }
        bounds
    }

    /// Multiply stroke metrics by a scale factor and mark them as needing the
    /// viewBox scale again.
    pub(crate) fn scale_stroke_by(&mut self, scale: Scalar) {
        self.stroke_width *= scale;
        self.stroke_dash_offset *= scale;
        for dash in self.stroke_dash_array[..self.stroke_dash_count].iter_mut() {
            *dash *= scale;
        }
        self.stroke_scaled = false;
    }

    /// Capture the animatable fields; done exactly once when the shape is
    /// committed (paints are refreshed after gradient resolution).
    pub(crate) fn capture_baseline(&mut self) {
        self.orig = ShapeBaseline {
            opacity: self.opacity,
            xform: self.xform,
            fill: self.fill,
            stroke: self.stroke,
            stroke_width: self.stroke_width,
            stroke_dash_offset: self.stroke_dash_offset,
            stroke_dash_array: self.stroke_dash_array,
            stroke_dash_count: self.stroke_dash_count,
        };
    }

    /// Restore every animatable field from the baseline and rebuild the live
    /// path points.
    pub(crate) fn reset_to_baseline(&mut self) {
        self.opacity = self.orig.opacity;
        self.fill = self.orig.fill;
        self.stroke = self.orig.stroke;
        self.stroke_width = self.orig.stroke_width;
        self.stroke_dash_offset = self.orig.stroke_dash_offset;
        self.stroke_dash_array = self.orig.stroke_dash_array;
        self.stroke_dash_count = self.orig.stroke_dash_count;
        self.xform = self.orig.xform;
        for path in self.paths.iter_mut() {
            path.set_transform(path.orig_xform());
            path.retransform();
        }
        self.stroke_scaled = false;
    }
}

/// Tree node owning an optional shape plus the animations attached at this
/// level; group elements produce a node without a shape.
#[derive(Debug)]
pub struct ShapeNode {
    pub(crate) depth: usize,
    pub(crate) shape: Option<Shape>,
    pub(crate) parent: Option<usize>,
    pub(crate) animates: Vec<Animate>,
}

impl ShapeNode {
    pub fn shape(&self) -> Option<&Shape> {
        self.shape.as_ref()
    }

    /// Index of the parent node inside [`Image::nodes`]
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    pub fn has_animations(&self) -> bool {
        !self.animates.is_empty()
    }
}

/// A parsed SVG document, scaled to its viewBox
#[derive(Debug)]
pub struct Image {
    pub(crate) width: Scalar,
    pub(crate) height: Scalar,
    pub(crate) view_minx: Scalar,
    pub(crate) view_miny: Scalar,
    pub(crate) view_width: Scalar,
    pub(crate) view_height: Scalar,
    pub(crate) font_size: Scalar,
    pub(crate) dpi: Scalar,
    pub(crate) align_x: Align,
    pub(crate) align_y: Align,
    pub(crate) aspect: AspectMode,
    pub(crate) units: Units,
    pub(crate) nodes: Vec<ShapeNode>,
    pub(crate) gradients: Vec<Gradient>,
    pub(crate) memory_size: usize,
}

impl Image {
    pub(crate) fn new(units: Units, dpi: Scalar) -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            view_minx: 0.0,
            view_miny: 0.0,
            view_width: 0.0,
            view_height: 0.0,
            font_size: 0.0,
            dpi,
            align_x: Align::default(),
            align_y: Align::default(),
            aspect: AspectMode::default(),
            units,
            nodes: Vec::new(),
            gradients: Vec::new(),
            memory_size: 0,
        }
    }

    /// Width of the image in declared units
    pub fn width(&self) -> Scalar {
        self.width
    }

    /// Height of the image in declared units
    pub fn height(&self) -> Scalar {
        self.height
    }

    /// The viewBox rectangle of the document
    pub fn view_box(&self) -> BBox {
        BBox::new(
            Point::new(self.view_minx, self.view_miny),
            Point::new(
                self.view_minx + self.view_width,
                self.view_miny + self.view_height,
            ),
        )
    }

    /// Bytes held by all entities owned by this image
    pub fn memory_used(&self) -> usize {
        self.memory_size
    }

    /// All nodes in document order
    pub fn nodes(&self) -> &[ShapeNode] {
        &self.nodes
    }

    /// All shapes in document (paint) order
    pub fn shapes(&self) -> impl Iterator<Item = &Shape> {
        self.nodes.iter().filter_map(|node| node.shape.as_ref())
    }

    /// Resolved gradient referenced by a [`Paint`]
    pub fn gradient(&self, id: GradientId) -> &Gradient {
        &self.gradients[id.0]
    }

    /// Evaluate all animations at `time_ms`, starting from the post-parse
    /// baseline. Returns whether any animation contributed this frame, so
    /// callers can skip redraws.
    pub fn animate(&mut self, time_ms: i64) -> bool {
        fn apply_ancestors(
            nodes: &[ShapeNode],
            index: usize,
            shape: &mut Shape,
            time_ms: i64,
        ) -> bool {
            let mut applied = false;
            if let Some(parent) = nodes[index].parent {
                applied |= apply_ancestors(nodes, parent, shape, time_ms);
            }
            applied |= apply_group(shape, &nodes[index].animates, time_ms);
            applied
        }

        let mut applied = false;
        for index in 0..self.nodes.len() {
            let mut shape = match self.nodes[index].shape.take() {
                Some(shape) => shape,
                None => continue,
            };
            shape.reset_to_baseline();
            applied |= apply_ancestors(&self.nodes, index, &mut shape, time_ms);
            shape.update_bounds();
            self.nodes[index].shape = Some(shape);
        }
        self.scale_to_viewbox();
        applied
    }

    // viewBox origin and size drive `%` coordinate resolution
    pub(crate) fn actual_origin_x(&self) -> Scalar {
        self.view_minx
    }

    pub(crate) fn actual_origin_y(&self) -> Scalar {
        self.view_miny
    }

    pub(crate) fn actual_width(&self) -> Scalar {
        self.view_width
    }

    pub(crate) fn actual_height(&self) -> Scalar {
        self.view_height
    }

    /// Reference length for percentages of the diagonal
    pub(crate) fn actual_length(&self) -> Scalar {
        let w = self.actual_width();
        let h = self.actual_height();
        (w * w + h * h).sqrt() / std::f32::consts::SQRT_2
    }

    /// Convert a coordinate to pixels given an origin and reference length
    pub(crate) fn convert_to_pixels(&self, c: Coordinate, orig: Scalar, length: Scalar) -> Scalar {
        match c.units {
            Units::User | Units::Px => c.value,
            Units::Pt => c.value / 72.0 * self.dpi,
            Units::Pc => c.value / 6.0 * self.dpi,
            Units::Mm => c.value / 25.4 * self.dpi,
            Units::Cm => c.value / 2.54 * self.dpi,
            Units::In => c.value * self.dpi,
            Units::Em => c.value * self.font_size,
            // x-height of Helvetica
            Units::Ex => c.value * self.font_size * 0.52,
            Units::Percent => orig + c.value / 100.0 * length,
        }
    }

    pub(crate) fn parse_coordinate(&self, s: &str, orig: Scalar, length: Scalar) -> Scalar {
        self.convert_to_pixels(Coordinate::parse(s), orig, length)
    }

    /// Parse a `stroke-dasharray` list; a pattern summing to nothing is
    /// treated as solid.
    pub(crate) fn parse_dash_array(&self, s: &str) -> ([Scalar; MAX_DASHES], usize) {
        let mut dashes = [0.0 as Scalar; MAX_DASHES];
        let mut count = 0;

        if s.starts_with('n') {
            // "none"
            return (dashes, 0);
        }
        let mut rest = s;
        loop {
            let (item, tail) = next_dash_item(rest);
            rest = tail;
            let item = match item {
                Some(item) => item,
                None => break,
            };
            if count < MAX_DASHES {
                dashes[count] = self.parse_coordinate(item, 0.0, self.actual_length()).abs();
                count += 1;
            }
        }
        let sum: Scalar = dashes[..count].iter().sum();
        if sum <= 1e-6 {
            count = 0;
        }
        (dashes, count)
    }

    /// Union of all shape bounds
    pub(crate) fn image_bounds(&self) -> Option<BBox> {
        self.shapes()
            .fold(None, |bounds, shape| Some(shape.bounds.union_opt(bounds)))
    }

    /// Compute the scene transform from width/height/viewBox/aspect mode and
    /// push it onto every path, gradient and stroke.
    ///
    /// Idempotent through the per-path `scaled` and per-shape `stroke_scaled`
    /// flags; gradients are recomposed from their baseline every pass. Re-run
    /// after every animation frame.
    pub(crate) fn scale_to_viewbox(&mut self) {
        // Guess image size if not set completely.
        let bounds = self.image_bounds();
        if self.view_width == 0.0 {
            if self.width > 0.0 {
                self.view_width = self.width;
            } else if let Some(bounds) = bounds {
                self.view_minx = bounds.x();
                self.view_width = bounds.width();
            }
        }
        if self.view_height == 0.0 {
            if self.height > 0.0 {
                self.view_height = self.height;
            } else if let Some(bounds) = bounds {
                self.view_miny = bounds.y();
                self.view_height = bounds.height();
            }
        }
        if self.width == 0.0 {
            self.width = self.view_width;
        }
        if self.height == 0.0 {
            self.height = self.view_height;
        }

        let mut tx = -self.view_minx;
        let mut ty = -self.view_miny;
        let mut sx = if self.view_width > 0.0 {
            self.width / self.view_width
        } else {
            0.0
        };
        let mut sy = if self.view_height > 0.0 {
            self.height / self.view_height
        } else {
            0.0
        };
        // unit scaling makes later coordinates behave as declared units
        let us = 1.0 / self.convert_to_pixels(Coordinate::new(1.0, self.units), 0.0, 1.0);

        fn view_align(content: Scalar, container: Scalar, align: Align) -> Scalar {
            match align {
                Align::Min => 0.0,
                Align::Mid => (container - content) * 0.5,
                Align::Max => container - content,
            }
        }

        match self.aspect {
            AspectMode::Meet => {
                // fit whole image into viewbox
                sx = sx.min(sy);
                sy = sx;
                tx += view_align(self.view_width * sx, self.width, self.align_x) / sx;
                ty += view_align(self.view_height * sy, self.height, self.align_y) / sy;
            }
            AspectMode::Slice => {
                // fill whole viewbox with image
                sx = sx.max(sy);
                sy = sx;
                tx += view_align(self.view_width * sx, self.width, self.align_x) / sx;
                ty += view_align(self.view_height * sy, self.height, self.align_y) / sy;
            }
            AspectMode::None => {}
        }

        sx *= us;
        sy *= us;
        let avgs = (sx + sy) / 2.0;

        let gradients = &mut self.gradients;
        for node in self.nodes.iter_mut() {
            let shape = match node.shape.as_mut() {
                Some(shape) => shape,
                None => continue,
            };

            shape.bounds = BBox::new(
                Point::new((shape.bounds.x() + tx) * sx, (shape.bounds.y() + ty) * sy),
                Point::new(
                    (shape.bounds.max().x() + tx) * sx,
                    (shape.bounds.max().y() + ty) * sy,
                ),
            );
            for path in shape.paths.iter_mut() {
                path.apply_view_scale(tx, ty, sx, sy);
            }

            for paint in [shape.fill, shape.stroke] {
                if let Some(id) = paint.gradient() {
                    gradients[id.0].rescale(tx, ty, sx, sy);
                }
            }

            if !shape.stroke_scaled {
                shape.stroke_width *= avgs;
                shape.stroke_dash_offset *= avgs;
                for dash in shape.stroke_dash_array[..shape.stroke_dash_count].iter_mut() {
                    *dash *= avgs;
                }
                shape.stroke_scaled = true;
            }
        }
    }

    /// Total up the bytes held by owned entities; allocation stops when
    /// parsing finishes, so this stays accurate across animation frames.
    pub(crate) fn compute_memory_size(&mut self) {
        use std::mem::size_of;

        let mut size = size_of::<Self>();
        for node in &self.nodes {
            size += size_of::<ShapeNode>();
            size += node.animates.len() * size_of::<Animate>();
            if let Some(shape) = &node.shape {
                size += shape.id.as_ref().map_or(0, |id| id.len());
                size += shape.fill_gradient.as_ref().map_or(0, |id| id.len());
                size += shape.stroke_gradient.as_ref().map_or(0, |id| id.len());
                for path in &shape.paths {
                    // live and baseline point buffers
                    size += size_of::<Path>() + 2 * path.points().len() * size_of::<Point>();
                }
            }
        }
        for gradient in &self.gradients {
            size += size_of::<Gradient>() + gradient.stops().len() * size_of::<GradientStop>();
        }
        self.memory_size = size;
    }
}

/// Opacity values clamp into `[0, 1]`
pub(crate) fn parse_opacity(s: &str) -> Scalar {
    parse_float(s).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_approx_eq;

    #[test]
    fn test_convert_to_pixels() {
        let mut image = Image::new(Units::Px, 96.0);
        image.font_size = 10.0;
        let convert =
            |value, units| image.convert_to_pixels(Coordinate::new(value, units), 0.0, 0.0);
        assert_approx_eq!(convert(10.0, Units::User), 10.0);
        assert_approx_eq!(convert(10.0, Units::Px), 10.0);
        assert_approx_eq!(convert(72.0, Units::Pt), 96.0);
        assert_approx_eq!(convert(6.0, Units::Pc), 96.0);
        assert_approx_eq!(convert(25.4, Units::Mm), 96.0);
        assert_approx_eq!(convert(2.54, Units::Cm), 96.0);
        assert_approx_eq!(convert(1.0, Units::In), 96.0);
        assert_approx_eq!(convert(2.0, Units::Em), 20.0);
        assert_approx_eq!(convert(2.0, Units::Ex), 10.4, 1e-5);
        assert_approx_eq!(
            image.convert_to_pixels(Coordinate::new(50.0, Units::Percent), 10.0, 100.0),
            60.0
        );
    }

    #[test]
    fn test_parse_opacity() {
        assert_approx_eq!(parse_opacity("0.5"), 0.5);
        assert_approx_eq!(parse_opacity("1.5"), 1.0);
        assert_approx_eq!(parse_opacity("-1"), 0.0);
    }

    #[test]
    fn test_dash_array() {
        let mut image = Image::new(Units::Px, 96.0);
        image.view_width = 100.0;
        image.view_height = 100.0;
        let (dashes, count) = image.parse_dash_array("4, 2 1");
        assert_eq!(count, 3);
        assert_approx_eq!(dashes[0], 4.0);
        assert_approx_eq!(dashes[2], 1.0);
        assert_eq!(image.parse_dash_array("none").1, 0);
        // a pattern summing to nothing is solid
        assert_eq!(image.parse_dash_array("0 0 0").1, 0);
        // negative entries are folded positive
        let (dashes, count) = image.parse_dash_array("-4 2");
        assert_eq!(count, 2);
        assert_approx_eq!(dashes[0], 4.0);
    }
}
