//! SVG document parser
//!
//! Drives the XML lexer over the document, maintaining a stack of attribute
//! frames, building shapes out of path data and the basic shape elements, and
//! collecting gradient definitions and animation descriptors. Two post-parse
//! passes resolve `url(#id)` paints and scale the scene to the viewBox.
use crate::{
    animate::{
        count_list_values, parse_animate_value, parse_clock_value, parse_spline_value, Additive,
        Animate, AnimateKind, CalcMode, FillMode, MAX_ARGS,
    },
    gradient::{Gradient, GradientData, GradientGeometry, GradientId, GradientStop, GradientUnits},
    image::{parse_opacity, AspectMode, Image, Paint, Shape, ShapeBaseline, ShapeNode, MAX_DASHES},
    path::{parse_path_data, PathSink, KAPPA90},
    scan::{next_item, parse_float, scan_args, Coordinate, Units},
    xml::{parse_xml, Attribute, XmlHandler},
    Align, LineCap, LineJoin, Point, Rgba, Scalar, Transform, PI,
};

/// Where the fill/stroke of the current frame comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PaintSource {
    None,
    Color,
    /// `url(#id)` reference, resolved after the document is parsed
    Ref,
}

/// One frame of the attribute stack
#[derive(Debug, Clone)]
struct Attrib {
    id: Option<String>,
    xform: Transform,
    fill_source: PaintSource,
    stroke_source: PaintSource,
    fill_color: Rgba,
    stroke_color: Rgba,
    fill_gradient: Option<String>,
    stroke_gradient: Option<String>,
    opacity: Scalar,
    fill_opacity: Scalar,
    stroke_opacity: Scalar,
    stroke_width: Scalar,
    stroke_dash_offset: Scalar,
    stroke_dash_array: [Scalar; MAX_DASHES],
    stroke_dash_count: usize,
    stroke_line_join: LineJoin,
    stroke_line_cap: LineCap,
    miter_limit: Scalar,
    fill_rule: crate::FillRule,
    stop_color: Rgba,
    stop_opacity: Scalar,
    stop_offset: Scalar,
    visible: bool,
}

impl Default for Attrib {
    fn default() -> Self {
        Self {
            id: None,
            xform: Transform::identity(),
            fill_source: PaintSource::Color,
            stroke_source: PaintSource::None,
            fill_color: Rgba::rgb(0, 0, 0),
            stroke_color: Rgba::rgb(0, 0, 0),
            fill_gradient: None,
            stroke_gradient: None,
            opacity: 1.0,
            fill_opacity: 1.0,
            stroke_opacity: 1.0,
            stroke_width: 1.0,
            stroke_dash_offset: 0.0,
            stroke_dash_array: [0.0; MAX_DASHES],
            stroke_dash_count: 0,
            stroke_line_join: LineJoin::Miter,
            stroke_line_cap: LineCap::Butt,
            miter_limit: 4.0,
            fill_rule: crate::FillRule::NonZero,
            stop_color: Rgba::rgb(0, 0, 0),
            stop_opacity: 1.0,
            stop_offset: 0.0,
            visible: true,
        }
    }
}

pub(crate) struct Parser {
    image: Image,
    attr_stack: Vec<Attrib>,
    /// Sub-paths of the shape currently being built
    plist: Vec<crate::Path>,
    /// Gradient definitions, resolved after the document is parsed
    gradients: Vec<GradientData>,
    path_flag: bool,
    defs_flag: bool,
    shape_depth: usize,
}

/// Parse an SVG document into a fully resolved image
///
/// `units` and `dpi` control how physical lengths convert to pixels. Returns
/// `None` when the document yields no scene at all; partially recognized
/// documents parse to whatever could be understood.
pub(crate) fn parse_document(text: &str, units: Units, dpi: Scalar) -> Option<Image> {
    let mut parser = Parser {
        image: Image::new(units, dpi),
        attr_stack: vec![Attrib::default()],
        plist: Vec::new(),
        gradients: Vec::new(),
        path_flag: false,
        defs_flag: false,
        shape_depth: 0,
    };
    parse_xml(text, &mut parser);

    // Resolve gradients after all definitions have been parsed.
    parser.create_gradients();

    let mut image = parser.image;
    if image.nodes.is_empty() {
        return None;
    }
    find_shape_parents(&mut image.nodes);
    image.scale_to_viewbox();
    image.compute_memory_size();
    log::debug!(
        "parsed {} nodes, {} gradients, {} bytes",
        image.nodes.len(),
        image.gradients.len(),
        image.memory_size
    );
    Some(image)
}

/// Parent of each node is the closest earlier node with a smaller depth
fn find_shape_parents(nodes: &mut [ShapeNode]) {
    for index in (0..nodes.len()).rev() {
        let depth = nodes[index].depth;
        nodes[index].parent = nodes[..index].iter().rposition(|node| node.depth < depth);
    }
}

impl XmlHandler for Parser {
    fn start_element(&mut self, name: &str, attrs: &[Attribute<'_>]) {
        self.shape_depth += 1;

        if self.defs_flag {
            // skip everything but gradients in defs
            match name {
                "linearGradient" => self.parse_gradient(attrs, GradientData::linear()),
                "radialGradient" => self.parse_gradient(attrs, GradientData::radial()),
                "stop" => self.parse_stop(attrs),
                _ => {}
            }
            return;
        }

        match name {
            "g" => {
                self.push_attr();
                self.parse_group(attrs);
            }
            "path" => {
                // no nested paths
                if self.path_flag {
                    return;
                }
                self.path_flag = true;
                self.push_attr();
                self.parse_path(attrs);
                self.pop_attr();
            }
            "rect" => {
                self.push_attr();
                self.parse_rect(attrs);
                self.pop_attr();
            }
            "circle" => {
                self.push_attr();
                self.parse_circle(attrs);
                self.pop_attr();
            }
            "ellipse" => {
                self.push_attr();
                self.parse_ellipse(attrs);
                self.pop_attr();
            }
            "line" => {
                self.push_attr();
                self.parse_line(attrs);
                self.pop_attr();
            }
            "polyline" => {
                self.push_attr();
                self.parse_poly(attrs, false);
                self.pop_attr();
            }
            "polygon" => {
                self.push_attr();
                self.parse_poly(attrs, true);
                self.pop_attr();
            }
            "linearGradient" => self.parse_gradient(attrs, GradientData::linear()),
            "radialGradient" => self.parse_gradient(attrs, GradientData::radial()),
            "stop" => self.parse_stop(attrs),
            "defs" => self.defs_flag = true,
            "animate" | "animateTransform" => {
                self.push_attr();
                self.parse_animate(name, attrs);
                self.pop_attr();
            }
            "svg" => self.parse_svg(attrs),
            _ => {}
        }
    }

    fn end_element(&mut self, name: &str) {
        match name {
            "g" => self.pop_attr(),
            "path" => self.path_flag = false,
            "defs" => self.defs_flag = false,
            _ => {}
        }
        self.shape_depth = self.shape_depth.saturating_sub(1);
    }
}

impl Parser {
    fn attr(&mut self) -> &mut Attrib {
        self.attr_stack.last_mut().expect("attribute stack is never empty")
    }

    fn push_attr(&mut self) {
        let mut attr = self.attr_stack.last().cloned().unwrap_or_default();
        // the id belongs to a single element, gradient references inherit
        attr.id = None;
        self.attr_stack.push(attr);
    }

    fn pop_attr(&mut self) {
        if self.attr_stack.len() > 1 {
            self.attr_stack.pop();
        }
    }

    fn parse_attribs(&mut self, attrs: &[Attribute<'_>]) {
        for attr in attrs {
            if attr.name == "style" {
                self.parse_style(attr.value);
            } else {
                self.parse_attr(attr.name, attr.value);
            }
        }
    }

    /// Entries of a `style="a: b; c: d"` list use the same dispatch as bare
    /// attributes.
    fn parse_style(&mut self, style: &str) {
        for entry in style.split(';') {
            if let Some((name, value)) = entry.split_once(':') {
                self.parse_attr(name.trim(), value.trim());
            }
        }
    }

    /// Dispatch one attribute onto the current frame. Returns false when the
    /// name is not a style attribute so element parsers can try their own.
    fn parse_attr(&mut self, name: &str, value: &str) -> bool {
        match name {
            "style" => self.parse_style(value),
            "display" => {
                // one display:none hides the whole subtree, display:inline
                // does not bring it back
                if value == "none" {
                    self.attr().visible = false;
                }
            }
            "fill" => match value {
                "none" | "transparent" => self.attr().fill_source = PaintSource::None,
                _ if value.starts_with("url(") => {
                    self.attr().fill_source = PaintSource::Ref;
                    self.attr().fill_gradient = Some(parse_url(value));
                }
                _ => {
                    self.attr().fill_source = PaintSource::Color;
                    self.attr().fill_color = Rgba::parse_lossy(value);
                }
            },
            "opacity" => self.attr().opacity = parse_opacity(value),
            "fill-opacity" => self.attr().fill_opacity = parse_opacity(value),
            "stroke" => match value {
                "none" => self.attr().stroke_source = PaintSource::None,
                _ if value.starts_with("url(") => {
                    self.attr().stroke_source = PaintSource::Ref;
                    self.attr().stroke_gradient = Some(parse_url(value));
                }
                _ => {
                    self.attr().stroke_source = PaintSource::Color;
                    self.attr().stroke_color = Rgba::parse_lossy(value);
                }
            },
            "stroke-width" => {
                let length = self.image.actual_length();
                let width = self.image.parse_coordinate(value, 0.0, length);
                self.attr().stroke_width = width;
            }
            "stroke-dasharray" => {
                let (dashes, count) = self.image.parse_dash_array(value);
                self.attr().stroke_dash_array = dashes;
                self.attr().stroke_dash_count = count;
            }
            "stroke-dashoffset" => {
                let length = self.image.actual_length();
                let offset = self.image.parse_coordinate(value, 0.0, length);
                self.attr().stroke_dash_offset = offset;
            }
            "stroke-opacity" => self.attr().stroke_opacity = parse_opacity(value),
            "stroke-linecap" => self.attr().stroke_line_cap = value.parse().unwrap_or_default(),
            "stroke-linejoin" => self.attr().stroke_line_join = value.parse().unwrap_or_default(),
            "stroke-miterlimit" => self.attr().miter_limit = parse_float(value).max(0.0),
            "fill-rule" => self.attr().fill_rule = value.parse().unwrap_or_default(),
            "font-size" => {
                let length = self.image.actual_length();
                self.image.font_size = self.image.parse_coordinate(value, 0.0, length);
            }
            "transform" => {
                let xform = parse_transform_list(value);
                let attr = self.attr();
                attr.xform = attr.xform * xform;
            }
            "stop-color" => self.attr().stop_color = Rgba::parse_lossy(value),
            "stop-opacity" => self.attr().stop_opacity = parse_opacity(value),
            "offset" => {
                let offset = self.image.parse_coordinate(value, 0.0, 1.0);
                self.attr().stop_offset = offset;
            }
            "id" => self.attr().id = Some(value.to_owned()),
            _ => return false,
        }
        true
    }

    fn parse_svg(&mut self, attrs: &[Attribute<'_>]) {
        for attr in attrs {
            if self.parse_attr(attr.name, attr.value) {
                continue;
            }
            match attr.name {
                "width" => self.image.width = self.image.parse_coordinate(attr.value, 0.0, 0.0),
                "height" => self.image.height = self.image.parse_coordinate(attr.value, 0.0, 0.0),
                "viewBox" => self.parse_view_box(attr.value),
                "preserveAspectRatio" => self.parse_preserve_aspect_ratio(attr.value),
                _ => {}
            }
        }
    }

    fn parse_view_box(&mut self, value: &str) {
        let mut values = [0.0 as Scalar; 4];
        let mut rest = value;
        for i in 0..values.len() {
            rest = rest.trim_start_matches(|c: char| {
                c.is_ascii_whitespace() || c == '%' || c == ','
            });
            if rest.is_empty() {
                return;
            }
            let (token, tail) = crate::scan::scan_number(rest);
            values[i] = parse_float(token);
            rest = tail;
            // assign progressively so a short list still sets its prefix
            self.image.view_minx = values[0];
            self.image.view_miny = values[1];
            self.image.view_width = values[2];
            self.image.view_height = values[3];
        }
    }

    fn parse_preserve_aspect_ratio(&mut self, value: &str) {
        if value.len() < 4 {
            return;
        }
        if value.contains("none") {
            // no uniform scaling
            self.image.aspect = AspectMode::None;
            return;
        }
        if value.contains("xMin") {
            self.image.align_x = Align::Min;
        } else if value.contains("xMid") {
            self.image.align_x = Align::Mid;
        } else if value.contains("xMax") {
            self.image.align_x = Align::Max;
        }
        if value.contains("yMin") {
            self.image.align_y = Align::Min;
        } else if value.contains("yMid") {
            self.image.align_y = Align::Mid;
        } else if value.contains("yMax") {
            self.image.align_y = Align::Max;
        }
        self.image.aspect = if value.contains("slice") {
            AspectMode::Slice
        } else {
            AspectMode::Meet
        };
    }

    fn parse_group(&mut self, attrs: &[Attribute<'_>]) {
        self.parse_attribs(attrs);
        self.image.nodes.push(ShapeNode {
            depth: self.shape_depth,
            shape: None,
            parent: None,
            animates: Vec::new(),
        });
    }

    /// Snapshot the current attribute frame and the accumulated sub-paths
    /// into a new shape node.
    fn add_shape(&mut self) {
        if self.plist.is_empty() {
            return;
        }
        let paths = std::mem::take(&mut self.plist);
        let depth = self.shape_depth;
        let attr = self.attr();

        let fill = match attr.fill_source {
            PaintSource::None => Paint::None,
            PaintSource::Color => {
                Paint::Color(attr.fill_color.with_alpha((attr.fill_opacity * 255.0) as u8))
            }
            PaintSource::Ref => Paint::Undefined,
        };
        let stroke = match attr.stroke_source {
            PaintSource::None => Paint::None,
            PaintSource::Color => Paint::Color(
                attr.stroke_color
                    .with_alpha((attr.stroke_opacity * 255.0) as u8),
            ),
            PaintSource::Ref => Paint::Undefined,
        };

        let mut shape = Shape {
            id: attr.id.take(),
            fill,
            stroke,
            opacity: attr.opacity,
            stroke_width: attr.stroke_width,
            stroke_dash_offset: attr.stroke_dash_offset,
            stroke_dash_array: attr.stroke_dash_array,
            stroke_dash_count: attr.stroke_dash_count,
            stroke_line_join: attr.stroke_line_join,
            stroke_line_cap: attr.stroke_line_cap,
            miter_limit: attr.miter_limit,
            fill_rule: attr.fill_rule,
            visible: attr.visible,
            bounds: crate::BBox::new(Point::default(), Point::default()),
            xform: attr.xform,
            paths,
            fill_gradient: attr.fill_gradient.take(),
            stroke_gradient: attr.stroke_gradient.take(),
            orig: ShapeBaseline::default(),
            stroke_scaled: false,
        };
        let scale = shape.xform.average_scale();
        shape.scale_stroke_by(scale);
        shape.update_bounds();
        shape.capture_baseline();

        self.image.nodes.push(ShapeNode {
            depth,
            shape: Some(shape),
            parent: None,
            animates: Vec::new(),
        });
    }

    fn parse_path(&mut self, attrs: &[Attribute<'_>]) {
        let mut data = None;
        for attr in attrs {
            if attr.name == "d" {
                data = Some(attr.value);
            } else {
                self.parse_attribs(std::slice::from_ref(attr));
            }
        }
        if let Some(data) = data {
            let xform = self.attr().xform;
            self.plist = parse_path_data(data, xform);
        }
        self.add_shape();
    }

    fn parse_rect(&mut self, attrs: &[Attribute<'_>]) {
        let mut x = 0.0;
        let mut y = 0.0;
        let mut w = 0.0;
        let mut h = 0.0;
        // negative marks an unset radius
        let mut rx = -1.0 as Scalar;
        let mut ry = -1.0 as Scalar;

        for attr in attrs {
            if self.parse_attr(attr.name, attr.value) {
                continue;
            }
            let image = &self.image;
            match attr.name {
                "x" => x = image.parse_coordinate(attr.value, image.actual_origin_x(), image.actual_width()),
                "y" => y = image.parse_coordinate(attr.value, image.actual_origin_y(), image.actual_height()),
                "width" => w = image.parse_coordinate(attr.value, 0.0, image.actual_width()),
                "height" => h = image.parse_coordinate(attr.value, 0.0, image.actual_height()),
                "rx" => rx = image.parse_coordinate(attr.value, 0.0, image.actual_width()).abs(),
                "ry" => ry = image.parse_coordinate(attr.value, 0.0, image.actual_height()).abs(),
                _ => {}
            }
        }

        if rx < 0.0 && ry > 0.0 {
            rx = ry;
        }
        if ry < 0.0 && rx > 0.0 {
            ry = rx;
        }
        rx = rx.max(0.0).min(w / 2.0);
        ry = ry.max(0.0).min(h / 2.0);

        if w == 0.0 || h == 0.0 {
            return;
        }
        let mut sink = PathSink::new();
        if rx < 1e-4 || ry < 1e-4 {
            sink.move_to(Point::new(x, y));
            sink.line_to(Point::new(x + w, y));
            sink.line_to(Point::new(x + w, y + h));
            sink.line_to(Point::new(x, y + h));
        } else {
            // rounded rectangle
            let k = 1.0 - KAPPA90;
            sink.move_to(Point::new(x + rx, y));
            sink.line_to(Point::new(x + w - rx, y));
            sink.cubic_to(
                Point::new(x + w - rx * k, y),
                Point::new(x + w, y + ry * k),
                Point::new(x + w, y + ry),
            );
            sink.line_to(Point::new(x + w, y + h - ry));
            sink.cubic_to(
                Point::new(x + w, y + h - ry * k),
                Point::new(x + w - rx * k, y + h),
                Point::new(x + w - rx, y + h),
            );
            sink.line_to(Point::new(x + rx, y + h));
            sink.cubic_to(
                Point::new(x + rx * k, y + h),
                Point::new(x, y + h - ry * k),
                Point::new(x, y + h - ry),
            );
            sink.line_to(Point::new(x, y + ry));
            sink.cubic_to(
                Point::new(x, y + ry * k),
                Point::new(x + rx * k, y),
                Point::new(x + rx, y),
            );
        }
        let xform = self.attr().xform;
        self.plist.extend(sink.commit(true, xform));
        self.add_shape();
    }

    fn parse_circle(&mut self, attrs: &[Attribute<'_>]) {
        let mut cx = 0.0;
        let mut cy = 0.0;
        let mut r = 0.0 as Scalar;

        for attr in attrs {
            if self.parse_attr(attr.name, attr.value) {
                continue;
            }
            let image = &self.image;
            match attr.name {
                "cx" => cx = image.parse_coordinate(attr.value, image.actual_origin_x(), image.actual_width()),
                "cy" => cy = image.parse_coordinate(attr.value, image.actual_origin_y(), image.actual_height()),
                "r" => r = image.parse_coordinate(attr.value, 0.0, image.actual_length()).abs(),
                _ => {}
            }
        }

        if r > 0.0 {
            self.ellipse_path(cx, cy, r, r);
            self.add_shape();
        }
    }

    fn parse_ellipse(&mut self, attrs: &[Attribute<'_>]) {
        let mut cx = 0.0;
        let mut cy = 0.0;
        let mut rx = 0.0 as Scalar;
        let mut ry = 0.0 as Scalar;

        for attr in attrs {
            if self.parse_attr(attr.name, attr.value) {
                continue;
            }
            let image = &self.image;
            match attr.name {
                "cx" => cx = image.parse_coordinate(attr.value, image.actual_origin_x(), image.actual_width()),
                "cy" => cy = image.parse_coordinate(attr.value, image.actual_origin_y(), image.actual_height()),
                "rx" => rx = image.parse_coordinate(attr.value, 0.0, image.actual_width()).abs(),
                "ry" => ry = image.parse_coordinate(attr.value, 0.0, image.actual_height()).abs(),
                _ => {}
            }
        }

        if rx > 0.0 && ry > 0.0 {
            self.ellipse_path(cx, cy, rx, ry);
            self.add_shape();
        }
    }

    /// Four cubic arcs approximating an ellipse
    fn ellipse_path(&mut self, cx: Scalar, cy: Scalar, rx: Scalar, ry: Scalar) {
        let mut sink = PathSink::new();
        sink.move_to(Point::new(cx + rx, cy));
        sink.cubic_to(
            Point::new(cx + rx, cy + ry * KAPPA90),
            Point::new(cx + rx * KAPPA90, cy + ry),
            Point::new(cx, cy + ry),
        );
        sink.cubic_to(
            Point::new(cx - rx * KAPPA90, cy + ry),
            Point::new(cx - rx, cy + ry * KAPPA90),
            Point::new(cx - rx, cy),
        );
        sink.cubic_to(
            Point::new(cx - rx, cy - ry * KAPPA90),
            Point::new(cx - rx * KAPPA90, cy - ry),
            Point::new(cx, cy - ry),
        );
        sink.cubic_to(
            Point::new(cx + rx * KAPPA90, cy - ry),
            Point::new(cx + rx, cy - ry * KAPPA90),
            Point::new(cx + rx, cy),
        );
        let xform = self.attr().xform;
        self.plist.extend(sink.commit(true, xform));
    }

    fn parse_line(&mut self, attrs: &[Attribute<'_>]) {
        let mut x1 = 0.0;
        let mut y1 = 0.0;
        let mut x2 = 0.0;
        let mut y2 = 0.0;

        for attr in attrs {
            if self.parse_attr(attr.name, attr.value) {
                continue;
            }
            let image = &self.image;
            match attr.name {
                "x1" => x1 = image.parse_coordinate(attr.value, image.actual_origin_x(), image.actual_width()),
                "y1" => y1 = image.parse_coordinate(attr.value, image.actual_origin_y(), image.actual_height()),
                "x2" => x2 = image.parse_coordinate(attr.value, image.actual_origin_x(), image.actual_width()),
                "y2" => y2 = image.parse_coordinate(attr.value, image.actual_origin_y(), image.actual_height()),
                _ => {}
            }
        }

        let mut sink = PathSink::new();
        sink.move_to(Point::new(x1, y1));
        sink.line_to(Point::new(x2, y2));
        let xform = self.attr().xform;
        self.plist.extend(sink.commit(false, xform));
        self.add_shape();
    }

    fn parse_poly(&mut self, attrs: &[Attribute<'_>], close: bool) {
        let mut sink = PathSink::new();
        for attr in attrs {
            if self.parse_attr(attr.name, attr.value) {
                continue;
            }
            if attr.name != "points" {
                continue;
            }
            let mut rest = attr.value;
            let mut args = [0.0 as Scalar; 2];
            let mut nargs = 0;
            let mut npts = 0;
            loop {
                let (item, tail) = next_item(rest);
                rest = tail;
                let item = match item {
                    Some(item) => item,
                    None => break,
                };
                args[nargs] = parse_float(item);
                nargs += 1;
                if nargs >= 2 {
                    let p = Point::new(args[0], args[1]);
                    if npts == 0 {
                        sink.move_to(p);
                    } else {
                        sink.line_to(p);
                    }
                    nargs = 0;
                    npts += 1;
                }
            }
        }
        let xform = self.attr().xform;
        self.plist.extend(sink.commit(close, xform));
        self.add_shape();
    }

    fn parse_gradient(&mut self, attrs: &[Attribute<'_>], mut grad: GradientData) {
        for attr in attrs {
            if attr.name == "id" {
                grad.id = Some(attr.value.to_owned());
                continue;
            }
            if self.parse_attr(attr.name, attr.value) {
                continue;
            }
            match attr.name {
                "gradientUnits" => {
                    grad.units = if attr.value == "objectBoundingBox" {
                        GradientUnits::ObjectBoundingBox
                    } else {
                        GradientUnits::UserSpaceOnUse
                    };
                }
                "gradientTransform" => grad.xform = parse_transform_list(attr.value),
                "spreadMethod" => grad.spread = attr.value.parse().unwrap_or_default(),
                "xlink:href" => {
                    let href = attr.value.strip_prefix('#').unwrap_or(attr.value);
                    grad.href = Some(href.to_owned());
                }
                _ => {
                    let coord = Coordinate::parse(attr.value);
                    match (&mut grad.geometry, attr.name) {
                        (GradientGeometry::Linear { x1, .. }, "x1") => *x1 = coord,
                        (GradientGeometry::Linear { y1, .. }, "y1") => *y1 = coord,
                        (GradientGeometry::Linear { x2, .. }, "x2") => *x2 = coord,
                        (GradientGeometry::Linear { y2, .. }, "y2") => *y2 = coord,
                        (GradientGeometry::Radial { cx, .. }, "cx") => *cx = coord,
                        (GradientGeometry::Radial { cy, .. }, "cy") => *cy = coord,
                        (GradientGeometry::Radial { r, .. }, "r") => *r = coord,
                        (GradientGeometry::Radial { fx, .. }, "fx") => *fx = coord,
                        (GradientGeometry::Radial { fy, .. }, "fy") => *fy = coord,
                        _ => {}
                    }
                }
            }
        }
        self.gradients.push(grad);
    }

    /// Append a stop to the most recent gradient definition, keeping the
    /// stop list sorted.
    fn parse_stop(&mut self, attrs: &[Attribute<'_>]) {
        {
            let attr = self.attr();
            attr.stop_offset = 0.0;
            attr.stop_color = Rgba::rgb(0, 0, 0);
            attr.stop_opacity = 1.0;
        }
        for attr in attrs {
            self.parse_attr(attr.name, attr.value);
        }
        let attr = self.attr_stack.last().expect("attribute stack is never empty");
        let stop = GradientStop {
            offset: attr.stop_offset,
            color: attr
                .stop_color
                .with_alpha((attr.stop_opacity * 255.0) as u8),
        };
        if let Some(grad) = self.gradients.last_mut() {
            grad.add_stop(stop);
        }
    }

    /// Resolve `url(#id)` paints: find the definition, walk its `href` chain
    /// for stops, bake geometry/gradient/shape transforms together and intern
    /// the result in the image arena.
    fn create_gradients(&mut self) {
        for index in 0..self.image.nodes.len() {
            let mut shape = match self.image.nodes[index].shape.take() {
                Some(shape) => shape,
                None => continue,
            };
            if matches!(shape.fill, Paint::Undefined) {
                shape.fill = self.resolve_gradient(&shape, shape.fill_gradient.as_deref());
                shape.orig.fill = shape.fill;
            }
            if matches!(shape.stroke, Paint::Undefined) {
                shape.stroke = self.resolve_gradient(&shape, shape.stroke_gradient.as_deref());
                shape.orig.stroke = shape.stroke;
            }
            self.image.nodes[index].shape = Some(shape);
        }
    }

    fn resolve_gradient(&mut self, shape: &Shape, id: Option<&str>) -> Paint {
        let id = match id {
            Some(id) if !id.is_empty() => id,
            _ => return Paint::None,
        };
        let find = |id: &str| {
            self.gradients
                .iter()
                .rposition(|grad| grad.id.as_deref() == Some(id))
        };
        let data_index = match find(id) {
            Some(index) => index,
            None => return Paint::None,
        };

        // chase href references until stops are found, bounded against cycles
        let mut stops_index = None;
        let mut current = data_index;
        for _ in 0..=32 {
            let grad = &self.gradients[current];
            if !grad.stops.is_empty() {
                stops_index = Some(current);
                break;
            }
            match grad.href.as_deref().and_then(find) {
                Some(next) if next != current => current = next,
                _ => break,
            }
        }
        let stops_index = match stops_index {
            Some(index) => index,
            None => return Paint::None,
        };

        let data = &self.gradients[data_index];
        // origin and size the geometry coordinates resolve against
        let (ox, oy, sw, sh) = match data.units {
            GradientUnits::ObjectBoundingBox => {
                let inverse = shape.xform.invert().unwrap_or_default();
                match shape.transformed_bounds(inverse) {
                    Some(bounds) => (bounds.x(), bounds.y(), bounds.width(), bounds.height()),
                    None => (0.0, 0.0, 0.0, 0.0),
                }
            }
            GradientUnits::UserSpaceOnUse => (
                self.image.actual_origin_x(),
                self.image.actual_origin_y(),
                self.image.actual_width(),
                self.image.actual_height(),
            ),
        };
        let sl = (sw * sw + sh * sh).sqrt() / std::f32::consts::SQRT_2;

        let mut focal = (0.0, 0.0);
        let (axis, linear) = match &data.geometry {
            GradientGeometry::Linear { x1, y1, x2, y2 } => {
                let x1 = self.image.convert_to_pixels(*x1, ox, sw);
                let y1 = self.image.convert_to_pixels(*y1, oy, sh);
                let x2 = self.image.convert_to_pixels(*x2, ox, sw);
                let y2 = self.image.convert_to_pixels(*y2, oy, sh);
                // align the gradient axis to the (x1,y1)-(x2,y2) line
                let dx = x2 - x1;
                let dy = y2 - y1;
                (Transform::new(dy, dx, x1, -dx, dy, y1), true)
            }
            GradientGeometry::Radial { cx, cy, r, fx, fy } => {
                let cx = self.image.convert_to_pixels(*cx, ox, sw);
                let cy = self.image.convert_to_pixels(*cy, oy, sh);
                let fx = self.image.convert_to_pixels(*fx, ox, sw);
                let fy = self.image.convert_to_pixels(*fy, oy, sh);
                let r = self.image.convert_to_pixels(*r, 0.0, sl);
                focal = (fx / r, fy / r);
                (Transform::new(r, 0.0, cx, 0.0, r, cy), false)
            }
        };

        let composed = shape.xform * data.xform * axis;
        let gradient = Gradient::new(
            data.spread,
            self.gradients[stops_index].stops.clone(),
            composed,
            focal.0,
            focal.1,
        );
        let id = GradientId(self.image.gradients.len());
        self.image.gradients.push(gradient);
        if linear {
            Paint::LinearGradient(id)
        } else {
            Paint::RadialGradient(id)
        }
    }

    /// Parse one `<animate>`/`<animateTransform>` descriptor into a group of
    /// animation segments and attach them to the nearest enclosing node.
    /// Invalid descriptors are dropped without affecting anything else.
    fn parse_animate(&mut self, tag_name: &str, attrs: &[Attribute<'_>]) {
        let mut attr_name = None;
        let mut transform_type = None;
        let mut from = None;
        let mut to = None;
        let mut values = None;
        let mut key_times = None;
        let mut key_splines = None;
        let mut begin = 0i64;
        let mut end: Option<i64> = None;
        let mut dur: Option<i64> = None;
        // outer option is attribute presence, inner is a finite duration
        let mut repeat_dur: Option<Option<i64>> = None;
        let mut repeat_count: Option<Option<i64>> = None;
        let mut calc_mode = CalcMode::default();
        let mut additive = Additive::default();
        let mut fill = FillMode::default();

        for attr in attrs {
            match attr.name {
                "attributeName" => attr_name = Some(attr.value),
                "type" => transform_type = Some(attr.value),
                "from" => from = Some(attr.value),
                "to" => to = Some(attr.value),
                "values" => values = Some(attr.value),
                "keyTimes" => key_times = Some(attr.value),
                "keySplines" => key_splines = Some(attr.value),
                "begin" => begin = parse_clock_value(attr.value),
                "end" => {
                    let millis = parse_clock_value(attr.value);
                    end = (millis > 0).then_some(millis);
                }
                "dur" => dur = Some(parse_clock_value(attr.value)),
                "repeatDur" => {
                    repeat_dur = if attr.value == "indefinite" {
                        Some(None)
                    } else {
                        let millis = parse_clock_value(attr.value);
                        Some((millis > 0).then_some(millis))
                    };
                }
                "repeatCount" => {
                    repeat_count = if attr.value == "indefinite" {
                        Some(None)
                    } else {
                        Some(Some(parse_float(attr.value) as i64))
                    };
                }
                "additive" => {
                    if attr.value == "sum" {
                        additive = Additive::Sum;
                    }
                }
                "fill" => {
                    if attr.value == "freeze" {
                        fill = FillMode::Freeze;
                    }
                }
                "calcMode" => {
                    calc_mode = match attr.value {
                        "discrete" => CalcMode::Discrete,
                        "paced" => CalcMode::Paced,
                        "spline" => CalcMode::Spline,
                        _ => CalcMode::Linear,
                    };
                }
                _ => {}
            }
        }

        // validity gates, the whole descriptor stands or falls together
        let dur = match dur {
            Some(dur) if dur > 0 => dur,
            _ => return,
        };
        let values_count = values.map_or(0, count_list_values);
        if values.is_none() && (from.is_none() || to.is_none()) {
            return;
        }
        if let Some(key_times) = key_times {
            if values_count > 0 && count_list_values(key_times) != values_count {
                return;
            }
        }
        if let Some(key_splines) = key_splines {
            if values_count > 0 && count_list_values(key_splines) != values_count - 1 {
                return;
            }
        }

        let kind = match tag_name {
            "animateTransform" => {
                if attr_name != Some("transform") {
                    return;
                }
                match transform_type {
                    Some("translate") => AnimateKind::TransformTranslate,
                    Some("scale") => AnimateKind::TransformScale,
                    Some("rotate") => AnimateKind::TransformRotate,
                    Some("skewX") => AnimateKind::TransformSkewX,
                    Some("skewY") => AnimateKind::TransformSkewY,
                    _ => return,
                }
            }
            _ => match attr_name {
                Some("opacity") => AnimateKind::Opacity,
                Some("fill") => AnimateKind::Fill,
                Some("fill-opacity") => AnimateKind::FillOpacity,
                Some("stroke") => AnimateKind::Stroke,
                Some("stroke-opacity") => AnimateKind::StrokeOpacity,
                Some("stroke-width") => AnimateKind::StrokeWidth,
                Some("stroke-dashoffset") => AnimateKind::StrokeDashOffset,
                Some("stroke-dasharray") => AnimateKind::StrokeDashArray,
                _ => return,
            },
        };

        // repeatDur forces an unbounded repeat and tightens the active end;
        // without any repeat attribute the animation plays exactly once
        let mut repeat = match repeat_count {
            None => Some(1),
            Some(None) => None,
            Some(Some(count)) => Some(count),
        };
        if let Some(repeat_dur) = repeat_dur {
            repeat = None;
            end = match (end, repeat_dur) {
                (Some(end), Some(repeat_dur)) => Some(end.min(repeat_dur)),
                (None, Some(repeat_dur)) => Some(repeat_dur),
                (end, None) => end,
            };
        }

        let template = Animate {
            begin,
            end,
            dur,
            group_dur: dur,
            repeat_count: repeat,
            src: [0.0; MAX_ARGS],
            dst: [0.0; MAX_ARGS],
            src_na: 0,
            dst_na: 0,
            spline: [0.0; 4],
            kind,
            calc_mode,
            additive,
            fill,
            group_first: false,
            group_last: false,
        };

        let mut group = Vec::new();
        if values_count < 2 {
            // simple animation, from/to or a single value
            let mut animate = template;
            match values {
                None => {
                    let (src, src_na) =
                        parse_animate_value(&self.image, kind, from.unwrap_or_default());
                    let (dst, dst_na) =
                        parse_animate_value(&self.image, kind, to.unwrap_or_default());
                    animate.src = src;
                    animate.src_na = src_na;
                    animate.dst = dst;
                    animate.dst_na = dst_na;
                }
                Some(values) => {
                    let first = values.split(';').find(|v| !v.trim().is_empty());
                    let (src, src_na) =
                        parse_animate_value(&self.image, kind, first.unwrap_or_default());
                    animate.src = src;
                    animate.src_na = src_na;
                    animate.dst = src;
                    animate.dst_na = src_na;
                }
            }
            group.push(animate);
        } else {
            let values: Vec<&str> = values
                .unwrap_or_default()
                .split(';')
                .filter(|v| !v.trim().is_empty())
                .collect();
            let key_times: Option<Vec<Scalar>> = key_times.map(|list| {
                list.split(';')
                    .filter(|v| !v.trim().is_empty())
                    .map(|v| parse_float(v.trim()))
                    .collect()
            });
            let key_splines: Option<Vec<[Scalar; 4]>> = key_splines.map(|list| {
                list.split(';')
                    .filter(|v| !v.trim().is_empty())
                    .map(parse_spline_value)
                    .collect()
            });

            // default key times split the duration evenly
            let key_time = |index: usize| -> Scalar {
                match &key_times {
                    Some(key_times) => key_times.get(index).copied().unwrap_or(0.0),
                    None if index >= values.len() - 1 => 1.0,
                    None => index as Scalar / (values.len() - 1) as Scalar,
                }
            };

            for pair in 0..values.len() - 1 {
                let mut animate = template.clone();
                let window_begin = key_time(pair);
                let window_end = key_time(pair + 1);
                animate.begin = begin + (dur as f64 * window_begin as f64) as i64;
                animate.dur = (dur as f64 * (window_end - window_begin) as f64) as i64;
                if let Some(key_splines) = &key_splines {
                    animate.spline = key_splines.get(pair).copied().unwrap_or_default();
                }
                let (src, src_na) = parse_animate_value(&self.image, kind, values[pair]);
                let (dst, dst_na) = parse_animate_value(&self.image, kind, values[pair + 1]);
                animate.src = src;
                animate.src_na = src_na;
                animate.dst = dst;
                animate.dst_na = dst_na;
                group.push(animate);
            }
        }

        if let Some(first) = group.first_mut() {
            first.group_first = true;
        }
        if let Some(last) = group.last_mut() {
            last.group_last = true;
        }

        // attach to the nearest enclosing node
        let depth = self.shape_depth;
        if let Some(node) = self
            .image
            .nodes
            .iter_mut()
            .rev()
            .find(|node| node.depth < depth)
        {
            node.animates.extend(group);
        }
    }
}

fn parse_url(value: &str) -> String {
    let inner = value.strip_prefix("url(").unwrap_or(value);
    let inner = inner.strip_prefix('#').unwrap_or(inner);
    match inner.find(')') {
        Some(end) => inner[..end].to_owned(),
        None => inner.to_owned(),
    }
}

/// Parse a `transform` attribute: a whitespace separated list of transform
/// functions composed in document order. Unrecognized entries are skipped.
pub(crate) fn parse_transform_list(value: &str) -> Transform {
    let deg = PI / 180.0;
    let mut xform = Transform::identity();
    let mut rest = value;
    while !rest.is_empty() {
        let mut args = [0.0 as Scalar; 6];
        let parsed = if rest.starts_with("matrix") {
            scan_args(rest, &mut args[..6], true).and_then(|(na, consumed)| {
                (na == 6).then_some((
                    Transform::new(args[0], args[2], args[4], args[1], args[3], args[5]),
                    consumed,
                ))
            })
        } else if rest.starts_with("translate") {
            scan_args(rest, &mut args[..2], true).map(|(_, consumed)| {
                (Transform::default().translate(args[0], args[1]), consumed)
            })
        } else if rest.starts_with("scale") {
            scan_args(rest, &mut args[..2], true).map(|(na, consumed)| {
                let sy = if na == 1 { args[0] } else { args[1] };
                (Transform::default().scale(args[0], sy), consumed)
            })
        } else if rest.starts_with("rotate") {
            scan_args(rest, &mut args[..3], true).map(|(na, consumed)| {
                let tr = if na > 1 {
                    Transform::default().rotate_around(args[0] * deg, (args[1], args[2]))
                } else {
                    Transform::default().rotate(args[0] * deg)
                };
                (tr, consumed)
            })
        } else if rest.starts_with("skewX") {
            scan_args(rest, &mut args[..1], true)
                .map(|(_, consumed)| (Transform::default().skew_x(args[0] * deg), consumed))
        } else if rest.starts_with("skewY") {
            scan_args(rest, &mut args[..1], true)
                .map(|(_, consumed)| (Transform::default().skew_y(args[0] * deg), consumed))
        } else {
            None
        };

        match parsed {
            Some((tr, consumed)) => {
                xform = xform * tr;
                rest = &rest[consumed..];
            }
            None => {
                let mut chars = rest.chars();
                chars.next();
                rest = chars.as_str();
            }
        }
    }
    xform
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert_approx_eq, parse, SpreadMethod};

    fn parse_px(text: &str) -> Image {
        parse(text, Units::Px, 96.0).expect("document should parse")
    }

    #[test]
    fn test_unit_square() {
        let image = parse_px(
            "<svg width=\"10\" height=\"10\" viewBox=\"0 0 10 10\">\
             <rect x=\"0\" y=\"0\" width=\"10\" height=\"10\" fill=\"#ff0000\"/></svg>",
        );
        assert_approx_eq!(image.width(), 10.0);
        assert_approx_eq!(image.height(), 10.0);
        let shapes: Vec<_> = image.shapes().collect();
        assert_eq!(shapes.len(), 1);
        let shape = shapes[0];
        assert_eq!(shape.paths().len(), 1);
        // 4 cubic segments
        assert_eq!(shape.paths()[0].points().len(), 13);
        assert!(shape.paths()[0].is_closed());
        let bounds = shape.bounds();
        assert_approx_eq!(bounds.x(), 0.0);
        assert_approx_eq!(bounds.y(), 0.0);
        assert_approx_eq!(bounds.width(), 10.0);
        assert_approx_eq!(bounds.height(), 10.0);
        assert_eq!(shape.fill().color(), Some(Rgba::new(255, 0, 0, 255)));
        assert_eq!(*shape.stroke(), Paint::None);
        assert!(image.memory_used() > 0);
    }

    #[test]
    fn test_rounded_rect() {
        let image = parse_px(
            "<svg viewBox=\"0 0 20 20\">\
             <rect x=\"2\" y=\"2\" width=\"16\" height=\"16\" rx=\"4\" ry=\"4\"/></svg>",
        );
        let shape = image.shapes().next().unwrap();
        let path = &shape.paths()[0];
        assert!(path.is_closed());
        // 4 corners + 4 straight edges
        assert_eq!((path.points().len() - 1) / 3, 8);
    }

    #[test]
    fn test_rect_single_radius_mirrors() {
        let image = parse_px("<svg viewBox=\"0 0 20 20\"><rect width=\"16\" height=\"16\" rx=\"4\"/></svg>");
        let shape = image.shapes().next().unwrap();
        assert_eq!((shape.paths()[0].points().len() - 1) / 3, 8);
    }

    #[test]
    fn test_short_hex_fill() {
        let image = parse_px("<svg viewBox=\"0 0 1 1\"><rect width=\"1\" height=\"1\" fill=\"#abc\"/></svg>");
        let shape = image.shapes().next().unwrap();
        assert_eq!(shape.fill().color(), Some(Rgba::new(0xaa, 0xbb, 0xcc, 255)));
    }

    #[test]
    fn test_style_attribute() {
        let image = parse_px(
            "<svg viewBox=\"0 0 10 10\">\
             <rect width=\"4\" height=\"4\" style=\"fill: #00ff00; stroke: #0000ff; stroke-width: 3\"/></svg>",
        );
        let shape = image.shapes().next().unwrap();
        assert_eq!(shape.fill().color(), Some(Rgba::new(0, 255, 0, 255)));
        assert_eq!(shape.stroke().color(), Some(Rgba::new(0, 0, 255, 255)));
        assert_approx_eq!(shape.stroke_width(), 3.0);
    }

    #[test]
    fn test_fill_opacity_packs_alpha() {
        let image = parse_px(
            "<svg viewBox=\"0 0 10 10\"><rect width=\"4\" height=\"4\" fill=\"#102030\" fill-opacity=\"0.5\"/></svg>",
        );
        let shape = image.shapes().next().unwrap();
        assert_eq!(shape.fill().color(), Some(Rgba::new(0x10, 0x20, 0x30, 127)));
    }

    #[test]
    fn test_display_none_is_sticky() {
        let image = parse_px(
            "<svg viewBox=\"0 0 10 10\"><g display=\"none\">\
             <rect display=\"inline\" width=\"4\" height=\"4\"/></g></svg>",
        );
        let shape = image.shapes().next().unwrap();
        assert!(!shape.is_visible());
    }

    #[test]
    fn test_group_transform_inherited() {
        let image = parse_px(
            "<svg viewBox=\"0 0 10 10\"><g transform=\"translate(5 0)\">\
             <rect x=\"0\" y=\"0\" width=\"2\" height=\"2\"/></g></svg>",
        );
        let shape = image.shapes().next().unwrap();
        assert_approx_eq!(shape.bounds().x(), 5.0);
        assert_approx_eq!(shape.bounds().width(), 2.0);
    }

    #[test]
    fn test_transform_document_order() {
        let image = parse_px(
            "<svg viewBox=\"0 0 100 100\">\
             <rect width=\"1\" height=\"1\" transform=\"translate(10,0) scale(2)\"/></svg>",
        );
        let shape = image.shapes().next().unwrap();
        // translate applies after scale when reading left to right
        assert_approx_eq!(shape.bounds().x(), 10.0);
        assert_approx_eq!(shape.bounds().width(), 2.0, 1e-5);
    }

    #[test]
    fn test_builders_produce_shapes() {
        let image = parse_px(
            "<svg viewBox=\"0 0 100 100\">\
             <circle cx=\"10\" cy=\"10\" r=\"5\"/>\
             <ellipse cx=\"30\" cy=\"10\" rx=\"5\" ry=\"2\"/>\
             <line x1=\"0\" y1=\"0\" x2=\"10\" y2=\"10\"/>\
             <polyline points=\"0,0 10,0 10,10\"/>\
             <polygon points=\"0,0 10,0 10,10\"/>\
             </svg>",
        );
        let shapes: Vec<_> = image.shapes().collect();
        assert_eq!(shapes.len(), 5);
        // circle is four cubic arcs
        assert_eq!((shapes[0].paths()[0].points().len() - 1) / 3, 4);
        let circle = shapes[0].bounds();
        assert_approx_eq!(circle.x(), 5.0, 1e-4);
        assert_approx_eq!(circle.width(), 10.0, 1e-4);
        // open polyline, closed polygon
        assert!(!shapes[3].paths()[0].is_closed());
        assert!(shapes[4].paths()[0].is_closed());
    }

    #[test]
    fn test_degenerate_shapes_are_dropped() {
        assert!(parse("<svg><rect width=\"0\" height=\"5\"/></svg>", Units::Px, 96.0).is_none());
        assert!(parse("<svg><circle r=\"0\"/></svg>", Units::Px, 96.0).is_none());
        assert!(parse("not xml at all", Units::Px, 96.0).is_none());
        assert!(parse("<svg></svg>", Units::Px, 96.0).is_none());
    }

    #[test]
    fn test_gradient_href_chain() {
        let image = parse_px(
            "<svg viewBox=\"0 0 10 10\"><defs>\
             <linearGradient id=\"a\">\
             <stop offset=\"0\" stop-color=\"#ff0000\"/>\
             <stop offset=\"1\" stop-color=\"#0000ff\" stop-opacity=\"0.5\"/>\
             </linearGradient>\
             <linearGradient id=\"b\" x1=\"0\" y1=\"0\" x2=\"10\" y2=\"0\" \
              gradientUnits=\"userSpaceOnUse\" spreadMethod=\"reflect\" xlink:href=\"#a\"/>\
             </defs>\
             <rect width=\"10\" height=\"10\" fill=\"url(#b)\"/></svg>",
        );
        let shape = image.shapes().next().unwrap();
        let id = match shape.fill() {
            Paint::LinearGradient(id) => *id,
            paint => panic!("expected linear gradient, got {:?}", paint),
        };
        let gradient = image.gradient(id);
        // stops come from the referenced gradient, geometry from the referee
        assert_eq!(gradient.stops().len(), 2);
        assert_eq!(gradient.stops()[0].color, Rgba::new(255, 0, 0, 255));
        assert_eq!(gradient.stops()[1].color, Rgba::new(0, 0, 255, 127));
        assert_eq!(gradient.spread(), SpreadMethod::Reflect);
    }

    #[test]
    fn test_gradient_stops_sorted() {
        let image = parse_px(
            "<svg viewBox=\"0 0 10 10\">\
             <linearGradient id=\"g\">\
             <stop offset=\"0.8\" stop-color=\"#111111\"/>\
             <stop offset=\"0.2\" stop-color=\"#222222\"/>\
             <stop offset=\"0.5\" stop-color=\"#333333\"/>\
             </linearGradient>\
             <rect width=\"10\" height=\"10\" fill=\"url(#g)\"/></svg>",
        );
        let shape = image.shapes().next().unwrap();
        let gradient = image.gradient(shape.fill().gradient().unwrap());
        let offsets: Vec<Scalar> = gradient.stops().iter().map(|s| s.offset).collect();
        for pair in offsets.windows(2) {
            assert!(pair[0] <= pair[1], "stops out of order: {:?}", offsets);
        }
    }

    #[test]
    fn test_gradient_without_stops_paints_nothing() {
        let image = parse_px(
            "<svg viewBox=\"0 0 10 10\">\
             <linearGradient id=\"a\" xlink:href=\"#b\"/>\
             <linearGradient id=\"b\" xlink:href=\"#a\"/>\
             <rect width=\"10\" height=\"10\" fill=\"url(#a)\" stroke=\"url(#missing)\"/></svg>",
        );
        let shape = image.shapes().next().unwrap();
        assert_eq!(*shape.fill(), Paint::None);
        assert_eq!(*shape.stroke(), Paint::None);
    }

    #[test]
    fn test_radial_gradient_resolves() {
        let image = parse_px(
            "<svg viewBox=\"0 0 10 10\">\
             <radialGradient id=\"g\" cx=\"5\" cy=\"5\" r=\"5\" fx=\"2.5\" fy=\"5\" \
              gradientUnits=\"userSpaceOnUse\">\
             <stop offset=\"0\" stop-color=\"#ffffff\"/>\
             <stop offset=\"1\" stop-color=\"#000000\"/>\
             </radialGradient>\
             <rect width=\"10\" height=\"10\" stroke=\"url(#g)\" fill=\"none\"/></svg>",
        );
        let shape = image.shapes().next().unwrap();
        let id = match shape.stroke() {
            Paint::RadialGradient(id) => *id,
            paint => panic!("expected radial gradient, got {:?}", paint),
        };
        let (fx, fy) = image.gradient(id).focal();
        assert_approx_eq!(fx, 0.5);
        assert_approx_eq!(fy, 1.0);
    }

    #[test]
    fn test_viewbox_meet_centers() {
        let image = parse_px(
            "<svg width=\"200\" height=\"100\" viewBox=\"0 0 100 100\" \
              preserveAspectRatio=\"xMidYMid meet\">\
             <rect width=\"100\" height=\"100\"/></svg>",
        );
        let bounds = image.shapes().next().unwrap().bounds();
        assert_approx_eq!(bounds.x(), 50.0);
        assert_approx_eq!(bounds.max().x(), 150.0);
        assert_approx_eq!(bounds.y(), 0.0);
        assert_approx_eq!(bounds.max().y(), 100.0);
    }

    #[test]
    fn test_viewbox_slice_covers() {
        let image = parse_px(
            "<svg width=\"200\" height=\"100\" viewBox=\"0 0 100 100\" \
              preserveAspectRatio=\"xMidYMid slice\">\
             <rect width=\"100\" height=\"100\"/></svg>",
        );
        let bounds = image.shapes().next().unwrap().bounds();
        assert_approx_eq!(bounds.x(), 0.0);
        assert_approx_eq!(bounds.max().x(), 200.0);
        assert_approx_eq!(bounds.y(), -50.0);
        assert_approx_eq!(bounds.max().y(), 150.0);
    }

    const TRANSLATE_FREEZE: &str = "<svg width=\"10\" height=\"10\" viewBox=\"0 0 10 10\">\
         <rect x=\"0\" y=\"0\" width=\"5\" height=\"5\">\
         <animateTransform attributeName=\"transform\" type=\"translate\" \
          from=\"0,0\" to=\"10,0\" dur=\"1s\" fill=\"freeze\"/>\
         </rect></svg>";

    #[test]
    fn test_animate_translate_and_freeze() {
        let mut image = parse_px(TRANSLATE_FREEZE);
        assert!(image.nodes().iter().any(|node| node.has_animations()));

        assert!(image.animate(500));
        let bounds = image.shapes().next().unwrap().bounds();
        assert_approx_eq!(bounds.x(), 5.0, 1e-4);

        // frozen at the destination after the active window
        assert!(image.animate(2000));
        let bounds = image.shapes().next().unwrap().bounds();
        assert_approx_eq!(bounds.x(), 10.0, 1e-4);
    }

    #[test]
    fn test_animate_baseline_identity() {
        let mut image = parse_px(TRANSLATE_FREEZE);
        let before: Vec<crate::Point> = image.shapes().next().unwrap().paths()[0]
            .points()
            .to_vec();
        // before any begin nothing applies
        assert!(!image.animate(-1));
        let after: Vec<crate::Point> = image.shapes().next().unwrap().paths()[0]
            .points()
            .to_vec();
        assert_eq!(before.len(), after.len());
        for (a, b) in before.iter().zip(&after) {
            assert!(a.is_close_to(*b), "{:?} != {:?}", a, b);
        }
    }

    #[test]
    fn test_animate_restart_deterministic() {
        let mut image = parse_px(TRANSLATE_FREEZE);
        image.animate(700);
        let first: Vec<crate::Point> = image.shapes().next().unwrap().paths()[0]
            .points()
            .to_vec();
        image.animate(700);
        let second: Vec<crate::Point> = image.shapes().next().unwrap().paths()[0]
            .points()
            .to_vec();
        for (a, b) in first.iter().zip(&second) {
            assert!(a.is_close_to(*b), "{:?} != {:?}", a, b);
        }
    }

    fn stroke_width_values(fill_mode: &str) -> String {
        format!(
            "<svg width=\"10\" height=\"10\" viewBox=\"0 0 10 10\">\
             <rect width=\"5\" height=\"5\" stroke=\"#000000\">\
             <animate attributeName=\"stroke-width\" values=\"0;5;0\" \
              keyTimes=\"0;0.5;1\" dur=\"2s\" fill=\"{}\"/>\
             </rect></svg>",
            fill_mode
        )
    }

    #[test]
    fn test_animate_values_key_times() {
        let mut image = parse_px(&stroke_width_values("freeze"));
        image.animate(500);
        assert_approx_eq!(image.shapes().next().unwrap().stroke_width(), 2.5, 1e-4);
        // second segment runs back down
        image.animate(1500);
        assert_approx_eq!(image.shapes().next().unwrap().stroke_width(), 2.5, 1e-4);
        // frozen at the final value
        image.animate(2100);
        assert_approx_eq!(image.shapes().next().unwrap().stroke_width(), 0.0, 1e-4);
    }

    #[test]
    fn test_animate_values_removed_after_end() {
        let mut image = parse_px(&stroke_width_values("remove"));
        image.animate(2100);
        // back to the baseline width
        assert_approx_eq!(image.shapes().next().unwrap().stroke_width(), 1.0, 1e-4);
    }

    #[test]
    fn test_animate_spline_progression() {
        let mut image = parse_px(
            "<svg width=\"10\" height=\"10\" viewBox=\"0 0 10 10\">\
             <rect width=\"5\" height=\"5\" stroke=\"#000000\">\
             <animate attributeName=\"stroke-width\" values=\"0;10\" \
              keySplines=\"1 0 1 0\" calcMode=\"spline\" dur=\"2s\"/>\
             </rect></svg>",
        );
        image.animate(1000);
        // time curve at 0.5 gives 0.875, value curve cubes it
        assert_approx_eq!(
            image.shapes().next().unwrap().stroke_width(),
            6.699_218_7,
            1e-3
        );
    }

    #[test]
    fn test_animate_group_applies_to_children() {
        let mut image = parse_px(
            "<svg width=\"20\" height=\"20\" viewBox=\"0 0 20 20\"><g>\
             <animateTransform attributeName=\"transform\" type=\"translate\" \
              from=\"0,0\" to=\"4,0\" dur=\"1s\" fill=\"freeze\"/>\
             <rect width=\"2\" height=\"2\"/></g></svg>",
        );
        assert!(image.animate(500));
        let bounds = image.shapes().next().unwrap().bounds();
        assert_approx_eq!(bounds.x(), 2.0, 1e-4);
    }

    #[test]
    fn test_animate_opacity() {
        let mut image = parse_px(
            "<svg width=\"10\" height=\"10\" viewBox=\"0 0 10 10\">\
             <rect width=\"5\" height=\"5\">\
             <animate attributeName=\"opacity\" from=\"0\" to=\"1\" dur=\"2s\"/>\
             </rect></svg>",
        );
        image.animate(1000);
        assert_approx_eq!(image.shapes().next().unwrap().opacity(), 0.5, 1e-4);
    }

    #[test]
    fn test_animate_fill_color() {
        let mut image = parse_px(
            "<svg width=\"10\" height=\"10\" viewBox=\"0 0 10 10\">\
             <rect width=\"5\" height=\"5\" fill=\"#000000\">\
             <animate attributeName=\"fill\" from=\"#000000\" to=\"#ff0000\" dur=\"1s\"/>\
             </rect></svg>",
        );
        image.animate(500);
        let color = image.shapes().next().unwrap().fill().color().unwrap();
        assert_eq!(color.red(), 127);
        assert_eq!(color.green(), 0);
        // alpha is preserved by color animation
        assert_eq!(color.alpha(), 255);
    }

    #[test]
    fn test_animate_repeat_count() {
        let mut image = parse_px(
            "<svg width=\"10\" height=\"10\" viewBox=\"0 0 10 10\">\
             <rect width=\"5\" height=\"5\">\
             <animateTransform attributeName=\"transform\" type=\"translate\" \
              from=\"0,0\" to=\"10,0\" dur=\"1s\" repeatCount=\"2\" fill=\"freeze\"/>\
             </rect></svg>",
        );
        // second repetition wraps from the start
        image.animate(1500);
        assert_approx_eq!(image.shapes().next().unwrap().bounds().x(), 5.0, 1e-4);
        // past both repetitions the value freezes at the destination
        image.animate(2500);
        assert_approx_eq!(image.shapes().next().unwrap().bounds().x(), 10.0, 1e-4);
    }

    #[test]
    fn test_invalid_animate_descriptors_dropped() {
        for descriptor in [
            // missing dur
            "<animate attributeName=\"opacity\" from=\"0\" to=\"1\"/>",
            // neither values nor from/to
            "<animate attributeName=\"opacity\" dur=\"1s\"/>",
            // keyTimes arity mismatch
            "<animate attributeName=\"opacity\" values=\"0;1\" keyTimes=\"0;0.5;1\" dur=\"1s\"/>",
            // keySplines arity mismatch
            "<animate attributeName=\"opacity\" values=\"0;1\" keySplines=\"0 0 1 1;0 0 1 1\" dur=\"1s\"/>",
            // unsupported attribute
            "<animate attributeName=\"x\" from=\"0\" to=\"1\" dur=\"1s\"/>",
            // animateTransform needs attributeName=transform and a known type
            "<animateTransform attributeName=\"opacity\" type=\"translate\" from=\"0\" to=\"1\" dur=\"1s\"/>",
            "<animateTransform attributeName=\"transform\" type=\"spin\" from=\"0\" to=\"1\" dur=\"1s\"/>",
        ] {
            let text = format!(
                "<svg width=\"10\" height=\"10\" viewBox=\"0 0 10 10\">\
                 <rect width=\"5\" height=\"5\">{}</rect></svg>",
                descriptor
            );
            let mut image = parse_px(&text);
            assert!(
                image.nodes().iter().all(|node| !node.has_animations()),
                "descriptor should be dropped: {}",
                descriptor
            );
            assert!(!image.animate(500));
        }
    }

    #[test]
    fn test_memory_stable_across_animate() {
        let mut image = parse_px(TRANSLATE_FREEZE);
        let before = image.memory_used();
        image.animate(500);
        image.animate(900);
        assert_eq!(image.memory_used(), before);
    }

    #[test]
    fn test_dash_array_attribute() {
        let image = parse_px(
            "<svg width=\"10\" height=\"10\" viewBox=\"0 0 10 10\">\
             <rect width=\"5\" height=\"5\" stroke=\"#000000\" \
              stroke-dasharray=\"4 2\" stroke-dashoffset=\"1\"/></svg>",
        );
        let shape = image.shapes().next().unwrap();
        assert_eq!(shape.stroke_dash_array().len(), 2);
        assert_approx_eq!(shape.stroke_dash_array()[0], 4.0);
        assert_approx_eq!(shape.stroke_dash_offset(), 1.0);
    }

    #[test]
    fn test_parse_transform_list() {
        let tr = parse_transform_list("matrix(1 0 0 1 7 8)");
        let p = tr.apply(Point::new(0.0, 0.0));
        assert_approx_eq!(p.x(), 7.0);
        assert_approx_eq!(p.y(), 8.0);
        // junk entries are skipped, good ones still apply
        let tr = parse_transform_list("bogus(3) translate(1 2)");
        let p = tr.apply(Point::new(0.0, 0.0));
        assert_approx_eq!(p.x(), 1.0);
        assert_approx_eq!(p.y(), 2.0);
        let tr = parse_transform_list("rotate(90 1 1)");
        let p = tr.apply(Point::new(2.0, 1.0));
        assert_approx_eq!(p.x(), 1.0, 1e-5);
        assert_approx_eq!(p.y(), 2.0, 1e-5);
    }

    #[test]
    fn test_nested_viewbox_units() {
        // physical units scale the whole scene through the unit factor
        let image = parse(
            "<svg width=\"1in\" height=\"1in\" viewBox=\"0 0 96 96\">\
             <rect width=\"96\" height=\"96\"/></svg>",
            Units::In,
            96.0,
        )
        .unwrap();
        // 1 inch output in inch units spans exactly one unit
        let bounds = image.shapes().next().unwrap().bounds();
        assert_approx_eq!(bounds.width(), 1.0, 1e-4);
    }
}
