// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use diagsvg_types::{Point, Rect as Bounds, Size, Transform};

use crate::tree::{Element, ForeignObject, Info, Node, StyleMap, Text, Tree};
use crate::{units, FontMetrics, FontMetricsProvider};

/// A single line of text, ready to be measured and drawn.
#[derive(Clone, PartialEq, Debug)]
pub struct TextRun {
    /// Info of the element the run starts at.
    pub info: Info,
    /// Run position before layout.
    pub start: Point,
    /// Run text. Joined with spaces when it spans several elements.
    pub text: String,
    /// Resolved font size.
    pub font_size: Option<f64>,
    /// Background color. Set only for `foreignObject` labels.
    pub fill: Option<String>,
    /// Text color. Set only for `foreignObject` labels.
    pub color: Option<String>,
    /// Measured size. Filled in by the caller.
    pub frame_size: Size,
}

impl TextRun {
    fn new(info: Info, start: Point, text: String, font_size: Option<f64>) -> Self {
        TextRun {
            info,
            start,
            text,
            font_size,
            fill: None,
            color: None,
            frame_size: Size::default(),
        }
    }
}

/// An accumulated `dy` offset of a text run.
///
/// The offset is `em * font_size + px`.
#[derive(Clone, Copy, PartialEq, Default, Debug)]
pub struct BaselineShift {
    /// Offset in font sizes.
    pub em: f64,
    /// Absolute offset.
    pub px: f64,
}

impl BaselineShift {
    /// Resolves the offset for a font size.
    pub fn resolve(&self, font_size: f64) -> f64 {
        self.em * font_size + self.px
    }

    /// Adds a `dy` value.
    ///
    /// A missing or malformed value keeps the shift unchanged.
    pub fn then(self, dy: Option<&str>) -> Self {
        let dy = match dy {
            Some(v) => v.trim(),
            None => return self,
        };

        let mut shift = self;
        match dy.strip_suffix("em") {
            Some(n) => {
                if let Ok(n) = n.parse::<f64>() {
                    shift.em += n;
                }
            }
            None => {
                if let Ok(n) = dy.parse::<f64>() {
                    shift.px += n;
                }
            }
        }

        shift
    }
}

/// Resolves `font-size` and scales it by the transforms.
fn scaled_font_size(styles: &StyleMap, info: &Info, transforms: &[Transform]) -> Option<f64> {
    let size = units::parse_px(&info.style("font-size", styles)?)?;
    Some(
        transforms
            .iter()
            .rev()
            .fold(size, |size, ts| ts.apply_scale_value(size)),
    )
}

impl Text {
    /// Returns a copy with the font size resolved from `info`.
    ///
    /// Keeps the current font size when `font-size` is not set.
    pub fn scale_font_size(&self, tree: &Tree, info: &Info) -> Text {
        let mut text = self.clone();
        if let Some(size) = scaled_font_size(tree.styles(), info, &self.transforms) {
            text.font_size = Some(size);
        }

        text
    }

    /// Returns the text as a single run.
    ///
    /// A run produced by [`Text::runs`] is returned as is.
    pub fn run(&self, tree: &Tree, info: &Info) -> TextRun {
        if let Some(ref run) = self.run {
            return run.clone();
        }

        let font_size = scaled_font_size(tree.styles(), info, &self.transforms);
        let start = self.parse_xy(
            tree,
            info.properties.get("x").map(String::as_str).unwrap_or(""),
            info.properties.get("y").map(String::as_str).unwrap_or(""),
            font_size,
        );

        TextRun::new(info.clone(), start, self.content.clone(), font_size)
    }

    /// Flattens `tspan` children into runs.
    ///
    /// A child with an `x` or `y` attribute starts a new run. The text of
    /// any other child is appended to the current run. Each run is returned
    /// as a `Text` node with a [`BaselineShift`] in its info.
    pub fn runs(&self, tree: &Tree) -> Vec<Node> {
        let mut stack = Vec::new();
        let mut runs = Vec::new();
        for child in &self.children {
            runs.extend(self.collect_runs(child, tree, &mut stack));
        }

        let styles = tree.styles();
        let mut shift = BaselineShift::default();
        runs.into_iter()
            .map(|mut run| {
                if run.info.property("y", styles).is_some() {
                    shift = BaselineShift::default();
                }

                shift = shift.then(run.info.property("dy", styles).as_deref());
                run.info.baseline_shift = Some(shift);

                let info = run.info.clone();
                let text = Text {
                    transforms: self.transforms.clone(),
                    run: Some(run),
                    ..Text::default()
                };

                Node::new(info, Element::Text(text))
            })
            .collect()
    }

    fn collect_runs(&self, node: &Node, tree: &Tree, stack: &mut Vec<TextRun>) -> Vec<TextRun> {
        let unknown = match node.kind {
            Element::Unknown(ref e) => e,
            _ => return Vec::new(),
        };

        let styles = tree.styles();
        let info = &node.info;

        let mut font_size = self.font_size;
        if let Some(size) = scaled_font_size(styles, info, &self.transforms) {
            font_size = Some(size);
        }

        let x = info.properties.get("x").cloned().unwrap_or_default();
        let y = info.property("y", styles).unwrap_or_default();

        let is_pushed = info.properties.contains_key("x") || info.properties.contains_key("y");
        if is_pushed {
            let start = self.parse_xy(tree, &x, &y, font_size);
            stack.push(TextRun::new(info.clone(), start, unknown.text.clone(), font_size));
        } else if let Some(last) = stack.last_mut() {
            if last.text.is_empty() {
                last.text = unknown.text.clone();
            } else {
                last.text.push(' ');
                last.text.push_str(&unknown.text);
            }
        }

        let mut runs = Vec::new();
        for child in &unknown.children {
            runs.extend(self.collect_runs(child, tree, stack));
        }

        if is_pushed {
            if let Some(run) = stack.pop() {
                runs.insert(0, run);
            }
        }

        runs
    }

    fn parse_xy(&self, tree: &Tree, x: &str, y: &str, font_size: Option<f64>) -> Point {
        let font_size = font_size.or(self.font_size).unwrap_or(tree.font_size());
        Point::new(
            units::parse_em(x, font_size).unwrap_or(0.0),
            units::parse_em(y, font_size).unwrap_or(0.0),
        )
    }

    /// Places a measured run.
    ///
    /// Applies `text-anchor`, `dominant-baseline`, the stored transforms
    /// and rotation. The result is a `Text` node which `start` is the top-left
    /// corner of the run's bounding box in canvas coordinates.
    pub fn layout(&self, tree: &Tree, bound_size: Size, metrics: &FontMetrics, run: &TextRun) -> Node {
        let styles = tree.styles();
        let mut info = run.info.clone();

        let (sx, sy) = self
            .transforms
            .iter()
            .rev()
            .fold((1.0, 1.0), |(x, y), ts| {
                let (tx, ty) = ts.scale();
                (x * tx, y * ty)
            });

        let mut start = run.start;
        match info.style("text-anchor", styles).as_deref() {
            Some("end") => start.x -= bound_size.width / sx,
            Some("middle") => start.x -= bound_size.width / sx / 2.0,
            _ => {}
        }

        match info.style("dominant-baseline", styles).as_deref() {
            Some("middle") => {
                start.y += metrics.descender - (metrics.ascender + metrics.descender) / 2.0;
            }
            Some("hanging") => start.y += metrics.descender,
            Some("text-before-edge") => start.y += metrics.descender + metrics.leading,
            Some("text-after-edge") => start.y -= bound_size.height,
            _ => start.y -= metrics.ascender / sy,
        }

        let local = Bounds::new(
            start.x,
            start.y,
            bound_size.width / sx,
            bound_size.height / sy,
        );
        let mut center = local.center();
        let mut rotation = info.rotation.unwrap_or(0.0);
        for ts in self.transforms.iter().rev() {
            center = ts.apply(center);
            rotation += ts.rotation();
        }

        info.rotation = Some(rotation);

        let mut text = self.clone();
        let bounds = Bounds::from_center(center, bound_size);
        text.start = Point::new(bounds.x, bounds.y);

        Node::new(info, Element::Text(text))
    }

    /// Places a measured run using metrics from a provider.
    ///
    /// Returns `None` when the provider has no metrics for the run's font.
    pub fn layout_with<P: FontMetricsProvider>(
        &self,
        tree: &Tree,
        bound_size: Size,
        provider: &P,
        run: &TextRun,
    ) -> Option<Node> {
        let family = run.info.style("font-family", tree.styles());
        let size = run.font_size.or(self.font_size).unwrap_or(tree.font_size());
        let metrics = provider.metrics(family.as_deref(), size)?;
        Some(self.layout(tree, bound_size, &metrics, run))
    }
}

impl ForeignObject {
    /// Extracts a label.
    ///
    /// Searches children breadth-first for the first element with text.
    /// Only elements other than SVG ones are visited.
    /// The run starts at the object's top-left corner in canvas coordinates.
    pub fn text_run(&self, tree: &Tree, info: &Info) -> Option<TextRun> {
        let mut items: Vec<&Node> = self.children.iter().collect();
        let mut found = None;
        'search: while !items.is_empty() {
            let mut next = Vec::new();
            for node in items {
                if let Element::Unknown(ref e) = node.kind {
                    if e.text.is_empty() {
                        next.extend(e.children.iter());
                        continue;
                    }

                    found = Some((node, e));
                    break 'search;
                }
            }

            items = next;
        }

        let (node, unknown) = found?;
        let styles = tree.styles();

        let (start, rotation) = self.place(info);
        let mut run_info = node.info.clone();
        run_info.rotation = Some(rotation);

        let mut run = TextRun::new(
            run_info,
            start,
            unknown.text.clone(),
            scaled_font_size(styles, info, &self.transforms),
        );
        run.fill = node.info.style("background-color", styles);
        run.color = node.info.style("color", styles);
        Some(run)
    }

    fn place(&self, info: &Info) -> (Point, f64) {
        let bounds = Bounds::new(
            self.x,
            self.y,
            self.width.unwrap_or(0.0),
            self.height.unwrap_or(0.0),
        );

        let mut size = bounds.size();
        let mut center = bounds.center();
        let mut rotation = info.rotation.unwrap_or(0.0);
        for ts in self.transforms.iter().rev() {
            center = ts.apply(center);
            size = ts.apply_scale(size);
            rotation += ts.rotation();
        }

        let bounds = Bounds::from_center(center, size);
        (Point::new(bounds.x, bounds.y), rotation)
    }
}
