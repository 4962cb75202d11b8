// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use diagsvg_css::Stylesheet;
use diagsvg_types::{Point, Rect as ViewBox, Size, Transform};
use indexmap::IndexMap;

use crate::text::TextRun;

mod info;

pub use info::*;

/// An SVG tree with a cascaded style side-table.
#[derive(Clone, PartialEq, Debug)]
pub struct Tree {
    pub(crate) root: Node,
    pub(crate) styles: StyleMap,
    pub(crate) stylesheet: Stylesheet,
    pub(crate) markers: IndexMap<String, Marker>,
    pub(crate) gradients: IndexMap<String, Gradient>,
    pub(crate) font_size: f64,
}

impl Tree {
    /// Returns the root `svg` node.
    #[inline]
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Returns cascaded properties of all nodes.
    #[inline]
    pub fn styles(&self) -> &StyleMap {
        &self.styles
    }

    /// Returns all rules collected from `style` elements.
    #[inline]
    pub fn stylesheet(&self) -> &Stylesheet {
        &self.stylesheet
    }

    /// Returns the default font size.
    #[inline]
    pub fn font_size(&self) -> f64 {
        self.font_size
    }

    /// Returns a marker by a `url(#id)` reference.
    pub fn marker(&self, url: &str) -> Option<&Marker> {
        self.markers.get(url)
    }

    /// Returns a gradient by a `url(#id)` reference.
    pub fn gradient(&self, url: &str) -> Option<&Gradient> {
        self.gradients.get(url)
    }

    /// Returns the document size.
    ///
    /// Uses `width` and `height` when both are set, the `viewBox` size otherwise.
    pub fn size(&self) -> Option<Size> {
        let doc = self.document()?;
        match (doc.width, doc.height) {
            (Some(w), Some(h)) => Some(Size::new(w, h)),
            _ => doc.view_box.map(|r| r.size()),
        }
    }

    /// Returns the document `viewBox`.
    pub fn view_box(&self) -> Option<ViewBox> {
        self.document()?.view_box
    }

    fn document(&self) -> Option<&Document> {
        match self.root.kind {
            Element::Document(ref doc) => Some(doc),
            _ => None,
        }
    }
}

/// An element.
#[derive(Clone, PartialEq, Debug)]
pub struct Node {
    /// Attributes shared by all elements.
    pub info: Info,
    /// Element-specific data.
    pub kind: Element,
}

impl Node {
    /// Creates a new node.
    pub fn new(info: Info, kind: Element) -> Self {
        Node { info, kind }
    }

    /// Returns node's child elements.
    ///
    /// Marker instances of lines and paths are not children.
    pub fn children(&self) -> &[Node] {
        match self.kind {
            Element::Document(ref e) => &e.children,
            Element::Group(ref e) => &e.children,
            Element::Text(ref e) => &e.children,
            Element::ForeignObject(ref e) => &e.children,
            Element::Marker(ref e) => &e.children,
            Element::Gradient(ref e) => &e.children,
            Element::Switch(ref e) => &e.children,
            Element::Unknown(ref e) => &e.children,
            _ => &[],
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self.kind {
            Element::Document(ref mut e) => Some(&mut e.children),
            Element::Group(ref mut e) => Some(&mut e.children),
            Element::Text(ref mut e) => Some(&mut e.children),
            Element::ForeignObject(ref mut e) => Some(&mut e.children),
            Element::Marker(ref mut e) => Some(&mut e.children),
            Element::Gradient(ref mut e) => Some(&mut e.children),
            Element::Switch(ref mut e) => Some(&mut e.children),
            Element::Unknown(ref mut e) => Some(&mut e.children),
            _ => None,
        }
    }

    /// Returns an iterator over this node and all its descendants, in document order.
    pub fn descendants(&self) -> Descendants {
        Descendants { stack: vec![self] }
    }
}

/// An iterator over a node subtree.
#[derive(Clone, Debug)]
pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

/// Element kinds.
#[allow(missing_docs)]
#[derive(Clone, PartialEq, Debug)]
pub enum Element {
    Document(Document),
    Group(Group),
    Rect(Rect),
    Circle(Circle),
    Ellipse(Ellipse),
    Line(Line),
    Polygon(Polygon),
    Polyline(Polyline),
    Path(Path),
    Text(Text),
    ForeignObject(ForeignObject),
    Marker(Marker),
    Gradient(Gradient),
    Switch(Switch),
    Unknown(Unknown),
}

/// The `svg` element.
#[derive(Clone, PartialEq, Default, Debug)]
pub struct Document {
    /// `width` attribute.
    pub width: Option<f64>,
    /// `height` attribute.
    pub height: Option<f64>,
    /// `viewBox` attribute.
    pub view_box: Option<ViewBox>,
    /// Child elements.
    pub children: Vec<Node>,
}

/// The `g` element.
#[derive(Clone, PartialEq, Default, Debug)]
pub struct Group {
    /// Child elements.
    pub children: Vec<Node>,
}

/// The `rect` element.
#[allow(missing_docs)]
#[derive(Clone, PartialEq, Default, Debug)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rx: Option<f64>,
    pub ry: Option<f64>,
}

/// The `circle` element.
#[allow(missing_docs)]
#[derive(Clone, PartialEq, Default, Debug)]
pub struct Circle {
    pub cx: f64,
    pub cy: f64,
    pub r: f64,
}

/// The `ellipse` element.
#[allow(missing_docs)]
#[derive(Clone, PartialEq, Default, Debug)]
pub struct Ellipse {
    pub cx: f64,
    pub cy: f64,
    pub rx: f64,
    pub ry: f64,
}

/// The `line` element.
#[derive(Clone, PartialEq, Default, Debug)]
pub struct Line {
    #[allow(missing_docs)]
    pub x1: f64,
    #[allow(missing_docs)]
    pub y1: f64,
    #[allow(missing_docs)]
    pub x2: f64,
    #[allow(missing_docs)]
    pub y2: f64,
    /// Resolved marker contents, in canvas coordinates.
    pub markers: Vec<Node>,
}

impl Line {
    /// Returns the start point.
    pub fn start(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    /// Returns the end point.
    pub fn end(&self) -> Point {
        Point::new(self.x2, self.y2)
    }
}

impl diagsvg_types::MarkerAnchors for Line {
    fn end_marker_anchor(&self) -> Option<(Point, Point)> {
        Some((self.end(), self.start()))
    }

    fn start_marker_anchor(&self) -> Option<(Point, Point)> {
        Some((self.start(), self.end()))
    }
}

/// The `polygon` element.
#[derive(Clone, PartialEq, Default, Debug)]
pub struct Polygon {
    /// Points in the source order.
    pub points: Vec<Point>,
}

/// The `polyline` element.
#[derive(Clone, PartialEq, Default, Debug)]
pub struct Polyline {
    /// Points in the source order.
    pub points: Vec<Point>,
}

/// The `path` element.
#[derive(Clone, PartialEq, Default, Debug)]
pub struct Path {
    /// Parsed `d` attribute.
    pub data: diagsvg_types::Path,
    /// Resolved marker contents, in canvas coordinates.
    pub markers: Vec<Node>,
}

/// The `text` element.
///
/// `tspan` children are kept as [`Unknown`] elements and flattened
/// into runs by [`Text::runs`](crate::Text::runs).
#[derive(Clone, PartialEq, Default, Debug)]
pub struct Text {
    /// Raw `x` attribute. Can be relative to the font size.
    pub x: String,
    /// Raw `y` attribute.
    pub y: String,
    /// Raw `dx` attribute.
    pub dx: Option<String>,
    /// Raw `dy` attribute.
    pub dy: Option<String>,
    /// Trimmed text content, without children's text.
    pub content: String,
    /// Child elements.
    pub children: Vec<Node>,
    /// Transforms to apply during layout, outermost first.
    pub transforms: Vec<Transform>,
    /// Resolved font size.
    pub font_size: Option<f64>,
    /// Top-left corner after layout.
    pub start: Point,
    /// A single flattened run.
    pub run: Option<TextRun>,
}

/// The `foreignObject` element.
#[derive(Clone, PartialEq, Default, Debug)]
pub struct ForeignObject {
    #[allow(missing_docs)]
    pub x: f64,
    #[allow(missing_docs)]
    pub y: f64,
    #[allow(missing_docs)]
    pub width: Option<f64>,
    #[allow(missing_docs)]
    pub height: Option<f64>,
    /// Child elements, usually HTML.
    pub children: Vec<Node>,
    /// Transforms to apply during layout, outermost first.
    pub transforms: Vec<Transform>,
}

/// The `marker` element.
#[derive(Clone, PartialEq, Debug)]
pub struct Marker {
    /// `markerUnits` attribute.
    ///
    /// Default: strokeWidth
    pub marker_units: String,
    /// `markerWidth` attribute.
    ///
    /// Default: 3
    pub marker_width: f64,
    /// `markerHeight` attribute.
    ///
    /// Default: 3
    pub marker_height: f64,
    /// `orient` attribute.
    ///
    /// Default: 0
    pub orient: String,
    /// Raw `refX` attribute.
    pub ref_x: String,
    /// Raw `refY` attribute.
    pub ref_y: String,
    /// `viewBox` attribute.
    pub view_box: Option<ViewBox>,
    /// Marker contents.
    pub children: Vec<Node>,
}

impl Default for Marker {
    fn default() -> Self {
        Marker {
            marker_units: "strokeWidth".to_string(),
            marker_width: 3.0,
            marker_height: 3.0,
            orient: "0".to_string(),
            ref_x: "0".to_string(),
            ref_y: "0".to_string(),
            view_box: None,
            children: Vec::new(),
        }
    }
}

/// The `linearGradient` element.
#[derive(Clone, PartialEq, Default, Debug)]
pub struct Gradient {
    #[allow(missing_docs)]
    pub x1: Option<String>,
    #[allow(missing_docs)]
    pub y1: Option<String>,
    #[allow(missing_docs)]
    pub x2: Option<String>,
    #[allow(missing_docs)]
    pub y2: Option<String>,
    /// `stop` elements.
    pub children: Vec<Node>,
}

/// The `switch` element.
#[derive(Clone, PartialEq, Default, Debug)]
pub struct Switch {
    /// Child elements.
    pub children: Vec<Node>,
}

/// Any other element, including `tspan` and HTML inside `foreignObject`.
#[derive(Clone, PartialEq, Default, Debug)]
pub struct Unknown {
    /// Trimmed text content, without children's text.
    pub text: String,
    /// Child elements.
    pub children: Vec<Node>,
}
