// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use diagsvg_css::Stylesheet;
use diagsvg_types::{parse_points, Transform};

use crate::tree::*;
use crate::{units, Error, Options};

/// Builds an element tree from a stream of XML events.
///
/// [`Tree::from_str`] drives it from a `roxmltree` document, but any event
/// source can be used.
///
/// # Examples
///
/// ```
/// use diagsvg::{Builder, Element, Options};
///
/// let opt = Options::default();
/// let mut builder = Builder::new(&opt);
/// builder.start_element("svg", [("width", "10")]).unwrap();
/// builder.start_element("text", [("x", "1")]).unwrap();
/// builder.characters(" Label ");
/// builder.end_element("text");
/// builder.end_element("svg");
///
/// let (root, _) = builder.finish().unwrap();
/// assert!(matches!(root.kind, Element::Document(_)));
/// ```
#[derive(Debug)]
pub struct Builder<'a> {
    opt: &'a Options,
    stack: Vec<Node>,
    root: Option<Node>,
    text: String,
    stylesheet: Stylesheet,
    nodes_count: usize,
}

impl<'a> Builder<'a> {
    /// Creates a new, empty builder.
    pub fn new(opt: &'a Options) -> Self {
        Builder {
            opt,
            stack: Vec::new(),
            root: None,
            text: String::new(),
            stylesheet: Stylesheet::new(),
            nodes_count: 0,
        }
    }

    /// Opens a new element.
    ///
    /// Attribute names are case-sensitive, like `viewBox` or `refX`.
    pub fn start_element<'i, I>(&mut self, name: &str, attrs: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = (&'i str, &'i str)>,
    {
        self.nodes_count += 1;
        if self.nodes_count > self.opt.nodes_limit {
            return Err(Error::ElementsLimitReached);
        }

        let attrs = Attributes(attrs.into_iter().collect());
        let tag = name.to_ascii_lowercase();
        self.text.clear();
        self.stack.push(create_node(&tag, &attrs));
        Ok(())
    }

    /// Appends character data to the current element.
    pub fn characters(&mut self, text: &str) {
        self.text.push_str(text);
    }

    /// Closes the current element.
    ///
    /// The closed element is appended to its parent. Elements that cannot
    /// have children, like `rect`, drop it.
    pub fn end_element(&mut self, name: &str) {
        if name.eq_ignore_ascii_case("style") {
            match Stylesheet::parse(&self.text) {
                Ok(sheet) => self.stylesheet.merge(sheet),
                Err(e) => log::warn!("Failed to parse a style element cause {}.", e),
            }
        }

        let mut node = match self.stack.pop() {
            Some(v) => v,
            None => return,
        };

        let text = self.text.trim();
        match node.kind {
            Element::Text(ref mut e) => e.content.push_str(text),
            Element::Unknown(ref mut e) => e.text.push_str(text),
            _ => {}
        }

        self.text.clear();

        match self.stack.last_mut() {
            Some(parent) => {
                if let Some(children) = parent.children_mut() {
                    children.push(node);
                }
            }
            None => self.root = Some(node),
        }
    }

    /// Returns the root node and all parsed `style` elements.
    ///
    /// Elements that are still open are closed first.
    pub fn finish(mut self) -> Result<(Node, Stylesheet), Error> {
        while let Some(node) = self.stack.last() {
            let tag = node.info.tag.clone();
            self.end_element(&tag);
        }

        match self.root {
            Some(root) if matches!(root.kind, Element::Document(_)) => Ok((root, self.stylesheet)),
            _ => Err(Error::InvalidRoot),
        }
    }
}

/// Feeds a parsed XML document into a [`Builder`].
pub(crate) fn build(xml: &roxmltree::Document, opt: &Options) -> Result<(Node, Stylesheet), Error> {
    let mut builder = Builder::new(opt);
    for node in xml.root().children() {
        parse_xml_node(node, &mut builder)?;
    }

    builder.finish()
}

fn parse_xml_node(node: roxmltree::Node, builder: &mut Builder) -> Result<(), Error> {
    match node.node_type() {
        roxmltree::NodeType::Element => {
            let name = node.tag_name().name();
            let attrs = node.attributes().map(|a| (a.name(), a.value()));
            builder.start_element(name, attrs)?;

            for child in node.children() {
                parse_xml_node(child, builder)?;
            }

            builder.end_element(name);
        }
        roxmltree::NodeType::Text => {
            if let Some(text) = node.text() {
                builder.characters(text);
            }
        }
        _ => {}
    }

    Ok(())
}

struct Attributes<'i>(Vec<(&'i str, &'i str)>);

impl<'i> Attributes<'i> {
    fn get(&self, name: &str) -> Option<&'i str> {
        self.0.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
    }

    fn length(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(units::parse_length)
    }

    fn string(&self, name: &str) -> Option<String> {
        self.get(name).map(str::to_string)
    }
}

fn create_node(tag: &str, attrs: &Attributes) -> Node {
    let kind = match tag {
        "svg" => Element::Document(Document {
            width: attrs.length("width"),
            height: attrs.length("height"),
            view_box: attrs.get("viewBox").and_then(units::parse_view_box),
            children: Vec::new(),
        }),
        "g" => Element::Group(Group::default()),
        "path" => Element::Path(Path {
            data: diagsvg_types::Path::parse(attrs.get("d").unwrap_or("")),
            markers: Vec::new(),
        }),
        "rect" => Element::Rect(Rect {
            x: attrs.length("x").unwrap_or(0.0),
            y: attrs.length("y").unwrap_or(0.0),
            width: attrs.length("width").unwrap_or(0.0),
            height: attrs.length("height").unwrap_or(0.0),
            rx: attrs.length("rx"),
            ry: attrs.length("ry"),
        }),
        "circle" => Element::Circle(Circle {
            cx: attrs.length("cx").unwrap_or(0.0),
            cy: attrs.length("cy").unwrap_or(0.0),
            r: attrs.length("r").unwrap_or(0.0),
        }),
        "ellipse" => Element::Ellipse(Ellipse {
            cx: attrs.length("cx").unwrap_or(0.0),
            cy: attrs.length("cy").unwrap_or(0.0),
            rx: attrs.length("rx").unwrap_or(0.0),
            ry: attrs.length("ry").unwrap_or(0.0),
        }),
        "line" => Element::Line(Line {
            x1: attrs.length("x1").unwrap_or(0.0),
            y1: attrs.length("y1").unwrap_or(0.0),
            x2: attrs.length("x2").unwrap_or(0.0),
            y2: attrs.length("y2").unwrap_or(0.0),
            markers: Vec::new(),
        }),
        "text" => Element::Text(Text {
            x: attrs.get("x").unwrap_or("0").to_string(),
            y: attrs.get("y").unwrap_or("0").to_string(),
            dx: attrs.string("dx"),
            dy: attrs.string("dy"),
            ..Text::default()
        }),
        "polygon" => Element::Polygon(Polygon {
            points: parse_points(attrs.get("points").unwrap_or("")),
        }),
        "polyline" => Element::Polyline(Polyline {
            points: parse_points(attrs.get("points").unwrap_or("")),
        }),
        "foreignobject" => Element::ForeignObject(ForeignObject {
            x: attrs.length("x").unwrap_or(0.0),
            y: attrs.length("y").unwrap_or(0.0),
            width: attrs.length("width"),
            height: attrs.length("height"),
            ..ForeignObject::default()
        }),
        "marker" => Element::Marker(create_marker(attrs)),
        "switch" => Element::Switch(Switch::default()),
        "lineargradient" => Element::Gradient(Gradient {
            x1: attrs.string("x1"),
            y1: attrs.string("y1"),
            x2: attrs.string("x2"),
            y2: attrs.string("y2"),
            children: Vec::new(),
        }),
        _ => Element::Unknown(Unknown::default()),
    };

    Node::new(parse_info(tag, attrs), kind)
}

fn create_marker(attrs: &Attributes) -> Marker {
    let mut marker = Marker::default();
    if let Some(value) = attrs.string("markerUnits") {
        marker.marker_units = value;
    }

    if let Some(value) = attrs.string("orient") {
        marker.orient = value;
    }

    if let Some(value) = attrs.string("refX") {
        marker.ref_x = value;
    }

    if let Some(value) = attrs.string("refY") {
        marker.ref_y = value;
    }

    if let Some(value) = attrs.length("markerWidth") {
        marker.marker_width = value;
    }

    if let Some(value) = attrs.length("markerHeight") {
        marker.marker_height = value;
    }

    marker.view_box = attrs.get("viewBox").and_then(units::parse_view_box);
    marker
}

fn parse_info(tag: &str, attrs: &Attributes) -> Info {
    let mut info = Info::new(tag);

    if let Some(class) = attrs.get("class") {
        info.class_name = Some(class.to_string());
        info.style.insert("class".to_string(), class.to_string());
    }

    info.id = attrs.string("id");

    if let Some(value) = attrs.get("transform") {
        info.transform = Transform::parse(value);
        info.style.insert("transform".to_string(), value.to_string());
    }

    for name in GEOMETRY_ATTRIBUTES.iter().chain(ATTRIBUTES) {
        if let Some(value) = attrs.get(name) {
            info.properties.insert(name.to_string(), value.to_string());
        }
    }

    if let Some(style) = attrs.get("style") {
        match diagsvg_css::parse_inline_style(style) {
            Ok(declarations) => {
                for (name, value) in declarations {
                    info.style.insert(name, value);
                }
            }
            Err(e) => log::warn!("Failed to parse a style attribute cause {}.", e),
        }
    }

    info
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<(Node, Stylesheet), Error> {
        let xml = roxmltree::Document::parse(text)?;
        build(&xml, &Options::default())
    }

    #[test]
    fn structure() {
        let (root, sheet) = parse(
            "<svg xmlns='http://www.w3.org/2000/svg' width='100' height='50%' viewBox='0 0 100 50'>
                <style>.a { fill: red }</style>
                <G id='g1' class='a b'><rect x='1' y='2' width='3' height='4px' rx='1'/></G>
                <rect width='1' height='1'><title>dropped</title></rect>
            </svg>",
        )
        .unwrap();

        assert_eq!(sheet.rules.len(), 1);
        match root.kind {
            Element::Document(ref doc) => {
                assert_eq!(doc.width, Some(100.0));
                assert_eq!(doc.height, Some(0.5));
                assert_eq!(doc.view_box.map(|r| r.width), Some(100.0));
            }
            _ => panic!("not a document"),
        }

        let children = root.children();
        assert_eq!(children.len(), 3);
        assert_eq!(children[0].info.tag, "style");

        let group = &children[1];
        assert_eq!(group.info.tag, "g");
        assert_eq!(group.info.id.as_deref(), Some("g1"));
        assert_eq!(group.info.classes(), vec!["a", "b"]);
        assert_eq!(group.info.style["class"], "a b");
        assert_eq!(
            group.children()[0].kind,
            Element::Rect(Rect { x: 1.0, y: 2.0, width: 3.0, height: 4.0, rx: Some(1.0), ry: None })
        );

        assert!(children[2].children().is_empty());
    }

    #[test]
    fn text_content() {
        let (root, _) = parse(
            "<svg><text x='5' dy='1em'>  Hello <tspan x='1'> world </tspan></text></svg>",
        )
        .unwrap();

        match root.children()[0].kind {
            Element::Text(ref text) => {
                assert_eq!(text.x, "5");
                assert_eq!(text.y, "0");
                assert_eq!(text.dx, None);
                assert_eq!(text.dy.as_deref(), Some("1em"));
                // The buffer is reset by `tspan`, so only the tail is kept.
                assert_eq!(text.content, "");
                assert_eq!(text.children[0].kind, Element::Unknown(Unknown {
                    text: "world".to_string(),
                    children: Vec::new(),
                }));
            }
            _ => panic!("not a text"),
        }
    }

    #[test]
    fn info_attributes() {
        let (root, _) = parse(
            "<svg><path d='M 0 0 L 10 10' transform='translate(5)' stroke='red' d2='x'
                        marker-end='url(#a)' style='fill: blue; stroke-width: 2px'/></svg>",
        )
        .unwrap();

        let info = &root.children()[0].info;
        assert_eq!(info.transform, Transform::parse("translate(5)"));
        assert_eq!(info.style["transform"], "translate(5)");
        assert_eq!(info.style["fill"], "blue");
        assert_eq!(info.style["stroke-width"], "2px");
        assert_eq!(info.properties["stroke"], "red");
        assert_eq!(info.properties["marker-end"], "url(#a)");
        assert_eq!(info.properties.get("d"), None);
        assert_eq!(info.properties.get("d2"), None);
    }

    #[test]
    fn invalid_inline_style() {
        let (root, _) = parse("<svg><rect style='fill red'/></svg>").unwrap();
        assert!(root.children()[0].info.style.is_empty());
    }

    #[test]
    fn invalid_style_element() {
        let (_, sheet) = parse("<svg><style>.a { fill: red }</style><style>}}</style></svg>").unwrap();
        assert_eq!(sheet.rules.len(), 1);
    }

    #[test]
    fn marker_attributes() {
        let (root, _) = parse(
            "<svg><marker id='m' refX='5' refY='2' markerWidth='8' orient='auto'
                          viewBox='0 0 10 10'><path d='M 0 0 L 10 5'/></marker></svg>",
        )
        .unwrap();

        match root.children()[0].kind {
            Element::Marker(ref m) => {
                assert_eq!(m.ref_x, "5");
                assert_eq!(m.ref_y, "2");
                assert_eq!(m.marker_width, 8.0);
                assert_eq!(m.marker_height, 3.0);
                assert_eq!(m.orient, "auto");
                assert_eq!(m.marker_units, "strokeWidth");
                assert_eq!(m.children.len(), 1);
                assert!(m.view_box.is_some());
            }
            _ => panic!("not a marker"),
        }
    }

    #[test]
    fn invalid_root() {
        assert!(matches!(parse("<g><svg/></g>"), Err(Error::InvalidRoot)));
    }

    #[test]
    fn nodes_limit() {
        let opt = Options {
            nodes_limit: 2,
            ..Options::default()
        };

        let xml = roxmltree::Document::parse("<svg><g/><g/></svg>").unwrap();
        assert!(matches!(build(&xml, &opt), Err(Error::ElementsLimitReached)));

        let xml = roxmltree::Document::parse("<svg><g/></svg>").unwrap();
        assert!(build(&xml, &opt).is_ok());
    }

    #[test]
    fn unclosed_elements() {
        let opt = Options::default();
        let mut builder = Builder::new(&opt);
        builder.start_element("svg", Vec::new()).unwrap();
        builder.start_element("g", [("id", "a")]).unwrap();
        let (root, _) = builder.finish().unwrap();
        assert_eq!(root.children()[0].info.id.as_deref(), Some("a"));
    }
}
