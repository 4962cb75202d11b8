// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use diagsvg_types::{Point, Rect as Bounds, Size, Transform};
use indexmap::IndexMap;

use crate::tree::*;

/// Applies transforms to the geometry.
///
/// Each node applies the inherited transforms plus its own one to its geometry.
/// Points are transformed starting from the last transform in the list,
/// so the innermost transform goes first.
pub(crate) struct Resolver<'a> {
    pub styles: &'a mut StyleMap,
    pub markers: &'a IndexMap<String, Marker>,
    /// Set while marker contents are resolved. Markers are not instanced inside markers.
    pub in_marker: bool,
}

impl<'a> Resolver<'a> {
    pub fn new(styles: &'a mut StyleMap, markers: &'a IndexMap<String, Marker>) -> Self {
        Resolver {
            styles,
            markers,
            in_marker: false,
        }
    }

    pub fn resolve(&mut self, node: &Node, mut info: Info, inherited: &[Transform]) -> Node {
        let kind = match node.kind {
            Element::Document(ref doc) => {
                // The root transform is ignored.
                let doc = Document {
                    width: doc.width,
                    height: doc.height,
                    view_box: doc.view_box,
                    children: self.resolve_children(&doc.children, inherited),
                };

                return Node::new(info, Element::Document(doc));
            }
            Element::Marker(_) | Element::Gradient(_) => {
                return Node::new(info, node.kind.clone());
            }
            ref kind => kind,
        };

        let mut transforms = inherited.to_vec();
        if let Some(ts) = info.transform.take() {
            transforms.push(ts);
        }

        let kind = match *kind {
            Element::Group(ref e) => Element::Group(Group {
                children: self.resolve_children(&e.children, &transforms),
            }),
            Element::Switch(ref e) => Element::Switch(Switch {
                children: self.resolve_children(&e.children, &transforms),
            }),
            Element::Unknown(ref e) => Element::Unknown(Unknown {
                text: e.text.clone(),
                children: self.resolve_children(&e.children, &transforms),
            }),
            Element::Rect(ref e) => Element::Rect(resolve_rect(e, &mut info, &transforms)),
            Element::Circle(ref e) => Element::Circle(resolve_circle(e, &transforms)),
            Element::Ellipse(ref e) => Element::Ellipse(resolve_ellipse(e, &mut info, &transforms)),
            Element::Polygon(ref e) => Element::Polygon(Polygon {
                points: transform_points(&e.points, &transforms),
            }),
            Element::Polyline(ref e) => Element::Polyline(Polyline {
                points: transform_points(&e.points, &transforms),
            }),
            Element::Line(ref e) => {
                let mut line = e.clone();
                if !transforms.is_empty() {
                    let start = apply(line.start(), &transforms);
                    let end = apply(line.end(), &transforms);
                    line.x1 = start.x;
                    line.y1 = start.y;
                    line.x2 = end.x;
                    line.y2 = end.y;
                }

                line.markers = self.resolve_markers(&info, &transforms, &line, &e.markers);
                Element::Line(line)
            }
            Element::Path(ref e) => {
                let data = transforms
                    .iter()
                    .rev()
                    .fold(e.data.clone(), |data, ts| data.transform(ts));
                let markers = self.resolve_markers(&info, &transforms, &data, &e.markers);
                Element::Path(Path { data, markers })
            }
            Element::Text(ref e) => {
                let mut text = e.clone();
                text.transforms = pending(&transforms, &e.transforms);
                Element::Text(text)
            }
            Element::ForeignObject(ref e) => {
                let mut object = e.clone();
                object.transforms = pending(&transforms, &e.transforms);
                Element::ForeignObject(object)
            }
            Element::Document(_) | Element::Marker(_) | Element::Gradient(_) => node.kind.clone(),
        };

        Node::new(info, kind)
    }

    fn resolve_children(&mut self, children: &[Node], transforms: &[Transform]) -> Vec<Node> {
        children
            .iter()
            .map(|child| self.resolve(child, child.info.clone(), transforms))
            .collect()
    }

    /// Instantiates markers, or moves already instantiated ones.
    fn resolve_markers<A: diagsvg_types::MarkerAnchors>(
        &mut self,
        info: &Info,
        transforms: &[Transform],
        anchors: &A,
        current: &[Node],
    ) -> Vec<Node> {
        if current.is_empty() {
            if self.in_marker {
                return Vec::new();
            }

            return self.instance_markers(info, transforms, anchors);
        }

        if transforms.is_empty() {
            return current.to_vec();
        }

        let in_marker = std::mem::replace(&mut self.in_marker, true);
        let nodes = self.resolve_children(current, transforms);
        self.in_marker = in_marker;
        nodes
    }
}

/// Transforms that are applied later, during text layout.
fn pending(transforms: &[Transform], previous: &[Transform]) -> Vec<Transform> {
    let mut list = transforms.to_vec();
    list.extend_from_slice(previous);
    list
}

fn apply(p: Point, transforms: &[Transform]) -> Point {
    transforms.iter().rev().fold(p, |p, ts| ts.apply(p))
}

fn transform_points(points: &[Point], transforms: &[Transform]) -> Vec<Point> {
    points.iter().map(|p| apply(*p, transforms)).collect()
}

fn resolve_rect(rect: &Rect, info: &mut Info, transforms: &[Transform]) -> Rect {
    let mut rect = rect.clone();
    let mut rotation = info.rotation.unwrap_or(0.0);
    if !transforms.is_empty() {
        let bounds = Bounds::new(rect.x, rect.y, rect.width, rect.height);
        let mut center = bounds.center();
        let mut size = bounds.size();
        for ts in transforms.iter().rev() {
            center = ts.apply(center);
            size = ts.apply_scale(size);
            rect.rx = rect.rx.map(|v| ts.apply_scale_value(v));
            rect.ry = rect.ry.map(|v| ts.apply_scale_value(v));
            rotation += ts.rotation();
        }

        let bounds = Bounds::from_center(center, size);
        rect.x = bounds.x;
        rect.y = bounds.y;
        rect.width = bounds.width;
        rect.height = bounds.height;
    }

    info.rotation = Some(rotation);
    rect
}

fn resolve_circle(circle: &Circle, transforms: &[Transform]) -> Circle {
    let mut circle = circle.clone();
    let mut center = Point::new(circle.cx, circle.cy);
    for ts in transforms.iter().rev() {
        center = ts.apply(center);
        circle.r = ts.apply_scale_value(circle.r);
    }

    circle.cx = center.x;
    circle.cy = center.y;
    circle
}

fn resolve_ellipse(ellipse: &Ellipse, info: &mut Info, transforms: &[Transform]) -> Ellipse {
    let mut ellipse = ellipse.clone();
    let mut rotation = info.rotation.unwrap_or(0.0);
    if !transforms.is_empty() {
        let mut center = Point::new(ellipse.cx, ellipse.cy);
        let mut radius = Size::new(ellipse.rx, ellipse.ry);
        for ts in transforms.iter().rev() {
            center = ts.apply(center);
            radius = ts.apply_scale(radius);
            rotation += ts.rotation();
        }

        ellipse.cx = center.x;
        ellipse.cy = center.y;
        ellipse.rx = radius.width;
        ellipse.ry = radius.height;
    }

    info.rotation = Some(rotation);
    ellipse
}
