// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use diagsvg_types::{MarkerAnchors, Point, Size, Transform, TransformOp};
use indexmap::IndexMap;

use crate::resolve::Resolver;
use crate::tree::{Element, Info, Marker, Node, NodeId, StyleMap, ATTRIBUTES};
use crate::OptionLog;

#[derive(Clone, Copy)]
enum MarkerKind {
    Start,
    End,
}

impl MarkerKind {
    fn property(self) -> &'static str {
        match self {
            MarkerKind::Start => "marker-start",
            MarkerKind::End => "marker-end",
        }
    }
}

impl<'a> Resolver<'a> {
    /// Creates marker contents for a line or a path.
    ///
    /// End markers go first. The contents are in canvas coordinates
    /// and every instance node has a new identity.
    pub(crate) fn instance_markers<A: MarkerAnchors>(
        &mut self,
        info: &Info,
        transforms: &[Transform],
        anchors: &A,
    ) -> Vec<Node> {
        let mut nodes = Vec::new();
        for kind in [MarkerKind::End, MarkerKind::Start] {
            let marker = match self.find_marker(info, kind) {
                Some(v) => v,
                None => continue,
            };

            let anchor = match kind {
                MarkerKind::End => anchors.end_marker_anchor().map(|(p, o)| (p, p - o)),
                MarkerKind::Start => anchors.start_marker_anchor().map(|(p, o)| (p, o - p)),
            };

            if let Some((point, direction)) = anchor {
                let angle = direction.y.atan2(direction.x);
                nodes.extend(self.place_marker(marker, info, transforms, point, angle));
            }
        }

        nodes
    }

    fn find_marker(&self, info: &Info, kind: MarkerKind) -> Option<&'a Marker> {
        let url = info.style(kind.property(), &*self.styles)?;
        if url == "none" {
            return None;
        }

        let markers: &'a IndexMap<String, Marker> = self.markers;
        markers
            .get(&url)
            .log_none(|| log::warn!("Marker '{}' is not found.", url))
    }

    fn place_marker(
        &mut self,
        marker: &Marker,
        host: &Info,
        transforms: &[Transform],
        point: Point,
        angle: f64,
    ) -> Vec<Node> {
        let ref_x = marker.ref_x.trim().parse::<f64>().unwrap_or(0.0);
        let ref_y = marker.ref_y.trim().parse::<f64>().unwrap_or(0.0);
        let size = transforms
            .iter()
            .fold(Size::new(ref_x, ref_y), |size, ts| ts.apply_scale(size));

        let translate = TransformOp::Translate {
            tx: point.x - size.width,
            ty: point.y - size.height,
        };
        let rotate = TransformOp::Rotate {
            angle,
            cx: size.width,
            cy: size.height,
        };

        // Ancestors' translations are already in the anchor point.
        let mut list = vec![Transform::from(translate), Transform::from(rotate)];
        list.extend(transforms.iter().map(|ts| ts.scale_and_rotate()));

        let in_marker = std::mem::replace(&mut self.in_marker, true);
        let nodes = marker
            .children
            .iter()
            .map(|child| {
                let info = merge_style_for_marker(&child.info, host, &*self.styles);
                let mut node = self.resolve(child, info, &list);
                self.assign_new_ids(&mut node);
                node
            })
            .collect();
        self.in_marker = in_marker;
        nodes
    }

    /// Gives an instance subtree new identities.
    ///
    /// Cascaded properties are copied, so the instance is styled as its source.
    fn assign_new_ids(&mut self, node: &mut Node) {
        let id = NodeId::new();
        if let Some(attrs) = self.styles.get(&node.info.node_id).cloned() {
            self.styles.insert(id, attrs);
        }
        node.info.node_id = id;

        match node.kind {
            Element::Line(ref mut e) => e.markers.iter_mut().for_each(|n| self.assign_new_ids(n)),
            Element::Path(ref mut e) => e.markers.iter_mut().for_each(|n| self.assign_new_ids(n)),
            _ => {}
        }

        if let Some(children) = node.children_mut() {
            for child in children {
                self.assign_new_ids(child);
            }
        }
    }
}

/// Merges host's style into a marker child's info.
///
/// The child gets the host's inline style without `fill` and the host's
/// presentation attributes. The child's own cascaded and inline values win.
pub(crate) fn merge_style_for_marker(target: &Info, source: &Info, styles: &StyleMap) -> Info {
    let mut style = source.style.clone();
    style.shift_remove("fill");

    if let Some(attrs) = styles.get(&target.node_id()) {
        for (name, value) in &attrs.specific {
            style.insert(name.clone(), value.clone());
        }
    }

    for (name, value) in &target.style {
        style.insert(name.clone(), value.clone());
    }

    let mut properties: IndexMap<String, String> = source
        .properties
        .iter()
        .filter(|(name, _)| ATTRIBUTES.contains(&name.as_str()))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();

    for (name, value) in &target.properties {
        properties.insert(name.clone(), value.clone());
    }

    let mut info = target.clone();
    info.style = style;
    info.properties = properties;
    info
}
