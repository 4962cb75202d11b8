// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use diagsvg_css::{CompoundSelector, Rule, Stylesheet};
use indexmap::IndexMap;

use crate::tree::{Element, Gradient, Marker, Node, StyleMap};

/// Collects markers and gradients with an ID, keyed by `url(#id)`.
///
/// The tree is scanned breadth-first. Markers and gradients are not searched for nested ones.
pub(crate) fn collect_items(root: &Node) -> (IndexMap<String, Marker>, IndexMap<String, Gradient>) {
    let mut markers = IndexMap::new();
    let mut gradients = IndexMap::new();

    let mut items: Vec<&Node> = root.children().iter().collect();
    while !items.is_empty() {
        let mut next = Vec::new();
        for node in items {
            match node.kind {
                Element::Marker(ref marker) => {
                    if let Some(ref id) = node.info.id {
                        markers.insert(format!("url(#{})", id), marker.clone());
                    }
                    continue;
                }
                Element::Gradient(ref gradient) => {
                    if let Some(ref id) = node.info.id {
                        gradients.insert(format!("url(#{})", id), gradient.clone());
                    }
                    continue;
                }
                _ => {}
            }

            next.extend(node.children().iter());
        }

        items = next;
    }

    (markers, gradients)
}

/// Cascades a stylesheet over the tree and propagates inline properties.
///
/// Rules are expected to be sorted by specificity, so the last write wins.
pub(crate) fn cascade(root: &Node, sheet: &Stylesheet) -> StyleMap {
    let mut styles = StyleMap::new();
    for rule in &sheet.rules {
        match_rule(root, rule, &mut styles);
    }

    propagate(root, &IndexMap::new(), &mut styles);
    styles
}

fn match_rule(root: &Node, rule: &Rule, styles: &mut StyleMap) {
    let mut candidates = vec![root];
    let mut targets = Vec::new();
    for component in rule.selector.components() {
        // Text runs are flattened later, so `tspan` is never styled on its own.
        if component.selector.tag.as_deref() == Some("tspan") {
            break;
        }

        targets.clear();
        select(&component.selector, &candidates, &mut targets);
        candidates = targets.iter().flat_map(|n| n.children()).collect();
    }

    if targets.is_empty() {
        return;
    }

    let properties = rule.properties();
    for node in targets {
        apply_rule(node, &properties, 0, styles);
    }
}

/// Finds the topmost matching nodes in each subtree.
///
/// Any descendant can match, so all combinators act as descendant ones.
fn select<'a>(selector: &CompoundSelector, nodes: &[&'a Node], targets: &mut Vec<&'a Node>) {
    for node in nodes {
        if node.info.matches(selector) {
            targets.push(node);
            continue;
        }

        let children: Vec<&Node> = node.children().iter().collect();
        select(selector, &children, targets);
    }
}

fn apply_rule(node: &Node, properties: &IndexMap<String, String>, level: usize, styles: &mut StyleMap) {
    let attrs = styles.entry(node.info.node_id()).or_default();
    let map = if level == 0 {
        &mut attrs.specific
    } else {
        &mut attrs.inherited
    };

    for (name, value) in properties {
        map.insert(name.clone(), value.clone());
    }

    for child in node.children() {
        apply_rule(child, properties, level + 1, styles);
    }
}

/// Copies ancestors' inline style and properties into descendants' inherited maps.
///
/// The nearest ancestor wins. A node's own style wins over its own properties.
fn propagate(node: &Node, inherited: &IndexMap<String, String>, styles: &mut StyleMap) {
    if node.children().is_empty() {
        return;
    }

    let mut inherited = inherited.clone();
    for (name, value) in node.info.properties.iter().chain(node.info.style.iter()) {
        inherited.insert(name.clone(), value.clone());
    }

    for child in node.children() {
        let attrs = styles.entry(child.info.node_id()).or_default();
        for (name, value) in &inherited {
            attrs.inherited.insert(name.clone(), value.clone());
        }

        propagate(child, &inherited, styles);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Circle, Group, Info};

    fn node(tag: &str, id: Option<&str>, class: Option<&str>, children: Vec<Node>) -> Node {
        let mut info = Info::new(tag);
        info.id = id.map(str::to_string);
        info.class_name = class.map(str::to_string);
        let kind = if children.is_empty() {
            Element::Circle(Circle::default())
        } else {
            Element::Group(Group { children })
        };

        Node::new(info, kind)
    }

    fn specific<'a>(styles: &'a StyleMap, n: &Node, name: &str) -> Option<&'a str> {
        styles.get(&n.info.node_id())?.specific.get(name).map(String::as_str)
    }

    fn inherited<'a>(styles: &'a StyleMap, n: &Node, name: &str) -> Option<&'a str> {
        styles.get(&n.info.node_id())?.inherited.get(name).map(String::as_str)
    }

    #[test]
    fn descendant_rule() {
        let leaf = node("circle", None, None, vec![]);
        let inner = node("g", None, Some("node"), vec![leaf]);
        let root = node("svg", Some("graph"), None, vec![inner]);

        let sheet = Stylesheet::parse("#graph .node { fill: red }").unwrap();
        let styles = cascade(&root, &sheet);

        let inner = &root.children()[0];
        let leaf = &inner.children()[0];
        assert_eq!(specific(&styles, &root, "fill"), None);
        assert_eq!(specific(&styles, inner, "fill"), Some("red"));
        assert_eq!(inherited(&styles, leaf, "fill"), Some("red"));
    }

    #[test]
    fn root_can_match() {
        let root = node("svg", Some("graph"), None, vec![node("circle", None, None, vec![])]);
        let sheet = Stylesheet::parse("#graph { font-size: 16px }").unwrap();
        let styles = cascade(&root, &sheet);
        assert_eq!(specific(&styles, &root, "font-size"), Some("16px"));
        assert_eq!(inherited(&styles, &root.children()[0], "font-size"), Some("16px"));
    }

    #[test]
    fn tspan_stops_matching() {
        let root = node("svg", None, None, vec![node("text", None, None, vec![])]);

        let sheet = Stylesheet::parse("tspan { fill: red }").unwrap();
        let styles = cascade(&root, &sheet);
        assert!(root.descendants().all(|n| specific(&styles, n, "fill").is_none()));

        // The chain stops at `tspan`, so the rule applies to `text`.
        let sheet = Stylesheet::parse("text tspan { fill: blue }").unwrap();
        let styles = cascade(&root, &sheet);
        assert_eq!(specific(&styles, &root.children()[0], "fill"), Some("blue"));
        assert_eq!(specific(&styles, &root, "fill"), None);
    }

    #[test]
    fn nearest_ancestor_wins() {
        let leaf = node("circle", None, None, vec![]);
        let mut inner = node("g", None, None, vec![leaf]);
        inner.info.properties.insert("stroke".to_string(), "blue".to_string());
        let mut root = node("svg", None, None, vec![inner]);
        root.info.properties.insert("stroke".to_string(), "red".to_string());
        root.info.properties.insert("fill".to_string(), "green".to_string());
        root.info.style.insert("fill".to_string(), "black".to_string());

        let styles = cascade(&root, &Stylesheet::new());
        let inner = &root.children()[0];
        let leaf = &inner.children()[0];
        assert_eq!(inherited(&styles, inner, "stroke"), Some("red"));
        assert_eq!(inherited(&styles, leaf, "stroke"), Some("blue"));
        assert_eq!(inherited(&styles, leaf, "fill"), Some("black"));
    }

    #[test]
    fn collect() {
        let mut marker = Node::new(Info::new("marker"), Element::Marker(Marker::default()));
        marker.info.id = Some("arrow".to_string());
        let mut gradient = Node::new(Info::new("lineargradient"), Element::Gradient(Gradient::default()));
        gradient.info.id = Some("g1".to_string());
        let defs = Node::new(Info::new("defs"), Element::Group(Group { children: vec![marker, gradient] }));
        let root = node("svg", None, None, vec![defs]);

        let (markers, gradients) = collect_items(&root);
        assert!(markers.contains_key("url(#arrow)"));
        assert!(gradients.contains_key("url(#g1)"));
        assert_eq!(markers.len(), 1);
    }
}
