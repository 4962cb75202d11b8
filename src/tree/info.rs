// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use diagsvg_css::CompoundSelector;
use diagsvg_types::{parse_number_list, Transform};
use indexmap::IndexMap;

use crate::text::BaselineShift;
use crate::units;

/// Presentation attributes that are also valid style properties.
///
/// Marker instances inherit these from their host element.
pub const ATTRIBUTES: &[&str] = &[
    "fill",
    "fill-opacity",
    "fill-rule",
    "stroke",
    "stroke-width",
    "stroke-linecap",
    "stroke-linejoin",
    "stroke-miterlimit",
    "stroke-dasharray",
    "stroke-dashoffset",
    "stroke-opacity",
    "opacity",
    "color",
    "font-family",
    "font-size",
    "font-style",
    "font-weight",
    "text-anchor",
    "visibility",
    "display",
    "dominant-baseline",
];

/// Attributes kept as properties in addition to [`ATTRIBUTES`].
pub(crate) const GEOMETRY_ATTRIBUTES: &[&str] = &[
    "x",
    "y",
    "dx",
    "dy",
    "marker-start",
    "marker-end",
    "marker-mid",
    "stop-color",
    "offset",
];

/// A process-unique node identity.
///
/// Used as a key into [`StyleMap`]. Cloning a node keeps its identity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct NodeId(u64);

impl NodeId {
    pub(crate) fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        NodeId(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw identity value.
    #[inline]
    pub fn get(&self) -> u64 {
        self.0
    }
}

/// Cascaded properties of a single node.
#[derive(Clone, PartialEq, Default, Debug)]
pub struct StyleAttributes {
    /// Properties from rules that matched the node itself.
    pub specific: IndexMap<String, String>,
    /// Properties from rules that matched an ancestor,
    /// and properties propagated from ancestors' attributes.
    pub inherited: IndexMap<String, String>,
}

/// A document-wide side-table of cascaded properties.
pub type StyleMap = HashMap<NodeId, StyleAttributes>;

/// Attributes shared by all elements.
#[derive(Clone, PartialEq, Debug)]
pub struct Info {
    /// Lowercased element name.
    pub tag: String,
    /// Element's ID.
    pub id: Option<String>,
    /// The raw `class` attribute.
    pub class_name: Option<String>,
    /// Declarations from the `style` attribute.
    ///
    /// Also contains the raw `class` and `transform` attributes.
    pub style: IndexMap<String, String>,
    /// Presentation attributes.
    pub properties: IndexMap<String, String>,
    /// Element's own transform.
    ///
    /// Cleared once it was baked into the geometry.
    pub transform: Option<Transform>,
    /// A fallback style used by renderers when a node is moved under another parent.
    pub secondary_style: StyleAttributes,
    /// Accumulated rotation in radians.
    pub rotation: Option<f64>,
    /// Baseline offset of a text run.
    pub baseline_shift: Option<BaselineShift>,
    pub(crate) node_id: NodeId,
}

impl Info {
    /// Creates a new info with a fresh identity.
    pub fn new(tag: &str) -> Self {
        Info {
            tag: tag.to_string(),
            id: None,
            class_name: None,
            style: IndexMap::new(),
            properties: IndexMap::new(),
            transform: None,
            secondary_style: StyleAttributes::default(),
            rotation: None,
            baseline_shift: None,
            node_id: NodeId::new(),
        }
    }

    /// Returns the node identity.
    #[inline]
    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    /// Returns a list of classes.
    pub fn classes(&self) -> Vec<&str> {
        match self.class_name {
            Some(ref name) => name.split_whitespace().collect(),
            None => Vec::new(),
        }
    }

    /// Checks that the compound selector matches this element.
    ///
    /// Only type, id and class selectors are checked.
    /// Attribute and pseudo selectors always match.
    pub fn matches(&self, selector: &CompoundSelector) -> bool {
        if let Some(ref tag) = selector.tag {
            if tag != "*" && !tag.eq_ignore_ascii_case(&self.tag) {
                return false;
            }
        }

        if let Some(ref id) = selector.id {
            if self.id.as_ref() != Some(id) {
                return false;
            }
        }

        if !selector.classes.is_empty() {
            let classes = self.classes();
            if !selector.classes.iter().all(|c| classes.contains(&c.as_str())) {
                return false;
            }
        }

        true
    }

    /// Resolves a presentation property.
    ///
    /// Precedence: own properties, then cascaded specific, then cascaded inherited.
    pub fn property(&self, name: &str, styles: &StyleMap) -> Option<String> {
        if let Some(value) = self.properties.get(name) {
            return Some(sanitize(value));
        }

        let attrs = styles.get(&self.node_id)?;
        attrs
            .specific
            .get(name)
            .or_else(|| attrs.inherited.get(name))
            .map(|v| sanitize(v))
    }

    /// Resolves a style property.
    ///
    /// Precedence: own style, cascaded specific, secondary specific,
    /// own properties, cascaded inherited and then secondary inherited.
    pub fn style(&self, name: &str, styles: &StyleMap) -> Option<String> {
        let attrs = styles.get(&self.node_id);
        self.style
            .get(name)
            .or_else(|| attrs.and_then(|a| a.specific.get(name)))
            .or_else(|| self.secondary_style.specific.get(name))
            .or_else(|| self.properties.get(name))
            .or_else(|| attrs.and_then(|a| a.inherited.get(name)))
            .or_else(|| self.secondary_style.inherited.get(name))
            .map(|v| sanitize(v))
    }

    /// Resolves a numeric property. The `em` suffix is relative to `base_size`.
    pub fn size_property_value(&self, name: &str, styles: &StyleMap, base_size: f64) -> Option<f64> {
        let value = self.property(name, styles)?;
        units::parse_em(&value, base_size)
    }

    /// Resolves `stroke-width` as a number. The `px` suffix is allowed.
    pub fn stroke_width(&self, styles: &StyleMap) -> Option<f64> {
        units::parse_px(&self.style("stroke-width", styles)?)
    }

    /// Resolves `max-width` as a number. The `px` suffix is allowed.
    pub fn max_width(&self, styles: &StyleMap) -> Option<f64> {
        units::parse_px(&self.style("max-width", styles)?)
    }

    /// Resolves `stroke-dasharray`.
    ///
    /// Numbers can be separated by spaces or commas.
    /// Returns `None` when there is no dashing, including an all-zero list.
    pub fn stroke_dash_array(&self, styles: &StyleMap) -> Option<Vec<f64>> {
        let value = self.style("stroke-dasharray", styles)?;
        if value.is_empty() {
            return None;
        }

        let list = parse_number_list(&value, ' ').or_else(|| parse_number_list(&value, ','))?;
        if list.is_empty() || list.iter().sum::<f64>() == 0.0 {
            return None;
        }

        Some(list)
    }

    /// Resolves `fill` as a color.
    ///
    /// `none`, paint server references and unknown values return `None`.
    pub fn fill_color(&self, styles: &StyleMap) -> Option<svgtypes::Color> {
        parse_color(&self.style("fill", styles)?)
    }

    /// Resolves `stroke` as a color.
    pub fn stroke_color(&self, styles: &StyleMap) -> Option<svgtypes::Color> {
        parse_color(&self.style("stroke", styles)?)
    }

    /// Resolves an opacity-like property, like `opacity` or `fill-opacity`.
    ///
    /// Percentages are converted into fractions.
    pub fn opacity(&self, name: &str, styles: &StyleMap) -> Option<f64> {
        units::parse_fraction(&self.style(name, styles)?)
    }
}

fn parse_color(text: &str) -> Option<svgtypes::Color> {
    svgtypes::Color::from_str(text).ok()
}

/// Trims a value and removes a trailing `!important`.
pub(crate) fn sanitize(value: &str) -> String {
    let value = value.trim();
    match value.strip_suffix("!important") {
        Some(v) => v.trim().to_string(),
        None => value.to_string(),
    }
}
