// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::str::FromStr;

use crate::tree::{Element, Gradient, Node, Switch};
use crate::OptionLog;

/// A gradient vector coordinate.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Position {
    /// A fraction of the bounding box. `50%` is stored as `0.5`.
    Percent(f64),
    /// A user space value.
    Absolute(f64),
}

/// A resolved `linearGradient`.
#[derive(Clone, PartialEq, Debug)]
pub struct LinearGradient {
    #[allow(missing_docs)]
    pub x1: Position,
    #[allow(missing_docs)]
    pub y1: Position,
    #[allow(missing_docs)]
    pub x2: Position,
    #[allow(missing_docs)]
    pub y2: Position,
    /// Stop offsets as fractions.
    pub offsets: Vec<f64>,
    /// Raw stop colors.
    pub colors: Vec<String>,
}

impl Gradient {
    /// Resolves the gradient vector and stops.
    ///
    /// A missing coordinate is `Absolute(0)`. Returns `None` when a coordinate
    /// is malformed, or when a child is not a `stop` with a percent `offset`
    /// and a `stop-color`.
    pub fn gradient(&self) -> Option<LinearGradient> {
        let x1 = convert_position(self.x1.as_deref())?;
        let y1 = convert_position(self.y1.as_deref())?;
        let x2 = convert_position(self.x2.as_deref())?;
        let y2 = convert_position(self.y2.as_deref())?;

        let mut offsets = Vec::with_capacity(self.children.len());
        let mut colors = Vec::with_capacity(self.children.len());
        for stop in &self.children {
            let (offset, color) = convert_stop(stop).log_none(|| {
                log::debug!("'{}' is not a valid gradient stop.", stop.info.tag)
            })?;

            offsets.push(offset);
            colors.push(color);
        }

        Some(LinearGradient {
            x1,
            y1,
            x2,
            y2,
            offsets,
            colors,
        })
    }
}

fn convert_stop(node: &Node) -> Option<(f64, String)> {
    if node.info.tag != "stop" {
        return None;
    }

    let offset = match convert_position(node.info.properties.get("offset").map(String::as_str)) {
        Some(Position::Percent(n)) => n,
        _ => return None,
    };

    let color = node.info.properties.get("stop-color")?.clone();
    Some((offset, color))
}

fn convert_position(text: Option<&str>) -> Option<Position> {
    let text = match text {
        Some(v) => v.trim(),
        None => return Some(Position::Absolute(0.0)),
    };

    match text.strip_suffix('%') {
        Some(n) => f64::from_str(n).ok().map(|n| Position::Percent(n / 100.0)),
        None => f64::from_str(text).ok().map(Position::Absolute),
    }
}

impl Switch {
    /// Picks the child to render.
    ///
    /// Conditional attributes are not evaluated. The first `text` child wins,
    /// otherwise the first child.
    pub fn determine(&self) -> Option<&Node> {
        self.children
            .iter()
            .find(|n| matches!(n.kind, Element::Text(_)))
            .or_else(|| self.children.first())
    }
}
