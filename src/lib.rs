// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
`diagsvg` is an SVG parser for diagram output, like the one produced by Mermaid.

It parses an SVG into a tree of typed elements, applies the CSS from `style`
elements and attributes and bakes transforms into the element geometry.
Rendering is left to the caller.

## Features

- Basic shapes, paths, lines, polygons and polylines with typed geometry
- `style` elements with type, class and id selectors, ordered by specificity
- Presentation attributes and inline styles inherited by descendants
- `transform` lists resolved into absolute coordinates
- Markers instanced at line and path ends
- Multi-line `text` and `foreignObject` labels flattened into text runs
- Linear gradients and `switch`

## Limitations

- Only descendant selectors are matched. Child and sibling combinators
  are parsed but act as descendant ones
- `!important` is stripped and does not change the precedence
- Text is neither measured nor shaped. Font metrics are provided by the caller
- `use`, patterns, masks, filters and clip paths are not resolved
*/

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

mod builder;
mod cascade;
mod error;
mod marker;
mod metrics;
mod options;
mod paint_server;
mod resolve;
mod text;
mod tree;
mod units;

use std::borrow::Cow;

use diagsvg_css::Stylesheet;
use once_cell::sync::Lazy;
use regex::Regex;

pub use diagsvg_css;
pub use diagsvg_types;
pub use roxmltree;

pub use diagsvg_types::{
    FuzzyEq, MarkerAnchors, Matrix, PathSegment, Point, Rect as ViewBox, Size, Transform,
    TransformOp,
};

pub use crate::builder::Builder;
pub use crate::error::Error;
pub use crate::metrics::*;
pub use crate::options::Options;
pub use crate::paint_server::{LinearGradient, Position};
pub use crate::text::{BaselineShift, TextRun};
pub use crate::tree::*;

use crate::resolve::Resolver;

trait OptionLog {
    fn log_none<F: FnOnce()>(self, f: F) -> Self;
}

impl<T> OptionLog for Option<T> {
    #[inline]
    fn log_none<F: FnOnce()>(self, f: F) -> Self {
        self.or_else(|| {
            f();
            None
        })
    }
}

impl Tree {
    /// Parses `Tree` from an SVG data.
    pub fn from_data(data: &[u8], opt: &Options) -> Result<Self, Error> {
        let text = std::str::from_utf8(data).map_err(|_| Error::NotAnUtf8Str)?;
        Self::from_str(text, opt)
    }

    /// Parses `Tree` from an SVG string.
    ///
    /// Malformed CSS, numbers and transforms never fail the whole document.
    /// They are skipped instead.
    pub fn from_str(text: &str, opt: &Options) -> Result<Self, Error> {
        let text = if opt.sanitize_line_breaks {
            sanitize_line_breaks(text)
        } else {
            Cow::Borrowed(text)
        };

        let xml_opt = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..Default::default()
        };

        let doc = roxmltree::Document::parse_with_options(&text, xml_opt)
            .map_err(Error::ParsingFailed)?;

        let (root, mut stylesheet) = builder::build(&doc, opt)?;

        if let Some(ref css) = opt.style_sheet {
            match Stylesheet::parse(css) {
                Ok(sheet) => stylesheet.merge(sheet),
                Err(e) => log::warn!("Failed to parse a user style sheet cause {}.", e),
            }
        }

        Ok(Self::from_parts(root, stylesheet, opt.font_size))
    }

    /// Creates a `Tree` from a built root and a stylesheet.
    fn from_parts(root: Node, stylesheet: Stylesheet, font_size: f64) -> Self {
        let (markers, gradients) = cascade::collect_items(&root);
        let styles = cascade::cascade(&root, &stylesheet);

        let mut tree = Tree {
            root: root.clone(),
            styles,
            stylesheet,
            markers,
            gradients,
            font_size,
        };

        tree.root = tree.resolve_node(&root, &[]);
        tree
    }

    /// Returns a copy of the tree with the root resolved again.
    ///
    /// Transforms are already baked, so an empty list returns an equal tree.
    pub fn resolved(&self, transforms: &[Transform]) -> Tree {
        let mut tree = self.clone();
        tree.root = tree.resolve_node(&self.root, transforms);
        tree
    }

    /// Resolves a node against this tree's styles and markers.
    ///
    /// The node doesn't have to be a part of the tree. New marker
    /// instances are registered in the tree's [`StyleMap`].
    pub fn resolve_node(&mut self, node: &Node, transforms: &[Transform]) -> Node {
        let mut resolver = Resolver::new(&mut self.styles, &self.markers);
        resolver.resolve(node, node.info.clone(), transforms)
    }
}

/// Rewrites bare `<br>` tags into `<br/>`.
///
/// HTML labels inside `foreignObject` are not valid XML otherwise.
fn sanitize_line_breaks(text: &str) -> Cow<str> {
    static LINE_BREAK: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"<br(\s*)>").ok());

    match *LINE_BREAK {
        Some(ref re) => re.replace_all(text, "<br/>"),
        None => Cow::Borrowed(text),
    }
}
