// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
A CSS subset parser tailored to the stylesheets diagram tools embed into SVG.

Supports:

- rules with comma separated selector lists
- type, class, id, attribute, pseudo-class and pseudo-element selectors
- descendant, child and sibling combinators (parsed only)
- `@keyframes` blocks (parsed for validity only)
- inline `style` attributes

Rules are sorted by selector specificity, so applying them in order
gives the cascade result.
*/

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]

use indexmap::IndexMap;

use diagsvg_types::Stream;

mod error;
mod parser;
mod selector;

pub use crate::error::Error;
pub use crate::selector::*;

/// A `name: value` pair.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Declaration {
    /// Property name.
    pub name: String,
    /// Trimmed property value. Can contain `!important`.
    pub value: String,
}

/// A rule with a single selector.
///
/// A selectors list like `a, b { ... }` produces one rule per selector.
#[derive(Clone, PartialEq, Debug)]
pub struct Rule {
    /// The rule selector.
    pub selector: Selector,
    /// Declarations in the source order.
    pub declarations: Vec<Declaration>,
}

impl Rule {
    /// Returns declarations as a map. A repeated property keeps its last value.
    pub fn properties(&self) -> IndexMap<String, String> {
        self.declarations
            .iter()
            .map(|d| (d.name.clone(), d.value.clone()))
            .collect()
    }
}

/// A single `@keyframes` step.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Keyframe {
    /// `from`, `to` or a percentage like `50%`.
    pub selector: String,
    /// Step declarations.
    pub declarations: Vec<Declaration>,
}

/// A `@keyframes` block.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct KeyframesRule {
    /// Animation name.
    pub name: String,
    /// Steps in the source order.
    pub keyframes: Vec<Keyframe>,
}

/// A parsed stylesheet.
#[derive(Clone, PartialEq, Default, Debug)]
pub struct Stylesheet {
    /// Rules sorted by specificity in ascending order.
    pub rules: Vec<Rule>,
    /// `@keyframes` blocks.
    pub keyframes: Vec<KeyframesRule>,
}

impl Stylesheet {
    /// Creates an empty stylesheet.
    pub fn new() -> Self {
        Stylesheet::default()
    }

    /// Parses a stylesheet.
    pub fn parse(text: &str) -> Result<Self, Error> {
        parser::parse(text)
    }

    /// Appends rules from another stylesheet.
    ///
    /// The merged list is re-sorted, so among rules with the same specificity
    /// the ones from `other` come last.
    pub fn merge(&mut self, other: Stylesheet) {
        self.rules.extend(other.rules);
        self.rules.sort_by_key(|r| r.selector.specificity());
        self.keyframes.extend(other.keyframes);
    }

    /// Returns `true` if there are no rules and no keyframes.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty() && self.keyframes.is_empty()
    }
}

/// Parses the content of a `style` attribute.
///
/// The text is parsed as the body of a single rule, so a stray `}`
/// fails the whole attribute.
pub fn parse_inline_style(text: &str) -> Result<IndexMap<String, String>, Error> {
    let sheet = Stylesheet::parse(&format!("a{{{}}}", text))?;
    Ok(sheet
        .rules
        .first()
        .map(|r| r.properties())
        .unwrap_or_default())
}

/// Parses a bare declarations list, like `fill: red; stroke: blue`.
///
/// Stops at the first top-level `}`.
pub fn parse_declarations(text: &str) -> Result<Vec<Declaration>, Error> {
    let mut s = Stream::from(text);
    parser::parse_declarations(&mut s)
}
