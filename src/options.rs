// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/// Processing options.
#[derive(Clone, Debug)]
pub struct Options {
    /// A default font size.
    ///
    /// Will be used when text has no resolvable `font-size`.
    ///
    /// Default: 13
    pub font_size: f64,

    /// The maximum number of elements.
    ///
    /// Parsing fails with `Error::ElementsLimitReached` past this limit.
    ///
    /// Default: 1_000_000
    pub nodes_limit: usize,

    /// Rewrite bare `<br>` tags into `<br/>` before XML parsing.
    ///
    /// Diagram labels often embed HTML fragments, which are not valid XML otherwise.
    ///
    /// Default: true
    pub sanitize_line_breaks: bool,

    /// A CSS stylesheet that should be injected into the SVG.
    ///
    /// Its rules are merged after the document's own `style` elements,
    /// so it can overwrite them at the same specificity.
    ///
    /// Default: `None`
    pub style_sheet: Option<String>,
}

impl Default for Options {
    fn default() -> Options {
        Options {
            font_size: 13.0,
            nodes_limit: 1_000_000,
            sanitize_line_breaks: true,
            style_sheet: None,
        }
    }
}
