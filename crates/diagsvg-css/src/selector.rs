// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use indexmap::IndexMap;

use diagsvg_types::Stream;

/// A selector specificity: ids, then classes/attributes/pseudo-classes,
/// then types/pseudo-elements.
///
/// Compares lexicographically.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Debug)]
pub struct Specificity(pub u32, pub u32, pub u32);

/// A selector combinator.
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Combinator {
    /// Whitespace.
    Descendant,
    /// `>`
    Child,
    /// `+`
    AdjacentSibling,
    /// `~`
    GeneralSibling,
}

/// A compound selector, like `rect.node#id`.
#[derive(Clone, PartialEq, Default, Debug)]
pub struct CompoundSelector {
    /// Type selector.
    pub tag: Option<String>,
    /// Id selector.
    pub id: Option<String>,
    /// Class selectors in order.
    pub classes: Vec<String>,
    /// Attribute selectors. The value is set only for `[name="value"]`.
    pub attributes: IndexMap<String, Option<String>>,
    /// Pseudo-class names, without arguments.
    pub pseudo_classes: Vec<String>,
    /// Pseudo-element name.
    pub pseudo_element: Option<String>,
}

impl CompoundSelector {
    /// Checks that the selector has no parts at all.
    pub fn is_empty(&self) -> bool {
        self.tag.is_none()
            && self.id.is_none()
            && self.classes.is_empty()
            && self.attributes.is_empty()
            && self.pseudo_classes.is_empty()
            && self.pseudo_element.is_none()
    }
}

/// A compound selector with the combinator that precedes it.
#[derive(Clone, PartialEq, Debug)]
pub struct Component {
    /// `None` for the first component.
    pub combinator: Option<Combinator>,
    /// The selector itself.
    pub selector: CompoundSelector,
}

/// A single complex selector, like `#graph .node rect`.
#[derive(Clone, PartialEq, Debug)]
pub struct Selector {
    text: String,
    specificity: Specificity,
    components: Vec<Component>,
}

impl Selector {
    /// Compiles a selector.
    ///
    /// Never fails. Unsupported syntax ends up as a type selector or is skipped.
    pub fn new(text: &str) -> Self {
        let text = text.trim();
        Selector {
            text: text.to_string(),
            specificity: calc_specificity(text),
            components: parse_chain(text),
        }
    }

    /// Returns the source text.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns the selector specificity.
    #[inline]
    pub fn specificity(&self) -> Specificity {
        self.specificity
    }

    /// Returns compound selectors from left to right.
    #[inline]
    pub fn components(&self) -> &[Component] {
        &self.components
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

#[inline]
fn is_ident_char(c: char) -> bool {
    c.is_alphabetic() || c.is_numeric() || c == '-' || c == '_'
}

fn calc_specificity(text: &str) -> Specificity {
    let mut spec = Specificity::default();

    let mut s = Stream::from(text);
    while let Some(c) = s.curr_char() {
        match c {
            '#' => {
                spec.0 += 1;
                s.advance(1);
                s.consume_chars(is_ident_char);
            }
            '.' => {
                spec.1 += 1;
                s.advance(1);
                s.consume_chars(is_ident_char);
            }
            '[' => {
                spec.1 += 1;
                s.skip_bytes(|c| c != b']');
                if !s.at_end() {
                    s.advance(1);
                }
            }
            ':' => {
                s.advance(1);
                if s.is_curr_byte_eq(b':') {
                    s.advance(1);
                    spec.2 += 1;
                } else {
                    spec.1 += 1;
                }

                s.consume_chars(is_ident_char);
                skip_arguments(&mut s);
            }
            c if c.is_alphabetic() => {
                spec.2 += 1;
                s.consume_chars(is_ident_char);
            }
            _ => s.advance_char(),
        }
    }

    spec
}

fn parse_chain(text: &str) -> Vec<Component> {
    let mut components = Vec::new();
    let mut current = CompoundSelector::default();
    let mut combinator = None;
    let mut buf = String::new();

    fn flush_tag(buf: &mut String, current: &mut CompoundSelector) {
        let tag = buf.trim();
        if !tag.is_empty() && current.tag.is_none() {
            current.tag = Some(tag.to_string());
        }
        buf.clear();
    }

    let mut s = Stream::from(text);
    while let Some(c) = s.curr_char() {
        match c {
            ' ' | '\t' | '\n' | '\r' | '\x0C' | '>' | '+' | '~' => {
                flush_tag(&mut buf, &mut current);
                if !current.is_empty() {
                    components.push(Component {
                        combinator,
                        selector: std::mem::take(&mut current),
                    });
                }

                combinator = Some(match c {
                    '>' => Combinator::Child,
                    '+' => Combinator::AdjacentSibling,
                    '~' => Combinator::GeneralSibling,
                    _ => Combinator::Descendant,
                });

                s.advance(1);
                s.skip_bytes(|c| c.is_ascii_whitespace());
            }
            '#' => {
                flush_tag(&mut buf, &mut current);
                s.advance(1);
                current.id = Some(s.consume_chars(is_ident_char).to_string());
            }
            '.' => {
                flush_tag(&mut buf, &mut current);
                s.advance(1);
                current.classes.push(s.consume_chars(is_ident_char).to_string());
            }
            ':' => {
                flush_tag(&mut buf, &mut current);
                s.advance(1);
                if s.is_curr_byte_eq(b':') {
                    s.advance(1);
                    current.pseudo_element = Some(s.consume_chars(is_ident_char).to_string());
                } else {
                    let name = s.consume_chars(is_ident_char).to_string();
                    current.pseudo_classes.push(name);
                }

                skip_arguments(&mut s);
            }
            '[' => {
                flush_tag(&mut buf, &mut current);
                s.advance(1);
                let (name, value) = parse_attribute(&mut s);
                current.attributes.insert(name, value);
            }
            _ => {
                buf.push(c);
                s.advance_char();
            }
        }
    }

    flush_tag(&mut buf, &mut current);
    if !current.is_empty() {
        components.push(Component {
            combinator,
            selector: current,
        });
    }

    components
}

/// Skips a parenthesized pseudo-class argument, like `(a, b)` in `:is(a, b)`.
fn skip_arguments(s: &mut Stream) {
    if !s.is_curr_byte_eq(b'(') {
        return;
    }

    let mut depth = 0u32;
    while let Some(c) = s.peek() {
        s.advance(1);
        match c {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            _ => {}
        }
    }
}

/// Parses `name="value"]` after the opening bracket.
fn parse_attribute(s: &mut Stream) -> (String, Option<String>) {
    let name = s
        .consume_chars(|c| c != '=' && c != ']' && !c.is_whitespace())
        .to_string();

    let mut value = None;
    s.consume_chars(char::is_whitespace);
    if s.is_curr_byte_eq(b'=') {
        s.advance(1);
        s.consume_chars(char::is_whitespace);
        // Only double-quoted values are supported.
        if s.is_curr_byte_eq(b'"') {
            s.advance(1);
            value = Some(s.consume_chars(|c| c != '"').to_string());
            if s.is_curr_byte_eq(b'"') {
                s.advance(1);
            }
        }
    }

    s.skip_bytes(|c| c != b']');
    if !s.at_end() {
        s.advance(1);
    }

    (name, value)
}
