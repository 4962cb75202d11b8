// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use diagsvg_types::Stream;

use crate::{Declaration, Error, Keyframe, KeyframesRule, Rule, Selector, Stylesheet};

pub(crate) fn parse(text: &str) -> Result<Stylesheet, Error> {
    let mut rules = Vec::new();
    let mut keyframes = Vec::new();

    let mut s = Stream::from(text);
    skip_spaces(&mut s);
    while !s.at_end() {
        if s.starts_with(b"@key") {
            keyframes.push(parse_keyframes(&mut s)?);
        } else {
            rules.extend(parse_rule(&mut s)?);
        }

        skip_spaces(&mut s);
    }

    // Stable, so rules with the same specificity keep the source order.
    rules.sort_by_key(|r: &Rule| r.selector.specificity());

    Ok(Stylesheet { rules, keyframes })
}

fn parse_rule(s: &mut Stream) -> Result<Vec<Rule>, Error> {
    let selectors = parse_selectors(s)?;
    skip_spaces(s);

    expect(s, b'{', "Expected '{' after selectors")?;
    let declarations = parse_declarations(s)?;
    expect(s, b'}', "Expected '}' after declarations")?;

    let rules = selectors
        .iter()
        .map(|text| Rule {
            selector: Selector::new(text),
            declarations: declarations.clone(),
        })
        .collect();

    Ok(rules)
}

/// Splits a selectors list by commas outside of parens.
fn parse_selectors<'a>(s: &mut Stream<'a>) -> Result<Vec<&'a str>, Error> {
    let mut selectors = Vec::new();
    while !s.at_end() && !s.is_curr_byte_eq(b'{') {
        let start = s.pos();
        let mut depth = 0u32;
        while let Some(c) = s.peek() {
            match c {
                b'{' => break,
                b',' if depth == 0 => break,
                b'(' => depth += 1,
                b')' => depth = depth.saturating_sub(1),
                _ => {}
            }

            s.advance(1);
        }

        let selector = s.slice_back(start).trim();
        if !selector.is_empty() {
            selectors.push(selector);
        }

        if s.is_curr_byte_eq(b',') {
            s.advance(1);
            skip_spaces(s);
        }
    }

    if selectors.is_empty() {
        return Err(Error::syntax("Expected at least one selector"));
    }

    Ok(selectors)
}

fn parse_keyframes(s: &mut Stream) -> Result<KeyframesRule, Error> {
    if !s.try_consume(b"@keyframes") {
        return Err(Error::syntax("Expected @keyframes"));
    }

    skip_spaces(s);
    let name = parse_ident(s)?.to_string();
    skip_spaces(s);

    expect(s, b'{', "Expected '{' after keyframe name")?;
    skip_spaces(s);

    let mut keyframes = Vec::new();
    while !s.at_end() && !s.is_curr_byte_eq(b'}') {
        let selector = parse_keyframe_selector(s)?;
        skip_spaces(s);

        expect(s, b'{', "Expected '{' after keyframe selector")?;
        let declarations = parse_declarations(s)?;
        expect(s, b'}', "Expected '}' after keyframe declarations")?;

        keyframes.push(Keyframe {
            selector,
            declarations,
        });
        skip_spaces(s);
    }

    expect(s, b'}', "Expected '}' after keyframe declarations")?;

    Ok(KeyframesRule { name, keyframes })
}

/// Parses `from`, `to` or a percentage.
fn parse_keyframe_selector(s: &mut Stream) -> Result<String, Error> {
    if s.try_consume(b"from") {
        return Ok("from".to_string());
    }

    if s.try_consume(b"to") {
        return Ok("to".to_string());
    }

    let start = s.pos();
    s.consume_chars(|c| c.is_numeric() || c == '.');
    if !s.is_curr_byte_eq(b'%') {
        return Err(Error::syntax("Expected percentage in keyframe selector"));
    }
    s.advance(1);

    Ok(s.slice_back(start).to_string())
}

pub(crate) fn parse_declarations(s: &mut Stream) -> Result<Vec<Declaration>, Error> {
    let mut declarations = Vec::new();

    skip_spaces(s);
    while !s.at_end() && !s.is_curr_byte_eq(b'}') {
        let name = parse_ident(s)?.to_string();
        skip_spaces(s);

        expect(s, b':', "Expected ':' after property name")?;
        skip_spaces(s);

        let value = parse_value(s)?.to_string();
        declarations.push(Declaration { name, value });

        if s.is_curr_byte_eq(b';') {
            s.advance(1);
        }
        skip_spaces(s);
    }

    Ok(declarations)
}

fn parse_ident<'a>(s: &mut Stream<'a>) -> Result<&'a str, Error> {
    let start = s.pos();
    match s.curr_char() {
        None => return Err(Error::UnexpectedEndOfInput),
        Some(c) if c.is_alphabetic() || c == '_' || c == '-' => s.advance(c.len_utf8()),
        Some(_) => {
            return Err(Error::syntax(
                "Identifier must start with a letter, underscore, or hyphen",
            ));
        }
    }

    s.consume_chars(|c| c.is_alphabetic() || c.is_numeric() || c == '_' || c == '-');
    Ok(s.slice_back(start))
}

/// Consumes a declaration value up to a top-level `;` or `}`.
///
/// Parens and quotes are tracked, so `url(a;b)` and `"a}b"` are kept intact.
fn parse_value<'a>(s: &mut Stream<'a>) -> Result<&'a str, Error> {
    let start = s.pos();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;

    while let Some(c) = s.curr_char() {
        if (c == ';' || c == '}') && depth == 0 && quote.is_none() {
            break;
        }

        match c {
            '"' | '\'' if quote.is_none() => quote = Some(c),
            '"' | '\'' if quote == Some(c) => quote = None,
            '(' if quote.is_none() => depth += 1,
            ')' if quote.is_none() => {
                depth -= 1;
                if depth < 0 {
                    return Err(Error::UnexpectedCharacter {
                        ch: c,
                        pos: s.char_offset(),
                    });
                }
            }
            _ => {}
        }

        s.advance(c.len_utf8());
    }

    Ok(s.slice_back(start).trim())
}

fn expect(s: &mut Stream, c: u8, msg: &str) -> Result<(), Error> {
    if !s.is_curr_byte_eq(c) {
        return Err(Error::syntax(msg));
    }

    s.advance(1);
    Ok(())
}

fn skip_spaces(s: &mut Stream) {
    s.consume_chars(char::is_whitespace);
}
