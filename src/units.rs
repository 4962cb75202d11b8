// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::str::FromStr;

use diagsvg_types::Rect;

/// Parses a length attribute.
///
/// `50%` becomes `0.5`. The `px` and `em` suffixes are stripped without any conversion.
pub(crate) fn parse_length(text: &str) -> Option<f64> {
    let text = text.trim();
    if let Some(n) = text.strip_suffix('%') {
        return parse_f64(n).map(|n| n / 100.0);
    }

    let n = text
        .strip_suffix("px")
        .or_else(|| text.strip_suffix("em"))
        .unwrap_or(text);
    parse_f64(n)
}

/// Parses a plain number or a number with the `px` suffix.
pub(crate) fn parse_px(text: &str) -> Option<f64> {
    let text = text.trim();
    match text.strip_suffix("px") {
        Some(n) => parse_f64(n),
        None => parse_f64(text),
    }
}

/// Parses a number that can be relative to a font size.
///
/// `2em` becomes `2 * base`.
pub(crate) fn parse_em(text: &str, base: f64) -> Option<f64> {
    let text = text.trim();
    match text.strip_suffix("em") {
        Some(n) => parse_f64(n).map(|n| n * base),
        None => parse_f64(text),
    }
}

/// Parses a number or a percentage as a fraction.
pub(crate) fn parse_fraction(text: &str) -> Option<f64> {
    let text = text.trim();
    match text.strip_suffix('%') {
        Some(n) => parse_f64(n).map(|n| n / 100.0),
        None => parse_f64(text),
    }
}

/// Parses a `viewBox` attribute. Exactly four numbers are expected.
pub(crate) fn parse_view_box(text: &str) -> Option<Rect> {
    let mut values = [0.0; 4];
    let mut count = 0;
    for part in text.split_whitespace() {
        if count == 4 {
            return None;
        }

        values[count] = parse_f64(part)?;
        count += 1;
    }

    if count != 4 {
        return None;
    }

    Some(Rect::new(values[0], values[1], values[2], values[3]))
}

#[inline]
fn parse_f64(text: &str) -> Option<f64> {
    f64::from_str(text.trim()).ok().filter(|n| n.is_finite())
}
