// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::str::FromStr;

use crate::{Point, Stream};

/// Parses a `points` attribute.
///
/// Anything that is not a number is skipped. A trailing odd number is ignored.
pub fn parse_points(text: &str) -> Vec<Point> {
    let mut points = Vec::new();
    let mut x = None;

    let mut s = Stream::from(text);
    while !s.at_end() {
        let mut s2 = s;
        match s2.parse_number() {
            Ok(n) => {
                s = s2;
                match x.take() {
                    Some(x) => points.push(Point::new(x, n)),
                    None => x = Some(n),
                }
            }
            Err(_) => {
                // `parse_number` skips spaces, so we may be at the end already.
                s.skip_spaces();
                s.advance_char();
            }
        }
    }

    points
}

/// Parses a list of numbers separated by `separator`.
///
/// Empty items are skipped. Returns `None` when any item is not a number.
pub fn parse_number_list(text: &str, separator: char) -> Option<Vec<f64>> {
    let mut list = Vec::new();
    for part in text.trim().split(separator) {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        list.push(f64::from_str(part).ok()?);
    }

    Some(list)
}

#[rustfmt::skip]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_1() {
        assert_eq!(parse_points("-16,0 80.15625,0 80.15625,-32"), vec![
            Point::new(-16.0, 0.0),
            Point::new(80.15625, 0.0),
            Point::new(80.15625, -32.0),
        ]);
    }

    #[test]
    fn points_odd() {
        assert_eq!(parse_points("1 2 3"), vec![Point::new(1.0, 2.0)]);
    }

    #[test]
    fn points_garbage() {
        assert_eq!(parse_points(" x1;2 , 3 ? 4 "), vec![
            Point::new(1.0, 2.0),
            Point::new(3.0, 4.0),
        ]);
        assert!(parse_points("").is_empty());
    }

    #[test]
    fn number_list() {
        assert_eq!(parse_number_list("9 5", ' '), Some(vec![9.0, 5.0]));
        assert_eq!(parse_number_list("9,5", ' '), None);
        assert_eq!(parse_number_list(" 9, 5 ", ','), Some(vec![9.0, 5.0]));
        assert_eq!(parse_number_list("  ", ','), Some(vec![]));
    }
}
