// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::fmt;

use crate::{Point, Size, Stream, Transform};

/// A path segment.
///
/// All coordinates are absolute. Relative and shorthand commands
/// are resolved during parsing.
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum PathSegment {
    MoveTo(Point),
    LineTo(Point),
    CurveTo {
        c1: Point,
        c2: Point,
        end: Point,
    },
    Quadratic {
        ctrl: Point,
        end: Point,
    },
    ArcTo {
        rx: f64,
        ry: f64,
        x_axis_rotation: f64,
        large_arc: bool,
        sweep: bool,
        end: Point,
    },
    ClosePath,
}

impl PathSegment {
    /// Returns the segment's end point and the point it arrives from.
    pub fn end_anchor(&self) -> Option<(Point, Option<Point>)> {
        match *self {
            PathSegment::MoveTo(p) | PathSegment::LineTo(p) => Some((p, None)),
            PathSegment::CurveTo { c2, end, .. } => Some((end, Some(c2))),
            PathSegment::Quadratic { ctrl, end } => Some((end, Some(ctrl))),
            PathSegment::ArcTo { end, .. } => Some((end, None)),
            PathSegment::ClosePath => None,
        }
    }

    /// Returns the segment's start point (if it defines one) and the point it leaves to.
    pub fn start_anchor(&self) -> Option<(Option<Point>, Option<Point>)> {
        match *self {
            PathSegment::MoveTo(p) | PathSegment::LineTo(p) => Some((Some(p), None)),
            PathSegment::CurveTo { c1, .. } => Some((None, Some(c1))),
            PathSegment::Quadratic { ctrl, .. } => Some((None, Some(ctrl))),
            PathSegment::ArcTo { .. } => Some((None, None)),
            PathSegment::ClosePath => None,
        }
    }

    /// Transforms all points of the segment.
    ///
    /// Arc radii are scaled, the axis rotation is kept.
    pub fn transform(&self, ts: &Transform) -> PathSegment {
        match *self {
            PathSegment::MoveTo(p) => PathSegment::MoveTo(ts.apply(p)),
            PathSegment::LineTo(p) => PathSegment::LineTo(ts.apply(p)),
            PathSegment::CurveTo { c1, c2, end } => PathSegment::CurveTo {
                c1: ts.apply(c1),
                c2: ts.apply(c2),
                end: ts.apply(end),
            },
            PathSegment::Quadratic { ctrl, end } => PathSegment::Quadratic {
                ctrl: ts.apply(ctrl),
                end: ts.apply(end),
            },
            PathSegment::ArcTo {
                rx,
                ry,
                x_axis_rotation,
                large_arc,
                sweep,
                end,
            } => {
                let r = ts.apply_scale(Size::new(rx, ry));
                PathSegment::ArcTo {
                    rx: r.width,
                    ry: r.height,
                    x_axis_rotation,
                    large_arc,
                    sweep,
                    end: ts.apply(end),
                }
            }
            PathSegment::ClosePath => PathSegment::ClosePath,
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            PathSegment::MoveTo(p) => write!(f, "M {:?} {:?}", p.x, p.y),
            PathSegment::LineTo(p) => write!(f, "L {:?} {:?}", p.x, p.y),
            PathSegment::CurveTo { c1, c2, end } => write!(
                f,
                "C {:?} {:?}, {:?} {:?}, {:?} {:?}",
                c1.x, c1.y, c2.x, c2.y, end.x, end.y
            ),
            PathSegment::Quadratic { ctrl, end } => {
                write!(f, "Q {:?} {:?}, {:?} {:?}", ctrl.x, ctrl.y, end.x, end.y)
            }
            PathSegment::ArcTo {
                rx,
                ry,
                x_axis_rotation,
                large_arc,
                sweep,
                end,
            } => write!(
                f,
                "A {:?} {:?} {:?} {} {} {:?} {:?}",
                rx, ry, x_axis_rotation, large_arc as u8, sweep as u8, end.x, end.y
            ),
            PathSegment::ClosePath => write!(f, "Z"),
        }
    }
}

/// Something a marker can be attached to.
pub trait MarkerAnchors {
    /// Returns the end point and the point the shape arrives from.
    fn end_marker_anchor(&self) -> Option<(Point, Point)>;

    /// Returns the start point and the point the shape leaves to.
    fn start_marker_anchor(&self) -> Option<(Point, Point)>;
}

/// A parsed `d` attribute.
#[derive(Clone, PartialEq, Default, Debug)]
pub struct Path {
    /// Path segments.
    pub segments: Vec<PathSegment>,
}

impl Path {
    /// Parses a `d` attribute.
    ///
    /// Never fails. Unknown characters are ignored and
    /// incomplete argument groups are dropped.
    pub fn parse(text: &str) -> Path {
        let mut builder = PathBuilder::default();

        let mut cmd: Option<u8> = None;
        let mut values = Vec::new();

        let mut s = Stream::from(text);
        loop {
            s.skip_bytes(|c| c.is_ascii_whitespace() || c == b',');
            if s.at_end() {
                break;
            }

            let mut s2 = s;
            if let Ok(n) = s2.parse_number() {
                values.push(n);
                s = s2;
                continue;
            }

            match s.curr_char() {
                Some(c) if c.is_ascii_alphabetic() => {
                    if let Some(prev) = cmd {
                        builder.exec(prev, &values);
                    }

                    cmd = Some(c as u8);
                    values.clear();
                }
                _ => {}
            }

            s.advance_char();
        }

        if let Some(prev) = cmd {
            builder.exec(prev, &values);
        }

        Path {
            segments: builder.segments,
        }
    }

    /// Returns `true` if the path has no segments.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Applies a transform to each segment.
    pub fn transform(&self, ts: &Transform) -> Path {
        Path {
            segments: self.segments.iter().map(|seg| seg.transform(ts)).collect(),
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[")?;
        for (i, seg) in self.segments.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }

            write!(f, "{}", seg)?;
        }
        write!(f, "]")
    }
}

impl MarkerAnchors for Path {
    fn end_marker_anchor(&self) -> Option<(Point, Point)> {
        let mut items = &self.segments[..];

        let (mut end, mut prev) = match items.last().and_then(|s| s.end_anchor()) {
            Some((p, orient)) => (Some(p), orient),
            None => (None, None),
        };

        if end.is_none() {
            items = &items[..items.len().saturating_sub(1)];
            let (p, orient) = items.last()?.end_anchor()?;
            end = Some(p);
            prev = orient;
        }

        if prev.is_none() {
            items = &items[..items.len().saturating_sub(1)];
            let (p, _) = items.last()?.end_anchor()?;
            prev = Some(p);
        }

        let end = end?;
        Some((end, prev.unwrap_or(end)))
    }

    fn start_marker_anchor(&self) -> Option<(Point, Point)> {
        let (start, mut next) = self.segments.first()?.start_anchor()?;
        let start = start?;

        if next.is_none() {
            let (p, orient) = self.segments.get(1)?.start_anchor()?;
            next = p.or(orient);
        }

        Some((start, next?))
    }
}

#[derive(Default)]
struct PathBuilder {
    segments: Vec<PathSegment>,
    current: Point,
    last_control: Option<Point>,
}

impl PathBuilder {
    fn exec(&mut self, cmd: u8, values: &[f64]) {
        let rel = cmd.is_ascii_lowercase();
        match cmd.to_ascii_uppercase() {
            b'M' => self.move_to(values, rel),
            b'L' => self.line_to(values, rel),
            b'H' => {
                for &v in values {
                    let x = if rel { v + self.current.x } else { v };
                    self.line_to(&[x, self.current.y], false);
                }
            }
            b'V' => {
                for &v in values {
                    let y = if rel { v + self.current.y } else { v };
                    self.line_to(&[self.current.x, y], false);
                }
            }
            b'C' => self.curve_to(values, rel),
            b'S' => {
                for v in values.chunks_exact(4) {
                    let c1 = 2.0 * self.current - self.last_control.unwrap_or(self.current);
                    let mut c2 = Point::new(v[0], v[1]);
                    let mut end = Point::new(v[2], v[3]);
                    if rel {
                        c2 += self.current;
                        end += self.current;
                    }

                    self.curve_to(&[c1.x, c1.y, c2.x, c2.y, end.x, end.y], false);
                }
            }
            b'Q' => self.quad_to(values, rel),
            b'T' => {
                for v in values.chunks_exact(2) {
                    let ctrl = 2.0 * self.current - self.last_control.unwrap_or(self.current);
                    let mut end = Point::new(v[0], v[1]);
                    if rel {
                        end += self.current;
                    }

                    self.quad_to(&[ctrl.x, ctrl.y, end.x, end.y], false);
                }
            }
            b'A' => {
                for v in values.chunks_exact(7) {
                    let mut end = Point::new(v[5], v[6]);
                    if rel {
                        end += self.current;
                    }

                    self.current = end;
                    self.last_control = None;
                    self.segments.push(PathSegment::ArcTo {
                        rx: v[0],
                        ry: v[1],
                        x_axis_rotation: v[2],
                        large_arc: v[3] != 0.0,
                        sweep: v[4] != 0.0,
                        end,
                    });
                }
            }
            b'Z' => {
                self.segments.push(PathSegment::ClosePath);
                // Resets to the origin, not to the subpath start.
                self.current = Point::default();
                self.last_control = None;
            }
            _ => log::debug!("Unknown path command '{}'.", cmd as char),
        }
    }

    fn move_to(&mut self, values: &[f64], rel: bool) {
        if values.len() < 2 {
            return;
        }

        let mut p = Point::new(values[0], values[1]);
        if rel {
            p += self.current;
        }

        self.current = p;
        self.last_control = None;
        self.segments.push(PathSegment::MoveTo(p));

        // Extra pairs are implicit line-to commands.
        self.line_to(&values[2..], rel);
    }

    fn line_to(&mut self, values: &[f64], rel: bool) {
        for v in values.chunks_exact(2) {
            let mut p = Point::new(v[0], v[1]);
            if rel {
                p += self.current;
            }

            self.current = p;
            self.last_control = None;
            self.segments.push(PathSegment::LineTo(p));
        }
    }

    fn curve_to(&mut self, values: &[f64], rel: bool) {
        for v in values.chunks_exact(6) {
            let mut c1 = Point::new(v[0], v[1]);
            let mut c2 = Point::new(v[2], v[3]);
            let mut end = Point::new(v[4], v[5]);
            if rel {
                c1 += self.current;
                c2 += self.current;
                end += self.current;
            }

            self.current = end;
            self.last_control = Some(c2);
            self.segments.push(PathSegment::CurveTo { c1, c2, end });
        }
    }

    fn quad_to(&mut self, values: &[f64], rel: bool) {
        for v in values.chunks_exact(4) {
            let mut ctrl = Point::new(v[0], v[1]);
            let mut end = Point::new(v[2], v[3]);
            if rel {
                ctrl += self.current;
                end += self.current;
            }

            self.current = end;
            self.last_control = Some(ctrl);
            self.segments.push(PathSegment::Quadratic { ctrl, end });
        }
    }
}

#[rustfmt::skip]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::TransformOp;

    macro_rules! test {
        ($name:ident, $text:expr, $result:expr) => (
            #[test]
            fn $name() {
                assert_eq!(Path::parse($text).to_string(), $result);
            }
        )
    }

    test!(absolute_lines, "M 10 10 H 90 V 90 H 10 Z",
        "[M 10.0 10.0, L 90.0 10.0, L 90.0 90.0, L 10.0 90.0, Z]");

    test!(relative_lines, "M 10 10 h 80 v 80 h -80 Z",
        "[M 10.0 10.0, L 90.0 10.0, L 90.0 90.0, L 10.0 90.0, Z]");

    test!(cubic, "M 70 110 C 70 140, 110 140, 110 110",
        "[M 70.0 110.0, C 70.0 140.0, 110.0 140.0, 110.0 110.0]");

    test!(smooth_cubic, "M 10 80 C 40 10, 65 10, 95 80 S 150 150, 180 80",
        "[M 10.0 80.0, C 40.0 10.0, 65.0 10.0, 95.0 80.0, C 125.0 150.0, 150.0 150.0, 180.0 80.0]");

    test!(smooth_after_line, "M 0 0 C 1 1, 2 2, 3 3 L 5 5 S 6 6, 7 7",
        "[M 0.0 0.0, C 1.0 1.0, 2.0 2.0, 3.0 3.0, L 5.0 5.0, C 5.0 5.0, 6.0 6.0, 7.0 7.0]");

    test!(quadratic, "M 10 80 Q 95 10 180 80",
        "[M 10.0 80.0, Q 95.0 10.0, 180.0 80.0]");

    test!(smooth_quadratic, "M 10 80 Q 52.5 10, 95 80 T 180 80",
        "[M 10.0 80.0, Q 52.5 10.0, 95.0 80.0, Q 137.5 150.0, 180.0 80.0]");

    test!(subpaths, "M 45 45 L 345 45 L 345 345 L 45 345 Z M 195 45 L 195 345 M 45 195 L 345 195",
        "[M 45.0 45.0, L 345.0 45.0, L 345.0 345.0, L 45.0 345.0, Z, \
          M 195.0 45.0, L 195.0 345.0, M 45.0 195.0, L 345.0 195.0]");

    test!(arc, "M 250 100 A 45 45, 0, 1, 0, 295 145 L 295 100 Z",
        "[M 250.0 100.0, A 45.0 45.0 0.0 1 0 295.0 145.0, L 295.0 100.0, Z]");

    test!(compact, "M323.156,62.628L306.474,70.857",
        "[M 323.156 62.628, L 306.474 70.857]");

    test!(implicit_line_to, "m 1 1 2 2 3 3",
        "[M 1.0 1.0, L 3.0 3.0, L 6.0 6.0]");

    test!(relative_after_close, "M 10 10 Z l 5 5",
        "[M 10.0 10.0, Z, L 5.0 5.0]");

    test!(incomplete_group, "M 10 10 L 20",
        "[M 10.0 10.0]");

    test!(garbage, "M 10 10 # L 20 20",
        "[M 10.0 10.0, L 20.0 20.0]");

    test!(empty, "", "[]");

    #[test]
    fn transform_arc() {
        let path = Path::parse("M 0 0 A 5 10 30 0 1 10 10");
        let ts = Transform::new(vec![
            TransformOp::Translate { tx: 1.0, ty: 2.0 },
            TransformOp::Scale { sx: 2.0, sy: 3.0 },
        ]);
        assert_eq!(path.transform(&ts).to_string(),
            "[M 1.0 2.0, A 10.0 30.0 30.0 0 1 21.0 32.0]");
    }

    #[test]
    fn end_anchor_line() {
        let path = Path::parse("M 0 0 L 10 0 L 10 10");
        assert_eq!(path.end_marker_anchor(),
            Some((Point::new(10.0, 10.0), Point::new(10.0, 0.0))));
    }

    #[test]
    fn end_anchor_curve() {
        let path = Path::parse("M 0 0 C 1 2, 3 4, 5 6");
        assert_eq!(path.end_marker_anchor(),
            Some((Point::new(5.0, 6.0), Point::new(3.0, 4.0))));
    }

    #[test]
    fn end_anchor_closed() {
        let path = Path::parse("M 0 0 L 10 0 L 10 10 Z");
        assert_eq!(path.end_marker_anchor(),
            Some((Point::new(10.0, 10.0), Point::new(10.0, 0.0))));
    }

    #[test]
    fn end_anchor_single_point() {
        assert_eq!(Path::parse("M 5 5").end_marker_anchor(), None);
        assert_eq!(Path::parse("").end_marker_anchor(), None);
    }

    #[test]
    fn start_anchor() {
        let path = Path::parse("M 0 0 L 10 0");
        assert_eq!(path.start_marker_anchor(),
            Some((Point::new(0.0, 0.0), Point::new(10.0, 0.0))));

        let path = Path::parse("M 0 0 C 1 2, 3 4, 5 6");
        assert_eq!(path.start_marker_anchor(),
            Some((Point::new(0.0, 0.0), Point::new(1.0, 2.0))));

        let path = Path::parse("M 0 0 A 1 1 0 0 0 5 5");
        assert_eq!(path.start_marker_anchor(), None);

        let path = Path::parse("C 1 2, 3 4, 5 6");
        assert_eq!(path.start_marker_anchor(), None);
    }
}
