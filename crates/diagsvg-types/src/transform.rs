// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{FuzzyEq, Point, Size, Stream};

/// An affine matrix in the `[a c e; b d f; 0 0 1]` form.
#[derive(Clone, Copy, PartialEq, Debug)]
#[allow(missing_docs)]
pub struct Matrix {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Matrix {
    /// Constructs a new matrix.
    #[inline]
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Matrix { a, b, c, d, e, f }
    }

    /// Constructs a new translate matrix.
    #[inline]
    pub fn new_translate(x: f64, y: f64) -> Self {
        Matrix::new(1.0, 0.0, 0.0, 1.0, x, y)
    }

    /// Constructs a new scale matrix.
    #[inline]
    pub fn new_scale(sx: f64, sy: f64) -> Self {
        Matrix::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Constructs a new rotate matrix. The angle is in radians.
    #[inline]
    pub fn new_rotate(angle: f64) -> Self {
        let a = angle.cos();
        let b = angle.sin();
        Matrix::new(a, b, -b, a, 0.0, 0.0)
    }

    /// Constructs a new rotate matrix around the specified position.
    /// The angle is in radians.
    #[inline]
    pub fn new_rotate_at(angle: f64, x: f64, y: f64) -> Self {
        let mut ts = Self::default();
        ts.append(&Matrix::new_translate(x, y));
        ts.append(&Matrix::new_rotate(angle));
        ts.append(&Matrix::new_translate(-x, -y));
        ts
    }

    /// Constructs a new skew matrix along the X axis. The angle is in degrees.
    #[inline]
    pub fn new_skew_x(angle: f64) -> Self {
        let c = angle.to_radians().tan();
        Matrix::new(1.0, 0.0, c, 1.0, 0.0, 0.0)
    }

    /// Constructs a new skew matrix along the Y axis. The angle is in degrees.
    #[inline]
    pub fn new_skew_y(angle: f64) -> Self {
        let b = angle.to_radians().tan();
        Matrix::new(1.0, b, 0.0, 1.0, 0.0, 0.0)
    }

    /// Appends a matrix to the current one.
    #[inline]
    pub fn append(&mut self, other: &Matrix) {
        *self = multiply(self, other);
    }

    /// Returns matrix's scale part.
    #[inline]
    pub fn get_scale(&self) -> (f64, f64) {
        let x_scale = (self.a * self.a + self.c * self.c).sqrt();
        let y_scale = (self.b * self.b + self.d * self.d).sqrt();
        (x_scale, y_scale)
    }

    /// Returns `true` if the matrix is default, aka `(1 0 0 1 0 0)`.
    pub fn is_default(&self) -> bool {
        self.fuzzy_eq(&Matrix::default())
    }

    /// Applies the matrix to a point.
    #[inline]
    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.e,
            self.b * p.x + self.d * p.y + self.f,
        )
    }
}

#[inline(never)]
fn multiply(ts1: &Matrix, ts2: &Matrix) -> Matrix {
    Matrix {
        a: ts1.a * ts2.a + ts1.c * ts2.b,
        b: ts1.b * ts2.a + ts1.d * ts2.b,
        c: ts1.a * ts2.c + ts1.c * ts2.d,
        d: ts1.b * ts2.c + ts1.d * ts2.d,
        e: ts1.a * ts2.e + ts1.c * ts2.f + ts1.e,
        f: ts1.b * ts2.e + ts1.d * ts2.f + ts1.f,
    }
}

impl Default for Matrix {
    #[inline]
    fn default() -> Matrix {
        Matrix::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }
}

impl FuzzyEq for Matrix {
    fn fuzzy_eq(&self, other: &Self) -> bool {
        self.a.fuzzy_eq(&other.a)
            && self.b.fuzzy_eq(&other.b)
            && self.c.fuzzy_eq(&other.c)
            && self.d.fuzzy_eq(&other.d)
            && self.e.fuzzy_eq(&other.e)
            && self.f.fuzzy_eq(&other.f)
    }
}

/// A single transform function from a `transform` attribute.
///
/// Rotation angles are stored in radians, skew angles in degrees,
/// the same way they come out of the attribute parser.
#[derive(Clone, Copy, PartialEq, Debug)]
#[allow(missing_docs)]
pub enum TransformOp {
    Matrix {
        a: f64,
        b: f64,
        c: f64,
        d: f64,
        e: f64,
        f: f64,
    },
    Translate {
        tx: f64,
        ty: f64,
    },
    Scale {
        sx: f64,
        sy: f64,
    },
    Rotate {
        angle: f64,
        cx: f64,
        cy: f64,
    },
    SkewX {
        angle: f64,
    },
    SkewY {
        angle: f64,
    },
}

impl TransformOp {
    /// Converts the operation into an affine matrix.
    pub fn to_matrix(&self) -> Matrix {
        match *self {
            TransformOp::Matrix { a, b, c, d, e, f } => Matrix::new(a, b, c, d, e, f),
            TransformOp::Translate { tx, ty } => Matrix::new_translate(tx, ty),
            TransformOp::Scale { sx, sy } => Matrix::new_scale(sx, sy),
            TransformOp::Rotate { angle, cx, cy } => Matrix::new_rotate_at(angle, cx, cy),
            TransformOp::SkewX { angle } => Matrix::new_skew_x(angle),
            TransformOp::SkewY { angle } => Matrix::new_skew_y(angle),
        }
    }

    /// Returns the same operation without its translation part.
    ///
    /// A matrix loses `e` and `f`, a translate becomes a zero translate.
    /// Everything else is kept as is.
    pub fn scale_and_rotate(&self) -> TransformOp {
        match *self {
            TransformOp::Matrix { a, b, c, d, .. } => TransformOp::Matrix {
                a,
                b,
                c,
                d,
                e: 0.0,
                f: 0.0,
            },
            TransformOp::Translate { .. } => TransformOp::Translate { tx: 0.0, ty: 0.0 },
            op => op,
        }
    }

    /// Returns the rotation angle in radians.
    ///
    /// Only matrices and rotations contribute.
    pub fn rotation(&self) -> f64 {
        match *self {
            TransformOp::Matrix { a, b, .. } => b.atan2(a),
            TransformOp::Rotate { angle, .. } => angle,
            _ => 0.0,
        }
    }

    /// Returns the scale factors, if the operation scales anything.
    ///
    /// A matrix is decomposed as `sqrt(a² + c²)` and `sqrt(b² + d²)`.
    fn scale_factors(&self) -> Option<(f64, f64)> {
        match *self {
            TransformOp::Scale { sx, sy } => Some((sx, sy)),
            TransformOp::Matrix { a, b, c, d, .. } => {
                Some((Matrix::new(a, b, c, d, 0.0, 0.0)).get_scale())
            }
            _ => None,
        }
    }
}

/// A parsed `transform` attribute: an ordered list of transform functions.
///
/// Ancestor transforms are kept in a separate outer list,
/// with the nearest one last. Points are always transformed starting
/// from the last operation, so an element's own transform applies first.
#[derive(Clone, PartialEq, Default, Debug)]
pub struct Transform {
    /// Transform functions in the source order.
    pub ops: Vec<TransformOp>,
}

impl From<TransformOp> for Transform {
    fn from(op: TransformOp) -> Self {
        Transform { ops: vec![op] }
    }
}

impl Transform {
    /// Creates a new transform from operations.
    #[inline]
    pub fn new(ops: Vec<TransformOp>) -> Self {
        Transform { ops }
    }

    /// Parses a `transform` attribute value.
    ///
    /// Returns `None` for an empty or whitespace-only string.
    /// Unknown functions and functions with too few arguments are skipped,
    /// so the result can contain no operations at all.
    pub fn parse(text: &str) -> Option<Transform> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let mut ops = Vec::new();
        let mut s = Stream::from(text);
        loop {
            // Jump to the next function name.
            s.skip_bytes(|c| !c.is_ascii_alphabetic());
            if s.at_end() {
                break;
            }

            let name = s.consume_ascii_ident();
            s.skip_spaces();
            if !s.is_curr_byte_eq(b'(') {
                continue;
            }
            s.advance(1);

            let args = match parse_args(&mut s) {
                Some(v) => v,
                None => {
                    log::debug!("Invalid arguments of the '{}' transform.", name);
                    continue;
                }
            };

            match transform_op(&name.to_ascii_lowercase(), &args) {
                Some(op) => ops.push(op),
                None => log::debug!("Transform '{}' was skipped.", name),
            }
        }

        Some(Transform { ops })
    }

    /// Applies the transform to a point.
    ///
    /// Operations are applied from the last one to the first.
    pub fn apply(&self, p: Point) -> Point {
        self.ops.iter().rev().fold(p, |p, op| op.to_matrix().apply(p))
    }

    /// Scales a size by every scale and matrix operation.
    pub fn apply_scale(&self, size: Size) -> Size {
        let mut size = size;
        for (sx, sy) in self.ops.iter().filter_map(|op| op.scale_factors()) {
            size.width *= sx;
            size.height *= sy;
        }

        size
    }

    /// Scales a single length by the smaller scale factor of each operation.
    pub fn apply_scale_value(&self, value: f64) -> f64 {
        self.ops
            .iter()
            .filter_map(|op| op.scale_factors())
            .fold(value, |v, (sx, sy)| v * sx.min(sy))
    }

    /// Returns the accumulated scale factors.
    pub fn scale(&self) -> (f64, f64) {
        self.ops
            .iter()
            .filter_map(|op| op.scale_factors())
            .fold((1.0, 1.0), |(x, y), (sx, sy)| (x * sx, y * sy))
    }

    /// Returns the sum of all rotation angles, in radians.
    pub fn rotation(&self) -> f64 {
        self.ops.iter().map(|op| op.rotation()).sum()
    }

    /// Returns the same transform with all translations removed.
    pub fn scale_and_rotate(&self) -> Transform {
        Transform {
            ops: self.ops.iter().map(|op| op.scale_and_rotate()).collect(),
        }
    }

    /// Flattens the transform into a single matrix.
    pub fn to_matrix(&self) -> Matrix {
        let mut ts = Matrix::default();
        for op in &self.ops {
            ts.append(&op.to_matrix());
        }

        ts
    }
}

/// Parses a comma/space separated numbers list up to and including the closing paren.
fn parse_args(s: &mut Stream) -> Option<Vec<f64>> {
    let mut args = Vec::new();
    loop {
        s.skip_bytes(|c| c.is_ascii_whitespace() || c == b',');
        if s.at_end() {
            return None;
        }

        if s.is_curr_byte_eq(b')') {
            s.advance(1);
            return Some(args);
        }

        let mut s2 = *s;
        match s2.parse_number() {
            Ok(n) => {
                args.push(n);
                *s = s2;
            }
            Err(_) => {
                // Drop the whole function.
                s.skip_bytes(|c| c != b')');
                if !s.at_end() {
                    s.advance(1);
                }

                return None;
            }
        }
    }
}

fn transform_op(name: &str, args: &[f64]) -> Option<TransformOp> {
    let op = match (name, args) {
        ("matrix", &[a, b, c, d, e, f]) => TransformOp::Matrix { a, b, c, d, e, f },
        ("translate", &[tx]) => TransformOp::Translate { tx, ty: 0.0 },
        ("translate", &[tx, ty, ..]) => TransformOp::Translate { tx, ty },
        ("scale", &[sx]) => TransformOp::Scale { sx, sy: sx },
        ("scale", &[sx, sy, ..]) => TransformOp::Scale { sx, sy },
        ("rotate", &[angle, cx, cy, ..]) => TransformOp::Rotate {
            angle: angle.to_radians(),
            cx,
            cy,
        },
        ("rotate", &[angle, ..]) => TransformOp::Rotate {
            angle: angle.to_radians(),
            cx: 0.0,
            cy: 0.0,
        },
        ("skewx", &[angle, ..]) => TransformOp::SkewX { angle },
        ("skewy", &[angle, ..]) => TransformOp::SkewY { angle },
        _ => return None,
    };

    Some(op)
}
