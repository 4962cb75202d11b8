// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/// Vertical font metrics at a specific font size.
///
/// The descender is negative when it goes below the baseline.
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Default, Debug)]
pub struct FontMetrics {
    pub ascender: f64,
    pub descender: f64,
    pub leading: f64,
}

impl FontMetrics {
    /// Creates new metrics.
    pub fn new(ascender: f64, descender: f64, leading: f64) -> Self {
        FontMetrics {
            ascender,
            descender,
            leading,
        }
    }
}

/// A source of font metrics.
///
/// Text layout doesn't measure or shape text by itself,
/// so the caller has to provide the metrics of the font it renders with.
pub trait FontMetricsProvider {
    /// Returns metrics for a `font-family` value and a font size.
    fn metrics(&self, family: Option<&str>, size: f64) -> Option<FontMetrics>;
}

impl<F> FontMetricsProvider for F
where
    F: Fn(Option<&str>, f64) -> Option<FontMetrics>,
{
    fn metrics(&self, family: Option<&str>, size: f64) -> Option<FontMetrics> {
        (self)(family, size)
    }
}

/// Metrics of a single TrueType/OpenType face.
///
/// Ignores the font family and scales the face metrics by `size / units_per_em`.
#[cfg(feature = "text")]
pub struct FaceMetrics<'a> {
    face: ttf_parser::Face<'a>,
}

#[cfg(feature = "text")]
impl<'a> FaceMetrics<'a> {
    /// Parses a face from a font file.
    ///
    /// `index` selects a face inside a font collection. Use 0 otherwise.
    pub fn from_data(data: &'a [u8], index: u32) -> Option<Self> {
        match ttf_parser::Face::parse(data, index) {
            Ok(face) => Some(FaceMetrics { face }),
            Err(e) => {
                log::warn!("Failed to parse a font face: {}.", e);
                None
            }
        }
    }

    /// Returns metrics at the specified font size.
    pub fn at_size(&self, size: f64) -> FontMetrics {
        let scale = size / f64::from(self.face.units_per_em());
        FontMetrics {
            ascender: f64::from(self.face.ascender()) * scale,
            descender: f64::from(self.face.descender()) * scale,
            leading: f64::from(self.face.line_gap()) * scale,
        }
    }
}

#[cfg(feature = "text")]
impl FontMetricsProvider for FaceMetrics<'_> {
    fn metrics(&self, _: Option<&str>, size: f64) -> Option<FontMetrics> {
        Some(self.at_size(size))
    }
}

#[cfg(feature = "text")]
impl std::fmt::Debug for FaceMetrics<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("FaceMetrics")
            .field("units_per_em", &self.face.units_per_em())
            .finish()
    }
}
