// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/// A value scanning error.
///
/// Attribute parsers skip over the data that failed. This error only
/// surfaces through [`Stream`](crate::Stream) itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    /// A number could not be read at this char position, starting from 1.
    InvalidNumber(usize),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            Error::InvalidNumber(pos) => write!(f, "invalid number at position {}", pos),
        }
    }
}

impl std::error::Error for Error {}
