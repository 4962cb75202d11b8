// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/// A stylesheet parsing error.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Error {
    /// The input does not follow the supported grammar.
    InvalidSyntax(String),

    /// An unbalanced closing paren inside a declaration value.
    ///
    /// The position is a 0-based char offset.
    UnexpectedCharacter {
        /// The offending character.
        ch: char,
        /// Char offset from the beginning of the input.
        pos: usize,
    },

    /// The input ended while an identifier was expected.
    UnexpectedEndOfInput,
}

impl Error {
    pub(crate) fn syntax(msg: &str) -> Self {
        Error::InvalidSyntax(msg.to_string())
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            Error::InvalidSyntax(ref msg) => {
                write!(f, "{}", msg)
            }
            Error::UnexpectedCharacter { ch, pos } => {
                write!(f, "unexpected character '{}' at position {}", ch, pos)
            }
            Error::UnexpectedEndOfInput => {
                write!(f, "unexpected end of input")
            }
        }
    }
}

impl std::error::Error for Error {}
