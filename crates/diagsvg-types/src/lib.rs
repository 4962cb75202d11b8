// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
*diagsvg-types* contains geometry primitives and parsers for the SVG value types
used by diagram renderers.

## Supported types

- [`<path>`](https://www.w3.org/TR/SVG2/paths.html#PathData)
- [`<transform>`](https://www.w3.org/TR/SVG11/types.html#DataTypeTransformList)
- [`<list-of-points>`](https://www.w3.org/TR/SVG11/shapes.html#PointsBNF)
- [`<list-of-numbers>`](https://www.w3.org/TR/SVG2/types.html#InterfaceSVGNumberList)

## Features

- Paths never fail to parse. Invalid data is skipped and incomplete commands are dropped.
- Relative and shorthand path commands are converted into absolute ones.
- Transform lists keep their functions, so scale and rotation can be queried separately.

## Safety

- The library should not panic.
- The library forbids unsafe code.
*/

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]

mod error;
mod geom;
mod list;
mod path;
mod stream;
mod transform;

pub use crate::error::*;
pub use crate::geom::*;
pub use crate::list::*;
pub use crate::path::*;
pub use crate::stream::*;
pub use crate::transform::*;
