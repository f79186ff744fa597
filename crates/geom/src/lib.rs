//! Geometry primitives used across grove.
//!
//! Coordinates are signed so that children scrolled partially out of their
//! parent keep meaningful bounds; sizes are unsigned.

#![warn(missing_docs)]

/// Error types for geometry operations.
mod error;
/// Width/height size type.
mod expanse;
/// Point helpers.
mod point;
/// Rectangle operations.
mod rect;
/// Rectangle subtraction.
mod shatter;

pub use error::{Error, Result};
pub use expanse::Expanse;
pub use point::Point;
pub use rect::Rect;
pub use shatter::shatter;
