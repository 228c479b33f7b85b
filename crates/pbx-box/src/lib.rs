#![deny(missing_docs)]

//! Periodic simulation boxes.
//!
//! [`PeriodicBox`] is the canonical box type. Anything a caller may hand in
//! where a box is expected is described by the closed [`BoxLike`] enum and
//! turned into a box by [`convert_box`].

mod like;
mod params;
mod periodic;
mod points;

pub use like::{convert_box, BoxLike};
pub use params::BoxParameters;
pub use periodic::PeriodicBox;
