#![deny(missing_docs)]

//! Canonicalization of numeric input arrays.
//!
//! Downstream kernels expect contiguous row-major buffers of a single element
//! type (`f32` unless stated otherwise) with a known rank. The helpers here
//! validate the rank, cast elements and normalize the memory layout.

mod convert;
mod points;

pub use convert::{check_rank, convert_array, convert_array_f32, require_contiguous};
pub use points::{convert_points, convert_points_array};
