//! Boundary operations of [`Bridge`](crate::api::Bridge), grouped by kind.
//!
//! Each submodule adds methods to the bridge. A method adapts its array
//! arguments through a request frame, materializes integer sequences,
//! negotiates its kernel if it has one, checks scalar arguments, runs the
//! engine, and commits or discards the frame.

mod distance;
mod filters;
mod fourier;
mod interpolation;
mod measurements;
mod morphology;
