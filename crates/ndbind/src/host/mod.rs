//! Layer 2: Host
//!
//! # Purpose
//!
//! This layer models the objects a host runtime passes across the boundary:
//! arrays, dynamically typed values, callables, function-pointer capsules,
//! opaque resource handles, and the integer sequences materialized from them.
//!
//! # Architecture
//!
//! ```text
//! Layer 7: API
//!   ↓
//! Layer 6: Engine
//!   ↓
//! Layer 5: Resource
//!   ↓
//! Layer 4: Callback
//!   ↓
//! Layer 3: Binding
//!   ↓
//! Layer 2: Host ← You are here
//!   ↓
//! Layer 1: Primitives
//! ```

/// Host arrays.
pub mod array;

/// Dynamically typed host values.
pub mod value;

/// Host callables.
pub mod callable;

/// Function pointer capsules.
pub mod capsule;

/// Reference-counted resource handles.
pub mod handle;

/// Integer sequence materialization.
pub mod sequence;

/// `ndarray` conversions.
#[cfg(feature = "ndarray")]
pub mod interop;
