//! Layer 1: Primitives
//!
//! # Purpose
//!
//! This layer provides the element types, layout flags, error types and
//! fallible allocation used throughout the crate. It has zero internal
//! dependencies within the crate.
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
//! Layer 2: Host
//!   ↓
//! Layer 1: Primitives ← You are here
//! ```

/// Element types and byte-level casting.
pub mod dtype;

/// Layout requirement flags.
pub mod flags;

/// Shared error types.
pub mod errors;

/// Fallible allocation.
pub mod buffer;
