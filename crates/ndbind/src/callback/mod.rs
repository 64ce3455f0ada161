//! Layer 4: Callback
//!
//! # Purpose
//!
//! This layer turns a pluggable kernel object into one native function
//! pointer and one context pointer, and provides the native thunks that
//! forward engine calls to host callables.
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
//! Layer 4: Callback ← You are here
//!   ↓
//! Layer 3: Binding
//!   ↓
//! Layer 2: Host
//!   ↓
//! Layer 1: Primitives
//! ```

/// C signature parsing and family tables.
pub mod signature;

/// Extra callback arguments.
pub mod context;

/// Native entry points for host callables.
pub mod thunks;

/// Kernel negotiation.
pub mod negotiator;
