//! Layer 5: Resource
//!
//! # Purpose
//!
//! This layer holds native state that outlives a single request and is
//! carried by the host between calls.
//!
//! # Architecture
//!
//! ```text
//! Layer 7: API
//!   ↓
//! Layer 6: Engine
//!   ↓
//! Layer 5: Resource ← You are here
//!   ↓
//! Layer 4: Callback
//!   ↓
//! Layer 3: Binding
//!   ↓
//! Layer 2: Host
//!   ↓
//! Layer 1: Primitives
//! ```

/// Coordinate worklists.
pub mod worklist;
