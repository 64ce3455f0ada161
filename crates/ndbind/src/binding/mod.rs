//! Layer 3: Binding
//!
//! # Purpose
//!
//! This layer adapts host array arguments into descriptors the engine can
//! use, staging through temporaries when the caller's storage does not meet
//! the requested layout, and writing results back on success.
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
//! Layer 3: Binding ← You are here
//!   ↓
//! Layer 2: Host
//!   ↓
//! Layer 1: Primitives
//! ```

/// Engine-facing array descriptors.
pub mod view;

/// Adaptation and write-back.
pub mod adapt;
