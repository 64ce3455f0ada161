//! Layer 6: Engine
//!
//! # Purpose
//!
//! This layer defines the seam to the numerical engine and the request
//! frame that owns adapted arguments while the engine runs.
//!
//! # Architecture
//!
//! ```text
//! Layer 7: API
//!   ↓
//! Layer 6: Engine ← You are here
//!   ↓
//! Layer 5: Resource
//!   ↓
//! Layer 4: Callback
//!   ↓
//! Layer 3: Binding
//!   ↓
//! Layer 2: Host
//!   ↓
//! Layer 1: Primitives
//! ```

/// Enumerated engine parameters.
pub mod mode;

/// The engine trait.
pub mod traits;

/// Request frames and outcome resolution.
pub mod executor;

/// Validation utilities.
pub mod validator;
