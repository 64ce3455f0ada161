//! Error types for boundary operations.
//!
//! ## Purpose
//!
//! This module defines the error conditions that can surface while adapting
//! host arguments, negotiating callbacks, invoking user kernels, and handing
//! work to the numerical engine.
//!
//! ## Design notes
//!
//! * **Verbatim propagation**: Host-level failures are carried as [`HostError`]
//!   and displayed unchanged; no generic "operation failed" text replaces them.
//! * **Distinct conversion failures**: A host callable that raises and a host
//!   callable whose return value cannot be converted produce different kinds.
//! * **Contextual**: Variants carry the offending names or a formatted message.
//!
//! ## Key concepts
//!
//! 1. **Adaptation errors**: allocation, conversion, type and shape mismatches.
//! 2. **Callback errors**: unsupported callables, host failures, native failures.
//! 3. **Resource errors**: wrong handle kind, reuse after release.
//! 4. **Engine errors**: failures reported by the external numerical engine.
//!
//! ## Invariants
//!
//! * The `Display` text of a `HostCallableFailure` is exactly the host error's text.
//! * Every variant is `Clone` so a parked callback error can be surfaced later.
//!
//! ## Non-goals
//!
//! * This module does not decide which failures are recoverable.

// External dependencies
use std::error::Error;
use std::fmt::{Display, Formatter, Result};

// ============================================================================
// Host Error
// ============================================================================

/// An error raised by the host runtime, typically from inside a user callable.
///
/// `kind` names the host's error class (e.g. `"ValueError"`); `message` is the
/// host's message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostError {
    /// Host error class name.
    pub kind: String,

    /// Host error message.
    pub message: String,
}

impl HostError {
    /// Create a new host error.
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

impl Display for HostError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl Error for HostError {}

// ============================================================================
// Error Type
// ============================================================================

/// Error type for boundary operations.
#[derive(Debug, Clone, PartialEq)]
pub enum BindError {
    /// A buffer or temporary could not be allocated.
    AllocationFailure {
        /// Number of bytes requested.
        bytes: usize,
    },

    /// A host value could not be interpreted as the requested native form.
    ConversionError(String),

    /// A value has the wrong kind (read-only output, foreign handle, non-numeric return).
    TypeMismatch(String),

    /// A sequence or array has the wrong length or shape.
    ShapeMismatch(String),

    /// The kernel object matched none of the supported calling conventions.
    UnsupportedCallable(String),

    /// The host callable itself reported an error.
    HostCallableFailure(HostError),

    /// A native callback returned its failure code without a host error.
    CallbackFailed(String),

    /// An argument is outside its accepted domain.
    InvalidArgument(String),

    /// A resource handle was used after it had been released.
    ReleasedResource(&'static str),

    /// The numerical engine reported a failure.
    Engine(String),

    /// A builder parameter was set more than once.
    DuplicateParameter {
        /// Name of the parameter that was set multiple times.
        parameter: &'static str,
    },

    /// A required builder parameter was never set.
    MissingParameter {
        /// Name of the missing parameter.
        parameter: &'static str,
    },
}

/// Result alias used throughout the crate.
pub type BindResult<T> = core::result::Result<T, BindError>;

// ============================================================================
// Display Implementation
// ============================================================================

impl Display for BindError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Self::AllocationFailure { bytes } => {
                write!(f, "Allocation failure: could not allocate {bytes} bytes")
            }
            Self::ConversionError(msg) => write!(f, "Conversion error: {msg}"),
            Self::TypeMismatch(msg) => write!(f, "Type mismatch: {msg}"),
            Self::ShapeMismatch(msg) => write!(f, "Shape mismatch: {msg}"),
            Self::UnsupportedCallable(msg) => write!(f, "Unsupported callable: {msg}"),
            Self::HostCallableFailure(err) => write!(f, "{err}"),
            Self::CallbackFailed(family) => {
                write!(f, "Native {family} callback reported failure")
            }
            Self::InvalidArgument(msg) => write!(f, "Invalid argument: {msg}"),
            Self::ReleasedResource(kind) => {
                write!(f, "Resource '{kind}' was used after it had been released")
            }
            Self::Engine(msg) => write!(f, "{msg}"),
            Self::DuplicateParameter { parameter } => {
                write!(
                    f,
                    "Parameter '{parameter}' was set multiple times. Each parameter can only be configured once."
                )
            }
            Self::MissingParameter { parameter } => {
                write!(f, "Parameter '{parameter}' is required")
            }
        }
    }
}

// ============================================================================
// Standard Error Trait
// ============================================================================

impl Error for BindError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::HostCallableFailure(err) => Some(err),
            _ => None,
        }
    }
}

impl From<HostError> for BindError {
    fn from(err: HostError) -> Self {
        Self::HostCallableFailure(err)
    }
}
