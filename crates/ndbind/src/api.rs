//! High-level API for the boundary layer.
//!
//! ## Purpose
//!
//! This module provides the user-facing entry point: a fluent builder that
//! configures adaptation requirements and attaches a numerical engine,
//! producing a [`Bridge`] whose methods are the boundary operations.
//!
//! ## Design notes
//!
//! * **Ergonomic**: Fluent builder with sensible defaults for all parameters.
//! * **Validated**: Configuration is checked once, in `build()`.
//! * **Engine-generic**: The bridge is generic over any [`Engine`].
//!
//! ## Key concepts
//!
//! * **Requirements**: Flags an array must satisfy to be borrowed in place;
//!   both default to `ALIGNED | NOTSWAPPED`.
//! * **Operations**: Each bridge method adapts its arguments, runs the
//!   engine, and commits or discards the adapted outputs.
//!
//! ### Configuration Flow
//!
//! 1. Create a [`BridgeBuilder`] via `NdBind::new()`.
//! 2. Chain configuration methods (`.input_requirements()`, `.engine()`).
//! 3. Call `.build()` to obtain a [`Bridge`].

// External dependencies
use std::ops::Range;
use tracing::debug;

// Internal dependencies
use crate::engine::executor::RequestFrame;
use crate::engine::validator::Validator;
use crate::primitives::errors::{BindError, BindResult};
use crate::primitives::flags::Requirements;

// Publicly re-exported types
pub use crate::engine::mode::{DistanceMetric, ExtendMode, FourierKernel};
pub use crate::engine::traits::{Engine, EngineError, EngineResult};
pub use crate::host::value::HostValue;
pub use crate::resource::worklist::WorklistHandle;

// ============================================================================
// Results
// ============================================================================

/// Bounding box of one label: a half-open range per axis.
pub type ObjectSlices = Vec<Range<isize>>;

/// Result of a binary erosion pass.
#[derive(Debug, Clone)]
pub struct ErosionOutcome {
    /// Whether any output element differs from its input.
    pub changed: bool,

    /// Worklist of changed coordinates, when requested.
    pub worklist: Option<WorklistHandle>,
}

// ============================================================================
// Builder
// ============================================================================

/// Fluent builder for configuring a [`Bridge`].
#[derive(Debug, Clone)]
pub struct BridgeBuilder<E> {
    /// Flags an input must satisfy to be borrowed.
    pub input_requirements: Option<Requirements>,

    /// Flags an output must satisfy to be borrowed.
    pub output_requirements: Option<Requirements>,

    /// Numerical engine.
    pub engine: Option<E>,

    /// Tracks if any parameter was set multiple times (for validation).
    #[doc(hidden)]
    pub duplicate_param: Option<&'static str>,
}

impl<E: Engine> Default for BridgeBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Engine> BridgeBuilder<E> {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            input_requirements: None,
            output_requirements: None,
            engine: None,
            duplicate_param: None,
        }
    }

    /// Set the flags an input must satisfy to be borrowed in place.
    pub fn input_requirements(mut self, requirements: Requirements) -> Self {
        if self.input_requirements.is_some() {
            self.duplicate_param = Some("input_requirements");
        }
        self.input_requirements = Some(requirements);
        self
    }

    /// Set the flags an output must satisfy to be borrowed in place.
    pub fn output_requirements(mut self, requirements: Requirements) -> Self {
        if self.output_requirements.is_some() {
            self.duplicate_param = Some("output_requirements");
        }
        self.output_requirements = Some(requirements);
        self
    }

    /// Attach the numerical engine.
    pub fn engine(mut self, engine: E) -> Self {
        if self.engine.is_some() {
            self.duplicate_param = Some("engine");
        }
        self.engine = Some(engine);
        self
    }

    /// Validate the configuration and build the bridge.
    pub fn build(self) -> BindResult<Bridge<E>> {
        Validator::validate_no_duplicates(self.duplicate_param)?;

        let input_requirements = self.input_requirements.unwrap_or(Requirements::DEFAULT);
        let output_requirements = self.output_requirements.unwrap_or(Requirements::DEFAULT);
        Validator::validate_output_requirements(output_requirements)?;

        let engine = self
            .engine
            .ok_or(BindError::MissingParameter { parameter: "engine" })?;

        debug!(?input_requirements, ?output_requirements, "bridge built");
        Ok(Bridge {
            engine,
            input_requirements,
            output_requirements,
        })
    }
}

// ============================================================================
// Bridge
// ============================================================================

/// Configured boundary between host values and an [`Engine`].
///
/// The operation methods are grouped by kind: filters, Fourier,
/// interpolation, measurements, distance transforms, and morphology.
#[derive(Debug)]
pub struct Bridge<E> {
    pub(crate) engine: E,
    input_requirements: Requirements,
    output_requirements: Requirements,
}

impl<E: Engine> Bridge<E> {
    /// The engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The engine, mutably.
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Consume the bridge and return its engine.
    pub fn into_engine(self) -> E {
        self.engine
    }

    /// Flags an input must satisfy to be borrowed.
    pub fn input_requirements(&self) -> Requirements {
        self.input_requirements
    }

    /// Flags an output must satisfy to be borrowed.
    pub fn output_requirements(&self) -> Requirements {
        self.output_requirements
    }

    pub(crate) fn frame(&self, operation: &'static str) -> RequestFrame {
        RequestFrame::new(operation, self.input_requirements, self.output_requirements)
    }
}
