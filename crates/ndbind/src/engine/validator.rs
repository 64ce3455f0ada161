//! Argument validation for boundary operations.
//!
//! ## Purpose
//!
//! This module checks the scalar and shape arguments of a request before
//! the engine runs: axes, origin sequences, filter sizes, spline orders,
//! and builder configuration.
//!
//! ## Design notes
//!
//! * **Fail-Fast**: Validation stops at the first error encountered.
//! * **Normalizing**: Checks that accept a range of spellings (negative
//!   axes, signed sizes) return the canonical value.
//!
//! ## Invariants
//!
//! * Every returned axis is in `0..rank`.
//! * Validation is side-effect free.
//!
//! ## Non-goals
//!
//! * This module does not convert host values (handled by the host layer).
//! * This module does not check array layout (handled by the binding layer).

// Internal dependencies
use crate::binding::view::ArrayView;
use crate::host::sequence::IntSequence;
use crate::primitives::errors::{BindError, BindResult};
use crate::primitives::flags::Requirements;

/// Highest spline order the interpolation engine supports.
pub const MAX_SPLINE_ORDER: i32 = 5;

// ============================================================================
// Validator
// ============================================================================

/// Validation utility for request arguments and builder configuration.
pub struct Validator;

impl Validator {
    // ========================================================================
    // Scalar Arguments
    // ========================================================================

    /// Normalize `axis` against `rank`; negative axes count from the end.
    pub fn validate_axis(axis: isize, rank: usize) -> BindResult<usize> {
        let rank_i = rank as isize;
        let normalized = if axis < 0 { axis + rank_i } else { axis };
        if normalized < 0 || normalized >= rank_i {
            return Err(BindError::InvalidArgument(format!(
                "axis {axis} is out of bounds for array of rank {rank}"
            )));
        }
        Ok(normalized as usize)
    }

    /// Check a 1-D filter size; it must be at least one sample.
    pub fn validate_filter_size(filter_size: isize) -> BindResult<usize> {
        if filter_size < 1 {
            return Err(BindError::InvalidArgument(format!(
                "incorrect filter size {filter_size}"
            )));
        }
        Ok(filter_size as usize)
    }

    /// Check a spline order.
    pub fn validate_spline_order(order: i32) -> BindResult<u32> {
        if !(0..=MAX_SPLINE_ORDER).contains(&order) {
            return Err(BindError::InvalidArgument(format!(
                "spline order {order} not supported"
            )));
        }
        Ok(order as u32)
    }

    /// Clamp a label count; negative counts mean no labels.
    pub fn validate_max_label(max_label: isize) -> usize {
        max_label.max(0) as usize
    }

    // ========================================================================
    // Shapes
    // ========================================================================

    /// Check that `origins` has one entry per axis of `rank`.
    pub fn validate_origins(origins: &IntSequence, rank: usize) -> BindResult<()> {
        if origins.len() != rank {
            return Err(BindError::ShapeMismatch(format!(
                "invalid origin sequence: {} entries for rank {rank}",
                origins.len()
            )));
        }
        Ok(())
    }

    /// Check that a footprint or structuring element has the input's rank.
    pub fn validate_footprint(footprint: &ArrayView, rank: usize, name: &str) -> BindResult<()> {
        if footprint.ndim() != rank {
            return Err(BindError::ShapeMismatch(format!(
                "{name} rank {} does not match input rank {rank}",
                footprint.ndim()
            )));
        }
        Ok(())
    }

    /// Check that `output` has the shape of `input`.
    pub fn validate_same_shape(input: &ArrayView, output: &ArrayView) -> BindResult<()> {
        if input.shape() != output.shape() {
            return Err(BindError::ShapeMismatch(format!(
                "output shape {:?} does not match input shape {:?}",
                output.shape(),
                input.shape()
            )));
        }
        Ok(())
    }

    // ========================================================================
    // Builder Configuration
    // ========================================================================

    /// Check requirement flags for outputs; `ENSURECOPY` is rejected.
    pub fn validate_output_requirements(requirements: Requirements) -> BindResult<()> {
        if requirements.contains(Requirements::ENSURECOPY) {
            return Err(BindError::InvalidArgument(
                "ENSURECOPY is not a valid output requirement".into(),
            ));
        }
        Ok(())
    }

    /// Validate that no builder parameter was set multiple times.
    pub fn validate_no_duplicates(duplicate_param: Option<&'static str>) -> BindResult<()> {
        if let Some(param) = duplicate_param {
            return Err(BindError::DuplicateParameter { parameter: param });
        }
        Ok(())
    }
}
