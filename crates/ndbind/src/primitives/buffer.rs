//! Fallible allocation.
//!
//! ## Purpose
//!
//! This module provides the allocation helpers used wherever the crate creates
//! a temporary or materializes a host collection.
//!
//! ## Design notes
//!
//! * **Fallible**: Buffers are reserved with `try_reserve_exact` so an oversized
//!   request surfaces as `AllocationFailure` instead of aborting the process.
//! * **Exact**: Capacity is reserved for exactly the requested element count.

// External dependencies
use num_traits::Zero;

// Internal dependencies
use crate::primitives::errors::{BindError, BindResult};

// ============================================================================
// Fallible Allocation
// ============================================================================

/// Allocate `n` zeroed elements, reporting failure instead of aborting.
pub fn try_zeroed<T: Zero + Clone>(n: usize) -> BindResult<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(n)
        .map_err(|_| BindError::AllocationFailure {
            bytes: n.saturating_mul(core::mem::size_of::<T>()),
        })?;
    v.resize(n, T::zero());
    Ok(v)
}

/// Allocate room for `n` elements without initializing them.
pub fn try_with_capacity<T>(n: usize) -> BindResult<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(n)
        .map_err(|_| BindError::AllocationFailure {
            bytes: n.saturating_mul(core::mem::size_of::<T>()),
        })?;
    Ok(v)
}
