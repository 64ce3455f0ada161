//! Integer sequence materialization.
//!
//! ## Purpose
//!
//! This module turns host integer collections (origins, filter sizes, axes,
//! label counts) into an owned buffer of native-width integers.
//!
//! ## Design notes
//!
//! * **Drained eagerly**: The whole source is read before the sequence is
//!   returned, so later host mutation cannot affect the engine's view.
//! * **Strict**: Strings, nested sequences, floats with a fractional part and
//!   non-integer arrays are conversion errors, not truncated.
//! * **Fallible allocation**: The buffer is reserved with `try_reserve`.
//!
//! ## Key concepts
//!
//! * **Scalar promotion**: A lone integer is a sequence of length one.
//!
//! ## Invariants
//!
//! * The materialized length equals the source length and order is preserved.

// External dependencies
use core::ops::Deref;
use num_traits::cast;

// Internal dependencies
use crate::host::array::HostArray;
use crate::host::value::HostValue;
use crate::primitives::buffer::try_with_capacity;
use crate::primitives::dtype::Scalar;
use crate::primitives::errors::{BindError, BindResult};

/// An owned, fixed-length sequence of native integers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IntSequence {
    values: Vec<isize>,
}

impl IntSequence {
    /// Materialize a host integer collection.
    pub fn materialize(value: &HostValue) -> BindResult<Self> {
        match value {
            HostValue::Tuple(items) | HostValue::List(items) => {
                let mut values = try_with_capacity(items.len())?;
                for item in items {
                    values.push(item_to_index(item)?);
                }
                Ok(Self { values })
            }
            HostValue::Array(array) => Self::from_array(array),
            HostValue::Int(_) | HostValue::Bool(_) => Ok(Self {
                values: vec![item_to_index(value)?],
            }),
            other => Err(BindError::ConversionError(format!(
                "expected a sequence of integers, got {}",
                other.type_name()
            ))),
        }
    }

    fn from_array(array: &HostArray) -> BindResult<Self> {
        let dtype = array.dtype();
        if dtype.is_float() {
            return Err(BindError::ConversionError(format!(
                "cannot convert {} array to a sequence of integers",
                dtype.name()
            )));
        }
        if array.ndim() > 1 {
            return Err(BindError::ConversionError(format!(
                "expected a one-dimensional integer array, got rank {}",
                array.ndim()
            )));
        }
        let scalars = array.scalars()?;
        let mut values = try_with_capacity(scalars.len())?;
        for scalar in scalars {
            values.push(scalar_to_index(scalar)?);
        }
        Ok(Self { values })
    }

    /// Sequence with the given contents.
    pub fn from_slice(values: &[isize]) -> Self {
        Self {
            values: values.to_vec(),
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the sequence holds no elements.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Borrow the elements.
    pub fn as_slice(&self) -> &[isize] {
        &self.values
    }

    /// Take ownership of the elements.
    pub fn into_vec(self) -> Vec<isize> {
        self.values
    }
}

impl Deref for IntSequence {
    type Target = [isize];

    fn deref(&self) -> &[isize] {
        &self.values
    }
}

// ============================================================================
// Element Conversion
// ============================================================================

fn item_to_index(item: &HostValue) -> BindResult<isize> {
    match item {
        HostValue::Bool(b) => Ok(isize::from(*b)),
        HostValue::Int(i) => narrow(*i),
        HostValue::Float(x) => scalar_to_index(Scalar::Float(*x)),
        HostValue::Array(array) if array.ndim() == 0 && !array.dtype().is_float() => {
            let scalar = array.scalars()?[0];
            scalar_to_index(scalar)
        }
        other => Err(BindError::ConversionError(format!(
            "sequence item of type {} is not an integer",
            other.type_name()
        ))),
    }
}

fn scalar_to_index(scalar: Scalar) -> BindResult<isize> {
    match scalar {
        Scalar::Bool(b) => Ok(isize::from(b)),
        Scalar::Int(i) => narrow(i),
        Scalar::UInt(u) => narrow(u),
        Scalar::Float(x) if x.fract() == 0.0 => narrow(x),
        Scalar::Float(x) => Err(BindError::ConversionError(format!(
            "{x} is not an integer"
        ))),
    }
}

fn narrow<N: num_traits::NumCast + Copy + core::fmt::Display>(value: N) -> BindResult<isize> {
    cast::<N, isize>(value).ok_or_else(|| {
        BindError::ConversionError(format!("{value} does not fit in a native integer"))
    })
}
