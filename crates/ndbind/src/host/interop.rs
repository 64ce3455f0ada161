//! Conversions between host arrays and `ndarray`.
//!
//! Available with the `ndarray` feature. Both directions copy; the host array
//! produced is always C-contiguous, aligned and in native byte order.

// External dependencies
use ndarray::{ArrayBase, ArrayD, Data, Dimension, IxDyn};

// Internal dependencies
use crate::host::array::HostArray;
use crate::primitives::dtype::Element;
use crate::primitives::errors::{BindError, BindResult};

impl HostArray {
    /// Copy an `ndarray` array into a new host array.
    pub fn from_ndarray<T, S, D>(array: &ArrayBase<S, D>) -> BindResult<Self>
    where
        T: Element,
        S: Data<Elem = T>,
        D: Dimension,
    {
        let data: Vec<T> = array.iter().copied().collect();
        Self::from_vec(data, array.shape())
    }

    /// Copy this host array into a dynamic-rank `ndarray` array, casting to `T`.
    pub fn to_ndarray<T: Element>(&self) -> BindResult<ArrayD<T>> {
        ArrayD::from_shape_vec(IxDyn(&self.shape()), self.to_vec::<T>()?)
            .map_err(|err| BindError::ShapeMismatch(err.to_string()))
    }
}
