//! Validated array descriptors handed to the engine.
//!
//! ## Purpose
//!
//! An [`ArrayView`] is what the engine sees of an adapted argument: the array
//! it should read or write (the caller's own storage or a conforming
//! temporary), its layout classification, and whether it may be written.
//!
//! ## Design notes
//!
//! * **Snapshot layout**: The layout classification is computed once, when the
//!   view is created. Rank and shape never change afterwards.
//! * **Typed slices**: `with_slice` and `with_slice_mut` hand out `&[T]` only
//!   when the storage really is native, aligned, contiguous and of type `T`.
//! * **Read-only inputs**: Input views reject every write, even when the
//!   underlying host array is writable.
//!
//! ## Invariants
//!
//! * A view over a temporary is always C-contiguous, aligned and native-order.

// External dependencies
use std::fmt::{Debug, Formatter, Result as FmtResult};

// Internal dependencies
use crate::host::array::HostArray;
use crate::primitives::dtype::{DType, Element, Scalar};
use crate::primitives::errors::{BindError, BindResult};

// ============================================================================
// Layout
// ============================================================================

/// Layout classification of a viewed array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// Stored in native byte order.
    pub notswapped: bool,

    /// Every element address is a multiple of the item size.
    pub aligned: bool,

    /// Dense in C order.
    pub c_contiguous: bool,

    /// Writes are permitted through this view.
    pub writeable: bool,
}

impl Layout {
    /// True when elements can be exposed as a native slice.
    pub fn is_conforming(&self) -> bool {
        self.notswapped && self.aligned && self.c_contiguous
    }
}

// ============================================================================
// ArrayView
// ============================================================================

/// Descriptor over the storage the engine reads or writes for one argument.
pub struct ArrayView {
    array: HostArray,
    shape: Vec<usize>,
    strides: Vec<isize>,
    dtype: DType,
    layout: Layout,
}

impl ArrayView {
    pub(crate) fn new(array: HostArray, writeable: bool) -> Self {
        let layout = Layout {
            notswapped: array.is_native_order(),
            aligned: array.is_aligned(),
            c_contiguous: array.is_c_contiguous(),
            writeable,
        };
        Self {
            shape: array.shape(),
            strides: array.strides(),
            dtype: array.dtype(),
            array,
            layout,
        }
    }

    /// Element type.
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Extent of each axis.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Byte stride of each axis.
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    /// Number of axes.
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    /// True when the view holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Layout classification.
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// True when this view may be written.
    pub fn is_writeable(&self) -> bool {
        self.layout.writeable
    }

    /// True when the engine is working directly on `array`'s storage.
    pub fn same_storage(&self, array: &HostArray) -> bool {
        self.array.same_storage(array)
    }

    pub(crate) fn array(&self) -> &HostArray {
        &self.array
    }

    // ========================================================================
    // Element Access
    // ========================================================================

    /// Read one element.
    pub fn get(&self, index: &[usize]) -> BindResult<Scalar> {
        self.array.get(index)
    }

    /// All elements in C order, cast to `f64`.
    pub fn to_f64_vec(&self) -> BindResult<Vec<f64>> {
        self.array.to_f64_vec()
    }

    /// All elements in C order as exact scalars.
    pub fn scalars(&self) -> BindResult<Vec<Scalar>> {
        self.array.scalars()
    }

    /// Write one element, casting to the view's dtype.
    pub fn set(&self, index: &[usize], value: Scalar) -> BindResult<()> {
        self.check_writeable()?;
        if index.len() != self.shape.len() {
            return Err(BindError::ShapeMismatch(format!(
                "index of rank {} used on view of rank {}",
                index.len(),
                self.shape.len()
            )));
        }
        let mut pos = self.array.offset() as isize;
        for ((&i, &n), &s) in index.iter().zip(&self.shape).zip(&self.strides) {
            if i >= n {
                return Err(BindError::ShapeMismatch(format!(
                    "index {i} is out of bounds for axis of size {n}"
                )));
            }
            pos += i as isize * s;
        }
        let mut storage = self.array.storage_mut()?;
        let order = self.array.byte_order();
        self.dtype
            .write(&mut storage.bytes_mut()[pos as usize..], order, value);
        Ok(())
    }

    /// Overwrite every element in C order from `values`.
    pub fn assign_f64(&self, values: &[f64]) -> BindResult<()> {
        self.check_writeable()?;
        if values.len() != self.len() {
            return Err(BindError::ShapeMismatch(format!(
                "{} values cannot fill a view of {} elements",
                values.len(),
                self.len()
            )));
        }
        let mut storage = self.array.storage_mut()?;
        let order = self.array.byte_order();
        for (pos, &value) in self.array.element_offsets().into_iter().zip(values) {
            self.dtype
                .write(&mut storage.bytes_mut()[pos..], order, Scalar::Float(value));
        }
        Ok(())
    }

    /// Run `f` over the elements as a native slice.
    pub fn with_slice<T: Element, R>(&self, f: impl FnOnce(&[T]) -> R) -> BindResult<R> {
        self.check_slice::<T>()?;
        let storage = self.array.storage()?;
        let start = self.array.offset();
        let end = start + self.len() * self.dtype.itemsize();
        let slice = bytemuck::try_cast_slice::<u8, T>(&storage.bytes()[start..end])
            .map_err(|err| BindError::TypeMismatch(format!("cannot view storage as slice: {err}")))?;
        Ok(f(slice))
    }

    /// Run `f` over the elements as a mutable native slice.
    pub fn with_slice_mut<T: Element, R>(&self, f: impl FnOnce(&mut [T]) -> R) -> BindResult<R> {
        self.check_writeable()?;
        self.check_slice::<T>()?;
        let mut storage = self.array.storage_mut()?;
        let start = self.array.offset();
        let end = start + self.len() * self.dtype.itemsize();
        let slice = bytemuck::try_cast_slice_mut::<u8, T>(&mut storage.bytes_mut()[start..end])
            .map_err(|err| BindError::TypeMismatch(format!("cannot view storage as slice: {err}")))?;
        Ok(f(slice))
    }

    fn check_writeable(&self) -> BindResult<()> {
        if self.layout.writeable {
            Ok(())
        } else {
            Err(BindError::TypeMismatch("view is read-only".into()))
        }
    }

    fn check_slice<T: Element>(&self) -> BindResult<()> {
        if self.dtype != T::DTYPE {
            return Err(BindError::TypeMismatch(format!(
                "view holds {}, not {}",
                self.dtype.name(),
                T::DTYPE.name()
            )));
        }
        if !self.layout.is_conforming() {
            return Err(BindError::TypeMismatch(
                "view is not native, aligned and C-contiguous".into(),
            ));
        }
        Ok(())
    }
}

impl Debug for ArrayView {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ArrayView")
            .field("dtype", &self.dtype)
            .field("shape", &self.shape)
            .field("strides", &self.strides)
            .field("layout", &self.layout)
            .finish()
    }
}
