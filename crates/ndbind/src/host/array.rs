//! Host-owned n-dimensional arrays.
//!
//! ## Purpose
//!
//! This module models the array objects a host runtime hands across the
//! boundary: typed, strided, possibly byte-swapped or misaligned storage that
//! may be shared between several host references and may be read-only.
//!
//! ## Design notes
//!
//! * **Shared ownership**: A `HostArray` is an `Rc`; cloning it creates
//!   another reference to the same object, as host references do.
//! * **Split borrows**: Dtype, shape and strides sit outside the `RefCell` that
//!   guards the bytes, so a host callback can inspect an array the engine is
//!   writing. Element reads and writes report a conflicting borrow as an error.
//! * **Word-backed storage**: Bytes live in a `Vec<u64>`, so the storage base is
//!   always 8-byte aligned and the computed `ALIGNED` flag reflects the real
//!   address of every element.
//! * **Explicit layouts**: Constructors always produce C-contiguous, aligned,
//!   native-order storage; dedicated modifiers produce the other layouts.
//!
//! ## Key concepts
//!
//! * **Byte strides**: Element `(i0, .., in)` lives at `offset + Σ ik * strides[k]`.
//! * **Identity**: Two arrays are the same object when they share storage.
//! * **Writability**: A read-only array rejects every host-side write.
//!
//! ## Invariants
//!
//! * `shape.len() == strides.len()` and every addressed byte lies inside storage.
//! * Shape and dtype never change after construction.
//!
//! ## Non-goals
//!
//! * Views that share storage with a differently-shaped header.
//! * Broadcasting and slicing.

// External dependencies
use std::cell::{Cell, Ref, RefCell, RefMut};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::rc::Rc;

// Internal dependencies
use crate::host::value::HostValue;
use crate::primitives::buffer::try_zeroed;
use crate::primitives::dtype::{ByteOrder, DType, Element, Scalar};
use crate::primitives::errors::{BindError, BindResult};

// ============================================================================
// Storage
// ============================================================================

/// Fixed description of one host array object.
struct ArrayHeader {
    dtype: DType,
    order: ByteOrder,
    shape: Vec<usize>,
    strides: Vec<isize>,
    offset: usize,
}

impl ArrayHeader {
    fn contiguous(dtype: DType, shape: Vec<usize>) -> Self {
        let strides = c_strides(&shape, dtype.itemsize());
        Self {
            dtype,
            order: ByteOrder::Native,
            shape,
            strides,
            offset: 0,
        }
    }

    fn size(&self) -> usize {
        self.shape.iter().product()
    }

    fn is_aligned(&self) -> bool {
        let item = self.dtype.itemsize() as isize;
        self.offset as isize % item == 0
            && self
                .strides
                .iter()
                .zip(&self.shape)
                .all(|(&s, &n)| n <= 1 || s % item == 0)
    }

    fn is_c_contiguous(&self) -> bool {
        if self.size() == 0 {
            return true;
        }
        let mut expected = self.dtype.itemsize() as isize;
        for (&n, &s) in self.shape.iter().zip(&self.strides).rev() {
            if n > 1 && s != expected {
                return false;
            }
            expected *= n as isize;
        }
        true
    }
}

/// The bytes behind one host array object.
pub(crate) struct Storage {
    words: Vec<u64>,
    nbytes: usize,
}

impl Storage {
    fn zeroed(nbytes: usize) -> BindResult<Self> {
        Ok(Self {
            words: try_zeroed::<u64>(nbytes.div_ceil(8))?,
            nbytes,
        })
    }

    #[inline]
    pub(crate) fn bytes(&self) -> &[u8] {
        &bytemuck::cast_slice::<u64, u8>(&self.words)[..self.nbytes]
    }

    #[inline]
    pub(crate) fn bytes_mut(&mut self) -> &mut [u8] {
        let n = self.nbytes;
        &mut bytemuck::cast_slice_mut::<u64, u8>(&mut self.words)[..n]
    }
}

struct ArrayObject {
    header: ArrayHeader,
    writeable: Cell<bool>,
    storage: RefCell<Storage>,
}

// ============================================================================
// HostArray
// ============================================================================

/// A reference to a host array object.
#[derive(Clone)]
pub struct HostArray(Rc<ArrayObject>);

impl HostArray {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create a C-contiguous array from typed data.
    pub fn from_vec<T: Element>(data: Vec<T>, shape: &[usize]) -> BindResult<Self> {
        check_len(data.len(), shape)?;
        let mut storage = Storage::zeroed(data.len() * T::DTYPE.itemsize())?;
        storage.bytes_mut().copy_from_slice(bytemuck::cast_slice(&data));
        Ok(Self::build(ArrayHeader::contiguous(T::DTYPE, shape.to_vec()), storage))
    }

    /// Create a one-dimensional `Float64` array.
    pub fn from_f64(data: &[f64]) -> Self {
        let words: Vec<u64> = data.iter().map(|v| v.to_bits()).collect();
        let storage = Storage {
            words,
            nbytes: data.len() * 8,
        };
        Self::build(ArrayHeader::contiguous(DType::Float64, vec![data.len()]), storage)
    }

    /// Create a C-contiguous `Bool` array.
    pub fn from_bools(data: &[bool], shape: &[usize]) -> BindResult<Self> {
        check_len(data.len(), shape)?;
        let mut storage = Storage::zeroed(data.len())?;
        for (byte, &b) in storage.bytes_mut().iter_mut().zip(data) {
            *byte = u8::from(b);
        }
        Ok(Self::build(ArrayHeader::contiguous(DType::Bool, shape.to_vec()), storage))
    }

    /// Create a zero-filled, C-contiguous, aligned, native-order array.
    pub fn try_zeros(dtype: DType, shape: &[usize]) -> BindResult<Self> {
        let nbytes = shape
            .iter()
            .try_fold(1usize, |acc, &n| acc.checked_mul(n))
            .and_then(|n| n.checked_mul(dtype.itemsize()))
            .ok_or(BindError::AllocationFailure { bytes: usize::MAX })?;
        let storage = Storage::zeroed(nbytes)?;
        Ok(Self::build(ArrayHeader::contiguous(dtype, shape.to_vec()), storage))
    }

    /// Create a zero-dimensional array holding one value.
    pub fn scalar(value: Scalar) -> Self {
        let dtype = DType::of_scalar(value);
        let mut storage = Storage {
            words: vec![0u64],
            nbytes: dtype.itemsize(),
        };
        dtype.write(storage.bytes_mut(), ByteOrder::Native, value);
        Self::build(ArrayHeader::contiguous(dtype, Vec::new()), storage)
    }

    fn build(header: ArrayHeader, storage: Storage) -> Self {
        Self(Rc::new(ArrayObject {
            header,
            writeable: Cell::new(true),
            storage: RefCell::new(storage),
        }))
    }

    /// Convert a host value (array, scalar or nested sequence) into an array.
    ///
    /// Arrays are returned as the same object. Scalars become zero-dimensional
    /// arrays; nested sequences must be rectangular and numeric.
    pub fn from_host_value(value: &HostValue) -> BindResult<Self> {
        match value {
            HostValue::Array(array) => Ok(array.clone()),
            HostValue::Tuple(_) | HostValue::List(_) => {
                let mut shape = Vec::new();
                let mut scalars = Vec::new();
                flatten_nested(value, 0, &mut shape, &mut scalars)?;
                let dtype = scalars
                    .iter()
                    .map(|&s| DType::of_scalar(s))
                    .reduce(DType::promote)
                    .unwrap_or(DType::Float64);
                let storage = packed(dtype, &scalars)?;
                Ok(Self::build(ArrayHeader::contiguous(dtype, shape), storage))
            }
            other => other
                .as_scalar()
                .map(Self::scalar)
                .ok_or_else(|| {
                    BindError::ConversionError(format!(
                        "cannot convert {} to an array",
                        other.type_name()
                    ))
                }),
        }
    }

    // ========================================================================
    // Layout Modifiers
    // ========================================================================

    /// A copy with the same values stored in swapped byte order.
    pub fn byteswapped(&self) -> BindResult<Self> {
        let dtype = self.dtype();
        let mut storage = packed(dtype, &self.scalars()?)?;
        for chunk in storage.bytes_mut().chunks_exact_mut(dtype.itemsize()) {
            chunk.reverse();
        }
        let header = ArrayHeader {
            order: ByteOrder::Swapped,
            ..ArrayHeader::contiguous(dtype, self.shape())
        };
        Ok(Self::build(header, storage))
    }

    /// A copy with the same values whose first element sits one byte off alignment.
    pub fn misaligned(&self) -> BindResult<Self> {
        let dtype = self.dtype();
        let source = packed(dtype, &self.scalars()?)?;
        let mut storage = Storage::zeroed(source.nbytes + 1)?;
        storage.bytes_mut()[1..].copy_from_slice(source.bytes());
        let header = ArrayHeader {
            offset: 1,
            ..ArrayHeader::contiguous(dtype, self.shape())
        };
        Ok(Self::build(header, storage))
    }

    /// A copy with the same values stored in Fortran (column-major) order.
    pub fn fortran_ordered(&self) -> BindResult<Self> {
        let values = self.scalars()?;
        let (dtype, shape) = (self.dtype(), self.shape());
        let mut strides = vec![0isize; shape.len()];
        let mut acc = dtype.itemsize() as isize;
        for (stride, &n) in strides.iter_mut().zip(&shape) {
            *stride = acc;
            acc *= n.max(1) as isize;
        }
        let header = ArrayHeader {
            strides,
            ..ArrayHeader::contiguous(dtype, shape)
        };
        let mut storage = Storage::zeroed(values.len() * dtype.itemsize())?;
        let offsets = c_order_offsets(&header.shape, &header.strides, 0);
        for (pos, value) in offsets.into_iter().zip(values) {
            dtype.write(&mut storage.bytes_mut()[pos..], ByteOrder::Native, value);
        }
        Ok(Self::build(header, storage))
    }

    /// This array with writes disabled.
    pub fn read_only(self) -> Self {
        self.set_writeable(false);
        self
    }

    // ========================================================================
    // Properties
    // ========================================================================

    /// Element type.
    pub fn dtype(&self) -> DType {
        self.0.header.dtype
    }

    /// Stored byte order.
    pub fn byte_order(&self) -> ByteOrder {
        self.0.header.order
    }

    /// Extent of each axis.
    pub fn shape(&self) -> Vec<usize> {
        self.0.header.shape.clone()
    }

    /// Byte stride of each axis.
    pub fn strides(&self) -> Vec<isize> {
        self.0.header.strides.clone()
    }

    /// Number of axes.
    pub fn ndim(&self) -> usize {
        self.0.header.shape.len()
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.0.header.size()
    }

    /// True when the array holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when host-side writes are permitted.
    pub fn is_writeable(&self) -> bool {
        self.0.writeable.get()
    }

    /// True when every element address is a multiple of the item size.
    pub fn is_aligned(&self) -> bool {
        self.0.header.is_aligned()
    }

    /// True when elements are dense in C order.
    pub fn is_c_contiguous(&self) -> bool {
        self.0.header.is_c_contiguous()
    }

    /// True when stored in native byte order.
    pub fn is_native_order(&self) -> bool {
        self.0.header.order == ByteOrder::Native
    }

    /// True when both references denote the same array object.
    pub fn same_storage(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Number of live references to this array object.
    pub fn reference_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    pub(crate) fn set_writeable(&self, writeable: bool) {
        self.0.writeable.set(writeable);
    }

    pub(crate) fn offset(&self) -> usize {
        self.0.header.offset
    }

    /// Byte offsets of every element, in C order.
    pub(crate) fn element_offsets(&self) -> Vec<usize> {
        let header = &self.0.header;
        c_order_offsets(&header.shape, &header.strides, header.offset)
    }

    // ========================================================================
    // Element Access
    // ========================================================================
    //
    // Element access borrows the storage and fails with `TypeMismatch` while
    // the engine holds a conflicting borrow of the same array.

    /// Read one element.
    pub fn get(&self, index: &[usize]) -> BindResult<Scalar> {
        let pos = element_position(&self.0.header, index)?;
        let storage = self.storage()?;
        let header = &self.0.header;
        Ok(header.dtype.read(&storage.bytes()[pos..], header.order))
    }

    /// Write one element, casting to the array's dtype.
    pub fn set(&self, index: &[usize], value: Scalar) -> BindResult<()> {
        if !self.is_writeable() {
            return Err(BindError::TypeMismatch(
                "assignment destination is read-only".into(),
            ));
        }
        let pos = element_position(&self.0.header, index)?;
        let mut storage = self.storage_mut()?;
        let header = &self.0.header;
        header.dtype.write(&mut storage.bytes_mut()[pos..], header.order, value);
        Ok(())
    }

    /// All elements in C order, cast to `T`.
    pub fn to_vec<T: Element>(&self) -> BindResult<Vec<T>> {
        Ok(self.scalars()?.into_iter().map(T::from_scalar).collect())
    }

    /// All elements in C order, cast to `f64`.
    pub fn to_f64_vec(&self) -> BindResult<Vec<f64>> {
        Ok(self.scalars()?.into_iter().map(Scalar::to_f64).collect())
    }

    /// All elements in C order as exact scalars.
    pub fn scalars(&self) -> BindResult<Vec<Scalar>> {
        let storage = self.storage()?;
        let bytes = storage.bytes();
        let header = &self.0.header;
        Ok(self
            .element_offsets()
            .into_iter()
            .map(|pos| header.dtype.read(&bytes[pos..], header.order))
            .collect())
    }

    /// Stored bytes of every element, in C order, exactly as held in memory.
    pub fn raw_bytes(&self) -> BindResult<Vec<u8>> {
        let storage = self.storage()?;
        let bytes = storage.bytes();
        let item = self.dtype().itemsize();
        let mut out = Vec::with_capacity(self.len() * item);
        for pos in self.element_offsets() {
            out.extend_from_slice(&bytes[pos..pos + item]);
        }
        Ok(out)
    }

    // ========================================================================
    // Copies
    // ========================================================================

    /// A new C-contiguous, aligned, native-order copy cast to `dtype`.
    pub fn copy_as(&self, dtype: DType) -> BindResult<Self> {
        let storage = packed(dtype, &self.scalars()?)?;
        Ok(Self::build(ArrayHeader::contiguous(dtype, self.shape()), storage))
    }

    /// Copy every element of `source` into this array, casting as needed.
    ///
    /// Ignores the writability flag; callers decide whether the write is allowed.
    pub(crate) fn copy_from(&self, source: &Self) -> BindResult<()> {
        if self.same_storage(source) {
            return Ok(());
        }
        let header = &self.0.header;
        if header.shape != source.0.header.shape {
            return Err(BindError::ShapeMismatch(format!(
                "cannot copy array of shape {:?} into shape {:?}",
                source.0.header.shape, header.shape
            )));
        }
        let values = source.scalars()?;
        let mut storage = self.storage_mut()?;
        for (pos, value) in self.element_offsets().into_iter().zip(values) {
            header.dtype.write(&mut storage.bytes_mut()[pos..], header.order, value);
        }
        Ok(())
    }

    pub(crate) fn storage(&self) -> BindResult<Ref<'_, Storage>> {
        self.0
            .storage
            .try_borrow()
            .map_err(|_| BindError::TypeMismatch("array storage is being written".into()))
    }

    pub(crate) fn storage_mut(&self) -> BindResult<RefMut<'_, Storage>> {
        self.0
            .storage
            .try_borrow_mut()
            .map_err(|_| BindError::TypeMismatch("array storage is already borrowed".into()))
    }
}

impl Debug for HostArray {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let header = &self.0.header;
        f.debug_struct("HostArray")
            .field("dtype", &header.dtype)
            .field("order", &header.order)
            .field("shape", &header.shape)
            .field("strides", &header.strides)
            .field("offset", &header.offset)
            .field("writeable", &self.0.writeable.get())
            .finish()
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Byte strides of a C-contiguous array.
pub(crate) fn c_strides(shape: &[usize], itemsize: usize) -> Vec<isize> {
    let mut strides = vec![0isize; shape.len()];
    let mut acc = itemsize as isize;
    for (stride, &n) in strides.iter_mut().zip(shape).rev() {
        *stride = acc;
        acc *= n.max(1) as isize;
    }
    strides
}

/// Byte offsets of every element in C order.
pub(crate) fn c_order_offsets(shape: &[usize], strides: &[isize], offset: usize) -> Vec<usize> {
    let size: usize = shape.iter().product();
    let mut out = Vec::with_capacity(size);
    if size == 0 {
        return out;
    }
    let mut index = vec![0usize; shape.len()];
    let mut pos = offset as isize;
    for _ in 0..size {
        out.push(pos as usize);
        // Odometer step: advance the last axis, carry into earlier ones.
        for axis in (0..shape.len()).rev() {
            index[axis] += 1;
            pos += strides[axis];
            if index[axis] < shape[axis] {
                break;
            }
            pos -= strides[axis] * shape[axis] as isize;
            index[axis] = 0;
        }
    }
    out
}

fn check_len(len: usize, shape: &[usize]) -> BindResult<()> {
    let expected: usize = shape.iter().product();
    if len != expected {
        return Err(BindError::ShapeMismatch(format!(
            "{len} elements cannot fill shape {shape:?}"
        )));
    }
    Ok(())
}

fn element_position(header: &ArrayHeader, index: &[usize]) -> BindResult<usize> {
    if index.len() != header.shape.len() {
        return Err(BindError::ShapeMismatch(format!(
            "index of rank {} used on array of rank {}",
            index.len(),
            header.shape.len()
        )));
    }
    let mut pos = header.offset as isize;
    for ((&i, &n), &s) in index.iter().zip(&header.shape).zip(&header.strides) {
        if i >= n {
            return Err(BindError::ShapeMismatch(format!(
                "index {i} is out of bounds for axis of size {n}"
            )));
        }
        pos += i as isize * s;
    }
    Ok(pos as usize)
}

fn flatten_nested(
    value: &HostValue,
    depth: usize,
    shape: &mut Vec<usize>,
    out: &mut Vec<Scalar>,
) -> BindResult<()> {
    match value.as_sequence() {
        Some(items) => {
            if depth == shape.len() {
                if !out.is_empty() {
                    return Err(ragged());
                }
                shape.push(items.len());
            } else if shape[depth] != items.len() {
                return Err(ragged());
            }
            for item in items {
                flatten_nested(item, depth + 1, shape, out)?;
            }
            Ok(())
        }
        None => {
            if depth != shape.len() {
                return Err(ragged());
            }
            let scalar = value.as_scalar().ok_or_else(|| {
                BindError::ConversionError(format!(
                    "cannot convert {} to a number",
                    value.type_name()
                ))
            })?;
            out.push(scalar);
            Ok(())
        }
    }
}

/// Native-order, C-contiguous bytes holding `values` cast to `dtype`.
fn packed(dtype: DType, values: &[Scalar]) -> BindResult<Storage> {
    let item = dtype.itemsize();
    let mut storage = Storage::zeroed(values.len() * item)?;
    for (chunk, &value) in storage.bytes_mut().chunks_exact_mut(item).zip(values) {
        dtype.write(chunk, ByteOrder::Native, value);
    }
    Ok(storage)
}

fn ragged() -> BindError {
    BindError::ConversionError("nested sequence is not rectangular".into())
}
