//! Array adaptation: borrow in place or stage through a temporary.
//!
//! ## Purpose
//!
//! This module decides, for each array argument of a request, whether the
//! engine can work on the caller's storage directly or needs a conforming
//! temporary, and it owns the write-back of temporaries into the caller's
//! storage.
//!
//! ## Design notes
//!
//! * **Fast path first**: An argument that already satisfies the requested
//!   type and flags is borrowed; no byte is copied.
//! * **Explicit release**: A binding ends with `commit` (write back) or
//!   `discard` (leave the original untouched). Dropping a binding that was
//!   never released discards it.
//! * **Revoked writability**: While an output temporary is bound, the
//!   original is read-only to the host. Both release paths restore it.
//!
//! ## Key concepts
//!
//! * **Borrowed**: The view is the caller's own array.
//! * **OwnedTemporaryInput**: A converted copy; never written back.
//! * **OwnedTemporaryOutput**: A fresh or pre-filled temporary with a
//!   back-reference to the caller's array.
//!
//! ## Invariants
//!
//! * A binding is released at most once.
//! * The original of an output temporary is written only by `commit`.
//! * `adapt_output` and `adapt_inout` reject non-writable arrays before allocating.

// External dependencies
use tracing::debug;

// Internal dependencies
use crate::binding::view::ArrayView;
use crate::host::array::HostArray;
use crate::host::value::HostValue;
use crate::primitives::dtype::DType;
use crate::primitives::errors::{BindError, BindResult};
use crate::primitives::flags::Requirements;

// ============================================================================
// Requirement Check
// ============================================================================

/// True when `array` can be used as-is under `requirements` and `dtype`.
///
/// `ENSURECOPY` is never satisfied by an existing buffer.
pub fn satisfies(array: &HostArray, requirements: Requirements, dtype: Option<DType>) -> bool {
    if requirements.contains(Requirements::ENSURECOPY) {
        return false;
    }
    if dtype.is_some_and(|d| d != array.dtype()) {
        return false;
    }
    (!requirements.contains(Requirements::NOTSWAPPED) || array.is_native_order())
        && (!requirements.contains(Requirements::ALIGNED) || array.is_aligned())
        && (!requirements.contains(Requirements::C_CONTIGUOUS) || array.is_c_contiguous())
        && (!requirements.contains(Requirements::WRITEABLE) || array.is_writeable())
}

// ============================================================================
// Ownership
// ============================================================================

/// How an output temporary relates to its original.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteBack {
    /// Temporary starts zeroed; the engine writes it.
    Output,

    /// Temporary starts as a copy of the original.
    InOut,
}

/// Who owns the storage behind a binding's view.
#[derive(Debug)]
pub enum Ownership {
    /// The view is the caller's own array.
    Borrowed,

    /// The view is a converted copy of an input.
    OwnedTemporaryInput,

    /// The view is a temporary that is copied back into `original` on commit.
    OwnedTemporaryOutput {
        /// The caller's array.
        original: HostArray,

        /// Whether the temporary was pre-filled from the original.
        mode: WriteBack,
    },
}

// ============================================================================
// ArrayBinding
// ============================================================================

/// An adapted array argument and the obligation to release it.
#[derive(Debug)]
pub struct ArrayBinding {
    view: ArrayView,
    ownership: Ownership,
    released: bool,
}

impl ArrayBinding {
    /// Adapt an input argument.
    ///
    /// Host arrays that satisfy `requirements` are borrowed. Anything else
    /// convertible (arrays of another layout or type, nested numeric
    /// sequences, scalars) is copied into a conforming temporary.
    pub fn adapt_input(
        arg: &HostValue,
        dtype: Option<DType>,
        requirements: Requirements,
    ) -> BindResult<Self> {
        if let HostValue::Array(array) = arg {
            if satisfies(array, requirements, dtype) {
                debug!(shape = ?array.shape(), "input borrowed");
                return Ok(Self::borrowed(array.clone(), false));
            }
        }

        let converted = HostArray::from_host_value(arg)?;
        let target = dtype.unwrap_or_else(|| converted.dtype());
        let fresh = !matches!(arg, HostValue::Array(_));
        let temporary = if fresh && satisfies(&converted, requirements, Some(target)) {
            converted
        } else {
            converted.copy_as(target)?
        };
        debug!(
            shape = ?temporary.shape(),
            dtype = temporary.dtype().name(),
            "input staged through temporary"
        );
        Ok(Self {
            view: ArrayView::new(temporary, false),
            ownership: Ownership::OwnedTemporaryInput,
            released: false,
        })
    }

    /// Adapt an output argument.
    ///
    /// The argument must be a writable host array. When it does not satisfy
    /// `requirements`, a zeroed temporary of the same shape is bound and the
    /// original is made read-only until release.
    pub fn adapt_output(
        arg: &HostValue,
        dtype: Option<DType>,
        requirements: Requirements,
    ) -> BindResult<Self> {
        let array = writable_array(arg, "only writeable arrays work for output")?;
        if satisfies(array, requirements, dtype) {
            debug!(shape = ?array.shape(), "output borrowed");
            return Ok(Self::borrowed(array.clone(), true));
        }

        let target = dtype.unwrap_or_else(|| array.dtype());
        let temporary = HostArray::try_zeros(target, &array.shape())?;
        Ok(Self::staged_output(array, temporary, WriteBack::Output))
    }

    /// Adapt an argument that is both read and written.
    ///
    /// As [`adapt_output`](Self::adapt_output), but a temporary starts as a
    /// copy of the original's contents.
    pub fn adapt_inout(
        arg: &HostValue,
        dtype: Option<DType>,
        requirements: Requirements,
    ) -> BindResult<Self> {
        let array = writable_array(arg, "I/O array must be writable array")?;
        if satisfies(array, requirements, dtype) {
            debug!(shape = ?array.shape(), "in-out array borrowed");
            return Ok(Self::borrowed(array.clone(), true));
        }

        let target = dtype.unwrap_or_else(|| array.dtype());
        let temporary = array.copy_as(target)?;
        Ok(Self::staged_output(array, temporary, WriteBack::InOut))
    }

    /// Adapt an optional input; the host null value is absent.
    pub fn adapt_optional_input(
        arg: &HostValue,
        dtype: Option<DType>,
        requirements: Requirements,
    ) -> BindResult<Option<Self>> {
        if arg.is_none() {
            return Ok(None);
        }
        Self::adapt_input(arg, dtype, requirements).map(Some)
    }

    /// Adapt an optional output; the host null value is absent.
    pub fn adapt_optional_output(
        arg: &HostValue,
        dtype: Option<DType>,
        requirements: Requirements,
    ) -> BindResult<Option<Self>> {
        if arg.is_none() {
            return Ok(None);
        }
        Self::adapt_output(arg, dtype, requirements).map(Some)
    }

    fn borrowed(array: HostArray, writeable: bool) -> Self {
        Self {
            view: ArrayView::new(array, writeable),
            ownership: Ownership::Borrowed,
            released: false,
        }
    }

    fn staged_output(original: &HostArray, temporary: HostArray, mode: WriteBack) -> Self {
        original.set_writeable(false);
        debug!(
            shape = ?original.shape(),
            dtype = temporary.dtype().name(),
            ?mode,
            "output staged through temporary"
        );
        Self {
            view: ArrayView::new(temporary, true),
            ownership: Ownership::OwnedTemporaryOutput {
                original: original.clone(),
                mode,
            },
            released: false,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The descriptor the engine works on.
    pub fn view(&self) -> &ArrayView {
        &self.view
    }

    /// Ownership of the viewed storage.
    pub fn ownership(&self) -> &Ownership {
        &self.ownership
    }

    /// True when the view is a temporary rather than the caller's array.
    pub fn is_temporary(&self) -> bool {
        !matches!(self.ownership, Ownership::Borrowed)
    }

    /// The caller's array an output temporary writes back into.
    pub fn original(&self) -> Option<&HostArray> {
        match &self.ownership {
            Ownership::OwnedTemporaryOutput { original, .. } => Some(original),
            _ => None,
        }
    }

    /// True when `array` is the storage this binding reads or writes back into.
    pub fn refers_to(&self, array: &HostArray) -> bool {
        self.view.same_storage(array) || self.original().is_some_and(|o| o.same_storage(array))
    }

    // ========================================================================
    // Release
    // ========================================================================

    /// Release after success: copy a temporary back into its original.
    pub fn commit(mut self) -> BindResult<()> {
        self.release(true)
    }

    /// Release after failure: the original is left untouched.
    pub fn discard(mut self) {
        // Discarding never copies, so it cannot fail.
        let _ = self.release(false);
    }

    fn release(&mut self, write_back: bool) -> BindResult<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        if let Ownership::OwnedTemporaryOutput { original, mode } = &self.ownership {
            original.set_writeable(true);
            if write_back {
                original.copy_from(self.view.array())?;
                debug!(shape = ?original.shape(), ?mode, "temporary committed");
            } else {
                debug!(shape = ?original.shape(), ?mode, "temporary discarded");
            }
        }
        Ok(())
    }
}

impl Drop for ArrayBinding {
    fn drop(&mut self) {
        let _ = self.release(false);
    }
}

fn writable_array<'a>(arg: &'a HostValue, message: &str) -> BindResult<&'a HostArray> {
    match arg {
        HostValue::Array(array) if array.is_writeable() => Ok(array),
        _ => Err(BindError::TypeMismatch(message.into())),
    }
}
