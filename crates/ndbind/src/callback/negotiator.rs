//! Kernel negotiation: from a host kernel object to one native entry point.
//!
//! ## Purpose
//!
//! A pluggable operation accepts a kernel object that may be a raw
//! function-pointer capsule, a capsule labeled with its C signature, or a host
//! callable. This module inspects the object once, decides which of these it
//! is, and produces a [`KernelBinding`] from which the engine receives exactly
//! one function pointer and one context pointer.
//!
//! ## Design notes
//!
//! * **Closed variant**: The three kernel kinds are the variants of one enum,
//!   built once per request and released with it.
//! * **Typed families**: Each family is a marker type implementing
//!   [`CallbackFamily`], which fixes the Rust function pointer type, the host
//!   thunk, and the signature table used for labeled capsules.
//! * **Stable context**: A host callable's state is boxed so the context
//!   pointer handed to the engine stays valid however the binding moves.
//!
//! ## Invariants
//!
//! * Extra argument containers are validated before the kernel is inspected.
//! * A labeled capsule whose signature matches no table entry is rejected.
//! * The engine never sees a null function pointer.

// External dependencies
use std::ffi::{c_int, c_void};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use tracing::debug;

// Internal dependencies
use crate::callback::context::CallbackContext;
use crate::callback::signature::KernelFamily;
use crate::callback::thunks::{
    filter1d_thunk, filter_thunk, map_thunk, Filter1DFn, FilterFn, HostCallbackState, MapFn,
};
use crate::host::value::HostValue;
use crate::primitives::errors::{BindError, BindResult};

// ============================================================================
// Families
// ============================================================================

/// A kernel calling convention known at compile time.
pub trait CallbackFamily: 'static {
    /// Rust type of the native function pointer.
    type Fn: Copy + Debug;

    /// Runtime tag of this family.
    const FAMILY: KernelFamily;

    /// The thunk that forwards to a host callable.
    fn thunk() -> Self::Fn;

    /// Reinterpret a raw pointer as this family's function type.
    ///
    /// # Safety
    ///
    /// `pointer` must be a non-null function with this family's signature.
    unsafe fn from_raw(pointer: *const c_void) -> Self::Fn;
}

/// Generic 1-D filter kernels.
#[derive(Debug, Clone, Copy)]
pub struct Filter1D;

/// Generic n-D filter kernels.
#[derive(Debug, Clone, Copy)]
pub struct Filter;

/// Geometric transform mapping kernels.
#[derive(Debug, Clone, Copy)]
pub struct Map;

impl CallbackFamily for Filter1D {
    type Fn = Filter1DFn;
    const FAMILY: KernelFamily = KernelFamily::Filter1D;

    fn thunk() -> Filter1DFn {
        filter1d_thunk
    }

    unsafe fn from_raw(pointer: *const c_void) -> Filter1DFn {
        std::mem::transmute::<*const c_void, Filter1DFn>(pointer)
    }
}

impl CallbackFamily for Filter {
    type Fn = FilterFn;
    const FAMILY: KernelFamily = KernelFamily::Filter;

    fn thunk() -> FilterFn {
        filter_thunk
    }

    unsafe fn from_raw(pointer: *const c_void) -> FilterFn {
        std::mem::transmute::<*const c_void, FilterFn>(pointer)
    }
}

impl CallbackFamily for Map {
    type Fn = MapFn;
    const FAMILY: KernelFamily = KernelFamily::Map;

    fn thunk() -> MapFn {
        map_thunk
    }

    unsafe fn from_raw(pointer: *const c_void) -> MapFn {
        std::mem::transmute::<*const c_void, MapFn>(pointer)
    }
}

// ============================================================================
// Native Kernel
// ============================================================================

/// The function pointer and context pointer the engine calls.
pub struct NativeKernel<F: CallbackFamily> {
    /// Entry point.
    pub function: F::Fn,

    /// Opaque context passed as the last argument.
    pub context: *mut c_void,
}

impl<F: CallbackFamily> Clone for NativeKernel<F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<F: CallbackFamily> Copy for NativeKernel<F> {}

impl<F: CallbackFamily> Debug for NativeKernel<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("NativeKernel")
            .field("family", &F::FAMILY)
            .field("function", &self.function)
            .field("context", &self.context)
            .finish()
    }
}

impl NativeKernel<Filter1D> {
    /// Run the kernel over one line. Returns `false` when it reports failure.
    pub fn invoke(&self, input: &[f64], output: &mut [f64]) -> bool {
        // SAFETY: the binding that produced this kernel keeps `context` alive
        // for the request, and both slices are valid for their lengths.
        unsafe {
            (self.function)(
                input.as_ptr(),
                input.len() as isize,
                output.as_mut_ptr(),
                output.len() as isize,
                self.context,
            ) != 0
        }
    }
}

impl NativeKernel<Filter> {
    /// Reduce one window to a value. Returns `None` when the kernel reports failure.
    pub fn invoke(&self, window: &[f64]) -> Option<f64> {
        let mut value = 0.0;
        // SAFETY: as for the 1-D filter; `value` is a valid output slot.
        let status = unsafe {
            (self.function)(
                window.as_ptr(),
                window.len() as isize,
                &mut value,
                self.context,
            )
        };
        (status != 0).then_some(value)
    }
}

impl NativeKernel<Map> {
    /// Map an output coordinate into `in_coord`. Returns `false` on failure.
    pub fn invoke(&self, out_coord: &[isize], in_coord: &mut [f64]) -> bool {
        // SAFETY: as for the 1-D filter; ranks equal the slice lengths.
        unsafe {
            (self.function)(
                out_coord.as_ptr(),
                in_coord.as_mut_ptr(),
                out_coord.len() as c_int,
                in_coord.len() as c_int,
                self.context,
            ) != 0
        }
    }
}

// ============================================================================
// Kernel Binding
// ============================================================================

/// A negotiated kernel, owned by the request that uses it.
pub enum KernelBinding<F: CallbackFamily> {
    /// A capsule whose signature label matched the family's table.
    NativeExported {
        /// Entry point.
        function: F::Fn,
        /// Context pointer from the capsule.
        context: *mut c_void,
    },

    /// An unlabeled capsule, trusted to follow the family's convention.
    LowLevelCallable {
        /// Entry point.
        function: F::Fn,
        /// Context pointer from the capsule.
        context: *mut c_void,
    },

    /// A host callable reached through the family's thunk.
    HostCallable(Box<HostCallbackState>),
}

impl<F: CallbackFamily> KernelBinding<F> {
    /// Negotiate `kernel` with the given extra argument containers.
    pub fn negotiate(
        kernel: &HostValue,
        extra_arguments: &HostValue,
        extra_keywords: &HostValue,
    ) -> BindResult<Self> {
        let context = CallbackContext::from_host(extra_arguments, extra_keywords)?;
        Self::negotiate_with(kernel, context)
    }

    /// Negotiate `kernel` with an already validated context.
    pub fn negotiate_with(kernel: &HostValue, context: CallbackContext) -> BindResult<Self> {
        let family = F::FAMILY;
        let binding = match kernel {
            HostValue::Capsule(capsule) => {
                if capsule.pointer().is_null() {
                    return Err(BindError::UnsupportedCallable(format!(
                        "{family} capsule holds a null function pointer"
                    )));
                }
                // SAFETY: `Capsule::new` obliges its creator to supply a
                // function matching the label, or the family's convention
                // when unlabeled; labels are checked against the table below.
                let function = unsafe { F::from_raw(capsule.pointer()) };
                let context = capsule.context();
                match capsule.name() {
                    None => Self::LowLevelCallable { function, context },
                    Some(label) => match family.match_signature(label) {
                        Some(_) => Self::NativeExported { function, context },
                        None => {
                            return Err(BindError::UnsupportedCallable(format!(
                                "invalid callable signature '{label}' for {family} kernel"
                            )))
                        }
                    },
                }
            }
            HostValue::Callable(callable) => Self::HostCallable(Box::new(HostCallbackState::new(
                callable.clone(),
                context,
                family.adapter_shape(),
            ))),
            other => {
                return Err(BindError::UnsupportedCallable(format!(
                    "{} is not a callable or low-level callable for {family} kernel",
                    other.type_name()
                )))
            }
        };
        debug!(family = family.name(), kind = binding.kind(), "kernel negotiated");
        Ok(binding)
    }

    /// Negotiate an optional kernel; the host null value means "none".
    pub fn negotiate_optional(
        kernel: &HostValue,
        extra_arguments: &HostValue,
        extra_keywords: &HostValue,
    ) -> BindResult<Option<Self>> {
        if kernel.is_none() {
            return Ok(None);
        }
        Self::negotiate(kernel, extra_arguments, extra_keywords).map(Some)
    }

    /// Variant name, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NativeExported { .. } => "native",
            Self::LowLevelCallable { .. } => "low-level",
            Self::HostCallable(_) => "host",
        }
    }

    /// The (function, context) pair to hand to the engine.
    pub fn native(&mut self) -> NativeKernel<F> {
        match self {
            Self::NativeExported { function, context }
            | Self::LowLevelCallable { function, context } => NativeKernel {
                function: *function,
                context: *context,
            },
            Self::HostCallable(state) => NativeKernel {
                function: F::thunk(),
                context: (&mut **state as *mut HostCallbackState).cast::<c_void>(),
            },
        }
    }

    /// Number of host invocations so far (zero for native kernels).
    pub fn host_calls(&self) -> usize {
        match self {
            Self::HostCallable(state) => state.calls(),
            _ => 0,
        }
    }

    /// Remove and return the error parked by a failed host invocation.
    pub fn take_error(&mut self) -> Option<BindError> {
        match self {
            Self::HostCallable(state) => state.take_error(),
            _ => None,
        }
    }
}

impl<F: CallbackFamily> Debug for KernelBinding<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("KernelBinding")
            .field("family", &F::FAMILY)
            .field("kind", &self.kind())
            .finish()
    }
}
