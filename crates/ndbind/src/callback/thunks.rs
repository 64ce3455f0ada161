//! Native entry points that call back into host callables.
//!
//! ## Purpose
//!
//! The engine only knows how to call a C function pointer with an opaque
//! context. This module provides one such function per kernel family; each
//! recovers the [`HostCallbackState`] from the context, marshals the engine's
//! buffers into host values, calls the host callable, and marshals the result
//! back.
//!
//! ## Design notes
//!
//! * **Status codes**: A thunk returns `1` on success and `0` on failure, the
//!   convention the engine understands. The detailed error is parked on the
//!   state and surfaced by the request after the engine returns.
//! * **First failure wins**: Once an error is parked, later invocations return
//!   `0` immediately without calling the host again.
//! * **No unwinding across the boundary**: Every thunk body runs inside
//!   `catch_unwind`; a panic becomes a parked `CallbackFailed`.
//! * **No retained pointers**: Engine buffers are copied into host arrays for
//!   the duration of one call and never referenced afterwards.
//!
//! ## Key concepts
//!
//! * **Window-resize**: `(line_in, line_out) ++ extra`; the host fills `line_out`.
//! * **Fixed-window**: `(window,) ++ extra`; the host returns one number.
//! * **Coordinate-mapping**: `(coordinate_tuple,) ++ extra`; the host returns
//!   a sequence of exactly `in_rank` numbers.
//!
//! ## Invariants
//!
//! * A host error and a non-convertible host result produce different error kinds.
//! * Nothing is written into the engine's output until the host result is fully validated.

// External dependencies
use std::ffi::{c_int, c_void};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;
use std::slice;
use tracing::trace;

// Internal dependencies
use crate::callback::context::CallbackContext;
use crate::callback::signature::AdapterShape;
use crate::host::array::HostArray;
use crate::host::callable::HostCallable;
use crate::host::value::HostValue;
use crate::primitives::errors::{BindError, BindResult};

// ============================================================================
// Native Function Types
// ============================================================================

/// Generic 1-D filter: `(in_line, in_len, out_line, out_len, context)`.
pub type Filter1DFn =
    unsafe extern "C" fn(*const f64, isize, *mut f64, isize, *mut c_void) -> c_int;

/// Generic n-D filter: `(window, size, out_value, context)`.
pub type FilterFn = unsafe extern "C" fn(*const f64, isize, *mut f64, *mut c_void) -> c_int;

/// Geometric mapping: `(out_coord, in_coord, out_rank, in_rank, context)`.
pub type MapFn = unsafe extern "C" fn(*const isize, *mut f64, c_int, c_int, *mut c_void) -> c_int;

// ============================================================================
// Callback State
// ============================================================================

/// Everything a thunk needs to call one host callable.
pub struct HostCallbackState {
    callable: Rc<dyn HostCallable>,
    context: CallbackContext,
    shape: AdapterShape,
    coordinates: Vec<f64>,
    error: Option<BindError>,
    calls: usize,
}

impl HostCallbackState {
    /// Bind `callable` to the adapter `shape`.
    pub fn new(callable: Rc<dyn HostCallable>, context: CallbackContext, shape: AdapterShape) -> Self {
        Self {
            callable,
            context,
            shape,
            coordinates: Vec::new(),
            error: None,
            calls: 0,
        }
    }

    /// Adapter this state serves.
    pub fn shape(&self) -> AdapterShape {
        self.shape
    }

    /// Number of times the host callable has been invoked.
    pub fn calls(&self) -> usize {
        self.calls
    }

    /// The parked error, if an invocation has failed.
    pub fn error(&self) -> Option<&BindError> {
        self.error.as_ref()
    }

    /// Remove and return the parked error.
    pub fn take_error(&mut self) -> Option<BindError> {
        self.error.take()
    }

    fn call_host(&mut self, leading: Vec<HostValue>) -> BindResult<HostValue> {
        self.calls += 1;
        trace!(shape = ?self.shape, call = self.calls, "invoking host callback");
        let args = self.context.arguments_with(leading);
        self.callable
            .call(&args, self.context.keywords())
            .map_err(BindError::HostCallableFailure)
    }

    /// Run one invocation, translating its outcome into a status code.
    fn run(&mut self, body: impl FnOnce(&mut Self) -> BindResult<()>) -> c_int {
        if self.error.is_some() {
            return 0;
        }
        match body(self) {
            Ok(()) => 1,
            Err(err) => {
                self.error = Some(err);
                0
            }
        }
    }

    fn park_panic(&mut self) {
        if self.error.is_none() {
            let family = match self.shape {
                AdapterShape::WindowResize => "filter1d",
                AdapterShape::FixedWindow => "filter",
                AdapterShape::CoordinateMapping => "map",
            };
            self.error = Some(BindError::CallbackFailed(family.into()));
        }
    }

    // ========================================================================
    // Adapters
    // ========================================================================

    /// Window-resize adapter: the host fills `output` from `input`.
    pub fn window_resize(&mut self, input: &[f64], output: &mut [f64]) -> BindResult<()> {
        let line_in = HostArray::from_f64(input);
        let line_out = HostArray::from_f64(&vec![0.0; output.len()]);
        self.call_host(vec![line_in.into(), line_out.clone().into()])?;

        let values = line_out.to_f64_vec()?;
        if values.len() < output.len() {
            return Err(BindError::ShapeMismatch(format!(
                "output line supplies {} values, {} required",
                values.len(),
                output.len()
            )));
        }
        output.copy_from_slice(&values[..output.len()]);
        Ok(())
    }

    /// Fixed-window adapter: the host reduces `window` to one number.
    pub fn fixed_window(&mut self, window: &[f64]) -> BindResult<f64> {
        let window = HostArray::from_f64(window);
        let result = self.call_host(vec![window.into()])?;
        result.as_f64()
    }

    /// Coordinate-mapping adapter: the host maps `out_coord` to `in_coord`.
    pub fn map_coordinates(&mut self, out_coord: &[isize], in_coord: &mut [f64]) -> BindResult<()> {
        let coordinate = HostValue::Tuple(
            out_coord
                .iter()
                .map(|&c| HostValue::Int(c as i64))
                .collect(),
        );
        let result = self.call_host(vec![coordinate])?;

        // Staged in full so a bad item leaves `in_coord` untouched.
        let coordinates = &mut self.coordinates;
        coordinates.clear();
        match &result {
            HostValue::Tuple(items) | HostValue::List(items) => {
                check_rank(items.len(), in_coord.len())?;
                for item in items {
                    coordinates.push(item.as_f64()?);
                }
            }
            HostValue::Array(array) if array.ndim() == 1 => {
                check_rank(array.len(), in_coord.len())?;
                coordinates.extend(array.to_f64_vec()?);
            }
            other => {
                return Err(BindError::TypeMismatch(format!(
                    "mapping must return a sequence of {} numbers, not {}",
                    in_coord.len(),
                    other.type_name()
                )))
            }
        }
        in_coord.copy_from_slice(&coordinates[..]);
        Ok(())
    }
}

fn check_rank(got: usize, expected: usize) -> BindResult<()> {
    if got != expected {
        return Err(BindError::ShapeMismatch(format!(
            "mapping returned {got} coordinates, expected {expected}"
        )));
    }
    Ok(())
}

// ============================================================================
// Thunks
// ============================================================================

unsafe fn line<'a>(ptr: *const f64, len: isize) -> &'a [f64] {
    if ptr.is_null() || len <= 0 {
        &[]
    } else {
        slice::from_raw_parts(ptr, len as usize)
    }
}

unsafe fn line_mut<'a>(ptr: *mut f64, len: isize) -> &'a mut [f64] {
    if ptr.is_null() || len <= 0 {
        &mut []
    } else {
        slice::from_raw_parts_mut(ptr, len as usize)
    }
}

/// Native entry point for the window-resize adapter.
///
/// # Safety
///
/// `data` must point to a live `HostCallbackState`; `input` and `output` must
/// be valid for `in_len` and `out_len` elements.
pub(crate) unsafe extern "C" fn filter1d_thunk(
    input: *const f64,
    in_len: isize,
    output: *mut f64,
    out_len: isize,
    data: *mut c_void,
) -> c_int {
    let state = data.cast::<HostCallbackState>();
    if state.is_null() {
        return 0;
    }
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        let (input, output) = (line(input, in_len), line_mut(output, out_len));
        (*state).run(|s| s.window_resize(input, output))
    }));
    outcome.unwrap_or_else(|_| {
        (*state).park_panic();
        0
    })
}

/// Native entry point for the fixed-window adapter.
///
/// # Safety
///
/// `data` must point to a live `HostCallbackState`; `window` must be valid for
/// `size` elements and `output` for one.
pub(crate) unsafe extern "C" fn filter_thunk(
    window: *const f64,
    size: isize,
    output: *mut f64,
    data: *mut c_void,
) -> c_int {
    let state = data.cast::<HostCallbackState>();
    if state.is_null() || output.is_null() {
        return 0;
    }
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        let window = line(window, size);
        (*state).run(|s| {
            let value = s.fixed_window(window)?;
            *output = value;
            Ok(())
        })
    }));
    outcome.unwrap_or_else(|_| {
        (*state).park_panic();
        0
    })
}

/// Native entry point for the coordinate-mapping adapter.
///
/// # Safety
///
/// `data` must point to a live `HostCallbackState`; `out_coord` must be valid
/// for `out_rank` elements and `in_coord` for `in_rank`.
pub(crate) unsafe extern "C" fn map_thunk(
    out_coord: *const isize,
    in_coord: *mut f64,
    out_rank: c_int,
    in_rank: c_int,
    data: *mut c_void,
) -> c_int {
    let state = data.cast::<HostCallbackState>();
    if state.is_null() {
        return 0;
    }
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        let out_coord: &[isize] = if out_coord.is_null() || out_rank <= 0 {
            &[]
        } else {
            slice::from_raw_parts(out_coord, out_rank as usize)
        };
        let in_coord = line_mut(in_coord, in_rank as isize);
        (*state).run(|s| s.map_coordinates(out_coord, in_coord))
    }));
    outcome.unwrap_or_else(|_| {
        (*state).park_panic();
        0
    })
}
