//! Per-request ownership of adapted arguments.
//!
//! ## Purpose
//!
//! Every boundary operation follows the same shape: adapt each array
//! argument, run the engine, then commit or discard every binding depending
//! on the outcome. The [`RequestFrame`] owns the bindings of one request so
//! that this release happens on every exit path, including early returns
//! from argument errors.
//!
//! ## Design notes
//!
//! * **Registration order**: Bindings are committed in the order they were
//!   adapted.
//! * **Drop discards**: A frame dropped without `finish` discards everything,
//!   so `?` on a later argument leaves earlier outputs untouched.
//! * **Parked errors first**: A host callback error parked during the engine
//!   call takes precedence over whatever status the engine returned.
//!
//! ## Invariants
//!
//! * No output array is bound twice within one request.
//! * Outputs are written back only when the whole request succeeded.
//!
//! ## Non-goals
//!
//! * This module does not run numerical code (handled by the [`Engine`]).
//! * This module does not validate scalar arguments (handled by `validator`).
//!
//! [`Engine`]: crate::engine::traits::Engine

// External dependencies
use tracing::{debug, warn};

// Internal dependencies
use crate::binding::adapt::ArrayBinding;
use crate::binding::view::ArrayView;
use crate::callback::negotiator::{CallbackFamily, KernelBinding};
use crate::callback::signature::KernelFamily;
use crate::engine::traits::EngineError;
use crate::host::value::HostValue;
use crate::primitives::dtype::DType;
use crate::primitives::errors::{BindError, BindResult};
use crate::primitives::flags::Requirements;

// ============================================================================
// Binding Identifiers
// ============================================================================

/// Index of a binding within its frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Input,
    Output,
}

// ============================================================================
// RequestFrame
// ============================================================================

/// Owner of the adapted arguments of one boundary request.
#[derive(Debug)]
pub struct RequestFrame {
    operation: &'static str,
    input_requirements: Requirements,
    output_requirements: Requirements,
    bindings: Vec<(Role, ArrayBinding)>,
}

impl RequestFrame {
    /// Open a frame for `operation` with the given adaptation requirements.
    pub fn new(
        operation: &'static str,
        input_requirements: Requirements,
        output_requirements: Requirements,
    ) -> Self {
        debug!(operation, "request started");
        Self {
            operation,
            input_requirements,
            output_requirements,
            bindings: Vec::new(),
        }
    }

    /// Name of the operation this frame serves.
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    /// Number of bindings held.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// True when no argument has been bound yet.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    // ========================================================================
    // Adaptation
    // ========================================================================

    /// Adapt a required input.
    pub fn input(&mut self, arg: &HostValue) -> BindResult<BindingId> {
        self.input_as(arg, None)
    }

    /// Adapt a required input, converting to `dtype` when given.
    pub fn input_as(&mut self, arg: &HostValue, dtype: Option<DType>) -> BindResult<BindingId> {
        let binding = ArrayBinding::adapt_input(arg, dtype, self.input_requirements)?;
        Ok(self.push(Role::Input, binding))
    }

    /// Adapt an optional input; the host null value yields `None`.
    pub fn optional_input(&mut self, arg: &HostValue) -> BindResult<Option<BindingId>> {
        self.optional_input_as(arg, None)
    }

    /// Adapt an optional input, converting to `dtype` when given.
    pub fn optional_input_as(
        &mut self,
        arg: &HostValue,
        dtype: Option<DType>,
    ) -> BindResult<Option<BindingId>> {
        if arg.is_none() {
            return Ok(None);
        }
        self.input_as(arg, dtype).map(Some)
    }

    /// Adapt a required output.
    pub fn output(&mut self, arg: &HostValue) -> BindResult<BindingId> {
        self.check_unbound(arg)?;
        let binding = ArrayBinding::adapt_output(arg, None, self.output_requirements)?;
        Ok(self.push(Role::Output, binding))
    }

    /// Adapt an optional output; the host null value yields `None`.
    pub fn optional_output(&mut self, arg: &HostValue) -> BindResult<Option<BindingId>> {
        if arg.is_none() {
            return Ok(None);
        }
        self.output(arg).map(Some)
    }

    /// Adapt an argument that is read and written in place.
    pub fn inout(&mut self, arg: &HostValue) -> BindResult<BindingId> {
        self.check_unbound(arg)?;
        let binding = ArrayBinding::adapt_inout(arg, None, self.output_requirements)?;
        Ok(self.push(Role::Output, binding))
    }

    fn push(&mut self, role: Role, binding: ArrayBinding) -> BindingId {
        self.bindings.push((role, binding));
        BindingId(self.bindings.len() - 1)
    }

    fn check_unbound(&self, arg: &HostValue) -> BindResult<()> {
        let HostValue::Array(array) = arg else {
            return Ok(());
        };
        let taken = self
            .bindings
            .iter()
            .any(|(role, binding)| *role == Role::Output && binding.refers_to(array));
        if taken {
            return Err(BindError::TypeMismatch(format!(
                "{}: the same array is bound to more than one output",
                self.operation
            )));
        }
        Ok(())
    }

    // ========================================================================
    // Access
    // ========================================================================

    /// The view of binding `id`.
    pub fn view(&self, id: BindingId) -> &ArrayView {
        self.bindings[id.0].1.view()
    }

    /// The view of an optional binding.
    pub fn optional_view(&self, id: Option<BindingId>) -> Option<&ArrayView> {
        id.map(|id| self.view(id))
    }

    // ========================================================================
    // Release
    // ========================================================================

    /// Release every binding according to `outcome` and pass it through.
    ///
    /// On success, outputs are committed in registration order; if a commit
    /// fails, the remaining bindings are discarded and that error is
    /// returned. On failure, every binding is discarded.
    pub fn finish<T>(self, outcome: BindResult<T>) -> BindResult<T> {
        let operation = self.operation;
        match outcome {
            Ok(value) => {
                let mut bindings = self.bindings.into_iter();
                for (_, binding) in bindings.by_ref() {
                    if let Err(err) = binding.commit() {
                        warn!(operation, error = %err, "write-back failed");
                        bindings.for_each(|(_, rest)| rest.discard());
                        return Err(err);
                    }
                }
                debug!(operation, "request committed");
                Ok(value)
            }
            Err(err) => {
                for (_, binding) in self.bindings {
                    binding.discard();
                }
                debug!(operation, error = %err, "request discarded");
                Err(err)
            }
        }
    }
}

// ============================================================================
// Outcome Resolution
// ============================================================================

/// Translate an engine error for a request without a pluggable kernel.
pub fn engine_error(err: EngineError) -> BindError {
    match err {
        EngineError::KernelFailed => BindError::CallbackFailed("kernel".into()),
        other => BindError::Engine(other.to_string()),
    }
}

/// Resolve the outcome of an engine call that used `kernel`.
///
/// An error parked by a host callback wins, even when the engine ignored the
/// failure status and reported success.
pub fn settle<T, F: CallbackFamily>(
    outcome: Result<T, EngineError>,
    kernel: Option<&mut KernelBinding<F>>,
) -> BindResult<T> {
    let parked = kernel.and_then(|kernel| kernel.take_error());
    match (outcome, parked) {
        (_, Some(err)) => {
            warn!(family = F::FAMILY.name(), error = %err, "host callback failed");
            Err(err)
        }
        (Ok(value), None) => Ok(value),
        (Err(EngineError::KernelFailed), None) => Err(callback_failed(F::FAMILY)),
        (Err(other), None) => Err(engine_error(other)),
    }
}

fn callback_failed(family: KernelFamily) -> BindError {
    BindError::CallbackFailed(family.name().into())
}
