//! Typed, reference-counted resource handles.
//!
//! ## Purpose
//!
//! This module provides the opaque handle the host holds between calls for a
//! resource whose contents only native code understands.
//!
//! ## Design notes
//!
//! * **Kind tag**: Every handle carries a static kind string. Access names the
//!   kind it expects; a mismatch is a `TypeMismatch`, never a reinterpretation.
//! * **Single destruction**: The destructor closure runs exactly once, either on
//!   explicit `release` or when the last reference drops.
//!
//! ## Invariants
//!
//! * After release the payload is gone and every access yields `ReleasedResource`.

// External dependencies
use std::any::Any;
use std::cell::RefCell;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::rc::Rc;
use tracing::debug;

// Internal dependencies
use crate::primitives::errors::{BindError, BindResult};

type Destructor = Box<dyn FnOnce(Box<dyn Any>)>;

struct HandleInner {
    kind: &'static str,
    payload: RefCell<Option<Box<dyn Any>>>,
    destructor: RefCell<Option<Destructor>>,
}

impl HandleInner {
    fn release(&self) -> bool {
        let Ok(mut slot) = self.payload.try_borrow_mut() else {
            return false;
        };
        let Some(payload) = slot.take() else {
            return false;
        };
        drop(slot);
        if let Some(destructor) = self.destructor.borrow_mut().take() {
            destructor(payload);
        }
        debug!(kind = self.kind, "resource released");
        true
    }
}

impl Drop for HandleInner {
    fn drop(&mut self) {
        self.release();
    }
}

// ============================================================================
// ResourceHandle
// ============================================================================

/// A shared handle to a native resource of a named kind.
#[derive(Clone)]
pub struct ResourceHandle(Rc<HandleInner>);

impl ResourceHandle {
    /// Wrap `payload`; it is dropped on release.
    pub fn new<T: Any>(kind: &'static str, payload: T) -> Self {
        Self::with_destructor(kind, payload, drop)
    }

    /// Wrap `payload` with a destructor that receives it on release.
    pub fn with_destructor<T: Any>(
        kind: &'static str,
        payload: T,
        destructor: impl FnOnce(T) + 'static,
    ) -> Self {
        let destructor: Destructor = Box::new(move |boxed: Box<dyn Any>| {
            if let Ok(value) = boxed.downcast::<T>() {
                destructor(*value);
            }
        });
        Self(Rc::new(HandleInner {
            kind,
            payload: RefCell::new(Some(Box::new(payload))),
            destructor: RefCell::new(Some(destructor)),
        }))
    }

    /// The kind tag.
    pub fn kind(&self) -> &'static str {
        self.0.kind
    }

    /// True once the payload has been released.
    pub fn is_released(&self) -> bool {
        self.0
            .payload
            .try_borrow()
            .map(|slot| slot.is_none())
            .unwrap_or(false)
    }

    /// True when both references denote the same resource.
    pub fn same_resource(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Run `f` on the payload after checking its kind and liveness.
    pub fn with_payload<T: Any, R>(
        &self,
        kind: &'static str,
        f: impl FnOnce(&mut T) -> R,
    ) -> BindResult<R> {
        if self.0.kind != kind {
            return Err(BindError::TypeMismatch(format!(
                "expected a '{kind}' resource, got '{}'",
                self.0.kind
            )));
        }
        let mut slot = self
            .0
            .payload
            .try_borrow_mut()
            .map_err(|_| BindError::TypeMismatch(format!("resource '{kind}' is already in use")))?;
        let payload = slot.as_mut().ok_or(BindError::ReleasedResource(self.0.kind))?;
        let value = payload.downcast_mut::<T>().ok_or_else(|| {
            BindError::TypeMismatch(format!("resource '{kind}' holds an unexpected payload"))
        })?;
        Ok(f(value))
    }

    /// Run the destructor now. Returns `false` if it had already run.
    pub fn release(&self) -> bool {
        self.0.release()
    }
}

impl Debug for ResourceHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ResourceHandle")
            .field("kind", &self.0.kind)
            .field("released", &self.is_released())
            .finish()
    }
}
