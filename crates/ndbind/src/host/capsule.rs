//! Raw function pointer containers.
//!
//! A [`Capsule`] carries a native function pointer, an opaque context pointer
//! and an optional label. A labeled capsule declares the C signature of its
//! function (for example `"int (double *, intptr_t, double *, void *)"`); an
//! unlabeled capsule is trusted to match the calling convention of whichever
//! family consumes it.

// External dependencies
use std::ffi::c_void;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::rc::Rc;

/// A function pointer, its context, and an optional signature label.
#[derive(Clone)]
pub struct Capsule {
    pointer: *const c_void,
    context: *mut c_void,
    name: Option<Rc<str>>,
}

impl Capsule {
    /// Wrap a native function pointer.
    ///
    /// # Safety
    ///
    /// `pointer` must be a non-dangling function whose C signature is `name`
    /// (or, when `name` is `None`, the signature of the kernel family the
    /// capsule is used with). `context` must be valid for that function for as
    /// long as the capsule or any binding made from it is alive.
    pub unsafe fn new(pointer: *const c_void, context: *mut c_void, name: Option<&str>) -> Self {
        Self {
            pointer,
            context,
            name: name.map(Rc::from),
        }
    }

    /// The wrapped function pointer.
    pub fn pointer(&self) -> *const c_void {
        self.pointer
    }

    /// The opaque context pointer.
    pub fn context(&self) -> *mut c_void {
        self.context
    }

    /// The signature label, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl Debug for Capsule {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Capsule")
            .field("pointer", &self.pointer)
            .field("name", &self.name())
            .finish()
    }
}
