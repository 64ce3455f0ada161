//! Host callables.
//!
//! A host callable receives positional and keyword arguments and either
//! returns a value or raises a [`HostError`]. Any closure with the matching
//! signature is a host callable.

// Internal dependencies
use crate::host::value::{HostValue, Keywords};
use crate::primitives::errors::HostError;

/// A callable host object.
pub trait HostCallable {
    /// Invoke with positional arguments `args` and keyword arguments `kwargs`.
    fn call(&self, args: &[HostValue], kwargs: &Keywords) -> Result<HostValue, HostError>;
}

impl<F> HostCallable for F
where
    F: Fn(&[HostValue], &Keywords) -> Result<HostValue, HostError>,
{
    #[inline]
    fn call(&self, args: &[HostValue], kwargs: &Keywords) -> Result<HostValue, HostError> {
        self(args, kwargs)
    }
}
