//! Dynamically typed host values.
//!
//! ## Purpose
//!
//! This module defines [`HostValue`], the closed set of host objects that may
//! appear as arguments, kernel objects, callback arguments and callback results.
//!
//! ## Design notes
//!
//! * **Reference semantics**: Arrays, callables and resources are shared
//!   references; cloning a value never copies their contents.
//! * **Explicit conversion**: Numeric extraction returns `TypeMismatch` for
//!   values that are not numbers, never a default.

// External dependencies
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::rc::Rc;

// Internal dependencies
use crate::host::array::HostArray;
use crate::host::callable::HostCallable;
use crate::host::capsule::Capsule;
use crate::host::handle::ResourceHandle;
use crate::primitives::dtype::Scalar;
use crate::primitives::errors::{BindError, BindResult};

/// Keyword arguments, ordered by name.
pub type Keywords = BTreeMap<String, HostValue>;

// ============================================================================
// HostValue
// ============================================================================

/// A host object crossing the boundary.
#[derive(Clone, Default)]
pub enum HostValue {
    /// The host's null value.
    #[default]
    None,
    /// Boolean.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Text.
    Str(String),
    /// Immutable sequence.
    Tuple(Vec<HostValue>),
    /// Mutable sequence.
    List(Vec<HostValue>),
    /// Mapping from names to values.
    Dict(Keywords),
    /// n-dimensional array.
    Array(HostArray),
    /// Raw pointer container, possibly labeled with a signature.
    Capsule(Capsule),
    /// Callable object.
    Callable(Rc<dyn HostCallable>),
    /// Opaque resource handle.
    Resource(ResourceHandle),
}

impl HostValue {
    /// Wrap a closure as a callable value.
    pub fn callable<F: HostCallable + 'static>(f: F) -> Self {
        Self::Callable(Rc::new(f))
    }

    /// Host-facing type name, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "NoneType",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::Tuple(_) => "tuple",
            Self::List(_) => "list",
            Self::Dict(_) => "dict",
            Self::Array(_) => "ndarray",
            Self::Capsule(_) => "PyCapsule",
            Self::Callable(_) => "function",
            Self::Resource(_) => "resource",
        }
    }

    /// True for the host's null value.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Items of a tuple or list.
    pub fn as_sequence(&self) -> Option<&[HostValue]> {
        match self {
            Self::Tuple(items) | Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// The value as an exact scalar, for numbers and booleans.
    pub fn as_scalar(&self) -> Option<Scalar> {
        match self {
            Self::Bool(b) => Some(Scalar::Bool(*b)),
            Self::Int(i) => Some(Scalar::Int(*i)),
            Self::Float(x) => Some(Scalar::Float(*x)),
            _ => None,
        }
    }

    /// The value as `f64`; single-element arrays are accepted.
    pub fn as_f64(&self) -> BindResult<f64> {
        if let Some(scalar) = self.as_scalar() {
            return Ok(scalar.to_f64());
        }
        match self {
            Self::Array(array) if array.len() == 1 => Ok(array.to_f64_vec()?[0]),
            other => Err(BindError::TypeMismatch(format!(
                "must be real number, not {}",
                other.type_name()
            ))),
        }
    }

    /// The value as a native index; floats are rejected.
    pub fn as_index(&self) -> BindResult<isize> {
        let wide = match self {
            Self::Bool(b) => i64::from(*b),
            Self::Int(i) => *i,
            other => {
                return Err(BindError::TypeMismatch(format!(
                    "'{}' object cannot be interpreted as an integer",
                    other.type_name()
                )))
            }
        };
        num_traits::cast::<i64, isize>(wide).ok_or_else(|| {
            BindError::ConversionError(format!("integer {wide} does not fit in a native index"))
        })
    }
}

impl Debug for HostValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::None => f.write_str("None"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::Tuple(items) => {
                let mut t = f.debug_tuple("");
                for item in items {
                    t.field(item);
                }
                t.finish()
            }
            Self::List(items) => f.debug_list().entries(items).finish(),
            Self::Dict(map) => f.debug_map().entries(map).finish(),
            Self::Array(array) => array.fmt(f),
            Self::Capsule(capsule) => capsule.fmt(f),
            Self::Callable(_) => f.write_str("<callable>"),
            Self::Resource(handle) => handle.fmt(f),
        }
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<bool> for HostValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for HostValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for HostValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for HostValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<HostArray> for HostValue {
    fn from(value: HostArray) -> Self {
        Self::Array(value)
    }
}

impl From<Capsule> for HostValue {
    fn from(value: Capsule) -> Self {
        Self::Capsule(value)
    }
}

impl From<ResourceHandle> for HostValue {
    fn from(value: ResourceHandle) -> Self {
        Self::Resource(value)
    }
}

impl From<Vec<HostValue>> for HostValue {
    fn from(value: Vec<HostValue>) -> Self {
        Self::List(value)
    }
}

impl From<Keywords> for HostValue {
    fn from(value: Keywords) -> Self {
        Self::Dict(value)
    }
}
