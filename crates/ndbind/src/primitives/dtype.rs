//! Element type tags, byte order, and scalar casting.
//!
//! ## Purpose
//!
//! This module describes the element types a host array may carry and provides
//! the byte-level read/write routines used by every copy, cast, and write-back
//! in the crate.
//!
//! ## Design notes
//!
//! * **Byte-oriented**: Elements are decoded from raw bytes with `bytemuck`, so
//!   unaligned and byte-swapped storage is read without undefined behavior.
//! * **Scalar intermediate**: Casting goes through [`Scalar`], which keeps
//!   integer values exact instead of routing everything through `f64`.
//! * **Primitive casts**: Element conversions go through `num_traits::AsPrimitive`,
//!   so narrowing follows Rust `as` semantics (floats saturate, integers wrap).
//!
//! ## Key concepts
//!
//! * **DType**: The element type tag of an array.
//! * **ByteOrder**: Whether stored bytes are in native or swapped order.
//! * **Element**: Typed access for constructing and extracting arrays.
//!
//! ## Invariants
//!
//! * `DType::itemsize` is the exact stored width of one element.
//! * Reading a value written with the same dtype and byte order returns it unchanged.

// External dependencies
use bytemuck::Pod;
use core::fmt::Debug;
use core::mem::size_of;
use num_traits::AsPrimitive;

// ============================================================================
// DType
// ============================================================================

/// Element type tag of a host array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    /// One byte, zero is false.
    Bool,
    /// Signed 8-bit integer.
    Int8,
    /// Signed 16-bit integer.
    Int16,
    /// Signed 32-bit integer.
    Int32,
    /// Signed 64-bit integer.
    Int64,
    /// Unsigned 8-bit integer.
    UInt8,
    /// Unsigned 16-bit integer.
    UInt16,
    /// Unsigned 32-bit integer.
    UInt32,
    /// Unsigned 64-bit integer.
    UInt64,
    /// IEEE single precision.
    Float32,
    /// IEEE double precision.
    Float64,
}

impl DType {
    /// Stored width of one element in bytes.
    pub const fn itemsize(self) -> usize {
        match self {
            Self::Bool | Self::Int8 | Self::UInt8 => 1,
            Self::Int16 | Self::UInt16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float32 => 4,
            Self::Int64 | Self::UInt64 | Self::Float64 => 8,
        }
    }

    /// Short lowercase name, as a host runtime would print it.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::UInt8 => "uint8",
            Self::UInt16 => "uint16",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
        }
    }

    /// The signed integer type with the platform's pointer width.
    pub const fn intp() -> Self {
        if size_of::<isize>() == 8 {
            Self::Int64
        } else {
            Self::Int32
        }
    }

    /// True for `Float32` and `Float64`.
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }

    /// True for signed and unsigned integer types (not `Bool`).
    pub const fn is_integer(self) -> bool {
        !matches!(self, Self::Bool | Self::Float32 | Self::Float64)
    }

    /// The dtype a lone scalar is given when converted to an array.
    pub const fn of_scalar(value: Scalar) -> Self {
        match value {
            Scalar::Bool(_) => Self::Bool,
            Scalar::Int(_) => Self::Int64,
            Scalar::UInt(_) => Self::UInt64,
            Scalar::Float(_) => Self::Float64,
        }
    }

    /// Smallest of `Bool`, `Int64`, `UInt64`, `Float64` able to hold both.
    pub fn promote(self, other: Self) -> Self {
        use DType::*;
        match (self, other) {
            (a, b) if a == b => a,
            (Bool, x) | (x, Bool) => x,
            (a, b) if a.is_float() || b.is_float() => Float64,
            (UInt64, _) | (_, UInt64) => Float64,
            _ => Int64,
        }
    }

    /// Decode one element from `bytes` (at least `itemsize` long).
    pub(crate) fn read(self, bytes: &[u8], order: ByteOrder) -> Scalar {
        match self {
            Self::Bool => Scalar::Bool(bytes[0] != 0),
            Self::Int8 => read_element::<i8>(bytes, order).to_scalar(),
            Self::Int16 => read_element::<i16>(bytes, order).to_scalar(),
            Self::Int32 => read_element::<i32>(bytes, order).to_scalar(),
            Self::Int64 => read_element::<i64>(bytes, order).to_scalar(),
            Self::UInt8 => read_element::<u8>(bytes, order).to_scalar(),
            Self::UInt16 => read_element::<u16>(bytes, order).to_scalar(),
            Self::UInt32 => read_element::<u32>(bytes, order).to_scalar(),
            Self::UInt64 => read_element::<u64>(bytes, order).to_scalar(),
            Self::Float32 => read_element::<f32>(bytes, order).to_scalar(),
            Self::Float64 => read_element::<f64>(bytes, order).to_scalar(),
        }
    }

    /// Encode `value`, cast to this dtype, into `bytes`.
    pub(crate) fn write(self, bytes: &mut [u8], order: ByteOrder, value: Scalar) {
        match self {
            Self::Bool => bytes[0] = u8::from(value.to_bool()),
            Self::Int8 => write_element(bytes, order, i8::from_scalar(value)),
            Self::Int16 => write_element(bytes, order, i16::from_scalar(value)),
            Self::Int32 => write_element(bytes, order, i32::from_scalar(value)),
            Self::Int64 => write_element(bytes, order, i64::from_scalar(value)),
            Self::UInt8 => write_element(bytes, order, u8::from_scalar(value)),
            Self::UInt16 => write_element(bytes, order, u16::from_scalar(value)),
            Self::UInt32 => write_element(bytes, order, u32::from_scalar(value)),
            Self::UInt64 => write_element(bytes, order, u64::from_scalar(value)),
            Self::Float32 => write_element(bytes, order, f32::from_scalar(value)),
            Self::Float64 => write_element(bytes, order, f64::from_scalar(value)),
        }
    }
}

// ============================================================================
// Byte Order
// ============================================================================

/// Byte order of stored elements relative to the running platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    /// Bytes are in the platform's order.
    #[default]
    Native,

    /// Bytes are reversed relative to the platform's order.
    Swapped,
}

// ============================================================================
// Scalar
// ============================================================================

/// A single element value, wide enough to hold any supported dtype exactly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    UInt(u64),
    /// Floating point.
    Float(f64),
}

impl Scalar {
    /// Value as `f64`.
    pub fn to_f64(self) -> f64 {
        match self {
            Self::Bool(b) => f64::from(u8::from(b)),
            Self::Int(i) => i as f64,
            Self::UInt(u) => u as f64,
            Self::Float(x) => x,
        }
    }

    /// Value as `i64`, truncating floats toward zero.
    pub fn to_i64(self) -> i64 {
        match self {
            Self::Bool(b) => i64::from(b),
            Self::Int(i) => i,
            Self::UInt(u) => u as i64,
            Self::Float(x) => x as i64,
        }
    }

    /// Truthiness (non-zero).
    pub fn to_bool(self) -> bool {
        match self {
            Self::Bool(b) => b,
            Self::Int(i) => i != 0,
            Self::UInt(u) => u != 0,
            Self::Float(x) => x != 0.0,
        }
    }
}

// ============================================================================
// Element Trait
// ============================================================================

/// Native numeric types that can be stored in a host array.
pub trait Element: Pod + Debug + 'static {
    /// The dtype tag for this Rust type.
    const DTYPE: DType;

    /// Widen to a [`Scalar`].
    fn to_scalar(self) -> Scalar;

    /// Cast from a [`Scalar`] with `as` semantics.
    fn from_scalar(value: Scalar) -> Self;
}

macro_rules! impl_element {
    ($t:ty, $dtype:ident, $variant:ident, $wide:ty) => {
        impl Element for $t {
            const DTYPE: DType = DType::$dtype;

            #[inline]
            fn to_scalar(self) -> Scalar {
                Scalar::$variant(AsPrimitive::<$wide>::as_(self))
            }

            #[inline]
            fn from_scalar(value: Scalar) -> Self {
                match value {
                    Scalar::Bool(b) => AsPrimitive::<$t>::as_(u8::from(b)),
                    Scalar::Int(i) => AsPrimitive::<$t>::as_(i),
                    Scalar::UInt(u) => AsPrimitive::<$t>::as_(u),
                    Scalar::Float(x) => AsPrimitive::<$t>::as_(x),
                }
            }
        }
    };
}

impl_element!(i8, Int8, Int, i64);
impl_element!(i16, Int16, Int, i64);
impl_element!(i32, Int32, Int, i64);
impl_element!(i64, Int64, Int, i64);
impl_element!(u8, UInt8, UInt, u64);
impl_element!(u16, UInt16, UInt, u64);
impl_element!(u32, UInt32, UInt, u64);
impl_element!(u64, UInt64, UInt, u64);
impl_element!(f32, Float32, Float, f64);
impl_element!(f64, Float64, Float, f64);

// ============================================================================
// Byte Helpers
// ============================================================================

fn read_element<T: Element>(bytes: &[u8], order: ByteOrder) -> T {
    let n = size_of::<T>();
    let mut buf = [0u8; 8];
    buf[..n].copy_from_slice(&bytes[..n]);
    if order == ByteOrder::Swapped {
        buf[..n].reverse();
    }
    bytemuck::pod_read_unaligned(&buf[..n])
}

fn write_element<T: Element>(bytes: &mut [u8], order: ByteOrder, value: T) {
    let n = size_of::<T>();
    bytes[..n].copy_from_slice(bytemuck::bytes_of(&value));
    if order == ByteOrder::Swapped {
        bytes[..n].reverse();
    }
}
