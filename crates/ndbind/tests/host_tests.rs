//! Tests for the host value model.
//!
//! These tests verify the objects a host runtime hands across the boundary:
//! - Host arrays, their layouts and identity
//! - Conversion of nested sequences and scalars to arrays
//! - Dynamic host values and their numeric conversions
//! - Integer sequence materialization
//! - Resource handles and capsules
//!
//! ## Test Organization
//!
//! 1. **Array Construction** - Typed, zeroed, scalar arrays
//! 2. **Array Layouts** - Byte-swapped, misaligned, Fortran-ordered, read-only
//! 3. **Value Conversion** - Nested sequences, numbers, indices
//! 4. **Sequence Materialization** - Accepted and rejected inputs
//! 5. **Resource Handles** - Kinds, release, destructors
//! 6. **Capsules** - Pointer, context and label
//! 7. **ndarray Interop** - Conversions behind the `ndarray` feature

use approx::assert_relative_eq;
use std::cell::Cell;
use std::ffi::c_void;
use std::rc::Rc;

use ndbind::internals::host::array::HostArray;
use ndbind::internals::host::capsule::Capsule;
use ndbind::internals::host::handle::ResourceHandle;
use ndbind::internals::host::sequence::IntSequence;
use ndbind::internals::host::value::{HostValue, Keywords};
use ndbind::internals::primitives::dtype::{ByteOrder, DType, Scalar};
use ndbind::internals::primitives::errors::BindError;

// ============================================================================
// Helper Functions
// ============================================================================

fn ints(values: &[i64]) -> HostValue {
    HostValue::Tuple(values.iter().map(|&v| HostValue::Int(v)).collect())
}

// ============================================================================
// Array Construction Tests
// ============================================================================

/// Test typed construction and extraction.
#[test]
fn test_from_vec_roundtrip() {
    let array = HostArray::from_vec(vec![1i32, -2, 3, -4, 5, -6], &[2, 3]).unwrap();
    assert_eq!(array.dtype(), DType::Int32);
    assert_eq!(array.shape(), vec![2, 3]);
    assert_eq!(array.strides(), vec![12, 4]);
    assert_eq!(array.ndim(), 2);
    assert_eq!(array.len(), 6);
    assert_eq!(array.to_vec::<i32>().unwrap(), vec![1, -2, 3, -4, 5, -6]);
    assert_eq!(array.get(&[1, 2]).unwrap(), Scalar::Int(-6));
}

/// Test that a length that does not fill the shape is rejected.
#[test]
fn test_from_vec_shape_mismatch() {
    let err = HostArray::from_vec(vec![1.0f64, 2.0, 3.0], &[2, 2]).unwrap_err();
    assert!(matches!(err, BindError::ShapeMismatch(_)));
}

/// Test zero-filled construction and default layout flags.
#[test]
fn test_try_zeros_layout() {
    let array = HostArray::try_zeros(DType::Float32, &[3, 4]).unwrap();
    assert_eq!(array.to_f64_vec().unwrap(), vec![0.0; 12]);
    assert!(array.is_aligned());
    assert!(array.is_c_contiguous());
    assert!(array.is_native_order());
    assert!(array.is_writeable());
}

/// Test zero-dimensional arrays from scalars.
#[test]
fn test_scalar_array() {
    let array = HostArray::scalar(Scalar::Float(2.5));
    assert_eq!(array.ndim(), 0);
    assert_eq!(array.len(), 1);
    assert_relative_eq!(array.to_f64_vec().unwrap()[0], 2.5);
    assert_eq!(array.get(&[]).unwrap(), Scalar::Float(2.5));
}

/// Test boolean arrays.
#[test]
fn test_from_bools() {
    let array = HostArray::from_bools(&[true, false, true], &[3]).unwrap();
    assert_eq!(array.dtype(), DType::Bool);
    assert_eq!(array.raw_bytes().unwrap(), vec![1, 0, 1]);
}

// ============================================================================
// Array Layout Tests
// ============================================================================

/// Test byte-swapped storage.
///
/// Verifies values read back unchanged while stored bytes are reversed.
#[test]
fn test_byteswapped_layout() {
    let native = HostArray::from_vec(vec![1u16, 0x0203], &[2]).unwrap();
    let swapped = native.byteswapped().unwrap();

    assert_eq!(swapped.byte_order(), ByteOrder::Swapped);
    assert!(!swapped.is_native_order());
    assert_eq!(swapped.to_vec::<u16>().unwrap(), vec![1, 0x0203]);

    let native_bytes = native.raw_bytes().unwrap();
    let swapped_bytes = swapped.raw_bytes().unwrap();
    assert_eq!(swapped_bytes[0], native_bytes[1]);
    assert_eq!(swapped_bytes[1], native_bytes[0]);
}

/// Test misaligned storage.
#[test]
fn test_misaligned_layout() {
    let array = HostArray::from_vec(vec![1.5f64, 2.5], &[2]).unwrap();
    let misaligned = array.misaligned().unwrap();
    assert!(!misaligned.is_aligned());
    assert!(misaligned.is_c_contiguous());
    assert_eq!(misaligned.to_f64_vec().unwrap(), vec![1.5, 2.5]);
}

/// Test column-major storage.
#[test]
fn test_fortran_layout() {
    let array = HostArray::from_vec(vec![1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
    let fortran = array.fortran_ordered().unwrap();
    assert!(!fortran.is_c_contiguous());
    assert_eq!(fortran.strides(), vec![8, 16]);
    assert_eq!(fortran.to_f64_vec().unwrap(), array.to_f64_vec().unwrap());
    assert_eq!(fortran.get(&[1, 0]).unwrap(), Scalar::Float(4.0));
}

/// Test read-only arrays reject host writes.
#[test]
fn test_read_only_rejects_set() {
    let array = HostArray::from_vec(vec![1.0f64, 2.0], &[2]).unwrap().read_only();
    assert!(!array.is_writeable());
    let err = array.set(&[0], Scalar::Float(9.0)).unwrap_err();
    assert_eq!(
        err,
        BindError::TypeMismatch("assignment destination is read-only".into())
    );
    assert_eq!(array.to_f64_vec().unwrap(), vec![1.0, 2.0]);
}

/// Test identity and reference counting.
#[test]
fn test_identity() {
    let a = HostArray::from_f64(&[1.0, 2.0]);
    let b = a.clone();
    let c = a.copy_as(DType::Float64).unwrap();

    assert!(a.same_storage(&b));
    assert!(!a.same_storage(&c));
    assert_eq!(a.reference_count(), 2);
    assert_eq!(c.to_f64_vec().unwrap(), a.to_f64_vec().unwrap());
}

/// Test casting copies.
#[test]
fn test_copy_as_casts() {
    let array = HostArray::from_vec(vec![1.9f64, -2.9, 300.0], &[3]).unwrap();
    let cast = array.copy_as(DType::Int16).unwrap();
    assert_eq!(cast.dtype(), DType::Int16);
    assert_eq!(cast.to_vec::<i16>().unwrap(), vec![1, -2, 300]);
}

// ============================================================================
// Value Conversion Tests
// ============================================================================

/// Test nested sequence conversion and promotion.
#[test]
fn test_from_host_value_nested() {
    let value = HostValue::List(vec![
        HostValue::List(vec![HostValue::Int(1), HostValue::Float(2.5)]),
        HostValue::List(vec![HostValue::Bool(true), HostValue::Int(4)]),
    ]);
    let array = HostArray::from_host_value(&value).unwrap();
    assert_eq!(array.shape(), vec![2, 2]);
    assert_eq!(array.dtype(), DType::Float64);
    assert_eq!(array.to_f64_vec().unwrap(), vec![1.0, 2.5, 1.0, 4.0]);
}

/// Test that ragged sequences are rejected.
#[test]
fn test_from_host_value_ragged() {
    let value = HostValue::List(vec![ints(&[1, 2]), ints(&[3])]);
    let err = HostArray::from_host_value(&value).unwrap_err();
    assert!(matches!(err, BindError::ConversionError(_)));

    let value = HostValue::List(vec![HostValue::Int(1), ints(&[2])]);
    assert!(HostArray::from_host_value(&value).is_err());
}

/// Test that arrays convert to themselves and strings do not convert.
#[test]
fn test_from_host_value_identity_and_rejection() {
    let array = HostArray::from_f64(&[1.0]);
    let same = HostArray::from_host_value(&array.clone().into()).unwrap();
    assert!(same.same_storage(&array));

    let err = HostArray::from_host_value(&HostValue::from("abc")).unwrap_err();
    assert!(matches!(err, BindError::ConversionError(_)));
}

/// Test numeric conversions of host values.
#[test]
fn test_value_as_f64() {
    assert_relative_eq!(HostValue::Int(3).as_f64().unwrap(), 3.0);
    assert_relative_eq!(HostValue::Float(-0.5).as_f64().unwrap(), -0.5);
    assert_relative_eq!(
        HostValue::from(HostArray::from_f64(&[7.0])).as_f64().unwrap(),
        7.0
    );

    let err = HostValue::from("x").as_f64().unwrap_err();
    assert_eq!(err, BindError::TypeMismatch("must be real number, not str".into()));
    assert!(HostValue::from(HostArray::from_f64(&[1.0, 2.0])).as_f64().is_err());
}

/// Test index conversions reject floats.
#[test]
fn test_value_as_index() {
    assert_eq!(HostValue::Int(-4).as_index().unwrap(), -4);
    assert_eq!(HostValue::Bool(true).as_index().unwrap(), 1);
    assert!(matches!(
        HostValue::Float(1.0).as_index(),
        Err(BindError::TypeMismatch(_))
    ));
}

/// Test type names used in error messages.
#[test]
fn test_value_type_names() {
    assert_eq!(HostValue::None.type_name(), "NoneType");
    assert_eq!(HostValue::Dict(Keywords::new()).type_name(), "dict");
    assert_eq!(ints(&[1]).type_name(), "tuple");
    assert!(HostValue::default().is_none());
}

// ============================================================================
// Sequence Materialization Tests
// ============================================================================

/// Test an empty sequence materializes to length zero.
#[test]
fn test_materialize_empty() {
    let seq = IntSequence::materialize(&HostValue::Tuple(vec![])).unwrap();
    assert_eq!(seq.len(), 0);
    assert!(seq.is_empty());
}

/// Test a populated sequence preserves order and values.
#[test]
fn test_materialize_values() {
    let seq = IntSequence::materialize(&ints(&[3, -1, 0, 7])).unwrap();
    assert_eq!(seq.as_slice(), &[3, -1, 0, 7]);

    let list = HostValue::List(vec![
        HostValue::Bool(true),
        HostValue::Float(2.0),
        HostValue::from(HostArray::scalar(Scalar::Int(5))),
    ]);
    let seq = IntSequence::materialize(&list).unwrap();
    assert_eq!(seq.into_vec(), vec![1, 2, 5]);
}

/// Test scalars and integer arrays.
#[test]
fn test_materialize_scalar_and_array() {
    let seq = IntSequence::materialize(&HostValue::Int(4)).unwrap();
    assert_eq!(&*seq, &[4]);

    let array = HostArray::from_vec(vec![2i32, 4, 6], &[3]).unwrap();
    let seq = IntSequence::materialize(&array.into()).unwrap();
    assert_eq!(&*seq, &[2, 4, 6]);
}

/// Test rejected inputs.
///
/// Verifies that fractional floats, strings, nested sequences and float
/// arrays all fail with a conversion error.
#[test]
fn test_materialize_rejections() {
    let cases = vec![
        HostValue::Tuple(vec![HostValue::Float(1.5)]),
        HostValue::Tuple(vec![HostValue::from("a")]),
        HostValue::Tuple(vec![ints(&[1, 2])]),
        HostValue::from(HostArray::from_f64(&[1.0, 2.0])),
        HostValue::from(HostArray::from_vec(vec![1i64, 2, 3, 4], &[2, 2]).unwrap()),
        HostValue::from("12"),
    ];
    for case in cases {
        let err = IntSequence::materialize(&case).unwrap_err();
        assert!(
            matches!(err, BindError::ConversionError(_)),
            "{case:?} should be a conversion error, got {err:?}"
        );
    }
}

/// Test boolean items and boolean arrays count as integers.
#[test]
fn test_materialize_bools() {
    let tuple = HostValue::Tuple(vec![HostValue::Bool(true), HostValue::Bool(false)]);
    assert_eq!(IntSequence::materialize(&tuple).unwrap().as_slice(), &[1, 0]);

    let array = HostArray::from_bools(&[false, true, true], &[3]).unwrap();
    assert_eq!(IntSequence::materialize(&array.into()).unwrap().as_slice(), &[0, 1, 1]);

    let flag = IntSequence::materialize(&HostValue::Bool(true)).unwrap();
    assert_eq!(flag.as_slice(), &[1]);
}

// ============================================================================
// Resource Handle Tests
// ============================================================================

/// Test payload access by kind.
#[test]
fn test_handle_payload_access() {
    let handle = ResourceHandle::new("test.counter", 41u32);
    let value = handle
        .with_payload::<u32, _>("test.counter", |v| {
            *v += 1;
            *v
        })
        .unwrap();
    assert_eq!(value, 42);
    assert_eq!(handle.kind(), "test.counter");

    let err = handle.with_payload::<u32, _>("test.other", |v| *v).unwrap_err();
    assert!(matches!(err, BindError::TypeMismatch(_)));
}

/// Test the destructor runs once on explicit release.
#[test]
fn test_handle_release_once() {
    let runs = Rc::new(Cell::new(0));
    let counter = Rc::clone(&runs);
    let handle = ResourceHandle::with_destructor("test.vec", vec![1, 2, 3], move |v: Vec<i32>| {
        assert_eq!(v, vec![1, 2, 3]);
        counter.set(counter.get() + 1);
    });
    let alias = handle.clone();
    assert!(handle.same_resource(&alias));

    assert!(handle.release());
    assert!(!alias.release(), "Second release should report nothing to do");
    assert!(alias.is_released());
    drop(handle);
    drop(alias);
    assert_eq!(runs.get(), 1);
}

/// Test the destructor runs when the last reference drops.
#[test]
fn test_handle_drop_runs_destructor() {
    let runs = Rc::new(Cell::new(0));
    let counter = Rc::clone(&runs);
    let handle = ResourceHandle::with_destructor("test.unit", (), move |()| {
        counter.set(counter.get() + 1);
    });
    let alias = handle.clone();
    drop(handle);
    assert_eq!(runs.get(), 0, "Live alias should keep the resource alive");
    drop(alias);
    assert_eq!(runs.get(), 1);
}

/// Test access after release.
#[test]
fn test_handle_use_after_release() {
    let handle = ResourceHandle::new("test.counter", 0u8);
    handle.release();
    let err = handle.with_payload::<u8, _>("test.counter", |v| *v).unwrap_err();
    assert_eq!(err, BindError::ReleasedResource("test.counter"));
}

// ============================================================================
// Capsule Tests
// ============================================================================

/// Test capsule accessors.
#[test]
fn test_capsule_accessors() {
    let mut context = 5i32;
    let context_ptr = (&mut context as *mut i32).cast::<c_void>();
    let pointer = test_capsule_accessors as fn() as *const c_void;
    // SAFETY: the capsule is only inspected, never called.
    let capsule = unsafe { Capsule::new(pointer, context_ptr, Some("void (void)")) };

    assert_eq!(capsule.pointer(), pointer);
    assert_eq!(capsule.context(), context_ptr);
    assert_eq!(capsule.name(), Some("void (void)"));
    assert_eq!(HostValue::from(capsule).type_name(), "PyCapsule");
}

// ============================================================================
// ndarray Interop Tests
// ============================================================================

/// Test conversion from and back to `ndarray` keeps shape and values.
#[cfg(feature = "ndarray")]
#[test]
fn test_ndarray_roundtrip() {
    use ndarray::{arr2, Array3, IxDyn};

    let source = arr2(&[[1.0_f64, 2.0, 3.0], [4.0, 5.0, 6.0]]);
    let array = HostArray::from_ndarray(&source).unwrap();
    assert_eq!(array.dtype(), DType::Float64);
    assert_eq!(array.shape(), vec![2, 3]);
    assert!(array.is_c_contiguous());
    assert_eq!(array.get(&[1, 0]).unwrap(), Scalar::Float(4.0));

    let back = array.to_ndarray::<f64>().unwrap();
    assert_eq!(back.shape(), &[2, 3]);
    assert_eq!(back, source.into_dyn());

    // A transposed source is copied in logical order.
    let cube = Array3::from_shape_fn((2, 2, 2), |(i, j, k)| (i * 4 + j * 2 + k) as i32);
    let transposed = cube.t();
    let array = HostArray::from_ndarray(&transposed).unwrap();
    assert_eq!(array.dtype(), DType::Int32);
    let back = array.to_ndarray::<i32>().unwrap();
    assert_eq!(back, transposed.to_owned().into_dyn());
    assert_eq!(back[IxDyn(&[1, 0, 0])], 1);
}

/// Test conversion to `ndarray` casts through the requested element type.
#[cfg(feature = "ndarray")]
#[test]
fn test_ndarray_cast_from_fortran() {
    let grid = HostArray::from_vec(vec![1i16, 2, 3, 4, 5, 6], &[2, 3]).unwrap();
    let fortran = grid.fortran_ordered().unwrap();
    let back = fortran.to_ndarray::<f64>().unwrap();
    assert_eq!(back.shape(), &[2, 3]);
    assert_eq!(back.iter().copied().collect::<Vec<_>>(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
}
