//! Tests for the engine seam: parameter codes, validation and request frames.
//!
//! These tests verify the machinery shared by every boundary operation:
//! - Extend mode, distance metric and Fourier kernel codes
//! - Scalar and shape argument validation
//! - Request frames: duplicate outputs, commit, discard
//! - Outcome resolution between engine status and parked callback errors
//!
//! ## Test Organization
//!
//! 1. **Parameter Codes** - Round trips and rejected codes
//! 2. **Validator** - Axes, sizes, orders, origins, footprints
//! 3. **Request Frames** - Binding, duplicate detection, release
//! 4. **Outcome Resolution** - `engine_error` and `settle`

use ndbind::internals::callback::negotiator::{Filter, KernelBinding};
use ndbind::internals::engine::executor::{engine_error, settle, RequestFrame};
use ndbind::internals::engine::mode::{DistanceMetric, ExtendMode, FourierKernel};
use ndbind::internals::engine::traits::EngineError;
use ndbind::internals::engine::validator::{Validator, MAX_SPLINE_ORDER};
use ndbind::internals::host::array::HostArray;
use ndbind::internals::host::sequence::IntSequence;
use ndbind::internals::host::value::{HostValue, Keywords};
use ndbind::internals::primitives::errors::{BindError, HostError};
use ndbind::internals::primitives::flags::Requirements;

// ============================================================================
// Helper Functions
// ============================================================================

fn frame(operation: &'static str) -> RequestFrame {
    RequestFrame::new(
        operation,
        Requirements::DEFAULT | Requirements::C_CONTIGUOUS,
        Requirements::DEFAULT | Requirements::C_CONTIGUOUS,
    )
}

fn failing_kernel() -> KernelBinding<Filter> {
    let kernel = HostValue::callable(
        |_args: &[HostValue], _kw: &Keywords| -> Result<HostValue, HostError> {
            Err(HostError::new("RuntimeError", "window rejected"))
        },
    );
    KernelBinding::<Filter>::negotiate(
        &kernel,
        &HostValue::Tuple(vec![]),
        &HostValue::Dict(Keywords::new()),
    )
    .unwrap()
}

// ============================================================================
// Parameter Code Tests
// ============================================================================

/// Test extend mode codes round trip.
#[test]
fn test_extend_mode_codes() {
    for code in 0..=6 {
        let mode = ExtendMode::try_from(code).unwrap();
        assert_eq!(mode.code(), code);
    }
    assert_eq!(ExtendMode::default(), ExtendMode::Reflect);
    assert_eq!(ExtendMode::GridConstant.to_string(), "grid-constant");
}

/// Test unknown codes are invalid arguments.
#[test]
fn test_unknown_codes_rejected() {
    assert_eq!(
        ExtendMode::try_from(7).unwrap_err(),
        BindError::InvalidArgument("boundary mode 7 not supported".into())
    );
    assert!(matches!(
        DistanceMetric::try_from(0),
        Err(BindError::InvalidArgument(_))
    ));
    assert!(matches!(
        FourierKernel::try_from(-1),
        Err(BindError::InvalidArgument(_))
    ));
}

/// Test metric and Fourier kernel codes.
#[test]
fn test_metric_and_kernel_codes() {
    assert_eq!(DistanceMetric::try_from(1).unwrap(), DistanceMetric::Euclidean);
    assert_eq!(DistanceMetric::Chessboard.code(), 3);
    assert_eq!(FourierKernel::try_from(2).unwrap(), FourierKernel::Ellipsoid);
    assert_eq!(FourierKernel::Gaussian.code(), 0);
}

// ============================================================================
// Validator Tests
// ============================================================================

/// Test axis normalization.
#[test]
fn test_validate_axis() {
    assert_eq!(Validator::validate_axis(0, 3).unwrap(), 0);
    assert_eq!(Validator::validate_axis(-1, 3).unwrap(), 2);
    assert_eq!(Validator::validate_axis(-3, 3).unwrap(), 0);
    assert!(matches!(
        Validator::validate_axis(3, 3),
        Err(BindError::InvalidArgument(_))
    ));
    assert!(Validator::validate_axis(-4, 3).is_err());
    assert!(Validator::validate_axis(0, 0).is_err(), "Rank 0 has no axes");
}

/// Test filter size and spline order limits.
#[test]
fn test_validate_sizes_and_orders() {
    assert_eq!(Validator::validate_filter_size(1).unwrap(), 1);
    assert!(Validator::validate_filter_size(0).is_err());
    assert!(Validator::validate_filter_size(-2).is_err());

    assert_eq!(Validator::validate_spline_order(0).unwrap(), 0);
    assert_eq!(
        Validator::validate_spline_order(MAX_SPLINE_ORDER).unwrap(),
        MAX_SPLINE_ORDER as u32
    );
    assert!(Validator::validate_spline_order(MAX_SPLINE_ORDER + 1).is_err());
    assert!(Validator::validate_spline_order(-1).is_err());
}

/// Test label count clamping.
#[test]
fn test_validate_max_label() {
    assert_eq!(Validator::validate_max_label(4), 4);
    assert_eq!(Validator::validate_max_label(0), 0);
    assert_eq!(Validator::validate_max_label(-3), 0);
}

/// Test origin and footprint rank checks.
#[test]
fn test_validate_origins_and_footprints() {
    let origins = IntSequence::from_slice(&[0, 1]);
    assert!(Validator::validate_origins(&origins, 2).is_ok());
    assert!(matches!(
        Validator::validate_origins(&origins, 3),
        Err(BindError::ShapeMismatch(_))
    ));

    let mut frame = frame("validate");
    let footprint = frame
        .input(&HostArray::from_bools(&[true; 9], &[3, 3]).unwrap().into())
        .unwrap();
    assert!(Validator::validate_footprint(frame.view(footprint), 2, "footprint").is_ok());
    let err = Validator::validate_footprint(frame.view(footprint), 1, "footprint").unwrap_err();
    assert!(matches!(&err, BindError::ShapeMismatch(msg) if msg.starts_with("footprint")));
}

/// Test output shape matching.
#[test]
fn test_validate_same_shape() {
    let mut frame = frame("validate");
    let a = frame.input(&HostArray::from_f64(&[1.0, 2.0]).into()).unwrap();
    let b = frame.input(&HostArray::from_f64(&[1.0, 2.0, 3.0]).into()).unwrap();
    assert!(Validator::validate_same_shape(frame.view(a), frame.view(a)).is_ok());
    assert!(Validator::validate_same_shape(frame.view(a), frame.view(b)).is_err());
}

/// Test builder configuration checks.
#[test]
fn test_validate_builder_configuration() {
    assert!(Validator::validate_output_requirements(Requirements::DEFAULT).is_ok());
    assert!(matches!(
        Validator::validate_output_requirements(Requirements::ENSURECOPY),
        Err(BindError::InvalidArgument(_))
    ));
    assert!(Validator::validate_no_duplicates(None).is_ok());
    assert_eq!(
        Validator::validate_no_duplicates(Some("engine")).unwrap_err(),
        BindError::DuplicateParameter { parameter: "engine" }
    );
}

// ============================================================================
// Request Frame Tests
// ============================================================================

/// Test binding order and optional arguments.
#[test]
fn test_frame_bindings() {
    let mut frame = frame("correlate");
    assert!(frame.is_empty());
    let input = frame.input(&HostArray::from_f64(&[1.0]).into()).unwrap();
    let absent = frame.optional_input(&HostValue::None).unwrap();
    let output = frame.output(&HostArray::from_f64(&[0.0]).into()).unwrap();

    assert_eq!(frame.operation(), "correlate");
    assert_eq!(frame.len(), 2);
    assert!(absent.is_none());
    assert!(frame.optional_view(absent).is_none());
    assert!(!frame.view(input).is_writeable());
    assert!(frame.view(output).is_writeable());
}

/// Test that one array cannot be bound to two outputs.
#[test]
fn test_frame_rejects_duplicate_output() {
    let array = HostArray::from_f64(&[0.0, 0.0]);
    let mut frame = frame("distance_transform_bf");
    frame.output(&array.clone().into()).unwrap();

    let err = frame.output(&array.clone().into()).unwrap_err();
    assert_eq!(
        err,
        BindError::TypeMismatch(
            "distance_transform_bf: the same array is bound to more than one output".into()
        )
    );
    assert!(frame.inout(&array.clone().into()).is_err());
}

/// Test that a staged output is also detected as a duplicate.
#[test]
fn test_frame_rejects_duplicate_staged_output() {
    let array = HostArray::from_f64(&[0.0, 0.0]).byteswapped().unwrap();
    let mut frame = frame("op");
    let id = frame.output(&array.clone().into()).unwrap();
    assert!(!frame.view(id).same_storage(&array));
    assert!(frame.output(&array.clone().into()).is_err());
}

/// Test that an array may be both an input and an output.
#[test]
fn test_frame_allows_input_aliasing_output() {
    let array = HostArray::from_f64(&[1.0, 2.0]);
    let mut frame = frame("op");
    frame.input(&array.clone().into()).unwrap();
    assert!(frame.output(&array.clone().into()).is_ok());
}

/// Test that success commits staged outputs.
#[test]
fn test_frame_finish_commits() {
    let array = HostArray::from_f64(&[0.0, 0.0]).byteswapped().unwrap();
    let mut frame = frame("op");
    let id = frame.output(&array.clone().into()).unwrap();
    frame.view(id).assign_f64(&[4.0, 5.0]).unwrap();

    let value = frame.finish(Ok(17)).unwrap();
    assert_eq!(value, 17);
    assert_eq!(array.to_f64_vec().unwrap(), vec![4.0, 5.0]);
    assert!(array.is_writeable());
}

/// Test that failure discards staged outputs.
#[test]
fn test_frame_finish_discards() {
    let array = HostArray::from_f64(&[1.0, 2.0]).misaligned().unwrap();
    let mut frame = frame("op");
    let id = frame.inout(&array.clone().into()).unwrap();
    frame.view(id).assign_f64(&[9.0, 9.0]).unwrap();

    let err = frame
        .finish::<()>(Err(BindError::Engine("boom".into())))
        .unwrap_err();
    assert_eq!(err, BindError::Engine("boom".into()));
    assert_eq!(array.to_f64_vec().unwrap(), vec![1.0, 2.0]);
    assert!(array.is_writeable());
}

/// Test that an early argument error leaves earlier outputs untouched.
#[test]
fn test_frame_drop_discards() {
    let array = HostArray::from_f64(&[1.0]).byteswapped().unwrap();
    let result = (|| -> Result<(), BindError> {
        let mut frame = frame("op");
        frame.output(&array.clone().into())?;
        assert!(!array.is_writeable());
        frame.input(&HostValue::from("not an array"))?;
        frame.finish(Ok(()))
    })();
    assert!(matches!(result, Err(BindError::ConversionError(_))));
    assert!(array.is_writeable());
    assert_eq!(array.to_f64_vec().unwrap(), vec![1.0]);
}

// ============================================================================
// Outcome Resolution Tests
// ============================================================================

/// Test engine error translation.
#[test]
fn test_engine_error_translation() {
    assert_eq!(
        engine_error(EngineError::Unsupported("rank_filter")),
        BindError::Engine("rank_filter is not supported by this engine".into())
    );
    assert_eq!(
        engine_error(EngineError::failed("out of memory")),
        BindError::Engine("out of memory".into())
    );
    assert_eq!(
        engine_error(EngineError::KernelFailed),
        BindError::CallbackFailed("kernel".into())
    );
}

/// Test a kernel failure without a parked error names the family.
#[test]
fn test_settle_kernel_failed() {
    let err = settle::<(), Filter>(Err(EngineError::KernelFailed), None).unwrap_err();
    assert_eq!(err, BindError::CallbackFailed("filter".into()));
    assert_eq!(settle::<u8, Filter>(Ok(3), None).unwrap(), 3);
}

/// Test that a parked host error takes precedence.
///
/// Verifies precedence both over an engine failure and over an engine
/// that ignored the failure status.
#[test]
fn test_settle_parked_error_wins() {
    let mut kernel = failing_kernel();
    assert_eq!(kernel.native().invoke(&[1.0]), None);
    let err = settle(Ok(()), Some(&mut kernel)).unwrap_err();
    assert_eq!(
        err,
        BindError::HostCallableFailure(HostError::new("RuntimeError", "window rejected"))
    );

    let mut kernel = failing_kernel();
    assert_eq!(kernel.native().invoke(&[1.0]), None);
    let err = settle::<(), _>(Err(EngineError::KernelFailed), Some(&mut kernel)).unwrap_err();
    assert!(matches!(err, BindError::HostCallableFailure(_)));
}
