//! The numerical engine seam.
//!
//! ## Purpose
//!
//! This module defines the [`Engine`] trait: one method per boundary
//! operation, each receiving only adapted views, materialized integer
//! sequences, negotiated native kernels, and plain scalars. The numerical
//! work itself lives behind this trait.
//!
//! ## Design notes
//!
//! * **Opt-in operations**: Every method has a default body that reports the
//!   operation as unsupported, so an engine implements only what it provides.
//! * **No host values**: Nothing the engine receives refers to a host object;
//!   the boundary has already converted, validated, and negotiated.
//! * **Plain status**: The engine reports success or an [`EngineError`]; the
//!   request that called it decides what reaches the caller.
//!
//! ## Invariants
//!
//! * Axis arguments are already normalized into `0..rank`.
//! * Origin sequences have exactly one entry per input axis.
//! * Output views are writable; input views are not.

// External dependencies
use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

// Internal dependencies
use crate::binding::view::ArrayView;
use crate::callback::negotiator::{Filter, Filter1D, Map, NativeKernel};
use crate::engine::mode::{DistanceMetric, ExtendMode, FourierKernel};
use crate::host::sequence::IntSequence;
use crate::resource::worklist::CoordinateQueue;

// ============================================================================
// Engine Error
// ============================================================================

/// Failure reported by an engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The engine does not implement the named operation.
    Unsupported(&'static str),

    /// A native kernel returned its failure status.
    KernelFailed,

    /// Any other engine failure.
    Failed(String),
}

impl EngineError {
    /// Shorthand for [`EngineError::Failed`].
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Unsupported(operation) => {
                write!(f, "{operation} is not supported by this engine")
            }
            Self::KernelFailed => f.write_str("kernel reported failure"),
            Self::Failed(message) => f.write_str(message),
        }
    }
}

impl Error for EngineError {}

/// Result alias for engine methods.
pub type EngineResult<T = ()> = Result<T, EngineError>;

// ============================================================================
// Engine Trait
// ============================================================================

/// Numerical kernels reached through the boundary.
#[allow(unused_variables)]
pub trait Engine {
    // ========================================================================
    // Filters
    // ========================================================================

    /// 1-D correlation of `input` with `weights` along `axis`.
    #[allow(clippy::too_many_arguments)]
    fn correlate1d(
        &mut self,
        input: &ArrayView,
        weights: &ArrayView,
        axis: usize,
        output: &ArrayView,
        mode: ExtendMode,
        cval: f64,
        origin: isize,
    ) -> EngineResult {
        Err(EngineError::Unsupported("correlate1d"))
    }

    /// n-D correlation of `input` with `weights`.
    fn correlate(
        &mut self,
        input: &ArrayView,
        weights: &ArrayView,
        output: &ArrayView,
        mode: ExtendMode,
        cval: f64,
        origins: &IntSequence,
    ) -> EngineResult {
        Err(EngineError::Unsupported("correlate"))
    }

    /// 1-D box filter of `filter_size` samples along `axis`.
    #[allow(clippy::too_many_arguments)]
    fn uniform_filter1d(
        &mut self,
        input: &ArrayView,
        filter_size: usize,
        axis: usize,
        output: &ArrayView,
        mode: ExtendMode,
        cval: f64,
        origin: isize,
    ) -> EngineResult {
        Err(EngineError::Unsupported("uniform_filter1d"))
    }

    /// 1-D minimum (or maximum) filter along `axis`.
    #[allow(clippy::too_many_arguments)]
    fn min_or_max_filter1d(
        &mut self,
        input: &ArrayView,
        filter_size: usize,
        axis: usize,
        output: &ArrayView,
        mode: ExtendMode,
        cval: f64,
        origin: isize,
        minimum: bool,
    ) -> EngineResult {
        Err(EngineError::Unsupported("min_or_max_filter1d"))
    }

    /// n-D minimum (or maximum) filter over `footprint`, optionally grey-weighted by `structure`.
    #[allow(clippy::too_many_arguments)]
    fn min_or_max_filter(
        &mut self,
        input: &ArrayView,
        footprint: &ArrayView,
        structure: Option<&ArrayView>,
        output: &ArrayView,
        mode: ExtendMode,
        cval: f64,
        origins: &IntSequence,
        minimum: bool,
    ) -> EngineResult {
        Err(EngineError::Unsupported("min_or_max_filter"))
    }

    /// n-D rank filter selecting the `rank`-th value under `footprint`.
    #[allow(clippy::too_many_arguments)]
    fn rank_filter(
        &mut self,
        input: &ArrayView,
        rank: isize,
        footprint: &ArrayView,
        output: &ArrayView,
        mode: ExtendMode,
        cval: f64,
        origins: &IntSequence,
    ) -> EngineResult {
        Err(EngineError::Unsupported("rank_filter"))
    }

    /// 1-D filter whose per-line work is done by `kernel`.
    #[allow(clippy::too_many_arguments)]
    fn generic_filter1d(
        &mut self,
        input: &ArrayView,
        kernel: NativeKernel<Filter1D>,
        filter_size: usize,
        axis: usize,
        output: &ArrayView,
        mode: ExtendMode,
        cval: f64,
        origin: isize,
    ) -> EngineResult {
        Err(EngineError::Unsupported("generic_filter1d"))
    }

    /// n-D filter whose per-window reduction is done by `kernel`.
    #[allow(clippy::too_many_arguments)]
    fn generic_filter(
        &mut self,
        input: &ArrayView,
        kernel: NativeKernel<Filter>,
        footprint: &ArrayView,
        output: &ArrayView,
        mode: ExtendMode,
        cval: f64,
        origins: &IntSequence,
    ) -> EngineResult {
        Err(EngineError::Unsupported("generic_filter"))
    }

    // ========================================================================
    // Fourier
    // ========================================================================

    /// Multiply a Fourier-domain array by a Gaussian, box, or ellipsoid kernel.
    fn fourier_filter(
        &mut self,
        input: &ArrayView,
        parameters: &ArrayView,
        n: isize,
        axis: usize,
        output: &ArrayView,
        kernel: FourierKernel,
    ) -> EngineResult {
        Err(EngineError::Unsupported("fourier_filter"))
    }

    /// Apply a phase shift to a Fourier-domain array.
    fn fourier_shift(
        &mut self,
        input: &ArrayView,
        shifts: &ArrayView,
        n: isize,
        axis: usize,
        output: &ArrayView,
    ) -> EngineResult {
        Err(EngineError::Unsupported("fourier_shift"))
    }

    // ========================================================================
    // Interpolation
    // ========================================================================

    /// Spline prefilter of `order` along `axis`.
    fn spline_filter1d(
        &mut self,
        input: &ArrayView,
        order: u32,
        axis: usize,
        output: &ArrayView,
    ) -> EngineResult {
        Err(EngineError::Unsupported("spline_filter1d"))
    }

    /// Resample `input` through a mapping kernel, explicit coordinates, or an affine matrix.
    #[allow(clippy::too_many_arguments)]
    fn geometric_transform(
        &mut self,
        input: &ArrayView,
        mapping: Option<NativeKernel<Map>>,
        coordinates: Option<&ArrayView>,
        matrix: Option<&ArrayView>,
        shift: Option<&ArrayView>,
        output: &ArrayView,
        order: u32,
        mode: ExtendMode,
        cval: f64,
    ) -> EngineResult {
        Err(EngineError::Unsupported("geometric_transform"))
    }

    /// Zoom and/or shift `input` into `output`.
    #[allow(clippy::too_many_arguments)]
    fn zoom_shift(
        &mut self,
        input: &ArrayView,
        zoom: Option<&ArrayView>,
        shift: Option<&ArrayView>,
        output: &ArrayView,
        order: u32,
        mode: ExtendMode,
        cval: f64,
    ) -> EngineResult {
        Err(EngineError::Unsupported("zoom_shift"))
    }

    // ========================================================================
    // Measurements
    // ========================================================================

    /// Record the bounding box of every label up to `max_label`.
    ///
    /// `regions` holds `2 * rank` entries per label, pre-filled with `-1`:
    /// the `rank` start indices followed by the `rank` exclusive end indices.
    /// For rank-0 input it holds one entry per label, set non-negative when
    /// the label is present.
    fn find_objects(
        &mut self,
        input: &ArrayView,
        max_label: usize,
        regions: &mut [isize],
    ) -> EngineResult {
        Err(EngineError::Unsupported("find_objects"))
    }

    /// Watershed by image foresting transform from `markers`.
    fn watershed_ift(
        &mut self,
        input: &ArrayView,
        markers: &ArrayView,
        structure: &ArrayView,
        output: &ArrayView,
    ) -> EngineResult {
        Err(EngineError::Unsupported("watershed_ift"))
    }

    // ========================================================================
    // Distance transforms
    // ========================================================================

    /// Brute-force distance transform under `metric`.
    fn distance_transform_bf(
        &mut self,
        input: &ArrayView,
        metric: DistanceMetric,
        sampling: Option<&ArrayView>,
        distances: Option<&ArrayView>,
        features: Option<&ArrayView>,
    ) -> EngineResult {
        Err(EngineError::Unsupported("distance_transform_bf"))
    }

    /// Chamfer distance transform refining `distances` in place.
    fn distance_transform_op(
        &mut self,
        structure: &ArrayView,
        distances: &ArrayView,
        features: Option<&ArrayView>,
    ) -> EngineResult {
        Err(EngineError::Unsupported("distance_transform_op"))
    }

    /// Exact Euclidean feature transform.
    fn euclidean_feature_transform(
        &mut self,
        input: &ArrayView,
        sampling: Option<&ArrayView>,
        features: &ArrayView,
    ) -> EngineResult {
        Err(EngineError::Unsupported("euclidean_feature_transform"))
    }

    // ========================================================================
    // Morphology
    // ========================================================================

    /// One binary erosion pass. Returns whether any output element differs
    /// from its input. When `worklist` is given, the coordinates of changed
    /// elements are pushed onto it.
    #[allow(clippy::too_many_arguments)]
    fn binary_erosion(
        &mut self,
        input: &ArrayView,
        structure: &ArrayView,
        mask: Option<&ArrayView>,
        output: &ArrayView,
        border_value: i32,
        origins: &IntSequence,
        invert: bool,
        center_is_true: bool,
        worklist: Option<&mut CoordinateQueue>,
    ) -> EngineResult<bool> {
        Err(EngineError::Unsupported("binary_erosion"))
    }

    /// Further erosion passes over `array` in place, resuming from `worklist`.
    #[allow(clippy::too_many_arguments)]
    fn binary_erosion2(
        &mut self,
        array: &ArrayView,
        structure: &ArrayView,
        mask: Option<&ArrayView>,
        iterations: i32,
        origins: &IntSequence,
        invert: bool,
        worklist: &mut CoordinateQueue,
    ) -> EngineResult {
        Err(EngineError::Unsupported("binary_erosion2"))
    }
}
