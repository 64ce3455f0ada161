//! Enumerated engine parameters.
//!
//! ## Purpose
//!
//! This module gives names to the small integer codes the engine accepts for
//! boundary handling, distance metrics, and Fourier filter kernels.
//!
//! ## Design notes
//!
//! * **Stable codes**: Each variant's discriminant is the code the engine
//!   expects; `code()` returns it unchanged and `TryFrom<i32>` recovers it.
//! * **Checked at the boundary**: Unknown codes are rejected before any
//!   argument is adapted.

// External dependencies
use std::fmt::{Display, Formatter, Result as FmtResult};

// Internal dependencies
use crate::primitives::errors::BindError;

// ============================================================================
// Extend Mode
// ============================================================================

/// How values beyond the array edge are obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum ExtendMode {
    /// Repeat the edge value: `a a a | a b c d | d d d`.
    Nearest = 0,

    /// Wrap around to the opposite edge: `b c d | a b c d | a b c`.
    Wrap = 1,

    /// Reflect including the edge value: `c b a | a b c d | d c b`.
    #[default]
    Reflect = 2,

    /// Reflect about the edge value: `d c b | a b c d | c b a`.
    Mirror = 3,

    /// Use the constant value beyond the edge.
    Constant = 4,

    /// Periodic extension on the sample grid.
    GridWrap = 5,

    /// Constant value on the sample grid, also used for interpolation.
    GridConstant = 6,
}

impl ExtendMode {
    /// Integer code passed to the engine.
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for ExtendMode {
    type Error = BindError;

    fn try_from(code: i32) -> Result<Self, BindError> {
        Ok(match code {
            0 => Self::Nearest,
            1 => Self::Wrap,
            2 => Self::Reflect,
            3 => Self::Mirror,
            4 => Self::Constant,
            5 => Self::GridWrap,
            6 => Self::GridConstant,
            _ => {
                return Err(BindError::InvalidArgument(format!(
                    "boundary mode {code} not supported"
                )))
            }
        })
    }
}

impl Display for ExtendMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            Self::Nearest => "nearest",
            Self::Wrap => "wrap",
            Self::Reflect => "reflect",
            Self::Mirror => "mirror",
            Self::Constant => "constant",
            Self::GridWrap => "grid-wrap",
            Self::GridConstant => "grid-constant",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Distance Metric
// ============================================================================

/// Metric used by the brute-force distance transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum DistanceMetric {
    /// Straight-line distance.
    Euclidean = 1,

    /// Sum of absolute axis differences.
    CityBlock = 2,

    /// Largest absolute axis difference.
    Chessboard = 3,
}

impl DistanceMetric {
    /// Integer code passed to the engine.
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for DistanceMetric {
    type Error = BindError;

    fn try_from(code: i32) -> Result<Self, BindError> {
        match code {
            1 => Ok(Self::Euclidean),
            2 => Ok(Self::CityBlock),
            3 => Ok(Self::Chessboard),
            _ => Err(BindError::InvalidArgument(format!(
                "distance metric {code} not supported"
            ))),
        }
    }
}

// ============================================================================
// Fourier Kernel
// ============================================================================

/// Frequency-domain filter applied by the Fourier filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum FourierKernel {
    /// Gaussian kernel.
    Gaussian = 0,

    /// Box kernel.
    Uniform = 1,

    /// Ellipsoidal kernel.
    Ellipsoid = 2,
}

impl FourierKernel {
    /// Integer code passed to the engine.
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for FourierKernel {
    type Error = BindError;

    fn try_from(code: i32) -> Result<Self, BindError> {
        match code {
            0 => Ok(Self::Gaussian),
            1 => Ok(Self::Uniform),
            2 => Ok(Self::Ellipsoid),
            _ => Err(BindError::InvalidArgument(format!(
                "Fourier filter type {code} not supported"
            ))),
        }
    }
}
