//! # ndbind: the host boundary of an n-dimensional image processing engine
//!
//! A numerical engine for n-dimensional image processing (filters,
//! interpolation, morphology, measurements) works on raw typed buffers and
//! plain C function pointers. Its callers hold dynamically typed host values:
//! arrays of any layout, nested sequences, capsules wrapping native
//! functions, and callables. This crate is the layer in between.
//!
//! ## What it does
//!
//! - **Adapts arrays**: borrows a caller's array when it already satisfies
//!   the engine's type and layout requirements, and otherwise stages it
//!   through a conforming temporary that is written back on success.
//! - **Negotiates kernels**: turns a pluggable kernel object into exactly one
//!   function pointer and one context pointer, whether it is a native
//!   function with a signature label, an unlabeled one, or a host callable.
//! - **Carries worklists**: hands native state from one erosion pass to the
//!   next through a tagged, reference-counted handle.
//!
//! ## Quick Start
//!
//! ```rust
//! use ndbind::prelude::*;
//!
//! // A minimal engine: a box filter of any size that copies its input.
//! struct Passthrough;
//!
//! impl Engine for Passthrough {
//!     fn uniform_filter1d(
//!         &mut self,
//!         input: &ArrayView,
//!         _filter_size: usize,
//!         _axis: usize,
//!         output: &ArrayView,
//!         _mode: ExtendMode,
//!         _cval: f64,
//!         _origin: isize,
//!     ) -> EngineResult {
//!         input
//!             .to_f64_vec()
//!             .and_then(|values| output.assign_f64(&values))
//!             .map_err(|err| EngineError::failed(err.to_string()))
//!     }
//! }
//!
//! let mut bridge = NdBind::new().engine(Passthrough).build()?;
//!
//! let input = HostArray::from_vec(vec![1.0_f64, 2.0, 3.0], &[3])?;
//! let output = HostArray::try_zeros(DType::Float64, &[3])?.byteswapped()?;
//!
//! // The output is byte-swapped, so it is staged through a native temporary...
//! bridge.uniform_filter1d(
//!     &input.into(),
//!     3,
//!     -1,
//!     &output.clone().into(),
//!     ExtendMode::Reflect,
//!     0.0,
//!     0,
//! )?;
//!
//! // ...and written back after the engine succeeded.
//! assert_eq!(output.to_f64_vec()?, vec![1.0, 2.0, 3.0]);
//! # Result::<(), BindError>::Ok(())
//! ```
//!
//! ### Result and Error Handling
//!
//! Every operation returns `Result<_, BindError>`. When any step fails
//! (argument conversion, negotiation, a host callback, or the engine), no
//! output temporary is written back and every caller array keeps its
//! contents and writability.
//!
//! ## Pluggable kernels
//!
//! `generic_filter1d`, `generic_filter` and `geometric_transform` accept a
//! kernel object. A host callable is wrapped by a native thunk:
//!
//! ```rust
//! use ndbind::prelude::*;
//!
//! let sum = HostValue::callable(
//!     |args: &[HostValue], _kw: &Keywords| -> Result<HostValue, HostError> {
//!         let window = match &args[0] {
//!             HostValue::Array(window) => window
//!                 .to_f64_vec()
//!                 .map_err(|err| HostError::new("BufferError", err.to_string()))?,
//!             _ => return Err(HostError::new("TypeError", "expected an array")),
//!         };
//!         Ok(HostValue::Float(window.iter().sum()))
//!     },
//! );
//! assert_eq!(sum.type_name(), "function");
//! ```
//!
//! ## License
//!
//! See the repository for license information and contribution guidelines.

// Layer 1: Primitives - element types, flags, errors and buffers.
mod primitives;

// Layer 2: Host - the dynamically typed host value model.
mod host;

// Layer 3: Binding - array adaptation and write-back.
mod binding;

// Layer 4: Callback - kernel negotiation and host thunks.
mod callback;

// Layer 5: Resource - native state carried between calls.
mod resource;

// Layer 6: Engine - the numerical engine seam and request frames.
mod engine;

// Layer 7: API - the builder, the bridge and its operations.
mod api;
mod operations;

// Standard ndbind prelude.
pub mod prelude {
    pub use crate::api::{
        BridgeBuilder as NdBind, Bridge, DistanceMetric, Engine, EngineError, EngineResult,
        ErosionOutcome, ExtendMode, FourierKernel, HostValue, ObjectSlices, WorklistHandle,
    };
    pub use crate::binding::view::ArrayView;
    pub use crate::callback::negotiator::{Filter, Filter1D, Map, NativeKernel};
    pub use crate::host::array::HostArray;
    pub use crate::host::callable::HostCallable;
    pub use crate::host::capsule::Capsule;
    pub use crate::host::sequence::IntSequence;
    pub use crate::host::value::Keywords;
    pub use crate::primitives::dtype::{DType, Element, Scalar};
    pub use crate::primitives::errors::{BindError, BindResult, HostError};
    pub use crate::primitives::flags::Requirements;
    pub use crate::resource::worklist::CoordinateQueue;
}

// Internal modules for development and testing.
//
// This module re-exports every layer so that integration tests and
// benchmarks can reach types below the public API.
#[doc(hidden)]
pub mod internals {
    pub mod primitives {
        pub use crate::primitives::*;
    }
    pub mod host {
        pub use crate::host::*;
    }
    pub mod binding {
        pub use crate::binding::*;
    }
    pub mod callback {
        pub use crate::callback::*;
    }
    pub mod resource {
        pub use crate::resource::*;
    }
    pub mod engine {
        pub use crate::engine::*;
    }
    pub mod api {
        pub use crate::api::*;
    }
}
