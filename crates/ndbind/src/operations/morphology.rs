//! Binary erosion with a resumable worklist.
//!
//! ## Purpose
//!
//! `binary_erosion` runs one pass and can hand back the coordinates it
//! changed as a host-held [`WorklistHandle`]. `binary_erosion2` takes that
//! handle in a later, independent call and continues from it.
//!
//! ## Invariants
//!
//! * A worklist is created only when the first pass succeeded.
//! * A pass that fails does not count towards the worklist's passes.

// External dependencies
use tracing::debug;

// Internal dependencies
use crate::api::{Bridge, ErosionOutcome};
use crate::engine::executor::engine_error;
use crate::engine::traits::Engine;
use crate::engine::validator::Validator;
use crate::host::sequence::IntSequence;
use crate::host::value::HostValue;
use crate::primitives::errors::{BindError, BindResult};
use crate::resource::worklist::{CoordinateQueue, WorklistHandle};

impl<E: Engine> Bridge<E> {
    /// One binary erosion pass of `input` by `structure` into `output`.
    ///
    /// With `return_coordinates`, the result carries a worklist of the
    /// coordinates whose value changed.
    #[allow(clippy::too_many_arguments)]
    pub fn binary_erosion(
        &mut self,
        input: &HostValue,
        structure: &HostValue,
        mask: &HostValue,
        output: &HostValue,
        border_value: i32,
        origins: &HostValue,
        invert: bool,
        center_is_true: bool,
        return_coordinates: bool,
    ) -> BindResult<ErosionOutcome> {
        let mut frame = self.frame("binary_erosion");
        let input = frame.input(input)?;
        let structure = frame.input(structure)?;
        let mask = frame.optional_input(mask)?;
        let output = frame.output(output)?;
        let origins = IntSequence::materialize(origins)?;
        let rank = frame.view(input).ndim();
        Validator::validate_footprint(frame.view(structure), rank, "structure")?;
        Validator::validate_origins(&origins, rank)?;

        let mut queue = return_coordinates.then(|| CoordinateQueue::new(rank));
        let outcome = self
            .engine
            .binary_erosion(
                frame.view(input),
                frame.view(structure),
                frame.optional_view(mask),
                frame.view(output),
                border_value,
                &origins,
                invert,
                center_is_true,
                queue.as_mut(),
            )
            .map_err(engine_error);
        let changed = frame.finish(outcome)?;

        let worklist = queue.map(|mut queue| {
            queue.record_pass();
            WorklistHandle::create(queue)
        });
        Ok(ErosionOutcome { changed, worklist })
    }

    /// Continue erosion of `array` in place from `worklist`.
    ///
    /// `worklist` must be a live handle returned by
    /// [`binary_erosion`](Self::binary_erosion).
    #[allow(clippy::too_many_arguments)]
    pub fn binary_erosion2(
        &mut self,
        array: &HostValue,
        structure: &HostValue,
        mask: &HostValue,
        iterations: i32,
        origins: &HostValue,
        invert: bool,
        worklist: &HostValue,
    ) -> BindResult<()> {
        let mut frame = self.frame("binary_erosion2");
        let array = frame.inout(array)?;
        let structure = frame.input(structure)?;
        let mask = frame.optional_input(mask)?;
        let origins = IntSequence::materialize(origins)?;
        let worklist = WorklistHandle::from_host(worklist)?;
        let rank = frame.view(array).ndim();
        Validator::validate_footprint(frame.view(structure), rank, "structure")?;
        Validator::validate_origins(&origins, rank)?;

        let engine = &mut self.engine;
        let outcome = worklist
            .with_queue(|queue| {
                if queue.rank() != rank {
                    return Err(BindError::ShapeMismatch(format!(
                        "worklist of rank {} used with array of rank {rank}",
                        queue.rank()
                    )));
                }
                let status = engine.binary_erosion2(
                    frame.view(array),
                    frame.view(structure),
                    frame.optional_view(mask),
                    iterations,
                    &origins,
                    invert,
                    queue,
                );
                if status.is_ok() {
                    queue.record_pass();
                    debug!(remaining = queue.len(), passes = queue.passes(), "erosion resumed");
                }
                status.map_err(engine_error)
            })
            .and_then(|status| status);
        frame.finish(outcome)
    }
}
