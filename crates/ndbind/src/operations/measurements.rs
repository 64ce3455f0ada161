//! Label measurements and watershed segmentation.

// External dependencies
use tracing::debug;

// Internal dependencies
use crate::api::{Bridge, ObjectSlices};
use crate::engine::executor::engine_error;
use crate::engine::traits::Engine;
use crate::engine::validator::Validator;
use crate::host::value::HostValue;
use crate::primitives::buffer::try_with_capacity;
use crate::primitives::errors::{BindError, BindResult};

impl<E: Engine> Bridge<E> {
    /// Bounding boxes of the labels `1..=max_label` in `input`.
    ///
    /// Entry `i` of the result describes label `i + 1`: `None` when the label
    /// does not occur, otherwise one half-open range per axis. A negative
    /// `max_label` yields an empty result.
    pub fn find_objects(
        &mut self,
        input: &HostValue,
        max_label: isize,
    ) -> BindResult<Vec<Option<ObjectSlices>>> {
        let mut frame = self.frame("find_objects");
        let input = frame.input(input)?;
        let max_label = Validator::validate_max_label(max_label);
        let rank = frame.view(input).ndim();

        let stride = if rank > 0 { 2 * rank } else { 1 };
        let len = stride
            .checked_mul(max_label)
            .ok_or(BindError::AllocationFailure { bytes: usize::MAX })?;
        let mut regions = try_with_capacity::<isize>(len)?;
        regions.resize(len, -1);

        let outcome = self
            .engine
            .find_objects(frame.view(input), max_label, &mut regions)
            .map_err(engine_error);
        frame.finish(outcome)?;

        let objects: Vec<Option<ObjectSlices>> = regions
            .chunks_exact(stride)
            .map(|region| {
                (region[0] >= 0).then(|| {
                    (0..rank)
                        .map(|axis| region[axis]..region[axis + rank])
                        .collect()
                })
            })
            .collect();
        debug!(
            labels = max_label,
            found = objects.iter().filter(|o| o.is_some()).count(),
            "objects located"
        );
        Ok(objects)
    }

    /// Watershed by image foresting transform.
    pub fn watershed_ift(
        &mut self,
        input: &HostValue,
        markers: &HostValue,
        structure: &HostValue,
        output: &HostValue,
    ) -> BindResult<()> {
        let mut frame = self.frame("watershed_ift");
        let input = frame.input(input)?;
        let markers = frame.input(markers)?;
        let structure = frame.input(structure)?;
        let output = frame.output(output)?;
        let rank = frame.view(input).ndim();
        Validator::validate_same_shape(frame.view(input), frame.view(markers))?;
        Validator::validate_footprint(frame.view(structure), rank, "structure")?;

        let outcome = self
            .engine
            .watershed_ift(
                frame.view(input),
                frame.view(markers),
                frame.view(structure),
                frame.view(output),
            )
            .map_err(engine_error);
        frame.finish(outcome)
    }
}
