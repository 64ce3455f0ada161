//! Spline prefiltering and resampling.
//!
//! ## Purpose
//!
//! This module binds the interpolation operations. `geometric_transform`
//! is the only one with a pluggable kernel, and that kernel is optional:
//! without one, the engine resamples through explicit coordinates or an
//! affine matrix and shift.
//!
//! ## Invariants
//!
//! * Spline orders are in `0..=5` before the engine runs.
//! * Extra callback arguments are checked only when a mapping is supplied.

// Internal dependencies
use crate::api::Bridge;
use crate::callback::negotiator::{KernelBinding, Map};
use crate::engine::executor::{engine_error, settle};
use crate::engine::mode::ExtendMode;
use crate::engine::traits::Engine;
use crate::engine::validator::Validator;
use crate::host::value::HostValue;
use crate::primitives::errors::BindResult;

impl<E: Engine> Bridge<E> {
    /// Spline prefilter of `order` along `axis`.
    pub fn spline_filter1d(
        &mut self,
        input: &HostValue,
        order: i32,
        axis: isize,
        output: &HostValue,
    ) -> BindResult<()> {
        let mut frame = self.frame("spline_filter1d");
        let input = frame.input(input)?;
        let output = frame.output(output)?;
        let order = Validator::validate_spline_order(order)?;
        let axis = Validator::validate_axis(axis, frame.view(input).ndim())?;

        let outcome = self
            .engine
            .spline_filter1d(frame.view(input), order, axis, frame.view(output))
            .map_err(engine_error);
        frame.finish(outcome)
    }

    /// Resample `input` into `output`.
    ///
    /// The source coordinate of each output element comes from `mapping`
    /// when it is not the host null value; otherwise from `coordinates`, or
    /// from `matrix` and `shift`. A host callable mapping is invoked as
    /// `mapping(output_coordinate, *extra_arguments, **extra_keywords)` and
    /// must return one number per input axis.
    #[allow(clippy::too_many_arguments)]
    pub fn geometric_transform(
        &mut self,
        input: &HostValue,
        mapping: &HostValue,
        coordinates: &HostValue,
        matrix: &HostValue,
        shift: &HostValue,
        output: &HostValue,
        order: i32,
        mode: ExtendMode,
        cval: f64,
        extra_arguments: &HostValue,
        extra_keywords: &HostValue,
    ) -> BindResult<()> {
        let mut frame = self.frame("geometric_transform");
        let input = frame.input(input)?;
        let coordinates = frame.optional_input(coordinates)?;
        let matrix = frame.optional_input(matrix)?;
        let shift = frame.optional_input(shift)?;
        let output = frame.output(output)?;
        let mut kernel =
            KernelBinding::<Map>::negotiate_optional(mapping, extra_arguments, extra_keywords)?;
        let order = Validator::validate_spline_order(order)?;

        let outcome = self.engine.geometric_transform(
            frame.view(input),
            kernel.as_mut().map(KernelBinding::native),
            frame.optional_view(coordinates),
            frame.optional_view(matrix),
            frame.optional_view(shift),
            frame.view(output),
            order,
            mode,
            cval,
        );
        frame.finish(settle(outcome, kernel.as_mut()))
    }

    /// Zoom and/or shift `input` into `output`.
    #[allow(clippy::too_many_arguments)]
    pub fn zoom_shift(
        &mut self,
        input: &HostValue,
        zoom: &HostValue,
        shift: &HostValue,
        output: &HostValue,
        order: i32,
        mode: ExtendMode,
        cval: f64,
    ) -> BindResult<()> {
        let mut frame = self.frame("zoom_shift");
        let input = frame.input(input)?;
        let zoom = frame.optional_input(zoom)?;
        let shift = frame.optional_input(shift)?;
        let output = frame.output(output)?;
        let order = Validator::validate_spline_order(order)?;

        let outcome = self
            .engine
            .zoom_shift(
                frame.view(input),
                frame.optional_view(zoom),
                frame.optional_view(shift),
                frame.view(output),
                order,
                mode,
                cval,
            )
            .map_err(engine_error);
        frame.finish(outcome)
    }
}
