//! Correlation, order-statistic and pluggable filters.
//!
//! ## Purpose
//!
//! This module binds the filter operations: fixed-weight correlation, box,
//! minimum/maximum and rank filters, and the two generic filters whose
//! per-window work is done by a caller-supplied kernel.
//!
//! ## Design notes
//!
//! * **Arguments before kernels**: Arrays are adapted first, then the kernel
//!   is negotiated, then scalar arguments are checked against the input rank.
//! * **Kernel scope**: A negotiated kernel lives until the method returns,
//!   after the engine is done with its context pointer.

// Internal dependencies
use crate::api::Bridge;
use crate::callback::negotiator::{Filter, Filter1D, KernelBinding};
use crate::engine::executor::{engine_error, settle};
use crate::engine::mode::ExtendMode;
use crate::engine::traits::Engine;
use crate::engine::validator::Validator;
use crate::host::sequence::IntSequence;
use crate::host::value::HostValue;
use crate::primitives::errors::BindResult;

impl<E: Engine> Bridge<E> {
    // ========================================================================
    // Fixed-weight filters
    // ========================================================================

    /// Correlate `input` with 1-D `weights` along `axis`.
    #[allow(clippy::too_many_arguments)]
    pub fn correlate1d(
        &mut self,
        input: &HostValue,
        weights: &HostValue,
        axis: isize,
        output: &HostValue,
        mode: ExtendMode,
        cval: f64,
        origin: isize,
    ) -> BindResult<()> {
        let mut frame = self.frame("correlate1d");
        let input = frame.input(input)?;
        let weights = frame.input(weights)?;
        let output = frame.output(output)?;
        let axis = Validator::validate_axis(axis, frame.view(input).ndim())?;

        let outcome = self
            .engine
            .correlate1d(
                frame.view(input),
                frame.view(weights),
                axis,
                frame.view(output),
                mode,
                cval,
                origin,
            )
            .map_err(engine_error);
        frame.finish(outcome)
    }

    /// Correlate `input` with n-D `weights`.
    pub fn correlate(
        &mut self,
        input: &HostValue,
        weights: &HostValue,
        output: &HostValue,
        mode: ExtendMode,
        cval: f64,
        origins: &HostValue,
    ) -> BindResult<()> {
        let mut frame = self.frame("correlate");
        let input = frame.input(input)?;
        let weights = frame.input(weights)?;
        let output = frame.output(output)?;
        let origins = IntSequence::materialize(origins)?;
        Validator::validate_origins(&origins, frame.view(input).ndim())?;

        let outcome = self
            .engine
            .correlate(
                frame.view(input),
                frame.view(weights),
                frame.view(output),
                mode,
                cval,
                &origins,
            )
            .map_err(engine_error);
        frame.finish(outcome)
    }

    /// Box filter of `filter_size` samples along `axis`.
    #[allow(clippy::too_many_arguments)]
    pub fn uniform_filter1d(
        &mut self,
        input: &HostValue,
        filter_size: isize,
        axis: isize,
        output: &HostValue,
        mode: ExtendMode,
        cval: f64,
        origin: isize,
    ) -> BindResult<()> {
        let mut frame = self.frame("uniform_filter1d");
        let input = frame.input(input)?;
        let output = frame.output(output)?;
        let filter_size = Validator::validate_filter_size(filter_size)?;
        let axis = Validator::validate_axis(axis, frame.view(input).ndim())?;

        let outcome = self
            .engine
            .uniform_filter1d(
                frame.view(input),
                filter_size,
                axis,
                frame.view(output),
                mode,
                cval,
                origin,
            )
            .map_err(engine_error);
        frame.finish(outcome)
    }

    // ========================================================================
    // Order-statistic filters
    // ========================================================================

    /// Minimum (or maximum) filter of `filter_size` samples along `axis`.
    #[allow(clippy::too_many_arguments)]
    pub fn min_or_max_filter1d(
        &mut self,
        input: &HostValue,
        filter_size: isize,
        axis: isize,
        output: &HostValue,
        mode: ExtendMode,
        cval: f64,
        origin: isize,
        minimum: bool,
    ) -> BindResult<()> {
        let mut frame = self.frame("min_or_max_filter1d");
        let input = frame.input(input)?;
        let output = frame.output(output)?;
        let filter_size = Validator::validate_filter_size(filter_size)?;
        let axis = Validator::validate_axis(axis, frame.view(input).ndim())?;

        let outcome = self
            .engine
            .min_or_max_filter1d(
                frame.view(input),
                filter_size,
                axis,
                frame.view(output),
                mode,
                cval,
                origin,
                minimum,
            )
            .map_err(engine_error);
        frame.finish(outcome)
    }

    /// Minimum (or maximum) filter over `footprint`.
    ///
    /// `structure` is optional; when given it adds grey-level offsets to the
    /// values under the footprint.
    #[allow(clippy::too_many_arguments)]
    pub fn min_or_max_filter(
        &mut self,
        input: &HostValue,
        footprint: &HostValue,
        structure: &HostValue,
        output: &HostValue,
        mode: ExtendMode,
        cval: f64,
        origins: &HostValue,
        minimum: bool,
    ) -> BindResult<()> {
        let mut frame = self.frame("min_or_max_filter");
        let input = frame.input(input)?;
        let footprint = frame.input(footprint)?;
        let structure = frame.optional_input(structure)?;
        let output = frame.output(output)?;
        let origins = IntSequence::materialize(origins)?;
        let rank = frame.view(input).ndim();
        Validator::validate_footprint(frame.view(footprint), rank, "footprint")?;
        Validator::validate_origins(&origins, rank)?;

        let outcome = self
            .engine
            .min_or_max_filter(
                frame.view(input),
                frame.view(footprint),
                frame.optional_view(structure),
                frame.view(output),
                mode,
                cval,
                &origins,
                minimum,
            )
            .map_err(engine_error);
        frame.finish(outcome)
    }

    /// Rank filter selecting the `rank`-th smallest value under `footprint`.
    #[allow(clippy::too_many_arguments)]
    pub fn rank_filter(
        &mut self,
        input: &HostValue,
        rank: isize,
        footprint: &HostValue,
        output: &HostValue,
        mode: ExtendMode,
        cval: f64,
        origins: &HostValue,
    ) -> BindResult<()> {
        let mut frame = self.frame("rank_filter");
        let input = frame.input(input)?;
        let footprint = frame.input(footprint)?;
        let output = frame.output(output)?;
        let origins = IntSequence::materialize(origins)?;
        let ndim = frame.view(input).ndim();
        Validator::validate_footprint(frame.view(footprint), ndim, "footprint")?;
        Validator::validate_origins(&origins, ndim)?;

        let outcome = self
            .engine
            .rank_filter(
                frame.view(input),
                rank,
                frame.view(footprint),
                frame.view(output),
                mode,
                cval,
                &origins,
            )
            .map_err(engine_error);
        frame.finish(outcome)
    }

    // ========================================================================
    // Pluggable filters
    // ========================================================================

    /// 1-D filter whose per-line work is done by `function`.
    ///
    /// `function` may be a signature-labeled capsule, an unlabeled capsule,
    /// or a host callable invoked as `function(line_in, line_out, *extra_arguments,
    /// **extra_keywords)`.
    #[allow(clippy::too_many_arguments)]
    pub fn generic_filter1d(
        &mut self,
        input: &HostValue,
        function: &HostValue,
        filter_size: isize,
        axis: isize,
        output: &HostValue,
        mode: ExtendMode,
        cval: f64,
        origin: isize,
        extra_arguments: &HostValue,
        extra_keywords: &HostValue,
    ) -> BindResult<()> {
        let mut frame = self.frame("generic_filter1d");
        let input = frame.input(input)?;
        let output = frame.output(output)?;
        let mut kernel =
            KernelBinding::<Filter1D>::negotiate(function, extra_arguments, extra_keywords)?;
        let filter_size = Validator::validate_filter_size(filter_size)?;
        let axis = Validator::validate_axis(axis, frame.view(input).ndim())?;

        let outcome = self.engine.generic_filter1d(
            frame.view(input),
            kernel.native(),
            filter_size,
            axis,
            frame.view(output),
            mode,
            cval,
            origin,
        );
        frame.finish(settle(outcome, Some(&mut kernel)))
    }

    /// n-D filter whose per-window reduction is done by `function`.
    ///
    /// A host callable is invoked as `function(window, *extra_arguments,
    /// **extra_keywords)` and must return one number.
    #[allow(clippy::too_many_arguments)]
    pub fn generic_filter(
        &mut self,
        input: &HostValue,
        function: &HostValue,
        footprint: &HostValue,
        output: &HostValue,
        mode: ExtendMode,
        cval: f64,
        origins: &HostValue,
        extra_arguments: &HostValue,
        extra_keywords: &HostValue,
    ) -> BindResult<()> {
        let mut frame = self.frame("generic_filter");
        let input = frame.input(input)?;
        let footprint = frame.input(footprint)?;
        let output = frame.output(output)?;
        let mut kernel =
            KernelBinding::<Filter>::negotiate(function, extra_arguments, extra_keywords)?;
        let origins = IntSequence::materialize(origins)?;
        let rank = frame.view(input).ndim();
        Validator::validate_footprint(frame.view(footprint), rank, "footprint")?;
        Validator::validate_origins(&origins, rank)?;

        let outcome = self.engine.generic_filter(
            frame.view(input),
            kernel.native(),
            frame.view(footprint),
            frame.view(output),
            mode,
            cval,
            &origins,
        );
        frame.finish(settle(outcome, Some(&mut kernel)))
    }
}
