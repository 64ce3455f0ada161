//! Fourier-domain filters.

// Internal dependencies
use crate::api::Bridge;
use crate::engine::executor::engine_error;
use crate::engine::mode::FourierKernel;
use crate::engine::traits::Engine;
use crate::engine::validator::Validator;
use crate::host::value::HostValue;
use crate::primitives::errors::BindResult;

impl<E: Engine> Bridge<E> {
    /// Multiply a Fourier-domain `input` by the kernel selected by `kernel`.
    ///
    /// `parameters` holds one kernel parameter per axis. `n` is the length of
    /// the real transform axis, or a negative value for a complex transform.
    pub fn fourier_filter(
        &mut self,
        input: &HostValue,
        parameters: &HostValue,
        n: isize,
        axis: isize,
        output: &HostValue,
        kernel: FourierKernel,
    ) -> BindResult<()> {
        let mut frame = self.frame("fourier_filter");
        let input = frame.input(input)?;
        let parameters = frame.input(parameters)?;
        let output = frame.output(output)?;
        let axis = Validator::validate_axis(axis, frame.view(input).ndim())?;

        let outcome = self
            .engine
            .fourier_filter(
                frame.view(input),
                frame.view(parameters),
                n,
                axis,
                frame.view(output),
                kernel,
            )
            .map_err(engine_error);
        frame.finish(outcome)
    }

    /// Apply the phase shift `shifts` to a Fourier-domain `input`.
    pub fn fourier_shift(
        &mut self,
        input: &HostValue,
        shifts: &HostValue,
        n: isize,
        axis: isize,
        output: &HostValue,
    ) -> BindResult<()> {
        let mut frame = self.frame("fourier_shift");
        let input = frame.input(input)?;
        let shifts = frame.input(shifts)?;
        let output = frame.output(output)?;
        let axis = Validator::validate_axis(axis, frame.view(input).ndim())?;

        let outcome = self
            .engine
            .fourier_shift(frame.view(input), frame.view(shifts), n, axis, frame.view(output))
            .map_err(engine_error);
        frame.finish(outcome)
    }
}
