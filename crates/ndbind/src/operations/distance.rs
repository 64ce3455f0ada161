//! Distance and feature transforms.
//!
//! Every output of these operations is optional on the host side except
//! where noted, and an absent output is simply not computed by the engine.
//! Sampling distances always reach the engine as `Float64`.

// Internal dependencies
use crate::api::Bridge;
use crate::engine::executor::engine_error;
use crate::engine::mode::DistanceMetric;
use crate::engine::traits::Engine;
use crate::host::value::HostValue;
use crate::primitives::dtype::DType;
use crate::primitives::errors::BindResult;

impl<E: Engine> Bridge<E> {
    /// Brute-force distance transform of `input` under `metric`.
    pub fn distance_transform_bf(
        &mut self,
        input: &HostValue,
        metric: DistanceMetric,
        sampling: &HostValue,
        distances: &HostValue,
        features: &HostValue,
    ) -> BindResult<()> {
        let mut frame = self.frame("distance_transform_bf");
        let input = frame.input(input)?;
        let sampling = frame.optional_input_as(sampling, Some(DType::Float64))?;
        let distances = frame.optional_output(distances)?;
        let features = frame.optional_output(features)?;

        let outcome = self
            .engine
            .distance_transform_bf(
                frame.view(input),
                metric,
                frame.optional_view(sampling),
                frame.optional_view(distances),
                frame.optional_view(features),
            )
            .map_err(engine_error);
        frame.finish(outcome)
    }

    /// Chamfer distance transform; `distances` is read and refined in place.
    pub fn distance_transform_op(
        &mut self,
        structure: &HostValue,
        distances: &HostValue,
        features: &HostValue,
    ) -> BindResult<()> {
        let mut frame = self.frame("distance_transform_op");
        let structure = frame.input(structure)?;
        let distances = frame.inout(distances)?;
        let features = frame.optional_output(features)?;

        let outcome = self
            .engine
            .distance_transform_op(
                frame.view(structure),
                frame.view(distances),
                frame.optional_view(features),
            )
            .map_err(engine_error);
        frame.finish(outcome)
    }

    /// Exact Euclidean feature transform; `features` is required.
    pub fn euclidean_feature_transform(
        &mut self,
        input: &HostValue,
        sampling: &HostValue,
        features: &HostValue,
    ) -> BindResult<()> {
        let mut frame = self.frame("euclidean_feature_transform");
        let input = frame.input(input)?;
        let sampling = frame.optional_input_as(sampling, Some(DType::Float64))?;
        let features = frame.output(features)?;

        let outcome = self
            .engine
            .euclidean_feature_transform(
                frame.view(input),
                frame.optional_view(sampling),
                frame.view(features),
            )
            .map_err(engine_error);
        frame.finish(outcome)
    }
}
