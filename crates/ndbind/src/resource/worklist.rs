//! Resumable coordinate worklists for iterated binary erosion.
//!
//! ## Purpose
//!
//! A first erosion pass can record the coordinates of the pixels it changed.
//! Later passes resume from that worklist instead of rescanning the image.
//! This module defines the queue and the host-held handle that carries it
//! between independent top-level calls.
//!
//! ## Design notes
//!
//! * **Tagged handle**: The queue lives inside a [`ResourceHandle`] of kind
//!   [`WORKLIST_KIND`]; any other handle or value is rejected before use.
//! * **Shared, sequential**: The handle is reference counted. Passes borrow
//!   the queue one at a time; the last reference to drop runs the destructor.
//!
//! ## Key concepts
//!
//! * **Active**: The queue still holds coordinates to revisit.
//! * **Exhausted**: The queue is empty; further passes change nothing.
//! * **Released**: The destructor has run; every access fails.
//!
//! ## Invariants
//!
//! * Every queued coordinate has exactly `rank` components.
//! * The destructor runs exactly once.

// External dependencies
use std::collections::VecDeque;
use tracing::debug;

// Internal dependencies
use crate::host::handle::ResourceHandle;
use crate::host::value::HostValue;
use crate::primitives::errors::{BindError, BindResult};

/// Kind tag of worklist handles.
pub const WORKLIST_KIND: &str = "ndbind.coordinate_worklist";

// ============================================================================
// CoordinateQueue
// ============================================================================

/// FIFO queue of fixed-rank coordinates plus resume metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinateQueue {
    rank: usize,
    coordinates: VecDeque<Box<[isize]>>,
    passes: usize,
}

impl CoordinateQueue {
    /// Empty queue for coordinates of `rank` components.
    pub fn new(rank: usize) -> Self {
        Self {
            rank,
            coordinates: VecDeque::new(),
            passes: 0,
        }
    }

    /// Components per coordinate.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Number of queued coordinates.
    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    /// True when no coordinate is queued.
    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    /// Number of passes that have consumed this queue.
    pub fn passes(&self) -> usize {
        self.passes
    }

    /// Mark the completion of one pass.
    pub fn record_pass(&mut self) {
        self.passes += 1;
    }

    /// Append a coordinate.
    pub fn push(&mut self, coordinate: &[isize]) -> BindResult<()> {
        if coordinate.len() != self.rank {
            return Err(BindError::ShapeMismatch(format!(
                "coordinate of rank {} pushed onto worklist of rank {}",
                coordinate.len(),
                self.rank
            )));
        }
        self.coordinates.push_back(coordinate.into());
        Ok(())
    }

    /// Remove and return the oldest coordinate.
    pub fn pop(&mut self) -> Option<Box<[isize]>> {
        self.coordinates.pop_front()
    }

    /// Iterate over queued coordinates, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &[isize]> {
        self.coordinates.iter().map(|c| &**c)
    }
}

// ============================================================================
// WorklistHandle
// ============================================================================

/// Lifecycle state of a worklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorklistState {
    /// Coordinates remain to be processed.
    Active,

    /// The queue is empty.
    Exhausted,

    /// The destructor has run.
    Released,
}

/// Host-held handle to a [`CoordinateQueue`].
#[derive(Debug, Clone)]
pub struct WorklistHandle(ResourceHandle);

impl WorklistHandle {
    /// Wrap `queue`; it is dropped when the handle is released.
    pub fn create(queue: CoordinateQueue) -> Self {
        Self::with_destructor(queue, |queue| {
            debug!(remaining = queue.len(), passes = queue.passes(), "worklist destroyed");
        })
    }

    /// Wrap `queue` with a custom destructor.
    pub fn with_destructor(
        queue: CoordinateQueue,
        destructor: impl FnOnce(CoordinateQueue) + 'static,
    ) -> Self {
        debug!(rank = queue.rank(), len = queue.len(), "worklist created");
        Self(ResourceHandle::with_destructor(WORKLIST_KIND, queue, destructor))
    }

    /// Recover a worklist from a host value, checking its kind and liveness.
    pub fn from_host(value: &HostValue) -> BindResult<Self> {
        let HostValue::Resource(handle) = value else {
            return Err(BindError::TypeMismatch(format!(
                "expected a coordinate worklist, got {}",
                value.type_name()
            )));
        };
        if handle.kind() != WORKLIST_KIND {
            return Err(BindError::TypeMismatch(format!(
                "expected a coordinate worklist, got a '{}' resource",
                handle.kind()
            )));
        }
        if handle.is_released() {
            return Err(BindError::ReleasedResource(WORKLIST_KIND));
        }
        Ok(Self(handle.clone()))
    }

    /// The host value carrying this handle.
    pub fn into_host(self) -> HostValue {
        HostValue::Resource(self.0)
    }

    /// Run `f` on the queue.
    pub fn with_queue<R>(&self, f: impl FnOnce(&mut CoordinateQueue) -> R) -> BindResult<R> {
        self.0.with_payload(WORKLIST_KIND, f)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> WorklistState {
        match self.with_queue(|queue| queue.is_empty()) {
            Ok(false) => WorklistState::Active,
            Ok(true) => WorklistState::Exhausted,
            Err(_) => WorklistState::Released,
        }
    }

    /// Run the destructor now. Returns `false` if it had already run.
    pub fn release(&self) -> bool {
        self.0.release()
    }

    /// The underlying resource handle.
    pub fn handle(&self) -> &ResourceHandle {
        &self.0
    }
}
