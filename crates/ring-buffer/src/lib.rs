//! Bounded Frame Queue
//!
//! Per-connection queue between the socket reader and the frame worker.
//! When the worker falls behind, the oldest pending frame is evicted so
//! memory stays bounded and the worker always sees the freshest frames.

mod queue;

pub use queue::FrameQueue;

/// Default queue depth (one frame in flight, one waiting)
pub const DEFAULT_DEPTH: usize = 2;
