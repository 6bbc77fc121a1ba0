//! Error type shared by every layer of the engine.
//!
//! None of these are recoverable inside the engine: they are returned to the
//! caller as-is. A multi-worker automaton that returned an error once is
//! poisoned and refuses further work.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AutomatonError {
    /// A state was written whose component count differs from the buffer's.
    #[error("state arity mismatch: expected {expected} components, got {actual}")]
    ArityMismatch { expected: usize, actual: usize },

    #[error("dimension descriptor must name at least one axis")]
    EmptyDimensions,

    #[error("axis {axis} has extent 0")]
    ZeroExtent { axis: usize },

    #[error("grid cell count overflows usize")]
    GridTooLarge,

    /// A neighborhood resolved an id outside the grid.
    #[error("cell {cell} lists neighbor id {neighbor}, outside the grid")]
    NeighborOutOfRange { cell: usize, neighbor: usize },

    #[error("neighborhood range must be at least 1")]
    InvalidRange,

    #[error("worker count must be at least 1, got {0}")]
    InvalidWorkerCount(usize),

    #[error("{workers} workers requested for a grid of {cells} cells")]
    TooManyWorkers { workers: usize, cells: usize },

    #[error("failed to start worker pool: {0}")]
    ThreadPool(String),

    /// A worker terminated or stopped responding mid-run.
    #[error("worker for shard {shard} failed")]
    WorkerFailed { shard: usize },

    #[error("automaton is unusable after an earlier worker failure")]
    Poisoned,
}

pub type Result<T, E = AutomatonError> = std::result::Result<T, E>;
