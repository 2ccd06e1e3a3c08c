use thiserror::Error;

/// Top-level error type for the wallcraft kernel and wall pipeline.
#[derive(Debug, Error)]
pub enum WallcraftError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error(transparent)]
    Wall(#[from] WallError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,
}

/// Errors related to topological operations.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("wire is not closed")]
    WireNotClosed,

    #[error("invalid topology: {0}")]
    InvalidTopology(String),
}

/// Errors related to CAD operations.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("operation failed: {0}")]
    Failed(String),
}

/// Errors raised by the wall construction pipeline.
#[derive(Debug, Error)]
pub enum WallError {
    /// Unsupported topology, non-planar curve or empty base.
    #[error("invalid base shape: {0}")]
    InvalidBaseShape(String),

    /// Zero width, zero-length perpendicular or an offset that collapsed.
    #[error("degenerate offset: {0}")]
    DegenerateOffset(String),

    #[error("solid orientation cannot be fixed (volume {volume})")]
    NegativeVolumeUnrecoverable { volume: f64 },

    /// Non-fatal: the unsplit shape is kept.
    #[error("splitter removal failed: {0}")]
    SplitterRemovalFailed(String),

    #[error("walls are not compatible: {0}")]
    IncompatibleWalls(String),

    #[error("object is not a wall: {0}")]
    NotAWall(String),
}

/// Convenience type alias for results using [`WallcraftError`].
pub type Result<T> = std::result::Result<T, WallcraftError>;
