use thiserror::Error;

/// Top-level error type for the mesh generator.
#[derive(Debug, Error)]
pub enum MeshError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Capacity(#[from] CapacityError),

    #[error(transparent)]
    Topology(#[from] TopologyError),
}

/// Errors in the caller-supplied geometry description.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("segment endpoint {index} is out of range 1..={count}")]
    SegmentIndexOutOfRange { index: u32, count: usize },

    #[error("segment joins input vertex {0} to itself")]
    DegenerateSegment(u32),
}

/// Errors sizing the topology arenas.
#[derive(Debug, Error)]
pub enum CapacityError {
    #[error("cannot allocate {arena} arena for {requested} slots")]
    ArenaAllocation {
        arena: &'static str,
        requested: usize,
    },
}

/// Structural invariant violations detected by
/// [`TopologyStore::validate`](crate::topology::TopologyStore::validate).
///
/// These indicate a defect in topology maintenance, never bad input.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("edge {edge} is not referenced back by its incident triangle {triangle}")]
    DanglingEdge { edge: u32, triangle: u32 },

    #[error("triangle {triangle}: edge slot {slot} does not join the expected vertex pair")]
    MisalignedEdge { triangle: u32, slot: usize },

    #[error("edge {0} is locked but no segment joins its endpoints")]
    LockedWithoutSegment(u32),
}

/// Convenience type alias for results using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;
