pub mod error;
pub mod math;
pub mod mesher;
pub mod topology;

pub use error::{MeshError, Result};
pub use mesher::{Mesh, MeshReport, Mesher, MesherOptions, SegmentIndices};
