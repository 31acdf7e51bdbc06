pub mod predicates;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// Per-axis tolerance under which two vertices count as coincident.
///
/// Used only to refuse splitting a constraint segment that has collapsed to
/// (near) zero length; every orientation predicate compares exact signs.
pub const COINCIDENCE_TOLERANCE: f64 = 1e-5;
