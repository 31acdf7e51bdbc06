use crate::math::{predicates, Point2};
use crate::topology::{TriangleId, VertexId};

use super::builder::MeshBuilder;

/// Walk budget as a multiple of the live triangle count. A walk longer than
/// this means the triangulation is inconsistent.
const WALK_STEP_FACTOR: usize = 4;

impl MeshBuilder {
    /// Walks the triangulation to the triangle containing `p`.
    ///
    /// Starts from the last successful hit (query points are usually near
    /// previous queries) and crosses an edge whenever `p` lies strictly on
    /// its far side. Returns the containing triangle only when it is still
    /// inside the meshed region; landing on a carved triangle reports as not
    /// found, which is how hole markers outside the geometry are detected.
    ///
    /// # Panics
    ///
    /// Panics if the walk exceeds its step budget, which indicates corrupted
    /// connectivity rather than bad input.
    pub(crate) fn locate_point(&mut self, p: &Point2) -> Option<TriangleId> {
        let mut t = self.last_triangle.unwrap_or(TriangleId(1));
        let max_steps = WALK_STEP_FACTOR * self.store.triangle_count().max(4);
        let mut steps = 0_usize;
        'walk: loop {
            assert!(steps <= max_steps, "point location walk did not terminate");
            steps += 1;
            let tri = *self.store.triangle(t);
            for i in 0..3 {
                let a = self.store.point(tri.vertices[i]);
                let b = self.store.point(tri.vertices[(i + 1) % 3]);
                if predicates::orientation(&a, &b, p) < 0.0 {
                    t = self.store.edge(tri.edges[i]).other_triangle(t);
                    continue 'walk;
                }
            }
            self.last_triangle = Some(t);
            return self.store.triangle(t).inside.then_some(t);
        }
    }

    /// The live vertex nearest to `p` (linear scan over all slots).
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn closest_vertex(&self, p: &Point2) -> VertexId {
        let mut best = VertexId(0);
        let mut best_d2 = f64::INFINITY;
        for (i, v) in self.store.vertices().iter().enumerate() {
            let d2 = predicates::distance_sq(&v.point, p);
            if d2 < best_d2 {
                best_d2 = d2;
                best = VertexId(i as u32);
            }
        }
        best
    }
}
