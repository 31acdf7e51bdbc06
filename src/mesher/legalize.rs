use crate::math::predicates;
use crate::topology::{EdgeId, VertexId};

use super::builder::MeshBuilder;

impl MeshBuilder {
    /// Restores the local Delaunay property around the given edges.
    ///
    /// An explicit work stack replaces the natural recursion; edges are
    /// processed in the same depth-first order the recursion would visit.
    /// Terminates because each flip strictly improves the angle criterion on
    /// a finite triangulation.
    pub(crate) fn legalize_edges(&mut self, seeds: &[EdgeId]) {
        let mut stack: Vec<EdgeId> = seeds.iter().rev().copied().collect();
        while let Some(e) = stack.pop() {
            self.flip_if_illegal(e, &mut stack);
        }
    }

    /// Tests edge `e` against the angle-optimizing swap criterion and flips
    /// it when the opposite diagonal wins, pushing the four border edges of
    /// the flipped pair for re-examination.
    fn flip_if_illegal(&mut self, e: EdgeId, stack: &mut Vec<EdgeId>) {
        let ed = *self.store.edge(e);
        if ed.locked {
            return;
        }
        let [t0, t1] = ed.triangles;
        let inside = self.store.triangle(t0).inside;
        assert!(
            inside == self.store.triangle(t1).inside,
            "flip candidate spans the region boundary"
        );

        let [v0, v2] = ed.vertices;
        let (e2, e3, v3) = self.store.triangle(t0).adjacent_edges(e);
        let (e0, e1, v1) = self.store.triangle(t1).adjacent_edges(e);

        // The quadrilateral must be strictly convex across the new diagonal.
        if self.orientation_between(v1, v3, v2) >= 0.0
            || self.orientation_between(v1, v3, v0) <= 0.0
        {
            return;
        }

        let current_contacts = u8::from(self.has_cover_vertex(v0, v2, v3))
            + u8::from(self.has_cover_vertex(v2, v0, v1));
        let current_angle = self
            .store
            .triangle(t0)
            .min_angle
            .min(self.store.triangle(t1).min_angle);

        let proposed_contacts = u8::from(self.has_cover_vertex(v1, v3, v0))
            + u8::from(self.has_cover_vertex(v3, v1, v2));
        let proposed_angle = self
            .candidate_min_angle(v1, v3, v0)
            .min(self.candidate_min_angle(v3, v1, v2));

        if proposed_contacts < current_contacts || proposed_angle > current_angle {
            self.set_triangle(t0, [v1, v3, v0], [e, e3, e0]);
            self.set_triangle(t1, [v3, v1, v2], [e, e1, e2]);
            self.store.triangle_mut(t0).inside = inside;
            self.store.triangle_mut(t1).inside = inside;

            self.set_edge(e, v1, v3, t0, t1);
            self.fix_edge(e0, t1, t0);
            self.fix_edge(e2, t0, t1);

            stack.extend([e3, e2, e1, e0]);
        }
    }

    fn candidate_min_angle(&self, a: VertexId, b: VertexId, c: VertexId) -> f64 {
        predicates::min_interior_angle_deg(
            &self.store.point(a),
            &self.store.point(b),
            &self.store.point(c),
        )
    }
}
