use log::warn;

use crate::math::Point2;
use crate::topology::TriangleId;

use super::builder::MeshBuilder;

impl MeshBuilder {
    /// Hole-aware classification.
    ///
    /// Carves the component on the outside of the boundary (seeded at
    /// triangle slot 1, the reversed cover triangle) and then the component
    /// containing each hole marker. Markers that cannot be located are
    /// recorded in the report and skipped; the remaining holes still carve.
    pub(crate) fn classify_with_holes(&mut self, holes: &[Point2]) {
        self.carve(TriangleId(1));
        for p in holes {
            if let Some(t) = self.locate_point(p) {
                self.carve(t);
            } else {
                warn!("hole marker ({}, {}) is not inside any triangle", p.x, p.y);
                self.report.unlocated_holes.push(*p);
            }
        }
    }

    /// Convex-mode classification: a triangle is inside iff none of its
    /// vertices belongs to the covering triangle. A purely local test, used
    /// when segment recovery could not complete.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn classify_convex(&mut self) {
        for i in 0..self.store.triangle_count() {
            let tid = TriangleId(i as u32);
            let vs = self.store.triangle(tid).vertices;
            let inside = vs.iter().all(|&v| !self.store.is_cover_vertex(v));
            self.store.triangle_mut(tid).inside = inside;
        }
    }

    /// Flood-fills not-inside from `seed`. The flood crosses any unlocked
    /// edge; locked constraint edges are the firewall it cannot pass.
    fn carve(&mut self, seed: TriangleId) {
        let mut stack = vec![seed];
        while let Some(t) = stack.pop() {
            if !self.store.triangle(t).inside {
                continue;
            }
            self.store.triangle_mut(t).inside = false;
            let edges = self.store.triangle(t).edges;
            for e in edges {
                let ed = *self.store.edge(e);
                if !ed.locked {
                    stack.push(ed.other_triangle(t));
                }
            }
        }
    }
}
