use log::{debug, warn};

use crate::math::{predicates, Point2};
use crate::topology::{SegmentId, TriangleId};

use super::builder::MeshBuilder;

/// Attempts to find a collision-free circumcenter before falling back to
/// the centroid.
const PERTURB_ATTEMPTS: usize = 20;

/// Shrink factor toward the centroid per attempt.
const PERTURB_SHRINK: f64 = 0.9;

impl MeshBuilder {
    /// Ruppert-style quality refinement.
    ///
    /// Repeatedly picks the worst-quality inside triangle and proposes its
    /// circumcenter as a Steiner point. A proposal that encroaches any
    /// segment's diametral circle splits those segments instead; segment
    /// integrity takes priority over triangle quality. In graded mode the
    /// loop stops once the worst quality meets the threshold angle; running
    /// out of vertices is an expected termination, flagged in the report,
    /// not an error.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn refine(&mut self) {
        while self.store.vertex_count() < self.store.max_vertex_count() {
            let mut worst: Option<TriangleId> = None;
            let mut worst_quality = f64::INFINITY;
            for i in 0..self.store.triangle_count() {
                let t = self.store.triangle(TriangleId(i as u32));
                if t.inside && t.quality < worst_quality {
                    worst_quality = t.quality;
                    worst = Some(TriangleId(i as u32));
                }
            }
            let Some(bad) = worst else {
                return;
            };
            if self.options.grading && worst_quality >= self.options.grading_lower_angle {
                debug!("refinement reached the quality target");
                return;
            }

            let c = self.circumcenter_point(bad);

            let mut deferred = false;
            let mut i = 0;
            while i < self.store.segment_count() {
                let sid = SegmentId(i as u32);
                let [v0, v1] = self.store.segment(sid).vertices;
                let p0 = self.store.point(v0);
                let p1 = self.store.point(v1);
                if predicates::in_diametral_circle(&p0, &p1, &c) && self.split_segment(sid) {
                    deferred = true;
                }
                i += 1;
            }

            if !deferred {
                let Some(v) = self.store.add_vertex(c) else {
                    warn!("vertex budget exhausted during refinement");
                    self.report.vertex_budget_exhausted = true;
                    return;
                };
                self.insert_vertex(v);
            }
        }
        warn!("vertex budget exhausted during refinement");
        self.report.vertex_budget_exhausted = true;
    }

    /// Proposes an insertion point for the bad triangle `t`.
    ///
    /// Starts at the raw circumcenter; while the proposal fails to locate
    /// into the mesh or its nearest live vertex is foreign to `t`, shrink it
    /// toward the centroid, which is the final fallback. The repeated
    /// perturbation is a heuristic against vertex collisions, not a
    /// termination proof.
    fn circumcenter_point(&mut self, t: TriangleId) -> Point2 {
        let tri = *self.store.triangle(t);
        let [pa, pb, pc] = tri.vertices.map(|v| self.store.point(v));
        let centroid = Point2::new((pa.x + pb.x + pc.x) / 3.0, (pa.y + pb.y + pc.y) / 3.0);

        let mut cand = predicates::circumcenter(&pa, &pb, &pc);
        for _ in 0..PERTURB_ATTEMPTS {
            if self.locate_point(&cand).is_some() {
                let nearest = self.closest_vertex(&cand);
                if tri.has_vertex(nearest) {
                    return cand;
                }
            }
            cand = Point2::new(
                centroid.x + PERTURB_SHRINK * (cand.x - centroid.x),
                centroid.y + PERTURB_SHRINK * (cand.y - centroid.y),
            );
        }
        centroid
    }
}
