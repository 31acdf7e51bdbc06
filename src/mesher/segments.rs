use log::debug;

use crate::math::{predicates, Point2};
use crate::topology::{SegmentData, SegmentId, TriangleId, VertexId};

use super::builder::MeshBuilder;
use super::SegmentIndices;

impl MeshBuilder {
    /// Auto-closes the first contiguous input range as a boundary polygon.
    ///
    /// The range normally spans all input vertices; if the first explicit
    /// segment already starts an inner boundary chain at `(i, i + 1)` inside
    /// the input range, the outer boundary ends just before it.
    pub(crate) fn auto_segment_boundary(&mut self, explicit: &[SegmentIndices]) {
        #[allow(clippy::cast_possible_truncation)]
        let mut end = self.store.input_vertex_count() as u32;
        if let Some(first) = explicit.first() {
            if (first.start as usize) < self.store.input_vertex_count()
                && first.end == first.start + 1
            {
                end = first.start - 1;
            }
        }
        if end >= 2 {
            self.segment_range(1, end, true);
        }
    }

    /// Adds consecutive segments joining input vertices `start..=end`
    /// (1-based), optionally closing the chain back to `start`.
    pub(crate) fn segment_range(&mut self, start: u32, end: u32, close: bool) {
        for i in (start - 1)..(end - 1) {
            self.store.add_segment(SegmentData {
                vertices: [VertexId(i + 3), VertexId(i + 4)],
            });
        }
        if close {
            self.store.add_segment(SegmentData {
                vertices: [VertexId(end + 2), VertexId(3)],
            });
        }
    }

    /// Registers one caller-supplied constraint segment (1-based indices).
    pub(crate) fn add_input_segment(&mut self, s: SegmentIndices) {
        self.store.add_segment(SegmentData {
            vertices: [VertexId(s.start + 2), VertexId(s.end + 2)],
        });
    }

    /// Emits hull-closing segments: a triangulation edge joining two input
    /// vertices inside a triangle whose remaining vertex belongs to the
    /// covering triangle lies on the convex hull of the input.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn emit_hull_segments(&mut self) {
        for ti in 0..self.store.triangle_count() {
            let tri = *self.store.triangle(TriangleId(ti as u32));
            for k in 0..3 {
                let a = tri.vertices[k];
                let b = tri.vertices[(k + 1) % 3];
                let c = tri.vertices[(k + 2) % 3];
                if !self.store.is_cover_vertex(a)
                    && !self.store.is_cover_vertex(b)
                    && self.store.is_cover_vertex(c)
                    && self.store.find_segment(a, b).is_none()
                {
                    self.store.add_segment(SegmentData { vertices: [a, b] });
                }
            }
        }
    }

    /// Forces every constraint segment to appear as a triangulation edge.
    ///
    /// Sweeps the (growing) segment list repeatedly: a segment with no
    /// direct edge is subdivided at the split position and the new vertex
    /// inserted; a represented segment whose diametral circle contains an
    /// opposite vertex is split in place. Stops when a sweep makes no
    /// insertion, or returns false once the vertex budget runs out, leaving
    /// a valid but not fully conforming triangulation.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn recover_segments(&mut self) -> bool {
        loop {
            let mut inserting = false;
            let mut i = 0;
            while i < self.store.segment_count() {
                let sid = SegmentId(i as u32);
                let [v0, v1] = self.store.segment(sid).vertices;
                if let Some(e) = self.store.find_edge(v0, v1) {
                    let ed = *self.store.edge(e);
                    let o0 = self.store.triangle(ed.triangles[0]).opposite_vertex(e);
                    let o1 = self.store.triangle(ed.triangles[1]).opposite_vertex(e);
                    let p0 = self.store.point(v0);
                    let p1 = self.store.point(v1);
                    if predicates::in_diametral_circle(&p0, &p1, &self.store.point(o0))
                        || predicates::in_diametral_circle(&p0, &p1, &self.store.point(o1))
                    {
                        inserting = self.split_segment(sid);
                    }
                } else {
                    let p = self.split_position(v0, v1);
                    let Some(v) = self.store.add_vertex(p) else {
                        return false;
                    };
                    self.store.segment_mut(sid).vertices = [v0, v];
                    self.store.add_segment(SegmentData { vertices: [v, v1] });
                    inserting = self.insert_vertex(v);
                }
                i += 1;
            }

            if self.store.vertex_count() == self.store.max_vertex_count() {
                debug!("segment recovery stopped at the vertex budget");
                return false;
            }
            if !inserting {
                debug!(
                    "segment recovery converged with {} segments",
                    self.store.segment_count()
                );
                return true;
            }
        }
    }

    /// Locks the edge under every segment that is directly represented.
    /// Locked edges are immune to flipping and stop the region flood fill.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn lock_segment_edges(&mut self) {
        for i in 0..self.store.segment_count() {
            let [v0, v1] = self.store.segment(SegmentId(i as u32)).vertices;
            if let Some(e) = self.store.find_edge(v0, v1) {
                self.store.edge_mut(e).locked = true;
            }
        }
    }

    /// Splits segment `s` at its split position: the segment shrinks in
    /// place, the remainder is appended, and the new vertex is inserted on
    /// the segment's edge. Returns false when the segment has collapsed
    /// below the coincidence tolerance or the vertex budget ran out.
    pub(crate) fn split_segment(&mut self, s: SegmentId) -> bool {
        let [v0, v1] = self.store.segment(s).vertices;
        let Some(e) = self.store.find_edge(v0, v1) else {
            panic!("split of a segment that has no edge");
        };

        let p0 = self.store.point(v0);
        let p1 = self.store.point(v1);
        if predicates::coincident(&p0, &p1) {
            return false;
        }

        let p = self.split_position(v0, v1);
        let Some(v) = self.store.add_vertex(p) else {
            return false;
        };
        self.store.segment_mut(s).vertices = [v0, v];
        self.store.add_segment(SegmentData { vertices: [v, v1] });
        self.insert_on_edge(v, e);
        true
    }

    /// Split point for segment `v0`-`v1`.
    ///
    /// When either endpoint is a non-Steiner vertex, the point is offset
    /// from that endpoint by a power-of-two fraction of the segment length,
    /// so repeated splitting near sharp input corners converges
    /// geometrically instead of bisecting forever. Steiner-to-Steiner
    /// segments split at the midpoint.
    fn split_position(&self, v0: VertexId, v1: VertexId) -> Point2 {
        let (a, b) = if self.store.is_steiner(v1) {
            (v0, v1)
        } else {
            (v1, v0)
        };
        let pa = self.store.point(a);
        let pb = self.store.point(b);
        if self.store.is_steiner(a) {
            Point2::new(0.5 * (pa.x + pb.x), 0.5 * (pa.y + pb.y))
        } else {
            let d = predicates::distance_sq(&pa, &pb).sqrt();
            let f = 2.0_f64.powf((std::f64::consts::SQRT_2 * (0.5 * d).ln() + 0.5).floor()) / d;
            Point2::new(pa.x + f * (pb.x - pa.x), pa.y + f * (pb.y - pa.y))
        }
    }
}
