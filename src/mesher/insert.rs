use log::warn;

use crate::math::predicates;
use crate::topology::{EdgeId, VertexId};

use super::builder::MeshBuilder;

impl MeshBuilder {
    /// Builds the initial triangulation: a pinwheel of two opposite-winding
    /// triangles over the cover vertices, sharing all three edges, then one
    /// incremental insertion per input vertex in input order.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn triangulate_input(&mut self) {
        let v0 = VertexId(0);
        let v1 = VertexId(1);
        let v2 = VertexId(2);

        let t0 = self.new_triangle();
        let t1 = self.new_triangle();
        let e0 = self.new_edge();
        let e1 = self.new_edge();
        let e2 = self.new_edge();

        self.set_triangle(t0, [v0, v1, v2], [e0, e1, e2]);
        self.set_triangle(t1, [v0, v2, v1], [e2, e1, e0]);

        self.set_edge(e0, v0, v1, t0, t1);
        self.set_edge(e1, v1, v2, t0, t1);
        self.set_edge(e2, v2, v0, t0, t1);

        for i in 3..self.store.vertex_count() {
            let v = VertexId(i as u32);
            if !self.insert_vertex(v) {
                warn!("input vertex {i} could not be located; insertion skipped");
            }
        }
    }

    /// Inserts vertex `v` into the triangulation and re-legalizes around it.
    ///
    /// The containing triangle is replaced by three triangles sharing `v`,
    /// unless `v` falls exactly on one of its edges, in which case the edge
    /// is split instead. Returns false when point location fails, which
    /// signals a topology inconsistency rather than bad input.
    pub(crate) fn insert_vertex(&mut self, v: VertexId) -> bool {
        let p = self.store.point(v);
        let Some(t0) = self.locate_point(&p) else {
            return false;
        };

        let tri = *self.store.triangle(t0);
        for i in 0..3 {
            let a = self.store.point(tri.vertices[i]);
            let b = self.store.point(tri.vertices[(i + 1) % 3]);
            if predicates::orientation(&a, &b, &p) == 0.0 {
                return self.insert_on_edge(v, tri.edges[i]);
            }
        }

        let [v0, v1, v2] = tri.vertices;
        let [e0, e1, e2] = tri.edges;

        let t1 = self.new_triangle();
        let t2 = self.new_triangle();
        let f0 = self.new_edge();
        let f1 = self.new_edge();
        let f2 = self.new_edge();

        self.set_triangle(t0, [v0, v1, v], [e0, f1, f0]);
        self.set_triangle(t1, [v1, v2, v], [e1, f2, f1]);
        self.set_triangle(t2, [v2, v0, v], [e2, f0, f2]);

        self.set_edge(f0, v0, v, t2, t0);
        self.set_edge(f1, v1, v, t0, t1);
        self.set_edge(f2, v2, v, t1, t2);

        self.fix_edge(e1, t0, t1);
        self.fix_edge(e2, t0, t2);

        self.legalize_edges(&[e0, e1, e2]);
        true
    }

    /// Splits edge `e` at vertex `v`: the two incident triangles become
    /// four, with two new edges radiating from `v`. The lock state carries
    /// over to both sub-edges and the incident triangles' inside flags to
    /// the replacement pair on each side.
    pub(crate) fn insert_on_edge(&mut self, v: VertexId, e: EdgeId) -> bool {
        let ed = *self.store.edge(e);
        let [t0, t1] = ed.triangles;
        let [v0, v2] = ed.vertices;
        let (e2, e3, v3) = self.store.triangle(t0).adjacent_edges(e);
        let (e0, e1, v1) = self.store.triangle(t1).adjacent_edges(e);

        let i0 = self.store.triangle(t0).inside;
        let i1 = self.store.triangle(t1).inside;
        let locked = ed.locked;

        let t2 = self.new_triangle();
        let t3 = self.new_triangle();
        let f0 = self.new_edge();
        let f1 = self.new_edge();
        let f2 = self.new_edge();

        self.set_triangle(t0, [v3, v0, v], [e3, e, f2]);
        self.set_triangle(t1, [v0, v1, v], [e0, f0, e]);
        self.set_triangle(t2, [v1, v2, v], [e1, f1, f0]);
        self.set_triangle(t3, [v2, v3, v], [e2, f2, f1]);

        self.set_edge(e, v0, v, t0, t1);
        self.set_edge(f0, v1, v, t1, t2);
        self.set_edge(f1, v2, v, t2, t3);
        self.set_edge(f2, v3, v, t3, t0);

        self.fix_edge(e1, t1, t2);
        self.fix_edge(e2, t0, t3);

        self.store.triangle_mut(t0).inside = i0;
        self.store.triangle_mut(t1).inside = i1;
        self.store.triangle_mut(t2).inside = i1;
        self.store.triangle_mut(t3).inside = i0;

        self.store.edge_mut(e).locked = locked;
        self.store.edge_mut(f1).locked = locked;

        let mut seeds = Vec::with_capacity(4);
        if i0 {
            seeds.extend([e2, e3]);
        }
        if i1 {
            seeds.extend([e0, e1]);
        }
        self.legalize_edges(&seeds);
        true
    }
}
