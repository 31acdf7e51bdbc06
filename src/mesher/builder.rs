use std::f64::consts::FRAC_PI_3;

use crate::error::CapacityError;
use crate::math::{predicates, Point2};
use crate::topology::{
    EdgeData, EdgeId, TopologyStore, TriangleData, TriangleId, VertexId,
};

use super::{MeshReport, MesherOptions};

/// Circumradius of the covering triangle; large enough to enclose any sane
/// input geometry.
pub(crate) const COVER_RADIUS: f64 = 1.0e10;

/// Exponent applied to the perimeter when normalizing the quality score in
/// ungraded mode. A tuning constant, not a load-bearing invariant.
const QUALITY_PERIMETER_EXPONENT: i32 = 2;

/// The mutable meshing engine: one topology store plus the walk cache and
/// the completion status accumulated across stages. Exists only for the
/// duration of one meshing run, then freezes into a [`Mesh`](super::Mesh).
pub(crate) struct MeshBuilder {
    pub(crate) store: TopologyStore,
    pub(crate) options: MesherOptions,
    pub(crate) last_triangle: Option<TriangleId>,
    pub(crate) report: MeshReport,
}

impl MeshBuilder {
    /// Allocates the store and seeds the cover vertices followed by the
    /// input vertices, in input order.
    ///
    /// # Errors
    ///
    /// Returns [`CapacityError`] if the arenas cannot be allocated.
    pub(crate) fn new(vertices: &[Point2], options: MesherOptions) -> Result<Self, CapacityError> {
        let mut store = TopologyStore::with_budget(vertices.len(), options.max_vertices)?;
        for i in 0..3 {
            let angle = f64::from(i) * (2.0 * std::f64::consts::PI / 3.0);
            let p = Point2::new(COVER_RADIUS * angle.cos(), COVER_RADIUS * angle.sin());
            let added = store.add_vertex(p);
            assert!(added.is_some(), "cover vertex exceeds arena");
        }
        for p in vertices {
            let added = store.add_vertex(*p);
            assert!(added.is_some(), "input vertex exceeds arena");
        }
        Ok(Self {
            store,
            options,
            last_triangle: None,
            report: MeshReport::default(),
        })
    }

    /// Appends an inert triangle slot, to be wired by [`Self::set_triangle`].
    pub(crate) fn new_triangle(&mut self) -> TriangleId {
        self.store.add_triangle(TriangleData {
            vertices: [VertexId(0); 3],
            edges: [EdgeId(0); 3],
            min_angle: 0.0,
            quality: 0.0,
            area: 0.0,
            inside: true,
        })
    }

    /// Appends an inert edge slot, to be wired by [`Self::set_edge`].
    pub(crate) fn new_edge(&mut self) -> EdgeId {
        self.store.add_edge(EdgeData {
            vertices: [VertexId(0); 2],
            triangles: [TriangleId(0); 2],
            locked: false,
        })
    }

    /// Rewires triangle `t` and refreshes its cached metrics. Resets the
    /// inside flag to true; callers restore it where the previous value must
    /// survive. Edge slot `i` must join vertex slots `i` and `(i + 1) % 3`.
    pub(crate) fn set_triangle(&mut self, t: TriangleId, vertices: [VertexId; 3], edges: [EdgeId; 3]) {
        let (min_angle, quality, area) = self.triangle_metrics(vertices);
        let td = self.store.triangle_mut(t);
        td.vertices = vertices;
        td.edges = edges;
        td.min_angle = min_angle;
        td.quality = quality;
        td.area = area;
        td.inside = true;
    }

    /// Rewires edge `e`. `t0` must be the triangle in which the edge runs
    /// `v0 -> v1` with the winding; `t1` sees it reversed. Clears the lock;
    /// callers restore it where a constraint edge is being re-pointed.
    pub(crate) fn set_edge(
        &mut self,
        e: EdgeId,
        v0: VertexId,
        v1: VertexId,
        t0: TriangleId,
        t1: TriangleId,
    ) {
        let ed = self.store.edge_mut(e);
        ed.vertices = [v0, v1];
        ed.triangles = [t0, t1];
        ed.locked = false;
    }

    /// Re-points the incident-triangle slot of `e` holding `from` to `to`.
    pub(crate) fn fix_edge(&mut self, e: EdgeId, from: TriangleId, to: TriangleId) {
        let ed = self.store.edge_mut(e);
        if ed.triangles[0] == from {
            ed.triangles[0] = to;
        } else {
            assert!(ed.triangles[1] == from, "edge does not reference triangle");
            ed.triangles[1] = to;
        }
    }

    /// Orientation of vertex `c` against the directed line `a -> b`, routed
    /// through the cover-anchored formula when `c` is a cover vertex.
    pub(crate) fn orientation_between(&self, a: VertexId, b: VertexId, c: VertexId) -> f64 {
        let pa = self.store.point(a);
        let pb = self.store.point(b);
        let pc = self.store.point(c);
        if self.store.is_cover_vertex(c) {
            predicates::cover_orientation(&pa, &pb, &pc)
        } else {
            predicates::orientation(&pa, &pb, &pc)
        }
    }

    /// Whether any of the three vertices belongs to the covering triangle.
    pub(crate) fn has_cover_vertex(&self, a: VertexId, b: VertexId, c: VertexId) -> bool {
        self.store.is_cover_vertex(a)
            || self.store.is_cover_vertex(b)
            || self.store.is_cover_vertex(c)
    }

    /// Cached metrics for a triangle over the given corners: raw minimum
    /// interior angle in degrees, the mode-dependent quality score, and the
    /// signed area.
    fn triangle_metrics(&self, [va, vb, vc]: [VertexId; 3]) -> (f64, f64, f64) {
        let pa = self.store.point(va);
        let pb = self.store.point(vb);
        let pc = self.store.point(vc);
        let angles = predicates::interior_angles(&pa, &pb, &pc);
        let min_angle = angles[0].min(angles[1]).min(angles[2]).to_degrees();

        // An angle pinched between two constraint segments at an input vertex
        // cannot be improved by refinement; rank it as if it were 60 degrees.
        let mut adjusted = angles;
        if self.is_segment_corner(vc, va, vb) {
            adjusted[0] = FRAC_PI_3;
        }
        if self.is_segment_corner(va, vb, vc) {
            adjusted[1] = FRAC_PI_3;
        }
        if self.is_segment_corner(vb, vc, va) {
            adjusted[2] = FRAC_PI_3;
        }
        let amin = adjusted[0].min(adjusted[1]).min(adjusted[2]);

        let quality = if self.options.grading {
            amin.to_degrees()
        } else {
            let d = predicates::perimeter(&pa, &pb, &pc);
            amin / d.powi(QUALITY_PERIMETER_EXPONENT)
        };

        let area = predicates::signed_area(&pa, &pb, &pc);
        (min_angle, quality, area)
    }

    /// Whether `v` is a non-Steiner vertex whose angle between `prev` and
    /// `next` is enclosed by two constraint segments.
    fn is_segment_corner(&self, prev: VertexId, v: VertexId, next: VertexId) -> bool {
        !self.store.is_steiner(v)
            && self.store.find_segment(prev, v).is_some()
            && self.store.find_segment(v, next).is_some()
    }
}
