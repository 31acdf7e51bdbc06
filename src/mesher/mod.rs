mod builder;
mod classify;
mod insert;
mod legalize;
mod locate;
mod refine;
mod segments;

use std::io;

use log::debug;

use crate::error::{InputError, Result, TopologyError};
use crate::math::Point2;
use crate::topology::{EdgeData, SegmentData, TopologyStore, TriangleData, VertexData};

use builder::MeshBuilder;

/// Options controlling one meshing run.
///
/// The defaults mirror a quality run: grading at 30 degrees with hull
/// closure, no automatic boundary, a budget of 500 vertices.
#[derive(Debug, Clone, Copy)]
pub struct MesherOptions {
    /// Auto-close the first contiguous input range as a boundary polygon,
    /// unless the explicit segments already start one.
    pub segment_boundary: bool,
    /// Emit hull-closing segments for otherwise unconstrained outer
    /// vertices.
    pub convex_hull: bool,
    /// Stop refinement once the worst inside triangle meets
    /// `grading_lower_angle`; without it refinement runs to the vertex
    /// budget.
    pub grading: bool,
    /// Lower angle bound for graded refinement, in degrees.
    pub grading_lower_angle: f64,
    /// Triangulation-only diagnostic mode: skip constraint recovery and
    /// refinement entirely.
    pub basic_mesh: bool,
    /// Maximum number of vertices the run may create, input included.
    pub max_vertices: usize,
}

impl Default for MesherOptions {
    fn default() -> Self {
        Self {
            segment_boundary: false,
            convex_hull: true,
            grading: true,
            grading_lower_angle: 30.0,
            basic_mesh: false,
            max_vertices: 500,
        }
    }
}

/// A constraint segment given as 1-based indices into the input vertex
/// sequence.
#[derive(Debug, Clone, Copy)]
pub struct SegmentIndices {
    /// 1-based index of the first endpoint.
    pub start: u32,
    /// 1-based index of the second endpoint.
    pub end: u32,
}

/// Completion status of one meshing run.
///
/// Both conditions are recoverable degradations: the returned mesh is valid
/// and queryable either way.
#[derive(Debug, Clone, Default)]
pub struct MeshReport {
    /// The vertex budget ran out before constraint recovery or refinement
    /// finished; the triangulation is valid but not fully conforming or
    /// refined.
    pub vertex_budget_exhausted: bool,
    /// Hole markers that could not be located inside any triangle; their
    /// interiors were not excised.
    pub unlocated_holes: Vec<Point2>,
}

/// Batch constrained-Delaunay mesh generator.
///
/// One [`Mesher::mesh`] call processes one input geometry to completion and
/// returns a read-only [`Mesh`].
#[derive(Debug, Default)]
pub struct Mesher {
    options: MesherOptions,
}

impl Mesher {
    /// Creates a mesher with the given options.
    #[must_use]
    pub fn new(options: MesherOptions) -> Self {
        Self { options }
    }

    /// Triangulates `vertices` with optional constraint `segments` (1-based
    /// index pairs) and `holes` (marker points inside regions to excise).
    ///
    /// # Errors
    ///
    /// Returns an error for out-of-range or degenerate segment indices, or
    /// if the topology arenas cannot be allocated. Capacity exhaustion
    /// mid-run and unlocatable holes are not errors; they are reported via
    /// [`Mesh::report`].
    pub fn mesh(
        &self,
        vertices: &[Point2],
        segments: &[SegmentIndices],
        holes: &[Point2],
    ) -> Result<Mesh> {
        for s in segments {
            for index in [s.start, s.end] {
                if index == 0 || index as usize > vertices.len() {
                    return Err(InputError::SegmentIndexOutOfRange {
                        index,
                        count: vertices.len(),
                    }
                    .into());
                }
            }
            if s.start == s.end {
                return Err(InputError::DegenerateSegment(s.start).into());
            }
        }

        let mut builder = MeshBuilder::new(vertices, self.options)?;

        if self.options.segment_boundary {
            builder.auto_segment_boundary(segments);
        }
        for s in segments {
            builder.add_input_segment(*s);
        }

        builder.triangulate_input();
        debug!(
            "triangulated {} input vertices into {} triangles",
            vertices.len(),
            builder.store.triangle_count()
        );

        if self.options.basic_mesh {
            builder.lock_segment_edges();
            builder.classify_with_holes(holes);
        } else {
            if self.options.convex_hull {
                builder.emit_hull_segments();
            }
            let conforming = builder.recover_segments();
            builder.lock_segment_edges();
            if conforming {
                builder.classify_with_holes(holes);
            } else {
                builder.report.vertex_budget_exhausted = true;
                builder.classify_convex();
            }
            builder.refine();
        }

        Ok(builder.finish(holes))
    }
}

impl MeshBuilder {
    /// Freezes the builder into a read-only mesh.
    fn finish(self, holes: &[Point2]) -> Mesh {
        let inside_triangle_count = self
            .store
            .triangles()
            .iter()
            .filter(|t| t.inside)
            .count();
        Mesh {
            store: self.store,
            holes: holes.to_vec(),
            inside_triangle_count,
            report: self.report,
        }
    }
}

/// A finished triangulation: read-only query surface over the topology
/// produced by one [`Mesher::mesh`] call.
#[derive(Debug)]
pub struct Mesh {
    store: TopologyStore,
    holes: Vec<Point2>,
    inside_triangle_count: usize,
    report: MeshReport,
}

impl Mesh {
    /// Number of vertices, cover and Steiner vertices included.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.store.vertex_count()
    }

    /// Number of caller-supplied input vertices.
    #[must_use]
    pub fn input_vertex_count(&self) -> usize {
        self.store.input_vertex_count()
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.store.edge_count()
    }

    /// Number of triangles, inside or not.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.store.triangle_count()
    }

    /// Number of constraint segments after recovery.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.store.segment_count()
    }

    /// Number of hole markers supplied to the run.
    #[must_use]
    pub fn hole_count(&self) -> usize {
        self.holes.len()
    }

    /// Number of triangles marked inside.
    #[must_use]
    pub fn inside_triangle_count(&self) -> usize {
        self.inside_triangle_count
    }

    /// All vertices, in slot order.
    #[must_use]
    pub fn vertices(&self) -> &[VertexData] {
        self.store.vertices()
    }

    /// All edges, in slot order.
    #[must_use]
    pub fn edges(&self) -> &[EdgeData] {
        self.store.edges()
    }

    /// All triangles, in slot order.
    #[must_use]
    pub fn triangles(&self) -> &[TriangleData] {
        self.store.triangles()
    }

    /// All constraint segments, in slot order.
    #[must_use]
    pub fn segments(&self) -> &[SegmentData] {
        self.store.segments()
    }

    /// The hole markers supplied to the run.
    #[must_use]
    pub fn holes(&self) -> &[Point2] {
        &self.holes
    }

    /// The triangles marked inside.
    pub fn inside_triangles(&self) -> impl Iterator<Item = &TriangleData> {
        self.store.triangles().iter().filter(|t| t.inside)
    }

    /// The corner positions of a triangle.
    #[must_use]
    pub fn triangle_points(&self, t: &TriangleData) -> [Point2; 3] {
        t.vertices.map(|v| self.store.point(v))
    }

    /// Completion status of the run.
    #[must_use]
    pub fn report(&self) -> &MeshReport {
        &self.report
    }

    /// Checks the structural invariants of the underlying store.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant; see
    /// [`TopologyStore::validate`].
    pub fn validate(&self) -> std::result::Result<(), TopologyError> {
        self.store.validate()
    }

    /// Writes a human-readable dump: a summary header followed by one line
    /// per triangle with its corner coordinates, inside flag, minimum angle
    /// and quality score. A trace format for humans and test harnesses, not
    /// a stable machine interface.
    ///
    /// # Errors
    ///
    /// Propagates writer errors.
    pub fn write_diagnostics<W: io::Write>(&self, w: &mut W) -> io::Result<()> {
        writeln!(
            w,
            "vertices : {} ({} input)",
            self.vertex_count(),
            self.input_vertex_count()
        )?;
        writeln!(w, "edges    : {}", self.edge_count())?;
        writeln!(w, "segments : {}", self.segment_count())?;
        writeln!(w, "holes    : {}", self.hole_count())?;
        writeln!(
            w,
            "triangles: {} ({} inside)",
            self.triangle_count(),
            self.inside_triangle_count()
        )?;
        for (i, t) in self.store.triangles().iter().enumerate() {
            let [a, b, c] = self.triangle_points(t);
            writeln!(
                w,
                "{i:04};{:6.2};{:6.2};{:6.2};{:6.2};{:6.2};{:6.2};{};{:6.2};{:6.2}",
                a.x,
                a.y,
                b.x,
                b.y,
                c.x,
                c.y,
                u8::from(t.inside),
                t.min_angle,
                t.quality
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::cast_possible_truncation)]
mod tests {
    use std::f64::consts::PI;

    use approx::assert_relative_eq;

    use super::builder::MeshBuilder;
    use super::*;
    use crate::math::predicates;
    use crate::topology::EdgeId;

    fn regular_polygon(n: u32, radius: f64) -> Vec<Point2> {
        (0..n)
            .map(|i| {
                let angle = f64::from(i) * (2.0 * PI / f64::from(n));
                Point2::new(radius * angle.cos(), radius * angle.sin())
            })
            .collect()
    }

    fn polygon_area(points: &[Point2]) -> f64 {
        let n = points.len();
        let mut sum = 0.0;
        for i in 0..n {
            let j = (i + 1) % n;
            sum += points[i].x * points[j].y - points[j].x * points[i].y;
        }
        sum * 0.5
    }

    /// Octagon ring: outer radius 5, inner radius 2, one hole marker at the
    /// origin, inner boundary given as explicit segments.
    fn ring_input() -> (Vec<Point2>, Vec<SegmentIndices>, Vec<Point2>) {
        let mut vertices = regular_polygon(8, 5.0);
        vertices.extend(regular_polygon(8, 2.0));
        let segments = (0..8)
            .map(|i| SegmentIndices {
                start: 9 + i,
                end: 9 + (i + 1) % 8,
            })
            .collect();
        (vertices, segments, vec![Point2::new(0.0, 0.0)])
    }

    fn ring_options() -> MesherOptions {
        MesherOptions {
            segment_boundary: true,
            ..MesherOptions::default()
        }
    }

    #[test]
    fn unit_square_basic_mesh() {
        let square = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ];
        let options = MesherOptions {
            segment_boundary: true,
            basic_mesh: true,
            ..MesherOptions::default()
        };
        let mesh = Mesher::new(options).mesh(&square, &[], &[]).unwrap();
        assert_eq!(mesh.inside_triangle_count(), 2);
        let total: f64 = mesh.inside_triangles().map(|t| t.area).sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-9);
        mesh.validate().unwrap();
    }

    #[test]
    fn octagon_ring_conserves_area() {
        let (vertices, segments, holes) = ring_input();
        let mesh = Mesher::new(ring_options())
            .mesh(&vertices, &segments, &holes)
            .unwrap();

        assert!(mesh.report().unlocated_holes.is_empty());
        assert!(mesh.inside_triangle_count() > 0);

        let expected = polygon_area(&regular_polygon(8, 5.0)) - polygon_area(&regular_polygon(8, 2.0));
        let total: f64 = mesh.inside_triangles().map(|t| t.area).sum();
        assert_relative_eq!(total, expected, max_relative = 1e-3);
        mesh.validate().unwrap();
    }

    #[test]
    fn octagon_ring_meets_quality_target() {
        let (vertices, segments, holes) = ring_input();
        let mesh = Mesher::new(ring_options())
            .mesh(&vertices, &segments, &holes)
            .unwrap();
        if !mesh.report().vertex_budget_exhausted {
            for t in mesh.inside_triangles() {
                assert!(t.quality >= 30.0 - 1e-9);
            }
        }
    }

    #[test]
    fn convex_hull_closes_unconstrained_boundary() {
        let octagon = regular_polygon(8, 5.0);
        let mesh = Mesher::new(MesherOptions::default())
            .mesh(&octagon, &[], &[])
            .unwrap();
        assert!(mesh.segment_count() >= 8);
        let total: f64 = mesh.inside_triangles().map(|t| t.area).sum();
        assert_relative_eq!(total, polygon_area(&octagon), max_relative = 1e-3);
        mesh.validate().unwrap();
    }

    #[test]
    fn runs_are_deterministic() {
        let (vertices, segments, holes) = ring_input();
        let mesher = Mesher::new(ring_options());
        let a = mesher.mesh(&vertices, &segments, &holes).unwrap();
        let b = mesher.mesh(&vertices, &segments, &holes).unwrap();
        assert_eq!(a.vertex_count(), b.vertex_count());
        assert_eq!(a.edge_count(), b.edge_count());
        assert_eq!(a.triangle_count(), b.triangle_count());
        assert_eq!(a.segment_count(), b.segment_count());
        for (va, vb) in a.vertices().iter().zip(b.vertices()) {
            assert_eq!(va.point.x.to_bits(), vb.point.x.to_bits());
            assert_eq!(va.point.y.to_bits(), vb.point.y.to_bits());
        }
    }

    #[test]
    fn vertex_budget_is_respected() {
        let (vertices, segments, holes) = ring_input();
        let options = MesherOptions {
            max_vertices: 40,
            ..ring_options()
        };
        let mesh = Mesher::new(options).mesh(&vertices, &segments, &holes).unwrap();
        assert!(mesh.vertex_count() <= 43);
        mesh.validate().unwrap();
    }

    #[test]
    fn unlocatable_hole_is_reported_not_fatal() {
        let square = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ];
        let options = MesherOptions {
            segment_boundary: true,
            convex_hull: false,
            ..MesherOptions::default()
        };
        let mesh = Mesher::new(options)
            .mesh(&square, &[], &[Point2::new(100.0, 100.0)])
            .unwrap();
        assert_eq!(mesh.report().unlocated_holes.len(), 1);
        assert!(mesh.inside_triangle_count() > 0);
    }

    #[test]
    fn pinched_star_refines_or_exhausts() {
        // Heptagram {7/2}: traversing the circle two steps at a time yields a
        // self-intersecting boundary with pinch points at the crossings.
        let star: Vec<Point2> = (0..7)
            .map(|k| {
                let angle = f64::from(k) * (4.0 * PI / 7.0);
                Point2::new(5.0 * angle.cos(), 5.0 * angle.sin())
            })
            .collect();
        let options = MesherOptions {
            segment_boundary: true,
            convex_hull: false,
            grading: true,
            grading_lower_angle: 20.0,
            ..MesherOptions::default()
        };
        let mesh = Mesher::new(options).mesh(&star, &[], &[]).unwrap();
        assert!(mesh.vertex_count() <= 503);
        if !mesh.report().vertex_budget_exhausted {
            for t in mesh.inside_triangles() {
                assert!(t.quality >= 20.0 - 1e-9);
            }
        }
        mesh.validate().unwrap();
    }

    #[test]
    fn segment_index_validation() {
        let square = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ];
        let mesher = Mesher::default();
        assert!(mesher
            .mesh(&square, &[SegmentIndices { start: 1, end: 5 }], &[])
            .is_err());
        assert!(mesher
            .mesh(&square, &[SegmentIndices { start: 0, end: 2 }], &[])
            .is_err());
        assert!(mesher
            .mesh(&square, &[SegmentIndices { start: 2, end: 2 }], &[])
            .is_err());
    }

    #[test]
    fn diagnostics_dump_lists_every_triangle() {
        let (vertices, segments, holes) = ring_input();
        let mesh = Mesher::new(ring_options())
            .mesh(&vertices, &segments, &holes)
            .unwrap();
        let mut out = Vec::new();
        mesh.write_diagnostics(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text.lines().count(),
            5 + mesh.triangle_count(),
            "header plus one line per triangle"
        );
    }

    #[test]
    fn triangulation_is_a_flip_fixed_point() {
        let (vertices, _, _) = ring_input();
        let mut builder = MeshBuilder::new(&vertices, MesherOptions::default()).unwrap();
        builder.triangulate_input();

        let before: Vec<_> = builder
            .store
            .triangles()
            .iter()
            .map(|t| t.vertices)
            .collect();
        let all_edges: Vec<EdgeId> = (0..builder.store.edge_count())
            .map(|i| EdgeId(i as u32))
            .collect();
        builder.legalize_edges(&all_edges);
        let after: Vec<_> = builder
            .store
            .triangles()
            .iter()
            .map(|t| t.vertices)
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn recovery_leaves_no_encroached_segment() {
        let (vertices, segments, _) = ring_input();
        let options = ring_options();
        let mut builder = MeshBuilder::new(&vertices, options).unwrap();
        builder.auto_segment_boundary(&segments);
        for s in &segments {
            builder.add_input_segment(*s);
        }
        builder.triangulate_input();
        builder.emit_hull_segments();
        assert!(builder.recover_segments(), "recovery should converge");

        for s in builder.store.segments() {
            let [v0, v1] = s.vertices;
            let e = builder.store.find_edge(v0, v1).unwrap();
            let p0 = builder.store.point(v0);
            let p1 = builder.store.point(v1);
            for t in builder.store.edge(e).triangles {
                let opposite = builder.store.triangle(t).opposite_vertex(e);
                let p = builder.store.point(opposite);
                assert!(
                    !predicates::in_diametral_circle(&p0, &p1, &p),
                    "segment still encroached after recovery"
                );
            }
        }
    }

    #[test]
    fn closure_holds_after_every_stage() {
        let (vertices, segments, holes) = ring_input();
        let options = ring_options();
        let mut builder = MeshBuilder::new(&vertices, options).unwrap();
        builder.auto_segment_boundary(&segments);
        for s in &segments {
            builder.add_input_segment(*s);
        }
        builder.triangulate_input();
        builder.store.validate().unwrap();
        builder.emit_hull_segments();
        builder.recover_segments();
        builder.store.validate().unwrap();
        builder.lock_segment_edges();
        builder.classify_with_holes(&holes);
        builder.store.validate().unwrap();
        builder.refine();
        builder.store.validate().unwrap();
    }
}
