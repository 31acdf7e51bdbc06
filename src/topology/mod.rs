pub mod edge;
pub mod segment;
pub mod triangle;
pub mod vertex;

pub use edge::{EdgeData, EdgeId};
pub use segment::{SegmentData, SegmentId};
pub use triangle::{TriangleData, TriangleId};
pub use vertex::{VertexData, VertexId};

use crate::error::{CapacityError, TopologyError};
use crate::math::Point2;

/// Central arena that owns all topological entities of one meshing run.
///
/// Entities reference each other via typed slot indices. All arenas are
/// append-only and sized up front from an Euler-formula bound on the vertex
/// budget, so indices stay valid for the lifetime of the run and no
/// reallocation ever happens mid-algorithm.
#[derive(Debug)]
pub struct TopologyStore {
    vertices: Vec<VertexData>,
    edges: Vec<EdgeData>,
    triangles: Vec<TriangleData>,
    segments: Vec<SegmentData>,
    input_vertex_count: usize,
    steiner_start: usize,
    max_vertices: usize,
    max_edges: usize,
    max_triangles: usize,
    max_segments: usize,
}

fn reserve<T>(n: usize, arena: &'static str) -> Result<Vec<T>, CapacityError> {
    let mut v = Vec::new();
    v.try_reserve_exact(n)
        .map_err(|_| CapacityError::ArenaAllocation {
            arena,
            requested: n,
        })?;
    Ok(v)
}

impl TopologyStore {
    /// Creates a store for `input_vertex_count` input vertices and a total
    /// vertex budget of at least `max_vertices`.
    ///
    /// The effective vertex capacity is `max(max_vertices,
    /// input_vertex_count) + 3` (three slots for the covering triangle);
    /// edge, triangle and segment capacities follow from the Euler bound on
    /// a planar triangulation of that many vertices.
    ///
    /// # Errors
    ///
    /// Returns [`CapacityError`] if any arena cannot be allocated.
    pub fn with_budget(
        input_vertex_count: usize,
        max_vertices: usize,
    ) -> Result<Self, CapacityError> {
        let max_v = max_vertices.max(input_vertex_count) + 3;
        let max_e = 3 * max_v - 6;
        let max_t = 2 * max_v - 5 + 1;
        let max_s = 3 * max_v - 6;
        Ok(Self {
            vertices: reserve(max_v, "vertex")?,
            edges: reserve(max_e, "edge")?,
            triangles: reserve(max_t, "triangle")?,
            segments: reserve(max_s, "segment")?,
            input_vertex_count,
            steiner_start: input_vertex_count + 3,
            max_vertices: max_v,
            max_edges: max_e,
            max_triangles: max_t,
            max_segments: max_s,
        })
    }

    // --- Vertices ---

    /// Appends a vertex, or returns `None` if the vertex budget is spent.
    ///
    /// Running out of vertices is the one recoverable capacity condition;
    /// recovery and refinement stop early when it happens.
    #[allow(clippy::cast_possible_truncation)]
    pub fn add_vertex(&mut self, point: Point2) -> Option<VertexId> {
        if self.vertices.len() >= self.max_vertices {
            return None;
        }
        let id = VertexId(self.vertices.len() as u32);
        self.vertices.push(VertexData::new(point));
        Some(id)
    }

    /// Returns the vertex data for `id`.
    #[must_use]
    pub fn vertex(&self, id: VertexId) -> &VertexData {
        &self.vertices[id.index()]
    }

    /// Returns the position of vertex `id`.
    #[must_use]
    pub fn point(&self, id: VertexId) -> Point2 {
        self.vertices[id.index()].point
    }

    /// Whether `id` is one of the three covering-triangle vertices.
    #[must_use]
    pub fn is_cover_vertex(&self, id: VertexId) -> bool {
        id.index() < 3
    }

    /// Whether `id` was created by the mesher rather than supplied as input.
    #[must_use]
    pub fn is_steiner(&self, id: VertexId) -> bool {
        id.index() >= self.steiner_start
    }

    // --- Edges ---

    /// Appends an edge.
    ///
    /// The Euler bound guarantees the edge arena cannot overflow while the
    /// vertex budget holds; overflowing it is a logic defect.
    #[allow(clippy::cast_possible_truncation)]
    pub fn add_edge(&mut self, data: EdgeData) -> EdgeId {
        assert!(self.edges.len() < self.max_edges, "edge arena overflow");
        let id = EdgeId(self.edges.len() as u32);
        self.edges.push(data);
        id
    }

    /// Returns the edge data for `id`.
    #[must_use]
    pub fn edge(&self, id: EdgeId) -> &EdgeData {
        &self.edges[id.index()]
    }

    /// Returns a mutable reference to the edge data for `id`.
    pub fn edge_mut(&mut self, id: EdgeId) -> &mut EdgeData {
        &mut self.edges[id.index()]
    }

    /// Finds the edge joining `v0` and `v1`, in either order.
    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn find_edge(&self, v0: VertexId, v1: VertexId) -> Option<EdgeId> {
        self.edges
            .iter()
            .position(|e| e.vertices == [v0, v1] || e.vertices == [v1, v0])
            .map(|i| EdgeId(i as u32))
    }

    // --- Triangles ---

    /// Appends a triangle.
    #[allow(clippy::cast_possible_truncation)]
    pub fn add_triangle(&mut self, data: TriangleData) -> TriangleId {
        assert!(
            self.triangles.len() < self.max_triangles,
            "triangle arena overflow"
        );
        let id = TriangleId(self.triangles.len() as u32);
        self.triangles.push(data);
        id
    }

    /// Returns the triangle data for `id`.
    #[must_use]
    pub fn triangle(&self, id: TriangleId) -> &TriangleData {
        &self.triangles[id.index()]
    }

    /// Returns a mutable reference to the triangle data for `id`.
    pub fn triangle_mut(&mut self, id: TriangleId) -> &mut TriangleData {
        &mut self.triangles[id.index()]
    }

    // --- Segments ---

    /// Appends a constraint segment.
    #[allow(clippy::cast_possible_truncation)]
    pub fn add_segment(&mut self, data: SegmentData) -> SegmentId {
        assert!(
            self.segments.len() < self.max_segments,
            "segment arena overflow"
        );
        let id = SegmentId(self.segments.len() as u32);
        self.segments.push(data);
        id
    }

    /// Returns the segment data for `id`.
    #[must_use]
    pub fn segment(&self, id: SegmentId) -> &SegmentData {
        &self.segments[id.index()]
    }

    /// Returns a mutable reference to the segment data for `id`.
    pub fn segment_mut(&mut self, id: SegmentId) -> &mut SegmentData {
        &mut self.segments[id.index()]
    }

    /// Finds a segment joining `v0` and `v1`, in either order.
    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn find_segment(&self, v0: VertexId, v1: VertexId) -> Option<SegmentId> {
        self.segments
            .iter()
            .position(|s| s.vertices == [v0, v1] || s.vertices == [v1, v0])
            .map(|i| SegmentId(i as u32))
    }

    // --- Counts and slices ---

    /// Number of live vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of caller-supplied input vertices.
    #[must_use]
    pub fn input_vertex_count(&self) -> usize {
        self.input_vertex_count
    }

    /// Number of live edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of live triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Number of live constraint segments.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// The vertex budget, covering-triangle slots included.
    #[must_use]
    pub fn max_vertex_count(&self) -> usize {
        self.max_vertices
    }

    /// All vertices, in slot order.
    #[must_use]
    pub fn vertices(&self) -> &[VertexData] {
        &self.vertices
    }

    /// All edges, in slot order.
    #[must_use]
    pub fn edges(&self) -> &[EdgeData] {
        &self.edges
    }

    /// All triangles, in slot order.
    #[must_use]
    pub fn triangles(&self) -> &[TriangleData] {
        &self.triangles
    }

    /// All constraint segments, in slot order.
    #[must_use]
    pub fn segments(&self) -> &[SegmentData] {
        &self.segments
    }

    // --- Invariants ---

    /// Checks the structural invariants of the store: every triangle's edge
    /// slots join the matching vertex pair, every edge is referenced back by
    /// both of its incident triangles, and every locked edge is backed by a
    /// segment.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant. A violation is a defect in
    /// topology maintenance, never a property of the input.
    #[allow(clippy::cast_possible_truncation)]
    pub fn validate(&self) -> Result<(), TopologyError> {
        for (ti, t) in self.triangles.iter().enumerate() {
            for slot in 0..3 {
                let e = self.edge(t.edges[slot]);
                let a = t.vertices[slot];
                let b = t.vertices[(slot + 1) % 3];
                if e.vertices != [a, b] && e.vertices != [b, a] {
                    return Err(TopologyError::MisalignedEdge {
                        triangle: ti as u32,
                        slot,
                    });
                }
            }
        }
        for (ei, e) in self.edges.iter().enumerate() {
            for t in e.triangles {
                if !self.triangle(t).edges.contains(&EdgeId(ei as u32)) {
                    return Err(TopologyError::DanglingEdge {
                        edge: ei as u32,
                        triangle: t.0,
                    });
                }
            }
            if e.locked && self.find_segment(e.vertices[0], e.vertices[1]).is_none() {
                return Err(TopologyError::LockedWithoutSegment(ei as u32));
            }
        }
        Ok(())
    }
}
