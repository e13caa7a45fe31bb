//! Core identifier and output types.

use glam::Vec3;

/// Identifier of an input point: its index in the input slice. Ids double as
/// the total order driving the incremental construction.
pub type PointId = u32;

/// Vertex ids of a hull facet, in construction order. Used directly as the
/// facet-map key; a facet is identified by the exact triple it was built with.
pub type Tri = [PointId; 3];

/// An input point paired with its id, as carried through conflict lists.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Point {
    pub id: PointId,
    pub pos: Vec3,
}

/// Canonical undirected edge key: smaller id first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct EdgeKey(PointId, PointId);

impl EdgeKey {
    pub fn new(a: PointId, b: PointId) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }
}

/// A triangular facet of the convex hull, with indices into the input points.
/// Vertex order follows construction; no consistent winding is guaranteed.
#[derive(Debug, Clone)]
pub struct HullFacet {
    pub indices: Tri,
}

/// Result of computing a 3-D convex hull. Facets are in no meaningful order.
#[derive(Debug)]
pub struct ConvexHull {
    pub facets: Vec<HullFacet>,
}
