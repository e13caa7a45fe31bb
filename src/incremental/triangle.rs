//! Facet state shared between recursive ridge resolutions.

use std::ops::Deref;
use std::sync::Arc;

use crate::types::{Point, PointId, Tri};

/// Priority of a facet: the lowest-id point still visible from it, or
/// `Resolved` once nothing is. The derived order places `Resolved` after
/// every `Pending` id, giving a total order over ids plus the sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Priority {
    Pending(PointId),
    Resolved,
}

/// A hull facet under construction.
///
/// Immutable once built: "replacing" a facet always allocates a new
/// `Triangle`, so concurrent readers of an old one never see it change.
#[derive(Debug)]
pub(crate) struct Triangle {
    /// Vertex ids, in construction order. Also the facet-map key.
    pub verts: Tri,
    /// A hull point on the interior side of this facet's plane; the reference
    /// for every visibility test against it.
    pub apex: PointId,
    /// Points visible from the outward side, ascending by id.
    pub conflicts: Vec<Point>,
}

impl Triangle {
    pub fn priority(&self) -> Priority {
        match self.conflicts.first() {
            Some(p) => Priority::Pending(p.id),
            None => Priority::Resolved,
        }
    }
}

/// Shared handle to an immutable [`Triangle`].
///
/// Equality is pointer identity, not structural: the ridge-owner map stores
/// these as values and must distinguish "my entry" from "the other facet's
/// entry" even if both facets were built from equal data.
#[derive(Debug, Clone)]
pub(crate) struct TriRef(Arc<Triangle>);

impl TriRef {
    pub fn new(triangle: Triangle) -> Self {
        Self(Arc::new(triangle))
    }
}

impl Deref for TriRef {
    type Target = Triangle;

    fn deref(&self) -> &Triangle {
        &self.0
    }
}

impl PartialEq for TriRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for TriRef {}

/// Merge two conflict lists (each ascending by id) into one ascending list
/// with duplicate ids collapsed.
pub(crate) fn merge_conflicts(left: &[Point], right: &[Point]) -> Vec<Point> {
    let mut out = Vec::with_capacity(left.len() + right.len());
    let (mut i, mut j) = (0, 0);
    while i < left.len() && j < right.len() {
        if left[i].id <= right[j].id {
            out.push(left[i]);
            i += 1;
        } else {
            out.push(right[j]);
            j += 1;
        }
    }
    out.extend_from_slice(&left[i..]);
    out.extend_from_slice(&right[j..]);
    out.dedup_by_key(|p| p.id);
    out
}
