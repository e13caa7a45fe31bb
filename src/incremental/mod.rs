//! Randomized-incremental hull construction driven by parallel ridge
//! resolution.
//!
//! Follows Blelloch, Gu, Shun and Sun, *Randomized Incremental Convex Hull is
//! Highly Parallel*. The hull is grown from a seed tetrahedron; each edge
//! shared by two facets ("ridge") is resolved by a recursive task that
//! compares the two facets' pending conflict points and replaces the facet
//! holding the globally lower one. The only shared mutable state is a pair of
//! claim maps: the facet set, and an ownership map that lets exactly one of
//! the two facets adjacent to a fresh ridge discover the other.

mod predicates;
mod triangle;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use claim_map::ClaimMap;
use glam::Vec3;

use crate::error::HullError;
use crate::types::{ConvexHull, EdgeKey, HullFacet, Point, PointId, Tri};
use crate::util::Timed;
use predicates::visible_points;
use triangle::{merge_conflicts, TriRef, Triangle};

/// Undirected ridge as handed between calls, before key canonicalization.
type Ridge = [PointId; 2];

/// Seed faces of the initial tetrahedron and, for each, the remaining
/// tetrahedron vertex, the interior witness its visibility tests orient by.
const SEED_TRIS: [Tri; 4] = [[0, 1, 2], [1, 2, 3], [0, 2, 3], [0, 1, 3]];
const SEED_APEX: [PointId; 4] = [3, 0, 1, 2];

/// The 6 ridges shared between pairs of seed faces.
const SEED_RIDGES: [(usize, usize, Ridge); 6] = [
    (0, 1, [1, 2]),
    (0, 2, [0, 2]),
    (0, 3, [0, 1]),
    (1, 2, [2, 3]),
    (1, 3, [1, 3]),
    (2, 3, [0, 3]),
];

/// Claim-map slots budgeted per input point. Capacity is consumed per
/// insertion call, so both maps are sized for the expected call volume with
/// a wide margin; exhaustion aborts the build.
const SLOTS_PER_POINT: usize = 6;

/// Compute the convex hull of `positions`; ids are input indices.
pub(crate) fn build(positions: &[Vec3]) -> Result<ConvexHull, HullError> {
    if positions.len() < 4 {
        return Err(HullError::InsufficientPoints(positions.len()));
    }
    HullBuilder::new(positions).run()
}

/// Structured 3-way fork-join: does not return until all three branches
/// have, and the first error wins.
#[cfg(feature = "parallel")]
fn join3<E, A, B, C>(a: A, b: B, c: C) -> Result<(), E>
where
    E: Send,
    A: FnOnce() -> Result<(), E> + Send,
    B: FnOnce() -> Result<(), E> + Send,
    C: FnOnce() -> Result<(), E> + Send,
{
    let (ra, (rb, rc)) = rayon::join(a, || rayon::join(b, c));
    ra.and(rb).and(rc)
}

#[cfg(not(feature = "parallel"))]
fn join3<E, A, B, C>(a: A, b: B, c: C) -> Result<(), E>
where
    A: FnOnce() -> Result<(), E>,
    B: FnOnce() -> Result<(), E>,
    C: FnOnce() -> Result<(), E>,
{
    a()?;
    b()?;
    c()
}

struct HullBuilder {
    points: Vec<Point>,
    /// Current hull facets. A key present and not tombstoned is on the hull.
    facets: ClaimMap<Tri, bool>,
    /// Which facet currently owns each undecided ridge.
    ridge_owners: ClaimMap<EdgeKey, TriRef>,
}

impl HullBuilder {
    fn new(positions: &[Vec3]) -> Self {
        let points: Vec<Point> = positions
            .iter()
            .enumerate()
            .map(|(i, &pos)| Point {
                id: i as PointId,
                pos,
            })
            .collect();
        let hint = SLOTS_PER_POINT * points.len();
        Self {
            facets: ClaimMap::new(hint),
            ridge_owners: ClaimMap::new(hint),
            points,
        }
    }

    fn run(&self) -> Result<ConvexHull, HullError> {
        let _t = Timed::debug("build_hull");

        for verts in SEED_TRIS {
            self.facets.insert_and_claim(verts, true)?;
        }

        // Everything beyond the seed tetrahedron, partitioned per face below.
        let remaining: Vec<Point> = self.points[4..].to_vec();

        #[cfg(feature = "parallel")]
        let seed_iter = (0..4usize).into_par_iter();
        #[cfg(not(feature = "parallel"))]
        let seed_iter = 0..4usize;

        let seeds: Vec<TriRef> = seed_iter
            .map(|i| {
                let conflicts =
                    visible_points(&self.points, SEED_TRIS[i], SEED_APEX[i], remaining.clone());
                TriRef::new(Triangle {
                    verts: SEED_TRIS[i],
                    apex: SEED_APEX[i],
                    conflicts,
                })
            })
            .collect();

        #[cfg(feature = "parallel")]
        let ridge_iter = SEED_RIDGES.par_iter();
        #[cfg(not(feature = "parallel"))]
        let ridge_iter = SEED_RIDGES.iter();

        ridge_iter.try_for_each(|&(t1, t2, ridge)| {
            self.process_ridge(&seeds[t1], ridge, &seeds[t2])
        })?;

        // All tasks have joined; the snapshot is the finished hull.
        let facets = self
            .facets
            .snapshot_keys()
            .into_iter()
            .map(|indices| HullFacet { indices })
            .collect();
        Ok(ConvexHull { facets })
    }

    /// Resolve the boundary shared by two adjacent facets.
    ///
    /// Terminal cases: neither facet sees a pending point (nothing to do), or
    /// both see the same lowest point (both facets are dropped; the cone
    /// around that point is rebuilt by the sibling calls on its other
    /// ridges). Otherwise the facet holding the globally lower point is
    /// replaced by the facet spanning the ridge and that point, and the three
    /// boundaries of the replacement are resolved in parallel.
    fn process_ridge(&self, t1: &TriRef, ridge: Ridge, t2: &TriRef) -> Result<(), HullError> {
        if t1.conflicts.is_empty() && t2.conflicts.is_empty() {
            return Ok(());
        }
        if t2.priority() == t1.priority() {
            self.facets.remove(&t1.verts);
            self.facets.remove(&t2.verts);
            return Ok(());
        }
        if t2.priority() < t1.priority() {
            return self.process_ridge(t2, ridge, t1);
        }

        let p = t1.conflicts[0].id;
        let verts = [ridge[0], ridge[1], p];
        let merged = merge_conflicts(&t1.conflicts, &t2.conflicts);
        let conflicts = visible_points(&self.points, verts, t1.apex, merged);
        let t_new = TriRef::new(Triangle {
            verts,
            apex: t1.apex,
            conflicts,
        });

        self.facets.remove(&t1.verts);
        self.facets.insert_and_claim(verts, true)?;

        join3(
            || self.process_ridge(&t_new, ridge, t2),
            || self.check_edge([ridge[0], p], &t_new),
            || self.check_edge([ridge[1], p], &t_new),
        )
    }

    /// Register `tp` as a facet adjacent to ridge `e`.
    ///
    /// The first of the two adjacent facets to get here wins the claim and
    /// parks the ridge; the second loses, retrieves the first, and resolves
    /// the ridge between them.
    fn check_edge(&self, e: Ridge, tp: &TriRef) -> Result<(), HullError> {
        let key = EdgeKey::new(e[0], e[1]);
        if self.ridge_owners.insert_and_claim(key, tp.clone())? {
            return Ok(());
        }
        let other = self
            .ridge_owners
            .get_other_value(&key, tp)
            .expect("a lost ridge claim implies the winning facet is already published");
        self.process_ridge(tp, e, &other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tetra_points() -> Vec<Vec3> {
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
        ]
    }

    fn sorted(mut tris: Vec<Tri>) -> Vec<Tri> {
        tris.sort_unstable();
        tris
    }

    #[test]
    fn resolved_ridge_is_idempotent() {
        let builder = HullBuilder::new(&tetra_points());
        for verts in SEED_TRIS {
            builder.facets.insert_and_claim(verts, true).unwrap();
        }
        let t1 = TriRef::new(Triangle {
            verts: SEED_TRIS[0],
            apex: SEED_APEX[0],
            conflicts: vec![],
        });
        let t2 = TriRef::new(Triangle {
            verts: SEED_TRIS[1],
            apex: SEED_APEX[1],
            conflicts: vec![],
        });

        let before = sorted(builder.facets.snapshot_keys());
        builder.process_ridge(&t1, [1, 2], &t2).unwrap();
        builder.process_ridge(&t1, [1, 2], &t2).unwrap();
        let after = sorted(builder.facets.snapshot_keys());
        assert_eq!(before, after);
    }

    #[test]
    fn shared_priority_drops_both_facets() {
        let points: Vec<Vec3> = tetra_points()
            .into_iter()
            .chain([Vec3::new(2.0, 2.0, 2.0)])
            .collect();
        let builder = HullBuilder::new(&points);
        for verts in SEED_TRIS {
            builder.facets.insert_and_claim(verts, true).unwrap();
        }
        let seen = Point {
            id: 4,
            pos: points[4],
        };
        let t1 = TriRef::new(Triangle {
            verts: SEED_TRIS[0],
            apex: SEED_APEX[0],
            conflicts: vec![seen],
        });
        let t2 = TriRef::new(Triangle {
            verts: SEED_TRIS[1],
            apex: SEED_APEX[1],
            conflicts: vec![seen],
        });

        builder.process_ridge(&t1, [1, 2], &t2).unwrap();
        let after = sorted(builder.facets.snapshot_keys());
        assert_eq!(after, sorted(vec![SEED_TRIS[2], SEED_TRIS[3]]));
    }
}
