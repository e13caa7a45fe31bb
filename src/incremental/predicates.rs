//! Signed-side predicates for facet visibility.
//!
//! Point coordinates are stored in f32; all plane arithmetic is widened to
//! f64. There is no tolerance handling; input is assumed to be in general
//! position, so every candidate point is strictly off every facet plane.

use glam::{DVec3, Vec3};

use crate::types::{Point, PointId, Tri};

/// Normal of the plane through `a`, `b`, `c`. Not normalized; only its sign
/// against difference vectors is ever used.
#[inline]
pub(crate) fn normal_vect(a: Vec3, b: Vec3, c: Vec3) -> DVec3 {
    (b - a).as_dvec3().cross((c - a).as_dvec3())
}

/// Whether `target` lies on the non-negative side of the plane through `base`
/// with normal `normal`. Which geometric side "non-negative" is depends on
/// the normal's orientation; callers compare two of these rather than rely on
/// an absolute sign.
#[inline]
pub(crate) fn is_above(base: Vec3, normal: DVec3, target: Vec3) -> bool {
    (base - target).as_dvec3().dot(normal) >= 0.0
}

/// Filter `candidates` down to the points visible from facet `verts`, i.e.
/// strictly on the opposite side of its plane from the known-interior point
/// `apex`.
///
/// The facet's own vertices sit exactly on its plane, where the sign test is
/// floating-point noise; they are excluded by id so a facet can never keep
/// itself in its own conflict list.
pub(crate) fn visible_points(
    points: &[Point],
    verts: Tri,
    apex: PointId,
    candidates: Vec<Point>,
) -> Vec<Point> {
    let a = points[verts[0] as usize].pos;
    let b = points[verts[1] as usize].pos;
    let c = points[verts[2] as usize].pos;
    let normal = normal_vect(a, b, c);
    let apex_side = is_above(a, normal, points[apex as usize].pos);
    candidates
        .into_iter()
        .filter(|p| !verts.contains(&p.id) && is_above(a, normal, p.pos) != apex_side)
        .collect()
}
