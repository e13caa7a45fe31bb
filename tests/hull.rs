//! Public API integration tests for par-hull3d.

use std::collections::HashMap;

use glam::{DVec3, Vec3};
use par_hull3d::{build_hull, ConvexHull, HullError};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Random points in the unit cube.
fn random_cube_points(n: usize, seed: u64) -> Vec<Vec3> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            Vec3::new(
                rng.gen_range(0.0..1.0),
                rng.gen_range(0.0..1.0),
                rng.gen_range(0.0..1.0),
            )
        })
        .collect()
}

/// Random points on the unit sphere (every point is on the hull).
fn random_sphere_points(n: usize, seed: u64) -> Vec<Vec3> {
    use std::f32::consts::PI;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let z: f32 = rng.gen_range(-1.0..1.0);
            let theta: f32 = rng.gen_range(0.0..2.0 * PI);
            let r = (1.0 - z * z).sqrt();
            Vec3::new(r * theta.cos(), r * theta.sin(), z)
        })
        .collect()
}

/// Facets as sorted vertex triples, sorted, comparable across runs.
fn facet_sets(hull: &ConvexHull) -> Vec<[u32; 3]> {
    let mut sets: Vec<[u32; 3]> = hull
        .facets
        .iter()
        .map(|f| {
            let mut v = f.indices;
            v.sort_unstable();
            v
        })
        .collect();
    sets.sort_unstable();
    sets
}

/// Every input point must lie weakly inside the plane of every facet.
fn assert_all_points_inside(points: &[Vec3], hull: &ConvexHull) {
    let centroid: DVec3 =
        points.iter().map(|p| p.as_dvec3()).sum::<DVec3>() / points.len() as f64;

    for facet in &hull.facets {
        let a = points[facet.indices[0] as usize].as_dvec3();
        let b = points[facet.indices[1] as usize].as_dvec3();
        let c = points[facet.indices[2] as usize].as_dvec3();
        let normal = (b - a).cross(c - a).normalize();
        // Orient the plane so the centroid (strictly interior) is negative.
        let side = (centroid - a).dot(normal).signum();
        for (i, p) in points.iter().enumerate() {
            let d = side * (p.as_dvec3() - a).dot(normal);
            assert!(
                d <= 1e-5,
                "point {i} lies {d} outside facet {:?}",
                facet.indices
            );
        }
    }
}

/// The hull must be a closed 2-manifold: every edge shared by exactly two
/// facets, and V - E + F = 2.
fn assert_closed_manifold(hull: &ConvexHull) {
    let mut edge_count: HashMap<(u32, u32), u32> = HashMap::new();
    let mut vertices: Vec<u32> = Vec::new();
    for facet in &hull.facets {
        let [a, b, c] = facet.indices;
        vertices.extend([a, b, c]);
        for (u, v) in [(a, b), (b, c), (a, c)] {
            let key = if u < v { (u, v) } else { (v, u) };
            *edge_count.entry(key).or_insert(0) += 1;
        }
    }
    for (edge, count) in &edge_count {
        assert_eq!(*count, 2, "edge {edge:?} shared by {count} facets");
    }
    vertices.sort_unstable();
    vertices.dedup();

    let v = vertices.len() as i64;
    let e = edge_count.len() as i64;
    let f = hull.facets.len() as i64;
    assert_eq!(v - e + f, 2, "Euler characteristic violated");
}

#[test]
fn unit_tetrahedron_returns_its_faces() {
    let points = vec![
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(0.0, 0.0, 1.0),
    ];
    let hull = build_hull(&points).expect("tetrahedron should succeed");
    assert_eq!(
        facet_sets(&hull),
        vec![[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]]
    );
}

#[test]
fn symmetric_tetrahedron_has_four_facets() {
    let points = vec![
        Vec3::new(1.0, 0.0, -1.0 / 2.0_f32.sqrt()),
        Vec3::new(-1.0, 0.0, -1.0 / 2.0_f32.sqrt()),
        Vec3::new(0.0, 1.0, 1.0 / 2.0_f32.sqrt()),
        Vec3::new(0.0, -1.0, 1.0 / 2.0_f32.sqrt()),
    ];
    let hull = build_hull(&points).expect("tetrahedron should succeed");
    assert_eq!(hull.facets.len(), 4);
}

#[test]
fn point_outside_one_face_splits_it_in_three() {
    // The 5th point sees only face {1,2,3}; that face is replaced by its
    // three-way split while the other three survive.
    let points = vec![
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(0.0, 0.0, 1.0),
        Vec3::new(1.0, 1.0, 1.0),
    ];
    let hull = build_hull(&points).expect("5 points should succeed");
    assert_eq!(
        facet_sets(&hull),
        vec![
            [0, 1, 2],
            [0, 1, 3],
            [0, 2, 3],
            [1, 2, 4],
            [1, 3, 4],
            [2, 3, 4]
        ]
    );
}

#[test]
fn fewer_than_four_points_is_an_error() {
    let points = vec![
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
    ];
    assert_eq!(
        build_hull(&points).unwrap_err(),
        HullError::InsufficientPoints(3)
    );
}

#[test]
fn random_cube_hull_contains_all_points() {
    let points = random_cube_points(64, 42);
    let hull = build_hull(&points).expect("build should succeed");
    assert!(hull.facets.len() >= 4);
    assert_all_points_inside(&points, &hull);
}

#[test]
fn random_cube_hull_is_closed_manifold() {
    let points = random_cube_points(64, 999);
    let hull = build_hull(&points).expect("build should succeed");
    assert_closed_manifold(&hull);
    assert_all_points_inside(&points, &hull);
}

#[test]
fn sphere_points_are_all_hull_vertices() {
    let n = 30;
    let points = random_sphere_points(n, 5);
    let hull = build_hull(&points).expect("build should succeed");
    assert_closed_manifold(&hull);

    let mut ids: Vec<u32> = hull.facets.iter().flat_map(|f| f.indices).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), n, "every sphere point must appear on the hull");
    // Simplicial polytope with all n points as vertices.
    assert_eq!(hull.facets.len(), 2 * n - 4);
}

#[test]
fn repeated_builds_agree_on_the_facet_set() {
    let points = random_cube_points(40, 7);
    let first = build_hull(&points).expect("build should succeed");
    let second = build_hull(&points).expect("build should succeed");
    assert_eq!(facet_sets(&first), facet_sets(&second));
}

#[test]
fn interior_points_never_appear_in_facets() {
    // Tetrahedron plus a point well inside it.
    let points = vec![
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(0.0, 0.0, 1.0),
        Vec3::new(0.1, 0.1, 0.1),
    ];
    let hull = build_hull(&points).expect("build should succeed");
    assert_eq!(
        facet_sets(&hull),
        vec![[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]]
    );
}
