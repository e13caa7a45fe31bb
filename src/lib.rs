//! Parallel randomized-incremental 3-D convex hulls.
//!
//! Implements the algorithm from Blelloch, Gu, Shun and Sun, *Randomized
//! Incremental Convex Hull is Highly Parallel*: facets discover and resolve
//! their shared boundary edges ("ridges") through a bounded concurrent claim
//! map instead of a global lock. The map itself is the reusable
//! [`ClaimMap`] primitive, re-exported from the `claim-map` crate.
//!
//! # Example
//!
//! ```
//! use glam::Vec3;
//! use par_hull3d::build_hull;
//!
//! let points = vec![
//!     Vec3::new(0.0, 0.0, 0.0),
//!     Vec3::new(1.0, 0.0, 0.0),
//!     Vec3::new(0.0, 1.0, 0.0),
//!     Vec3::new(0.0, 0.0, 1.0),
//! ];
//!
//! let hull = build_hull(&points).expect("hull construction should succeed");
//! assert_eq!(hull.facets.len(), 4);
//! ```
//!
//! Points are identified by their index in the input slice; facets index back
//! into it. Input must contain at least 4 points in general position (no 4
//! coplanar, no duplicates). General position is assumed, not checked;
//! degenerate input is undefined behavior, not a reported error.
//!
//! With the default `parallel` feature, ridge resolution fans out on the
//! rayon thread pool; without it the same recursion runs sequentially.

mod error;
mod incremental;
mod types;
mod util;

pub use claim_map::{ClaimMap, MapFull};
pub use error::HullError;
pub use types::{ConvexHull, HullFacet, PointId, Tri};

use glam::Vec3;

/// Compute the convex hull of `points`.
///
/// Returns the hull's facet set, in no meaningful order. Fails with
/// [`HullError::InsufficientPoints`] for fewer than 4 points, and with
/// [`HullError::MapFull`] if the internal claim maps run out of slots, in
/// which case no partial hull is returned.
pub fn build_hull(points: &[Vec3]) -> Result<ConvexHull, HullError> {
    incremental::build(points)
}
