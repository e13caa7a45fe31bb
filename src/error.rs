use claim_map::MapFull;
use thiserror::Error;

/// Errors from [`build_hull`](crate::build_hull).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HullError {
    /// A 3-D hull needs at least the 4 points of a seed tetrahedron.
    #[error("convex hull requires at least 4 points, got {0}")]
    InsufficientPoints(usize),
    /// An internal claim map ran out of slots. No partial hull is returned;
    /// this is unreachable for well-formed input at the sizing the builder
    /// uses.
    #[error(transparent)]
    MapFull(#[from] MapFull),
}
