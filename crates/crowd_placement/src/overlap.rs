//! Overlap predicates between agent bodies.
//!
//! Two disks overlap only when the distance between their centers is strictly less
//! than the sum of their radii: touching disks do not overlap. Region checks against
//! the field use `geo` intersection instead, where touching does count (see
//! [`crate::field::Field::intersects_occupied`]).
use glam::DVec2;

use crate::agent::{AgentStore, Body, BodyVariant, Circle};

/// True iff the disks `(c1, r1)` and `(c2, r2)` overlap.
#[inline]
pub fn circle_overlap(c1: DVec2, r1: f64, c2: DVec2, r2: f64) -> bool {
    c1.distance(c2) < r1 + r2
}

/// True iff any of the nine circle pairs between two three-circle bodies overlap.
#[inline]
pub fn three_circle_overlap(a: &[Circle; 3], b: &[Circle; 3]) -> bool {
    a.iter().any(|p| {
        b.iter()
            .any(|q| circle_overlap(p.center, p.radius, q.center, q.radius))
    })
}

/// True if `candidate` overlaps any active agent of `store`.
///
/// Dispatches once on the store's body variant; a candidate of the other variant
/// falls back to comparing every circle pair.
pub fn overlaps_any_active(candidate: &Body, store: &AgentStore) -> bool {
    match (candidate, store.variant()) {
        (Body::Circular(c), BodyVariant::Circular) => store
            .active_positions()
            .iter()
            .zip(store.active_radii())
            .any(|(&p, &r)| circle_overlap(c.center, c.radius, p, r)),
        (Body::ThreeCircle(parts), BodyVariant::ThreeCircle) => (0..store.len())
            .any(|slot| three_circle_overlap(parts, &store.three_circle_unchecked(slot))),
        _ => store.active_geometries().any(|body| body.overlaps(candidate)),
    }
}
