//! Exact, radius-aware collision tests.
//!
//! The allocation index only answers "whose bounding cube overlaps this
//! window".  These functions decide whether an overlap is a real conflict.
//!
//! Two claims conflict when they are within the larger near radius involved
//! (distance ≤ radius, so a shared cell always conflicts).  Space agents have
//! no near radius of their own, so a box only repels path agents by the path
//! agent's radius.

use sky_agent::{Agent, SpaceSegment};
use sky_core::Coordinate4D;

#[inline]
fn too_close(distance: f64, radius: i64) -> bool {
    distance <= radius as f64
}

/// Does `other` conflict with a path agent of `near_radius` sitting at
/// `coord` for ticks `[coord.t, coord.t + speed − 1]`?
pub fn collides_with_cell(other: &Agent, coord: Coordinate4D, near_radius: i64, speed: i64) -> bool {
    let (from, to) = (coord.t, coord.t + speed - 1);
    match other {
        Agent::Path(o) => {
            let radius = near_radius.max(o.near_radius);
            o.positions_between(from, to).any(|p| too_close(p.distance_l2(coord), radius))
        }
        Agent::Space(o) => o
            .boxes_between(from, to)
            .any(|b| too_close(coord.to_3d().distance_to_box(b.min.to_3d(), b.max.to_3d()), near_radius)),
    }
}

/// Does `other` conflict with the closed box `[min, max]`?
pub fn collides_with_box(other: &Agent, min: Coordinate4D, max: Coordinate4D) -> bool {
    let (lo, hi) = (min.to_3d(), max.to_3d());
    match other {
        Agent::Path(o) => o
            .positions_between(min.t, max.t)
            .any(|p| too_close(p.to_3d().distance_to_box(lo, hi), o.near_radius)),
        Agent::Space(o) => o.boxes_between(min.t, max.t).any(|b| boxes_overlap(b, min, max)),
    }
}

fn boxes_overlap(b: &SpaceSegment, min: Coordinate4D, max: Coordinate4D) -> bool {
    b.min.x <= max.x
        && min.x <= b.max.x
        && b.min.y <= max.y
        && min.y <= b.max.y
        && b.min.z <= max.z
        && min.z <= b.max.z
}
