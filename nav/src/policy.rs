//! Reroute and arrival decision policy
//!
//! Pure, synchronous decision functions. No I/O, no logging, no state
//! beyond the inputs: the controller feeds them and acts on the answer,
//! which keeps them independently testable.

use pathcodec::Coordinate;

use crate::domain::PositionFix;

/// Default drift threshold before a new route is fetched, in meters
pub const DEFAULT_REROUTE_THRESHOLD_M: f64 = 50.0;

/// Default radius around the destination that counts as arrival, in meters
pub const DEFAULT_ARRIVAL_RADIUS_M: f64 = 30.0;

/// Whether a new route must be fetched for `candidate`
///
/// True when no anchor exists yet (first fix of the session, or after a
/// retry reset), or when the great-circle distance from the anchor exceeds
/// `threshold_m`. The anchor is the fix that originated the currently
/// displayed route, so the distance is always measured from a known-good
/// point.
pub fn should_reroute(last_anchor: Option<&PositionFix>, candidate: &PositionFix, threshold_m: f64) -> bool {
    match last_anchor {
        None => true,
        Some(anchor) => anchor.distance_m(candidate) > threshold_m,
    }
}

/// Whether `position` is close enough to `destination` to count as arrived
pub fn within_arrival_radius(position: &Coordinate, destination: &Coordinate, radius_m: f64) -> bool {
    position.distance_m(destination) <= radius_m
}
