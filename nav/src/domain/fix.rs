//! Position fix type

use chrono::{DateTime, Utc};
use pathcodec::Coordinate;
use serde::{Deserialize, Serialize};

/// One reported position sample from a position source
///
/// The controller never mutates a fix, only compares successive ones.
/// `seq` is the source's emission order; sources must assign it
/// monotonically per subscription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionFix {
    /// Reported position
    pub coordinate: Coordinate,

    /// Estimated horizontal accuracy in meters, when the source reports one
    pub accuracy_m: Option<f64>,

    /// Emission order within the subscription
    pub seq: u64,

    /// When the fix was produced
    pub at: DateTime<Utc>,
}

impl PositionFix {
    /// Create a fix stamped with the current time
    pub fn new(coordinate: Coordinate, accuracy_m: Option<f64>, seq: u64) -> Self {
        Self {
            coordinate,
            accuracy_m,
            seq,
            at: Utc::now(),
        }
    }

    /// Great-circle distance to another fix in meters
    pub fn distance_m(&self, other: &PositionFix) -> f64 {
        self.coordinate.distance_m(&other.coordinate)
    }
}
