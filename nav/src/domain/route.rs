//! Route as returned by a routing backend

use serde::{Deserialize, Serialize};

/// One computed route from an origin to the destination
///
/// `shape` is the backend's encoded path string, carried verbatim and
/// opaque to everything except the path codec. `instructions` is the
/// flattened, travel-ordered list of maneuver texts across all legs.
/// A route is immutable after construction and superseded wholesale by
/// the next one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Encoded path string, decoded on activation
    pub shape: String,

    /// Maneuver instruction texts in travel order
    pub instructions: Vec<String>,
}

impl Route {
    pub fn new(shape: impl Into<String>, instructions: Vec<String>) -> Self {
        Self {
            shape: shape.into(),
            instructions,
        }
    }
}
