//! Externally visible session state

use pathcodec::Coordinate;
use serde::Serialize;
use thiserror::Error;

use super::PositionFix;

/// The renderable payload of an active session
///
/// `path` and `instructions` always come from the same route fetch; the
/// controller builds an `ActiveRoute` in one step and publishes it in one
/// snapshot write, so a consumer can never observe an old path paired with
/// new instructions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveRoute {
    /// Decoded route geometry in travel order
    pub path: Vec<Coordinate>,

    /// Maneuver instruction texts in travel order
    pub instructions: Vec<String>,

    /// The fix whose coordinates were the origin of this route's fetch
    pub anchor: PositionFix,
}

/// Why a session entered the `Error` state
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
pub enum SessionFault {
    /// No position fix arrived within the startup window
    #[error("no position available")]
    NoPosition,

    /// A route fetch failed before any route was ever displayed
    #[error("route fetch failed: {message}")]
    RouteFetch { message: String },

    /// The backend's path string did not decode and there was no prior
    /// route to fall back on
    #[error("malformed route path: {message}")]
    MalformedPath { message: String },

    /// The caller cancelled the session
    #[error("session cancelled")]
    Cancelled,
}

impl SessionFault {
    /// Whether `retry()` can move the session out of this fault
    pub fn is_retryable(&self) -> bool {
        !matches!(self, SessionFault::Cancelled)
    }
}

/// The one piece of state the controller exposes
///
/// Exactly one snapshot is current at any time; a new one is published on
/// every state transition and on nothing else.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SessionSnapshot {
    /// Session created, not yet consuming fixes
    Idle,

    /// First route fetch in flight, nothing to display yet
    Loading,

    /// A route is displayed; remains current across failed refreshes
    Active(ActiveRoute),

    /// Failed; terminal unless the fault is retryable and `retry()` is called
    Error { fault: SessionFault },

    /// Arrived (or the configured completion delay elapsed); terminal
    Finished,
}

impl SessionSnapshot {
    /// Whether this state ends the session outright
    pub fn is_terminal(&self) -> bool {
        match self {
            SessionSnapshot::Finished => true,
            SessionSnapshot::Error { fault } => !fault.is_retryable(),
            _ => false,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, SessionSnapshot::Active(_))
    }

    /// The displayed route, if any
    pub fn active_route(&self) -> Option<&ActiveRoute> {
        match self {
            SessionSnapshot::Active(route) => Some(route),
            _ => None,
        }
    }
}
