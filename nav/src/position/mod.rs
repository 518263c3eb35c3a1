//! Position sources
//!
//! A position source emits a live, possibly irregular sequence of fixes.
//! Acquisition concerns (GPS permissions, providers) live behind the
//! trait; the controller only consumes the channel.

mod simulated;

use tokio::sync::mpsc;

use crate::domain::PositionFix;

pub use simulated::SimulatedPositionSource;

/// A live stream of position fixes
///
/// Each `subscribe` call starts a fresh, independent subscription and is
/// how a new session re-subscribes after a prior one ended; a single
/// subscription is not rewindable. Dropping the receiver unsubscribes and
/// doing so more than once is inherently harmless.
pub trait PositionSource: Send + Sync {
    /// Begin a new subscription
    fn subscribe(&self) -> mpsc::Receiver<PositionFix>;
}
