//! Navigation session controller
//!
//! One session = one actor task owning all mutable state, plus cloneable
//! handles. The actor consumes position fixes, applies the reroute
//! policy, drives the route client, and publishes `SessionSnapshot`s
//! through a single-writer watch cell.

mod controller;
mod handle;

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::info;
use uuid::Uuid;

use pathcodec::Coordinate;

use crate::config::SessionConfig;
use crate::domain::{PositionFix, SessionSnapshot};
use crate::position::PositionSource;
use crate::routing::RouteClient;

use controller::Controller;
pub(crate) use controller::SessionCommand;
pub use handle::SessionHandle;

/// Entry point for running navigation sessions
pub struct NavigationSession;

impl NavigationSession {
    /// Start a session toward `destination`
    ///
    /// Subscribes to the position source, spawns the controller task and
    /// returns a handle. The snapshot starts at `Idle` and moves to
    /// `Loading` as soon as the controller begins consuming fixes.
    pub fn start(
        destination: Coordinate,
        source: &dyn PositionSource,
        router: Arc<dyn RouteClient>,
        config: SessionConfig,
    ) -> SessionHandle {
        Self::start_with_fixes(destination, source.subscribe(), router, config)
    }

    /// Start a session from an already-open fix channel
    ///
    /// For adapters that own their fix stream directly, and for tests
    /// that script exact fix sequences.
    pub fn start_with_fixes(
        destination: Coordinate,
        fixes: mpsc::Receiver<PositionFix>,
        router: Arc<dyn RouteClient>,
        config: SessionConfig,
    ) -> SessionHandle {
        let id = Uuid::now_v7();
        let (command_tx, command_rx) = mpsc::channel(8);
        let (snapshot_tx, snapshot_rx) = watch::channel(SessionSnapshot::Idle);

        let controller = Controller::new(id, destination, config, router, fixes, command_rx, snapshot_tx);
        tokio::spawn(controller.run());

        info!(session = %id, dest_lat = destination.lat, dest_lon = destination.lon, "session spawned");

        SessionHandle::new(id, command_tx, snapshot_rx)
    }
}
