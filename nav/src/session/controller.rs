//! The session controller actor

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use pathcodec::Coordinate;

use crate::config::{CompletionMode, SessionConfig};
use crate::domain::{ActiveRoute, PositionFix, Route, SessionFault, SessionSnapshot};
use crate::policy;
use crate::routing::{RouteClient, RouteError};

/// Placeholder deadline for the not-yet-armed completion timer
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365);

/// Commands a handle can send to the controller
pub(crate) enum SessionCommand {
    Cancel { reply: oneshot::Sender<()> },
    Retry { reply: oneshot::Sender<bool> },
}

/// Result of one spawned fetch task, reported back to the actor
///
/// The generation stamp is how a result that arrives after its fetch was
/// superseded or cancelled gets discarded instead of applied.
struct FetchOutcome {
    generation: u64,
    origin: PositionFix,
    result: Result<Route, RouteError>,
}

/// The actor: owns all mutable session state
pub(crate) struct Controller {
    id: Uuid,
    destination: Coordinate,
    config: SessionConfig,
    router: Arc<dyn RouteClient>,
    fixes: mpsc::Receiver<PositionFix>,
    commands: mpsc::Receiver<SessionCommand>,
    snapshots: watch::Sender<SessionSnapshot>,
    results_tx: mpsc::Sender<FetchOutcome>,
    results_rx: mpsc::Receiver<FetchOutcome>,

    /// Monotonic fetch counter; only the latest generation's result applies
    generation: u64,
    inflight: Option<JoinHandle<()>>,

    /// The fix that originated the currently displayed route. Updated only
    /// on fetch success, so reroute distances are always measured from a
    /// known-good point.
    anchor: Option<PositionFix>,
    active: Option<ActiveRoute>,
    last_fix: Option<PositionFix>,
    faulted: bool,
    fixes_closed: bool,
}

impl Controller {
    pub(crate) fn new(
        id: Uuid,
        destination: Coordinate,
        config: SessionConfig,
        router: Arc<dyn RouteClient>,
        fixes: mpsc::Receiver<PositionFix>,
        commands: mpsc::Receiver<SessionCommand>,
        snapshots: watch::Sender<SessionSnapshot>,
    ) -> Self {
        let (results_tx, results_rx) = mpsc::channel(4);
        Self {
            id,
            destination,
            config,
            router,
            fixes,
            commands,
            snapshots,
            results_tx,
            results_rx,
            generation: 0,
            inflight: None,
            anchor: None,
            active: None,
            last_fix: None,
            faulted: false,
            fixes_closed: false,
        }
    }

    /// Run the session to its end
    pub(crate) async fn run(mut self) {
        info!(session = %self.id, "navigation session started");
        self.publish(SessionSnapshot::Loading);

        let startup = tokio::time::sleep(self.config.startup_timeout());
        tokio::pin!(startup);
        let mut saw_fix = false;

        let finish = tokio::time::sleep(FAR_FUTURE);
        tokio::pin!(finish);
        let mut finish_armed = false;

        loop {
            tokio::select! {
                command = self.commands.recv() => {
                    match command {
                        Some(SessionCommand::Cancel { reply }) => {
                            self.abort_inflight();
                            self.publish(SessionSnapshot::Error {
                                fault: SessionFault::Cancelled,
                            });
                            let _ = reply.send(());
                            info!(session = %self.id, "session cancelled");
                            return;
                        }
                        Some(SessionCommand::Retry { reply }) => {
                            let retried = self.handle_retry();
                            if retried && self.last_fix.is_none() {
                                // No fix ever arrived: re-open the startup window
                                startup
                                    .as_mut()
                                    .reset(Instant::now() + self.config.startup_timeout());
                            }
                            let _ = reply.send(retried);
                        }
                        None => {
                            debug!(session = %self.id, "all handles dropped, stopping");
                            self.abort_inflight();
                            return;
                        }
                    }
                }

                maybe_fix = self.fixes.recv(), if !self.fixes_closed => {
                    match maybe_fix {
                        Some(fix) => {
                            saw_fix = true;
                            if self.on_fix(fix) {
                                return;
                            }
                        }
                        None => self.on_fixes_closed(),
                    }
                }

                Some(outcome) = self.results_rx.recv() => {
                    let activated = self.on_fetch_outcome(outcome);
                    if activated && self.config.completion == CompletionMode::FixedDelay {
                        finish.as_mut().reset(Instant::now() + self.config.fixed_delay());
                        finish_armed = true;
                    }
                }

                () = &mut startup, if !saw_fix && !self.faulted => {
                    warn!(
                        session = %self.id,
                        timeout_ms = self.config.startup_timeout_ms,
                        "no position fix within startup window"
                    );
                    self.abort_inflight();
                    self.faulted = true;
                    self.publish(SessionSnapshot::Error {
                        fault: SessionFault::NoPosition,
                    });
                }

                () = &mut finish, if finish_armed => {
                    info!(session = %self.id, "completion delay elapsed, finishing");
                    self.abort_inflight();
                    self.publish(SessionSnapshot::Finished);
                    return;
                }
            }
        }
    }

    /// Handle one incoming fix; returns true when the session finished
    fn on_fix(&mut self, fix: PositionFix) -> bool {
        debug!(
            session = %self.id,
            seq = fix.seq,
            lat = fix.coordinate.lat,
            lon = fix.coordinate.lon,
            "fix received"
        );
        self.last_fix = Some(fix.clone());

        if self.faulted {
            // Hold position context for a later retry, but fetch nothing
            return false;
        }

        if self.config.completion == CompletionMode::ArrivalRadius
            && self.active.is_some()
            && policy::within_arrival_radius(&fix.coordinate, &self.destination, self.config.arrival_radius_m)
        {
            info!(session = %self.id, seq = fix.seq, "arrived at destination");
            self.abort_inflight();
            self.publish(SessionSnapshot::Finished);
            return true;
        }

        if policy::should_reroute(self.anchor.as_ref(), &fix, self.config.reroute_threshold_m) {
            self.start_fetch(fix);
        }

        false
    }

    /// The position stream ended
    ///
    /// With nothing displayed and nothing in flight this is a dead end and
    /// the session faults; an outstanding fetch is left to resolve and its
    /// outcome decides instead.
    fn on_fixes_closed(&mut self) {
        self.fixes_closed = true;
        if self.active.is_none() && !self.faulted && self.inflight.is_none() {
            warn!(session = %self.id, "position stream ended before any route was displayed");
            self.faulted = true;
            self.publish(SessionSnapshot::Error {
                fault: SessionFault::NoPosition,
            });
        } else {
            warn!(session = %self.id, "position stream ended; session continues on current state");
        }
    }

    /// Cancel any outstanding fetch and issue a new one from `origin`
    ///
    /// At most one fetch is ever in flight: the previous task is aborted
    /// outright, never queued behind.
    fn start_fetch(&mut self, origin: PositionFix) {
        self.abort_inflight();

        self.generation += 1;
        let generation = self.generation;
        let router = Arc::clone(&self.router);
        let destination = self.destination;
        let results = self.results_tx.clone();
        let task_origin = origin.clone();

        debug!(session = %self.id, generation, seq = origin.seq, "starting route fetch");

        let task = tokio::spawn(async move {
            let result = router.fetch_route(task_origin.coordinate, destination).await;
            let _ = results
                .send(FetchOutcome {
                    generation,
                    origin: task_origin,
                    result,
                })
                .await;
        });
        self.inflight = Some(task);

        // Stale-while-revalidate: only show Loading when there is nothing
        // to keep on screen
        if self.active.is_none() {
            self.publish(SessionSnapshot::Loading);
        }
    }

    /// Apply one fetch result; returns true when a route was activated
    fn on_fetch_outcome(&mut self, outcome: FetchOutcome) -> bool {
        if outcome.generation != self.generation {
            debug!(
                session = %self.id,
                generation = outcome.generation,
                current = self.generation,
                "discarding superseded fetch result"
            );
            return false;
        }
        self.inflight = None;

        match outcome.result {
            Ok(route) => match pathcodec::decode(&route.shape) {
                Ok(path) => {
                    let active = ActiveRoute {
                        path,
                        instructions: route.instructions,
                        anchor: outcome.origin.clone(),
                    };
                    self.anchor = Some(outcome.origin);
                    self.active = Some(active.clone());
                    info!(
                        session = %self.id,
                        points = active.path.len(),
                        instructions = active.instructions.len(),
                        "route activated"
                    );
                    self.publish(SessionSnapshot::Active(active));
                    true
                }
                Err(e) => {
                    self.on_route_failure(SessionFault::MalformedPath {
                        message: e.to_string(),
                    });
                    false
                }
            },
            Err(e) => {
                self.on_route_failure(SessionFault::RouteFetch {
                    message: e.to_string(),
                });
                false
            }
        }
    }

    /// A fetch (or its decode) failed
    ///
    /// With a route on display the failure is swallowed: a transient
    /// network error must not interrupt navigation in progress, and the
    /// anchor stays untouched. With nothing to fall back on, the session
    /// faults.
    fn on_route_failure(&mut self, fault: SessionFault) {
        if self.active.is_some() {
            warn!(session = %self.id, %fault, "route refresh failed; keeping displayed route");
        } else {
            warn!(session = %self.id, %fault, "route fetch failed with nothing to fall back on");
            self.faulted = true;
            self.publish(SessionSnapshot::Error { fault });
        }
    }

    /// Move out of a retryable error back to Loading
    fn handle_retry(&mut self) -> bool {
        if !self.faulted {
            debug!(session = %self.id, "retry ignored: not in a retryable error state");
            return false;
        }

        info!(session = %self.id, "retrying after error");
        self.faulted = false;
        self.anchor = None;
        self.publish(SessionSnapshot::Loading);

        if let Some(fix) = self.last_fix.clone() {
            self.start_fetch(fix);
        }
        true
    }

    fn abort_inflight(&mut self) {
        if let Some(task) = self.inflight.take() {
            task.abort();
            // A result this task already queued must not apply either
            self.generation += 1;
            debug!(session = %self.id, generation = self.generation, "aborted in-flight route fetch");
        }
    }

    /// Publish a snapshot; always the final step of a transition
    fn publish(&self, snapshot: SessionSnapshot) {
        self.snapshots.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }
}
