//! Handle to a running navigation session

use tokio::sync::{mpsc, oneshot, watch};
use tracing::debug;
use uuid::Uuid;

use super::SessionCommand;
use crate::domain::SessionSnapshot;

/// Cloneable handle to send commands to a session and read its snapshot
///
/// Reading never blocks the controller: the snapshot lives in a watch
/// cell written only by the controller task.
#[derive(Clone)]
pub struct SessionHandle {
    id: Uuid,
    commands: mpsc::Sender<SessionCommand>,
    snapshots: watch::Receiver<SessionSnapshot>,
}

impl SessionHandle {
    pub(crate) fn new(
        id: Uuid,
        commands: mpsc::Sender<SessionCommand>,
        snapshots: watch::Receiver<SessionSnapshot>,
    ) -> Self {
        Self { id, commands, snapshots }
    }

    /// The session's id, as it appears in logs
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The current snapshot
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// A watch receiver for observing snapshot changes
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    /// Cancel the session
    ///
    /// Aborts any in-flight fetch, unsubscribes from the position source
    /// and leaves the session in the terminal cancelled error state.
    /// Idempotent: cancelling an already-ended session is a no-op.
    pub async fn cancel(&self) {
        let (reply_tx, reply_rx) = oneshot::channel();
        if self
            .commands
            .send(SessionCommand::Cancel { reply: reply_tx })
            .await
            .is_ok()
        {
            let _ = reply_rx.await;
        } else {
            debug!(session = %self.id, "cancel: session already stopped");
        }
    }

    /// Retry after a recoverable error
    ///
    /// Returns true if the session accepted the retry and moved back to
    /// `Loading`; false if it was not in a retryable error state (or has
    /// already ended).
    pub async fn retry(&self) -> bool {
        let (reply_tx, reply_rx) = oneshot::channel();
        if self
            .commands
            .send(SessionCommand::Retry { reply: reply_tx })
            .await
            .is_err()
        {
            debug!(session = %self.id, "retry: session already stopped");
            return false;
        }
        reply_rx.await.unwrap_or(false)
    }
}
