use tokio::sync::broadcast;
use tracing::debug;

const BUS_CAPACITY: usize = 64;

/// Session-wide signals published by any component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionSignal {
    /// An explicit logout happened somewhere in this process.
    Logout,
    /// A request was rejected because the credential is missing or expired.
    Unauthorized,
}

/// In-process publish/subscribe channel for [`SessionSignal`]s.
///
/// Cloning yields another handle to the same channel.
#[derive(Debug, Clone)]
pub struct SessionBus {
    tx: broadcast::Sender<SessionSignal>,
}

impl SessionBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BUS_CAPACITY);
        Self { tx }
    }

    /// Publish a signal. Having no subscribers is not an error.
    pub fn publish(&self, signal: SessionSignal) {
        if self.tx.send(signal).is_err() {
            debug!(?signal, "session signal published with no subscribers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionSignal> {
        self.tx.subscribe()
    }
}

impl Default for SessionBus {
    fn default() -> Self {
        Self::new()
    }
}
