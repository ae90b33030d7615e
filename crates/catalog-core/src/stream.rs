// ── Reactive domain streams ──
//
// Subscription type for re-rendering whenever a domain's state changes.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::store::DomainState;

/// A subscription to one domain's state tree.
///
/// Provides both point-in-time snapshot access and change notification
/// via [`changed`](Self::changed) or by converting into a `Stream`.
pub struct DomainStream<T: Clone + Send + Sync + 'static> {
    current: Arc<DomainState<T>>,
    receiver: watch::Receiver<Arc<DomainState<T>>>,
}

impl<T: Clone + Send + Sync + 'static> DomainStream<T> {
    pub(crate) fn new(mut receiver: watch::Receiver<Arc<DomainState<T>>>) -> Self {
        let current = receiver.borrow_and_update().clone();
        Self { current, receiver }
    }

    /// Snapshot as of creation or the last `changed()`.
    pub fn current(&self) -> &Arc<DomainState<T>> {
        &self.current
    }

    /// Latest snapshot, which may be newer than `current()`.
    pub fn latest(&self) -> Arc<DomainState<T>> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change. Returns `None` once the owning cache is dropped.
    pub async fn changed(&mut self) -> Option<Arc<DomainState<T>>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = Arc::clone(&snap);
        Some(snap)
    }

    pub fn into_stream(self) -> DomainWatchStream<T> {
        DomainWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter yielding a snapshot per state change.
pub struct DomainWatchStream<T: Clone + Send + Sync + 'static> {
    inner: WatchStream<Arc<DomainState<T>>>,
}

impl<T: Clone + Send + Sync + 'static> Stream for DomainWatchStream<T> {
    type Item = Arc<DomainState<T>>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
