//! # Observable State Cell
//!
//! `Store<S>` owns one state container's data and publishes an immutable
//! `Arc<S>` snapshot after every transition. Readers get the current snapshot
//! without copying; views that want change notifications call
//! [`Store::subscribe`] and receive each new snapshot on a channel.
//!
//! Only the owning container mutates the state (`update` is crate-private).
//! A subscriber that has gone away (its receiver dropped, e.g. after the view
//! unmounted) is pruned on the next publish; the update is discarded for it
//! without an error.

use std::sync::{Arc, Mutex, MutexGuard};

use futures::channel::mpsc;

pub struct Store<S> {
    inner: Mutex<Inner<S>>,
}

struct Inner<S> {
    snapshot: Arc<S>,
    subscribers: Vec<mpsc::UnboundedSender<Arc<S>>>,
}

impl<S: Clone> Store<S> {
    pub fn new(initial: S) -> Self {
        Self {
            inner: Mutex::new(Inner {
                snapshot: Arc::new(initial),
                subscribers: Vec::new(),
            }),
        }
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<S> {
        self.lock().snapshot.clone()
    }

    /// Subscribes to future snapshots. The current one is delivered first.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<Arc<S>> {
        let (tx, rx) = mpsc::unbounded();
        let mut inner = self.lock();
        // A fresh channel cannot be closed yet
        let _ = tx.unbounded_send(inner.snapshot.clone());
        inner.subscribers.push(tx);
        rx
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    /// Applies `mutate` to a copy of the state, swaps it in and notifies subscribers.
    pub(crate) fn update<R>(&self, mutate: impl FnOnce(&mut S) -> R) -> R {
        let mut inner = self.lock();
        let mut next = (*inner.snapshot).clone();
        let result = mutate(&mut next);
        let next = Arc::new(next);
        inner.snapshot = next.clone();
        inner
            .subscribers
            .retain(|tx| tx.unbounded_send(next.clone()).is_ok());
        result
    }

    fn lock(&self) -> MutexGuard<'_, Inner<S>> {
        // State is replaced atomically inside `update`, so a poisoned lock still holds a valid snapshot
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<S: Clone + Default> Default for Store<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn subscribers_receive_initial_and_updated_snapshots() {
        let store = Store::new(0u32);
        let mut rx = store.subscribe();

        store.update(|n| *n += 1);
        store.update(|n| *n += 1);

        assert_eq!(*rx.next().await.unwrap(), 0);
        assert_eq!(*rx.next().await.unwrap(), 1);
        assert_eq!(*rx.next().await.unwrap(), 2);
    }

    #[test]
    fn snapshots_are_immutable_views() {
        let store = Store::new(vec![1]);
        let before = store.snapshot();
        store.update(|v| v.push(2));
        assert_eq!(*before, vec![1]);
        assert_eq!(*store.snapshot(), vec![1, 2]);
    }

    #[test]
    fn dropped_subscribers_are_pruned_silently() {
        let store = Store::new(0u32);
        let rx = store.subscribe();
        assert_eq!(store.subscriber_count(), 1);
        drop(rx);
        store.update(|n| *n = 5);
        assert_eq!(store.subscriber_count(), 0);
        assert_eq!(*store.snapshot(), 5);
    }
}
