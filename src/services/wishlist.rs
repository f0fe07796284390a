use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::broadcast::{
    self,
    error::{RecvError, TryRecvError},
};

use crate::models::{
    normalize_size, Product, ProductId, WishlistChange, WishlistEntry, WishlistEvent,
    WISHLIST_UPDATED,
};

/// Events buffered per subscriber before it starts lagging
const EVENT_CAPACITY: usize = 64;

/// Session-wide set of liked (product, size) pairs
///
/// The store is the single source of truth for wishlist membership. Every
/// successful `add`/`remove` publishes a [`WishlistEvent`] before returning,
/// while the write lock is still held, so subscribers observe changes in the
/// order they were applied. Clones share the same entries and channel.
#[derive(Clone)]
pub struct WishlistStore {
    entries: Arc<RwLock<Vec<WishlistEntry>>>,
    events: broadcast::Sender<WishlistEvent>,
}

impl Default for WishlistStore {
    fn default() -> Self {
        Self::new()
    }
}

impl WishlistStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            entries: Arc::new(RwLock::new(Vec::new())),
            events,
        }
    }

    /// True iff exactly this (product, size) pair is liked
    pub fn is_wishlisted(&self, id: &ProductId, size: &str) -> bool {
        let size = normalize_size(Some(size));
        self.entries
            .read()
            .iter()
            .any(|entry| &entry.id == id && entry.size == size)
    }

    /// Membership of the entry a toggle on `product` would affect
    pub fn contains_product(&self, product: &Product) -> bool {
        let key = WishlistEntry::for_product(product);
        self.entries.read().contains(&key)
    }

    /// Snapshot of all entries in insertion order
    pub fn items(&self) -> Vec<WishlistEntry> {
        self.entries.read().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Inserts the pair if absent. Returns false when it was already present.
    pub fn add(&self, id: impl Into<ProductId>, size: Option<&str>) -> bool {
        let entry = WishlistEntry::new(id, size);
        let mut entries = self.entries.write();
        self.insert_locked(&mut entries, entry)
    }

    /// Deletes the pair if present. Returns false when it was absent.
    pub fn remove(&self, id: impl Into<ProductId>, size: Option<&str>) -> bool {
        let entry = WishlistEntry::new(id, size);
        let mut entries = self.entries.write();
        self.remove_locked(&mut entries, &entry)
    }

    /// Flips membership for the product's (id, size) pair
    ///
    /// The membership check and the mutation happen under one write lock, so
    /// concurrent toggles on the same pair cannot both add or both remove.
    /// Returns the new membership.
    pub fn toggle(&self, product: &Product) -> bool {
        let entry = WishlistEntry::for_product(product);
        let mut entries = self.entries.write();

        if entries.contains(&entry) {
            self.remove_locked(&mut entries, &entry);
            false
        } else {
            self.insert_locked(&mut entries, entry);
            true
        }
    }

    /// Registers a new observer; dropping the subscription unsubscribes it
    pub fn subscribe(&self) -> WishlistSubscription {
        WishlistSubscription {
            receiver: self.events.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }

    fn insert_locked(&self, entries: &mut Vec<WishlistEntry>, entry: WishlistEntry) -> bool {
        if entries.contains(&entry) {
            return false;
        }

        tracing::debug!(product_id = %entry.id, size = %entry.size, "Added to wishlist");
        entries.push(entry.clone());
        self.publish(entries, WishlistChange::Added(entry));
        true
    }

    fn remove_locked(&self, entries: &mut Vec<WishlistEntry>, entry: &WishlistEntry) -> bool {
        let Some(position) = entries.iter().position(|existing| existing == entry) else {
            return false;
        };

        entries.remove(position);
        tracing::debug!(product_id = %entry.id, size = %entry.size, "Removed from wishlist");
        self.publish(entries, WishlistChange::Removed(entry.clone()));
        true
    }

    fn publish(&self, entries: &[WishlistEntry], change: WishlistChange) {
        let event = WishlistEvent {
            name: WISHLIST_UPDATED,
            change,
            snapshot: entries.to_vec(),
        };

        // Err only means nobody is listening right now
        if self.events.send(event).is_err() {
            tracing::trace!("Wishlist event dropped, no subscribers");
        }
    }
}

/// Receiving end of the wishlist event channel
///
/// Each event carries the full snapshot, so a subscriber that falls behind
/// skips straight to newer events without losing state.
pub struct WishlistSubscription {
    receiver: broadcast::Receiver<WishlistEvent>,
}

impl WishlistSubscription {
    /// Waits for the next event. Returns `None` once the store is gone.
    pub async fn next(&mut self) -> Option<WishlistEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Wishlist subscriber lagged, skipping events");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Returns the next already-published event without waiting
    pub fn try_next(&mut self) -> Option<WishlistEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Wishlist subscriber lagged, skipping events");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }
}
