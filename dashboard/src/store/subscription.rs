//! Subscriber handle for one collection.

use std::fmt;
use std::sync::Arc;

use resource_schema::Collection;
use tokio::sync::watch;

use super::StoreInner;
use crate::domain::Snapshot;

/// Live view of one collection's snapshot.
///
/// Dropping the handle unsubscribes. When the last handle for a collection
/// goes away the cached snapshot is discarded, together with any read still
/// in flight for it.
pub struct Subscription {
    store: Arc<StoreInner>,
    collection: Collection,
    lease: u64,
    receiver: watch::Receiver<Snapshot>,
}

impl Subscription {
    pub(super) const fn new(
        store: Arc<StoreInner>,
        collection: Collection,
        lease: u64,
        receiver: watch::Receiver<Snapshot>,
    ) -> Self {
        Self {
            store,
            collection,
            lease,
            receiver,
        }
    }

    /// Collection this handle observes.
    #[must_use]
    pub const fn collection(&self) -> Collection {
        self.collection
    }

    /// Latest snapshot.
    #[must_use]
    pub fn current(&self) -> Snapshot {
        self.receiver.borrow().clone()
    }

    /// Wait for the next snapshot change.
    ///
    /// Returns `None` once the store can no longer publish updates.
    pub async fn next(&mut self) -> Option<Snapshot> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("collection", &self.collection)
            .field("lease", &self.lease)
            .finish_non_exhaustive()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.store.release(self.collection, self.lease);
    }
}
