//! Cached view of one collection plus its fetch status.

use std::sync::Arc;

use resource_schema::Resource;

use crate::domain::ports::SourceError;

/// Lifecycle of the most recent fetch for a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchStatus {
    /// Nothing has been requested yet.
    Idle,
    /// The first fetch is in flight and no data has arrived.
    Loading,
    /// The last applied fetch succeeded.
    Success,
    /// The last applied fetch failed; earlier data stays visible.
    Error,
}

/// The store's current view of one collection.
///
/// Snapshots are replaced wholesale by successful fetches. A failed fetch
/// keeps the previous `data` and records the error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    status: FetchStatus,
    data: Arc<[Resource]>,
    error: Option<SourceError>,
    stale: bool,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::idle()
    }
}

impl Snapshot {
    /// An empty snapshot that has never been fetched.
    #[must_use]
    pub fn idle() -> Self {
        Self {
            status: FetchStatus::Idle,
            data: Arc::from(Vec::new()),
            error: None,
            stale: false,
        }
    }

    /// Status of the last fetch.
    #[must_use]
    pub const fn status(&self) -> FetchStatus {
        self.status
    }

    /// Records from the last successful fetch, in backend order.
    #[must_use]
    pub fn data(&self) -> &[Resource] {
        &self.data
    }

    /// Shared handle to the records.
    #[must_use]
    pub fn shared_data(&self) -> Arc<[Resource]> {
        Arc::clone(&self.data)
    }

    /// Error from the last failed fetch, if the snapshot is in error.
    #[must_use]
    pub const fn error(&self) -> Option<&SourceError> {
        self.error.as_ref()
    }

    /// Whether the data has been invalidated since it was fetched.
    #[must_use]
    pub const fn is_stale(&self) -> bool {
        self.stale
    }

    /// Whether the first fetch is still outstanding.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self.status, FetchStatus::Loading)
    }

    /// Whether the snapshot has settled, successfully or not.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        matches!(self.status, FetchStatus::Success | FetchStatus::Error)
    }

    /// Move an untouched snapshot into `Loading`. Returns whether it changed.
    pub(crate) fn begin_loading(&mut self) -> bool {
        if self.status == FetchStatus::Idle {
            self.status = FetchStatus::Loading;
            true
        } else {
            false
        }
    }

    pub(crate) fn succeed(data: Arc<[Resource]>) -> Self {
        Self {
            status: FetchStatus::Success,
            data,
            error: None,
            stale: false,
        }
    }

    pub(crate) const fn mark_stale(&mut self) {
        self.stale = true;
    }

    pub(crate) fn fail(&mut self, error: SourceError) {
        self.status = FetchStatus::Error;
        self.error = Some(error);
    }
}

#[cfg(test)]
mod tests {
    use resource_schema::{Post, ResourceId};

    use super::*;

    fn post(id: u64) -> Resource {
        Resource::Post(Post {
            id: ResourceId::new(id),
            user_id: ResourceId::new(1),
            title: format!("Post {id}"),
            body: "Body long enough to pass".to_owned(),
        })
    }

    #[test]
    fn failure_keeps_previous_data() {
        let mut snapshot = Snapshot::succeed(Arc::from(vec![post(1), post(2)]));
        snapshot.fail(SourceError::network("connection reset"));

        assert_eq!(snapshot.status(), FetchStatus::Error);
        assert_eq!(snapshot.data().len(), 2);
        assert_eq!(
            snapshot.error(),
            Some(&SourceError::network("connection reset"))
        );
    }

    #[test]
    fn success_replaces_data_and_clears_error() {
        let mut snapshot = Snapshot::succeed(Arc::from(vec![post(1)]));
        snapshot.fail(SourceError::timeout("slow"));

        let replaced = Snapshot::succeed(Arc::from(vec![post(3)]));
        assert_eq!(replaced.status(), FetchStatus::Success);
        assert_eq!(replaced.data().first().map(Resource::id), Some(ResourceId::new(3)));
        assert!(replaced.error().is_none());
        assert!(!replaced.is_stale());
    }

    #[test]
    fn stale_flag_survives_failure() {
        let mut snapshot = Snapshot::succeed(Arc::from(vec![post(1)]));
        snapshot.mark_stale();
        snapshot.fail(SourceError::network("offline"));

        assert!(snapshot.is_stale());
        assert_eq!(snapshot.data().len(), 1);
    }

    #[test]
    fn only_idle_snapshots_enter_loading() {
        let mut idle = Snapshot::idle();
        assert!(idle.begin_loading());
        assert!(idle.is_loading());
        assert!(!idle.begin_loading());

        let mut loaded = Snapshot::succeed(Arc::from(vec![post(1)]));
        assert!(!loaded.begin_loading());
        assert_eq!(loaded.status(), FetchStatus::Success);
    }
}
