//! Cached, coalescing access to remote collections.
//!
//! The store keeps one [`Snapshot`] per subscribed collection, shares a
//! single in-flight read between concurrent callers, and after every
//! acknowledged write marks the collection stale and reads it again instead
//! of splicing the write's echo into the cache.
//!
//! Each read carries a sequence number. A result is applied only when it is
//! newer than the last applied one and its collection entry still belongs to
//! the same subscription lease; anything else is dropped.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::{Duration, Instant};

use futures_util::future::{BoxFuture, FutureExt, Shared};
use resource_schema::{Collection, FieldErrors, Resource, ResourceId, Schema, validate};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::domain::mutation::Operation;
use crate::domain::ports::{CollectionSource, SourceError};
use crate::domain::{FetchStatus, MutationKind, MutationRequest, Snapshot};

mod subscription;

pub use subscription::Subscription;

/// What the store does to a collection after a write is acknowledged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InvalidationMode {
    /// Mark stale and read again immediately when anyone is subscribed.
    #[default]
    Refetch,
    /// Mark stale only; the next subscriber triggers the read.
    MarkStale,
}

/// Store tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreConfig {
    /// How long a successful read counts as fresh for new subscribers.
    pub stale_time: Duration,
    /// Post-write behaviour.
    pub invalidation: InvalidationMode,
}

/// A form candidate bound for the store.
#[derive(Debug, Clone, PartialEq)]
pub struct FormSubmission {
    /// Rule table applied to the candidate.
    pub schema: Schema,
    /// Raw form values.
    pub candidate: Value,
    /// Record being edited; `None` creates a new record.
    pub target: Option<ResourceId>,
}

impl FormSubmission {
    /// Submission that creates a record.
    #[must_use]
    pub const fn create(schema: Schema, candidate: Value) -> Self {
        Self {
            schema,
            candidate,
            target: None,
        }
    }

    /// Submission that replaces record `id`.
    #[must_use]
    pub const fn update(schema: Schema, id: ResourceId, candidate: Value) -> Self {
        Self {
            schema,
            candidate,
            target: Some(id),
        }
    }

    /// Write this submission turns into.
    #[must_use]
    pub const fn kind(&self) -> MutationKind {
        match self.target {
            Some(_) => MutationKind::Update,
            None => MutationKind::Create,
        }
    }
}

/// Failure of [`CollectionStore::submit`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// The candidate failed validation and was not sent.
    #[error(transparent)]
    Invalid(#[from] FieldErrors),
    /// The backend rejected or never received the write.
    #[error(transparent)]
    Source(#[from] SourceError),
}

type FetchResult = Result<Arc<[Resource]>, SourceError>;
type SharedFetch = Shared<BoxFuture<'static, FetchResult>>;

struct InFlight {
    sequence: u64,
    fetch: SharedFetch,
}

struct Entry {
    lease: u64,
    subscribers: usize,
    snapshot: watch::Sender<Snapshot>,
    in_flight: Option<InFlight>,
    issued: u64,
    applied: u64,
    invalidated_through: u64,
    fetched_at: Option<Instant>,
}

impl Entry {
    fn new(lease: u64) -> Self {
        Self {
            lease,
            subscribers: 0,
            snapshot: watch::Sender::new(Snapshot::idle()),
            in_flight: None,
            issued: 0,
            applied: 0,
            invalidated_through: 0,
            fetched_at: None,
        }
    }

    fn is_fresh(&self, stale_time: Duration) -> bool {
        let snapshot = self.snapshot.borrow();
        snapshot.status() == FetchStatus::Success
            && !snapshot.is_stale()
            && self
                .fetched_at
                .is_some_and(|fetched| fetched.elapsed() < stale_time)
    }
}

#[derive(Default)]
struct StoreState {
    next_lease: u64,
    entries: HashMap<Collection, Entry>,
}

impl StoreState {
    fn entry(&mut self, collection: Collection) -> &mut Entry {
        let next_lease = &mut self.next_lease;
        self.entries.entry(collection).or_insert_with(|| {
            *next_lease += 1;
            Entry::new(*next_lease)
        })
    }
}

pub(crate) struct StoreInner {
    source: Arc<dyn CollectionSource>,
    config: StoreConfig,
    state: Mutex<StoreState>,
}

impl StoreInner {
    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Issue a new read for `entry`, replacing any in-flight one, and return
    /// a handle callers can await.
    fn join_new_fetch(this: &Arc<Self>, collection: Collection, entry: &mut Entry) -> SharedFetch {
        entry.issued += 1;
        let sequence = entry.issued;
        let lease = entry.lease;
        let source = Arc::clone(&this.source);
        let store = Arc::downgrade(this);
        debug!(%collection, sequence, "starting collection fetch");

        let fetch = async move {
            let result: FetchResult = source.list(collection).await.map(Arc::from);
            if let Some(inner) = Weak::upgrade(&store) {
                inner.settle(collection, lease, sequence, &result);
            }
            result
        }
        .boxed()
        .shared();

        entry.snapshot.send_if_modified(Snapshot::begin_loading);
        entry.in_flight = Some(InFlight {
            sequence,
            fetch: fetch.clone(),
        });
        drop(tokio::spawn(fetch.clone()));
        fetch
    }

    /// Issue a new read for `entry` without waiting on it.
    fn start_fetch(this: &Arc<Self>, collection: Collection, entry: &mut Entry) {
        drop(Self::join_new_fetch(this, collection, entry));
    }

    fn settle(&self, collection: Collection, lease: u64, sequence: u64, result: &FetchResult) {
        let mut state = self.lock();
        let Some(entry) = state.entries.get_mut(&collection) else {
            debug!(%collection, sequence, "collection unsubscribed; dropping fetch result");
            return;
        };
        if entry.lease != lease {
            debug!(%collection, sequence, "collection resubscribed; dropping fetch result");
            return;
        }
        if entry
            .in_flight
            .as_ref()
            .is_some_and(|in_flight| in_flight.sequence == sequence)
        {
            entry.in_flight = None;
        }
        if sequence <= entry.applied {
            debug!(
                %collection,
                sequence,
                applied = entry.applied,
                "dropping out-of-order fetch result"
            );
            return;
        }
        entry.applied = sequence;

        match result {
            Ok(data) => {
                let mut next = Snapshot::succeed(Arc::clone(data));
                if sequence <= entry.invalidated_through {
                    next.mark_stale();
                }
                entry.fetched_at = Some(Instant::now());
                entry.snapshot.send_replace(next);
                debug!(%collection, sequence, rows = data.len(), "collection fetch applied");
            }
            Err(error) => {
                warn!(%collection, sequence, %error, "collection fetch failed");
                entry.fetched_at = None;
                entry.snapshot.send_modify(|snapshot| snapshot.fail(error.clone()));
            }
        }
    }

    pub(crate) fn release(&self, collection: Collection, lease: u64) {
        let mut state = self.lock();
        let Some(entry) = state.entries.get_mut(&collection) else {
            return;
        };
        if entry.lease != lease {
            return;
        }
        entry.subscribers = entry.subscribers.saturating_sub(1);
        if entry.subscribers == 0 {
            state.entries.remove(&collection);
            debug!(%collection, "last subscriber left; snapshot discarded");
        }
    }
}

/// Shared cache of the remote collections.
///
/// Cloning is cheap; clones share the same cache. Operations that start a
/// read spawn it on the ambient Tokio runtime.
#[derive(Clone)]
pub struct CollectionStore {
    inner: Arc<StoreInner>,
}

impl CollectionStore {
    /// Build a store reading from `source`.
    #[must_use]
    pub fn new(source: Arc<dyn CollectionSource>, config: StoreConfig) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                source,
                config,
                state: Mutex::new(StoreState::default()),
            }),
        }
    }

    /// Tuning in effect.
    #[must_use]
    pub fn config(&self) -> StoreConfig {
        self.inner.config
    }

    /// Register interest in `collection`.
    ///
    /// Starts a read unless one is already in flight or the cached snapshot
    /// is still fresh. Dropping the returned handle unsubscribes.
    ///
    /// # Panics
    ///
    /// Panics when a read must be started outside a Tokio runtime.
    #[must_use]
    pub fn subscribe(&self, collection: Collection) -> Subscription {
        let stale_time = self.inner.config.stale_time;
        let mut state = self.inner.lock();
        let entry = state.entry(collection);
        entry.subscribers += 1;
        let receiver = entry.snapshot.subscribe();
        let lease = entry.lease;
        if entry.in_flight.is_none() && !entry.is_fresh(stale_time) {
            StoreInner::start_fetch(&self.inner, collection, entry);
        }
        drop(state);
        debug!(%collection, lease, "subscribed");
        Subscription::new(Arc::clone(&self.inner), collection, lease, receiver)
    }

    /// Current snapshot of `collection`, if anything holds it in the cache.
    #[must_use]
    pub fn snapshot(&self, collection: Collection) -> Option<Snapshot> {
        self.inner
            .lock()
            .entries
            .get(&collection)
            .map(|entry| entry.snapshot.borrow().clone())
    }

    /// Read every record of `collection`, joining any in-flight read.
    ///
    /// # Errors
    ///
    /// Returns the [`SourceError`] of the shared read.
    pub async fn fetch_all(&self, collection: Collection) -> Result<Arc<[Resource]>, SourceError> {
        let fetch = {
            let mut state = self.inner.lock();
            let entry = state.entry(collection);
            match &entry.in_flight {
                Some(in_flight) => {
                    debug!(%collection, sequence = in_flight.sequence, "joining in-flight fetch");
                    in_flight.fetch.clone()
                }
                None => StoreInner::join_new_fetch(&self.inner, collection, entry),
            }
        };
        fetch.await
    }

    /// Read one record. The cache is not consulted or updated.
    ///
    /// # Errors
    ///
    /// Returns the backend's [`SourceError`].
    pub async fn fetch_one(
        &self,
        collection: Collection,
        id: ResourceId,
    ) -> Result<Resource, SourceError> {
        debug!(%collection, %id, "fetching record");
        self.inner.source.get(collection, id).await
    }

    /// Create a record from any serialisable draft.
    ///
    /// Returns the backend's echo, or `None` when the write was accepted but
    /// the echo is not a complete record.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidRequest`] when `draft` cannot be encoded,
    /// otherwise the backend's error.
    pub async fn create<T>(
        &self,
        collection: Collection,
        draft: &T,
    ) -> Result<Option<Resource>, SourceError>
    where
        T: Serialize + ?Sized + Sync,
    {
        let body = encode(draft)?;
        self.create_value(collection, &body).await
    }

    /// Replace record `id` with a full or partial patch.
    ///
    /// Backends echo a partial patch back as-is, so the echo is `None` unless
    /// it reads as a complete record.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidRequest`] when `patch` cannot be encoded,
    /// otherwise the backend's error.
    pub async fn update<T>(
        &self,
        collection: Collection,
        id: ResourceId,
        patch: &T,
    ) -> Result<Option<Resource>, SourceError>
    where
        T: Serialize + ?Sized + Sync,
    {
        let body = encode(patch)?;
        self.update_value(collection, id, &body).await
    }

    /// Remove record `id`.
    ///
    /// # Errors
    ///
    /// Returns the backend's [`SourceError`].
    pub async fn delete(&self, collection: Collection, id: ResourceId) -> Result<(), SourceError> {
        debug!(%collection, %id, "deleting record");
        let result = self.inner.source.delete(collection, id).await;
        self.observe_write(collection, MutationKind::Delete, result).map(drop)
    }

    /// Run a tracked mutation, settling its status.
    ///
    /// Returns the backend's echo for creates and updates when it reads as a
    /// complete record, `None` otherwise. Any write the backend accepted
    /// settles the request as a success.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidRequest`] when `request` has already
    /// settled, otherwise the error recorded on the request.
    pub async fn execute(
        &self,
        request: &mut MutationRequest,
    ) -> Result<Option<Resource>, SourceError> {
        if request.is_settled() {
            return Err(SourceError::invalid_request("mutation has already settled"));
        }
        let collection = request.collection();
        let outcome = match request.operation() {
            Operation::Create { payload } => self.create_value(collection, payload).await,
            Operation::Update { id, payload } => self.update_value(collection, *id, payload).await,
            Operation::Delete { id } => self.delete(collection, *id).await.map(|()| None),
        };
        match &outcome {
            Ok(_) => request.succeed(),
            Err(error) => request.fail(error.clone()),
        }
        outcome
    }

    /// Validate a form candidate and send it.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::Invalid`] without contacting the backend when
    /// the candidate fails validation, or [`SubmitError::Source`] when the
    /// write fails.
    pub async fn submit(&self, form: &FormSubmission) -> Result<Option<Resource>, SubmitError> {
        let draft = validate(form.schema, &form.candidate).into_result()?;
        let collection = form.schema.collection();
        let echo = match form.target {
            Some(id) => self.update(collection, id, &draft).await?,
            None => self.create(collection, &draft).await?,
        };
        Ok(echo)
    }

    /// Mark `collection` stale.
    ///
    /// Any read issued before this call is no longer shared with new callers.
    /// Under [`InvalidationMode::Refetch`] a new read starts at once when the
    /// collection has subscribers.
    pub fn invalidate(&self, collection: Collection) {
        let mut state = self.inner.lock();
        let Some(entry) = state.entries.get_mut(&collection) else {
            debug!(%collection, "nothing cached; invalidation skipped");
            return;
        };
        entry.invalidated_through = entry.issued;
        entry.in_flight = None;
        entry.snapshot.send_if_modified(|snapshot| {
            let changed = !snapshot.is_stale();
            snapshot.mark_stale();
            changed
        });
        if self.inner.config.invalidation == InvalidationMode::Refetch && entry.subscribers > 0 {
            StoreInner::start_fetch(&self.inner, collection, entry);
        }
    }

    async fn create_value(
        &self,
        collection: Collection,
        body: &Value,
    ) -> Result<Option<Resource>, SourceError> {
        debug!(%collection, "creating record");
        let result = self.inner.source.create(collection, body).await;
        self.observe_write(collection, MutationKind::Create, result)
    }

    async fn update_value(
        &self,
        collection: Collection,
        id: ResourceId,
        body: &Value,
    ) -> Result<Option<Resource>, SourceError> {
        debug!(%collection, %id, "updating record");
        let result = self.inner.source.update(collection, id, body).await;
        self.observe_write(collection, MutationKind::Update, result)
    }

    /// Invalidate after any write the backend accepted. An accepted write
    /// whose echo cannot be decoded still succeeds, without an echo.
    fn observe_write<T>(
        &self,
        collection: Collection,
        kind: MutationKind,
        result: Result<T, SourceError>,
    ) -> Result<Option<T>, SourceError> {
        match result {
            Ok(echo) => {
                self.invalidate(collection);
                Ok(Some(echo))
            }
            Err(error) if error.is_acknowledged() => {
                debug!(%collection, ?kind, %error, "write acknowledged; echo is not a full record");
                self.invalidate(collection);
                Ok(None)
            }
            Err(error) => {
                warn!(%collection, ?kind, %error, "write failed");
                Err(error)
            }
        }
    }
}

fn encode<T>(value: &T) -> Result<Value, SourceError>
where
    T: Serialize + ?Sized,
{
    serde_json::to_value(value).map_err(|err| SourceError::invalid_request(err.to_string()))
}
