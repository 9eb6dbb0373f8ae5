//! Data layer for the admin dashboard.
//!
//! [`CollectionStore`] caches the `users` and `posts` collections of a REST
//! backend, shares concurrent reads, and re-reads a collection after every
//! acknowledged write. Form candidates pass through
//! [`resource_schema::validate`] before anything is sent.
//!
//! The backend is reached through the [`CollectionSource`] port;
//! [`RestCollectionSource`] implements it over HTTP.

pub mod domain;
pub mod outbound;
pub mod settings;
pub mod store;

pub use domain::ports::{CollectionSource, SourceError};
pub use domain::{
    FetchStatus, InvalidTransition, MutationKind, MutationRequest, MutationStatus, Notice,
    NoticeLevel, SearchField, SearchQuery, Snapshot, UnknownSearchField, ViewAction, ViewState,
};
pub use outbound::http::RestCollectionSource;
pub use settings::{DashboardSettings, InvalidBaseUrl};
pub use store::{
    CollectionStore, FormSubmission, InvalidationMode, StoreConfig, SubmitError, Subscription,
};
