//! Domain types for the dashboard data layer.
//!
//! Purpose: describe collection snapshots, tracked mutations, list search
//! and page view state independently of any transport. The store drives
//! these types; adapters only see the ports.
//!
//! Public surface:
//! - Snapshot / FetchStatus: cached view of one collection.
//! - MutationRequest / Notice: write lifecycle and its user-facing outcome.
//! - SearchQuery / SearchField: client-side list filtering.
//! - ViewState / ViewAction: which panel of a collection page is open.

pub mod mutation;
pub mod ports;
pub mod search;
pub mod snapshot;
pub mod view_state;

pub use self::mutation::{MutationKind, MutationRequest, MutationStatus, Notice, NoticeLevel};
pub use self::search::{SearchField, SearchQuery, UnknownSearchField};
pub use self::snapshot::{FetchStatus, Snapshot};
pub use self::view_state::{InvalidTransition, ViewAction, ViewState};
