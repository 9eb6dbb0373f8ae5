//! HTTP outbound adapters.
//!
//! This module provides a thin reqwest implementation of the
//! `CollectionSource` port.

mod rest_source;

pub use rest_source::RestCollectionSource;
