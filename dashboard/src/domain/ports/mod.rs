//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod collection_source;

#[cfg(test)]
pub use collection_source::MockCollectionSource;
pub use collection_source::{CollectionSource, SourceError};
