//! Driven port for reading and writing backend collections.
//!
//! The store only talks to the backend through this trait, so tests can
//! substitute scripted sources and alternative backends can be plugged in
//! without touching cache semantics.

use async_trait::async_trait;
use resource_schema::{Collection, Resource, ResourceId};
use serde_json::Value;

use super::define_port_error;

define_port_error! {
    /// Errors surfaced while calling the collection backend.
    pub enum SourceError {
        /// The request failed before a response arrived.
        Network {
            /// Transport failure description.
            message: String,
        } => "network error: {message}",
        /// The request exceeded the transport timeout.
        Timeout {
            /// Transport failure description.
            message: String,
        } => "request timed out: {message}",
        /// The backend answered with a non-success status.
        Request {
            /// HTTP status code returned by the backend.
            status: u16,
            /// Response body preview or canonical reason.
            message: String,
        } => "request failed with status {status}: {message}",
        /// A success response could not be decoded.
        Decode {
            /// Decoder failure description.
            message: String,
        } => "response decode failed: {message}",
        /// The request was rejected before it was sent.
        InvalidRequest {
            /// Reason the request could not be built.
            message: String,
        } => "request invalid: {message}",
    }
}

impl SourceError {
    /// HTTP-like status code, when the backend produced one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Request { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the failure happened in transport rather than at the backend.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Timeout { .. })
    }

    /// Whether the backend acknowledged the request with a success status.
    ///
    /// Only decode failures qualify: the write was accepted but its echo
    /// could not be read back.
    #[must_use]
    pub const fn is_acknowledged(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}

/// Port for the REST collection backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CollectionSource: Send + Sync {
    /// Read every record in `collection`, in backend order.
    async fn list(&self, collection: Collection) -> Result<Vec<Resource>, SourceError>;

    /// Read one record.
    async fn get(&self, collection: Collection, id: ResourceId) -> Result<Resource, SourceError>;

    /// Send a new record; returns the backend's echo of it.
    async fn create(&self, collection: Collection, body: &Value)
    -> Result<Resource, SourceError>;

    /// Send a full or partial replacement; returns the backend's echo.
    async fn update(
        &self,
        collection: Collection,
        id: ResourceId,
        body: &Value,
    ) -> Result<Resource, SourceError>;

    /// Remove a record.
    async fn delete(&self, collection: Collection, id: ResourceId) -> Result<(), SourceError>;
}
