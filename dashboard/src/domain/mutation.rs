//! Tracked write requests and the notices shown when they settle.

use resource_schema::{Collection, ResourceId};
use serde::Serialize;
use serde_json::Value;

use crate::domain::ports::SourceError;

/// Kind of write against a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationKind {
    /// `POST /{collection}`.
    Create,
    /// `PUT /{collection}/{id}`.
    Update,
    /// `DELETE /{collection}/{id}`.
    Delete,
}

impl MutationKind {
    const fn past_tense(self) -> &'static str {
        match self {
            Self::Create => "created",
            Self::Update => "updated",
            Self::Delete => "deleted",
        }
    }

    const fn verb(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// Lifecycle of a mutation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationStatus {
    /// Submitted, response not yet observed.
    Pending,
    /// The backend accepted the write.
    Success,
    /// The write failed.
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Operation {
    Create { payload: Value },
    Update { id: ResourceId, payload: Value },
    Delete { id: ResourceId },
}

/// A pending or settled write against one collection.
///
/// Requests move from `Pending` to exactly one terminal status and are then
/// discarded once their notice has been shown.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationRequest {
    collection: Collection,
    operation: Operation,
    status: MutationStatus,
    error: Option<SourceError>,
}

impl MutationRequest {
    /// Request creation of a record from `payload`.
    #[must_use]
    pub const fn create(collection: Collection, payload: Value) -> Self {
        Self::pending(collection, Operation::Create { payload })
    }

    /// Request a full or partial update of `id`.
    #[must_use]
    pub const fn update(collection: Collection, id: ResourceId, payload: Value) -> Self {
        Self::pending(collection, Operation::Update { id, payload })
    }

    /// Request removal of `id`.
    #[must_use]
    pub const fn delete(collection: Collection, id: ResourceId) -> Self {
        Self::pending(collection, Operation::Delete { id })
    }

    const fn pending(collection: Collection, operation: Operation) -> Self {
        Self {
            collection,
            operation,
            status: MutationStatus::Pending,
            error: None,
        }
    }

    /// Target collection.
    #[must_use]
    pub const fn collection(&self) -> Collection {
        self.collection
    }

    /// Kind of write.
    #[must_use]
    pub const fn kind(&self) -> MutationKind {
        match self.operation {
            Operation::Create { .. } => MutationKind::Create,
            Operation::Update { .. } => MutationKind::Update,
            Operation::Delete { .. } => MutationKind::Delete,
        }
    }

    /// Targeted record, for updates and deletes.
    #[must_use]
    pub const fn target(&self) -> Option<ResourceId> {
        match self.operation {
            Operation::Create { .. } => None,
            Operation::Update { id, .. } | Operation::Delete { id } => Some(id),
        }
    }

    /// Body sent to the backend, for creates and updates.
    #[must_use]
    pub const fn payload(&self) -> Option<&Value> {
        match &self.operation {
            Operation::Create { payload } | Operation::Update { payload, .. } => Some(payload),
            Operation::Delete { .. } => None,
        }
    }

    /// Current lifecycle status.
    #[must_use]
    pub const fn status(&self) -> MutationStatus {
        self.status
    }

    /// Failure recorded when the request settled in error.
    #[must_use]
    pub const fn error(&self) -> Option<&SourceError> {
        self.error.as_ref()
    }

    /// Whether the request has reached a terminal status.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        !matches!(self.status, MutationStatus::Pending)
    }

    pub(crate) const fn operation(&self) -> &Operation {
        &self.operation
    }

    pub(crate) fn succeed(&mut self) {
        self.status = MutationStatus::Success;
        self.error = None;
    }

    pub(crate) fn fail(&mut self, error: SourceError) {
        self.status = MutationStatus::Error;
        self.error = Some(error);
    }

    /// User-facing notice for a settled request; `None` while pending.
    #[must_use]
    pub fn notice(&self) -> Option<Notice> {
        match self.status {
            MutationStatus::Pending => None,
            MutationStatus::Success => Some(Notice::success(self.collection, self.kind())),
            MutationStatus::Error => Some(Notice::failure(self.collection, self.kind())),
        }
    }
}

fn capitalised(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Severity of a transient notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    /// The operation succeeded.
    Success,
    /// The operation failed; the user may retry.
    Error,
}

/// Transient message describing a settled mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Short heading.
    pub title: &'static str,
    /// Sentence describing the outcome.
    pub description: String,
}

impl Notice {
    /// Notice for a write that succeeded, e.g. "Post created successfully".
    #[must_use]
    pub fn success(collection: Collection, kind: MutationKind) -> Self {
        Self {
            level: NoticeLevel::Success,
            title: "Success",
            description: format!(
                "{} {} successfully",
                capitalised(collection.noun()),
                kind.past_tense()
            ),
        }
    }

    /// Notice for a write that failed, e.g. "Failed to delete user".
    #[must_use]
    pub fn failure(collection: Collection, kind: MutationKind) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: "Error",
            description: format!("Failed to {} {}", kind.verb(), collection.noun()),
        }
    }
}
