//! Which panel of a collection page is active.
//!
//! At most one form, detail view, or delete confirmation is open at a time.
//! Illegal transitions are rejected rather than silently ignored.

use resource_schema::ResourceId;
use thiserror::Error;

/// Active panel on a collection page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewState {
    /// Only the list is shown.
    #[default]
    Listing,
    /// The create form is open.
    Creating,
    /// The edit form is open for a record.
    Editing(ResourceId),
    /// The detail view is open for a record.
    Viewing(ResourceId),
    /// Deletion of a record awaits confirmation.
    ConfirmingDelete(ResourceId),
}

/// User or store event that may change the active panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewAction {
    /// Open the create form.
    OpenCreate,
    /// Open the edit form for a record.
    OpenEdit(ResourceId),
    /// Open the detail view for a record.
    OpenDetails(ResourceId),
    /// Ask for confirmation before deleting a record.
    RequestDelete(ResourceId),
    /// Close whatever is open.
    Cancel,
    /// The pending create, update or delete succeeded.
    MutationSucceeded,
    /// The pending create, update or delete failed; the panel stays open.
    MutationFailed,
}

/// Raised when an action is not valid in the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot apply {action:?} while {state:?}")]
pub struct InvalidTransition {
    /// State the action was applied to.
    pub state: ViewState,
    /// Rejected action.
    pub action: ViewAction,
}

impl ViewState {
    /// Compute the state that follows `action`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTransition`] when `action` would open a second panel
    /// or close one that is not open.
    ///
    /// # Examples
    /// ```
    /// use dashboard::{ViewAction, ViewState};
    /// use resource_schema::ResourceId;
    ///
    /// let id = ResourceId::new(3);
    /// let state = ViewState::Listing.apply(ViewAction::OpenDetails(id))?;
    /// let state = state.apply(ViewAction::OpenEdit(id))?;
    /// assert_eq!(state, ViewState::Editing(id));
    /// assert!(state.apply(ViewAction::OpenCreate).is_err());
    /// # Ok::<(), dashboard::InvalidTransition>(())
    /// ```
    pub const fn apply(self, action: ViewAction) -> Result<Self, InvalidTransition> {
        match (self, action) {
            (Self::Listing, ViewAction::OpenCreate) => Ok(Self::Creating),
            (Self::Listing, ViewAction::OpenEdit(id))
            | (Self::Viewing(id), ViewAction::OpenEdit(_)) => Ok(Self::Editing(id)),
            (Self::Listing, ViewAction::OpenDetails(id)) => Ok(Self::Viewing(id)),
            (Self::Listing, ViewAction::RequestDelete(id))
            | (Self::Viewing(id), ViewAction::RequestDelete(_)) => Ok(Self::ConfirmingDelete(id)),
            (
                Self::Creating | Self::Editing(_) | Self::Viewing(_) | Self::ConfirmingDelete(_),
                ViewAction::Cancel,
            )
            | (
                Self::Creating | Self::Editing(_) | Self::ConfirmingDelete(_),
                ViewAction::MutationSucceeded,
            ) => Ok(Self::Listing),
            (
                Self::Creating | Self::Editing(_) | Self::ConfirmingDelete(_),
                ViewAction::MutationFailed,
            ) => Ok(self),
            _ => Err(InvalidTransition {
                state: self,
                action,
            }),
        }
    }

    /// Record targeted by the open panel, if any.
    #[must_use]
    pub const fn target(self) -> Option<ResourceId> {
        match self {
            Self::Listing | Self::Creating => None,
            Self::Editing(id) | Self::Viewing(id) | Self::ConfirmingDelete(id) => Some(id),
        }
    }

    /// Whether a create or edit form is open.
    #[must_use]
    pub const fn is_form_open(self) -> bool {
        matches!(self, Self::Creating | Self::Editing(_))
    }
}

#[cfg(test)]
mod tests {
    //! Transition table coverage.

    use rstest::rstest;

    use super::*;

    const ID: ResourceId = ResourceId::new(7);
    const OTHER: ResourceId = ResourceId::new(8);

    #[rstest]
    #[case(ViewState::Listing, ViewAction::OpenCreate, ViewState::Creating)]
    #[case(ViewState::Listing, ViewAction::OpenEdit(ID), ViewState::Editing(ID))]
    #[case(ViewState::Listing, ViewAction::OpenDetails(ID), ViewState::Viewing(ID))]
    #[case(
        ViewState::Listing,
        ViewAction::RequestDelete(ID),
        ViewState::ConfirmingDelete(ID)
    )]
    #[case(ViewState::Viewing(ID), ViewAction::OpenEdit(OTHER), ViewState::Editing(ID))]
    #[case(
        ViewState::Viewing(ID),
        ViewAction::RequestDelete(OTHER),
        ViewState::ConfirmingDelete(ID)
    )]
    #[case(ViewState::Creating, ViewAction::Cancel, ViewState::Listing)]
    #[case(ViewState::Viewing(ID), ViewAction::Cancel, ViewState::Listing)]
    #[case(ViewState::Editing(ID), ViewAction::MutationSucceeded, ViewState::Listing)]
    #[case(
        ViewState::ConfirmingDelete(ID),
        ViewAction::MutationSucceeded,
        ViewState::Listing
    )]
    #[case(ViewState::Editing(ID), ViewAction::MutationFailed, ViewState::Editing(ID))]
    #[case(
        ViewState::ConfirmingDelete(ID),
        ViewAction::MutationFailed,
        ViewState::ConfirmingDelete(ID)
    )]
    fn allowed_transitions(
        #[case] from: ViewState,
        #[case] action: ViewAction,
        #[case] expected: ViewState,
    ) {
        assert_eq!(from.apply(action), Ok(expected));
    }

    #[rstest]
    #[case(ViewState::Creating, ViewAction::OpenEdit(ID))]
    #[case(ViewState::Editing(ID), ViewAction::OpenCreate)]
    #[case(ViewState::ConfirmingDelete(ID), ViewAction::OpenDetails(ID))]
    #[case(ViewState::Listing, ViewAction::Cancel)]
    #[case(ViewState::Listing, ViewAction::MutationSucceeded)]
    #[case(ViewState::Viewing(ID), ViewAction::MutationFailed)]
    fn rejected_transitions(#[case] from: ViewState, #[case] action: ViewAction) {
        assert_eq!(
            from.apply(action),
            Err(InvalidTransition {
                state: from,
                action
            })
        );
    }

    #[test]
    fn default_is_listing_with_no_target() {
        let state = ViewState::default();
        assert_eq!(state, ViewState::Listing);
        assert_eq!(state.target(), None);
        assert!(!state.is_form_open());
        assert!(ViewState::Editing(ID).is_form_open());
    }
}
