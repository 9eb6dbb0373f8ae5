//! Client-side filtering of a collection snapshot.
//!
//! Matching is a case-insensitive substring test on one chosen field. An
//! empty term matches every record. When the chosen field does not apply to
//! the record's collection, the collection's default field is used.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use resource_schema::{Collection, Resource};
use thiserror::Error;

/// Field a search term is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchField {
    /// User display name; the default for users.
    Name,
    /// User email address.
    Email,
    /// User handle.
    Username,
    /// User phone number.
    Phone,
    /// User website.
    Website,
    /// Post title; the default for posts.
    Title,
    /// Post body.
    Body,
    /// Owning user id of a post, matched against its decimal form.
    UserId,
}

impl SearchField {
    /// Field used when none is chosen for `collection`.
    #[must_use]
    pub const fn default_for(collection: Collection) -> Self {
        match collection {
            Collection::Users => Self::Name,
            Collection::Posts => Self::Title,
        }
    }

    /// Whether this field exists on records of `collection`.
    #[must_use]
    pub const fn applies_to(self, collection: Collection) -> bool {
        match self {
            Self::Name | Self::Email | Self::Username | Self::Phone | Self::Website => {
                matches!(collection, Collection::Users)
            }
            Self::Title | Self::Body | Self::UserId => matches!(collection, Collection::Posts),
        }
    }

    /// Wire name of the field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Username => "username",
            Self::Phone => "phone",
            Self::Website => "website",
            Self::Title => "title",
            Self::Body => "body",
            Self::UserId => "userId",
        }
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when parsing an unrecognised search field name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown search field: {name}")]
pub struct UnknownSearchField {
    /// The rejected input.
    pub name: String,
}

impl FromStr for SearchField {
    type Err = UnknownSearchField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "email" => Ok(Self::Email),
            "username" => Ok(Self::Username),
            "phone" => Ok(Self::Phone),
            "website" => Ok(Self::Website),
            "title" => Ok(Self::Title),
            "body" => Ok(Self::Body),
            "userid" | "user_id" => Ok(Self::UserId),
            _ => Err(UnknownSearchField { name: s.to_owned() }),
        }
    }
}

/// A search term bound to a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    field: Option<SearchField>,
    needle: String,
}

impl SearchQuery {
    /// Query `term` against the collection's default field.
    #[must_use]
    pub fn new(term: &str) -> Self {
        Self {
            field: None,
            needle: term.to_lowercase(),
        }
    }

    /// Query `term` against `field`.
    #[must_use]
    pub fn on(field: SearchField, term: &str) -> Self {
        Self {
            field: Some(field),
            ..Self::new(term)
        }
    }

    /// Whether the query matches everything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    /// Field used for records of `collection`.
    #[must_use]
    pub fn field_for(&self, collection: Collection) -> SearchField {
        self.field
            .filter(|field| field.applies_to(collection))
            .unwrap_or_else(|| SearchField::default_for(collection))
    }

    /// Whether `resource` matches the query.
    #[must_use]
    pub fn matches(&self, resource: &Resource) -> bool {
        if self.is_empty() {
            return true;
        }
        let field = self.field_for(resource.collection());
        field_text(resource, field).is_some_and(|text| text.to_lowercase().contains(&self.needle))
    }

    /// Matching records, in their original order.
    #[must_use]
    pub fn filter(&self, records: &[Resource]) -> Vec<Resource> {
        records
            .iter()
            .filter(|record| self.matches(record))
            .cloned()
            .collect()
    }
}

fn field_text(resource: &Resource, field: SearchField) -> Option<Cow<'_, str>> {
    let text = match (resource, field) {
        (Resource::User(user), SearchField::Name) => &user.name,
        (Resource::User(user), SearchField::Email) => &user.email,
        (Resource::User(user), SearchField::Username) => &user.username,
        (Resource::User(user), SearchField::Phone) => &user.phone,
        (Resource::User(user), SearchField::Website) => &user.website,
        (Resource::Post(post), SearchField::Title) => &post.title,
        (Resource::Post(post), SearchField::Body) => &post.body,
        (Resource::Post(post), SearchField::UserId) => {
            return Some(Cow::Owned(post.user_id.to_string()));
        }
        _ => return None,
    };
    Some(Cow::Borrowed(text.as_str()))
}
