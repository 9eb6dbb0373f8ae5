//! Resource models served by the REST backend.
//!
//! Records mirror the backend's JSON shapes (camelCase keys). Identifiers are
//! assigned by the backend on creation, so every model has an id-less draft
//! counterpart used for create and update payloads.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Backend-assigned resource identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(u64);

impl ResourceId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Return the raw identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for ResourceId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ResourceId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// Raised when a collection name is not one the backend serves.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown collection '{name}': expected 'users' or 'posts'")]
pub struct UnknownCollection {
    /// The rejected collection name.
    pub name: String,
}

/// Named collection of resources exposed by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    /// The `/users` collection.
    Users,
    /// The `/posts` collection.
    Posts,
}

impl Collection {
    /// Every collection, in display order.
    pub const ALL: [Self; 2] = [Self::Users, Self::Posts];

    /// Path segment and cache key for this collection.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Posts => "posts",
        }
    }

    /// Singular, lower-case noun for one member of the collection.
    #[must_use]
    pub const fn noun(self) -> &'static str {
        match self {
            Self::Users => "user",
            Self::Posts => "post",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = UnknownCollection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "users" => Ok(Self::Users),
            "posts" => Ok(Self::Posts),
            other => Err(UnknownCollection {
                name: other.to_owned(),
            }),
        }
    }
}

/// Optional geographic coordinates attached to an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geo {
    /// Latitude as sent by the backend.
    pub lat: String,
    /// Longitude as sent by the backend.
    pub lng: String,
}

/// Postal address of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Street name and number.
    pub street: String,
    /// Apartment or suite, when provided.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suite: Option<String>,
    /// City name.
    pub city: String,
    /// Postal code.
    pub zipcode: String,
    /// Coordinates, when provided.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo: Option<Geo>,
}

/// Employer details of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    /// Company name.
    pub name: String,
    /// Marketing catch phrase.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catch_phrase: Option<String>,
    /// Business-speak tag line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bs: Option<String>,
}

/// User fields accepted on create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDraft {
    /// Full name.
    pub name: String,
    /// Login handle.
    pub username: String,
    /// Contact email address.
    pub email: String,
    /// Contact phone number.
    pub phone: String,
    /// Personal website URL.
    pub website: String,
    /// Postal address.
    pub address: Address,
    /// Employer.
    pub company: Company,
}

impl UserDraft {
    /// Attach a backend identifier to the draft.
    #[must_use]
    pub fn with_id(self, id: ResourceId) -> User {
        User {
            id,
            name: self.name,
            username: self.username,
            email: self.email,
            phone: self.phone,
            website: self.website,
            address: self.address,
            company: self.company,
        }
    }
}

/// A user record as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Backend-assigned identifier.
    pub id: ResourceId,
    /// Full name.
    pub name: String,
    /// Login handle.
    pub username: String,
    /// Contact email address.
    pub email: String,
    /// Contact phone number.
    pub phone: String,
    /// Personal website URL.
    pub website: String,
    /// Postal address.
    pub address: Address,
    /// Employer.
    pub company: Company,
}

impl User {
    /// Strip the identifier, producing an editable draft.
    #[must_use]
    pub fn into_draft(self) -> UserDraft {
        UserDraft {
            name: self.name,
            username: self.username,
            email: self.email,
            phone: self.phone,
            website: self.website,
            address: self.address,
            company: self.company,
        }
    }
}

/// Post fields accepted on create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDraft {
    /// Author reference. Not checked against the users collection.
    pub user_id: ResourceId,
    /// Headline.
    pub title: String,
    /// Body text.
    pub body: String,
}

impl PostDraft {
    /// Attach a backend identifier to the draft.
    #[must_use]
    pub fn with_id(self, id: ResourceId) -> Post {
        Post {
            id,
            user_id: self.user_id,
            title: self.title,
            body: self.body,
        }
    }
}

/// A post record as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Backend-assigned identifier.
    pub id: ResourceId,
    /// Author reference.
    pub user_id: ResourceId,
    /// Headline.
    pub title: String,
    /// Body text.
    pub body: String,
}

impl Post {
    /// Strip the identifier, producing an editable draft.
    #[must_use]
    pub fn into_draft(self) -> PostDraft {
        PostDraft {
            user_id: self.user_id,
            title: self.title,
            body: self.body,
        }
    }
}

/// Any record served by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Resource {
    /// A member of `/users`.
    User(User),
    /// A member of `/posts`.
    Post(Post),
}

impl Resource {
    /// Backend identifier of the record.
    #[must_use]
    pub const fn id(&self) -> ResourceId {
        match self {
            Self::User(user) => user.id,
            Self::Post(post) => post.id,
        }
    }

    /// Collection the record belongs to.
    #[must_use]
    pub const fn collection(&self) -> Collection {
        match self {
            Self::User(_) => Collection::Users,
            Self::Post(_) => Collection::Posts,
        }
    }

    /// Borrow the record as a user, if it is one.
    #[must_use]
    pub const fn as_user(&self) -> Option<&User> {
        match self {
            Self::User(user) => Some(user),
            Self::Post(_) => None,
        }
    }

    /// Borrow the record as a post, if it is one.
    #[must_use]
    pub const fn as_post(&self) -> Option<&Post> {
        match self {
            Self::Post(post) => Some(post),
            Self::User(_) => None,
        }
    }
}

/// An id-less record ready to be sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResourceDraft {
    /// A user payload.
    User(UserDraft),
    /// A post payload.
    Post(PostDraft),
}

impl ResourceDraft {
    /// Collection the draft targets.
    #[must_use]
    pub const fn collection(&self) -> Collection {
        match self {
            Self::User(_) => Collection::Users,
            Self::Post(_) => Collection::Posts,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Covers identifier parsing and backend JSON shapes.

    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    #[case("users", Collection::Users)]
    #[case("posts", Collection::Posts)]
    fn collections_parse_from_path_names(#[case] raw: &str, #[case] expected: Collection) {
        assert_eq!(raw.parse::<Collection>(), Ok(expected));
        assert_eq!(expected.as_str(), raw);
    }

    #[rstest]
    #[case("Users")]
    #[case("comments")]
    #[case("")]
    fn unknown_collections_are_rejected(#[case] raw: &str) {
        let error = raw.parse::<Collection>().expect_err("name should be rejected");
        assert_eq!(error.name, raw);
    }

    #[test]
    fn resource_id_parses_trimmed_integers() {
        assert_eq!(" 42 ".parse::<ResourceId>(), Ok(ResourceId::new(42)));
        assert!("forty-two".parse::<ResourceId>().is_err());
    }

    #[test]
    fn user_decodes_backend_shape() {
        let raw = json!({
            "id": 1,
            "name": "Leanne Graham",
            "username": "Bret",
            "email": "Sincere@april.biz",
            "address": {
                "street": "Kulas Light",
                "suite": "Apt. 556",
                "city": "Gwenborough",
                "zipcode": "92998-3874",
                "geo": { "lat": "-37.3159", "lng": "81.1496" }
            },
            "phone": "1-770-736-8031 x56442",
            "website": "hildegard.org",
            "company": {
                "name": "Romaguera-Crona",
                "catchPhrase": "Multi-layered client-server neural-net",
                "bs": "harness real-time e-markets"
            }
        });

        let user: User = serde_json::from_value(raw).expect("user should decode");
        assert_eq!(user.id, ResourceId::new(1));
        assert_eq!(user.address.suite.as_deref(), Some("Apt. 556"));
        assert_eq!(
            user.company.catch_phrase.as_deref(),
            Some("Multi-layered client-server neural-net")
        );
    }

    #[test]
    fn post_uses_camel_case_author_key() {
        let post = Post {
            id: ResourceId::new(7),
            user_id: ResourceId::new(3),
            title: "Valid Title Here".to_owned(),
            body: "This is sufficiently long content.".to_owned(),
        };

        let encoded = serde_json::to_value(&post).expect("post should encode");
        assert_eq!(encoded.get("userId"), Some(&json!(3)));
        assert_eq!(encoded.get("id"), Some(&json!(7)));
    }

    #[test]
    fn drafts_round_trip_identity_through_with_id() {
        let draft = PostDraft {
            user_id: ResourceId::new(1),
            title: "Hello there".to_owned(),
            body: "Body text long enough".to_owned(),
        };
        let post = draft.clone().with_id(ResourceId::new(101));
        assert_eq!(post.id, ResourceId::new(101));
        assert_eq!(post.into_draft(), draft);
    }

    #[test]
    fn resource_reports_collection_and_id() {
        let resource = Resource::Post(Post {
            id: ResourceId::new(5),
            user_id: ResourceId::new(1),
            title: "Title".to_owned(),
            body: "Body".to_owned(),
        });
        assert_eq!(resource.collection(), Collection::Posts);
        assert_eq!(resource.id(), ResourceId::new(5));
        assert!(resource.as_user().is_none());
    }
}
