//! Resource models and form validation for the admin dashboard.
//!
//! This crate owns the shapes of the two backend collections (users and
//! posts) and the rule tables that gate user input before it is submitted.
//! It performs no I/O, so the store and any front end can share it.
//!
//! # Example
//!
//! ```
//! use resource_schema::{ResourceDraft, Schema, validate};
//! use serde_json::json;
//!
//! let candidate = json!({
//!     "title": "Valid Title Here",
//!     "body": "This is sufficiently long content.",
//!     "userId": 3
//! });
//!
//! let draft = validate(Schema::Post, &candidate)
//!     .into_result()
//!     .expect("candidate is valid");
//! assert!(matches!(draft, ResourceDraft::Post(_)));
//! ```

mod resource;
mod validation;

pub use resource::{
    Address, Collection, Company, Geo, Post, PostDraft, Resource, ResourceDraft, ResourceId,
    UnknownCollection, User, UserDraft,
};
pub use validation::{
    FieldErrors, FieldPath, POST_BODY_MAX, POST_BODY_MIN, POST_TITLE_MAX, POST_TITLE_MIN,
    Schema, USER_NAME_MAX, USER_NAME_MIN, USERNAME_MAX, USERNAME_MIN, ValidationResult, validate,
};
