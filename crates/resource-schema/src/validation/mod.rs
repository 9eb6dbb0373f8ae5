//! Form validation for candidate user and post records.
//!
//! Validation is synchronous and pure. Every declared field is checked on
//! each call and all failures are collected, keyed by dotted field path, so a
//! form can attach each message to the matching input.

mod rules;

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::resource::{
    Address, Collection, Company, Geo, PostDraft, ResourceDraft, ResourceId, UserDraft,
};
use rules::{Coerced, FieldSpec, POST_FIELDS, USER_FIELDS, coerce, passes};
pub use rules::{
    POST_BODY_MAX, POST_BODY_MIN, POST_TITLE_MAX, POST_TITLE_MIN, USER_NAME_MAX, USER_NAME_MIN,
    USERNAME_MAX, USERNAME_MIN,
};

/// Dotted identifier locating a possibly nested field, such as `address.city`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldPath(&'static str);

impl FieldPath {
    pub(crate) const fn new(path: &'static str) -> Self {
        Self(path)
    }

    /// Borrow the dotted path.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.0
    }

    /// Look up the value at this path inside a JSON object tree.
    fn lookup(self, root: &Value) -> Option<&Value> {
        self.0
            .split('.')
            .try_fold(root, |node, segment| node.as_object()?.get(segment))
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Resource schema a candidate record is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Schema {
    /// Rules for user records.
    User,
    /// Rules for post records.
    Post,
}

impl Schema {
    /// Schema governing records of `collection`.
    #[must_use]
    pub const fn for_collection(collection: Collection) -> Self {
        match collection {
            Collection::Users => Self::User,
            Collection::Posts => Self::Post,
        }
    }

    /// Collection whose records this schema describes.
    #[must_use]
    pub const fn collection(self) -> Collection {
        match self {
            Self::User => Collection::Users,
            Self::Post => Collection::Posts,
        }
    }

    /// Field paths this schema declares rules for, in evaluation order.
    pub fn field_paths(self) -> impl Iterator<Item = FieldPath> {
        self.fields().iter().map(|spec| spec.path)
    }

    const fn fields(self) -> &'static [FieldSpec] {
        match self {
            Self::User => USER_FIELDS,
            Self::Post => POST_FIELDS,
        }
    }
}

/// Field-keyed validation messages, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    entries: Vec<(FieldPath, &'static str)>,
}

impl FieldErrors {
    /// Message recorded for `path`, if that field failed.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(field, _)| field.as_str() == path)
            .map(|(_, message)| *message)
    }

    /// Whether `path` failed validation.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Number of failing fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate failing fields and their messages.
    pub fn iter(&self) -> impl Iterator<Item = (FieldPath, &'static str)> + '_ {
        self.entries.iter().copied()
    }

    fn push(&mut self, path: FieldPath, message: &'static str) {
        self.entries.push((path, message));
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed")?;
        for (index, (path, message)) in self.entries.iter().enumerate() {
            let separator = if index == 0 { ": " } else { "; " };
            write!(f, "{separator}{path}: {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

impl Serialize for FieldErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (path, message) in &self.entries {
            map.serialize_entry(path.as_str(), message)?;
        }
        map.end()
    }
}

/// Outcome of validating one candidate record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// Every rule passed; carries the normalised record.
    Valid(ResourceDraft),
    /// At least one field failed.
    Invalid(FieldErrors),
}

impl ValidationResult {
    /// Whether the candidate passed.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// Field errors, when the candidate failed.
    #[must_use]
    pub const fn errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Invalid(errors) => Some(errors),
            Self::Valid(_) => None,
        }
    }

    /// Convert into a `Result` for `?` propagation.
    ///
    /// # Errors
    ///
    /// Returns the collected [`FieldErrors`] when the candidate failed.
    pub fn into_result(self) -> Result<ResourceDraft, FieldErrors> {
        match self {
            Self::Valid(draft) => Ok(draft),
            Self::Invalid(errors) => Err(errors),
        }
    }
}

/// Validate a candidate record against `schema`.
///
/// # Examples
///
/// ```
/// use resource_schema::{Schema, validate};
/// use serde_json::json;
///
/// let result = validate(
///     Schema::Post,
///     &json!({ "title": "Hi", "body": "Short content here", "userId": 3 }),
/// );
/// let errors = result.errors().expect("title is too short");
/// assert_eq!(errors.get("title"), Some("Title must be at least 5 characters"));
/// assert_eq!(errors.len(), 1);
/// ```
#[must_use]
pub fn validate(schema: Schema, candidate: &Value) -> ValidationResult {
    let mut errors = FieldErrors::default();
    let mut accepted = Vec::with_capacity(schema.fields().len());

    for spec in schema.fields() {
        match check_field(spec, candidate) {
            Ok(value) => accepted.push((spec.path, value)),
            Err(message) => errors.push(spec.path, message),
        }
    }

    if !errors.is_empty() {
        return ValidationResult::Invalid(errors);
    }

    let values = AcceptedValues(accepted);
    let draft = match schema {
        Schema::User => ResourceDraft::User(user_draft(&values, candidate)),
        Schema::Post => ResourceDraft::Post(post_draft(&values)),
    };
    ValidationResult::Valid(draft)
}

fn check_field(spec: &FieldSpec, candidate: &Value) -> Result<Coerced, &'static str> {
    let value = coerce(spec.kind, spec.path.lookup(candidate)).map_err(|()| spec.type_message)?;
    spec.rules
        .iter()
        .find(|field_rule| !passes(field_rule.rule, &value))
        .map_or(Ok(value), |failed| Err(failed.message))
}

struct AcceptedValues(Vec<(FieldPath, Coerced)>);

impl AcceptedValues {
    fn text(&self, path: &str) -> String {
        match self.find(path) {
            Some(Coerced::Text(text)) => text.clone(),
            _ => String::new(),
        }
    }

    fn id(&self, path: &str) -> ResourceId {
        match self.find(path) {
            Some(Coerced::Whole(whole)) => ResourceId::new(*whole),
            Some(Coerced::Number(number)) => ResourceId::new(whole_number(*number)),
            _ => ResourceId::new(0),
        }
    }

    fn find(&self, path: &str) -> Option<&Coerced> {
        self.0
            .iter()
            .find(|(field, _)| field.as_str() == path)
            .map(|(_, value)| value)
    }
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "the positive, integer and range rules have already accepted the value"
)]
fn whole_number(value: f64) -> u64 {
    value as u64
}

fn optional_text(candidate: &Value, path: &'static str) -> Option<String> {
    match FieldPath::new(path).lookup(candidate) {
        Some(Value::String(text)) if !text.is_empty() => Some(text.clone()),
        Some(Value::Number(number)) => Some(number.to_string()),
        _ => None,
    }
}

fn user_draft(values: &AcceptedValues, candidate: &Value) -> UserDraft {
    let geo = match (
        optional_text(candidate, "address.geo.lat"),
        optional_text(candidate, "address.geo.lng"),
    ) {
        (Some(lat), Some(lng)) => Some(Geo { lat, lng }),
        _ => None,
    };

    UserDraft {
        name: values.text("name"),
        username: values.text("username"),
        email: values.text("email"),
        phone: values.text("phone"),
        website: values.text("website"),
        address: Address {
            street: values.text("address.street"),
            suite: optional_text(candidate, "address.suite"),
            city: values.text("address.city"),
            zipcode: values.text("address.zipcode"),
            geo,
        },
        company: Company {
            name: values.text("company.name"),
            catch_phrase: optional_text(candidate, "company.catchPhrase"),
            bs: optional_text(candidate, "company.bs"),
        },
    }
}

fn post_draft(values: &AcceptedValues) -> PostDraft {
    PostDraft {
        user_id: values.id("userId"),
        title: values.text("title"),
        body: values.text("body"),
    }
}
