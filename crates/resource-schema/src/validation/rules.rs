//! Per-schema rule tables.
//!
//! Each field owns an ordered list of rules; the first failing rule supplies
//! the field's message. Fields are evaluated independently.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use url::Url;

use super::FieldPath;

/// Value shape expected at a field path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldKind {
    Text,
    Integer,
}

/// A single constraint on a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Rule {
    Required,
    MinChars(usize),
    MaxChars(usize),
    Email,
    Phone,
    Url,
    Positive,
    Integer,
    FitsId,
}

/// A rule paired with the message reported when it fails.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FieldRule {
    pub(crate) rule: Rule,
    pub(crate) message: &'static str,
}

impl FieldRule {
    const fn new(rule: Rule, message: &'static str) -> Self {
        Self { rule, message }
    }
}

/// Declared constraints for one field path.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FieldSpec {
    pub(crate) path: FieldPath,
    pub(crate) kind: FieldKind,
    /// Reported when the value has the wrong JSON shape.
    pub(crate) type_message: &'static str,
    pub(crate) rules: &'static [FieldRule],
}

/// Minimum name length in characters.
pub const USER_NAME_MIN: usize = 2;
/// Maximum name length in characters.
pub const USER_NAME_MAX: usize = 50;
/// Minimum username length in characters.
pub const USERNAME_MIN: usize = 3;
/// Maximum username length in characters.
pub const USERNAME_MAX: usize = 20;
/// Minimum post title length in characters.
pub const POST_TITLE_MIN: usize = 5;
/// Maximum post title length in characters.
pub const POST_TITLE_MAX: usize = 100;
/// Minimum post body length in characters.
pub const POST_BODY_MIN: usize = 10;
/// Maximum post body length in characters.
pub const POST_BODY_MAX: usize = 1000;

pub(crate) const USER_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        path: FieldPath::new("name"),
        kind: FieldKind::Text,
        type_message: "Name must be text",
        rules: &[
            FieldRule::new(Rule::Required, "Name is required"),
            FieldRule::new(
                Rule::MinChars(USER_NAME_MIN),
                "Name must be at least 2 characters",
            ),
            FieldRule::new(
                Rule::MaxChars(USER_NAME_MAX),
                "Name must be less than 50 characters",
            ),
        ],
    },
    FieldSpec {
        path: FieldPath::new("username"),
        kind: FieldKind::Text,
        type_message: "Username must be text",
        rules: &[
            FieldRule::new(Rule::Required, "Username is required"),
            FieldRule::new(
                Rule::MinChars(USERNAME_MIN),
                "Username must be at least 3 characters",
            ),
            FieldRule::new(
                Rule::MaxChars(USERNAME_MAX),
                "Username must be less than 20 characters",
            ),
        ],
    },
    FieldSpec {
        path: FieldPath::new("email"),
        kind: FieldKind::Text,
        type_message: "Email must be text",
        rules: &[
            FieldRule::new(Rule::Required, "Email is required"),
            FieldRule::new(Rule::Email, "Please enter a valid email address"),
        ],
    },
    FieldSpec {
        path: FieldPath::new("phone"),
        kind: FieldKind::Text,
        type_message: "Phone must be text",
        rules: &[
            FieldRule::new(Rule::Required, "Phone is required"),
            FieldRule::new(Rule::Phone, "Please enter a valid phone number"),
        ],
    },
    FieldSpec {
        path: FieldPath::new("website"),
        kind: FieldKind::Text,
        type_message: "Website must be text",
        rules: &[
            FieldRule::new(Rule::Required, "Website is required"),
            FieldRule::new(Rule::Url, "Please enter a valid URL"),
        ],
    },
    FieldSpec {
        path: FieldPath::new("address.street"),
        kind: FieldKind::Text,
        type_message: "Street must be text",
        rules: &[FieldRule::new(Rule::Required, "Street is required")],
    },
    FieldSpec {
        path: FieldPath::new("address.city"),
        kind: FieldKind::Text,
        type_message: "City must be text",
        rules: &[FieldRule::new(Rule::Required, "City is required")],
    },
    FieldSpec {
        path: FieldPath::new("address.zipcode"),
        kind: FieldKind::Text,
        type_message: "Zipcode must be text",
        rules: &[FieldRule::new(Rule::Required, "Zipcode is required")],
    },
    FieldSpec {
        path: FieldPath::new("company.name"),
        kind: FieldKind::Text,
        type_message: "Company name must be text",
        rules: &[FieldRule::new(Rule::Required, "Company name is required")],
    },
];

pub(crate) const POST_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        path: FieldPath::new("title"),
        kind: FieldKind::Text,
        type_message: "Title must be text",
        rules: &[
            FieldRule::new(Rule::Required, "Title is required"),
            FieldRule::new(
                Rule::MinChars(POST_TITLE_MIN),
                "Title must be at least 5 characters",
            ),
            FieldRule::new(
                Rule::MaxChars(POST_TITLE_MAX),
                "Title must be less than 100 characters",
            ),
        ],
    },
    FieldSpec {
        path: FieldPath::new("body"),
        kind: FieldKind::Text,
        type_message: "Content must be text",
        rules: &[
            FieldRule::new(Rule::Required, "Content is required"),
            FieldRule::new(
                Rule::MinChars(POST_BODY_MIN),
                "Content must be at least 10 characters",
            ),
            FieldRule::new(
                Rule::MaxChars(POST_BODY_MAX),
                "Content must be less than 1000 characters",
            ),
        ],
    },
    FieldSpec {
        path: FieldPath::new("userId"),
        kind: FieldKind::Integer,
        type_message: "User ID must be a number",
        rules: &[
            FieldRule::new(Rule::Required, "User ID is required"),
            FieldRule::new(Rule::Positive, "User ID must be a positive number"),
            FieldRule::new(Rule::Integer, "User ID must be an integer"),
            FieldRule::new(Rule::FitsId, "User ID is too large"),
        ],
    },
];

/// A field value after shape coercion.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Coerced {
    Missing,
    Text(String),
    /// An integer read exactly.
    Whole(u64),
    /// Any other number; checked by the numeric rules, never stored as is.
    Number(f64),
}

/// Smallest float that no longer fits a `u64` (2^64).
const ID_LIMIT: f64 = 18_446_744_073_709_551_616.0;

/// Coerce the raw JSON value at a path into the shape the field expects.
///
/// Scalars are cast the way form inputs usually arrive: numbers become text
/// for text fields, and numeric strings become numbers for integer fields.
/// Empty strings count as missing so `Required` reports them.
pub(crate) fn coerce(kind: FieldKind, raw: Option<&Value>) -> Result<Coerced, ()> {
    let Some(value) = raw else {
        return Ok(Coerced::Missing);
    };
    match (kind, value) {
        (_, Value::Null) => Ok(Coerced::Missing),
        (_, Value::String(text)) if text.is_empty() => Ok(Coerced::Missing),
        (FieldKind::Text, Value::String(text)) => Ok(Coerced::Text(text.clone())),
        (FieldKind::Text, Value::Number(number)) => Ok(Coerced::Text(number.to_string())),
        (FieldKind::Text, Value::Bool(flag)) => Ok(Coerced::Text(flag.to_string())),
        (FieldKind::Integer, Value::Number(number)) => number
            .as_u64()
            .map(Coerced::Whole)
            .or_else(|| number.as_f64().map(Coerced::Number))
            .ok_or(()),
        (FieldKind::Integer, Value::String(text)) => coerce_numeric_text(text.trim()),
        _ => Err(()),
    }
}

fn coerce_numeric_text(text: &str) -> Result<Coerced, ()> {
    if let Ok(whole) = text.parse::<u64>() {
        return Ok(Coerced::Whole(whole));
    }
    text.parse::<f64>()
        .ok()
        .filter(|parsed| parsed.is_finite())
        .map(Coerced::Number)
        .ok_or(())
}

/// Return whether `value` satisfies `rule`. Rules other than `Required`
/// pass on missing values so only one message is produced per field.
pub(crate) fn passes(rule: Rule, value: &Coerced) -> bool {
    match (rule, value) {
        (Rule::Required, Coerced::Missing) => false,
        (_, Coerced::Missing) | (Rule::Required, _) => true,
        (Rule::MinChars(min), Coerced::Text(text)) => text.chars().count() >= min,
        (Rule::MaxChars(max), Coerced::Text(text)) => text.chars().count() <= max,
        (Rule::Email, Coerced::Text(text)) => email_regex().is_match(text),
        (Rule::Phone, Coerced::Text(text)) => phone_regex().is_match(text),
        (Rule::Url, Coerced::Text(text)) => is_web_url(text),
        (Rule::Positive, Coerced::Whole(whole)) => *whole > 0,
        (Rule::Positive, Coerced::Number(number)) => *number > 0.0,
        (Rule::Integer | Rule::FitsId, Coerced::Whole(_)) => true,
        (Rule::Integer, Coerced::Number(number)) => number.fract() == 0.0,
        (Rule::FitsId, Coerced::Number(number)) => *number < ID_LIMIT,
        // Remaining pairings combine a text rule with a number or vice versa;
        // the tables never declare them.
        _ => true,
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
static PHONE_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

fn phone_regex() -> &'static Regex {
    PHONE_RE.get_or_init(|| {
        // Digits, separators, parentheses, a leading plus and an `x` extension marker.
        Regex::new(r"^[\d\s\-()+.xX]+$")
            .unwrap_or_else(|error| panic!("phone regex failed to compile: {error}"))
    })
}

fn is_web_url(raw: &str) -> bool {
    Url::parse(raw)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.host_str().is_some())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    //! Covers individual predicates and value coercion.

    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    #[case("Sincere@april.biz", true)]
    #[case("a@b.co", true)]
    #[case("no-at-sign.example", false)]
    #[case("two@@example.com", false)]
    #[case("spaces in@example.com", false)]
    #[case("missing@tld", false)]
    fn email_rule(#[case] raw: &str, #[case] expected: bool) {
        assert_eq!(passes(Rule::Email, &Coerced::Text(raw.to_owned())), expected);
    }

    #[rstest]
    #[case("1-770-736-8031 x56442", true)]
    #[case("(254)954-1289", true)]
    #[case("+44 20 7946 0958", true)]
    #[case("024-648-3804", true)]
    #[case("call me", false)]
    #[case("555#1234", false)]
    fn phone_rule(#[case] raw: &str, #[case] expected: bool) {
        assert_eq!(passes(Rule::Phone, &Coerced::Text(raw.to_owned())), expected);
    }

    #[rstest]
    #[case("https://hildegard.org", true)]
    #[case("http://example.com/path?q=1", true)]
    #[case("hildegard.org", false)]
    #[case("ftp://files.example.com", false)]
    #[case("https://", false)]
    fn url_rule(#[case] raw: &str, #[case] expected: bool) {
        assert_eq!(passes(Rule::Url, &Coerced::Text(raw.to_owned())), expected);
    }

    #[test]
    fn length_rules_count_characters_not_bytes() {
        let value = Coerced::Text("héllo".to_owned());
        assert!(passes(Rule::MinChars(5), &value));
        assert!(passes(Rule::MaxChars(5), &value));
        assert!(!passes(Rule::MinChars(6), &value));
    }

    #[test]
    fn only_required_fails_on_missing_values() {
        assert!(!passes(Rule::Required, &Coerced::Missing));
        assert!(passes(Rule::MinChars(3), &Coerced::Missing));
        assert!(passes(Rule::Positive, &Coerced::Missing));
    }

    #[rstest]
    #[case(json!(3), Coerced::Whole(3))]
    #[case(json!("3"), Coerced::Whole(3))]
    #[case(json!(9_007_199_254_740_993_u64), Coerced::Whole(9_007_199_254_740_993))]
    #[case(json!("9007199254740993"), Coerced::Whole(9_007_199_254_740_993))]
    #[case(json!(3.0), Coerced::Number(3.0))]
    #[case(json!(" 2.5 "), Coerced::Number(2.5))]
    #[case(json!(-4), Coerced::Number(-4.0))]
    #[case(json!(""), Coerced::Missing)]
    #[case(json!(null), Coerced::Missing)]
    fn integer_fields_accept_numbers_and_numeric_strings(
        #[case] raw: Value,
        #[case] expected: Coerced,
    ) {
        assert_eq!(coerce(FieldKind::Integer, Some(&raw)), Ok(expected));
    }

    #[rstest]
    #[case(Coerced::Whole(u64::MAX), true)]
    #[case(Coerced::Number(3.0), true)]
    #[case(Coerced::Number(1e19), true)]
    #[case(Coerced::Number(ID_LIMIT), false)]
    #[case(Coerced::Number(1e22), false)]
    fn id_range_rule(#[case] value: Coerced, #[case] expected: bool) {
        assert_eq!(passes(Rule::FitsId, &value), expected);
    }

    #[rstest]
    #[case(json!("three"))]
    #[case(json!([1]))]
    #[case(json!(true))]
    fn integer_fields_reject_non_numeric_values(#[case] raw: Value) {
        assert_eq!(coerce(FieldKind::Integer, Some(&raw)), Err(()));
    }

    #[test]
    fn text_fields_cast_scalars_and_reject_objects() {
        assert_eq!(
            coerce(FieldKind::Text, Some(&json!(42))),
            Ok(Coerced::Text("42".to_owned()))
        );
        assert_eq!(coerce(FieldKind::Text, Some(&json!({ "a": 1 }))), Err(()));
        assert_eq!(coerce(FieldKind::Text, None), Ok(Coerced::Missing));
    }
}
