//! Behavioural tests for form validation.
//!
//! These scenarios cover the collecting, path-keyed behaviour of the user and
//! post rule tables.

// `expect` is idiomatic in test code for failing fast on precondition violations.
#![expect(
    clippy::expect_used,
    reason = "test code uses expect for clear failure messages"
)]

use resource_schema::{ResourceDraft, Schema, ValidationResult, validate};
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::{ScenarioState, given, scenario, then, when};
use serde_json::{Value, json};

// ============================================================================
// Test fixtures and constants
// ============================================================================

/// Test world holding the candidate record and its validation outcome.
#[derive(Default, ScenarioState)]
struct World {
    candidate: Slot<Value>,
    result: Slot<ValidationResult>,
}

impl World {
    fn candidate(&self) -> Value {
        self.candidate.get().expect("candidate should be set")
    }

    fn result(&self) -> ValidationResult {
        self.result.get().expect("validation should have run")
    }
}

#[fixture]
fn world() -> World {
    World::default()
}

fn complete_user() -> Value {
    json!({
        "name": "Ervin Howell",
        "username": "Antonette",
        "email": "Shanna@melissa.tv",
        "phone": "010-692-6593 x09125",
        "website": "https://anastasia.net",
        "address": {
            "street": "Victor Plains",
            "city": "Wisokyburgh",
            "zipcode": "90566-7771"
        },
        "company": { "name": "Deckow-Crist" }
    })
}

// ============================================================================
// Given steps
// ============================================================================

#[given("a post candidate with a valid title, body and author")]
fn a_valid_post_candidate(world: &World) {
    world.candidate.set(json!({
        "title": "Valid Title Here",
        "body": "This is sufficiently long content.",
        "userId": 3
    }));
}

#[given("a post candidate with a two character title")]
fn a_post_candidate_with_a_short_title(world: &World) {
    world.candidate.set(json!({
        "title": "Hi",
        "body": "Short content here",
        "userId": 3
    }));
}

#[given("a post candidate with an empty title and body")]
fn a_post_candidate_with_empty_fields(world: &World) {
    world.candidate.set(json!({ "title": "", "body": "", "userId": 3 }));
}

#[given("a user candidate without an address city")]
fn a_user_candidate_without_a_city(world: &World) {
    let mut candidate = complete_user();
    candidate
        .pointer_mut("/address")
        .and_then(Value::as_object_mut)
        .expect("address is an object")
        .remove("city");
    world.candidate.set(candidate);
}

#[given("a complete user candidate")]
fn a_complete_user_candidate(world: &World) {
    world.candidate.set(complete_user());
}

// ============================================================================
// When steps
// ============================================================================

#[when("the post candidate is validated")]
fn the_post_candidate_is_validated(world: &World) {
    world
        .result
        .set(validate(Schema::Post, &world.candidate()));
}

#[when("the user candidate is validated")]
fn the_user_candidate_is_validated(world: &World) {
    world
        .result
        .set(validate(Schema::User, &world.candidate()));
}

// ============================================================================
// Then steps
// ============================================================================

#[then("validation succeeds")]
fn validation_succeeds(world: &World) {
    let result = world.result();
    assert!(result.is_valid(), "expected success, got {result:?}");
}

#[then("the normalised post matches the candidate")]
fn the_normalised_post_matches_the_candidate(world: &World) {
    let draft = world.result().into_result().expect("post should be valid");
    assert!(matches!(draft, ResourceDraft::Post(_)));
    let encoded = serde_json::to_value(&draft).expect("draft should encode");
    assert_eq!(encoded, world.candidate());
}

#[then("the number of failing fields is {count:usize}")]
fn the_number_of_failing_fields_is(world: &World, count: usize) {
    let result = world.result();
    let errors = result.errors().expect("validation should fail");
    assert_eq!(errors.len(), count, "unexpected errors: {errors}");
}

#[then("the title error says it is too short")]
fn the_title_error_says_it_is_too_short(world: &World) {
    let result = world.result();
    let errors = result.errors().expect("validation should fail");
    assert_eq!(
        errors.get("title"),
        Some("Title must be at least 5 characters")
    );
}

#[then("both the title and body are reported as required")]
fn both_the_title_and_body_are_reported_as_required(world: &World) {
    let result = world.result();
    let errors = result.errors().expect("validation should fail");
    assert_eq!(errors.get("title"), Some("Title is required"));
    assert_eq!(errors.get("body"), Some("Content is required"));
}

#[then("the error is keyed by address.city")]
fn the_error_is_keyed_by_address_city(world: &World) {
    let result = world.result();
    let errors = result.errors().expect("validation should fail");
    assert_eq!(errors.get("address.city"), Some("City is required"));
}

// ============================================================================
// Scenario bindings
// ============================================================================

#[scenario(
    path = "tests/features/validation.feature",
    name = "Valid post passes unchanged"
)]
fn valid_post_passes_unchanged(world: World) {
    let _ = world;
}

#[scenario(
    path = "tests/features/validation.feature",
    name = "Short post title is the only failure"
)]
fn short_post_title_is_the_only_failure(world: World) {
    let _ = world;
}

#[scenario(
    path = "tests/features/validation.feature",
    name = "Empty post fields are collected"
)]
fn empty_post_fields_are_collected(world: World) {
    let _ = world;
}

#[scenario(
    path = "tests/features/validation.feature",
    name = "Missing nested user field reports its dotted path"
)]
fn missing_nested_user_field_reports_its_dotted_path(world: World) {
    let _ = world;
}

#[scenario(
    path = "tests/features/validation.feature",
    name = "Valid user passes"
)]
fn valid_user_passes(world: World) {
    let _ = world;
}
