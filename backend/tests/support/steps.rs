//! Steps shared by the behaviour suites.

use actix_web::http::Method;
use rstest_bdd_macros::{given, then, when};
use serde_json::{Value, json};

use crate::harness::{Body, SharedWorld, WorldFixture, send};

pub(crate) fn status(world: &SharedWorld) -> u16 {
    world.borrow().last_status.expect("a response was recorded")
}

pub(crate) fn body(world: &SharedWorld) -> Value {
    world.borrow().last_body.clone().expect("JSON response body")
}

pub(crate) fn sign_up(world: &SharedWorld, email: &str) {
    send(
        world,
        Method::POST,
        "/api/v1/signup",
        Body::Json(json!({
            "email": email,
            "firstName": "Ada",
            "lastName": "Lovelace"
        })),
    );
    assert_eq!(status(world), 202, "signup should be accepted");
    world.borrow_mut().email = Some(email.to_owned());
}

pub(crate) fn submit_code(world: &SharedWorld, code: &str) {
    send(
        world,
        Method::POST,
        "/api/v1/verify",
        Body::Json(json!({ "code": code })),
    );
}

pub(crate) fn delivered_code(world: &SharedWorld) -> String {
    let ctx = world.borrow();
    let email = ctx.email.as_deref().expect("an email was registered");
    ctx.notifier.last_code_for(email).expect("code delivered")
}

#[given("a running Retire Strong server")]
fn a_running_retire_strong_server(world: &WorldFixture) {
    assert!(world.world().borrow().base_url.starts_with("http://"));
}

#[given("a pending signup for {email}")]
fn a_pending_signup_for(world: &WorldFixture, email: String) {
    sign_up(&world.world(), &email);
}

#[given("a verified member {email}")]
fn a_verified_member(world: &WorldFixture, email: String) {
    let world = world.world();
    sign_up(&world, &email);
    let code = delivered_code(&world);
    submit_code(&world, &code);
    assert_eq!(status(&world), 200, "verification should succeed");
    assert!(world.borrow().session_cookie.is_some());
}

#[when("the visitor opens {path}")]
fn the_visitor_opens(world: &WorldFixture, path: String) {
    send(&world.world(), Method::GET, &path, Body::Empty);
}

#[then("the response status is {expected}")]
fn the_response_status_is(world: &WorldFixture, expected: u16) {
    assert_eq!(status(&world.world()), expected);
}

#[then("the error code is {code}")]
fn the_error_code_is(world: &WorldFixture, code: String) {
    let body = body(&world.world());
    assert_eq!(
        body.get("code").and_then(Value::as_str),
        Some(code.as_str())
    );
}

#[then("the response carries a trace id")]
fn the_response_carries_a_trace_id(world: &WorldFixture) {
    let world = world.world();
    let ctx = world.borrow();
    let trace_id = ctx.last_trace_id.as_deref().expect("trace id header");
    let body = ctx.last_body.as_ref().expect("error body");
    assert_eq!(body.get("traceId").and_then(Value::as_str), Some(trace_id));
}

#[then("the visitor is redirected to {location}")]
fn the_visitor_is_redirected_to(world: &WorldFixture, location: String) {
    let world = world.world();
    let ctx = world.borrow();
    assert_eq!(ctx.last_status, Some(303));
    assert_eq!(ctx.last_location.as_deref(), Some(location.as_str()));
}
