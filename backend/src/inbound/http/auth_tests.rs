//! Tests for the authentication handlers.

use actix_web::cookie::Cookie;
use actix_web::http::{StatusCode, header};
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};

use crate::inbound::http::test_utils::{TestBackend, session_cookie, signed_in, test_app};

const EMAIL: &str = "ada@example.com";

async fn json_body(response: actix_web::dev::ServiceResponse) -> Value {
    let body = actix_test::read_body(response).await;
    serde_json::from_slice(&body).expect("JSON body")
}

fn wrong_code(actual: &str) -> &'static str {
    if actual == "000000" { "111111" } else { "000000" }
}

#[rstest]
#[actix_web::test]
async fn sign_up_returns_pending_login_and_cookie() {
    let backend = TestBackend::new();
    let app = actix_test::init_service(test_app(backend.state.clone())).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/signup")
            .set_json(json!({ "email": " ADA@example.com ", "firstName": "Ada", "lastName": "Lovelace" }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert!(session_cookie(&response).is_some());
    let value = json_body(response).await;
    assert!(value.get("expiresAt").and_then(Value::as_str).is_some());
    assert!(backend.notifier.last_code_for(EMAIL).is_some());
}

#[rstest]
#[actix_web::test]
async fn sign_up_reports_every_invalid_field() {
    let backend = TestBackend::new();
    let app = actix_test::init_service(test_app(backend.state.clone())).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/signup")
            .set_json(json!({ "email": "not-an-email", "firstName": "Ada" }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let value = json_body(response).await;
    assert_eq!(value["code"], "invalid_request");
    let violations: Vec<(&str, &str)> = value["details"]["violations"]
        .as_array()
        .expect("violations")
        .iter()
        .filter_map(|v| Some((v["field"].as_str()?, v["code"].as_str()?)))
        .collect();
    assert_eq!(
        violations,
        vec![("email", "invalid_email"), ("lastName", "required")]
    );
}

#[rstest]
#[actix_web::test]
async fn duplicate_sign_up_conflicts() {
    let backend = TestBackend::new();
    let app = actix_test::init_service(test_app(backend.state.clone())).await;
    let body = json!({ "email": EMAIL, "firstName": "Ada", "lastName": "Lovelace" });

    let first = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/signup")
            .set_json(&body)
            .to_request(),
    )
    .await;
    assert_eq!(first.status(), StatusCode::ACCEPTED);

    let second = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/signup")
            .set_json(&body)
            .to_request(),
    )
    .await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[rstest]
#[actix_web::test]
async fn form_sign_up_redirects_to_verify() {
    let backend = TestBackend::new();
    let app = actix_test::init_service(test_app(backend.state.clone())).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/signup")
            .set_form([("email", EMAIL), ("firstName", "Ada"), ("lastName", "Lovelace")])
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok()),
        Some("/verify")
    );
}

#[rstest]
#[actix_web::test]
async fn malformed_json_is_an_invalid_request() {
    let backend = TestBackend::new();
    let app = actix_test::init_service(test_app(backend.state.clone())).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/login")
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .set_payload("{not json")
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let value = json_body(response).await;
    assert_eq!(value["code"], "invalid_request");
}

#[rstest]
#[actix_web::test]
async fn a_new_login_retires_the_previous_code() {
    let backend = TestBackend::new();
    let app = actix_test::init_service(test_app(backend.state.clone())).await;
    let signup = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/signup")
            .set_json(json!({ "email": EMAIL, "firstName": "Ada", "lastName": "Lovelace" }))
            .to_request(),
    )
    .await;
    let first_cookie = session_cookie(&signup).expect("pending cookie");
    let first_code = backend.notifier.last_code_for(EMAIL).expect("first code");

    let login = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(json!({ "email": EMAIL }))
            .to_request(),
    )
    .await;
    assert_eq!(login.status(), StatusCode::ACCEPTED);
    let second_cookie = session_cookie(&login).expect("pending cookie");
    let second_code = backend.notifier.last_code_for(EMAIL).expect("second code");

    let stale = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/verify")
            .cookie(first_cookie)
            .set_json(json!({ "code": first_code }))
            .to_request(),
    )
    .await;
    assert_eq!(stale.status(), StatusCode::UNAUTHORIZED);

    let fresh = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/verify")
            .cookie(second_cookie)
            .set_json(json!({ "code": second_code }))
            .to_request(),
    )
    .await;
    assert_eq!(fresh.status(), StatusCode::OK);
}

#[rstest]
#[actix_web::test]
async fn login_for_unknown_email_is_not_found() {
    let backend = TestBackend::new();
    let app = actix_test::init_service(test_app(backend.state.clone())).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(json!({ "email": "nobody@example.com" }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[rstest]
#[actix_web::test]
async fn verify_without_pending_login_is_unauthorised() {
    let backend = TestBackend::new();
    let app = actix_test::init_service(test_app(backend.state.clone())).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/verify")
            .set_json(json!({ "code": "123456" }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[rstest]
#[case(json!({}), "required")]
#[case(json!({ "code": "12ab56" }), "invalid_characters")]
#[actix_web::test]
async fn verify_rejects_malformed_codes(#[case] body: Value, #[case] expected: &str) {
    let backend = TestBackend::new();
    let app = actix_test::init_service(test_app(backend.state.clone())).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/verify")
            .set_json(body)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let value = json_body(response).await;
    assert_eq!(value["details"]["field"], "code");
    assert_eq!(value["details"]["code"], expected);
}

#[rstest]
#[actix_web::test]
async fn wrong_codes_lock_the_login_after_five_attempts() {
    let backend = TestBackend::new();
    let app = actix_test::init_service(test_app(backend.state.clone())).await;

    let signup = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/signup")
            .set_json(json!({ "email": EMAIL, "firstName": "Ada", "lastName": "Lovelace" }))
            .to_request(),
    )
    .await;
    let pending = session_cookie(&signup).expect("pending cookie");
    let code = backend.notifier.last_code_for(EMAIL).expect("code sent");
    let wrong = wrong_code(&code);

    let mut statuses = Vec::new();
    for _ in 0..5 {
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/verify")
                .cookie(pending.clone())
                .set_json(json!({ "code": wrong }))
                .to_request(),
        )
        .await;
        statuses.push(response.status());
    }
    assert_eq!(
        statuses,
        vec![
            StatusCode::UNAUTHORIZED,
            StatusCode::UNAUTHORIZED,
            StatusCode::UNAUTHORIZED,
            StatusCode::UNAUTHORIZED,
            StatusCode::FORBIDDEN,
        ]
    );

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/verify")
            .cookie(pending)
            .set_json(json!({ "code": code }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[rstest]
#[actix_web::test]
async fn verified_session_reaches_protected_endpoints() {
    let backend = TestBackend::new();
    let app = actix_test::init_service(test_app(backend.state.clone())).await;
    let cookie = signed_in(&app, &backend, EMAIL).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/users/me")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let value = json_body(response).await;
    assert_eq!(value["email"], EMAIL);
}

#[rstest]
#[actix_web::test]
async fn logout_revokes_the_session() {
    let backend = TestBackend::new();
    let app = actix_test::init_service(test_app(backend.state.clone())).await;
    let cookie = signed_in(&app, &backend, EMAIL).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/logout")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // The old cookie still names the session, which is now revoked.
    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/users/me")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[rstest]
#[actix_web::test]
async fn protected_endpoints_require_a_session() {
    let backend = TestBackend::new();
    let app = actix_test::init_service(test_app(backend.state.clone())).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/users/me")
            .cookie(Cookie::new("unrelated", "value"))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let value = json_body(response).await;
    assert_eq!(value["message"], "login required");
}
