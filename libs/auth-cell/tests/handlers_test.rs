use assert_matches::assert_matches;
use axum::extract::{Extension, Json, State};
use axum_extra::TypedHeader;
use headers::Authorization;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use auth_cell::handlers::{login, register, register_admin};
use auth_cell::models::{LoginRequest, RegisterRequest};
use shared_models::auth::Role;
use shared_models::error::AppError;
use shared_utils::jwt::validate_token;
use shared_utils::password::hash_password;
use shared_utils::test_utils::{JwtTestUtils, MockStoreRows, TestConfig, TestUser};

fn register_request(email: &str) -> RegisterRequest {
    RegisterRequest {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email: email.to_string(),
        password: "pw123456".to_string(),
    }
}

async fn mock_no_existing_user(server: &MockServer, email: &str) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("email", format!("eq.{}", email)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn register_returns_token_payload() {
    let server = MockServer::start().await;
    let config = TestConfig::with_store_url(&server.uri());

    mock_no_existing_user(&server, "a@x.com").await;

    let created = TestUser::client("a@x.com");
    Mock::given(method("POST"))
        .and(path("/rest/v1/users"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!([MockStoreRows::user_row(&created, "hash")])),
        )
        .mount(&server)
        .await;

    let result = register(State(config.to_arc()), Json(register_request("a@x.com"))).await;

    let response = result.unwrap().0;
    assert_eq!(response.email, "a@x.com");
    assert_eq!(response.role, Role::Client);
    assert_eq!(response.user_id, created.id);

    // The issued token must round-trip through our own validator.
    let validated = validate_token(&response.token, &config.jwt_secret).unwrap();
    assert_eq!(validated.id, created.id);
    assert_eq!(validated.role, Role::Client);
}

#[tokio::test]
async fn register_rejects_duplicate_email() {
    let server = MockServer::start().await;
    let config = TestConfig::with_store_url(&server.uri());

    let existing = TestUser::client("a@x.com");
    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "id": existing.id }])),
        )
        .mount(&server)
        .await;

    let result = register(State(config.to_arc()), Json(register_request("a@x.com"))).await;

    assert_matches!(result.unwrap_err(), AppError::BadRequest(msg) => {
        assert_eq!(msg, "Email already registered");
    });
}

#[tokio::test]
async fn register_validates_the_payload_before_touching_the_store() {
    let config = TestConfig::default();

    let mut request = register_request("not-an-email");
    request.password = "short".to_string();

    let result = register(State(config.to_arc()), Json(request)).await;
    assert_matches!(result.unwrap_err(), AppError::Validation(_));
}

#[tokio::test]
async fn login_succeeds_with_correct_credentials() {
    let server = MockServer::start().await;
    let config = TestConfig::with_store_url(&server.uri());

    let user = TestUser::client("a@x.com");
    let stored_hash = hash_password("pw123456").unwrap();
    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("email", "eq.a@x.com"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([MockStoreRows::user_row(&user, &stored_hash)])),
        )
        .mount(&server)
        .await;

    let request = LoginRequest {
        email: "a@x.com".to_string(),
        password: "pw123456".to_string(),
    };
    let response = login(State(config.to_arc()), Json(request)).await.unwrap().0;

    assert_eq!(response.user_id, user.id);
    assert!(validate_token(&response.token, &config.jwt_secret).is_ok());
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let server = MockServer::start().await;
    let config = TestConfig::with_store_url(&server.uri());

    // Unknown email.
    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("email", "eq.missing@x.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    // Known email, wrong password.
    let user = TestUser::client("a@x.com");
    let stored_hash = hash_password("pw123456").unwrap();
    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("email", "eq.a@x.com"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([MockStoreRows::user_row(&user, &stored_hash)])),
        )
        .mount(&server)
        .await;

    let unknown = login(
        State(config.to_arc()),
        Json(LoginRequest {
            email: "missing@x.com".to_string(),
            password: "whatever1".to_string(),
        }),
    )
    .await
    .unwrap_err();

    let wrong_password = login(
        State(config.to_arc()),
        Json(LoginRequest {
            email: "a@x.com".to_string(),
            password: "other-password".to_string(),
        }),
    )
    .await
    .unwrap_err();

    let unknown_msg = assert_matches!(unknown, AppError::Auth(msg) => msg);
    let wrong_msg = assert_matches!(wrong_password, AppError::Auth(msg) => msg);
    assert_eq!(unknown_msg, wrong_msg);
    assert_eq!(unknown_msg, "Invalid credentials");
}

#[tokio::test]
async fn register_admin_requires_admin_role() {
    let config = TestConfig::default();
    let staff = TestUser::staff("staff@x.com");
    let token = JwtTestUtils::create_test_token(&staff, &config.jwt_secret, Some(24));

    let result = register_admin(
        State(config.to_arc()),
        TypedHeader(Authorization::bearer(&token).unwrap()),
        Extension(staff.to_auth_user()),
        Json(register_request("new-admin@x.com")),
    )
    .await;

    assert_matches!(result.unwrap_err(), AppError::Forbidden(_));
}

#[tokio::test]
async fn register_admin_assigns_the_admin_role() {
    let server = MockServer::start().await;
    let config = TestConfig::with_store_url(&server.uri());

    mock_no_existing_user(&server, "new-admin@x.com").await;

    let created = TestUser::admin("new-admin@x.com");
    Mock::given(method("POST"))
        .and(path("/rest/v1/users"))
        .and(wiremock::matchers::body_partial_json(json!({"role": "Admin"})))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!([MockStoreRows::user_row(&created, "hash")])),
        )
        .mount(&server)
        .await;

    let admin = TestUser::admin("boss@x.com");
    let token = JwtTestUtils::create_test_token(&admin, &config.jwt_secret, Some(24));

    let response = register_admin(
        State(config.to_arc()),
        TypedHeader(Authorization::bearer(&token).unwrap()),
        Extension(admin.to_auth_user()),
        Json(register_request("new-admin@x.com")),
    )
    .await
    .unwrap()
    .0;

    assert_eq!(response.role, Role::Admin);
}
