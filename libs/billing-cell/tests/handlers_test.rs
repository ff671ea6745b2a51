use assert_matches::assert_matches;
use axum::extract::{Extension, Json, Path, State};
use axum_extra::TypedHeader;
use headers::Authorization;
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use billing_cell::handlers::{create_payment, get_payment, update_payment};
use billing_cell::models::{PaymentMethod, PaymentRequest, PaymentStatus, PaymentUpdateRequest};
use shared_models::error::AppError;
use shared_utils::test_utils::{JwtTestUtils, MockStoreRows, TestConfig, TestUser};

struct Harness {
    server: MockServer,
    config: TestConfig,
    staff: TestUser,
    token: String,
}

async fn harness() -> Harness {
    let server = MockServer::start().await;
    let config = TestConfig::with_store_url(&server.uri());
    let staff = TestUser::staff("staff@x.com");
    let token = JwtTestUtils::create_test_token(&staff, &config.jwt_secret, Some(24));
    Harness {
        server,
        config,
        staff,
        token,
    }
}

fn payment_request(appointment_id: Uuid) -> PaymentRequest {
    PaymentRequest {
        appointment_id,
        amount: Decimal::new(4999, 2),
        method: PaymentMethod::CreditCard,
        transaction_id: None,
    }
}

#[tokio::test]
async fn clients_cannot_record_payments() {
    let h = harness().await;
    let client = TestUser::client("client@x.com");
    let token = JwtTestUtils::create_test_token(&client, &h.config.jwt_secret, Some(24));

    let result = create_payment(
        State(h.config.to_arc()),
        TypedHeader(Authorization::bearer(&token).unwrap()),
        Extension(client.to_auth_user()),
        Json(payment_request(Uuid::new_v4())),
    )
    .await;

    assert_matches!(result.unwrap_err(), AppError::Forbidden(_));
}

#[tokio::test]
async fn payments_require_an_existing_appointment() {
    let h = harness().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&h.server)
        .await;

    let result = create_payment(
        State(h.config.to_arc()),
        TypedHeader(Authorization::bearer(&h.token).unwrap()),
        Extension(h.staff.to_auth_user()),
        Json(payment_request(Uuid::new_v4())),
    )
    .await;

    assert_matches!(result.unwrap_err(), AppError::NotFound(msg) => {
        assert_eq!(msg, "Appointment not found.");
    });
}

#[tokio::test]
async fn new_payments_start_pending() {
    let h = harness().await;
    let appointment_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": appointment_id }])))
        .mount(&h.server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/payments"))
        .and(body_partial_json(json!({ "status": "Pending" })))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!([MockStoreRows::payment_row(appointment_id)])),
        )
        .expect(1)
        .mount(&h.server)
        .await;

    let payment = create_payment(
        State(h.config.to_arc()),
        TypedHeader(Authorization::bearer(&h.token).unwrap()),
        Extension(h.staff.to_auth_user()),
        Json(payment_request(appointment_id)),
    )
    .await
    .unwrap()
    .0;

    assert_eq!(payment.status, PaymentStatus::Pending);
    assert_eq!(payment.appointment_id, appointment_id);
}

#[tokio::test]
async fn non_positive_amounts_are_rejected() {
    let h = harness().await;

    let mut request = payment_request(Uuid::new_v4());
    request.amount = Decimal::ZERO;

    let result = create_payment(
        State(h.config.to_arc()),
        TypedHeader(Authorization::bearer(&h.token).unwrap()),
        Extension(h.staff.to_auth_user()),
        Json(request),
    )
    .await;

    assert_matches!(result.unwrap_err(), AppError::Validation(_));
}

#[tokio::test]
async fn missing_payment_is_not_found() {
    let h = harness().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/payments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&h.server)
        .await;

    let result = get_payment(
        State(h.config.to_arc()),
        TypedHeader(Authorization::bearer(&h.token).unwrap()),
        Path(Uuid::new_v4()),
    )
    .await;

    assert_matches!(result.unwrap_err(), AppError::NotFound(_));
}

#[tokio::test]
async fn updates_can_settle_a_payment() {
    let h = harness().await;
    let appointment_id = Uuid::new_v4();
    let row = MockStoreRows::payment_row(appointment_id);
    let payment_id: Uuid = serde_json::from_value(row["id"].clone()).unwrap();

    Mock::given(method("GET"))
        .and(path("/rest/v1/payments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row.clone()])))
        .mount(&h.server)
        .await;

    let mut settled = row.clone();
    settled["status"] = json!("Completed");
    settled["transaction_id"] = json!("txn-123");
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/payments"))
        .and(body_partial_json(json!({ "status": "Completed" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([settled])))
        .mount(&h.server)
        .await;

    let request = PaymentUpdateRequest {
        amount: None,
        method: None,
        status: Some(PaymentStatus::Completed),
        transaction_id: Some("txn-123".to_string()),
    };

    let payment = update_payment(
        State(h.config.to_arc()),
        TypedHeader(Authorization::bearer(&h.token).unwrap()),
        Extension(h.staff.to_auth_user()),
        Path(payment_id),
        Json(request),
    )
    .await
    .unwrap()
    .0;

    assert_eq!(payment.status, PaymentStatus::Completed);
    assert_eq!(payment.transaction_id.as_deref(), Some("txn-123"));
}
