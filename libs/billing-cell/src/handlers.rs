use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use axum_extra::TypedHeader;
use chrono::Utc;
use headers::{authorization::Bearer, Authorization};
use rust_decimal::Decimal;
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use shared_config::AppConfig;
use shared_database::{StoreClient, StoreError};
use shared_models::auth::AuthUser;
use shared_models::error::AppError;
use shared_utils::extractor::require_privileged;

use crate::models::{AppointmentRef, Payment, PaymentRequest, PaymentStatus, PaymentUpdateRequest};

#[axum::debug_handler]
pub async fn get_payments(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Vec<Payment>>, AppError> {
    let store = StoreClient::new(&state);
    let payments = store
        .fetch_all::<Payment>(Some(auth.token()))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(payments))
}

#[axum::debug_handler]
pub async fn get_payment(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(payment_id): Path<Uuid>,
) -> Result<Json<Payment>, AppError> {
    let store = StoreClient::new(&state);
    let payment = store
        .find_by_id::<Payment>(payment_id, Some(auth.token()))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("Payment not found.".to_string()))?;

    Ok(Json(payment))
}

#[axum::debug_handler]
pub async fn create_payment(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(caller): Extension<AuthUser>,
    Json(request): Json<PaymentRequest>,
) -> Result<Json<Payment>, AppError> {
    require_privileged(&caller)?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    if request.amount <= Decimal::ZERO {
        return Err(AppError::Validation(
            "Amount must be greater than zero".to_string(),
        ));
    }

    let store = StoreClient::new(&state);

    let appointment_exists = store
        .select::<AppointmentRef>()
        .eq("id", request.appointment_id)
        .exists(Some(auth.token()))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    if !appointment_exists {
        return Err(AppError::NotFound("Appointment not found.".to_string()));
    }

    let row = json!({
        "appointment_id": request.appointment_id,
        "amount": request.amount,
        "method": request.method,
        "status": PaymentStatus::Pending,
        "payment_date": Utc::now().to_rfc3339(),
        "transaction_id": request.transaction_id
    });

    let payment = store
        .insert::<Payment>(row, Some(auth.token()))
        .await
        .map_err(|e| match e {
            StoreError::NothingApplied => {
                AppError::BadRequest("Failed to create payment.".to_string())
            }
            other => AppError::Database(other.to_string()),
        })?;

    info!(
        "Payment {} recorded for appointment {}",
        payment.id, payment.appointment_id
    );
    Ok(Json(payment))
}

#[axum::debug_handler]
pub async fn update_payment(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(caller): Extension<AuthUser>,
    Path(payment_id): Path<Uuid>,
    Json(request): Json<PaymentUpdateRequest>,
) -> Result<Json<Payment>, AppError> {
    require_privileged(&caller)?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let store = StoreClient::new(&state);

    store
        .find_by_id::<Payment>(payment_id, Some(auth.token()))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("Payment not found.".to_string()))?;

    let mut patch = serde_json::Map::new();
    if let Some(amount) = request.amount {
        if amount <= Decimal::ZERO {
            return Err(AppError::Validation(
                "Amount must be greater than zero".to_string(),
            ));
        }
        patch.insert("amount".to_string(), json!(amount));
    }
    if let Some(method) = request.method {
        patch.insert("method".to_string(), json!(method));
    }
    if let Some(status) = request.status {
        patch.insert("status".to_string(), json!(status));
    }
    if let Some(transaction_id) = request.transaction_id {
        patch.insert("transaction_id".to_string(), json!(transaction_id));
    }

    let updated = store
        .update::<Payment>(payment_id, serde_json::Value::Object(patch), Some(auth.token()))
        .await
        .map_err(|e| match e {
            StoreError::NothingApplied => {
                AppError::BadRequest("Failed to update payment.".to_string())
            }
            other => AppError::Database(other.to_string()),
        })?;

    debug!("Payment {} updated", payment_id);
    Ok(Json(updated))
}

#[axum::debug_handler]
pub async fn delete_payment(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(caller): Extension<AuthUser>,
    Path(payment_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_privileged(&caller)?;

    let store = StoreClient::new(&state);

    store
        .find_by_id::<Payment>(payment_id, Some(auth.token()))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("Payment not found.".to_string()))?;

    let removed = store
        .delete::<Payment>(payment_id, Some(auth.token()))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    if !removed {
        return Err(AppError::BadRequest("Failed to delete payment.".to_string()));
    }

    info!("Payment {} deleted", payment_id);
    Ok(Json(json!({ "message": "Payment deleted." })))
}
