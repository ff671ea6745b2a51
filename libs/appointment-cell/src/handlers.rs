use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use shared_config::AppConfig;
use shared_models::auth::AuthUser;
use shared_models::error::AppError;
use shared_utils::extractor::require_privileged;

use crate::models::{
    AddStatusRequest, Appointment, AppointmentError, BookAppointmentRequest, StatusRecord,
    UpdateAppointmentRequest,
};
use crate::services::booking::BookingService;

fn map_booking_error(e: AppointmentError) -> AppError {
    match e {
        AppointmentError::NotFound => AppError::NotFound("Appointment not found.".to_string()),
        AppointmentError::UserNotFound(id) => {
            AppError::NotFound(format!("User with ID {} not found.", id))
        }
        AppointmentError::ServiceNotFound(id) => {
            AppError::NotFound(format!("Service with ID {} not found.", id))
        }
        AppointmentError::ConflictDetected => AppError::Conflict(
            "Appointment conflicts with an existing booking for this user.".to_string(),
        ),
        AppointmentError::CommitFailed => {
            AppError::BadRequest("Failed to save appointment.".to_string())
        }
        AppointmentError::DatabaseError(msg) => AppError::Database(msg),
    }
}

#[axum::debug_handler]
pub async fn get_appointments(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    let service = BookingService::new(&state);
    let appointments = service
        .list(Some(auth.token()))
        .await
        .map_err(map_booking_error)?;

    Ok(Json(appointments))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Appointment>, AppError> {
    let service = BookingService::new(&state);
    let appointment = service
        .get(appointment_id, Some(auth.token()))
        .await
        .map_err(map_booking_error)?;

    Ok(Json(appointment))
}

#[axum::debug_handler]
pub async fn add_appointment(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(caller): Extension<AuthUser>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Appointment>, AppError> {
    require_privileged(&caller)?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let service = BookingService::new(&state);
    let appointment = service
        .book(request, Some(auth.token()))
        .await
        .map_err(map_booking_error)?;

    Ok(Json(appointment))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(caller): Extension<AuthUser>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Json<Appointment>, AppError> {
    require_privileged(&caller)?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let service = BookingService::new(&state);
    let appointment = service
        .update(appointment_id, request, Some(auth.token()))
        .await
        .map_err(map_booking_error)?;

    Ok(Json(appointment))
}

#[axum::debug_handler]
pub async fn get_status_history(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Vec<StatusRecord>>, AppError> {
    let service = BookingService::new(&state);
    let history = service
        .status_history(appointment_id, Some(auth.token()))
        .await
        .map_err(map_booking_error)?;

    Ok(Json(history))
}

#[axum::debug_handler]
pub async fn add_status_record(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(caller): Extension<AuthUser>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<AddStatusRequest>,
) -> Result<Json<StatusRecord>, AppError> {
    require_privileged(&caller)?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let service = BookingService::new(&state);

    // The log only accepts entries for appointments that exist.
    service
        .get(appointment_id, Some(auth.token()))
        .await
        .map_err(map_booking_error)?;

    let record = service
        .record_status(
            appointment_id,
            request.name,
            request.description,
            Some(auth.token()),
        )
        .await
        .map_err(map_booking_error)?;

    Ok(Json(record))
}

#[axum::debug_handler]
pub async fn delete_appointment(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(caller): Extension<AuthUser>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_privileged(&caller)?;

    let service = BookingService::new(&state);
    service
        .remove(appointment_id, Some(auth.token()))
        .await
        .map_err(|e| match e {
            AppointmentError::CommitFailed => {
                AppError::BadRequest("Failed to delete appointment.".to_string())
            }
            other => map_booking_error(other),
        })?;

    Ok(Json(json!({ "message": "Appointment deleted." })))
}
