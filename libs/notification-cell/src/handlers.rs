use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use axum_extra::TypedHeader;
use chrono::Utc;
use headers::{authorization::Bearer, Authorization};
use serde_json::json;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use shared_config::AppConfig;
use shared_database::{StoreClient, StoreError};
use shared_models::auth::AuthUser;
use shared_models::error::AppError;
use shared_utils::extractor::require_privileged;

use crate::models::{
    AppointmentRef, Notification, NotificationStatus, NotificationToAddRequest, UserRef,
};
use crate::services::dispatch::DeliveryStub;

#[axum::debug_handler]
pub async fn get_my_notifications(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(caller): Extension<AuthUser>,
) -> Result<Json<Vec<Notification>>, AppError> {
    let store = StoreClient::new(&state);

    let notifications = store
        .select::<Notification>()
        .eq("user_id", caller.id)
        .order_desc("created_at")
        .fetch(Some(auth.token()))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(notifications))
}

/// Marking read is owner-scoped: someone else's notification id behaves as
/// if it did not exist.
#[axum::debug_handler]
pub async fn mark_as_read(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(caller): Extension<AuthUser>,
    Path(notification_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = StoreClient::new(&state);

    let notification = store
        .select::<Notification>()
        .eq("id", notification_id)
        .eq("user_id", caller.id)
        .fetch_one(Some(auth.token()))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    let notification =
        notification.ok_or_else(|| AppError::NotFound("Notification not found".to_string()))?;

    store
        .update::<Notification>(
            notification.id,
            json!({ "status": NotificationStatus::Read }),
            Some(auth.token()),
        )
        .await
        .map_err(|e| match e {
            StoreError::NothingApplied => {
                AppError::BadRequest("Failed to update notification status".to_string())
            }
            other => AppError::Database(other.to_string()),
        })?;

    Ok(Json(json!({ "message": "Notification marked as read" })))
}

/// Privileged send: the row is committed as Pending, handed to the delivery
/// stub, then flipped to the reported status in the same request.
#[axum::debug_handler]
pub async fn send_notification(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(caller): Extension<AuthUser>,
    Json(request): Json<NotificationToAddRequest>,
) -> Result<Json<Notification>, AppError> {
    require_privileged(&caller)?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let store = StoreClient::new(&state);

    let user_exists = store
        .select::<UserRef>()
        .eq("id", request.user_id)
        .exists(Some(auth.token()))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    if !user_exists {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let appointment_exists = store
        .select::<AppointmentRef>()
        .eq("id", request.appointment_id)
        .exists(Some(auth.token()))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    if !appointment_exists {
        return Err(AppError::NotFound("Appointment not found".to_string()));
    }

    let row = json!({
        "user_id": request.user_id,
        "appointment_id": request.appointment_id,
        "message": request.message,
        "channel": request.channel,
        "status": NotificationStatus::Pending,
        "created_at": Utc::now().to_rfc3339(),
        "sent_at": null
    });

    let notification = store
        .insert::<Notification>(row, Some(auth.token()))
        .await
        .map_err(|e| match e {
            StoreError::NothingApplied => {
                AppError::BadRequest("Failed to create notification".to_string())
            }
            other => AppError::Database(other.to_string()),
        })?;

    let outcome = DeliveryStub::new().deliver(&notification);

    let patch = match outcome {
        NotificationStatus::Sent => json!({
            "status": NotificationStatus::Sent,
            "sent_at": Utc::now().to_rfc3339()
        }),
        other => json!({ "status": other }),
    };

    let notification = store
        .update::<Notification>(notification.id, patch, Some(auth.token()))
        .await
        .map_err(|e| match e {
            StoreError::NothingApplied => {
                AppError::BadRequest("Failed to update notification status".to_string())
            }
            other => AppError::Database(other.to_string()),
        })?;

    info!(
        "Notification {} dispatched to user {}",
        notification.id, notification.user_id
    );
    Ok(Json(notification))
}

#[axum::debug_handler]
pub async fn get_all_notifications(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(caller): Extension<AuthUser>,
) -> Result<Json<Vec<Notification>>, AppError> {
    require_privileged(&caller)?;

    let store = StoreClient::new(&state);

    let notifications = store
        .select::<Notification>()
        .order_desc("created_at")
        .fetch(Some(auth.token()))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(notifications))
}
