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

use crate::models::{AppointmentRef, Review, ReviewToAddRequest, ReviewView};

#[axum::debug_handler]
pub async fn get_reviews(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Vec<ReviewView>>, AppError> {
    let store = StoreClient::new(&state);
    let reviews = store
        .fetch_all::<Review>(Some(auth.token()))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(reviews.into_iter().map(ReviewView::from).collect()))
}

#[axum::debug_handler]
pub async fn get_review(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(review_id): Path<Uuid>,
) -> Result<Json<ReviewView>, AppError> {
    let store = StoreClient::new(&state);
    let review = store
        .find_by_id::<Review>(review_id, Some(auth.token()))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("Review not found.".to_string()))?;

    Ok(Json(ReviewView::from(review)))
}

/// Any authenticated user may review; the reviewer is always the caller,
/// taken from the token rather than the request body.
#[axum::debug_handler]
pub async fn create_review(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(caller): Extension<AuthUser>,
    Json(request): Json<ReviewToAddRequest>,
) -> Result<Json<ReviewView>, AppError> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

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

    let already_reviewed = store
        .select::<Review>()
        .eq("appointment_id", request.appointment_id)
        .exists(Some(auth.token()))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    if already_reviewed {
        return Err(AppError::BadRequest(
            "Appointment already has a review.".to_string(),
        ));
    }

    let row = json!({
        "appointment_id": request.appointment_id,
        "user_id": caller.id,
        "rating": request.rating,
        "comment": request.comment,
        "review_date": Utc::now().to_rfc3339()
    });

    let review = store
        .insert::<Review>(row, Some(auth.token()))
        .await
        .map_err(|e| match e {
            StoreError::NothingApplied => {
                AppError::BadRequest("Failed to create review.".to_string())
            }
            other => AppError::Database(other.to_string()),
        })?;

    info!(
        "Review {} created for appointment {} by user {}",
        review.id, review.appointment_id, caller.id
    );
    Ok(Json(ReviewView::from(review)))
}

#[axum::debug_handler]
pub async fn delete_review(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(caller): Extension<AuthUser>,
    Path(review_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_privileged(&caller)?;

    let store = StoreClient::new(&state);

    store
        .find_by_id::<Review>(review_id, Some(auth.token()))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("Review not found.".to_string()))?;

    let removed = store
        .delete::<Review>(review_id, Some(auth.token()))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    if !removed {
        return Err(AppError::BadRequest("Failed to delete review.".to_string()));
    }

    info!("Review {} deleted", review_id);
    Ok(Json(json!({ "message": "Review deleted." })))
}
