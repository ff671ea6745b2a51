use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use axum_extra::TypedHeader;
use chrono::Utc;
use headers::{authorization::Bearer, Authorization};
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

use shared_config::AppConfig;
use shared_database::{StoreClient, StoreError};
use shared_models::auth::{AuthUser, Role};
use shared_models::error::AppError;
use shared_utils::extractor::require_admin;
use shared_utils::password::hash_password;

use crate::models::{AppointmentRef, CreateUserRequest, UpdateUserRequest, User, UserView};

#[axum::debug_handler]
pub async fn get_users(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(caller): Extension<AuthUser>,
) -> Result<Json<Vec<UserView>>, AppError> {
    require_admin(&caller)?;

    let store = StoreClient::new(&state);
    let users = store
        .fetch_all::<User>(Some(auth.token()))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(users.into_iter().map(UserView::from).collect()))
}

#[axum::debug_handler]
pub async fn get_user(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(caller): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserView>, AppError> {
    require_admin(&caller)?;

    let store = StoreClient::new(&state);
    let user = store
        .find_by_id::<User>(user_id, Some(auth.token()))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;

    Ok(Json(UserView::from(user)))
}

#[axum::debug_handler]
pub async fn add_user(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(caller): Extension<AuthUser>,
    Json(request): Json<CreateUserRequest>,
) -> Result<Json<UserView>, AppError> {
    require_admin(&caller)?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let store = StoreClient::new(&state);

    let email_taken = store
        .select::<User>()
        .eq("email", &request.email)
        .exists(Some(auth.token()))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    if email_taken {
        warn!("Email {} already exists", request.email);
        return Err(AppError::BadRequest("Email already registered.".to_string()));
    }

    let password_hash =
        hash_password(&request.password).map_err(|e| AppError::Internal(e.to_string()))?;

    let row = json!({
        "first_name": request.first_name,
        "last_name": request.last_name,
        "email": request.email,
        "password_hash": password_hash,
        "role": request.role.unwrap_or(Role::Client),
        "created_at": Utc::now().to_rfc3339()
    });

    let user = store
        .insert::<User>(row, Some(auth.token()))
        .await
        .map_err(|e| match e {
            StoreError::NothingApplied => {
                AppError::BadRequest("Failed to add user.".to_string())
            }
            other => AppError::Database(other.to_string()),
        })?;

    info!("User {} created by admin {}", user.id, caller.id);
    Ok(Json(UserView::from(user)))
}

#[axum::debug_handler]
pub async fn update_user(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(caller): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserView>, AppError> {
    require_admin(&caller)?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let store = StoreClient::new(&state);

    store
        .find_by_id::<User>(user_id, Some(auth.token()))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;

    let mut patch = serde_json::Map::new();
    if let Some(first_name) = request.first_name {
        patch.insert("first_name".to_string(), json!(first_name));
    }
    if let Some(last_name) = request.last_name {
        patch.insert("last_name".to_string(), json!(last_name));
    }
    if let Some(email) = request.email {
        patch.insert("email".to_string(), json!(email));
    }
    if let Some(role) = request.role {
        patch.insert("role".to_string(), json!(role));
    }
    if let Some(password) = request.password {
        let password_hash =
            hash_password(&password).map_err(|e| AppError::Internal(e.to_string()))?;
        patch.insert("password_hash".to_string(), json!(password_hash));
    }

    let updated = store
        .update::<User>(user_id, serde_json::Value::Object(patch), Some(auth.token()))
        .await
        .map_err(|e| match e {
            StoreError::NothingApplied => {
                AppError::BadRequest("Failed to update user.".to_string())
            }
            other => AppError::Database(other.to_string()),
        })?;

    debug!("User {} updated", user_id);
    Ok(Json(UserView::from(updated)))
}

#[axum::debug_handler]
pub async fn delete_user(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(caller): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_admin(&caller)?;

    let store = StoreClient::new(&state);

    store
        .find_by_id::<User>(user_id, Some(auth.token()))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;

    // Restrict-on-delete: a user keeping appointments cannot be removed.
    let has_appointments = store
        .select::<AppointmentRef>()
        .eq("user_id", user_id)
        .exists(Some(auth.token()))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    if has_appointments {
        return Err(AppError::BadRequest(
            "Cannot delete user with existing appointments.".to_string(),
        ));
    }

    let removed = store
        .delete::<User>(user_id, Some(auth.token()))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    if !removed {
        return Err(AppError::BadRequest("Failed to delete user.".to_string()));
    }

    info!("User {} deleted by admin {}", user_id, caller.id);
    Ok(Json(json!({ "message": "User deleted." })))
}
